//! Domain logic: naming policy and the deterministic scaffold planner.
//!
//! This crate owns *what* happens to the template tree and in which order. It does not own *how*
//! ops are applied; that's the `multiapp-edit` crate, driven by `multiapp-core`.

pub mod naming;
mod planner;
mod ports;
pub mod template;

pub use naming::{DerivedNames, bundle_class_name, check_reserved, derive_names};
pub use planner::Planner;
pub use ports::{FsTemplateView, TemplateView};
pub use template::{check_template, detect_layout};
