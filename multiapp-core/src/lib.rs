//! Embeddable core library for multiapp.
//!
//! Provides clap-free entry points suitable for linking into the CLI or any
//! other host process.
//!
//! # Port traits
//!
//! The outside world is reached through the port traits in [`ports`]:
//! - [`TemplateSource`](ports::TemplateSource): produce the single-app template tree
//! - [`ReleaseSource`](ports::ReleaseSource): latest version and release download
//! - [`AbortSignal`](ports::AbortSignal): user cancellation
//!
//! The [`adapters`] module provides default implementations.
//!
//! # Entry points
//!
//! - [`run_new`](pipeline::run_new): scaffold a multi-app project
//! - [`run_self_update`](self_update::run_self_update): replace the running executable

pub mod adapters;
pub mod executor;
pub mod pipeline;
pub mod ports;
pub mod self_update;
pub mod settings;

pub use executor::{ExecutionJournal, execute_plan};
pub use pipeline::{NewOutcome, RunError, run_new};
pub use self_update::{UpdateOutcome, run_self_update};
pub use settings::{LayoutChoice, NewSettings, SelfUpdateSettings};

// Re-exported so embedders don't need multiapp-edit directly.
pub use multiapp_edit::{FsTree, TreeOps};
