//! Shared DTOs (schemas-as-code) for the multiapp workspace.
//!
//! # Design constraints
//! - Plans and run reports are serialized to disk and printed as JSON.
//! - Identifiers are normalized on construction; a value of these types is
//!   always valid, so downstream crates never re-check them.
//! - Prefer adding optional fields over changing semantics.

pub mod config;
pub mod ids;
pub mod ops;
pub mod plan;
pub mod report;

pub use config::{LayoutFlavor, ScaffoldConfig};
pub use ids::{AppId, AppSet, CoreModuleName, IdentifierError};

/// Schema identifiers.
pub mod schema {
    pub const MULTIAPP_PLAN_V1: &str = "multiapp.plan.v1";
    pub const MULTIAPP_RUN_V1: &str = "multiapp.run.v1";
}

/// Marker error raised when the user cancels a run.
///
/// It is usually buried under several layers of `anyhow` context (or inside an
/// HTTP client error), so callers look for it anywhere in the error chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, thiserror::Error)]
#[error("aborted by user")]
pub struct UserAbort;
