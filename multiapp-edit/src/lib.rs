//! Edit engine for multiapp scaffold plans.
//!
//! Responsibilities:
//! - Line-splice, anchor-insert and regex find/replace over whole files ([`text`]).
//! - Copy / mirror / rename / remove over the working tree ([`tree`]).
//! - Content hashes and unified diffs describing what changed.

pub mod error;
pub mod text;
pub mod tree;

pub use error::{EditError, EditResult, ValidationError};
pub use text::{
    CompiledRules, FileEdit, insert_at, insert_lines_in, regex_replace_all, replace_all_in,
    splice_lines, splice_lines_in,
};
pub use tree::{FsTree, TreeOps};

use sha2::{Digest, Sha256};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
