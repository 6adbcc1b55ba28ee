use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where `InsertAt` places new lines relative to the anchor line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertPosition {
    Before,
    /// Replace the anchor line itself.
    Same,
    After,
}

/// One regular-expression substitution. The replacement is literal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceRule {
    pub pattern: String,
    pub replacement: String,
}

impl ReplaceRule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

/// A single tree operation or text patch. Paths are relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScaffoldOp {
    Copy {
        from: Utf8PathBuf,
        to: Utf8PathBuf,
    },
    Mirror {
        from: Utf8PathBuf,
        to: Utf8PathBuf,
    },
    Rename {
        from: Utf8PathBuf,
        to: Utf8PathBuf,
    },
    Remove {
        paths: Vec<Utf8PathBuf>,
    },
    InsertAt {
        file: Utf8PathBuf,
        anchor: String,
        position: InsertPosition,
        lines: Vec<String>,
    },
    Splice {
        file: Utf8PathBuf,
        /// Negative values count from the end of the file.
        offset: i64,
        length: usize,
        lines: Vec<String>,
    },
    ReplaceAll {
        files: Vec<Utf8PathBuf>,
        rules: Vec<ReplaceRule>,
    },
}

impl ScaffoldOp {
    pub fn kind(&self) -> &'static str {
        match self {
            ScaffoldOp::Copy { .. } => "copy",
            ScaffoldOp::Mirror { .. } => "mirror",
            ScaffoldOp::Rename { .. } => "rename",
            ScaffoldOp::Remove { .. } => "remove",
            ScaffoldOp::InsertAt { .. } => "insert_at",
            ScaffoldOp::Splice { .. } => "splice",
            ScaffoldOp::ReplaceAll { .. } => "replace_all",
        }
    }

    pub fn is_text_patch(&self) -> bool {
        matches!(
            self,
            ScaffoldOp::InsertAt { .. } | ScaffoldOp::Splice { .. } | ScaffoldOp::ReplaceAll { .. }
        )
    }

    /// Paths written or removed by this op.
    pub fn targets(&self) -> Vec<&Utf8Path> {
        match self {
            ScaffoldOp::Copy { to, .. }
            | ScaffoldOp::Mirror { to, .. }
            | ScaffoldOp::Rename { to, .. } => vec![to.as_path()],
            ScaffoldOp::Remove { paths } => paths.iter().map(|p| p.as_path()).collect(),
            ScaffoldOp::InsertAt { file, .. } | ScaffoldOp::Splice { file, .. } => {
                vec![file.as_path()]
            }
            ScaffoldOp::ReplaceAll { files, .. } => files.iter().map(|p| p.as_path()).collect(),
        }
    }
}

/// Stages of a scaffold run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    RenameOriginalWebRoot,
    MaterializeCoreModule,
    MaterializeAppTree,
    MaterializeAppBundle,
    MaterializeConsoleEntry,
    MaterializeCacheAndLogDirs,
    MaterializePublicDir,
    RemoveOriginalSingleAppArtifacts,
}

impl Stage {
    /// Stages repeated once per application, in order.
    pub const PER_APP: [Stage; 5] = [
        Stage::MaterializeAppTree,
        Stage::MaterializeAppBundle,
        Stage::MaterializeConsoleEntry,
        Stage::MaterializeCacheAndLogDirs,
        Stage::MaterializePublicDir,
    ];

    pub fn is_per_app(self) -> bool {
        Self::PER_APP.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::RenameOriginalWebRoot => "rename_original_web_root",
            Stage::MaterializeCoreModule => "materialize_core_module",
            Stage::MaterializeAppTree => "materialize_app_tree",
            Stage::MaterializeAppBundle => "materialize_app_bundle",
            Stage::MaterializeConsoleEntry => "materialize_console_entry",
            Stage::MaterializeCacheAndLogDirs => "materialize_cache_and_log_dirs",
            Stage::MaterializePublicDir => "materialize_public_dir",
            Stage::RemoveOriginalSingleAppArtifacts => "remove_original_single_app_artifacts",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
