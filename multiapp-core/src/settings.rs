//! Clap-free settings for the scaffold and self-update pipelines.

use camino::{Utf8Path, Utf8PathBuf};
use multiapp_types::{AppSet, CoreModuleName, IdentifierError, LayoutFlavor};
use std::str::FromStr;

/// Layout requested by the caller; `Auto` inspects the template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayoutChoice {
    #[default]
    Auto,
    Fixed(LayoutFlavor),
}

impl LayoutChoice {
    pub fn fixed(self) -> Option<LayoutFlavor> {
        match self {
            LayoutChoice::Auto => None,
            LayoutChoice::Fixed(layout) => Some(layout),
        }
    }
}

impl FromStr for LayoutChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(LayoutChoice::Auto);
        }
        s.parse::<LayoutFlavor>()
            .map(LayoutChoice::Fixed)
            .map_err(|_| format!("unknown layout `{}` (expected auto, modern or legacy)", s.trim()))
    }
}

/// Settings for `run_new`.
#[derive(Debug, Clone)]
pub struct NewSettings {
    pub project_dir: Utf8PathBuf,

    /// Raw application names. When empty, `app_count` numbered apps are used.
    pub apps: Vec<String>,
    pub app_count: usize,

    /// Raw core module name, e.g. `CoreBundle`.
    pub core: String,
    pub layout: LayoutChoice,
}

impl Default for NewSettings {
    fn default() -> Self {
        Self {
            project_dir: Utf8PathBuf::from("."),
            apps: Vec::new(),
            app_count: 2,
            core: CoreModuleName::DEFAULT_INPUT.to_string(),
            layout: LayoutChoice::default(),
        }
    }
}

impl NewSettings {
    pub fn app_set(&self) -> Result<AppSet, IdentifierError> {
        if self.apps.is_empty() {
            AppSet::numbered(self.app_count)
        } else {
            AppSet::parse(&self.apps)
        }
    }

    pub fn core_name(&self) -> Result<CoreModuleName, IdentifierError> {
        CoreModuleName::parse(&self.core)
    }

    /// Last path component of the project directory, used as the README title.
    pub fn project_name(&self) -> String {
        project_name_of(&self.project_dir)
    }
}

fn project_name_of(dir: &Utf8Path) -> String {
    dir.file_name()
        .map(str::to_string)
        .unwrap_or_else(|| dir.as_str().to_string())
}

/// Settings for `run_self_update`.
#[derive(Debug, Clone)]
pub struct SelfUpdateSettings {
    /// The executable to replace.
    pub current_exe: Utf8PathBuf,
    pub current_version: String,

    /// Where the candidate is downloaded.
    pub temp_dir: Utf8PathBuf,

    /// Lower-case hex sha256 the candidate must match.
    pub expected_sha256: Option<String>,
}

impl SelfUpdateSettings {
    fn stem(&self) -> String {
        self.current_exe
            .file_stem()
            .unwrap_or("multiapp")
            .to_string()
    }

    pub fn candidate_path(&self) -> Utf8PathBuf {
        self.temp_dir.join(format!("{}-temp", self.stem()))
    }

    pub fn backup_path(&self) -> Utf8PathBuf {
        let dir = self.current_exe.parent().unwrap_or(Utf8Path::new("."));
        dir.join(format!("{}-backup", self.stem()))
    }
}
