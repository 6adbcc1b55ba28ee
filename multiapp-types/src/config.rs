use crate::ids::{AppSet, CoreModuleName, IdentifierError};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Directory-layout convention of the single-app template.
///
/// - `Modern`: console entry in `bin/console`, runtime state in `var/`.
/// - `Legacy`: console entry and runtime state live inside `app/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutFlavor {
    Legacy,
    Modern,
}

impl LayoutFlavor {
    pub fn is_modern(self) -> bool {
        matches!(self, LayoutFlavor::Modern)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutFlavor::Legacy => "legacy",
            LayoutFlavor::Modern => "modern",
        }
    }
}

impl fmt::Display for LayoutFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutFlavor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(LayoutFlavor::Legacy),
            "modern" => Ok(LayoutFlavor::Modern),
            other => Err(format!("unknown layout `{other}` (expected legacy or modern)")),
        }
    }
}

/// Everything a scaffold run needs, fixed before the first mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaffoldConfig {
    pub project_root: Utf8PathBuf,
    pub apps: AppSet,
    pub core: CoreModuleName,
    pub layout: LayoutFlavor,
}

impl ScaffoldConfig {
    pub fn new(
        project_root: Utf8PathBuf,
        apps: AppSet,
        core: CoreModuleName,
        layout: LayoutFlavor,
    ) -> Result<Self, IdentifierError> {
        if apps.is_empty() {
            return Err(IdentifierError::NoApps);
        }
        if apps.contains(core.as_str()) {
            return Err(IdentifierError::CoreClash(core.as_str().to_string()));
        }
        Ok(Self {
            project_root,
            apps,
            core,
            layout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_core_named_like_an_app() {
        let apps = AppSet::parse(["core", "admin"]).unwrap();
        let err = ScaffoldConfig::new(
            Utf8PathBuf::from("/tmp/p"),
            apps,
            CoreModuleName::default(),
            LayoutFlavor::Modern,
        )
        .unwrap_err();
        assert_eq!(err, IdentifierError::CoreClash("core".to_string()));
    }

    #[test]
    fn layout_parses_case_insensitively() {
        assert_eq!("Modern".parse::<LayoutFlavor>(), Ok(LayoutFlavor::Modern));
        assert_eq!(" legacy".parse::<LayoutFlavor>(), Ok(LayoutFlavor::Legacy));
        assert!("flat".parse::<LayoutFlavor>().is_err());
    }
}
