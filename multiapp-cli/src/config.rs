//! Configuration file loading for multiapp.
//!
//! Discovers and loads `multiapp.toml` from the working directory.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use multiapp_core::LayoutChoice;
use serde::Deserialize;
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "multiapp.toml";

/// Top-level configuration from multiapp.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MultiappConfig {
    pub scaffold: ScaffoldConfigFile,
    pub self_update: SelfUpdateConfigFile,
}

/// `[scaffold]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScaffoldConfigFile {
    pub apps: Vec<String>,
    pub app_count: Option<usize>,
    pub core: Option<String>,

    /// `auto`, `modern` or `legacy`.
    pub layout: Option<String>,
}

/// `[self_update]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelfUpdateConfigFile {
    pub version_url: Option<String>,
    pub download_url: Option<String>,
}

pub fn discover_config(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.is_file() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

pub fn load_config(path: &Utf8Path) -> anyhow::Result<MultiappConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<MultiappConfig> {
    let config: MultiappConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// An explicit `--config` path must exist; otherwise look in `dir`.
pub fn load(explicit: Option<&Utf8Path>, dir: &Utf8Path) -> anyhow::Result<MultiappConfig> {
    match explicit {
        Some(path) => load_config(path),
        None => match discover_config(dir) {
            Some(path) => load_config(&path),
            None => Ok(MultiappConfig::default()),
        },
    }
}

/// Scaffold naming flags as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ScaffoldOverrides {
    pub apps: Vec<String>,
    pub app_count: Option<usize>,
    pub core: Option<String>,
    pub layout: Option<LayoutChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedScaffold {
    pub apps: Vec<String>,
    pub app_count: usize,
    pub core: String,
    pub layout: LayoutChoice,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedSelfUpdate {
    pub version_url: Option<String>,
    pub download_url: Option<String>,
}

pub struct ConfigMerger {
    config: MultiappConfig,
}

impl ConfigMerger {
    pub fn new(config: MultiappConfig) -> Self {
        Self { config }
    }

    /// A non-empty CLI app list replaces the file list; scalars override.
    pub fn merge_scaffold(
        self,
        cli: ScaffoldOverrides,
        defaults: (usize, &str),
    ) -> anyhow::Result<MergedScaffold> {
        let file = self.config.scaffold;
        let (default_count, default_core) = defaults;

        let layout = match (cli.layout, file.layout) {
            (Some(layout), _) => layout,
            (None, Some(raw)) => raw
                .parse::<LayoutChoice>()
                .map_err(|e| anyhow::anyhow!("[scaffold] layout: {e}"))?,
            (None, None) => LayoutChoice::Auto,
        };

        Ok(MergedScaffold {
            apps: if cli.apps.is_empty() { file.apps } else { cli.apps },
            app_count: cli.app_count.or(file.app_count).unwrap_or(default_count),
            core: cli
                .core
                .or(file.core)
                .unwrap_or_else(|| default_core.to_string()),
            layout,
        })
    }

    pub fn merge_self_update(
        self,
        version_url: Option<String>,
        download_url: Option<String>,
    ) -> MergedSelfUpdate {
        let file = self.config.self_update;
        MergedSelfUpdate {
            version_url: version_url.or(file.version_url),
            download_url: download_url.or(file.download_url),
        }
    }
}
