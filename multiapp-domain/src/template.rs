//! Fixed shape of the single-app template tree.

use crate::ports::TemplateView;
use camino::Utf8Path;
use multiapp_types::LayoutFlavor;

pub const GENERIC_BUNDLE: &str = "AppBundle";
pub const GENERIC_KERNEL: &str = "AppKernel";
pub const GENERIC_CACHE: &str = "AppCache";

pub const APP_DIR: &str = "app";
pub const APPS_DIR: &str = "apps";
pub const SRC_DIR: &str = "src";
pub const WEB_DIR: &str = "web";
pub const WEB_ORIGINAL_DIR: &str = "web_original";
pub const VAR_DIR: &str = "var";
pub const BIN_DIR: &str = "bin";
pub const TESTS_DIR: &str = "tests";

/// Present only in the modern layout.
pub const CONSOLE_ENTRY: &str = "bin/console";

/// Runtime directories under `var/` (modern layout).
pub const RUNTIME_DIRS: [&str; 3] = ["cache", "logs", "sessions"];

/// Configuration files copied into the core module.
pub const CORE_CONFIG_FILES: [&str; 3] = ["config.yml", "parameters.yml.dist", "parameters.yml"];

/// The import header at the top of `config.yml` that the core copy drops.
pub const CORE_CONFIG_HEADER_LINES: usize = 4;

/// Front controllers and the kernel constructor arguments each one uses.
pub const FRONT_CONTROLLERS: [(&str, &str); 2] =
    [("app.php", "'prod', false"), ("app_dev.php", "'dev', true")];

/// Secret shipped in the template's `parameters.yml`.
pub const SECRET_PLACEHOLDER: &str = "ThisTokenIsNotSoSecretChangeIt";

/// Names that would make derived artifacts collide with template paths.
///
/// Includes [`RUNTIME_DIRS`]: `var/<app>` would otherwise land on a shared
/// runtime directory that the removal step deletes.
pub const RESERVED_NAMES: [&str; 5] = ["app", "console", "cache", "logs", "sessions"];

/// Modern iff the template ships a `bin/console` entry point.
pub fn detect_layout(view: &dyn TemplateView) -> LayoutFlavor {
    if view.is_file(Utf8Path::new(CONSOLE_ENTRY)) {
        LayoutFlavor::Modern
    } else {
        LayoutFlavor::Legacy
    }
}

/// Template paths the plan for `layout` reads from.
pub fn required_paths(layout: LayoutFlavor) -> Vec<String> {
    let mut paths = vec![
        format!("{APP_DIR}/{GENERIC_KERNEL}.php"),
        format!("{APP_DIR}/{GENERIC_CACHE}.php"),
        format!("{APP_DIR}/autoload.php"),
        format!("{APP_DIR}/config/routing.yml"),
        format!("{SRC_DIR}/{GENERIC_BUNDLE}/{GENERIC_BUNDLE}.php"),
        format!("{SRC_DIR}/{GENERIC_BUNDLE}/Controller/DefaultController.php"),
    ];
    paths.extend(CORE_CONFIG_FILES.iter().map(|f| format!("{APP_DIR}/config/{f}")));
    paths.extend(FRONT_CONTROLLERS.iter().map(|(f, _)| format!("{WEB_DIR}/{f}")));
    match layout {
        LayoutFlavor::Modern => paths.push(CONSOLE_ENTRY.to_string()),
        LayoutFlavor::Legacy => paths.push(format!("{APP_DIR}/console")),
    }
    paths
}

/// Fail with the list of required template files that are missing.
pub fn check_template(view: &dyn TemplateView, layout: LayoutFlavor) -> anyhow::Result<()> {
    let mut missing: Vec<String> = required_paths(layout)
        .into_iter()
        .filter(|p| !view.is_file(Utf8Path::new(p)))
        .collect();
    if layout.is_modern() {
        missing.extend(
            RUNTIME_DIRS
                .iter()
                .map(|d| format!("{VAR_DIR}/{d}"))
                .filter(|p| !view.is_dir(Utf8Path::new(p))),
        );
    }
    if missing.is_empty() {
        Ok(())
    } else {
        anyhow::bail!(
            "template at {} is not a {} single-app tree; missing: {}",
            view.root(),
            layout,
            missing.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use std::collections::BTreeSet;

    struct Listing {
        root: Utf8PathBuf,
        files: BTreeSet<String>,
    }

    impl Listing {
        fn new(files: &[&str]) -> Self {
            Self {
                root: Utf8PathBuf::from("/tpl"),
                files: files.iter().map(|s| s.to_string()).collect(),
            }
        }
    }

    impl TemplateView for Listing {
        fn root(&self) -> &Utf8Path {
            &self.root
        }

        fn is_file(&self, rel: &Utf8Path) -> bool {
            self.files.contains(rel.as_str())
        }

        fn is_dir(&self, rel: &Utf8Path) -> bool {
            let prefix = format!("{rel}/");
            self.files.iter().any(|f| f.starts_with(&prefix))
        }
    }

    #[test]
    fn console_entry_selects_modern() {
        assert_eq!(detect_layout(&Listing::new(&["bin/console"])), LayoutFlavor::Modern);
        assert_eq!(detect_layout(&Listing::new(&["app/console"])), LayoutFlavor::Legacy);
    }

    #[test]
    fn check_template_lists_missing_files() {
        let view = Listing::new(&["app/AppKernel.php"]);
        let err = check_template(&view, LayoutFlavor::Modern).unwrap_err().to_string();
        assert!(err.contains("app/AppCache.php"), "{err}");
        assert!(err.contains("bin/console"), "{err}");
        assert!(!err.contains("app/AppKernel.php"), "{err}");
    }

    #[test]
    fn complete_listing_passes() {
        let paths = required_paths(LayoutFlavor::Legacy);
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let view = Listing::new(&refs);
        assert!(check_template(&view, LayoutFlavor::Legacy).is_ok());
    }

    #[test]
    fn modern_template_needs_runtime_dirs() {
        let mut paths = required_paths(LayoutFlavor::Modern);
        paths.push("var/cache/.gitkeep".to_string());
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let err = check_template(&Listing::new(&refs), LayoutFlavor::Modern)
            .unwrap_err()
            .to_string();
        assert!(err.contains("var/logs"), "{err}");
        assert!(!err.contains("var/cache"), "{err}");
    }
}
