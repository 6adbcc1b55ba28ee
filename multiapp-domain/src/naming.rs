//! Naming policy: every artifact name derived from an application name.

use crate::template::RESERVED_NAMES;
use multiapp_types::{AppId, AppSet, CoreModuleName, IdentifierError};

/// Names derived from one [`AppId`]. Recomputed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedNames {
    /// `FrontBundle`
    pub bundle_class: String,
    /// `FrontKernel`
    pub kernel_class: String,
    /// `FrontCache`
    pub cache_class: String,
    /// `front` (`bin/front`)
    pub binary_entry: String,
    /// `front` (`web/front`)
    pub public_asset_dir: String,
}

pub fn derive_names(app: &AppId) -> DerivedNames {
    let class_base = ucfirst(app.as_str());
    DerivedNames {
        bundle_class: format!("{class_base}Bundle"),
        kernel_class: format!("{class_base}Kernel"),
        cache_class: format!("{class_base}Cache"),
        binary_entry: app.as_str().to_string(),
        public_asset_dir: app.as_str().to_string(),
    }
}

/// Bundle class for any module name, including the core module.
pub fn bundle_class_name(name: &str) -> String {
    format!("{}Bundle", ucfirst(name))
}

/// Upper-case the first character, leave the rest alone.
pub fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Reject names whose derived artifacts would overwrite template files.
pub fn check_reserved(apps: &AppSet, core: &CoreModuleName) -> Result<(), IdentifierError> {
    let names = apps
        .iter()
        .map(AppId::as_str)
        .chain(std::iter::once(core.as_str()));
    for name in names {
        if RESERVED_NAMES.contains(&name) {
            return Err(IdentifierError::Reserved(name.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn derives_all_names() {
        let names = derive_names(&AppId::parse("front").unwrap());
        assert_eq!(
            names,
            DerivedNames {
                bundle_class: "FrontBundle".to_string(),
                kernel_class: "FrontKernel".to_string(),
                cache_class: "FrontCache".to_string(),
                binary_entry: "front".to_string(),
                public_asset_dir: "front".to_string(),
            }
        );
    }

    #[test]
    fn only_first_letter_is_capitalized() {
        let names = derive_names(&AppId::parse("back_office").unwrap());
        assert_eq!(names.kernel_class, "Back_officeKernel");
        assert_eq!(names.binary_entry, "back_office");
        assert_eq!(ucfirst("1st"), "1st");
    }

    #[test]
    fn core_bundle_class() {
        assert_eq!(bundle_class_name("core"), "CoreBundle");
    }

    #[test]
    fn reserved_names_are_rejected() {
        let apps = AppSet::parse(["front", "app"]).unwrap();
        assert_eq!(
            check_reserved(&apps, &CoreModuleName::default()),
            Err(IdentifierError::Reserved("app".to_string()))
        );
        let apps = AppSet::parse(["front"]).unwrap();
        let core = CoreModuleName::parse("ConsoleBundle").unwrap();
        assert_eq!(
            check_reserved(&apps, &core),
            Err(IdentifierError::Reserved("console".to_string()))
        );
    }

    #[test]
    fn runtime_dir_names_are_reserved() {
        for name in ["cache", "logs", "sessions"] {
            let apps = AppSet::parse(["front", name]).unwrap();
            assert_eq!(
                check_reserved(&apps, &CoreModuleName::default()),
                Err(IdentifierError::Reserved(name.to_string()))
            );
        }
    }
}
