use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rejections produced while normalizing user-supplied names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    #[error("application name must not be empty")]
    Empty,

    #[error("`{0}` cannot be used as a directory name")]
    InvalidName(String),

    #[error("application `{0}` is listed more than once")]
    Duplicate(String),

    #[error("at least one application is required")]
    NoApps,

    #[error("core module name `{0}` is empty once the `bundle` suffix is removed")]
    EmptyCore(String),

    #[error("core module `{0}` has the same name as one of the applications")]
    CoreClash(String),

    #[error("`{0}` is reserved by the single-app template")]
    Reserved(String),
}

/// A normalized (trimmed, lower-cased) application name.
///
/// The name is used verbatim as a directory name (`apps/<id>`, `web/<id>`)
/// and as the console entry point (`bin/<id>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AppId(String);

impl AppId {
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let name = raw.trim().to_lowercase();
        if name.is_empty() {
            return Err(IdentifierError::Empty);
        }
        check_path_segment(&name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AppId {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AppId> for String {
    fn from(value: AppId) -> Self {
        value.0
    }
}

impl AsRef<str> for AppId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn check_path_segment(name: &str) -> Result<(), IdentifierError> {
    let bad_char = name
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_whitespace() || c.is_control());
    if bad_char || name == "." || name == ".." {
        return Err(IdentifierError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Insertion-ordered set of unique applications.
///
/// Iteration order is the order the names were given in; every per-app
/// stage of a scaffold run follows it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct AppSet(IndexSet<AppId>);

impl AppSet {
    /// Normalize and validate a list of names. Duplicates (after
    /// normalization) and empty names are rejected.
    pub fn parse<I, S>(names: I) -> Result<Self, IdentifierError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = IndexSet::new();
        for raw in names {
            let id = AppId::parse(raw.as_ref())?;
            if set.contains(&id) {
                return Err(IdentifierError::Duplicate(id.0));
            }
            set.insert(id);
        }
        if set.is_empty() {
            return Err(IdentifierError::NoApps);
        }
        Ok(Self(set))
    }

    /// `app1`, `app2`, ... `appN`: the names used when none are supplied.
    pub fn numbered(count: usize) -> Result<Self, IdentifierError> {
        Self::parse((1..=count).map(|n| format!("app{n}")))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AppId> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|id| id.as_str() == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|id| id.0.clone()).collect()
    }
}

impl TryFrom<Vec<String>> for AppSet {
    type Error = IdentifierError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<AppSet> for Vec<String> {
    fn from(value: AppSet) -> Self {
        value.names()
    }
}

impl PartialEq for AppSet {
    fn eq(&self, other: &Self) -> bool {
        self.0.iter().eq(other.0.iter())
    }
}

impl Eq for AppSet {}

impl<'a> IntoIterator for &'a AppSet {
    type Item = &'a AppId;
    type IntoIter = indexmap::set::Iter<'a, AppId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Name of the shared core module, e.g. `CoreBundle` -> `core`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CoreModuleName(String);

impl CoreModuleName {
    /// Input used when nothing is configured.
    pub const DEFAULT_INPUT: &'static str = "CoreBundle";

    /// Lower-case, drop every `bundle` token, trim.
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let name = raw.trim().to_lowercase().replace("bundle", "");
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(IdentifierError::EmptyCore(raw.to_string()));
        }
        check_path_segment(&name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CoreModuleName {
    fn default() -> Self {
        Self("core".to_string())
    }
}

impl TryFrom<String> for CoreModuleName {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CoreModuleName> for String {
    fn from(value: CoreModuleName) -> Self {
        value.0
    }
}

impl AsRef<str> for CoreModuleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CoreModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_id_is_trimmed_and_lowercased() {
        let id = AppId::parse("  Front ").unwrap();
        assert_eq!(id.as_str(), "front");
    }

    #[test]
    fn app_id_rejects_path_like_names() {
        for raw in ["a/b", "..", "a b", "x\\y"] {
            assert!(
                matches!(AppId::parse(raw), Err(IdentifierError::InvalidName(_))),
                "{raw} should be rejected"
            );
        }
        assert_eq!(AppId::parse("   "), Err(IdentifierError::Empty));
    }

    #[test]
    fn app_set_keeps_insertion_order() {
        let set = AppSet::parse(["zeta", "alpha", "mid"]).unwrap();
        assert_eq!(set.names(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn app_set_rejects_normalized_duplicates() {
        let err = AppSet::parse(["Admin", "admin "]).unwrap_err();
        assert_eq!(err, IdentifierError::Duplicate("admin".to_string()));
    }

    #[test]
    fn app_set_requires_one_app() {
        let none: [&str; 0] = [];
        assert_eq!(AppSet::parse(none).unwrap_err(), IdentifierError::NoApps);
        assert_eq!(AppSet::numbered(0).unwrap_err(), IdentifierError::NoApps);
    }

    #[test]
    fn numbered_apps() {
        assert_eq!(AppSet::numbered(3).unwrap().names(), vec!["app1", "app2", "app3"]);
    }

    #[test]
    fn core_name_strips_bundle_token() {
        assert_eq!(CoreModuleName::parse("CoreBundle").unwrap().as_str(), "core");
        assert_eq!(CoreModuleName::parse(" Shared ").unwrap().as_str(), "shared");
        assert_eq!(
            CoreModuleName::parse("Bundle"),
            Err(IdentifierError::EmptyCore("Bundle".to_string()))
        );
    }
}
