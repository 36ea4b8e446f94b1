//! Package records and validated package names.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// One registered vanity import path and the metadata `go get` needs to find
/// its repository.
///
/// The wire format keeps the field names of the JSON package files this
/// service has always read (`VCS`, `Name`, `URL`, `Source`, `Documentation`);
/// lower-case spellings are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Import path below the host (e.g. `tools/lint`).
    #[serde(rename = "Name", alias = "name")]
    pub name: PackageName,

    /// Version control system tag (e.g. `git`, `hg`).
    #[serde(rename = "VCS", alias = "vcs")]
    pub vcs: String,

    /// Location the VCS tool clones from.
    #[serde(rename = "URL", alias = "url")]
    pub repository_url: String,

    /// Human-browsable source link.
    #[serde(rename = "Source", alias = "source")]
    pub source_url: String,

    /// Human-browsable documentation link.
    #[serde(rename = "Documentation", alias = "documentation")]
    pub documentation_url: String,
}

impl PackageRecord {
    /// Build a record from its five fields.
    pub fn new(
        name: PackageName,
        vcs: impl Into<String>,
        repository_url: impl Into<String>,
        source_url: impl Into<String>,
        documentation_url: impl Into<String>,
    ) -> Self {
        Self {
            name,
            vcs: vcs.into(),
            repository_url: repository_url.into(),
            source_url: source_url.into(),
            documentation_url: documentation_url.into(),
        }
    }
}

/// Errors that can occur when validating a [`PackageName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// The name is the empty string.
    #[error("package name is empty")]
    Empty,

    /// The name starts or ends with `/`.
    #[error("package name '{0}' must not start or end with '/'")]
    EdgeSlash(String),

    /// The name contains an empty segment (`a//b`).
    #[error("package name '{0}' contains an empty path segment")]
    EmptySegment(String),
}

/// A slash-segmented package name.
///
/// Unlike most package managers, vanity paths are case-sensitive: `Tools/x`
/// and `tools/x` are different import paths, so the name is stored as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageName(String);

impl PackageName {
    /// Validate and wrap a package name.
    ///
    /// # Errors
    ///
    /// Returns [`NameError`] if the name is empty, has a leading or trailing
    /// slash, or contains an empty segment.
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        if name.starts_with('/') || name.ends_with('/') {
            return Err(NameError::EdgeSlash(name));
        }
        if name.split('/').any(str::is_empty) {
            return Err(NameError::EmptySegment(name));
        }
        Ok(Self(name))
    }

    /// Return the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the `/`-separated segments of the name.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl std::fmt::Display for PackageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Deref for PackageName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PackageName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for PackageName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PackageName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl TryFrom<String> for PackageName {
    type Error = NameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for PackageName {
    type Error = NameError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<PackageName> for String {
    fn from(name: PackageName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_accepts_nested_paths() {
        let name = PackageName::new("tools/cmd/lint").unwrap();
        assert_eq!(name, "tools/cmd/lint");
        assert_eq!(name.segments().collect::<Vec<_>>(), ["tools", "cmd", "lint"]);
    }

    #[test]
    fn test_name_is_case_sensitive() {
        let upper = PackageName::new("Tools").unwrap();
        let lower = PackageName::new("tools").unwrap();
        assert_ne!(upper, lower);
    }

    #[test]
    fn test_name_rejects_malformed_input() {
        assert_eq!(PackageName::new(""), Err(NameError::Empty));
        assert!(matches!(
            PackageName::new("/lib"),
            Err(NameError::EdgeSlash(_))
        ));
        assert!(matches!(
            PackageName::new("lib/"),
            Err(NameError::EdgeSlash(_))
        ));
        assert!(matches!(
            PackageName::new("a//b"),
            Err(NameError::EmptySegment(_))
        ));
    }

    #[test]
    fn test_record_reads_capitalized_field_names() {
        let json = r#"{
            "VCS": "git",
            "Name": "a/b",
            "URL": "https://x/b.git",
            "Source": "https://x/b",
            "Documentation": "https://x/b/docs"
        }"#;
        let record: PackageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.name, "a/b");
        assert_eq!(record.vcs, "git");
        assert_eq!(record.repository_url, "https://x/b.git");
        assert_eq!(record.source_url, "https://x/b");
        assert_eq!(record.documentation_url, "https://x/b/docs");
    }

    #[test]
    fn test_record_accepts_lowercase_aliases() {
        let json = r#"{
            "vcs": "hg",
            "name": "c",
            "url": "https://x/c",
            "source": "https://x/c/src",
            "documentation": "https://x/c/doc"
        }"#;
        let record: PackageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.vcs, "hg");
        assert_eq!(record.name, "c");
    }

    #[test]
    fn test_record_requires_every_field() {
        let json = r#"{"VCS": "git", "Name": "a", "URL": "https://x/a.git", "Source": "https://x/a"}"#;
        let err = serde_json::from_str::<PackageRecord>(json).unwrap_err();
        assert!(err.to_string().contains("Documentation"));
    }
}
