//! The in-memory package registry.
//!
//! A registry is built from scratch for every request and never mutated
//! afterwards; loaders only ever produce a complete one or fail.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::types::{PackageName, PackageRecord};

/// Errors raised while building a [`Registry`] from its serialized form.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The document is not valid JSON, or an entry is missing a field or
    /// carries an invalid name.
    #[error("failed to parse package registry: {0}")]
    Parse(#[from] serde_json::Error),

    /// An entry's `Name` differs from the key it is registered under.
    #[error("package registered as '{key}' declares name '{name}'")]
    NameMismatch {
        /// Key the entry is stored under.
        key: String,
        /// Name the entry itself declares.
        name: String,
    },
}

/// Mapping from package name to [`PackageRecord`].
///
/// Iteration is always in byte-wise name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    packages: BTreeMap<PackageName, PackageRecord>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a registry from a JSON object keyed by package name.
    ///
    /// One bad entry fails the whole registry: serving a partial list could
    /// send `go get` to the wrong repository.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Parse`] for malformed JSON, missing fields or
    /// invalid names, and [`RegistryError::NameMismatch`] if an entry's name
    /// differs from its key.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, RegistryError> {
        let raw: BTreeMap<String, PackageRecord> = serde_json::from_slice(bytes)?;

        let mut registry = Self::new();
        for (key, record) in raw {
            if record.name != key.as_str() {
                return Err(RegistryError::NameMismatch {
                    key,
                    name: record.name.into(),
                });
            }
            registry.insert(record);
        }
        Ok(registry)
    }

    /// Insert or replace the record registered under `record.name`.
    pub fn insert(&mut self, record: PackageRecord) -> Option<PackageRecord> {
        self.packages.insert(record.name.clone(), record)
    }

    /// Exact-name lookup.
    pub fn get(&self, name: &str) -> Option<&PackageRecord> {
        self.packages.get(name)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// Number of registered packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether the registry has no packages.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Iterate over records in name order.
    pub fn iter(&self) -> impl Iterator<Item = &PackageRecord> {
        self.packages.values()
    }
}

impl FromIterator<PackageRecord> for Registry {
    fn from_iter<I: IntoIterator<Item = PackageRecord>>(iter: I) -> Self {
        let mut registry = Self::new();
        for record in iter {
            registry.insert(record);
        }
        registry
    }
}
