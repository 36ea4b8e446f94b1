//! Registry loading.
//!
//! The registry is re-read on every request so that editing the package file
//! takes effect immediately, without a reload signal or restart.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use vanity_schema::{Registry, RegistryError};

/// Failure to produce a registry for the current request.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The backing store could not be read.
    #[error("failed to read package file {}: {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The backing store was read but is not a valid registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Something that can produce the current registry on demand.
#[async_trait]
pub trait RegistrySource: Send + Sync {
    /// Human-readable description of where packages come from (for logs).
    fn describe(&self) -> String;

    /// Load a complete registry, or fail as a whole.
    async fn load(&self) -> Result<Registry, LoadError>;
}

/// Reads a JSON package file from disk on every call.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Create a source reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the package file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RegistrySource for FileSource {
    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }

    async fn load(&self) -> Result<Registry, LoadError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| LoadError::Io {
                path: self.path.clone(),
                source,
            })?;

        let registry = Registry::from_json_slice(&bytes)?;
        tracing::debug!(
            "Loaded {} packages from {}",
            registry.len(),
            self.path.display()
        );
        Ok(registry)
    }
}

/// A fixed, in-memory registry. Every load hands out a fresh copy.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    registry: Registry,
}

impl StaticSource {
    /// Serve `registry` on every load.
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl RegistrySource for StaticSource {
    fn describe(&self) -> String {
        format!("static:{} packages", self.registry.len())
    }

    async fn load(&self) -> Result<Registry, LoadError> {
        Ok(self.registry.clone())
    }
}
