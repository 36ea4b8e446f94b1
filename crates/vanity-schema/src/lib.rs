//! Shared data model for the vanity import path service.
//!
//! A [`Registry`] maps slash-segmented package names (e.g. `tools/lint`) to
//! the [`PackageRecord`] that tells `go get` where the real repository lives.

pub mod index;
pub mod types;

// Re-exports
pub use index::{Registry, RegistryError};
pub use types::*;
