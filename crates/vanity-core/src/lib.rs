//! Core library for the vanity import path service.
//!
//! - [`source`] loads a fresh [`Registry`](vanity_schema::Registry) per request.
//! - [`resolver`] maps a request path to the longest registered package name.
//! - [`render`] turns a resolved package (or the whole registry) into HTML.
//!
//! Nothing here touches HTTP, metrics or global state: the server crate owns
//! those decisions and passes the registry in explicitly.

pub mod render;
pub mod resolver;
pub mod source;

pub use render::{RenderError, render_index, render_package};
pub use resolver::resolve;
pub use source::{FileSource, LoadError, RegistrySource, StaticSource};
