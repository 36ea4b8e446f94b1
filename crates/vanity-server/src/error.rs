//! Domain-specific errors for serving vanity import paths

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use vanity_core::{LoadError, RenderError};

use crate::config::ConfigError;

/// Why a single request could not be answered with a page.
#[derive(Error, Debug)]
pub enum PageError {
    /// No prefix of the path is a registered package.
    #[error("No such package")]
    NotFound,

    /// The registry could not be loaded for this request.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The page could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl PageError {
    /// HTTP status the boundary answers with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Load(_) | Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this outcome counts as a server-side failure (logged and
    /// counted), as opposed to ordinary traffic for unknown paths.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::NotFound)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Failures that stop the server from starting or keep it from running.
#[derive(Error, Debug)]
pub enum ServeError {
    /// Configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The metrics registry could not be set up.
    #[error("Metrics setup failed: {0}")]
    Metrics(#[from] prometheus::Error),

    /// A listener could not be bound.
    #[error("Failed to listen on {addr}: {source}")]
    Bind {
        /// Address as configured.
        addr: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The socket was bound but its permissions could not be set.
    #[error("Failed to set permissions on {}: {source}", path.display())]
    SocketPermissions {
        /// Socket path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Something other than a socket exists at the socket path.
    #[error("Refusing to replace {}: not a socket", .0.display())]
    NotASocket(PathBuf),

    /// The listener kind is not available on this platform.
    #[error("Unsupported listener on this platform: {0}")]
    UnsupportedListener(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
