//! Listener addresses and the serve loop over TCP or Unix sockets.

use std::fmt;
use std::path::PathBuf;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::ConfigError;
use crate::error::ServeError;

/// Prefix that selects a Unix-domain socket listener.
pub const UNIX_PREFIX: &str = "unix:";

/// Where a server accepts connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenAddr {
    /// `host:port`; an empty host (`:8080`) binds `[::]`, which accepts IPv4
    /// too unless the OS makes IPv6 sockets v6-only.
    Tcp(String),
    /// A filesystem socket, chmod-ed to `mode` after binding.
    Unix {
        /// Socket path.
        path: PathBuf,
        /// Permission bits applied to the socket file.
        mode: u32,
    },
}

impl ListenAddr {
    /// Parse `host:port`, `:port` or `unix:<path>`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidListen`] if the port is missing or not a
    /// number, or the socket path is empty.
    pub fn parse(raw: &str, socket_mode: u32) -> Result<Self, ConfigError> {
        let invalid = |reason| ConfigError::InvalidListen {
            value: raw.to_string(),
            reason,
        };

        if let Some(path) = raw.strip_prefix(UNIX_PREFIX) {
            if path.is_empty() {
                return Err(invalid("missing socket path"));
            }
            return Ok(Self::Unix {
                path: PathBuf::from(path),
                mode: socket_mode,
            });
        }

        let (host, port) = raw.rsplit_once(':').ok_or_else(|| invalid("missing port"))?;
        port.parse::<u16>().map_err(|_| invalid("port is not a number"))?;

        let host = if host.is_empty() { "[::]" } else { host };
        Ok(Self::Tcp(format!("{host}:{port}")))
    }
}

impl fmt::Display for ListenAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp(addr) => write!(f, "{addr}"),
            Self::Unix { path, .. } => write!(f, "{UNIX_PREFIX}{}", path.display()),
        }
    }
}

/// Bind `addr` and serve `app` until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns [`ServeError`] if binding, setting socket permissions, or the
/// accept loop fails.
pub async fn serve(addr: &ListenAddr, app: Router) -> Result<(), ServeError> {
    match addr {
        ListenAddr::Tcp(host_port) => {
            let listener = TcpListener::bind(host_port)
                .await
                .map_err(|source| ServeError::Bind {
                    addr: addr.to_string(),
                    source,
                })?;
            tracing::info!("Listening on {}", addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        ListenAddr::Unix { path, mode } => {
            serve_unix(path, *mode, app).await?;
        }
    }
    Ok(())
}

#[cfg(unix)]
async fn serve_unix(path: &std::path::Path, mode: u32, app: Router) -> Result<(), ServeError> {
    use std::os::unix::fs::{FileTypeExt, PermissionsExt};
    use tokio::net::UnixListener;

    // Only a leftover socket may be replaced, never a regular file.
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_socket() => {
            tracing::debug!("Removing stale socket {}", path.display());
            std::fs::remove_file(path)?;
        }
        Ok(_) => {
            return Err(ServeError::NotASocket(path.to_path_buf()));
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let listener = UnixListener::bind(path).map_err(|source| ServeError::Bind {
        addr: format!("{UNIX_PREFIX}{}", path.display()),
        source,
    })?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).map_err(|source| {
        ServeError::SocketPermissions {
            path: path.to_path_buf(),
            source,
        }
    })?;
    tracing::info!("Listening on {UNIX_PREFIX}{} (mode {mode:o})", path.display());

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!("Failed to remove socket {}: {}", path.display(), e);
    }
    result.map_err(ServeError::from)
}

#[cfg(not(unix))]
async fn serve_unix(path: &std::path::Path, _mode: u32, _app: Router) -> Result<(), ServeError> {
    Err(ServeError::UnsupportedListener(format!(
        "{UNIX_PREFIX}{}",
        path.display()
    )))
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM. A signal that cannot be
/// installed never fires; the other one still can.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => {}
        () = terminate() => {}
    }
    tracing::info!("Shutting down");
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::warn!("Failed to listen for SIGTERM: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
