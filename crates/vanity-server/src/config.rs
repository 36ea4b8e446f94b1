//! Process configuration, read from flags or the environment.
//!
//! Every value can be given as a flag, but deployments normally set the
//! environment variables (`PKGBASE`, `PKGFILE`, `LISTEN`, ...). Raw values are
//! checked by [`Cli::into_settings`] before anything binds.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::listen::ListenAddr;

/// Listen address used when `LISTEN` is unset or empty.
pub const DEFAULT_LISTEN: &str = ":8080";

/// Permission mode for Unix sockets when `LISTEN_SOCKET_MODE` is unset.
pub const DEFAULT_SOCKET_MODE: u32 = 0o660;

/// Configuration errors, reported before the server starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `PKGBASE` is unset or empty.
    #[error("Please specify a valid base with the PKGBASE environment variable")]
    MissingBase,

    /// `PKGFILE` is unset or empty.
    #[error("Please specify a valid package file with the PKGFILE environment variable")]
    MissingPackageFile,

    /// A listen address could not be parsed.
    #[error("Invalid listen address '{value}': {reason}")]
    InvalidListen {
        /// The address as given.
        value: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The socket mode is not an octal permission mode.
    #[error("Invalid socket mode '{0}': expected an octal mode such as 0660")]
    InvalidSocketMode(String),
}

/// Raw command line and environment values.
#[derive(Debug, Parser)]
#[command(name = "vanity")]
#[command(
    version,
    about = "Serve go-import metadata for vanity import paths",
    long_about = None,
    after_help = "Listen addresses are host:port, :port, or unix:/path/to/socket."
)]
pub struct Cli {
    /// The base of the vanity import paths, e.g. "honnef.co/go"
    #[arg(long, env = "PKGBASE")]
    pub base: Option<String>,

    /// Path to a JSON file describing all known packages
    #[arg(long = "package-file", env = "PKGFILE")]
    pub package_file: Option<PathBuf>,

    /// Where to serve the vanity imports [default: :8080]
    #[arg(long, env = "LISTEN")]
    pub listen: Option<String>,

    /// Octal permission mode for Unix socket listeners [default: 0660]
    #[arg(long = "socket-mode", env = "LISTEN_SOCKET_MODE")]
    pub socket_mode: Option<String>,

    /// Where to serve Prometheus metrics; empty disables them
    #[arg(long, env = "PROMETHEUS")]
    pub prometheus: Option<String>,
}

/// Validated configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Host (and optional path prefix) every import path is served under.
    pub base: String,
    /// JSON package file, re-read on every request.
    pub package_file: PathBuf,
    /// Address for the vanity import handler.
    pub listen: ListenAddr,
    /// Address for the metrics endpoint, if enabled.
    pub metrics_listen: Option<ListenAddr>,
}

impl Cli {
    /// Check the raw values and turn them into [`Settings`].
    ///
    /// Empty and whitespace-only values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the base or package file is missing, a
    /// listen address is malformed, or the socket mode is not valid octal.
    pub fn into_settings(self) -> Result<Settings, ConfigError> {
        let base = non_empty(self.base)
            .map(|b| b.trim_end_matches('/').to_string())
            .filter(|b| !b.is_empty())
            .ok_or(ConfigError::MissingBase)?;

        let package_file = self
            .package_file
            .filter(|p| !p.as_os_str().to_string_lossy().trim().is_empty())
            .ok_or(ConfigError::MissingPackageFile)?;

        let socket_mode = match non_empty(self.socket_mode) {
            Some(raw) => parse_socket_mode(&raw)?,
            None => DEFAULT_SOCKET_MODE,
        };

        let listen = non_empty(self.listen).unwrap_or_else(|| DEFAULT_LISTEN.to_string());
        let listen = ListenAddr::parse(&listen, socket_mode)?;

        let metrics_listen = non_empty(self.prometheus)
            .map(|raw| ListenAddr::parse(&raw, socket_mode))
            .transpose()?;

        Ok(Settings {
            base,
            package_file,
            listen,
            metrics_listen,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_socket_mode(raw: &str) -> Result<u32, ConfigError> {
    let digits = raw.strip_prefix("0o").unwrap_or(raw);
    match u32::from_str_radix(digits, 8) {
        Ok(mode) if mode <= 0o777 => Ok(mode),
        _ => Err(ConfigError::InvalidSocketMode(raw.to_string())),
    }
}
