//! vanity - go-import metadata for vanity import paths
//!
//! Serves one HTML page per registered package carrying the `go-import` meta
//! tag `go get` looks for, plus an index of all packages at `/`.
//!
//! # Architecture
//!
//! - **Fresh registry per request**: the package file is re-read on every
//!   request, so edits are live immediately and no state is shared.
//! - **Pure core**: resolution and rendering live in `vanity-core`; this crate
//!   only maps their outcomes to status codes, logs and metrics.
//! - **Listeners**: TCP (`host:port`) or a Unix socket (`unix:/path`), with
//!   optional Prometheus counters on a second listener.

pub mod config;
pub mod error;
pub mod listen;
pub mod metrics;
pub mod server;

use std::sync::Arc;

pub use config::{Cli, ConfigError, Settings};
pub use error::{PageError, ServeError};
pub use listen::ListenAddr;
pub use metrics::Metrics;
pub use server::{AppState, router};

use vanity_core::{FileSource, RegistrySource};

/// Run the vanity server (and the metrics server, if configured) until
/// shutdown.
///
/// # Errors
///
/// Returns [`ServeError`] if either listener fails to bind or stops with an
/// error.
pub async fn run(settings: Settings) -> Result<(), ServeError> {
    let metrics = Metrics::new()?;
    let source: Arc<dyn RegistrySource> = Arc::new(FileSource::new(&settings.package_file));

    tracing::info!(
        "Serving vanity imports under {} from {}",
        settings.base,
        source.describe()
    );

    let app = router(AppState::new(settings.base, source, metrics.clone()));
    let metrics_app = metrics::router(metrics);

    let imports = listen::serve(&settings.listen, app);
    let secondary = async {
        match &settings.metrics_listen {
            Some(addr) => listen::serve(addr, metrics_app).await,
            None => Ok(()),
        }
    };

    tokio::try_join!(imports, secondary)?;
    Ok(())
}
