//! The HTTP boundary: loads the registry, resolves, renders, and decides
//! status codes, logging and metrics.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::Uri;
use axum::response::{Html, IntoResponse, Response};
use percent_encoding::percent_decode_str;
use vanity_core::{RegistrySource, render_index, render_package, resolve};

use crate::error::PageError;
use crate::metrics::Metrics;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    base: String,
    source: Arc<dyn RegistrySource>,
    metrics: Metrics,
}

impl AppState {
    /// Serve packages from `source` under the import path prefix `base`.
    pub fn new(base: impl Into<String>, source: Arc<dyn RegistrySource>, metrics: Metrics) -> Self {
        Self {
            inner: Arc::new(Inner {
                base: base.into(),
                source,
                metrics,
            }),
        }
    }

    /// The import path prefix.
    pub fn base(&self) -> &str {
        &self.inner.base
    }

    /// Request and error counters.
    pub fn metrics(&self) -> &Metrics {
        &self.inner.metrics
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("base", &self.inner.base)
            .field("source", &self.inner.source.describe())
            .finish_non_exhaustive()
    }
}

/// Router answering every path: `/` is the index, anything else a package.
pub fn router(state: AppState) -> Router {
    Router::new().fallback(handle).with_state(state)
}

async fn handle(State(state): State<AppState>, uri: Uri) -> Response {
    let path = uri.path();
    // `/a%2Fb` and `/a/b` are the same page and share one series.
    let label = percent_decode_str(path).decode_utf8_lossy();
    state.metrics().record_request(&label);

    match page(&state, path).await {
        Ok(body) => Html(body).into_response(),
        Err(err) => {
            if err.is_failure() {
                state.metrics().record_error(&label);
                tracing::error!(path = %label, "{}", err);
            } else {
                tracing::debug!(path = %label, "No such package");
            }
            err.into_response()
        }
    }
}

/// Build the page for one request. The registry lives only for this call.
async fn page(state: &AppState, path: &str) -> Result<String, PageError> {
    let registry = state.inner.source.load().await?;

    if path == "/" {
        return Ok(render_index(&registry)?);
    }

    let import_path = decode_path(path).ok_or(PageError::NotFound)?;
    let record = resolve(&import_path, &registry).ok_or(PageError::NotFound)?;
    Ok(render_package(state.base(), record)?)
}

/// Strip the leading slash and percent-decode. Paths that do not decode to
/// UTF-8 cannot name a package.
fn decode_path(path: &str) -> Option<String> {
    let raw = path.strip_prefix('/').unwrap_or(path);
    percent_decode_str(raw)
        .decode_utf8()
        .ok()
        .map(std::borrow::Cow::into_owned)
}
