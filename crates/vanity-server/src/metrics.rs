//! Per-path request and error counters in Prometheus format.

use std::fmt;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use prometheus::core::Collector;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Counters shared by every request handler.
///
/// Cloning is cheap; clones share the same counters.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    requests: IntCounterVec,
    errors: IntCounterVec,
}

impl Metrics {
    /// Create and register `pkg_requests_total` and `pkg_errors_total`.
    ///
    /// # Errors
    ///
    /// Returns a [`prometheus::Error`] if the counters cannot be registered.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("pkg_requests_total", "Number of requests"),
            &["path"],
        )?;
        let errors = IntCounterVec::new(
            Opts::new("pkg_errors_total", "Number of errors"),
            &["path"],
        )?;
        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(errors.clone()))?;

        Ok(Self {
            registry,
            requests,
            errors,
        })
    }

    /// Count a request for `path`.
    pub fn record_request(&self, path: &str) {
        self.requests.with_label_values(&[path]).inc();
    }

    /// Count a failed request for `path`.
    pub fn record_error(&self, path: &str) {
        self.errors.with_label_values(&[path]).inc();
    }

    /// Requests seen so far for `path`. Reading never creates a series.
    pub fn requests(&self, path: &str) -> u64 {
        count(&self.requests, path)
    }

    /// Errors seen so far for `path`. Reading never creates a series.
    pub fn errors(&self, path: &str) -> u64 {
        count(&self.errors, path)
    }

    /// Encode all counters in the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns a [`prometheus::Error`] if encoding fails.
    pub fn encode(&self) -> Result<Vec<u8>, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        Ok(buf)
    }
}

fn count(counters: &IntCounterVec, path: &str) -> u64 {
    let exists = counters
        .collect()
        .iter()
        .flat_map(|family| &family.metric)
        .any(|metric| metric.label.iter().any(|pair| pair.value() == path));
    if exists {
        counters.with_label_values(&[path]).get()
    } else {
        0
    }
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

/// Router exposing `GET /metrics`.
pub fn router(metrics: Metrics) -> Router {
    Router::new()
        .route("/metrics", get(serve_metrics))
        .with_state(metrics)
}

async fn serve_metrics(State(metrics): State<Metrics>) -> Response {
    match metrics.encode() {
        Ok(body) => (
            [(header::CONTENT_TYPE, TextEncoder::new().format_type().to_string())],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
