//! Request-level tests against the router, without binding a socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;
use vanity_core::{FileSource, RegistrySource, StaticSource};
use vanity_schema::{PackageName, PackageRecord, Registry};
use vanity_server::{AppState, Metrics, router};

const HOST: &str = "example.org";

const REGISTRY_JSON: &str = r#"{
    "a/b": {
        "VCS": "git",
        "Name": "a/b",
        "URL": "https://x/b.git",
        "Source": "https://x/b",
        "Documentation": "https://x/b/docs"
    }
}"#;

struct TestContext {
    state: AppState,
}

impl TestContext {
    fn with_source(source: Arc<dyn RegistrySource>) -> Self {
        let metrics = Metrics::new().expect("failed to create metrics");
        Self {
            state: AppState::new(HOST, source, metrics),
        }
    }

    fn with_registry(registry: Registry) -> Self {
        Self::with_source(Arc::new(StaticSource::new(registry)))
    }

    async fn get(&self, path: &str) -> (StatusCode, Option<String>, String) {
        let response = router(self.state.clone())
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .expect("router is infallible");

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }
}

fn sample_registry() -> Registry {
    Registry::from_json_slice(REGISTRY_JSON.as_bytes()).unwrap()
}

fn record(name: &str) -> PackageRecord {
    PackageRecord::new(
        PackageName::new(name).unwrap(),
        "git",
        format!("https://x/{name}.git"),
        format!("https://x/{name}"),
        format!("https://x/{name}/docs"),
    )
}

#[tokio::test]
async fn test_sub_path_serves_parent_package() {
    let ctx = TestContext::with_registry(sample_registry());
    let (status, content_type, body) = ctx.get("/a/b/sub/pkg").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(body.contains(r#"content="example.org/a/b git https://x/b.git""#));
    assert!(body.contains("Install: go get -u example.org/a/b"));
    assert!(body.contains(r#"href="https://x/b/docs""#));
    assert!(body.contains(r#"href="https://x/b""#));
}

#[tokio::test]
async fn test_go_get_query_is_ignored() {
    let ctx = TestContext::with_registry(sample_registry());
    let (status, _, body) = ctx.get("/a/b?go-get=1").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"content="example.org/a/b git https://x/b.git""#));
}

#[tokio::test]
async fn test_unknown_package_is_404() {
    let ctx = TestContext::with_registry(sample_registry());
    let (status, content_type, body) = ctx.get("/c").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(content_type.unwrap().starts_with("text/plain"));
    assert_eq!(body, "No such package");
    assert_eq!(ctx.state.metrics().errors("/c"), 0);
}

#[tokio::test]
async fn test_slash_only_path_is_404() {
    let ctx = TestContext::with_registry(sample_registry());
    let (status, _, body) = ctx.get("//").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "No such package");
}

#[tokio::test]
async fn test_percent_encoded_path_resolves() {
    let registry: Registry = [record("café")].into_iter().collect();
    let ctx = TestContext::with_registry(registry);
    let (status, _, body) = ctx.get("/caf%C3%A9/sub").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("go get -u example.org/café"));
}

#[tokio::test]
async fn test_empty_registry_index_has_no_items() {
    let ctx = TestContext::with_registry(Registry::new());
    let (status, _, body) = ctx.get("/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<ul>"));
    assert!(!body.contains("<li>"));
}

#[tokio::test]
async fn test_index_lists_packages_sorted() {
    let registry: Registry = ["zeta", "alpha/sub", "Beta", "alpha"]
        .into_iter()
        .map(record)
        .collect();
    let ctx = TestContext::with_registry(registry);
    let (status, _, body) = ctx.get("/").await;

    assert_eq!(status, StatusCode::OK);
    let items: Vec<&str> = body
        .lines()
        .filter_map(|line| line.trim().strip_prefix("<li><a href=\""))
        .filter_map(|rest| rest.split('"').next())
        .collect();
    assert_eq!(items, vec!["Beta", "alpha", "alpha/sub", "zeta"]);
}

#[tokio::test]
async fn test_load_failure_is_500_with_message() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("packages.json");
    std::fs::write(&path, r#"{"a": {"VCS": "git", "Name": "a"}}"#).unwrap();

    let ctx = TestContext::with_source(Arc::new(FileSource::new(&path)));

    for request_path in ["/", "/a"] {
        let (status, content_type, body) = ctx.get(request_path).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(content_type.unwrap().starts_with("text/plain"));
        assert!(body.contains("failed to parse package registry"), "{body}");
        assert_eq!(ctx.state.metrics().errors(request_path), 1);
    }
}

#[tokio::test]
async fn test_missing_file_is_500() {
    let dir = TempDir::new().unwrap();
    let ctx = TestContext::with_source(Arc::new(FileSource::new(dir.path().join("gone.json"))));
    let (status, _, body) = ctx.get("/a/b").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("gone.json"));
}

#[tokio::test]
async fn test_registry_edits_apply_to_next_request() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("packages.json");
    std::fs::write(&path, "{}").unwrap();
    let ctx = TestContext::with_source(Arc::new(FileSource::new(&path)));

    let (status, _, _) = ctx.get("/a/b").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    std::fs::write(&path, REGISTRY_JSON).unwrap();
    let (status, _, _) = ctx.get("/a/b").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unusual_record_fields_are_served_as_given() {
    let mut odd = record("a");
    odd.repository_url = "https://x/a repo.git".to_string();
    odd.vcs = String::new();
    let registry: Registry = [odd].into_iter().collect();
    let ctx = TestContext::with_registry(registry);

    let (status, _, body) = ctx.get("/a").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"content="example.org/a  https://x/a repo.git""#));
    assert_eq!(ctx.state.metrics().errors("/a"), 0);
}

#[tokio::test]
async fn test_requests_are_counted_per_path() {
    let ctx = TestContext::with_registry(sample_registry());
    ctx.get("/a/b").await;
    ctx.get("/a/b").await;
    ctx.get("/").await;
    ctx.get("/nope").await;

    let metrics = ctx.state.metrics();
    assert_eq!(metrics.requests("/a/b"), 2);
    assert_eq!(metrics.requests("/"), 1);
    assert_eq!(metrics.requests("/nope"), 1);
    assert_eq!(metrics.errors("/a/b"), 0);
}

#[tokio::test]
async fn test_encoded_and_plain_paths_share_a_counter() {
    let ctx = TestContext::with_registry(sample_registry());
    let (status, _, _) = ctx.get("/a%2Fb").await;
    assert_eq!(status, StatusCode::OK);
    ctx.get("/a/b").await;
    ctx.get("/caf%C3%A9").await;

    let metrics = ctx.state.metrics();
    assert_eq!(metrics.requests("/a/b"), 2);
    assert_eq!(metrics.requests("/a%2Fb"), 0);
    assert_eq!(metrics.requests("/café"), 1);
    assert_eq!(metrics.errors("/café"), 0);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let metrics = Metrics::new().unwrap();
    metrics.record_request("/a/b");

    let response = vanity_server::metrics::router(metrics)
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains(r#"pkg_requests_total{path="/a/b"} 1"#));
}
