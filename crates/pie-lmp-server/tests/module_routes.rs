use axum::body::Body;
use axum::http::{Request, StatusCode};
use pie_lmp_server::{build_router, LmpConfig, LmpContext};
use std::sync::Arc;
use tower::ServiceExt;

fn ctx_over(monorepo_root: std::path::PathBuf) -> Arc<LmpContext> {
    let config = LmpConfig {
        monorepo_root,
        external_cdn_base: "https://esm.sh".to_string(),
        debug: false,
        readiness_ttl_ms: 0,
    };
    Arc::new(LmpContext::new(config))
}

#[tokio::test]
async fn module_request_is_rejected_before_monorepo_is_built() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(ctx_over(dir.path().to_path_buf()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/@pie-element/hotspot/index.js")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn module_request_is_resolved_and_rewritten_once_built() {
    let dir = tempfile::tempdir().unwrap();
    let dist = dir.path().join("packages/elements-react/hotspot/dist");
    std::fs::create_dir_all(&dist).unwrap();
    std::fs::write(
        dist.join("index.js"),
        r#"import { render } from "@pie-lib/render-ui"; import("./lazy.js");"#,
    )
    .unwrap();

    let app = build_router(ctx_over(dir.path().to_path_buf()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/@pie-element/hotspot@1.0.0/index.js")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok()),
        Some("no-store")
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains(r#"from "/@pie-lib/render-ui""#));
    assert!(text.contains(r#"import("/@pie-element/hotspot/lazy.js")"#));
}

#[tokio::test]
async fn unknown_package_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let dist = dir.path().join("packages/elements-react/hotspot/dist");
    std::fs::create_dir_all(&dist).unwrap();
    std::fs::write(dist.join("index.js"), "export default 1;").unwrap();

    let app = build_router(ctx_over(dir.path().to_path_buf()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/@pie-element/does-not-exist/index.js")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_endpoint_reports_readiness_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(ctx_over(dir.path().to_path_buf()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["ok"], false);
    assert_eq!(json["builtElementPackages"], 0);
}

#[tokio::test]
async fn health_endpoint_returns_200_once_built() {
    let dir = tempfile::tempdir().unwrap();
    let dist = dir.path().join("packages/elements-react/hotspot/dist");
    std::fs::create_dir_all(&dist).unwrap();
    std::fs::write(dist.join("index.js"), "export default 1;").unwrap();

    let app = build_router(ctx_over(dir.path().to_path_buf()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["ok"], true);
    assert_eq!(json["builtElementPackages"], 1);
}
