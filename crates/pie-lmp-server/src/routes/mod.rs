mod health;
mod module;

use crate::context::LmpContext;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(ctx: Arc<LmpContext>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/*namespaced_path", get(module::serve_module))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
