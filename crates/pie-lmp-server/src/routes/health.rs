use crate::context::LmpContext;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

/// `GET /health` — the readiness snapshot used by the host app to decide
/// whether it is safe to start requesting modules. `200` when `ok`, `503`
/// otherwise.
pub async fn health(State(ctx): State<Arc<LmpContext>>) -> Response {
    let snapshot = ctx.readiness.snapshot();
    let status = if snapshot.ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(snapshot)).into_response()
}
