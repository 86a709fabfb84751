//! LMP-side error taxonomy (`ProxyNotReady`, `ResolutionMiss`, plus
//! filesystem 500s) mapped onto HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pie_lmp_resolver::ResolveError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmpError {
    #[error("proxy not ready: run the upstream build")]
    ProxyNotReady,
    #[error("unresolved module path: {0}")]
    ResolutionMiss(String),
    #[error("path traversal rejected: {0}")]
    PathTraversal(String),
    #[error("failed to read resolved module at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<ResolveError> for LmpError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound(path) => LmpError::ResolutionMiss(path),
            ResolveError::PathTraversal(path) => LmpError::PathTraversal(path),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    hint: Option<String>,
}

impl IntoResponse for LmpError {
    fn into_response(self) -> Response {
        let (status, hint) = match &self {
            LmpError::ProxyNotReady => (
                StatusCode::SERVICE_UNAVAILABLE,
                Some("not ready: run the upstream build".to_string()),
            ),
            LmpError::ResolutionMiss(_) => (StatusCode::NOT_FOUND, None),
            LmpError::PathTraversal(_) => (StatusCode::BAD_REQUEST, None),
            LmpError::Io { .. } => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };
        let body = ErrorBody {
            error: self.to_string(),
            hint,
        };
        (status, axum::Json(body)).into_response()
    }
}
