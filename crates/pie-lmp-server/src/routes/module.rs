use crate::context::LmpContext;
use crate::error::LmpError;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use pie_lmp_resolver::ModuleRequest;
use std::sync::Arc;

/// `GET /<scope>/<name>[@version]/<subpath>` — the proxy's one real route.
/// Pipeline:
/// 1. Gate on readiness.
/// 2. Resolve the request to a file via the Package Resolver.
/// 3. Read and decode the file as UTF-8.
/// 4. Rewrite its import specifiers.
/// 5. Stream the result with `Cache-Control: no-store`.
pub async fn serve_module(
    State(ctx): State<Arc<LmpContext>>,
    Path(namespaced_path): Path<String>,
) -> Result<Response, LmpError> {
    if !ctx.readiness.snapshot().ok {
        return Err(LmpError::ProxyNotReady);
    }

    let req = ModuleRequest::parse(&namespaced_path)
        .ok_or_else(|| LmpError::ResolutionMiss(namespaced_path.clone()))?;

    let resolved_path = ctx.resolver.resolve(&req)?;

    let bytes = std::fs::read(&resolved_path).map_err(|source| LmpError::Io {
        path: resolved_path.display().to_string(),
        source,
    })?;
    let source = String::from_utf8(bytes).map_err(|_| {
        LmpError::ResolutionMiss(format!("{} is not valid UTF-8", resolved_path.display()))
    })?;

    let pkg = format!("{}/{}", req.scope, req.name);
    let subpath = if req.subpath.is_empty() {
        "index.js"
    } else {
        &req.subpath
    };
    let rewrite_ctx = ctx.rewrite_context(&pkg, subpath);
    let rewritten = pie_rewriter::rewrite(&source, &rewrite_ctx);

    Ok((
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        rewritten,
    )
        .into_response())
}
