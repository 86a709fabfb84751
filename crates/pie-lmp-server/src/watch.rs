//! Optional filesystem watcher over the monorepo root. When a build
//! finishes, invalidating the readiness cache immediately means `/health`
//! reflects it on the next request instead of waiting out the TTL window.
//! Strictly a dev-loop convenience: the cache-TTL behavior in
//! `pie_lmp_resolver` is correct on its own without a watcher running.

use crate::context::LmpContext;
use notify::{RecursiveMode, Watcher};
use std::sync::Arc;

/// Spawn a background thread watching `ctx.config.monorepo_root` and
/// invalidating `ctx.readiness`'s cache on every filesystem event. Returns
/// the `Watcher` handle; dropping it stops watching.
pub fn watch_monorepo_root(ctx: Arc<LmpContext>) -> notify::Result<notify::RecommendedWatcher> {
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
        Ok(_event) => ctx.readiness.invalidate(),
        Err(err) => tracing::warn!(%err, "monorepo root watch error"),
    })?;
    watcher.watch(&ctx.config.monorepo_root, RecursiveMode::Recursive)?;
    Ok(watcher)
}
