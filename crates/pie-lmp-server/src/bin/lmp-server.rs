//! Local Module Proxy bootstrap binary.
//!
//! Deliberately thin: config loading, tracing setup, and binding are the
//! only responsibilities here, so the server can also be embedded directly
//! as a library (`pie_lmp_server::build_router`) without going through a
//! CLI at all.

use anyhow::Result;
use clap::Parser;
use pie_lmp_server::{build_router, watch_monorepo_root, LmpConfig, LmpContext};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "lmp-server")]
#[command(about = "Local Module Proxy: serves rewritten PIE modules for local development")]
struct Cli {
    /// Path to a pie-lmp.toml config file. Falls back to defaults if absent.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind the HTTP listener on.
    #[arg(long, default_value = "127.0.0.1:4310")]
    addr: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = match cli.config {
        Some(path) => LmpConfig::load(&path)?,
        None => LmpConfig::default(),
    };

    let ctx = Arc::new(LmpContext::new(config));

    // Keep the watcher alive for the life of the process; invalidating the
    // readiness cache on FS events is best-effort and non-fatal if it fails
    // (e.g. inotify watch limits on the host).
    let _watcher = match watch_monorepo_root(ctx.clone()) {
        Ok(watcher) => Some(watcher),
        Err(err) => {
            tracing::warn!(%err, "failed to watch monorepo root; falling back to TTL-only readiness cache");
            None
        }
    };

    let app = build_router(ctx);

    tracing::info!(addr = %cli.addr, "lmp-server listening");
    let listener = tokio::net::TcpListener::bind(cli.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
