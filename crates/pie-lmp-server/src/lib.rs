//! The Local Module Proxy: an embeddable HTTP server that serves JS modules
//! out of sibling monorepo build outputs, rewriting import specifiers and
//! gating requests on build readiness.

pub mod config;
pub mod context;
pub mod error;
mod routes;
pub mod watch;

pub use config::LmpConfig;
pub use context::LmpContext;
pub use routes::build_router;
pub use watch::watch_monorepo_root;
