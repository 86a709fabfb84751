//! LMP Context configuration: monorepo roots, external module CDN base,
//! debug flag, and cache lifetimes.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LmpConfig {
    /// Sibling monorepo root, resolved relative to the host app.
    pub monorepo_root: PathBuf,
    /// Base URL prefixed onto bare external specifiers during rewriting.
    #[serde(default = "default_cdn_base")]
    pub external_cdn_base: String,
    /// Enables verbose request/rewrite logging.
    #[serde(default)]
    pub debug: bool,
    /// Readiness-snapshot cache TTL in milliseconds.
    #[serde(default = "default_readiness_ttl_ms")]
    pub readiness_ttl_ms: u64,
}

impl LmpConfig {
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: LmpConfig = toml::from_str(&raw)?;
        Ok(config)
    }
}

impl Default for LmpConfig {
    fn default() -> Self {
        Self {
            monorepo_root: PathBuf::from(".."),
            external_cdn_base: default_cdn_base(),
            debug: false,
            readiness_ttl_ms: default_readiness_ttl_ms(),
        }
    }
}

fn default_cdn_base() -> String {
    "https://esm.sh".to_string()
}

fn default_readiness_ttl_ms() -> u64 {
    1500
}
