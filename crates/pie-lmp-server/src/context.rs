use crate::config::LmpConfig;
use pie_lmp_resolver::{PackageResolver, ReadinessProber, ResolverConfig};
use pie_rewriter::RewriteContext;
use std::time::Duration;

/// Bound config (roots, external module CDN base, debug flag) plus the
/// resolver and readiness prober built from it.
pub struct LmpContext {
    pub config: LmpConfig,
    pub resolver: PackageResolver,
    pub readiness: ReadinessProber,
}

impl LmpContext {
    pub fn new(config: LmpConfig) -> Self {
        let resolver_config = ResolverConfig::default_scopes(config.monorepo_root.clone());
        let readiness = ReadinessProber::with_ttl(
            resolver_config.clone(),
            Duration::from_millis(config.readiness_ttl_ms),
        );
        let resolver = PackageResolver::new(resolver_config);
        Self {
            config,
            resolver,
            readiness,
        }
    }

    pub fn rewrite_context(&self, pkg: &str, subpath: &str) -> RewriteContext {
        RewriteContext::new(self.config.external_cdn_base.clone()).with_pkg(pkg, subpath)
    }
}
