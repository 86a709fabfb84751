use crate::{ResolverConfig, ScopeKind};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// `{ ok, builtElementPackages, builtLibPackages }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReadinessSnapshot {
    pub ok: bool,
    #[serde(rename = "builtElementPackages")]
    pub built_element_packages: usize,
    #[serde(rename = "builtLibPackages")]
    pub built_lib_packages: usize,
}

/// Scans the configured monorepo roots and caches the result for a short
/// TTL (~1.5s) to bound filesystem scanning under rapid health polling.
pub struct ReadinessProber {
    config: ResolverConfig,
    ttl: Duration,
    cache: Mutex<Option<(Instant, ReadinessSnapshot)>>,
}

impl ReadinessProber {
    pub fn new(config: ResolverConfig) -> Self {
        Self::with_ttl(config, Duration::from_millis(1500))
    }

    pub fn with_ttl(config: ResolverConfig, ttl: Duration) -> Self {
        Self {
            config,
            ttl,
            cache: Mutex::new(None),
        }
    }

    pub fn snapshot(&self) -> ReadinessSnapshot {
        let mut cache = self.cache.lock();
        if let Some((taken_at, snapshot)) = *cache {
            if taken_at.elapsed() < self.ttl {
                return snapshot;
            }
        }
        let snapshot = self.scan();
        *cache = Some((Instant::now(), snapshot));
        snapshot
    }

    /// Drop the cached snapshot so the next call to [`Self::snapshot`]
    /// rescans regardless of TTL. Intended for a filesystem watcher on the
    /// monorepo root so a build finishing is reflected immediately instead
    /// of waiting out the cache window.
    pub fn invalidate(&self) {
        *self.cache.lock() = None;
    }

    fn scan(&self) -> ReadinessSnapshot {
        let built_element_packages = self.count_built_packages(ScopeKind::Element);
        let built_lib_packages = self.count_built_packages(ScopeKind::Library);
        ReadinessSnapshot {
            ok: built_element_packages > 0,
            built_element_packages,
            built_lib_packages,
        }
    }

    fn count_built_packages(&self, kind: ScopeKind) -> usize {
        let mut seen_dirs = std::collections::HashSet::new();
        let mut count = 0;
        for scope in self.config.scopes.iter().filter(|s| s.kind == kind) {
            let packages_dir = self.config.monorepo_root.join(&scope.package_subdir);
            if !seen_dirs.insert(packages_dir.clone()) {
                continue;
            }
            count += count_packages_with_build_output(&packages_dir);
        }
        count
    }
}

fn count_packages_with_build_output(packages_dir: &std::path::Path) -> usize {
    let Ok(entries) = std::fs::read_dir(packages_dir) else {
        return 0;
    };
    entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .filter(|e| has_any_file_under(&e.path().join("dist")))
        .count()
}

fn has_any_file_under(dir: &std::path::Path) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    entries.filter_map(|e| e.ok()).any(|e| e.path().is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResolverConfig;

    #[test]
    fn empty_monorepo_is_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        let prober = ReadinessProber::new(ResolverConfig::default_scopes(dir.path()));
        let snapshot = prober.snapshot();
        assert!(!snapshot.ok);
        assert_eq!(snapshot.built_element_packages, 0);
    }

    #[test]
    fn one_built_element_package_flips_ok_to_true() {
        let dir = tempfile::tempdir().unwrap();
        let dist = dir.path().join("packages/elements-react/hotspot/dist");
        std::fs::create_dir_all(&dist).unwrap();
        std::fs::write(dist.join("index.js"), "export default 1;").unwrap();

        let prober = ReadinessProber::with_ttl(
            ResolverConfig::default_scopes(dir.path()),
            Duration::from_millis(0),
        );
        let snapshot = prober.snapshot();
        assert!(snapshot.ok);
        assert_eq!(snapshot.built_element_packages, 1);
        assert_eq!(snapshot.built_lib_packages, 0);
    }

    #[test]
    fn invalidate_forces_a_rescan_before_ttl_expires() {
        let dir = tempfile::tempdir().unwrap();
        let prober =
            ReadinessProber::with_ttl(ResolverConfig::default_scopes(dir.path()), Duration::from_secs(60));
        let first = prober.snapshot();
        assert!(!first.ok);

        let dist = dir.path().join("packages/elements-react/hotspot/dist");
        std::fs::create_dir_all(&dist).unwrap();
        std::fs::write(dist.join("index.js"), "export default 1;").unwrap();

        prober.invalidate();
        let second = prober.snapshot();
        assert!(second.ok);
    }

    #[test]
    fn snapshot_is_cached_within_ttl() {
        let dir = tempfile::tempdir().unwrap();
        let prober =
            ReadinessProber::with_ttl(ResolverConfig::default_scopes(dir.path()), Duration::from_secs(60));
        let first = prober.snapshot();
        assert!(!first.ok);

        let dist = dir.path().join("packages/elements-react/hotspot/dist");
        std::fs::create_dir_all(&dist).unwrap();
        std::fs::write(dist.join("index.js"), "export default 1;").unwrap();

        // Still within TTL: stale cached snapshot is returned.
        let second = prober.snapshot();
        assert!(!second.ok);
    }
}
