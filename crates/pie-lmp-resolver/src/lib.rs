//! Package Resolver and Readiness Prober for the Local Module Proxy.

mod readiness;
mod resolver;

pub use readiness::{ReadinessProber, ReadinessSnapshot};
pub use resolver::{PackageResolver, ResolveError};

use std::path::PathBuf;

/// Which readiness bucket a scope's packages are counted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Element,
    Library,
    Shared,
}

/// One scope's mapping onto a directory under the monorepo root.
#[derive(Debug, Clone)]
pub struct ScopeMapping {
    /// e.g. `@pie-element`.
    pub scope: String,
    pub kind: ScopeKind,
    /// Directory under the monorepo root containing one subdirectory per
    /// package, e.g. `packages/elements-react`.
    pub package_subdir: String,
    /// Prefix stripped from the package name before joining the directory.
    /// Used by the shared scope (`@pie-shared/shared-foo` -> `foo`).
    pub strip_name_prefix: Option<String>,
}

/// Configuration shared by the resolver and the readiness prober: the
/// sibling monorepo root and its scope -> directory table.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub monorepo_root: PathBuf,
    pub scopes: Vec<ScopeMapping>,
}

impl ResolverConfig {
    /// The four recognized scopes, rooted at `monorepo_root`.
    pub fn default_scopes(monorepo_root: impl Into<PathBuf>) -> Self {
        Self {
            monorepo_root: monorepo_root.into(),
            scopes: vec![
                ScopeMapping {
                    scope: "@pie-element".to_string(),
                    kind: ScopeKind::Element,
                    package_subdir: "packages/elements-react".to_string(),
                    strip_name_prefix: None,
                },
                ScopeMapping {
                    scope: "@pie-lib".to_string(),
                    kind: ScopeKind::Library,
                    package_subdir: "packages/lib-react".to_string(),
                    strip_name_prefix: None,
                },
                ScopeMapping {
                    scope: "@pie-ui".to_string(),
                    kind: ScopeKind::Library,
                    package_subdir: "packages/lib-react".to_string(),
                    strip_name_prefix: None,
                },
                ScopeMapping {
                    scope: "@pie-shared".to_string(),
                    kind: ScopeKind::Shared,
                    package_subdir: "packages/shared".to_string(),
                    strip_name_prefix: Some("shared-".to_string()),
                },
            ],
        }
    }

    pub fn scope(&self, scope: &str) -> Option<&ScopeMapping> {
        self.scopes.iter().find(|s| s.scope == scope)
    }
}

/// A parsed namespaced request path: `/<scope>/<name>[@<version>]/<subpath>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRequest {
    pub scope: String,
    pub name: String,
    /// Parsed but not validated against the filesystem: whatever version is
    /// on disk is served.
    pub version: Option<String>,
    pub subpath: String,
}

impl ModuleRequest {
    /// Parse `@scope/name[@version]/subpath...` (the leading slash of an
    /// HTTP path is expected to already be stripped by the caller).
    pub fn parse(path: &str) -> Option<Self> {
        let mut segments = path.trim_start_matches('/').splitn(3, '/');
        let scope = segments.next()?;
        if !scope.starts_with('@') {
            return None;
        }
        let name_and_version = segments.next()?;
        let subpath = segments.next().unwrap_or("");

        let (name, version) = match name_and_version.split_once('@') {
            Some((name, version)) => (name, Some(version.to_string())),
            None => (name_and_version, None),
        };

        Some(ModuleRequest {
            scope: scope.to_string(),
            name: name.to_string(),
            version,
            subpath: subpath.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scoped_request_with_version_and_subpath() {
        let req = ModuleRequest::parse("/@pie-element/hotspot@1.0.0/controller/index.js").unwrap();
        assert_eq!(req.scope, "@pie-element");
        assert_eq!(req.name, "hotspot");
        assert_eq!(req.version.as_deref(), Some("1.0.0"));
        assert_eq!(req.subpath, "controller/index.js");
    }

    #[test]
    fn parses_request_without_version() {
        let req = ModuleRequest::parse("/@pie-lib/render-ui/index.js").unwrap();
        assert_eq!(req.version, None);
        assert_eq!(req.subpath, "index.js");
    }

    #[test]
    fn parses_request_without_subpath() {
        let req = ModuleRequest::parse("/@pie-lib/render-ui").unwrap();
        assert_eq!(req.subpath, "");
    }

    #[test]
    fn rejects_unscoped_paths() {
        assert!(ModuleRequest::parse("/health").is_none());
    }
}
