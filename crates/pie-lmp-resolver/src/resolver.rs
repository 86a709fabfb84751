use crate::{ModuleRequest, ResolverConfig, ScopeMapping};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// Scope not present in the configured table, or the resolved path does
    /// not exist on disk — both surface as a 404.
    #[error("unresolved module path: {0}")]
    NotFound(String),
    /// The resolved path would escape the configured monorepo root.
    #[error("path traversal rejected: {0}")]
    PathTraversal(String),
}

pub struct PackageResolver {
    config: ResolverConfig,
}

impl PackageResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Resolve a namespaced request to an on-disk file path, or a
    /// [`ResolveError`]. Never touches the filesystem beyond the final
    /// existence check, so callers can distinguish "unresolved" (404) from
    /// "resolved but unreadable" (500) themselves if they read the file.
    pub fn resolve(&self, req: &ModuleRequest) -> Result<PathBuf, ResolveError> {
        let mapping = self
            .config
            .scope(&req.scope)
            .ok_or_else(|| ResolveError::NotFound(req.scope.clone()))?;

        let effective_name = strip_prefix(&req.name, mapping);
        let package_dist_dir = self
            .config
            .monorepo_root
            .join(&mapping.package_subdir)
            .join(effective_name)
            .join("dist");

        let subpath = if req.subpath.is_empty() {
            "index.js"
        } else {
            &req.subpath
        };

        let candidate = confine(&package_dist_dir, subpath)?;

        if !candidate.is_file() {
            return Err(ResolveError::NotFound(candidate.display().to_string()));
        }

        Ok(candidate)
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }
}

fn strip_prefix<'a>(name: &'a str, mapping: &ScopeMapping) -> &'a str {
    match &mapping.strip_name_prefix {
        Some(prefix) => name.strip_prefix(prefix.as_str()).unwrap_or(name),
        None => name,
    }
}

/// Lexically resolve `subpath` under `root` and confirm the result stays
/// under `root`. `..` segments that would climb out of `root` are rejected
/// rather than silently clamped: any `..` traversal that escapes the root
/// is a 400.
fn confine(root: &Path, subpath: &str) -> Result<PathBuf, ResolveError> {
    let mut stack: Vec<&str> = Vec::new();
    for segment in subpath.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if stack.pop().is_none() {
                    return Err(ResolveError::PathTraversal(subpath.to_string()));
                }
            }
            other => stack.push(other),
        }
    }
    Ok(root.join(stack.join("/")))
}
