use pie_earl_types::Strategy;
use thiserror::Error;

/// A parsed `@scope/name@version` package reference.
/// `version` is forwarded verbatim, including symbolic channels like
/// `latest`/`esmbeta` and never canonicalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReference {
    pub scope: String,
    pub name: String,
    pub version: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed package reference `{0}`: expected @scope/name@version")]
pub struct PackageReferenceParseError(pub String);

impl PackageReference {
    pub fn parse(raw: &str) -> Result<Self, PackageReferenceParseError> {
        let rest = raw
            .strip_prefix('@')
            .ok_or_else(|| PackageReferenceParseError(raw.to_string()))?;
        let (scope, after_scope) = rest
            .split_once('/')
            .ok_or_else(|| PackageReferenceParseError(raw.to_string()))?;
        let (name, version) = after_scope
            .split_once('@')
            .ok_or_else(|| PackageReferenceParseError(raw.to_string()))?;
        if scope.is_empty() || name.is_empty() || version.is_empty() {
            return Err(PackageReferenceParseError(raw.to_string()));
        }
        Ok(Self {
            scope: format!("@{scope}"),
            name: name.to_string(),
            version: version.to_string(),
        })
    }

    pub fn package_name(&self) -> String {
        format!("{}/{}", self.scope, self.name)
    }

    pub fn reference(&self) -> String {
        format!("{}/{}@{}", self.scope, self.name, self.version)
    }
}

/// `view` query parameter recognized by the namespaced-modules and
/// global-bundle strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Delivery,
    Author,
    Print,
}

/// Strategy selector flags. `cdn_base` only applies to
/// `Strategy::Esm`, `bundle_host` only to `Strategy::Iife`.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    pub strategy: Strategy,
    pub cdn_base: Option<String>,
    pub bundle_host: Option<String>,
    pub view: ViewMode,
    pub load_controllers: bool,
}

impl LoaderOptions {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            cdn_base: None,
            bundle_host: None,
            view: ViewMode::Delivery,
            load_controllers: true,
        }
    }
}

/// `choice-element` -> `choiceElement`-style controller global name, derived
/// from a package name by the documented kebab-to-dot transformation
/// each `-`-joined segment of
/// the package name joins the next with `.` instead.
pub fn controller_global_name(package_name: &str) -> String {
    package_name
        .trim_start_matches('@')
        .split(|c| c == '/' || c == '-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scoped_versioned_reference() {
        let r = PackageReference::parse("@pie-element/hotspot@1.0.0").unwrap();
        assert_eq!(r.scope, "@pie-element");
        assert_eq!(r.name, "hotspot");
        assert_eq!(r.version, "1.0.0");
    }

    #[test]
    fn parses_symbolic_version_verbatim() {
        let r = PackageReference::parse("@pie-element/hotspot@latest").unwrap();
        assert_eq!(r.version, "latest");
    }

    #[test]
    fn rejects_unscoped_reference() {
        assert!(PackageReference::parse("hotspot@1.0.0").is_err());
    }

    #[test]
    fn controller_global_name_joins_segments_with_dots() {
        assert_eq!(
            controller_global_name("@pie-element/multiple-choice"),
            "pie.element.multiple.choice"
        );
    }
}
