use serde::{Deserialize, Serialize};

/// Which of the three mechanisms EARL used to bring a tag into existence.
/// The DOM-facing attribute names (`esm`, `iife`, `preloaded`) map onto the
/// strategies: `Esm` is namespaced-modules, `Iife` is global-bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Esm,
    Iife,
    Preloaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Resolving,
    Registered,
    Failed,
}

/// Process-wide (per browser tab) record of one tag's load. The loader
/// owns a map keyed by tag name;
/// re-registration against a different package reference is refused, not
/// overwritten.
#[derive(Debug, Clone)]
pub struct RegisteredTagRecord {
    pub tag_name: String,
    pub package_name: String,
    pub version: String,
    pub strategy: Strategy,
    pub state: LoadState,
    /// Global name the controller was found under, if the load produced
    /// one (`view`/`evaluate` modes require this to be populated).
    pub controller_name: Option<String>,
}

impl RegisteredTagRecord {
    pub fn resolving(tag_name: impl Into<String>, package_name: impl Into<String>, version: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            tag_name: tag_name.into(),
            package_name: package_name.into(),
            version: version.into(),
            strategy,
            state: LoadState::Resolving,
            controller_name: None,
        }
    }

    /// The package reference this record was registered against, in
    /// `@scope/name@version` form, used for the idempotency/refusal check
    /// here.
    pub fn package_reference(&self) -> String {
        format!("{}@{}", self.package_name, self.version)
    }
}
