use serde::{Deserialize, Serialize};

/// Client-side mirror of `pie_lmp_resolver::ReadinessSnapshot`'s wire shape.
/// EARL never links the native LMP resolver crate (it runs in the browser);
/// it talks to `/health` over HTTP and deserializes this instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessSnapshot {
    pub ok: bool,
    #[serde(rename = "builtElementPackages")]
    pub built_element_packages: usize,
    #[serde(rename = "builtLibPackages")]
    pub built_lib_packages: usize,
}
