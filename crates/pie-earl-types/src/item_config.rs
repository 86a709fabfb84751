use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// tag name -> package reference (`@scope/name@version`), unique per tag,
/// one entry per custom-element tag.
pub type ElementMap = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub id: String,
    pub element: String,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

/// A self-describing, host-provided document naming tags, their package
/// references, per-tag model objects, and the markup skeleton. Never
/// mutated by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemConfig {
    pub markup: String,
    pub elements: ElementMap,
    pub models: Vec<ModelEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ItemConfigError {
    #[error("tag `{0}` appears in markup but has no entry in elements")]
    UnknownMarkupTag(String),
    #[error("model `{id}` refers to element `{element}`, which has no entry in elements")]
    UnknownModelElement { id: String, element: String },
    #[error("duplicate model id `{0}`")]
    DuplicateModelId(String),
}

static CUSTOM_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([a-zA-Z][a-zA-Z0-9]*-[a-zA-Z0-9-]*)").unwrap());

impl ItemConfig {
    /// Enumerate the distinct custom-element tag names referenced in
    /// `markup`.
    pub fn markup_tags(&self) -> impl Iterator<Item = &str> {
        let mut seen = std::collections::BTreeSet::new();
        CUSTOM_TAG_RE
            .captures_iter(&self.markup)
            .filter_map(move |c| c.get(1).map(|m| m.as_str()))
            .filter(move |tag| seen.insert(*tag))
    }

    /// Check the three invariants: every markup tag has an elements entry,
    /// every model's `element` refers to a known tag, and every model id is
    /// unique within the item.
    pub fn validate(&self) -> Result<(), ItemConfigError> {
        for tag in self.markup_tags() {
            if !self.elements.contains_key(tag) {
                return Err(ItemConfigError::UnknownMarkupTag(tag.to_string()));
            }
        }

        let mut seen_ids = std::collections::HashSet::new();
        for model in &self.models {
            if !self.elements.contains_key(&model.element) {
                return Err(ItemConfigError::UnknownModelElement {
                    id: model.id.clone(),
                    element: model.element.clone(),
                });
            }
            if !seen_ids.insert(model.id.as_str()) {
                return Err(ItemConfigError::DuplicateModelId(model.id.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(markup: &str, elements: &[(&str, &str)], models: &[(&str, &str)]) -> ItemConfig {
        ItemConfig {
            markup: markup.to_string(),
            elements: elements
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            models: models
                .iter()
                .map(|(id, element)| ModelEntry {
                    id: id.to_string(),
                    element: element.to_string(),
                    data: Map::new(),
                })
                .collect(),
            id: None,
        }
    }

    #[test]
    fn valid_config_passes() {
        let c = config(
            "<choice-element data-id=\"m1\"></choice-element>",
            &[("choice-element", "@pie-element/choice@1.0.0")],
            &[("m1", "choice-element")],
        );
        assert!(c.validate().is_ok());
    }

    #[test]
    fn markup_tag_without_elements_entry_is_rejected() {
        let c = config("<choice-element></choice-element>", &[], &[]);
        assert_eq!(
            c.validate(),
            Err(ItemConfigError::UnknownMarkupTag("choice-element".to_string()))
        );
    }

    #[test]
    fn model_referring_to_unknown_element_is_rejected() {
        let c = config(
            "<choice-element></choice-element>",
            &[("choice-element", "@pie-element/choice@1.0.0")],
            &[("m1", "other-element")],
        );
        assert!(matches!(
            c.validate(),
            Err(ItemConfigError::UnknownModelElement { .. })
        ));
    }

    #[test]
    fn duplicate_model_ids_are_rejected() {
        let c = config(
            "<choice-element></choice-element>",
            &[("choice-element", "@pie-element/choice@1.0.0")],
            &[("m1", "choice-element"), ("m1", "choice-element")],
        );
        assert_eq!(
            c.validate(),
            Err(ItemConfigError::DuplicateModelId("m1".to_string()))
        );
    }
}
