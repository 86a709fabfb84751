//! Element Map Aggregator: folds an ordered set of item configs into a
//! single tag -> package reference map. The first item to mention a tag is
//! canonical; any later item must repeat the identical reference or
//! aggregation fails.

use pie_earl_types::ElementMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("version conflict for tag `{tag}`: item {first_item} says `{first_reference}`, item {second_item} says `{second_reference}`")]
pub struct VersionConflictError {
    pub tag: String,
    pub first_reference: String,
    pub first_item: usize,
    pub second_reference: String,
    pub second_item: usize,
}

impl From<VersionConflictError> for pie_earl_types::PlayerError {
    fn from(err: VersionConflictError) -> Self {
        pie_earl_types::PlayerError::VersionConflict {
            tag: err.tag,
            first: err.first_reference,
            second: err.second_reference,
        }
    }
}

/// Aggregate `items` in order, raising on the first tag disagreement found.
/// Non-recoverable by design: the caller should treat `Err` as a
/// fail-fast authoring error, not retry with partial results.
pub fn aggregate<'a>(
    items: impl IntoIterator<Item = (usize, &'a ElementMap)>,
) -> Result<ElementMap, VersionConflictError> {
    let mut canonical: ElementMap = ElementMap::new();
    let mut owning_item: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    for (item_index, elements) in items {
        for (tag, reference) in elements {
            match canonical.get(tag) {
                None => {
                    canonical.insert(tag.clone(), reference.clone());
                    owning_item.insert(tag.clone(), item_index);
                }
                Some(existing) if existing == reference => {}
                Some(existing) => {
                    return Err(VersionConflictError {
                        tag: tag.clone(),
                        first_reference: existing.clone(),
                        first_item: owning_item[tag],
                        second_reference: reference.clone(),
                        second_item: item_index,
                    });
                }
            }
        }
    }

    Ok(canonical)
}

/// Convenience wrapper over `aggregate` for a slice of `ItemConfig`s, the
/// shape callers most commonly have on hand.
pub fn aggregate_item_configs(
    items: &[pie_earl_types::ItemConfig],
) -> Result<ElementMap, VersionConflictError> {
    aggregate(items.iter().enumerate().map(|(i, c)| (i, &c.elements)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pie_earl_types::{ItemConfig, ModelEntry};

    fn item(elements: &[(&str, &str)]) -> ItemConfig {
        ItemConfig {
            markup: String::new(),
            elements: elements
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            models: Vec::<ModelEntry>::new(),
            id: None,
        }
    }

    #[test]
    fn single_item_yields_its_own_elements_unchanged() {
        let a = item(&[("choice-element", "@pie-element/choice@1.0.0")]);
        let result = aggregate_item_configs(std::slice::from_ref(&a)).unwrap();
        assert_eq!(result, a.elements);
    }

    #[test]
    fn agreeing_items_merge_without_conflict() {
        let a = item(&[("choice-element", "@pie-element/choice@1.0.0")]);
        let b = item(&[
            ("choice-element", "@pie-element/choice@1.0.0"),
            ("hotspot", "@pie-element/hotspot@2.0.0"),
        ]);
        let result = aggregate_item_configs(&[a, b]).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result["choice-element"], "@pie-element/choice@1.0.0");
        assert_eq!(result["hotspot"], "@pie-element/hotspot@2.0.0");
    }

    #[test]
    fn disagreeing_items_raise_version_conflict_naming_both_references() {
        let a = item(&[("hotspot", "@pie-element/hotspot@1.0.0")]);
        let b = item(&[("hotspot", "@pie-element/hotspot@2.0.0")]);
        let err = aggregate_item_configs(&[a, b]).unwrap_err();
        assert_eq!(err.tag, "hotspot");
        assert_eq!(err.first_reference, "@pie-element/hotspot@1.0.0");
        assert_eq!(err.first_item, 0);
        assert_eq!(err.second_reference, "@pie-element/hotspot@2.0.0");
        assert_eq!(err.second_item, 1);
    }

    #[test]
    fn symbolic_versions_are_compared_verbatim_not_canonicalized() {
        let a = item(&[("hotspot", "@pie-element/hotspot@latest")]);
        let b = item(&[("hotspot", "@pie-element/hotspot@esmbeta")]);
        assert!(aggregate_item_configs(&[a, b]).is_err());
    }
}
