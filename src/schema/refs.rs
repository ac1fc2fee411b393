//! Reference Resolution
//!
//! `$ref` targets are never dereferenced. A pointer string (leading `#`) is
//! nulled wherever it appears, and each `$ref` entry is hoisted onto its
//! parent path so the reference reads as the parent node's content.

use tracing::debug;

use super::{graph_id, last_segment, split_last, FlatSchema};
use crate::graph::diagnostics::Diagnostics;

/// Null out pointer strings and hoist `$ref` entries onto their parents,
/// discarding diagnostics
pub fn resolve_references(flat: FlatSchema) -> FlatSchema {
    resolve_references_with(flat, &mut Diagnostics::new())
}

/// Null out pointer strings and hoist `$ref` entries onto their parents.
///
/// A `$ref` whose parent was folded into an array (an indexed path) is
/// dropped with an info diagnostic; its value already sits in that array.
pub fn resolve_references_with(mut flat: FlatSchema, diagnostics: &mut Diagnostics) -> FlatSchema {
    let mut nulled = 0usize;
    for value in flat.entries_mut().values_mut() {
        let resolved = value.clone().without_pointers();
        if resolved != *value {
            nulled += 1;
            *value = resolved;
        }
    }

    // A `$ref` with children is opaque data, not a reference
    let refs: Vec<String> = flat
        .keys()
        .filter(|k| last_segment(k) == "$ref" && !flat.has_descendants(k))
        .cloned()
        .collect();

    let mut hoisted = 0usize;
    for key in &refs {
        let Some(value) = flat.remove(key) else {
            continue;
        };
        let (parent, _) = split_last(key);
        if parent.is_empty() || flat.contains(parent) {
            flat.insert(parent, value);
            hoisted += 1;
        } else {
            diagnostics.dropped_reference(graph_id(key), value.as_display());
        }
    }

    debug!(nulled, hoisted, "resolved schema references");
    flat
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DiagnosticCode;
    use crate::schema::{flatten, resolve_lists, FlatValue};
    use serde_json::json;

    fn resolved(doc: serde_json::Value) -> FlatSchema {
        resolve_references(resolve_lists(flatten(&doc).unwrap()))
    }

    #[test]
    fn test_pointer_values_are_nulled() {
        let flat = resolved(json!({
            "properties": {
                "a": {"$ref": "#/definitions/a"},
                "b": {"default": "#hashtag", "enum": ["#x", "y"]}
            }
        }));

        assert!(flat
            .iter()
            .all(|(_, v)| !matches!(v, FlatValue::Leaf(serde_json::Value::String(s)) if s.starts_with('#'))));
        assert_eq!(flat.get("properties/b/default"), Some(&FlatValue::Null));
        assert_eq!(flat.get("properties/b/enum").unwrap().to_json(), json!([null, "y"]));
    }

    #[test]
    fn test_ref_is_hoisted_to_parent() {
        let flat = resolved(json!({
            "properties": {
                "a": {"$ref": "other.json#/a"},
                "b": {"$ref": "#/definitions/b"}
            }
        }));

        assert!(!flat.contains("properties/a/$ref"));
        assert!(!flat.contains("properties/b/$ref"));
        assert_eq!(
            flat.get("properties/a"),
            Some(&FlatValue::Leaf(json!("other.json#/a")))
        );
        assert_eq!(flat.get("properties/b"), Some(&FlatValue::Null));
    }

    #[test]
    fn test_root_ref_hoists_to_root_key() {
        let flat = resolved(json!({"$ref": "base.json"}));
        assert_eq!(flat.get(""), Some(&FlatValue::Leaf(json!("base.json"))));
        assert!(!flat.contains("$ref"));
    }

    #[test]
    fn test_ref_inside_array_element_is_dropped() {
        let flat = resolved(json!({"anyOf": [{"$ref": "a.json"}, {"$ref": "b.json"}]}));
        assert!(!flat.contains("anyOf/0"));
        assert!(!flat.contains("anyOf/0/$ref"));
        assert_eq!(flat.get("anyOf").unwrap().to_json(), json!(["a.json", "b.json"]));
    }

    #[test]
    fn test_dropped_reference_is_recorded() {
        let flat = resolve_lists(flatten(&json!({"oneOf": [{"$ref": "a.json"}]})).unwrap());
        let mut diags = Diagnostics::new();
        let flat = resolve_references_with(flat, &mut diags);

        assert_eq!(flat.get("oneOf").unwrap().to_json(), json!(["a.json"]));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.warning_count(), 0);
        let item = &diags.all()[0];
        assert_eq!(item.code, DiagnosticCode::DroppedReference);
        assert_eq!(item.path, "#/oneOf/0/$ref");
        assert_eq!(item.context, vec!["a.json".to_string()]);
    }
}
