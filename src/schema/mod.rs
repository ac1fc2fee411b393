//! Flat Schema Table
//!
//! A JSON Schema document is turned into a table keyed by slash-joined paths
//! before it becomes a graph. The three passes live in submodules:
//!
//! ```text
//! document ──flatten──▶ FlatSchema ──resolve_lists──▶ ──resolve_references──▶ graph builder
//! ```
//!
//! Paths never carry the `#` prefix; that is added when graph ids are minted
//! (see [`graph_id`]).

pub mod flatten;
pub mod lists;
pub mod refs;

pub use flatten::{flatten, Flattener};
pub use lists::{resolve_lists, ListResolver};
pub use refs::{resolve_references, resolve_references_with};

use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use crate::error::{Result, VizError};

/// Graph id of the document root
pub const ROOT_ID: &str = "#";

/// Keywords whose values survive the intermediate-prefix placeholder overwrite
pub const REFERENCE_KEYWORDS: [&str; 3] = ["$ref", "$schema", "$id"];

// =============================================================================
// Path helpers
// =============================================================================

/// Segment standing for the empty key. `~` is always escaped in real keys,
/// so no document key can produce it.
pub const EMPTY_SEGMENT: &str = "~e";

/// Escape a document key so it is a single, non-empty path segment
/// (JSON Pointer rules, plus [`EMPTY_SEGMENT`] for `""`)
pub fn escape_segment(key: &str) -> String {
    if key.is_empty() {
        return EMPTY_SEGMENT.to_string();
    }
    key.replace('~', "~0").replace('/', "~1")
}

/// Reverse of [`escape_segment`]
pub fn unescape_segment(segment: &str) -> String {
    if segment == EMPTY_SEGMENT {
        return String::new();
    }
    segment.replace("~1", "/").replace("~0", "~")
}

/// Join a child segment onto a parent path
pub fn join_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}/{}", parent, segment)
    }
}

/// Split a path into (parent, last segment). The root's children have parent `""`.
pub fn split_last(path: &str) -> (&str, &str) {
    path.rsplit_once('/').unwrap_or(("", path))
}

/// Final segment of a path
pub fn last_segment(path: &str) -> &str {
    split_last(path).1
}

/// Number of segments in a path (`""` has depth 0)
pub fn depth(path: &str) -> usize {
    if path.is_empty() {
        0
    } else {
        path.matches('/').count() + 1
    }
}

/// True if a segment is a non-negative integer array index
pub fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Sort key that orders index segments numerically without parsing,
/// so arbitrarily long digit strings cannot overflow.
pub fn index_order(segment: &str) -> (usize, &str) {
    let trimmed = segment.trim_start_matches('0');
    (trimmed.len(), trimmed)
}

/// Graph id for a path: `#` for the root, `#/<path>` otherwise
pub fn graph_id(path: &str) -> String {
    if path.is_empty() {
        ROOT_ID.to_string()
    } else {
        format!("{}/{}", ROOT_ID, path)
    }
}

// =============================================================================
// Schema Node
// =============================================================================

/// Shape of a document node, decided once when the walker reaches it
#[derive(Debug, Clone, Copy)]
pub enum SchemaNode<'a> {
    /// Non-empty mapping
    Object(&'a Map<String, Value>),
    /// Non-empty sequence
    Array(&'a [Value]),
    /// `$ref` string
    Reference(&'a str),
    /// Scalar, `null`, or an empty container
    Leaf(&'a Value),
}

impl<'a> SchemaNode<'a> {
    /// Classify a value reached under `key`.
    ///
    /// `checked` enables keyword shape checks; it is false for data-valued
    /// subtrees (`enum`, `default`, ...) and property-name positions.
    pub fn classify(path: &str, key: &str, value: &'a Value, checked: bool) -> Result<Self> {
        if checked {
            match (key, value) {
                ("$ref", Value::String(s)) => return Ok(SchemaNode::Reference(s)),
                ("$ref", _) => {
                    return Err(VizError::malformed(graph_id(path), "$ref must be a string"));
                }
                ("properties", v) if !v.is_object() => {
                    return Err(VizError::malformed(
                        graph_id(path),
                        "properties must be a mapping",
                    ));
                }
                ("items", v) if !(v.is_object() || v.is_array() || v.is_boolean()) => {
                    return Err(VizError::malformed(
                        graph_id(path),
                        "items must be a mapping, array or boolean",
                    ));
                }
                _ => {}
            }
        }

        Ok(match value {
            Value::Object(map) if !map.is_empty() => SchemaNode::Object(map),
            Value::Array(items) if !items.is_empty() => SchemaNode::Array(items),
            other => SchemaNode::Leaf(other),
        })
    }
}

// =============================================================================
// Flat Values
// =============================================================================

/// A value stored in the flat table
#[derive(Debug, Clone, PartialEq)]
pub enum FlatValue {
    /// Literal value from the document
    Leaf(Value),
    /// Intermediate container; holds its own path
    Placeholder(String),
    /// Sequence rebuilt from indexed paths
    Array(Vec<FlatValue>),
    /// Reference pointer resolved away
    Null,
}

impl FlatValue {
    pub fn placeholder(path: impl Into<String>) -> Self {
        FlatValue::Placeholder(path.into())
    }

    pub fn is_array(&self) -> bool {
        matches!(self, FlatValue::Array(_))
    }

    /// True if this is the placeholder for `path`
    pub fn is_placeholder_for(&self, path: &str) -> bool {
        matches!(self, FlatValue::Placeholder(p) if p == path)
    }

    /// Display text for scalar leaves; containers, placeholders and nulls have none
    pub fn as_display(&self) -> Option<String> {
        match self {
            FlatValue::Leaf(Value::String(s)) => Some(s.clone()),
            FlatValue::Leaf(Value::Number(n)) => Some(n.to_string()),
            FlatValue::Leaf(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Replace schema-pointer strings (leading `#`) with [`FlatValue::Null`]
    pub fn without_pointers(self) -> Self {
        match self {
            FlatValue::Leaf(Value::String(s)) if s.starts_with('#') => FlatValue::Null,
            FlatValue::Array(items) => {
                FlatValue::Array(items.into_iter().map(FlatValue::without_pointers).collect())
            }
            other => other,
        }
    }

    /// Convert to plain JSON for display
    pub fn to_json(&self) -> Value {
        match self {
            FlatValue::Leaf(v) => v.clone(),
            FlatValue::Placeholder(p) => Value::String(p.clone()),
            FlatValue::Array(items) => Value::Array(items.iter().map(FlatValue::to_json).collect()),
            FlatValue::Null => Value::Null,
        }
    }
}

impl From<Value> for FlatValue {
    fn from(value: Value) -> Self {
        FlatValue::Leaf(value)
    }
}

// =============================================================================
// Flat Schema
// =============================================================================

/// Path-addressed table built from a schema document.
///
/// Keys iterate in byte order, so a container always precedes its descendants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatSchema {
    entries: BTreeMap<String, FlatValue>,
    /// Paths that were non-empty mappings in the source document
    mappings: BTreeSet<String>,
    /// Mappings whose keys are property names (`properties`, `$defs`, ...)
    property_maps: BTreeSet<String>,
}

impl FlatSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&FlatValue> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn insert(&mut self, path: impl Into<String>, value: FlatValue) -> Option<FlatValue> {
        self.entries.insert(path.into(), value)
    }

    pub fn remove(&mut self, path: &str) -> Option<FlatValue> {
        self.entries.remove(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FlatValue)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Record that `path` was a mapping in the source document
    pub fn mark_mapping(&mut self, path: impl Into<String>) {
        self.mappings.insert(path.into());
    }

    pub fn is_mapping(&self, path: &str) -> bool {
        self.mappings.contains(path)
    }

    /// Record that the keys under `path` name properties, not keywords
    pub fn mark_property_map(&mut self, path: impl Into<String>) {
        self.property_maps.insert(path.into());
    }

    pub fn is_property_map(&self, path: &str) -> bool {
        self.property_maps.contains(path)
    }

    /// True if any key lies strictly below `path`
    pub fn has_descendants(&self, path: &str) -> bool {
        let prefix = format!("{}/", path);
        self.entries
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
            .next()
            .map_or(false, |(k, _)| k.starts_with(&prefix))
    }

    /// Insert a placeholder at `path` unless an entry is already there
    pub(crate) fn entry_placeholder(&mut self, path: &str) {
        self.entries
            .entry(path.to_string())
            .or_insert_with(|| FlatValue::placeholder(path));
    }

    pub(crate) fn entries_mut(&mut self) -> &mut BTreeMap<String, FlatValue> {
        &mut self.entries
    }
}

impl FromIterator<(String, FlatValue)> for FlatSchema {
    fn from_iter<I: IntoIterator<Item = (String, FlatValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl<'a> IntoIterator for &'a FlatSchema {
    type Item = (&'a String, &'a FlatValue);
    type IntoIter = std::collections::btree_map::Iter<'a, String, FlatValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
