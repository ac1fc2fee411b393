//! Document Flattening
//!
//! Walks a schema document with an explicit stack and writes one table entry
//! per reachable key. Leaves receive their literal value; every intermediate
//! prefix receives a placeholder holding its own path, except that the values
//! of `$ref`, `$schema` and `$id` are written onto all of their prefixes and
//! are never replaced by a placeholder afterwards.

use serde_json::Value;
use tracing::debug;

use super::{
    escape_segment, graph_id, join_path, last_segment, FlatSchema, FlatValue, SchemaNode,
    REFERENCE_KEYWORDS,
};
use crate::error::{Result, VizError};

/// Default nesting limit for document walks
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Keywords whose value maps property names to schemas
const PROPERTY_MAP_KEYWORDS: &[&str] = &[
    "properties",
    "definitions",
    "$defs",
    "patternProperties",
    "dependentSchemas",
];

/// Keywords whose value is a schema or an array of schemas
const SCHEMA_KEYWORDS: &[&str] = &[
    "items",
    "prefixItems",
    "additionalItems",
    "additionalProperties",
    "unevaluatedItems",
    "unevaluatedProperties",
    "propertyNames",
    "contains",
    "not",
    "if",
    "then",
    "else",
    "allOf",
    "anyOf",
    "oneOf",
];

/// How the keys of a mapping are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    /// Keys are schema keywords
    Schema,
    /// Keys are property names, values are schemas
    PropertyMap,
    /// Opaque data (`enum`, `default`, unknown keywords)
    Data,
}

impl Context {
    fn child(self, key: &str) -> Context {
        match self {
            Context::Schema if PROPERTY_MAP_KEYWORDS.contains(&key) => Context::PropertyMap,
            Context::Schema if SCHEMA_KEYWORDS.contains(&key) => Context::Schema,
            Context::Schema => Context::Data,
            Context::PropertyMap => Context::Schema,
            Context::Data => Context::Data,
        }
    }
}

struct Frame<'a> {
    path: String,
    node: SchemaNode<'a>,
    depth: usize,
    context: Context,
}

/// Turns a nested schema document into a [`FlatSchema`]
#[derive(Debug, Clone)]
pub struct Flattener {
    max_depth: usize,
}

impl Default for Flattener {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl Flattener {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Flatten a document. `null` is treated as `{}`; any other non-mapping
    /// root is rejected.
    pub fn flatten(&self, doc: &Value) -> Result<FlatSchema> {
        let mut flat = FlatSchema::new();

        let root = match doc {
            Value::Null => return Ok(flat),
            Value::Object(map) => map,
            _ => {
                return Err(VizError::malformed(
                    graph_id(""),
                    "document root must be a mapping",
                ))
            }
        };

        let mut leaves: Vec<(String, Value)> = Vec::new();
        let mut stack = vec![Frame {
            path: String::new(),
            node: SchemaNode::Object(root),
            depth: 0,
            context: Context::Schema,
        }];

        while let Some(frame) = stack.pop() {
            match frame.node {
                SchemaNode::Object(map) => {
                    flat.mark_mapping(frame.path.clone());
                    if frame.context == Context::PropertyMap {
                        flat.mark_property_map(frame.path.clone());
                    }
                    let checked = frame.context == Context::Schema;
                    let mut children = Vec::with_capacity(map.len());
                    for (key, value) in map {
                        let path = join_path(&frame.path, &escape_segment(key));
                        let node = SchemaNode::classify(&path, key, value, checked)?;
                        children.push(self.frame(path, node, frame.depth + 1, frame.context.child(key))?);
                    }
                    // Reverse so the stack pops children in map order
                    stack.extend(children.into_iter().rev());
                }
                SchemaNode::Array(items) => {
                    let mut children = Vec::with_capacity(items.len());
                    for (index, value) in items.iter().enumerate() {
                        let key = index.to_string();
                        let path = join_path(&frame.path, &key);
                        let node = SchemaNode::classify(&path, &key, value, false)?;
                        children.push(self.frame(path, node, frame.depth + 1, frame.context)?);
                    }
                    stack.extend(children.into_iter().rev());
                }
                SchemaNode::Reference(target) => {
                    leaves.push((frame.path, Value::String(target.to_string())));
                }
                SchemaNode::Leaf(value) => {
                    leaves.push((frame.path, value.clone()));
                }
            }
        }

        for (path, value) in &leaves {
            write_leaf(&mut flat, path, value);
        }

        debug!(leaves = leaves.len(), entries = flat.len(), "flattened schema document");
        Ok(flat)
    }

    fn frame<'a>(
        &self,
        path: String,
        node: SchemaNode<'a>,
        depth: usize,
        context: Context,
    ) -> Result<Frame<'a>> {
        if depth > self.max_depth {
            return Err(VizError::DepthExceeded {
                path: graph_id(&path),
                limit: self.max_depth,
            });
        }
        Ok(Frame {
            path,
            node,
            depth,
            context,
        })
    }
}

/// Flatten with the default depth limit
pub fn flatten(doc: &Value) -> Result<FlatSchema> {
    Flattener::default().flatten(doc)
}

fn write_leaf(flat: &mut FlatSchema, path: &str, value: &Value) {
    let keeps_value = REFERENCE_KEYWORDS.contains(&last_segment(path));

    for (i, _) in path.match_indices('/') {
        let prefix = &path[..i];
        if keeps_value {
            flat.insert(prefix, FlatValue::Leaf(value.clone()));
        } else {
            flat.entry_placeholder(prefix);
        }
    }

    flat.insert(path, FlatValue::Leaf(value.clone()));
}
