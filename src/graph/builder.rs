//! Graph Construction
//!
//! Turns a fully resolved flat table into nodes and edges. The root node takes
//! its label, type and description from the top-level `title`, `type` and
//! `description` keys, which are consumed. Every other key becomes one node
//! plus one edge from its structural parent, with two rules:
//!
//! - a `type` key is an attribute of its owner, never a node of its own
//!   (unless children hang off it, i.e. it is a property named `type`);
//! - index segments at the end of the parent path are trimmed, since the
//!   array they addressed now lives on the array node itself.

use serde_json::Value;
use tracing::{debug, warn};

use super::diagnostics::Diagnostics;
use super::{GraphEdge, GraphNode, SchemaGraph};
use crate::schema::{graph_id, is_index, split_last, unescape_segment, FlatSchema, FlatValue, ROOT_ID};

pub const DEFAULT_ROOT_LABEL: &str = "root";
pub const DEFAULT_ROOT_TYPE: &str = "object";
/// Type shown for nodes without their own `type`
pub const KEYWORD_NODE_TYPE: &str = "JSON Schema Keyword";

/// Builds a [`SchemaGraph`] from a resolved flat table
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    grabbable: bool,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether emitted nodes may be dragged in the viewer
    pub fn grabbable(mut self, grabbable: bool) -> Self {
        self.grabbable = grabbable;
        self
    }

    pub fn build(&self, mut flat: FlatSchema, mut diagnostics: Diagnostics) -> SchemaGraph {
        let root_content = flat.remove("").and_then(|v| content_value(&v));

        let label = pop_annotation(&mut flat, "title", &mut diagnostics)
            .and_then(|v| annotation_text(&v, "title", &mut diagnostics))
            .unwrap_or_else(|| DEFAULT_ROOT_LABEL.to_string());
        let node_type = pop_annotation(&mut flat, "type", &mut diagnostics)
            .and_then(|v| type_name(&v))
            .unwrap_or_else(|| DEFAULT_ROOT_TYPE.to_string());
        let description = pop_annotation(&mut flat, "description", &mut diagnostics)
            .and_then(|v| annotation_text(&v, "description", &mut diagnostics));

        let mut nodes = vec![GraphNode {
            id: ROOT_ID.to_string(),
            label,
            node_type: Some(node_type),
            description,
            content: root_content,
        }];
        let mut edges = Vec::new();

        for (key, value) in &flat {
            let (parent, last) = split_last(key);
            if last == "type" && !flat.has_descendants(key) && !flat.is_property_map(parent) {
                continue;
            }

            let id = graph_id(key);
            let label = attribute(&flat, key, "title")
                .and_then(FlatValue::as_display)
                .unwrap_or_else(|| unescape_segment(last));
            let node_type = attribute(&flat, key, "type")
                .and_then(type_name)
                .unwrap_or_else(|| KEYWORD_NODE_TYPE.to_string());
            let description = attribute(&flat, key, "description").and_then(FlatValue::as_display);
            let content = if value.is_placeholder_for(key) {
                None
            } else {
                content_value(value)
            };

            edges.push(GraphEdge::new(parent_id(key), id.clone()));
            nodes.push(GraphNode {
                id,
                label,
                node_type: Some(node_type),
                description,
                content,
            });
        }

        debug!(nodes = nodes.len(), edges = edges.len(), "built schema graph");

        SchemaGraph {
            nodes,
            edges,
            diagnostics,
            grabbable: self.grabbable,
        }
    }
}

/// Build a graph with default settings, discarding nothing but the flat table
pub fn build_graph(flat: FlatSchema) -> SchemaGraph {
    GraphBuilder::default().build(flat, Diagnostics::new())
}

/// Parent graph id, with trailing index segments trimmed
fn parent_id(path: &str) -> String {
    let mut segments: Vec<&str> = path.split('/').collect();
    segments.pop();
    while segments.last().map_or(false, |s| is_index(s)) {
        segments.pop();
    }
    graph_id(&segments.join("/"))
}

/// Annotation `keyword` of the node at `key`. Keys under a property map
/// are property names, never annotations of the map itself.
fn attribute<'a>(flat: &'a FlatSchema, key: &str, keyword: &str) -> Option<&'a FlatValue> {
    if flat.is_property_map(key) {
        return None;
    }
    flat.get(&format!("{}/{}", key, keyword))
}

/// Remove a root annotation unless children hang off it
fn pop_annotation(flat: &mut FlatSchema, keyword: &str, diagnostics: &mut Diagnostics) -> Option<FlatValue> {
    if !flat.contains(keyword) {
        return None;
    }
    if flat.has_descendants(keyword) {
        warn!(keyword, "root annotation has children; using default");
        diagnostics.unusable_annotation(graph_id(keyword), keyword, true);
        return None;
    }
    flat.remove(keyword)
}

fn annotation_text(value: &FlatValue, keyword: &str, diagnostics: &mut Diagnostics) -> Option<String> {
    let text = value.as_display();
    if text.is_none() && content_value(value).is_some() {
        warn!(keyword, "root annotation is not a scalar; using default");
        diagnostics.unusable_annotation(graph_id(keyword), keyword, false);
    }
    text
}

/// `"string"`, or `"string | null"` for a type array
fn type_name(value: &FlatValue) -> Option<String> {
    match value {
        FlatValue::Array(items) => {
            let names: Option<Vec<String>> = items.iter().map(FlatValue::as_display).collect();
            names.filter(|n| !n.is_empty()).map(|n| n.join(" | "))
        }
        other => other.as_display(),
    }
}

fn content_value(value: &FlatValue) -> Option<Value> {
    match value.to_json() {
        Value::Null => None,
        json => Some(json),
    }
}
