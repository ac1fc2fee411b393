//! Schema Graph
//!
//! Node/edge records built from a resolved [`FlatSchema`](crate::schema::FlatSchema).
//! Ids are the `#`-prefixed paths of the flat table, so an id names the same
//! schema element in every graph built from the same document, including the
//! `subject` of an evolution edge.
//!
//! Serialized output follows the Cytoscape elements convention:
//!
//! ```text
//! [
//!   { "data": { "id": "#", "label": "T", ... }, "grabbable": false },
//!   { "data": { "id": "#/properties", ... }, "grabbable": false },
//!   { "data": { "id": "#->#/properties", "source": "#", "target": "#/properties" } },
//!   ...
//! ]
//! ```

pub mod builder;
pub mod diagnostics;

pub use builder::{build_graph, GraphBuilder, DEFAULT_ROOT_LABEL, DEFAULT_ROOT_TYPE, KEYWORD_NODE_TYPE};
pub use diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics, Severity};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A schema element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// `#` for the root, `#/<path>` otherwise
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: Option<String>,
    pub description: Option<String>,
    pub content: Option<Value>,
}

/// Structural edge from parent to child
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// `<source>-><target>`
    pub id: String,
    pub source: String,
    pub target: String,
}

impl GraphEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("{}->{}", source, target),
            source,
            target,
        }
    }
}

/// One Cytoscape element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Element {
    Node {
        data: GraphNode,
        #[serde(default)]
        grabbable: bool,
    },
    Edge {
        data: GraphEdge,
    },
}

/// Graph of one schema document
#[derive(Debug, Clone)]
pub struct SchemaGraph {
    /// Root first, then one node per remaining path
    pub(crate) nodes: Vec<GraphNode>,
    /// `edges[i]` targets `nodes[i + 1]`
    pub(crate) edges: Vec<GraphEdge>,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) grabbable: bool,
}

impl SchemaGraph {
    /// The root node (`#`)
    pub fn root(&self) -> &GraphNode {
        &self.nodes[0]
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Elements in emission order: root, then each node followed by its edge
    pub fn elements(&self) -> Vec<Element> {
        let mut elements = Vec::with_capacity(self.nodes.len() + self.edges.len());
        let mut nodes = self.nodes.iter();

        if let Some(root) = nodes.next() {
            elements.push(self.node_element(root));
        }
        for (node, edge) in nodes.zip(&self.edges) {
            elements.push(self.node_element(node));
            elements.push(Element::Edge { data: edge.clone() });
        }

        elements
    }

    fn node_element(&self, node: &GraphNode) -> Element {
        Element::Node {
            data: node.clone(),
            grabbable: self.grabbable,
        }
    }

    /// Elements as a JSON array
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self.elements())
    }

    /// Structural graph keyed by node id
    pub fn to_digraph(&self) -> DiGraph<String, ()> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.edges.len());
        let mut indices: HashMap<&str, NodeIndex> = HashMap::with_capacity(self.nodes.len());

        for node in &self.nodes {
            indices.insert(&node.id, graph.add_node(node.id.clone()));
        }
        for edge in &self.edges {
            if let (Some(&from), Some(&to)) = (
                indices.get(edge.source.as_str()),
                indices.get(edge.target.as_str()),
            ) {
                graph.add_edge(from, to, ());
            }
        }

        graph
    }

    /// Export to GraphViz DOT format
    pub fn to_dot(&self) -> String {
        let labels: HashMap<&str, (&str, &str)> = self
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), (n.label.as_str(), type_color(n.node_type.as_deref()))))
            .collect();

        write_dot(
            "SchemaGraph",
            &self.to_digraph(),
            |id| {
                let (label, color) = labels.get(id.as_str()).copied().unwrap_or((id.as_str(), DEFAULT_COLOR));
                format!("label=\"{}\", fillcolor=\"{}\"", dot_escape(label), color)
            },
            |_| String::new(),
        )
    }
}

const DEFAULT_COLOR: &str = "#9E9E9E";

fn type_color(node_type: Option<&str>) -> &'static str {
    const COLOR_MAP: [(&str, &str); 6] = [
        ("object", "#00BCD4"),
        ("array", "#FF9800"),
        ("string", "#4CAF50"),
        ("number", "#2196F3"),
        ("integer", "#2196F3"),
        ("boolean", "#9C27B0"),
    ];

    COLOR_MAP
        .iter()
        .find(|(kind, _)| node_type == Some(*kind))
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_COLOR)
}

/// Escape a string for a quoted DOT attribute
pub(crate) fn dot_escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render a petgraph graph as DOT with caller-supplied attributes
pub(crate) fn write_dot<N, E>(
    name: &str,
    graph: &DiGraph<N, E>,
    node_attrs: impl Fn(&N) -> String,
    edge_attrs: impl Fn(&E) -> String,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("digraph {} {{\n", name));
    output.push_str("  rankdir=LR;\n");
    output.push_str("  bgcolor=\"#1e1e1e\";\n");
    output.push_str("  node [shape=box, style=\"filled,rounded\", fontname=\"Helvetica\", fontsize=10, fontcolor=\"white\", color=\"#404040\"];\n");
    output.push_str("  edge [fontname=\"Helvetica\", fontsize=8, fontcolor=\"#808080\", color=\"#808080\"];\n");
    output.push('\n');

    for idx in graph.node_indices() {
        output.push_str(&format!("  n{} [{}];\n", idx.index(), node_attrs(&graph[idx])));
    }

    output.push('\n');

    for edge in graph.edge_references() {
        let attrs = edge_attrs(edge.weight());
        if attrs.is_empty() {
            output.push_str(&format!("  n{} -> n{};\n", edge.source().index(), edge.target().index()));
        } else {
            output.push_str(&format!(
                "  n{} -> n{} [{}];\n",
                edge.source().index(),
                edge.target().index(),
                attrs
            ));
        }
    }

    output.push_str("}\n");
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{flatten, resolve_lists, resolve_references};
    use serde_json::json;

    fn graph(doc: Value) -> SchemaGraph {
        build_graph(resolve_references(resolve_lists(flatten(&doc).unwrap())))
    }

    #[test]
    fn test_elements_interleave_nodes_and_edges() {
        let g = graph(json!({"title": "T", "properties": {"x": {"type": "string"}}}));
        let elements = g.elements();

        assert_eq!(elements.len(), g.node_count() + g.edge_count());
        assert!(matches!(&elements[0], Element::Node { data, .. } if data.id == "#"));
        assert!(matches!(&elements[2], Element::Edge { data } if data.source == "#"));
    }

    #[test]
    fn test_serialized_shape() {
        let g = graph(json!({"properties": {"x": {"type": "string"}}}));
        let value = g.to_value().unwrap();

        assert_eq!(value[0]["data"]["id"], "#");
        assert_eq!(value[0]["data"]["label"], "root");
        assert_eq!(value[0]["data"]["type"], "object");
        assert_eq!(value[0]["data"]["description"], Value::Null);
        assert_eq!(value[0]["grabbable"], false);
        assert_eq!(value[2]["data"]["id"], "#->#/properties");
        assert!(value[2].get("grabbable").is_none());
    }

    #[test]
    fn test_elements_deserialize_back() {
        let g = graph(json!({"properties": {"x": {"type": "string"}}}));
        let text = serde_json::to_string(&g.elements()).unwrap();
        let parsed: Vec<Element> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, g.elements());
    }

    #[test]
    fn test_digraph_and_dot() {
        let g = graph(json!({"title": "Quote \"me\"", "properties": {"x": {"type": "string"}}}));
        let dg = g.to_digraph();
        assert_eq!(dg.node_count(), g.node_count());
        assert_eq!(dg.edge_count(), g.edge_count());

        let dot = g.to_dot();
        assert!(dot.starts_with("digraph SchemaGraph {"));
        assert!(dot.contains("label=\"Quote \\\"me\\\"\""));
        assert!(dot.contains("n0 -> n1;"));
    }
}
