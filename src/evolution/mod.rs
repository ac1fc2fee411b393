//! Schema Evolution Graph
//!
//! One node per schema version, one edge per diff operation between versions.
//! Edges carry the decoded operation and, where the operation names a single
//! property, the schema graph id of that property as `subject`.
//!
//! Input document:
//!
//! ```json
//! {
//!   "schemas": [{"$id": "v1.json"}, {"$id": "v2.json"}],
//!   "operations": [
//!     {"operation": "add address", "source": "v1.json", "destination": "v2.json"}
//!   ]
//! }
//! ```

pub mod decode;

pub use decode::{decode_operation, DecodedOperation, EvolutionOperation, Verb, COLOR_TABLE};

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::error::Result;
use crate::graph::{dot_escape, write_dot, GraphNode, SchemaGraph};

// =============================================================================
// Input
// =============================================================================

/// A schema version entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaVersion {
    #[serde(rename = "$id")]
    pub id: String,
}

/// A diff operation between two versions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub operation: String,
    pub source: String,
    pub destination: String,
}

/// Evolution document: ordered versions plus the operations between them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionDocument {
    #[serde(default)]
    pub schemas: Vec<SchemaVersion>,
    #[serde(default)]
    pub operations: Vec<OperationRecord>,
}

impl EvolutionDocument {
    /// Read from a JSON value; `null` is an empty document
    pub fn from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn version_ids(&self) -> Vec<String> {
        self.schemas.iter().map(|s| s.id.clone()).collect()
    }
}

// =============================================================================
// Output
// =============================================================================

/// Version node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionNode {
    pub id: String,
    /// `v<index>`, 0-based
    pub label: String,
}

/// Diff edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEdge {
    /// Decoded label
    pub operation: String,
    /// Color class of the verb
    pub op: String,
    pub source: String,
    pub target: String,
    /// Schema graph id of the affected property
    pub subject: Option<String>,
}

/// One Cytoscape element of the evolution graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EvolutionElement {
    Diff { data: DiffEdge },
    Version { data: VersionNode },
}

/// Graph of schema versions and the operations between them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvolutionGraph {
    pub nodes: Vec<VersionNode>,
    pub edges: Vec<DiffEdge>,
}

impl EvolutionGraph {
    pub fn from_document(doc: &EvolutionDocument) -> Result<Self> {
        build_evolution_graph(&doc.version_ids(), &doc.operations)
    }

    /// Version nodes first, then diff edges
    pub fn elements(&self) -> Vec<EvolutionElement> {
        self.nodes
            .iter()
            .map(|n| EvolutionElement::Version { data: n.clone() })
            .chain(self.edges.iter().map(|e| EvolutionElement::Diff { data: e.clone() }))
            .collect()
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self.elements())
    }

    /// Pair each edge with the schema graph node its subject names, if any
    pub fn subjects_in<'a>(&'a self, schema: &'a SchemaGraph) -> Vec<(&'a DiffEdge, Option<&'a GraphNode>)> {
        self.edges
            .iter()
            .map(|edge| {
                let node = edge.subject.as_deref().and_then(|id| schema.node(id));
                (edge, node)
            })
            .collect()
    }

    /// Version graph; edges whose endpoints are not listed versions are skipped
    pub fn to_digraph(&self) -> DiGraph<&VersionNode, &DiffEdge> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.edges.len());
        let mut indices: HashMap<&str, NodeIndex> = HashMap::with_capacity(self.nodes.len());

        for node in &self.nodes {
            indices.insert(&node.id, graph.add_node(node));
        }
        for edge in &self.edges {
            if let (Some(&from), Some(&to)) = (
                indices.get(edge.source.as_str()),
                indices.get(edge.target.as_str()),
            ) {
                graph.add_edge(from, to, edge);
            }
        }

        graph
    }

    /// Export to GraphViz DOT format
    pub fn to_dot(&self) -> String {
        write_dot(
            "EvolutionGraph",
            &self.to_digraph(),
            |node| {
                format!(
                    "label=\"{}\\n{}\", fillcolor=\"#607D8B\"",
                    dot_escape(&node.label),
                    dot_escape(&node.id)
                )
            },
            |edge| {
                format!(
                    "label=\"{}\", color=\"{}\", fontcolor=\"{}\"",
                    dot_escape(&edge.operation),
                    edge.op,
                    edge.op
                )
            },
        )
    }
}

/// Build the evolution graph. Versions and operations are taken in the order
/// given; edge endpoints come straight from each record.
pub fn build_evolution_graph(versions: &[String], operations: &[OperationRecord]) -> Result<EvolutionGraph> {
    let nodes = versions
        .iter()
        .enumerate()
        .map(|(index, id)| VersionNode {
            id: id.clone(),
            label: format!("v{}", index),
        })
        .collect();

    let edges = operations
        .iter()
        .map(|record| {
            let decoded = decode_operation(&record.operation)?;
            Ok(DiffEdge {
                operation: decoded.label,
                op: decoded.color_class,
                source: record.source.clone(),
                target: record.destination.clone(),
                subject: decoded.subject_id,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let graph = EvolutionGraph { nodes, edges };
    debug!(versions = graph.nodes.len(), operations = graph.edges.len(), "built evolution graph");
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VizError;
    use serde_json::json;

    fn record(op: &str, source: &str, destination: &str) -> OperationRecord {
        OperationRecord {
            operation: op.to_string(),
            source: source.to_string(),
            destination: destination.to_string(),
        }
    }

    #[test]
    fn test_version_nodes_in_order() {
        let versions = vec!["a.json".to_string(), "b.json".to_string(), "c.json".to_string()];
        let g = build_evolution_graph(&versions, &[]).unwrap();

        let labels: Vec<&str> = g.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["v0", "v1", "v2"]);
        assert_eq!(g.nodes[2].id, "c.json");
        assert!(g.edges.is_empty());
    }

    #[test]
    fn test_edges_carry_decoded_operations() {
        let versions = vec!["a".to_string(), "b".to_string()];
        let ops = vec![
            record("add foo", "a", "b"),
            record("move x.y to z", "a", "b"),
        ];
        let g = build_evolution_graph(&versions, &ops).unwrap();

        assert_eq!(g.edges.len(), 2);
        assert_eq!(g.edges[0].operation, "add foo");
        assert_eq!(g.edges[0].op, "green");
        assert_eq!(g.edges[0].subject.as_deref(), Some("#/foo"));
        assert_eq!(g.edges[0].source, "a");
        assert_eq!(g.edges[0].target, "b");
        assert_eq!(g.edges[1].subject, None);
    }

    #[test]
    fn test_unknown_verb_fails_the_build() {
        let ops = vec![record("add foo", "a", "b"), record("explode foo", "a", "b")];
        let err = build_evolution_graph(&["a".to_string(), "b".to_string()], &ops).unwrap_err();
        assert!(matches!(err, VizError::UnknownOperationVerb { .. }));
    }

    #[test]
    fn test_document_parsing_and_elements() {
        let doc = EvolutionDocument::from_value(json!({
            "schemas": [{"$id": "v1.json"}, {"$id": "v2.json"}],
            "operations": [
                {"operation": "delete a.b", "source": "v1.json", "destination": "v2.json"}
            ]
        }))
        .unwrap();
        let g = EvolutionGraph::from_document(&doc).unwrap();
        let value = g.to_value().unwrap();

        assert_eq!(value[0], json!({"data": {"id": "v1.json", "label": "v0"}}));
        assert_eq!(
            value[2],
            json!({"data": {
                "operation": "delete a.b",
                "op": "red",
                "source": "v1.json",
                "target": "v2.json",
                "subject": "#/a/properties/b"
            }})
        );
    }

    #[test]
    fn test_null_document_is_empty() {
        let doc = EvolutionDocument::from_value(Value::Null).unwrap();
        let g = EvolutionGraph::from_document(&doc).unwrap();
        assert!(g.nodes.is_empty());
        assert!(g.edges.is_empty());
    }

    #[test]
    fn test_dot_export() {
        let versions = vec!["a".to_string(), "b".to_string()];
        let g = build_evolution_graph(&versions, &[record("rename a to b", "a", "b")]).unwrap();
        let dot = g.to_dot();
        assert!(dot.starts_with("digraph EvolutionGraph {"));
        assert!(dot.contains("n0 -> n1 [label=\"rename a to b\", color=\"blue\""));
    }
}
