//! Schema Graph Visualizer
//!
//! Converts JSON Schema documents into Cytoscape-style node/edge graphs, and
//! renders schema-evolution documents as a graph of versions linked by the
//! diff operations between them.
//!
//! ## Features
//!
//! - **Path-addressed flattening**: every reachable key gets exactly one path
//! - **Array reconstruction**: indexed paths fold back in numeric order
//! - **Reference handling**: `$ref` values hoisted, schema pointers nulled
//! - **Evolution overlay**: diff edges name the schema node they affect
//!
//! ## Architecture
//!
//! ```text
//! schema document
//!   └─ schema::flatten ─ schema::lists ─ schema::refs ─ graph::builder ─ SchemaGraph
//!
//! evolution document
//!   └─ evolution::decode (per operation) ─ evolution ─ EvolutionGraph
//! ```
//!
//! Both graphs share the `#`, `#/path/...` id namespace, so an evolution
//! edge's `subject` can be looked up in the schema graph.
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//!
//! let graph = sceviz::parse_schema(&json!({
//!     "title": "T",
//!     "properties": {"x": {"type": "string"}}
//! }))
//! .unwrap();
//!
//! assert_eq!(graph.root().label, "T");
//! assert!(graph.node("#/properties/x").is_some());
//! ```

pub mod config;
pub mod error;
pub mod evolution;
pub mod graph;
pub mod loader;
pub mod pipeline;
pub mod schema;

pub use config::VizConfig;
pub use error::{Result, VizError};
pub use evolution::{decode_operation, DecodedOperation, EvolutionGraph, EvolutionOperation};
pub use graph::{Diagnostics, Element, GraphEdge, GraphNode, SchemaGraph};
pub use loader::load_document;
pub use pipeline::{parse_evolution, parse_schema, Pipeline, PipelineOptions};
pub use schema::{FlatSchema, FlatValue};
