//! Conversion Pipeline
//!
//! Runs the schema stages in order:
//!
//! ```text
//! document → flatten → resolve lists → resolve references → build graph
//! ```
//!
//! Each run owns its flat table; nothing is shared between runs.

use serde_json::Value;
use tracing::debug;

use crate::config::VizConfig;
use crate::error::Result;
use crate::evolution::{EvolutionDocument, EvolutionGraph};
use crate::graph::{Diagnostics, GraphBuilder, SchemaGraph};
use crate::schema::flatten::DEFAULT_MAX_DEPTH;
use crate::schema::{resolve_references_with, Flattener, ListResolver};

/// Per-run settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub max_depth: usize,
    pub strict_array_indices: bool,
    pub grabbable: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            strict_array_indices: false,
            grabbable: false,
        }
    }
}

impl From<&VizConfig> for PipelineOptions {
    fn from(config: &VizConfig) -> Self {
        Self {
            max_depth: config.pipeline.max_depth,
            strict_array_indices: config.pipeline.strict_array_indices,
            grabbable: config.output.grabbable_nodes,
        }
    }
}

/// Schema document to graph converter
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Convert a schema document. `null` yields a graph with just the root.
    pub fn run(&self, doc: &Value) -> Result<SchemaGraph> {
        let mut diagnostics = Diagnostics::new();

        let mut flat = Flattener::new(self.options.max_depth).flatten(doc)?;
        debug!(entries = flat.len(), "flattened schema");

        let folded = ListResolver::new(self.options.strict_array_indices).resolve(&mut flat, &mut diagnostics)?;
        debug!(folded, entries = flat.len(), "resolved arrays");

        let flat = resolve_references_with(flat, &mut diagnostics);

        let graph = GraphBuilder::new()
            .grabbable(self.options.grabbable)
            .build(flat, diagnostics);

        if !graph.diagnostics().is_empty() {
            debug!(
                items = graph.diagnostics().len(),
                warnings = graph.diagnostics().warning_count(),
                "pipeline finished with diagnostics"
            );
        }
        Ok(graph)
    }
}

/// Convert a schema document with default options
pub fn parse_schema(doc: &Value) -> Result<SchemaGraph> {
    Pipeline::default().run(doc)
}

/// Convert an evolution document (`{"schemas": [...], "operations": [...]}`)
pub fn parse_evolution(doc: Value) -> Result<EvolutionGraph> {
    let doc = EvolutionDocument::from_value(doc)?;
    EvolutionGraph::from_document(&doc)
}
