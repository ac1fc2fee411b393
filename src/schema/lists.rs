//! Array Reconstruction
//!
//! Folds every key whose final segment is an index back into an array stored
//! at the parent path. Indexed keys are sorted numerically per parent and the
//! deepest level is folded first, so nested arrays come back whole and in
//! source order no matter how the table was enumerated.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::{depth, graph_id, index_order, is_index, last_segment, split_last, FlatSchema, FlatValue};
use crate::error::{Result, VizError};
use crate::graph::diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics};

/// Rebuilds arrays from indexed paths
#[derive(Debug, Clone, Default)]
pub struct ListResolver {
    /// Reject numeric segments under a mapping instead of coercing them
    strict: bool,
}

impl ListResolver {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    /// Fold indexed keys into arrays. Returns the number of keys folded.
    ///
    /// A numeric segment whose parent was a mapping in the source is a
    /// property name that only looks like an index. It is coerced into an
    /// array with a warning, or rejected in strict mode.
    pub fn resolve(&self, flat: &mut FlatSchema, diagnostics: &mut Diagnostics) -> Result<usize> {
        let mut folded = 0;

        loop {
            let Some(level) = flat
                .keys()
                .filter(|k| is_index(last_segment(k)))
                .map(|k| depth(k))
                .max()
            else {
                break;
            };

            let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
            for key in flat
                .keys()
                .filter(|k| depth(k) == level && is_index(last_segment(k)))
            {
                let (parent, _) = split_last(key);
                groups.entry(parent.to_string()).or_default().push(key.clone());
            }

            for (parent, mut keys) in groups {
                keys.sort_by(|a, b| index_order(last_segment(a)).cmp(&index_order(last_segment(b))));

                if flat.is_mapping(&parent) {
                    self.ambiguous(&parent, &keys, diagnostics)?;
                }

                let mut values = match flat.remove(&parent) {
                    Some(FlatValue::Array(items)) => items,
                    _ => Vec::with_capacity(keys.len()),
                };
                for key in &keys {
                    if let Some(value) = flat.remove(key) {
                        values.push(value);
                    }
                }

                folded += keys.len();
                flat.insert(parent, FlatValue::Array(values));
            }
        }

        debug!(folded, "folded indexed paths into arrays");
        Ok(folded)
    }

    fn ambiguous(&self, parent: &str, keys: &[String], diagnostics: &mut Diagnostics) -> Result<()> {
        let first = keys.first().map(String::as_str).unwrap_or(parent);
        if self.strict {
            return Err(VizError::AmbiguousArrayIndex {
                path: graph_id(first),
            });
        }

        warn!(path = %graph_id(parent), count = keys.len(), "coercing numeric property names into an array");
        let mut item = DiagnosticItem::new(
            graph_id(parent),
            DiagnosticCode::AmbiguousArrayIndex,
            format!("{} numeric key(s) under a mapping were folded into an array", keys.len()),
        );
        for key in keys {
            item = item.with_context(graph_id(key));
        }
        diagnostics.push(item);
        Ok(())
    }
}

/// Fold indexed keys with the default (coercing) policy
pub fn resolve_lists(mut flat: FlatSchema) -> FlatSchema {
    let mut diagnostics = Diagnostics::new();
    let result = ListResolver::default().resolve(&mut flat, &mut diagnostics);
    debug_assert!(result.is_ok(), "coercing list resolution failed: {:?}", result.err());
    flat
}
