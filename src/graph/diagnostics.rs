//! Diagnostics
//!
//! Anomalies noticed while converting a schema. None of them stop the
//! conversion; they travel with the graph so callers can surface them.
//! Warnings mean the output differs from what the document likely intended;
//! info items record input that was deliberately discarded.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// Numeric key under a mapping was folded into an array
    AmbiguousArrayIndex,
    /// `title`, `description` or `type` is not a scalar
    NonScalarAnnotation,
    /// Root annotation has children, so it stays an ordinary node
    ContainerAnnotation,
    /// `$ref` inside an array element; only the array keeps its value
    DroppedReference,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AmbiguousArrayIndex => "W001",
            Self::NonScalarAnnotation => "W002",
            Self::ContainerAnnotation => "W003",
            Self::DroppedReference => "I001",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::AmbiguousArrayIndex
            | Self::NonScalarAnnotation
            | Self::ContainerAnnotation => Severity::Warning,
            Self::DroppedReference => Severity::Info,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
        })
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single diagnostic item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticItem {
    /// Graph id of the node the diagnostic is about
    pub path: String,
    pub code: DiagnosticCode,
    pub message: String,
    /// Related graph ids or values
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

impl DiagnosticItem {
    pub fn new(path: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.code,
            self.code.severity(),
            self.message,
            self.path
        )?;

        for ctx in &self.context {
            write!(f, "\n  - {}", ctx)?;
        }

        Ok(())
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Collection of diagnostics from one pipeline run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: DiagnosticItem) {
        self.items.push(item);
    }

    pub fn warning(&mut self, path: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) {
        self.push(DiagnosticItem::new(path, code, message));
    }

    /// Record a `$ref` that had nowhere to be hoisted
    pub fn dropped_reference(&mut self, path: impl Into<String>, target: Option<String>) {
        let mut item = DiagnosticItem::new(
            path,
            DiagnosticCode::DroppedReference,
            "reference inside an array element was dropped",
        );
        if let Some(target) = target {
            item = item.with_context(target);
        }
        self.push(item);
    }

    /// Add diagnostic for a root annotation that could not be used
    pub fn unusable_annotation(&mut self, path: impl Into<String>, keyword: &str, has_children: bool) {
        if has_children {
            self.warning(
                path,
                DiagnosticCode::ContainerAnnotation,
                format!("'{}' has children and is kept as a node; default used", keyword),
            );
        } else {
            self.warning(
                path,
                DiagnosticCode::NonScalarAnnotation,
                format!("'{}' is not a scalar; default used", keyword),
            );
        }
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Warning)
    }

    pub fn all(&self) -> &[DiagnosticItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Format all diagnostics for display
    pub fn format_all(&self) -> String {
        let mut output = String::new();

        for item in &self.items {
            output.push_str(&format!("{}\n", item));
        }

        if !self.is_empty() {
            output.push_str(&format!(
                "\n{} warning(s), {} info\n",
                self.warning_count(),
                self.len() - self.warning_count()
            ));
        }

        output
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_all())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a DiagnosticItem;
    type IntoIter = std::slice::Iter<'a, DiagnosticItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
