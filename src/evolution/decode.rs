//! Operation Decoding
//!
//! Parses the whitespace-tokenized diff grammar:
//!
//! ```text
//! add <path>
//! delete <path>
//! rename <path> to <newName>
//! move <source> to <dest>
//! copy <source> to <dest>
//! ```
//!
//! `<path>` is dot-separated property access (`address.street`). It maps onto
//! schema graph ids by inserting `/properties/` between segments, so
//! `address.street` names `#/address/properties/street`. A leading `#` or `$`
//! segment is the document root and is replaced by `#`, giving
//! `#.address` → `#/properties/address`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, VizError};
use crate::schema::{escape_segment, ROOT_ID};

/// Operation verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Add,
    Delete,
    Rename,
    Move,
    Copy,
}

/// Color class per verb
pub const COLOR_TABLE: [(Verb, &str); 5] = [
    (Verb::Delete, "red"),
    (Verb::Add, "green"),
    (Verb::Rename, "blue"),
    (Verb::Copy, "purple"),
    (Verb::Move, "orange"),
];

impl Verb {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "add" => Some(Self::Add),
            "delete" => Some(Self::Delete),
            "rename" => Some(Self::Rename),
            "move" => Some(Self::Move),
            "copy" => Some(Self::Copy),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Delete => "delete",
            Self::Rename => "rename",
            Self::Move => "move",
            Self::Copy => "copy",
        }
    }

    pub fn color_class(&self) -> &'static str {
        COLOR_TABLE
            .iter()
            .find(|(verb, _)| verb == self)
            .map(|(_, color)| *color)
            .unwrap_or("gray")
    }

    /// Number of whitespace tokens the verb takes, verb included
    fn arity(&self) -> usize {
        match self {
            Self::Add | Self::Delete => 2,
            Self::Rename | Self::Move | Self::Copy => 4,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed diff operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvolutionOperation {
    Add { target: String },
    Delete { target: String },
    Rename { target: String, new_name: String },
    Move { source: String, dest: String },
    Copy { source: String, dest: String },
}

impl EvolutionOperation {
    pub fn parse(text: &str) -> Result<Self> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let Some(first) = tokens.first() else {
            return Err(malformed(text, "empty operation"));
        };
        let verb = Verb::parse(first).ok_or_else(|| VizError::UnknownOperationVerb {
            verb: first.to_string(),
            operation: text.to_string(),
        })?;

        if tokens.len() != verb.arity() {
            return Err(malformed(
                text,
                format!("'{}' takes {} tokens, found {}", verb, verb.arity(), tokens.len()),
            ));
        }
        if verb.arity() == 4 && tokens[2] != "to" {
            return Err(malformed(text, format!("expected 'to', found '{}'", tokens[2])));
        }

        let first_arg = tokens[1].to_string();
        Ok(match verb {
            Verb::Add => Self::Add { target: first_arg },
            Verb::Delete => Self::Delete { target: first_arg },
            Verb::Rename => Self::Rename {
                target: first_arg,
                new_name: tokens[3].to_string(),
            },
            Verb::Move => Self::Move {
                source: first_arg,
                dest: tokens[3].to_string(),
            },
            Verb::Copy => Self::Copy {
                source: first_arg,
                dest: tokens[3].to_string(),
            },
        })
    }

    pub fn verb(&self) -> Verb {
        match self {
            Self::Add { .. } => Verb::Add,
            Self::Delete { .. } => Verb::Delete,
            Self::Rename { .. } => Verb::Rename,
            Self::Move { .. } => Verb::Move,
            Self::Copy { .. } => Verb::Copy,
        }
    }

    /// Human-readable form, normalized to single spaces
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Schema graph id of the affected element. Move and copy name two full
    /// paths and have no single subject.
    pub fn subject_id(&self) -> Option<String> {
        match self {
            Self::Add { target } | Self::Delete { target } => Some(property_pointer(target, None)),
            Self::Rename { target, new_name } => Some(property_pointer(target, Some(new_name))),
            Self::Move { .. } | Self::Copy { .. } => None,
        }
    }

    pub fn decode(&self) -> DecodedOperation {
        DecodedOperation {
            label: self.label(),
            color_class: self.verb().color_class().to_string(),
            subject_id: self.subject_id(),
        }
    }
}

impl FromStr for EvolutionOperation {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for EvolutionOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add { target } | Self::Delete { target } => write!(f, "{} {}", self.verb(), target),
            Self::Rename { target, new_name } => write!(f, "{} {} to {}", self.verb(), target, new_name),
            Self::Move { source, dest } | Self::Copy { source, dest } => {
                write!(f, "{} {} to {}", self.verb(), source, dest)
            }
        }
    }
}

/// Decoder output for one operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedOperation {
    pub label: String,
    pub color_class: String,
    pub subject_id: Option<String>,
}

/// Parse and decode an operation string
pub fn decode_operation(op: &str) -> Result<DecodedOperation> {
    EvolutionOperation::parse(op).map(|parsed| parsed.decode())
}

fn malformed(text: &str, reason: impl Into<String>) -> VizError {
    VizError::MalformedOperation {
        operation: text.to_string(),
        reason: reason.into(),
    }
}

/// Dotted property path to a schema graph id, optionally renaming the last segment
fn property_pointer(path: &str, rename_to: Option<&str>) -> String {
    let mut segments: Vec<&str> = path.split('.').collect();
    if let (Some(last), Some(name)) = (segments.last_mut(), rename_to) {
        *last = name;
    }

    let rooted = matches!(segments.first(), Some(&"#") | Some(&"$"));
    if rooted {
        segments.remove(0);
    }

    let joined = segments
        .iter()
        .map(|s| escape_segment(s))
        .collect::<Vec<_>>()
        .join("/properties/");

    match (rooted, joined.is_empty()) {
        (_, true) => ROOT_ID.to_string(),
        (true, false) => format!("{}/properties/{}", ROOT_ID, joined),
        (false, false) => format!("{}/{}", ROOT_ID, joined),
    }
}
