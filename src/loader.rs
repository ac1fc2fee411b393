//! Document Loading
//!
//! Reads schema and evolution documents from disk with the same restrictions
//! an upload endpoint applies: an allowed extension and a size ceiling.
//! Blank input parses as `null`, which the pipeline treats as `{}`.

use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::config::InputConfig;
use crate::error::{Result, VizError};

/// Load and parse a JSON document
pub fn load_document(path: &Path, input: &InputConfig) -> Result<Value> {
    check_extension(path, input)?;

    let size = fs::metadata(path)?.len();
    if size > input.max_bytes {
        return Err(VizError::InvalidInput(format!(
            "{} is {} bytes, limit is {}",
            path.display(),
            size,
            input.max_bytes
        )));
    }

    let bytes = fs::read(path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "loaded document");
    parse_document(&bytes, input)
}

/// Parse raw bytes as a JSON document
pub fn parse_document(bytes: &[u8], input: &InputConfig) -> Result<Value> {
    if bytes.len() as u64 > input.max_bytes {
        return Err(VizError::InvalidInput(format!(
            "document is {} bytes, limit is {}",
            bytes.len(),
            input.max_bytes
        )));
    }
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(bytes)?)
}

fn check_extension(path: &Path, input: &InputConfig) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if input.allowed_extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(&ext)) {
        Ok(())
    } else {
        Err(VizError::InvalidInput(format!(
            "{} does not have an allowed extension ({})",
            path.display(),
            input.allowed_extensions.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.JSON");
        fs::write(&path, r#"{"title": "T"}"#).unwrap();

        let doc = load_document(&path, &InputConfig::default()).unwrap();
        assert_eq!(doc, json!({"title": "T"}));
    }

    #[test]
    fn test_rejects_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.yaml");
        fs::write(&path, "{}").unwrap();

        let err = load_document(&path, &InputConfig::default()).unwrap_err();
        assert!(matches!(err, VizError::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_oversized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.json");
        fs::write(&path, format!("{{\"description\": \"{}\"}}", "x".repeat(64))).unwrap();

        let input = InputConfig {
            max_bytes: 16,
            ..InputConfig::default()
        };
        assert!(matches!(
            load_document(&path, &input),
            Err(VizError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_blank_is_null() {
        assert_eq!(parse_document(b"  \n", &InputConfig::default()).unwrap(), Value::Null);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            parse_document(b"{nope", &InputConfig::default()),
            Err(VizError::Json(_))
        ));
    }
}
