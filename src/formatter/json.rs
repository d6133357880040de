//! Extended JSON output for documents.

use bson::{Bson, Document};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::config::{JsonMode, JsonOptions};
use crate::error::Result;

/// Serialize a document as MongoDB Extended JSON.
///
/// # Arguments
/// * `doc` - Document to serialize
/// * `options` - Relaxed or canonical dialect
/// * `indent` - Indent width for pretty printing; `None` is compact
///
/// # Returns
/// * `Result<String>` - JSON text or error
pub fn document_to_json(
    doc: &Document,
    options: JsonOptions,
    indent: Option<usize>,
) -> Result<String> {
    let value = match options.mode {
        JsonMode::Relaxed => Bson::Document(doc.clone()).into_relaxed_extjson(),
        JsonMode::Canonical => Bson::Document(doc.clone()).into_canonical_extjson(),
    };

    match indent {
        None => serde_json::to_string(&value)
            .map_err(|e| crate::error::ShellError::Generic(e.to_string())),
        Some(width) => {
            let step = " ".repeat(width);
            let mut buf = Vec::new();
            let formatter = PrettyFormatter::with_indent(step.as_bytes());
            let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
            value
                .serialize(&mut serializer)
                .map_err(|e| crate::error::ShellError::Generic(e.to_string()))?;
            Ok(String::from_utf8_lossy(&buf).into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_compact_relaxed() {
        let doc = doc! { "a": 1i32, "b": "x" };
        let out = document_to_json(&doc, JsonOptions::default(), None).unwrap();
        assert_eq!(out, r#"{"a":1,"b":"x"}"#);
    }

    #[test]
    fn test_canonical_wraps_numbers() {
        let doc = doc! { "a": 1i32 };
        let opts = JsonOptions {
            mode: JsonMode::Canonical,
        };
        let out = document_to_json(&doc, opts, None).unwrap();
        assert!(out.contains("$numberInt"));
    }

    #[test]
    fn test_indented_output() {
        let doc = doc! { "a": 1i32 };
        let out = document_to_json(&doc, JsonOptions::default(), Some(2)).unwrap();
        assert!(out.contains("{\n  \"a\": 1\n}"));
    }

    #[test]
    fn test_relaxed_int64_is_plain() {
        let doc = doc! { "n": 5i64 };
        let out = document_to_json(&doc, JsonOptions::default(), None).unwrap();
        assert_eq!(out, r#"{"n":5}"#);
    }
}
