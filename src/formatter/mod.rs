//! Rendering of evaluation results
//!
//! This module turns session values into the text the shell prints:
//! - Shell-style ("repr") formatting with BSON type wrappers
//!   (ObjectId, ISODate, Long, etc.)
//! - Extended JSON output, delegated to the [`json`] submodule
//! - Pretty-printed nested documents and arrays

pub mod json;

use bson::spec::BinarySubtype;
use bson::{Bson, Document};

use crate::config::{JsonOptions, OutputFormat};
use crate::error::Result;
use crate::session::Value;

/// Shell-style formatter producing the "repr" rendering.
pub struct ReprFormatter {
    /// Indentation width for nested structures
    indent: usize,
}

impl Default for ReprFormatter {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

impl ReprFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Format a BSON document in shell style
    ///
    /// # Arguments
    /// * `doc` - Document to format
    ///
    /// # Returns
    /// * `String` - Formatted document
    pub fn format_document(&self, doc: &Document) -> String {
        self.format_document_with_indent(doc, 0)
    }

    /// Format a BSON document with indentation
    fn format_document_with_indent(&self, doc: &Document, indent_level: usize) -> String {
        if doc.is_empty() {
            return "{}".to_string();
        }

        let mut result = String::from("{\n");
        let indent = " ".repeat((indent_level + 1) * self.indent);

        let entries: Vec<_> = doc.iter().collect();
        for (i, (key, value)) in entries.iter().enumerate() {
            result.push_str(&indent);
            result.push_str(key);
            result.push_str(": ");
            result.push_str(&self.format_bson(value, indent_level + 1));
            if i < entries.len() - 1 {
                result.push(',');
            }
            result.push('\n');
        }

        result.push_str(&" ".repeat(indent_level * self.indent));
        result.push('}');
        result
    }

    /// Format a single BSON value in shell style
    pub fn format_bson(&self, value: &Bson, indent_level: usize) -> String {
        match value {
            Bson::ObjectId(oid) => format!("ObjectId('{oid}')"),
            Bson::DateTime(dt) => {
                let iso = dt
                    .try_to_rfc3339_string()
                    .unwrap_or_else(|_| dt.timestamp_millis().to_string());
                format!("ISODate('{iso}')")
            }
            Bson::Int64(n) => format!("Long('{n}')"),
            Bson::Decimal128(d) => format!("NumberDecimal('{d}')"),
            Bson::String(s) => format!("'{s}'"),
            Bson::Int32(n) => n.to_string(),
            Bson::Double(f) => f.to_string(),
            Bson::Boolean(b) => b.to_string(),
            Bson::Null => "null".to_string(),
            Bson::Array(arr) => self.format_array(arr, indent_level),
            Bson::Document(doc) => self.format_document_with_indent(doc, indent_level),
            Bson::Binary(bin) => {
                let subtype = match bin.subtype {
                    BinarySubtype::Generic => 0u8,
                    BinarySubtype::Function => 1,
                    BinarySubtype::BinaryOld => 2,
                    BinarySubtype::UuidOld => 3,
                    BinarySubtype::Uuid => 4,
                    BinarySubtype::Md5 => 5,
                    BinarySubtype::Encrypted => 6,
                    BinarySubtype::Column => 7,
                    BinarySubtype::Sensitive => 8,
                    BinarySubtype::UserDefined(n) => n,
                    _ => 0,
                };
                format!("Binary(Buffer.from('{}', 'hex'), {subtype})", hex::encode(&bin.bytes))
            }
            Bson::RegularExpression(regex) => format!("/{}/{}", regex.pattern, regex.options),
            Bson::Timestamp(ts) => {
                format!("Timestamp({{ t: {}, i: {} }})", ts.time, ts.increment)
            }
            other => format!("{other:?}"),
        }
    }

    fn format_array(&self, arr: &[Bson], indent_level: usize) -> String {
        if arr.is_empty() {
            return "[]".to_string();
        }

        let mut result = String::from("[\n");
        let indent = " ".repeat((indent_level + 1) * self.indent);

        for (i, value) in arr.iter().enumerate() {
            result.push_str(&indent);
            result.push_str(&self.format_bson(value, indent_level + 1));
            if i < arr.len() - 1 {
                result.push(',');
            }
            result.push('\n');
        }

        result.push_str(&" ".repeat(indent_level * self.indent));
        result.push(']');
        result
    }
}

/// Render one document under the active output format.
///
/// # Arguments
/// * `doc` - Document to render
/// * `format` - Shell repr or extended JSON
/// * `options` - Extended JSON dialect (ignored for repr)
/// * `indent` - JSON indent width; `None` is compact (ignored for repr)
pub fn render_document(
    doc: &Document,
    format: OutputFormat,
    options: JsonOptions,
    indent: Option<usize>,
) -> Result<String> {
    match format {
        OutputFormat::Repr => Ok(ReprFormatter::new().format_document(doc)),
        OutputFormat::Json => json::document_to_json(doc, options, indent),
    }
}

/// Render a session value for the generic display path.
///
/// Documents honor the output format; scalar values render as their
/// shell repr regardless of it.
pub fn render_value(
    value: &Value,
    format: OutputFormat,
    options: JsonOptions,
    indent: Option<usize>,
) -> Result<String> {
    match value {
        Value::Unit => Ok(String::new()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Int(n) => Ok(n.to_string()),
        Value::String(s) => Ok(format!("'{s}'")),
        Value::Bson(Bson::Document(doc)) => render_document(doc, format, options, indent),
        Value::Bson(b) => Ok(ReprFormatter::new().format_bson(b, 0)),
        Value::Document(doc) => render_document(doc, format, options, indent),
        Value::Cursor(_) => Ok("Cursor { ... }".to_string()),
        Value::WriteAck(ack) => render_document(&ack.summary(), format, options, indent),
        Value::Database(db) => Ok(format!("Database({})", db.name())),
    }
}
