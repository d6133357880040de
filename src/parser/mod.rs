//! Statement parser for the shell
//!
//! Interactive input is a small statement language:
//! - shell commands parsed by string matching (`use`, `show dbs`,
//!   `show collections`, `help`, `exit`, `quit`)
//! - `connect("<url>")`
//! - assignments of literals to names (`MAX_PAGE_SIZE = 5`)
//! - bare-name lookups (`it`, `db`, `last_error`)
//! - collection operations in `db.<collection>.<operation>(...)` form
//!
//! Operation arguments are written as relaxed JSON: unquoted keys and
//! single-quoted strings are accepted and normalized before the document
//! is deserialized.

use bson::{Bson, Document};

use crate::error::{ParseError, Result};

/// A parsed input statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Blank input; evaluates to nothing.
    Empty,

    Help,

    Exit,

    /// `use <name>` - switch the active database.
    Use(String),

    /// `connect("<url>")` - open a new connection.
    Connect(String),

    /// `show dbs`
    ShowDatabases,

    /// `show collections`
    ShowCollections,

    /// `<name> = <literal>`
    Assign { name: String, value: Bson },

    /// Bare-name lookup in the session namespace.
    Lookup(String),

    /// `db.<collection>.<operation>(...)`
    Query(QueryStatement),
}

/// A collection operation against the active database.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryStatement {
    pub collection: String,
    pub operation: QueryOp,
}

/// The supported collection operations.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOp {
    Find { filter: Document },
    FindOne { filter: Document },
    InsertOne { document: Document },
    InsertMany { documents: Vec<Document> },
    UpdateOne { filter: Document, update: Document },
    UpdateMany { filter: Document, update: Document },
    DeleteOne { filter: Document },
    DeleteMany { filter: Document },
    Aggregate { pipeline: Vec<Document> },
    CountDocuments { filter: Document },
}

/// Statement parser.
pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one complete input statement.
    ///
    /// # Arguments
    ///
    /// * `input` - The raw statement text
    ///
    /// # Returns
    ///
    /// * `Result<Statement>` - The parsed statement or a parse error
    pub fn parse(&self, input: &str) -> Result<Statement> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Ok(Statement::Empty);
        }

        if matches!(trimmed, "exit" | "quit") {
            return Ok(Statement::Exit);
        }

        if trimmed == "help" {
            return Ok(Statement::Help);
        }

        if let Some(rest) = trimmed.strip_prefix("show ") {
            return match rest.trim() {
                "dbs" | "databases" => Ok(Statement::ShowDatabases),
                "collections" => Ok(Statement::ShowCollections),
                other => Err(ParseError::InvalidStatement(format!(
                    "Unknown show command: show {other}"
                ))
                .into()),
            };
        }

        if let Some(rest) = trimmed.strip_prefix("use ") {
            let name = rest.trim();
            if name.is_empty() || !is_identifier(name) {
                return Err(ParseError::InvalidStatement(
                    "use requires a database name".to_string(),
                )
                .into());
            }
            return Ok(Statement::Use(name.to_string()));
        }

        if trimmed.starts_with("connect(") && trimmed.ends_with(')') {
            let inner = &trimmed["connect(".len()..trimmed.len() - 1];
            let url = parse_string_literal(inner.trim()).ok_or_else(|| {
                ParseError::InvalidStatement(
                    "connect takes a quoted connection URL".to_string(),
                )
            })?;
            return Ok(Statement::Connect(url));
        }

        if trimmed.starts_with("db.") {
            return parse_query(trimmed);
        }

        if let Some(eq) = top_level_assignment(trimmed) {
            let name = trimmed[..eq].trim();
            let literal = trimmed[eq + 1..].trim();
            if is_identifier(name) {
                let value = parse_literal(literal)?;
                return Ok(Statement::Assign {
                    name: name.to_string(),
                    value,
                });
            }
        }

        if is_identifier(trimmed) {
            return Ok(Statement::Lookup(trimmed.to_string()));
        }

        Err(ParseError::SyntaxError(format!("Cannot parse statement: {trimmed}")).into())
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `input` forms at least one complete statement.
///
/// Scans for balanced braces, brackets and parentheses outside string
/// literals; an open delimiter or unterminated string means the reader
/// should keep buffering continuation lines.
pub fn is_complete(input: &str) -> bool {
    let mut depth: i32 = 0;
    let mut in_string: Option<char> = None;
    let mut escaped = false;

    for c in input.chars() {
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                in_string = None;
            }
            continue;
        }

        match c {
            '\'' | '"' => in_string = Some(c),
            '{' | '[' | '(' => depth += 1,
            '}' | ']' | ')' => depth -= 1,
            _ => {}
        }

        // Over-closed input is complete; the parser reports the error.
        if depth < 0 {
            return true;
        }
    }

    depth == 0 && in_string.is_none()
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Position of a top-level `=` that is an assignment, not a comparison.
fn top_level_assignment(input: &str) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut depth = 0i32;
    let mut in_string: Option<u8> = None;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == quote {
                in_string = None;
            }
            continue;
        }
        match b {
            b'\'' | b'"' => in_string = Some(b),
            b'{' | b'[' | b'(' => depth += 1,
            b'}' | b']' | b')' => depth -= 1,
            b'=' if depth == 0 => {
                let next = bytes.get(i + 1);
                let prev = i.checked_sub(1).and_then(|p| bytes.get(p));
                if next != Some(&b'=') && !matches!(prev, Some(b'=' | b'!' | b'<' | b'>')) {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_string_literal(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    if s.len() >= 2 {
        let quote = bytes[0];
        if (quote == b'"' || quote == b'\'') && bytes[s.len() - 1] == quote {
            return Some(s[1..s.len() - 1].to_string());
        }
    }
    None
}

/// Parse a literal on the right-hand side of an assignment.
fn parse_literal(s: &str) -> Result<Bson> {
    if let Some(text) = parse_string_literal(s) {
        return Ok(Bson::String(text));
    }
    match s {
        "true" => return Ok(Bson::Boolean(true)),
        "false" => return Ok(Bson::Boolean(false)),
        "null" | "None" => return Ok(Bson::Null),
        _ => {}
    }
    if let Ok(n) = s.parse::<i64>() {
        return Ok(Bson::Int64(n));
    }
    if let Ok(f) = s.parse::<f64>() {
        return Ok(Bson::Double(f));
    }
    parse_json_value(s)
}

/// Parse relaxed-JSON text into a BSON value.
fn parse_json_value(s: &str) -> Result<Bson> {
    let normalized = normalize_relaxed(s);
    let json: serde_json::Value = serde_json::from_str(&normalized)
        .map_err(|e| ParseError::InvalidDocument(format!("{s}: {e}")))?;
    Bson::try_from(json).map_err(|e| ParseError::InvalidDocument(e.to_string()).into())
}

fn parse_json_document(s: &str) -> Result<Document> {
    match parse_json_value(s)? {
        Bson::Document(doc) => Ok(doc),
        _ => Err(ParseError::InvalidDocument(format!("Expected a document: {s}")).into()),
    }
}

fn parse_json_document_array(s: &str) -> Result<Vec<Document>> {
    match parse_json_value(s)? {
        Bson::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Bson::Document(doc) => Ok(doc),
                other => Err(ParseError::InvalidDocument(format!(
                    "Expected a document, got: {other}"
                ))
                .into()),
            })
            .collect(),
        _ => Err(ParseError::InvalidDocument(format!("Expected an array: {s}")).into()),
    }
}

/// Rewrite relaxed JSON into strict JSON.
///
/// Quotes bare object keys (including `$`-prefixed operator keys) and
/// converts single-quoted strings to double-quoted ones. Content inside
/// existing double-quoted strings is left untouched.
fn normalize_relaxed(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 16);
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '"' {
            out.push(c);
            i += 1;
            let mut escaped = false;
            while i < chars.len() {
                let d = chars[i];
                out.push(d);
                i += 1;
                if escaped {
                    escaped = false;
                } else if d == '\\' {
                    escaped = true;
                } else if d == '"' {
                    break;
                }
            }
            continue;
        }

        if c == '\'' {
            out.push('"');
            i += 1;
            let mut escaped = false;
            while i < chars.len() {
                let d = chars[i];
                i += 1;
                if escaped {
                    escaped = false;
                    out.push(d);
                    continue;
                }
                if d == '\\' {
                    escaped = true;
                    out.push(d);
                    continue;
                }
                if d == '\'' {
                    break;
                }
                if d == '"' {
                    out.push('\\');
                }
                out.push(d);
            }
            out.push('"');
            continue;
        }

        if c.is_alphabetic() || c == '_' || c == '$' {
            let start = i;
            while i < chars.len()
                && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$')
            {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();

            let mut j = i;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            // A bare identifier followed by a colon is an object key.
            if chars.get(j) == Some(&':') {
                out.push('"');
                out.push_str(&word);
                out.push('"');
            } else {
                out.push_str(&word);
            }
            continue;
        }

        out.push(c);
        i += 1;
    }

    out
}

/// Split call arguments at top-level commas, string-aware.
fn split_arguments(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut in_string: Option<char> = None;
    let mut escaped = false;

    for c in input.chars() {
        if let Some(quote) = in_string {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                in_string = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => {
                in_string = Some(c);
                current.push(c);
            }
            '{' | '[' | '(' => {
                depth += 1;
                current.push(c);
            }
            '}' | ']' | ')' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    let last = current.trim();
    if !last.is_empty() {
        parts.push(last.to_string());
    }
    parts
}

/// Parse a `db.<collection>.<operation>(<args>)` statement.
fn parse_query(input: &str) -> Result<Statement> {
    let body = &input["db.".len()..];

    let open = body.find('(').ok_or_else(|| {
        ParseError::SyntaxError(format!("Expected a method call: {input}"))
    })?;
    if !body.ends_with(')') {
        return Err(ParseError::SyntaxError(format!("Unterminated call: {input}")).into());
    }

    let path = &body[..open];
    let args_text = &body[open + 1..body.len() - 1];

    // Collection names may themselves contain dots (system.profile).
    let (collection, op_name) = path.rsplit_once('.').ok_or_else(|| {
        ParseError::SyntaxError(format!("Expected db.<collection>.<operation>: {input}"))
    })?;
    if collection.is_empty() {
        return Err(ParseError::SyntaxError(format!(
            "Expected db.<collection>.<operation>: {input}"
        ))
        .into());
    }

    let args = split_arguments(args_text);

    let arg_doc = |idx: usize| -> Result<Document> {
        match args.get(idx) {
            Some(text) => parse_json_document(text),
            None => Ok(Document::new()),
        }
    };
    let required_doc = |idx: usize, what: &str| -> Result<Document> {
        match args.get(idx) {
            Some(text) => parse_json_document(text),
            None => {
                Err(ParseError::InvalidStatement(format!("{op_name} requires {what}")).into())
            }
        }
    };

    let operation = match op_name {
        "find" => QueryOp::Find { filter: arg_doc(0)? },
        "findOne" => QueryOp::FindOne { filter: arg_doc(0)? },
        "insertOne" => QueryOp::InsertOne {
            document: required_doc(0, "a document")?,
        },
        "insertMany" => {
            let text = args.first().ok_or_else(|| {
                ParseError::InvalidStatement(format!(
                    "{op_name} requires an array of documents"
                ))
            })?;
            QueryOp::InsertMany {
                documents: parse_json_document_array(text)?,
            }
        }
        "updateOne" => QueryOp::UpdateOne {
            filter: required_doc(0, "a filter")?,
            update: required_doc(1, "an update document")?,
        },
        "updateMany" => QueryOp::UpdateMany {
            filter: required_doc(0, "a filter")?,
            update: required_doc(1, "an update document")?,
        },
        "deleteOne" => QueryOp::DeleteOne {
            filter: required_doc(0, "a filter")?,
        },
        "deleteMany" => QueryOp::DeleteMany {
            filter: required_doc(0, "a filter")?,
        },
        "aggregate" => {
            let pipeline = match args.first() {
                Some(text) => parse_json_document_array(text)?,
                None => Vec::new(),
            };
            QueryOp::Aggregate { pipeline }
        }
        "countDocuments" => QueryOp::CountDocuments { filter: arg_doc(0)? },
        other => {
            return Err(ParseError::InvalidStatement(format!(
                "Unknown collection operation: {other}"
            ))
            .into());
        }
    };

    Ok(Statement::Query(QueryStatement {
        collection: collection.to_string(),
        operation,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn parse(input: &str) -> Statement {
        Parser::new().parse(input).unwrap()
    }

    #[test]
    fn test_parse_shell_commands() {
        assert_eq!(parse("show dbs"), Statement::ShowDatabases);
        assert_eq!(parse("show databases"), Statement::ShowDatabases);
        assert_eq!(parse("show collections"), Statement::ShowCollections);
        assert_eq!(parse("use app"), Statement::Use("app".to_string()));
        assert_eq!(parse("exit"), Statement::Exit);
        assert_eq!(parse("quit"), Statement::Exit);
        assert_eq!(parse("help"), Statement::Help);
        assert_eq!(parse("  "), Statement::Empty);
    }

    #[test]
    fn test_parse_connect() {
        assert_eq!(
            parse("connect(\"mongodb://localhost/app\")"),
            Statement::Connect("mongodb://localhost/app".to_string())
        );
        assert_eq!(
            parse("connect('mongodb://localhost')"),
            Statement::Connect("mongodb://localhost".to_string())
        );
    }

    #[test]
    fn test_parse_assignment_and_lookup() {
        assert_eq!(
            parse("MAX_PAGE_SIZE = 5"),
            Statement::Assign {
                name: "MAX_PAGE_SIZE".to_string(),
                value: Bson::Int64(5),
            }
        );
        assert_eq!(
            parse("OUTPUT_FORMAT = 'json'"),
            Statement::Assign {
                name: "OUTPUT_FORMAT".to_string(),
                value: Bson::String("json".to_string()),
            }
        );
        assert_eq!(
            parse("DISPLAY_RESULTS = false"),
            Statement::Assign {
                name: "DISPLAY_RESULTS".to_string(),
                value: Bson::Boolean(false),
            }
        );
        assert_eq!(parse("it"), Statement::Lookup("it".to_string()));
        assert_eq!(parse("db"), Statement::Lookup("db".to_string()));
    }

    #[test]
    fn test_parse_find_with_relaxed_json() {
        let stmt = parse("db.users.find({ age: { $gt: 18 } })");
        assert_eq!(
            stmt,
            Statement::Query(QueryStatement {
                collection: "users".to_string(),
                operation: QueryOp::Find {
                    filter: doc! { "age": { "$gt": 18 } },
                },
            })
        );
    }

    #[test]
    fn test_parse_find_empty_filter() {
        let stmt = parse("db.users.find()");
        assert_eq!(
            stmt,
            Statement::Query(QueryStatement {
                collection: "users".to_string(),
                operation: QueryOp::Find { filter: doc! {} },
            })
        );
    }

    #[test]
    fn test_parse_dotted_collection_name() {
        let stmt = parse("db.system.profile.find()");
        match stmt {
            Statement::Query(q) => assert_eq!(q.collection, "system.profile"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_parse_update_with_two_arguments() {
        let stmt = parse("db.users.updateOne({ name: 'a' }, { $set: { age: 2 } })");
        assert_eq!(
            stmt,
            Statement::Query(QueryStatement {
                collection: "users".to_string(),
                operation: QueryOp::UpdateOne {
                    filter: doc! { "name": "a" },
                    update: doc! { "$set": { "age": 2 } },
                },
            })
        );
    }

    #[test]
    fn test_parse_insert_many_array() {
        let stmt = parse("db.users.insertMany([{ a: 1 }, { a: 2 }])");
        assert_eq!(
            stmt,
            Statement::Query(QueryStatement {
                collection: "users".to_string(),
                operation: QueryOp::InsertMany {
                    documents: vec![doc! { "a": 1 }, doc! { "a": 2 }],
                },
            })
        );
    }

    #[test]
    fn test_parse_aggregate_pipeline() {
        let stmt = parse("db.logs.aggregate([{ $match: { level: 'warn' } }])");
        assert_eq!(
            stmt,
            Statement::Query(QueryStatement {
                collection: "logs".to_string(),
                operation: QueryOp::Aggregate {
                    pipeline: vec![doc! { "$match": { "level": "warn" } }],
                },
            })
        );
    }

    #[test]
    fn test_parse_errors() {
        let parser = Parser::new();
        assert!(parser.parse("show everything").is_err());
        assert!(parser.parse("db.users.explode()").is_err());
        assert!(parser.parse("db.users.insertOne()").is_err());
        assert!(parser.parse("1 + 2").is_err());
    }

    #[test]
    fn test_is_complete() {
        assert!(is_complete("db.users.find()"));
        assert!(is_complete("show dbs"));
        assert!(!is_complete("db.users.find({"));
        assert!(!is_complete("db.users.find({ name: 'a"));
        assert!(is_complete("db.users.find({ name: '}' })"));
        assert!(is_complete(""));
    }

    #[test]
    fn test_normalize_relaxed() {
        assert_eq!(normalize_relaxed("{ a: 1 }"), "{ \"a\": 1 }");
        assert_eq!(normalize_relaxed("{ $set: { b: 'x' } }"), "{ \"$set\": { \"b\": \"x\" } }");
        assert_eq!(normalize_relaxed("{ \"a\": true }"), "{ \"a\": true }");
    }
}
