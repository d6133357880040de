//! Session state for the shell.
//!
//! The session is a single shared namespace: every evaluated statement
//! reads and writes the same `bindings` map, and the display flags are a
//! separate typed structure reached through the same accessors. The state
//! also owns the optional handle to the active database; `use` replaces
//! that handle wholesale.

pub mod display;
pub mod page;

use std::collections::HashMap;
use std::sync::Arc;

use bson::{Bson, Document};

use crate::config::{DisplayDefaults, JsonOptions, OutputFormat};
use crate::driver::{CursorHandle, DatabaseHandle, WriteAck};

/// A value in the session namespace.
///
/// This is both what evaluation produces and what bindings hold. The
/// classifier routes on the cursor / write-ack / other distinction.
#[derive(Clone)]
pub enum Value {
    /// The "no result produced" sentinel; never rendered, never bound.
    Unit,

    Bool(bool),

    Int(i64),

    String(String),

    /// An arbitrary BSON value.
    Bson(Bson),

    Document(Document),

    /// A live server cursor.
    Cursor(CursorHandle),

    /// Acknowledgement of a mutating operation.
    WriteAck(WriteAck),

    /// A database handle (produced by `use`, `connect` and `db`).
    Database(Arc<dyn DatabaseHandle>),
}

impl Value {
    /// Whether this is the "no result" sentinel.
    pub fn is_unit(&self) -> bool {
        matches!(self, Value::Unit)
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Unit => write!(f, "Unit"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Bson(b) => write!(f, "Bson({b:?})"),
            Value::Document(d) => write!(f, "Document({d:?})"),
            Value::Cursor(_) => write!(f, "Cursor"),
            Value::WriteAck(a) => write!(f, "WriteAck({a:?})"),
            Value::Database(db) => write!(f, "Database({})", db.name()),
        }
    }
}

/// The fixed set of display-configuration flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    /// `DISPLAY_RESULTS`: whether cursors are paginated and rendered.
    DisplayResults,

    /// `MAX_PAGE_SIZE`: documents rendered per display event.
    MaxPageSize,

    /// `OUTPUT_FORMAT`: `"repr"` or `"json"`.
    OutputFormat,

    /// `OUTPUT_JSON_OPTIONS`: `"relaxed"` or `"canonical"`.
    OutputJsonOptions,

    /// `OUTPUT_JSON_INDENT`: indent width, or null for compact.
    OutputJsonIndent,
}

impl Flag {
    /// The well-known namespace name of this flag.
    pub fn name(&self) -> &'static str {
        match self {
            Flag::DisplayResults => "DISPLAY_RESULTS",
            Flag::MaxPageSize => "MAX_PAGE_SIZE",
            Flag::OutputFormat => "OUTPUT_FORMAT",
            Flag::OutputJsonOptions => "OUTPUT_JSON_OPTIONS",
            Flag::OutputJsonIndent => "OUTPUT_JSON_INDENT",
        }
    }

    /// Look up a flag by its namespace name.
    pub fn from_name(name: &str) -> Option<Flag> {
        match name {
            "DISPLAY_RESULTS" => Some(Flag::DisplayResults),
            "MAX_PAGE_SIZE" => Some(Flag::MaxPageSize),
            "OUTPUT_FORMAT" => Some(Flag::OutputFormat),
            "OUTPUT_JSON_OPTIONS" => Some(Flag::OutputJsonOptions),
            "OUTPUT_JSON_INDENT" => Some(Flag::OutputJsonIndent),
            _ => None,
        }
    }
}

/// Typed flag storage with compiled-in defaults.
///
/// Flag values are stored as raw namespace values; interpretation (with
/// silent fallback to the default on a type mismatch) happens at read
/// time, so evaluated code can never corrupt the display configuration.
#[derive(Debug)]
struct FlagSet {
    values: HashMap<Flag, Value>,
    defaults: DisplayDefaults,
}

impl FlagSet {
    fn new(defaults: DisplayDefaults) -> Self {
        Self {
            values: HashMap::new(),
            defaults,
        }
    }

    fn set(&mut self, flag: Flag, value: Value) {
        self.values.insert(flag, value);
    }

    /// The raw value of a flag, or its default rendered as a value.
    fn raw(&self, flag: Flag) -> Value {
        if let Some(value) = self.values.get(&flag) {
            return value.clone();
        }
        match flag {
            Flag::DisplayResults => Value::Bool(self.defaults.display_results),
            Flag::MaxPageSize => Value::Int(self.defaults.max_page_size),
            Flag::OutputFormat => Value::String(
                match self.defaults.output_format {
                    OutputFormat::Repr => "repr",
                    OutputFormat::Json => "json",
                }
                .to_string(),
            ),
            Flag::OutputJsonOptions => Value::String(
                match self.defaults.json_options.mode {
                    crate::config::JsonMode::Relaxed => "relaxed",
                    crate::config::JsonMode::Canonical => "canonical",
                }
                .to_string(),
            ),
            Flag::OutputJsonIndent => match self.defaults.json_indent {
                Some(n) => Value::Int(n as i64),
                None => Value::Bson(Bson::Null),
            },
        }
    }
}

/// Mutable session state owned by the session driver.
pub struct SessionState {
    /// Evaluation namespace.
    bindings: HashMap<String, Value>,

    /// Display-configuration flags.
    flags: FlagSet,

    /// Handle to the active database, if any.
    current_database: Option<Arc<dyn DatabaseHandle>>,
}

impl SessionState {
    /// Create a session with the given flag defaults and no connection.
    pub fn new(defaults: DisplayDefaults) -> Self {
        Self {
            bindings: HashMap::new(),
            flags: FlagSet::new(defaults),
            current_database: None,
        }
    }

    /// Look up a name.
    ///
    /// Flag names always resolve; unset flags evaluate to their default.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(flag) = Flag::from_name(name) {
            return Some(self.flags.raw(flag));
        }
        self.bindings.get(name).cloned()
    }

    /// Bind a name.
    ///
    /// Well-known flag names are routed into the flag store; everything
    /// else lands in the evaluation namespace. The new value is visible
    /// to the next evaluated statement.
    pub fn set(&mut self, name: &str, value: Value) {
        if let Some(flag) = Flag::from_name(name) {
            self.flags.set(flag, value);
        } else {
            self.bindings.insert(name.to_string(), value);
        }
    }

    /// The active database handle.
    pub fn database(&self) -> Option<Arc<dyn DatabaseHandle>> {
        self.current_database.clone()
    }

    /// Replace the active database handle wholesale.
    pub fn set_database(&mut self, database: Arc<dyn DatabaseHandle>) {
        self.current_database = Some(database);
    }

    /// `DISPLAY_RESULTS`, defaulting on absence or type mismatch.
    pub fn display_results(&self) -> bool {
        match self.flags.raw(Flag::DisplayResults) {
            Value::Bool(b) => b,
            _ => self.flags.defaults.display_results,
        }
    }

    /// `MAX_PAGE_SIZE`, defaulting on absence or type mismatch.
    pub fn max_page_size(&self) -> i64 {
        match self.flags.raw(Flag::MaxPageSize) {
            Value::Int(n) => n,
            _ => self.flags.defaults.max_page_size,
        }
    }

    /// `OUTPUT_FORMAT`; any unrecognized value falls back to repr.
    pub fn output_format(&self) -> OutputFormat {
        match self.flags.raw(Flag::OutputFormat) {
            Value::String(s) => OutputFormat::from_flag(&s),
            _ => self.flags.defaults.output_format,
        }
    }

    /// `OUTPUT_JSON_OPTIONS`; any unrecognized value falls back to relaxed.
    pub fn json_options(&self) -> JsonOptions {
        match self.flags.raw(Flag::OutputJsonOptions) {
            Value::String(s) => JsonOptions::from_flag(&s),
            _ => self.flags.defaults.json_options,
        }
    }

    /// `OUTPUT_JSON_INDENT`; null or absence means compact output.
    pub fn json_indent(&self) -> Option<usize> {
        match self.flags.raw(Flag::OutputJsonIndent) {
            Value::Int(n) if n >= 0 => Some(n as usize),
            Value::Bson(Bson::Null) => None,
            Value::Int(_) => None,
            _ => self.flags.defaults.json_indent,
        }
    }
}
