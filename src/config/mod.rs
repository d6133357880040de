//! Configuration defaults for mongorsh.
//!
//! There is no configuration file or environment-variable layer: session
//! flags live in the session namespace and are changed by evaluating
//! assignment statements. This module only supplies the compiled-in
//! defaults those flags fall back to, plus logging settings.

/// Output format for cursor documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Shell-style literal representation (default).
    ///
    /// Uses type wrappers such as ObjectId('...') and Long('...'),
    /// pretty-printed nested documents and arrays.
    Repr,

    /// MongoDB extended JSON.
    ///
    /// Honors `OUTPUT_JSON_OPTIONS` and `OUTPUT_JSON_INDENT`.
    Json,
}

impl OutputFormat {
    /// Map a flag string to a format.
    ///
    /// Anything other than `"json"` falls back to `Repr`; an
    /// unrecognized format is not an error.
    pub fn from_flag(value: &str) -> Self {
        match value {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Repr,
        }
    }
}

/// Extended JSON flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonMode {
    /// Relaxed extended JSON (human-oriented).
    #[default]
    Relaxed,

    /// Canonical extended JSON (round-trippable).
    Canonical,
}

/// Serialization-option bundle for JSON output.
///
/// This is the value behind the `OUTPUT_JSON_OPTIONS` session flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonOptions {
    /// Extended JSON flavor.
    pub mode: JsonMode,
}

impl JsonOptions {
    /// Map a flag string to an option bundle.
    ///
    /// Anything other than `"canonical"` falls back to relaxed.
    pub fn from_flag(value: &str) -> Self {
        match value {
            "canonical" => JsonOptions {
                mode: JsonMode::Canonical,
            },
            _ => JsonOptions {
                mode: JsonMode::Relaxed,
            },
        }
    }
}

/// Compiled-in defaults for the session display flags.
#[derive(Debug, Clone)]
pub struct DisplayDefaults {
    /// Whether cursor results are paginated and rendered (`DISPLAY_RESULTS`).
    pub display_results: bool,

    /// Maximum number of documents rendered per display event
    /// (`MAX_PAGE_SIZE`).
    pub max_page_size: i64,

    /// Output format for cursor documents (`OUTPUT_FORMAT`).
    pub output_format: OutputFormat,

    /// JSON serialization options (`OUTPUT_JSON_OPTIONS`).
    pub json_options: JsonOptions,

    /// JSON indent width, `None` for compact output
    /// (`OUTPUT_JSON_INDENT`).
    pub json_indent: Option<usize>,
}

impl Default for DisplayDefaults {
    fn default() -> Self {
        Self {
            display_results: true,
            max_page_size: 20,
            output_format: OutputFormat::Repr,
            json_options: JsonOptions::default(),
            json_indent: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace).
    pub level: LogLevel,

    /// Enable timestamps in logs.
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            timestamps: false,
        }
    }
}

/// Log level options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`.
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
