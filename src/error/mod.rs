//! Error handling for mongorsh.
//!
//! This module provides the crate-wide error taxonomy:
//! - Connection errors (fatal at startup, ordinary evaluation errors later)
//! - Parse errors for shell statements
//! - Evaluation errors raised while executing a statement
//! - Startup-script errors, which escalate to process termination

use std::{fmt, io};

/// Crate-wide `Result` type using [`ShellError`] as the error.
pub type Result<T> = std::result::Result<T, ShellError>;

/// Top-level error type for shell operations.
///
/// Wraps more specific error kinds and provides a single error type that
/// can be used throughout the crate.
#[derive(Debug)]
pub enum ShellError {
    /// Connection-related errors.
    Connection(ConnectionError),

    /// Statement parsing errors.
    Parse(ParseError),

    /// Statement evaluation errors.
    Eval(EvalError),

    /// Startup-script errors.
    Script(ScriptError),

    /// I/O errors.
    Io(io::Error),

    /// MongoDB driver errors.
    MongoDb(mongodb::error::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Connection-specific errors.
#[derive(Debug)]
pub enum ConnectionError {
    /// Failed to establish a connection.
    ConnectionFailed(String),

    /// Invalid connection URL.
    InvalidUrl(String),

    /// No database is currently active.
    NotConnected,
}

/// Parsing-specific errors.
#[derive(Debug)]
pub enum ParseError {
    /// Syntax error in a statement.
    SyntaxError(String),

    /// Input is not a recognized statement form.
    InvalidStatement(String),

    /// A document/pipeline argument failed to parse.
    InvalidDocument(String),

    /// Statement ended while a delimiter or string was still open.
    Incomplete,
}

/// Evaluation-specific errors.
#[derive(Debug)]
pub enum EvalError {
    /// Name is not bound in the session namespace.
    UnknownName(String),

    /// Operation is not supported by the shell.
    UnsupportedOperation(String),

    /// Invalid operation arguments.
    InvalidArguments(String),

    /// Error while pulling from a cursor.
    CursorError(String),
}

/// Startup-script errors.
#[derive(Debug)]
pub enum ScriptError {
    /// A statement in the startup script failed.
    StatementFailed(String),

    /// The script ended with an incomplete statement.
    IncompleteStatement,
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::Connection(e) => write!(f, "Connection error: {e}"),
            ShellError::Parse(e) => write!(f, "{e}"),
            ShellError::Eval(e) => write!(f, "Evaluation error: {e}"),
            ShellError::Script(e) => write!(f, "Startup script error: {e}"),
            ShellError::Io(e) => write!(f, "I/O error: {e}"),
            ShellError::MongoDb(e) => write!(f, "MongoDB error: {e}"),
            ShellError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::ConnectionFailed(msg) => write!(f, "Failed to connect: {msg}"),
            ConnectionError::InvalidUrl(url) => write!(f, "Invalid connection URL: {url}"),
            ConnectionError::NotConnected => write!(f, "No default connection"),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::SyntaxError(msg) => write!(f, "Syntax error: {msg}"),
            ParseError::InvalidStatement(stmt) => write!(f, "Invalid statement: {stmt}"),
            ParseError::InvalidDocument(msg) => write!(f, "Invalid document: {msg}"),
            ParseError::Incomplete => write!(f, "Incomplete statement"),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::UnknownName(name) => write!(f, "name '{name}' is not defined"),
            EvalError::UnsupportedOperation(op) => write!(f, "Unsupported operation: {op}"),
            EvalError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            EvalError::CursorError(msg) => write!(f, "Cursor error: {msg}"),
        }
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::StatementFailed(msg) => write!(f, "{msg}"),
            ScriptError::IncompleteStatement => {
                write!(f, "script ends with an incomplete statement")
            }
        }
    }
}

impl std::error::Error for ShellError {}
impl std::error::Error for ConnectionError {}
impl std::error::Error for ParseError {}
impl std::error::Error for EvalError {}
impl std::error::Error for ScriptError {}

/* ========================= Conversions to ShellError ========================= */

impl From<io::Error> for ShellError {
    fn from(err: io::Error) -> Self {
        ShellError::Io(err)
    }
}

impl From<mongodb::error::Error> for ShellError {
    fn from(err: mongodb::error::Error) -> Self {
        ShellError::MongoDb(err)
    }
}

impl From<ConnectionError> for ShellError {
    fn from(err: ConnectionError) -> Self {
        ShellError::Connection(err)
    }
}

impl From<ParseError> for ShellError {
    fn from(err: ParseError) -> Self {
        ShellError::Parse(err)
    }
}

impl From<EvalError> for ShellError {
    fn from(err: EvalError) -> Self {
        ShellError::Eval(err)
    }
}

impl From<ScriptError> for ShellError {
    fn from(err: ScriptError) -> Self {
        ShellError::Script(err)
    }
}

impl From<String> for ShellError {
    fn from(msg: String) -> Self {
        ShellError::Generic(msg)
    }
}

impl From<&str> for ShellError {
    fn from(msg: &str) -> Self {
        ShellError::Generic(msg.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_not_connected() {
        let err = ShellError::from(ConnectionError::NotConnected);
        assert_eq!(err.to_string(), "Connection error: No default connection");
    }

    #[test]
    fn test_display_unknown_name() {
        let err = ShellError::from(EvalError::UnknownName("foo".to_string()));
        assert_eq!(
            err.to_string(),
            "Evaluation error: name 'foo' is not defined"
        );
    }

    #[test]
    fn test_from_str() {
        let err: ShellError = "boom".into();
        assert!(matches!(err, ShellError::Generic(ref m) if m == "boom"));
    }
}
