//! mongorsh - interactive MongoDB shell
//!
//! The core of this crate is a small session engine: every evaluated
//! statement produces a value that is classified (cursor, write
//! acknowledgement, or plain value), rendered under session-scoped
//! display flags, and recorded in well-known bindings (`_`, `it`,
//! `res`). Around that sit a statement parser, a paginating renderer,
//! a topology-aware prompt and a reedline-driven REPL.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing
//! - `config`: Display flag defaults and logging configuration
//! - `driver`: Narrow database interface and the `mongodb` adapter
//! - `error`: Error types and handling
//! - `executor`: Statement evaluation
//! - `formatter`: Shell-style and Extended JSON rendering
//! - `output`: Output sink abstraction
//! - `parser`: Statement parsing and completeness detection
//! - `repl`: Interactive loop, prompt and input validation
//! - `session`: Session state, result classification, pagination
//! - `utils`: Size formatting helpers

pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod executor;
pub mod formatter;
pub mod output;
pub mod parser;
pub mod repl;
pub mod session;
pub mod utils;

// Re-export commonly used types
pub use config::DisplayDefaults;
pub use error::{Result, ShellError};
pub use parser::{Parser, Statement};
pub use repl::ShellEngine;
pub use session::{SessionState, Value};
