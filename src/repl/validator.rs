//! Validator for reedline - detects statements needing continuation lines

use reedline::{ValidationResult, Validator};

use crate::parser;

/// Completeness validator for shell statements
pub struct StatementValidator;

impl StatementValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StatementValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for StatementValidator {
    /// Validate input for completeness
    ///
    /// # Arguments
    /// * `line` - The input line to validate
    ///
    /// # Returns
    /// * `ValidationResult` - Whether the input is complete or needs more lines
    fn validate(&self, line: &str) -> ValidationResult {
        if parser::is_complete(line) {
            ValidationResult::Complete
        } else {
            ValidationResult::Incomplete
        }
    }
}
