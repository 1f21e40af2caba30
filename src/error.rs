//! Diagnostics for the scanner and parser
//!
//! Every syntax problem is reported as a [`ParseError`]. Whether a problem aborts the
//! parse or is merely recorded is decided in one place, the [`ErrorHandler`].

use serde::Serialize;
use thiserror::Error;

/// A single diagnostic record.
///
/// `message` always reads `"Line {line_number}: {description}"`. `column` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct ParseError {
    pub name: String,
    pub message: String,
    pub index: usize,
    pub line_number: usize,
    pub column: usize,
    pub description: String,
}

/// Strict-vs-tolerant diagnostic policy shared by the scanner and parser.
#[derive(Debug, Clone, Default)]
pub struct ErrorHandler {
    errors: Vec<ParseError>,
    tolerant: bool,
}

impl ErrorHandler {
    pub fn new(tolerant: bool) -> Self {
        Self {
            errors: Vec::new(),
            tolerant,
        }
    }

    pub fn is_tolerant(&self) -> bool {
        self.tolerant
    }

    /// Errors recorded so far, in the order they were tolerated.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    pub fn record_error(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// Record `error` in tolerant mode, hand it back as `Err` otherwise.
    pub fn tolerate(&mut self, error: ParseError) -> Result<(), ParseError> {
        if self.tolerant {
            self.record_error(error);
            Ok(())
        } else {
            Err(error)
        }
    }

    pub fn create_error(
        index: usize,
        line: usize,
        column: usize,
        description: impl Into<String>,
    ) -> ParseError {
        let description = description.into();
        ParseError {
            name: "Error".to_string(),
            message: format!("Line {}: {}", line, description),
            index,
            line_number: line,
            column,
            description,
        }
    }

    /// Build a diagnostic and raise it unconditionally.
    pub fn throw_error<T>(
        index: usize,
        line: usize,
        column: usize,
        description: impl Into<String>,
    ) -> Result<T, ParseError> {
        Err(Self::create_error(index, line, column, description))
    }

    pub fn tolerate_error(
        &mut self,
        index: usize,
        line: usize,
        column: usize,
        description: impl Into<String>,
    ) -> Result<(), ParseError> {
        self.tolerate(Self::create_error(index, line, column, description))
    }

    /// Number of recorded errors, used to roll back speculative scanning.
    pub(crate) fn checkpoint(&self) -> usize {
        self.errors.len()
    }

    pub(crate) fn rollback(&mut self, checkpoint: usize) {
        self.errors.truncate(checkpoint);
    }
}

/// Message table. `%0`/`%1` placeholders are filled by [`messages::format`].
pub mod messages {
    pub const UNEXPECTED_TOKEN: &str = "Unexpected token %0";
    pub const UNEXPECTED_TOKEN_ILLEGAL: &str = "Unexpected token ILLEGAL";
    pub const UNEXPECTED_NUMBER: &str = "Unexpected number";
    pub const UNEXPECTED_STRING: &str = "Unexpected string";
    pub const UNEXPECTED_IDENTIFIER: &str = "Unexpected identifier";
    pub const UNEXPECTED_RESERVED: &str = "Unexpected reserved word";
    pub const UNEXPECTED_EOS: &str = "Unexpected end of input";
    pub const INVALID_LHS_IN_ASSIGNMENT: &str = "Invalid left-hand side in assignment";
    pub const ILLEGAL_BREAK: &str = "Illegal break statement";
    pub const ILLEGAL_CONTINUE: &str = "Illegal continue statement";
    pub const ILLEGAL_RETURN: &str = "Illegal return statement";
    pub const UNKNOWN_LABEL: &str = "Undefined label '%0'";
    pub const REDECLARATION: &str = "%0 '%1' has already been declared";
    pub const DECLARATION_MISSING_INITIALIZER: &str = "Missing initializer in %0 declaration";
    pub const NEWLINE_AFTER_THROW: &str = "Illegal newline after throw";
    pub const LET_IN_LEXICAL_BINDING: &str = "let is disallowed as a lexically bound name";
    pub const INVALID_ESCAPED_RESERVED_WORD: &str = "Keyword must not contain escaped characters";
    pub const INVALID_HEX_ESCAPE_SEQUENCE: &str = "Invalid hexadecimal escape sequence";

    /// Substitute `%0`, `%1`, ... with `values`.
    pub fn format(template: &str, values: &[&str]) -> String {
        values
            .iter()
            .enumerate()
            .fold(template.to_string(), |message, (i, value)| {
                message.replace(&format!("%{}", i), value)
            })
    }
}
