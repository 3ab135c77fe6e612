//! # Error Types
//!
//! Structured error types for calc_core. Every stage of the engine fails
//! fast with one of these and hands it back to the caller; nothing in the
//! engine panics on malformed input.
//!
//! The calculator only ever shows three fixed strings to the user (see
//! [`crate::format`]), but the structured error keeps enough context for
//! logging and for JSON consumers.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::errors::{CalcError, CalcResult};
//!
//! fn require_digits(literal: &str) -> CalcResult<()> {
//!     if literal.is_empty() {
//!         return Err(CalcError::syntax(0, "end of input"));
//!     }
//!     Ok(())
//! }
//!
//! assert_eq!(require_digits("").unwrap_err().error_code(), "SYNTAX_ERROR");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for calc_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for engine and history operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// Malformed expression: unexpected character or leftover input
    #[error("Syntax error at position {position}: unexpected {found}")]
    Syntax { position: usize, found: String },

    /// The argument of a scientific function failed to evaluate
    #[error("Error in {function}: {reason}")]
    Function { function: String, reason: String },

    /// A literal is not a valid integer in the declared radix
    #[error("Invalid digit in '{literal}' for base {radix}")]
    InvalidDigit { literal: String, radix: u32 },

    /// A radix outside of 2, 8, 10, 16
    #[error("Unsupported radix: {radix}")]
    UnsupportedRadix { radix: u32 },

    /// The function preprocessor did not reach a fixed point in time
    #[error("Function rewriting exceeded {limit} steps")]
    RewriteLimit { limit: usize },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl CalcError {
    /// Create a Syntax error
    pub fn syntax(position: usize, found: impl Into<String>) -> Self {
        CalcError::Syntax {
            position,
            found: found.into(),
        }
    }

    /// Create a Function error
    pub fn function(function: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::Function {
            function: function.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidDigit error
    pub fn invalid_digit(literal: impl Into<String>, radix: u32) -> Self {
        CalcError::InvalidDigit {
            literal: literal.into(),
            radix,
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        CalcError::SerializationError {
            reason: reason.into(),
        }
    }

    /// True for errors raised while evaluating an expression, as opposed
    /// to history persistence.
    pub fn is_evaluation_error(&self) -> bool {
        matches!(
            self,
            CalcError::Syntax { .. }
                | CalcError::Function { .. }
                | CalcError::InvalidDigit { .. }
                | CalcError::UnsupportedRadix { .. }
                | CalcError::RewriteLimit { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::Syntax { .. } => "SYNTAX_ERROR",
            CalcError::Function { .. } => "FUNCTION_ERROR",
            CalcError::InvalidDigit { .. } => "INVALID_DIGIT",
            CalcError::UnsupportedRadix { .. } => "UNSUPPORTED_RADIX",
            CalcError::RewriteLimit { .. } => "REWRITE_LIMIT",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}
