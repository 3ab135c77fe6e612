//! # Result Formatter
//!
//! Turns evaluation outcomes into the strings the calculator displays and
//! the history stores. Only three error strings ever reach the user:
//!
//! - [`DisplayString::ERROR`] for syntax, function and radix failures
//! - [`DisplayString::UNDEFINED`] for `NaN`
//! - [`DisplayString::INFINITY`] for `±inf`
//!
//! ## Example
//!
//! ```rust
//! use calc_core::format::{format, NumericResult};
//!
//! assert_eq!(format(NumericResult::from_value(14.0), 10).as_str(), "14");
//! assert_eq!(format(NumericResult::from_value(1.0 / 3.0), 10).as_str(), "0.3333333333");
//! assert_eq!(format(NumericResult::from_value(f64::NAN), 10).as_str(), "Error: Undefined");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::errors::CalcResult;
use crate::radix::{from_decimal, truncate, Radix};

/// Outcome of evaluating one expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericResult {
    /// A finite value
    Value(f64),
    /// `NaN`, e.g. `sqrt(-1)` or `tan(90)`
    Undefined,
    /// `±inf`, e.g. `1/0`
    Infinite,
    /// Any syntax, function or radix failure upstream
    Syntax,
}

impl NumericResult {
    /// Classify a raw evaluator value.
    pub fn from_value(value: f64) -> Self {
        if value.is_nan() {
            NumericResult::Undefined
        } else if value.is_infinite() {
            NumericResult::Infinite
        } else {
            NumericResult::Value(value)
        }
    }

    /// Collapse a pipeline outcome; any error becomes [`NumericResult::Syntax`].
    pub fn from_outcome(outcome: CalcResult<f64>) -> Self {
        match outcome {
            Ok(value) => NumericResult::from_value(value),
            Err(e) => {
                trace!(code = e.error_code(), error = %e, "evaluation failed");
                NumericResult::Syntax
            }
        }
    }

    /// The finite value, if any
    pub fn value(self) -> Option<f64> {
        match self {
            NumericResult::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_error(self) -> bool {
        !matches!(self, NumericResult::Value(_))
    }
}

/// Anything the formatter can render: an evaluation outcome, or an integer
/// already in the 64-bit domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Formattable {
    Outcome(NumericResult),
    Integer(i64),
}

impl From<NumericResult> for Formattable {
    fn from(result: NumericResult) -> Self {
        Formattable::Outcome(result)
    }
}

impl From<i64> for Formattable {
    fn from(value: i64) -> Self {
        Formattable::Integer(value)
    }
}

/// Rendered result, the only form that is ever shown or persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayString(String);

impl DisplayString {
    pub const ERROR: &'static str = "Error";
    pub const UNDEFINED: &'static str = "Error: Undefined";
    pub const INFINITY: &'static str = "Error: Infinity";

    pub fn new(text: impl Into<String>) -> Self {
        DisplayString(text.into())
    }

    pub fn error() -> Self {
        DisplayString::new(Self::ERROR)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// True for the plain `"Error"` only
    pub fn is_plain_error(&self) -> bool {
        self.0 == Self::ERROR
    }

    /// True for any of the three error strings
    pub fn is_error(&self) -> bool {
        matches!(self.0.as_str(), Self::ERROR | Self::UNDEFINED | Self::INFINITY)
    }
}

impl fmt::Display for DisplayString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DisplayString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Render a result in decimal with up to `fraction_digits` decimals.
pub fn format(result: NumericResult, fraction_digits: usize) -> DisplayString {
    match result {
        NumericResult::Value(v) => DisplayString::new(format_value(v, fraction_digits)),
        NumericResult::Undefined => DisplayString::new(DisplayString::UNDEFINED),
        NumericResult::Infinite => DisplayString::new(DisplayString::INFINITY),
        NumericResult::Syntax => DisplayString::error(),
    }
}

/// Render a result in programmer mode: truncated toward zero and written
/// in `radix`. Every error outcome collapses to `"Error"`.
pub fn format_programmer(result: NumericResult, radix: Radix) -> DisplayString {
    match result {
        NumericResult::Value(v) => DisplayString::new(from_decimal(truncate(v), radix)),
        _ => DisplayString::error(),
    }
}

/// Render an integer exactly, in decimal or in `radix`.
pub fn format_integer(value: i64, radix: Option<Radix>) -> DisplayString {
    match radix {
        Some(radix) => DisplayString::new(from_decimal(value, radix)),
        None => DisplayString::new(value.to_string()),
    }
}

/// Canonical decimal rendering of a finite value.
///
/// Whole numbers print without a decimal point (truncated into `i64`; larger
/// magnitudes saturate). Everything else prints `fraction_digits` decimals
/// with trailing zeros and a dangling point removed.
pub fn format_value(value: f64, fraction_digits: usize) -> String {
    if value % 1.0 == 0.0 {
        return (value as i64).to_string();
    }

    let fixed = format!("{:.*}", fraction_digits, value);
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };

    match trimmed {
        "" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}
