//! # Scientific Function Preprocessor
//!
//! Rewrites calls to `sin`, `cos`, `tan`, `log`, `ln` and `sqrt` into
//! numeric literals so that the [`evaluator`](crate::evaluator) only ever
//! sees plain arithmetic.
//!
//! Only calls whose argument contains no parentheses are matched. Each
//! rewrite removes one innermost call, so nested calls resolve from the
//! inside out until no call is left. Every rewrite removes one `(`, so the
//! loop never needs more steps than the input has opening parentheses; the
//! budget is that count or `max_rewrites`, whichever is larger, and running
//! past it fails with [`CalcError::RewriteLimit`].
//!
//! Trigonometric arguments are in degrees. Exact zeros and the undefined
//! tangent are decided on the degree value before converting to radians:
//!
//! | call      | condition                         | result |
//! |-----------|-----------------------------------|--------|
//! | `cos(θ)`  | `θ % 90 == 0` and `θ % 180 != 0`  | `0`    |
//! | `sin(θ)`  | `θ % 180 == 0`                    | `0`    |
//! | `tan(θ)`  | `θ % 180 == 0`                    | `0`    |
//! | `tan(θ)`  | `θ % 180 == 90`                   | `NaN`  |
//!
//! ## Example
//!
//! ```rust
//! use calc_core::scientific::{preprocess, Constants};
//!
//! let constants = Constants::default();
//! assert_eq!(preprocess("sin(180)", &constants, 64).unwrap(), "0");
//! assert_eq!(preprocess("2*sqrt(sqrt(16))", &constants, 64).unwrap(), "2*2");
//! assert_eq!(preprocess("tan(90)", &constants, 64).unwrap(), "NaN");
//! ```

use std::f64::consts::{E, PI};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcError, CalcResult};
use crate::evaluator::{evaluate, Grammar};

/// Symbol the keypad inserts for π
pub const PI_SYMBOL: &str = "π";

/// Symbol the keypad inserts for Euler's number
pub const E_SYMBOL: &str = "e";

/// A function call whose argument holds no parentheses.
static FUNCTION_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(sin|cos|tan|log|ln|sqrt)\(([^()]+)\)").expect("function call pattern is valid")
});

/// Values substituted for the `π` and `e` symbols.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constants {
    pub pi: f64,
    pub e: f64,
}

impl Default for Constants {
    fn default() -> Self {
        Constants { pi: PI, e: E }
    }
}

impl Constants {
    /// Replace every `π` and then every `e` in `text` with its decimal value.
    ///
    /// This is a plain textual substitution: `2π` becomes `23.14159...`,
    /// there is no implicit multiplication.
    pub fn substitute(&self, text: &str) -> String {
        text.replace(PI_SYMBOL, &self.pi.to_string())
            .replace(E_SYMBOL, &self.e.to_string())
    }
}

/// The functions the preprocessor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScientificFunction {
    Sin,
    Cos,
    Tan,
    /// Base-10 logarithm
    Log,
    /// Natural logarithm
    Ln,
    Sqrt,
}

impl ScientificFunction {
    /// Look up a function by the name used in expressions
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(ScientificFunction::Sin),
            "cos" => Some(ScientificFunction::Cos),
            "tan" => Some(ScientificFunction::Tan),
            "log" => Some(ScientificFunction::Log),
            "ln" => Some(ScientificFunction::Ln),
            "sqrt" => Some(ScientificFunction::Sqrt),
            _ => None,
        }
    }

    /// Name as written in expressions
    pub fn name(self) -> &'static str {
        match self {
            ScientificFunction::Sin => "sin",
            ScientificFunction::Cos => "cos",
            ScientificFunction::Tan => "tan",
            ScientificFunction::Log => "log",
            ScientificFunction::Ln => "ln",
            ScientificFunction::Sqrt => "sqrt",
        }
    }

    /// Whether the argument is an angle in degrees
    pub fn is_trigonometric(self) -> bool {
        matches!(
            self,
            ScientificFunction::Sin | ScientificFunction::Cos | ScientificFunction::Tan
        )
    }

    /// Apply the function to an already evaluated argument.
    ///
    /// Domain violations follow IEEE 754 (`sqrt(-1)` and `log(-1)` are
    /// `NaN`, `ln(0)` is `-inf`); the formatter turns them into errors.
    pub fn apply(self, argument: f64) -> f64 {
        match self {
            ScientificFunction::Sin => {
                if argument % 180.0 == 0.0 {
                    0.0
                } else {
                    argument.to_radians().sin()
                }
            }
            ScientificFunction::Cos => {
                if argument % 90.0 == 0.0 && argument % 180.0 != 0.0 {
                    0.0
                } else {
                    argument.to_radians().cos()
                }
            }
            ScientificFunction::Tan => {
                let remainder = argument % 180.0;
                if remainder == 0.0 {
                    0.0
                } else if remainder == 90.0 {
                    f64::NAN
                } else {
                    argument.to_radians().tan()
                }
            }
            ScientificFunction::Log => argument.log10(),
            ScientificFunction::Ln => argument.ln(),
            ScientificFunction::Sqrt => argument.sqrt(),
        }
    }
}

/// Rewrite every function call in `expr` into a numeric literal.
///
/// Arguments are evaluated with the scientific grammar after constant
/// substitution. A failing argument reports the function it belonged to.
/// Expressions with more calls than `max_rewrites` still rewrite fully.
pub fn preprocess(expr: &str, constants: &Constants, max_rewrites: usize) -> CalcResult<String> {
    let mut processed = expr.to_string();
    let mut rewrites = 0;
    let budget = max_rewrites.max(expr.matches('(').count());

    loop {
        let (range, function, argument) = match FUNCTION_CALL.captures(&processed) {
            Some(caps) => {
                let (Some(whole), Some(name), Some(argument)) = (caps.get(0), caps.get(1), caps.get(2)) else {
                    return Ok(processed);
                };
                let Some(function) = ScientificFunction::from_name(name.as_str()) else {
                    return Ok(processed);
                };
                (whole.range(), function, argument.as_str().to_string())
            }
            None => return Ok(processed),
        };

        if rewrites >= budget {
            debug!(limit = budget, expression = %expr, "rewrite budget exhausted");
            return Err(CalcError::RewriteLimit { limit: budget });
        }
        rewrites += 1;

        let value = evaluate(&constants.substitute(&argument), Grammar::Scientific)
            .map_err(|e| CalcError::function(function.name(), e.to_string()))?;
        let result = function.apply(value);
        let literal = result.to_string();

        debug!(
            function = function.name(),
            argument = value,
            result = result,
            "rewrote function call"
        );

        processed.replace_range(range, &literal);
    }
}
