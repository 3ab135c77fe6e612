//! # Engine
//!
//! The entry points collaborators call. [`Engine`] binds the pure stages
//! to an [`EngineSettings`]; it holds no mutable state, so one instance can
//! be shared freely between threads.
//!
//! ## Pipelines
//!
//! ```text
//! engineering:  preprocess → substitute π, e → evaluate (with ^) → format
//! programmer:   to_decimal → evaluate (no ^) → truncate → from_decimal
//! ```
//!
//! ## Example
//!
//! ```rust
//! use calc_core::engine::Engine;
//! use calc_core::radix::Radix;
//!
//! let engine = Engine::default();
//! assert_eq!(engine.calculate_scientific("2^3^2").as_str(), "64");
//! assert_eq!(engine.calculate_scientific("tan(90)").as_str(), "Error: Undefined");
//! assert_eq!(engine.calculate_programmer("FF+1", Radix::Hex).as_str(), "100");
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::CalcResult;
use crate::evaluator::{self, Grammar};
use crate::format::{self, DisplayString, Formattable, NumericResult};
use crate::radix::{self, Radix};
use crate::scientific;
use crate::settings::EngineSettings;

/// Which calculator produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculatorMode {
    /// Scientific calculator (degrees, functions, `^`)
    Engineering,
    /// Integer calculator in base 2/8/10/16
    Programmer,
    /// Function plotter
    Graph,
}

impl CalculatorMode {
    /// Tag stored alongside history entries
    pub fn tag(self) -> &'static str {
        match self {
            CalculatorMode::Engineering => "engineering",
            CalculatorMode::Programmer => "programmer",
            CalculatorMode::Graph => "graph",
        }
    }
}

/// How a result should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Decimal,
    Programmer(Radix),
}

/// Evaluation engine configured by [`EngineSettings`].
#[derive(Debug, Clone, Default)]
pub struct Engine {
    settings: EngineSettings,
}

impl Engine {
    pub fn new(settings: EngineSettings) -> Self {
        Engine { settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Evaluate plain arithmetic (no function calls, no constants).
    pub fn evaluate(&self, expression: &str) -> NumericResult {
        NumericResult::from_outcome(evaluator::evaluate(expression, Grammar::Scientific))
    }

    /// Rewrite scientific function calls into literals.
    pub fn preprocess_scientific(&self, expression: &str) -> CalcResult<String> {
        scientific::preprocess(expression, &self.settings.constants, self.settings.max_rewrites)
    }

    /// Rewrite the literals of `expression` from `radix` into decimal.
    pub fn convert_to_decimal(&self, expression: &str, radix: Radix) -> CalcResult<String> {
        radix::to_decimal(expression, radix)
    }

    /// Render an integer in `radix`.
    pub fn convert_from_decimal(&self, value: i64, radix: Radix) -> String {
        radix::from_decimal(value, radix)
    }

    /// Render an outcome or an integer for display.
    pub fn format(&self, value: impl Into<Formattable>, mode: OutputMode) -> DisplayString {
        match (value.into(), mode) {
            (Formattable::Outcome(result), OutputMode::Decimal) => {
                format::format(result, self.settings.fraction_digits)
            }
            (Formattable::Outcome(result), OutputMode::Programmer(radix)) => {
                format::format_programmer(result, radix)
            }
            (Formattable::Integer(value), OutputMode::Decimal) => format::format_integer(value, None),
            (Formattable::Integer(value), OutputMode::Programmer(radix)) => {
                format::format_integer(value, Some(radix))
            }
        }
    }

    /// Full engineering pipeline, returning the raw outcome.
    pub fn evaluate_scientific(&self, expression: &str) -> NumericResult {
        let outcome = self.preprocess_scientific(expression).and_then(|rewritten| {
            let substituted = self.settings.constants.substitute(&rewritten);
            debug!(expression = %expression, rewritten = %substituted, "evaluating");
            evaluator::evaluate(&substituted, Grammar::Scientific)
        });
        NumericResult::from_outcome(outcome)
    }

    /// Full engineering pipeline, rendered.
    pub fn calculate_scientific(&self, expression: &str) -> DisplayString {
        self.format(self.evaluate_scientific(expression), OutputMode::Decimal)
    }

    /// Full programmer pipeline, returning the raw outcome.
    pub fn evaluate_programmer(&self, expression: &str, radix: Radix) -> NumericResult {
        let outcome = self
            .convert_to_decimal(expression, radix)
            .and_then(|decimal| evaluator::evaluate(&decimal, Grammar::Programmer));
        NumericResult::from_outcome(outcome)
    }

    /// Full programmer pipeline, rendered in `radix`.
    pub fn calculate_programmer(&self, expression: &str, radix: Radix) -> DisplayString {
        self.format(self.evaluate_programmer(expression, radix), OutputMode::Programmer(radix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sci(expr: &str) -> String {
        Engine::default().calculate_scientific(expr).into_string()
    }

    fn prog(expr: &str, radix: Radix) -> String {
        Engine::default().calculate_programmer(expr, radix).into_string()
    }

    #[test]
    fn test_scientific_pipeline() {
        assert_eq!(sci("2+3*4"), "14");
        assert_eq!(sci("(2+3)*4"), "20");
        assert_eq!(sci("2^3^2"), "64");
        assert_eq!(sci("sin(30)"), "0.5");
        assert_eq!(sci("cos(90)+1"), "1");
        assert_eq!(sci("2*sqrt(16)"), "8");
        assert_eq!(sci("log(1000)"), "3");
    }

    #[test]
    fn test_scientific_error_strings() {
        assert_eq!(sci("tan(90)"), "Error: Undefined");
        assert_eq!(sci("sqrt(-1)"), "Error: Undefined");
        assert_eq!(sci("1/0"), "Error: Infinity");
        assert_eq!(sci("ln(0)"), "Error: Infinity");
        assert_eq!(sci("2++"), "Error");
        assert_eq!(sci("sqrt(2+)"), "Error");
        assert_eq!(sci("foo(2)"), "Error");
    }

    #[test]
    fn test_constants() {
        assert_eq!(sci("π"), "3.1415926536");
        assert_eq!(sci("e"), "2.7182818285");
        assert_eq!(sci("2*π"), "6.2831853072");
    }

    #[test]
    fn test_programmer_pipeline() {
        assert_eq!(prog("FF+1", Radix::Hex), "100");
        assert_eq!(prog("101+1", Radix::Bin), "110");
        assert_eq!(prog("7/2", Radix::Dec), "3");
        assert_eq!(prog("0-7/2", Radix::Oct), "-3");
        assert_eq!(prog("(10+6)*2", Radix::Oct), "34");
    }

    #[test]
    fn test_programmer_errors_collapse() {
        assert_eq!(prog("1/0", Radix::Dec), "Error");
        assert_eq!(prog("0/0", Radix::Hex), "Error");
        assert_eq!(prog("2", Radix::Bin), "Error");
        assert_eq!(prog("2^3", Radix::Dec), "Error");
        assert_eq!(prog("1++", Radix::Dec), "Error");
    }

    #[test]
    fn test_entry_points() {
        let engine = Engine::default();
        assert_eq!(engine.evaluate("2+2"), NumericResult::Value(4.0));
        assert_eq!(engine.evaluate("sin(0)"), NumericResult::Syntax);
        assert_eq!(engine.convert_to_decimal("FF+1", Radix::Hex).unwrap(), "255+1");
        assert_eq!(engine.convert_from_decimal(256, Radix::Hex), "100");
        assert_eq!(engine.preprocess_scientific("cos(90)").unwrap(), "0");
    }

    #[test]
    fn test_format_accepts_integers() {
        let engine = Engine::default();
        assert_eq!(engine.format(255_i64, OutputMode::Programmer(Radix::Hex)).as_str(), "FF");
        assert_eq!(engine.format(-12_i64, OutputMode::Decimal).as_str(), "-12");
        assert_eq!(
            engine.format(NumericResult::Undefined, OutputMode::Decimal).as_str(),
            "Error: Undefined"
        );
    }

    #[test]
    fn test_many_function_calls() {
        let sum = vec!["sqrt(4)"; 65].join("+");
        assert_eq!(sci(&sum), "130");
    }

    #[test]
    fn test_fraction_digits_setting() {
        let engine = Engine::new(EngineSettings {
            fraction_digits: 3,
            ..EngineSettings::default()
        });
        assert_eq!(engine.calculate_scientific("1/3").as_str(), "0.333");
    }

    #[test]
    fn test_mode_tags() {
        assert_eq!(serde_json::to_string(&CalculatorMode::Engineering).unwrap(), "\"engineering\"");
        assert_eq!(CalculatorMode::Graph.tag(), "graph");
    }

    #[test]
    fn test_engine_is_shareable() {
        let engine = std::sync::Arc::new(Engine::default());
        let handles: Vec<_> = (1..=4)
            .map(|n| {
                let engine = engine.clone();
                std::thread::spawn(move || engine.calculate_scientific(&format!("sqrt({})", n * n)))
            })
            .collect();
        for (n, handle) in (1..=4).zip(handles) {
            assert_eq!(handle.join().unwrap().into_string(), n.to_string());
        }
    }
}
