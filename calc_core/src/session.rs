//! # Calculator Sessions
//!
//! Key-entry state for the two calculators. A session accumulates what the
//! user types, runs the engine on demand, and hands back the history entry
//! worth storing. Sessions never touch storage themselves.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::engine::Engine;
//! use calc_core::radix::Radix;
//! use calc_core::session::ProgrammerSession;
//!
//! let engine = Engine::default();
//! let mut session = ProgrammerSession::new(Radix::Hex);
//! for key in ['F', 'F'] {
//!     session.append_digit(key);
//! }
//! session.append_operator('+');
//! session.append_digit('1');
//!
//! let entry = session.calculate(&engine).unwrap();
//! assert_eq!(session.input(), "100");
//! assert_eq!(entry.expression, "FF+1 (HEX)");
//! ```

use serde::Serialize;

use crate::engine::{CalculatorMode, Engine};
use crate::format::DisplayString;
use crate::history::{split_programmer_expression, HistoryEntry};
use crate::radix::{self, Radix};
use crate::scientific::ScientificFunction;

const INITIAL: &str = "0";

/// Scientific (engineering) calculator state.
#[derive(Debug, Clone, PartialEq)]
pub struct ScientificSession {
    expression: String,
    result: DisplayString,
}

impl Default for ScientificSession {
    fn default() -> Self {
        ScientificSession::new()
    }
}

impl ScientificSession {
    pub fn new() -> Self {
        ScientificSession {
            expression: INITIAL.to_string(),
            result: DisplayString::new(INITIAL),
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn result(&self) -> &DisplayString {
        &self.result
    }

    /// A result other than the initial "0" or a plain "Error" is on screen
    fn has_result(&self) -> bool {
        self.result.as_str() != INITIAL && !self.result.is_plain_error()
    }

    fn ends_with_digit(&self) -> bool {
        self.expression.chars().last().is_some_and(|c| c.is_ascii_digit())
    }

    /// Replace the whole expression, as when a line is typed at once.
    pub fn enter(&mut self, expression: &str) {
        self.expression = expression.trim().to_string();
        self.result = DisplayString::new(INITIAL);
    }

    /// Append digits, replacing a lone "0".
    pub fn append_number(&mut self, digits: &str) {
        if self.expression == INITIAL {
            self.expression = digits.to_string();
        } else {
            self.expression.push_str(digits);
        }
        self.result = DisplayString::new(INITIAL);
    }

    /// Append an operator or parenthesis. With a result on screen, the
    /// result becomes the left operand.
    pub fn append_operator(&mut self, operator: &str) {
        if self.has_result() {
            self.expression = format!("{}{}", self.result, operator);
            self.result = DisplayString::new(INITIAL);
        } else {
            self.expression.push_str(operator);
        }
    }

    /// Open a function call. With a result on screen, the result becomes
    /// the argument. Trig calls get an explicit `*` after a digit.
    pub fn append_function(&mut self, function: ScientificFunction) {
        let call = format!("{}(", function.name());
        if self.has_result() {
            self.expression = format!("{}{})", call, self.result);
            self.result = DisplayString::new(INITIAL);
        } else if self.expression == INITIAL {
            self.expression = call;
        } else {
            if function.is_trigonometric() && self.ends_with_digit() {
                self.expression.push('*');
            }
            self.expression.push_str(&call);
        }
    }

    /// Append `π` or `e`, with an explicit `*` after a digit.
    pub fn append_constant(&mut self, symbol: &str) {
        if self.expression == INITIAL {
            self.expression = symbol.to_string();
        } else {
            if self.ends_with_digit() {
                self.expression.push('*');
            }
            self.expression.push_str(symbol);
        }
        self.result = DisplayString::new(INITIAL);
    }

    /// Append a decimal point unless the number being typed already has one.
    pub fn append_decimal(&mut self) {
        let current_number = self
            .expression
            .rsplit(|c: char| !(c.is_ascii_digit() || c == '.'))
            .next()
            .unwrap_or("");
        if !current_number.contains('.') {
            self.expression.push('.');
        }
    }

    pub fn delete_last(&mut self) {
        if self.expression.chars().count() > 1 {
            self.expression.pop();
        } else {
            self.expression = INITIAL.to_string();
        }
    }

    pub fn clear(&mut self) {
        self.expression = INITIAL.to_string();
        self.result = DisplayString::new(INITIAL);
    }

    /// Evaluate the expression. Returns the entry to store unless the
    /// result is a plain "Error".
    pub fn calculate(&mut self, engine: &Engine) -> Option<HistoryEntry> {
        self.result = engine.calculate_scientific(&self.expression);
        if self.result.is_plain_error() {
            return None;
        }
        Some(HistoryEntry::new(
            self.expression.clone(),
            self.result.clone(),
            CalculatorMode::Engineering,
        ))
    }

    /// Reopen an expression from history and show its result.
    pub fn restore(&mut self, expression: &str, engine: &Engine) {
        self.expression = expression.to_string();
        self.result = engine.calculate_scientific(expression);
    }
}

/// One radix rendering of the current operand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversion {
    pub radix: Radix,
    pub text: String,
}

/// Programmer calculator state.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgrammerSession {
    input: String,
    result: DisplayString,
    radix: Radix,
    /// The input holds a computed value; the next digit starts over
    replace_on_digit: bool,
}

impl Default for ProgrammerSession {
    fn default() -> Self {
        ProgrammerSession::new(Radix::Dec)
    }
}

impl ProgrammerSession {
    pub fn new(radix: Radix) -> Self {
        ProgrammerSession {
            input: INITIAL.to_string(),
            result: DisplayString::new(INITIAL),
            radix,
            replace_on_digit: false,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn result(&self) -> &DisplayString {
        &self.result
    }

    pub fn radix(&self) -> Radix {
        self.radix
    }

    /// Replace the whole input, as when a line is typed at once.
    pub fn enter(&mut self, expression: &str) {
        self.input = expression.trim().to_string();
        self.result = DisplayString::new(INITIAL);
        self.replace_on_digit = false;
    }

    /// Append a digit. Digits outside the active radix are refused and
    /// `false` is returned.
    pub fn append_digit(&mut self, digit: char) -> bool {
        if !self.radix.accepts_digit(digit) {
            return false;
        }
        let digit = digit.to_ascii_uppercase();
        if self.input == INITIAL || self.replace_on_digit {
            self.input = digit.to_string();
            self.replace_on_digit = false;
        } else {
            self.input.push(digit);
        }
        self.result = DisplayString::new(INITIAL);
        true
    }

    /// Append one of `+ - * / ( )`. Anything else is refused.
    pub fn append_operator(&mut self, operator: char) -> bool {
        if !radix::OPERATOR_CHARS.contains(&operator) {
            return false;
        }
        self.input.push(operator);
        self.replace_on_digit = false;
        true
    }

    /// Switch radix, re-rendering the current operand. An operand that does
    /// not parse in the old radix resets to "0".
    pub fn change_base(&mut self, radix: Radix) {
        if radix == self.radix {
            return;
        }
        self.input = radix::change_base(&self.input, self.radix, radix);
        self.radix = radix;
    }

    /// The current operand in every radix; an unparsable operand shows as 0.
    pub fn conversions(&self) -> Vec<Conversion> {
        let value = self.radix.parse_literal(&self.input).unwrap_or(0);
        Radix::ALL
            .iter()
            .map(|&radix| Conversion {
                radix,
                text: radix::from_decimal(value, radix),
            })
            .collect()
    }

    pub fn delete_last(&mut self) {
        if self.input.chars().count() > 1 {
            self.input.pop();
        } else {
            self.input = INITIAL.to_string();
        }
    }

    pub fn clear(&mut self) {
        self.input = INITIAL.to_string();
        self.result = DisplayString::new(INITIAL);
        self.replace_on_digit = false;
    }

    /// Evaluate the input; the result replaces it. Returns the entry to
    /// store, tagged with the radix, unless the result is unusable.
    pub fn calculate(&mut self, engine: &Engine) -> Option<HistoryEntry> {
        let expression = std::mem::take(&mut self.input);
        self.result = engine.calculate_programmer(&expression, self.radix);
        self.input = self.result.to_string();
        self.replace_on_digit = true;

        let text = self.result.as_str();
        if self.result.is_plain_error() || text.is_empty() || text == "NaN" {
            return None;
        }
        Some(HistoryEntry::programmer(&expression, self.radix, self.result.clone()))
    }

    /// Reopen a stored `"<expr> (<BASE>)"` expression: switch to its radix
    /// and show its result.
    pub fn restore(&mut self, stored: &str, engine: &Engine) {
        let (expression, radix) = split_programmer_expression(stored);
        self.radix = radix;
        self.result = engine.calculate_programmer(&expression, radix);
        self.input = self.result.to_string();
        self.replace_on_digit = true;
    }
}
