//! # Recursive-Descent Evaluator
//!
//! Parses and evaluates an arithmetic expression in a single pass. No AST
//! is built: each grammar rule returns its numeric value directly.
//!
//! ## Grammar
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := factor (('*' | '/' | '^') factor)*     '^' only in Grammar::Scientific
//! factor     := ('+' | '-') factor
//!             | '(' expression ')'?
//!             | number
//! number     := [0-9.]+
//! ```
//!
//! ## Semantics worth knowing
//!
//! - `*`, `/` and `^` share one precedence level and fold left to right,
//!   so `2^3^2` is `(2^3)^2 = 64`.
//! - Division follows IEEE 754: `1/0` is `inf`, `0/0` is `NaN`. These are
//!   values, not errors.
//! - A missing `)` is tolerated: `(2+3` evaluates to 5.
//! - Whitespace is skipped only where an operator or a factor may start,
//!   never inside a number.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::evaluator::{evaluate, Grammar};
//!
//! assert_eq!(evaluate("2+3*4", Grammar::Scientific).unwrap(), 14.0);
//! assert_eq!(evaluate("2^3^2", Grammar::Scientific).unwrap(), 64.0);
//! assert!(evaluate("2++", Grammar::Scientific).is_err());
//! ```

use tracing::trace;

use crate::errors::{CalcError, CalcResult};

/// Literal written by the function preprocessor for an undefined result.
pub const NAN_LITERAL: &str = "NaN";

/// Literal written by the function preprocessor for an infinite result.
pub const INFINITY_LITERAL: &str = "inf";

/// Maximum nesting of parentheses and unary signs before giving up.
pub const MAX_NESTING: usize = 256;

/// Which variant of the grammar to accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// Full grammar: `+ - * / ^`, plus the `NaN`/`inf` literals
    Scientific,
    /// Integer-mode grammar: `+ - * /` only
    Programmer,
}

impl Grammar {
    /// Whether `^` is an operator in this grammar
    pub fn allows_power(self) -> bool {
        matches!(self, Grammar::Scientific)
    }

    /// Whether the preprocessor's non-finite literals are accepted
    fn allows_sentinels(self) -> bool {
        matches!(self, Grammar::Scientific)
    }
}

/// Evaluate `expr` against the chosen grammar.
///
/// The whole input must be consumed; anything left over after the
/// top-level expression is a syntax error.
pub fn evaluate(expr: &str, grammar: Grammar) -> CalcResult<f64> {
    Parser::new(expr, grammar).parse()
}

/// Scanning state for one evaluation. Created per call and dropped when
/// the call returns.
struct Parser {
    chars: Vec<char>,
    position: usize,
    lookahead: Option<char>,
    grammar: Grammar,
    depth: usize,
}

impl Parser {
    fn new(expr: &str, grammar: Grammar) -> Self {
        let chars: Vec<char> = expr.chars().collect();
        let lookahead = chars.first().copied();
        Parser {
            chars,
            position: 0,
            lookahead,
            grammar,
            depth: 0,
        }
    }

    fn parse(mut self) -> CalcResult<f64> {
        let value = self.parse_expression()?;
        if self.position < self.chars.len() {
            return Err(self.unexpected());
        }
        Ok(value)
    }

    fn advance(&mut self) {
        self.position += 1;
        self.lookahead = self.chars.get(self.position).copied();
    }

    /// Skip spaces, then consume `expected` if it is next.
    fn eat(&mut self, expected: char) -> bool {
        while self.lookahead == Some(' ') {
            self.advance();
        }
        if self.lookahead == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self) -> CalcError {
        let found = match self.lookahead {
            Some(c) => format!("'{}'", c),
            None => "end of input".to_string(),
        };
        trace!(position = self.position, found = %found, "syntax error");
        CalcError::syntax(self.position, found)
    }

    fn parse_expression(&mut self) -> CalcResult<f64> {
        let mut value = self.parse_term()?;
        loop {
            if self.eat('+') {
                value += self.parse_term()?;
            } else if self.eat('-') {
                value -= self.parse_term()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn parse_term(&mut self) -> CalcResult<f64> {
        let mut value = self.parse_factor()?;
        loop {
            if self.eat('*') {
                value *= self.parse_factor()?;
            } else if self.eat('/') {
                value /= self.parse_factor()?;
            } else if self.grammar.allows_power() && self.eat('^') {
                value = value.powf(self.parse_factor()?);
            } else {
                return Ok(value);
            }
        }
    }

    fn parse_factor(&mut self) -> CalcResult<f64> {
        if self.depth >= MAX_NESTING {
            return Err(CalcError::syntax(
                self.position,
                format!("nesting deeper than {}", MAX_NESTING),
            ));
        }
        self.depth += 1;
        let value = self.parse_factor_inner();
        self.depth -= 1;
        value
    }

    fn parse_factor_inner(&mut self) -> CalcResult<f64> {
        if self.eat('+') {
            return self.parse_factor();
        }
        if self.eat('-') {
            return Ok(-self.parse_factor()?);
        }

        if self.eat('(') {
            let value = self.parse_expression()?;
            // Close paren is optional
            self.eat(')');
            return Ok(value);
        }

        match self.lookahead {
            Some(c) if c.is_ascii_digit() || c == '.' => self.parse_number(),
            Some(_) if self.grammar.allows_sentinels() => self.parse_sentinel(),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_number(&mut self) -> CalcResult<f64> {
        let start = self.position;
        while let Some(c) = self.lookahead {
            if c.is_ascii_digit() || c == '.' {
                self.advance();
            } else {
                break;
            }
        }
        let literal: String = self.chars[start..self.position].iter().collect();
        // "1.2.3" or a lone "." are rejected here
        literal
            .parse::<f64>()
            .map_err(|_| CalcError::syntax(start, format!("number '{}'", literal)))
    }

    fn parse_sentinel(&mut self) -> CalcResult<f64> {
        for (literal, value) in [(NAN_LITERAL, f64::NAN), (INFINITY_LITERAL, f64::INFINITY)] {
            if self.remaining_starts_with(literal) {
                for _ in literal.chars() {
                    self.advance();
                }
                return Ok(value);
            }
        }
        Err(self.unexpected())
    }

    fn remaining_starts_with(&self, literal: &str) -> bool {
        let mut rest = self.chars[self.position..].iter();
        literal.chars().all(|c| rest.next() == Some(&c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sci(expr: &str) -> CalcResult<f64> {
        evaluate(expr, Grammar::Scientific)
    }

    fn prog(expr: &str) -> CalcResult<f64> {
        evaluate(expr, Grammar::Programmer)
    }

    #[test]
    fn test_precedence() {
        assert_eq!(sci("2+3*4").unwrap(), 14.0);
        assert_eq!(sci("(2+3)*4").unwrap(), 20.0);
        assert_eq!(sci("10-4-3").unwrap(), 3.0);
        assert_eq!(sci("8/4/2").unwrap(), 1.0);
    }

    #[test]
    fn test_power_is_left_associative() {
        assert_eq!(sci("2^3^2").unwrap(), 64.0);
        // Same level as multiplication
        assert_eq!(sci("2*3^2").unwrap(), 36.0);
        assert_eq!(sci("2^-1").unwrap(), 0.5);
    }

    #[test]
    fn test_unary_signs() {
        assert_eq!(sci("-3").unwrap(), -3.0);
        assert_eq!(sci("--3").unwrap(), 3.0);
        assert_eq!(sci("+-+3").unwrap(), -3.0);
        assert_eq!(sci("2*-3").unwrap(), -6.0);
        assert_eq!(sci("5--0.5").unwrap(), 5.5);
        // Unary binds tighter than '^'
        assert_eq!(sci("-2^2").unwrap(), 4.0);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(sci("3.25").unwrap(), 3.25);
        assert_eq!(sci(".5").unwrap(), 0.5);
        assert_eq!(sci("5.").unwrap(), 5.0);
        assert!(sci("1.2.3").is_err());
        assert!(sci(".").is_err());
    }

    #[test]
    fn test_ieee_division() {
        assert_eq!(sci("1/0").unwrap(), f64::INFINITY);
        assert_eq!(sci("-1/0").unwrap(), f64::NEG_INFINITY);
        assert!(sci("0/0").unwrap().is_nan());
    }

    #[test]
    fn test_missing_close_paren_is_tolerated() {
        assert_eq!(sci("(2+3").unwrap(), 5.0);
        assert_eq!(sci("((1+1)*(2+2").unwrap(), 8.0);
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(sci("2++"), Err(CalcError::Syntax { .. })));
        assert!(matches!(sci(""), Err(CalcError::Syntax { .. })));
        assert!(matches!(sci("2)"), Err(CalcError::Syntax { position: 1, .. })));
        assert!(matches!(sci("2x"), Err(CalcError::Syntax { .. })));
        assert!(matches!(sci("sin(30)"), Err(CalcError::Syntax { .. })));
    }

    #[test]
    fn test_whitespace() {
        assert_eq!(sci(" 2 + 3 * 4 ").unwrap(), 14.0);
        assert_eq!(sci("( 1 + 2 ) * 3").unwrap(), 9.0);
        // Not inside numbers
        assert!(sci("1 2").is_err());
    }

    #[test]
    fn test_programmer_grammar_has_no_power() {
        assert_eq!(prog("255+1").unwrap(), 256.0);
        assert!(prog("2^3").is_err());
        assert!(prog("NaN").is_err());
    }

    #[test]
    fn test_sentinel_literals() {
        assert!(sci("NaN").unwrap().is_nan());
        assert!(sci("2*NaN").unwrap().is_nan());
        assert_eq!(sci("-inf").unwrap(), f64::NEG_INFINITY);
        assert!(sci("Na").is_err());
    }

    #[test]
    fn test_deep_nesting_is_an_error_not_a_crash() {
        let expr = "(".repeat(MAX_NESTING + 10) + "1";
        assert!(matches!(sci(&expr), Err(CalcError::Syntax { .. })));
        let ok = "(".repeat(100) + "1" + &")".repeat(100);
        assert_eq!(sci(&ok).unwrap(), 1.0);
    }

    #[test]
    fn test_concurrent_evaluation() {
        let handles: Vec<_> = (0..8)
            .map(|i| std::thread::spawn(move || sci(&format!("{}*2+1", i)).unwrap()))
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), (i * 2 + 1) as f64);
        }
    }
}
