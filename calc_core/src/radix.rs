//! # Multi-Radix Adapter
//!
//! Programmer mode works on integers written in base 2, 8, 10 or 16, but
//! the evaluator only reads decimal. The adapter sits on both sides of it:
//!
//! 1. [`to_decimal`] rewrites every literal of the expression into base 10,
//!    rejecting literals that are not valid in the declared radix.
//! 2. The evaluator computes the rewritten expression with
//!    [`Grammar::Programmer`](crate::evaluator::Grammar::Programmer).
//! 3. [`truncate`] drops the fraction toward zero and [`from_decimal`]
//!    renders the integer back into the radix, hex digits in uppercase.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::radix::{from_decimal, to_decimal, Radix};
//!
//! assert_eq!(to_decimal("FF+1", Radix::Hex).unwrap(), "255+1");
//! assert_eq!(from_decimal(256, Radix::Hex), "100");
//! assert_eq!(from_decimal(-10, Radix::Bin), "-1010");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcError, CalcResult};

/// Characters that split literals; they pass through unchanged.
pub const OPERATOR_CHARS: [char; 6] = ['+', '-', '*', '/', '(', ')'];

const DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// The four bases offered in programmer mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Radix {
    #[serde(rename = "BIN")]
    Bin,
    #[serde(rename = "OCT")]
    Oct,
    #[default]
    #[serde(rename = "DEC")]
    Dec,
    #[serde(rename = "HEX")]
    Hex,
}

impl Radix {
    /// All radices, in the order the conversion panel lists them
    pub const ALL: [Radix; 4] = [Radix::Hex, Radix::Dec, Radix::Oct, Radix::Bin];

    /// Numeric base
    pub fn base(self) -> u32 {
        match self {
            Radix::Bin => 2,
            Radix::Oct => 8,
            Radix::Dec => 10,
            Radix::Hex => 16,
        }
    }

    /// Short display name, also used to tag stored programmer expressions
    pub fn name(self) -> &'static str {
        match self {
            Radix::Bin => "BIN",
            Radix::Oct => "OCT",
            Radix::Dec => "DEC",
            Radix::Hex => "HEX",
        }
    }

    /// Parse a short name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "BIN" => Some(Radix::Bin),
            "OCT" => Some(Radix::Oct),
            "DEC" => Some(Radix::Dec),
            "HEX" => Some(Radix::Hex),
            _ => None,
        }
    }

    /// Whether a single keypad digit is valid in this radix
    pub fn accepts_digit(self, digit: char) -> bool {
        digit.to_digit(self.base()).is_some()
    }

    /// Parse an integer literal written in this radix
    pub fn parse_literal(self, literal: &str) -> CalcResult<i64> {
        i64::from_str_radix(literal, self.base())
            .map_err(|_| CalcError::invalid_digit(literal, self.base()))
    }
}

impl TryFrom<u32> for Radix {
    type Error = CalcError;

    fn try_from(base: u32) -> Result<Self, Self::Error> {
        match base {
            2 => Ok(Radix::Bin),
            8 => Ok(Radix::Oct),
            10 => Ok(Radix::Dec),
            16 => Ok(Radix::Hex),
            other => Err(CalcError::UnsupportedRadix { radix: other }),
        }
    }
}

impl fmt::Display for Radix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rewrite every literal of `expr` from `radix` into base 10.
///
/// Literals are the maximal runs between the characters of
/// [`OPERATOR_CHARS`]; anything else inside a run (including spaces and
/// `^`) makes the literal invalid.
pub fn to_decimal(expr: &str, radix: Radix) -> CalcResult<String> {
    let mut result = String::with_capacity(expr.len());
    let mut literal = String::new();

    for c in expr.chars() {
        if OPERATOR_CHARS.contains(&c) {
            flush_literal(&mut literal, radix, &mut result)?;
            result.push(c);
        } else {
            literal.push(c);
        }
    }
    flush_literal(&mut literal, radix, &mut result)?;

    debug!(expression = %expr, radix = %radix, decimal = %result, "converted to decimal");
    Ok(result)
}

fn flush_literal(literal: &mut String, radix: Radix, out: &mut String) -> CalcResult<()> {
    if literal.is_empty() {
        return Ok(());
    }
    let value = radix.parse_literal(literal)?;
    out.push_str(&value.to_string());
    literal.clear();
    Ok(())
}

/// Render `value` in `radix`, sign and magnitude, uppercase hex digits.
pub fn from_decimal(value: i64, radix: Radix) -> String {
    let base = u64::from(radix.base());
    let mut magnitude = value.unsigned_abs();
    let mut digits = Vec::new();

    loop {
        digits.push(DIGITS[(magnitude % base) as usize]);
        magnitude /= base;
        if magnitude == 0 {
            break;
        }
    }
    if value < 0 {
        digits.push(b'-');
    }
    digits.iter().rev().map(|&b| char::from(b)).collect()
}

/// Truncate an evaluator result toward zero into the 64-bit domain.
///
/// Saturates at `i64::MIN`/`i64::MAX` and maps `NaN` to 0, exactly like a
/// plain cast; callers that care must reject non-finite values first.
pub fn truncate(value: f64) -> i64 {
    value as i64
}

/// Re-render `operand` from `from` into `to`.
///
/// An empty or unparsable operand becomes `"0"` instead of an error.
pub fn change_base(operand: &str, from: Radix, to: Radix) -> String {
    let value = from.parse_literal(operand).unwrap_or(0);
    from_decimal(value, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_to_decimal_rewrites_literals() {
        assert_eq!(to_decimal("FF+1", Radix::Hex).unwrap(), "255+1");
        assert_eq!(to_decimal("(101*11)-1", Radix::Bin).unwrap(), "(5*3)-1");
        assert_eq!(to_decimal("17/7", Radix::Oct).unwrap(), "15/7");
        assert_eq!(to_decimal("-42", Radix::Dec).unwrap(), "-42");
        assert_eq!(to_decimal("", Radix::Dec).unwrap(), "");
    }

    #[test]
    fn test_to_decimal_rejects_invalid_digits() {
        assert_eq!(
            to_decimal("12+2", Radix::Bin).unwrap_err(),
            CalcError::invalid_digit("12", 2)
        );
        assert!(to_decimal("8", Radix::Oct).is_err());
        assert!(to_decimal("1G", Radix::Hex).is_err());
        assert!(to_decimal("2^3", Radix::Dec).is_err());
        assert!(to_decimal("1 + 1", Radix::Dec).is_err());
    }

    #[test]
    fn test_to_decimal_rejects_overflowing_literal() {
        assert!(to_decimal("FFFFFFFFFFFFFFFFF", Radix::Hex).is_err());
    }

    #[test]
    fn test_from_decimal() {
        assert_eq!(from_decimal(0, Radix::Bin), "0");
        assert_eq!(from_decimal(255, Radix::Hex), "FF");
        assert_eq!(from_decimal(8, Radix::Oct), "10");
        assert_eq!(from_decimal(-255, Radix::Hex), "-FF");
        assert_eq!(from_decimal(i64::MAX, Radix::Hex), "7FFFFFFFFFFFFFFF");
        assert_eq!(from_decimal(i64::MIN, Radix::Hex), "-8000000000000000");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate(2.9), 2);
        assert_eq!(truncate(-2.9), -2);
        assert_eq!(truncate(f64::NAN), 0);
        assert_eq!(truncate(1e30), i64::MAX);
    }

    #[test]
    fn test_change_base() {
        assert_eq!(change_base("255", Radix::Dec, Radix::Hex), "FF");
        assert_eq!(change_base("FF", Radix::Hex, Radix::Bin), "11111111");
        assert_eq!(change_base("", Radix::Dec, Radix::Hex), "0");
        assert_eq!(change_base("1+1", Radix::Dec, Radix::Bin), "0");
    }

    #[test]
    fn test_radix_names_and_bases() {
        for radix in Radix::ALL {
            assert_eq!(Radix::from_name(radix.name()), Some(radix));
            assert_eq!(Radix::try_from(radix.base()).unwrap(), radix);
        }
        assert_eq!(Radix::from_name("hex"), Some(Radix::Hex));
        assert_eq!(
            Radix::try_from(3).unwrap_err(),
            CalcError::UnsupportedRadix { radix: 3 }
        );
        assert_eq!(serde_json::to_string(&Radix::Hex).unwrap(), "\"HEX\"");
    }

    #[test]
    fn test_accepts_digit() {
        assert!(Radix::Bin.accepts_digit('1'));
        assert!(!Radix::Bin.accepts_digit('2'));
        assert!(Radix::Oct.accepts_digit('7'));
        assert!(!Radix::Oct.accepts_digit('8'));
        assert!(!Radix::Dec.accepts_digit('A'));
        assert!(Radix::Hex.accepts_digit('F'));
    }

    proptest! {
        #[test]
        fn prop_render_roundtrip(n in 0i64..(1i64 << 31), idx in 0usize..4) {
            let radix = Radix::ALL[idx];
            let rendered = from_decimal(n, radix);
            let decimal = to_decimal(&rendered, radix).unwrap();
            let value: i64 = decimal.parse().unwrap();
            prop_assert_eq!(from_decimal(value, radix), rendered);
        }
    }
}
