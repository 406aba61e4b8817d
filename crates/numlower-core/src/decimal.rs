//! Four-decimal-place rounded arithmetic (C13), used by constant folding.
//!
//! Grounded on the teacher's own `Decimal` type
//! (`crates/ouros/src/types/decimal.rs`), which stores a coefficient/exponent
//! pair over `num_bigint::BigInt`. This evaluator narrows that general
//! arbitrary-precision design to the one scale Dst ever needs: every value is
//! stored as a `BigInt` coefficient at a fixed exponent of `-4`, i.e.
//! `value = coefficient / 10^4`. Folding therefore never needs to align
//! differing exponents the way the teacher's general-purpose `Decimal` does.

use std::fmt;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::ops::BinaryOp;

const SCALE_EXP: u32 = 4;

fn scale() -> BigInt {
    BigInt::from(10).pow(SCALE_EXP)
}

/// A value rounded to four fractional decimal digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal {
    /// `value * 10^4`, always an exact integer at this scale.
    coefficient: BigInt,
}

/// Arithmetic failure surfaced from the Decimal evaluator (§4.3.1, §7).
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("division by zero")]
    DivByZero,
    #[error("modulo by zero")]
    ModByZero,
}

impl Decimal {
    pub fn zero() -> Self {
        Self {
            coefficient: BigInt::zero(),
        }
    }

    pub fn from_i64(n: i64) -> Self {
        Self {
            coefficient: BigInt::from(n) * scale(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.coefficient.is_zero()
    }

    /// True if `self` is a non-negative integer and fits a `usize` — used by
    /// callers that need a concrete count or index from a folded constant
    /// (e.g. exponents in `exp`, vector/matrix index literals).
    pub fn to_usize(&self) -> Option<usize> {
        let s = scale();
        if (&self.coefficient % &s).is_zero() {
            (&self.coefficient / &s).to_usize()
        } else {
            None
        }
    }

    /// Parses a Dst/Src numeric literal (`"42"`, `"3.14"`, `"-0.5"`),
    /// rounding to four fractional digits if the literal carries more.
    pub fn parse(text: &str) -> Option<Self> {
        let (sign, rest) = match text.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, text.strip_prefix('+').unwrap_or(text)),
        };
        let (int_part, frac_part) = match rest.split_once('.') {
            Some((i, f)) => (i, f),
            None => (rest, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        let int_part = if int_part.is_empty() { "0" } else { int_part };
        let int_val: BigInt = int_part.parse().ok()?;

        let mut frac_digits = frac_part.to_string();
        let extra = if frac_digits.len() > SCALE_EXP as usize {
            let extra = frac_digits.split_off(SCALE_EXP as usize);
            extra
        } else {
            String::new()
        };
        while frac_digits.len() < SCALE_EXP as usize {
            frac_digits.push('0');
        }
        let frac_val: BigInt = if frac_digits.is_empty() {
            BigInt::zero()
        } else {
            frac_digits.parse().ok()?
        };
        let mut coefficient = int_val * scale() + frac_val;
        // round the dropped tail, half-up
        if let Some(first) = extra.chars().next() {
            if first >= '5' {
                coefficient += BigInt::one();
            }
        }
        Some(Self {
            coefficient: coefficient * sign,
        })
    }

    /// Renders per §4.3.1: integer-valued results have no decimal point;
    /// otherwise the four fractional digits are printed with trailing zeros
    /// trimmed (but at least one digit kept).
    pub fn render(&self) -> String {
        let s = scale();
        let neg = self.coefficient.is_negative();
        let abs = self.coefficient.abs();
        let (int_part, frac_part) = abs.div_mod_floor(&s);
        if frac_part.is_zero() {
            return format!("{}{int_part}", if neg { "-" } else { "" });
        }
        let mut frac_str = format!("{frac_part:0width$}", width = SCALE_EXP as usize);
        while frac_str.ends_with('0') {
            frac_str.pop();
        }
        format!("{}{int_part}.{frac_str}", if neg { "-" } else { "" })
    }

    fn round_div(num: BigInt, den: &BigInt) -> BigInt {
        let two = BigInt::from(2);
        let (q, r) = num.div_mod_floor(den);
        if (&r * &two).abs() >= den.abs() {
            if num.is_negative() != den.is_negative() {
                q - BigInt::one()
            } else {
                q + BigInt::one()
            }
        } else {
            q
        }
    }

    fn bool_decimal(b: bool) -> Self {
        if b { Self::from_i64(1) } else { Self::from_i64(0) }
    }

    /// Applies one binary Dst operator, per the table in §4.3.1.
    pub fn binary(op: BinaryOp, a: &Self, b: &Self) -> Result<Self, ArithmeticError> {
        if op.is_boolean() {
            let (ab, bb) = (!a.is_zero(), !b.is_zero());
            let r = match op {
                BinaryOp::And => ab && bb,
                BinaryOp::Or => ab || bb,
                _ => unreachable!(),
            };
            return Ok(Self::bool_decimal(r));
        }
        if op.is_comparison() {
            let r = match op {
                BinaryOp::Lt => a.coefficient < b.coefficient,
                BinaryOp::Le => a.coefficient <= b.coefficient,
                BinaryOp::Gt => a.coefficient > b.coefficient,
                BinaryOp::Ge => a.coefficient >= b.coefficient,
                BinaryOp::Eq => a.coefficient == b.coefficient,
                BinaryOp::Ne => a.coefficient != b.coefficient,
                _ => unreachable!(),
            };
            return Ok(Self::bool_decimal(r));
        }
        let coefficient = match op {
            BinaryOp::Add => a.coefficient.clone() + &b.coefficient,
            BinaryOp::Sub => a.coefficient.clone() - &b.coefficient,
            BinaryOp::Mul => {
                let product = &a.coefficient * &b.coefficient;
                Self::round_div(product, &scale())
            }
            BinaryOp::Div => {
                if b.is_zero() {
                    return Err(ArithmeticError::DivByZero);
                }
                let numerator = &a.coefficient * scale();
                Self::round_div(numerator, &b.coefficient)
            }
            BinaryOp::Mod => {
                if b.is_zero() {
                    return Err(ArithmeticError::ModByZero);
                }
                a.coefficient.mod_floor(&b.coefficient)
            }
            BinaryOp::Exp => return Ok(Self::pow(a, b)),
            _ => unreachable!("boolean/comparison ops handled above"),
        };
        Ok(Self { coefficient })
    }

    fn pow(base: &Self, exponent: &Self) -> Self {
        if let Some(n) = exponent.to_usize() {
            let mut result = Self::from_i64(1);
            for _ in 0..n {
                result = Self {
                    coefficient: Self::round_div(&result.coefficient * &base.coefficient, &scale()),
                };
            }
            return result;
        }
        // Negative or non-integer exponents fall back to a lossy f64 round
        // trip; Dst programs rarely fold anything beyond small integer
        // powers, and non-integer exponents are outside what the reduce
        // pass's algebraic identities ever request.
        let base_f = base.to_f64();
        let exp_f = exponent.to_f64();
        Self::from_f64(base_f.powf(exp_f))
    }

    fn to_f64(&self) -> f64 {
        self.coefficient.to_f64().unwrap_or(0.0) / f64::from(10u32.pow(SCALE_EXP))
    }

    fn from_f64(value: f64) -> Self {
        Self::parse(&format!("{value:.4}")).unwrap_or_else(Self::zero)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_renders_integers_without_point() {
        let d = Decimal::parse("42").unwrap();
        assert_eq!(d.render(), "42");
    }

    #[test]
    fn parses_and_renders_fractional() {
        let d = Decimal::parse("3.5").unwrap();
        assert_eq!(d.render(), "3.5");
    }

    #[test]
    fn add_sub_mul_div() {
        let a = Decimal::parse("2").unwrap();
        let b = Decimal::parse("3").unwrap();
        assert_eq!(Decimal::binary(BinaryOp::Add, &a, &b).unwrap().render(), "5");
        assert_eq!(Decimal::binary(BinaryOp::Sub, &a, &b).unwrap().render(), "-1");
        assert_eq!(Decimal::binary(BinaryOp::Mul, &a, &b).unwrap().render(), "6");
        let c = Decimal::parse("1").unwrap();
        assert_eq!(Decimal::binary(BinaryOp::Div, &c, &b).unwrap().render(), "0.3333");
    }

    #[test]
    fn div_by_zero_errors() {
        let a = Decimal::parse("1").unwrap();
        let zero = Decimal::zero();
        assert_eq!(Decimal::binary(BinaryOp::Div, &a, &zero), Err(ArithmeticError::DivByZero));
    }

    #[test]
    fn comparisons_and_booleans() {
        let a = Decimal::parse("1").unwrap();
        let b = Decimal::parse("2").unwrap();
        assert_eq!(Decimal::binary(BinaryOp::Lt, &a, &b).unwrap().render(), "1");
        assert_eq!(Decimal::binary(BinaryOp::And, &a, &Decimal::zero()).unwrap().render(), "0");
    }

    #[test]
    fn integer_exponent() {
        let base = Decimal::parse("2").unwrap();
        let exp = Decimal::parse("3").unwrap();
        assert_eq!(Decimal::binary(BinaryOp::Exp, &base, &exp).unwrap().render(), "8");
    }
}
