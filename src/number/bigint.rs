use super::Backend;
use crate::eval::EvalError;
use crate::lexer::Capabilities;
use num_bigint::{BigInt, Sign};
use num_traits::{FromPrimitive, One, Zero};
use std::str::FromStr;

/// Arbitrary-precision integer backend
///
/// Integer-only grammar: no fractional literals, no functions, no `^`.
/// Division must be exact.
#[derive(Debug, Clone, Copy, Default)]
pub struct BigIntBackend;

impl Backend for BigIntBackend {
    type Value = BigInt;

    fn capabilities(&self) -> Capabilities {
        Capabilities::INTEGER
    }

    fn parse_literal(&mut self, literal: &str) -> Result<BigInt, EvalError> {
        BigInt::from_str(literal).map_err(|_| EvalError::InvalidLiteral(literal.to_string()))
    }

    fn from_variable(&mut self, name: &str, value: f64) -> Result<BigInt, EvalError> {
        if !value.is_finite() {
            return Err(EvalError::Overflow(format!(
                "variable '{}' is not a finite number",
                name
            )));
        }
        if value.fract() != 0.0 {
            return Err(EvalError::Overflow(format!(
                "variable '{}' = {} is not an integer",
                name, value
            )));
        }
        BigInt::from_f64(value).ok_or_else(|| {
            EvalError::Overflow(format!("variable '{}' cannot be converted to an integer", name))
        })
    }

    fn add(&mut self, lhs: BigInt, rhs: BigInt) -> Result<BigInt, EvalError> {
        Ok(lhs + rhs)
    }

    fn sub(&mut self, lhs: BigInt, rhs: BigInt) -> Result<BigInt, EvalError> {
        Ok(lhs - rhs)
    }

    fn mul(&mut self, lhs: BigInt, rhs: BigInt) -> Result<BigInt, EvalError> {
        Ok(lhs * rhs)
    }

    fn div(&mut self, lhs: BigInt, rhs: BigInt) -> Result<BigInt, EvalError> {
        if self.is_zero(&rhs) {
            return Err(EvalError::DivisionByZero);
        }
        if !(&lhs % &rhs).is_zero() {
            return Err(EvalError::InexactDivision(format!("{} / {}", lhs, rhs)));
        }
        Ok(lhs / rhs)
    }

    fn neg(&mut self, value: BigInt) -> BigInt {
        -value
    }

    fn factorial(&mut self, value: BigInt) -> Result<BigInt, EvalError> {
        if value.sign() == Sign::Minus {
            return Err(EvalError::Domain(format!(
                "factorial is not defined for negative numbers, got {}",
                value
            )));
        }
        let mut acc = BigInt::one();
        let mut k = BigInt::from(2u32);
        while k <= value {
            acc *= &k;
            k += 1u32;
        }
        Ok(acc)
    }

    fn is_zero(&self, value: &BigInt) -> bool {
        value.is_zero()
    }

    fn render(&self, value: &BigInt) -> String {
        value.to_string()
    }
}
