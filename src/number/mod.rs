//! Numeric backends
//!
//! The tokenizer, converter and evaluator are generic over [`Backend`]. Each
//! backend owns the value representation and every arithmetic rule: literal
//! parsing, variable conversion, exactness and zero checks, factorial limits
//! and function domains. The grammar a backend accepts is advertised through
//! [`Capabilities`] and checked by the lexer.

mod bigint;
mod decimal;
mod float;

pub use bigint::BigIntBackend;
pub use decimal::{DecimalBackend, PRECISION};
pub use float::{format_float, FloatBackend, EPSILON};

use crate::eval::EvalError;
use crate::lexer::{Capabilities, Function};
use std::fmt;
use std::str::FromStr;

/// Value representation plus the arithmetic that goes with it
pub trait Backend {
    type Value: Clone + fmt::Debug;

    /// Grammar accepted by this backend
    fn capabilities(&self) -> Capabilities;

    /// Parse a sign-prefixed literal produced by the lexer
    fn parse_literal(&mut self, literal: &str) -> Result<Self::Value, EvalError>;

    /// Convert a variable's `f64` value into this representation
    fn from_variable(&mut self, name: &str, value: f64) -> Result<Self::Value, EvalError>;

    fn add(&mut self, lhs: Self::Value, rhs: Self::Value) -> Result<Self::Value, EvalError>;
    fn sub(&mut self, lhs: Self::Value, rhs: Self::Value) -> Result<Self::Value, EvalError>;
    fn mul(&mut self, lhs: Self::Value, rhs: Self::Value) -> Result<Self::Value, EvalError>;

    /// Division; fails on a zero divisor and, where required, on inexact results
    fn div(&mut self, lhs: Self::Value, rhs: Self::Value) -> Result<Self::Value, EvalError>;

    fn neg(&mut self, value: Self::Value) -> Self::Value;

    fn factorial(&mut self, value: Self::Value) -> Result<Self::Value, EvalError>;

    fn is_zero(&self, value: &Self::Value) -> bool;

    fn pow(&mut self, _base: Self::Value, _exp: Self::Value) -> Result<Self::Value, EvalError> {
        Err(EvalError::Unsupported("operator '^'".to_string()))
    }

    fn apply(&mut self, func: Function, _value: Self::Value) -> Result<Self::Value, EvalError> {
        Err(EvalError::Unsupported(format!("function '{}'", func)))
    }

    /// Text form of a value as printed to users
    fn render(&self, value: &Self::Value) -> String;
}

/// Which backend an expression is evaluated with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Float,
    BigInt,
    BigDecimal,
}

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Mode::Float => "float",
            Mode::BigInt => "int",
            Mode::BigDecimal => "decimal",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "float" | "f64" | "double" => Ok(Mode::Float),
            "int" | "bigint" | "integer" => Ok(Mode::BigInt),
            "decimal" | "bigdecimal" | "dec" => Ok(Mode::BigDecimal),
            other => Err(format!(
                "unknown mode '{}' (expected float, int or decimal)",
                other
            )),
        }
    }
}
