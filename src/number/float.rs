use super::Backend;
use crate::eval::EvalError;
use crate::lexer::{Capabilities, Function};

/// Threshold for integer and zero checks on `f64`
pub const EPSILON: f64 = 1e-10;

/// Largest n for which n! fits in an f64
const FACTORIAL_LIMIT: f64 = 170.0;

/// Native double-precision backend
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatBackend;

/// Reject NaN and infinite results
fn checked(value: f64, what: &str) -> Result<f64, EvalError> {
    if value.is_nan() {
        Err(EvalError::Domain(format!("{} is undefined for these arguments", what)))
    } else if value.is_infinite() {
        Err(EvalError::Overflow(format!("{} result is out of range", what)))
    } else {
        Ok(value)
    }
}

/// Format a float without a trailing `.0` for integral values
pub fn format_float(n: f64) -> String {
    if n == 0.0 {
        // Also folds -0
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl Backend for FloatBackend {
    type Value = f64;

    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL
    }

    fn parse_literal(&mut self, literal: &str) -> Result<f64, EvalError> {
        let value: f64 = literal
            .parse()
            .map_err(|_| EvalError::InvalidLiteral(literal.to_string()))?;
        if !value.is_finite() {
            return Err(EvalError::Overflow(format!("literal {} is out of range", literal)));
        }
        Ok(value)
    }

    fn from_variable(&mut self, name: &str, value: f64) -> Result<f64, EvalError> {
        if !value.is_finite() {
            return Err(EvalError::Overflow(format!(
                "variable '{}' is not a finite number",
                name
            )));
        }
        Ok(value)
    }

    fn add(&mut self, lhs: f64, rhs: f64) -> Result<f64, EvalError> {
        checked(lhs + rhs, "addition")
    }

    fn sub(&mut self, lhs: f64, rhs: f64) -> Result<f64, EvalError> {
        checked(lhs - rhs, "subtraction")
    }

    fn mul(&mut self, lhs: f64, rhs: f64) -> Result<f64, EvalError> {
        checked(lhs * rhs, "multiplication")
    }

    fn div(&mut self, lhs: f64, rhs: f64) -> Result<f64, EvalError> {
        if self.is_zero(&rhs) {
            return Err(EvalError::DivisionByZero);
        }
        checked(lhs / rhs, "division")
    }

    fn neg(&mut self, value: f64) -> f64 {
        -value
    }

    fn factorial(&mut self, value: f64) -> Result<f64, EvalError> {
        let n = value.round();
        if (value - n).abs() > EPSILON {
            return Err(EvalError::Domain(format!(
                "factorial is only defined for integers, got {}",
                format_float(value)
            )));
        }
        if n < 0.0 {
            return Err(EvalError::Domain(format!(
                "factorial is not defined for negative numbers, got {}",
                format_float(n)
            )));
        }
        if n > FACTORIAL_LIMIT {
            return Err(EvalError::Overflow(format!(
                "factorial argument {} exceeds {}",
                format_float(n),
                FACTORIAL_LIMIT
            )));
        }
        Ok((2..=n as u32).fold(1.0, |acc, k| acc * k as f64))
    }

    fn is_zero(&self, value: &f64) -> bool {
        *value == 0.0
    }

    fn pow(&mut self, base: f64, exp: f64) -> Result<f64, EvalError> {
        if base == 0.0 && exp < 0.0 {
            return Err(EvalError::DivisionByZero);
        }
        checked(base.powf(exp), "power")
    }

    fn apply(&mut self, func: Function, x: f64) -> Result<f64, EvalError> {
        let result = match func {
            Function::Sin => x.sin(),
            Function::Cos => x.cos(),
            Function::Tan => x.tan(),
            Function::Exp => x.exp(),
            Function::Atan => x.atan(),
            Function::Sinh => x.sinh(),
            Function::Log => {
                if x <= 0.0 {
                    return Err(EvalError::Domain(format!(
                        "log is only defined for positive numbers, got {}",
                        format_float(x)
                    )));
                }
                x.ln()
            }
            Function::Sqrt => {
                if x < 0.0 {
                    return Err(EvalError::Domain(format!(
                        "sqrt is not defined for negative numbers, got {}",
                        format_float(x)
                    )));
                }
                x.sqrt()
            }
            Function::Asin | Function::Acos => {
                if !(-1.0..=1.0).contains(&x) {
                    return Err(EvalError::Domain(format!(
                        "{} is only defined on [-1, 1], got {}",
                        func,
                        format_float(x)
                    )));
                }
                if func == Function::Asin {
                    x.asin()
                } else {
                    x.acos()
                }
            }
            Function::Cot => {
                let t = x.tan();
                if t.abs() < EPSILON {
                    return Err(EvalError::Domain(format!(
                        "cot is undefined at {}",
                        format_float(x)
                    )));
                }
                1.0 / t
            }
        };
        checked(result, func.name())
    }

    fn render(&self, value: &f64) -> String {
        format_float(*value)
    }
}
