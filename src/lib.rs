//! rcalc - infix expression evaluator
//!
//! # Overview
//!
//! rcalc evaluates infix arithmetic in three numeric domains: native `f64`,
//! arbitrary-precision integers and 50-digit decimals. Every expression goes
//! through the same one-way pipeline:
//!
//! ```text
//! "2 + 3 * x"  --tokenize-->  [2] [+] [3] [*] [x]
//!              --to_postfix-> [2] [3] [x] [*] [+]
//!              --evaluate---> 14          (with x = 4)
//! ```
//!
//! The stages are generic over [`number::Backend`]; the backend decides how
//! literals are parsed, which grammar is allowed and how results are checked.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! let mut vars = HashMap::new();
//! vars.insert("x".to_string(), 4.0);
//!
//! assert_eq!(rcalc::evaluate("2 + 3 * x", &vars).unwrap(), 14.0);
//! assert_eq!(rcalc::evaluate_bigint("2 * 10 / 4", &()).unwrap(), "5");
//! assert_eq!(rcalc::evaluate_bigdecimal("0.1 + 0.2", &()).unwrap(), "0.3");
//! ```

pub mod error;
pub mod eval;
pub mod lexer;
pub mod number;
pub mod parser;

// Re-export commonly used items
pub use error::{CalcError, ErrorKind};
pub use eval::{evaluate_rpn, EvalError, Evaluator, Variables};
pub use lexer::{tokenize, Capabilities, Function, LexError, Operator, Token};
pub use number::{format_float, Backend, BigIntBackend, DecimalBackend, FloatBackend, Mode};
pub use parser::{render_tokens, to_postfix, ParseError};

use log::debug;

/// Run the whole pipeline with an explicit backend
pub fn evaluate_with<B, V>(backend: &mut B, expression: &str, variables: &V) -> Result<B::Value, CalcError>
where
    B: Backend,
    V: Variables + ?Sized,
{
    let tokens = tokenize(expression, backend.capabilities())?;
    debug!("tokens: {}", render_tokens(&tokens));
    let rpn = to_postfix(tokens)?;
    debug!("rpn: {}", render_tokens(&rpn));
    Ok(evaluate_rpn(backend, &rpn, variables)?)
}

/// Evaluate with the native `f64` backend
pub fn evaluate<V: Variables + ?Sized>(expression: &str, variables: &V) -> Result<f64, CalcError> {
    evaluate_with(&mut FloatBackend, expression, variables)
}

/// Evaluate with arbitrary-precision integers; the result is a decimal string
pub fn evaluate_bigint<V: Variables + ?Sized>(
    expression: &str,
    variables: &V,
) -> Result<String, CalcError> {
    let mut backend = BigIntBackend;
    let value = evaluate_with(&mut backend, expression, variables)?;
    Ok(backend.render(&value))
}

/// Evaluate with 50-significant-digit decimals
pub fn evaluate_bigdecimal<V: Variables + ?Sized>(
    expression: &str,
    variables: &V,
) -> Result<String, CalcError> {
    let mut backend = DecimalBackend::new()?;
    let value = evaluate_with(&mut backend, expression, variables)?;
    Ok(backend.render(&value))
}

/// Evaluate in `mode`, rendering the result the way the CLI prints it
pub fn evaluate_in<V: Variables + ?Sized>(
    mode: Mode,
    expression: &str,
    variables: &V,
) -> Result<String, CalcError> {
    match mode {
        Mode::Float => evaluate(expression, variables).map(format_float),
        Mode::BigInt => evaluate_bigint(expression, variables),
        Mode::BigDecimal => evaluate_bigdecimal(expression, variables),
    }
}
