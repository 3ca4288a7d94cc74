//! Common test utilities for rcalc integration tests

#![allow(dead_code)]

pub use rcalc::{
    evaluate, evaluate_bigdecimal, evaluate_bigint, evaluate_in, CalcError, ErrorKind, Mode,
};
use std::collections::HashMap;

/// Build a variable map from (name, value) pairs
pub fn vars(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Evaluate with the float backend and no variables
pub fn eval(input: &str) -> Result<f64, CalcError> {
    evaluate(input, &())
}

/// Float result, rendered the way the CLI prints it
pub fn eval_str(input: &str) -> String {
    evaluate_in(Mode::Float, input, &()).unwrap()
}

/// Error kind of a failing float evaluation
pub fn eval_err_kind(input: &str) -> ErrorKind {
    match eval(input) {
        Ok(v) => panic!("expected '{}' to fail, got {}", input, v),
        Err(e) => e.kind(),
    }
}

/// Error kind of a failing evaluation in `mode`
pub fn err_kind_in(mode: Mode, input: &str) -> ErrorKind {
    match evaluate_in(mode, input, &()) {
        Ok(v) => panic!("expected '{}' to fail in {} mode, got {}", input, mode, v),
        Err(e) => e.kind(),
    }
}

/// Assert two floats agree to within 1e-9
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}
