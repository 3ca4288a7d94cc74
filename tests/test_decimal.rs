//! Integration tests for the 50-digit decimal mode

#[path = "common/mod.rs"]
mod common;
use common::{err_kind_in, evaluate_bigdecimal, vars, ErrorKind, Mode};

fn dec(input: &str) -> String {
    evaluate_bigdecimal(input, &()).unwrap()
}

#[test]
fn test_exact_decimal_sum() {
    assert_eq!(dec("0.1 + 0.2"), "0.3");
    assert_eq!(dec("10/4"), "2.5");
    assert_eq!(dec("1.10 * 3"), "3.3");
}

#[test]
fn test_fifty_significant_digits() {
    assert_eq!(dec("1/3"), format!("0.{}", "3".repeat(50)));
    assert_eq!(dec("1/3*3"), "1");
}

#[test]
fn test_power() {
    assert_eq!(dec("2^3^2"), "512");
    assert_eq!(dec("2^-1"), "0.5");
    assert_eq!(dec("(-2)^3"), "-8");
    assert!(dec("2^0.5").starts_with("1.4142135623730950488016887242"));
    assert_eq!(err_kind_in(Mode::BigDecimal, "(-8)^0.5"), ErrorKind::Domain);
    assert_eq!(err_kind_in(Mode::BigDecimal, "0^-1"), ErrorKind::Arithmetic);
}

#[test]
fn test_scientific_notation() {
    assert_eq!(dec("10^60"), "1E+60");
    assert_eq!(dec("10^-12"), "1E-12");
    assert_eq!(dec("0.001"), "0.001");
    assert_eq!(
        dec("100!"),
        "9.3326215443944152681699238856266700490715968264382E+157"
    );
}

#[test]
fn test_huge_magnitudes_render_quickly() {
    let start = std::time::Instant::now();
    assert_eq!(dec("10^20000000"), "1E+20000000");
    assert_eq!(dec("10^-20000000"), "1E-20000000");
    assert_eq!(dec("2*10^5000"), "2E+5000");
    assert!(start.elapsed() < std::time::Duration::from_secs(10));
}

#[test]
fn test_power_with_enormous_integer_exponent() {
    assert_eq!(dec("1^(10^30)"), "1");
    assert_eq!(dec("(-1)^(10^30)"), "1");
    assert_eq!(dec("(-1)^(10^30+1)"), "-1");
    assert_eq!(dec("0.5^(10^30)"), "0");
    assert_eq!(dec("2^-(10^30)"), "0");
    assert_eq!(dec("0^(10^30)"), "0");
    assert_eq!(err_kind_in(Mode::BigDecimal, "2^(10^30)"), ErrorKind::Overflow);
}

#[test]
fn test_factorial() {
    assert_eq!(dec("5!"), "120");
    assert!(evaluate_bigdecimal("171!", &()).is_ok());
    assert_eq!(err_kind_in(Mode::BigDecimal, "10001!"), ErrorKind::Overflow);
    assert_eq!(err_kind_in(Mode::BigDecimal, "2.5!"), ErrorKind::Domain);
    assert_eq!(err_kind_in(Mode::BigDecimal, "(10^30)!"), ErrorKind::Overflow);
}

#[test]
fn test_division_by_zero() {
    assert_eq!(err_kind_in(Mode::BigDecimal, "1/0"), ErrorKind::Arithmetic);
}

#[test]
fn test_negation() {
    assert_eq!(dec("-(3+2)"), "-5");
    assert_eq!(dec("-0.5*4"), "-2");
}

#[test]
fn test_decimal_variables() {
    let env = vars(&[("x", 0.1)]);
    assert_eq!(evaluate_bigdecimal("x + 0.2", &env).unwrap(), "0.3");
    let err = evaluate_bigdecimal("y", &env).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownIdentifier);
}
