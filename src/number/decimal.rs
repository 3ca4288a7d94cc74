use super::Backend;
use crate::eval::EvalError;
use crate::lexer::{Capabilities, Function};
use astro_float::{BigFloat, Consts, Radix, RoundingMode};
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, ToPrimitive, Zero};

/// Significant decimal digits kept in rendered results
pub const PRECISION: usize = 50;

/// Extra digits computed before rounding to `PRECISION`
const GUARD_DIGITS: usize = 5;

/// Integer and zero checks tolerate a distance below 10^-40
const EPSILON_DIGITS: u32 = 40;

/// Binary exponent below which a value is treated as zero (2^-133 < 10^-40)
const NEGLIGIBLE_EXPONENT: i64 = -133;

const FACTORIAL_LIMIT: u32 = 10_000;

/// Results with up to this many zeros after the point are printed in plain form
const PLAIN_ZEROS: i64 = 10;

/// Values whose decimal exponent exceeds this are scaled before digit extraction
const DIRECT_DECIMAL_EXPONENT: i64 = 1_000;

/// Bits needed for `digits` significant decimal digits.
/// Rounded up to a 64-bit word boundary plus one guard word.
fn nominal_bits(digits: usize) -> usize {
    let base_bits = (digits as f64 * std::f64::consts::LOG2_10).ceil() as usize;
    ((base_bits + 63) & !63) + 64
}

/// Mantissa, binary shift and sign such that value = ±mantissa * 2^shift
fn raw_parts(value: &BigFloat) -> Option<(BigUint, i64, bool)> {
    let (words, _sig_bits, sign, exponent, _inexact) = value.as_raw_parts()?;
    let word_bits = words.first().map_or(64, |w| std::mem::size_of_val(w) * 8);
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    let mantissa = BigUint::from_bytes_le(&bytes);
    let shift = exponent as i64 - (words.len() * word_bits) as i64;
    Some((mantissa, shift, sign.is_negative()))
}

/// Nearest integer to a value and how far the value is from it
struct Rounded {
    value: BigInt,
    exact: bool,
    close: bool,
}

fn nearest_integer(value: &BigFloat) -> Option<Rounded> {
    if value.is_zero() {
        return Some(Rounded {
            value: BigInt::zero(),
            exact: true,
            close: true,
        });
    }
    let (mantissa, shift, negative) = raw_parts(value)?;

    let (magnitude, exact, close) = if shift >= 0 {
        (mantissa << shift as usize, true, true)
    } else {
        let s = shift.unsigned_abs() as usize;
        let half = BigUint::one() << (s - 1);
        let nearest = (&mantissa + &half) >> s;
        let back = &nearest << s;
        let diff = if back > mantissa {
            &back - &mantissa
        } else {
            &mantissa - &back
        };
        let exact = diff.is_zero();
        // diff / 2^s < 10^-EPSILON_DIGITS
        let close = diff * BigUint::from(10u32).pow(EPSILON_DIGITS) < (BigUint::one() << s);
        (nearest, exact, close)
    };

    let sign = if negative { Sign::Minus } else { Sign::Plus };
    Some(Rounded {
        value: BigInt::from_biguint(sign, magnitude),
        exact,
        close,
    })
}

/// Round a digit string to `digits` significant digits (half up) and drop trailing zeros.
/// `point` is the position of the decimal point relative to the first digit.
fn round_digits(text: &str, point: i64, digits: usize) -> (String, i64) {
    let bytes = text.as_bytes();
    if bytes.len() <= digits {
        return (text.trim_end_matches('0').to_string(), point);
    }

    let mut kept = bytes[..digits].to_vec();
    let mut point = point;
    if bytes[digits] >= b'5' {
        let mut i = digits;
        loop {
            if i == 0 {
                // 999.. rolled over
                kept.insert(0, b'1');
                kept.pop();
                point += 1;
                break;
            }
            i -= 1;
            if kept[i] == b'9' {
                kept[i] = b'0';
            } else {
                kept[i] += 1;
                break;
            }
        }
    }

    let rounded: String = kept.into_iter().map(char::from).collect();
    (rounded.trim_end_matches('0').to_string(), point)
}

/// Place the decimal point, switching to `d.dddE±n` when the value is too
/// large or too small for plain notation
fn layout(sig: &str, point: i64, negative: bool, digits: usize) -> String {
    let body = if point > 0 && point <= digits as i64 {
        let p = point as usize;
        if sig.len() <= p {
            format!("{}{}", sig, "0".repeat(p - sig.len()))
        } else {
            format!("{}.{}", &sig[..p], &sig[p..])
        }
    } else if point <= 0 && point > -PLAIN_ZEROS {
        format!("0.{}{}", "0".repeat(point.unsigned_abs() as usize), sig)
    } else {
        let exp = point - 1;
        let mantissa = if sig.len() == 1 {
            sig.to_string()
        } else {
            format!("{}.{}", &sig[..1], &sig[1..])
        };
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}E{}{}", mantissa, sign, exp.abs())
    };

    if negative {
        format!("-{}", body)
    } else {
        body
    }
}

/// Digit string of a finite value plus the position of the decimal point
/// within it, keeping `digits` plus guard digits after the leading zeros.
/// `None` when the value rounds to zero at that scale.
fn digit_text(mantissa: BigUint, shift: i64, digits: usize) -> Option<(String, i64)> {
    if shift >= 0 {
        let text = (mantissa << shift as usize).to_string();
        let point = text.len() as i64;
        return Some((text, point));
    }
    let s = shift.unsigned_abs() as usize;
    let exponent = mantissa.bits() as i64 + shift;
    let leading = (-(exponent as f64) * std::f64::consts::LOG10_2).ceil().max(0.0) as usize;
    let k = digits + GUARD_DIGITS + leading;
    let scale = BigUint::from(10u32).pow(k as u32);
    let half = BigUint::one() << (s - 1);
    let scaled = (mantissa * scale + half) >> s;
    if scaled.is_zero() {
        return None;
    }
    let text = scaled.to_string();
    let point = text.len() as i64 - k as i64;
    Some((text, point))
}

/// Bring a value with decimal exponent around `decimal_exp` down to about
/// `digits + GUARD_DIGITS` integer digits. Returns the scaled value and the
/// power of ten that was divided out.
fn scale_down(value: &BigFloat, decimal_exp: i64, digits: usize) -> (BigFloat, i64) {
    let p = nominal_bits(digits + GUARD_DIGITS) + 64;
    let rm = RoundingMode::ToEven;
    let power = decimal_exp - (digits + GUARD_DIGITS) as i64;
    let ten = BigFloat::from_i32(10, p).powi(power.unsigned_abs() as usize, p, rm);
    let scaled = if power >= 0 {
        value.div(&ten, p, rm)
    } else {
        value.mul(&ten, p, rm)
    };
    (scaled, power)
}

/// Decimal text of a value rounded to `digits` significant digits
pub(crate) fn render_decimal(value: &BigFloat, digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_inf() {
        return if value.is_negative() { "-Infinity" } else { "Infinity" }.to_string();
    }
    if value.is_zero() {
        return "0".to_string();
    }
    let (mantissa, shift, negative) = match raw_parts(value) {
        Some(parts) => parts,
        None => return "NaN".to_string(),
    };

    // Exact digit extraction costs grow with the magnitude, so far-out values
    // are scaled toward 1 first and the power of ten is added back afterwards
    let binary_exp = mantissa.bits() as i64 + shift;
    let decimal_exp = (binary_exp as f64 * std::f64::consts::LOG10_2).floor() as i64;
    let (mantissa, shift, offset) = if decimal_exp.abs() > DIRECT_DECIMAL_EXPONENT {
        let (scaled, power) = scale_down(value, decimal_exp, digits);
        match raw_parts(&scaled) {
            Some((m, s, _)) if !scaled.is_inf() && !scaled.is_zero() => (m, s, power),
            _ => (mantissa, shift, 0),
        }
    } else {
        (mantissa, shift, 0)
    };

    let (text, point) = match digit_text(mantissa, shift, digits) {
        Some(parts) => parts,
        None => return "0".to_string(),
    };
    let (sig, point) = round_digits(&text, point + offset, digits);
    layout(&sig, point, negative, digits)
}

/// Arbitrary-precision decimal backend built on `astro_float::BigFloat`.
///
/// Values carry about `PRECISION` significant digits plus guard bits, so
/// results like `0.1 + 0.2` print exactly as `0.3`.
pub struct DecimalBackend {
    bits: usize,
    rm: RoundingMode,
    cc: Consts,
}

impl DecimalBackend {
    pub fn new() -> Result<Self, EvalError> {
        let cc = Consts::new().map_err(|e| {
            EvalError::Overflow(format!("cannot initialize decimal backend: {}", e))
        })?;
        Ok(DecimalBackend {
            bits: nominal_bits(PRECISION),
            rm: RoundingMode::ToEven,
            cc,
        })
    }

    fn parse(&mut self, text: &str) -> BigFloat {
        BigFloat::parse(text, Radix::Dec, self.bits, self.rm, &mut self.cc)
    }

    fn one(&self) -> BigFloat {
        BigFloat::from_i32(1, self.bits)
    }

    /// Reject NaN and infinite results
    fn finish(&self, value: BigFloat, what: &str) -> Result<BigFloat, EvalError> {
        if value.is_nan() {
            Err(EvalError::Domain(format!("{} is undefined for these arguments", what)))
        } else if value.is_inf() {
            Err(EvalError::Overflow(format!("{} result is out of range", what)))
        } else {
            Ok(value)
        }
    }

    /// |value| < 10^-40
    fn is_negligible(&self, value: &BigFloat) -> bool {
        if value.is_zero() {
            return true;
        }
        binary_exponent(value).is_some_and(|e| e < NEGLIGIBLE_EXPONENT)
    }

    /// `base^n` for an integer `n` too large for repeated squaring.
    /// `|base| = 1` is exact. Otherwise the magnitude goes through `BigFloat::pow`
    /// and the sign follows the parity of `n`.
    fn pow_large_integer(
        &mut self,
        base: BigFloat,
        exp: BigFloat,
        n: &BigInt,
    ) -> Result<BigFloat, EvalError> {
        if base.is_zero() {
            return Ok(base);
        }
        let odd = !(n.magnitude() % 2u32).is_zero();
        let negate = base.is_negative() && odd;
        let magnitude = base.abs();
        let distance = magnitude.sub(&self.one(), self.bits, self.rm);

        if distance.is_zero() {
            let one = self.one();
            return Ok(if negate { one.neg() } else { one });
        }

        // n * ln|base| far outside the exponent range decides the result outright
        let scale = magnitude
            .ln(self.bits, self.rm, &mut self.cc)
            .mul(&exp, self.bits, self.rm);
        if scale.is_inf() || binary_exponent(&scale).is_some_and(|e| e > 40) {
            if scale.is_negative() {
                return Ok(BigFloat::from_i32(0, self.bits));
            }
            return Err(EvalError::Overflow("power result is out of range".to_string()));
        }
        let power = magnitude.pow(&exp, self.bits, self.rm, &mut self.cc);
        let power = self.finish(power, "power")?;
        Ok(if negate { power.neg() } else { power })
    }
}

/// Binary exponent `e` such that 2^(e-1) <= |value| < 2^e
fn binary_exponent(value: &BigFloat) -> Option<i64> {
    let (mantissa, shift, _) = raw_parts(value)?;
    Some(mantissa.bits() as i64 + shift)
}

impl Backend for DecimalBackend {
    type Value = BigFloat;

    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL
    }

    fn parse_literal(&mut self, literal: &str) -> Result<BigFloat, EvalError> {
        let value = self.parse(literal);
        if value.is_nan() {
            return Err(EvalError::InvalidLiteral(literal.to_string()));
        }
        self.finish(value, "literal")
    }

    fn from_variable(&mut self, name: &str, value: f64) -> Result<BigFloat, EvalError> {
        if !value.is_finite() {
            return Err(EvalError::Overflow(format!(
                "variable '{}' is not a finite number",
                name
            )));
        }
        // Shortest round-trip text, so 0.1 stays 0.1 instead of its binary expansion
        let value = self.parse(&value.to_string());
        self.finish(value, "variable")
    }

    fn add(&mut self, lhs: BigFloat, rhs: BigFloat) -> Result<BigFloat, EvalError> {
        self.finish(lhs.add(&rhs, self.bits, self.rm), "addition")
    }

    fn sub(&mut self, lhs: BigFloat, rhs: BigFloat) -> Result<BigFloat, EvalError> {
        self.finish(lhs.sub(&rhs, self.bits, self.rm), "subtraction")
    }

    fn mul(&mut self, lhs: BigFloat, rhs: BigFloat) -> Result<BigFloat, EvalError> {
        self.finish(lhs.mul(&rhs, self.bits, self.rm), "multiplication")
    }

    fn div(&mut self, lhs: BigFloat, rhs: BigFloat) -> Result<BigFloat, EvalError> {
        if self.is_zero(&rhs) {
            return Err(EvalError::DivisionByZero);
        }
        self.finish(lhs.div(&rhs, self.bits, self.rm), "division")
    }

    fn neg(&mut self, value: BigFloat) -> BigFloat {
        value.neg()
    }

    fn factorial(&mut self, value: BigFloat) -> Result<BigFloat, EvalError> {
        // Far beyond the ceiling; skip the exact integer conversion
        if binary_exponent(&value).is_some_and(|e| e > 64) {
            return Err(if value.is_negative() {
                EvalError::Domain(format!(
                    "factorial is not defined for negative numbers, got {}",
                    self.render(&value)
                ))
            } else {
                EvalError::Overflow(format!(
                    "factorial argument {} exceeds {}",
                    self.render(&value),
                    FACTORIAL_LIMIT
                ))
            });
        }
        let rounded = nearest_integer(&value)
            .ok_or_else(|| EvalError::Domain("factorial of a non-finite value".to_string()))?;
        if !rounded.close {
            return Err(EvalError::Domain(format!(
                "factorial is only defined for integers, got {}",
                self.render(&value)
            )));
        }
        if rounded.value.sign() == Sign::Minus {
            return Err(EvalError::Domain(format!(
                "factorial is not defined for negative numbers, got {}",
                rounded.value
            )));
        }
        let n = rounded
            .value
            .to_u32()
            .filter(|n| *n <= FACTORIAL_LIMIT)
            .ok_or_else(|| {
                EvalError::Overflow(format!(
                    "factorial argument {} exceeds {}",
                    rounded.value, FACTORIAL_LIMIT
                ))
            })?;

        let product = (2..=n).fold(BigUint::one(), |acc, k| acc * k);
        let result = self.parse(&product.to_string());
        self.finish(result, "factorial")
    }

    fn is_zero(&self, value: &BigFloat) -> bool {
        value.is_zero()
    }

    fn pow(&mut self, base: BigFloat, exp: BigFloat) -> Result<BigFloat, EvalError> {
        if let Some(Rounded { value: n, exact: true, .. }) = nearest_integer(&exp) {
            if base.is_zero() && n.sign() == Sign::Minus {
                return Err(EvalError::DivisionByZero);
            }
            let magnitude = match n.magnitude().to_usize() {
                Some(magnitude) => magnitude,
                None => return self.pow_large_integer(base, exp, &n),
            };
            let power = base.powi(magnitude, self.bits, self.rm);
            let power = if n.sign() == Sign::Minus {
                if power.is_zero() {
                    return Err(EvalError::Overflow("power result is out of range".to_string()));
                }
                self.one().div(&power, self.bits, self.rm)
            } else {
                power
            };
            return self.finish(power, "power");
        }

        if base.is_zero() {
            if exp.is_negative() {
                return Err(EvalError::DivisionByZero);
            }
            return Ok(base);
        }
        if base.is_negative() {
            return Err(EvalError::Domain(
                "non-integer power of a negative number".to_string(),
            ));
        }
        let power = base.pow(&exp, self.bits, self.rm, &mut self.cc);
        self.finish(power, "power")
    }

    fn apply(&mut self, func: Function, x: BigFloat) -> Result<BigFloat, EvalError> {
        let (p, rm) = (self.bits, self.rm);
        let result = match func {
            Function::Sin => x.sin(p, rm, &mut self.cc),
            Function::Cos => x.cos(p, rm, &mut self.cc),
            Function::Tan => x.tan(p, rm, &mut self.cc),
            Function::Exp => x.exp(p, rm, &mut self.cc),
            Function::Atan => x.atan(p, rm, &mut self.cc),
            Function::Sinh => x.sinh(p, rm, &mut self.cc),
            Function::Log => {
                if x.is_zero() || x.is_negative() {
                    return Err(EvalError::Domain(format!(
                        "log is only defined for positive numbers, got {}",
                        self.render(&x)
                    )));
                }
                x.ln(p, rm, &mut self.cc)
            }
            Function::Sqrt => {
                if !x.is_zero() && x.is_negative() {
                    return Err(EvalError::Domain(format!(
                        "sqrt is not defined for negative numbers, got {}",
                        self.render(&x)
                    )));
                }
                x.sqrt(p, rm)
            }
            Function::Asin | Function::Acos => {
                let excess = x.abs().sub(&self.one(), p, rm);
                if !excess.is_zero() && excess.is_positive() {
                    return Err(EvalError::Domain(format!(
                        "{} is only defined on [-1, 1], got {}",
                        func,
                        self.render(&x)
                    )));
                }
                if func == Function::Asin {
                    x.asin(p, rm, &mut self.cc)
                } else {
                    x.acos(p, rm, &mut self.cc)
                }
            }
            Function::Cot => {
                let t = x.tan(p, rm, &mut self.cc);
                if self.is_negligible(&t) {
                    return Err(EvalError::Domain(format!(
                        "cot is undefined at {}",
                        self.render(&x)
                    )));
                }
                self.one().div(&t, p, rm)
            }
        };
        self.finish(result, func.name())
    }

    fn render(&self, value: &BigFloat) -> String {
        render_decimal(value, PRECISION)
    }
}
