//! Exact + inexact numeric tower: `Int`, `BigInt`, `Rational`, `BigRational`,
//! `Real`. Generalizes the teacher's single `Expr::Rat(BigRational)`
//! representation into the five-variant tagged union the data model calls
//! for, built on the same `num-bigint`/`num-rational`/`num-traits` stack.
//!
//! Every constructor normalizes on the way in: rationals reduce by gcd with
//! a positive denominator and collapse to `Int` when the denominator is 1;
//! arithmetic that would overflow `i64` promotes to the big form instead of
//! panicking or silently wrapping.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::error::ArithmeticError;

/// A scaled-`BigInt` decimal carrier: value = `digits / 10^scale`.
///
/// Backs `Number::Real` when a literal's magnitude overflows what `f64` can
/// represent exactly. The same technique as the teacher's `lecture.rs`
/// (`scaled_to_decimal` / `rational_scaled`), just promoted from a
/// throwaway formatting helper to a first-class carrier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BigDecimal {
    pub digits: BigInt,
    pub scale: u32,
}

impl BigDecimal {
    pub fn new(digits: BigInt, scale: u32) -> Self {
        BigDecimal { digits, scale }
    }

    pub fn to_big_rational(&self) -> BigRational {
        let den = BigInt::from(10u32).pow(self.scale);
        BigRational::new(self.digits.clone(), den)
    }

    pub fn to_f64_lossy(&self) -> f64 {
        self.to_big_rational()
            .to_f64()
            .unwrap_or(f64::INFINITY * self.digits.signum().to_f64().unwrap_or(1.0))
    }
}

impl fmt::Display for BigDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.digits);
        }
        let neg = self.digits.is_negative();
        let mag = self.digits.abs().to_string();
        let scale = self.scale as usize;
        let padded = if mag.len() <= scale {
            format!("{}{}", "0".repeat(scale - mag.len() + 1), mag)
        } else {
            mag
        };
        let split = padded.len() - scale;
        let (int_part, frac_part) = padded.split_at(split);
        write!(f, "{}{}.{}", if neg { "-" } else { "" }, int_part, frac_part)
    }
}

#[derive(Clone, Debug)]
pub enum Number {
    Int(i64),
    BigInt(BigInt),
    Rational(i64, i64),
    BigRational(BigRational),
    Real(f64, Option<BigDecimal>),
}

/// Approximate conversion used only when a `Real` without an exact
/// big-decimal carrier needs comparing against an exact variant; `Real` is
/// inexact by definition so this is a scaled-integer approximation, not a
/// precision guarantee.
fn approx_big_rational(v: f64) -> BigRational {
    if !v.is_finite() {
        return BigRational::from_integer(BigInt::from(if v.is_sign_negative() { -1 } else { 1 }) * BigInt::from(i64::MAX));
    }
    let scale = 1_000_000_000_000i64;
    BigRational::new(BigInt::from((v * scale as f64).round() as i128), BigInt::from(scale))
}

fn gcd_i64(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a as i128, b as i128);
    a = a.abs();
    b = b.abs();
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a as i64
}

impl Number {
    pub fn zero() -> Self {
        Number::Int(0)
    }

    pub fn one() -> Self {
        Number::Int(1)
    }

    pub fn from_i64(v: i64) -> Self {
        Number::Int(v)
    }

    pub fn from_big_int(v: BigInt) -> Self {
        match v.to_i64() {
            Some(i) => Number::Int(i),
            None => Number::BigInt(v),
        }
    }

    /// Reduces `num/den`, normalizes the sign onto the numerator, and
    /// canonicalizes to `Int` when the reduced denominator is 1.
    pub fn rational(num: i64, den: i64) -> Result<Self, ArithmeticError> {
        if den == 0 {
            return Err(ArithmeticError::ZeroDenominator);
        }
        let (mut num, mut den) = (num, den);
        if den < 0 {
            // Guard the i64::MIN negation edge case by promoting instead.
            if num == i64::MIN || den == i64::MIN {
                return Ok(Self::from_big_rational(BigRational::new(
                    BigInt::from(num),
                    BigInt::from(den),
                )));
            }
            num = -num;
            den = -den;
        }
        let g = gcd_i64(num, den).max(1);
        let num = num / g;
        let den = den / g;
        if den == 1 {
            Ok(Number::Int(num))
        } else {
            Ok(Number::Rational(num, den))
        }
    }

    /// Renormalizes an arbitrary-precision rational to the smallest exact
    /// representation that still holds the value (per the Number data
    /// model's collapse-on-construction invariant).
    pub fn from_big_rational(r: BigRational) -> Self {
        if r.is_integer() {
            return Self::from_big_int(r.to_integer());
        }
        let num = r.numer().clone();
        let den = r.denom().clone();
        match (num.to_i64(), den.to_i64()) {
            (Some(n), Some(d)) => Number::Rational(n, d),
            _ => Number::BigRational(r),
        }
    }

    pub fn real(value: f64) -> Self {
        Number::Real(value, None)
    }

    pub fn real_big(value: f64, exact: BigDecimal) -> Self {
        Number::Real(value, Some(exact))
    }

    pub fn pi() -> Self {
        Number::real(std::f64::consts::PI)
    }

    pub fn tau() -> Self {
        Number::real(std::f64::consts::TAU)
    }

    pub fn e() -> Self {
        Number::real(std::f64::consts::E)
    }

    pub fn infinity() -> Self {
        Number::real(f64::INFINITY)
    }

    pub fn is_exact(&self) -> bool {
        !matches!(self, Number::Real(..))
    }

    /// Recognizes a leaf produced by [`Number::pi`] — used by the trig
    /// exactness rule (spec.md §4.3 item 7) to detect rational multiples of
    /// π structurally, before any constant-folding pass has a chance to
    /// collapse the surrounding arithmetic into an ordinary (no-longer
    /// symbolically-pi) float.
    pub fn is_constant_pi(&self) -> bool {
        matches!(self, Number::Real(v, None) if *v == std::f64::consts::PI)
    }

    pub fn is_constant_tau(&self) -> bool {
        matches!(self, Number::Real(v, None) if *v == std::f64::consts::TAU)
    }

    /// Exact rational value, for callers (the trig table, polynomial
    /// pipeline) that need `BigRational` arithmetic directly; `None` for
    /// `Real`.
    pub fn to_exact_rational(&self) -> Option<BigRational> {
        if self.is_exact() {
            Some(self.to_big_rational())
        } else {
            None
        }
    }

    fn level(&self) -> u8 {
        match self {
            Number::Int(_) => 0,
            Number::BigInt(_) => 1,
            Number::Rational(..) => 2,
            Number::BigRational(_) => 3,
            Number::Real(..) => 4,
        }
    }

    fn to_big_rational(&self) -> BigRational {
        match self {
            Number::Int(i) => BigRational::from_integer(BigInt::from(*i)),
            Number::BigInt(b) => BigRational::from_integer(b.clone()),
            Number::Rational(n, d) => BigRational::new(BigInt::from(*n), BigInt::from(*d)),
            Number::BigRational(r) => r.clone(),
            Number::Real(v, exact) => exact
                .as_ref()
                .map(|b| b.to_big_rational())
                .unwrap_or_else(|| approx_big_rational(*v)),
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Int(i) => *i as f64,
            Number::BigInt(b) => b.to_f64().unwrap_or(f64::INFINITY),
            Number::Rational(n, d) => *n as f64 / *d as f64,
            Number::BigRational(r) => r.to_f64().unwrap_or(f64::INFINITY),
            Number::Real(v, _) => *v,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Int(i) => *i == 0,
            Number::BigInt(b) => b.is_zero(),
            Number::Rational(n, _) => *n == 0,
            Number::BigRational(r) => r.is_zero(),
            Number::Real(v, _) => *v == 0.0,
        }
    }

    pub fn is_one(&self) -> bool {
        match self {
            Number::Int(i) => *i == 1,
            Number::BigInt(b) => b.is_one(),
            Number::Rational(n, d) => *n == 1 && *d == 1,
            Number::BigRational(r) => r.is_one(),
            Number::Real(v, _) => *v == 1.0,
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Number::Int(i) => *i < 0,
            Number::BigInt(b) => b.is_negative(),
            Number::Rational(n, _) => *n < 0,
            Number::BigRational(r) => r.is_negative(),
            Number::Real(v, _) => *v < 0.0,
        }
    }

    pub fn neg(&self) -> Number {
        match self {
            Number::Int(i) => match i.checked_neg() {
                Some(v) => Number::Int(v),
                None => Number::from_big_int(-BigInt::from(*i)),
            },
            Number::BigInt(b) => Number::from_big_int(-b),
            Number::Rational(n, d) => Number::rational(-*n, *d).unwrap_or(Number::Int(0)),
            Number::BigRational(r) => Number::from_big_rational(-r.clone()),
            Number::Real(v, exact) => {
                Number::Real(-v, exact.as_ref().map(|b| BigDecimal::new(-b.digits.clone(), b.scale)))
            }
        }
    }

    /// Integer divisor used by the polynomial pipeline to probe whether a
    /// `Number` is an exact integer small enough to iterate divisors of.
    pub fn as_exact_i64(&self) -> Option<i64> {
        match self {
            Number::Int(i) => Some(*i),
            Number::BigInt(b) => b.to_i64(),
            Number::Rational(n, d) if *d == 1 => Some(*n),
            Number::BigRational(r) if r.is_integer() => r.to_integer().to_i64(),
            _ => None,
        }
    }

    fn add_exact(a: &Number, b: &Number) -> Number {
        if let (Number::Int(x), Number::Int(y)) = (a, b) {
            if let Some(s) = x.checked_add(*y) {
                return Number::Int(s);
            }
        }
        if let (Number::BigInt(x), Number::BigInt(y)) = (a, b) {
            return Number::from_big_int(x + y);
        }
        Number::from_big_rational(a.to_big_rational() + b.to_big_rational())
    }

    pub fn add(&self, other: &Number) -> Number {
        if self.level().max(other.level()) == 4 {
            return Number::real(self.to_f64() + other.to_f64());
        }
        Self::add_exact(self, other)
    }

    pub fn subtract(&self, other: &Number) -> Number {
        self.add(&other.neg())
    }

    fn multiply_exact(a: &Number, b: &Number) -> Number {
        if let (Number::Int(x), Number::Int(y)) = (a, b) {
            if let Some(p) = x.checked_mul(*y) {
                return Number::Int(p);
            }
        }
        if let (Number::BigInt(x), Number::BigInt(y)) = (a, b) {
            return Number::from_big_int(x * y);
        }
        Number::from_big_rational(a.to_big_rational() * b.to_big_rational())
    }

    pub fn multiply(&self, other: &Number) -> Number {
        if self.level().max(other.level()) == 4 {
            return Number::real(self.to_f64() * other.to_f64());
        }
        Self::multiply_exact(self, other)
    }

    pub fn divide(&self, other: &Number) -> Result<Number, ArithmeticError> {
        if self.level().max(other.level()) == 4 {
            return Ok(Number::real(self.to_f64() / other.to_f64()));
        }
        if other.is_zero() {
            return Err(ArithmeticError::ZeroDenominator);
        }
        Ok(Number::from_big_rational(
            self.to_big_rational() / other.to_big_rational(),
        ))
    }

    /// Integer power. Negative exponents invert after computing the
    /// positive power; zero exponent is 1 unconditionally.
    pub fn pow(&self, exp: i64) -> Result<Number, ArithmeticError> {
        if exp == 0 {
            return Ok(Number::Int(1));
        }
        if let Number::Real(v, _) = self {
            return Ok(Number::real(v.powi(exp as i32)));
        }
        if exp < 0 {
            if self.is_zero() {
                return Err(ArithmeticError::ZeroDenominator);
            }
            let positive = self.pow(-exp)?;
            return Number::Int(1).divide(&positive);
        }
        let base = self.to_big_rational();
        let mut result = BigRational::one();
        let mut b = base;
        let mut e = exp as u64;
        while e > 0 {
            if e & 1 == 1 {
                result = &result * &b;
            }
            b = &b * &b;
            e >>= 1;
        }
        Ok(Number::from_big_rational(result))
    }

    /// `%`: exact integer remainder when both operands are exact integers,
    /// floating-point `fmod` otherwise.
    pub fn modulo(&self, other: &Number) -> Result<Number, ArithmeticError> {
        if other.is_zero() {
            return Err(ArithmeticError::ZeroDenominator);
        }
        if let (Some(a), Some(b)) = (self.as_exact_i64(), other.as_exact_i64()) {
            return Ok(Number::Int(a % b));
        }
        if self.is_exact() && other.is_exact() {
            let bg_a = match self {
                Number::BigInt(b) => Some(b.clone()),
                Number::Int(i) => Some(BigInt::from(*i)),
                _ => None,
            };
            let bg_b = match other {
                Number::BigInt(b) => Some(b.clone()),
                Number::Int(i) => Some(BigInt::from(*i)),
                _ => None,
            };
            if let (Some(a), Some(b)) = (bg_a, bg_b) {
                return Ok(Number::from_big_int(a % b));
            }
        }
        Ok(Number::real(self.to_f64() % other.to_f64()))
    }

    /// Cross-variant equality with ε ≤ 1e-9 tolerance when either side is
    /// `Real`; exact comparison otherwise.
    pub fn numeric_eq(&self, other: &Number) -> bool {
        if self.is_exact() && other.is_exact() {
            return self.to_big_rational() == other.to_big_rational();
        }
        (self.to_f64() - other.to_f64()).abs() <= 1e-9
    }

    pub fn compare(&self, other: &Number) -> Ordering {
        if self.is_exact() && other.is_exact() {
            self.to_big_rational().cmp(&other.to_big_rational())
        } else {
            self.to_f64()
                .partial_cmp(&other.to_f64())
                .unwrap_or(Ordering::Equal)
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.numeric_eq(other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::BigInt(b) => write!(f, "{b}"),
            Number::Rational(n, d) => write!(f, "{n}/{d}"),
            Number::BigRational(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            Number::Real(v, exact) => match exact {
                Some(b) => write!(f, "{b}"),
                None => write!(f, "{v}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rational_reduces_and_normalizes_sign() {
        let r = Number::rational(4, -8).unwrap();
        match r {
            Number::Rational(n, d) => {
                assert_eq!((n, d), (-1, 2));
            }
            other => panic!("expected Rational, got {other:?}"),
        }
    }

    #[test]
    fn rational_with_unit_denominator_canonicalizes_to_int() {
        let r = Number::rational(6, 3).unwrap();
        assert!(matches!(r, Number::Int(2)));
    }

    #[test]
    fn rational_zero_denominator_errors() {
        assert_eq!(
            Number::rational(1, 0).unwrap_err(),
            ArithmeticError::ZeroDenominator
        );
    }

    #[test]
    fn int_addition_overflow_promotes_to_bigint() {
        let a = Number::Int(i64::MAX);
        let b = Number::Int(1);
        let sum = a.add(&b);
        assert!(matches!(sum, Number::BigInt(_)));
        assert_eq!(sum.to_f64(), (i64::MAX as f64) + 1.0);
    }

    #[test]
    fn mixed_rational_bigint_promotes_correctly() {
        let a = Number::Rational(1, 2);
        let b = Number::BigInt(BigInt::from(3));
        let sum = a.add(&b);
        match sum {
            Number::Rational(n, d) => assert_eq!((n, d), (7, 2)),
            other => panic!("expected Rational(7, 2), got {other:?}"),
        }
    }

    #[test]
    fn numeric_eq_across_variants_with_epsilon() {
        let a = Number::Rational(1, 2);
        let b = Number::real(0.5 + 1e-12);
        assert!(a.numeric_eq(&b));
    }

    #[test]
    fn pow_negative_exponent_inverts() {
        let two = Number::Int(2);
        let inv = two.pow(-3).unwrap();
        assert_eq!(inv, Number::Rational(1, 8));
    }

    #[test]
    fn pow_zero_exponent_is_one_even_for_zero_base() {
        assert_eq!(Number::Int(0).pow(0).unwrap(), Number::Int(1));
    }

    #[test]
    fn divide_by_zero_is_an_arithmetic_error() {
        assert_eq!(
            Number::Int(1).divide(&Number::Int(0)).unwrap_err(),
            ArithmeticError::ZeroDenominator
        );
    }

    #[test]
    fn big_decimal_display_places_decimal_point() {
        let bd = BigDecimal::new(BigInt::from(12345), 2);
        assert_eq!(bd.to_string(), "123.45");
    }
}
