//! Exact trigonometry at rational multiples of π (spec.md §4.3 item 7,
//! §4.8's table). Grounded in the teacher's `noyau/trig.rs`
//! (`as_coeff_pi_ext`, `mod_rationnel`, angle table over denominators
//! `{1,2,3,4,6}`) and `noyau/identites_trig.rs`, generalized from the
//! teacher's `Expr::Pi` leaf (a dedicated AST node) to this crate's
//! `Number::Real` representation of π: since the spec's Data Model
//! materializes named constants as inexact `REAL` leaves, recognizing a
//! rational multiple of π has to happen by bit-identifying the `PI`/`TAU`
//! float literal structurally, *before* ordinary constant folding has a
//! chance to collapse the surrounding division/multiplication into a plain
//! (no-longer-recognizable) float.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::expr::Expr;
use crate::number::Number;
use crate::simplify::simplify;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrigFn {
    Sin,
    Cos,
    Tan,
}

/// Structurally extracts `k` such that `e` denotes `k * π`, for `e` built
/// from `Add/Sub/Mul/Div/Neg` around a `pi`/`tau` leaf and exact numeric
/// coefficients. Returns `None` when `e` doesn't have this shape (e.g. it
/// contains a variable, or isn't a multiple of π at all).
pub fn extract_pi_coefficient(e: &Expr) -> Option<Number> {
    match e {
        Expr::Num(n) if n.is_constant_pi() => Some(Number::one()),
        Expr::Num(n) if n.is_constant_tau() => Some(Number::Int(2)),
        Expr::Paren(x) => extract_pi_coefficient(x),
        Expr::Neg(x) => extract_pi_coefficient(x).map(|k| k.neg()),
        Expr::Mul(a, b) => {
            if let Expr::Num(c) = a.as_ref() {
                if c.is_exact() {
                    return extract_pi_coefficient(b).map(|k| c.multiply(&k));
                }
            }
            if let Expr::Num(c) = b.as_ref() {
                if c.is_exact() {
                    return extract_pi_coefficient(a).map(|k| c.multiply(&k));
                }
            }
            None
        }
        Expr::Div(a, b) => {
            if let Expr::Num(d) = b.as_ref() {
                if d.is_exact() && !d.is_zero() {
                    return extract_pi_coefficient(a).and_then(|k| k.divide(d).ok());
                }
            }
            None
        }
        Expr::Add(a, b) => match (extract_pi_coefficient(a), extract_pi_coefficient(b)) {
            (Some(ka), Some(kb)) => Some(ka.add(&kb)),
            _ => None,
        },
        Expr::Sub(a, b) => match (extract_pi_coefficient(a), extract_pi_coefficient(b)) {
            (Some(ka), Some(kb)) => Some(ka.subtract(&kb)),
            _ => None,
        },
        _ => None,
    }
}

fn floor_div(n: &BigInt, d: &BigInt) -> BigInt {
    let q = n / d;
    let r = n - &q * d;
    if !r.is_zero() && r.is_negative() != d.is_negative() {
        q - BigInt::from(1)
    } else {
        q
    }
}

/// Reduces `r` modulo the integer `m` into `[0, m)`.
fn rat_mod(r: &BigRational, m: i64) -> BigRational {
    let modulus = BigRational::from_integer(BigInt::from(m));
    let ratio = r / &modulus;
    let q = floor_div(ratio.numer(), ratio.denom());
    r - BigRational::from_integer(q) * &modulus
}

fn half() -> Expr {
    Expr::Num(Number::Rational(1, 2))
}

fn neg_half() -> Expr {
    Expr::Neg(Box::new(half()))
}

fn sqrt_over_2(n: i64) -> Expr {
    Expr::Div(Box::new(Expr::Sqrt(Box::new(Expr::int(n)))), Box::new(Expr::int(2)))
}

fn neg_sqrt_over_2(n: i64) -> Expr {
    Expr::Neg(Box::new(sqrt_over_2(n)))
}

/// `(sin, cos)` closed forms for `step * π/12`, for the 16 `step` values
/// (out of 24) whose angle is also a multiple of π/6 or π/4 — exactly
/// spec.md §4.8's table, extended by quadrant symmetry to the full period.
/// The remaining 8 steps (odd multiples of π/12 alone, e.g. `π/12` itself)
/// have no two-term closed form and are deliberately left unrecognized.
fn table_value(step: i64) -> Option<(Expr, Expr)> {
    Some(match step {
        0 => (Expr::zero(), Expr::one()),
        2 => (half(), sqrt_over_2(3)),
        3 => (sqrt_over_2(2), sqrt_over_2(2)),
        4 => (sqrt_over_2(3), half()),
        6 => (Expr::one(), Expr::zero()),
        8 => (sqrt_over_2(3), neg_half()),
        9 => (sqrt_over_2(2), neg_sqrt_over_2(2)),
        10 => (half(), neg_sqrt_over_2(3)),
        12 => (Expr::zero(), Expr::Neg(Box::new(Expr::one()))),
        14 => (neg_half(), neg_sqrt_over_2(3)),
        15 => (neg_sqrt_over_2(2), neg_sqrt_over_2(2)),
        16 => (neg_sqrt_over_2(3), neg_half()),
        18 => (Expr::Neg(Box::new(Expr::one())), Expr::zero()),
        20 => (neg_sqrt_over_2(3), half()),
        21 => (neg_sqrt_over_2(2), sqrt_over_2(2)),
        22 => (neg_half(), sqrt_over_2(3)),
        _ => return None,
    })
}

/// Recognizes `sin/cos/tan` of an exact rational multiple of π at a
/// denominator dividing 12 and returns its closed form; `None` when the
/// coefficient isn't recognized (irrational multiple, or a step the table
/// doesn't cover) so the caller falls back to ordinary numeric evaluation.
pub fn exact_trig(kind: TrigFn, arg: &Expr) -> Option<Expr> {
    let coeff = extract_pi_coefficient(arg)?;
    let coeff = coeff.to_exact_rational()?;
    let reduced = rat_mod(&coeff, 2);
    let scaled = reduced * BigRational::from_integer(BigInt::from(12));
    if !scaled.is_integer() {
        return None;
    }
    let step = scaled.to_integer();
    let step: i64 = step.try_into().ok()?;
    let step = ((step % 24) + 24) % 24;
    let (sin_e, cos_e) = table_value(step)?;

    Some(match kind {
        TrigFn::Sin => sin_e,
        TrigFn::Cos => cos_e,
        TrigFn::Tan => {
            if cos_e.is_zero_number() {
                Expr::Num(Number::infinity())
            } else {
                simplify(Expr::Div(Box::new(sin_e), Box::new(cos_e)))
            }
        }
    })
}
