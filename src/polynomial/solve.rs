//! Root solving: rational-root deflation, closed-form quadratic/biquadratic,
//! numeric bisection fallback (spec.md §4.6).
//!
//! Like `extract.rs`, this has no direct teacher counterpart; it follows the
//! spec's algorithm description directly, built on this module's own
//! `Polynomial` (synthetic division, Horner evaluation) and the crate's
//! `Number` tower for exact arithmetic. The integer-square-root style used by
//! the teacher's `noyau/expr.rs` (`int_sqrt_floor`, Newton's method with a
//! bit-length seed) is echoed here in spirit for divisor enumeration, though
//! divisor search works over small `i64` ranges rather than `BigInt`.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

use crate::error::SolverError;
use crate::expr::Expr;
use crate::number::Number;

use super::Polynomial;

const BISECTION_LO: f64 = -10.0;
const BISECTION_HI: f64 = 10.0;
const BISECTION_SUBINTERVALS: usize = 400;
const BISECTION_ITERATIONS: usize = 60;
const BISECTION_NEAR_ZERO: f64 = 1e-9;
const BISECTION_DEDUP_TOL: f64 = 1e-6;

pub fn solve_polynomial(poly: &Polynomial) -> Result<Vec<Expr>, SolverError> {
    if poly.degree() < 1 {
        return Err(SolverError::ConstantPolynomial);
    }
    let mut working = poly.clone();
    let rational_roots = rational_root_search(&mut working);
    let mut result: Vec<Expr> = rational_roots.into_iter().map(Expr::Num).collect();

    match working.degree() {
        d if d < 1 => {}
        1 => {
            let a = working.coeffs[1].clone();
            let b = working.coeffs[0].clone();
            let root = b
                .neg()
                .divide(&a)
                .unwrap_or_else(|_| unreachable!("trimmed degree-1 leading coefficient is nonzero"));
            result.push(Expr::Num(root));
        }
        2 => {
            let c = working.coeffs[0].clone();
            let b = working.coeffs[1].clone();
            let a = working.coeffs[2].clone();
            result.extend(quadratic_roots(&a, &b, &c));
        }
        4 if working.coeffs[1].is_zero() && working.coeffs[3].is_zero() => {
            let c0 = working.coeffs[0].clone();
            let c2 = working.coeffs[2].clone();
            let c4 = working.coeffs[4].clone();
            for y in quadratic_roots(&c4, &c2, &c0) {
                result.push(Expr::Sqrt(Box::new(y.clone())));
                result.push(Expr::Neg(Box::new(Expr::Sqrt(Box::new(y)))));
            }
        }
        _ => {
            result.extend(numeric_roots(&working));
        }
    }
    Ok(result)
}

/// Symbolic `(-b ± sqrt(b^2 - 4ac)) / 2a`, built as an expression tree so
/// negative discriminants fall to the surd-reduction rule's `i * sqrt(|n|)`
/// path (spec.md §4.3) once the caller simplifies the result.
fn quadratic_roots(a: &Number, b: &Number, c: &Number) -> Vec<Expr> {
    let four_ac = Number::Int(4).multiply(a).multiply(c);
    let disc = b.multiply(b).subtract(&four_ac);
    let two_a = Number::Int(2).multiply(a);
    let neg_b = b.neg();
    let sqrt_disc = Expr::Sqrt(Box::new(Expr::Num(disc)));

    let plus = Expr::Div(
        Box::new(Expr::Add(
            Box::new(Expr::Num(neg_b.clone())),
            Box::new(sqrt_disc.clone()),
        )),
        Box::new(Expr::Num(two_a.clone())),
    );
    let minus = Expr::Div(
        Box::new(Expr::Sub(Box::new(Expr::Num(neg_b)), Box::new(sqrt_disc))),
        Box::new(Expr::Num(two_a)),
    );
    vec![plus, minus]
}

/// Deflates `poly` in place by repeatedly finding and dividing out rational
/// roots (rational-root theorem candidates); returns the roots found, in the
/// order extracted. Shared between the solver and the factorizer (spec.md
/// §4.6 step 1, §4.7).
pub fn rational_root_search(poly: &mut Polynomial) -> Vec<Number> {
    let mut roots = Vec::new();
    loop {
        if poly.degree() < 1 {
            break;
        }
        if poly.constant_term().is_zero() {
            roots.push(Number::zero());
            let (q, _r) = poly.synthetic_divide(&Number::zero());
            *poly = q;
            continue;
        }
        let Some(integer_poly) = integerize(poly) else {
            break;
        };
        let (Some(c), Some(l)) = (
            integer_poly.constant_term().as_exact_i64(),
            integer_poly.leading().as_exact_i64(),
        ) else {
            break;
        };
        match find_rational_root(poly, c, l) {
            Some(r) => {
                roots.push(r.clone());
                let (q, _rem) = poly.synthetic_divide(&r);
                *poly = q;
            }
            None => break,
        }
    }
    roots
}

fn find_rational_root(poly: &Polynomial, constant: i64, leading: i64) -> Option<Number> {
    for p in divisors(constant.unsigned_abs()) {
        for q in divisors(leading.unsigned_abs()) {
            if q == 0 {
                continue;
            }
            for sign in [1i64, -1i64] {
                let num = sign.checked_mul(p as i64)?;
                if let Ok(candidate) = Number::rational(num, q as i64) {
                    if poly.eval(&candidate).is_zero() {
                        return Some(candidate);
                    }
                }
            }
        }
    }
    None
}

/// Positive divisors of `n` (including `n` itself); `n == 0` yields `[1]`
/// (the constant-term-zero case is handled separately before this runs).
fn divisors(n: u64) -> Vec<u64> {
    if n == 0 {
        return vec![1];
    }
    let mut small = Vec::new();
    let mut large = Vec::new();
    let mut d = 1u64;
    while d * d <= n {
        if n % d == 0 {
            small.push(d);
            let pair = n / d;
            if pair != d {
                large.push(pair);
            }
        }
        d += 1;
    }
    small.extend(large.into_iter().rev());
    small
}

fn lcm_bigint(a: &BigInt, b: &BigInt) -> BigInt {
    if a.is_zero() || b.is_zero() {
        return BigInt::one();
    }
    let gcd = gcd_bigint(a.clone(), b.clone());
    (a / &gcd) * b
}

fn gcd_bigint(mut a: BigInt, mut b: BigInt) -> BigInt {
    a = a.magnitude().clone().into();
    b = b.magnitude().clone().into();
    while !b.is_zero() {
        let t = &a % &b;
        a = b;
        b = t;
    }
    a
}

/// Scales every coefficient by the lcm of denominators, producing an
/// all-integer `Polynomial` with the same roots (spec.md §4.6's
/// "integerize the polynomial"). `None` when any coefficient is inexact.
fn integerize(poly: &Polynomial) -> Option<Polynomial> {
    let rats: Vec<BigRational> = poly
        .coeffs
        .iter()
        .map(Number::to_exact_rational)
        .collect::<Option<Vec<_>>>()?;
    let lcm = rats
        .iter()
        .fold(BigInt::one(), |acc, r| lcm_bigint(&acc, r.denom()));
    let scale = BigRational::from_integer(lcm);
    let coeffs = rats
        .into_iter()
        .map(|r| Number::from_big_int((r * &scale).to_integer()))
        .collect();
    let mut p = Polynomial { coeffs };
    p.trim();
    Some(p)
}

/// Numeric bisection fallback over `[-10, 10]` at 400 subintervals, 60
/// bisection iterations per sign change, deduplicated at 1e-6 (spec.md
/// §4.6 step 2, "Otherwise").
fn numeric_roots(poly: &Polynomial) -> Vec<Expr> {
    let f = |x: f64| poly.eval(&Number::real(x)).to_f64();
    let step = (BISECTION_HI - BISECTION_LO) / BISECTION_SUBINTERVALS as f64;

    let mut found: Vec<f64> = Vec::new();
    let mut x0 = BISECTION_LO;
    let mut f0 = f(x0);
    if f0.abs() < BISECTION_NEAR_ZERO {
        found.push(x0);
    }
    for i in 1..=BISECTION_SUBINTERVALS {
        let x1 = BISECTION_LO + step * i as f64;
        let f1 = f(x1);
        if f1.abs() < BISECTION_NEAR_ZERO {
            found.push(x1);
        } else if f0.signum() != f1.signum() {
            let mut a = x0;
            let mut b = x1;
            let mut fa = f0;
            for _ in 0..BISECTION_ITERATIONS {
                let mid = (a + b) / 2.0;
                let fm = f(mid);
                if fa.signum() == fm.signum() {
                    a = mid;
                    fa = fm;
                } else {
                    b = mid;
                }
            }
            found.push((a + b) / 2.0);
        }
        x0 = x1;
        f0 = f1;
    }

    found.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mut deduped: Vec<f64> = Vec::new();
    for r in found {
        if deduped
            .last()
            .map_or(true, |last: &f64| (r - last).abs() > BISECTION_DEDUP_TOL)
        {
            deduped.push(r);
        }
    }
    deduped.into_iter().map(|r| Expr::Num(Number::real(r))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(coeffs: &[i64]) -> Polynomial {
        Polynomial {
            coeffs: coeffs.iter().map(|&c| Number::Int(c)).collect(),
        }
    }

    #[test]
    fn quadratic_with_two_rational_roots() {
        // x^2 - 5x + 6 = (x-2)(x-3)
        let p = poly(&[6, -5, 1]);
        let roots = solve_polynomial(&p).unwrap();
        assert_eq!(roots.len(), 2);
        let mut nums: Vec<i64> = roots
            .iter()
            .map(|e| match e {
                Expr::Num(n) => n.as_exact_i64().unwrap(),
                other => panic!("expected numeric root, got {other:?}"),
            })
            .collect();
        nums.sort();
        assert_eq!(nums, vec![2, 3]);
    }

    #[test]
    fn biquadratic_with_rational_and_radical_roots() {
        // 2x^4 - 4x^3 + x^2 - 2x = x(2x^3 - 4x^2 + x - 2) = x(x-2)(2x^2+1)
        let p = poly(&[0, -2, 1, -4, 2]);
        let roots = solve_polynomial(&p).unwrap();
        // 0, 2 rational, plus two symbolic roots from 2x^2+1
        assert_eq!(roots.len(), 4);
        let rational_count = roots
            .iter()
            .filter(|e| matches!(e, Expr::Num(n) if n.is_exact()))
            .count();
        assert_eq!(rational_count, 2);
    }

    #[test]
    fn linear_polynomial_solves_directly() {
        // 2x - 4 = 0 -> x = 2
        let p = poly(&[-4, 2]);
        let roots = solve_polynomial(&p).unwrap();
        assert_eq!(roots, vec![Expr::Num(Number::Int(2))]);
    }

    #[test]
    fn constant_polynomial_is_a_domain_error() {
        let p = poly(&[5]);
        assert_eq!(solve_polynomial(&p).unwrap_err(), SolverError::ConstantPolynomial);
    }

    #[test]
    fn high_degree_without_rational_roots_falls_back_to_bisection() {
        // x^5 - x - 1 has one real root near 1.1673, no rational roots.
        let p = poly(&[-1, -1, 0, 0, 0, 1]);
        let roots = solve_polynomial(&p).unwrap();
        assert!(!roots.is_empty());
        if let Expr::Num(n) = &roots[0] {
            assert!((n.to_f64() - 1.1673).abs() < 1e-3);
        } else {
            panic!("expected a numeric root");
        }
    }

    #[test]
    fn divisors_of_zero_is_just_one() {
        assert_eq!(divisors(0), vec![1]);
    }

    #[test]
    fn divisors_of_twelve() {
        let mut d = divisors(12);
        d.sort();
        assert_eq!(d, vec![1, 2, 3, 4, 6, 12]);
    }
}
