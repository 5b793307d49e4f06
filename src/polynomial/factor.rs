//! Iterative linear-factor extraction (spec.md §4.7): reuses the solver's
//! rational-root search, rebuilding the non-factorable residue as a single
//! polynomial expression term by term in descending degree.

use crate::error::SolverError;
use crate::expr::Expr;
use crate::number::Number;

use super::solve::rational_root_search;
use super::Polynomial;

pub fn factor_polynomial(poly: &Polynomial, var: &str) -> Result<Vec<Expr>, SolverError> {
    if poly.degree() < 1 {
        return Err(SolverError::ConstantPolynomial);
    }
    let mut working = poly.clone();
    let roots = rational_root_search(&mut working);
    let mut factors: Vec<Expr> = roots.iter().map(|r| linear_factor(r, var)).collect();

    if working.degree() == 0 {
        let c = working.constant_term().clone();
        if !c.is_one() {
            factors.push(Expr::Num(c));
        }
    } else if working.degree() > 0 {
        factors.push(rebuild_descending(&working, var));
    }

    Ok(factors)
}

/// `(x - r)`, specialized to a bare `x` when `r` is zero and to `(x + |r|)`
/// when `r` is negative, matching spec.md §8 scenario 4's
/// `{x, (x − 2), 2x² + 1}`.
fn linear_factor(r: &Number, var: &str) -> Expr {
    if r.is_zero() {
        return Expr::var(var);
    }
    if r.is_negative() {
        Expr::Add(Box::new(Expr::var(var)), Box::new(Expr::Num(r.neg())))
    } else {
        Expr::Sub(Box::new(Expr::var(var)), Box::new(Expr::Num(r.clone())))
    }
}

/// Rebuilds a residual polynomial (after rational-root extraction stops
/// yielding factors) as a single expression, descending degree first, each
/// non-zero term as `c`, `x`, `c*x`, `x^k`, or `c*x^k` as appropriate.
fn rebuild_descending(poly: &Polynomial, var: &str) -> Expr {
    let degree = poly.degree();
    if degree < 0 {
        return Expr::zero();
    }

    let mut terms: Vec<(bool, Expr)> = Vec::new();
    for k in (0..=degree as usize).rev() {
        let c = &poly.coeffs[k];
        if c.is_zero() {
            continue;
        }
        let negative = c.is_negative();
        let magnitude = if negative { c.neg() } else { c.clone() };
        let term = match k {
            0 => Expr::Num(magnitude),
            1 => {
                if magnitude.is_one() {
                    Expr::var(var)
                } else {
                    Expr::Mul(Box::new(Expr::Num(magnitude)), Box::new(Expr::var(var)))
                }
            }
            _ => {
                let power = Expr::Pow(Box::new(Expr::var(var)), Box::new(Expr::int(k as i64)));
                if magnitude.is_one() {
                    power
                } else {
                    Expr::Mul(Box::new(Expr::Num(magnitude)), Box::new(power))
                }
            }
        };
        terms.push((negative, term));
    }

    let mut iter = terms.into_iter();
    let (first_negative, first_term) = match iter.next() {
        Some(t) => t,
        None => return Expr::zero(),
    };
    let mut acc = if first_negative {
        Expr::Neg(Box::new(first_term))
    } else {
        first_term
    };
    for (negative, term) in iter {
        acc = if negative {
            Expr::Sub(Box::new(acc), Box::new(term))
        } else {
            Expr::Add(Box::new(acc), Box::new(term))
        };
    }
    acc
}
