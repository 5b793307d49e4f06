//! Tree → `Polynomial` over one named variable (spec.md §4.5).
//!
//! No teacher counterpart — `calculatrice_qpur` never extracts coefficient
//! vectors — so this recursion is built directly from the spec's extraction
//! rules, reusing the `Expr` shapes `dd`/`sin`/etc. already establish and the
//! `Polynomial` arithmetic this module's sibling defines.

use crate::error::ExtractionError;
use crate::expr::Expr;
use crate::number::Number;

use super::Polynomial;

/// Fails with `ExtractionError` (spec.md §4.5) on any non-polynomial shape:
/// an inexact leaf, a different symbol, an unsupported function, or a
/// non-integer/negative exponent.
pub fn extract_polynomial(expr: &Expr, var: &str) -> Result<Polynomial, ExtractionError> {
    match expr {
        Expr::Num(n) => {
            if n.is_exact() {
                Ok(Polynomial::constant(n.clone()))
            } else {
                Err(ExtractionError)
            }
        }
        Expr::Sym(s) if s == var => Ok(Polynomial::variable()),
        Expr::Sym(_) => Err(ExtractionError),
        Expr::Paren(inner) => extract_polynomial(inner, var),
        Expr::Neg(inner) => extract_polynomial(inner, var).map(|p| p.negate()),
        Expr::Add(a, b) => {
            let a = extract_polynomial(a, var)?;
            let b = extract_polynomial(b, var)?;
            Ok(a.add(&b))
        }
        Expr::Sub(a, b) => {
            let a = extract_polynomial(a, var)?;
            let b = extract_polynomial(b, var)?;
            Ok(a.sub(&b))
        }
        Expr::Mul(a, b) => {
            let a = extract_polynomial(a, var)?;
            let b = extract_polynomial(b, var)?;
            Ok(a.mul(&b))
        }
        Expr::Pow(base, exp) => {
            let base = extract_polynomial(base, var)?;
            let exponent = as_nonneg_int_exponent(exp).ok_or(ExtractionError)?;
            Ok(pow_by_squaring(&base, exponent))
        }
        // Division, roots, trig, and every special form are not polynomial
        // shapes (spec.md §4.5's "Any other shape → failure").
        _ => Err(ExtractionError),
    }
}

fn as_nonneg_int_exponent(e: &Expr) -> Option<u64> {
    match e {
        Expr::Num(n) => {
            let i = n.as_exact_i64()?;
            if i >= 0 {
                Some(i as u64)
            } else {
                None
            }
        }
        Expr::Paren(inner) => as_nonneg_int_exponent(inner),
        _ => None,
    }
}

fn pow_by_squaring(base: &Polynomial, mut exp: u64) -> Polynomial {
    let mut result = Polynomial::constant(Number::one());
    let mut b = base.clone();
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.mul(&b);
        }
        b = b.mul(&b);
        exp >>= 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::Sym("x".to_string())
    }

    #[test]
    fn extracts_simple_quadratic() {
        // x^2 - 5x + 6
        let e = Expr::Add(
            Box::new(Expr::Sub(
                Box::new(Expr::Pow(Box::new(x()), Box::new(Expr::int(2)))),
                Box::new(Expr::Mul(Box::new(Expr::int(5)), Box::new(x()))),
            )),
            Box::new(Expr::int(6)),
        );
        let p = extract_polynomial(&e, "x").unwrap();
        assert_eq!(
            p.coeffs,
            vec![Number::Int(6), Number::Int(-5), Number::Int(1)]
        );
    }

    #[test]
    fn division_is_not_a_polynomial_shape() {
        let e = Expr::Div(Box::new(x()), Box::new(Expr::int(2)));
        // division by a constant is in fact polynomial-compatible numerically,
        // but the extractor intentionally doesn't special-case it (spec.md
        // §4.5 lists only +,-,*,^; anything else fails).
        assert!(extract_polynomial(&e, "x").is_err());
    }

    #[test]
    fn other_symbol_fails() {
        let e = Expr::Sym("y".to_string());
        assert!(extract_polynomial(&e, "x").is_err());
    }

    #[test]
    fn negative_exponent_fails() {
        let e = Expr::Pow(Box::new(x()), Box::new(Expr::int(-1)));
        assert!(extract_polynomial(&e, "x").is_err());
    }

    #[test]
    fn inexact_leaf_fails() {
        let e = Expr::Num(Number::real(1.5));
        assert!(extract_polynomial(&e, "x").is_err());
    }
}
