//! Numeric definite integration via Simpson's rule (spec.md §4.4's
//! `integrate` grouping, §7 "No closed-form integration").
//!
//! No teacher counterpart — `calculatrice_qpur` only ever evaluates a fixed
//! rational-or-pi AST, never a function of a free variable over an interval
//! — so the evaluator here is a new, small floating-point tree-walk built
//! directly from `Expr`'s shape, paired with the textbook composite
//! Simpson's rule spec.md calls for.

use crate::expr::Expr;

/// Evaluates `body` at `var = x` in floating point; an unbound symbol (any
/// `Sym` other than `var`) or a non-numeric special form evaluates to `NaN`,
/// which then propagates through the Simpson sum rather than panicking
/// (spec.md §7's "does not detect pathological input" policy).
fn eval_f64(body: &Expr, var: &str, x: f64) -> f64 {
    match body {
        Expr::Num(n) => n.to_f64(),
        Expr::Sym(s) if s == var => x,
        Expr::Sym(_) => f64::NAN,
        Expr::Paren(inner) => eval_f64(inner, var, x),
        Expr::Neg(inner) => -eval_f64(inner, var, x),
        Expr::Add(a, b) => eval_f64(a, var, x) + eval_f64(b, var, x),
        Expr::Sub(a, b) => eval_f64(a, var, x) - eval_f64(b, var, x),
        Expr::Mul(a, b) => eval_f64(a, var, x) * eval_f64(b, var, x),
        Expr::Div(a, b) => eval_f64(a, var, x) / eval_f64(b, var, x),
        Expr::Mod(a, b) => eval_f64(a, var, x) % eval_f64(b, var, x),
        Expr::Pow(a, b) => eval_f64(a, var, x).powf(eval_f64(b, var, x)),
        Expr::Sqrt(inner) => eval_f64(inner, var, x).sqrt(),
        Expr::Sin(inner) => eval_f64(inner, var, x).sin(),
        Expr::Cos(inner) => eval_f64(inner, var, x).cos(),
        Expr::Tan(inner) => eval_f64(inner, var, x).tan(),
        Expr::Ln(inner) => eval_f64(inner, var, x).ln(),
        Expr::Log(inner) => eval_f64(inner, var, x).log10(),
        Expr::Integral { .. }
        | Expr::Derivative { .. }
        | Expr::Limit { .. }
        | Expr::RootsResult(_)
        | Expr::FactorResult(_) => f64::NAN,
    }
}

/// Composite Simpson's rule over `[lo, hi]` with `subintervals` panels
/// (must be even for the alternating 4/2 weighting to close correctly; the
/// parser's `SIMPSON_SUBINTERVALS` constant always supplies an even count).
pub fn simpson(body: &Expr, var: &str, lo: f64, hi: f64, subintervals: usize) -> f64 {
    let n = if subintervals % 2 == 0 {
        subintervals
    } else {
        subintervals + 1
    };
    let h = (hi - lo) / n as f64;
    let mut sum = eval_f64(body, var, lo) + eval_f64(body, var, hi);
    for i in 1..n {
        let x = lo + h * i as f64;
        let weight = if i % 2 == 0 { 2.0 } else { 4.0 };
        sum += weight * eval_f64(body, var, x);
    }
    sum * h / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;
    use crate::number::Number;

    #[test]
    fn integrates_constant_over_unit_interval() {
        let body = Expr::int(3);
        let result = simpson(&body, "x", 0.0, 1.0, 100);
        assert!((result - 3.0).abs() < 1e-9);
    }

    #[test]
    fn integrates_x_squared_from_zero_to_one() {
        // integral of x^2 from 0 to 1 is 1/3
        let body = Expr::Pow(Box::new(Expr::var("x")), Box::new(Expr::int(2)));
        let result = simpson(&body, "x", 0.0, 1.0, 1000);
        assert!((result - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn integrates_sin_over_zero_to_pi() {
        let body = Expr::Sin(Box::new(Expr::var("x")));
        let result = simpson(&body, "x", 0.0, std::f64::consts::PI, 1000);
        assert!((result - 2.0).abs() < 1e-6);
    }

    #[test]
    fn odd_subinterval_count_is_rounded_up_to_even() {
        let body = Expr::var("x");
        let even = simpson(&body, "x", 0.0, 1.0, 100);
        let odd = simpson(&body, "x", 0.0, 1.0, 101);
        assert!((even - odd).abs() < 1e-9);
    }

    #[test]
    fn unbound_symbol_propagates_nan() {
        let body = Expr::Num(Number::real(f64::NAN));
        let result = simpson(&body, "x", 0.0, 1.0, 10);
        assert!(result.is_nan());
    }
}
