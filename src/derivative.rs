//! Symbolic differentiation (spec.md §4.4).
//!
//! Structural shape is the teacher's `noyau` style of one big recursive
//! match per `Expr` variant (compare `format.rs`'s rendering match or
//! `eval.rs`'s evaluation match), generalized to cover the derivative rules
//! themselves, which the teacher's fixed-AST calculator never needed since
//! it has no free variables to differentiate with respect to.
//!
//! Returns an un-simplified tree; every call site runs the result through
//! [`crate::simplify::simplify`] afterward (spec.md §4.4, "Cleanup pass").

use crate::expr::Expr;

pub fn differentiate(expr: &Expr, var: &str) -> Expr {
    match expr {
        Expr::Num(_) => Expr::zero(),
        Expr::Sym(s) => {
            if s == var {
                Expr::one()
            } else {
                Expr::zero()
            }
        }
        Expr::Paren(inner) => differentiate(inner, var),
        Expr::Neg(inner) => Expr::Neg(Box::new(differentiate(inner, var))),

        Expr::Add(a, b) => Expr::Add(
            Box::new(differentiate(a, var)),
            Box::new(differentiate(b, var)),
        ),
        Expr::Sub(a, b) => Expr::Sub(
            Box::new(differentiate(a, var)),
            Box::new(differentiate(b, var)),
        ),

        // Product rule: (a*b)' = a'*b + a*b'
        Expr::Mul(a, b) => Expr::Add(
            Box::new(Expr::Mul(Box::new(differentiate(a, var)), b.clone())),
            Box::new(Expr::Mul(a.clone(), Box::new(differentiate(b, var)))),
        ),

        // Quotient rule: (a/b)' = (a'*b - a*b') / b^2
        Expr::Div(a, b) => {
            let numerator = Expr::Sub(
                Box::new(Expr::Mul(Box::new(differentiate(a, var)), b.clone())),
                Box::new(Expr::Mul(a.clone(), Box::new(differentiate(b, var)))),
            );
            let denominator = Expr::Pow(b.clone(), Box::new(Expr::int(2)));
            Expr::Div(Box::new(numerator), Box::new(denominator))
        }

        // `%` has no differentiation rule in the spec's surface language;
        // treated as constant with respect to every variable.
        Expr::Mod(_, _) => Expr::zero(),

        Expr::Pow(base, exp) => differentiate_pow(base, exp, var),

        Expr::Sqrt(inner) => {
            // d/dx sqrt(u) = u' / (2*sqrt(u))
            let du = differentiate(inner, var);
            let denom = Expr::Mul(Box::new(Expr::int(2)), Box::new(Expr::Sqrt(inner.clone())));
            Expr::Div(Box::new(du), Box::new(denom))
        }
        Expr::Sin(inner) => chain_rule(inner, var, |u| Expr::Cos(u)),
        Expr::Cos(inner) => {
            let du = differentiate(inner, var);
            Expr::Neg(Box::new(Expr::Mul(
                Box::new(Expr::Sin(inner.clone())),
                Box::new(du),
            )))
        }
        Expr::Tan(inner) => {
            // d/dx tan(u) = u' / cos(u)^2
            let du = differentiate(inner, var);
            let denom = Expr::Pow(Box::new(Expr::Cos(inner.clone())), Box::new(Expr::int(2)));
            Expr::Div(Box::new(du), Box::new(denom))
        }
        Expr::Ln(inner) => {
            // d/dx ln(u) = u' / u
            let du = differentiate(inner, var);
            Expr::Div(Box::new(du), inner.clone())
        }
        Expr::Log(inner) => {
            // log is base-10: d/dx log(u) = u' / (u * ln(10))
            let du = differentiate(inner, var);
            let denom = Expr::Mul(inner.clone(), Box::new(Expr::Ln(Box::new(Expr::int(10)))));
            Expr::Div(Box::new(du), Box::new(denom))
        }

        // Special forms are not differentiable surface expressions in their
        // own right (spec.md §4.4 only defines `dd` over the arithmetic and
        // elementary-function subset); differentiating one leaves it
        // untouched rather than guessing at a meaning.
        Expr::Integral { .. }
        | Expr::Derivative { .. }
        | Expr::Limit { .. }
        | Expr::RootsResult(_)
        | Expr::FactorResult(_) => expr.clone(),
    }
}

fn chain_rule(inner: &Expr, var: &str, outer: impl FnOnce(Box<Expr>) -> Expr) -> Expr {
    let du = differentiate(inner, var);
    Expr::Mul(Box::new(outer(Box::new(inner.clone()))), Box::new(du))
}

/// `^` splits into the power rule (constant exponent) and the general
/// exponential rule (variable exponent, or both base and exponent depend on
/// `var`), per spec.md §4.4.
fn differentiate_pow(base: &Expr, exp: &Expr, var: &str) -> Expr {
    let exp_has_var = exp.contains_var(var);
    let base_has_var = base.contains_var(var);

    if !exp_has_var {
        // Power rule: (u^n)' = n * u^(n-1) * u'
        let n_minus_one = Expr::Sub(Box::new(exp.clone()), Box::new(Expr::int(1)));
        let reduced_power = Expr::Pow(Box::new(base.clone()), Box::new(n_minus_one));
        let du = differentiate(base, var);
        return Expr::Mul(
            Box::new(Expr::Mul(Box::new(exp.clone()), Box::new(reduced_power))),
            Box::new(du),
        );
    }

    if !base_has_var {
        // d/dx b^u = b^u * ln(b) * u'
        let du = differentiate(exp, var);
        let power = Expr::Pow(Box::new(base.clone()), Box::new(exp.clone()));
        return Expr::Mul(
            Box::new(Expr::Mul(
                Box::new(power),
                Box::new(Expr::Ln(Box::new(base.clone()))),
            )),
            Box::new(du),
        );
    }

    // General case, both base and exponent depend on var: treat u^v via
    // logarithmic differentiation, (u^v)' = u^v * (v' * ln(u) + v * u'/u).
    let power = Expr::Pow(Box::new(base.clone()), Box::new(exp.clone()));
    let dv = differentiate(exp, var);
    let du = differentiate(base, var);
    let term_a = Expr::Mul(Box::new(dv), Box::new(Expr::Ln(Box::new(base.clone()))));
    let term_b = Expr::Mul(
        Box::new(exp.clone()),
        Box::new(Expr::Div(Box::new(du), Box::new(base.clone()))),
    );
    Expr::Mul(
        Box::new(power),
        Box::new(Expr::Add(Box::new(term_a), Box::new(term_b))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::Number;
    use crate::simplify::simplify;

    fn x() -> Expr {
        Expr::var("x")
    }

    #[test]
    fn derivative_of_constant_is_zero() {
        assert_eq!(differentiate(&Expr::int(5), "x"), Expr::zero());
    }

    #[test]
    fn derivative_of_variable_is_one() {
        assert_eq!(differentiate(&x(), "x"), Expr::one());
    }

    #[test]
    fn derivative_of_other_symbol_is_zero() {
        assert_eq!(differentiate(&Expr::var("y"), "x"), Expr::zero());
    }

    #[test]
    fn power_rule_on_simple_monomial() {
        // d/dx x^3 = 3x^2
        let e = Expr::Pow(Box::new(x()), Box::new(Expr::int(3)));
        let d = simplify(differentiate(&e, "x"));
        assert_eq!(
            d,
            Expr::Mul(Box::new(Expr::int(3)), Box::new(Expr::Pow(Box::new(x()), Box::new(Expr::int(2)))))
        );
    }

    #[test]
    fn derivative_of_polynomial_sum() {
        // d/dx (x^2 + 3x) = 2x + 3
        let e = Expr::Add(
            Box::new(Expr::Pow(Box::new(x()), Box::new(Expr::int(2)))),
            Box::new(Expr::Mul(Box::new(Expr::int(3)), Box::new(x()))),
        );
        let d = simplify(differentiate(&e, "x"));
        assert_eq!(
            d,
            Expr::Add(
                Box::new(Expr::Mul(Box::new(Expr::int(2)), Box::new(x()))),
                Box::new(Expr::int(3))
            )
        );
    }

    #[test]
    fn derivative_of_sin_is_cos_times_inner_derivative() {
        let e = Expr::Sin(Box::new(x()));
        let d = simplify(differentiate(&e, "x"));
        assert_eq!(d, Expr::Cos(Box::new(x())));
    }

    #[test]
    fn derivative_of_ln_is_reciprocal() {
        let e = Expr::Ln(Box::new(x()));
        let d = simplify(differentiate(&e, "x"));
        assert_eq!(d, Expr::Div(Box::new(Expr::one()), Box::new(x())));
    }

    #[test]
    fn quotient_rule_on_simple_ratio() {
        // d/dx (x / 2) = (1*2 - x*0)/2^2 -> 1/2
        let e = Expr::Div(Box::new(x()), Box::new(Expr::int(2)));
        let d = simplify(differentiate(&e, "x"));
        assert_eq!(d, Expr::Num(Number::Rational(1, 2)));
    }

    #[test]
    fn exponential_rule_for_constant_base() {
        // d/dx 2^x = 2^x * ln(2)
        let e = Expr::Pow(Box::new(Expr::int(2)), Box::new(x()));
        let d = simplify(differentiate(&e, "x"));
        assert_eq!(
            d,
            Expr::Mul(
                Box::new(Expr::Pow(Box::new(Expr::int(2)), Box::new(x()))),
                Box::new(Expr::Ln(Box::new(Expr::int(2))))
            )
        );
    }
}
