//! Expression tree → TeX string (spec.md §6).
//!
//! Grounded in the pack's `panmath` LaTeX formatter
//! (`formatters/latex.rs`: `\frac{ }{ }`, `^{ }`, `name\left(...\right)`),
//! adapted to this crate's `Expr` shape and wrapped behind a small `Render`
//! trait (as that file is itself one `impl` of a `Formatter` trait) so a
//! caller could substitute a different backend without touching the core.
//!
//! Resolves spec.md's own Open Question about `tau` rendering: emits
//! `\tau` rather than spelling it out as `2\pi`, since `\tau` names the
//! constant the same way `\pi` does rather than restating its definition
//! (documented in DESIGN.md).

use crate::expr::Expr;
use crate::number::Number;

pub trait Render {
    fn render(&self, expr: &Expr) -> String;
}

#[derive(Default)]
pub struct TexRenderer;

impl Render for TexRenderer {
    fn render(&self, expr: &Expr) -> String {
        render_tex(expr)
    }
}

/// Convenience entry point equivalent to `TexRenderer.render(expr)`.
pub fn to_tex(expr: &Expr) -> String {
    render_tex(expr)
}

fn render_number(n: &Number) -> String {
    if n.is_constant_pi() {
        return "\\pi".to_string();
    }
    if n.is_constant_tau() {
        return "\\tau".to_string();
    }
    match n {
        Number::Int(i) => i.to_string(),
        Number::BigInt(b) => b.to_string(),
        Number::Rational(num, den) => render_frac_i64(*num, *den),
        Number::BigRational(r) => render_frac_bigint(r.numer().to_string(), r.denom().to_string()),
        Number::Real(v, _) => {
            if v.is_infinite() {
                return if *v < 0.0 { "-\\infty".to_string() } else { "\\infty".to_string() };
            }
            if *v == std::f64::consts::E {
                return "e".to_string();
            }
            v.to_string()
        }
    }
}

fn render_frac_i64(num: i64, den: i64) -> String {
    if num < 0 {
        format!("-\\frac{{{}}}{{{}}}", -num, den)
    } else {
        format!("\\frac{{{num}}}{{{den}}}")
    }
}

fn render_frac_bigint(num: String, den: String) -> String {
    if let Some(stripped) = num.strip_prefix('-') {
        format!("-\\frac{{{stripped}}}{{{den}}}")
    } else {
        format!("\\frac{{{num}}}{{{den}}}")
    }
}

fn needs_parens_for_neg(e: &Expr) -> bool {
    matches!(e, Expr::Add(..) | Expr::Sub(..))
}

pub fn render_tex(expr: &Expr) -> String {
    match expr {
        Expr::Num(n) => render_number(n),
        Expr::Sym(s) => s.clone(),
        Expr::Paren(inner) => format!("\\left({}\\right)", render_tex(inner)),
        Expr::Neg(inner) => {
            let s = render_tex(inner);
            if needs_parens_for_neg(inner) {
                format!("-\\left({s}\\right)")
            } else {
                format!("-{s}")
            }
        }
        Expr::Add(a, b) => format!("{} + {}", render_tex(a), render_tex(b)),
        Expr::Sub(a, b) => format!("{} - {}", render_tex(a), render_tex(b)),
        Expr::Mul(a, b) => format!("{} \\cdot {}", render_tex(a), render_tex(b)),
        Expr::Div(a, b) => format!("\\frac{{{}}}{{{}}}", render_tex(a), render_tex(b)),
        Expr::Mod(a, b) => format!("{} \\bmod {}", render_tex(a), render_tex(b)),
        Expr::Pow(a, b) => format!("{}^{{{}}}", render_tex(a), render_tex(b)),
        Expr::Sqrt(x) => format!("\\sqrt{{{}}}", render_tex(x)),
        Expr::Sin(x) => format!("\\sin\\left({}\\right)", render_tex(x)),
        Expr::Cos(x) => format!("\\cos\\left({}\\right)", render_tex(x)),
        Expr::Tan(x) => format!("\\tan\\left({}\\right)", render_tex(x)),
        Expr::Ln(x) => format!("\\ln\\left({}\\right)", render_tex(x)),
        Expr::Log(x) => format!("\\log\\left({}\\right)", render_tex(x)),
        Expr::Integral { var, bounds, body } => {
            let inner = render_tex(body);
            match bounds {
                Some((lo, hi)) => format!(
                    "\\int_{{{}}}^{{{}}} {} \\, d{}",
                    render_tex(lo),
                    render_tex(hi),
                    inner,
                    var
                ),
                None => format!("\\int {inner} \\, d{var}"),
            }
        }
        Expr::Derivative { var, body } => {
            format!("\\frac{{d}}{{d{}}}\\left({}\\right)", var, render_tex(body))
        }
        Expr::Limit {
            approaching,
            target,
            body,
        } => format!("\\lim_{{{approaching} \\to {target}}} {}", render_tex(body)),
        Expr::RootsResult(items) | Expr::FactorResult(items) => {
            let parts: Vec<String> = items.iter().map(render_tex).collect();
            format!("\\left\\{{{}\\right\\}}", parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::var("x")
    }

    #[test]
    fn renders_sum_and_product() {
        let e = Expr::Add(
            Box::new(x()),
            Box::new(Expr::Mul(Box::new(Expr::int(2)), Box::new(x()))),
        );
        assert_eq!(to_tex(&e), "x + 2 \\cdot x");
    }

    #[test]
    fn renders_division_as_frac() {
        let e = Expr::Div(Box::new(Expr::int(1)), Box::new(Expr::int(2)));
        assert_eq!(to_tex(&e), "\\frac{1}{2}");
    }

    #[test]
    fn renders_rational_leaf_as_frac() {
        let e = Expr::Num(Number::Rational(-3, 4));
        assert_eq!(to_tex(&e), "-\\frac{3}{4}");
    }

    #[test]
    fn renders_power_with_braces() {
        let e = Expr::Pow(Box::new(x()), Box::new(Expr::int(2)));
        assert_eq!(to_tex(&e), "x^{2}");
    }

    #[test]
    fn renders_sqrt_and_trig_functions() {
        let e = Expr::Sin(Box::new(Expr::Sqrt(Box::new(x()))));
        assert_eq!(to_tex(&e), "\\sin\\left(\\sqrt{x}\\right)");
    }

    #[test]
    fn renders_pi_as_backslash_pi() {
        assert_eq!(to_tex(&Expr::Num(Number::pi())), "\\pi");
    }

    #[test]
    fn renders_tau_as_backslash_tau_not_two_pi() {
        assert_eq!(to_tex(&Expr::Num(Number::tau())), "\\tau");
    }

    #[test]
    fn renders_definite_integral_with_bounds() {
        let e = Expr::Integral {
            var: "x".to_string(),
            bounds: Some((Box::new(Expr::int(0)), Box::new(Expr::Num(Number::pi())))),
            body: Box::new(Expr::Sin(Box::new(x()))),
        };
        assert_eq!(to_tex(&e), "\\int_{0}^{\\pi} \\sin\\left(x\\right) \\, dx");
    }

    #[test]
    fn renders_derivative_as_leibniz_notation() {
        let e = Expr::Derivative {
            var: "x".to_string(),
            body: Box::new(Expr::Pow(Box::new(x()), Box::new(Expr::int(2)))),
        };
        assert_eq!(to_tex(&e), "\\frac{d}{dx}\\left(x^{2}\\right)");
    }

    #[test]
    fn renders_limit() {
        let e = Expr::Limit {
            approaching: "x".to_string(),
            target: "0".to_string(),
            body: Box::new(x()),
        };
        assert_eq!(to_tex(&e), "\\lim_{x \\to 0} x");
    }

    #[test]
    fn renders_roots_result_as_a_set() {
        let e = Expr::RootsResult(vec![Expr::int(2), Expr::int(3)]);
        assert_eq!(to_tex(&e), "\\left\\{2, 3\\right\\}");
    }

    #[test]
    fn negating_a_sum_parenthesizes() {
        let e = Expr::Neg(Box::new(Expr::Add(Box::new(x()), Box::new(Expr::int(1)))));
        assert_eq!(to_tex(&e), "-\\left(x + 1\\right)");
    }
}
