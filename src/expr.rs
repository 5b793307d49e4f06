//! Expression tree (spec.md §3 "Expression").
//!
//! The spec's baseline shape is one struct (`{root: Token, left?, right?}`)
//! used uniformly for every syntactic construct. Per spec.md §9's own
//! Design Notes ("Expression tree as sum... a sum makes illegal states
//! unrepresentable") this crate instead follows the teacher's `Expr` enum
//! (`noyau/expr.rs`, already `Rat/Pi/Indefini/Var/Sqrt/PowInt/Sin/Cos/Tan/
//! Add/Sub/Mul/Div`) and generalizes it: `PowInt(Box<Expr>, i64)` becomes
//! `Pow(Box<Expr>, Box<Expr>)` (differentiation needs a variable exponent),
//! and the reserved-grouping / special-form set grows to match spec.md's
//! full surface language.
//!
//! Every rewrite rule that reuses a subtree clones it — `Expr` derives
//! `Clone` and no `Rc`/`Arc` sharing is introduced anywhere in the crate
//! (spec.md §3 "Ownership", §9 "Cloning discipline").

use crate::number::Number;

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Num(Number),
    Sym(String),

    /// Explicit parenthesization, kept as its own node so the renderer can
    /// reproduce the input's grouping (spec.md §8's round-trip property).
    Paren(Box<Expr>),

    Neg(Box<Expr>),

    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    /// `%`, kept alongside `+ - * / ^` since the surface grammar (spec.md
    /// §6) reserves the operator character even though the rewrite rules
    /// spec.md §4.3 spells out never exercise it beyond constant folding.
    Mod(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),

    Sqrt(Box<Expr>),
    Sin(Box<Expr>),
    Cos(Box<Expr>),
    Tan(Box<Expr>),
    Ln(Box<Expr>),
    Log(Box<Expr>),

    /// `int(f, x)` (indefinite, `bounds: None`) or `int(f, x, lo, hi)` /
    /// an un-evaluated `integrate(f, x, lo, hi)` (definite).
    Integral {
        var: String,
        bounds: Option<(Box<Expr>, Box<Expr>)>,
        body: Box<Expr>,
    },

    /// Symbolic `dd(expr, x)`, embedded instead of evaluated when the
    /// parser's eager-differentiation toggle is off.
    Derivative { var: String, body: Box<Expr> },

    /// `lim(approaching, target)` followed by its bound operand.
    Limit {
        approaching: String,
        target: String,
        body: Box<Expr>,
    },

    /// `roots(expr, x)` result: one expression per root.
    RootsResult(Vec<Expr>),
    /// `factor(expr, x)` result: one expression per factor.
    FactorResult(Vec<Expr>),
}

impl Expr {
    pub fn int(v: i64) -> Expr {
        Expr::Num(Number::Int(v))
    }

    pub fn zero() -> Expr {
        Expr::Num(Number::zero())
    }

    pub fn one() -> Expr {
        Expr::Num(Number::one())
    }

    pub fn var(name: impl Into<String>) -> Expr {
        Expr::Sym(name.into())
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Expr::Num(_))
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Expr::Num(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_zero_number(&self) -> bool {
        matches!(self, Expr::Num(n) if n.is_zero())
    }

    pub fn is_one_number(&self) -> bool {
        matches!(self, Expr::Num(n) if n.is_one())
    }

    /// Whether `var` occurs anywhere in this subtree; used by the
    /// polynomial extractor's symbol check and by the differentiator's
    /// "any other symbol → 0" rule.
    pub fn contains_var(&self, var: &str) -> bool {
        match self {
            Expr::Num(_) => false,
            Expr::Sym(s) => s == var,
            Expr::Paren(x) | Expr::Neg(x) | Expr::Sqrt(x) | Expr::Sin(x) | Expr::Cos(x)
            | Expr::Tan(x) | Expr::Ln(x) | Expr::Log(x) => x.contains_var(var),
            Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) | Expr::Div(a, b)
            | Expr::Mod(a, b) | Expr::Pow(a, b) => a.contains_var(var) || b.contains_var(var),
            Expr::Integral { body, bounds, .. } => {
                body.contains_var(var)
                    || bounds
                        .as_ref()
                        .map(|(lo, hi)| lo.contains_var(var) || hi.contains_var(var))
                        .unwrap_or(false)
            }
            Expr::Derivative { body, .. } => body.contains_var(var),
            Expr::Limit { body, .. } => body.contains_var(var),
            Expr::RootsResult(v) | Expr::FactorResult(v) => v.iter().any(|e| e.contains_var(var)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_var_finds_nested_symbol() {
        let e = Expr::Add(Box::new(Expr::int(1)), Box::new(Expr::Sym("x".into())));
        assert!(e.contains_var("x"));
        assert!(!e.contains_var("y"));
    }

    #[test]
    fn clone_is_a_deep_copy() {
        let e = Expr::Mul(Box::new(Expr::Sym("x".into())), Box::new(Expr::int(2)));
        let cloned = e.clone();
        assert_eq!(e, cloned);
    }
}
