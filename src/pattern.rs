//! Pattern/bindings engine for algebraic identity rules (spec.md §4.3,
//! "Pattern rules"): rules are pure data (a pattern tree, a replacement
//! tree), not hard-coded match arms, per spec.md §9's own Design Notes
//! ("Pattern engine scope... an extensible design should take a rule list
//! as input to the simplifier; rules are pure data").
//!
//! A [`Pattern`] is a small tree over the same shapes [`Expr`] uses for
//! arithmetic, except leaves may be a named [`Pattern::Hole`] instead of a
//! concrete value. Matching walks the pattern and the candidate expression
//! together; a hole that appears twice in one pattern (there are none in
//! the default rule set, but a caller-supplied rule set may use the
//! feature) must bind to structurally identical subtrees the second time
//! it's encountered. On a successful match, the replacement pattern is
//! instantiated by substituting each hole with a *deep clone* of its
//! binding (spec.md §3 "Ownership" — no subtree is ever shared between two
//! parents).

use std::collections::HashMap;

use crate::expr::Expr;
use crate::number::Number;

#[derive(Clone, Debug, PartialEq)]
pub enum Pattern {
    /// A named hole; matches any subexpression and binds it for the
    /// replacement side to reuse.
    Hole(&'static str),
    Num(Number),
    Add(Box<Pattern>, Box<Pattern>),
    Sub(Box<Pattern>, Box<Pattern>),
    Mul(Box<Pattern>, Box<Pattern>),
    Div(Box<Pattern>, Box<Pattern>),
}

impl Pattern {
    pub fn hole(name: &'static str) -> Pattern {
        Pattern::Hole(name)
    }

    pub fn num(v: i64) -> Pattern {
        Pattern::Num(Number::Int(v))
    }
}

/// One rewrite rule: `pattern -> replacement`, both sides pure data.
pub struct Rule {
    pattern: Pattern,
    replacement: Pattern,
}

impl Rule {
    pub fn new(pattern: Pattern, replacement: Pattern) -> Self {
        Rule { pattern, replacement }
    }
}

type Bindings = HashMap<&'static str, Expr>;

/// Attempts to match `pat` against `expr`, extending `bindings` on success.
/// A hole bound a second time must match its first binding structurally
/// (using [`Expr`]'s own `PartialEq`, which compares numbers with
/// `numeric_eq` tolerance) rather than silently overwriting it.
fn match_pattern(pat: &Pattern, expr: &Expr, bindings: &mut Bindings) -> bool {
    match pat {
        Pattern::Hole(name) => match bindings.get(*name) {
            Some(bound) => bound == expr,
            None => {
                bindings.insert(name, expr.clone());
                true
            }
        },
        Pattern::Num(n) => matches!(expr, Expr::Num(m) if m.numeric_eq(n)),
        Pattern::Add(a, b) => {
            matches!(expr, Expr::Add(x, y) if match_pattern(a, x, bindings) && match_pattern(b, y, bindings))
        }
        Pattern::Sub(a, b) => {
            matches!(expr, Expr::Sub(x, y) if match_pattern(a, x, bindings) && match_pattern(b, y, bindings))
        }
        Pattern::Mul(a, b) => {
            matches!(expr, Expr::Mul(x, y) if match_pattern(a, x, bindings) && match_pattern(b, y, bindings))
        }
        Pattern::Div(a, b) => {
            matches!(expr, Expr::Div(x, y) if match_pattern(a, x, bindings) && match_pattern(b, y, bindings))
        }
    }
}

/// Builds the replacement tree, substituting each hole with a deep clone
/// of its bound subexpression.
fn instantiate(pat: &Pattern, bindings: &Bindings) -> Expr {
    match pat {
        Pattern::Hole(name) => bindings
            .get(name)
            .cloned()
            .expect("replacement hole must have been bound during match"),
        Pattern::Num(n) => Expr::Num(n.clone()),
        Pattern::Add(a, b) => Expr::Add(Box::new(instantiate(a, bindings)), Box::new(instantiate(b, bindings))),
        Pattern::Sub(a, b) => Expr::Sub(Box::new(instantiate(a, bindings)), Box::new(instantiate(b, bindings))),
        Pattern::Mul(a, b) => Expr::Mul(Box::new(instantiate(a, bindings)), Box::new(instantiate(b, bindings))),
        Pattern::Div(a, b) => Expr::Div(Box::new(instantiate(a, bindings)), Box::new(instantiate(b, bindings))),
    }
}

/// Tries each rule in order against `expr`, returning the first match's
/// instantiated replacement. `None` when no rule applies — the simplify
/// loop then just leaves the node untouched for this pass (spec.md §7,
/// "the simplify loop never raises").
pub fn apply(rules: &[Rule], expr: &Expr) -> Option<Expr> {
    for rule in rules {
        let mut bindings = Bindings::new();
        if match_pattern(&rule.pattern, expr, &mut bindings) {
            return Some(instantiate(&rule.replacement, &bindings));
        }
    }
    None
}

/// The default identity rule set named in spec.md §4.3: `a+0`, `0+a`,
/// `a-0`, `a*1`, `1*a`, `a*0`, `0*a`, `a/1`. Passed into the simplifier as
/// data rather than compiled in, so a caller can construct an extended
/// rule set of their own (spec.md §9, "Pattern engine scope").
pub fn default_rules() -> Vec<Rule> {
    let a = || Pattern::hole("a");
    vec![
        Rule { pattern: Pattern::Add(Box::new(a()), Box::new(Pattern::num(0))), replacement: a() },
        Rule { pattern: Pattern::Add(Box::new(Pattern::num(0)), Box::new(a())), replacement: a() },
        Rule { pattern: Pattern::Sub(Box::new(a()), Box::new(Pattern::num(0))), replacement: a() },
        Rule { pattern: Pattern::Mul(Box::new(a()), Box::new(Pattern::num(1))), replacement: a() },
        Rule { pattern: Pattern::Mul(Box::new(Pattern::num(1)), Box::new(a())), replacement: a() },
        Rule { pattern: Pattern::Mul(Box::new(a()), Box::new(Pattern::num(0))), replacement: Pattern::num(0) },
        Rule { pattern: Pattern::Mul(Box::new(Pattern::num(0)), Box::new(a())), replacement: Pattern::num(0) },
        Rule { pattern: Pattern::Div(Box::new(a()), Box::new(Pattern::num(1))), replacement: a() },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_additive_identity_either_side() {
        let rules = default_rules();
        let e = Expr::Add(Box::new(Expr::var("x")), Box::new(Expr::zero()));
        assert_eq!(apply(&rules, &e), Some(Expr::var("x")));

        let e = Expr::Add(Box::new(Expr::zero()), Box::new(Expr::var("x")));
        assert_eq!(apply(&rules, &e), Some(Expr::var("x")));
    }

    #[test]
    fn matches_multiplicative_zero_either_side() {
        let rules = default_rules();
        let e = Expr::Mul(Box::new(Expr::var("x")), Box::new(Expr::zero()));
        assert_eq!(apply(&rules, &e), Some(Expr::zero()));
    }

    #[test]
    fn no_rule_matches_an_unrelated_shape() {
        let rules = default_rules();
        let e = Expr::Pow(Box::new(Expr::var("x")), Box::new(Expr::int(2)));
        assert_eq!(apply(&rules, &e), None);
    }

    #[test]
    fn repeated_hole_requires_structural_equality() {
        let rules = vec![Rule {
            pattern: Pattern::Sub(Box::new(Pattern::hole("a")), Box::new(Pattern::hole("a"))),
            replacement: Pattern::num(0),
        }];
        let same = Expr::Sub(Box::new(Expr::var("x")), Box::new(Expr::var("x")));
        assert_eq!(apply(&rules, &same), Some(Expr::zero()));

        let different = Expr::Sub(Box::new(Expr::var("x")), Box::new(Expr::var("y")));
        assert_eq!(apply(&rules, &different), None);
    }
}
