//! A small computer algebra system core: lexer, Pratt parser, exact
//! simplifier, symbolic differentiation, and polynomial root/factor
//! computation (spec.md §1, "Purpose & scope").
//!
//! Pipeline: [`lexer::Lexer`] → [`parser::parse`] (which already threads
//! simplification, differentiation, and the polynomial pipeline through its
//! special forms) → [`simplify::simplify`] once more at the top level so a
//! caller never has to remember to call it themselves → [`render::to_tex`]
//! for display.
//!
//! Grounded throughout in a small desktop calculator core, generalized from
//! a fixed-expression evaluator into the fuller parser, simplifier, and
//! polynomial pipeline described in DESIGN.md.

pub mod derivative;
pub mod error;
pub mod expr;
pub mod integrate;
pub mod lexer;
pub mod number;
pub mod parser;
pub mod pattern;
pub mod polynomial;
pub mod render;
pub mod simplify;
pub mod token;
pub mod trig;

pub use error::CoreError;
pub use expr::Expr;
pub use number::Number;
pub use parser::{parse, parse_default, ParserConfig};
pub use render::{to_tex, Render, TexRenderer};
pub use simplify::simplify;

/// Parses, simplifies, and returns `src` as an `Expr` — the crate's single
/// front door (spec.md §6, "External interfaces").
pub fn evaluate(src: &str) -> Result<Expr, CoreError> {
    let expr = parse_default(src)?;
    Ok(simplify(expr))
}

/// `evaluate` followed by TeX rendering, for callers that only want the
/// final display string.
pub fn evaluate_to_tex(src: &str) -> Result<String, CoreError> {
    evaluate(src).map(|e| to_tex(&e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_folds_arithmetic() {
        let e = evaluate("1 + 2 * 3").unwrap();
        assert_eq!(e, Expr::int(7));
    }

    #[test]
    fn evaluate_simplifies_surds() {
        let e = evaluate("sqrt(12)").unwrap();
        assert_eq!(
            e,
            Expr::Mul(Box::new(Expr::int(2)), Box::new(Expr::Sqrt(Box::new(Expr::int(3)))))
        );
    }

    #[test]
    fn evaluate_to_tex_renders_the_simplified_form() {
        let tex = evaluate_to_tex("1/2 + 1/2").unwrap();
        assert_eq!(tex, "1");
    }

    #[test]
    fn evaluate_propagates_parse_errors() {
        assert!(evaluate("(1 + 2").is_err());
    }

    #[test]
    fn roots_scenario_round_trips_through_evaluate_and_render() {
        let e = evaluate("roots(x^2 - 5x + 6, x)").unwrap();
        let tex = to_tex(&e);
        assert_eq!(tex, "\\left\\{2, 3\\right\\}");
    }
}
