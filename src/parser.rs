//! Pratt (precedence-climbing) parser over the lexer's token stream
//! (spec.md §4.2).
//!
//! Grounded in the teacher's `noyau/rpn.rs` shunting-yard paren-depth
//! counter (generalized here from a single balanced-argument scan into
//! top-level comma splitting for multi-argument groupings) and restructured
//! around null/left-denotation dispatch rather than an explicit operator
//! stack, since the spec's special forms (`int`, `dd`, `roots`, ...) need a
//! recursive-descent entry point the shunting-yard shape doesn't offer.

use crate::derivative::differentiate;
use crate::error::{LexError, ParseError, SolverError};
use crate::expr::Expr;
use crate::integrate::simpson;
use crate::lexer::Lexer;
use crate::number::Number;
use crate::polynomial::extract::extract_polynomial;
use crate::polynomial::factor::factor_polynomial;
use crate::polynomial::solve::solve_polynomial;
use crate::simplify::simplify;
use crate::token::Token;

/// Selects whether `dd(...)`/`integrate(...)` are evaluated at parse time
/// (producing a computed tree) or embedded as symbolic nodes (spec.md §9,
/// "Eager vs. lazy special forms"). `roots`/`factor` have no lazy form —
/// the spec gives them none — so they always evaluate eagerly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParserConfig {
    pub eager_derivative: bool,
    pub eager_integral: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            eager_derivative: true,
            eager_integral: true,
        }
    }
}

const SIMPSON_SUBINTERVALS: usize = 1000;

pub fn parse(src: &str, config: ParserConfig) -> Result<Expr, ParseError> {
    let tokens = Lexer::tokenize(src)?;
    let tokens = insert_implicit_multiplication(tokens);
    let mut parser = Parser { tokens, pos: 0, config };
    let expr = parser.parse_expr(0)?;
    parser.expect_eof()?;
    Ok(expr)
}

/// Convenience wrapper using the default (both-eager) parser configuration.
pub fn parse_default(src: &str) -> Result<Expr, ParseError> {
    parse(src, ParserConfig::default())
}

fn binding_power(op: char) -> Option<u8> {
    match op {
        '+' | '-' => Some(10),
        '*' | '/' | '%' => Some(20),
        '^' => Some(30),
        _ => None,
    }
}

fn is_right_assoc(op: char) -> bool {
    op == '^'
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    config: ParserConfig,
}

impl Parser {
    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn expect_eof(&self) -> Result<(), ParseError> {
        match self.peek() {
            Token::Eof => Ok(()),
            _ => Err(ParseError::UnmatchedParen),
        }
    }

    fn current_lbp(&self) -> Option<(char, u8)> {
        match self.peek() {
            Token::Operator(c) => binding_power(*c).map(|bp| (*c, bp)),
            _ => None,
        }
    }

    fn parse_expr(&mut self, rbp: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_nud()?;
        while let Some((op, lbp)) = self.current_lbp() {
            if rbp >= lbp {
                break;
            }
            self.advance();
            left = self.parse_led(left, op, lbp)?;
        }
        Ok(left)
    }

    fn parse_nud(&mut self) -> Result<Expr, ParseError> {
        let tok = self.advance();
        match tok {
            Token::Number(n) => Ok(Expr::Num(n)),
            Token::Symbol(s) => Ok(Expr::Sym(s)),
            Token::Operator('+') => self.parse_expr(40),
            Token::Operator('-') => Ok(Expr::Neg(Box::new(self.parse_expr(40)?))),
            Token::Paren('(') => {
                let inner = self.collect_balanced()?;
                let inner_expr = self.parse_sub(inner)?;
                Ok(Expr::Paren(Box::new(inner_expr)))
            }
            Token::Grouping(name) => self.parse_grouping(name),
            Token::Prefix(info) => {
                let body = self.parse_expr(40)?;
                Ok(Expr::Limit {
                    approaching: info.approaching,
                    target: info.target,
                    body: Box::new(body),
                })
            }
            Token::Eof => Err(ParseError::EmptyExpression),
            other => Err(ParseError::UnknownPrefix(other.to_string())),
        }
    }

    fn parse_led(&mut self, left: Expr, op: char, lbp: u8) -> Result<Expr, ParseError> {
        let rbp = if is_right_assoc(op) { lbp - 1 } else { lbp + 1 };
        let right = self.parse_expr(rbp)?;

        if op == '/' {
            if let (Some(a), Some(b)) = (exact_integer(&left), exact_integer(&right)) {
                if !b.is_zero() {
                    if let Ok(q) = a.divide(&b) {
                        return Ok(Expr::Num(q));
                    }
                }
            }
            return Ok(Expr::Div(Box::new(left), Box::new(right)));
        }

        Ok(match op {
            '+' => Expr::Add(Box::new(left), Box::new(right)),
            '-' => Expr::Sub(Box::new(left), Box::new(right)),
            '*' => Expr::Mul(Box::new(left), Box::new(right)),
            '%' => Expr::Mod(Box::new(left), Box::new(right)),
            '^' => Expr::Pow(Box::new(left), Box::new(right)),
            _ => unreachable!("binding_power only admits the operators matched above"),
        })
    }

    /// Consumes tokens from just after an already-consumed `(` up to (and
    /// including) its matching `)`, returning the inner tokens.
    fn collect_balanced(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut depth = 1usize;
        let mut out = Vec::new();
        loop {
            match self.tokens.get(self.pos) {
                None => return Err(ParseError::UnmatchedParen),
                Some(Token::Paren('(')) => {
                    depth += 1;
                    out.push(self.advance());
                }
                Some(Token::Paren(')')) => {
                    depth -= 1;
                    self.advance();
                    if depth == 0 {
                        break;
                    }
                    out.push(Token::Paren(')'));
                }
                Some(Token::Eof) if depth > 0 => return Err(ParseError::UnmatchedParen),
                Some(_) => out.push(self.advance()),
            }
        }
        Ok(out)
    }

    /// Parses a standalone token slice (already implicit-multiplication
    /// processed) as a full expression.
    fn parse_sub(&self, mut tokens: Vec<Token>) -> Result<Expr, ParseError> {
        tokens.push(Token::Eof);
        let mut sub = Parser {
            tokens,
            pos: 0,
            config: self.config,
        };
        let expr = sub.parse_expr(0)?;
        sub.expect_eof()?;
        Ok(expr)
    }

    fn parse_grouping(&mut self, name: String) -> Result<Expr, ParseError> {
        match self.advance() {
            Token::Paren('(') => {}
            _ => return Err(ParseError::UnterminatedGrouping(name)),
        }
        let inner = self.collect_balanced()?;
        let args = split_top_level_commas(inner);

        match name.as_str() {
            "sqrt" => self.unary_grouping(&name, args, Expr::Sqrt),
            "sin" => self.unary_grouping(&name, args, Expr::Sin),
            "cos" => self.unary_grouping(&name, args, Expr::Cos),
            "tan" => self.unary_grouping(&name, args, Expr::Tan),
            "ln" => self.unary_grouping(&name, args, Expr::Ln),
            "log" => self.unary_grouping(&name, args, Expr::Log),
            "int" => self.parse_int(args),
            "integrate" => self.parse_integrate(args),
            "dd" => self.parse_dd(args),
            "roots" => self.parse_roots(args),
            "factor" => self.parse_factor(args),
            other => Err(ParseError::UnknownPrefix(other.to_string())),
        }
    }

    fn unary_grouping(
        &self,
        name: &str,
        args: Vec<Vec<Token>>,
        make: impl FnOnce(Box<Expr>) -> Expr,
    ) -> Result<Expr, ParseError> {
        if args.len() != 1 {
            return Err(ParseError::ArityMismatch {
                grouping: name.to_string(),
                expected: "1",
                found: args.len(),
            });
        }
        let inner = self.parse_sub(args.into_iter().next().unwrap())?;
        Ok(make(Box::new(inner)))
    }

    fn parse_var_arg(&self, name: &str, tokens: Vec<Token>) -> Result<String, ParseError> {
        let expr = self.parse_sub(tokens)?;
        match expr {
            Expr::Sym(s) => Ok(s),
            _ => Err(ParseError::ExpectedSymbolVariable {
                grouping: name.to_string(),
            }),
        }
    }

    fn parse_int(&mut self, args: Vec<Vec<Token>>) -> Result<Expr, ParseError> {
        if args.len() != 2 && args.len() != 4 {
            return Err(ParseError::ArityMismatch {
                grouping: "int".to_string(),
                expected: "2 or 4",
                found: args.len(),
            });
        }
        let mut args = args.into_iter();
        let body = self.parse_sub(args.next().unwrap())?;
        let var = self.parse_var_arg("int", args.next().unwrap())?;
        let bounds = if let (Some(lo_toks), Some(hi_toks)) = (args.next(), args.next()) {
            let lo = self.parse_sub(lo_toks)?;
            let hi = self.parse_sub(hi_toks)?;
            Some((Box::new(lo), Box::new(hi)))
        } else {
            None
        };
        Ok(Expr::Integral {
            var,
            bounds,
            body: Box::new(body),
        })
    }

    fn parse_integrate(&mut self, args: Vec<Vec<Token>>) -> Result<Expr, ParseError> {
        if args.len() != 4 {
            return Err(ParseError::ArityMismatch {
                grouping: "integrate".to_string(),
                expected: "4",
                found: args.len(),
            });
        }
        let mut args = args.into_iter();
        let body = self.parse_sub(args.next().unwrap())?;
        let var = self.parse_var_arg("integrate", args.next().unwrap())?;
        let lo = self.parse_sub(args.next().unwrap())?;
        let hi = self.parse_sub(args.next().unwrap())?;

        if self.config.eager_integral {
            let lo_v = eval_const_f64(&lo);
            let hi_v = eval_const_f64(&hi);
            let result = simpson(&body, &var, lo_v, hi_v, SIMPSON_SUBINTERVALS);
            Ok(Expr::Num(Number::real(result)))
        } else {
            Ok(Expr::Integral {
                var,
                bounds: Some((Box::new(lo), Box::new(hi))),
                body: Box::new(body),
            })
        }
    }

    fn parse_dd(&mut self, args: Vec<Vec<Token>>) -> Result<Expr, ParseError> {
        if args.len() != 2 {
            return Err(ParseError::ArityMismatch {
                grouping: "dd".to_string(),
                expected: "2",
                found: args.len(),
            });
        }
        let mut args = args.into_iter();
        let body = self.parse_sub(args.next().unwrap())?;
        let var = self.parse_var_arg("dd", args.next().unwrap())?;

        if self.config.eager_derivative {
            let derivative = differentiate(&body, &var);
            Ok(simplify(derivative))
        } else {
            Ok(Expr::Derivative {
                var,
                body: Box::new(body),
            })
        }
    }

    fn parse_roots(&mut self, args: Vec<Vec<Token>>) -> Result<Expr, ParseError> {
        if args.len() != 2 {
            return Err(ParseError::ArityMismatch {
                grouping: "roots".to_string(),
                expected: "2",
                found: args.len(),
            });
        }
        let mut args = args.into_iter();
        let body = self.parse_sub(args.next().unwrap())?;
        let var = self.parse_var_arg("roots", args.next().unwrap())?;

        let roots: Result<Vec<Expr>, SolverError> = (|| {
            let poly = extract_polynomial(&body, &var)?;
            Ok(solve_polynomial(&poly)?)
        })();
        let roots = roots.map_err(|_| ParseError::ExpectedSymbolVariable {
            grouping: "roots".to_string(),
        })?;
        Ok(Expr::RootsResult(
            roots.into_iter().map(simplify).collect(),
        ))
    }

    fn parse_factor(&mut self, args: Vec<Vec<Token>>) -> Result<Expr, ParseError> {
        if args.len() != 2 {
            return Err(ParseError::ArityMismatch {
                grouping: "factor".to_string(),
                expected: "2",
                found: args.len(),
            });
        }
        let mut args = args.into_iter();
        let body = self.parse_sub(args.next().unwrap())?;
        let var = self.parse_var_arg("factor", args.next().unwrap())?;

        let factors: Result<Vec<Expr>, SolverError> = (|| {
            let poly = extract_polynomial(&body, &var)?;
            Ok(factor_polynomial(&poly, &var)?)
        })();
        let factors = factors.map_err(|_| ParseError::ExpectedSymbolVariable {
            grouping: "factor".to_string(),
        })?;
        Ok(Expr::FactorResult(
            factors.into_iter().map(simplify).collect(),
        ))
    }
}

fn exact_integer(e: &Expr) -> Option<Number> {
    match e {
        Expr::Num(n @ Number::Int(_)) | Expr::Num(n @ Number::BigInt(_)) => Some(n.clone()),
        _ => None,
    }
}

/// Evaluates a bound expression (typically a constant like `0` or `pi`) to
/// an `f64` for the numeric integrator; non-constant bounds fall through
/// to `NaN`, matching §7's "integrator does not detect pathological input"
/// policy.
fn eval_const_f64(e: &Expr) -> f64 {
    match simplify(e.clone()) {
        Expr::Num(n) => n.to_f64(),
        _ => f64::NAN,
    }
}

/// Phase A of spec.md §4.2: insert `*` between any adjacent pair `(L, R)`
/// where `L` can end a value (`NUMBER`, `SYMBOL`, `)`) and `R` can start one
/// (`NUMBER`, `SYMBOL`, `GROUPING`, `PREFIX`, `(`). Applied once, before any
/// recursive descent, so every sub-slice the parser later recurses into has
/// already been normalized.
fn insert_implicit_multiplication(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len() + 4);
    for (i, tok) in tokens.into_iter().enumerate() {
        if i > 0 {
            let prev = out.last().unwrap();
            if prev.starts_implicit_left() && tok.starts_implicit_right() {
                out.push(Token::Operator('*'));
            }
        }
        out.push(tok);
    }
    out
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError::Lex(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Expr {
        parse_default(s).unwrap()
    }

    #[test]
    fn simple_arithmetic_tree() {
        let e = p("1 + 2 * 3");
        assert_eq!(
            e,
            Expr::Add(
                Box::new(Expr::int(1)),
                Box::new(Expr::Mul(Box::new(Expr::int(2)), Box::new(Expr::int(3))))
            )
        );
    }

    #[test]
    fn power_is_right_associative() {
        let e = p("2^3^2");
        assert_eq!(
            e,
            Expr::Pow(
                Box::new(Expr::int(2)),
                Box::new(Expr::Pow(Box::new(Expr::int(3)), Box::new(Expr::int(2))))
            )
        );
    }

    #[test]
    fn implicit_multiplication_between_number_and_symbol() {
        let e = p("2x");
        assert_eq!(
            e,
            Expr::Mul(Box::new(Expr::int(2)), Box::new(Expr::Sym("x".into())))
        );
    }

    #[test]
    fn implicit_multiplication_before_grouping() {
        let e = p("2sqrt(3)");
        assert_eq!(
            e,
            Expr::Mul(Box::new(Expr::int(2)), Box::new(Expr::Sqrt(Box::new(Expr::int(3)))))
        );
    }

    #[test]
    fn integer_division_becomes_rational_leaf() {
        let e = p("3/4");
        assert_eq!(e, Expr::Num(Number::Rational(3, 4)));
    }

    #[test]
    fn division_by_zero_literal_stays_a_div_node() {
        let e = p("3/0");
        assert!(matches!(e, Expr::Div(..)));
    }

    #[test]
    fn parenthesized_division_is_not_collapsed() {
        let e = p("(1+2)/4");
        assert!(matches!(e, Expr::Div(..)));
    }

    #[test]
    fn unmatched_paren_errors() {
        assert!(parse_default("(1 + 2").is_err());
    }

    #[test]
    fn grouping_wrong_arity_errors() {
        let err = parse_default("sqrt(1, 2)").unwrap_err();
        assert!(matches!(err, ParseError::ArityMismatch { .. }));
    }

    #[test]
    fn dd_non_symbol_variable_errors() {
        let err = parse_default("dd(x^2, 1)").unwrap_err();
        assert!(matches!(err, ParseError::ExpectedSymbolVariable { .. }));
    }

    #[test]
    fn roots_quadratic_scenario() {
        let e = parse_default("roots(x^2 - 5x + 6, x)").unwrap();
        match e {
            Expr::RootsResult(roots) => assert_eq!(roots.len(), 2),
            other => panic!("expected RootsResult, got {other:?}"),
        }
    }

    #[test]
    fn lazy_dd_embeds_symbolic_node() {
        let cfg = ParserConfig {
            eager_derivative: false,
            eager_integral: false,
        };
        let e = parse("dd(x^2, x)", cfg).unwrap();
        assert!(matches!(e, Expr::Derivative { .. }));
    }

    #[test]
    fn lazy_int_definite_embeds_symbolic_node() {
        let cfg = ParserConfig {
            eager_derivative: false,
            eager_integral: false,
        };
        let e = parse("integrate(sin(x), x, 0, pi)", cfg).unwrap();
        assert!(matches!(e, Expr::Integral { .. }));
    }

    #[test]
    fn eager_integrate_evaluates_numerically() {
        let e = parse_default("integrate(sin(x), x, 0, pi)").unwrap();
        match e {
            Expr::Num(n) => assert!((n.to_f64() - 2.0).abs() < 1e-6),
            other => panic!("expected numeric result, got {other:?}"),
        }
    }
}

/// Splits a token slice on top-level (paren-depth-0) commas, per spec.md
/// §4.2's "Argument splitting for groupings" clause.
fn split_top_level_commas(tokens: Vec<Token>) -> Vec<Vec<Token>> {
    let mut out = vec![Vec::new()];
    let mut depth = 0i32;
    for tok in tokens {
        match &tok {
            Token::Paren('(') => {
                depth += 1;
                out.last_mut().unwrap().push(tok);
            }
            Token::Paren(')') => {
                depth -= 1;
                out.last_mut().unwrap().push(tok);
            }
            Token::Operator(',') if depth == 0 => out.push(Vec::new()),
            _ => out.last_mut().unwrap().push(tok),
        }
    }
    out
}
