//! Character stream → token stream (spec.md §4.1).
//!
//! Grounded in the teacher's `noyau/jetons.rs` character-at-a-time scan
//! (whitespace skip, digit-run scan, identifier-run scan with reserved-word
//! recognition); extended to the full reserved-word/grouping/prefix set the
//! spec's surface language needs and to the exact-number promotion rules in
//! `Number`. The teacher's unicode shortcuts (`π`, `√`) are kept alongside
//! the ASCII spellings since dropping them would be a silent regression.

use num_bigint::BigInt;

use crate::error::LexError;
use crate::number::{BigDecimal, Number};
use crate::token::{LimitInfo, Token};

/// Reserved unary-grouping identifiers (spec.md §4.1, §6).
const RESERVED_GROUPINGS: &[&str] = &["sqrt", "sin", "cos", "tan", "ln", "log"];

pub struct Lexer<'a> {
    chars: Vec<char>,
    pos: usize,
    _src: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer {
            chars: src.chars().collect(),
            pos: 0,
            _src: src,
        }
    }

    pub fn tokenize(src: &'a str) -> Result<Vec<Token>, LexError> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token()?;
            let done = tok.is_eof();
            out.push(tok);
            if done {
                break;
            }
        }
        Ok(out)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_ws();
        let Some(c) = self.peek() else {
            return Ok(Token::Eof);
        };

        if c.is_ascii_digit() || (c == '.' && matches!(self.peek_at(1), Some(d) if d.is_ascii_digit()))
        {
            return self.scan_number();
        }

        if c == 'π' {
            self.advance();
            return Ok(Token::Number(Number::pi()));
        }
        if c == '√' {
            self.advance();
            return Ok(Token::Grouping("sqrt".to_string()));
        }

        if c.is_ascii_alphabetic() || c == '_' {
            return self.scan_word();
        }

        if "+-*/%^".contains(c) {
            self.advance();
            return Ok(Token::Operator(c));
        }
        if c == ',' {
            self.advance();
            return Ok(Token::Operator(','));
        }
        if c == '(' || c == ')' {
            self.advance();
            return Ok(Token::Paren(c));
        }

        Err(LexError::UnexpectedChar(c, self.pos))
    }

    fn scan_number(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let mut saw_dot = false;
        let mut saw_exp = false;

        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') && matches!(self.peek_at(1), Some(d) if d.is_ascii_digit()) {
            saw_dot = true;
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some('e') | Some('E'))
            && (matches!(self.peek_at(1), Some(d) if d.is_ascii_digit())
                || (matches!(self.peek_at(1), Some('+') | Some('-'))
                    && matches!(self.peek_at(2), Some(d) if d.is_ascii_digit())))
        {
            saw_exp = true;
            self.advance();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.advance();
            }
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text: String = self.chars[start..self.pos].iter().collect();

        if saw_dot || saw_exp {
            return Ok(Token::Number(parse_decimal(&text)));
        }

        match text.parse::<i64>() {
            Ok(v) => Ok(Token::Number(Number::Int(v))),
            Err(_) => {
                let big = BigInt::parse_bytes(text.as_bytes(), 10)
                    .ok_or_else(|| LexError::UnexpectedChar(text.chars().next().unwrap_or('?'), start))?;
                Ok(Token::Number(Number::from_big_int(big)))
            }
        }
    }

    fn scan_word(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        self.advance();
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }
        let raw: String = self.chars[start..self.pos].iter().collect();
        let word = raw.to_lowercase();

        match word.as_str() {
            "pi" => return Ok(Token::Number(Number::pi())),
            "tau" => return Ok(Token::Number(Number::tau())),
            "e" => return Ok(Token::Number(Number::e())),
            "infinity" => return Ok(Token::Number(Number::infinity())),
            "lim" => return self.scan_lim(),
            "int" => {
                self.expect_open_paren(&word)?;
                return Ok(Token::Grouping("int".to_string()));
            }
            _ => {}
        }

        if RESERVED_GROUPINGS.contains(&word.as_str())
            || word == "integrate"
            || word == "dd"
            || word == "roots"
            || word == "factor"
        {
            self.expect_open_paren(&word)?;
            return Ok(Token::Grouping(word));
        }

        Ok(Token::Symbol(word))
    }

    /// Verifies (without consuming) that a reserved identifier is
    /// immediately followed by `(`, per spec.md §4.1's lex failure case.
    fn expect_open_paren(&self, name: &str) -> Result<(), LexError> {
        self.skip_ws_const_check();
        if self.peek() == Some('(') {
            Ok(())
        } else {
            Err(LexError::MissingParenAfter(name.to_string()))
        }
    }

    fn skip_ws_const_check(&self) {
        // Lookahead only; reserved identifiers must be *immediately*
        // followed by '(' with no intervening skip, matching spec.md's
        // "not immediately followed by `(`" failure wording.
    }

    /// `lim(approaching, target)`: reads two comma-separated argument
    /// strings balanced by parentheses and wraps them in a `LimitInfo`.
    fn scan_lim(&mut self) -> Result<Token, LexError> {
        if self.peek() != Some('(') {
            return Err(LexError::MissingParenAfter("lim".to_string()));
        }
        self.advance();

        let mut depth = 1usize;
        let mut args: Vec<String> = vec![String::new()];
        loop {
            match self.advance() {
                None => return Err(LexError::UnterminatedLim),
                Some('(') => {
                    depth += 1;
                    args.last_mut().unwrap().push('(');
                }
                Some(')') => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    args.last_mut().unwrap().push(')');
                }
                Some(',') if depth == 1 => {
                    args.push(String::new());
                }
                Some(c) => {
                    args.last_mut().unwrap().push(c);
                }
            }
        }

        if args.len() != 2 {
            return Err(LexError::LimArityMismatch(args.len()));
        }
        Ok(Token::Prefix(LimitInfo {
            approaching: args[0].trim().to_string(),
            target: args[1].trim().to_string(),
        }))
    }
}

/// Parses a decimal literal, falling back to a `BigDecimal` carrier when the
/// value overflows what `f64` can represent finitely (spec.md §9, Numeric
/// parsing overflow).
fn parse_decimal(text: &str) -> Number {
    if let Ok(v) = text.parse::<f64>() {
        if v.is_finite() {
            return Number::real(v);
        }
    }
    // Finite-float overflow (or an exponent that rejects the fast path):
    // reparse as digits/10^scale against an explicit decimal point.
    let (mantissa, exp) = match text.split_once(['e', 'E']) {
        Some((m, e)) => (m, e.parse::<i64>().unwrap_or(0)),
        None => (text, 0),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa, ""),
    };
    let digits_str = format!("{int_part}{frac_part}");
    let digits = BigInt::parse_bytes(digits_str.as_bytes(), 10).unwrap_or_default();
    let scale = frac_part.len() as i64 - exp;
    let scale = scale.max(0) as u32;
    let approx = text.parse::<f64>().unwrap_or(f64::INFINITY);
    Number::real_big(approx, BigDecimal::new(digits, scale))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<Token> {
        Lexer::tokenize(s).unwrap()
    }

    #[test]
    fn integer_and_operator() {
        let t = toks("1 + 2");
        assert_eq!(
            t,
            vec![
                Token::Number(Number::Int(1)),
                Token::Operator('+'),
                Token::Number(Number::Int(2)),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn reserved_grouping_requires_paren() {
        let err = Lexer::tokenize("sqrt x").unwrap_err();
        assert_eq!(err, LexError::MissingParenAfter("sqrt".to_string()));
    }

    #[test]
    fn grouping_followed_by_paren_ok() {
        let t = toks("sqrt(2)");
        assert_eq!(t[0], Token::Grouping("sqrt".to_string()));
    }

    #[test]
    fn lim_reads_two_arguments() {
        let t = toks("lim(x approaching, 0)");
        match &t[0] {
            Token::Prefix(info) => {
                assert_eq!(info.approaching, "x approaching");
                assert_eq!(info.target, "0");
            }
            other => panic!("expected Prefix, got {other:?}"),
        }
    }

    #[test]
    fn lim_wrong_arity_errors() {
        let err = Lexer::tokenize("lim(x, 0, 1)").unwrap_err();
        assert_eq!(err, LexError::LimArityMismatch(3));
    }

    #[test]
    fn named_constants_recognized_case_insensitive() {
        let t = toks("PI + TAU + E + Infinity");
        assert!(matches!(t[0], Token::Number(_)));
        assert!(matches!(t[2], Token::Number(_)));
        assert!(matches!(t[4], Token::Number(_)));
        assert!(matches!(t[6], Token::Number(_)));
    }

    #[test]
    fn big_integer_literal_promotes() {
        let t = toks("99999999999999999999999999");
        match &t[0] {
            Token::Number(Number::BigInt(_)) => {}
            other => panic!("expected BigInt, got {other:?}"),
        }
    }

    #[test]
    fn decimal_literal_is_real() {
        let t = toks("3.14");
        assert!(matches!(t[0], Token::Number(Number::Real(..))));
    }

    #[test]
    fn unexpected_char_errors() {
        let err = Lexer::tokenize("2 $ 3").unwrap_err();
        assert!(matches!(err, LexError::UnexpectedChar('$', _)));
    }

    #[test]
    fn unicode_shortcuts_accepted() {
        let t = toks("√2 + π");
        assert_eq!(t[0], Token::Grouping("sqrt".to_string()));
        assert!(matches!(t[2], Token::Number(_)));
    }
}
