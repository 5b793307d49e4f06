//! Error types for every stage of the pipeline (lexing, parsing, polynomial
//! extraction, solving, and exact arithmetic).
//!
//! The teacher (`calculatrice_qpur`) returns `Result<_, String>` everywhere;
//! here each stage gets its own enum so callers can match on failure kind
//! instead of parsing a message, per the error taxonomy in the spec.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LexError {
    UnexpectedChar(char, usize),
    MissingParenAfter(String),
    LimArityMismatch(usize),
    UnterminatedLim,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnexpectedChar(c, pos) => write!(f, "unexpected character '{c}' at {pos}"),
            LexError::MissingParenAfter(name) => write!(f, "expected '(' after '{name}'"),
            LexError::LimArityMismatch(n) => {
                write!(f, "lim(...) expects 2 arguments, found {n}")
            }
            LexError::UnterminatedLim => write!(f, "unterminated lim(...) argument list"),
        }
    }
}

impl std::error::Error for LexError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    UnmatchedParen,
    UnterminatedGrouping(String),
    ArityMismatch {
        grouping: String,
        expected: &'static str,
        found: usize,
    },
    ExpectedSymbolVariable {
        grouping: String,
    },
    UnknownPrefix(String),
    EmptyExpression,
    Lex(LexError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnmatchedParen => write!(f, "unmatched parenthesis"),
            ParseError::UnterminatedGrouping(name) => {
                write!(f, "unterminated grouping '{name}('")
            }
            ParseError::ArityMismatch {
                grouping,
                expected,
                found,
            } => write!(
                f,
                "'{grouping}' expects {expected} argument(s), found {found}"
            ),
            ParseError::ExpectedSymbolVariable { grouping } => {
                write!(f, "'{grouping}' requires a bare symbol as its variable")
            }
            ParseError::UnknownPrefix(tok) => write!(f, "unexpected token in prefix position: {tok}"),
            ParseError::EmptyExpression => write!(f, "empty expression"),
            ParseError::Lex(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError::Lex(e)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtractionError;

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expression is not a polynomial in the requested variable")
    }
}

impl std::error::Error for ExtractionError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverError {
    NotPolynomial,
    ConstantPolynomial,
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::NotPolynomial => {
                write!(f, "expression is not a polynomial in the requested variable")
            }
            SolverError::ConstantPolynomial => write!(f, "polynomial has degree 0, no roots to find"),
        }
    }
}

impl std::error::Error for SolverError {}

impl From<ExtractionError> for SolverError {
    fn from(_: ExtractionError) -> Self {
        SolverError::NotPolynomial
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithmeticError {
    ZeroDenominator,
}

impl fmt::Display for ArithmeticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithmeticError::ZeroDenominator => write!(f, "zero denominator"),
        }
    }
}

impl std::error::Error for ArithmeticError {}

/// Umbrella error returned by the crate's top-level `evaluate` entry point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoreError {
    Parse(ParseError),
    Solver(SolverError),
    Arithmetic(ArithmeticError),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Parse(e) => write!(f, "{e}"),
            CoreError::Solver(e) => write!(f, "{e}"),
            CoreError::Arithmetic(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<ParseError> for CoreError {
    fn from(e: ParseError) -> Self {
        CoreError::Parse(e)
    }
}

impl From<LexError> for CoreError {
    fn from(e: LexError) -> Self {
        CoreError::Parse(ParseError::Lex(e))
    }
}

impl From<SolverError> for CoreError {
    fn from(e: SolverError) -> Self {
        CoreError::Solver(e)
    }
}

impl From<ArithmeticError> for CoreError {
    fn from(e: ArithmeticError) -> Self {
        CoreError::Arithmetic(e)
    }
}
