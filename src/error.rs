use crate::eval::EvalError;
use crate::lexer::LexError;
use crate::parser::ParseError;
use std::fmt;
use thiserror::Error;

/// Coarse classification of every evaluation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    UnknownIdentifier,
    Domain,
    Arithmetic,
    Overflow,
    Structural,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ErrorKind::Syntax => "syntax",
            ErrorKind::UnknownIdentifier => "unknown identifier",
            ErrorKind::Domain => "domain",
            ErrorKind::Arithmetic => "arithmetic",
            ErrorKind::Overflow => "overflow",
            ErrorKind::Structural => "structural",
        };
        write!(f, "{}", name)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl CalcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            // Tokenizer failures and mismatched parentheses
            CalcError::Lex(_) | CalcError::Parse(_) => ErrorKind::Syntax,
            CalcError::Eval(e) => e.kind(),
        }
    }
}
