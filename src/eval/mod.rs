//! RPN evaluator for rcalc
//!
//! Executes a postfix token list against an operand stack:
//! - Numbers push the backend's parse of the literal
//! - Variables push the looked-up value converted into the backend
//! - Operators and functions pop their operands and push the result
//!
//! The evaluator is consumed by [`Evaluator::eval`], so no stack or lookup
//! state outlives a single evaluation.

mod stack;
mod tests;

use crate::error::ErrorKind;
use crate::lexer::{Operator, Token};
use crate::number::Backend;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Invalid expression: '{0}' is missing an operand")]
    StackUnderflow(String),
    #[error("Invalid expression: {0} values left on the stack")]
    LeftoverOperands(usize),
    #[error("Invalid expression: unexpected '{0}' in postfix input")]
    StrayToken(String),
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),
    #[error("Syntax error: invalid number '{0}'")]
    InvalidLiteral(String),
    #[error("Syntax error: {0} is not supported in this mode")]
    Unsupported(String),
    #[error("Domain error: {0}")]
    Domain(String),
    #[error("Arithmetic error: division by zero")]
    DivisionByZero,
    #[error("Arithmetic error: non-integer division result ({0})")]
    InexactDivision(String),
    #[error("Overflow: {0}")]
    Overflow(String),
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::StackUnderflow(_)
            | EvalError::LeftoverOperands(_)
            | EvalError::StrayToken(_) => ErrorKind::Structural,
            EvalError::UnknownVariable(_) => ErrorKind::UnknownIdentifier,
            EvalError::InvalidLiteral(_) | EvalError::Unsupported(_) => ErrorKind::Syntax,
            EvalError::Domain(_) => ErrorKind::Domain,
            EvalError::DivisionByZero | EvalError::InexactDivision(_) => ErrorKind::Arithmetic,
            EvalError::Overflow(_) => ErrorKind::Overflow,
        }
    }
}

/// Read-only variable environment: lowercase name -> value
pub trait Variables {
    fn lookup(&self, name: &str) -> Option<f64>;
}

impl<S: BuildHasher> Variables for HashMap<String, f64, S> {
    fn lookup(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl Variables for BTreeMap<String, f64> {
    fn lookup(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

/// The empty environment
impl Variables for () {
    fn lookup(&self, _name: &str) -> Option<f64> {
        None
    }
}

impl<T: Variables + ?Sized> Variables for &T {
    fn lookup(&self, name: &str) -> Option<f64> {
        (**self).lookup(name)
    }
}

/// Evaluates one postfix sequence with a borrowed backend and variable snapshot
pub struct Evaluator<'a, B: Backend, V: Variables + ?Sized> {
    /// Numeric backend doing the arithmetic
    pub(crate) backend: &'a mut B,
    /// Variable snapshot for this evaluation
    pub(crate) variables: &'a V,
    /// The operand stack
    pub(crate) stack: Vec<B::Value>,
}

impl<'a, B: Backend, V: Variables + ?Sized> Evaluator<'a, B, V> {
    pub fn new(backend: &'a mut B, variables: &'a V) -> Self {
        Evaluator {
            backend,
            variables,
            stack: Vec::new(),
        }
    }

    /// Run the postfix sequence and return the single remaining value
    pub fn eval(mut self, rpn: &[Token]) -> Result<B::Value, EvalError> {
        for token in rpn {
            self.eval_token(token)?;
            log::trace!("{} -> stack depth {}", token, self.stack.len());
        }
        self.finish()
    }

    fn eval_token(&mut self, token: &Token) -> Result<(), EvalError> {
        match token {
            Token::Number(literal) => {
                let value = self.backend.parse_literal(literal)?;
                self.stack.push(value);
            }
            Token::Variable(name) => {
                let raw = self
                    .variables
                    .lookup(name)
                    .ok_or_else(|| EvalError::UnknownVariable(name.clone()))?;
                let value = self.backend.from_variable(name, raw)?;
                self.stack.push(value);
            }
            Token::Operator(op) => self.apply_operator(*op)?,
            Token::Function(func) => {
                let arg = self.pop_operand(func.name())?;
                let value = self.backend.apply(*func, arg)?;
                self.stack.push(value);
            }
            Token::LeftParen | Token::RightParen => {
                return Err(EvalError::StrayToken(token.to_string()));
            }
        }
        Ok(())
    }

    fn apply_operator(&mut self, op: Operator) -> Result<(), EvalError> {
        let value = if op.arity() == 1 {
            let operand = self.pop_operand(op.symbol())?;
            match op {
                Operator::Factorial => self.backend.factorial(operand)?,
                _ => self.backend.neg(operand),
            }
        } else {
            let (lhs, rhs) = self.pop_pair(op.symbol())?;
            match op {
                Operator::Add => self.backend.add(lhs, rhs)?,
                Operator::Sub => self.backend.sub(lhs, rhs)?,
                Operator::Mul => self.backend.mul(lhs, rhs)?,
                Operator::Div => self.backend.div(lhs, rhs)?,
                _ => self.backend.pow(lhs, rhs)?,
            }
        };
        self.stack.push(value);
        Ok(())
    }

    /// Exactly one value must remain
    fn finish(mut self) -> Result<B::Value, EvalError> {
        if self.stack.len() != 1 {
            return Err(EvalError::LeftoverOperands(self.stack.len()));
        }
        self.stack
            .pop()
            .ok_or(EvalError::LeftoverOperands(0))
    }
}

/// Evaluate a postfix token list with the given backend and variables
pub fn evaluate_rpn<B: Backend, V: Variables + ?Sized>(
    backend: &mut B,
    rpn: &[Token],
    variables: &V,
) -> Result<B::Value, EvalError> {
    Evaluator::new(backend, variables).eval(rpn)
}
