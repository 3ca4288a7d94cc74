//! Postfix conversion for rcalc
//!
//! Shunting-yard over the lexer's token list. Operands go straight to the
//! output; operators wait on a stack until something of lower precedence
//! (or a closing parenthesis) flushes them. A function waits below its
//! opening parenthesis and is emitted right after the matching `)`.

use crate::lexer::{Operator, Token};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Syntax error: mismatched parentheses, unmatched ')'")]
    UnmatchedRightParen,
    #[error("Syntax error: mismatched parentheses, unmatched '('")]
    UnmatchedLeftParen,
}

/// Parser state
pub struct Parser {
    output: Vec<Token>,
    operators: Vec<Token>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            output: Vec::new(),
            operators: Vec::new(),
        }
    }

    /// Convert an infix token list into postfix order
    pub fn convert(mut self, tokens: Vec<Token>) -> Result<Vec<Token>, ParseError> {
        for token in tokens {
            match token {
                Token::Number(_) | Token::Variable(_) => self.output.push(token),
                Token::Function(_) | Token::LeftParen => self.operators.push(token),
                Token::Operator(op) => self.push_operator(op),
                Token::RightParen => self.close_group()?,
            }
        }
        self.finish()
    }

    /// Pop stronger operators to the output, then push `op`
    fn push_operator(&mut self, op: Operator) {
        if !op.is_prefix() {
            while let Some(Token::Operator(top)) = self.operators.last() {
                let top = *top;
                let pops = if op.is_right_assoc() {
                    top.precedence() > op.precedence()
                } else {
                    top.precedence() >= op.precedence()
                };
                if !pops {
                    break;
                }
                self.operators.pop();
                self.output.push(Token::Operator(top));
            }
        }
        self.operators.push(Token::Operator(op));
    }

    /// Handle `)`: flush to the matching `(` and bind a pending function
    fn close_group(&mut self) -> Result<(), ParseError> {
        loop {
            match self.operators.pop() {
                Some(Token::LeftParen) => break,
                Some(token) => self.output.push(token),
                None => return Err(ParseError::UnmatchedRightParen),
            }
        }

        if let Some(Token::Function(_)) = self.operators.last() {
            if let Some(func) = self.operators.pop() {
                self.output.push(func);
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Token>, ParseError> {
        while let Some(token) = self.operators.pop() {
            match token {
                Token::LeftParen => return Err(ParseError::UnmatchedLeftParen),
                Token::RightParen => return Err(ParseError::UnmatchedRightParen),
                other => self.output.push(other),
            }
        }
        Ok(self.output)
    }
}

/// Convert infix tokens to postfix (RPN) order
pub fn to_postfix(tokens: Vec<Token>) -> Result<Vec<Token>, ParseError> {
    Parser::new().convert(tokens)
}

/// Render a token list as a space-separated string, e.g. `2 3 4 * +`
pub fn render_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
