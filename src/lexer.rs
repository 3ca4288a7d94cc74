//! Tokenization for rcalc
//!
//! A single left-to-right scan that alternates between two states: expecting
//! a value (number, variable, function call, `(` or a unary sign) and
//! expecting an operator (binary operator, `!` or `)`). The alternation is
//! enforced here, so every token list that leaves the lexer is well formed
//! apart from parenthesis balance.

use nom::{
    bytes::complete::take_while,
    character::complete::{char, digit0, satisfy},
    combinator::{opt, recognize},
    sequence::pair,
    IResult,
};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,       // +
    Sub,       // -
    Mul,       // * x
    Div,       // / :
    Pow,       // ^
    Factorial, // ! (postfix)
    Neg,       // unary minus before a group, function or variable
}

impl Operator {
    /// Binding strength, low to high
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Add | Operator::Sub => 1,
            Operator::Mul | Operator::Div => 2,
            Operator::Neg => 3,
            Operator::Pow => 4,
            Operator::Factorial => 5,
        }
    }

    pub fn is_right_assoc(self) -> bool {
        matches!(self, Operator::Pow | Operator::Neg)
    }

    /// Prefix operators have no left operand, so they never pop the stack
    pub fn is_prefix(self) -> bool {
        self == Operator::Neg
    }

    /// Number of operands consumed during evaluation
    pub fn arity(self) -> usize {
        match self {
            Operator::Factorial | Operator::Neg => 1,
            _ => 2,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Pow => "^",
            Operator::Factorial => "!",
            Operator::Neg => "neg",
        }
    }

    /// Map a binary operator character, normalizing `x` and `:`
    fn from_binary_char(c: char) -> Option<Operator> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' | 'x' | 'X' => Some(Operator::Mul),
            '/' | ':' => Some(Operator::Div),
            '^' => Some(Operator::Pow),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Log,
    Sqrt,
    Exp,
    Cot,
    Asin,
    Acos,
    Atan,
    Sinh,
}

impl Function {
    pub const ALL: [Function; 11] = [
        Function::Sin,
        Function::Cos,
        Function::Tan,
        Function::Log,
        Function::Sqrt,
        Function::Exp,
        Function::Cot,
        Function::Asin,
        Function::Acos,
        Function::Atan,
        Function::Sinh,
    ];

    /// Look up a lowercase function name
    pub fn from_name(name: &str) -> Option<Function> {
        Function::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Log => "log",
            Function::Sqrt => "sqrt",
            Function::Exp => "exp",
            Function::Cot => "cot",
            Function::Asin => "asin",
            Function::Acos => "acos",
            Function::Atan => "atan",
            Function::Sinh => "sinh",
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Sign-prefixed literal text, parsed by the active backend
    Number(String),
    Operator(Operator),
    Function(Function),
    /// Lowercase identifier
    Variable(String),
    LeftParen,
    RightParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Number(n) => f.write_str(n),
            Token::Operator(op) => write!(f, "{}", op),
            Token::Function(func) => write!(f, "{}", func),
            Token::Variable(name) => f.write_str(name),
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
        }
    }
}

/// Grammar features a numeric backend accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Fractional literals such as `1.5`
    pub decimals: bool,
    /// Named functions such as `sin(x)`
    pub functions: bool,
    /// The `^` operator
    pub power: bool,
}

impl Capabilities {
    pub const ALL: Capabilities = Capabilities {
        decimals: true,
        functions: true,
        power: true,
    };

    pub const INTEGER: Capabilities = Capabilities {
        decimals: false,
        functions: false,
        power: false,
    };
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("Syntax error: unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("Syntax error: malformed number at position {0}")]
    MalformedNumber(usize),
    #[error("Syntax error: decimal numbers are not supported in this mode ({0})")]
    DecimalNotSupported(String),
    #[error("Syntax error: functions are not supported in this mode ({0})")]
    FunctionNotSupported(String),
    #[error("Syntax error: operator '^' is not supported in this mode")]
    PowerNotSupported,
    #[error("Syntax error: function '{0}' must be followed by parentheses")]
    MissingParenthesis(String),
    #[error("Syntax error: expression ended unexpectedly")]
    UnexpectedEnd,
}

/// Recognize an unsigned literal: digits with an optional single fraction part
fn number_literal(input: &str) -> IResult<&str, &str> {
    recognize(pair(digit0, opt(pair(char('.'), digit0))))(input)
}

/// Recognize an identifier: `[A-Za-z][A-Za-z0-9_]*`
fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c: char| c.is_ascii_alphabetic()),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

/// Scan a literal at `pos`, returning the rest of the input and the canonical text
fn scan_number<'a>(
    rest: &'a str,
    pos: usize,
    caps: Capabilities,
) -> Result<(&'a str, String), LexError> {
    let (remaining, literal) = number_literal(rest).map_err(|_| LexError::MalformedNumber(pos))?;

    if !literal.bytes().any(|b| b.is_ascii_digit()) || remaining.starts_with('.') {
        return Err(LexError::MalformedNumber(pos));
    }
    if literal.contains('.') && !caps.decimals {
        return Err(LexError::DecimalNotSupported(literal.to_string()));
    }

    // "1." -> "1", ".5" -> "0.5"
    let mut text = literal.trim_end_matches('.').to_string();
    if text.starts_with('.') {
        text.insert(0, '0');
    }
    Ok((remaining, text))
}

/// Tokenize an infix expression for a backend with the given capabilities
pub fn tokenize(input: &str, caps: Capabilities) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut rest = input;
    let mut expect_value = true;

    loop {
        rest = rest.trim_start();
        let c = match rest.chars().next() {
            Some(c) => c,
            None => break,
        };
        let pos = input.len() - rest.len();

        if expect_value {
            match c {
                '(' => {
                    tokens.push(Token::LeftParen);
                    rest = &rest[1..];
                }
                '+' | '-' => {
                    let negative = c == '-';
                    rest = rest[1..].trim_start();
                    let pos = input.len() - rest.len();
                    match rest.chars().next() {
                        Some(n) if n.is_ascii_digit() || n == '.' => {
                            let (remaining, text) = scan_number(rest, pos, caps)?;
                            let text = if negative { format!("-{}", text) } else { text };
                            tokens.push(Token::Number(text));
                            rest = remaining;
                            expect_value = false;
                        }
                        // The group or identifier itself is scanned on the next pass
                        Some(n) if n == '(' || n.is_ascii_alphabetic() => {
                            if negative {
                                tokens.push(Token::Operator(Operator::Neg));
                            }
                        }
                        Some(n) => return Err(LexError::UnexpectedChar { ch: n, pos }),
                        None => return Err(LexError::UnexpectedEnd),
                    }
                }
                c if c.is_ascii_digit() || c == '.' => {
                    let (remaining, text) = scan_number(rest, pos, caps)?;
                    tokens.push(Token::Number(text));
                    rest = remaining;
                    expect_value = false;
                }
                c if c.is_ascii_alphabetic() => {
                    let (remaining, ident) =
                        identifier(rest).map_err(|_| LexError::UnexpectedChar { ch: c, pos })?;
                    let name = ident.to_ascii_lowercase();
                    rest = remaining;

                    if let Some(func) = Function::from_name(&name) {
                        if !caps.functions {
                            return Err(LexError::FunctionNotSupported(name));
                        }
                        if !rest.trim_start().starts_with('(') {
                            return Err(LexError::MissingParenthesis(name));
                        }
                        tokens.push(Token::Function(func));
                    } else {
                        tokens.push(Token::Variable(name));
                        expect_value = false;
                    }
                }
                _ => return Err(LexError::UnexpectedChar { ch: c, pos }),
            }
        } else {
            match c {
                ')' => tokens.push(Token::RightParen),
                '!' => tokens.push(Token::Operator(Operator::Factorial)),
                _ => match Operator::from_binary_char(c) {
                    Some(Operator::Pow) if !caps.power => return Err(LexError::PowerNotSupported),
                    Some(op) => {
                        tokens.push(Token::Operator(op));
                        expect_value = true;
                    }
                    None => return Err(LexError::UnexpectedChar { ch: c, pos }),
                },
            }
            rest = &rest[c.len_utf8()..];
        }
    }

    if expect_value {
        return Err(LexError::UnexpectedEnd);
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Result<Vec<Token>, LexError> {
        tokenize(input, Capabilities::ALL)
    }

    fn num(s: &str) -> Token {
        Token::Number(s.to_string())
    }

    fn var(s: &str) -> Token {
        Token::Variable(s.to_string())
    }

    #[test]
    fn tokenize_simple_sum() {
        let tokens = lex("2+3").unwrap();
        assert_eq!(
            tokens,
            vec![num("2"), Token::Operator(Operator::Add), num("3")]
        );
    }

    #[test]
    fn tokenize_skips_whitespace() {
        let tokens = lex("  12 *\t4 ").unwrap();
        assert_eq!(
            tokens,
            vec![num("12"), Token::Operator(Operator::Mul), num("4")]
        );
    }

    #[test]
    fn tokenize_operator_aliases() {
        let tokens = lex("6 x 2 X 3 : 4").unwrap();
        assert_eq!(
            tokens,
            vec![
                num("6"),
                Token::Operator(Operator::Mul),
                num("2"),
                Token::Operator(Operator::Mul),
                num("3"),
                Token::Operator(Operator::Div),
                num("4"),
            ]
        );
    }

    #[test]
    fn tokenize_signed_literal() {
        let tokens = lex("-1!").unwrap();
        assert_eq!(tokens, vec![num("-1"), Token::Operator(Operator::Factorial)]);

        let tokens = lex("2 * - 3").unwrap();
        assert_eq!(
            tokens,
            vec![num("2"), Token::Operator(Operator::Mul), num("-3")]
        );

        let tokens = lex("+4").unwrap();
        assert_eq!(tokens, vec![num("4")]);
    }

    #[test]
    fn tokenize_negated_group() {
        let tokens = lex("-(3+2)").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Operator(Operator::Neg),
                Token::LeftParen,
                num("3"),
                Token::Operator(Operator::Add),
                num("2"),
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn tokenize_negated_variable_and_function() {
        let tokens = lex("-X + -sin(y)").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Operator(Operator::Neg),
                var("x"),
                Token::Operator(Operator::Add),
                Token::Operator(Operator::Neg),
                Token::Function(Function::Sin),
                Token::LeftParen,
                var("y"),
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn tokenize_function_case_insensitive() {
        let tokens = lex("SQRT (16)").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Function(Function::Sqrt),
                Token::LeftParen,
                num("16"),
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn tokenize_identifier_with_digits_and_underscore() {
        let tokens = lex("rate_2 * 3").unwrap();
        assert_eq!(
            tokens,
            vec![var("rate_2"), Token::Operator(Operator::Mul), num("3")]
        );
    }

    #[test]
    fn tokenize_canonical_literals() {
        assert_eq!(lex(".5").unwrap(), vec![num("0.5")]);
        assert_eq!(lex("3.").unwrap(), vec![num("3")]);
        assert_eq!(lex("-.25").unwrap(), vec![num("-0.25")]);
    }

    #[test]
    fn reject_second_decimal_point() {
        assert_eq!(lex("1.2.3"), Err(LexError::MalformedNumber(0)));
    }

    #[test]
    fn reject_lone_point() {
        assert_eq!(lex("1 + ."), Err(LexError::MalformedNumber(4)));
    }

    #[test]
    fn reject_function_without_parens() {
        assert_eq!(
            lex("sin 3"),
            Err(LexError::MissingParenthesis("sin".to_string()))
        );
    }

    #[test]
    fn reject_leading_binary_operator() {
        assert_eq!(lex("*3"), Err(LexError::UnexpectedChar { ch: '*', pos: 0 }));
        assert_eq!(lex(")"), Err(LexError::UnexpectedChar { ch: ')', pos: 0 }));
    }

    #[test]
    fn reject_double_sign() {
        assert_eq!(lex("--3"), Err(LexError::UnexpectedChar { ch: '-', pos: 1 }));
    }

    #[test]
    fn reject_adjacent_values() {
        assert_eq!(lex("2 3"), Err(LexError::UnexpectedChar { ch: '3', pos: 2 }));
        assert_eq!(lex("2 (3)"), Err(LexError::UnexpectedChar { ch: '(', pos: 2 }));
    }

    #[test]
    fn reject_trailing_operator() {
        assert_eq!(lex("2 +"), Err(LexError::UnexpectedEnd));
        assert_eq!(lex("-"), Err(LexError::UnexpectedEnd));
        assert_eq!(lex("   "), Err(LexError::UnexpectedEnd));
    }

    #[test]
    fn integer_grammar_restrictions() {
        let caps = Capabilities::INTEGER;
        assert_eq!(
            tokenize("1.5 + 2", caps),
            Err(LexError::DecimalNotSupported("1.5".to_string()))
        );
        assert_eq!(
            tokenize("sqrt(4)", caps),
            Err(LexError::FunctionNotSupported("sqrt".to_string()))
        );
        assert_eq!(tokenize("2^3", caps), Err(LexError::PowerNotSupported));
        assert!(tokenize("-12 * (3 + n)!", caps).is_ok());
    }
}
