//! Arithmetic Expression Parser
//!
//! Recursive-descent evaluator restricted to numeric literals, `+ - * /`,
//! unary signs and parentheses. Anything else is rejected while tokenizing,
//! so no input can reach anything but arithmetic.
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/') unary)*
//! unary  := ('+' | '-') unary | primary
//! primary:= NUMBER | '(' expr ')'
//! ```

use std::fmt;

use thiserror::Error;

/// Nesting limit for parentheses and unary signs
const MAX_DEPTH: usize = 128;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unexpected {found} at position {pos}")]
    UnexpectedToken { found: String, pos: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("division by zero")]
    DivisionByZero,

    #[error("expression nested too deeply")]
    TooDeep,

    #[error("result is not a finite number")]
    NotFinite,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {}", n),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Star => write!(f, "'*'"),
            Token::Slash => write!(f, "'/'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
        }
    }
}

/// Evaluate an arithmetic expression
pub fn evaluate(input: &str) -> Result<f64, ExprError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;

    if let Some(&(token, pos)) = parser.tokens.get(parser.pos) {
        return Err(ExprError::UnexpectedToken {
            found: token.to_string(),
            pos,
        });
    }

    if value.is_finite() {
        Ok(value)
    } else {
        Err(ExprError::NotFinite)
    }
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        let token = match ch {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        literal.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if literal.matches('.').count() > 1 || literal == "." {
                    return Err(ExprError::InvalidNumber(literal));
                }
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ExprError::InvalidNumber(literal.clone()))?;
                tokens.push((Token::Number(value), pos));
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            other => return Err(ExprError::UnexpectedChar { ch: other, pos }),
        };
        tokens.push((token, pos));
        chars.next();
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|&(token, _)| token)
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let next = self.tokens.get(self.pos).copied();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn descend(&mut self) -> Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<f64, ExprError> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.advance();
            let rhs = self.term()?;
            value = if op == Token::Plus { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, ExprError> {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.advance();
            let rhs = self.unary()?;
            value = if op == Token::Star {
                value * rhs
            } else {
                if rhs == 0.0 {
                    return Err(ExprError::DivisionByZero);
                }
                value / rhs
            };
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<f64, ExprError> {
        match self.peek() {
            Some(op @ (Token::Plus | Token::Minus)) => {
                self.advance();
                self.descend()?;
                let value = self.unary()?;
                self.depth -= 1;
                Ok(if op == Token::Minus { -value } else { value })
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<f64, ExprError> {
        match self.advance() {
            Some((Token::Number(n), _)) => Ok(n),
            Some((Token::LParen, _)) => {
                self.descend()?;
                let value = self.expr()?;
                self.depth -= 1;
                match self.advance() {
                    Some((Token::RParen, _)) => Ok(value),
                    Some((token, pos)) => Err(ExprError::UnexpectedToken {
                        found: token.to_string(),
                        pos,
                    }),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some((token, pos)) => Err(ExprError::UnexpectedToken {
                found: token.to_string(),
                pos,
            }),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}
