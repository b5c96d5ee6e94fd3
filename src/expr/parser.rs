//! Precedence-climbing parser for expression tokens.
//!
//! Precedence from lowest to highest: `||`, `&&`, comparison, `!`, postfix
//! (`.name`, `.*`, `[index]`), primary. Binary levels and postfix chains are
//! built in loops; only parentheses, index brackets and call arguments recurse.

use crate::error::ParseError;

use super::ast::{CompareOpKind, ExprNode, LogicalOpKind};
use super::lexer::{Token, TokenKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Parser configuration.
pub struct ParserOptions {
    /// Maximum nesting of parentheses, index brackets, call arguments and
    /// `!` operators. `None` leaves nesting bounded only by the call stack:
    /// an unoptimized build on a 2 MiB thread overflows somewhere between 200
    /// and 400 levels of parentheses and aborts the process. Set a limit when
    /// parsing untrusted input.
    pub max_depth: Option<usize>,
}

/// Parses a token stream with default options.
pub fn parse(tokens: &[Token]) -> Result<ExprNode, ParseError> {
    Parser::new(tokens).parse()
}

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    options: ParserOptions,
    eof: Token,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self::with_options(tokens, ParserOptions::default())
    }

    pub fn with_options(tokens: &'a [Token], options: ParserOptions) -> Self {
        // Stands in for a missing end marker when the caller built the tokens by hand.
        let eof_offset = tokens
            .last()
            .map(|t| {
                if t.kind == TokenKind::End {
                    t.offset
                } else {
                    t.offset + t.value.len()
                }
            })
            .unwrap_or(0);
        Parser {
            tokens,
            pos: 0,
            depth: 0,
            options,
            eof: Token {
                kind: TokenKind::End,
                value: String::new(),
                offset: eof_offset,
            },
        }
    }

    /// Parses the whole stream into one root node.
    pub fn parse(mut self) -> Result<ExprNode, ParseError> {
        let result = self.parse_root();
        match &result {
            Ok(_) => log::trace!("parsed expression from {} tokens", self.tokens.len()),
            Err(e) => log::debug!("parse error: {e}"),
        }
        result
    }

    fn parse_root(&mut self) -> Result<ExprNode, ParseError> {
        if self.current().kind == TokenKind::End {
            return Err(ParseError::Empty {
                offset: self.current().offset,
            });
        }

        let expr = self.parse_or()?;
        let current = self.current();
        if current.kind != TokenKind::End {
            return Err(ParseError::TrailingInput {
                found: current.describe(),
                offset: current.offset,
            });
        }
        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<ExprNode, ParseError> {
        let mut expr = self.parse_and()?;
        while self.consume_if(TokenKind::Or) {
            let right = self.parse_and()?;
            expr = ExprNode::LogicalOp {
                kind: LogicalOpKind::Or,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<ExprNode, ParseError> {
        let mut expr = self.parse_compare()?;
        while self.consume_if(TokenKind::And) {
            let right = self.parse_compare()?;
            expr = ExprNode::LogicalOp {
                kind: LogicalOpKind::And,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_compare(&mut self) -> Result<ExprNode, ParseError> {
        let mut expr = self.parse_not()?;
        loop {
            let kind = match self.current().kind {
                TokenKind::Less => CompareOpKind::Less,
                TokenKind::LessEq => CompareOpKind::LessEq,
                TokenKind::Greater => CompareOpKind::Greater,
                TokenKind::GreaterEq => CompareOpKind::GreaterEq,
                TokenKind::Eq => CompareOpKind::Eq,
                TokenKind::NotEq => CompareOpKind::NotEq,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_not()?;
            expr = ExprNode::CompareOp {
                kind,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_not(&mut self) -> Result<ExprNode, ParseError> {
        let mut count = 0usize;
        while self.current().kind == TokenKind::Not {
            let offset = self.current().offset;
            self.pos += 1;
            self.enter(offset)?;
            count += 1;
        }
        let mut expr = self.parse_postfix()?;
        self.depth -= count;
        for _ in 0..count {
            expr = ExprNode::NotOp {
                operand: Box::new(expr),
            };
        }
        Ok(expr)
    }

    fn parse_postfix(&mut self) -> Result<ExprNode, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.current().kind {
                TokenKind::Dot => {
                    self.pos += 1;
                    let token = self.current().clone();
                    expr = match token.kind {
                        TokenKind::Ident => ExprNode::ObjectDeref {
                            receiver: Box::new(expr),
                            property: token.value,
                        },
                        TokenKind::Star => ExprNode::ArrayDeref {
                            receiver: Box::new(expr),
                        },
                        _ => {
                            return Err(self.unexpected("property name or '*' after '.'"));
                        }
                    };
                    self.pos += 1;
                }
                TokenKind::LeftBracket => {
                    let open = self.current().offset;
                    self.pos += 1;
                    self.enter(open)?;
                    let index = self.parse_or()?;
                    self.depth -= 1;
                    self.expect_close(TokenKind::RightBracket, '[', ']', open)?;
                    expr = ExprNode::IndexAccess {
                        receiver: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<ExprNode, ParseError> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Int => {
                self.pos += 1;
                let value = parse_int(&token.value).ok_or_else(|| ParseError::InvalidNumber {
                    literal: token.value.clone(),
                    offset: token.offset,
                })?;
                Ok(ExprNode::Int { value })
            }
            TokenKind::Float => {
                self.pos += 1;
                let value: f64 = token.value.parse().map_err(|_| ParseError::InvalidNumber {
                    literal: token.value.clone(),
                    offset: token.offset,
                })?;
                Ok(ExprNode::Float { value })
            }
            TokenKind::String => {
                self.pos += 1;
                Ok(ExprNode::String {
                    value: unquote(&token.value),
                })
            }
            TokenKind::Ident => {
                self.pos += 1;
                if self.current().kind == TokenKind::LeftParen {
                    return self.parse_call(token.value);
                }
                let literal = match token.value.as_str() {
                    "null" => Some(ExprNode::Null),
                    "true" => Some(ExprNode::Bool { value: true }),
                    "false" => Some(ExprNode::Bool { value: false }),
                    _ => None,
                };
                Ok(literal.unwrap_or(ExprNode::Variable { name: token.value }))
            }
            TokenKind::LeftParen => {
                let open = token.offset;
                self.pos += 1;
                self.enter(open)?;
                let expr = self.parse_or()?;
                self.depth -= 1;
                self.expect_close(TokenKind::RightParen, '(', ')', open)?;
                Ok(expr)
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    /// Parses the argument list; the current token is the opening `(`.
    fn parse_call(&mut self, name: String) -> Result<ExprNode, ParseError> {
        let open = self.current().offset;
        self.pos += 1;

        let mut args = Vec::new();
        if self.consume_if(TokenKind::RightParen) {
            return Ok(ExprNode::FuncCall { name, args });
        }

        self.enter(open)?;
        loop {
            args.push(self.parse_or()?);
            let current = self.current();
            match current.kind {
                TokenKind::Comma => self.pos += 1,
                TokenKind::RightParen => {
                    self.pos += 1;
                    break;
                }
                TokenKind::End => {
                    return Err(ParseError::Unclosed {
                        open: '(',
                        expected: ')',
                        offset: open,
                    })
                }
                TokenKind::Ident
                | TokenKind::String
                | TokenKind::Int
                | TokenKind::Float
                | TokenKind::LeftParen
                | TokenKind::Not => {
                    return Err(ParseError::MissingSeparator {
                        offset: current.offset,
                    })
                }
                _ => return Err(self.unexpected("',' or ')' in argument list")),
            }
        }
        self.depth -= 1;

        Ok(ExprNode::FuncCall { name, args })
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn consume_if(&mut self, kind: TokenKind) -> bool {
        if self.current().kind == kind {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_close(
        &mut self,
        kind: TokenKind,
        open: char,
        expected: char,
        open_offset: usize,
    ) -> Result<(), ParseError> {
        if self.consume_if(kind) {
            return Ok(());
        }
        if self.current().kind == TokenKind::End {
            Err(ParseError::Unclosed {
                open,
                expected,
                offset: open_offset,
            })
        } else {
            Err(self.unexpected(&format!("'{expected}'")))
        }
    }

    fn enter(&mut self, offset: usize) -> Result<(), ParseError> {
        self.depth += 1;
        match self.options.max_depth {
            Some(limit) if self.depth > limit => Err(ParseError::TooDeep { limit, offset }),
            _ => Ok(()),
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let current = self.current();
        ParseError::UnexpectedToken {
            found: current.describe(),
            expected: expected.to_string(),
            offset: current.offset,
        }
    }
}

fn parse_int(raw: &str) -> Option<i64> {
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i128::from(u64::from_str_radix(hex, 16).ok()?),
        None => digits.parse::<i128>().ok()?,
    };
    i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}

fn unquote(raw: &str) -> String {
    let inner = raw
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(raw);
    inner.replace("''", "'")
}
