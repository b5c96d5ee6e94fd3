//! Error definitions for the expression lexer and parser.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Lexical failure. Every variant carries the byte offset into the lexer input.
pub enum LexError {
    /// String literal without its closing `'`; offset points at the opening quote.
    #[error("unterminated string literal starting at {offset}")]
    UnterminatedString { offset: usize },
    /// Number literal that does not follow the numeric grammar.
    #[error("malformed number literal at {offset}: {message}")]
    MalformedNumber { offset: usize, message: String },
    /// Character that cannot start any token.
    #[error("unexpected character {ch:?} at {offset}")]
    UnexpectedChar { ch: char, offset: usize },
}

impl LexError {
    /// Byte offset the error points at.
    pub fn offset(&self) -> usize {
        match self {
            LexError::UnterminatedString { offset }
            | LexError::MalformedNumber { offset, .. }
            | LexError::UnexpectedChar { offset, .. } => *offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Structural failure while building the AST.
pub enum ParseError {
    /// No tokens before the end marker.
    #[error("empty expression at {offset}")]
    Empty { offset: usize },
    /// Token of the wrong kind where a specific kind was required.
    #[error("unexpected {found} at {offset}; expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        offset: usize,
    },
    /// `(` or `[` that is never closed; offset points at the opening bracket.
    #[error("unclosed '{open}' at {offset}; expected '{expected}'")]
    Unclosed {
        open: char,
        expected: char,
        offset: usize,
    },
    /// Two call arguments not separated by `,`.
    #[error("missing ',' between function arguments at {offset}")]
    MissingSeparator { offset: usize },
    /// Tokens left over after a complete expression.
    #[error("unexpected {found} after expression at {offset}")]
    TrailingInput { found: String, offset: usize },
    /// Number literal that does not fit its node type.
    #[error("invalid number literal '{literal}' at {offset}")]
    InvalidNumber { literal: String, offset: usize },
    /// Nesting exceeded the configured `max_depth`.
    #[error("expression nested deeper than {limit} levels at {offset}")]
    TooDeep { limit: usize, offset: usize },
}

impl ParseError {
    /// Byte offset the error points at.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::Empty { offset }
            | ParseError::UnexpectedToken { offset, .. }
            | ParseError::Unclosed { offset, .. }
            | ParseError::MissingSeparator { offset }
            | ParseError::TrailingInput { offset, .. }
            | ParseError::InvalidNumber { offset, .. }
            | ParseError::TooDeep { offset, .. } => *offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Error returned by [`crate::expr::parse_expression`].
pub enum ExprError {
    /// Tokenizing failed.
    #[error("lex error: {0}")]
    Lex(#[from] LexError),
    /// Tokens did not form a single expression.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

impl ExprError {
    /// Byte offset of the underlying lex or parse error.
    pub fn offset(&self) -> usize {
        match self {
            ExprError::Lex(e) => e.offset(),
            ExprError::Parse(e) => e.offset(),
        }
    }

    /// Line and column of the error inside `src`, the text it was produced from.
    pub fn position(&self, src: &str) -> Position {
        Position::locate(src, self.offset())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// 1-based line and column. Columns count characters, not bytes.
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Converts a byte offset into a position. Offsets past the end clamp to the end.
    pub fn locate(src: &str, offset: usize) -> Position {
        let mut line = 1;
        let mut column = 1;
        for (idx, ch) in src.char_indices() {
            if idx >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Position { line, column }
    }
}
