use serde::Serialize;

use crate::error::LexError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Ident,
    String,
    Int,
    Float,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Dot,
    Star,
    Comma,
    Not,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Eq,
    NotEq,
    And,
    Or,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw lexeme. String tokens keep their quotes and `''` escapes.
    pub value: String,
    /// Byte offset into the lexer input.
    pub offset: usize,
}

impl Token {
    /// Short human-readable form used in parse errors.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::End => "end of input".to_string(),
            TokenKind::Ident => format!("identifier '{}'", self.value),
            TokenKind::String => format!("string {}", self.value),
            TokenKind::Int | TokenKind::Float => format!("number {}", self.value),
            _ => format!("'{}'", self.value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Output of [`tokenize`].
pub struct Lexed {
    /// Tokens of the expression, always terminated by one [`TokenKind::End`].
    pub tokens: Vec<Token>,
    /// Byte offset just past the closing `}}`, or the input length when the
    /// input ended without one.
    pub end: usize,
}

/// Tokenizes the interior of a `${{ ... }}` expression. Lexing stops at the
/// first `}}` outside a string literal or at the end of `input`.
pub fn tokenize(input: &str) -> Result<Lexed, LexError> {
    let lexed = Lexer { src: input, pos: 0 }.run();
    match &lexed {
        Ok(l) => log::trace!("lexed {} tokens ending at {}", l.tokens.len(), l.end),
        Err(e) => log::debug!("lex error: {e}"),
    }
    lexed
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn run(mut self) -> Result<Lexed, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            if self.pos >= self.src.len() {
                tokens.push(self.token(TokenKind::End, self.pos, self.pos));
                return Ok(Lexed {
                    tokens,
                    end: self.src.len(),
                });
            }
            if self.rest().starts_with("}}") {
                tokens.push(self.token(TokenKind::End, self.pos, self.pos));
                return Ok(Lexed {
                    tokens,
                    end: self.pos + 2,
                });
            }

            let start = self.pos;
            let b = self.byte_at(start).unwrap_or(0);
            let token = match b {
                b'(' => self.punct(TokenKind::LeftParen, 1),
                b')' => self.punct(TokenKind::RightParen, 1),
                b'[' => self.punct(TokenKind::LeftBracket, 1),
                b']' => self.punct(TokenKind::RightBracket, 1),
                b'.' => self.punct(TokenKind::Dot, 1),
                b'*' => self.punct(TokenKind::Star, 1),
                b',' => self.punct(TokenKind::Comma, 1),
                b'<' if self.next_is(b'=') => self.punct(TokenKind::LessEq, 2),
                b'<' => self.punct(TokenKind::Less, 1),
                b'>' if self.next_is(b'=') => self.punct(TokenKind::GreaterEq, 2),
                b'>' => self.punct(TokenKind::Greater, 1),
                b'!' if self.next_is(b'=') => self.punct(TokenKind::NotEq, 2),
                b'!' => self.punct(TokenKind::Not, 1),
                b'=' if self.next_is(b'=') => self.punct(TokenKind::Eq, 2),
                b'&' if self.next_is(b'&') => self.punct(TokenKind::And, 2),
                b'|' if self.next_is(b'|') => self.punct(TokenKind::Or, 2),
                b'\'' => self.string()?,
                b'-' | b'0'..=b'9' => self.number()?,
                c if is_ident_start(c) => self.ident(),
                _ => {
                    let ch = self.rest().chars().next().unwrap_or('\0');
                    return Err(LexError::UnexpectedChar { ch, offset: start });
                }
            };
            tokens.push(token);
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn byte_at(&self, idx: usize) -> Option<u8> {
        self.src.as_bytes().get(idx).copied()
    }

    fn next_is(&self, b: u8) -> bool {
        self.byte_at(self.pos + 1) == Some(b)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.byte_at(self.pos), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    fn token(&self, kind: TokenKind, start: usize, end: usize) -> Token {
        Token {
            kind,
            value: self.src[start..end].to_string(),
            offset: start,
        }
    }

    fn punct(&mut self, kind: TokenKind, len: usize) -> Token {
        let start = self.pos;
        self.pos += len;
        self.token(kind, start, self.pos)
    }

    fn ident(&mut self) -> Token {
        let start = self.pos;
        self.pos += 1;
        while self.byte_at(self.pos).is_some_and(is_ident_continue) {
            self.pos += 1;
        }
        self.token(TokenKind::Ident, start, self.pos)
    }

    // A quote byte never occurs inside a multi-byte UTF-8 sequence, so
    // scanning bytes keeps every slice on a char boundary.
    fn string(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let mut i = start + 1;
        loop {
            match self.src.as_bytes()[i..].iter().position(|&b| b == b'\'') {
                None => return Err(LexError::UnterminatedString { offset: start }),
                Some(rel) => {
                    let quote = i + rel;
                    if self.byte_at(quote + 1) == Some(b'\'') {
                        i = quote + 2;
                    } else {
                        self.pos = quote + 1;
                        return Ok(self.token(TokenKind::String, start, self.pos));
                    }
                }
            }
        }
    }

    fn number(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let malformed = |message: &str| LexError::MalformedNumber {
            offset: start,
            message: message.to_string(),
        };
        let is_digit = |b: Option<u8>| b.is_some_and(|b| b.is_ascii_digit());

        let mut i = start;
        if self.byte_at(i) == Some(b'-') {
            i += 1;
            if !is_digit(self.byte_at(i)) {
                return Err(malformed("expected digit after '-'"));
            }
        }

        let mut kind = TokenKind::Int;
        if self.byte_at(i) == Some(b'0') && matches!(self.byte_at(i + 1), Some(b'x' | b'X')) {
            i += 2;
            let digits = i;
            while self.byte_at(i).is_some_and(|b| b.is_ascii_hexdigit()) {
                i += 1;
            }
            if i == digits {
                return Err(malformed("expected hex digit after '0x'"));
            }
        } else {
            if self.byte_at(i) == Some(b'0') {
                i += 1;
            } else {
                while is_digit(self.byte_at(i)) {
                    i += 1;
                }
            }
            if self.byte_at(i) == Some(b'.') && is_digit(self.byte_at(i + 1)) {
                i += 1;
                while is_digit(self.byte_at(i)) {
                    i += 1;
                }
                kind = TokenKind::Float;
            }
            if matches!(self.byte_at(i), Some(b'e' | b'E')) {
                i += 1;
                if matches!(self.byte_at(i), Some(b'+' | b'-')) {
                    i += 1;
                }
                let digits = i;
                while is_digit(self.byte_at(i)) {
                    i += 1;
                }
                if i == digits {
                    return Err(malformed("expected digit in exponent part"));
                }
                kind = TokenKind::Float;
            }
        }

        if self.byte_at(i).is_some_and(is_ident_continue) {
            return Err(malformed("unexpected character after number"));
        }

        self.pos = i;
        Ok(self.token(kind, start, i))
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .tokens
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn operators_use_longest_match() {
        assert_eq!(
            kinds("< <= > >= == != ! && ||"),
            vec![
                TokenKind::Less,
                TokenKind::LessEq,
                TokenKind::Greater,
                TokenKind::GreaterEq,
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::Not,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn dot_after_integer_without_digits_is_separate() {
        assert_eq!(
            kinds("1.foo"),
            vec![
                TokenKind::Int,
                TokenKind::Dot,
                TokenKind::Ident,
                TokenKind::End
            ]
        );
    }

    #[test]
    fn identifiers_may_contain_dashes() {
        let lexed = tokenize("steps.my-step_1.outputs").unwrap();
        assert_eq!(lexed.tokens[2].value, "my-step_1");
        assert_eq!(lexed.tokens[2].offset, 6);
    }
}
