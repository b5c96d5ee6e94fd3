use workflow_expr::{tokenize, LexError, TokenKind};

fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input)
        .unwrap()
        .tokens
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn stops_at_closing_braces() {
    let lexed = tokenize("a }} b").unwrap();
    assert_eq!(lexed.tokens.len(), 2);
    assert_eq!(lexed.tokens[0].kind, TokenKind::Ident);
    assert_eq!(lexed.tokens[1].kind, TokenKind::End);
    assert_eq!(lexed.tokens[1].offset, 2);
    assert_eq!(lexed.end, 4);
}

#[test]
fn end_of_input_terminates_without_braces() {
    let lexed = tokenize("github.ref").unwrap();
    assert_eq!(lexed.end, 10);
    let last = lexed.tokens.last().unwrap();
    assert_eq!(last.kind, TokenKind::End);
    assert_eq!(last.offset, 10);
}

#[test]
fn braces_inside_string_do_not_end_expression() {
    let lexed = tokenize("'}}' }}").unwrap();
    assert_eq!(lexed.tokens[0].kind, TokenKind::String);
    assert_eq!(lexed.tokens[0].value, "'}}'");
    assert_eq!(lexed.tokens[1].offset, 5);
    assert_eq!(lexed.end, 7);
}

#[test]
fn string_keeps_raw_lexeme() {
    let lexed = tokenize("'it''s'").unwrap();
    assert_eq!(lexed.tokens[0].value, "'it''s'");
    assert_eq!(lexed.tokens[1].kind, TokenKind::End);
}

#[test]
fn offsets_are_bytes() {
    let lexed = tokenize("'é' == x").unwrap();
    let offsets: Vec<usize> = lexed.tokens.iter().map(|t| t.offset).collect();
    assert_eq!(offsets, vec![0, 5, 8, 9]);
}

#[test]
fn distinguishes_integer_and_float_lexically() {
    assert_eq!(
        kinds("0x1F 10 1.5 2e3 -7 -0.5E+2 0"),
        vec![
            TokenKind::Int,
            TokenKind::Int,
            TokenKind::Float,
            TokenKind::Float,
            TokenKind::Int,
            TokenKind::Float,
            TokenKind::Int,
            TokenKind::End,
        ]
    );
}

#[test]
fn lexes_punctuation() {
    assert_eq!(
        kinds("f(a[0].*, !b)"),
        vec![
            TokenKind::Ident,
            TokenKind::LeftParen,
            TokenKind::Ident,
            TokenKind::LeftBracket,
            TokenKind::Int,
            TokenKind::RightBracket,
            TokenKind::Dot,
            TokenKind::Star,
            TokenKind::Comma,
            TokenKind::Not,
            TokenKind::Ident,
            TokenKind::RightParen,
            TokenKind::End,
        ]
    );
}

#[test]
fn rejects_unterminated_strings() {
    assert_eq!(
        tokenize("'abc").unwrap_err(),
        LexError::UnterminatedString { offset: 0 }
    );
    assert_eq!(
        tokenize("a == 'it''").unwrap_err(),
        LexError::UnterminatedString { offset: 5 }
    );
    assert_eq!(
        tokenize("'abc }}").unwrap_err(),
        LexError::UnterminatedString { offset: 0 }
    );
}

#[test]
fn rejects_malformed_numbers() {
    for (input, offset) in [
        ("1e", 0),
        ("1e+", 0),
        ("-", 0),
        ("a == - 1", 5),
        ("0x", 0),
        ("0xg", 0),
        ("12abc", 0),
        ("01", 0),
    ] {
        match tokenize(input).unwrap_err() {
            LexError::MalformedNumber { offset: got, .. } => {
                assert_eq!(got, offset, "input: {input}")
            }
            other => panic!("input {input}: expected malformed number, got {other:?}"),
        }
    }
}

#[test]
fn rejects_unknown_characters() {
    assert_eq!(
        tokenize("a = b").unwrap_err(),
        LexError::UnexpectedChar { ch: '=', offset: 2 }
    );
    assert_eq!(
        tokenize("a & b").unwrap_err(),
        LexError::UnexpectedChar { ch: '&', offset: 2 }
    );
    assert_eq!(
        tokenize("a } b").unwrap_err(),
        LexError::UnexpectedChar { ch: '}', offset: 2 }
    );
    assert_eq!(
        tokenize("x == €").unwrap_err(),
        LexError::UnexpectedChar { ch: '€', offset: 5 }
    );

    let err = tokenize("a | b").unwrap_err();
    assert_eq!(err.offset(), 2);
    assert!(err.to_string().contains("unexpected character '|'"));
}
