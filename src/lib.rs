pub mod availability;
pub mod error;
pub mod expr;

pub use availability::{
    context_availability, is_valid_name, special_function_keys, special_function_names,
    workflow_keys,
};
pub use error::{ExprError, LexError, ParseError, Position};
pub use expr::ast::{visit, CompareOpKind, ExprNode, LogicalOpKind};
pub use expr::lexer::{tokenize, Lexed, Token, TokenKind};
pub use expr::parse_expression;
pub use expr::parser::{parse, Parser, ParserOptions};
