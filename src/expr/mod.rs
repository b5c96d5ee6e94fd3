//! Expression language embedded as `${{ ... }}` in workflow files.

/// AST node definitions and traversal.
pub mod ast;
/// Tokenizer for expression source text.
pub mod lexer;
/// Parser producing [`ast::ExprNode`].
pub mod parser;

use crate::error::ExprError;

/// Lexes and parses the interior of an expression. Input may carry the
/// closing `}}`; anything after it is ignored.
pub fn parse_expression(input: &str) -> Result<ast::ExprNode, ExprError> {
    let lexed = lexer::tokenize(input)?;
    Ok(parser::parse(&lexed.tokens)?)
}
