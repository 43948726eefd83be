//! Tokenizer and parser of the infix expression language.

mod ast;
pub(crate) mod cursor;
mod error;
pub(crate) mod grammar;
pub(crate) mod lexer;
pub(crate) mod syntax;

pub use ast::Node;
pub use error::ParseError;

/// Parse an expression into its syntax tree.
///
/// # Errors
///
/// Returns [`ParseError`] with the byte position of the offending input when
/// the text does not tokenize or parse, or nests deeper than `max_depth`.
pub fn parse_expression(input: &str, max_depth: usize) -> Result<Node, ParseError> {
    let tokens = lexer::tokenize(input, lexer::EXPRESSION_SYMBOLS)?;
    grammar::parse_tokens(&tokens, input.len(), max_depth)
}
