//! Scanner and parser for a small Ruby-flavored scripting language
//!
//! Produces an ESTree-shaped syntax tree that serializes straight to JSON.
//!
//! # Example
//!
//! ```
//! use rbparse::{ParseOptions, parse};
//! use rbparse::ast::{Expression, Statement};
//!
//! let script = parse("1 + 2 * 3", &ParseOptions::default()).unwrap();
//! let Statement::Expression(stmt) = &script.body[0] else { panic!() };
//! assert!(matches!(stmt.expression, Expression::Binary(_)));
//! ```

pub mod ast;
pub mod config;
pub mod error;
pub mod parser;
pub mod scanner;
pub mod tokenizer;

pub use ast::{Node, NodeMetadata, Script};
pub use config::ParseOptions;
pub use error::{ErrorHandler, ParseError};
pub use parser::Parser;
pub use scanner::{RawToken, Scanner, ScannerState, TokenType, TokenValue};
pub use tokenizer::{TokenItem, TokenList, Tokenizer, tokenize};

/// Parse `source` into a [`Script`].
///
/// In tolerant mode recoverable errors are collected in `Script::errors`; any other
/// error aborts the parse and is returned.
pub fn parse(source: &str, options: &ParseOptions) -> Result<Script, ParseError> {
    Parser::new(source, options.clone()).parse_script()
}

/// Like [`parse`], calling `delegate` for every finished node.
///
/// Children are reported before their parents, and the [`Script`] last. With
/// `options.comment` set each comment is reported as it is passed over.
pub fn parse_with_delegate<'a, F>(
    source: &'a str,
    options: &ParseOptions,
    delegate: F,
) -> Result<Script, ParseError>
where
    F: FnMut(Node<'_>, &NodeMetadata) + 'a,
{
    Parser::new(source, options.clone())
        .with_delegate(Box::new(delegate))
        .parse_script()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_delegate_sees_children_first() {
        let mut seen = Vec::new();
        parse_with_delegate("x = 1", &ParseOptions::default(), |node, _| {
            seen.push(node.node_type());
        })
        .unwrap();
        assert_eq!(
            seen,
            vec![
                "Identifier",
                "Literal",
                "AssignmentExpression",
                "ExpressionStatement",
                "Script"
            ]
        );
    }

    #[test]
    fn test_delegate_metadata_ignores_options() {
        let mut spans = Vec::new();
        let script = parse_with_delegate("  abc", &ParseOptions::default(), |node, meta| {
            if let Node::Identifier(_) = node {
                spans.push((meta.start.offset, meta.end.offset, meta.start.column));
            }
        })
        .unwrap();
        assert_eq!(spans, vec![(2, 5, 2)]);
        assert!(script.location.range.is_none());
    }
}
