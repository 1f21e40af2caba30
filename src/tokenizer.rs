//! Flat token lists
//!
//! Drives the [`Scanner`] directly, with no grammar knowledge, and buffers what it
//! finds into entries shaped like [`Script::tokens`](crate::ast::Script::tokens).

use std::collections::VecDeque;

use serde::Serialize;

use crate::ast::{CommentKind, CommentNode, NodeLocation, Position, SourceLocation, TokenEntry};
use crate::config::ParseOptions;
use crate::error::{ErrorHandler, ParseError};
use crate::scanner::Scanner;

/// One entry of a token list: a token, or a comment when comments are collected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TokenItem {
    Comment(CommentNode),
    Token(TokenEntry),
}

/// Result of [`tokenize`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenList {
    pub tokens: Vec<TokenItem>,
    /// Present only in tolerant mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ParseError>>,
}

/// Iterator over the tokens (and comments) of a source text
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    range: bool,
    loc: bool,
    buffer: VecDeque<TokenItem>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str, options: &ParseOptions) -> Self {
        let mut scanner = Scanner::new(source, ErrorHandler::new(options.tolerant));
        scanner.track_comment = options.comment;
        Self {
            scanner,
            range: options.range,
            loc: options.loc,
            buffer: VecDeque::new(),
        }
    }

    pub fn errors(&self) -> &[ParseError] {
        self.scanner.error_handler().errors()
    }

    fn scan_position(&self) -> Position {
        Position {
            line: self.scanner.line_number(),
            column: self.scanner.index() - self.scanner.line_start(),
        }
    }

    fn fill_buffer(&mut self) -> Result<(), ParseError> {
        let source = self.scanner.source();
        for comment in self.scanner.scan_comments() {
            self.buffer.push_back(TokenItem::Comment(CommentNode {
                kind: CommentKind::Line,
                value: source
                    .get(comment.slice.0..comment.slice.1)
                    .unwrap_or_default()
                    .to_string(),
                location: NodeLocation {
                    range: self.range.then_some([comment.range.0, comment.range.1]),
                    loc: self.loc.then_some(SourceLocation {
                        start: comment.loc.start,
                        end: comment.loc.end,
                        source: None,
                    }),
                },
            }));
        }

        if self.scanner.eof() {
            return Ok(());
        }

        let start = self.scan_position();
        let token = self.scanner.lex()?;
        let end = self.scan_position();
        self.buffer.push_back(TokenItem::Token(TokenEntry {
            token_type: token.token_type.name(),
            value: source
                .get(token.start..token.end)
                .unwrap_or_default()
                .to_string(),
            location: NodeLocation {
                range: self.range.then_some([token.start, token.end]),
                loc: self.loc.then_some(SourceLocation {
                    start,
                    end,
                    source: None,
                }),
            },
        }));
        Ok(())
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<TokenItem, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty()
            && let Err(err) = self.fill_buffer()
        {
            return Some(Err(err));
        }
        self.buffer.pop_front().map(Ok)
    }
}

/// Split `source` into a flat token list.
///
/// A scanner error ends the list. In tolerant mode it is recorded in
/// [`TokenList::errors`] and the tokens read so far are returned; otherwise it is raised.
pub fn tokenize(source: &str, options: &ParseOptions) -> Result<TokenList, ParseError> {
    let mut tokenizer = Tokenizer::new(source, options);
    let mut tokens = Vec::new();

    let failure = loop {
        match tokenizer.next() {
            Some(Ok(item)) => tokens.push(item),
            Some(Err(err)) => break Some(err),
            None => break None,
        }
    };

    let Tokenizer { scanner, .. } = tokenizer;
    let mut error_handler = scanner.into_error_handler();
    if let Some(err) = failure {
        error_handler.tolerate(err)?;
    }

    Ok(TokenList {
        tokens,
        errors: options
            .tolerant
            .then(|| error_handler.into_errors()),
    })
}
