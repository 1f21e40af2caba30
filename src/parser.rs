//! Parser for script source text
//!
//! Recursive descent over a single token of lookahead, with an explicit operator stack
//! for binary expressions. Productions that could later be reinterpreted as binding
//! patterns run under the cover grammar wrappers ([`Parser::isolate_cover_grammar`],
//! [`Parser::inherit_cover_grammar`]) so no backtracking is needed.

use rustc_hash::FxHashSet;

use crate::ast::*;
use crate::config::ParseOptions;
use crate::error::{ErrorHandler, ParseError, messages};
use crate::scanner::{RawToken, Scanner, TokenType, TokenValue};

/// Callback invoked once per finished node (and per comment when comments are collected)
pub type Delegate<'a> = Box<dyn FnMut(Node<'_>, &NodeMetadata) + 'a>;

/// Where a node's source span begins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub index: usize,
    pub line: usize,
    pub column: usize,
}

/// Cover grammar flags for the production being parsed
#[derive(Debug, Clone)]
struct CoverGrammar {
    is_assignment_target: bool,
    is_binding_element: bool,
    /// Deferred diagnostic for shorthand initializers. Nothing in this grammar records one.
    first_cover_initialized_name_error: Option<RawToken>,
}

impl CoverGrammar {
    fn permissive() -> Self {
        Self {
            is_assignment_target: true,
            is_binding_element: true,
            first_cover_initialized_name_error: None,
        }
    }

    fn clear(&mut self) {
        self.is_assignment_target = false;
        self.is_binding_element = false;
    }
}

/// Parser-wide scratch state for one parse
#[derive(Debug)]
struct Context {
    cover: CoverGrammar,
    in_function_body: bool,
    in_iteration: bool,
    label_set: FxHashSet<String>,
}

/// Binary operator found on the precedence stack
#[derive(Debug, Clone, Copy)]
enum InfixOp {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

fn binary_precedence(token: &RawToken) -> Option<(InfixOp, u8)> {
    let text = token.value.as_str()?;
    match token.token_type {
        TokenType::Punctuator => {
            let precedence = match text {
                "||" => 1,
                "&&" => 2,
                "|" => 3,
                "^" => 4,
                "&" => 5,
                "==" | "!=" => 6,
                "<" | ">" | "<=" | ">=" => 7,
                "<<" | ">>" | ">>>" => 8,
                "+" | "-" => 9,
                "*" | "/" | "%" => 11,
                _ => return None,
            };
            let op = match LogicalOp::from_punctuator(text) {
                Some(op) => InfixOp::Logical(op),
                None => InfixOp::Binary(BinaryOp::from_punctuator(text)?),
            };
            Some((op, precedence))
        }
        TokenType::Keyword if text == "instanceof" => {
            Some((InfixOp::Binary(BinaryOp::Instanceof), 7))
        }
        _ => None,
    }
}

fn is_identifier(token: &RawToken, name: &str) -> bool {
    token.token_type == TokenType::Identifier && token.value.as_str() == Some(name)
}

/// Parser for script source text
pub struct Parser<'a> {
    scanner: Scanner<'a>,
    config: ParseOptions,
    delegate: Option<Delegate<'a>>,
    context: Context,
    lookahead: RawToken,
    has_line_terminator: bool,
    start_marker: Marker,
    last_marker: Marker,
    tokens: Vec<TokenEntry>,
    comments: Vec<CommentNode>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, config: ParseOptions) -> Self {
        let mut scanner = Scanner::new(source, ErrorHandler::new(config.tolerant));
        scanner.track_comment = config.comment;
        let line = scanner.line_number();
        let marker = Marker {
            index: 0,
            line,
            column: 0,
        };

        Self {
            scanner,
            config,
            delegate: None,
            context: Context {
                cover: CoverGrammar::permissive(),
                in_function_body: false,
                in_iteration: false,
                label_set: FxHashSet::default(),
            },
            lookahead: RawToken {
                token_type: TokenType::Eof,
                value: TokenValue::Text(String::new()),
                line_number: line,
                line_start: 0,
                start: 0,
                end: 0,
            },
            has_line_terminator: false,
            start_marker: marker,
            last_marker: marker,
            tokens: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// Report every finished node to `delegate`.
    pub fn with_delegate(mut self, delegate: Delegate<'a>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// Parse a complete script
    pub fn parse_script(mut self) -> Result<Script, ParseError> {
        self.next_token()?;
        self.last_marker = Marker {
            index: self.scanner.index(),
            line: self.scanner.line_number(),
            column: self.scanner.index() - self.scanner.line_start(),
        };

        let node = self.create_node();
        let mut body = Vec::new();
        while self.lookahead.token_type != TokenType::Eof {
            body.push(self.parse_statement_list_item()?);
        }

        let mut script = self.finalize(
            node,
            Script {
                body,
                source_type: SourceType::Script,
                location: NodeLocation::default(),
                comments: None,
                tokens: None,
                errors: None,
            },
        );

        let Parser {
            scanner,
            config,
            tokens,
            comments,
            ..
        } = self;
        if config.comment {
            script.comments = Some(comments);
        }
        if config.tokens {
            script.tokens = Some(tokens);
        }
        if config.tolerant {
            script.errors = Some(scanner.into_error_handler().into_errors());
        }
        Ok(script)
    }

    // ============ TOKEN STREAM ============

    fn source_text(&self, start: usize, end: usize) -> &'a str {
        self.scanner.source().get(start..end).unwrap_or_default()
    }

    fn scanner_marker(&self) -> Marker {
        Marker {
            index: self.scanner.index(),
            line: self.scanner.line_number(),
            column: self.scanner.index() - self.scanner.line_start(),
        }
    }

    fn collect_comments(&mut self) {
        for comment in self.scanner.scan_comments() {
            let node = CommentNode {
                kind: CommentKind::Line,
                value: self
                    .source_text(comment.slice.0, comment.slice.1)
                    .to_string(),
                location: NodeLocation {
                    range: self.config.range.then_some([comment.range.0, comment.range.1]),
                    loc: self.config.loc.then(|| SourceLocation {
                        start: comment.loc.start,
                        end: comment.loc.end,
                        source: self.config.source.clone(),
                    }),
                },
            };
            if let Some(delegate) = self.delegate.as_mut() {
                let metadata = NodeMetadata {
                    start: MetadataPosition {
                        line: comment.loc.start.line,
                        column: comment.loc.start.column,
                        offset: comment.range.0,
                    },
                    end: MetadataPosition {
                        line: comment.loc.end.line,
                        column: comment.loc.end.column,
                        offset: comment.range.1,
                    },
                };
                delegate(Node::from(&node), &metadata);
            }
            self.comments.push(node);
        }
    }

    fn token_entry(&self, token: &RawToken) -> TokenEntry {
        TokenEntry {
            token_type: token.token_type.name(),
            value: self.source_text(token.start, token.end).to_string(),
            location: NodeLocation {
                range: self.config.range.then_some([token.start, token.end]),
                loc: self.config.loc.then(|| SourceLocation {
                    start: Position {
                        line: self.start_marker.line,
                        column: self.start_marker.column,
                    },
                    end: Position {
                        line: self.scanner.line_number(),
                        column: self.scanner.index() - self.scanner.line_start(),
                    },
                    source: self.config.source.clone(),
                }),
            },
        }
    }

    /// Shift the lookahead out and scan the token after it.
    fn next_token(&mut self) -> Result<RawToken, ParseError> {
        self.last_marker = self.scanner_marker();
        self.collect_comments();
        if self.scanner.index() != self.start_marker.index {
            self.start_marker = self.scanner_marker();
        }

        let next = self.scanner.lex()?;
        self.has_line_terminator = self.lookahead.line_number != next.line_number;
        if self.config.tokens && next.token_type != TokenType::Eof {
            let entry = self.token_entry(&next);
            self.tokens.push(entry);
        }
        Ok(std::mem::replace(&mut self.lookahead, next))
    }

    fn create_node(&self) -> Marker {
        self.start_marker
    }

    fn start_node(token: &RawToken) -> Marker {
        Marker {
            index: token.start,
            line: token.line_number,
            column: token.start - token.line_start,
        }
    }

    /// Stamp the span from `marker` to the end of the last consumed token and report the node.
    fn finalize<T>(&mut self, marker: Marker, mut node: T) -> T
    where
        T: Located,
        for<'n> Node<'n>: From<&'n T>,
    {
        let end = self.last_marker;
        let location = node.location_mut();
        if self.config.range {
            location.range = Some([marker.index, end.index]);
        }
        if self.config.loc {
            location.loc = Some(SourceLocation {
                start: Position {
                    line: marker.line,
                    column: marker.column,
                },
                end: Position {
                    line: end.line,
                    column: end.column,
                },
                source: self.config.source.clone(),
            });
        }

        if let Some(delegate) = self.delegate.as_mut() {
            let metadata = NodeMetadata {
                start: MetadataPosition {
                    line: marker.line,
                    column: marker.column,
                    offset: marker.index,
                },
                end: MetadataPosition {
                    line: end.line,
                    column: end.column,
                    offset: end.index,
                },
            };
            delegate(Node::from(&node), &metadata);
        }
        node
    }

    // ============ DIAGNOSTICS ============

    fn marker_error(&self, description: String) -> ParseError {
        ErrorHandler::create_error(
            self.last_marker.index,
            self.last_marker.line,
            self.last_marker.column + 1,
            description,
        )
    }

    fn throw_error<T>(&self, description: String) -> Result<T, ParseError> {
        Err(self.marker_error(description))
    }

    fn tolerate_error(&mut self, description: String) -> Result<(), ParseError> {
        let error = self.marker_error(description);
        self.scanner.error_handler.tolerate(error)
    }

    fn unexpected_token_error(&self, token: &RawToken, message: Option<&str>) -> ParseError {
        let template = message.unwrap_or(match token.token_type {
            TokenType::Eof => messages::UNEXPECTED_EOS,
            TokenType::Identifier => messages::UNEXPECTED_IDENTIFIER,
            TokenType::NumericLiteral => messages::UNEXPECTED_NUMBER,
            TokenType::StringLiteral => messages::UNEXPECTED_STRING,
            TokenType::Keyword => messages::UNEXPECTED_RESERVED,
            _ => messages::UNEXPECTED_TOKEN,
        });
        let description = messages::format(template, &[&token.display_value()]);

        let line_start = self.last_marker.index - self.last_marker.column;
        ErrorHandler::create_error(
            token.start,
            token.line_number,
            token.start.saturating_sub(line_start) + 1,
            description,
        )
    }

    fn throw_unexpected_token<T>(&self, token: &RawToken) -> Result<T, ParseError> {
        Err(self.unexpected_token_error(token, None))
    }

    fn tolerate_unexpected_token(
        &mut self,
        token: &RawToken,
        message: Option<&str>,
    ) -> Result<(), ParseError> {
        let error = self.unexpected_token_error(token, message);
        self.scanner.error_handler.tolerate(error)
    }

    // ============ HELPERS ============

    fn match_punct(&self, text: &str) -> bool {
        self.lookahead.is_punctuator(text)
    }

    fn match_keyword(&self, text: &str) -> bool {
        self.lookahead.is_keyword(text)
    }

    fn match_assign(&self) -> Option<AssignmentOp> {
        if self.lookahead.token_type != TokenType::Punctuator {
            return None;
        }
        AssignmentOp::from_punctuator(self.lookahead.value.as_str()?)
    }

    /// Consume the punctuator `text` or fail on whatever token is there instead.
    fn expect(&mut self, text: &str) -> Result<(), ParseError> {
        let token = self.next_token()?;
        if !token.is_punctuator(text) {
            return self.throw_unexpected_token(&token);
        }
        Ok(())
    }

    fn expect_keyword(&mut self, text: &str) -> Result<(), ParseError> {
        let token = self.next_token()?;
        if !token.is_keyword(text) {
            return self.throw_unexpected_token(&token);
        }
        Ok(())
    }

    /// Expect a `,`. Tolerant mode records a missing comma (or a stray `;`) and carries on.
    fn expect_comma_separator(&mut self) -> Result<(), ParseError> {
        if !self.scanner.error_handler.is_tolerant() {
            return self.expect(",");
        }

        let token = self.lookahead.clone();
        if token.is_punctuator(",") {
            self.next_token()?;
        } else if token.is_punctuator(";") {
            self.next_token()?;
            self.tolerate_unexpected_token(&token, None)?;
        } else {
            self.tolerate_unexpected_token(&token, Some(messages::UNEXPECTED_TOKEN))?;
        }
        Ok(())
    }

    /// Statement terminator: an explicit `;`, a line break, a closing `}` or end of input.
    fn consume_semicolon(&mut self) -> Result<(), ParseError> {
        let at_semicolon = self
            .scanner
            .source()
            .as_bytes()
            .get(self.start_marker.index)
            .is_some_and(|byte| *byte == b';');

        if at_semicolon || self.match_punct(";") {
            self.next_token()?;
        } else if !self.has_line_terminator {
            if self.lookahead.token_type != TokenType::Eof && !self.match_punct("}") {
                return self.throw_unexpected_token(&self.lookahead);
            }
            self.last_marker = self.start_marker;
        }
        Ok(())
    }

    /// Peek past the lookahead: does the next token start a binding?
    ///
    /// Scanner state and tolerated errors are rolled back whatever the outcome.
    fn peek_binding_start(&mut self, same_line: bool) -> Result<bool, ParseError> {
        let state = self.scanner.save_state();
        let checkpoint = self.scanner.error_handler.checkpoint();
        self.scanner.scan_comments();
        let next = self.scanner.lex();
        self.scanner.restore_state(state);
        self.scanner.error_handler.rollback(checkpoint);

        let next = next?;
        if same_line && next.line_number != self.lookahead.line_number {
            return Ok(false);
        }
        Ok(next.token_type == TokenType::Identifier
            || next.is_punctuator("[")
            || next.is_punctuator("{")
            || next.is_keyword("let"))
    }

    // ============ COVER GRAMMAR ============

    /// Run `parse` with fresh cover flags and restore the caller's flags afterwards.
    fn isolate_cover_grammar<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let previous = std::mem::replace(&mut self.context.cover, CoverGrammar::permissive());
        let result = parse(self)?;
        if let Some(token) = self.context.cover.first_cover_initialized_name_error.take() {
            return self.throw_unexpected_token(&token);
        }
        self.context.cover = previous;
        Ok(result)
    }

    /// Run `parse` with fresh cover flags and merge its flags into the caller's.
    fn inherit_cover_grammar<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let previous = std::mem::replace(&mut self.context.cover, CoverGrammar::permissive());
        let result = parse(self)?;
        let inner = std::mem::replace(&mut self.context.cover, previous);
        let cover = &mut self.context.cover;
        cover.is_binding_element &= inner.is_binding_element;
        cover.is_assignment_target &= inner.is_assignment_target;
        if cover.first_cover_initialized_name_error.is_none() {
            cover.first_cover_initialized_name_error = inner.first_cover_initialized_name_error;
        }
        Ok(result)
    }

    // ============ EXPRESSIONS ============

    fn parse_identifier_token(&mut self, marker: Marker, token: &RawToken) -> Identifier {
        self.finalize(
            marker,
            Identifier {
                name: token.display_value(),
                location: NodeLocation::default(),
            },
        )
    }

    fn parse_primary_expression(&mut self) -> Result<Expression, ParseError> {
        let node = self.create_node();

        match self.lookahead.token_type {
            TokenType::Identifier => {
                let token = self.next_token()?;
                Ok(Expression::Identifier(
                    self.parse_identifier_token(node, &token),
                ))
            }
            TokenType::NumericLiteral
            | TokenType::StringLiteral
            | TokenType::BooleanLiteral
            | TokenType::NullLiteral => {
                self.context.cover.clear();
                let token = self.next_token()?;
                let raw = self.source_text(token.start, token.end).to_string();
                let value = match (token.token_type, token.value) {
                    (TokenType::BooleanLiteral, _) => LiteralValue::Boolean(raw == "true"),
                    (TokenType::NullLiteral, _) => LiteralValue::Null,
                    (_, TokenValue::Number(n)) => LiteralValue::Number(n),
                    (_, TokenValue::Text(text)) => LiteralValue::String(text),
                };
                Ok(Expression::Literal(self.finalize(
                    node,
                    Literal {
                        value,
                        raw,
                        location: NodeLocation::default(),
                    },
                )))
            }
            TokenType::Punctuator if self.match_punct("(") => {
                self.context.cover.is_binding_element = false;
                self.inherit_cover_grammar(Self::parse_group_expression)
            }
            TokenType::Keyword if self.match_keyword("function") => {
                Ok(Expression::Function(self.parse_function_expression()?))
            }
            // `let` without a binding after it names a variable.
            TokenType::Keyword if self.match_keyword("let") => {
                let token = self.next_token()?;
                Ok(Expression::Identifier(
                    self.parse_identifier_token(node, &token),
                ))
            }
            _ => {
                let token = self.next_token()?;
                self.throw_unexpected_token(&token)
            }
        }
    }

    /// `( expr )` or `( expr, expr, ... )`. An empty `()` is an error.
    fn parse_group_expression(&mut self) -> Result<Expression, ParseError> {
        self.expect("(")?;
        if self.match_punct(")") {
            let token = self.next_token()?;
            return self.throw_unexpected_token(&token);
        }

        let start_token = self.lookahead.clone();
        let mut expr = self.inherit_cover_grammar(Self::parse_assignment_expression)?;
        if self.match_punct(",") {
            let mut expressions = vec![expr];
            self.context.cover.is_assignment_target = false;
            while self.lookahead.token_type != TokenType::Eof {
                if !self.match_punct(",") {
                    break;
                }
                self.next_token()?;
                expressions.push(self.inherit_cover_grammar(Self::parse_assignment_expression)?);
            }
            expr = Expression::Sequence(self.finalize(
                Self::start_node(&start_token),
                SequenceExpression {
                    expressions,
                    location: NodeLocation::default(),
                },
            ));
        }

        self.expect(")")?;
        Ok(expr)
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expression>, ParseError> {
        self.expect("(")?;
        let mut args = Vec::new();
        if !self.match_punct(")") {
            loop {
                args.push(self.isolate_cover_grammar(Self::parse_assignment_expression)?);
                if self.match_punct(")") {
                    break;
                }
                self.expect_comma_separator()?;
                if self.match_punct(")") {
                    break;
                }
            }
        }
        self.expect(")")?;
        Ok(args)
    }

    fn parse_left_hand_side_expression_allow_call(&mut self) -> Result<Expression, ParseError> {
        let start_token = self.lookahead.clone();
        let mut expr = self.inherit_cover_grammar(Self::parse_primary_expression)?;

        while self.match_punct("(") {
            self.context.cover.clear();
            let arguments = self.parse_arguments()?;
            expr = Expression::Call(self.finalize(
                Self::start_node(&start_token),
                CallExpression {
                    callee: Box::new(expr),
                    arguments,
                    location: NodeLocation::default(),
                },
            ));
        }

        Ok(expr)
    }

    fn match_update_operator(&self) -> Option<UpdateOp> {
        if self.lookahead.token_type != TokenType::Punctuator {
            return None;
        }
        UpdateOp::from_punctuator(self.lookahead.value.as_str()?)
    }

    fn parse_update_expression(&mut self) -> Result<Expression, ParseError> {
        let start_token = self.lookahead.clone();

        if let Some(operator) = self.match_update_operator() {
            let node = Self::start_node(&start_token);
            self.next_token()?;
            let argument = self.inherit_cover_grammar(Self::parse_unary_expression)?;
            if !self.context.cover.is_assignment_target {
                self.tolerate_error(messages::INVALID_LHS_IN_ASSIGNMENT.to_string())?;
            }
            let expr = self.finalize(
                node,
                UpdateExpression {
                    operator,
                    argument: Box::new(argument),
                    prefix: true,
                    location: NodeLocation::default(),
                },
            );
            self.context.cover.clear();
            return Ok(Expression::Update(expr));
        }

        let mut expr = self.inherit_cover_grammar(Self::parse_left_hand_side_expression_allow_call)?;
        if !self.has_line_terminator
            && let Some(operator) = self.match_update_operator()
        {
            if !self.context.cover.is_assignment_target {
                self.tolerate_error(messages::INVALID_LHS_IN_ASSIGNMENT.to_string())?;
            }
            self.context.cover.clear();
            self.next_token()?;
            expr = Expression::Update(self.finalize(
                Self::start_node(&start_token),
                UpdateExpression {
                    operator,
                    argument: Box::new(expr),
                    prefix: false,
                    location: NodeLocation::default(),
                },
            ));
        }
        Ok(expr)
    }

    fn parse_unary_expression(&mut self) -> Result<Expression, ParseError> {
        let operator = match self.lookahead.token_type {
            TokenType::Punctuator => self
                .lookahead
                .value
                .as_str()
                .and_then(UnaryOp::from_punctuator),
            _ => None,
        };
        let Some(operator) = operator else {
            return self.parse_update_expression();
        };

        let node = Self::start_node(&self.lookahead);
        self.next_token()?;
        let argument = self.inherit_cover_grammar(Self::parse_unary_expression)?;
        let expr = self.finalize(
            node,
            UnaryExpression {
                operator,
                argument: Box::new(argument),
                prefix: true,
                location: NodeLocation::default(),
            },
        );
        self.context.cover.clear();
        Ok(Expression::Unary(expr))
    }

    /// `**` binds tighter than any binary operator and associates to the right.
    /// A bare unary operand on its left is not extended (`-x ** y`); a parenthesized
    /// one is (`(-x) ** y`).
    fn parse_exponentiation_expression(&mut self) -> Result<Expression, ParseError> {
        let start_token = self.lookahead.clone();
        let expr = self.inherit_cover_grammar(Self::parse_unary_expression)?;

        let bare_unary = matches!(expr, Expression::Unary(_)) && !start_token.is_punctuator("(");
        if bare_unary || !self.match_punct("**") {
            return Ok(expr);
        }

        self.next_token()?;
        self.context.cover.clear();
        let right = self.isolate_cover_grammar(Self::parse_exponentiation_expression)?;
        Ok(Expression::Binary(self.finalize(
            Self::start_node(&start_token),
            BinaryExpression {
                operator: BinaryOp::Exp,
                left: Box::new(expr),
                right: Box::new(right),
                location: NodeLocation::default(),
            },
        )))
    }

    fn finalize_infix(
        &mut self,
        marker: Marker,
        operator: InfixOp,
        left: Expression,
        right: Expression,
    ) -> Expression {
        let left = Box::new(left);
        let right = Box::new(right);
        let location = NodeLocation::default();
        match operator {
            InfixOp::Binary(operator) => Expression::Binary(self.finalize(
                marker,
                BinaryExpression {
                    operator,
                    left,
                    right,
                    location,
                },
            )),
            InfixOp::Logical(operator) => Expression::Logical(self.finalize(
                marker,
                LogicalExpression {
                    operator,
                    left,
                    right,
                    location,
                },
            )),
        }
    }

    /// Operator-precedence parsing over an explicit stack.
    ///
    /// Each stack entry is a left operand waiting for its right-hand side, together with
    /// the operator between them and where the left operand starts. An incoming operator
    /// first reduces every entry whose precedence is at least its own.
    fn parse_binary_expression(&mut self) -> Result<Expression, ParseError> {
        let start_token = self.lookahead.clone();
        let expr = self.inherit_cover_grammar(Self::parse_exponentiation_expression)?;

        let Some((operator, precedence)) = binary_precedence(&self.lookahead) else {
            return Ok(expr);
        };
        self.next_token()?;
        self.context.cover.clear();

        let mut stack = vec![(expr, operator, precedence, Self::start_node(&start_token))];
        let mut current_marker = Self::start_node(&self.lookahead);
        let mut current = self.isolate_cover_grammar(Self::parse_exponentiation_expression)?;

        while let Some((operator, precedence)) = binary_precedence(&self.lookahead) {
            while stack.last().is_some_and(|(_, _, top, _)| precedence <= *top) {
                let Some((left, top_operator, _, marker)) = stack.pop() else {
                    break;
                };
                current = self.finalize_infix(marker, top_operator, left, current);
                current_marker = marker;
            }

            self.next_token()?;
            stack.push((current, operator, precedence, current_marker));
            current_marker = Self::start_node(&self.lookahead);
            current = self.isolate_cover_grammar(Self::parse_exponentiation_expression)?;
        }

        while let Some((left, operator, _, marker)) = stack.pop() {
            current = self.finalize_infix(marker, operator, left, current);
        }
        Ok(current)
    }

    fn parse_conditional_expression(&mut self) -> Result<Expression, ParseError> {
        let start_token = self.lookahead.clone();
        let expr = self.inherit_cover_grammar(Self::parse_binary_expression)?;
        if !self.match_punct("?") {
            return Ok(expr);
        }

        self.next_token()?;
        let consequent = self.isolate_cover_grammar(Self::parse_assignment_expression)?;
        self.expect(":")?;
        let alternate = self.isolate_cover_grammar(Self::parse_assignment_expression)?;

        let expr = self.finalize(
            Self::start_node(&start_token),
            ConditionalExpression {
                test: Box::new(expr),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
                location: NodeLocation::default(),
            },
        );
        self.context.cover.clear();
        Ok(Expression::Conditional(expr))
    }

    fn parse_assignment_expression(&mut self) -> Result<Expression, ParseError> {
        let start_token = self.lookahead.clone();
        let expr = self.parse_conditional_expression()?;

        let Some(operator) = self.match_assign() else {
            return Ok(expr);
        };

        if !self.context.cover.is_assignment_target {
            self.tolerate_error(messages::INVALID_LHS_IN_ASSIGNMENT.to_string())?;
        }
        if operator != AssignmentOp::Assign {
            self.context.cover.clear();
        }

        self.next_token()?;
        let right = self.isolate_cover_grammar(Self::parse_assignment_expression)?;
        let expr = self.finalize(
            Self::start_node(&start_token),
            AssignmentExpression {
                operator,
                left: Box::new(expr),
                right: Box::new(right),
                location: NodeLocation::default(),
            },
        );
        self.context.cover.first_cover_initialized_name_error = None;
        Ok(Expression::Assignment(expr))
    }

    fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        let start_token = self.lookahead.clone();
        let expr = self.isolate_cover_grammar(Self::parse_assignment_expression)?;
        if !self.match_punct(",") {
            return Ok(expr);
        }

        let mut expressions = vec![expr];
        while self.lookahead.token_type != TokenType::Eof {
            if !self.match_punct(",") {
                break;
            }
            self.next_token()?;
            expressions.push(self.isolate_cover_grammar(Self::parse_assignment_expression)?);
        }

        Ok(Expression::Sequence(self.finalize(
            Self::start_node(&start_token),
            SequenceExpression {
                expressions,
                location: NodeLocation::default(),
            },
        )))
    }

    // ============ STATEMENTS ============

    fn parse_statement_list_item(&mut self) -> Result<Statement, ParseError> {
        if self.lookahead.token_type != TokenType::Keyword {
            return self.parse_statement();
        }

        if self.match_keyword("const") {
            self.parse_lexical_declaration(VariableKind::Const)
        } else if self.match_keyword("def") {
            Ok(Statement::FunctionDeclaration(
                self.parse_function_declaration()?,
            ))
        } else if self.match_keyword("let") && self.peek_binding_start(false)? {
            self.parse_lexical_declaration(VariableKind::Let)
        } else {
            self.parse_statement()
        }
    }

    /// `var` is an ordinary identifier unless a binding follows it on the same line.
    fn is_var_declaration(&mut self) -> Result<bool, ParseError> {
        Ok(is_identifier(&self.lookahead, "var") && self.peek_binding_start(true)?)
    }

    fn parse_lexical_declaration(&mut self, kind: VariableKind) -> Result<Statement, ParseError> {
        let node = self.create_node();
        self.next_token()?;
        let declarations = self.parse_binding_list(kind)?;
        self.consume_semicolon()?;
        Ok(Statement::VariableDeclaration(self.finalize(
            node,
            VariableDeclaration {
                declarations,
                kind,
                location: NodeLocation::default(),
            },
        )))
    }

    fn parse_binding_list(
        &mut self,
        kind: VariableKind,
    ) -> Result<Vec<VariableDeclarator>, ParseError> {
        let mut list = vec![self.parse_lexical_binding(kind)?];
        while self.match_punct(",") {
            self.next_token()?;
            list.push(self.parse_lexical_binding(kind)?);
        }
        Ok(list)
    }

    fn parse_lexical_binding(&mut self, kind: VariableKind) -> Result<VariableDeclarator, ParseError> {
        let node = self.create_node();
        let id = self.parse_pattern(Some(kind))?;

        let init = if self.match_punct("=") {
            self.next_token()?;
            Some(self.isolate_cover_grammar(Self::parse_assignment_expression)?)
        } else if kind == VariableKind::Const {
            return self.throw_error(messages::format(
                messages::DECLARATION_MISSING_INITIALIZER,
                &[kind.as_str()],
            ));
        } else {
            None
        };

        Ok(self.finalize(
            node,
            VariableDeclarator {
                id,
                init,
                location: NodeLocation::default(),
            },
        ))
    }

    fn parse_pattern(&mut self, kind: Option<VariableKind>) -> Result<Identifier, ParseError> {
        if self.match_keyword("let")
            && matches!(kind, Some(VariableKind::Let | VariableKind::Const))
        {
            let token = self.lookahead.clone();
            self.tolerate_unexpected_token(&token, Some(messages::LET_IN_LEXICAL_BINDING))?;
        }
        self.parse_variable_identifier(kind)
    }

    /// A binding name. Only `var` may bind the name `let`.
    fn parse_variable_identifier(
        &mut self,
        kind: Option<VariableKind>,
    ) -> Result<Identifier, ParseError> {
        let node = self.create_node();
        let token = self.next_token()?;
        if token.token_type != TokenType::Identifier
            && !(token.is_keyword("let") && kind == Some(VariableKind::Var))
        {
            return self.throw_unexpected_token(&token);
        }
        Ok(self.parse_identifier_token(node, &token))
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        match self.lookahead.token_type {
            TokenType::BooleanLiteral
            | TokenType::NullLiteral
            | TokenType::NumericLiteral
            | TokenType::StringLiteral => self.parse_expression_statement(),
            TokenType::Punctuator => {
                if self.match_punct("{") {
                    Ok(Statement::Block(self.parse_block()?))
                } else if self.match_punct(";") {
                    self.parse_empty_statement()
                } else {
                    self.parse_expression_statement()
                }
            }
            TokenType::Identifier => {
                if self.is_var_declaration()? {
                    self.parse_lexical_declaration(VariableKind::Var)
                } else if is_identifier(&self.lookahead, "throw") {
                    self.parse_throw_statement()
                } else {
                    self.parse_labelled_statement()
                }
            }
            TokenType::Keyword => match self.lookahead.value.as_str() {
                Some("break") => self.parse_break_statement(),
                Some("continue") => self.parse_continue_statement(),
                Some("debugger") => self.parse_debugger_statement(),
                Some("do") => self.parse_do_while_statement(),
                Some("for") => self.parse_for_statement(),
                Some("def") => Ok(Statement::FunctionDeclaration(
                    self.parse_function_declaration()?,
                )),
                Some("if") => self.parse_if_statement(),
                Some("let") => self.parse_labelled_statement(),
                Some("return") => self.parse_return_statement(),
                Some("while") => self.parse_while_statement(),
                _ => self.parse_expression_statement(),
            },
            TokenType::Eof => self.throw_unexpected_token(&self.lookahead),
        }
    }

    fn parse_block(&mut self) -> Result<BlockStatement, ParseError> {
        let node = self.create_node();
        self.expect("{")?;
        let mut body = Vec::new();
        while !self.match_punct("}") {
            body.push(self.parse_statement_list_item()?);
        }
        self.expect("}")?;
        Ok(self.finalize(
            node,
            BlockStatement {
                body,
                location: NodeLocation::default(),
            },
        ))
    }

    fn parse_empty_statement(&mut self) -> Result<Statement, ParseError> {
        let node = self.create_node();
        self.expect(";")?;
        Ok(Statement::Empty(self.finalize(node, EmptyStatement::default())))
    }

    /// Placeholder body used when tolerant mode skips a missing `)`.
    fn empty_statement(&mut self) -> Statement {
        let node = self.create_node();
        Statement::Empty(self.finalize(node, EmptyStatement::default()))
    }

    fn parse_expression_statement(&mut self) -> Result<Statement, ParseError> {
        let node = self.create_node();
        let expression = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(Statement::Expression(self.finalize(
            node,
            ExpressionStatement {
                expression,
                location: NodeLocation::default(),
            },
        )))
    }

    /// True when tolerant mode should skip a missing `)` after a loop or `if` head.
    fn tolerate_missing_paren(&mut self) -> Result<bool, ParseError> {
        if self.match_punct(")") || !self.scanner.error_handler.is_tolerant() {
            return Ok(false);
        }
        let token = self.next_token()?;
        self.tolerate_unexpected_token(&token, None)?;
        Ok(true)
    }

    /// Parse a loop body with `in_iteration` set for its duration.
    fn parse_iteration_body(&mut self) -> Result<Statement, ParseError> {
        let previous = std::mem::replace(&mut self.context.in_iteration, true);
        let body = self.isolate_cover_grammar(Self::parse_statement)?;
        self.context.in_iteration = previous;
        Ok(body)
    }

    fn parse_if_statement(&mut self) -> Result<Statement, ParseError> {
        let node = self.create_node();
        self.expect_keyword("if")?;
        self.expect("(")?;
        let test = self.parse_expression()?;

        let (consequent, alternate) = if self.tolerate_missing_paren()? {
            (self.empty_statement(), None)
        } else {
            self.expect(")")?;
            let consequent = self.parse_statement()?;
            let alternate = if self.match_keyword("else") {
                self.next_token()?;
                Some(Box::new(self.parse_statement()?))
            } else {
                None
            };
            (consequent, alternate)
        };

        Ok(Statement::If(self.finalize(
            node,
            IfStatement {
                test,
                consequent: Box::new(consequent),
                alternate,
                location: NodeLocation::default(),
            },
        )))
    }

    fn parse_do_while_statement(&mut self) -> Result<Statement, ParseError> {
        let node = self.create_node();
        self.expect_keyword("do")?;
        let body = self.parse_iteration_body()?;

        self.expect_keyword("while")?;
        self.expect("(")?;
        let test = self.parse_expression()?;
        if !self.tolerate_missing_paren()? {
            self.expect(")")?;
            if self.match_punct(";") {
                self.next_token()?;
            }
        }

        Ok(Statement::DoWhile(self.finalize(
            node,
            DoWhileStatement {
                body: Box::new(body),
                test,
                location: NodeLocation::default(),
            },
        )))
    }

    fn parse_while_statement(&mut self) -> Result<Statement, ParseError> {
        let node = self.create_node();
        self.expect_keyword("while")?;
        self.expect("(")?;
        let test = self.parse_expression()?;

        let body = if self.tolerate_missing_paren()? {
            self.empty_statement()
        } else {
            self.expect(")")?;
            self.parse_iteration_body()?
        };

        Ok(Statement::While(self.finalize(
            node,
            WhileStatement {
                test,
                body: Box::new(body),
                location: NodeLocation::default(),
            },
        )))
    }

    fn parse_for_init(&mut self) -> Result<Option<ForInit>, ParseError> {
        if self.match_punct(";") {
            self.next_token()?;
            return Ok(None);
        }

        let kind = if self.match_keyword("const") {
            Some(VariableKind::Const)
        } else if self.match_keyword("let") {
            Some(VariableKind::Let)
        } else if self.is_var_declaration()? {
            Some(VariableKind::Var)
        } else {
            None
        };

        let init = if let Some(kind) = kind {
            let node = self.create_node();
            self.next_token()?;
            let declarations = self.parse_binding_list(kind)?;
            ForInit::VariableDeclaration(self.finalize(
                node,
                VariableDeclaration {
                    declarations,
                    kind,
                    location: NodeLocation::default(),
                },
            ))
        } else {
            let start_token = self.lookahead.clone();
            let mut init = self.inherit_cover_grammar(Self::parse_assignment_expression)?;
            if self.match_punct(",") {
                let mut expressions = vec![init];
                while self.match_punct(",") {
                    self.next_token()?;
                    expressions.push(self.isolate_cover_grammar(Self::parse_assignment_expression)?);
                }
                init = Expression::Sequence(self.finalize(
                    Self::start_node(&start_token),
                    SequenceExpression {
                        expressions,
                        location: NodeLocation::default(),
                    },
                ));
            }
            ForInit::Expression(init)
        };

        self.expect(";")?;
        Ok(Some(init))
    }

    fn parse_for_statement(&mut self) -> Result<Statement, ParseError> {
        let node = self.create_node();
        self.expect_keyword("for")?;
        self.expect("(")?;

        let init = self.parse_for_init()?;
        let test = if self.match_punct(";") {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(";")?;
        let update = if self.match_punct(")") {
            None
        } else {
            Some(self.parse_expression()?)
        };

        let mut statement = ForStatement {
            init,
            test,
            update,
            body: Box::new(Statement::Empty(EmptyStatement::default())),
            location: NodeLocation::default(),
        };
        statement.body = Box::new(if self.tolerate_missing_paren()? {
            self.empty_statement()
        } else {
            self.expect(")")?;
            self.parse_iteration_body()?
        });

        Ok(Statement::For(self.finalize(node, statement)))
    }

    /// Optional label after `break`/`continue`; it must be on the same line.
    fn parse_jump_label(&mut self) -> Result<Option<Identifier>, ParseError> {
        if self.lookahead.token_type != TokenType::Identifier || self.has_line_terminator {
            return Ok(None);
        }
        let token = self.lookahead.clone();
        let id = self.parse_variable_identifier(None)?;
        if !self.context.label_set.contains(&id.name) {
            let error = ErrorHandler::create_error(
                token.start,
                token.line_number,
                token.start - token.line_start + 1,
                messages::format(messages::UNKNOWN_LABEL, &[&id.name]),
            );
            self.scanner.error_handler.tolerate(error)?;
        }
        Ok(Some(id))
    }

    fn parse_break_statement(&mut self) -> Result<Statement, ParseError> {
        let node = self.create_node();
        self.expect_keyword("break")?;
        let label = self.parse_jump_label()?;
        self.consume_semicolon()?;
        if label.is_none() && !self.context.in_iteration {
            self.tolerate_error(messages::ILLEGAL_BREAK.to_string())?;
        }

        Ok(Statement::Break(self.finalize(
            node,
            BreakStatement {
                label,
                location: NodeLocation::default(),
            },
        )))
    }

    fn parse_continue_statement(&mut self) -> Result<Statement, ParseError> {
        let node = self.create_node();
        self.expect_keyword("continue")?;
        let label = self.parse_jump_label()?;
        self.consume_semicolon()?;
        if label.is_none() && !self.context.in_iteration {
            self.tolerate_error(messages::ILLEGAL_CONTINUE.to_string())?;
        }

        Ok(Statement::Continue(self.finalize(
            node,
            ContinueStatement {
                label,
                location: NodeLocation::default(),
            },
        )))
    }

    fn parse_return_statement(&mut self) -> Result<Statement, ParseError> {
        if !self.context.in_function_body {
            self.tolerate_error(messages::ILLEGAL_RETURN.to_string())?;
        }

        let node = self.create_node();
        self.expect_keyword("return")?;
        let has_argument = (!self.match_punct(";")
            && !self.match_punct("}")
            && !self.has_line_terminator
            && self.lookahead.token_type != TokenType::Eof)
            || self.lookahead.token_type == TokenType::StringLiteral;
        let argument = if has_argument {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.consume_semicolon()?;

        Ok(Statement::Return(self.finalize(
            node,
            ReturnStatement {
                argument,
                location: NodeLocation::default(),
            },
        )))
    }

    fn parse_throw_statement(&mut self) -> Result<Statement, ParseError> {
        let node = self.create_node();
        self.next_token()?;
        if self.has_line_terminator {
            return self.throw_error(messages::NEWLINE_AFTER_THROW.to_string());
        }
        let argument = self.parse_expression()?;
        self.consume_semicolon()?;

        Ok(Statement::Throw(self.finalize(
            node,
            ThrowStatement {
                argument,
                location: NodeLocation::default(),
            },
        )))
    }

    fn parse_debugger_statement(&mut self) -> Result<Statement, ParseError> {
        let node = self.create_node();
        self.expect_keyword("debugger")?;
        self.consume_semicolon()?;
        Ok(Statement::Debugger(self.finalize(node, DebuggerStatement::default())))
    }

    /// `label: statement`, or an expression statement that starts with an identifier.
    fn parse_labelled_statement(&mut self) -> Result<Statement, ParseError> {
        let node = self.create_node();
        let expr = self.parse_expression()?;

        match expr {
            Expression::Identifier(label) if self.match_punct(":") => {
                self.next_token()?;
                if self.context.label_set.contains(&label.name) {
                    return self.throw_error(messages::format(
                        messages::REDECLARATION,
                        &["Label", &label.name],
                    ));
                }

                self.context.label_set.insert(label.name.clone());
                let body = self.parse_statement()?;
                self.context.label_set.remove(&label.name);

                Ok(Statement::Labeled(self.finalize(
                    node,
                    LabeledStatement {
                        label,
                        body: Box::new(body),
                        location: NodeLocation::default(),
                    },
                )))
            }
            expression => {
                self.consume_semicolon()?;
                Ok(Statement::Expression(self.finalize(
                    node,
                    ExpressionStatement {
                        expression,
                        location: NodeLocation::default(),
                    },
                )))
            }
        }
    }

    // ============ FUNCTIONS ============

    /// `*` after `def`/`function` marks a generator.
    fn parse_generator_star(&mut self) -> Result<bool, ParseError> {
        if !self.match_punct("*") {
            return Ok(false);
        }
        self.next_token()?;
        Ok(true)
    }

    fn parse_function_declaration(&mut self) -> Result<FunctionDeclaration, ParseError> {
        let node = self.create_node();
        self.expect_keyword("def")?;
        let generator = self.parse_generator_star()?;
        let id = self.parse_variable_identifier(None)?;
        let params = self.parse_formal_parameters()?;
        let body = self.parse_function_source_elements()?;

        Ok(self.finalize(
            node,
            FunctionDeclaration {
                id: Some(id),
                params,
                body,
                generator,
                expression: false,
                async_: false,
                location: NodeLocation::default(),
            },
        ))
    }

    fn parse_function_expression(&mut self) -> Result<FunctionExpression, ParseError> {
        let node = self.create_node();
        self.expect_keyword("function")?;
        let generator = self.parse_generator_star()?;
        let id = if self.match_punct("(") {
            None
        } else {
            Some(self.parse_variable_identifier(None)?)
        };
        let params = self.parse_formal_parameters()?;
        let body = self.parse_function_source_elements()?;

        let expr = self.finalize(
            node,
            FunctionExpression {
                id,
                params,
                body,
                generator,
                expression: false,
                async_: false,
                location: NodeLocation::default(),
            },
        );
        self.context.cover.clear();
        Ok(expr)
    }

    fn parse_formal_parameters(&mut self) -> Result<Vec<FunctionParam>, ParseError> {
        self.expect("(")?;
        let mut params = Vec::new();
        if !self.match_punct(")") {
            while self.lookahead.token_type != TokenType::Eof {
                params.push(self.parse_formal_parameter()?);
                if self.match_punct(")") {
                    break;
                }
                self.expect(",")?;
                if self.match_punct(")") {
                    break;
                }
            }
        }
        self.expect(")")?;
        Ok(params)
    }

    /// `name` or `name = default`
    fn parse_formal_parameter(&mut self) -> Result<FunctionParam, ParseError> {
        let start_token = self.lookahead.clone();
        let left = self.parse_pattern(None)?;
        if !self.match_punct("=") {
            return Ok(FunctionParam::Identifier(left));
        }

        self.next_token()?;
        let right = self.isolate_cover_grammar(Self::parse_assignment_expression)?;
        Ok(FunctionParam::AssignmentPattern(self.finalize(
            Self::start_node(&start_token),
            AssignmentPattern {
                left,
                right: Box::new(right),
                location: NodeLocation::default(),
            },
        )))
    }

    /// Function body. Labels and loop context do not reach across the function boundary.
    fn parse_function_source_elements(&mut self) -> Result<BlockStatement, ParseError> {
        let node = self.create_node();
        self.expect("{")?;

        let previous_label_set = std::mem::take(&mut self.context.label_set);
        let previous_in_iteration = std::mem::replace(&mut self.context.in_iteration, false);
        let previous_in_function_body =
            std::mem::replace(&mut self.context.in_function_body, true);

        let mut body = Vec::new();
        while self.lookahead.token_type != TokenType::Eof && !self.match_punct("}") {
            body.push(self.parse_statement_list_item()?);
        }
        self.expect("}")?;

        self.context.label_set = previous_label_set;
        self.context.in_iteration = previous_in_iteration;
        self.context.in_function_body = previous_in_function_body;

        Ok(self.finalize(
            node,
            BlockStatement {
                body,
                location: NodeLocation::default(),
            },
        ))
    }
}
