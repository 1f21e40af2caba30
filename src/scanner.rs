//! Scanner for script source text
//!
//! Converts source text into raw tokens, one per [`Scanner::lex`] call. The parser
//! drives the scanner directly and calls [`Scanner::scan_comments`] between tokens.
//!
//! All offsets (`index`, `start`, `end`, `line_start`) are UTF-8 byte offsets.

use serde::Serialize;

use crate::error::{ErrorHandler, ParseError, messages};

/// Token categories produced by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenType {
    #[serde(rename = "Boolean")]
    BooleanLiteral,
    #[serde(rename = "<end>")]
    Eof,
    Identifier,
    Keyword,
    #[serde(rename = "Null")]
    NullLiteral,
    #[serde(rename = "Numeric")]
    NumericLiteral,
    Punctuator,
    #[serde(rename = "String")]
    StringLiteral,
}

impl TokenType {
    /// Name used in token lists (`Numeric`, `<end>`, ...)
    pub fn name(self) -> &'static str {
        match self {
            TokenType::BooleanLiteral => "Boolean",
            TokenType::Eof => "<end>",
            TokenType::Identifier => "Identifier",
            TokenType::Keyword => "Keyword",
            TokenType::NullLiteral => "Null",
            TokenType::NumericLiteral => "Numeric",
            TokenType::Punctuator => "Punctuator",
            TokenType::StringLiteral => "String",
        }
    }
}

/// Decoded token payload
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    /// Identifier name, keyword, punctuator text, decoded string, `true`/`false`/`null` text
    Text(String),
    Number(f64),
}

impl TokenValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TokenValue::Text(text) => Some(text),
            TokenValue::Number(_) => None,
        }
    }
}

/// The scanner's unit of output
#[derive(Debug, Clone, PartialEq)]
pub struct RawToken {
    pub token_type: TokenType,
    pub value: TokenValue,
    pub line_number: usize,
    /// Offset of the first character of the token's line
    pub line_start: usize,
    pub start: usize,
    pub end: usize,
}

impl RawToken {
    /// True for a punctuator with exactly this text.
    pub fn is_punctuator(&self, text: &str) -> bool {
        self.token_type == TokenType::Punctuator && self.value.as_str() == Some(text)
    }

    /// True for a keyword with exactly this text.
    pub fn is_keyword(&self, text: &str) -> bool {
        self.token_type == TokenType::Keyword && self.value.as_str() == Some(text)
    }

    /// Text used in diagnostics.
    pub fn display_value(&self) -> String {
        match &self.value {
            TokenValue::Text(text) => text.clone(),
            TokenValue::Number(n) => format_number(*n),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Snapshot of the scan position, restored with [`Scanner::restore_state`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerState {
    pub index: usize,
    pub line_number: usize,
    pub line_start: usize,
    curly_depth: usize,
}

/// Line/column position. Lines are 1-based, columns 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// Start/end positions of a comment as seen by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentLoc {
    pub start: Position,
    pub end: Position,
}

/// A comment found by [`Scanner::scan_comments`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Always false: only `//` comments exist in this language
    pub multi_line: bool,
    /// `[start, end)` of the comment text without the `//` marker
    pub slice: (usize, usize),
    /// `[start, end)` including the marker
    pub range: (usize, usize),
    pub loc: CommentLoc,
}

/// Keywords, bucketed by length.
const KEYWORDS: [&[&str]; 11] = [
    &[],
    &[],
    &["if", "do"],
    &["def", "end", "for", "let"],
    &["else"],
    &["while", "break", "const"],
    &["return"],
    &["default", "finally", "extends"],
    &["function", "continue", "debugger"],
    &[],
    &["instanceof"],
];

pub fn is_keyword(id: &str) -> bool {
    KEYWORDS
        .get(id.len())
        .is_some_and(|bucket| bucket.contains(&id))
}

const PUNCTUATORS_4: [&str; 1] = [">>>="];
const PUNCTUATORS_3: [&str; 4] = [">>>", "<<=", ">>=", "**="];
const PUNCTUATORS_2: [&str; 20] = [
    "&&", "||", "==", "!=", "+=", "-=", "*=", "/=", "++", "--", "<<", ">>", "&=", "|=", "^=", "%=",
    "<=", ">=", "=>", "**",
];
const PUNCTUATORS_1: [&str; 12] = ["<", ">", "=", "!", "+", "-", "*", "%", "&", "|", "^", "/"];

pub fn is_white_space(ch: char) -> bool {
    matches!(
        ch,
        ' ' | '\t'
            | '\u{000B}'
            | '\u{000C}'
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

pub fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

pub fn is_identifier_start(ch: char) -> bool {
    ch == '$' || ch == '_' || ch == '\\' || unicode_xid::UnicodeXID::is_xid_start(ch)
}

pub fn is_identifier_part(ch: char) -> bool {
    ch == '$'
        || ch == '_'
        || ch == '\\'
        || ch == '\u{200C}'
        || ch == '\u{200D}'
        || unicode_xid::UnicodeXID::is_xid_continue(ch)
}

fn is_decimal_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

fn is_octal_digit(ch: char) -> bool {
    matches!(ch, '0'..='7')
}

/// Stateful cursor over an immutable source string
pub struct Scanner<'a> {
    source: &'a str,
    pub(crate) error_handler: ErrorHandler,
    pub track_comment: bool,
    index: usize,
    line_number: usize,
    line_start: usize,
    /// Depth of open `{` punctuators
    curly_depth: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str, error_handler: ErrorHandler) -> Self {
        Self {
            source,
            error_handler,
            track_comment: false,
            index: 0,
            line_number: if source.is_empty() { 0 } else { 1 },
            line_start: 0,
            curly_depth: 0,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn line_start(&self) -> usize {
        self.line_start
    }

    pub fn error_handler(&self) -> &ErrorHandler {
        &self.error_handler
    }

    pub fn into_error_handler(self) -> ErrorHandler {
        self.error_handler
    }

    pub fn save_state(&self) -> ScannerState {
        ScannerState {
            index: self.index,
            line_number: self.line_number,
            line_start: self.line_start,
            curly_depth: self.curly_depth,
        }
    }

    pub fn restore_state(&mut self, state: ScannerState) {
        self.index = state.index;
        self.line_number = state.line_number;
        self.line_start = state.line_start;
        self.curly_depth = state.curly_depth;
    }

    pub fn eof(&self) -> bool {
        self.index >= self.source.len()
    }

    fn char_at(&self, index: usize) -> Option<char> {
        self.source.get(index..)?.chars().next()
    }

    fn current(&self) -> Option<char> {
        self.char_at(self.index)
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.source.get(self.index..)?.chars();
        chars.next();
        chars.next()
    }

    fn rest(&self) -> &'a str {
        self.source.get(self.index..).unwrap_or("")
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        self.source.get(start..end).unwrap_or("")
    }

    fn column(&self) -> usize {
        self.index - self.line_start + 1
    }

    fn throw_unexpected_token<T>(&self, message: &str) -> Result<T, ParseError> {
        ErrorHandler::throw_error(self.index, self.line_number, self.column(), message)
    }

    fn tolerate_unexpected_token(&mut self, message: &str) -> Result<(), ParseError> {
        let (index, line, column) = (self.index, self.line_number, self.column());
        self.error_handler.tolerate_error(index, line, column, message)
    }

    // ============ COMMENTS ============

    fn skip_single_line_comment(&mut self, offset: usize) -> Comment {
        let start = self.index - offset;
        let loc_start = Position {
            line: self.line_number,
            column: self.index - self.line_start - offset,
        };

        while let Some(ch) = self.current() {
            self.index += ch.len_utf8();
            if is_line_terminator(ch) {
                let end = self.index - ch.len_utf8();
                let comment = Comment {
                    multi_line: false,
                    slice: (start + offset, end),
                    range: (start, end),
                    loc: CommentLoc {
                        start: loc_start,
                        end: Position {
                            line: self.line_number,
                            column: end - self.line_start,
                        },
                    },
                };
                if ch == '\r' && self.current() == Some('\n') {
                    self.index += 1;
                }
                self.line_number += 1;
                self.line_start = self.index;
                return comment;
            }
        }

        Comment {
            multi_line: false,
            slice: (start + offset, self.index),
            range: (start, self.index),
            loc: CommentLoc {
                start: loc_start,
                end: Position {
                    line: self.line_number,
                    column: self.index - self.line_start,
                },
            },
        }
    }

    /// Skip whitespace, line terminators and `//` comments.
    ///
    /// Returns the comments passed over when `track_comment` is set, nothing otherwise.
    /// `/*` is not a comment start.
    pub fn scan_comments(&mut self) -> Vec<Comment> {
        let mut comments = Vec::new();

        while let Some(ch) = self.current() {
            if is_white_space(ch) {
                self.index += ch.len_utf8();
            } else if is_line_terminator(ch) {
                self.index += ch.len_utf8();
                if ch == '\r' && self.current() == Some('\n') {
                    self.index += 1;
                }
                self.line_number += 1;
                self.line_start = self.index;
            } else if ch == '/' && self.peek_next() == Some('/') {
                self.index += 2;
                let comment = self.skip_single_line_comment(2);
                if self.track_comment {
                    comments.push(comment);
                }
            } else {
                break;
            }
        }

        comments
    }

    // ============ TOKENS ============

    /// Scan the next token. At end of input an `Eof` token is returned.
    pub fn lex(&mut self) -> Result<RawToken, ParseError> {
        let Some(ch) = self.current() else {
            return Ok(RawToken {
                token_type: TokenType::Eof,
                value: TokenValue::Text(String::new()),
                line_number: self.line_number,
                line_start: self.line_start,
                start: self.index,
                end: self.index,
            });
        };

        if is_identifier_start(ch) {
            return self.scan_identifier();
        }

        if ch == '(' || ch == ')' || ch == ';' {
            return self.scan_punctuator();
        }

        if ch == '\'' || ch == '"' {
            return self.scan_string_literal();
        }

        if ch == '.' {
            if self.peek_next().is_some_and(is_decimal_digit) {
                return self.scan_numeric_literal();
            }
            return self.scan_punctuator();
        }

        if is_decimal_digit(ch) {
            return self.scan_numeric_literal();
        }

        self.scan_punctuator()
    }

    fn make_token(&self, token_type: TokenType, value: TokenValue, start: usize) -> RawToken {
        RawToken {
            token_type,
            value,
            line_number: self.line_number,
            line_start: self.line_start,
            start,
            end: self.index,
        }
    }

    // ============ IDENTIFIERS ============

    fn scan_identifier(&mut self) -> Result<RawToken, ParseError> {
        let start = self.index;
        let id = if self.current() == Some('\\') {
            self.get_complex_identifier()?
        } else {
            self.get_identifier()?
        };

        let token_type = if id.chars().count() == 1 {
            TokenType::Identifier
        } else if is_keyword(&id) {
            TokenType::Keyword
        } else if id == "null" {
            TokenType::NullLiteral
        } else if id == "true" || id == "false" {
            TokenType::BooleanLiteral
        } else {
            TokenType::Identifier
        };

        if token_type != TokenType::Identifier && start + id.len() != self.index {
            let restore = self.index;
            self.index = start;
            self.tolerate_unexpected_token(messages::INVALID_ESCAPED_RESERVED_WORD)?;
            self.index = restore;
        }

        Ok(self.make_token(token_type, TokenValue::Text(id), start))
    }

    fn get_identifier(&mut self) -> Result<String, ParseError> {
        let start = self.index;
        while let Some(ch) = self.current() {
            if ch == '\\' {
                self.index = start;
                return self.get_complex_identifier();
            }
            if !is_identifier_part(ch) {
                break;
            }
            self.index += ch.len_utf8();
        }
        Ok(self.slice(start, self.index).to_string())
    }

    /// Identifier containing `\uXXXX` or `\u{X...}` escapes.
    fn get_complex_identifier(&mut self) -> Result<String, ParseError> {
        let mut id = String::new();
        let mut first = true;

        while let Some(ch) = self.current() {
            if ch == '\\' {
                self.index += 1;
                let decoded = self.scan_identifier_escape()?;
                let valid = if first {
                    decoded != '\\' && is_identifier_start(decoded)
                } else {
                    decoded != '\\' && is_identifier_part(decoded)
                };
                if !valid {
                    return self.throw_unexpected_token(messages::UNEXPECTED_TOKEN_ILLEGAL);
                }
                id.push(decoded);
            } else {
                let valid = if first {
                    is_identifier_start(ch)
                } else {
                    is_identifier_part(ch)
                };
                if !valid {
                    break;
                }
                id.push(ch);
                self.index += ch.len_utf8();
            }
            first = false;
        }

        Ok(id)
    }

    /// Decode the escape after a backslash inside an identifier.
    fn scan_identifier_escape(&mut self) -> Result<char, ParseError> {
        if self.current() != Some('u') {
            return self.throw_unexpected_token(messages::UNEXPECTED_TOKEN_ILLEGAL);
        }
        self.index += 1;

        if self.current() == Some('{') {
            self.index += 1;
            return self.scan_unicode_code_point_escape();
        }

        match self.scan_hex_escape(4).and_then(char::from_u32) {
            Some(ch) => Ok(ch),
            None => self.throw_unexpected_token(messages::UNEXPECTED_TOKEN_ILLEGAL),
        }
    }

    /// Read exactly `len` hex digits. Leaves the cursor after the last digit read.
    fn scan_hex_escape(&mut self, len: usize) -> Option<u32> {
        let mut code = 0u32;
        for _ in 0..len {
            let digit = self.current().and_then(|ch| ch.to_digit(16))?;
            code = code * 16 + digit;
            self.index += 1;
        }
        Some(code)
    }

    /// `\u{...}` body; the opening brace is already consumed.
    fn scan_unicode_code_point_escape(&mut self) -> Result<char, ParseError> {
        if self.current() == Some('}') {
            return self.throw_unexpected_token(messages::UNEXPECTED_TOKEN_ILLEGAL);
        }

        let mut code: u32 = 0;
        let mut closed = false;
        while let Some(ch) = self.current() {
            self.index += ch.len_utf8();
            match ch.to_digit(16) {
                Some(digit) => {
                    code = code.saturating_mul(16).saturating_add(digit);
                }
                None => {
                    closed = ch == '}';
                    break;
                }
            }
        }

        match char::from_u32(code) {
            Some(ch) if closed && code <= 0x10FFFF => Ok(ch),
            _ => self.throw_unexpected_token(messages::UNEXPECTED_TOKEN_ILLEGAL),
        }
    }

    // ============ PUNCTUATORS ============

    fn scan_punctuator(&mut self) -> Result<RawToken, ParseError> {
        let start = self.index;
        let Some(ch) = self.current() else {
            return self.throw_unexpected_token(messages::UNEXPECTED_TOKEN_ILLEGAL);
        };

        let text = match ch {
            '{' => {
                self.curly_depth += 1;
                self.index += 1;
                "{"
            }
            '}' => {
                self.curly_depth = self.curly_depth.saturating_sub(1);
                self.index += 1;
                "}"
            }
            '(' | ')' | '.' | ';' | ',' | '[' | ']' | ':' | '?' | '~' => {
                self.index += 1;
                self.slice(start, self.index)
            }
            _ => {
                let rest = self.rest();
                let matched = PUNCTUATORS_4
                    .iter()
                    .chain(PUNCTUATORS_3.iter())
                    .chain(PUNCTUATORS_2.iter())
                    .chain(PUNCTUATORS_1.iter())
                    .find(|op| rest.starts_with(**op))
                    .copied();
                match matched {
                    Some(op) => {
                        self.index += op.len();
                        op
                    }
                    None => "",
                }
            }
        };

        if self.index == start {
            return self.throw_unexpected_token(messages::UNEXPECTED_TOKEN_ILLEGAL);
        }

        Ok(self.make_token(
            TokenType::Punctuator,
            TokenValue::Text(text.to_string()),
            start,
        ))
    }

    // ============ NUMBERS ============

    fn scan_radix_digits(&mut self, accept: impl Fn(char) -> bool) -> &'a str {
        let start = self.index;
        while let Some(ch) = self.current() {
            if !accept(ch) {
                break;
            }
            self.index += 1;
        }
        self.slice(start, self.index)
    }

    fn radix_value(digits: &str, radix: u32) -> f64 {
        digits
            .chars()
            .filter_map(|ch| ch.to_digit(radix))
            .fold(0.0, |acc, digit| acc * f64::from(radix) + f64::from(digit))
    }

    fn scan_hex_literal(&mut self, start: usize) -> Result<RawToken, ParseError> {
        let digits = self.scan_radix_digits(|ch| ch.is_ascii_hexdigit());
        if digits.is_empty() {
            return self.throw_unexpected_token(messages::UNEXPECTED_TOKEN_ILLEGAL);
        }
        if self.current().is_some_and(is_identifier_start) {
            return self.throw_unexpected_token(messages::UNEXPECTED_TOKEN_ILLEGAL);
        }
        let value = Self::radix_value(digits, 16);
        Ok(self.make_token(TokenType::NumericLiteral, TokenValue::Number(value), start))
    }

    fn scan_binary_literal(&mut self, start: usize) -> Result<RawToken, ParseError> {
        let digits = self.scan_radix_digits(|ch| ch == '0' || ch == '1');
        if digits.is_empty() {
            return self.throw_unexpected_token(messages::UNEXPECTED_TOKEN_ILLEGAL);
        }
        if self
            .current()
            .is_some_and(|ch| is_identifier_start(ch) || is_decimal_digit(ch))
        {
            return self.throw_unexpected_token(messages::UNEXPECTED_TOKEN_ILLEGAL);
        }
        let value = Self::radix_value(digits, 2);
        Ok(self.make_token(TokenType::NumericLiteral, TokenValue::Number(value), start))
    }

    fn scan_octal_literal(&mut self, start: usize) -> Result<RawToken, ParseError> {
        let digits = self.scan_radix_digits(is_octal_digit);
        if digits.is_empty() {
            return self.throw_unexpected_token(messages::UNEXPECTED_TOKEN_ILLEGAL);
        }
        if self
            .current()
            .is_some_and(|ch| is_identifier_start(ch) || is_decimal_digit(ch))
        {
            return self.throw_unexpected_token(messages::UNEXPECTED_TOKEN_ILLEGAL);
        }
        let value = Self::radix_value(digits, 8);
        Ok(self.make_token(TokenType::NumericLiteral, TokenValue::Number(value), start))
    }

    fn skip_decimal_digits(&mut self) {
        while self.current().is_some_and(is_decimal_digit) {
            self.index += 1;
        }
    }

    fn scan_numeric_literal(&mut self) -> Result<RawToken, ParseError> {
        let start = self.index;

        if self.current() != Some('.') {
            let first = self.current();
            self.index += 1;

            if first == Some('0') {
                match self.current() {
                    Some('x' | 'X') => {
                        self.index += 1;
                        return self.scan_hex_literal(start);
                    }
                    Some('b' | 'B') => {
                        self.index += 1;
                        return self.scan_binary_literal(start);
                    }
                    Some('o' | 'O') => {
                        self.index += 1;
                        return self.scan_octal_literal(start);
                    }
                    _ => {}
                }
            }

            self.skip_decimal_digits();
        }

        if self.current() == Some('.') {
            self.index += 1;
            self.skip_decimal_digits();
        }

        if matches!(self.current(), Some('e' | 'E')) {
            self.index += 1;
            if matches!(self.current(), Some('+' | '-')) {
                self.index += 1;
            }
            if !self.current().is_some_and(is_decimal_digit) {
                return self.throw_unexpected_token(messages::UNEXPECTED_TOKEN_ILLEGAL);
            }
            self.skip_decimal_digits();
        }

        if self.current().is_some_and(is_identifier_start) {
            return self.throw_unexpected_token(messages::UNEXPECTED_TOKEN_ILLEGAL);
        }

        let Ok(value) = self.slice(start, self.index).parse::<f64>() else {
            return self.throw_unexpected_token(messages::UNEXPECTED_TOKEN_ILLEGAL);
        };
        Ok(self.make_token(TokenType::NumericLiteral, TokenValue::Number(value), start))
    }

    // ============ STRINGS ============

    fn scan_string_literal(&mut self) -> Result<RawToken, ParseError> {
        let start = self.index;
        let (start_line, start_line_start) = (self.line_number, self.line_start);
        let Some(quote) = self.current() else {
            return self.throw_unexpected_token(messages::UNEXPECTED_TOKEN_ILLEGAL);
        };
        self.index += 1;

        let mut value = String::new();
        let mut terminated = false;

        while let Some(ch) = self.current() {
            self.index += ch.len_utf8();

            if ch == quote {
                terminated = true;
                break;
            }

            if is_line_terminator(ch) {
                break;
            }

            if ch != '\\' {
                value.push(ch);
                continue;
            }

            let Some(escaped) = self.current() else {
                break;
            };
            self.index += escaped.len_utf8();

            if is_line_terminator(escaped) {
                // Line continuation
                if escaped == '\r' && self.current() == Some('\n') {
                    self.index += 1;
                }
                self.line_number += 1;
                self.line_start = self.index;
                continue;
            }

            match escaped {
                'u' => {
                    let decoded = self.scan_string_unicode_escape()?;
                    value.push(decoded);
                }
                'x' => match self.scan_hex_escape(2).and_then(char::from_u32) {
                    Some(decoded) => value.push(decoded),
                    None => {
                        return self.throw_unexpected_token(messages::INVALID_HEX_ESCAPE_SEQUENCE);
                    }
                },
                'n' => value.push('\n'),
                'r' => value.push('\r'),
                't' => value.push('\t'),
                'b' => value.push('\u{0008}'),
                'f' => value.push('\u{000C}'),
                'v' => value.push('\u{000B}'),
                other => value.push(other),
            }
        }

        if !terminated {
            self.index = start;
            self.line_number = start_line;
            self.line_start = start_line_start;
            return self.throw_unexpected_token(messages::UNEXPECTED_TOKEN_ILLEGAL);
        }

        Ok(RawToken {
            token_type: TokenType::StringLiteral,
            value: TokenValue::Text(value),
            line_number: start_line,
            line_start: start_line_start,
            start,
            end: self.index,
        })
    }

    /// `\u` escape inside a string; the `u` is already consumed.
    ///
    /// A `\uD83D\uDE00` surrogate pair decodes to one scalar; a lone surrogate becomes U+FFFD.
    fn scan_string_unicode_escape(&mut self) -> Result<char, ParseError> {
        if self.current() == Some('{') {
            self.index += 1;
            return self.scan_unicode_code_point_escape();
        }

        let Some(high) = self.scan_hex_escape(4) else {
            return self.throw_unexpected_token(messages::UNEXPECTED_TOKEN_ILLEGAL);
        };

        if let Some(ch) = char::from_u32(high) {
            return Ok(ch);
        }

        if (0xD800..0xDC00).contains(&high) && self.rest().starts_with("\\u") {
            let state = self.save_state();
            self.index += 2;
            match self.scan_hex_escape(4) {
                Some(low) if (0xDC00..0xE000).contains(&low) => {
                    let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    return Ok(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
                _ => self.restore_state(state),
            }
        }

        Ok(char::REPLACEMENT_CHARACTER)
    }
}
