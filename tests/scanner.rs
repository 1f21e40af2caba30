//! Tests for the scanner
//!
//! These tests verify that the scanner correctly tokenizes script source.

use rbparse::error::ErrorHandler;
use rbparse::{ParseError, RawToken, Scanner, TokenType, TokenValue};

#[allow(clippy::unwrap_used)]
fn lex(source: &str) -> Vec<RawToken> {
    let mut scanner = Scanner::new(source, ErrorHandler::new(false));
    let mut tokens = vec![];
    loop {
        scanner.scan_comments();
        let token = scanner.lex().unwrap();
        if token.token_type == TokenType::Eof {
            break;
        }
        tokens.push(token);
    }
    tokens
}

fn lex_err(source: &str) -> ParseError {
    let mut scanner = Scanner::new(source, ErrorHandler::new(false));
    loop {
        scanner.scan_comments();
        match scanner.lex() {
            Err(err) => return err,
            Ok(token) if token.token_type == TokenType::Eof => {
                panic!("expected a scan error for {:?}", source)
            }
            Ok(_) => {}
        }
    }
}

fn number(source: &str) -> f64 {
    match lex(source).as_slice() {
        [RawToken {
            value: TokenValue::Number(n),
            ..
        }] => *n,
        other => panic!("expected one number, got {:?}", other),
    }
}

fn string(source: &str) -> String {
    match lex(source).as_slice() {
        [RawToken {
            token_type: TokenType::StringLiteral,
            value: TokenValue::Text(s),
            ..
        }] => s.clone(),
        other => panic!("expected one string, got {:?}", other),
    }
}

fn kinds(source: &str) -> Vec<(TokenType, String)> {
    lex(source)
        .into_iter()
        .map(|t| (t.token_type, t.display_value()))
        .collect()
}

#[test]
fn test_numbers() {
    assert_eq!(number("0x1F"), 31.0);
    assert_eq!(number("0o17"), 15.0);
    assert_eq!(number("0b101"), 5.0);
    assert_eq!(number("3.14"), 3.14);
    assert_eq!(number("2e3"), 2000.0);
    assert_eq!(number("42"), 42.0);
    assert_eq!(number(".5"), 0.5);
    assert_eq!(number("1.5e-2"), 0.015);
    assert_eq!(number("0XFF"), 255.0);
}

#[test]
fn test_malformed_numbers() {
    for source in ["0x", "3x", "0x1g", "0b", "0b102", "0o8", "0o19", "1e", "1e+"] {
        let err = lex_err(source);
        assert_eq!(err.description, "Unexpected token ILLEGAL", "{}", source);
    }
}

#[test]
fn test_string_escapes() {
    let value = string(r"'a\nb'");
    assert_eq!(value, "a\nb");
    assert_eq!(value.chars().count(), 3);

    assert_eq!(string(r#""\t\r\b\f\v""#), "\t\r\u{8}\u{c}\u{b}");
    assert_eq!(string(r"'\x41B\u{43}'"), "ABC");
    assert_eq!(string(r"'it\'s'"), "it's");
    assert_eq!(string(r"'\q'"), "q");
}

#[test]
fn test_surrogate_escapes() {
    assert_eq!(string(r"'\uD83D\uDE00'"), "\u{1F600}");
    assert_eq!(string(r"'\uD83Dx'"), "\u{FFFD}x");
    assert_eq!(string(r"'\u{1F600}'"), "\u{1F600}");
}

#[test]
fn test_line_continuation() {
    let tokens = lex("'a\\\nb' c");
    assert_eq!(tokens[0].value, TokenValue::Text("ab".to_string()));
    assert_eq!(tokens[0].line_number, 1);
    assert_eq!(tokens[1].line_number, 2);
}

#[test]
fn test_invalid_hex_escape() {
    let err = lex_err(r"'\x4'");
    assert_eq!(err.description, "Invalid hexadecimal escape sequence");
}

#[test]
fn test_unterminated_string_reports_start() {
    let err = lex_err("'abc");
    assert_eq!(err.description, "Unexpected token ILLEGAL");
    assert_eq!(err.index, 0);
    assert_eq!(err.line_number, 1);
    assert_eq!(err.column, 1);

    let err = lex_err("x = 'abc\ny'");
    assert_eq!(err.index, 4);
    assert_eq!(err.column, 5);
    assert_eq!(err.message, "Line 1: Unexpected token ILLEGAL");
}

#[test]
fn test_token_categories() {
    assert_eq!(
        kinds("while foo null true false 'x' 1"),
        vec![
            (TokenType::Keyword, "while".to_string()),
            (TokenType::Identifier, "foo".to_string()),
            (TokenType::NullLiteral, "null".to_string()),
            (TokenType::BooleanLiteral, "true".to_string()),
            (TokenType::BooleanLiteral, "false".to_string()),
            (TokenType::StringLiteral, "x".to_string()),
            (TokenType::NumericLiteral, "1".to_string()),
        ]
    );
}

#[test]
fn test_var_and_throw_are_identifiers() {
    let tokens = kinds("var throw");
    assert!(tokens.iter().all(|(kind, _)| *kind == TokenType::Identifier));
}

#[test]
fn test_unicode_identifiers() {
    assert_eq!(
        kinds("café $x _y"),
        vec![
            (TokenType::Identifier, "café".to_string()),
            (TokenType::Identifier, "$x".to_string()),
            (TokenType::Identifier, "_y".to_string()),
        ]
    );
}

#[test]
fn test_escaped_identifiers() {
    assert_eq!(
        kinds(r"abc a\u{62}"),
        vec![
            (TokenType::Identifier, "abc".to_string()),
            (TokenType::Identifier, "ab".to_string()),
        ]
    );
    assert_eq!(lex_err(r"1x").description, "Unexpected token ILLEGAL");
}

#[test]
fn test_escaped_keyword_is_rejected() {
    let err = lex_err(r"\u0069f");
    assert_eq!(err.description, "Keyword must not contain escaped characters");

    let mut scanner = Scanner::new(r"\u0069f", ErrorHandler::new(true));
    let token = scanner.lex().unwrap_or_else(|e| panic!("{}", e));
    assert_eq!(token.token_type, TokenType::Keyword);
    assert_eq!(scanner.error_handler().errors().len(), 1);
}

#[test]
fn test_punctuators_longest_match() {
    let values: Vec<String> = lex(">>>= >>> <<= ** **= => && || ++ -- != == <= >= ~ ? : . ,")
        .into_iter()
        .map(|t| t.display_value())
        .collect();
    assert_eq!(
        values,
        vec![
            ">>>=", ">>>", "<<=", "**", "**=", "=>", "&&", "||", "++", "--", "!=", "==", "<=",
            ">=", "~", "?", ":", ".", ","
        ]
    );
    assert_eq!(
        kinds("a>>=b")[1],
        (TokenType::Punctuator, ">>=".to_string())
    );
}

#[test]
fn test_unknown_character_is_illegal() {
    assert_eq!(lex_err("a @ b").description, "Unexpected token ILLEGAL");
    assert_eq!(lex_err("#").index, 0);
}

#[test]
fn test_block_comments_are_not_comments() {
    let values: Vec<String> = lex("/* x */").into_iter().map(|t| t.display_value()).collect();
    assert_eq!(values, vec!["/", "*", "x", "*", "/"]);
}

#[test]
fn test_line_comments_are_skipped() {
    let tokens = lex("a // first\n// second\nb");
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[1].line_number, 3);
}

#[test]
fn test_comment_tracking() {
    let mut scanner = Scanner::new("  // hello\nx", ErrorHandler::new(false));
    scanner.track_comment = true;
    let comments = scanner.scan_comments();
    assert_eq!(comments.len(), 1);
    assert!(!comments[0].multi_line);
    assert_eq!(comments[0].range, (2, 10));
    assert_eq!(comments[0].slice, (4, 10));
    assert_eq!(comments[0].loc.start.line, 1);
    assert_eq!(comments[0].loc.start.column, 2);
    assert_eq!(scanner.line_number(), 2);
}

#[test]
fn test_untracked_comments_still_advance() {
    let mut scanner = Scanner::new("// hello\nx", ErrorHandler::new(false));
    assert!(scanner.scan_comments().is_empty());
    assert_eq!(scanner.index(), 9);
}

#[test]
fn test_save_restore_round_trip() {
    let source = "  // lead\n  { count += 0x10 }";
    let mut scanner = Scanner::new(source, ErrorHandler::new(false));
    scanner.scan_comments();
    scanner.lex().unwrap_or_else(|e| panic!("{}", e));

    let state = scanner.save_state();
    scanner.scan_comments();
    let first = scanner.lex().unwrap_or_else(|e| panic!("{}", e));
    scanner.scan_comments();
    scanner.lex().unwrap_or_else(|e| panic!("{}", e));

    scanner.restore_state(state);
    assert_eq!(scanner.save_state(), state);
    scanner.scan_comments();
    let second = scanner.lex().unwrap_or_else(|e| panic!("{}", e));
    assert_eq!(first, second);
}

#[test]
fn test_eof_token() {
    let mut scanner = Scanner::new("x", ErrorHandler::new(false));
    scanner.lex().unwrap_or_else(|e| panic!("{}", e));
    assert!(scanner.eof());
    let eof = scanner.lex().unwrap_or_else(|e| panic!("{}", e));
    assert_eq!(eof.token_type, TokenType::Eof);
    assert_eq!((eof.start, eof.end), (1, 1));
}
