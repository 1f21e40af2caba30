#![no_main]

use libfuzzer_sys::fuzz_target;
use rbparse::error::ErrorHandler;
use rbparse::{Scanner, TokenType};

fuzz_target!(|data: &[u8]| {
    // Only process valid UTF-8
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    // Limit input size to avoid timeout
    if source.len() > 100_000 {
        return;
    }

    let mut scanner = Scanner::new(source, ErrorHandler::new(true));
    scanner.track_comment = true;

    // Consume all tokens - an error or EOF ends the stream, never a panic
    loop {
        scanner.scan_comments();
        let before = scanner.index();
        match scanner.lex() {
            Ok(token) if token.token_type == TokenType::Eof => break,
            Ok(_) => assert!(scanner.index() > before, "scanner made no progress"),
            Err(_) => break,
        }
    }
});
