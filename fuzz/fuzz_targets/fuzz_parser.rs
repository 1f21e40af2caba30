#![no_main]

use libfuzzer_sys::fuzz_target;
use rbparse::{ParseOptions, parse, tokenize};

fuzz_target!(|data: &[u8]| {
    // Only process valid UTF-8
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    // Limit input size to avoid timeout
    if source.len() > 100_000 {
        return;
    }

    // Parse should return Ok or Err, never panic
    let _ = parse(source, &ParseOptions::default());

    let everything = ParseOptions {
        range: true,
        loc: true,
        tokens: true,
        comment: true,
        tolerant: true,
        ..ParseOptions::default()
    };
    if let Ok(script) = parse(source, &everything) {
        let _ = serde_json::to_string(&script);
    }

    let _ = tokenize(source, &everything);
});
