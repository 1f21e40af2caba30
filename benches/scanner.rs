//! Scanner benchmarks
//!
//! Run with: cargo bench --bench scanner
//! Profile with: cargo flamegraph --bench scanner -- --bench

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rbparse::error::ErrorHandler;
use rbparse::{ParseOptions, Scanner, TokenType, tokenize};

/// Simple expression
const SIMPLE_EXPR: &str = "1 + 2 * 3 - 4 / 5";

/// String literals with escapes
const STRINGS: &str = r#"
hello = "Hello, World!"
escaped = "Line1\nLine2\tTabbed"
unicode = "\u{1F600} smile A \x42"
pair = '😀'
joined = 'first \
second'
"#;

/// Operators stress test
const OPERATORS: &str = r#"
a + b - c * d / e % f ** g
x == y != z
a && b || !c
a & b | c ^ ~d
a << 2 >> 3 >>> 4
a += b -= c *= d /= e %= f **= g
a <<= 1 >>= 2 >>>= 3 &= 4 |= 5 ^= 6
a < b <= c > d >= e
++x --y x++ y--
"#;

/// Numeric literals
const NUMBERS: &str = r#"
0 1 42 3.14 .5 1e10 1.5e-3 2E+4
0xFF 0xdeadBEEF 0o777 0O17 0b1010 0B11
"#;

/// Identifiers and keywords
const IDENTIFIERS: &str = r#"
def while for if else return break continue let const function
foo bar_baz $dollar _under café naïve x1 y2 z3
true false null var throw
"#;

/// Line comments
const COMMENTS: &str = r#"
// A comment line
x = 1 // trailing comment
// Another
// And another
y = 2
"#;

fn generate_large_source(size: usize) -> String {
    let mut source = String::with_capacity(size);
    let patterns = [STRINGS, OPERATORS, NUMBERS, IDENTIFIERS, COMMENTS];

    let mut i = 0;
    while source.len() < size {
        if let Some(pattern) = patterns.get(i % patterns.len()) {
            source.push_str(pattern);
            source.push('\n');
        }
        i += 1;
    }
    source
}

fn scan_all(source: &str, track_comment: bool) {
    let mut scanner = Scanner::new(black_box(source), ErrorHandler::new(false));
    scanner.track_comment = track_comment;
    loop {
        black_box(scanner.scan_comments());
        match scanner.lex() {
            Ok(token) if token.token_type == TokenType::Eof => break,
            Ok(token) => {
                black_box(&token);
            }
            Err(err) => {
                black_box(err);
                break;
            }
        }
    }
}

fn bench_scanner_individual(c: &mut Criterion) {
    let mut group = c.benchmark_group("scanner/individual");

    let cases = [
        ("simple_expr", SIMPLE_EXPR),
        ("strings", STRINGS),
        ("operators", OPERATORS),
        ("numbers", NUMBERS),
        ("identifiers", IDENTIFIERS),
        ("comments", COMMENTS),
    ];

    for (name, source) in cases {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("bytes", name), source, |b, s| {
            b.iter(|| scan_all(s, false));
        });
    }

    group.finish();
}

fn bench_scanner_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("scanner/throughput");

    for size in [1_000, 10_000, 100_000, 500_000] {
        let source = generate_large_source(size);
        let actual_size = source.len();

        group.throughput(Throughput::Bytes(actual_size as u64));
        group.bench_with_input(
            BenchmarkId::new("large_source", format!("{}KB", actual_size / 1024)),
            &source,
            |b, s| {
                b.iter(|| scan_all(s, false));
            },
        );
    }

    group.finish();
}

fn bench_scanner_comment_tracking(c: &mut Criterion) {
    let mut group = c.benchmark_group("scanner/comment_tracking");
    let source: String = (0..1000)
        .map(|i| format!("x{} = {} // note {}\n", i, i, i))
        .collect();
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("skipped", |b| {
        b.iter(|| scan_all(&source, false));
    });

    group.bench_function("tracked", |b| {
        b.iter(|| scan_all(&source, true));
    });

    group.finish();
}

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("scanner/tokenize");
    let source = generate_large_source(100_000);
    group.throughput(Throughput::Bytes(source.len() as u64));

    let located = ParseOptions {
        range: true,
        loc: true,
        comment: true,
        ..ParseOptions::default()
    };

    group.bench_function("plain", |b| {
        b.iter(|| black_box(tokenize(black_box(&source), &ParseOptions::default())));
    });

    group.bench_function("located", |b| {
        b.iter(|| black_box(tokenize(black_box(&source), &located)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_scanner_individual,
    bench_scanner_throughput,
    bench_scanner_comment_tracking,
    bench_tokenize,
);
criterion_main!(benches);
