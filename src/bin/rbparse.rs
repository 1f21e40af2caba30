//! CLI tool that parses a script and prints the syntax tree as JSON
//!
//! Usage: rbparse [options] [FILE]
//!
//! Options:
//!   --tolerant         Record recoverable errors instead of stopping at the first one
//!   --range            Attach byte ranges to every node
//!   --loc              Attach line/column locations to every node
//!   --tokens           Include the token list
//!   --comment          Include comments
//!   --tokenize         Print the flat token list instead of the tree
//!   --options <json>   Options as a JSON object, e.g. '{"range": true}'
//!
//! Reads standard input when no FILE is given.

use std::env;
use std::fs;
use std::io::Read;

use rbparse::{ParseOptions, parse, tokenize};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// CLI configuration
struct Config {
    options: ParseOptions,
    tokenize: bool,
    input: Option<String>,
}

fn parse_args() -> Result<Config, String> {
    let args: Vec<String> = env::args().collect();
    let program_name = args.first().map_or("rbparse", |s| s.as_str());

    let mut options = ParseOptions::default();
    let mut tokenize = false;
    let mut input: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        let Some(arg) = args.get(i) else {
            break;
        };
        match arg.as_str() {
            "--tolerant" => options.tolerant = true,
            "--range" => options.range = true,
            "--loc" => options.loc = true,
            "--tokens" => options.tokens = true,
            "--comment" => options.comment = true,
            "--tokenize" => tokenize = true,
            "--options" => {
                i += 1;
                let json = args
                    .get(i)
                    .ok_or_else(|| "--options requires a value".to_string())?;
                options = ParseOptions::from_json(json)
                    .map_err(|e| format!("--options must be a JSON object: {}", e))?;
            }
            "-h" | "--help" => {
                return Err(format!(
                    "Usage: {} [--tolerant] [--range] [--loc] [--tokens] [--comment] [--tokenize] [--options <json>] [FILE]",
                    program_name
                ));
            }
            _ if arg.starts_with('-') => return Err(format!("Unknown option: {}", arg)),
            _ => input = Some(arg.clone()),
        }
        i += 1;
    }

    if options.loc && options.source.is_none() {
        options.source = input.clone();
    }

    Ok(Config {
        options,
        tokenize,
        input,
    })
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_args()?;

    let source = match &config.input {
        Some(path) => {
            fs::read_to_string(path).map_err(|e| format!("Cannot read {}: {}", path, e))?
        }
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let json = if config.tokenize {
        serde_json::to_string_pretty(&tokenize(&source, &config.options)?)?
    } else {
        serde_json::to_string_pretty(&parse(&source, &config.options)?)?
    };
    println!("{}", json);
    Ok(())
}
