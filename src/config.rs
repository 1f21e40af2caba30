//! Parser configuration

use serde::{Deserialize, Serialize};

/// Options accepted by [`crate::parse`] and [`crate::tokenize`].
///
/// Every flag defaults to off, so `ParseOptions::default()` gives a bare AST and
/// fail-fast error handling. Can be loaded from JSON such as
/// `{"range": true, "tolerant": true}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Attach `[start, end)` byte offsets to every node.
    pub range: bool,
    /// Attach line/column spans to every node.
    pub loc: bool,
    /// Label copied into every `loc.source` when `loc` is on.
    pub source: Option<String>,
    /// Return the consumed token list as `Script::tokens`.
    pub tokens: bool,
    /// Collect comments into `Script::comments` and report them to the delegate.
    pub comment: bool,
    /// Record recoverable errors in `Script::errors` instead of failing.
    pub tolerant: bool,
}

impl ParseOptions {
    pub fn tolerant() -> Self {
        Self {
            tolerant: true,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_off() {
        let options = ParseOptions::default();
        assert!(!options.range && !options.loc && !options.tokens);
        assert!(!options.comment && !options.tolerant);
        assert_eq!(options.source, None);
    }

    #[test]
    fn test_partial_json() {
        let options = ParseOptions::from_json(r#"{"range": true, "source": "main.rb"}"#).unwrap();
        assert!(options.range);
        assert!(!options.tolerant);
        assert_eq!(options.source.as_deref(), Some("main.rb"));
    }
}
