use serde::{Deserialize, Serialize};
use texmath_syntax::DEFAULT_MAX_DEPTH;

/// Parser settings.
///
/// Missing JSON fields fall back to their defaults, so
/// `{"strictCommands": true}` is a complete configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseOptions {
    /// Reject commands the registry does not know instead of treating them
    /// as symbols.
    pub strict_commands: bool,
    /// Bound on structural nesting, both in the token tree and in the
    /// rewrite engine's recursion.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict_commands: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let options = ParseOptions::from_json(r#"{"strictCommands": true}"#).unwrap();
        assert!(options.strict_commands);
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_round_trips_camel_case() {
        let options = ParseOptions {
            strict_commands: false,
            max_depth: 16,
        };
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(json, r#"{"strictCommands":false,"maxDepth":16}"#);
    }
}
