//! JavaScript comment stripping
//!
//! Two strippers share one output contract:
//!
//! - [`scanner`]: the default line-oriented heuristic scanner. Its output is
//!   the reference behaviour.
//! - [`lexer`]: an opt-in character-level state machine that understands
//!   strings, template literals, regex literals and escapes.

use serde::{Deserialize, Serialize};

pub mod lexer;
pub mod scanner;

pub use scanner::{JsCommentScanner, ScannerState, strip_comments};

/// Which comment stripper to run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StripMode {
    /// Line-oriented scanner with pattern guards
    #[default]
    Heuristic,
    /// Character-level scanner
    Lexical,
}

impl std::fmt::Display for StripMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Heuristic => write!(f, "heuristic"),
            Self::Lexical => write!(f, "lexical"),
        }
    }
}

/// Result of stripping a whole file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrippedSource {
    /// Kept lines joined with `\n`, without a trailing newline
    pub text: String,
    /// Scanner state at end of input
    pub state: ScannerState,
}

/// Strip comments from a whole JavaScript file.
pub fn strip_source(source: &str, mode: StripMode) -> StrippedSource {
    let (lines, state) = match mode {
        StripMode::Heuristic => {
            let mut scanner = JsCommentScanner::new();
            let lines: Vec<String> = source
                .lines()
                .filter_map(|line| scanner.scan_line(line))
                .collect();
            (lines, scanner.state())
        }
        StripMode::Lexical => lexer::strip_lines(source),
    };

    StrippedSource {
        text: lines.join("\n"),
        state,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SAMPLE: &str = "\
// Module header
import { api } from './api.js';

/**
 * Load a passage.
 */
export async function load(ref) {
    const url = base + ref; // endpoint
    return api.get(url); /* cached */
}
";

    #[test]
    fn test_strip_source_heuristic() {
        let stripped = strip_source(SAMPLE, StripMode::Heuristic);
        assert_eq!(
            stripped.text,
            "import { api } from './api.js';\n\
             export async function load(ref) {\n    \
             const url = base + ref;\n    \
             return api.get(url);\n\
             }"
        );
        assert!(stripped.state.is_clean());
    }

    #[test]
    fn test_modes_agree_on_ordinary_code() {
        assert_eq!(
            strip_source(SAMPLE, StripMode::Heuristic),
            strip_source(SAMPLE, StripMode::Lexical)
        );
    }

    #[test]
    fn test_unterminated_block_is_reported() {
        for mode in [StripMode::Heuristic, StripMode::Lexical] {
            let stripped = strip_source("a();\n/* open\nb();\n", mode);
            assert_eq!(stripped.text, "a();", "{mode}");
            assert!(stripped.state.in_block_comment, "{mode}");
        }
    }

    #[test]
    fn test_strip_mode_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: StripMode,
        }
        let parsed: Wrapper = toml::from_str("mode = \"lexical\"").unwrap();
        assert_eq!(parsed.mode, StripMode::Lexical);
        assert_eq!(StripMode::default(), StripMode::Heuristic);
    }
}
