//! Line-oriented JavaScript comment scanner
//!
//! The scanner works one line at a time and carries a single bit of state
//! across lines: whether it is inside a `/* ... */` block comment. It does not
//! tokenize strings, template literals or regular expressions. Instead a
//! `//` is only treated as a line comment when none of a handful of cheap
//! guards suggests it belongs to a URL, a string or a regex literal.

use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::util::truncate_trailing_whitespace;

/// Cross-line state of the scanner
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScannerState {
    /// A `/*` was opened and its `*/` has not been seen yet
    pub in_block_comment: bool,
}

impl ScannerState {
    /// `false` when the input ended inside a block comment
    pub const fn is_clean(&self) -> bool {
        !self.in_block_comment
    }
}

// Guards matched against the text before the `//`
static SCHEME_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?:$").expect("valid regex"));
static SCHEME_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"://$").expect("valid regex"));
static QUOTE_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["']$"#).expect("valid regex"));

// Guards matched against the whole line
static DOUBLE_QUOTED_SLASHES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""[^"]*//[^"]*""#).expect("valid regex"));
static SINGLE_QUOTED_SLASHES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'[^']*//[^']*'").expect("valid regex"));
static REGEX_BEFORE_SLASHES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/[^/]*/[gmiyus]*\s*//").expect("valid regex"));

/// Heuristic comment stripper for JavaScript source
#[derive(Debug, Default)]
pub struct JsCommentScanner {
    state: ScannerState,
}

impl JsCommentScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// State after the last scanned line
    pub const fn state(&self) -> ScannerState {
        self.state
    }

    /// Scan one line and return what remains of it, or `None` when nothing
    /// but whitespace is left.
    pub fn scan_line(&mut self, line: &str) -> Option<String> {
        let current = if self.state.in_block_comment {
            let end = line.find("*/")?;
            self.state.in_block_comment = false;
            let rest = line[end + 2..].trim_start();
            if rest.is_empty() {
                return None;
            }
            rest.to_owned()
        } else {
            line.to_owned()
        };

        let scanned = self.scan_code(current);
        if scanned.trim().is_empty() {
            None
        } else {
            Some(scanned)
        }
    }

    /// Remove block comments opened on this line, then a trailing line comment.
    fn scan_code(&mut self, mut current: String) -> String {
        while let Some(start) = current.find("/*") {
            let Some(offset) = current[start + 2..].find("*/") else {
                trace!("block comment opened: {current:?}");
                current.truncate(start);
                truncate_trailing_whitespace(&mut current);
                self.state.in_block_comment = true;
                return current;
            };

            let end = start + 2 + offset + 2;
            if current[end..].trim().is_empty() {
                current.truncate(start);
                truncate_trailing_whitespace(&mut current);
            } else {
                current.replace_range(start..end, "");
            }
        }

        if current.trim().is_empty() {
            return current;
        }
        strip_line_comment(current)
    }
}

/// Whether the `//` at `pos` should be left alone
fn is_guarded(line: &str, pos: usize) -> bool {
    let before = &line[..pos];
    SCHEME_SUFFIX.is_match(before)
        || SCHEME_SEPARATOR.is_match(before)
        || QUOTE_SUFFIX.is_match(before)
        || DOUBLE_QUOTED_SLASHES.is_match(line)
        || SINGLE_QUOTED_SLASHES.is_match(line)
        || REGEX_BEFORE_SLASHES.is_match(line)
}

fn strip_line_comment(mut line: String) -> String {
    let Some(pos) = line.find("//") else {
        return line;
    };
    if is_guarded(&line, pos) {
        trace!("kept guarded '//' in {line:?}");
        return line;
    }
    line.truncate(pos);
    truncate_trailing_whitespace(&mut line);
    line
}

/// Strip comments from a sequence of lines, dropping lines left blank.
pub fn strip_comments<I>(lines: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut scanner = JsCommentScanner::new();
    lines
        .into_iter()
        .filter_map(|line| scanner.scan_line(line.as_ref()))
        .collect()
}
