//! CSS rewrite stages
//!
//! The minifier treats a stylesheet as a flat character stream and runs a
//! fixed sequence of regex substitutions over the whole text. Each stage
//! consumes the complete output of the previous one, and later stages rely on
//! the normalization done by earlier ones (structural collapsing assumes that
//! comments and line breaks are already gone).
//!
//! Quoted strings are not parsed. A `;` or `}` inside a `content: "..."`
//! value is collapsed exactly like real syntax.

use std::borrow::Cow;

use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;

/// Knobs for the CSS minifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinifyOptions {
    /// Strip non-standard `//` line comments (to end of line).
    ///
    /// This also removes anything after `//` in unquoted URLs, which is why
    /// it can be turned off for stylesheets that reference absolute URLs.
    pub strip_line_comments: bool,
}

impl Default for MinifyOptions {
    fn default() -> Self {
        Self {
            strip_line_comments: true,
        }
    }
}

#[derive(Debug)]
enum Rewrite {
    Replace {
        pattern: Regex,
        replacement: &'static str,
    },
    Trim,
}

/// A single named rewrite applied to the whole stylesheet
#[derive(Debug)]
struct Stage {
    name: &'static str,
    rewrite: Rewrite,
}

impl Stage {
    fn replace(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        Self {
            name,
            rewrite: Rewrite::Replace {
                pattern: Regex::new(pattern).expect("CSS stage pattern must compile"),
                replacement,
            },
        }
    }

    const fn trim(name: &'static str) -> Self {
        Self {
            name,
            rewrite: Rewrite::Trim,
        }
    }

    fn apply(&self, text: String) -> String {
        let rewritten = match &self.rewrite {
            Rewrite::Replace {
                pattern,
                replacement,
            } => match pattern.replace_all(&text, *replacement) {
                Cow::Borrowed(_) => text,
                Cow::Owned(changed) => changed,
            },
            Rewrite::Trim => {
                let trimmed = text.trim();
                if trimmed.len() == text.len() {
                    text
                } else {
                    trimmed.to_owned()
                }
            }
        };
        trace!("css stage '{}' -> {} bytes", self.name, rewritten.len());
        rewritten
    }
}

static BLOCK_COMMENTS: Lazy<Stage> =
    Lazy::new(|| Stage::replace("block comments", r"(?s)/\*.*?\*/", ""));

static LINE_COMMENTS: Lazy<Stage> = Lazy::new(|| Stage::replace("line comments", r"//.*", ""));

/// Characters whose surrounding whitespace carries no meaning
const STRUCTURAL: [&str; 12] = ["{", "}", ":", ";", ",", ">", "+", "~", "(", ")", "[", "]"];

static STAGES: Lazy<Vec<Stage>> = Lazy::new(|| {
    let mut stages = vec![
        Stage::replace("line breaks", r"[\r\n]+", " "),
        Stage::replace("tabs", r"\t", " "),
    ];

    stages.extend(STRUCTURAL.into_iter().map(|token| {
        let pattern = format!(r"\s*{}\s*", regex::escape(token));
        Stage::replace("structural whitespace", &pattern, token)
    }));

    stages.extend([
        Stage::replace("!important", r"\s*!\s*important", "!important"),
        Stage::replace("trailing semicolon", r";\}", "}"),
        Stage::replace("whitespace runs", r"\s+", " "),
        Stage::trim("trim"),
        Stage::replace("rule line breaks", r"\}", "}\n"),
        Stage::replace("leading indentation", r"(?m)^\s+", ""),
        Stage::replace("empty lines", r"(?m)^\s*$\n", ""),
    ]);

    stages
});

/// Minify a stylesheet with the default options.
///
/// Total function: malformed CSS is rewritten best-effort and never rejected.
pub fn minify(text: &str) -> String {
    minify_with(text, &MinifyOptions::default())
}

/// Minify a stylesheet.
pub fn minify_with(text: &str, options: &MinifyOptions) -> String {
    let mut css = strip_comments(text, options);
    for stage in STAGES.iter() {
        css = stage.apply(css);
    }
    css
}

/// Remove block comments and, if enabled, `//` line comments.
///
/// Block comments are matched non-greedily, so two comments never swallow the
/// rules between them. Removal repeats until no comment is left, since
/// excising one can join the text around it into a new `/*`.
pub fn strip_comments(text: &str, options: &MinifyOptions) -> String {
    let mut css = text.to_owned();
    loop {
        let before = css.len();
        css = BLOCK_COMMENTS.apply(css);
        if css.len() == before {
            break;
        }
    }
    if options.strip_line_comments {
        LINE_COMMENTS.apply(css)
    } else {
        css
    }
}
