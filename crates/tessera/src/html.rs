//! Light HTML minification
//!
//! Only comments and whitespace are touched; markup is never restructured.
//! A leading license comment and IE conditional comments survive. Inline
//! `<script>` and `<pre>` contents are collapsed like everything else.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// Options for [`minify`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HtmlOptions {
    /// A comment at the very start of the document is kept verbatim when its
    /// body contains every one of these markers (case-insensitive). An empty
    /// list disables the preservation.
    pub preserve_comment_markers: Vec<String>,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            preserve_comment_markers: vec!["GNU General Public License".to_owned()],
        }
    }
}

/// Remove comments and collapse whitespace.
pub fn minify(html: &str, options: &HtmlOptions) -> String {
    let (header, body) = split_preserved_header(html, options);
    let without_comments = remove_comments(body);
    let collapsed = WHITESPACE.replace_all(&without_comments, " ");

    let mut result = String::with_capacity(header.len() + collapsed.len());
    result.push_str(header);
    result.push_str(collapsed.trim());
    result
}

/// Split off a leading license comment, if there is one to keep.
fn split_preserved_header<'a>(html: &'a str, options: &HtmlOptions) -> (&'a str, &'a str) {
    if options.preserve_comment_markers.is_empty() || !html.starts_with(COMMENT_OPEN) {
        return ("", html);
    }
    let Some(close) = html.find(COMMENT_CLOSE) else {
        return ("", html);
    };

    let end = close + COMMENT_CLOSE.len();
    let comment = html[..end].to_lowercase();
    let keep = options
        .preserve_comment_markers
        .iter()
        .all(|marker| comment.contains(&marker.to_lowercase()));

    if keep {
        debug!("Preserving {end} byte leading comment");
        html.split_at(end)
    } else {
        ("", html)
    }
}

/// Whether the comment body following `<!--` is an IE conditional
fn is_conditional_comment(after_open: &str) -> bool {
    (after_open.starts_with("[if") && after_open[3..].contains("]>"))
        || after_open.starts_with("<![endif]")
}

/// Remove every `<!-- ... -->` except IE conditional comments.
///
/// A comment without a closing `-->` is left untouched.
pub fn remove_comments(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(open) = rest.find(COMMENT_OPEN) {
        let after_open = &rest[open + COMMENT_OPEN.len()..];
        if is_conditional_comment(after_open) {
            result.push_str(&rest[..open + COMMENT_OPEN.len()]);
            rest = after_open;
            continue;
        }
        let Some(close) = after_open.find(COMMENT_CLOSE) else {
            break;
        };
        result.push_str(&rest[..open]);
        rest = &after_open[close + COMMENT_CLOSE.len()..];
    }

    result.push_str(rest);
    result
}
