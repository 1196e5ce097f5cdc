//! Character-level JavaScript comment stripper
//!
//! Unlike [`super::scanner`], this walks the source one character at a time
//! through a small tagged state machine, so comment markers inside strings,
//! template literals and regex literals are never mistaken for comments.
//! Escapes are honoured. Whether a `/` starts a regex or is a division is
//! decided from the previous significant token, which is the usual
//! approximation without a full parser.
//!
//! Output follows the same line contract as the heuristic scanner: lines left
//! blank are dropped, trailing whitespace before a removed comment is trimmed,
//! and code that resumes after a multi-line block comment loses its leading
//! whitespace. Lines that end inside a string or template literal are never
//! trimmed or dropped.

use std::{iter::Peekable, str::Chars};

use super::scanner::ScannerState;
use crate::util::truncate_trailing_whitespace;

/// Keywords after which a `/` starts a regex literal
const REGEX_KEYWORDS: &[&str] = &[
    "await",
    "case",
    "delete",
    "do",
    "else",
    "in",
    "instanceof",
    "new",
    "of",
    "return",
    "throw",
    "typeof",
    "void",
    "yield",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Code,
    SingleQuote,
    DoubleQuote,
    Template,
    Regex,
    RegexClass,
    LineComment,
    BlockComment,
}

impl LexState {
    const fn is_literal(self) -> bool {
        matches!(
            self,
            Self::SingleQuote | Self::DoubleQuote | Self::Template | Self::Regex | Self::RegexClass
        )
    }
}

/// Last significant token emitted in code, used to tell regexes from divisions
#[derive(Debug, Clone, PartialEq, Eq)]
enum PrevToken {
    Start,
    Punct(char),
    Word(String),
    /// `++` or `--`; only ever follows an operand here
    Increment,
    /// A string, template or regex literal
    Literal,
}

impl PrevToken {
    fn allows_regex(&self) -> bool {
        match self {
            Self::Start => true,
            Self::Punct(ch) => !matches!(ch, ')' | ']'),
            Self::Word(word) => REGEX_KEYWORDS.contains(&word.as_str()),
            Self::Increment | Self::Literal => false,
        }
    }
}

#[derive(Debug)]
struct Lexer<'src> {
    chars: Peekable<Chars<'src>>,
    state: LexState,
    prev: PrevToken,
    /// The previous code character continues an identifier
    word_open: bool,
    /// Open `${` interpolations, each with its own brace depth
    interpolations: Vec<usize>,
    line: String,
    comment_on_line: bool,
    block_opened_here: bool,
    skip_leading_ws: bool,
    lines: Vec<String>,
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

impl<'src> Lexer<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            chars: source.chars().peekable(),
            state: LexState::Code,
            prev: PrevToken::Start,
            word_open: false,
            interpolations: Vec::new(),
            line: String::new(),
            comment_on_line: false,
            block_opened_here: false,
            skip_leading_ws: false,
            lines: Vec::new(),
        }
    }

    fn run(mut self) -> (Vec<String>, ScannerState) {
        while let Some(ch) = self.chars.next() {
            if ch == '\r' && self.chars.peek() == Some(&'\n') {
                continue;
            }
            if ch == '\n' {
                self.end_line();
                continue;
            }
            match self.state {
                LexState::Code => self.code(ch),
                LexState::SingleQuote => self.quoted(ch, '\''),
                LexState::DoubleQuote => self.quoted(ch, '"'),
                LexState::Template => self.template(ch),
                LexState::Regex => self.regex(ch),
                LexState::RegexClass => self.regex_class(ch),
                LexState::LineComment => {}
                LexState::BlockComment => self.block_comment(ch),
            }
        }
        self.finish_line();

        let state = ScannerState {
            in_block_comment: self.state == LexState::BlockComment,
        };
        (self.lines, state)
    }

    fn end_line(&mut self) {
        match self.state {
            // A trailing backslash continues a string onto the next line
            LexState::SingleQuote | LexState::DoubleQuote if self.line.ends_with('\\') => {}
            // Otherwise single-line literals end with the line
            LexState::SingleQuote
            | LexState::DoubleQuote
            | LexState::Regex
            | LexState::RegexClass => {
                self.state = LexState::Code;
                self.prev = PrevToken::Literal;
            }
            LexState::LineComment => self.state = LexState::Code,
            _ => {}
        }
        self.finish_line();
    }

    fn finish_line(&mut self) {
        let mut line = std::mem::take(&mut self.line);
        let inside_literal = self.state.is_literal();
        if self.comment_on_line && !inside_literal {
            truncate_trailing_whitespace(&mut line);
        }
        if inside_literal || !line.trim().is_empty() {
            self.lines.push(line);
        }
        self.comment_on_line = false;
        self.block_opened_here = false;
        self.skip_leading_ws = false;
        self.word_open = false;
    }

    fn emit_code(&mut self, ch: char) {
        if ch.is_whitespace() {
            if !self.skip_leading_ws {
                self.line.push(ch);
            }
            self.word_open = false;
            return;
        }
        self.skip_leading_ws = false;
        let doubled = matches!(ch, '+' | '-')
            && self.prev == PrevToken::Punct(ch)
            && self.line.ends_with(ch);
        self.line.push(ch);

        if is_ident_char(ch) {
            match &mut self.prev {
                PrevToken::Word(word) if self.word_open => word.push(ch),
                _ => self.prev = PrevToken::Word(ch.to_string()),
            }
            self.word_open = true;
        } else {
            self.prev = if doubled {
                PrevToken::Increment
            } else {
                PrevToken::Punct(ch)
            };
            self.word_open = false;
        }
    }

    fn push_literal(&mut self, ch: char) {
        self.skip_leading_ws = false;
        self.word_open = false;
        self.line.push(ch);
    }

    fn code(&mut self, ch: char) {
        match ch {
            '/' if self.chars.peek() == Some(&'/') => {
                self.chars.next();
                self.comment_on_line = true;
                self.word_open = false;
                self.state = LexState::LineComment;
            }
            '/' if self.chars.peek() == Some(&'*') => {
                self.chars.next();
                self.comment_on_line = true;
                self.block_opened_here = true;
                self.word_open = false;
                self.state = LexState::BlockComment;
            }
            '/' if self.prev.allows_regex() => {
                self.push_literal(ch);
                self.state = LexState::Regex;
            }
            '\'' => {
                self.push_literal(ch);
                self.state = LexState::SingleQuote;
            }
            '"' => {
                self.push_literal(ch);
                self.state = LexState::DoubleQuote;
            }
            '`' => {
                self.push_literal(ch);
                self.state = LexState::Template;
            }
            '{' => {
                if let Some(depth) = self.interpolations.last_mut() {
                    *depth += 1;
                }
                self.emit_code(ch);
            }
            '}' => match self.interpolations.last_mut() {
                Some(0) => {
                    self.interpolations.pop();
                    self.push_literal(ch);
                    self.state = LexState::Template;
                }
                Some(depth) => {
                    *depth -= 1;
                    self.emit_code(ch);
                }
                None => self.emit_code(ch),
            },
            _ => self.emit_code(ch),
        }
    }

    /// Copy an escaped character verbatim
    fn escape(&mut self) {
        self.line.push('\\');
        if let Some(&next) = self.chars.peek()
            && next != '\n'
            && next != '\r'
        {
            self.chars.next();
            self.line.push(next);
        }
    }

    fn quoted(&mut self, ch: char, quote: char) {
        if ch == '\\' {
            self.escape();
            return;
        }
        self.line.push(ch);
        if ch == quote {
            self.state = LexState::Code;
            self.prev = PrevToken::Literal;
        }
    }

    fn template(&mut self, ch: char) {
        match ch {
            '\\' => self.escape(),
            '`' => {
                self.line.push(ch);
                self.state = LexState::Code;
                self.prev = PrevToken::Literal;
            }
            '$' if self.chars.peek() == Some(&'{') => {
                self.chars.next();
                self.line.push_str("${");
                self.interpolations.push(0);
                self.state = LexState::Code;
                self.prev = PrevToken::Punct('{');
            }
            _ => self.line.push(ch),
        }
    }

    fn regex(&mut self, ch: char) {
        match ch {
            '\\' => self.escape(),
            '[' => {
                self.line.push(ch);
                self.state = LexState::RegexClass;
            }
            '/' => {
                self.line.push(ch);
                self.state = LexState::Code;
                self.prev = PrevToken::Literal;
            }
            _ => self.line.push(ch),
        }
    }

    fn regex_class(&mut self, ch: char) {
        match ch {
            '\\' => self.escape(),
            ']' => {
                self.line.push(ch);
                self.state = LexState::Regex;
            }
            _ => self.line.push(ch),
        }
    }

    fn block_comment(&mut self, ch: char) {
        if ch == '*' && self.chars.peek() == Some(&'/') {
            self.chars.next();
            self.state = LexState::Code;
            self.comment_on_line = true;
            // Code after a multi-line comment loses the gap left by the closer
            self.skip_leading_ws = !self.block_opened_here;
        }
    }
}

/// Strip comments from `source`, returning the kept lines and the final state.
pub fn strip_lines(source: &str) -> (Vec<String>, ScannerState) {
    Lexer::new(source).run()
}
