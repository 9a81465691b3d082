//! Text emission and output normalization
//!
//! Fragments are appended with automatic inter-word spacing, and every
//! newline is followed by the current line prefix (blockquote markers).

use std::borrow::Cow;
use std::fmt::{self, Write};
use std::sync::LazyLock;

use regex::Regex;

/// Fragments starting with one of these join the previous text directly
const NO_SPACE_BEFORE: &[char] = &['.', ',', ';', '!', '?', ')', ']', '>'];

/// Fragments ending with one of these join the next text directly
const NO_SPACE_AFTER: &[char] = &['(', '[', '<'];

static SPACING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \r\n\t]+").unwrap());

static TRAILING_SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+\n").unwrap());

/// Consecutive empty quote-marker lines
static QUOTE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(>+)\n(?:>+\n)+").unwrap());

/// Empty quote-marker lines right after a blank line (or at the start)
static QUOTE_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\A\n*|\n\n)(?:>+\n)+").unwrap());

/// Empty quote-marker lines right before a blank line
static QUOTE_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:\n>+)+\n\n").unwrap());

static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Output buffer with spacing and line-prefix bookkeeping
#[derive(Debug, Clone, Default)]
pub struct TextEmitter {
    out: String,
    prefix: String,
    ends_with_space: bool,
    line_length: usize,
}

impl TextEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment, inserting a separating space when needed
    pub fn emit(&mut self, fragment: &str) -> fmt::Result {
        let (Some(first), Some(last)) = (fragment.chars().next(), fragment.chars().next_back())
        else {
            return Ok(());
        };

        if !self.out.is_empty()
            && !self.ends_with_space
            && !first.is_whitespace()
            && !NO_SPACE_BEFORE.contains(&first)
        {
            self.out.write_char(' ')?;
            self.line_length += 1;
        }
        self.ends_with_space = last.is_whitespace() || NO_SPACE_AFTER.contains(&last);
        self.push_lines(fragment)
    }

    /// Append a fragment exactly as given, still prefixing new lines
    pub fn emit_verbatim(&mut self, fragment: &str) -> fmt::Result {
        let Some(last) = fragment.chars().next_back() else {
            return Ok(());
        };
        self.ends_with_space = last.is_whitespace() || NO_SPACE_AFTER.contains(&last);
        self.push_lines(fragment)
    }

    fn push_lines(&mut self, fragment: &str) -> fmt::Result {
        for ch in fragment.chars() {
            self.out.write_char(ch)?;
            if ch == '\n' {
                self.line_length = 0;
                self.out.write_str(&self.prefix)?;
            } else {
                self.line_length += 1;
            }
        }
        Ok(())
    }

    /// Append text verbatim, without spacing or prefixes
    pub fn write_raw(&mut self, text: &str) -> fmt::Result {
        let Some(last) = text.chars().next_back() else {
            return Ok(());
        };
        self.out.write_str(text)?;
        self.ends_with_space = last.is_whitespace();
        self.line_length = match text.rfind('\n') {
            Some(pos) => text[pos + 1..].chars().count(),
            None => self.line_length + text.chars().count(),
        };
        Ok(())
    }

    /// Set the text written after every newline
    pub fn set_prefix(&mut self, prefix: String) {
        self.prefix = prefix;
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Characters on the current line, excluding the prefix
    pub fn line_length(&self) -> usize {
        self.line_length
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

/// Collapse whitespace runs to single spaces and trim the ends
pub fn collapse_whitespace(text: &str) -> Cow<'_, str> {
    match SPACING_RE.replace_all(text, " ") {
        Cow::Borrowed(s) => Cow::Borrowed(s.trim()),
        Cow::Owned(s) => Cow::Owned(s.trim().to_string()),
    }
}

/// Tidy a finished buffer into the final output text
pub fn normalize_output(text: &str) -> String {
    let text = TRAILING_SPACE_RE.replace_all(text, "\n");
    let text = QUOTE_RUN_RE.replace_all(&text, "${1}\n");
    let text = QUOTE_OPEN_RE.replace_all(&text, "\n\n");
    let text = QUOTE_CLOSE_RE.replace_all(&text, "\n\n");
    let text = BLANK_RUN_RE.replace_all(&text, "\n\n");
    text.trim().to_string()
}
