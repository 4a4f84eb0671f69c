//! Whitespace and comments between significant tokens
//!
//! A [`Space`] is everything insignificant that precedes a node: a leading
//! whitespace run followed by zero or more comments, each of which carries
//! the whitespace that follows it as its suffix. Printing a space emits the
//! whitespace, then every comment's text and suffix in order, which
//! reproduces the original gap exactly.

use super::intern::WhitespaceInterner;
use std::fmt;
use std::sync::Arc;

/// Delimiter that opens a line comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineDelimiter {
    /// `# ...`
    Hash,
    /// `// ...`
    DoubleSlash,
}

impl LineDelimiter {
    pub fn as_str(self) -> &'static str {
        match self {
            LineDelimiter::Hash => "#",
            LineDelimiter::DoubleSlash => "//",
        }
    }
}

/// How a comment is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentStyle {
    Line(LineDelimiter),
    /// `/* ... */`
    Block,
}

/// The comment forms a language accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentSyntax {
    pub line: &'static [LineDelimiter],
    pub block: bool,
}

impl CommentSyntax {
    /// `#` line comments only
    pub const HASH: CommentSyntax = CommentSyntax {
        line: &[LineDelimiter::Hash],
        block: false,
    };

    /// `#` and `//` line comments plus `/* */` blocks
    pub const HASH_AND_C: CommentSyntax = CommentSyntax {
        line: &[LineDelimiter::Hash, LineDelimiter::DoubleSlash],
        block: true,
    };

    /// `//` line comments plus `/* */` blocks
    pub const C: CommentSyntax = CommentSyntax {
        line: &[LineDelimiter::DoubleSlash],
        block: true,
    };

    fn line_at(&self, rest: &str) -> Option<LineDelimiter> {
        self.line
            .iter()
            .copied()
            .find(|delimiter| rest.starts_with(delimiter.as_str()))
    }
}

/// A single comment and the whitespace after it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Comment {
    style: CommentStyle,
    /// Full comment text, delimiters included
    text: Arc<str>,
    suffix: Arc<str>,
}

impl Comment {
    pub fn new(style: CommentStyle, text: impl Into<Arc<str>>, suffix: impl Into<Arc<str>>) -> Self {
        Self {
            style,
            text: text.into(),
            suffix: suffix.into(),
        }
    }

    pub fn style(&self) -> CommentStyle {
        self.style
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Comment text without its delimiters
    pub fn body(&self) -> &str {
        match self.style {
            CommentStyle::Line(delimiter) => self
                .text
                .strip_prefix(delimiter.as_str())
                .unwrap_or(&self.text),
            CommentStyle::Block => {
                let inner = self.text.strip_prefix("/*").unwrap_or(&self.text);
                inner.strip_suffix("*/").unwrap_or(inner)
            }
        }
    }

    pub fn with_suffix(&self, suffix: impl Into<Arc<str>>) -> Self {
        Self {
            suffix: suffix.into(),
            ..self.clone()
        }
    }

    pub fn with_text(&self, text: impl Into<Arc<str>>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }
}

/// Whitespace and comments preceding a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Space {
    whitespace: Option<Arc<str>>,
    comments: Vec<Comment>,
}

impl Space {
    pub const EMPTY: Space = Space {
        whitespace: None,
        comments: Vec::new(),
    };

    pub fn build(whitespace: impl AsRef<str>, comments: Vec<Comment>) -> Self {
        let whitespace = whitespace.as_ref();
        Self {
            whitespace: (!whitespace.is_empty()).then(|| Arc::from(whitespace)),
            comments,
        }
    }

    /// Space consisting only of a whitespace run
    pub fn whitespace_only(whitespace: impl AsRef<str>) -> Self {
        Self::build(whitespace, Vec::new())
    }

    /// Structure a raw gap of insignificant text
    pub fn format(raw: &str, syntax: &CommentSyntax) -> Self {
        Self::format_with(raw, syntax, None)
    }

    /// Structure a raw gap, sharing whitespace runs through `interner`
    pub fn format_with(
        raw: &str,
        syntax: &CommentSyntax,
        interner: Option<&WhitespaceInterner>,
    ) -> Self {
        if raw.is_empty() {
            return Self::EMPTY;
        }

        let share = |text: &str| -> Arc<str> {
            match interner {
                Some(interner) => interner.intern(text),
                None => Arc::from(text),
            }
        };

        // Each scanned comment remembers the whitespace *before* it until the
        // shift pass below moves that run onto its predecessor.
        let mut scanned: Vec<(CommentStyle, &str, String)> = Vec::new();
        let mut buffer = String::new();
        let mut state = ScanState::Whitespace;
        let mut comment_start = 0;
        let mut preceding = String::new();
        let mut i = 0;

        while i < raw.len() {
            let rest = &raw[i..];
            match state {
                ScanState::Whitespace => {
                    if syntax.block && rest.starts_with("/*") {
                        preceding = std::mem::take(&mut buffer);
                        state = ScanState::Block;
                        comment_start = i;
                        i += 2;
                        continue;
                    }
                    if let Some(delimiter) = syntax.line_at(rest) {
                        preceding = std::mem::take(&mut buffer);
                        state = ScanState::Line(delimiter);
                        comment_start = i;
                        i += delimiter.as_str().len();
                        continue;
                    }
                    let c = next_char(rest);
                    buffer.push(c);
                    i += c.len_utf8();
                }
                ScanState::Line(delimiter) => {
                    if rest.starts_with('\n') || rest.starts_with('\r') {
                        // The terminator stays behind as whitespace
                        scanned.push((
                            CommentStyle::Line(delimiter),
                            &raw[comment_start..i],
                            std::mem::take(&mut preceding),
                        ));
                        state = ScanState::Whitespace;
                        continue;
                    }
                    i += next_char(rest).len_utf8();
                }
                ScanState::Block => {
                    if rest.starts_with("*/") {
                        i += 2;
                        scanned.push((
                            CommentStyle::Block,
                            &raw[comment_start..i],
                            std::mem::take(&mut preceding),
                        ));
                        state = ScanState::Whitespace;
                        continue;
                    }
                    i += next_char(rest).len_utf8();
                }
            }
        }

        // A comment running into the end of the gap has no terminator
        match state {
            ScanState::Whitespace => {}
            ScanState::Line(delimiter) => scanned.push((
                CommentStyle::Line(delimiter),
                &raw[comment_start..],
                preceding,
            )),
            ScanState::Block => {
                scanned.push((CommentStyle::Block, &raw[comment_start..], preceding))
            }
        }

        // Shift pass: the whitespace after the last comment is its suffix, the
        // whitespace before it is the previous comment's suffix, and the run
        // before the first comment is the space's own whitespace.
        let mut whitespace = buffer;
        let mut comments = Vec::with_capacity(scanned.len());
        for (style, text, before) in scanned.into_iter().rev() {
            comments.push(Comment::new(style, text, share(&whitespace)));
            whitespace = before;
        }
        comments.reverse();

        Self {
            whitespace: (!whitespace.is_empty()).then(|| share(&whitespace)),
            comments,
        }
    }

    /// Leading whitespace run, empty if there is none
    pub fn whitespace(&self) -> &str {
        self.whitespace.as_deref().unwrap_or("")
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn is_empty(&self) -> bool {
        self.whitespace.is_none() && self.comments.is_empty()
    }

    /// Whitespace immediately before the node: the last comment's suffix,
    /// or the leading run when there are no comments
    pub fn last_whitespace(&self) -> &str {
        match self.comments.last() {
            Some(comment) => comment.suffix(),
            None => self.whitespace(),
        }
    }

    /// Indentation of the node on its line, if it starts a line
    pub fn indent(&self) -> Option<&str> {
        let last = self.last_whitespace();
        last.rfind('\n').map(|newline| &last[newline + 1..])
    }

    pub fn with_whitespace(&self, whitespace: impl AsRef<str>) -> Self {
        Self::build(whitespace, self.comments.clone())
    }

    pub fn with_comments(&self, comments: Vec<Comment>) -> Self {
        Self {
            whitespace: self.whitespace.clone(),
            comments,
        }
    }

    /// Total printed length in bytes
    pub fn len(&self) -> usize {
        self.whitespace().len()
            + self
                .comments
                .iter()
                .map(|c| c.text().len() + c.suffix().len())
                .sum::<usize>()
    }

    /// Append the exact text of this space
    pub fn write_to(&self, out: &mut String) {
        out.push_str(self.whitespace());
        for comment in &self.comments {
            out.push_str(comment.text());
            out.push_str(comment.suffix());
        }
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity(self.len());
        self.write_to(&mut out);
        f.write_str(&out)
    }
}

#[derive(Clone, Copy)]
enum ScanState {
    Whitespace,
    Line(LineDelimiter),
    Block,
}

fn next_char(rest: &str) -> char {
    // Callers only ask while `rest` is non-empty
    rest.chars().next().unwrap_or('\0')
}
