//! The single forward-only position of one parse
//!
//! Every builder advances the same cursor. Text before the cursor has been
//! attributed to some node already; text after it has not. The cursor never
//! moves backward, which is what guarantees that every byte of the source
//! ends up in exactly one place in the tree.

use super::fallback::FallbackLiteral;
use super::grammar::{GrammarKind, GrammarToken};
use super::intern::WhitespaceInterner;
use super::offset::{OffsetDomain, OffsetMapper};
use super::space::{CommentSyntax, Space};
use tracing::trace;

pub struct Cursor<'s> {
    source: &'s str,
    position: usize,
    mapper: OffsetMapper,
    syntax: CommentSyntax,
    interner: Option<&'s WhitespaceInterner>,
    trail: Option<Vec<usize>>,
}

impl<'s> Cursor<'s> {
    pub fn new(source: &'s str, domain: OffsetDomain, syntax: CommentSyntax) -> Self {
        Self {
            source,
            position: 0,
            mapper: OffsetMapper::new(source, domain),
            syntax,
            interner: None,
            trail: None,
        }
    }

    /// Share whitespace runs through `interner`
    pub fn with_interner(mut self, interner: &'s WhitespaceInterner) -> Self {
        self.interner = Some(interner);
        self
    }

    /// Record every position the cursor moves to
    pub fn recording(mut self) -> Self {
        self.trail = Some(vec![0]);
        self
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    /// Positions visited so far, when recording
    pub fn trail(&self) -> Option<&[usize]> {
        self.trail.as_deref()
    }

    /// Map an engine offset into a byte offset on a character boundary
    pub fn to_native(&self, offset: i64) -> Option<usize> {
        let mut index = self.mapper.to_native(offset)?;
        while !self.source.is_char_boundary(index) {
            index += 1;
        }
        Some(index)
    }

    /// Whether `start` is a real position not yet consumed
    ///
    /// Negative and out-of-order offsets mark tokens invented by the
    /// engine's error recovery.
    pub fn is_valid_start(&self, start: i64) -> bool {
        self.to_native(start)
            .is_some_and(|index| index >= self.position)
    }

    pub fn is_synthetic<K: GrammarKind>(&self, token: &GrammarToken<K>) -> bool {
        token.is_synthetic() || !self.is_valid_start(token.start)
    }

    /// Space between the cursor and `start`; moves the cursor to `start`
    ///
    /// An invalid `start` yields an empty space and leaves the cursor where
    /// it is.
    pub fn take_prefix(&mut self, start: i64) -> Space {
        match self.to_native(start) {
            Some(index) if index >= self.position => self.take_prefix_at(index),
            _ => {
                trace!(
                    "ignoring out-of-order offset {} (cursor at {})",
                    start, self.position
                );
                Space::EMPTY
            }
        }
    }

    /// Space between the cursor and a native `index`
    pub fn take_prefix_at(&mut self, index: usize) -> Space {
        if index <= self.position {
            return Space::EMPTY;
        }
        let index = index.min(self.source.len());
        let raw = &self.source[self.position..index];
        self.advance_to(index);
        Space::format_with(raw, &self.syntax, self.interner)
    }

    /// Advance over consumed token text ending at engine offset `stop`
    pub fn skip(&mut self, stop: i64) {
        if let Some(index) = self.to_native(stop) {
            self.advance_to(index);
        }
    }

    /// Advance to a native index; never moves backward
    pub fn advance_to(&mut self, index: usize) {
        let index = index.min(self.source.len());
        if index > self.position {
            self.position = index;
            if let Some(trail) = &mut self.trail {
                trail.push(index);
            }
        }
    }

    /// Consume a token: its prefix and its exact source text
    ///
    /// Returns `None`, without moving, for a synthetic token.
    pub fn token<K: GrammarKind>(&mut self, token: &GrammarToken<K>) -> Option<(Space, &'s str)> {
        if self.is_synthetic(token) {
            trace!("skipping synthetic {} token", token.kind.name());
            return None;
        }
        let prefix = self.take_prefix(token.start);
        let start = self.position;
        self.skip(token.stop);
        Some((prefix, &self.source[start..self.position]))
    }

    /// Capture a production's span as one opaque literal
    ///
    /// The prefix up to `start` stays structured; everything from there to
    /// `stop` (clamped to the source) becomes the literal's text.
    pub fn capture(&mut self, start: i64, stop: i64, production: &'static str) -> FallbackLiteral {
        let prefix = self.take_prefix(start);
        let begin = self.position;
        self.skip(stop);
        let text = &self.source[begin..self.position];
        tracing::debug!(
            "captured {} bytes of {} at {} as fallback literal",
            text.len(),
            production,
            begin
        );
        FallbackLiteral::new(prefix, text, production)
    }

    /// Everything left in the source, as end-of-file space
    pub fn finish(&mut self) -> Space {
        self.take_prefix_at(self.source.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Word;

    impl GrammarKind for Word {
        fn name(self) -> &'static str {
            "Word"
        }
    }

    fn cursor(source: &str) -> Cursor<'_> {
        Cursor::new(source, OffsetDomain::CodePoint, CommentSyntax::HASH).recording()
    }

    #[test]
    fn tokens_consume_prefix_and_text() {
        let mut cursor = cursor("  echo # hi\n  x");

        let (prefix, text) = cursor.token(&GrammarToken::new(Word, 2, 6)).unwrap();
        assert_eq!(prefix.whitespace(), "  ");
        assert_eq!(text, "echo");

        let (prefix, text) = cursor.token(&GrammarToken::new(Word, 14, 15)).unwrap();
        assert_eq!(prefix.to_string(), " # hi\n  ");
        assert_eq!(text, "x");
        assert!(cursor.is_at_end());
    }

    #[test]
    fn invalid_offsets_do_not_move_the_cursor() {
        let mut cursor = cursor("abc def");
        cursor.skip(3);

        assert!(cursor.take_prefix(-1).is_empty());
        assert!(cursor.take_prefix(1).is_empty());
        assert_eq!(cursor.position(), 3);

        assert!(cursor.token(&GrammarToken::synthetic(Word)).is_none());
        assert!(cursor.token(&GrammarToken::new(Word, 0, 3)).is_none());
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn skip_never_moves_backward() {
        let mut cursor = cursor("abcdef");
        cursor.skip(4);
        cursor.skip(2);
        cursor.advance_to(1);
        assert_eq!(cursor.position(), 4);
        assert_eq!(cursor.trail(), Some(&[0, 4][..]));
    }

    #[test]
    fn code_point_offsets_are_mapped_before_comparison() {
        // the engine counts "😀" as one position
        let source = "x=\"😀\" y";
        let mut cursor = cursor(source);

        let (_, text) = cursor.token(&GrammarToken::new(Word, 0, 5)).unwrap();
        assert_eq!(text, "x=\"😀\"");

        let (prefix, text) = cursor.token(&GrammarToken::new(Word, 6, 7)).unwrap();
        assert_eq!(prefix.whitespace(), " ");
        assert_eq!(text, "y");
    }

    #[test]
    fn capture_clamps_to_source_length() {
        let mut cursor = cursor(" (echo hi");
        let literal = cursor.capture(1, 400, "Subshell");

        assert_eq!(literal.text(), "(echo hi");
        assert_eq!(crate::lst::Tree::prefix(&literal).whitespace(), " ");
        assert!(cursor.is_at_end());
    }

    #[test]
    fn finish_returns_trailing_space() {
        let mut cursor = cursor("a\n# end\n");
        cursor.skip(1);
        let eof = cursor.finish();
        assert_eq!(eof.to_string(), "\n# end\n");
        assert_eq!(eof.comments().len(), 1);
    }

    #[test]
    fn trail_is_monotonic() {
        let mut cursor = cursor("a b c d");
        for (start, stop) in [(0, 1), (2, 3), (1, 2), (6, 7), (4, 5)] {
            cursor.token(&GrammarToken::new(Word, start, stop));
        }
        let trail = cursor.trail().unwrap();
        assert!(trail.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(cursor.position(), 7);
    }
}
