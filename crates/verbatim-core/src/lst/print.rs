//! Output buffer shared by the language printers
//!
//! Printers are the dual of the builders: for each node they emit the prefix
//! space, then the node's own tokens and children in the order the builder
//! consumed them. The helpers here cover the padded wrappers so every
//! language prints delimiters the same way.

use super::fallback::FallbackLiteral;
use super::padded::{Container, LeftPadded, RightPadded};
use super::space::Space;
use super::tree::Tree;

#[derive(Debug, Default)]
pub struct PrintOutput {
    out: String,
}

impl PrintOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity),
        }
    }

    pub fn append(&mut self, text: &str) -> &mut Self {
        self.out.push_str(text);
        self
    }

    pub fn space(&mut self, space: &Space) -> &mut Self {
        space.write_to(&mut self.out);
        self
    }

    pub fn fallback(&mut self, literal: &FallbackLiteral) -> &mut Self {
        self.space(literal.prefix()).append(literal.text())
    }

    /// Element, then the space before `separator`, then the separator
    pub fn right_padded<T>(
        &mut self,
        padded: &RightPadded<T>,
        separator: &str,
        mut print: impl FnMut(&mut Self, &T),
    ) -> &mut Self {
        print(self, padded.element());
        self.space(padded.after()).append(separator)
    }

    /// Space before `keyword`, the keyword, then the element
    pub fn left_padded<T>(
        &mut self,
        padded: &LeftPadded<T>,
        keyword: &str,
        mut print: impl FnMut(&mut Self, &T),
    ) -> &mut Self {
        self.space(padded.before()).append(keyword);
        print(self, padded.element());
        self
    }

    /// `before`, `open`, elements joined by `separator`, then `close` unless
    /// the container was left unclosed by error recovery
    pub fn container<T>(
        &mut self,
        container: &Container<T>,
        open: &str,
        separator: &str,
        close: &str,
        mut print: impl FnMut(&mut Self, &T),
    ) -> &mut Self {
        self.space(container.before()).append(open);
        let last = container.len().saturating_sub(1);
        for (i, padded) in container.padding().iter().enumerate() {
            let separator = if i < last { separator } else { "" };
            self.right_padded(padded, separator, &mut print);
        }
        if container.is_closed() {
            self.append(close);
        }
        self
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lst::space::CommentSyntax;

    #[test]
    fn container_prints_separators_between_elements_only() {
        let container = Container::new(
            Space::whitespace_only(" "),
            vec![
                RightPadded::new("a", Space::whitespace_only(" ")),
                RightPadded::build("b"),
            ],
        );

        let mut out = PrintOutput::new();
        out.container(&container, "[", ",", "]", |out, s| {
            out.append(s);
        });
        assert_eq!(out.finish(), " [a ,b]");
    }

    #[test]
    fn unclosed_container_omits_close() {
        let container = Container::new(Space::EMPTY, vec![RightPadded::build("x")]).unclosed();
        let mut out = PrintOutput::new();
        out.container(&container, "(", ",", ")", |out, s| {
            out.append(s);
        });
        assert_eq!(out.as_str(), "(x");
    }

    #[test]
    fn left_padded_prints_keyword_after_space() {
        let padded = LeftPadded::new(Space::whitespace_only(" "), "1");
        let mut out = PrintOutput::new();
        out.append("x").left_padded(&padded, "=", |out, s| {
            out.append(" ").append(s);
        });
        assert_eq!(out.finish(), "x = 1");
    }

    #[test]
    fn multiline_container_keeps_comments_and_layout() {
        let element = |prefix: &str, text: &'static str, after: &str| {
            RightPadded::new(
                (Space::format(prefix, &CommentSyntax::HASH), text),
                Space::format(after, &CommentSyntax::HASH),
            )
        };
        let container = Container::new(
            Space::EMPTY,
            vec![element("\n  ", "a", ""), element(" # first\n  ", "b", "\n")],
        );

        let mut out = PrintOutput::new();
        out.container(&container, "[", ",", "]", |out, (prefix, text)| {
            out.space(prefix).append(text);
        });
        insta::assert_snapshot!(out.finish(), @r"
        [
          a, # first
          b
        ]
        ");
    }
}
