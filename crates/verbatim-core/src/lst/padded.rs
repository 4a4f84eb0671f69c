//! Space owned by punctuation rather than by neighbouring nodes
//!
//! A separator or delimiter token belongs to the parent node, but the space
//! next to it has to live somewhere. These wrappers attach it to the element
//! it pads without making it part of that element's own prefix.

use super::space::Space;
use super::tree::Tree;

/// An element and the space between it and the separator that follows it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RightPadded<T> {
    element: T,
    after: Space,
}

impl<T> RightPadded<T> {
    pub fn new(element: T, after: Space) -> Self {
        Self { element, after }
    }

    /// Pad `element` with no space before its separator
    pub fn build(element: T) -> Self {
        Self::new(element, Space::EMPTY)
    }

    pub fn element(&self) -> &T {
        &self.element
    }

    pub fn after(&self) -> &Space {
        &self.after
    }

    pub fn into_element(self) -> T {
        self.element
    }

    pub fn with_element(self, element: T) -> Self {
        Self {
            element,
            after: self.after,
        }
    }

    pub fn with_after(self, after: Space) -> Self {
        Self {
            element: self.element,
            after,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RightPadded<U> {
        RightPadded {
            element: f(self.element),
            after: self.after,
        }
    }
}

/// A keyword- or operator-led element and the space before that keyword
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LeftPadded<T> {
    before: Space,
    element: T,
}

impl<T> LeftPadded<T> {
    pub fn new(before: Space, element: T) -> Self {
        Self { before, element }
    }

    pub fn build(element: T) -> Self {
        Self::new(Space::EMPTY, element)
    }

    pub fn before(&self) -> &Space {
        &self.before
    }

    pub fn element(&self) -> &T {
        &self.element
    }

    pub fn into_element(self) -> T {
        self.element
    }

    pub fn with_before(self, before: Space) -> Self {
        Self {
            before,
            element: self.element,
        }
    }

    pub fn with_element(self, element: T) -> Self {
        Self {
            before: self.before,
            element,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LeftPadded<U> {
        LeftPadded {
            before: self.before,
            element: f(self.element),
        }
    }
}

/// A delimited sequence: the space before its opening delimiter and the
/// padded elements between the delimiters
///
/// The delimiter and separator tokens themselves are printed by the owning
/// node. `closed` is false only when error recovery omitted a missing
/// closing delimiter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Container<T> {
    before: Space,
    elements: Vec<RightPadded<T>>,
    closed: bool,
}

impl<T> Container<T> {
    pub fn new(before: Space, elements: Vec<RightPadded<T>>) -> Self {
        Self {
            before,
            elements,
            closed: true,
        }
    }

    pub fn empty() -> Self {
        Self::new(Space::EMPTY, Vec::new())
    }

    pub fn before(&self) -> &Space {
        &self.before
    }

    /// Padded elements, in source order
    pub fn padding(&self) -> &[RightPadded<T>] {
        &self.elements
    }

    pub fn elements(&self) -> impl ExactSizeIterator<Item = &T> {
        self.elements.iter().map(RightPadded::element)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn with_before(self, before: Space) -> Self {
        Self { before, ..self }
    }

    pub fn with_padding(self, elements: Vec<RightPadded<T>>) -> Self {
        Self { elements, ..self }
    }

    /// Mark the closing delimiter as missing from the source
    pub fn unclosed(self) -> Self {
        Self {
            closed: false,
            ..self
        }
    }
}

impl<T: Tree> Container<T> {
    /// Replace the elements, keeping the padding of every element that was
    /// already present
    ///
    /// Elements are matched by [`Tree::id`]; an element that was not in the
    /// old list gets empty padding.
    pub fn with_elements(&self, elements: Vec<T>) -> Self {
        let padded = elements
            .into_iter()
            .map(|element| {
                let after = self
                    .elements
                    .iter()
                    .find(|old| old.element.id() == element.id())
                    .map(|old| old.after.clone())
                    .unwrap_or(Space::EMPTY);
                RightPadded::new(element, after)
            })
            .collect();

        Self {
            before: self.before.clone(),
            elements: padded,
            closed: self.closed,
        }
    }
}
