//! Lossless syntax tree (LST) building blocks
//!
//! Everything a language front end needs to turn a conventional,
//! whitespace-discarding parse tree into an immutable tree that reprints its
//! source byte for byte:
//!
//! - [`OffsetMapper`] and [`Cursor`]: the one forward-only walk over the
//!   source text of a parse
//! - [`Space`] and [`Comment`]: structured whitespace and comments, extracted
//!   from the gaps between significant tokens
//! - [`RightPadded`], [`LeftPadded`] and [`Container`]: space owned by
//!   separators and delimiters
//! - [`GrammarNode`]: the interface to the grammar engine, including its
//!   synthetic-token convention
//! - [`FallbackTable`] and [`FallbackLiteral`]: what builders do when the
//!   engine had to recover from an error
//! - [`PrintOutput`]: the printers' shared buffer
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut cursor = Cursor::new(source, OffsetDomain::CodePoint, CommentSyntax::HASH);
//! let (prefix, text) = cursor.token(&token).expect("real token");
//! let eof = cursor.finish();
//! ```

mod cursor;
mod fallback;
mod grammar;
mod intern;
mod offset;
mod padded;
mod print;
mod space;
mod tree;

pub use cursor::Cursor;
pub use fallback::{FallbackLiteral, FallbackPolicy, FallbackTable, Recovery};
pub use grammar::{GrammarElement, GrammarKind, GrammarNode, GrammarToken};
pub use intern::WhitespaceInterner;
pub use offset::{OffsetDomain, OffsetMapper};
pub use padded::{Container, LeftPadded, RightPadded};
pub use print::PrintOutput;
pub use space::{Comment, CommentStyle, CommentSyntax, LineDelimiter, Space};
pub use tree::{NodeId, Tree};
