//! Verbatim Core
//!
//! Shared machinery for lossless syntax trees: trees that keep every byte of
//! their source (whitespace, comments, delimiter placement, line endings)
//! and print it back exactly. Language front ends plug into this crate
//! through [`Language`] and build their trees with the pieces in [`lst`].

pub mod batch;
pub mod config;
pub mod error;
pub mod language;
pub mod lst;
pub mod result;
pub mod source;

#[cfg(feature = "test-utils")]
pub mod testing;

pub use config::{ConfigLoader, VerbatimConfig};
pub use error::{ErrorKind, VerbatimError};
pub use language::Language;
pub use lst::{
    Comment, CommentStyle, CommentSyntax, Container, Cursor, FallbackLiteral, FallbackPolicy,
    FallbackTable, LeftPadded, NodeId, OffsetDomain, PrintOutput, Recovery, RightPadded, Space,
    Tree,
};
pub use result::{Result, ResultExt};
pub use source::{Charset, SourceText};
