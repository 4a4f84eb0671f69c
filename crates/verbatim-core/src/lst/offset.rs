//! Mapping of grammar-engine offsets into UTF-8 byte offsets
//!
//! Grammar engines report token positions in their own index domain. Rust
//! strings are indexed by UTF-8 byte, so any engine that counts code points
//! or UTF-16 code units disagrees with us as soon as the text contains a
//! non-ASCII character. The mapper builds a prefix table once per parse for
//! exactly that case and is the identity otherwise.

use serde::{Deserialize, Serialize};

/// Index domain a grammar engine reports offsets in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OffsetDomain {
    /// UTF-8 byte offsets, identical to the native domain
    Utf8,
    /// Unicode scalar values (code points)
    #[default]
    CodePoint,
    /// UTF-16 code units
    Utf16,
}

/// Converts engine offsets into native byte offsets
#[derive(Debug, Clone)]
pub struct OffsetMapper {
    domain: OffsetDomain,
    /// `table[i]` is the byte offset of engine index `i`; the final entry is
    /// the source length. `None` when the mapping is the identity.
    table: Option<Vec<usize>>,
    len: usize,
}

impl OffsetMapper {
    pub fn new(source: &str, domain: OffsetDomain) -> Self {
        let table = if domain == OffsetDomain::Utf8 || source.is_ascii() {
            None
        } else {
            Some(Self::build_table(source, domain))
        };

        Self {
            domain,
            table,
            len: source.len(),
        }
    }

    fn build_table(source: &str, domain: OffsetDomain) -> Vec<usize> {
        let mut table = Vec::with_capacity(source.len() + 1);
        for (byte, c) in source.char_indices() {
            table.push(byte);
            // The low surrogate of a pair snaps forward to the next character
            if domain == OffsetDomain::Utf16 && c.len_utf16() == 2 {
                table.push(byte + c.len_utf8());
            }
        }
        table.push(source.len());
        table
    }

    /// Map an engine offset into the native domain
    ///
    /// Negative offsets are the engine's marker for synthetic tokens and map
    /// to `None`. Offsets past the end clamp to the source length.
    pub fn to_native(&self, offset: i64) -> Option<usize> {
        let offset = usize::try_from(offset).ok()?;
        Some(match &self.table {
            None => offset.min(self.len),
            Some(table) => table.get(offset).copied().unwrap_or(self.len),
        })
    }

    /// Whether engine and native offsets can differ for this source
    pub fn is_identity(&self) -> bool {
        self.table.is_none()
    }

    pub fn domain(&self) -> OffsetDomain {
        self.domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_text_needs_no_table() {
        let mapper = OffsetMapper::new("echo hi", OffsetDomain::CodePoint);
        assert!(mapper.is_identity());
        assert_eq!(mapper.to_native(5), Some(5));
        assert_eq!(mapper.to_native(99), Some(7));
        assert_eq!(mapper.to_native(-1), None);
    }

    #[test]
    fn code_points_map_past_multibyte_characters() {
        // 'é' is 2 bytes, '😀' is 4 bytes
        let source = "é😀x";
        let mapper = OffsetMapper::new(source, OffsetDomain::CodePoint);

        assert!(!mapper.is_identity());
        assert_eq!(mapper.to_native(0), Some(0));
        assert_eq!(mapper.to_native(1), Some(2));
        assert_eq!(mapper.to_native(2), Some(6));
        assert_eq!(mapper.to_native(3), Some(7));
    }

    #[test]
    fn utf16_surrogate_pairs_take_two_units() {
        let source = "a😀b";
        let mapper = OffsetMapper::new(source, OffsetDomain::Utf16);

        assert_eq!(mapper.to_native(1), Some(1));
        // index 2 is the low surrogate; it snaps to the end of the emoji
        assert_eq!(mapper.to_native(2), Some(5));
        assert_eq!(mapper.to_native(3), Some(5));
        assert_eq!(mapper.to_native(4), Some(6));
    }

    #[test]
    fn utf8_domain_is_always_identity() {
        let mapper = OffsetMapper::new("😀", OffsetDomain::Utf8);
        assert!(mapper.is_identity());
        assert_eq!(mapper.to_native(4), Some(4));
    }
}
