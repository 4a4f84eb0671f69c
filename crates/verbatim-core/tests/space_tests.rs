//! Whitespace and comment extraction over generated gaps

use proptest::prelude::*;
use verbatim_core::lst::{
    CommentStyle, CommentSyntax, LineDelimiter, OffsetDomain, OffsetMapper, Space,
    WhitespaceInterner,
};

const WHITESPACE: &[&str] = &[" ", "  ", "\t", "\n", "\r\n", "\n    "];
const COMMENTS: &[&str] = &["# note\n", "// note\n", "/* block */", "/* multi\n line */"];

fn gap() -> impl Strategy<Value = (String, usize)> {
    prop::collection::vec(
        prop_oneof![
            3 => prop::sample::select(WHITESPACE).prop_map(|s| (s, false)),
            1 => prop::sample::select(COMMENTS).prop_map(|s| (s, true)),
        ],
        0..12,
    )
    .prop_map(|pieces| {
        let comments = pieces.iter().filter(|(_, comment)| *comment).count();
        let raw = pieces.into_iter().map(|(piece, _)| piece).collect();
        (raw, comments)
    })
}

#[test]
fn test_leading_whitespace_and_suffixes() {
    let space = Space::format("\n  # one\n  /* two */ \n", &CommentSyntax::HASH_AND_C);

    assert_eq!(space.whitespace(), "\n  ");
    let comments = space.comments();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].style(), CommentStyle::Line(LineDelimiter::Hash));
    assert_eq!(comments[0].text(), "# one");
    assert_eq!(comments[0].suffix(), "\n  ");
    assert_eq!(comments[1].style(), CommentStyle::Block);
    assert_eq!(comments[1].suffix(), " \n");
    assert_eq!(space.indent(), Some(""));
}

#[test]
fn test_hash_only_syntax_treats_slashes_as_text() {
    let space = Space::format(" // not a comment", &CommentSyntax::HASH);
    assert!(space.comments().is_empty());
    assert_eq!(space.to_string(), " // not a comment");
}

#[test]
fn test_unterminated_block_comment_keeps_its_text() {
    let raw = "  /* never closed";
    let space = Space::format(raw, &CommentSyntax::C);
    assert_eq!(space.comments().len(), 1);
    assert_eq!(space.comments()[0].suffix(), "");
    assert_eq!(space.to_string(), raw);
}

#[test]
fn test_interned_spaces_print_identically() {
    let interner = WhitespaceInterner::new();
    let raw = "\n    # a\n    ";
    let plain = Space::format(raw, &CommentSyntax::HASH);
    let shared = Space::format_with(raw, &CommentSyntax::HASH, Some(&interner));
    assert_eq!(plain, shared);
    assert!(!interner.is_empty());
}

proptest! {
    #[test]
    fn generated_gaps_round_trip((raw, comments) in gap()) {
        let space = Space::format(&raw, &CommentSyntax::HASH_AND_C);
        prop_assert_eq!(space.to_string(), raw.as_str());
        prop_assert_eq!(space.comments().len(), comments);
        prop_assert_eq!(space.len(), raw.len());
    }

    #[test]
    fn arbitrary_text_round_trips(raw in any::<String>()) {
        for syntax in [CommentSyntax::HASH, CommentSyntax::HASH_AND_C, CommentSyntax::C] {
            prop_assert_eq!(Space::format(&raw, &syntax).to_string(), raw.as_str());
        }
    }

    #[test]
    fn code_point_offsets_land_on_char_boundaries(text in "\\PC{0,40}") {
        let mapper = OffsetMapper::new(&text, OffsetDomain::CodePoint);
        let chars = text.chars().count();
        for (index, (byte, _)) in text.char_indices().enumerate() {
            prop_assert_eq!(mapper.to_native(index as i64), Some(byte));
        }
        prop_assert_eq!(mapper.to_native(chars as i64), Some(text.len()));
    }

    #[test]
    fn utf16_offsets_never_split_characters(text in "\\PC{0,40}") {
        let mapper = OffsetMapper::new(&text, OffsetDomain::Utf16);
        let units = text.encode_utf16().count();
        for unit in 0..=units {
            let native = mapper.to_native(unit as i64);
            prop_assert!(native.is_some_and(|byte| text.is_char_boundary(byte)));
        }
    }
}
