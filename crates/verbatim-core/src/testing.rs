//! Helpers shared by the front-end test suites

use crate::config::VerbatimConfig;
use crate::language::Language;
use crate::source::SourceText;

/// Install a test-writer tracing subscriber once per test binary
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Parse `text`, assert that it prints back unchanged, and return the tree
#[track_caller]
pub fn assert_round_trip<L: Language>(language: &L, text: &str) -> L::File {
    assert_round_trip_with(language, text, &VerbatimConfig::default())
}

#[track_caller]
pub fn assert_round_trip_with<L: Language>(
    language: &L,
    text: &str,
    config: &VerbatimConfig,
) -> L::File {
    let source = SourceText::new(format!("test.{}", language.name()), text);
    let file = match language.parse(&source, config) {
        Ok(file) => file,
        Err(err) => panic!("{} parse failed: {err}\n--- input ---\n{text}", language.name()),
    };
    let printed = language.print(&file);
    if printed != text {
        panic!(
            "{} round trip mismatch\n--- input ---\n{text:?}\n--- printed ---\n{printed:?}",
            language.name()
        );
    }
    file
}
