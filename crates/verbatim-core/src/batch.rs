//! Parsing many independent files at once
//!
//! Each parse stays single-threaded; parallelism comes only from handing
//! independent files to different rayon workers. Nothing is shared between
//! the parses except the whitespace interner, which is concurrent.
//!
//! A file that cannot be read or decoded is logged and skipped (`None`).
//! A file the front end cannot build stops the whole batch.

use crate::config::VerbatimConfig;
use crate::language::Language;
use crate::result::{Result, ResultExt};
use crate::source::{Charset, SourceText};
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::debug;

/// Parse every source in parallel, returning results in input order
pub fn parse_many<L: Language>(
    language: &L,
    sources: &[SourceText],
    config: &VerbatimConfig,
) -> Result<Vec<Option<L::File>>> {
    debug!("Parsing {} {} files", sources.len(), language.name());
    sources
        .par_iter()
        .map(|source| language.parse(source, config).recoverable())
        .collect()
}

/// Parse and immediately reprint every source, returning the printed text
pub fn round_trip_many<L: Language>(
    language: &L,
    sources: &[SourceText],
    config: &VerbatimConfig,
) -> Result<Vec<Option<String>>> {
    sources
        .par_iter()
        .map(|source| {
            let file = language.parse(source, config).recoverable()?;
            Ok(file.map(|file| language.print(&file)))
        })
        .collect()
}

/// Read, decode and parse every file in parallel
pub fn parse_files<L: Language>(
    language: &L,
    paths: &[PathBuf],
    charset: Charset,
    config: &VerbatimConfig,
) -> Result<Vec<Option<L::File>>> {
    debug!("Reading {} {} files", paths.len(), language.name());
    paths
        .par_iter()
        .map(|path| {
            SourceText::read(path, charset)
                .and_then(|source| language.parse(&source, config))
                .recoverable()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VerbatimError;

    /// Splits on spaces; fails hard on a lone `!` and softly on `?`
    struct Words;

    impl Language for Words {
        type File = Vec<String>;

        fn name(&self) -> &'static str {
            "words"
        }

        fn parse(&self, source: &SourceText, _config: &VerbatimConfig) -> Result<Vec<String>> {
            match source.text() {
                "!" => Err(VerbatimError::unhandled_production("words", "Bang", 0)),
                "?" => Err(VerbatimError::invalid_encoding("words", 0)),
                text => Ok(text.split(' ').map(str::to_string).collect()),
            }
        }

        fn print(&self, file: &Vec<String>) -> String {
            file.join(" ")
        }
    }

    #[test]
    fn results_keep_input_order() {
        let sources: Vec<_> = (0..64)
            .map(|i| SourceText::new(format!("{i}.txt"), format!("file {i}")))
            .collect();

        let printed = round_trip_many(&Words, &sources, &VerbatimConfig::default()).unwrap();
        assert_eq!(printed.len(), sources.len());
        for (source, printed) in sources.iter().zip(printed) {
            assert_eq!(printed.as_deref(), Some(source.text()));
        }
    }

    #[test]
    fn encoding_failure_skips_only_that_file() {
        let sources = vec![
            SourceText::new("a", "a b"),
            SourceText::new("b", "?"),
            SourceText::new("c", "c"),
        ];

        let results = parse_many(&Words, &sources, &VerbatimConfig::default()).unwrap();
        assert_eq!(results[0], Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(results[1], None);
        assert_eq!(results[2], Some(vec!["c".to_string()]));
    }

    #[test]
    fn unhandled_production_stops_the_batch() {
        let sources = vec![
            SourceText::new("a", "a"),
            SourceText::new("b", "?"),
            SourceText::new("c", "!"),
        ];

        let err = round_trip_many(&Words, &sources, &VerbatimConfig::default()).unwrap_err();
        assert!(matches!(err, VerbatimError::UnhandledProduction { .. }));
    }

    #[test]
    fn unreadable_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.txt");
        std::fs::write(&present, "x y").unwrap();
        let paths = vec![dir.path().join("missing.txt"), present];

        let results =
            parse_files(&Words, &paths, Charset::Utf8, &VerbatimConfig::default()).unwrap();
        assert_eq!(results, vec![None, Some(vec!["x".to_string(), "y".to_string()])]);
    }
}
