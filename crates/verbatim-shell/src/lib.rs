//! Verbatim Shell
//!
//! Lossless syntax trees for POSIX shell scripts. [`parse`] turns a script
//! into a [`ShellFile`](tree::ShellFile) whose [`print`] reproduces the input
//! byte for byte, comments and line continuations included. Constructs the
//! grammar engine could only recover from are kept as opaque fallback
//! literals, so even broken scripts round-trip.

pub mod builder;
pub mod grammar;
pub mod printer;
pub mod transform;
pub mod tree;

pub use builder::ShellBuilder;
pub use printer::print;
pub use transform::{ShellVisitor, transform};
pub use tree::ShellFile;

use tracing::debug;
use verbatim_core::{Language, Result, SourceText, VerbatimConfig};

pub const LANGUAGE: &str = "shell";

/// The shell front end, for use with the language-generic helpers in
/// `verbatim_core`
#[derive(Debug, Clone, Copy, Default)]
pub struct Shell;

impl Language for Shell {
    type File = ShellFile;

    fn name(&self) -> &'static str {
        LANGUAGE
    }

    fn parse(&self, source: &SourceText, config: &VerbatimConfig) -> Result<ShellFile> {
        debug!("Parsing {} as {LANGUAGE}", source.path().display());
        parse_with(source.text(), config)
    }

    fn print(&self, file: &ShellFile) -> String {
        print(file)
    }
}

/// Parse with the default configuration
pub fn parse(source: &str) -> Result<ShellFile> {
    parse_with(source, &VerbatimConfig::default())
}

pub fn parse_with(source: &str, config: &VerbatimConfig) -> Result<ShellFile> {
    let program = grammar::parse(source);
    if program.has_synthetic() {
        debug!("grammar engine recovered from errors; expect fallback nodes");
    }
    ShellBuilder::new(source, config).build(&program)
}
