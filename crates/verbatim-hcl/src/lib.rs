//! Verbatim HCL
//!
//! Lossless syntax trees for HCL configuration files in the native syntax.
//! [`parse`] builds a [`ConfigFile`](tree::ConfigFile) that prints back byte
//! for byte, `#`, `//` and `/* */` comments included. Splats, heredocs and
//! whatever the grammar engine could not make sense of are kept as fallback
//! literals.

pub mod builder;
pub mod grammar;
pub mod printer;
pub mod transform;
pub mod tree;

pub use builder::HclBuilder;
pub use printer::print;
pub use transform::{HclVisitor, transform};
pub use tree::ConfigFile;

use tracing::debug;
use verbatim_core::{Language, Result, SourceText, VerbatimConfig};

pub const LANGUAGE: &str = "hcl";

/// The HCL front end, for use with the language-generic helpers in
/// `verbatim_core`
#[derive(Debug, Clone, Copy, Default)]
pub struct Hcl;

impl Language for Hcl {
    type File = ConfigFile;

    fn name(&self) -> &'static str {
        LANGUAGE
    }

    fn parse(&self, source: &SourceText, config: &VerbatimConfig) -> Result<ConfigFile> {
        debug!("Parsing {} as {LANGUAGE}", source.path().display());
        parse_with(source.text(), config)
    }

    fn print(&self, file: &ConfigFile) -> String {
        print(file)
    }
}

/// Parse with the default configuration
pub fn parse(source: &str) -> Result<ConfigFile> {
    parse_with(source, &VerbatimConfig::default())
}

pub fn parse_with(source: &str, config: &VerbatimConfig) -> Result<ConfigFile> {
    let file = grammar::parse(source);
    if file.has_synthetic() {
        debug!("grammar engine recovered from errors; expect fallback nodes");
    }
    HclBuilder::new(source, config).build(&file)
}
