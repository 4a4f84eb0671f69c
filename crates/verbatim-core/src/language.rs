//! The seam between the shared core and a language front end

use crate::config::VerbatimConfig;
use crate::result::Result;
use crate::source::SourceText;

/// A front end that builds and prints lossless trees for one language
pub trait Language: Sync {
    /// Root node of one file
    type File: Send + Sync;

    /// Name used in errors, logs and the fallback configuration
    fn name(&self) -> &'static str;

    /// Build the lossless tree of one source file
    ///
    /// Malformed input still yields a tree; only a production the front end
    /// has no builder for is an error.
    fn parse(&self, source: &SourceText, config: &VerbatimConfig) -> Result<Self::File>;

    /// Print a tree back to source text
    fn print(&self, file: &Self::File) -> String;
}
