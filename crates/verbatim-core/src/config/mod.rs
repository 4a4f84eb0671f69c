//! Configuration for lossless parsing
//!
//! Loaded from `verbatim.toml`, `verbatim.json` or `.verbatimrc.json`:
//!
//! ```toml
//! internWhitespace = true
//! recordCursor = false
//!
//! [fallback.shell]
//! CommandSubstitution = "literal"
//!
//! [fallback.hcl]
//! FunctionCall = "omit"
//! ```

mod loader;

pub use loader::ConfigLoader;

use crate::error::VerbatimError;
use crate::lst::{FallbackPolicy, FallbackTable, WhitespaceInterner};
use crate::result::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Parse configuration shared by all language front ends
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VerbatimConfig {
    /// Share recurring whitespace runs between trees
    pub intern_whitespace: bool,

    /// Record every cursor position of a parse (diagnostics only)
    pub record_cursor: bool,

    /// Per-language overrides of the fallback lookup tables, keyed by
    /// language and then production name
    pub fallback: HashMap<String, HashMap<String, FallbackPolicy>>,
}

impl Default for VerbatimConfig {
    fn default() -> Self {
        Self {
            intern_whitespace: true,
            record_cursor: false,
            fallback: HashMap::new(),
        }
    }
}

impl VerbatimConfig {
    /// Load configuration from a TOML or JSON file, chosen by extension
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| VerbatimError::io_error(path, e))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(VerbatimError::config_error(format!(
                "Unsupported config format: {}",
                path.display()
            ))),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| VerbatimError::config_error(format!("Invalid TOML config: {e}")))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| VerbatimError::config_error(format!("Invalid JSON config: {e}")))
    }

    /// The interner a parse should use, if interning is enabled
    pub fn interner(&self) -> Option<&'static WhitespaceInterner> {
        self.intern_whitespace.then(WhitespaceInterner::global)
    }

    /// Fallback table for `language` with this configuration's overrides
    pub fn fallback_table(
        &self,
        language: &'static str,
        defaults: &'static [(&'static str, FallbackPolicy)],
    ) -> FallbackTable {
        let table = FallbackTable::new(language, defaults);
        match self.fallback.get(language) {
            Some(overrides) => table.with_overrides(overrides.clone()),
            None => table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = VerbatimConfig::default();
        assert!(config.intern_whitespace);
        assert!(!config.record_cursor);
        assert!(config.interner().is_some());
    }

    #[test]
    fn toml_overrides() {
        let config = VerbatimConfig::from_toml_str(
            r#"
internWhitespace = false

[fallback.hcl]
FunctionCall = "literal"
"#,
        )
        .unwrap();

        assert!(!config.intern_whitespace);
        assert!(config.interner().is_none());
        let table = config.fallback_table("hcl", &[("FunctionCall", FallbackPolicy::PartialOmission)]);
        assert_eq!(table.policy("FunctionCall"), FallbackPolicy::LiteralCapture);
    }

    #[test]
    fn json_partial_config_keeps_defaults() {
        let config = VerbatimConfig::from_json_str(r#"{ "recordCursor": true }"#).unwrap();
        assert!(config.record_cursor);
        assert!(config.intern_whitespace);
    }

    #[test]
    fn invalid_policy_is_a_config_error() {
        let err = VerbatimConfig::from_toml_str("[fallback.shell]\nSubshell = \"sometimes\"\n")
            .unwrap_err();
        assert!(matches!(err, VerbatimError::ConfigError { .. }));
    }
}
