//! Source text handed to a parse
//!
//! The bytes, charset and BOM flag come from an external encoding detector;
//! this module only decodes them once into an immutable string and can
//! encode printed output back into the same form.

use crate::error::VerbatimError;
use crate::result::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Charsets a source file may be declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Charset {
    #[default]
    Utf8,
    Latin1,
}

impl Charset {
    /// Resolve a charset label as reported by encoding detectors
    pub fn from_label(label: &str) -> Result<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Charset::Utf8),
            "iso-8859-1" | "latin1" | "latin-1" | "l1" => Ok(Charset::Latin1),
            _ => Err(VerbatimError::unsupported_charset(label)),
        }
    }

    /// Canonical label for this charset
    pub fn name(self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Latin1 => "ISO-8859-1",
        }
    }
}

/// Immutable source text of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    path: PathBuf,
    text: Arc<str>,
    charset: Charset,
    bom: bool,
}

impl SourceText {
    /// Create source text from an already decoded UTF-8 string
    pub fn new(path: impl Into<PathBuf>, text: impl Into<Arc<str>>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            charset: Charset::Utf8,
            bom: false,
        }
    }

    /// Decode raw bytes in the given charset
    ///
    /// A leading UTF-8 byte order mark is stripped and remembered so that
    /// [`SourceText::encode`] can restore it.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: &[u8], charset: Charset) -> Result<Self> {
        let (text, bom): (Arc<str>, bool) = match charset {
            Charset::Utf8 => {
                let (body, bom) = match bytes.strip_prefix(UTF8_BOM) {
                    Some(rest) => (rest, true),
                    None => (bytes, false),
                };
                let decoded = std::str::from_utf8(body).map_err(|e| {
                    let offset = if bom { UTF8_BOM.len() } else { 0 };
                    VerbatimError::invalid_encoding(charset.name(), e.valid_up_to() + offset)
                })?;
                (Arc::from(decoded), bom)
            }
            Charset::Latin1 => {
                let decoded: String = bytes.iter().map(|&b| char::from(b)).collect();
                (Arc::from(decoded), false)
            }
        };

        Ok(Self {
            path: path.into(),
            text,
            charset,
            bom,
        })
    }

    /// Read and decode a file from disk
    pub fn read(path: &Path, charset: Charset) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| VerbatimError::io_error(path, e))?;
        Self::from_bytes(path, &bytes, charset)
    }

    /// Encode printed text back into this source's charset, restoring the BOM
    pub fn encode(&self, printed: &str) -> Result<Vec<u8>> {
        match self.charset {
            Charset::Utf8 => {
                let mut out = Vec::with_capacity(printed.len() + UTF8_BOM.len());
                if self.bom {
                    out.extend_from_slice(UTF8_BOM);
                }
                out.extend_from_slice(printed.as_bytes());
                Ok(out)
            }
            Charset::Latin1 => printed
                .chars()
                .enumerate()
                .map(|(position, c)| {
                    u8::try_from(u32::from(c)).map_err(|_| {
                        VerbatimError::invalid_encoding(self.charset.name(), position)
                    })
                })
                .collect(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    pub fn has_bom(&self) -> bool {
        self.bom
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_bom_is_stripped_and_restored() {
        let bytes = b"\xEF\xBB\xBFecho hi\n";
        let source = SourceText::from_bytes("a.sh", bytes, Charset::Utf8).unwrap();

        assert!(source.has_bom());
        assert_eq!(source.text(), "echo hi\n");
        assert_eq!(source.encode(source.text()).unwrap(), bytes.to_vec());
    }

    #[test]
    fn latin1_round_trips_high_bytes() {
        let bytes = b"name = \"caf\xE9\"\n";
        let source = SourceText::from_bytes("a.hcl", bytes, Charset::Latin1).unwrap();

        assert_eq!(source.text(), "name = \"café\"\n");
        assert_eq!(source.encode(source.text()).unwrap(), bytes.to_vec());
    }

    #[test]
    fn invalid_utf8_reports_position() {
        let err = SourceText::from_bytes("bad.sh", b"ok\xFF", Charset::Utf8).unwrap_err();
        assert!(matches!(
            err,
            VerbatimError::InvalidEncoding { position: 2, .. }
        ));
    }

    #[test]
    fn charset_labels() {
        assert_eq!(Charset::from_label("UTF-8").unwrap(), Charset::Utf8);
        assert_eq!(Charset::from_label("iso-8859-1").unwrap(), Charset::Latin1);
        assert!(Charset::from_label("Shift_JIS").is_err());
    }

    #[test]
    fn latin1_cannot_encode_wide_characters() {
        let source = SourceText::from_bytes("a", b"x", Charset::Latin1).unwrap();
        assert!(source.encode("x\u{1F600}").is_err());
    }
}
