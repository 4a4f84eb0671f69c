//! Error types for lossless parsing operations

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for lossless parsing operations
#[derive(Debug, Error)]
pub enum VerbatimError {
    /// A grammar production reached a builder that has no rule for it.
    ///
    /// This is a logic defect in a front end, never an artifact of malformed
    /// input: malformed input is absorbed by the fallback policy.
    #[error("Unhandled {language} production '{production}' at offset {offset}")]
    UnhandledProduction {
        language: &'static str,
        production: String,
        offset: usize,
    },

    /// The declared charset is not one we can decode
    #[error("Unsupported charset: {charset}")]
    UnsupportedCharset { charset: String },

    /// Source bytes are not valid in the declared charset
    #[error("Invalid {charset} input at byte {position}")]
    InvalidEncoding { charset: String, position: usize },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Production,
    Encoding,
    Config,
    Io,
    Internal,
}

impl VerbatimError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            VerbatimError::UnhandledProduction { .. } => ErrorKind::Production,
            VerbatimError::UnsupportedCharset { .. } => ErrorKind::Encoding,
            VerbatimError::InvalidEncoding { .. } => ErrorKind::Encoding,
            VerbatimError::ConfigError { .. } => ErrorKind::Config,
            VerbatimError::IoError { .. } => ErrorKind::Io,
            VerbatimError::InternalError { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error is recoverable (can continue processing other files)
    ///
    /// Unhandled productions are defects and stop the run; a file that
    /// cannot be read or decoded only loses that one file.
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Encoding | ErrorKind::Io)
    }

    /// Create an unhandled production error
    pub fn unhandled_production(
        language: &'static str,
        production: impl Into<String>,
        offset: usize,
    ) -> Self {
        Self::UnhandledProduction {
            language,
            production: production.into(),
            offset,
        }
    }

    /// Create an unsupported charset error
    pub fn unsupported_charset(charset: impl Into<String>) -> Self {
        Self::UnsupportedCharset {
            charset: charset.into(),
        }
    }

    /// Create an invalid encoding error
    pub fn invalid_encoding(charset: impl Into<String>, position: usize) -> Self {
        Self::InvalidEncoding {
            charset: charset.into(),
            position,
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for VerbatimError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unhandled_production_names_the_construct() {
        let err = VerbatimError::unhandled_production("shell", "Pipeline", 12);
        assert_eq!(
            err.to_string(),
            "Unhandled shell production 'Pipeline' at offset 12"
        );
        assert_eq!(err.kind(), ErrorKind::Production);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn encoding_errors_are_recoverable() {
        assert!(VerbatimError::unsupported_charset("EBCDIC").is_recoverable());
        assert!(VerbatimError::invalid_encoding("UTF-8", 3).is_recoverable());
        assert!(!VerbatimError::config_error("bad").is_recoverable());
    }
}
