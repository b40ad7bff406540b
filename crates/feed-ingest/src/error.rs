//! Error types for feed ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a source feed.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Failed to read the feed file.
    #[error("failed to read feed {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Decoding Errors ===
    /// Feed bytes are not valid UTF-8.
    #[error("feed is not valid UTF-8 (at byte {offset})")]
    Encoding { offset: usize },

    // === XML Errors ===
    /// The document is not well-formed XML.
    #[error("could not parse feed: {message} (at byte {position})")]
    Parse { message: String, position: u64 },
}

impl IngestError {
    pub(crate) fn parse(message: impl Into<String>, position: u64) -> Self {
        Self::Parse {
            message: message.into(),
            position,
        }
    }

    /// Short category description, free of parser diagnostics.
    pub fn category(&self) -> &'static str {
        match self {
            Self::FileRead { .. } => "could not read uploaded file",
            Self::Encoding { .. } | Self::Parse { .. } => "could not parse uploaded file",
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::parse("unexpected end of input", 42);
        assert_eq!(
            err.to_string(),
            "could not parse feed: unexpected end of input (at byte 42)"
        );
        assert_eq!(err.category(), "could not parse uploaded file");
    }

    #[test]
    fn test_file_read_category() {
        let err = IngestError::FileRead {
            path: PathBuf::from("/tmp/feed.xml"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(err.category(), "could not read uploaded file");
    }
}
