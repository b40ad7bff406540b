//! Store error types.

use std::path::PathBuf;

use feed_ingest::IngestError;
use thiserror::Error;

/// Store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O error.
    #[error("failed to {operation} store file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Store contents could not be encoded or decoded.
    #[error("invalid store data in {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("shop not found: {id}")]
    ShopNotFound { id: String },

    #[error("channel {channel} not found in shop {shop}")]
    ChannelNotFound { shop: String, channel: String },

    #[error("comment {comment} not found in shop {shop}")]
    CommentNotFound { shop: String, comment: String },

    /// The shop is locked against edits.
    #[error("shop {id} is locked")]
    ShopLocked { id: String },

    /// An uploaded feed could not be read.
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl StoreError {
    /// Short message suitable for a notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io { operation, path, .. } => {
                format!("Could not {operation} the store at {}", path.display())
            }
            Self::Json { path, .. } => {
                format!("The store at {} is corrupted", path.display())
            }
            Self::ShopNotFound { .. }
            | Self::ChannelNotFound { .. }
            | Self::CommentNotFound { .. }
            | Self::ShopLocked { .. } => self.to_string(),
            Self::Ingest(error) => error.category().to_string(),
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
