#![deny(unsafe_code)]

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("unknown channel: {id}")]
    UnknownChannel { id: String },

    #[error("failed to read channel table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse channel table: {source}")]
    Toml {
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid channel table: {message}")]
    Invalid { message: String },
}

impl ChannelError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChannelError>;
