//! Error types for mapping operations.

use thiserror::Error;

/// Errors from mapping operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// Target field is not part of the field list being edited.
    #[error("field not found: {0}")]
    UnknownTargetField(String),
    /// Internal invariant of the engine was violated.
    #[error("mapping engine failure: {message}")]
    EngineCompute { message: String },
}

pub type Result<T> = std::result::Result<T, MappingError>;
