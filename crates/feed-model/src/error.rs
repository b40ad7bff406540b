use thiserror::Error;

/// Construction-time violations of the mapping model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("mapping target field must not be empty")]
    EmptyTargetField,
    #[error("mapping target field '{0}' is not a valid XML element name")]
    InvalidTargetField(String),
    #[error("rename mapping for '{target}' has an empty source field")]
    EmptySourceField { target: String },
    #[error("combine mapping for '{target}' references an empty field at position {index}")]
    EmptyCombineField { target: String, index: usize },
    #[error("condition on '{target}' has an empty field name")]
    EmptyConditionField { target: String },
    #[error("unknown condition operator: {0}")]
    UnknownOperator(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
