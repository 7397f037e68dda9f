use thiserror::Error;

pub type AbbotResult<T> = Result<T, AbbotError>;

/// Errors raised while turning raw documents into analyzable inputs.
///
/// Analysis itself never fails: once an index key, query or pipeline has
/// been parsed, every analyzer runs to completion.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AbbotError {
    #[error("Invalid index key: {0}")]
    InvalidIndexKey(String),

    #[error("Unsupported index type '{kind}' on field '{field}'")]
    UnsupportedIndexType { field: String, kind: String },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Invalid pipeline stage at position {position}: {msg}")]
    InvalidStage { position: usize, msg: String },
}

impl AbbotError {
    /// Get a short error kind name
    pub fn kind(&self) -> &'static str {
        match self {
            AbbotError::InvalidIndexKey(_) => "invalid_index_key",
            AbbotError::UnsupportedIndexType { .. } => "unsupported_index_type",
            AbbotError::InvalidDocument(_) => "invalid_document",
            AbbotError::InvalidStage { .. } => "invalid_stage",
        }
    }
}
