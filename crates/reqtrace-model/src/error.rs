//! Model construction errors

use crate::digest::DigestError;

/// Errors raised while building or decoding model values
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Requirement linked twice to the same field
    #[error("field '{field}' already links requirement '{requirement}'")]
    DuplicateLink { field: String, requirement: String },

    /// Field name (normalized) already present in the entity
    #[error("entity '{entity}' already has a field named '{field}'")]
    DuplicateField { entity: String, field: String },

    /// Unrecognised data type name
    #[error("unknown data type '{0}'")]
    UnknownDataType(String),

    /// Digest computation failed
    #[error("digest error: {0}")]
    Digest(#[from] DigestError),

    /// JSON encoding or decoding failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
