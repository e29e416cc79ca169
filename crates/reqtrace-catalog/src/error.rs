//! Catalog loading errors

use std::path::PathBuf;

/// Errors while parsing or loading a catalog file
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Line does not match any catalog form
    #[error("catalog syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// Field entry before any `Entity:` header
    #[error("catalog line {line}: field entry outside of an entity")]
    EntryOutsideEntity { line: usize },

    /// Same field listed twice in one entity/field group
    #[error("duplicate catalog field '{field}' in {entity} ({})", .field_group.as_deref().unwrap_or("no field group"))]
    DuplicateField {
        entity: String,
        field_group: Option<String>,
        field: String,
    },

    /// Data type not recognised
    #[error("catalog line {line}: unknown data type '{value}'")]
    UnknownDataType { line: usize, value: String },

    /// Catalog file could not be read
    #[error("io error reading catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    /// Create syntax error for line
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }
}
