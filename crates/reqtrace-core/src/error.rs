//! Error types for the traceability engine
//!
//! Extraction and assembly failures are fatal to a run and reach the caller
//! unmodified. Weak justifications and classification ambiguities are not
//! errors; they are recorded in the model and the analysis report.

use crate::config::ConfigError;
use reqtrace_catalog::CatalogError;
use reqtrace_extract::ExtractionError;
use reqtrace_model::ModelError;

/// Structural invariant violations found while assembling or validating a model
#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    /// Two entities share a name
    #[error("duplicate entity '{entity}'")]
    DuplicateEntity { entity: String },

    /// Two fields of one entity share a normalized name
    #[error("duplicate field '{field}' in entity '{entity}'")]
    DuplicateField { entity: String, field: String },

    /// Relationship endpoint names an entity that is not in the model
    #[error("relationship {from} -> {to} references unknown entity '{missing}'")]
    DanglingRelationship {
        from: String,
        to: String,
        missing: String,
    },

    /// Field links a requirement that was not extracted
    #[error("field '{entity}.{field}' links unknown requirement '{requirement}'")]
    UnknownRequirement {
        entity: String,
        field: String,
        requirement: String,
    },

    /// Field links the same requirement twice
    #[error("field '{entity}.{field}' links requirement '{requirement}' more than once")]
    DuplicateRequirementLink {
        entity: String,
        field: String,
        requirement: String,
    },

    /// Mention resolves to catalog fields in several field groups
    #[error(
        "mention '{mention}' in {requirement} matches fields of '{entity}' in several field groups ({}); add a disambiguation rule",
        .candidates.join(", ")
    )]
    AmbiguousMention {
        entity: String,
        mention: String,
        requirement: String,
        candidates: Vec<String>,
    },

    /// `isCustom` disagrees with the catalog
    #[error("field '{entity}.{field}' has isCustom={is_custom} but the catalog says otherwise")]
    CustomFlagMismatch {
        entity: String,
        field: String,
        is_custom: bool,
    },

    /// requirementIds, sourceRequirements and fieldReasoning disagree
    #[error("field '{entity}.{field}' has misaligned traceability: {detail}")]
    MisalignedTraceability {
        entity: String,
        field: String,
        detail: String,
    },

    /// Declared specification is malformed
    #[error("invalid entity specification for '{entity}': {message}")]
    InvalidEntitySpec { entity: String, message: String },
}

impl AssemblyError {
    /// Entity the error is about, if any
    #[must_use]
    pub fn entity(&self) -> Option<&str> {
        match self {
            Self::DuplicateEntity { entity }
            | Self::DuplicateField { entity, .. }
            | Self::UnknownRequirement { entity, .. }
            | Self::DuplicateRequirementLink { entity, .. }
            | Self::AmbiguousMention { entity, .. }
            | Self::CustomFlagMismatch { entity, .. }
            | Self::MisalignedTraceability { entity, .. }
            | Self::InvalidEntitySpec { entity, .. } => Some(entity.as_str()),
            Self::DanglingRelationship { missing, .. } => Some(missing.as_str()),
        }
    }
}

/// Engine-level error
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Requirement extraction failed
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    /// Model assembly failed
    #[error("assembly failed: {0}")]
    Assembly(#[from] AssemblyError),

    /// Catalog could not be loaded
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Configuration invalid
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Model encoding failed
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

impl EngineError {
    /// Whether fixing the input document or declaration is required
    ///
    /// The other kinds are setup problems (catalog, configuration).
    #[inline]
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Extraction(_) | Self::Assembly(_))
    }
}
