//! reqtrace Model
//!
//! Shared vocabulary for requirement traceability: requirement statements,
//! data-model fields and entities, and the declaration an author hands to
//! the assembler.
//!
//! # Core Concepts
//!
//! - [`Requirement`] / [`RequirementId`]: immutable statements extracted from a document
//! - [`RequirementSet`]: insertion-ordered, id-unique collection of requirements
//! - [`Field`]: output unit linking a data-model field to the requirements that justify it
//! - [`DataModel`]: immutable snapshot of entities and relationships
//! - [`EntitiesSpec`]: the declared entity/field list the assembler validates and enriches
//! - [`ModelDigest`]: Blake3 digest of the canonical serialized model
//!
//! # Example
//!
//! ```rust
//! use reqtrace_model::{DataType, Field, Justification, MatchStrength, Requirement, RequirementId};
//!
//! let id: RequirementId = "FR-1".parse().unwrap();
//! let requirement = Requirement::new(id.clone(), "Capture the person's first name", "Functional Requirements");
//!
//! let mut field = Field::new("firstName", DataType::TextField);
//! field
//!     .link_requirement(&requirement, Justification::new("FR-1 names it", MatchStrength::Literal))
//!     .unwrap();
//!
//! assert_eq!(field.requirement_ids(), &[id]);
//! assert!(field.is_traceability_aligned());
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod declaration;
mod digest;
mod entity;
mod error;
mod field;
pub mod naming;
mod requirement;

pub use declaration::{EntitiesSpec, EntitySpec, FieldSpec};
pub use digest::{DigestError, ModelDigest};
pub use entity::{DataModel, Entity, EntityType, Relationship, RelationshipType};
pub use error::ModelError;
pub use field::{DataType, Field, FieldProvenance, Justification, MatchStrength};
pub use requirement::{Requirement, RequirementId, RequirementIdError, RequirementSet};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with reqtrace models
    pub use crate::{
        DataModel, DataType, EntitiesSpec, Entity, EntitySpec, EntityType, Field, FieldProvenance,
        FieldSpec, Justification, MatchStrength, ModelDigest, Relationship, RelationshipType,
        Requirement, RequirementId, RequirementSet,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
