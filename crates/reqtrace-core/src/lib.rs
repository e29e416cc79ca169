//! reqtrace Core
//!
//! Requirement Traceability & Field Reasoning Engine: extracts requirement
//! statements from a document, assembles a data model from a declared entity
//! specification, links every field to the requirements that justify it and
//! reports coverage.
//!
//! # Overview
//!
//! - [`FieldClassifier`]: out-of-the-box vs custom, against the [`CatalogStore`](reqtrace_catalog::CatalogStore)
//! - [`ReasoningGenerator`]: per-requirement justification (override, literal, category, weak)
//! - [`MentionScanner`]: recovery of fields the declaration left out
//! - [`DataModelAssembler`]: builds and validates the model
//! - [`TraceabilityAnalyzer`]: coverage, weak matches and field categories
//! - [`TraceabilityEngine`]: the whole pipeline behind one call
//!
//! # Example
//!
//! ```rust
//! use reqtrace_core::prelude::*;
//! use reqtrace_extract::DocumentRow;
//! use reqtrace_model::{EntitiesSpec, EntitySpec, FieldSpec};
//!
//! let engine = TraceabilityEngine::with_builtin_catalog(EngineConfig::default()).unwrap();
//!
//! let rows = vec![DocumentRow::new(
//!     "Functional Requirements",
//!     "FR-1",
//!     "System shall capture the person's first name",
//! )];
//! let spec = EntitiesSpec::new().with_entity(
//!     EntitySpec::business("Person").with_field(FieldSpec::new("firstName").linked_to(["FR-1"])),
//! );
//!
//! let output = engine.run(&rows, &spec).unwrap();
//! let field = output.model.entity("Person").unwrap().field("firstName").unwrap();
//! assert!(!field.is_custom());
//! assert!(output.report.is_fully_covered());
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod analyzer;
pub mod assembler;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod reasoning;
pub mod recovery;
pub mod validation;

pub use analyzer::{AnalysisReport, EntityBreakdown, FieldCategory, FieldLocation, TraceabilityAnalyzer, WeakMatch};
pub use assembler::{assemble, DataModelAssembler};
pub use classifier::{AmbiguityKind, Classification, ClassificationAmbiguity, FieldClassifier};
pub use config::{ConfigError, DisambiguationRule, EngineConfig, MentionRule, OverrideRule, RecoveryConfig};
pub use engine::{GenerationOutput, TraceabilityEngine};
pub use error::{AssemblyError, EngineError};
pub use reasoning::{FieldRef, ReasoningGenerator};
pub use recovery::{resolve_mention, Mention, MentionScanner, MentionTerm, Resolution, TermSource, Vocabulary};
pub use validation::ModelValidator;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running the engine
    pub use crate::{
        AnalysisReport, AssemblyError, DataModelAssembler, EngineConfig, EngineError, GenerationOutput,
        ModelValidator, TraceabilityAnalyzer, TraceabilityEngine,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
