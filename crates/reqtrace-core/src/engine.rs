//! Generation pipeline
//!
//! The engine owns the read-only pieces of a run (configuration and the
//! shared catalog) and drives one document through extraction, assembly and
//! analysis. Runs are independent: nothing is cached between them, so one
//! engine can serve any number of documents.

use crate::analyzer::{AnalysisReport, TraceabilityAnalyzer};
use crate::assembler::DataModelAssembler;
use crate::config::EngineConfig;
use crate::error::EngineError;
use reqtrace_catalog::CatalogStore;
use reqtrace_extract::{DocumentRow, RequirementExtractor};
use reqtrace_model::{DataModel, EntitiesSpec, RequirementSet};
use serde::Serialize;
use std::sync::Arc;

/// Everything one generation run produces
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutput {
    /// Extracted requirements in document order
    pub requirements: RequirementSet,
    /// Assembled, validated model
    pub model: DataModel,
    /// Derived traceability statistics
    pub report: AnalysisReport,
}

/// Requirement traceability engine
#[derive(Debug, Clone)]
pub struct TraceabilityEngine {
    config: EngineConfig,
    catalog: Arc<CatalogStore>,
    extractor: RequirementExtractor,
}

impl TraceabilityEngine {
    /// Engine with the default configuration
    ///
    /// # Errors
    /// Only fails if a built-in rule is malformed
    pub fn new(catalog: Arc<CatalogStore>) -> Result<Self, EngineError> {
        Self::with_config(catalog, EngineConfig::default())
    }

    /// Engine with `config`
    ///
    /// # Errors
    /// Returns error if the configuration does not validate
    pub fn with_config(catalog: Arc<CatalogStore>, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let extractor = RequirementExtractor::new().with_sheet_hints(config.requirement_sheet_hints.iter().cloned());
        tracing::debug!(
            catalog_fields = catalog.len(),
            hints = ?config.requirement_sheet_hints,
            "engine ready"
        );
        Ok(Self {
            config,
            catalog,
            extractor,
        })
    }

    /// Engine over the built-in catalog
    ///
    /// # Errors
    /// Returns error if the configuration does not validate
    pub fn with_builtin_catalog(config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_config(Arc::new(CatalogStore::builtin()?), config)
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared catalog
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &Arc<CatalogStore> {
        &self.catalog
    }

    /// Extract requirements from document rows
    ///
    /// # Errors
    /// Returns [`EngineError::Extraction`] when no requirements are found
    pub fn extract(&self, rows: &[DocumentRow]) -> Result<RequirementSet, EngineError> {
        Ok(self.extractor.extract(rows)?)
    }

    /// Assemble the model for already extracted requirements
    ///
    /// # Errors
    /// Returns [`EngineError::Assembly`] on any invariant violation
    pub fn assemble(&self, spec: &EntitiesSpec, requirements: &RequirementSet) -> Result<DataModel, EngineError> {
        let assembler = DataModelAssembler::with_config(&self.catalog, self.config.clone())?;
        Ok(assembler.assemble(spec, requirements)?)
    }

    /// Analyze a model against its requirements
    #[must_use]
    pub fn analyze(&self, requirements: &RequirementSet, model: &DataModel) -> AnalysisReport {
        TraceabilityAnalyzer::new(requirements).analyze(model)
    }

    /// Run one document through the whole pipeline
    ///
    /// Fails without producing partial output: either every stage succeeds
    /// or the first error is returned.
    ///
    /// # Errors
    /// Returns the first extraction or assembly error
    pub fn run(&self, rows: &[DocumentRow], spec: &EntitiesSpec) -> Result<GenerationOutput, EngineError> {
        tracing::info!(rows = rows.len(), entities = spec.entities.len(), "starting generation run");

        let requirements = self.extract(rows)?;
        let model = self.assemble(spec, &requirements)?;
        let report = self.analyze(&requirements, &model);

        if report.weak_match_count > 0 || !report.is_fully_covered() {
            tracing::warn!(
                weak = report.weak_match_count,
                uncovered = report.uncovered_requirements.len(),
                "model needs review"
            );
        }

        Ok(GenerationOutput {
            requirements,
            model,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqtrace_model::{EntitySpec, FieldSpec};

    fn rows() -> Vec<DocumentRow> {
        vec![
            DocumentRow::new("Overview", "Scope", "Constituent master data"),
            DocumentRow::new("Functional Requirements", "FR-1", "System shall capture the person's first name"),
            DocumentRow::new("Functional Requirements", "FR-2", "Record the date of"),
            DocumentRow::new("Functional Requirements", "", "birth for every person"),
        ]
    }

    fn spec() -> EntitiesSpec {
        EntitiesSpec::new().with_entity(
            EntitySpec::business("Person")
                .with_field(FieldSpec::new("firstName").linked_to(["FR-1"]))
                .with_field(FieldSpec::new("dateOfBirth").linked_to(["FR-2"])),
        )
    }

    #[test]
    fn full_run() {
        let engine = TraceabilityEngine::with_builtin_catalog(EngineConfig::default()).unwrap();
        let output = engine.run(&rows(), &spec()).unwrap();

        assert_eq!(output.requirements.len(), 2);
        let birth = output.model.entity("Person").unwrap().field("dateOfBirth").unwrap();
        assert!(!birth.is_custom());
        assert!(birth.field_reasoning()["FR-2"].contains("\"date of birth\""));
        assert!(output.report.is_fully_covered());
    }

    #[test]
    fn no_rows_is_extraction_error() {
        let engine = TraceabilityEngine::with_builtin_catalog(EngineConfig::default()).unwrap();
        let err = engine.run(&[], &spec()).unwrap_err();
        assert!(matches!(err, EngineError::Extraction(_)));
        assert!(err.is_input_error());
    }

    #[test]
    fn invalid_config_rejected() {
        let config = EngineConfig::default().with_mention_rule(crate::config::MentionRule::new("(", "x"));
        let err = TraceabilityEngine::with_builtin_catalog(config).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
        assert!(!err.is_input_error());
    }
}
