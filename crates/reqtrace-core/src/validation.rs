//! Data-model invariant checks
//!
//! The assembler runs [`ModelValidator::validate`] before returning a model.
//! The same checks can be applied to a model decoded with
//! [`DataModel::from_json`] to re-verify output produced elsewhere.

use crate::error::AssemblyError;
use reqtrace_catalog::CatalogStore;
use reqtrace_model::naming::normalize_key;
use reqtrace_model::{DataModel, Relationship, RequirementSet};
use std::collections::HashSet;

/// Structural and catalog invariant validator
#[derive(Debug, Clone, Copy)]
pub struct ModelValidator<'a> {
    catalog: &'a CatalogStore,
    standard_requirement: bool,
}

impl<'a> ModelValidator<'a> {
    /// Create validator; `STANDARD` links are accepted
    #[inline]
    #[must_use]
    pub fn new(catalog: &'a CatalogStore) -> Self {
        Self {
            catalog,
            standard_requirement: true,
        }
    }

    /// Accept or reject `STANDARD` links
    #[inline]
    #[must_use]
    pub fn with_standard_requirement(mut self, enabled: bool) -> Self {
        self.standard_requirement = enabled;
        self
    }

    /// Run every check
    ///
    /// # Errors
    /// Returns the first violation found
    pub fn validate(&self, model: &DataModel, requirements: &RequirementSet) -> Result<(), AssemblyError> {
        Self::validate_structure(model)?;
        self.validate_catalog(model)?;
        self.validate_requirements(model, requirements)
    }

    /// Unique names, resolvable relationships and aligned traceability
    ///
    /// # Errors
    /// Returns the first violation found
    pub fn validate_structure(model: &DataModel) -> Result<(), AssemblyError> {
        let mut entities = HashSet::new();
        for entity in model.entities() {
            if !entities.insert(normalize_key(entity.name())) {
                return Err(AssemblyError::DuplicateEntity {
                    entity: entity.name().to_string(),
                });
            }

            let mut fields = HashSet::new();
            for field in entity.fields() {
                if !fields.insert(normalize_key(field.name())) {
                    return Err(AssemblyError::DuplicateField {
                        entity: entity.name().to_string(),
                        field: field.name().to_string(),
                    });
                }

                field
                    .check_traceability()
                    .map_err(|detail| AssemblyError::MisalignedTraceability {
                        entity: entity.name().to_string(),
                        field: field.name().to_string(),
                        detail,
                    })?;
            }
        }

        check_relationships(model.entities().iter().map(reqtrace_model::Entity::name), model.relationships())
    }

    /// `isCustom` agrees with the catalog for every field
    ///
    /// # Errors
    /// Returns [`AssemblyError::CustomFlagMismatch`] for the first disagreement
    pub fn validate_catalog(&self, model: &DataModel) -> Result<(), AssemblyError> {
        for (entity, field) in model.fields() {
            let in_catalog = self.catalog.contains(entity.name(), field.name());
            if field.is_custom() == in_catalog {
                return Err(AssemblyError::CustomFlagMismatch {
                    entity: entity.name().to_string(),
                    field: field.name().to_string(),
                    is_custom: field.is_custom(),
                });
            }
        }
        Ok(())
    }

    /// Every linked requirement was extracted (or is an enabled `STANDARD`)
    ///
    /// # Errors
    /// Returns [`AssemblyError::UnknownRequirement`] for the first unknown link
    pub fn validate_requirements(&self, model: &DataModel, requirements: &RequirementSet) -> Result<(), AssemblyError> {
        for (entity, field) in model.fields() {
            let unknown = field
                .requirement_ids()
                .iter()
                .find(|id| !(requirements.contains(id) || (self.standard_requirement && id.is_standard())));

            if let Some(id) = unknown {
                return Err(AssemblyError::UnknownRequirement {
                    entity: entity.name().to_string(),
                    field: field.name().to_string(),
                    requirement: id.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Both endpoints of every relationship name one of `entities`
pub(crate) fn check_relationships<'e>(
    entities: impl IntoIterator<Item = &'e str>,
    relationships: &[Relationship],
) -> Result<(), AssemblyError> {
    let known: HashSet<&str> = entities.into_iter().collect();

    for relationship in relationships {
        for endpoint in [&relationship.from_entity, &relationship.to_entity] {
            if !known.contains(endpoint.as_str()) {
                return Err(AssemblyError::DanglingRelationship {
                    from: relationship.from_entity.clone(),
                    to: relationship.to_entity.clone(),
                    missing: endpoint.clone(),
                });
            }
        }
    }
    Ok(())
}
