//! Data-model assembly
//!
//! Two ordered passes over an [`EntitiesSpec`]:
//!
//! 1. **Declared fields**: classify each field against the catalog, fill
//!    unset attributes from the matching catalog entry, and justify every
//!    requirement link it declares.
//! 2. **Recovery**: re-scan requirement text for fields that are named but
//!    not declared, and append them to their entity flagged for review.
//!
//! The finished model is validated before it is returned; any invariant
//! violation aborts assembly with an [`AssemblyError`].

use crate::classifier::{ClassificationAmbiguity, FieldClassifier};
use crate::config::{ConfigError, EngineConfig};
use crate::error::AssemblyError;
use crate::reasoning::{FieldRef, ReasoningGenerator};
use crate::recovery::{resolve_mention, MentionScanner};
use crate::validation::{check_relationships, ModelValidator};
use indexmap::IndexMap;
use reqtrace_catalog::{CatalogField, CatalogStore};
use reqtrace_model::naming::normalize_key;
use reqtrace_model::{
    DataModel, DataType, EntitiesSpec, Entity, EntitySpec, Field, FieldProvenance, FieldSpec, ModelError,
    Requirement, RequirementId, RequirementSet,
};
use std::collections::HashSet;

const RECOVERED_NOTE: &str = "recovered from requirement text; not in the declared entity specification";

/// Builds a validated [`DataModel`] from a declaration and extracted requirements
#[derive(Debug, Clone)]
pub struct DataModelAssembler<'a> {
    catalog: &'a CatalogStore,
    config: EngineConfig,
    reasoning: ReasoningGenerator,
    scanner: MentionScanner,
}

impl<'a> DataModelAssembler<'a> {
    /// Assembler with the default configuration
    ///
    /// # Errors
    /// Only fails if a built-in rule is malformed
    pub fn new(catalog: &'a CatalogStore) -> Result<Self, ConfigError> {
        Self::with_config(catalog, EngineConfig::default())
    }

    /// Assembler with `config`
    ///
    /// # Errors
    /// Returns error if the configuration does not validate
    pub fn with_config(catalog: &'a CatalogStore, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            catalog,
            reasoning: ReasoningGenerator::from_config(&config)?,
            scanner: MentionScanner::from_config(&config)?,
            config,
        })
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Reasoning generator in use
    #[inline]
    #[must_use]
    pub fn reasoning(&self) -> &ReasoningGenerator {
        &self.reasoning
    }

    /// Assemble and validate the model
    ///
    /// # Errors
    /// Returns the first structural violation: duplicate entity or field,
    /// dangling relationship, unknown or repeated requirement link, or an
    /// ambiguous mention with no disambiguation rule
    pub fn assemble(&self, spec: &EntitiesSpec, requirements: &RequirementSet) -> Result<DataModel, AssemblyError> {
        check_relationships(spec.entities.iter().map(|e| e.name.as_str()), &spec.relationships)?;

        let mut drafts = Vec::with_capacity(spec.entities.len());
        let mut seen = HashSet::new();
        for entity in &spec.entities {
            if entity.name.trim().is_empty() {
                return Err(AssemblyError::InvalidEntitySpec {
                    entity: entity.name.clone(),
                    message: "entity name is empty".to_string(),
                });
            }
            if !seen.insert(normalize_key(&entity.name)) {
                return Err(AssemblyError::DuplicateEntity {
                    entity: entity.name.clone(),
                });
            }
            drafts.push(self.declared_entity(entity, requirements)?);
        }

        let recovered = self.recover(spec, requirements, &mut drafts)?;

        let entities = drafts
            .into_iter()
            .map(EntityDraft::finish)
            .collect::<Result<Vec<_>, _>>()?;
        let model = DataModel::new(entities, spec.relationships.clone());

        ModelValidator::new(self.catalog)
            .with_standard_requirement(self.config.standard_requirement)
            .validate(&model, requirements)?;

        tracing::info!(
            entities = model.entities().len(),
            fields = model.fields().count(),
            recovered,
            "assembled data model"
        );
        Ok(model)
    }

    fn declared_entity(&self, spec: &EntitySpec, requirements: &RequirementSet) -> Result<EntityDraft, AssemblyError> {
        let mut draft = EntityDraft::new(spec);
        for field_spec in &spec.fields {
            if field_spec.name.trim().is_empty() {
                return Err(AssemblyError::InvalidEntitySpec {
                    entity: spec.name.clone(),
                    message: "field name is empty".to_string(),
                });
            }
            if draft.contains(&field_spec.name) {
                return Err(AssemblyError::DuplicateField {
                    entity: spec.name.clone(),
                    field: field_spec.name.clone(),
                });
            }

            let field = self.declared_field(&spec.name, field_spec, requirements)?;
            draft.declared.push(field);
        }
        Ok(draft)
    }

    fn declared_field(
        &self,
        entity: &str,
        spec: &FieldSpec,
        requirements: &RequirementSet,
    ) -> Result<Field, AssemblyError> {
        let classification =
            FieldClassifier::new(self.catalog).classify_in_group(entity, &spec.name, spec.field_group.as_deref());
        let matched = classification.matched;

        let data_type = spec
            .data_type
            .or(matched.map(|m| m.data_type))
            .unwrap_or_default();
        let field_group = spec
            .field_group
            .clone()
            .or_else(|| matched.and_then(|m| m.field_group.clone()));
        let lookup_entity = spec
            .lookup_entity
            .clone()
            .or_else(|| matched.and_then(|m| m.lookup_entity.clone()));
        let is_lookup = spec.is_lookup || data_type == DataType::LookupField || lookup_entity.is_some();
        let description = spec
            .description
            .clone()
            .or_else(|| matched.map(|m| m.label.clone()))
            .unwrap_or_default();

        let mut field = Field::new(spec.name.clone(), data_type)
            .with_field_group(field_group)
            .with_custom(classification.is_custom)
            .with_required(spec.is_required)
            .with_lookup(is_lookup, lookup_entity)
            .with_description(description);

        if let Some(claimed) = spec.is_custom.filter(|c| *c != classification.is_custom) {
            tracing::debug!(entity, field = %spec.name, claimed, "declared isCustom overridden by catalog");
            field.add_review_note(format!(
                "declared isCustom={claimed} overridden: the catalog {} this field",
                if classification.is_custom { "does not define" } else { "defines" }
            ));
        }
        if let Some(ambiguity) = &classification.ambiguity {
            note_ambiguity(&mut field, ambiguity);
        }

        let synonyms = matched.map(|m| m.synonyms.as_slice()).unwrap_or_default();
        let mut linked = HashSet::new();
        for raw in &spec.requirement_ids {
            let requirement = self.resolve_requirement(entity, &spec.name, raw, requirements)?;
            if !linked.insert(requirement.id().clone()) {
                return Err(AssemblyError::DuplicateRequirementLink {
                    entity: entity.to_string(),
                    field: spec.name.clone(),
                    requirement: requirement.id().to_string(),
                });
            }

            let target = FieldRef::new(entity, &spec.name)
                .in_group(field.field_group())
                .with_synonyms(synonyms);
            let justification = self.reasoning.explain(&requirement, &target);
            link(entity, &mut field, &requirement, justification)?;
        }

        tracing::trace!(
            entity,
            field = %spec.name,
            is_custom = field.is_custom(),
            links = field.requirement_ids().len(),
            "classified declared field"
        );
        Ok(field)
    }

    fn resolve_requirement(
        &self,
        entity: &str,
        field: &str,
        raw: &str,
        requirements: &RequirementSet,
    ) -> Result<Requirement, AssemblyError> {
        let id = RequirementId::parse(raw).map_err(|e| AssemblyError::InvalidEntitySpec {
            entity: entity.to_string(),
            message: format!("field '{field}' links '{raw}': {e}"),
        })?;

        if id.is_standard() && self.config.standard_requirement {
            return Ok(Requirement::standard());
        }

        requirements
            .get(&id)
            .cloned()
            .ok_or_else(|| AssemblyError::UnknownRequirement {
                entity: entity.to_string(),
                field: field.to_string(),
                requirement: id.to_string(),
            })
    }

    /// Pass 2: append fields named in requirement text but not declared
    fn recover(
        &self,
        spec: &EntitiesSpec,
        requirements: &RequirementSet,
        drafts: &mut [EntityDraft],
    ) -> Result<usize, AssemblyError> {
        let vocabulary = self.scanner.vocabulary(spec, self.catalog);
        let mut recovered = 0;

        for mention in vocabulary.scan(requirements) {
            let entity = mention.term.entity.as_str();
            let Some(draft) = drafts.iter_mut().find(|d| d.name == entity) else {
                continue;
            };
            if draft.is_declared(&mention.term.field) {
                continue;
            }

            let resolution = resolve_mention(self.catalog, &self.config.disambiguation, &mention)?;
            if draft.is_declared(&resolution.field) {
                continue;
            }

            let key = normalize_key(&resolution.field);
            if !draft.recovered.contains_key(&key) {
                let field = recovered_field(&resolution.field, resolution.field_group.clone(), resolution.matched, &resolution.partial);
                tracing::debug!(
                    entity,
                    field = %field.name(),
                    requirement = %mention.requirement.id(),
                    is_custom = field.is_custom(),
                    "recovered field from requirement text"
                );
                draft.recovered.insert(key.clone(), field);
                recovered += 1;
            }

            let Some(field) = draft.recovered.get_mut(&key) else {
                continue;
            };
            if field.field_reasoning().contains_key(mention.requirement.id()) {
                continue;
            }

            let synonyms = resolution.matched.map(|m| m.synonyms.as_slice()).unwrap_or_default();
            let name = field.name().to_string();
            let target = FieldRef::new(entity, &name)
                .in_group(field.field_group())
                .with_synonyms(synonyms);
            let justification = self.reasoning.explain_mention(mention.requirement, &target, mention.found);
            link(entity, field, mention.requirement, justification)?;
        }

        Ok(recovered)
    }
}

/// Assemble with the default configuration
///
/// # Errors
/// See [`DataModelAssembler::assemble`]
pub fn assemble(
    spec: &EntitiesSpec,
    requirements: &RequirementSet,
    catalog: &CatalogStore,
) -> Result<DataModel, crate::error::EngineError> {
    Ok(DataModelAssembler::new(catalog)?.assemble(spec, requirements)?)
}

/// Entity under construction: declared fields, then recovered ones
#[derive(Debug)]
struct EntityDraft {
    name: String,
    entity: Entity,
    declared: Vec<Field>,
    /// normalized name -> field, in first-mention order
    recovered: IndexMap<String, Field>,
}

impl EntityDraft {
    fn new(spec: &EntitySpec) -> Self {
        Self {
            name: spec.name.clone(),
            entity: Entity::new(spec.name.clone(), spec.entity_type, spec.description.clone()),
            declared: Vec::new(),
            recovered: IndexMap::new(),
        }
    }

    fn is_declared(&self, name: &str) -> bool {
        let key = normalize_key(name);
        self.declared.iter().any(|f| normalize_key(f.name()) == key)
    }

    fn contains(&self, name: &str) -> bool {
        self.is_declared(name) || self.recovered.contains_key(&normalize_key(name))
    }

    fn finish(self) -> Result<Entity, AssemblyError> {
        let mut entity = self.entity;
        for field in self.declared.into_iter().chain(self.recovered.into_values()) {
            entity.push_field(field).map_err(|e| match e {
                ModelError::DuplicateField { entity, field } => AssemblyError::DuplicateField { entity, field },
                other => AssemblyError::InvalidEntitySpec {
                    entity: self.name.clone(),
                    message: other.to_string(),
                },
            })?;
        }
        Ok(entity)
    }
}

fn recovered_field(
    name: &str,
    field_group: Option<String>,
    matched: Option<&CatalogField>,
    partial: &[String],
) -> Field {
    let data_type = matched.map(|m| m.data_type).unwrap_or_default();
    let lookup_entity = matched.and_then(|m| m.lookup_entity.clone());
    let description = matched.map_or_else(
        || "Recovered from requirement text".to_string(),
        |m| format!("{} (recovered from requirement text)", m.label),
    );

    let mut field = Field::new(name, data_type)
        .with_field_group(field_group)
        .with_custom(matched.is_none())
        .with_lookup(data_type == DataType::LookupField, lookup_entity)
        .with_description(description)
        .with_provenance(FieldProvenance::Recovered);
    field.add_review_note(RECOVERED_NOTE);
    if !partial.is_empty() {
        field.add_review_note(format!(
            "no exact catalog match; partially matches {}",
            partial.join(", ")
        ));
    }
    field
}

fn note_ambiguity(field: &mut Field, ambiguity: &ClassificationAmbiguity) {
    tracing::debug!(%ambiguity, "classification ambiguity");
    field.add_review_note(ambiguity.to_string());
}

fn link(
    entity: &str,
    field: &mut Field,
    requirement: &Requirement,
    justification: reqtrace_model::Justification,
) -> Result<(), AssemblyError> {
    field
        .link_requirement(requirement, justification)
        .map_err(|_| AssemblyError::DuplicateRequirementLink {
            entity: entity.to_string(),
            field: field.name().to_string(),
            requirement: requirement.id().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DisambiguationRule, MentionRule, RecoveryConfig};
    use pretty_assertions::assert_eq;
    use reqtrace_model::{Relationship, RelationshipType};

    fn catalog() -> CatalogStore {
        CatalogStore::parse(
            "Entity: Person\n\
             - First Name (firstName) [TextField] aka: given name\n\
             - Gender (gender) [LookupField -> Gender]\n\
             Field Group: PostalAddress\n\
             - City (city)\n\
             - Address Id (addressId)\n\
             Field Group: Phone\n\
             - Phone Id (phoneId)\n",
        )
        .unwrap()
    }

    fn requirements() -> RequirementSet {
        [
            ("FR-1", "System shall capture the person's first name"),
            ("FR-2", "Record gender for reporting"),
            ("FR-24", "Display CWID replacing PIDM in the UI"),
        ]
        .iter()
        .map(|(id, text)| Requirement::new(id.parse().unwrap(), *text, "Functional Requirements"))
        .collect()
    }

    fn declared() -> EntitiesSpec {
        EntitiesSpec::new()
            .with_entity(
                EntitySpec::business("Person")
                    .with_field(FieldSpec::new("firstName").required().linked_to(["FR-1"]))
                    .with_field(FieldSpec::new("gender").linked_to(["FR-2"])),
            )
            .with_entity(EntitySpec::reference("Gender"))
            .with_relationship(Relationship::new("Person", "Gender", RelationshipType::HasOne, "gender lookup"))
    }

    fn names(model: &DataModel, entity: &str) -> Vec<String> {
        model
            .entity(entity)
            .unwrap()
            .fields()
            .iter()
            .map(|f| f.name().to_string())
            .collect()
    }

    #[test]
    fn declared_fields_classified_and_justified() {
        let catalog = catalog();
        let model = DataModelAssembler::new(&catalog)
            .unwrap()
            .assemble(&declared(), &requirements())
            .unwrap();
        let person = model.entity("Person").unwrap();

        let first = person.field("firstName").unwrap();
        assert!(!first.is_custom());
        assert!(first.is_required());
        assert_eq!(first.description(), "First Name");
        assert!(first.field_reasoning()["FR-1"].contains("\"first name\""));

        let gender = person.field("gender").unwrap();
        assert!(gender.is_lookup());
        assert_eq!(gender.lookup_entity(), Some("Gender"));
        assert_eq!(gender.data_type(), DataType::LookupField);
    }

    #[test]
    fn recovered_fields_follow_declared() {
        let catalog = catalog();
        let model = DataModelAssembler::new(&catalog)
            .unwrap()
            .assemble(&declared(), &requirements())
            .unwrap();

        assert_eq!(names(&model, "Person"), vec!["firstName", "gender", "CWID", "PIDM"]);

        let cwid = model.entity("Person").unwrap().field("CWID").unwrap();
        assert!(cwid.is_custom());
        assert_eq!(cwid.provenance(), FieldProvenance::Recovered);
        assert!(cwid.needs_review());
        assert_eq!(cwid.requirement_ids(), &["FR-24".parse::<RequirementId>().unwrap()]);
        assert!(cwid.field_reasoning()["FR-24"].contains("\"CWID\""));
    }

    #[test]
    fn declared_fields_untouched_by_scan() {
        let catalog = catalog();
        let mut reqs = requirements();
        reqs.insert(Requirement::new("FR-3".parse().unwrap(), "Given name must be editable", "Functional Requirements"));

        let model = DataModelAssembler::new(&catalog)
            .unwrap()
            .assemble(&declared(), &reqs)
            .unwrap();
        let first = model.entity("Person").unwrap().field("firstName").unwrap();
        assert_eq!(first.requirement_ids().len(), 1);
        assert_eq!(first.provenance(), FieldProvenance::Declared);
    }

    #[test]
    fn recovered_field_links_every_mention() {
        let catalog = catalog();
        let mut reqs = requirements();
        reqs.insert(Requirement::new("FR-30".parse().unwrap(), "Search by home city", "Functional Requirements"));
        reqs.insert(Requirement::new("FR-31".parse().unwrap(), "City is mandatory for mailing", "Functional Requirements"));

        let model = DataModelAssembler::new(&catalog)
            .unwrap()
            .assemble(&declared(), &reqs)
            .unwrap();
        let city = model.entity("Person").unwrap().field("city").unwrap();
        assert!(!city.is_custom());
        assert_eq!(city.field_group(), Some("PostalAddress"));
        assert_eq!(city.requirement_ids().len(), 2);
    }

    #[test]
    fn unknown_requirement_link_fails() {
        let catalog = catalog();
        let spec = EntitiesSpec::new()
            .with_entity(EntitySpec::business("Person").with_field(FieldSpec::new("firstName").linked_to(["FR-99"])));
        let err = DataModelAssembler::new(&catalog)
            .unwrap()
            .assemble(&spec, &requirements())
            .unwrap_err();
        assert!(matches!(err, AssemblyError::UnknownRequirement { ref requirement, .. } if requirement == "FR-99"));
    }

    #[test]
    fn repeated_link_fails() {
        let catalog = catalog();
        let spec = EntitiesSpec::new().with_entity(
            EntitySpec::business("Person").with_field(FieldSpec::new("firstName").linked_to(["FR-1", "fr 1"])),
        );
        assert!(matches!(
            DataModelAssembler::new(&catalog).unwrap().assemble(&spec, &requirements()),
            Err(AssemblyError::DuplicateRequirementLink { .. })
        ));
    }

    #[test]
    fn duplicate_declared_field_fails() {
        let catalog = catalog();
        let spec = EntitiesSpec::new().with_entity(
            EntitySpec::business("Person")
                .with_field(FieldSpec::new("firstName"))
                .with_field(FieldSpec::new("first_name")),
        );
        assert!(matches!(
            DataModelAssembler::new(&catalog).unwrap().assemble(&spec, &requirements()),
            Err(AssemblyError::DuplicateField { .. })
        ));
    }

    #[test]
    fn dangling_relationship_fails() {
        let catalog = catalog();
        let spec = declared().with_relationship(Relationship::new("Person", "Address", RelationshipType::HasMany, ""));
        let err = DataModelAssembler::new(&catalog)
            .unwrap()
            .assemble(&spec, &requirements())
            .unwrap_err();
        assert_eq!(err.entity(), Some("Address"));
    }

    #[test]
    fn custom_claim_overridden() {
        let catalog = catalog();
        let mut claimed = FieldSpec::new("firstName").linked_to(["FR-1"]);
        claimed.is_custom = Some(true);
        let spec = EntitiesSpec::new().with_entity(EntitySpec::business("Person").with_field(claimed));

        let model = DataModelAssembler::new(&catalog)
            .unwrap()
            .assemble(&spec, &requirements())
            .unwrap();
        let first = model.entity("Person").unwrap().field("firstName").unwrap();
        assert!(!first.is_custom());
        assert!(first.needs_review());
        assert!(first.review_notes()[0].contains("isCustom=true"));
    }

    #[test]
    fn standard_requirement_links_meta_fields() {
        let catalog = catalog();
        let spec = EntitiesSpec::new().with_entity(
            EntitySpec::business("Person").with_field(FieldSpec::new("meta_businessId").linked_to(["STANDARD"])),
        );

        let model = DataModelAssembler::new(&catalog)
            .unwrap()
            .assemble(&spec, &requirements())
            .unwrap();
        let meta = model.entity("Person").unwrap().field("meta_businessId").unwrap();
        assert!(meta.source_requirements()[0].starts_with("STANDARD: Standard meta field"));

        let strict = EngineConfig::default().with_standard_requirement(false);
        let err = DataModelAssembler::with_config(&catalog, strict)
            .unwrap()
            .assemble(&spec, &requirements())
            .unwrap_err();
        assert!(matches!(err, AssemblyError::UnknownRequirement { .. }));
    }

    #[test]
    fn ambiguous_mention_needs_rule() {
        let catalog = catalog();
        let reqs: RequirementSet = std::iter::once(Requirement::new(
            "FR-5".parse().unwrap(),
            "Every ID must be unique",
            "Functional Requirements",
        ))
        .collect();
        let spec = EntitiesSpec::new().with_entity(EntitySpec::business("Person"));
        let config = EngineConfig::default()
            .with_recovery(RecoveryConfig {
                builtin_rules: false,
                ..RecoveryConfig::default()
            })
            .with_mention_rule(MentionRule::new(r"\bID\b", "id"));

        let err = DataModelAssembler::with_config(&catalog, config.clone())
            .unwrap()
            .assemble(&spec, &reqs)
            .unwrap_err();
        assert!(matches!(err, AssemblyError::AmbiguousMention { .. }));

        let config = config.with_disambiguation(DisambiguationRule::new("ID", "addressId", Some("PostalAddress".into())));
        let model = DataModelAssembler::with_config(&catalog, config)
            .unwrap()
            .assemble(&spec, &reqs)
            .unwrap();
        let field = model.entity("Person").unwrap().field("addressId").unwrap();
        assert!(!field.is_custom());
        assert_eq!(field.field_group(), Some("PostalAddress"));
    }

    #[test]
    fn weak_links_flagged() {
        let catalog = catalog();
        let spec = EntitiesSpec::new()
            .with_entity(EntitySpec::business("Person").with_field(FieldSpec::new("nickname").linked_to(["FR-2"])));
        let config = EngineConfig::default().without_recovery();

        let model = DataModelAssembler::with_config(&catalog, config)
            .unwrap()
            .assemble(&spec, &requirements())
            .unwrap();
        let nickname = model.entity("Person").unwrap().field("nickname").unwrap();
        assert!(nickname.is_custom());
        assert_eq!(nickname.weak_matches().len(), 1);
        assert!(nickname.needs_review());
    }
}
