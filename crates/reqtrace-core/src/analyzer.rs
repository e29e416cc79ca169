//! Read-only traceability analysis
//!
//! Derives the reviewer-facing view of an assembled model: field categories,
//! the requirement -> field reverse map, coverage gaps and weak-match
//! statistics. Analysis never fails on a valid model; missing data shows up
//! as zero counts or empty lists.

use indexmap::IndexMap;
use reqtrace_model::naming::split_words;
use reqtrace_model::{DataModel, EntityType, Field, FieldProvenance, ModelDigest, RequirementId, RequirementSet};
use serde::Serialize;

/// Trailing name words that mark an identifier field
const IDENTIFIER_SUFFIXES: &[&str] = &["id", "identifier", "key", "cwid", "pidm", "ssn"];

const META_PREFIX: &str = "meta_";

/// Reporting category of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldCategory {
    /// Identifies or references a record
    Identifier,
    /// Plain attribute
    Attribute,
    /// Member of a (non-meta) field group
    FieldGroupMember,
    /// Record lifecycle metadata
    Metadata,
}

impl FieldCategory {
    /// Categorize a field
    ///
    /// Checked in order: metadata (`_`-prefixed group or `meta_` name),
    /// field group member, identifier (identifier suffix or lookup), then
    /// attribute.
    #[must_use]
    pub fn of(field: &Field) -> Self {
        let group = field.field_group();
        if group.is_some_and(|g| g.starts_with('_')) || field.name().to_ascii_lowercase().starts_with(META_PREFIX) {
            return Self::Metadata;
        }
        if group.is_some() {
            return Self::FieldGroupMember;
        }

        let is_identifier = split_words(field.name())
            .last()
            .is_some_and(|w| IDENTIFIER_SUFFIXES.contains(&w.as_str()));
        if is_identifier || field.is_lookup() {
            Self::Identifier
        } else {
            Self::Attribute
        }
    }
}

/// An (entity, field) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldLocation {
    /// Entity name
    pub entity: String,
    /// Field name
    pub field: String,
}

/// A weak justification awaiting review
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeakMatch {
    /// Entity name
    pub entity: String,
    /// Field name
    pub field: String,
    /// Linked requirement
    pub requirement: RequirementId,
}

/// Fields of one entity by category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityBreakdown {
    /// Entity name
    pub name: String,
    /// Identifier fields
    pub identifiers: Vec<String>,
    /// Plain attributes
    pub attributes: Vec<String>,
    /// Field group -> member fields
    pub field_groups: IndexMap<String, Vec<String>>,
    /// Metadata fields
    pub metadata: Vec<String>,
}

/// Derived statistics and traceability views
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Fields across all entities
    pub total_fields: usize,
    /// Fields with no catalog match
    pub custom_fields: usize,
    /// Custom share of all fields, 0-100
    pub custom_percentage: f64,
    /// Business entity count
    pub business_entities: usize,
    /// Reference entity count
    pub reference_entities: usize,
    /// Relationship count
    pub relationships: usize,
    /// Fields added by the requirement text re-scan
    pub recovered_fields: usize,
    /// Fields flagged for review
    pub needs_review: usize,
    /// Number of weak justifications
    pub weak_match_count: usize,
    /// Weak justifications in model order
    pub weak_matches: Vec<WeakMatch>,
    /// Extracted requirements no field links to
    pub uncovered_requirements: Vec<RequirementId>,
    /// Requirement -> linking fields, in document order
    pub requirement_coverage: IndexMap<RequirementId, Vec<FieldLocation>>,
    /// Per-entity category buckets
    pub entities: Vec<EntityBreakdown>,
    /// Digest of the analyzed model
    pub digest: Option<ModelDigest>,
}

impl AnalysisReport {
    /// Fields linked to `requirement`
    #[must_use]
    pub fn fields_for(&self, requirement: &RequirementId) -> &[FieldLocation] {
        self.requirement_coverage
            .get(requirement)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether every extracted requirement is covered
    #[inline]
    #[must_use]
    pub fn is_fully_covered(&self) -> bool {
        self.uncovered_requirements.is_empty()
    }
}

/// Builds [`AnalysisReport`]s against one requirement set
#[derive(Debug, Clone, Copy)]
pub struct TraceabilityAnalyzer<'a> {
    requirements: &'a RequirementSet,
}

impl<'a> TraceabilityAnalyzer<'a> {
    /// Create analyzer
    #[inline]
    #[must_use]
    pub fn new(requirements: &'a RequirementSet) -> Self {
        Self { requirements }
    }

    /// Analyze `model`
    #[must_use]
    pub fn analyze(&self, model: &DataModel) -> AnalysisReport {
        let mut coverage: IndexMap<RequirementId, Vec<FieldLocation>> =
            self.requirements.ids().map(|id| (id.clone(), Vec::new())).collect();

        let mut total_fields = 0;
        let mut custom_fields = 0;
        let mut recovered_fields = 0;
        let mut needs_review = 0;
        let mut weak_matches = Vec::new();
        let mut entities = Vec::with_capacity(model.entities().len());

        for entity in model.entities() {
            let mut breakdown = EntityBreakdown {
                name: entity.name().to_string(),
                ..EntityBreakdown::default()
            };

            for field in entity.fields() {
                total_fields += 1;
                custom_fields += usize::from(field.is_custom());
                recovered_fields += usize::from(field.provenance() == FieldProvenance::Recovered);
                needs_review += usize::from(field.needs_review());

                for id in field.requirement_ids() {
                    coverage.entry(id.clone()).or_default().push(FieldLocation {
                        entity: entity.name().to_string(),
                        field: field.name().to_string(),
                    });
                }
                weak_matches.extend(field.weak_matches().iter().map(|id| WeakMatch {
                    entity: entity.name().to_string(),
                    field: field.name().to_string(),
                    requirement: id.clone(),
                }));

                let name = field.name().to_string();
                match FieldCategory::of(field) {
                    FieldCategory::Identifier => breakdown.identifiers.push(name),
                    FieldCategory::Attribute => breakdown.attributes.push(name),
                    FieldCategory::Metadata => breakdown.metadata.push(name),
                    FieldCategory::FieldGroupMember => breakdown
                        .field_groups
                        .entry(field.field_group().unwrap_or_default().to_string())
                        .or_default()
                        .push(name),
                }
            }
            entities.push(breakdown);
        }

        let uncovered_requirements: Vec<RequirementId> = coverage
            .iter()
            .filter(|(id, fields)| fields.is_empty() && !id.is_standard())
            .map(|(id, _)| id.clone())
            .collect();

        let digest = match model.digest() {
            Ok(digest) => Some(digest),
            Err(error) => {
                tracing::warn!(%error, "model digest unavailable");
                None
            }
        };

        let count = |kind: EntityType| model.entities().iter().filter(|e| e.entity_type() == kind).count();

        #[allow(clippy::cast_precision_loss)]
        let custom_percentage = if total_fields == 0 {
            0.0
        } else {
            custom_fields as f64 * 100.0 / total_fields as f64
        };

        let report = AnalysisReport {
            total_fields,
            custom_fields,
            custom_percentage,
            business_entities: count(EntityType::BusinessEntity),
            reference_entities: count(EntityType::ReferenceEntity),
            relationships: model.relationships().len(),
            recovered_fields,
            needs_review,
            weak_match_count: weak_matches.len(),
            weak_matches,
            uncovered_requirements,
            requirement_coverage: coverage,
            entities,
            digest,
        };

        tracing::info!(
            fields = report.total_fields,
            custom = report.custom_fields,
            weak = report.weak_match_count,
            uncovered = report.uncovered_requirements.len(),
            "traceability analysis complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reqtrace_model::{DataType, Entity, Justification, MatchStrength, Requirement};

    fn requirement(id: &str) -> Requirement {
        Requirement::new(id.parse().unwrap(), format!("text of {id}"), "Functional Requirements")
    }

    fn field(name: &str, group: Option<&str>, links: &[(&str, MatchStrength)]) -> Field {
        let mut field = Field::new(name, DataType::TextField).with_field_group(group.map(str::to_string));
        for (id, strength) in links {
            let req = if *id == "STANDARD" { Requirement::standard() } else { requirement(id) };
            field.link_requirement(&req, Justification::new("why", *strength)).unwrap();
        }
        field
    }

    fn sample() -> (RequirementSet, DataModel) {
        let requirements: RequirementSet = ["FR-1", "FR-2", "FR-3"].into_iter().map(requirement).collect();

        let mut person = Entity::new("Person", EntityType::BusinessEntity, "");
        person
            .push_field(field("firstName", None, &[("FR-1", MatchStrength::Literal)]).with_custom(false))
            .unwrap();
        person
            .push_field(field("CWID", None, &[("FR-1", MatchStrength::Literal), ("FR-2", MatchStrength::Weak)]).with_custom(true))
            .unwrap();
        person
            .push_field(field("city", Some("PostalAddress"), &[("FR-2", MatchStrength::Category)]))
            .unwrap();
        person
            .push_field(field("meta_createdBy", Some("_meta"), &[("STANDARD", MatchStrength::Override)]))
            .unwrap();
        let gender = Entity::new("Gender", EntityType::ReferenceEntity, "");

        (requirements, DataModel::new(vec![person, gender], vec![]))
    }

    #[test]
    fn categories() {
        let lookup = Field::new("gender", DataType::LookupField);
        assert_eq!(FieldCategory::of(&lookup), FieldCategory::Identifier);
        assert_eq!(FieldCategory::of(&Field::new("sourceAddressId", DataType::TextField)), FieldCategory::Identifier);
        assert_eq!(FieldCategory::of(&Field::new("idea", DataType::TextField)), FieldCategory::Attribute);
        assert_eq!(FieldCategory::of(&Field::new("meta_businessId", DataType::TextField)), FieldCategory::Metadata);
        assert_eq!(
            FieldCategory::of(&Field::new("phoneType", DataType::LookupField).with_field_group(Some("Phone".into()))),
            FieldCategory::FieldGroupMember
        );
    }

    #[test]
    fn statistics() {
        let (requirements, model) = sample();
        let report = TraceabilityAnalyzer::new(&requirements).analyze(&model);

        assert_eq!(report.total_fields, 4);
        assert_eq!(report.custom_fields, 1);
        assert!((report.custom_percentage - 25.0).abs() < f64::EPSILON);
        assert_eq!(report.business_entities, 1);
        assert_eq!(report.reference_entities, 1);
        assert_eq!(report.relationships, 0);
        assert_eq!(report.weak_match_count, 1);
        assert_eq!(report.weak_matches[0].field, "CWID");
        assert_eq!(report.needs_review, 1);
        assert!(report.digest.is_some());
    }

    #[test]
    fn reverse_map_and_gaps() {
        let (requirements, model) = sample();
        let report = TraceabilityAnalyzer::new(&requirements).analyze(&model);

        let fr1: RequirementId = "FR-1".parse().unwrap();
        let fields: Vec<&str> = report.fields_for(&fr1).iter().map(|l| l.field.as_str()).collect();
        assert_eq!(fields, vec!["firstName", "CWID"]);

        let keys: Vec<&str> = report.requirement_coverage.keys().map(RequirementId::as_str).collect();
        assert_eq!(keys, vec!["FR-1", "FR-2", "FR-3", "STANDARD"]);

        assert_eq!(report.uncovered_requirements, vec!["FR-3".parse::<RequirementId>().unwrap()]);
        assert!(!report.is_fully_covered());
    }

    #[test]
    fn breakdown() {
        let (requirements, model) = sample();
        let report = TraceabilityAnalyzer::new(&requirements).analyze(&model);
        let person = &report.entities[0];

        assert_eq!(person.identifiers, vec!["CWID"]);
        assert_eq!(person.attributes, vec!["firstName"]);
        assert_eq!(person.field_groups["PostalAddress"], vec!["city"]);
        assert_eq!(person.metadata, vec!["meta_createdBy"]);
    }

    #[test]
    fn empty_model() {
        let requirements = RequirementSet::new();
        let report = TraceabilityAnalyzer::new(&requirements).analyze(&DataModel::new(vec![], vec![]));
        assert_eq!(report.total_fields, 0);
        assert!(report.custom_percentage.abs() < f64::EPSILON);
        assert!(report.is_fully_covered());
    }
}
