//! Data-model fields and their requirement links
//!
//! A [`Field`] owns three parallel views of its traceability:
//! `requirementIds`, `sourceRequirements` and `fieldReasoning`. They are only
//! ever extended together through [`Field::link_requirement`], so the three
//! always cover the same requirement set in the same order.

use crate::error::ModelError;
use crate::requirement::{Requirement, RequirementId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Field data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataType {
    /// Short text
    #[default]
    TextField,
    /// Reference to a lookup (reference) entity
    LookupField,
    /// Calendar date
    DateField,
    /// Timestamp
    DateTimeField,
    /// True/false flag
    BooleanField,
    /// Whole number
    IntegerField,
    /// Floating point number
    DoubleField,
    /// Long text
    ClobField,
}

impl DataType {
    /// Canonical name as serialized
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TextField => "TextField",
            Self::LookupField => "LookupField",
            Self::DateField => "DateField",
            Self::DateTimeField => "DateTimeField",
            Self::BooleanField => "BooleanField",
            Self::IntegerField => "IntegerField",
            Self::DoubleField => "DoubleField",
            Self::ClobField => "ClobField",
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = ModelError;

    /// Accepts `TextField` as well as the short form `Text`, case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        let key = key.strip_suffix("field").unwrap_or(&key);
        match key {
            "text" | "string" => Ok(Self::TextField),
            "lookup" => Ok(Self::LookupField),
            "date" => Ok(Self::DateField),
            "datetime" | "timestamp" => Ok(Self::DateTimeField),
            "boolean" | "bool" => Ok(Self::BooleanField),
            "integer" | "int" => Ok(Self::IntegerField),
            "double" | "decimal" => Ok(Self::DoubleField),
            "clob" => Ok(Self::ClobField),
            _ => Err(ModelError::UnknownDataType(s.trim().to_string())),
        }
    }
}

/// How strongly a justification is supported by the requirement text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchStrength {
    /// Fixed override table entry
    Override,
    /// Field name or synonym appears literally
    Literal,
    /// Category keyword appears, name does not
    Category,
    /// No lexical support; needs human review
    Weak,
}

impl MatchStrength {
    /// Weak matches are surfaced for review
    #[inline]
    #[must_use]
    pub const fn is_weak(self) -> bool {
        matches!(self, Self::Weak)
    }
}

/// Justification text for one (requirement, field) link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Justification {
    /// Natural-language justification, never empty
    pub text: String,
    /// Rule that produced it
    pub strength: MatchStrength,
}

impl Justification {
    /// Create new justification
    #[inline]
    #[must_use]
    pub fn new(text: impl Into<String>, strength: MatchStrength) -> Self {
        Self {
            text: text.into(),
            strength,
        }
    }
}

/// Where a field came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldProvenance {
    /// Listed in the entities specification
    #[default]
    Declared,
    /// Added by the requirement text re-scan
    Recovered,
}

/// A field of an entity in the generated data model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    name: String,
    data_type: DataType,
    field_group: Option<String>,
    is_custom: bool,
    is_required: bool,
    is_lookup: bool,
    lookup_entity: Option<String>,
    description: String,
    requirement_ids: Vec<RequirementId>,
    source_requirements: Vec<String>,
    field_reasoning: IndexMap<RequirementId, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    weak_matches: Vec<RequirementId>,
    #[serde(default)]
    provenance: FieldProvenance,
    #[serde(default)]
    needs_review: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    review_notes: Vec<String>,
}

impl Field {
    /// Create field with no requirement links
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            field_group: None,
            is_custom: false,
            is_required: false,
            is_lookup: data_type == DataType::LookupField,
            lookup_entity: None,
            description: String::new(),
            requirement_ids: Vec::new(),
            source_requirements: Vec::new(),
            field_reasoning: IndexMap::new(),
            weak_matches: Vec::new(),
            provenance: FieldProvenance::Declared,
            needs_review: false,
            review_notes: Vec::new(),
        }
    }

    /// With field group
    #[inline]
    #[must_use]
    pub fn with_field_group(mut self, group: Option<String>) -> Self {
        self.field_group = group;
        self
    }

    /// With custom flag
    #[inline]
    #[must_use]
    pub fn with_custom(mut self, is_custom: bool) -> Self {
        self.is_custom = is_custom;
        self
    }

    /// With required flag
    #[inline]
    #[must_use]
    pub fn with_required(mut self, is_required: bool) -> Self {
        self.is_required = is_required;
        self
    }

    /// With lookup target; `None` keeps the flag only
    #[inline]
    #[must_use]
    pub fn with_lookup(mut self, is_lookup: bool, entity: Option<String>) -> Self {
        self.is_lookup = is_lookup;
        self.lookup_entity = entity;
        self
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With provenance
    #[inline]
    #[must_use]
    pub fn with_provenance(mut self, provenance: FieldProvenance) -> Self {
        self.provenance = provenance;
        if provenance == FieldProvenance::Recovered {
            self.needs_review = true;
        }
        self
    }

    /// Link a requirement with its justification
    ///
    /// Appends to `requirementIds`, `sourceRequirements` and `fieldReasoning`
    /// together. Weak justifications are also recorded in `weakMatches` and
    /// mark the field for review.
    ///
    /// # Errors
    /// Returns [`ModelError::DuplicateLink`] if the requirement is already linked
    pub fn link_requirement(
        &mut self,
        requirement: &Requirement,
        justification: Justification,
    ) -> Result<(), ModelError> {
        let id = requirement.id();
        if self.field_reasoning.contains_key(id) {
            return Err(ModelError::DuplicateLink {
                field: self.name.clone(),
                requirement: id.to_string(),
            });
        }

        self.requirement_ids.push(id.clone());
        self.source_requirements.push(requirement.formatted());
        self.field_reasoning.insert(id.clone(), justification.text);

        if justification.strength.is_weak() {
            self.weak_matches.push(id.clone());
            self.needs_review = true;
        }

        Ok(())
    }

    /// Attach a review note; marks the field for review
    pub fn add_review_note(&mut self, note: impl Into<String>) {
        self.review_notes.push(note.into());
        self.needs_review = true;
    }

    /// Field name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Data type
    #[inline]
    #[must_use]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Field group, if any
    #[inline]
    #[must_use]
    pub fn field_group(&self) -> Option<&str> {
        self.field_group.as_deref()
    }

    /// Whether the field is custom (no catalog match)
    #[inline]
    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.is_custom
    }

    /// Whether the field is required
    #[inline]
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.is_required
    }

    /// Whether the field is a lookup
    #[inline]
    #[must_use]
    pub fn is_lookup(&self) -> bool {
        self.is_lookup
    }

    /// Lookup target entity
    #[inline]
    #[must_use]
    pub fn lookup_entity(&self) -> Option<&str> {
        self.lookup_entity.as_deref()
    }

    /// Description
    #[inline]
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Linked requirement ids in traceability order
    #[inline]
    #[must_use]
    pub fn requirement_ids(&self) -> &[RequirementId] {
        &self.requirement_ids
    }

    /// Formatted requirement strings, aligned with [`Self::requirement_ids`]
    #[inline]
    #[must_use]
    pub fn source_requirements(&self) -> &[String] {
        &self.source_requirements
    }

    /// Justification per requirement id
    #[inline]
    #[must_use]
    pub fn field_reasoning(&self) -> &IndexMap<RequirementId, String> {
        &self.field_reasoning
    }

    /// Requirement ids whose justification is a weak match
    #[inline]
    #[must_use]
    pub fn weak_matches(&self) -> &[RequirementId] {
        &self.weak_matches
    }

    /// Declared or recovered
    #[inline]
    #[must_use]
    pub fn provenance(&self) -> FieldProvenance {
        self.provenance
    }

    /// Whether a reviewer should look at this field
    #[inline]
    #[must_use]
    pub fn needs_review(&self) -> bool {
        self.needs_review
    }

    /// Review notes
    #[inline]
    #[must_use]
    pub fn review_notes(&self) -> &[String] {
        &self.review_notes
    }

    /// Check the three traceability views cover the same ids
    ///
    /// Returns a description of the first mismatch.
    pub fn check_traceability(&self) -> Result<(), String> {
        if self.requirement_ids.len() != self.source_requirements.len() {
            return Err(format!(
                "{} requirement ids but {} source requirements",
                self.requirement_ids.len(),
                self.source_requirements.len()
            ));
        }

        if self.requirement_ids.len() != self.field_reasoning.len() {
            return Err(format!(
                "{} requirement ids but {} reasoning entries",
                self.requirement_ids.len(),
                self.field_reasoning.len()
            ));
        }

        for (id, source) in self.requirement_ids.iter().zip(&self.source_requirements) {
            if !self.field_reasoning.contains_key(id) {
                return Err(format!("no reasoning for {id}"));
            }
            if !source.starts_with(&format!("{id}:")) {
                return Err(format!("source requirement '{source}' does not belong to {id}"));
            }
        }

        if let Some(orphan) = self.weak_matches.iter().find(|id| !self.field_reasoning.contains_key(*id)) {
            return Err(format!("weak match {orphan} is not linked"));
        }

        Ok(())
    }

    /// Whether [`Self::check_traceability`] passes
    #[inline]
    #[must_use]
    pub fn is_traceability_aligned(&self) -> bool {
        self.check_traceability().is_ok()
    }
}
