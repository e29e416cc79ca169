//! OOTB vs custom field classification
//!
//! A field is OOTB exactly when the catalog has an entry with the same
//! normalized name for the owning entity. Everything else is custom: the
//! classifier never fails and never drops a field.

use reqtrace_catalog::{CatalogField, CatalogStore};
use reqtrace_model::naming::normalize_key;
use std::fmt::{self, Display, Formatter};

/// Why a classification needed a tie-break or fell back to custom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbiguityKind {
    /// Exact name exists in several field groups
    MultipleGroups,
    /// No exact name; only longer catalog names end with it
    PartialOnly,
}

/// Informational note about an uncertain classification
///
/// Never an error: the classification it accompanies is already final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationAmbiguity {
    /// Owning entity
    pub entity: String,
    /// Field name as declared
    pub field: String,
    /// Candidates as `name (group)`
    pub candidates: Vec<String>,
    /// Kind of ambiguity
    pub kind: AmbiguityKind,
}

impl Display for ClassificationAmbiguity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.kind {
            AmbiguityKind::MultipleGroups => write!(
                f,
                "'{}' exists in several field groups of {} ({}); using the first",
                self.field,
                self.entity,
                self.candidates.join(", ")
            ),
            AmbiguityKind::PartialOnly => write!(
                f,
                "'{}' only partially matches catalog fields of {} ({}); classified as custom",
                self.field,
                self.entity,
                self.candidates.join(", ")
            ),
        }
    }
}

/// Result of classifying one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification<'a> {
    /// No catalog match
    pub is_custom: bool,
    /// Matched catalog entry
    pub matched: Option<&'a CatalogField>,
    /// Tie-break or partial-match note
    pub ambiguity: Option<ClassificationAmbiguity>,
}

/// Catalog-backed classifier
#[derive(Debug, Clone, Copy)]
pub struct FieldClassifier<'a> {
    catalog: &'a CatalogStore,
}

impl<'a> FieldClassifier<'a> {
    /// Create classifier over `catalog`
    #[inline]
    #[must_use]
    pub fn new(catalog: &'a CatalogStore) -> Self {
        Self { catalog }
    }

    /// Classify `field` of `entity`
    #[inline]
    #[must_use]
    pub fn classify(&self, entity: &str, field: &str) -> Classification<'a> {
        self.classify_in_group(entity, field, None)
    }

    /// Classify `field` of `entity`, preferring a candidate in `group`
    #[must_use]
    pub fn classify_in_group(&self, entity: &str, field: &str, group: Option<&str>) -> Classification<'a> {
        let catalog: &'a CatalogStore = self.catalog;
        let exact = catalog.lookup(entity, field);

        if exact.is_empty() {
            let partial = catalog.partial_matches(entity, field);
            let ambiguity = (!partial.is_empty()).then(|| ClassificationAmbiguity {
                entity: entity.to_string(),
                field: field.to_string(),
                candidates: describe(&partial),
                kind: AmbiguityKind::PartialOnly,
            });
            return Classification {
                is_custom: true,
                matched: None,
                ambiguity,
            };
        }

        if let Some(group) = group.map(normalize_key) {
            if let Some(hit) = exact
                .iter()
                .find(|c| c.field_group.as_deref().map(normalize_key).as_deref() == Some(group.as_str()))
            {
                return Classification {
                    is_custom: false,
                    matched: Some(*hit),
                    ambiguity: None,
                };
            }
        }

        let ambiguity = (distinct_groups(&exact) > 1).then(|| ClassificationAmbiguity {
            entity: entity.to_string(),
            field: field.to_string(),
            candidates: describe(&exact),
            kind: AmbiguityKind::MultipleGroups,
        });

        Classification {
            is_custom: false,
            matched: exact.first().copied(),
            ambiguity,
        }
    }
}

/// Number of distinct field groups (no group counts as one)
pub(crate) fn distinct_groups(candidates: &[&CatalogField]) -> usize {
    let mut groups: Vec<Option<&str>> = candidates.iter().map(|c| c.field_group.as_deref()).collect();
    groups.sort_unstable();
    groups.dedup();
    groups.len()
}

pub(crate) fn describe(candidates: &[&CatalogField]) -> Vec<String> {
    candidates
        .iter()
        .map(|c| format!("{} ({})", c.field_name, c.group_label()))
        .collect()
}
