//! Catalog field records

use reqtrace_model::naming::{normalize_key, split_words};
use reqtrace_model::DataType;
use serde::Serialize;

/// One out-of-the-box field definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogField {
    /// Owning entity
    pub entity_name: String,
    /// Field name as it appears in generated models
    pub field_name: String,
    /// Display label
    pub label: String,
    /// Field group, if the field belongs to one
    pub field_group: Option<String>,
    /// Data type
    pub data_type: DataType,
    /// Target reference entity for lookup fields
    pub lookup_entity: Option<String>,
    /// Alternative phrases used in requirement prose
    pub synonyms: Vec<String>,
}

impl CatalogField {
    /// Create catalog field with no group, label or synonyms
    #[must_use]
    pub fn new(entity_name: impl Into<String>, field_name: impl Into<String>, data_type: DataType) -> Self {
        let field_name = field_name.into();
        Self {
            entity_name: entity_name.into(),
            label: field_name.clone(),
            field_name,
            field_group: None,
            data_type,
            lookup_entity: None,
            synonyms: Vec::new(),
        }
    }

    /// With field group
    #[inline]
    #[must_use]
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.field_group = Some(group.into());
        self
    }

    /// With lookup target
    #[inline]
    #[must_use]
    pub fn with_lookup_entity(mut self, entity: impl Into<String>) -> Self {
        self.lookup_entity = Some(entity.into());
        self
    }

    /// With display label
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// With synonym phrases
    #[must_use]
    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms.extend(synonyms.into_iter().map(Into::into));
        self
    }

    /// Normalized lookup key of the field name
    #[inline]
    #[must_use]
    pub fn key(&self) -> String {
        normalize_key(&self.field_name)
    }

    /// Name words, for suffix matching
    #[inline]
    #[must_use]
    pub fn words(&self) -> Vec<String> {
        split_words(&self.field_name)
    }

    /// Whether the field is a lookup
    #[inline]
    #[must_use]
    pub fn is_lookup(&self) -> bool {
        self.data_type == DataType::LookupField
    }

    /// Field group label for messages
    #[inline]
    #[must_use]
    pub fn group_label(&self) -> &str {
        self.field_group.as_deref().unwrap_or("none")
    }
}
