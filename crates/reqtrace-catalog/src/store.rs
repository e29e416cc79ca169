//! In-memory catalog store
//!
//! Provides [`CatalogStore`], an immutable index of out-of-the-box fields by
//! entity and normalized field name. Built once and shared read-only by
//! every generation run.

use crate::error::CatalogError;
use crate::field::CatalogField;
use crate::parser::parse_catalog;
use reqtrace_model::naming::{normalize_key, split_words};
use std::collections::{HashMap, HashSet};
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("../catalog/ootb.txt");

/// Catalog of out-of-the-box fields
///
/// Field names are unique per (entity, field group); the same name may
/// appear under several field groups of one entity, so name lookups return
/// every candidate in catalog order.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    /// Fields in catalog order
    fields: Vec<CatalogField>,

    /// entity key -> field indices
    by_entity: HashMap<String, Vec<usize>>,

    /// (entity key, field key) -> field indices
    by_name: HashMap<(String, String), Vec<usize>>,

    /// Entity names in first-seen order
    entities: Vec<String>,
}

impl CatalogStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build store from field records
    ///
    /// # Errors
    /// Returns [`CatalogError::DuplicateField`] if a field name repeats
    /// within one entity and field group
    pub fn from_fields(fields: impl IntoIterator<Item = CatalogField>) -> Result<Self, CatalogError> {
        let mut store = Self::new();
        let mut seen = HashSet::new();

        for field in fields {
            let entity_key = normalize_key(&field.entity_name);
            let field_key = field.key();
            let group_key = field.field_group.as_deref().map(normalize_key);

            if !seen.insert((entity_key.clone(), group_key, field_key.clone())) {
                return Err(CatalogError::DuplicateField {
                    entity: field.entity_name,
                    field_group: field.field_group,
                    field: field.field_name,
                });
            }

            let index = store.fields.len();
            if !store.by_entity.contains_key(&entity_key) {
                store.entities.push(field.entity_name.clone());
            }
            store.by_entity.entry(entity_key.clone()).or_default().push(index);
            store.by_name.entry((entity_key, field_key)).or_default().push(index);
            store.fields.push(field);
        }

        Ok(store)
    }

    /// Parse catalog text
    ///
    /// # Errors
    /// Returns error on malformed lines or duplicate fields
    pub fn parse(text: &str) -> Result<Self, CatalogError> {
        let store = Self::from_fields(parse_catalog(text)?)?;
        tracing::debug!(
            entities = store.entities.len(),
            fields = store.fields.len(),
            "parsed catalog"
        );
        Ok(store)
    }

    /// Load catalog file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::parse(&text)?;
        tracing::info!(path = %path.display(), fields = store.len(), "loaded catalog");
        Ok(store)
    }

    /// Built-in catalog (Person, Organization, Product)
    ///
    /// # Errors
    /// Only fails if the embedded catalog is malformed
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::parse(BUILTIN_CATALOG)
    }

    /// Catalog fields of `entity` whose name matches `name` in any spelling
    #[must_use]
    pub fn lookup(&self, entity: &str, name: &str) -> Vec<&CatalogField> {
        let key = (normalize_key(entity), normalize_key(name));
        self.by_name
            .get(&key)
            .map(|indices| indices.iter().map(|&i| &self.fields[i]).collect())
            .unwrap_or_default()
    }

    /// Whether `entity` has a catalog field named `name`
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: &str, name: &str) -> bool {
        !self.lookup(entity, name).is_empty()
    }

    /// Catalog fields whose name ends with the words of `name`
    ///
    /// `id` partially matches `sourceAddressId`; `type` matches `phoneType`
    /// and `addressType`. Exact matches are excluded.
    #[must_use]
    pub fn partial_matches(&self, entity: &str, name: &str) -> Vec<&CatalogField> {
        let words = split_words(name);
        if words.is_empty() || normalize_key(name).len() < 2 {
            return Vec::new();
        }

        self.fields(entity)
            .filter(|f| {
                let candidate = f.words();
                candidate.len() > words.len() && candidate.ends_with(&words)
            })
            .collect()
    }

    /// Fields of `entity` in catalog order
    pub fn fields(&self, entity: &str) -> impl Iterator<Item = &CatalogField> {
        self.by_entity
            .get(&normalize_key(entity))
            .into_iter()
            .flatten()
            .map(|&i| &self.fields[i])
    }

    /// Distinct field groups of `entity` in catalog order
    #[must_use]
    pub fn field_groups(&self, entity: &str) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for group in self.fields(entity).filter_map(|f| f.field_group.as_deref()) {
            if !groups.contains(&group) {
                groups.push(group);
            }
        }
        groups
    }

    /// Whether the catalog defines `entity`
    #[inline]
    #[must_use]
    pub fn has_entity(&self, entity: &str) -> bool {
        self.by_entity.contains_key(&normalize_key(entity))
    }

    /// Entity names in catalog order
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    /// Every field in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &CatalogField> {
        self.fields.iter()
    }

    /// Number of fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
