//! Entities, relationships and the data-model root

use crate::digest::ModelDigest;
use crate::error::ModelError;
use crate::field::Field;
use crate::naming::normalize_key;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EntityType {
    /// Master data entity (Person, Organization, ...)
    #[default]
    BusinessEntity,
    /// Lookup values referenced by lookup fields
    ReferenceEntity,
}

impl Display for EntityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusinessEntity => f.write_str("BusinessEntity"),
            Self::ReferenceEntity => f.write_str("ReferenceEntity"),
        }
    }
}

/// Entity with ordered, name-unique fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    name: String,
    #[serde(rename = "type")]
    entity_type: EntityType,
    #[serde(default)]
    description: String,
    #[serde(default)]
    fields: Vec<Field>,
}

impl Entity {
    /// Create entity without fields
    #[must_use]
    pub fn new(name: impl Into<String>, entity_type: EntityType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type,
            description: description.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field
    ///
    /// # Errors
    /// Returns [`ModelError::DuplicateField`] if a field with the same
    /// normalized name already exists
    pub fn push_field(&mut self, field: Field) -> Result<(), ModelError> {
        if self.field(field.name()).is_some() {
            return Err(ModelError::DuplicateField {
                entity: self.name.clone(),
                field: field.name().to_string(),
            });
        }
        self.fields.push(field);
        Ok(())
    }

    /// Entity name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entity kind
    #[inline]
    #[must_use]
    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Description
    #[inline]
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Fields in declaration order
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Find field by name, any spelling
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        let key = normalize_key(name);
        self.fields.iter().find(|f| normalize_key(f.name()) == key)
    }
}

/// Relationship cardinality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipType {
    /// One related record
    HasOne,
    /// Many related records
    HasMany,
    /// Inverse reference
    ReferencedBy,
}

/// Relationship between two entities of the same model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    /// Source entity name
    pub from_entity: String,
    /// Target entity name
    pub to_entity: String,
    /// Cardinality
    pub relationship_type: RelationshipType,
    /// Description
    #[serde(default)]
    pub description: String,
}

impl Relationship {
    /// Create new relationship
    #[must_use]
    pub fn new(
        from_entity: impl Into<String>,
        to_entity: impl Into<String>,
        relationship_type: RelationshipType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            from_entity: from_entity.into(),
            to_entity: to_entity.into(),
            relationship_type,
            description: description.into(),
        }
    }
}

/// Assembled data model
///
/// Snapshot produced by one generation run. There are no mutating methods:
/// consumers read it, serialize it, or digest it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataModel {
    entities: Vec<Entity>,
    #[serde(default)]
    relationships: Vec<Relationship>,
}

impl DataModel {
    /// Create model from already-validated parts
    #[must_use]
    pub fn new(entities: Vec<Entity>, relationships: Vec<Relationship>) -> Self {
        Self {
            entities,
            relationships,
        }
    }

    /// Decode a model produced elsewhere
    ///
    /// Decoding checks shape only; run a validator before trusting invariants.
    ///
    /// # Errors
    /// Returns error if the JSON does not describe a data model
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Entities in declaration order
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Relationships
    #[inline]
    #[must_use]
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Find entity by name
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// All `(entity, field)` pairs in serialization order
    pub fn fields(&self) -> impl Iterator<Item = (&Entity, &Field)> {
        self.entities
            .iter()
            .flat_map(|e| e.fields.iter().map(move |f| (e, f)))
    }

    /// Canonical pretty JSON: entities, their fields in order, relationships last
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json_pretty(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Digest of the canonical serialized form
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn digest(&self) -> Result<ModelDigest, ModelError> {
        Ok(ModelDigest::compute_serializable(self)?)
    }
}
