//! Declared entity/field specification
//!
//! The field list is authored outside the engine (by an analyst or an
//! external agent) as JSON. The assembler validates it, classifies every
//! field against the catalog and adds the traceability views.

use crate::entity::{EntityType, Relationship};
use crate::error::ModelError;
use crate::field::DataType;
use serde::{Deserialize, Serialize};

/// Declared entities and relationships
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitiesSpec {
    /// Entities in declaration order
    pub entities: Vec<EntitySpec>,
    /// Declared relationships
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl EntitiesSpec {
    /// Create empty specification
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode from JSON
    ///
    /// A top-level `dataModel` wrapper, as emitted by authoring prompts, is
    /// unwrapped transparently.
    ///
    /// # Errors
    /// Returns error if the JSON does not describe an entities specification
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let inner = match value {
            serde_json::Value::Object(mut map) if map.contains_key("dataModel") => {
                map.remove("dataModel").unwrap_or_default()
            }
            other => other,
        };
        Ok(serde_json::from_value(inner)?)
    }

    /// With entity
    #[must_use]
    pub fn with_entity(mut self, entity: EntitySpec) -> Self {
        self.entities.push(entity);
        self
    }

    /// With relationship
    #[must_use]
    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Find declared entity
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&EntitySpec> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Business entities in declaration order
    pub fn business_entities(&self) -> impl Iterator<Item = &EntitySpec> {
        self.entities
            .iter()
            .filter(|e| e.entity_type == EntityType::BusinessEntity)
    }
}

/// Declared entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySpec {
    /// Entity name
    pub name: String,
    /// Entity kind
    #[serde(rename = "type", default)]
    pub entity_type: EntityType,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Declared fields
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl EntitySpec {
    /// Create declared entity
    #[must_use]
    pub fn new(name: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            name: name.into(),
            entity_type,
            description: String::new(),
            fields: Vec::new(),
        }
    }

    /// Business entity shorthand
    #[inline]
    #[must_use]
    pub fn business(name: impl Into<String>) -> Self {
        Self::new(name, EntityType::BusinessEntity)
    }

    /// Reference entity shorthand
    #[inline]
    #[must_use]
    pub fn reference(name: impl Into<String>) -> Self {
        Self::new(name, EntityType::ReferenceEntity)
    }

    /// With description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With field
    #[must_use]
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }
}

/// Declared field
///
/// Anything left unset is filled from the matching catalog entry when one
/// exists. `isCustom` is advisory: the classifier decides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    /// Field name
    pub name: String,
    /// Data type
    #[serde(default)]
    pub data_type: Option<DataType>,
    /// Field group
    #[serde(default)]
    pub field_group: Option<String>,
    /// Required flag
    #[serde(default)]
    pub is_required: bool,
    /// Lookup flag
    #[serde(default)]
    pub is_lookup: bool,
    /// Lookup target
    #[serde(default)]
    pub lookup_entity: Option<String>,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Author's custom/OOTB claim
    #[serde(default)]
    pub is_custom: Option<bool>,
    /// Linked requirement ids, as written by the author
    #[serde(default)]
    pub requirement_ids: Vec<String>,
}

impl FieldSpec {
    /// Create declared field
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// With data type
    #[must_use]
    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    /// With field group
    #[must_use]
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.field_group = Some(group.into());
        self
    }

    /// With required flag
    #[must_use]
    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    /// As lookup into `entity`
    #[must_use]
    pub fn lookup(mut self, entity: impl Into<String>) -> Self {
        self.is_lookup = true;
        self.data_type = Some(DataType::LookupField);
        self.lookup_entity = Some(entity.into());
        self
    }

    /// With description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Linked to requirements
    #[must_use]
    pub fn linked_to<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requirement_ids.extend(ids.into_iter().map(Into::into));
        self
    }
}
