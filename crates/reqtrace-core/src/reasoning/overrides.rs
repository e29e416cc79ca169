//! Fixed (requirement, field) justification table
//!
//! Consulted before the generic rules. The table is finite and explicit:
//! a pair either has an entry or falls through to the generic rules.

use crate::config::{ConfigError, OverrideRule, ANY_FIELD};
use indexmap::IndexMap;
use reqtrace_model::naming::normalize_key;
use reqtrace_model::RequirementId;

const STANDARD_TEXT: &str =
    "Standard meta field - required for all entities: {field} is maintained on every record for lineage and auditing.";

/// Field part of an override key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldSelector {
    /// Every field linked to the requirement
    Any,
    /// One field, by normalized name
    Named(String),
}

impl FieldSelector {
    /// Parse `*` or a field name
    #[must_use]
    pub fn parse(field: &str) -> Self {
        if field.trim() == ANY_FIELD {
            Self::Any
        } else {
            Self::Named(normalize_key(field))
        }
    }
}

/// Override table keyed by (requirement, field)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideTable {
    entries: IndexMap<(RequirementId, FieldSelector), String>,
}

impl OverrideTable {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the built-in `STANDARD` entry
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.insert(RequirementId::standard(), FieldSelector::Any, STANDARD_TEXT);
        table
    }

    /// Built-ins plus configured rules; later rules replace earlier ones
    ///
    /// # Errors
    /// Returns error if a rule names an invalid requirement id
    pub fn from_rules<'r>(rules: impl IntoIterator<Item = &'r OverrideRule>) -> Result<Self, ConfigError> {
        let mut table = Self::with_builtins();
        for rule in rules {
            let id = RequirementId::parse(&rule.requirement).map_err(|source| ConfigError::InvalidRequirementId {
                value: rule.requirement.clone(),
                source,
            })?;
            table.insert(id, FieldSelector::parse(&rule.field), rule.text.clone());
        }
        Ok(table)
    }

    /// Add or replace an entry
    pub fn insert(&mut self, requirement: RequirementId, field: FieldSelector, text: impl Into<String>) {
        self.entries.insert((requirement, field), text.into());
    }

    /// Resolved text for a pair; a named entry wins over `*`
    ///
    /// `{field}` and `{requirement}` placeholders are substituted.
    #[must_use]
    pub fn lookup(&self, requirement: &RequirementId, field: &str) -> Option<String> {
        let named = (requirement.clone(), FieldSelector::Named(normalize_key(field)));
        let any = (requirement.clone(), FieldSelector::Any);

        self.entries
            .get(&named)
            .or_else(|| self.entries.get(&any))
            .map(|text| {
                text.replace("{field}", field)
                    .replace("{requirement}", requirement.as_str())
            })
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> RequirementId {
        s.parse().unwrap()
    }

    #[test]
    fn standard_applies_to_every_field() {
        let table = OverrideTable::with_builtins();
        let text = table.lookup(&RequirementId::standard(), "meta_businessId").unwrap();
        assert!(text.starts_with("Standard meta field - required for all entities"));
        assert!(text.contains("meta_businessId"));
    }

    #[test]
    fn named_entry_beats_wildcard() {
        let rules = vec![
            OverrideRule::new("FR-10", "*", "any field of {requirement}"),
            OverrideRule::new("FR-10", "state", "residency for {field}"),
        ];
        let table = OverrideTable::from_rules(&rules).unwrap();

        assert_eq!(table.lookup(&id("FR-10"), "State").as_deref(), Some("residency for State"));
        assert_eq!(table.lookup(&id("FR-10"), "city").as_deref(), Some("any field of FR-10"));
        assert_eq!(table.lookup(&id("FR-11"), "state"), None);
    }

    #[test]
    fn configured_rule_replaces_builtin() {
        let rules = vec![OverrideRule::new("STANDARD", "*", "house rule")];
        let table = OverrideTable::from_rules(&rules).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup(&RequirementId::standard(), "x").as_deref(), Some("house rule"));
    }

    #[test]
    fn invalid_id_rejected() {
        let rules = vec![OverrideRule::new("bogus", "x", "y")];
        assert!(OverrideTable::from_rules(&rules).is_err());
    }
}
