//! Field justification generation
//!
//! For a (requirement, field) pair the generator tries, in order:
//!
//! 1. the override table (`Override`)
//! 2. the field name or a synonym appearing literally (`Literal`)
//! 3. a keyword of one of the field's semantic categories (`Category`)
//! 4. a generic statement flagged for review (`Weak`)
//!
//! Output depends only on the pair and the generator's tables, so the same
//! pair always yields the same text.

mod categories;
mod overrides;

pub use categories::{builtin_categories, categories_for, SemanticCategory};
pub use overrides::{FieldSelector, OverrideTable};

use crate::config::{ConfigError, EngineConfig};
use indexmap::IndexMap;
use regex::Regex;
use reqtrace_model::naming::{normalize_key, phrase_pattern};
use reqtrace_model::{Justification, MatchStrength, Requirement};

/// Characters of context kept on each side of a literal match
const EXCERPT_RADIUS: usize = 40;

/// The field side of a justification request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef<'f> {
    /// Owning entity
    pub entity: &'f str,
    /// Field name
    pub name: &'f str,
    /// Field group
    pub field_group: Option<&'f str>,
    /// Catalog synonyms
    pub synonyms: &'f [String],
}

impl<'f> FieldRef<'f> {
    /// Field without group or synonyms
    #[must_use]
    pub fn new(entity: &'f str, name: &'f str) -> Self {
        Self {
            entity,
            name,
            field_group: None,
            synonyms: &[],
        }
    }

    /// With field group
    #[inline]
    #[must_use]
    pub fn in_group(mut self, group: Option<&'f str>) -> Self {
        self.field_group = group;
        self
    }

    /// With catalog synonyms
    #[inline]
    #[must_use]
    pub fn with_synonyms(mut self, synonyms: &'f [String]) -> Self {
        self.synonyms = synonyms;
        self
    }
}

/// Deterministic justification generator
#[derive(Debug, Clone)]
pub struct ReasoningGenerator {
    overrides: OverrideTable,
    /// normalized field name -> extra phrases
    synonyms: IndexMap<String, Vec<String>>,
}

impl Default for ReasoningGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReasoningGenerator {
    /// Generator with built-in overrides and no extra synonyms
    #[must_use]
    pub fn new() -> Self {
        Self {
            overrides: OverrideTable::with_builtins(),
            synonyms: IndexMap::new(),
        }
    }

    /// Generator using configured overrides and synonyms
    ///
    /// # Errors
    /// Returns error if an override names an invalid requirement id
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        let mut generator = Self::new().with_overrides(OverrideTable::from_rules(&config.overrides)?);
        for (field, phrases) in &config.synonyms {
            generator
                .synonyms
                .entry(normalize_key(field))
                .or_default()
                .extend(phrases.iter().cloned());
        }
        Ok(generator)
    }

    /// With override table
    #[inline]
    #[must_use]
    pub fn with_overrides(mut self, overrides: OverrideTable) -> Self {
        self.overrides = overrides;
        self
    }

    /// Override table
    #[inline]
    #[must_use]
    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    /// Phrases that count as a literal mention of the field
    #[must_use]
    pub fn literal_phrases(&self, field: &FieldRef<'_>) -> Vec<String> {
        let mut phrases = vec![field.name.to_string()];
        phrases.extend(field.synonyms.iter().cloned());
        if let Some(extra) = self.synonyms.get(&normalize_key(field.name)) {
            phrases.extend(extra.iter().cloned());
        }
        phrases
    }

    /// First literal mention of the field in `text`, as written
    #[must_use]
    pub fn find_literal<'t>(&self, text: &'t str, field: &FieldRef<'_>) -> Option<regex::Match<'t>> {
        self.literal_phrases(field)
            .iter()
            .filter_map(|p| phrase_pattern(p))
            .filter_map(|p| Regex::new(&p).ok())
            .find_map(|re| re.find(text))
    }

    /// Justify linking `field` to `requirement`
    #[must_use]
    pub fn explain(&self, requirement: &Requirement, field: &FieldRef<'_>) -> Justification {
        if let Some(text) = self.overrides.lookup(requirement.id(), field.name) {
            return Justification::new(text, MatchStrength::Override);
        }

        if let Some(found) = self.find_literal(requirement.text(), field) {
            return literal(requirement, field.name, found);
        }

        for category in categories_for(field.name, field.field_group) {
            if let Some(keyword) = category.find_keyword(requirement.text()) {
                return Justification::new(
                    format!(
                        "{} does not name {} directly, but its reference to \"{}\" concerns {}, which {} holds.",
                        requirement.id(),
                        field.name,
                        keyword,
                        category.summary,
                        field.name
                    ),
                    MatchStrength::Category,
                );
            }
        }

        Justification::new(
            format!(
                "{} is linked to {} by the entity specification, but its text has no literal or category cue for this field; review the link.",
                requirement.id(),
                field.name
            ),
            MatchStrength::Weak,
        )
    }

    /// Justify a field recovered from a text mention
    ///
    /// `found` is the matched mention inside the requirement text.
    #[must_use]
    pub fn explain_mention(&self, requirement: &Requirement, field: &FieldRef<'_>, found: regex::Match<'_>) -> Justification {
        match self.overrides.lookup(requirement.id(), field.name) {
            Some(text) => Justification::new(text, MatchStrength::Override),
            None => literal(requirement, field.name, found),
        }
    }
}

fn literal(requirement: &Requirement, field: &str, found: regex::Match<'_>) -> Justification {
    Justification::new(
        format!(
            "{} explicitly calls for \"{}\" (\"{}\"), which {} captures directly.",
            requirement.id(),
            found.as_str(),
            excerpt(requirement.text(), found.start(), found.end()),
            field
        ),
        MatchStrength::Literal,
    )
}

/// Text around `start..end`, cut on char boundaries, with ellipses
fn excerpt(text: &str, start: usize, end: usize) -> String {
    let mut from = start.saturating_sub(EXCERPT_RADIUS);
    while !text.is_char_boundary(from) {
        from -= 1;
    }
    let mut to = (end + EXCERPT_RADIUS).min(text.len());
    while !text.is_char_boundary(to) {
        to += 1;
    }

    let mut out = String::new();
    if from > 0 {
        out.push_str("...");
    }
    out.push_str(text[from..to].trim());
    if to < text.len() {
        out.push_str("...");
    }
    out
}
