//! Engine configuration
//!
//! Loaded from TOML; every key is optional and falls back to the compiled
//! default.
//!
//! ```toml
//! requirement_sheet_hints = ["functional", "requirement"]
//! standard_requirement = true
//!
//! [recovery]
//! enabled = true
//! scan_catalog_fields = true
//! default_entity = "Person"
//!
//! [[recovery.mention_rules]]
//! pattern = '(?i)\bbanner\s+id\b'
//! field = "bannerId"
//! entity = "Person"
//!
//! [[overrides]]
//! requirement = "FR-10"
//! field = "state"
//! text = "FR-10 requires residency tracking, captured by state."
//!
//! [[disambiguation]]
//! entity = "Person"
//! mention = "type"
//! field = "phoneType"
//! field_group = "Phone"
//!
//! [synonyms]
//! constituentId = ["constituent id", "unique identifier"]
//! ```

use indexmap::IndexMap;
use regex::Regex;
use reqtrace_extract::DEFAULT_SHEET_HINTS;
use reqtrace_model::{RequirementId, RequirementIdError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Field name accepted by override rules to match every field
pub const ANY_FIELD: &str = "*";

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sheet-name substrings that mark the requirements section
    pub requirement_sheet_hints: Vec<String>,
    /// Whether `STANDARD` resolves as a requirement for meta fields
    pub standard_requirement: bool,
    /// Requirement text re-scan
    pub recovery: RecoveryConfig,
    /// Canned justifications, consulted before the generic rules
    pub overrides: Vec<OverrideRule>,
    /// Resolutions for mentions matching several field groups
    pub disambiguation: Vec<DisambiguationRule>,
    /// Extra phrases per field name, used by the literal rule and the scan
    pub synonyms: IndexMap<String, Vec<String>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            requirement_sheet_hints: DEFAULT_SHEET_HINTS.iter().map(|h| (*h).to_string()).collect(),
            standard_requirement: true,
            recovery: RecoveryConfig::default(),
            overrides: Vec::new(),
            disambiguation: Vec::new(),
            synonyms: IndexMap::new(),
        }
    }
}

/// Requirement text re-scan settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Run the re-scan at all
    pub enabled: bool,
    /// Include the built-in mention rules (CWID, PIDM, source ids, ...)
    pub builtin_rules: bool,
    /// Scan for catalog field names of each business entity
    pub scan_catalog_fields: bool,
    /// Entity receiving mentions of rules without an entity; defaults to
    /// the first declared business entity
    pub default_entity: Option<String>,
    /// Additional mention rules
    pub mention_rules: Vec<MentionRule>,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            builtin_rules: true,
            scan_catalog_fields: true,
            default_entity: None,
            mention_rules: Vec::new(),
        }
    }
}

/// Regex naming a field in requirement prose
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionRule {
    /// Regex source
    pub pattern: String,
    /// Field the mention stands for
    pub field: String,
    /// Owning entity; `None` uses the recovery default entity
    #[serde(default)]
    pub entity: Option<String>,
}

impl MentionRule {
    /// Create rule
    #[must_use]
    pub fn new(pattern: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            field: field.into(),
            entity: None,
        }
    }

    /// With owning entity
    #[inline]
    #[must_use]
    pub fn for_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

/// Canned justification for one (requirement, field) pair
///
/// `field = "*"` applies to every field linked to the requirement. The text
/// may use `{field}` and `{requirement}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRule {
    /// Requirement id
    pub requirement: String,
    /// Field name or `*`
    pub field: String,
    /// Justification text
    pub text: String,
}

impl OverrideRule {
    /// Create rule
    #[must_use]
    pub fn new(requirement: impl Into<String>, field: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            requirement: requirement.into(),
            field: field.into(),
            text: text.into(),
        }
    }
}

/// Explicit resolution of an ambiguous mention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisambiguationRule {
    /// Entity the rule applies to; `None` applies to all
    #[serde(default)]
    pub entity: Option<String>,
    /// Mentioned name, any spelling
    pub mention: String,
    /// Field the mention resolves to
    pub field: String,
    /// Field group of the resolved field
    #[serde(default)]
    pub field_group: Option<String>,
}

impl DisambiguationRule {
    /// Create rule
    #[must_use]
    pub fn new(mention: impl Into<String>, field: impl Into<String>, field_group: Option<String>) -> Self {
        Self {
            entity: None,
            mention: mention.into(),
            field: field.into(),
            field_group,
        }
    }

    /// Restricted to one entity
    #[inline]
    #[must_use]
    pub fn for_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate TOML configuration
    ///
    /// # Errors
    /// Returns error on malformed TOML or invalid patterns/ids
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed or validated
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded engine configuration");
        Ok(config)
    }

    /// Check every pattern compiles and every requirement id parses
    ///
    /// # Errors
    /// Returns the first invalid entry
    pub fn validate(&self) -> Result<(), ConfigError> {
        for rule in &self.recovery.mention_rules {
            Regex::new(&rule.pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: rule.pattern.clone(),
                source,
            })?;
            if rule.field.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    key: "recovery.mention_rules.field".to_string(),
                    message: format!("empty field name for pattern '{}'", rule.pattern),
                });
            }
        }

        for rule in &self.overrides {
            RequirementId::parse(&rule.requirement).map_err(|source| ConfigError::InvalidRequirementId {
                value: rule.requirement.clone(),
                source,
            })?;
            if rule.text.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    key: "overrides.text".to_string(),
                    message: format!("empty justification for {} / {}", rule.requirement, rule.field),
                });
            }
        }

        for rule in &self.disambiguation {
            if rule.mention.trim().is_empty() || rule.field.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    key: "disambiguation".to_string(),
                    message: "mention and field must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// With sheet hints
    #[must_use]
    pub fn with_sheet_hints<I, S>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requirement_sheet_hints = hints.into_iter().map(Into::into).collect();
        self
    }

    /// With standard requirement enabled or disabled
    #[inline]
    #[must_use]
    pub fn with_standard_requirement(mut self, enabled: bool) -> Self {
        self.standard_requirement = enabled;
        self
    }

    /// With recovery settings
    #[inline]
    #[must_use]
    pub fn with_recovery(mut self, recovery: RecoveryConfig) -> Self {
        self.recovery = recovery;
        self
    }

    /// With recovery disabled
    #[inline]
    #[must_use]
    pub fn without_recovery(mut self) -> Self {
        self.recovery.enabled = false;
        self
    }

    /// With mention rule
    #[must_use]
    pub fn with_mention_rule(mut self, rule: MentionRule) -> Self {
        self.recovery.mention_rules.push(rule);
        self
    }

    /// With override
    #[must_use]
    pub fn with_override(mut self, rule: OverrideRule) -> Self {
        self.overrides.push(rule);
        self
    }

    /// With disambiguation rule
    #[must_use]
    pub fn with_disambiguation(mut self, rule: DisambiguationRule) -> Self {
        self.disambiguation.push(rule);
        self
    }

    /// With synonyms for a field
    #[must_use]
    pub fn with_synonyms<I, S>(mut self, field: impl Into<String>, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms
            .entry(field.into())
            .or_default()
            .extend(phrases.into_iter().map(Into::into));
        self
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML could not be parsed
    #[error("invalid configuration in {path}: {message}")]
    Parse { path: String, message: String },

    /// File could not be read
    #[error("cannot read configuration {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Mention rule pattern does not compile
    #[error("invalid mention pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Override names an invalid requirement id
    #[error("invalid requirement id '{value}' in overrides: {source}")]
    InvalidRequirementId {
        value: String,
        #[source]
        source: RequirementIdError,
    },

    /// Value out of range or empty
    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}
