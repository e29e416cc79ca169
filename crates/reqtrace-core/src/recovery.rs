//! Requirement text re-scan
//!
//! Declared field lists miss fields that requirements name outright (a
//! "CWID replacing PIDM" requirement with no CWID field). The scanner looks
//! for such mentions so the assembler can add them as recovered fields.
//!
//! The vocabulary has two sources, scanned in this order:
//!
//! - mention rules: built-in patterns plus `[[recovery.mention_rules]]`
//! - catalog terms: every catalog field of each declared business entity,
//!   by name and synonyms (groups starting with `_` are skipped)
//!
//! Mentions are reported in requirement order, then vocabulary order, which
//! is the order recovered fields are appended in.

use crate::classifier::{describe, distinct_groups, FieldClassifier};
use crate::config::{ConfigError, DisambiguationRule, EngineConfig, MentionRule};
use crate::error::AssemblyError;
use indexmap::IndexMap;
use regex::{Match, Regex};
use reqtrace_catalog::{CatalogField, CatalogStore};
use reqtrace_model::naming::{normalize_key, phrase_pattern};
use reqtrace_model::{EntitiesSpec, Requirement, RequirementSet};
use std::collections::HashSet;

/// Built-in mention rules as (pattern, field)
const BUILTIN_RULES: &[(&str, &str)] = &[
    (r"(?i)\bCWID\b", "CWID"),
    (r"(?i)\bPIDM\b", "PIDM"),
    (r"(?i)\b(employee\s+)?classification\b", "classification"),
    (
        r"(?i)\bsource\s+(system\s+)?address\s+id\b|\bunique\s+(primary\s+)?key(\s+value)?\s+for\s+(each\s+)?address",
        "sourceAddressId",
    ),
    (
        r"(?i)\bsource\s+(system\s+)?phone\s+id\b|\bunique\s+(primary\s+)?key(\s+value)?\s+for\s+(each\s+)?phone",
        "sourcePhoneId",
    ),
    (
        r"(?i)\bsource\s+(system\s+)?e-?mail\s+id\b|\bunique\s+(primary\s+)?key(\s+value)?\s+for\s+(each\s+)?e-?mail",
        "sourceEmailId",
    ),
    (r"(?i)\bconstituent\s+roles?\b", "constituentRole"),
    (r"(?i)\bconstituent\s+types?\b", "constituentType"),
];

/// Where a vocabulary term came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermSource {
    /// Built-in or configured mention rule
    Rule,
    /// Catalog field name or synonym
    Catalog,
}

/// One scannable term: any of `patterns` mentions `field` of `entity`
#[derive(Debug, Clone)]
pub struct MentionTerm {
    /// Declared entity the field belongs to
    pub entity: String,
    /// Field name the mention stands for
    pub field: String,
    /// Origin of the term
    pub source: TermSource,
    patterns: Vec<Regex>,
}

impl MentionTerm {
    fn find<'t>(&self, text: &'t str) -> Option<Match<'t>> {
        self.patterns.iter().find_map(|re| re.find(text))
    }
}

/// A field mention found in one requirement
#[derive(Debug, Clone, Copy)]
pub struct Mention<'s, 'r> {
    /// Matched term
    pub term: &'s MentionTerm,
    /// Requirement containing the mention
    pub requirement: &'r Requirement,
    /// Mention as written
    pub found: Match<'r>,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: MentionRule,
    pattern: Regex,
}

/// Compiled recovery settings
///
/// Built once per configuration; [`MentionScanner::vocabulary`] binds it to
/// the declared entities of one run.
#[derive(Debug, Clone)]
pub struct MentionScanner {
    enabled: bool,
    scan_catalog_fields: bool,
    default_entity: Option<String>,
    rules: Vec<CompiledRule>,
    /// normalized field name -> extra phrases
    synonyms: IndexMap<String, Vec<String>>,
}

impl MentionScanner {
    /// Compile built-in and configured mention rules
    ///
    /// # Errors
    /// Returns error if a configured pattern does not compile
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        let recovery = &config.recovery;
        let builtin = BUILTIN_RULES
            .iter()
            .filter(|_| recovery.builtin_rules)
            .map(|(pattern, field)| MentionRule::new(*pattern, *field));

        let rules = builtin
            .chain(recovery.mention_rules.iter().cloned())
            .map(|rule| {
                Regex::new(&rule.pattern)
                    .map(|pattern| CompiledRule { rule: rule.clone(), pattern })
                    .map_err(|source| ConfigError::InvalidPattern {
                        pattern: rule.pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut synonyms: IndexMap<String, Vec<String>> = IndexMap::new();
        for (field, phrases) in &config.synonyms {
            synonyms.entry(normalize_key(field)).or_default().extend(phrases.iter().cloned());
        }

        Ok(Self {
            enabled: recovery.enabled,
            scan_catalog_fields: recovery.scan_catalog_fields,
            default_entity: recovery.default_entity.clone(),
            rules,
            synonyms,
        })
    }

    /// Whether the re-scan runs at all
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Vocabulary for the declared entities
    ///
    /// Rules naming an entity that is not declared are skipped with a
    /// warning.
    #[must_use]
    pub fn vocabulary(&self, spec: &EntitiesSpec, catalog: &CatalogStore) -> Vocabulary {
        let mut terms = Vec::new();
        if !self.enabled {
            return Vocabulary { terms };
        }

        let default_entity = self
            .default_entity
            .clone()
            .or_else(|| spec.business_entities().next().map(|e| e.name.clone()));

        for CompiledRule { rule, pattern } in &self.rules {
            let Some(target) = rule.entity.as_ref().or(default_entity.as_ref()) else {
                tracing::warn!(field = %rule.field, "no business entity for mention rule; skipped");
                continue;
            };
            let Some(entity) = declared_name(spec, target) else {
                tracing::warn!(field = %rule.field, entity = %target, "mention rule names an undeclared entity; skipped");
                continue;
            };

            terms.push(MentionTerm {
                entity: entity.to_string(),
                field: rule.field.clone(),
                source: TermSource::Rule,
                patterns: vec![pattern.clone()],
            });
        }

        if self.scan_catalog_fields {
            for entity in spec.business_entities() {
                let mut seen = HashSet::new();
                for field in catalog.fields(&entity.name) {
                    if field.field_group.as_deref().is_some_and(|g| g.starts_with('_')) || !seen.insert(field.key()) {
                        continue;
                    }

                    let extra = self.synonyms.get(&field.key()).map(Vec::as_slice).unwrap_or_default();
                    let patterns = std::iter::once(&field.field_name)
                        .chain(&field.synonyms)
                        .chain(extra)
                        .filter_map(|p| phrase_pattern(p))
                        .filter_map(|p| Regex::new(&p).ok())
                        .collect();

                    terms.push(MentionTerm {
                        entity: entity.name.clone(),
                        field: field.field_name.clone(),
                        source: TermSource::Catalog,
                        patterns,
                    });
                }
            }
        }

        tracing::debug!(terms = terms.len(), "built mention vocabulary");
        Vocabulary { terms }
    }
}

/// Mention terms bound to one run's declared entities
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    terms: Vec<MentionTerm>,
}

impl Vocabulary {
    /// Terms in scan order
    #[inline]
    #[must_use]
    pub fn terms(&self) -> &[MentionTerm] {
        &self.terms
    }

    /// Number of terms
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether there is nothing to scan for
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Every mention in `requirements`
    ///
    /// One mention per (entity, field, requirement): the first term that
    /// matches wins.
    #[must_use]
    pub fn scan<'s, 'r>(&'s self, requirements: &'r RequirementSet) -> Vec<Mention<'s, 'r>> {
        let mut seen = HashSet::new();
        let mut mentions = Vec::new();

        for requirement in requirements {
            for term in &self.terms {
                let Some(found) = term.find(requirement.text()) else {
                    continue;
                };
                let key = (normalize_key(&term.entity), normalize_key(&term.field), requirement.id());
                if seen.insert(key) {
                    mentions.push(Mention {
                        term,
                        requirement,
                        found,
                    });
                }
            }
        }

        mentions
    }
}

fn declared_name<'a>(spec: &'a EntitiesSpec, name: &str) -> Option<&'a str> {
    let key = normalize_key(name);
    spec.entities
        .iter()
        .find(|e| normalize_key(&e.name) == key)
        .map(|e| e.name.as_str())
}

/// Field a mention resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'a> {
    /// Field name to add
    pub field: String,
    /// Field group to add it under
    pub field_group: Option<String>,
    /// Catalog entry, when the field is OOTB
    pub matched: Option<&'a CatalogField>,
    /// Partial catalog matches that did not decide the outcome
    pub partial: Vec<String>,
}

impl Resolution<'_> {
    /// No catalog match
    #[inline]
    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.matched.is_none()
    }
}

/// Resolve a mention against the catalog and disambiguation rules
///
/// # Errors
/// Returns [`AssemblyError::AmbiguousMention`] when the candidates span
/// several field groups and no rule settles it
pub fn resolve_mention<'a>(
    catalog: &'a CatalogStore,
    rules: &[DisambiguationRule],
    mention: &Mention<'_, '_>,
) -> Result<Resolution<'a>, AssemblyError> {
    let entity = mention.term.entity.as_str();
    let field = mention.term.field.as_str();

    if let Some(rule) = find_rule(rules, entity, field, mention.found.as_str()) {
        let classification = FieldClassifier::new(catalog).classify_in_group(entity, &rule.field, rule.field_group.as_deref());
        return Ok(Resolution {
            field: classification.matched.map_or_else(|| rule.field.clone(), |m| m.field_name.clone()),
            field_group: classification
                .matched
                .and_then(|m| m.field_group.clone())
                .or_else(|| rule.field_group.clone()),
            matched: classification.matched,
            partial: Vec::new(),
        });
    }

    let ambiguous = |candidates: &[&CatalogField]| AssemblyError::AmbiguousMention {
        entity: entity.to_string(),
        mention: mention.found.as_str().to_string(),
        requirement: mention.requirement.id().to_string(),
        candidates: describe(candidates),
    };

    let exact = catalog.lookup(entity, field);
    if distinct_groups(&exact) > 1 {
        return Err(ambiguous(&exact));
    }
    if let Some(hit) = exact.first().copied() {
        return Ok(Resolution {
            field: hit.field_name.clone(),
            field_group: hit.field_group.clone(),
            matched: Some(hit),
            partial: Vec::new(),
        });
    }

    let partial = catalog.partial_matches(entity, field);
    if distinct_groups(&partial) > 1 {
        return Err(ambiguous(&partial));
    }

    Ok(Resolution {
        field: field.to_string(),
        field_group: None,
        matched: None,
        partial: describe(&partial),
    })
}

fn find_rule<'r>(rules: &'r [DisambiguationRule], entity: &str, field: &str, found: &str) -> Option<&'r DisambiguationRule> {
    let entity = normalize_key(entity);
    let keys = [normalize_key(field), normalize_key(found)];
    rules.iter().find(|rule| {
        rule.entity.as_deref().map_or(true, |e| normalize_key(e) == entity)
            && keys.contains(&normalize_key(&rule.mention))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecoveryConfig;
    use pretty_assertions::assert_eq;
    use reqtrace_model::{EntitySpec, FieldSpec};

    fn catalog() -> CatalogStore {
        CatalogStore::parse(
            "Entity: Person\n\
             - First Name (firstName) aka: given name\n\
             - Gender (gender) [LookupField -> Gender]\n\
             Field Group: PostalAddress\n\
             - City (city)\n\
             - Address Id (addressId)\n\
             Field Group: Phone\n\
             - Phone Id (phoneId)\n\
             Field Group: _meta\n\
             meta_createdBy [TextField]\n",
        )
        .unwrap()
    }

    fn spec() -> EntitiesSpec {
        EntitiesSpec::new()
            .with_entity(EntitySpec::business("Person").with_field(FieldSpec::new("firstName")))
            .with_entity(EntitySpec::reference("Gender"))
    }

    fn requirements(items: &[(&str, &str)]) -> RequirementSet {
        items
            .iter()
            .map(|(id, text)| Requirement::new(id.parse().unwrap(), *text, "Functional Requirements"))
            .collect()
    }

    fn vocabulary(config: &EngineConfig, catalog: &CatalogStore) -> Vocabulary {
        MentionScanner::from_config(config).unwrap().vocabulary(&spec(), catalog)
    }

    fn found(scanner: &Vocabulary, reqs: &RequirementSet) -> Vec<(String, String, String)> {
        scanner
            .scan(reqs)
            .iter()
            .map(|m| (m.term.field.clone(), m.requirement.id().to_string(), m.found.as_str().to_string()))
            .collect()
    }

    #[test]
    fn builtin_rules_and_catalog_terms() {
        let catalog = catalog();
        let scanner = vocabulary(&EngineConfig::default(), &catalog);
        let reqs = requirements(&[
            ("FR-24", "Display CWID replacing PIDM in the UI"),
            ("FR-25", "Capture the given name and home city"),
        ]);

        assert_eq!(
            found(&scanner, &reqs),
            vec![
                ("CWID".to_string(), "FR-24".to_string(), "CWID".to_string()),
                ("PIDM".to_string(), "FR-24".to_string(), "PIDM".to_string()),
                ("firstName".to_string(), "FR-25".to_string(), "given name".to_string()),
                ("city".to_string(), "FR-25".to_string(), "city".to_string()),
            ]
        );
    }

    #[test]
    fn meta_groups_not_scanned() {
        let catalog = catalog();
        let scanner = vocabulary(&EngineConfig::default(), &catalog);
        assert!(scanner.terms().iter().all(|t| t.field != "meta_createdBy"));
    }

    #[test]
    fn disabled_recovery_has_no_terms() {
        let catalog = catalog();
        let config = EngineConfig::default().without_recovery();
        assert!(vocabulary(&config, &catalog).is_empty());
    }

    #[test]
    fn rule_for_undeclared_entity_skipped() {
        let catalog = catalog();
        let config = EngineConfig::default()
            .with_recovery(RecoveryConfig {
                builtin_rules: false,
                scan_catalog_fields: false,
                ..RecoveryConfig::default()
            })
            .with_mention_rule(MentionRule::new(r"(?i)\bbanner id\b", "bannerId").for_entity("Student"))
            .with_mention_rule(MentionRule::new(r"(?i)\bslate id\b", "slateId"));

        let scanner = vocabulary(&config, &catalog);
        assert_eq!(scanner.len(), 1);
        assert_eq!(scanner.terms()[0].field, "slateId");
        assert_eq!(scanner.terms()[0].entity, "Person");
    }

    #[test]
    fn configured_synonyms_extend_catalog_terms() {
        let catalog = catalog();
        let config = EngineConfig::default().with_synonyms("gender", ["sex"]);
        let scanner = vocabulary(&config, &catalog);
        let reqs = requirements(&[("FR-1", "Record legal sex")]);
        assert_eq!(found(&scanner, &reqs)[0].0, "gender");
    }

    fn resolve(rules: &[DisambiguationRule], pattern: &str, field: &str, text: &str) -> Result<(String, bool), AssemblyError> {
        let catalog = catalog();
        let config = EngineConfig::default()
            .with_recovery(RecoveryConfig {
                builtin_rules: false,
                scan_catalog_fields: false,
                ..RecoveryConfig::default()
            })
            .with_mention_rule(MentionRule::new(pattern, field));
        let scanner = vocabulary(&config, &catalog);
        let reqs = requirements(&[("FR-3", text)]);
        let mentions = scanner.scan(&reqs);
        let resolved = resolve_mention(&catalog, rules, &mentions[0]).map(|r| (r.field.clone(), r.is_custom()));
        resolved
    }

    #[test]
    fn partial_match_across_groups_is_ambiguous() {
        let err = resolve(&[], r"\bID\b", "id", "Every ID must be unique").unwrap_err();
        match err {
            AssemblyError::AmbiguousMention {
                mention, candidates, ..
            } => {
                assert_eq!(mention, "ID");
                assert_eq!(candidates, vec!["addressId (PostalAddress)", "phoneId (Phone)"]);
            }
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn disambiguation_rule_settles_mention() {
        let rules = vec![DisambiguationRule::new("ID", "phoneId", Some("Phone".into())).for_entity("Person")];
        assert_eq!(
            resolve(&rules, r"\bID\b", "id", "Every ID must be unique").unwrap(),
            ("phoneId".to_string(), false)
        );

        let rules = vec![DisambiguationRule::new("id", "legacyId", None)];
        assert_eq!(
            resolve(&rules, r"\bID\b", "id", "Every ID must be unique").unwrap(),
            ("legacyId".to_string(), true)
        );
    }

    #[test]
    fn unmatched_mention_is_custom() {
        assert_eq!(
            resolve(&[], r"\bCWID\b", "CWID", "Show CWID").unwrap(),
            ("CWID".to_string(), true)
        );
        assert_eq!(
            resolve(&[], r"\bcity\b", "city", "Home city").unwrap(),
            ("city".to_string(), false)
        );
    }
}
