//! Requirement statements and identifiers
//!
//! Provides [`RequirementId`] (validated `PREFIX-digits` identifiers),
//! [`Requirement`] (immutable extracted statement) and [`RequirementSet`]
//! (document-ordered, id-unique collection).

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

static ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]{1,8})(?:\s*[-_.]\s*|\s*)(\d+)$").expect("requirement id pattern is valid")
});

const STANDARD_ID: &str = "STANDARD";
const STANDARD_TEXT: &str = "Standard meta field - required for all entities";

/// Requirement identifier such as `FR-12` or `DQR-3`
///
/// Parsing accepts `FR-12`, `fr_12`, `FR 12` and `FR12`; the canonical form
/// is the upper-case prefix, a dash, and the digits as written.
/// `STANDARD` is reserved for the standard meta-field pseudo-requirement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RequirementId(String);

impl RequirementId {
    /// Parse an identifier cell
    ///
    /// # Errors
    /// Returns error if the text is not `<letters><separator?><digits>`
    pub fn parse(raw: &str) -> Result<Self, RequirementIdError> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case(STANDARD_ID) {
            return Ok(Self::standard());
        }

        let caps = ID_PATTERN
            .captures(trimmed)
            .ok_or_else(|| RequirementIdError::InvalidFormat(trimmed.to_string()))?;

        Ok(Self(format!("{}-{}", caps[1].to_ascii_uppercase(), &caps[2])))
    }

    /// The reserved standard meta-field pseudo-requirement
    #[inline]
    #[must_use]
    pub fn standard() -> Self {
        Self(STANDARD_ID.to_string())
    }

    /// Whether this is the standard pseudo-requirement
    #[inline]
    #[must_use]
    pub fn is_standard(&self) -> bool {
        self.0 == STANDARD_ID
    }

    /// Canonical string form
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Letter prefix (`FR`, `DQR`)
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl Display for RequirementId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RequirementId {
    type Err = RequirementIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RequirementId {
    type Error = RequirementIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RequirementId> for String {
    fn from(id: RequirementId) -> Self {
        id.0
    }
}

impl AsRef<str> for RequirementId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lets maps keyed by id be indexed with `&str`
impl Borrow<str> for RequirementId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Invalid requirement identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequirementIdError {
    /// Text does not follow the `PREFIX-digits` pattern
    #[error("'{0}' is not a requirement identifier")]
    InvalidFormat(String),
}

/// Requirement extracted from a document
///
/// Immutable once built; identity is the [`RequirementId`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    id: RequirementId,
    text: String,
    source_section: String,
}

impl Requirement {
    /// Create new requirement
    #[must_use]
    pub fn new(id: RequirementId, text: impl Into<String>, source_section: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            source_section: source_section.into(),
        }
    }

    /// The standard meta-field pseudo-requirement
    #[must_use]
    pub fn standard() -> Self {
        Self::new(RequirementId::standard(), STANDARD_TEXT, "standard")
    }

    /// Identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> &RequirementId {
        &self.id
    }

    /// Requirement text (whitespace already collapsed by the extractor)
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Sheet or section the requirement came from
    #[inline]
    #[must_use]
    pub fn source_section(&self) -> &str {
        &self.source_section
    }

    /// Traceability string: `"FR-10: <text>"`
    #[must_use]
    pub fn formatted(&self) -> String {
        format!("{}: {}", self.id, self.text)
    }
}

/// Document-ordered set of requirements, unique by id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementSet {
    inner: IndexMap<RequirementId, Requirement>,
}

impl RequirementSet {
    /// Create empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a requirement
    ///
    /// A requirement with an existing id replaces it in place, keeping the
    /// original position; the previous value is returned.
    pub fn insert(&mut self, requirement: Requirement) -> Option<Requirement> {
        self.inner.insert(requirement.id.clone(), requirement)
    }

    /// Lookup by id
    #[inline]
    #[must_use]
    pub fn get(&self, id: &RequirementId) -> Option<&Requirement> {
        self.inner.get(id)
    }

    /// Whether the id is present
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &RequirementId) -> bool {
        self.inner.contains_key(id)
    }

    /// Position of the id in document order
    #[inline]
    #[must_use]
    pub fn position(&self, id: &RequirementId) -> Option<usize> {
        self.inner.get_index_of(id)
    }

    /// Requirements in document order
    pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
        self.inner.values()
    }

    /// Ids in document order
    pub fn ids(&self) -> impl Iterator<Item = &RequirementId> {
        self.inner.keys()
    }

    /// Number of requirements
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the set is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl FromIterator<Requirement> for RequirementSet {
    fn from_iter<I: IntoIterator<Item = Requirement>>(iter: I) -> Self {
        let mut set = Self::new();
        for requirement in iter {
            set.insert(requirement);
        }
        set
    }
}

impl<'a> IntoIterator for &'a RequirementSet {
    type Item = &'a Requirement;
    type IntoIter = indexmap::map::Values<'a, RequirementId, Requirement>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.values()
    }
}

impl Serialize for RequirementSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.inner.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> RequirementId {
        s.parse().unwrap()
    }

    #[test]
    fn parse_canonical_forms() {
        assert_eq!(id("FR-10").as_str(), "FR-10");
        assert_eq!(id("fr_10").as_str(), "FR-10");
        assert_eq!(id("FR 10").as_str(), "FR-10");
        assert_eq!(id("FR10").as_str(), "FR-10");
        assert_eq!(id("  DQR-3 ").as_str(), "DQR-3");
        assert_eq!(id("FR-001").as_str(), "FR-001");
    }

    #[test]
    fn parse_rejects_non_identifiers() {
        for bad in ["", "FR-", "-10", "10", "FR-10a", "Functional Requirements", "FR #"] {
            assert!(RequirementId::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn standard_id() {
        let standard = id("standard");
        assert!(standard.is_standard());
        assert_eq!(standard, RequirementId::standard());
        assert!(!id("FR-1").is_standard());
    }

    #[test]
    fn prefix() {
        assert_eq!(id("DQR-3").prefix(), "DQR");
        assert_eq!(RequirementId::standard().prefix(), "STANDARD");
    }

    #[test]
    fn serde_uses_canonical_string() {
        let json = serde_json::to_string(&id("fr 7")).unwrap();
        assert_eq!(json, "\"FR-7\"");

        let back: RequirementId = serde_json::from_str("\"FR7\"").unwrap();
        assert_eq!(back, id("FR-7"));

        assert!(serde_json::from_str::<RequirementId>("\"nope\"").is_err());
    }

    #[test]
    fn formatted_source_requirement() {
        let req = Requirement::new(id("FR-1"), "Capture names", "Functional Requirements");
        assert_eq!(req.formatted(), "FR-1: Capture names");
    }

    #[test]
    fn set_preserves_first_position_on_replace() {
        let mut set = RequirementSet::new();
        set.insert(Requirement::new(id("FR-2"), "two", "s"));
        set.insert(Requirement::new(id("FR-1"), "one", "s"));
        let previous = set.insert(Requirement::new(id("FR-2"), "two, longer", "s"));

        assert_eq!(previous.map(|r| r.text().to_string()), Some("two".to_string()));
        let ids: Vec<_> = set.ids().map(RequirementId::as_str).collect();
        assert_eq!(ids, vec!["FR-2", "FR-1"]);
        assert_eq!(set.get(&id("FR-2")).unwrap().text(), "two, longer");
        assert_eq!(set.position(&id("FR-1")), Some(1));
    }
}
