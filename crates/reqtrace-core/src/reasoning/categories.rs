//! Built-in semantic categories
//!
//! A category ties field names (by word or field group) to keyword phrases
//! that signal the same concept in requirement prose. When a requirement
//! does not name a field but uses one of its category keywords, the link is
//! explained as an inferred semantic one.

use once_cell::sync::Lazy;
use regex::Regex;
use reqtrace_model::naming::{normalize_key, phrase_pattern, split_words};

/// A keyword family for one kind of field
#[derive(Debug)]
pub struct SemanticCategory {
    /// Category name
    pub name: &'static str,
    /// What fields of this category hold, for justification text
    pub summary: &'static str,
    name_words: &'static [&'static str],
    groups: &'static [&'static str],
    keywords: Vec<(&'static str, Regex)>,
}

impl SemanticCategory {
    fn new(
        name: &'static str,
        summary: &'static str,
        name_words: &'static [&'static str],
        groups: &'static [&'static str],
        keywords: &'static [&'static str],
    ) -> Self {
        let keywords = keywords
            .iter()
            .filter_map(|k| phrase_pattern(k).map(|p| (*k, p)))
            .map(|(k, p)| (k, Regex::new(&p).expect("keyword pattern built from escaped words")))
            .collect();

        Self {
            name,
            summary,
            name_words,
            groups,
            keywords,
        }
    }

    /// Whether a field with this name/group belongs to the category
    #[must_use]
    pub fn applies_to(&self, field_name: &str, field_group: Option<&str>) -> bool {
        if let Some(group) = field_group.map(normalize_key) {
            if self.groups.iter().any(|g| normalize_key(g) == group) {
                return true;
            }
        }
        split_words(field_name)
            .iter()
            .any(|word| self.name_words.contains(&word.as_str()))
    }

    /// First keyword found in `text`, as written in the text
    #[must_use]
    pub fn find_keyword<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.keywords
            .iter()
            .find_map(|(_, re)| re.find(text).map(|m| m.as_str()))
    }

    /// Keyword phrases
    pub fn keywords(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.keywords.iter().map(|(k, _)| *k)
    }
}

static BUILTIN: Lazy<Vec<SemanticCategory>> = Lazy::new(|| {
    vec![
        SemanticCategory::new(
            "identifier",
            "uniquely identifying and matching records",
            &["id", "identifier", "cwid", "pidm", "key", "ssn", "duns", "sku", "upc"],
            &[],
            &[
                "unique identifier",
                "identifier",
                "unique key",
                "primary key",
                "legacy id",
                "dedup",
                "de-dup",
                "deduplication",
                "duplicate",
                "match",
                "merge",
                "crosswalk",
                "cross reference",
            ],
        ),
        SemanticCategory::new(
            "birthDate",
            "the person's date of birth",
            &["birth", "dob"],
            &[],
            &["date of birth", "birth date", "birthdate", "dob", "age"],
        ),
        SemanticCategory::new(
            "personName",
            "the name a record is known by",
            &["name", "prefix", "suffix", "salutation"],
            &[],
            &["legal name", "preferred name", "full name", "names", "name"],
        ),
        SemanticCategory::new(
            "postalAddress",
            "postal address components",
            &["address", "city", "state", "postal", "zip", "country", "street"],
            &["PostalAddress"],
            &["mailing address", "address", "postal", "zip", "residence", "location", "geographic"],
        ),
        SemanticCategory::new(
            "phone",
            "telephone contact details",
            &["phone", "telephone", "mobile"],
            &["Phone"],
            &["phone", "telephone", "mobile", "cell", "contact number"],
        ),
        SemanticCategory::new(
            "electronicAddress",
            "electronic contact details",
            &["email", "electronic"],
            &["ElectronicAddress"],
            &["email", "e-mail", "electronic address"],
        ),
        SemanticCategory::new(
            "role",
            "the roles and affiliations a constituent holds",
            &["role", "affiliation"],
            &[],
            &["role", "roles", "affiliation", "student", "staff", "faculty", "alumni", "employee", "constituent type"],
        ),
        SemanticCategory::new(
            "classification",
            "categorising records",
            &["classification", "category", "type", "segment"],
            &[],
            &["classification", "classify", "category", "categorize", "type", "segment"],
        ),
        SemanticCategory::new(
            "sourceSystem",
            "which source system contributed a record",
            &["source", "system"],
            &[],
            &[
                "source system",
                "system of record",
                "banner",
                "workday",
                "slate",
                "servicenow",
                "integration",
                "feed",
            ],
        ),
        SemanticCategory::new(
            "metadata",
            "record lifecycle and audit metadata",
            &["meta", "created", "updated", "active"],
            &["_meta"],
            &["audit", "created", "last updated", "active", "inactive", "history"],
        ),
    ]
});

/// Built-in categories in precedence order
#[must_use]
pub fn builtin_categories() -> &'static [SemanticCategory] {
    &BUILTIN
}

/// Categories applying to a field, in precedence order
pub fn categories_for<'a>(
    field_name: &'a str,
    field_group: Option<&'a str>,
) -> impl Iterator<Item = &'static SemanticCategory> + 'a {
    builtin_categories()
        .iter()
        .filter(move |c| c.applies_to(field_name, field_group))
}
