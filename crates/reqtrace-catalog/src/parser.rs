//! Line-structured catalog file parser
//!
//! Format:
//!
//! ```text
//! # comment
//! Entity: Person
//! - First Name (firstName) [TextField] aka: given name, forename
//! - Gender (gender) [LookupField -> Gender]
//! Field Group: PostalAddress
//! - City (city) [TextField]
//! postalCode [Text]
//! Field Group: none
//! ```
//!
//! A `Field Group:` header applies until the next `Field Group:` or
//! `Entity:` header. Entries without a type default to `TextField`.

use crate::error::CatalogError;
use crate::field::CatalogField;
use once_cell::sync::Lazy;
use regex::Regex;
use reqtrace_model::DataType;

static ENTITY_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^entity\s*:\s*(?P<name>\S.*)$").expect("static regex"));

static GROUP_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^field\s*group\s*:\s*(?P<name>\S.*)$").expect("static regex"));

static LABELLED_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^-\s*(?P<label>[^()\[\]]+?)\s*\(\s*(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*\)\s*(?:\[(?P<ty>[^\]]*)\])?\s*(?:aka\s*:\s*(?P<aka>.*))?$",
    )
    .expect("static regex")
});

static BARE_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*\[(?P<ty>[^\]]*)\]\s*(?:aka\s*:\s*(?P<aka>.*))?$")
        .expect("static regex")
});

/// Parse catalog text into field records, in file order
///
/// # Errors
/// Returns the first malformed line
pub fn parse_catalog(text: &str) -> Result<Vec<CatalogField>, CatalogError> {
    let mut parser = CatalogParser::default();
    for (index, raw) in text.lines().enumerate() {
        parser.line(index + 1, raw)?;
    }
    Ok(parser.fields)
}

#[derive(Default)]
struct CatalogParser {
    entity: Option<String>,
    group: Option<String>,
    fields: Vec<CatalogField>,
}

impl CatalogParser {
    fn line(&mut self, line: usize, raw: &str) -> Result<(), CatalogError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(());
        }

        if let Some(caps) = ENTITY_HEADER.captures(trimmed) {
            self.entity = Some(caps["name"].trim().to_string());
            self.group = None;
            return Ok(());
        }

        if let Some(caps) = GROUP_HEADER.captures(trimmed) {
            let name = caps["name"].trim();
            self.group = if name.eq_ignore_ascii_case("none") || name == "-" {
                None
            } else {
                Some(name.to_string())
            };
            return Ok(());
        }

        let caps = LABELLED_ENTRY
            .captures(trimmed)
            .or_else(|| BARE_ENTRY.captures(trimmed))
            .ok_or_else(|| CatalogError::syntax(line, format!("unrecognised line '{trimmed}'")))?;

        let entity = self
            .entity
            .clone()
            .ok_or(CatalogError::EntryOutsideEntity { line })?;

        let name = &caps["name"];
        let (data_type, lookup_entity) = match caps.name("ty") {
            Some(ty) => parse_type(line, ty.as_str())?,
            None => (DataType::TextField, None),
        };

        let mut field = CatalogField::new(entity, name, data_type);
        if let Some(label) = caps.name("label") {
            field = field.with_label(label.as_str().trim());
        }
        if let Some(group) = &self.group {
            field = field.in_group(group.clone());
        }
        if let Some(target) = lookup_entity {
            field = field.with_lookup_entity(target);
        }
        if let Some(aka) = caps.name("aka") {
            field = field.with_synonyms(
                aka.as_str()
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty()),
            );
        }

        self.fields.push(field);
        Ok(())
    }
}

/// `Type` or `Type -> Target`
fn parse_type(line: usize, raw: &str) -> Result<(DataType, Option<String>), CatalogError> {
    let (ty, target) = match raw.split_once("->") {
        Some((ty, target)) => (ty.trim(), Some(target.trim())),
        None => (raw.trim(), None),
    };

    let data_type: DataType = ty.parse().map_err(|_| CatalogError::UnknownDataType {
        line,
        value: ty.to_string(),
    })?;

    match target {
        Some("") => Err(CatalogError::syntax(line, "empty lookup target")),
        Some(target) if data_type != DataType::LookupField => Err(CatalogError::syntax(
            line,
            format!("lookup target '{target}' on non-lookup type {data_type}"),
        )),
        Some(target) => Ok((data_type, Some(target.to_string()))),
        None => Ok((data_type, None)),
    }
}
