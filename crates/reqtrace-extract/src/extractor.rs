//! Requirement extraction
//!
//! Turns document rows into a document-ordered [`RequirementSet`]:
//!
//! 1. Keep rows from sheets whose name contains a requirement hint; if no
//!    sheet matches, keep every row.
//! 2. A row whose identifier cell parses as a [`RequirementId`] starts a
//!    requirement. A blank identifier continues the previous requirement
//!    (wrapped cells). Anything else ends continuation and is skipped.
//! 3. Whitespace runs collapse to single spaces.
//! 4. A repeated id keeps its first position and the longer text.

use crate::error::ExtractionError;
use crate::row::DocumentRow;
use reqtrace_model::{Requirement, RequirementId, RequirementSet};

/// Default sheet-name hints
pub const DEFAULT_SHEET_HINTS: [&str; 2] = ["functional", "requirement"];

/// Extracts requirement statements from document rows
#[derive(Debug, Clone)]
pub struct RequirementExtractor {
    sheet_hints: Vec<String>,
}

impl Default for RequirementExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Requirement under construction
struct Pending {
    id: RequirementId,
    sheet: String,
    parts: Vec<String>,
}

impl RequirementExtractor {
    /// Create extractor with the default sheet hints
    #[must_use]
    pub fn new() -> Self {
        Self {
            sheet_hints: DEFAULT_SHEET_HINTS.iter().map(|h| (*h).to_string()).collect(),
        }
    }

    /// With sheet-name hints (case-insensitive substrings)
    #[must_use]
    pub fn with_sheet_hints<I, S>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sheet_hints = hints.into_iter().map(|h| h.into().to_lowercase()).collect();
        self
    }

    /// Sheet-name hints
    #[inline]
    #[must_use]
    pub fn sheet_hints(&self) -> &[String] {
        &self.sheet_hints
    }

    /// Whether a sheet name looks like a requirements section
    #[must_use]
    pub fn is_requirement_sheet(&self, sheet_name: &str) -> bool {
        let name = sheet_name.to_lowercase();
        self.sheet_hints.iter().any(|hint| name.contains(hint.as_str()))
    }

    /// Extract requirements in document order
    ///
    /// # Errors
    /// - [`ExtractionError::NoRequirementsSection`] if `rows` is empty
    /// - [`ExtractionError::NoRequirements`] if no row carries a valid id
    pub fn extract(&self, rows: &[DocumentRow]) -> Result<RequirementSet, ExtractionError> {
        if rows.is_empty() {
            return Err(ExtractionError::NoRequirementsSection);
        }

        let mut selected: Vec<&DocumentRow> = rows
            .iter()
            .filter(|r| self.is_requirement_sheet(&r.sheet_name))
            .collect();
        if selected.is_empty() {
            tracing::debug!(rows = rows.len(), "no sheet matched requirement hints, scanning all rows");
            selected = rows.iter().collect();
        }

        let mut requirements = RequirementSet::new();
        let mut pending: Option<Pending> = None;
        let mut skipped = 0usize;

        for row in &selected {
            if row.is_continuation() {
                match pending.as_mut() {
                    Some(p) if p.sheet == row.sheet_name => p.parts.push(row.content()),
                    _ => skipped += 1,
                }
                continue;
            }

            if let Some(done) = pending.take() {
                merge(&mut requirements, done);
            }

            match RequirementId::parse(&row.identifier_cell) {
                Ok(id) if !id.is_standard() => {
                    pending = Some(Pending {
                        id,
                        sheet: row.sheet_name.clone(),
                        parts: vec![row.content()],
                    });
                }
                _ => {
                    tracing::trace!(cell = %row.identifier_cell.trim(), "skipping row without requirement id");
                    skipped += 1;
                }
            }
        }
        if let Some(done) = pending.take() {
            merge(&mut requirements, done);
        }

        if requirements.is_empty() {
            return Err(ExtractionError::NoRequirements {
                rows_scanned: selected.len(),
            });
        }

        tracing::info!(
            rows = selected.len(),
            skipped,
            requirements = requirements.len(),
            "extracted requirements"
        );

        Ok(requirements)
    }
}

fn merge(requirements: &mut RequirementSet, pending: Pending) {
    let text = collapse_whitespace(&pending.parts.join(" "));
    if text.is_empty() {
        tracing::debug!(requirement = %pending.id, "dropping requirement with empty text");
        return;
    }

    if let Some(existing) = requirements.get(&pending.id) {
        if existing.text().len() >= text.len() {
            return;
        }
        tracing::debug!(requirement = %pending.id, "repeated id, keeping longer text");
    }

    requirements.insert(Requirement::new(pending.id, text, pending.sheet));
}

/// Collapse every whitespace run (including newlines) to one space
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SHEET: &str = "Functional Requirements";

    fn row(id: &str, text: &str) -> DocumentRow {
        DocumentRow::new(SHEET, id, text)
    }

    fn texts(set: &RequirementSet) -> Vec<(String, String)> {
        set.iter()
            .map(|r| (r.id().to_string(), r.text().to_string()))
            .collect()
    }

    #[test]
    fn extracts_in_document_order() {
        let rows = vec![
            row("FR #", "Description"),
            row("FR-2", "Second"),
            row("FR 10", "Tenth"),
            row("DQR-3", "Quality rule"),
        ];
        let set = RequirementExtractor::new().extract(&rows).unwrap();
        assert_eq!(
            texts(&set),
            vec![
                ("FR-2".into(), "Second".into()),
                ("FR-10".into(), "Tenth".into()),
                ("DQR-3".into(), "Quality rule".into()),
            ]
        );
        assert_eq!(set.iter().next().unwrap().source_section(), SHEET);
    }

    #[test]
    fn wrapped_rows_concatenate() {
        let rows = vec![
            row("FR-1", "System shall capture\n the person's"),
            row("", "first   name"),
            row("n/a", "ignored"),
            row("", "also ignored"),
        ];
        let set = RequirementExtractor::new().extract(&rows).unwrap();
        assert_eq!(texts(&set), vec![("FR-1".into(), "System shall capture the person's first name".into())]);
    }

    #[test]
    fn comments_appended() {
        let rows = vec![row("FR-24", "Use CWID").with_comment("replacing PIDM in the UI")];
        let set = RequirementExtractor::new().extract(&rows).unwrap();
        assert_eq!(set.iter().next().unwrap().text(), "Use CWID replacing PIDM in the UI");
    }

    #[test]
    fn repeated_id_keeps_first_position_and_longest_text() {
        let rows = vec![
            row("FR-1", "short"),
            row("FR-2", "other"),
            row("FR-1", "a longer statement"),
            row("FR-2", "tiny"),
        ];
        let set = RequirementExtractor::new().extract(&rows).unwrap();
        assert_eq!(
            texts(&set),
            vec![
                ("FR-1".into(), "a longer statement".into()),
                ("FR-2".into(), "other".into()),
            ]
        );
    }

    #[test]
    fn hinted_sheets_preferred() {
        let rows = vec![
            DocumentRow::new("Cover", "FR-99", "not a requirement sheet"),
            row("FR-1", "real"),
        ];
        let set = RequirementExtractor::new().extract(&rows).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.contains(&"FR-1".parse().unwrap()));
    }

    #[test]
    fn falls_back_to_all_sheets() {
        let rows = vec![DocumentRow::new("Sheet1", "FR-7", "text")];
        let set = RequirementExtractor::new().extract(&rows).unwrap();
        assert_eq!(set.len(), 1);

        let custom = RequirementExtractor::new().with_sheet_hints(["Scope"]);
        assert!(custom.is_requirement_sheet("PROJECT SCOPE"));
    }

    #[test]
    fn standard_never_extracted() {
        let rows = vec![row("STANDARD", "meta"), row("FR-1", "real")];
        let set = RequirementExtractor::new().extract(&rows).unwrap();
        assert!(!set.contains(&RequirementId::standard()));
    }

    #[test]
    fn no_rows_is_missing_section() {
        let err = RequirementExtractor::new().extract(&[]).unwrap_err();
        assert!(matches!(err, ExtractionError::NoRequirementsSection));
    }

    #[test]
    fn no_matching_ids() {
        let rows = vec![row("Overview", "text"), row("", "more")];
        let err = RequirementExtractor::new().extract(&rows).unwrap_err();
        assert!(matches!(err, ExtractionError::NoRequirements { rows_scanned: 2 }));
    }
}
