//! Document rows handed over by the spreadsheet reader

use serde::{Deserialize, Serialize};

/// One row of a requirements document
///
/// The spreadsheet reader produces these in document order. The extractor
/// never looks at other columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRow {
    /// Identifier column (`FR-10`, `DQR 3`, or blank for wrapped rows)
    pub identifier_cell: String,
    /// Description column
    pub description_cell: String,
    /// Optional comments column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_cell: Option<String>,
    /// Sheet the row came from
    pub sheet_name: String,
}

impl DocumentRow {
    /// Create row without comment
    #[must_use]
    pub fn new(
        sheet_name: impl Into<String>,
        identifier_cell: impl Into<String>,
        description_cell: impl Into<String>,
    ) -> Self {
        Self {
            identifier_cell: identifier_cell.into(),
            description_cell: description_cell.into(),
            comment_cell: None,
            sheet_name: sheet_name.into(),
        }
    }

    /// With comment cell
    #[inline]
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment_cell = Some(comment.into());
        self
    }

    /// Whether the identifier cell is blank
    #[inline]
    #[must_use]
    pub fn is_continuation(&self) -> bool {
        self.identifier_cell.trim().is_empty()
    }

    /// Description followed by the non-blank comment
    #[must_use]
    pub fn content(&self) -> String {
        match self.comment_cell.as_deref().map(str::trim) {
            Some(comment) if !comment.is_empty() => format!("{} {comment}", self.description_cell),
            _ => self.description_cell.clone(),
        }
    }
}
