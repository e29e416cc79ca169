//! Header-driven sheet to row conversion
//!
//! Requirement spreadsheets vary in column naming (`FR #`, `Req ID`,
//! `Requirement Number`). [`Sheet`] locates the identifier, description and
//! comment columns from the header row and turns data rows into
//! [`DocumentRow`]s.

use crate::error::ExtractionError;
use crate::row::DocumentRow;
use std::io::Read;

/// Column positions detected from a header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetColumns {
    /// Identifier column
    pub identifier: usize,
    /// Description column
    pub description: usize,
    /// Comments column, if present
    pub comment: Option<usize>,
}

impl SheetColumns {
    /// Detect columns from header cells
    ///
    /// # Errors
    /// Returns [`ExtractionError::MissingColumn`] naming the sheet and the
    /// column that could not be found
    pub fn detect(sheet: &str, header: &[String]) -> Result<Self, ExtractionError> {
        let normalized: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();

        let identifier = normalized
            .iter()
            .position(|h| is_identifier_header(h))
            .ok_or_else(|| missing(sheet, "identifier"))?;

        let description = normalized
            .iter()
            .enumerate()
            .position(|(i, h)| i != identifier && (h.contains("description") || h.contains("requirement")))
            .ok_or_else(|| missing(sheet, "description"))?;

        let comment = normalized
            .iter()
            .enumerate()
            .position(|(i, h)| i != identifier && i != description && h.contains("comment"));

        Ok(Self {
            identifier,
            description,
            comment,
        })
    }
}

fn is_identifier_header(header: &str) -> bool {
    header.contains('#')
        || header.contains("number")
        || header
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == "id")
}

fn missing(sheet: &str, column: &str) -> ExtractionError {
    ExtractionError::MissingColumn {
        sheet: sheet.to_string(),
        column: column.to_string(),
    }
}

/// A named sheet: header row plus data rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    name: String,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Create sheet from cells
    #[must_use]
    pub fn new(name: impl Into<String>, header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            header,
            rows,
        }
    }

    /// Read a CSV export of one sheet; the first record is the header
    ///
    /// Quoted cells may span lines, matching spreadsheet exports of wrapped
    /// cells. Short records are allowed.
    ///
    /// # Errors
    /// Returns error if the CSV is malformed
    pub fn from_csv<R: Read>(name: impl Into<String>, reader: R) -> Result<Self, ExtractionError> {
        let name = name.into();
        let csv_error = |source| ExtractionError::Csv {
            sheet: name.clone(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self::new(name, header, rows))
    }

    /// Sheet name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Header cells
    #[inline]
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Number of data rows
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the sheet has no data rows
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Detect columns and convert data rows
    ///
    /// Cells missing from short rows read as blank.
    ///
    /// # Errors
    /// Returns error if the identifier or description column is missing
    pub fn to_rows(&self) -> Result<Vec<DocumentRow>, ExtractionError> {
        let columns = SheetColumns::detect(&self.name, &self.header)?;
        let cell = |row: &[String], index: usize| row.get(index).cloned().unwrap_or_default();

        Ok(self
            .rows
            .iter()
            .map(|row| {
                let mut doc = DocumentRow::new(
                    self.name.clone(),
                    cell(row, columns.identifier),
                    cell(row, columns.description),
                );
                if let Some(comment) = columns.comment {
                    doc = doc.with_comment(cell(row, comment));
                }
                doc
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn header(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| (*c).to_string()).collect()
    }

    #[test]
    fn detect_fr_hash_layout() {
        let columns = SheetColumns::detect("FR", &header(&["FR #", "Requirement Description", "Priority", "Comments"])).unwrap();
        assert_eq!(
            columns,
            SheetColumns {
                identifier: 0,
                description: 1,
                comment: Some(3)
            }
        );
    }

    #[test]
    fn detect_requirement_number_layout() {
        let columns = SheetColumns::detect("FR", &header(&["Area", "Requirement Number", "Requirement"])).unwrap();
        assert_eq!(columns.identifier, 1);
        assert_eq!(columns.description, 2);
        assert_eq!(columns.comment, None);
    }

    #[test]
    fn detect_id_word_only() {
        assert!(SheetColumns::detect("S", &header(&["Req ID", "Description"])).is_ok());
        let err = SheetColumns::detect("S", &header(&["Valid", "Description"])).unwrap_err();
        assert!(matches!(err, ExtractionError::MissingColumn { ref column, .. } if column == "identifier"));
    }

    #[test]
    fn missing_description_column() {
        let err = SheetColumns::detect("Scope", &header(&["FR #", "Owner"])).unwrap_err();
        assert_eq!(err.to_string(), "sheet 'Scope' has no description column");
    }

    #[test]
    fn csv_with_wrapped_cell() {
        let csv = "FR #,Description,Comments\nFR-1,\"Capture the\nfirst name\",\nFR-2,Capture CWID,Replaces PIDM\n";
        let sheet = Sheet::from_csv("Functional Requirements", csv.as_bytes()).unwrap();
        assert_eq!(sheet.len(), 2);

        let rows = sheet.to_rows().unwrap();
        assert_eq!(rows[0].description_cell, "Capture the\nfirst name");
        assert_eq!(rows[1].content(), "Capture CWID Replaces PIDM");
        assert_eq!(rows[1].sheet_name, "Functional Requirements");
    }

    #[test]
    fn short_rows_read_blank() {
        let sheet = Sheet::new(
            "FR",
            header(&["FR #", "Description"]),
            vec![vec!["".into()], vec!["FR-3".into(), "text".into()]],
        );
        let rows = sheet.to_rows().unwrap();
        assert!(rows[0].is_continuation());
        assert_eq!(rows[0].description_cell, "");
    }
}
