//! Extraction errors

/// Errors raised by the requirement extractor
///
/// All variants are fatal for a generation run: the input is a fixed
/// document, so retrying without fixing it cannot succeed.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// No rows were supplied at all
    #[error("no requirements section found: document has no rows")]
    NoRequirementsSection,

    /// Rows were scanned but none carried a recognizable requirement id
    #[error("no requirement ids found in {rows_scanned} scanned rows")]
    NoRequirements { rows_scanned: usize },

    /// Sheet header lacks a required column
    #[error("sheet '{sheet}' has no {column} column")]
    MissingColumn { sheet: String, column: String },

    /// Delimited sheet could not be read
    #[error("failed to read sheet '{sheet}': {source}")]
    Csv {
        sheet: String,
        #[source]
        source: csv::Error,
    },
}
