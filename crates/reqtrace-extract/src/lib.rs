//! reqtrace Extract
//!
//! Requirement Extractor: turns semi-structured spreadsheet rows into an
//! ordered, id-unique set of requirement statements.
//!
//! # Overview
//!
//! - [`DocumentRow`]: the row contract handed over by the spreadsheet reader
//! - [`Sheet`]: header-driven column detection for raw sheets and CSV exports
//! - [`RequirementExtractor`]: sheet selection, wrapped-row continuation,
//!   whitespace cleanup and duplicate-id resolution
//!
//! # Example
//!
//! ```rust
//! use reqtrace_extract::{DocumentRow, RequirementExtractor};
//!
//! let rows = vec![
//!     DocumentRow::new("Functional Requirements", "FR-1", "System shall capture"),
//!     DocumentRow::new("Functional Requirements", "", "the person's first name"),
//! ];
//!
//! let requirements = RequirementExtractor::new().extract(&rows).unwrap();
//! let first = requirements.iter().next().unwrap();
//! assert_eq!(first.formatted(), "FR-1: System shall capture the person's first name");
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod error;
mod extractor;
mod row;
mod sheet;

pub use error::ExtractionError;
pub use extractor::{collapse_whitespace, RequirementExtractor, DEFAULT_SHEET_HINTS};
pub use row::DocumentRow;
pub use sheet::{Sheet, SheetColumns};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
