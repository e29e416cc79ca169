//! reqtrace Catalog
//!
//! Static reference of out-of-the-box (OOTB) entity/field definitions,
//! grouped into field groups. Pure lookup; nothing mutates a store after it
//! is built.
//!
//! # Overview
//!
//! - [`CatalogField`]: one OOTB field definition
//! - [`CatalogStore`]: index by entity and normalized field name
//! - [`parse_catalog`]: parser for the line-structured catalog file format
//!
//! # Example
//!
//! ```rust
//! use reqtrace_catalog::CatalogStore;
//!
//! let catalog = CatalogStore::parse("Entity: Person\n- First Name (firstName) [TextField]\n").unwrap();
//!
//! assert_eq!(catalog.lookup("Person", "first_name").len(), 1);
//! assert!(catalog.lookup("Person", "CWID").is_empty());
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod error;
mod field;
mod parser;
mod store;

pub use error::CatalogError;
pub use field::CatalogField;
pub use parser::parse_catalog;
pub use store::CatalogStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
