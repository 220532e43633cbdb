//! Source-row ingestion for the migration.
//!
//! The legacy system exports its spreadsheets as CSV; this crate turns a file
//! into an ordered [`RowSet`] of named fields and fixes nothing else about
//! the data. Column names for the two export shapes live in [`schema`].

pub mod schema;
mod table;

pub use table::{IngestError, Row, RowSet};
