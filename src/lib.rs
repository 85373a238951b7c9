//! Sheetmap - spreadsheet import with column-to-attribute mapping
//!
//! This library reads a CSV/XLS/XLSX file, lets the caller associate its
//! columns with a set of target attributes (including image attributes filled
//! from per-row files), and produces one normalized record per row.
//!
//! # Pipeline
//!
//! - Attribute registry: ordered target attributes, de-duplicated by value key
//! - Sheet store: parsed sheets, selected sheet, header mode
//! - Mapping table: source column → attribute, pre-selected from header names
//! - Normalizer: rename mapped columns, drop the rest, null-fill the gaps
//! - Image stage: attach per-row files to image attributes
//!
//! # Example
//!
//! ```no_run
//! use sheetmap::config::{AttributeSpec, ImporterConfig};
//! use sheetmap::session::{ImportSession, ProcessOutcome};
//! use std::path::Path;
//!
//! let config = ImporterConfig::with_attributes(vec![
//!     AttributeSpec::new("name", "Name"),
//!     AttributeSpec::new("age", "Age"),
//! ]);
//! let mut session = ImportSession::new(config)?;
//! session.load_path(Path::new("people.xlsx"))?;
//! session.set_mapping("NAME", Some("name"))?;
//!
//! if let ProcessOutcome::Emitted(records) = session.process()? {
//!     println!("Records: {}", records.len());
//! }
//! # Ok::<(), sheetmap::error::ImportError>(())
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use error::{ImportError, ImportResult};
pub use session::{ImportSession, ProcessOutcome, SessionState};
pub use types::{Attribute, CellValue, FileHandle, MappingPair, OutputRecord, OutputValue, Sheet, Workbook};
