//! Spreadsheet import/export
//!
//! - Import: CSV/XLS/XLSX/XLSM/XLSB/ODS → `Workbook` of row records
//! - Export: normalized records → Excel (.xlsx)

mod exporter;
mod importer;

pub use exporter::RecordExporter;
pub use importer::{sheet_from_grid, SpreadsheetFormat, WorkbookImporter, EMPTY_HEADER};
