//! Record exporter - normalized records → Excel (.xlsx)

use crate::error::{ImportError, ImportResult};
use crate::types::{CellValue, OutputRecord, OutputValue};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;

const SHEET_NAME: &str = "Records";

/// Writes records to a single worksheet, one column per field
pub struct RecordExporter<'a> {
    records: &'a [OutputRecord],
    columns: Vec<String>,
}

impl<'a> RecordExporter<'a> {
    pub fn new(records: &'a [OutputRecord]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.to_string());
                }
            }
        }
        Self { records, columns }
    }

    /// Header columns in output order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn export(&self, output_path: &Path) -> ImportResult<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(SHEET_NAME)
            .map_err(|e| ImportError::Export(format!("Failed to set worksheet name: {}", e)))?;

        let bold = Format::new().set_bold();
        for (col, name) in self.columns.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, name, &bold)
                .map_err(|e| ImportError::Export(format!("Failed to write header: {}", e)))?;
        }

        for (idx, record) in self.records.iter().enumerate() {
            let row = (idx + 1) as u32;
            for (col, name) in self.columns.iter().enumerate() {
                if let Some(value) = record.get(name) {
                    write_value(worksheet, row, col as u16, value)?;
                }
            }
        }

        workbook
            .save(output_path)
            .map_err(|e| ImportError::Export(format!("Failed to save Excel file: {}", e)))?;
        Ok(())
    }
}

fn write_value(worksheet: &mut Worksheet, row: u32, col: u16, value: &OutputValue) -> ImportResult<()> {
    let result = match value {
        OutputValue::Null | OutputValue::Cell(CellValue::Empty) => return Ok(()),
        OutputValue::Cell(CellValue::Text(s)) => worksheet.write_string(row, col, s),
        OutputValue::Cell(CellValue::Int(i)) => worksheet.write_number(row, col, *i as f64),
        OutputValue::Cell(CellValue::Float(f)) => worksheet.write_number(row, col, *f),
        OutputValue::Cell(CellValue::Bool(b)) => worksheet.write_boolean(row, col, *b),
        OutputValue::File(file) => worksheet.write_string(row, col, &file.name),
    };
    result
        .map(|_| ())
        .map_err(|e| ImportError::Export(format!("Failed to write cell ({}, {}): {}", row, col, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, age: Option<i64>) -> OutputRecord {
        let mut r = OutputRecord::new();
        r.insert("name", OutputValue::Cell(CellValue::from(name)));
        r.insert(
            "age",
            age.map_or(OutputValue::Null, |a| OutputValue::Cell(CellValue::Int(a))),
        );
        r
    }

    #[test]
    fn test_columns_union_in_first_seen_order() {
        let mut extra = record("Bob", None);
        extra.insert("phone", OutputValue::Null);
        let records = vec![record("Ann", Some(30)), extra];
        let exporter = RecordExporter::new(&records);
        assert_eq!(exporter.columns(), &["name", "age", "phone"]);
    }

    #[test]
    fn test_no_records_no_columns() {
        let exporter = RecordExporter::new(&[]);
        assert!(exporter.columns().is_empty());
    }
}
