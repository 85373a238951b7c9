//! Workbook importer - spreadsheet file → `Workbook`

use crate::error::{ImportError, ImportResult};
use crate::types::{CellValue, RowRecord, Sheet, Workbook};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Column name used for header cells that are blank
pub const EMPTY_HEADER: &str = "__EMPTY";

/// Sheet name given to the single sheet of a CSV file
const CSV_SHEET_NAME: &str = "Sheet1";

/// Accepted input formats, detected from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    Csv,
    /// Anything calamine opens: xls, xlsx, xlsm, xlsb, ods
    Excel,
}

impl SpreadsheetFormat {
    pub fn from_path(path: &Path) -> ImportResult<Self> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(SpreadsheetFormat::Csv),
            "xls" | "xlsx" | "xlsm" | "xlsb" | "ods" => Ok(SpreadsheetFormat::Excel),
            _ => Err(ImportError::InvalidFile(format!(
                "unsupported file type '{}' (expected .csv, .xls or .xlsx)",
                path.display()
            ))),
        }
    }
}

/// Reads a spreadsheet file into named sheets of row records
#[derive(Debug, Clone)]
pub struct WorkbookImporter {
    path: PathBuf,
    has_header: bool,
}

impl WorkbookImporter {
    /// Create an importer in header-present mode
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            has_header: true,
        }
    }

    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the file
    pub fn import(&self) -> ImportResult<Workbook> {
        let format = SpreadsheetFormat::from_path(&self.path)?;
        let grids = match format {
            SpreadsheetFormat::Csv => vec![(CSV_SHEET_NAME.to_string(), self.read_csv_grid()?)],
            SpreadsheetFormat::Excel => self.read_excel_grids()?,
        };

        let sheets: Vec<Sheet> = grids
            .into_iter()
            .map(|(name, grid)| sheet_from_grid(name, grid, self.has_header))
            .collect();

        info!(
            path = %self.path.display(),
            sheets = sheets.len(),
            has_header = self.has_header,
            "workbook imported"
        );
        Ok(Workbook::new(sheets))
    }

    /// Parse the file on the blocking thread pool
    pub async fn import_async(self) -> ImportResult<Workbook> {
        tokio::task::spawn_blocking(move || self.import())
            .await
            .map_err(|e| ImportError::Parse(format!("workbook reader task failed: {}", e)))?
    }

    fn read_excel_grids(&self) -> ImportResult<Vec<(String, Vec<Vec<CellValue>>)>> {
        let mut workbook = open_workbook_auto(&self.path)
            .map_err(|e| ImportError::Parse(format!("Failed to open spreadsheet: {}", e)))?;

        let mut grids = Vec::new();
        for sheet_name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
                ImportError::Parse(format!("Failed to read sheet '{}': {}", sheet_name, e))
            })?;
            let grid: Vec<Vec<CellValue>> = range
                .rows()
                .map(|row| row.iter().map(convert_cell).collect())
                .collect();
            debug!(sheet = %sheet_name, rows = grid.len(), "sheet read");
            grids.push((sheet_name, grid));
        }
        Ok(grids)
    }

    fn read_csv_grid(&self) -> ImportResult<Vec<Vec<CellValue>>> {
        let bytes = std::fs::read(&self.path)?;
        let content = String::from_utf8_lossy(&bytes);
        let content = content.trim_start_matches('\u{feff}');

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut grid = Vec::new();
        for record in reader.records() {
            let record =
                record.map_err(|e| ImportError::Parse(format!("Failed to parse CSV: {}", e)))?;
            grid.push(record.iter().map(infer_cell).collect());
        }
        Ok(grid)
    }
}

/// Convert a calamine cell
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

/// Type a CSV field: integer, float, boolean, otherwise text
fn infer_cell(field: &str) -> CellValue {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Int(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() {
            return CellValue::number(f);
        }
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }
    CellValue::Text(field.to_string())
}

/// Build a sheet from raw cells.
///
/// With a header, the first non-blank row names the columns (blank names
/// become `__EMPTY`, repeats get `_1`, `_2`, ...). Without one, columns are
/// numbered from 1. Blank data rows are skipped; every row carries every
/// column.
pub fn sheet_from_grid(name: impl Into<String>, grid: Vec<Vec<CellValue>>, has_header: bool) -> Sheet {
    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    let mut rows = grid
        .into_iter()
        .filter(|row| row.iter().any(|cell| !cell.is_empty()));

    let columns: Vec<String> = if has_header {
        match rows.next() {
            Some(header) => unique_headers(&header, width),
            None => Vec::new(),
        }
    } else {
        (1..=width).map(|n| n.to_string()).collect()
    };

    let records = rows
        .map(|cells| {
            let mut cells = cells.into_iter();
            columns
                .iter()
                .map(|column| (column.clone(), cells.next().unwrap_or_default()))
                .collect::<RowRecord>()
        })
        .collect();

    Sheet::new(name, records)
}

fn unique_headers(cells: &[CellValue], width: usize) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    (0..width)
        .map(|idx| {
            let base = match cells.get(idx) {
                Some(cell) if !cell.is_empty() => cell.to_string(),
                _ => EMPTY_HEADER.to_string(),
            };
            let mut name = base.clone();
            let mut suffix = 0;
            while used.contains(&name) {
                suffix += 1;
                name = format!("{}_{}", base, suffix);
            }
            used.insert(name.clone());
            name
        })
        .collect()
}
