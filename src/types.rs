use crate::error::{ImportError, ImportResult};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

//==============================================================================
// Attributes
//==============================================================================

/// A caller-defined output field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Unique output field name
    pub value_key: String,
    /// Display title, also matched against header names for pre-selection
    pub title: String,
    /// Image attributes are filled from attached files, never from cells
    pub is_image: bool,
}

impl Attribute {
    pub fn new(value_key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            value_key: value_key.into(),
            title: title.into(),
            is_image: false,
        }
    }

    pub fn image(value_key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            is_image: true,
            ..Self::new(value_key, title)
        }
    }
}

//==============================================================================
// Cells, rows, sheets
//==============================================================================

/// A scalar spreadsheet cell
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// Largest magnitude at which every integer is exactly representable in an f64
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

impl CellValue {
    /// Build a numeric cell, storing whole numbers as `Int`
    pub fn number(n: f64) -> Self {
        if n.is_finite() && n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER {
            CellValue::Int(n as i64)
        } else {
            CellValue::Float(n)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(true) => write!(f, "TRUE"),
            CellValue::Bool(false) => write!(f, "FALSE"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(x) => write!(f, "{x}"),
            CellValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(x: f64) -> Self {
        CellValue::Float(x)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// One spreadsheet row keyed by column identifier, in column order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowRecord {
    cells: Vec<(String, CellValue)>,
}

impl RowRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a cell; replacing keeps the original position
    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        let column = column.into();
        match self.cells.iter_mut().find(|(key, _)| *key == column) {
            Some(slot) => slot.1 = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(key, _)| key == column)
            .map(|(_, value)| value)
    }

    /// True when the column exists and is not blank
    pub fn has_value(&self, column: &str) -> bool {
        self.get(column).is_some_and(|value| !value.is_empty())
    }

    pub fn remove(&mut self, column: &str) -> Option<CellValue> {
        let position = self.cells.iter().position(|(key, _)| key == column)?;
        Some(self.cells.remove(position).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when every cell is blank
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, value)| value.is_empty())
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for RowRecord {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        let mut row = RowRecord::new();
        for (key, value) in iter {
            row.insert(key, value);
        }
        row
    }
}

impl Serialize for RowRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (key, value) in &self.cells {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// One tab of a parsed workbook
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<RowRecord>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<RowRecord>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Column identifiers, taken from the first row
    pub fn columns(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|row| row.keys().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

/// Output of the spreadsheet decoder: named sheets in workbook order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }
}

//==============================================================================
// Column mapping
//==============================================================================

/// One source column associated with one attribute value key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingPair {
    pub source_column: String,
    pub target_attribute: String,
}

impl MappingPair {
    pub fn new(source_column: impl Into<String>, target_attribute: impl Into<String>) -> Self {
        Self {
            source_column: source_column.into(),
            target_attribute: target_attribute.into(),
        }
    }
}

/// Ordered column associations; columns absent from it are dropped from output
pub type ColumnMapping = Vec<MappingPair>;

//==============================================================================
// Output records
//==============================================================================

/// A file chosen for an image attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileHandle {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            size,
        }
    }

    /// Build a handle from an existing regular file
    pub fn from_path<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(ImportError::InvalidFile(format!(
                "{} is not a regular file",
                path.display()
            )));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, path, metadata.len()))
    }
}

/// Value of one output field
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OutputValue {
    #[default]
    Null,
    Cell(CellValue),
    File(FileHandle),
}

impl OutputValue {
    pub fn is_null(&self) -> bool {
        matches!(self, OutputValue::Null | OutputValue::Cell(CellValue::Empty))
    }

    pub fn as_cell(&self) -> Option<&CellValue> {
        match self {
            OutputValue::Cell(cell) => Some(cell),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileHandle> {
        match self {
            OutputValue::File(file) => Some(file),
            _ => None,
        }
    }
}

impl From<CellValue> for OutputValue {
    fn from(cell: CellValue) -> Self {
        if cell.is_empty() {
            OutputValue::Null
        } else {
            OutputValue::Cell(cell)
        }
    }
}

impl fmt::Display for OutputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputValue::Null => write!(f, "-"),
            OutputValue::Cell(cell) => write!(f, "{cell}"),
            OutputValue::File(file) => write!(f, "{}", file.name),
        }
    }
}

impl Serialize for OutputValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OutputValue::Null => serializer.serialize_none(),
            OutputValue::Cell(cell) => cell.serialize(serializer),
            OutputValue::File(file) => file.serialize(serializer),
        }
    }
}

/// One normalized record keyed by attribute value key
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputRecord {
    fields: Vec<(String, OutputValue)>,
}

impl OutputRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a field; overwriting keeps the original position
    pub fn insert(&mut self, key: impl Into<String>, value: OutputValue) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&OutputValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OutputValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn is_all_null(&self) -> bool {
        self.fields.iter().all(|(_, v)| v.is_null())
    }

    /// Reorder fields by `rank`; equal ranks keep their relative order
    pub(crate) fn sort_by_rank<F: Fn(&str) -> usize>(&mut self, rank: F) {
        self.fields.sort_by_key(|(k, _)| rank(k));
    }
}

impl Serialize for OutputRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
