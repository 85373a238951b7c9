//! Image attachment stage
//!
//! Image attributes never come from cells. After normalization, each record
//! gets the file chosen for its row, or null.

use crate::core::normalizer::normalize_unchecked;
use crate::error::{ImportError, ImportResult};
use crate::types::{Attribute, FileHandle, MappingPair, OutputRecord, OutputValue, Sheet};
use std::collections::HashMap;
use tracing::debug;

/// Supplies the file picked for a given row and image attribute
pub trait ImageSource {
    fn file_for(&self, row: usize, attribute: &str) -> Option<FileHandle>;
}

/// Per-row image picks, keyed by 0-based row index and attribute value key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageAttachments {
    files: HashMap<(usize, String), FileHandle>,
}

impl ImageAttachments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a pick, returning the one it replaces
    pub fn attach(
        &mut self,
        row: usize,
        attribute: impl Into<String>,
        file: FileHandle,
    ) -> Option<FileHandle> {
        self.files.insert((row, attribute.into()), file)
    }

    pub fn detach(&mut self, row: usize, attribute: &str) -> Option<FileHandle> {
        self.files.remove(&(row, attribute.to_string()))
    }

    pub fn get(&self, row: usize, attribute: &str) -> Option<&FileHandle> {
        self.files.get(&(row, attribute.to_string()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }
}

impl ImageSource for ImageAttachments {
    fn file_for(&self, row: usize, attribute: &str) -> Option<FileHandle> {
        self.get(row, attribute).cloned()
    }
}

impl<F> ImageSource for F
where
    F: Fn(usize, &str) -> Option<FileHandle>,
{
    fn file_for(&self, row: usize, attribute: &str) -> Option<FileHandle> {
        self(row, attribute)
    }
}

/// Set every image attribute of every record from `source`.
///
/// Fails with `NoDataProcessed` when, afterwards, no record holds a single
/// non-null value.
pub fn attach_images(
    mut records: Vec<OutputRecord>,
    attributes: &[Attribute],
    source: &dyn ImageSource,
) -> ImportResult<Vec<OutputRecord>> {
    let mut attached = 0usize;
    for (row, record) in records.iter_mut().enumerate() {
        for attr in attributes.iter().filter(|attr| attr.is_image) {
            let value = match source.file_for(row, &attr.value_key) {
                Some(file) => {
                    attached += 1;
                    OutputValue::File(file)
                }
                None => OutputValue::Null,
            };
            record.insert(attr.value_key.clone(), value);
        }
        record.sort_by_rank(|key| {
            attributes
                .iter()
                .position(|attr| attr.value_key == key)
                .unwrap_or(attributes.len())
        });
    }

    if records.iter().all(OutputRecord::is_all_null) {
        return Err(ImportError::NoDataProcessed);
    }

    debug!(records = records.len(), attached, "image attributes attached");
    Ok(records)
}

/// Normalize `sheet` and attach images in one pass
pub fn normalize_with_images(
    sheet: &Sheet,
    mapping: &[MappingPair],
    attributes: &[Attribute],
    source: &dyn ImageSource,
) -> ImportResult<Vec<OutputRecord>> {
    let records = normalize_unchecked(sheet, mapping, attributes);
    attach_images(records, attributes, source)
}
