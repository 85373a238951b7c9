//! Normalizer: rename mapped columns, drop the rest, null-fill missing attributes

use crate::error::{ImportError, ImportResult};
use crate::types::{Attribute, MappingPair, OutputRecord, OutputValue, Sheet};
use std::collections::HashSet;
use tracing::debug;

/// Turn every row of `sheet` into one output record.
///
/// Each mapped column with a value is renamed to its target key; a later pair
/// targeting the same key overwrites an earlier one. Columns that are not a
/// mapping target are dropped, then every non-image attribute still missing
/// is set to null. Image attributes are left to the attachment stage.
pub fn normalize(
    sheet: &Sheet,
    mapping: &[MappingPair],
    attributes: &[Attribute],
) -> ImportResult<Vec<OutputRecord>> {
    if mapping.is_empty() {
        return Err(ImportError::NoAttributeAssociated);
    }
    Ok(normalize_unchecked(sheet, mapping, attributes))
}

/// `normalize` without the empty-mapping check.
///
/// Used by the image flow, where a registry may hold only image attributes
/// and the all-null check after attachment decides whether anything was
/// produced.
pub fn normalize_unchecked(
    sheet: &Sheet,
    mapping: &[MappingPair],
    attributes: &[Attribute],
) -> Vec<OutputRecord> {
    let targets: HashSet<&str> = mapping
        .iter()
        .map(|pair| pair.target_attribute.as_str())
        .collect();

    let records: Vec<OutputRecord> = sheet
        .rows
        .iter()
        .map(|row| {
            let mut working = row.clone();

            for pair in mapping {
                if working.has_value(&pair.source_column) {
                    if let Some(value) = working.remove(&pair.source_column) {
                        working.insert(pair.target_attribute.clone(), value);
                    }
                }
            }

            let mut record = OutputRecord::new();
            for (key, value) in working.iter() {
                if targets.contains(key) {
                    record.insert(key, OutputValue::from(value.clone()));
                }
            }

            for attr in attributes.iter().filter(|attr| !attr.is_image) {
                if record.get(&attr.value_key).map_or(true, OutputValue::is_null) {
                    record.insert(attr.value_key.clone(), OutputValue::Null);
                }
            }

            record.sort_by_rank(|key| field_rank(key, attributes, mapping));
            record
        })
        .collect();

    debug!(
        sheet = %sheet.name,
        rows = records.len(),
        pairs = mapping.len(),
        "normalized sheet"
    );
    records
}

/// Registered keys first in registry order, then other targets in mapping order
fn field_rank(key: &str, attributes: &[Attribute], mapping: &[MappingPair]) -> usize {
    attributes
        .iter()
        .position(|attr| attr.value_key == key)
        .or_else(|| {
            mapping
                .iter()
                .position(|pair| pair.target_attribute == key)
                .map(|idx| attributes.len() + idx)
        })
        .unwrap_or(usize::MAX)
}
