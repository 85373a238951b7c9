//! Column mapping table: one editable association per source column

use crate::core::registry::AttributeRegistry;
use crate::error::{ImportError, ImportResult};
use crate::types::{ColumnMapping, MappingPair, Sheet};
use tracing::debug;

/// Source columns of the current sheet with their selected attribute (`None` = "none")
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    entries: Vec<(String, Option<String>)>,
}

impl MappingTable {
    /// Build the table from the first row's column identifiers.
    ///
    /// With a header, a column whose name equals a mappable attribute's title
    /// is pre-selected; failing that, one equal to its value key. Matching is
    /// case-sensitive.
    pub fn build(sheet: &Sheet, registry: &AttributeRegistry, has_header: bool) -> Self {
        let entries = sheet
            .columns()
            .into_iter()
            .map(|column| {
                let preselected = if has_header {
                    preselect(&column, registry)
                } else {
                    None
                };
                (column, preselected)
            })
            .collect();
        Self { entries }
    }

    /// Associate `column` with `target`, or reset it to "none"
    pub fn set_mapping(
        &mut self,
        column: &str,
        target: Option<&str>,
        registry: &AttributeRegistry,
    ) -> ImportResult<()> {
        if let Some(key) = target {
            match registry.by_value_key(key) {
                Some(attr) if !attr.is_image => {}
                Some(_) => {
                    return Err(ImportError::ElementNotFound(format!(
                        "attribute '{key}' is an image attribute and cannot be mapped to a column"
                    )))
                }
                None => {
                    return Err(ImportError::ElementNotFound(format!("attribute '{key}'")));
                }
            }
        }

        let slot = self
            .entries
            .iter_mut()
            .find(|(name, _)| name == column)
            .ok_or_else(|| ImportError::ElementNotFound(format!("column '{column}'")))?;
        debug!(column, target = ?target, "mapping updated");
        slot.1 = target.map(str::to_string);
        Ok(())
    }

    /// Selected attribute for a column, if any
    pub fn selection(&self, column: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, target)| target.as_deref())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Number of source columns (rows of the table)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_associations(&self) -> bool {
        self.entries.iter().any(|(_, target)| target.is_some())
    }

    /// Mapped columns only, in column order
    pub fn to_pairs(&self) -> ColumnMapping {
        self.entries
            .iter()
            .filter_map(|(column, target)| {
                target
                    .as_ref()
                    .map(|target| MappingPair::new(column.clone(), target.clone()))
            })
            .collect()
    }
}

fn preselect(column: &str, registry: &AttributeRegistry) -> Option<String> {
    registry
        .mappable()
        .find(|attr| attr.title == column)
        .or_else(|| registry.mappable().find(|attr| attr.value_key == column))
        .map(|attr| attr.value_key.clone())
}
