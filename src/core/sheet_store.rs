//! Sheet store: the parsed workbook plus the selected sheet and header mode

use crate::error::{ImportError, ImportResult};
use crate::types::{Sheet, Workbook};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetStore {
    sheets: Vec<Sheet>,
    selected: usize,
    has_header: bool,
}

impl SheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored sheets with a freshly parsed workbook.
    ///
    /// Fails with `InvalidFile` when the workbook has no sheets and with
    /// `EmptyContent` when its first sheet has no rows. On failure the
    /// previous contents are kept.
    pub fn load(&mut self, workbook: Workbook, has_header: bool) -> ImportResult<&[Sheet]> {
        let first = workbook
            .sheets
            .first()
            .ok_or_else(|| ImportError::InvalidFile("workbook contains no sheets".to_string()))?;
        if first.rows.is_empty() {
            return Err(ImportError::EmptyContent);
        }

        debug!(
            sheets = workbook.sheets.len(),
            rows = first.rows.len(),
            has_header,
            "sheet store loaded"
        );
        self.sheets = workbook.sheets;
        self.selected = 0;
        self.has_header = has_header;
        Ok(&self.sheets)
    }

    pub fn clear(&mut self) {
        self.sheets.clear();
        self.selected = 0;
    }

    pub fn select_sheet(&mut self, index: usize) -> ImportResult<()> {
        if index >= self.sheets.len() {
            return Err(ImportError::IndexOutOfRange {
                index,
                len: self.sheets.len(),
            });
        }
        self.selected = index;
        Ok(())
    }

    pub fn current_sheet(&self) -> Option<&Sheet> {
        self.sheets.get(self.selected)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn has_header(&self) -> bool {
        self.has_header
    }

    pub fn is_loaded(&self) -> bool {
        !self.sheets.is_empty()
    }

    /// Rows in the current sheet
    pub fn row_count(&self) -> usize {
        self.current_sheet().map_or(0, |sheet| sheet.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CellValue, RowRecord};

    fn row(name: &str) -> RowRecord {
        [("NAME", CellValue::from(name))].into_iter().collect()
    }

    fn workbook() -> Workbook {
        Workbook::new(vec![
            Sheet::new("People", vec![row("Ann"), row("Bob")]),
            Sheet::new("Other", vec![row("Cid")]),
        ])
    }

    #[test]
    fn test_load_selects_first_sheet() {
        let mut store = SheetStore::new();
        let sheets = store.load(workbook(), true).unwrap();
        assert_eq!(sheets.len(), 2);
        assert_eq!(store.selected_index(), 0);
        assert_eq!(store.current_sheet().unwrap().name, "People");
        assert_eq!(store.row_count(), 2);
        assert!(store.has_header());
    }

    #[test]
    fn test_load_zero_sheets_is_invalid_file() {
        let mut store = SheetStore::new();
        let result = store.load(Workbook::default(), true);
        assert!(matches!(result, Err(ImportError::InvalidFile(_))));
        assert!(!store.is_loaded());
    }

    #[test]
    fn test_load_empty_first_sheet_is_empty_content() {
        let mut store = SheetStore::new();
        let wb = Workbook::new(vec![Sheet::new("Blank", vec![]), Sheet::new("Full", vec![row("x")])]);
        assert!(matches!(store.load(wb, false), Err(ImportError::EmptyContent)));
    }

    #[test]
    fn test_failed_load_keeps_previous_contents() {
        let mut store = SheetStore::new();
        store.load(workbook(), true).unwrap();
        store.select_sheet(1).unwrap();
        assert!(store.load(Workbook::default(), true).is_err());
        assert_eq!(store.selected_index(), 1);
        assert_eq!(store.sheets().len(), 2);
    }

    #[test]
    fn test_reload_resets_selection() {
        let mut store = SheetStore::new();
        store.load(workbook(), true).unwrap();
        store.select_sheet(1).unwrap();
        store.load(workbook(), false).unwrap();
        assert_eq!(store.selected_index(), 0);
        assert!(!store.has_header());
    }

    #[test]
    fn test_select_sheet_out_of_range() {
        let mut store = SheetStore::new();
        store.load(workbook(), true).unwrap();
        let result = store.select_sheet(2);
        assert!(matches!(
            result,
            Err(ImportError::IndexOutOfRange { index: 2, len: 2 })
        ));
        assert_eq!(store.selected_index(), 0);
    }

    #[test]
    fn test_clear() {
        let mut store = SheetStore::new();
        store.load(workbook(), true).unwrap();
        store.clear();
        assert!(!store.is_loaded());
        assert_eq!(store.row_count(), 0);
        assert!(store.current_sheet().is_none());
    }
}
