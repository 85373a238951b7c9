//! Import session: one per widget instance
//!
//! Owns the sheet store, mapping table, image picks and display settings, and
//! drives the workflow
//! `Idle → FileSelected → ColumnsMapped → (ImagesPending → ImagesAttached) → ResultEmitted`.
//! Every failing operation reports its error through the error handler and
//! also returns it.

use crate::config::{ImporterConfig, Language};
use crate::core::images::{attach_images, ImageAttachments};
use crate::core::{normalize, normalize_unchecked, AttributeRegistry, MappingTable, SheetStore};
use crate::error::{ImportError, ImportResult};
use crate::excel::WorkbookImporter;
use crate::types::{Attribute, FileHandle, OutputRecord, Sheet, Workbook};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Workflow position of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    FileSelected,
    ColumnsMapped,
    ImagesPending,
    ImagesAttached,
    ResultEmitted,
}

/// Result of one `process()` call
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// Records were delivered to the result handler
    Emitted(Vec<OutputRecord>),
    /// Records are waiting for image picks; call `process()` again to emit
    ImagesPending { records: usize },
}

/// Issued by `begin_load`; only the latest ticket may complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// Display-only settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySettings {
    pub button_text: String,
    pub color_button_class: String,
    pub extra_button_text: String,
    pub color_extra_button_class: String,
    pub input_file_text: String,
    pub input_file_inside_text: String,
    pub max_vertical_rows_to_display: usize,
    pub check_number_of_rows: bool,
    pub show_extra_button: bool,
}

pub type ResultHandler = Box<dyn FnMut(&[OutputRecord]) + Send>;
pub type ErrorHandler = Box<dyn FnMut(&ImportError) + Send>;
pub type ExtraButtonHandler = Box<dyn FnMut() + Send>;

pub struct ImportSession {
    registry: AttributeRegistry,
    language: Language,
    display: DisplaySettings,
    has_header: bool,
    state: SessionState,
    store: SheetStore,
    mapping: Option<MappingTable>,
    images: ImageAttachments,
    preview: Option<Vec<OutputRecord>>,
    generation: u64,
    on_result: Option<ResultHandler>,
    on_error: Option<ErrorHandler>,
    on_extra_button: Option<ExtraButtonHandler>,
}

impl std::fmt::Debug for ImportSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportSession")
            .field("state", &self.state)
            .field("has_header", &self.has_header)
            .field("attributes", &self.registry.len())
            .field("rows", &self.store.row_count())
            .finish_non_exhaustive()
    }
}

impl ImportSession {
    /// Build a session from a validated config.
    ///
    /// An unsupported language is reported as a warning and replaced by en-US.
    pub fn new(config: ImporterConfig) -> ImportResult<Self> {
        Self::with_error_handler(config, None)
    }

    /// Like `new`, with the error handler installed before the language check
    pub fn with_error_handler(
        config: ImporterConfig,
        on_error: Option<ErrorHandler>,
    ) -> ImportResult<Self> {
        config.validate()?;

        let (language, unsupported) = match config.resolve_language() {
            Ok(language) => (language, None),
            Err(tag) => (Language::default(), Some(tag)),
        };

        let display = DisplaySettings {
            button_text: non_empty_or(config.button_text, language.button_text()),
            color_button_class: config.color_button_class,
            extra_button_text: non_empty_or(config.extra_button_text, language.extra_button_text()),
            color_extra_button_class: config.color_extra_button_class,
            input_file_text: non_empty_or(config.input_file_text, language.input_file_text()),
            input_file_inside_text: non_empty_or(
                config.input_file_inside_text,
                language.input_file_inside_text(),
            ),
            max_vertical_rows_to_display: config.max_vertical_rows_to_display,
            check_number_of_rows: false,
            show_extra_button: config.show_extra_button,
        };

        let mut session = Self {
            registry: AttributeRegistry::from_specs(&config.attributes),
            language,
            display,
            has_header: config.has_header,
            state: SessionState::Idle,
            store: SheetStore::new(),
            mapping: None,
            images: ImageAttachments::new(),
            preview: None,
            generation: 0,
            on_result: None,
            on_error,
            on_extra_button: None,
        };

        if let Some(tag) = unsupported {
            session.report(ImportError::UnsupportedLanguage(tag));
        }

        debug!(
            attributes = session.registry.len(),
            language = session.language.tag(),
            "import session created"
        );
        Ok(session)
    }

    //--------------------------------------------------------------------------
    // Handlers
    //--------------------------------------------------------------------------

    pub fn on_result<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&[OutputRecord]) + Send + 'static,
    {
        self.on_result = Some(Box::new(handler));
        self
    }

    pub fn on_error<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&ImportError) + Send + 'static,
    {
        self.on_error = Some(Box::new(handler));
        self
    }

    pub fn on_extra_button<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_extra_button = Some(Box::new(handler));
        self
    }

    //--------------------------------------------------------------------------
    // Accessors
    //--------------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn has_header(&self) -> bool {
        self.has_header
    }

    pub fn attributes(&self) -> &[Attribute] {
        self.registry.attributes()
    }

    pub fn registry(&self) -> &AttributeRegistry {
        &self.registry
    }

    pub fn sheets(&self) -> &[Sheet] {
        self.store.sheets()
    }

    pub fn selected_sheet(&self) -> Option<&Sheet> {
        self.store.current_sheet()
    }

    pub fn mapping_table(&self) -> Option<&MappingTable> {
        self.mapping.as_ref()
    }

    pub fn images(&self) -> &ImageAttachments {
        &self.images
    }

    /// Records awaiting image attachment
    pub fn preview(&self) -> Option<&[OutputRecord]> {
        self.preview.as_deref()
    }

    pub fn display(&self) -> &DisplaySettings {
        &self.display
    }

    /// Rows in the selected sheet, 0 without a file
    pub fn record_count(&self) -> usize {
        self.store.row_count()
    }

    //--------------------------------------------------------------------------
    // File selection
    //--------------------------------------------------------------------------

    /// Switch header mode. Locked while a file is loaded.
    pub fn set_has_header(&mut self, has_header: bool) -> ImportResult<()> {
        if self.store.is_loaded() {
            return Err(self.report(ImportError::HeaderLocked));
        }
        self.has_header = has_header;
        Ok(())
    }

    /// Start a file load. Any earlier ticket becomes stale and the previous
    /// file, mapping and result are discarded.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.reset_file_state();
        debug!(generation = self.generation, "load started");
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Finish a load started with `begin_load`.
    ///
    /// Returns `Ok(false)` when the ticket is stale and the workbook was dropped.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        parsed: ImportResult<Workbook>,
    ) -> ImportResult<bool> {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale load"
            );
            return Ok(false);
        }

        let workbook = parsed.map_err(|e| self.report(e))?;
        if let Err(e) = self.store.load(workbook, self.has_header) {
            return Err(self.report(e));
        }

        self.rebuild_mapping();
        self.state = SessionState::FileSelected;
        info!(
            sheets = self.store.sheets().len(),
            rows = self.store.row_count(),
            "file loaded"
        );
        Ok(true)
    }

    /// Read and load a spreadsheet file
    pub fn load_path(&mut self, path: &Path) -> ImportResult<()> {
        let ticket = self.begin_load();
        let parsed = WorkbookImporter::new(path).with_header(self.has_header).import();
        self.complete_load(ticket, parsed).map(|_| ())
    }

    /// Read a spreadsheet file on the blocking pool, then load it
    pub async fn load_path_async(&mut self, path: &Path) -> ImportResult<()> {
        let ticket = self.begin_load();
        let parsed = WorkbookImporter::new(path)
            .with_header(self.has_header)
            .import_async()
            .await;
        self.complete_load(ticket, parsed).map(|_| ())
    }

    /// Drop the file and every piece of state derived from it
    pub fn clear(&mut self) {
        self.generation += 1;
        self.reset_file_state();
        debug!("session cleared");
    }

    pub fn select_sheet(&mut self, index: usize) -> ImportResult<()> {
        if !self.store.is_loaded() {
            return Err(self.report(ImportError::NoFileSelected));
        }
        if let Err(e) = self.store.select_sheet(index) {
            return Err(self.report(e));
        }
        self.images.clear();
        self.preview = None;
        self.rebuild_mapping();
        self.state = SessionState::FileSelected;
        debug!(index, "sheet selected");
        Ok(())
    }

    //--------------------------------------------------------------------------
    // Mapping and images
    //--------------------------------------------------------------------------

    /// Associate a source column with an attribute, or clear it with `None`
    pub fn set_mapping(&mut self, column: &str, target: Option<&str>) -> ImportResult<()> {
        let Some(table) = self.mapping.as_mut() else {
            return Err(self.report(ImportError::NoFileSelected));
        };
        if let Err(e) = table.set_mapping(column, target, &self.registry) {
            return Err(self.report(e));
        }
        self.preview = None;
        self.state = SessionState::ColumnsMapped;
        Ok(())
    }

    /// Pick a file for an image attribute of a row (0-based)
    pub fn attach_image(&mut self, row: usize, attribute: &str, file: FileHandle) -> ImportResult<()> {
        self.check_image_target(row, attribute)?;
        self.images.attach(row, attribute, file);
        Ok(())
    }

    pub fn detach_image(&mut self, row: usize, attribute: &str) -> ImportResult<Option<FileHandle>> {
        self.check_image_target(row, attribute)?;
        Ok(self.images.detach(row, attribute))
    }

    fn check_image_target(&mut self, row: usize, attribute: &str) -> ImportResult<()> {
        if !self.store.is_loaded() {
            return Err(self.report(ImportError::NoFileSelected));
        }
        let is_image = self
            .registry
            .by_value_key(attribute)
            .is_some_and(|attr| attr.is_image);
        if !is_image {
            return Err(self.report(ImportError::ElementNotFound(format!(
                "image attribute '{attribute}'"
            ))));
        }
        if row >= self.store.row_count() {
            return Err(self.report(ImportError::ElementNotFound(format!("row {row}"))));
        }
        Ok(())
    }

    //--------------------------------------------------------------------------
    // Processing
    //--------------------------------------------------------------------------

    /// Primary action.
    ///
    /// Without image attributes the records are emitted directly. With image
    /// attributes the first call prepares the records for image picking and
    /// the next call attaches the picks and emits.
    pub fn process(&mut self) -> ImportResult<ProcessOutcome> {
        match self.run_process() {
            Ok(outcome) => Ok(outcome),
            Err(e) => Err(self.report(e)),
        }
    }

    fn run_process(&mut self) -> ImportResult<ProcessOutcome> {
        let (Some(sheet), Some(table)) = (self.store.current_sheet(), self.mapping.as_ref()) else {
            return Err(ImportError::NoFileSelected);
        };
        let attributes = self.registry.attributes();

        if !self.registry.has_image_attributes() {
            let records = normalize(sheet, &table.to_pairs(), attributes)?;
            return Ok(self.emit(records));
        }

        match self.preview.take() {
            Some(preview) if self.state == SessionState::ImagesPending => {
                let records = match attach_images(preview.clone(), attributes, &self.images) {
                    Ok(records) => records,
                    Err(e) => {
                        self.preview = Some(preview);
                        return Err(e);
                    }
                };
                self.state = SessionState::ImagesAttached;
                Ok(self.emit(records))
            }
            _ => {
                // No empty-mapping check here: image attributes are never mapped,
                // and attach_images rejects an all-null batch.
                let records = normalize_unchecked(sheet, &table.to_pairs(), attributes);
                let count = records.len();
                self.preview = Some(records);
                self.state = SessionState::ImagesPending;
                debug!(records = count, "records waiting for images");
                Ok(ProcessOutcome::ImagesPending { records: count })
            }
        }
    }

    fn emit(&mut self, records: Vec<OutputRecord>) -> ProcessOutcome {
        match self.on_result.as_mut() {
            Some(handler) => handler(records.as_slice()),
            None => info!(records = records.len(), "import processed"),
        }
        self.state = SessionState::ResultEmitted;
        ProcessOutcome::Emitted(records)
    }

    //--------------------------------------------------------------------------
    // Display settings
    //--------------------------------------------------------------------------

    pub fn set_button_text(&mut self, text: &str) {
        set_non_empty(&mut self.display.button_text, text);
    }

    pub fn set_color_button_class(&mut self, class: &str) {
        set_non_empty(&mut self.display.color_button_class, class);
    }

    pub fn set_extra_button_text(&mut self, text: &str) {
        set_non_empty(&mut self.display.extra_button_text, text);
    }

    pub fn set_color_extra_button_class(&mut self, class: &str) {
        set_non_empty(&mut self.display.color_extra_button_class, class);
    }

    pub fn set_input_file_text(&mut self, text: &str) {
        set_non_empty(&mut self.display.input_file_text, text);
    }

    pub fn set_input_file_inside_text(&mut self, text: &str) {
        set_non_empty(&mut self.display.input_file_inside_text, text);
    }

    pub fn set_max_vertical_rows_to_display(&mut self, rows: usize, check_number_of_rows: bool) -> ImportResult<()> {
        if rows == 0 {
            return Err(self.report(ImportError::Config(
                "max_vertical_rows_to_display must be at least 1".to_string(),
            )));
        }
        self.display.max_vertical_rows_to_display = rows;
        self.display.check_number_of_rows = check_number_of_rows;
        Ok(())
    }

    /// Rows of the mapping table shown at once
    pub fn visible_rows(&self) -> usize {
        let max = self.display.max_vertical_rows_to_display;
        if !self.display.check_number_of_rows {
            return max;
        }
        let table_rows = self.mapping.as_ref().map_or(0, MappingTable::len);
        max.min(table_rows)
    }

    pub fn set_show_extra_button(&mut self, show: bool) {
        self.display.show_extra_button = show;
    }

    /// Invoke the secondary action; does nothing while the control is hidden
    pub fn click_extra_button(&mut self) -> bool {
        if !self.display.show_extra_button {
            return false;
        }
        if let Some(handler) = self.on_extra_button.as_mut() {
            handler();
        }
        true
    }

    //--------------------------------------------------------------------------
    // Internals
    //--------------------------------------------------------------------------

    fn reset_file_state(&mut self) {
        self.store.clear();
        self.mapping = None;
        self.images.clear();
        self.preview = None;
        self.state = SessionState::Idle;
    }

    fn rebuild_mapping(&mut self) {
        self.mapping = self
            .store
            .current_sheet()
            .map(|sheet| MappingTable::build(sheet, &self.registry, self.store.has_header()));
    }

    /// Forward an error to the error handler and hand it back
    fn report(&mut self, err: ImportError) -> ImportError {
        match self.on_error.as_mut() {
            Some(handler) => handler(&err),
            None if err.is_warning() => warn!("{}", err),
            None => error!("{}", err),
        }
        err
    }
}

fn non_empty_or(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn set_non_empty(slot: &mut String, value: &str) {
    if !value.is_empty() {
        *slot = value.to_string();
    }
}
