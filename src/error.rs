use thiserror::Error;

pub type ImportResult<T> = Result<T, ImportError>;

#[derive(Error, Debug)]
pub enum ImportError {
    /// A referenced column, attribute or row is not part of the current session
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Invalid file: {0}")]
    InvalidFile(String),

    #[error("File without content: the first sheet has no rows")]
    EmptyContent,

    #[error("No attribute was associated to any column from the file")]
    NoAttributeAssociated,

    #[error("No data was processed")]
    NoDataProcessed,

    #[error("No file was set")]
    NoFileSelected,

    #[error("Unsupported language: {0} (falling back to en-US)")]
    UnsupportedLanguage(String),

    #[error("Index {index} out of range ({len} sheets)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Header mode cannot change while a file is loaded")]
    HeaderLocked,

    #[error("Spreadsheet parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export error: {0}")]
    Export(String),
}

impl ImportError {
    /// Warning-level errors are reported but never interrupt processing
    pub fn is_warning(&self) -> bool {
        matches!(self, ImportError::UnsupportedLanguage(_))
    }

    /// Validation failures caused by user input, as opposed to I/O or wiring problems
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ImportError::InvalidFile(_)
                | ImportError::EmptyContent
                | ImportError::NoAttributeAssociated
                | ImportError::NoDataProcessed
                | ImportError::NoFileSelected
                | ImportError::IndexOutOfRange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_kinds() {
        assert!(ImportError::UnsupportedLanguage("fr-FR".to_string()).is_warning());
        assert!(!ImportError::EmptyContent.is_warning());
        assert!(!ImportError::NoDataProcessed.is_warning());
    }

    #[test]
    fn test_validation_kinds() {
        assert!(ImportError::NoAttributeAssociated.is_validation());
        assert!(ImportError::IndexOutOfRange { index: 3, len: 1 }.is_validation());
        assert!(!ImportError::ElementNotFound("column 'X'".to_string()).is_validation());
        assert!(!ImportError::Parse("bad zip".to_string()).is_validation());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let err: ImportError = io.into();
        assert!(err.to_string().starts_with("IO error:"));
    }
}
