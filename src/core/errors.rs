/*!
# Error System

Structured errors for report import and resource tree manipulation.
Row-level problems inside a report are not errors: they are logged and
skipped so one bad row never discards the rest of the report.
*/

use std::path::PathBuf;
use thiserror::Error;

/// Результат операций импорта
pub type ImportResult<T> = Result<T, ImportError>;

/// Ошибки импорта отчетов и работы с деревом ресурсов
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Unsupported report structure: {0}")]
    InvalidReport(String),

    #[error("Failed to decode report {0}: unsupported encoding")]
    Encoding(PathBuf),

    #[error("Resource tree is read-only after compute()")]
    TreeSealed,

    #[error("Unknown tool key: {0}")]
    UnknownTool(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<quick_xml::Error> for ImportError {
    fn from(err: quick_xml::Error) -> Self {
        ImportError::Xml(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ImportError::UnknownTool("lint9000".to_string());
        assert_eq!(err.to_string(), "Unknown tool key: lint9000");

        let err = ImportError::TreeSealed;
        assert!(err.to_string().contains("read-only"));
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ImportError = io.into();
        assert!(matches!(err, ImportError::Io(_)));
    }
}
