//! Error types for certificate generation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating certificates.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The tabular data source could not be read.
    #[error("Data source error: {0}")]
    DataSourceError(String),

    /// The data source has no `name` column.
    #[error("Data source has no '{0}' column")]
    MissingNameColumn(String),

    /// A required path was left empty.
    #[error("No {0} was selected")]
    MissingPath(&'static str),

    /// The data source header names the same column twice.
    #[error("Data source has more than one '{0}' column")]
    DuplicateColumn(String),

    /// A row has no value for one of the header columns.
    #[error("Row on line {line} has no value for column '{column}'")]
    MissingColumn { column: String, line: usize },

    /// Failed to parse the PPTX template structure.
    #[error("PPTX template error: {0}")]
    TemplateError(String),

    /// A document tree no longer lines up with the template it came from.
    #[error("Document does not match its template: {0}")]
    TemplateMismatch(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing or writing error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),

    /// The document handed to the converter does not exist.
    #[error("Source document not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The external office application could not be started.
    #[error("Failed to launch converter '{program}': {reason}")]
    LaunchFailed { program: String, reason: String },

    /// The external office application ran but produced no usable output.
    #[error("Conversion failed: {0}")]
    ConversionFailed(String),
}
