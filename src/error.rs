//! Error types for kurdocx library.

use std::io;
use thiserror::Error;

/// Result type alias for kurdocx operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during conversion.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted and the empty password does not open it.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error decoding or preprocessing a page image.
    #[error("Image error: {0}")]
    Image(String),

    /// Malformed OCR engine output.
    #[error("TSV parse error at line {line}: {reason}")]
    TsvParse {
        /// 1-based line number in the TSV stream
        line: usize,
        /// What was wrong with the row
        reason: String,
    },

    /// Error while writing the output document.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Language code that cannot be passed to the OCR engine.
    #[error("Invalid language code: {0}")]
    InvalidLanguage(String),

    /// An optional external backend is not installed.
    #[error("Tool not available: {0}")]
    ToolUnavailable(String),

    /// A backend is installed but failed on this document.
    #[error("{tool} failed: {reason}")]
    ConversionFailed {
        /// Tool or strategy that failed
        tool: String,
        /// Failure detail (usually the tool's stderr)
        reason: String,
    },

    /// A strategy does not apply to this document (e.g. no text layer).
    #[error("Not applicable: {0}")]
    NotApplicable(String),

    /// OCR produced no paragraphs for the whole document.
    #[error("No text could be recovered from the document")]
    NoTextRecovered,

    /// Every conversion strategy was tried and none succeeded.
    #[error("All conversion strategies failed: {}", .0.join("; "))]
    AllStrategiesFailed(Vec<String>),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the strategy selector may move on to the next tier.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::ToolUnavailable(_)
                | Error::ConversionFailed { .. }
                | Error::NotApplicable(_)
                | Error::Io(_)
                | Error::Image(_)
                | Error::TsvParse { .. }
                | Error::PdfParse(_)
        )
    }

    /// Build a [`Error::ConversionFailed`] from a tool name and reason.
    pub fn conversion_failed(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::ConversionFailed {
            tool: tool.into(),
            reason: reason.into(),
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Render(format!("DOCX packaging error: {}", err))
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Render(format!("XML error: {}", err))
    }
}
