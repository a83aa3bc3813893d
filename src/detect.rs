//! PDF format detection and text layer inspection.

use crate::error::{Error, Result};
use lopdf::Document as LopdfDocument;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// PDF format information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PdfFormat {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
}

impl std::fmt::Display for PdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_MAGIC_LEN: usize = 5;
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Default number of non-whitespace characters a PDF needs before it is
/// considered to have a text layer.
pub const DEFAULT_MIN_TEXT_CHARS: usize = 16;

/// Detect PDF format from a file path.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<PdfFormat> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut header = [0u8; 16];
    let read = reader.read(&mut header)?;
    detect_format_from_bytes(&header[..read])
}

/// Detect PDF format from bytes.
///
/// # Returns
/// * `Ok(PdfFormat)` if the data starts with valid PDF header
/// * `Err(Error::UnknownFormat)` if the data is not a PDF
pub fn detect_format_from_bytes(data: &[u8]) -> Result<PdfFormat> {
    if data.len() < PDF_MAGIC_LEN + VERSION_LEN {
        return Err(Error::UnknownFormat);
    }

    if !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version_bytes = &data[PDF_MAGIC_LEN..PDF_MAGIC_LEN + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(PdfFormat { version })
}

/// Check if a version string is valid.
fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}

/// Result of inspecting a PDF before conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inspection {
    /// Header information
    pub format: PdfFormat,
    /// Number of pages
    pub page_count: u32,
    /// Pages whose text layer has at least one visible character
    pub pages_with_text: u32,
    /// Non-whitespace characters across the whole text layer
    pub text_chars: usize,
    /// Whether the PDF counts as having an extractable text layer
    pub has_text_layer: bool,
}

impl Inspection {
    /// Inspection of a scanned document (no text layer).
    pub fn scanned(version: &str, page_count: u32) -> Self {
        Self {
            format: PdfFormat {
                version: version.to_string(),
            },
            page_count,
            pages_with_text: 0,
            text_chars: 0,
            has_text_layer: false,
        }
    }
}

/// Inspect a PDF: validate the header, count pages, measure the text layer.
///
/// Encrypted files are opened with the empty user password; any other
/// password yields [`Error::Encrypted`].
pub fn inspect_pdf<P: AsRef<Path>>(path: P, min_text_chars: usize) -> Result<Inspection> {
    let path = path.as_ref();
    let format = detect_format_from_path(path)?;
    let mut doc = LopdfDocument::load(path)?;

    if doc.is_encrypted() {
        // Owner-password-only files open with the empty user password.
        doc.decrypt("").map_err(|e| {
            log::debug!("Cannot decrypt {}: {}", path.display(), e);
            Error::Encrypted
        })?;
        log::debug!("Decrypted {} with an empty password", path.display());
    }

    let pages = page_texts(&doc);
    let page_count = doc.get_pages().len() as u32;
    let pages_with_text = pages
        .iter()
        .filter(|(_, text)| visible_char_count(text) > 0)
        .count() as u32;
    let text_chars: usize = pages.iter().map(|(_, text)| visible_char_count(text)).sum();

    log::debug!(
        "Inspected {}: {} pages, {} with text, {} chars",
        path.display(),
        page_count,
        pages_with_text,
        text_chars
    );

    Ok(Inspection {
        format,
        page_count,
        pages_with_text,
        text_chars,
        has_text_layer: text_chars >= min_text_chars.max(1),
    })
}

/// Extract the embedded text of every page, in page order.
///
/// Pages whose content cannot be decoded yield an empty string.
pub fn page_texts(doc: &LopdfDocument) -> Vec<(u32, String)> {
    doc.get_pages()
        .keys()
        .map(|&page_num| {
            let text = doc.extract_text(&[page_num]).unwrap_or_else(|e| {
                log::debug!("No text layer on page {}: {}", page_num, e);
                String::new()
            });
            (page_num, text)
        })
        .collect()
}

/// Count characters that are not whitespace.
pub fn visible_char_count(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}
