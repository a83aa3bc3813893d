//! # kurdocx
//!
//! PDF to Word conversion with Kurdish-aware OCR.
//!
//! Documents are converted through an ordered list of strategies, from
//! layout-preserving conversion of text PDFs down to page-by-page OCR of
//! scans. Sorani (`ckb`) output is written right-to-left.
//!
//! ## Quick Start
//!
//! ```no_run
//! use kurdocx::convert_file;
//!
//! fn main() -> kurdocx::Result<()> {
//!     let result = convert_file("scan.pdf", "scan.docx")?;
//!     println!("Converted with {}", result.strategy);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Tiered conversion**: `pdf2docx`, embedded text layer, `ocrmypdf`, then
//!   built-in OCR assembly on `tesseract` output
//! - **Kurdish support**: Sorani and Kurmanji, mixed with Arabic and English
//! - **Right-to-left output**: bidi paragraphs and runs in the DOCX
//! - **Image cleanup**: denoise, contrast and sharpening before OCR
//! - **Parallel processing**: uses Rayon for multi-page OCR

pub mod convert;
pub mod detect;
pub mod docx;
pub mod error;
pub mod lang;
pub mod model;
pub mod ocr;
pub mod tools;

// Re-export commonly used types
pub use convert::{
    Attempt, AttemptOutcome, ConversionStrategy, ConvertOptions, ConvertResult, StrategySelector,
};
pub use detect::{
    detect_format_from_bytes, detect_format_from_path, inspect_pdf, Inspection, PdfFormat,
};
pub use docx::{DocxOptions, DocxWriter};
pub use error::{Error, Result};
pub use lang::{Direction, Language, LanguageSpec};
pub use model::{Document, Line, Metadata, Paragraph, Token};
pub use ocr::{AssemblerOptions, OcrOptions, PreprocessOptions, Tolerance};
pub use tools::{Capabilities, Tool, ToolPaths};

use std::path::Path;

/// Convert a PDF to DOCX with default options.
///
/// Probes the installed tools first; see [`Kurdocx`] to reuse a probe or
/// change options.
///
/// # Example
///
/// ```no_run
/// use kurdocx::convert_file;
///
/// let result = convert_file("scan.pdf", "scan.docx").unwrap();
/// for attempt in &result.attempts {
///     println!("{}", attempt);
/// }
/// ```
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<ConvertResult> {
    Kurdocx::new().convert(input, output)
}

/// Convert a PDF to DOCX with custom options.
pub fn convert_file_with_options<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: ConvertOptions,
) -> Result<ConvertResult> {
    Kurdocx::new().with_options(options).convert(input, output)
}

/// Builder for converting documents.
///
/// # Example
///
/// ```no_run
/// use kurdocx::{Kurdocx, LanguageSpec};
///
/// let result = Kurdocx::new()
///     .with_language(LanguageSpec::parse("ckb+eng")?)
///     .force_ocr()
///     .convert("scan.pdf", "scan.docx")?;
/// println!("{} paragraphs", result.paragraph_count().unwrap_or(0));
/// # Ok::<(), kurdocx::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Kurdocx {
    options: ConvertOptions,
    tool_paths: ToolPaths,
    capabilities: Option<Capabilities>,
}

impl Kurdocx {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all conversion options.
    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the OCR languages.
    pub fn with_language(mut self, language: LanguageSpec) -> Self {
        self.options.language = language;
        self
    }

    /// Skip the text-layer tiers.
    pub fn force_ocr(mut self) -> Self {
        self.options.force_ocr = true;
        self
    }

    /// Disable parallel page OCR.
    pub fn sequential(mut self) -> Self {
        self.options.parallel = false;
        self
    }

    /// Set OCR options.
    pub fn with_ocr_options(mut self, ocr: OcrOptions) -> Self {
        self.options.ocr = ocr;
        self
    }

    /// Set DOCX options.
    pub fn with_docx_options(mut self, docx: DocxOptions) -> Self {
        self.options.docx = docx;
        self
    }

    /// Override where external tools are found.
    pub fn with_tool_paths(mut self, paths: ToolPaths) -> Self {
        self.tool_paths = paths;
        self
    }

    /// Use an existing capability snapshot instead of probing.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Conversion options in use.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Build the default strategy selector, probing tools if needed.
    pub fn selector(&self) -> StrategySelector {
        let capabilities = self
            .capabilities
            .clone()
            .unwrap_or_else(|| Capabilities::probe(&self.tool_paths));
        StrategySelector::with_defaults(capabilities)
    }

    /// Convert `input` to `output`.
    pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<ConvertResult> {
        self.selector()
            .convert(input.as_ref(), output.as_ref(), &self.options)
    }
}
