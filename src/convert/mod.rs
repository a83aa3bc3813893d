//! Conversion strategies and the tiered strategy selector.
//!
//! A conversion walks an ordered list of [`ConversionStrategy`]s. Each one
//! first checks whether it applies to the document and the installed tools;
//! applicable strategies are attempted in order until one succeeds.
//!
//! The default tiers are:
//!
//! 1. [`DirectStrategy`]: `pdf2docx` on the original PDF
//! 2. [`TextLayerStrategy`]: embedded text layer written as DOCX
//! 3. [`OcrPipelineStrategy`]: `ocrmypdf`, then `pdf2docx` or the sidecar text
//! 4. [`FallbackOcrStrategy`]: rasterize, OCR and assemble paragraphs
//!
//! # Example
//!
//! ```no_run
//! use kurdocx::convert::{ConvertOptions, StrategySelector};
//! use kurdocx::tools::{Capabilities, ToolPaths};
//! use std::path::Path;
//!
//! fn main() -> kurdocx::Result<()> {
//!     let capabilities = Capabilities::probe(&ToolPaths::default());
//!     let selector = StrategySelector::with_defaults(capabilities);
//!
//!     let result = selector.convert(
//!         Path::new("scan.pdf"),
//!         Path::new("scan.docx"),
//!         &ConvertOptions::default(),
//!     )?;
//!     println!("Converted with {}", result.strategy);
//!     Ok(())
//! }
//! ```

mod direct;
mod fallback;
mod ocr_pipeline;
mod text_layer;

pub use direct::DirectStrategy;
pub use fallback::FallbackOcrStrategy;
pub use ocr_pipeline::OcrPipelineStrategy;
pub use text_layer::{paragraphs_from_text, TextLayerStrategy};

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::detect::{inspect_pdf, Inspection, DEFAULT_MIN_TEXT_CHARS};
use crate::docx::{DocxOptions, DocxWriter};
use crate::error::{Error, Result};
use crate::lang::LanguageSpec;
use crate::model::{Document, Metadata};
use crate::ocr::OcrOptions;
use crate::tools::Capabilities;

/// Options for a single conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// OCR languages; the first one decides text direction
    pub language: LanguageSpec,

    /// Skip the text-layer tiers even when the PDF has text
    pub force_ocr: bool,

    /// Characters a PDF needs before it counts as having a text layer
    pub min_text_chars: usize,

    /// OCR pages on the rayon pool
    pub parallel: bool,

    /// Document title (defaults to the input file stem)
    pub title: Option<String>,

    /// Fallback OCR settings
    pub ocr: OcrOptions,

    /// Word output settings
    pub docx: DocxOptions,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the OCR languages.
    pub fn with_language(mut self, language: LanguageSpec) -> Self {
        self.language = language;
        self
    }

    /// Force OCR even for PDFs with a text layer.
    pub fn with_force_ocr(mut self, force: bool) -> Self {
        self.force_ocr = force;
        self
    }

    /// Set the text layer threshold.
    pub fn with_min_text_chars(mut self, chars: usize) -> Self {
        self.min_text_chars = chars;
        self
    }

    /// Enable or disable parallel page OCR.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set OCR options.
    pub fn with_ocr_options(mut self, ocr: OcrOptions) -> Self {
        self.ocr = ocr;
        self
    }

    /// Set DOCX options.
    pub fn with_docx_options(mut self, docx: DocxOptions) -> Self {
        self.docx = docx;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            language: LanguageSpec::default(),
            force_ocr: false,
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
            parallel: true,
            title: None,
            ocr: OcrOptions::default(),
            docx: DocxOptions::default(),
        }
    }
}

/// Everything a strategy needs for one attempt.
#[derive(Debug, Clone, Copy)]
pub struct ConversionJob<'a> {
    /// Source PDF
    pub input: &'a Path,
    /// Destination `.docx`
    pub output: &'a Path,
    /// Result of inspecting the source
    pub inspection: &'a Inspection,
    /// Installed tools
    pub capabilities: &'a Capabilities,
    /// Conversion options
    pub options: &'a ConvertOptions,
}

impl ConversionJob<'_> {
    /// Metadata for a document produced by `strategy`.
    pub fn metadata(&self, strategy: &str) -> Metadata {
        let title = self.options.title.clone().or_else(|| {
            self.input
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        });

        let mut metadata = Metadata::for_language(self.options.language.clone());
        metadata.title = title;
        metadata.source = self
            .input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        metadata.strategy = Some(strategy.to_string());
        metadata.page_count = self.inspection.page_count;
        metadata
    }

    /// Write an assembled document to the output path.
    pub fn write_document(&self, document: &Document) -> Result<()> {
        DocxWriter::new(self.options.docx.clone()).write_to_path(document, self.output)
    }
}

/// One tier of the conversion pipeline.
pub trait ConversionStrategy: Send + Sync {
    /// Strategy name used in logs and attempt reports.
    fn name(&self) -> &str;

    /// Decide whether the strategy applies, without side effects.
    ///
    /// Returns [`Error::ToolUnavailable`] when a required tool is missing
    /// and [`Error::NotApplicable`] when the document does not qualify.
    fn check(
        &self,
        capabilities: &Capabilities,
        inspection: &Inspection,
        options: &ConvertOptions,
    ) -> Result<()>;

    /// Convert the document, writing `job.output`.
    ///
    /// Returns the assembled document when the crate wrote it itself, or
    /// `None` when an external converter produced the file.
    fn attempt(&self, job: &ConversionJob<'_>) -> Result<Option<Document>>;
}

/// What happened to a strategy during a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "lowercase")]
pub enum AttemptOutcome {
    /// The strategy did not apply
    Skipped(String),
    /// The strategy ran and failed recoverably
    Failed(String),
    /// The strategy produced the output
    Succeeded,
}

/// Record of one strategy in a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    /// Strategy name
    pub strategy: String,
    /// What happened
    pub outcome: AttemptOutcome,
}

impl Attempt {
    fn new(strategy: &str, outcome: AttemptOutcome) -> Self {
        Self {
            strategy: strategy.to_string(),
            outcome,
        }
    }
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            AttemptOutcome::Skipped(reason) => write!(f, "{}: skipped ({})", self.strategy, reason),
            AttemptOutcome::Failed(reason) => write!(f, "{}: {}", self.strategy, reason),
            AttemptOutcome::Succeeded => write!(f, "{}: ok", self.strategy),
        }
    }
}

/// One line of a conversion plan.
#[derive(Debug)]
pub struct PlanEntry {
    /// Strategy name
    pub strategy: String,
    /// `Ok` if the strategy would be attempted
    pub verdict: Result<()>,
}

impl PlanEntry {
    /// Check whether the strategy would be attempted.
    pub fn is_applicable(&self) -> bool {
        self.verdict.is_ok()
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// Written `.docx` file
    pub output: PathBuf,

    /// Strategy that produced the output
    pub strategy: String,

    /// Every strategy considered, in order, ending with the successful one
    pub attempts: Vec<Attempt>,

    /// Inspection of the source
    pub inspection: Inspection,

    /// Assembled document, when the crate wrote the output itself
    pub document: Option<Document>,
}

impl ConvertResult {
    /// Number of paragraphs written, when known.
    pub fn paragraph_count(&self) -> Option<usize> {
        self.document.as_ref().map(Document::paragraph_count)
    }
}

/// Ordered list of strategies plus the capability snapshot they run with.
pub struct StrategySelector {
    capabilities: Capabilities,
    strategies: Vec<Arc<dyn ConversionStrategy>>,
}

impl StrategySelector {
    /// Create a selector with no strategies.
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            strategies: Vec::new(),
        }
    }

    /// Create a selector with the four default tiers.
    pub fn with_defaults(capabilities: Capabilities) -> Self {
        let mut selector = Self::new(capabilities);
        selector.push(Arc::new(DirectStrategy::new()));
        selector.push(Arc::new(TextLayerStrategy::new()));
        selector.push(Arc::new(OcrPipelineStrategy::new()));
        selector.push(Arc::new(FallbackOcrStrategy::new()));
        selector
    }

    /// Append a strategy as the last tier.
    pub fn push(&mut self, strategy: Arc<dyn ConversionStrategy>) {
        self.strategies.push(strategy);
    }

    /// Capability snapshot in use.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Strategy names in tier order.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Decide which strategies apply, without running anything.
    pub fn plan(&self, inspection: &Inspection, options: &ConvertOptions) -> Vec<PlanEntry> {
        self.strategies
            .iter()
            .map(|strategy| PlanEntry {
                strategy: strategy.name().to_string(),
                verdict: strategy.check(&self.capabilities, inspection, options),
            })
            .collect()
    }

    /// Inspect `input` and convert it to `output`.
    pub fn convert(
        &self,
        input: &Path,
        output: &Path,
        options: &ConvertOptions,
    ) -> Result<ConvertResult> {
        let inspection = match inspect_pdf(input, options.min_text_chars) {
            Ok(inspection) => inspection,
            Err(e @ (Error::PdfParse(_) | Error::Encrypted)) => {
                // External tools may still cope with what lopdf rejects.
                log::warn!("Could not inspect {}: {}", input.display(), e);
                let format = crate::detect::detect_format_from_path(input)?;
                Inspection::scanned(&format.version, 0)
            }
            Err(e) => return Err(e),
        };
        self.convert_inspected(input, output, inspection, options)
    }

    /// Convert a document that has already been inspected.
    pub fn convert_inspected(
        &self,
        input: &Path,
        output: &Path,
        inspection: Inspection,
        options: &ConvertOptions,
    ) -> Result<ConvertResult> {
        let job = ConversionJob {
            input,
            output,
            inspection: &inspection,
            capabilities: &self.capabilities,
            options,
        };
        let mut attempts = Vec::new();

        for strategy in &self.strategies {
            let name = strategy.name();

            if let Err(e) = strategy.check(&self.capabilities, &inspection, options) {
                log::info!("Skipping {}: {}", name, e);
                attempts.push(Attempt::new(name, AttemptOutcome::Skipped(e.to_string())));
                continue;
            }

            log::info!("Trying {} on {}", name, input.display());
            match strategy.attempt(&job) {
                Ok(document) => {
                    attempts.push(Attempt::new(name, AttemptOutcome::Succeeded));
                    let strategy = name.to_string();
                    return Ok(ConvertResult {
                        output: output.to_path_buf(),
                        strategy,
                        attempts,
                        inspection,
                        document,
                    });
                }
                Err(e) if e.is_recoverable() => {
                    log::warn!("{} failed: {}", name, e);
                    attempts.push(Attempt::new(name, AttemptOutcome::Failed(e.to_string())));
                }
                Err(e) => return Err(e),
            }
        }

        Err(Error::AllStrategiesFailed(
            attempts.iter().map(Attempt::to_string).collect(),
        ))
    }
}

impl fmt::Debug for StrategySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategySelector")
            .field("capabilities", &self.capabilities)
            .field("strategies", &self.strategy_names())
            .finish()
    }
}
