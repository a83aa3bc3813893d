//! Direct `pdf2docx` conversion.

use std::ffi::OsStr;
use std::path::Path;

use crate::detect::Inspection;
use crate::error::{Error, Result};
use crate::model::Document;
use crate::tools::{run_tool, Capabilities, Tool};

use super::{ConversionJob, ConversionStrategy, ConvertOptions};

/// Converts PDFs with a text layer using `pdf2docx`, which keeps layout,
/// tables and images.
#[derive(Debug, Clone, Default)]
pub struct DirectStrategy {
    _private: (),
}

impl DirectStrategy {
    /// Create the strategy.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl ConversionStrategy for DirectStrategy {
    fn name(&self) -> &str {
        "direct"
    }

    fn check(
        &self,
        capabilities: &Capabilities,
        inspection: &Inspection,
        options: &ConvertOptions,
    ) -> Result<()> {
        require_text_layer(inspection, options)?;
        if !capabilities.has(Tool::Pdf2Docx) {
            return Err(Error::ToolUnavailable(Tool::Pdf2Docx.to_string()));
        }
        Ok(())
    }

    fn attempt(&self, job: &ConversionJob<'_>) -> Result<Option<Document>> {
        run_pdf2docx(job.capabilities.program(Tool::Pdf2Docx), job.input, job.output)?;
        Ok(None)
    }
}

/// Reject documents without a text layer, or when OCR is forced.
pub(crate) fn require_text_layer(inspection: &Inspection, options: &ConvertOptions) -> Result<()> {
    if options.force_ocr {
        return Err(Error::NotApplicable("OCR forced".into()));
    }
    if !inspection.has_text_layer {
        return Err(Error::NotApplicable(format!(
            "no text layer ({} characters)",
            inspection.text_chars
        )));
    }
    Ok(())
}

/// Run `pdf2docx convert IN OUT` and make sure the output exists.
pub(crate) fn run_pdf2docx(program: &OsStr, input: &Path, output: &Path) -> Result<()> {
    let tool = Tool::Pdf2Docx.name();
    run_tool(
        tool,
        program,
        ["convert".as_ref(), input.as_os_str(), output.as_os_str()],
    )?;

    match std::fs::metadata(output) {
        Ok(meta) if meta.len() > 0 => Ok(()),
        _ => Err(Error::conversion_failed(
            tool,
            format!("no output written to {}", output.display()),
        )),
    }
}
