//! OCR-PDF pipeline: `ocrmypdf`, then `pdf2docx` or the sidecar text.

use crate::detect::Inspection;
use crate::error::{Error, Result};
use crate::model::Document;
use crate::ocr::TextNormalizer;
use crate::tools::{run_tool, Capabilities, Tool};

use super::direct::run_pdf2docx;
use super::text_layer::paragraphs_from_text;
use super::{ConversionJob, ConversionStrategy, ConvertOptions};

/// Tesseract separates pages in sidecar text with a form feed.
const PAGE_SEPARATOR: char = '\u{000C}';

/// Deskews, cleans and OCRs the PDF with `ocrmypdf`.
///
/// The searchable PDF is converted with `pdf2docx` when it is installed;
/// otherwise, or if that conversion fails, the sidecar text is written.
#[derive(Debug, Clone, Default)]
pub struct OcrPipelineStrategy {
    _private: (),
}

impl OcrPipelineStrategy {
    /// Create the strategy.
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn document_from_sidecar(&self, job: &ConversionJob<'_>, sidecar: &str) -> Document {
        let options = job.options;
        let normalizer = options
            .ocr
            .normalize
            .clone()
            .map(|n| TextNormalizer::new(n, &options.language));

        let mut document = Document::with_metadata(job.metadata(self.name()));
        for (index, page_text) in split_pages(sidecar).into_iter().enumerate() {
            document.extend_page(paragraphs_from_text(
                page_text,
                index as u32 + 1,
                &options.language,
                normalizer.as_ref(),
            ));
        }
        document
    }
}

impl ConversionStrategy for OcrPipelineStrategy {
    fn name(&self) -> &str {
        "ocr-pipeline"
    }

    fn check(
        &self,
        capabilities: &Capabilities,
        _inspection: &Inspection,
        _options: &ConvertOptions,
    ) -> Result<()> {
        if !capabilities.has(Tool::Ocrmypdf) {
            return Err(Error::ToolUnavailable(Tool::Ocrmypdf.to_string()));
        }
        Ok(())
    }

    fn attempt(&self, job: &ConversionJob<'_>) -> Result<Option<Document>> {
        let workdir = tempfile::Builder::new()
            .prefix("kurdocx-ocrmypdf-")
            .tempdir()?;
        let processed = workdir.path().join("ocr.pdf");
        let sidecar = workdir.path().join("sidecar.txt");
        let languages = job.options.language.tesseract_arg();

        run_tool(
            Tool::Ocrmypdf.name(),
            job.capabilities.program(Tool::Ocrmypdf),
            [
                "-l".as_ref(),
                languages.as_ref(),
                "--deskew".as_ref(),
                "--clean".as_ref(),
                "--force-ocr".as_ref(),
                "--sidecar".as_ref(),
                sidecar.as_os_str(),
                job.input.as_os_str(),
                processed.as_os_str(),
            ],
        )?;

        if job.capabilities.has(Tool::Pdf2Docx) {
            match run_pdf2docx(
                job.capabilities.program(Tool::Pdf2Docx),
                &processed,
                job.output,
            ) {
                Ok(()) => return Ok(None),
                Err(e) if e.is_recoverable() => {
                    log::warn!("pdf2docx failed on OCR output, using sidecar text: {}", e);
                }
                Err(e) => return Err(e),
            }
        }

        let text = std::fs::read_to_string(&sidecar)?;
        let document = self.document_from_sidecar(job, &text);
        if document.is_empty() {
            return Err(Error::conversion_failed(
                Tool::Ocrmypdf.name(),
                "sidecar text is empty",
            ));
        }

        job.write_document(&document)?;
        Ok(Some(document))
    }
}

/// Split sidecar text into pages. A trailing separator does not start a page.
fn split_pages(sidecar: &str) -> Vec<&str> {
    let mut pages: Vec<&str> = sidecar.split(PAGE_SEPARATOR).collect();
    if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pages() {
        assert_eq!(split_pages("a\u{c}b\u{c}"), vec!["a", "b"]);
        assert_eq!(split_pages("only"), vec!["only"]);
        assert_eq!(split_pages("a\u{c}\u{c}c"), vec!["a", "", "c"]);
    }

    #[test]
    fn test_check_requires_ocrmypdf() {
        let strategy = OcrPipelineStrategy::new();
        let scanned = Inspection::scanned("1.4", 1);
        let options = ConvertOptions::default();

        assert!(matches!(
            strategy.check(&Capabilities::none(), &scanned, &options),
            Err(Error::ToolUnavailable(_))
        ));
        let caps = Capabilities::none().with_tool(Tool::Ocrmypdf, "16.0.0");
        assert!(strategy.check(&caps, &scanned, &options).is_ok());
    }
}
