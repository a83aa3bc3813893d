//! Fallback OCR tier: rasterize, preprocess, recognize and assemble.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;

use crate::detect::Inspection;
use crate::error::{Error, Result};
use crate::model::{Document, Paragraph};
use crate::ocr::{
    parse_tsv, Assembler, OcrEngine, PageRasterizer, PdftoppmRasterizer, Preprocessor,
    TesseractEngine, TextNormalizer,
};
use crate::tools::{Capabilities, Tool};

use super::{ConversionJob, ConversionStrategy, ConvertOptions};

/// Last-resort OCR conversion driven page by page.
///
/// By default pages are rendered with `pdftoppm` and recognized with
/// `tesseract`; other backends can be plugged in with
/// [`FallbackOcrStrategy::with_backends`].
#[derive(Clone, Default)]
pub struct FallbackOcrStrategy {
    backends: Option<(Arc<dyn PageRasterizer>, Arc<dyn OcrEngine>)>,
}

impl FallbackOcrStrategy {
    /// Use `pdftoppm` and `tesseract` from the capability snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom rasterizer and OCR engine.
    pub fn with_backends(rasterizer: Arc<dyn PageRasterizer>, engine: Arc<dyn OcrEngine>) -> Self {
        Self {
            backends: Some((rasterizer, engine)),
        }
    }

    fn resolve_backends(
        &self,
        job: &ConversionJob<'_>,
    ) -> (Arc<dyn PageRasterizer>, Arc<dyn OcrEngine>) {
        match &self.backends {
            Some((rasterizer, engine)) => (rasterizer.clone(), engine.clone()),
            None => {
                let caps = job.capabilities;
                (
                    Arc::new(PdftoppmRasterizer::new(caps.program(Tool::Pdftoppm))),
                    Arc::new(TesseractEngine::new(
                        caps.program(Tool::Tesseract),
                        job.options.ocr.psm,
                    )),
                )
            }
        }
    }
}

impl fmt::Debug for FallbackOcrStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let backends = self
            .backends
            .as_ref()
            .map(|(r, e)| format!("{} + {}", r.name(), e.name()));
        f.debug_struct("FallbackOcrStrategy")
            .field("backends", &backends)
            .finish()
    }
}

impl ConversionStrategy for FallbackOcrStrategy {
    fn name(&self) -> &str {
        "fallback-ocr"
    }

    fn check(
        &self,
        capabilities: &Capabilities,
        _inspection: &Inspection,
        _options: &ConvertOptions,
    ) -> Result<()> {
        if self.backends.is_some() {
            return Ok(());
        }
        for tool in [Tool::Pdftoppm, Tool::Tesseract] {
            if !capabilities.has(tool) {
                return Err(Error::ToolUnavailable(tool.to_string()));
            }
        }
        Ok(())
    }

    fn attempt(&self, job: &ConversionJob<'_>) -> Result<Option<Document>> {
        let options = job.options;
        let (rasterizer, engine) = self.resolve_backends(job);

        let missing = job.capabilities.missing_languages(&options.language);
        if self.backends.is_none() && !missing.is_empty() {
            log::warn!("Tesseract language data missing: {}", missing.join(", "));
        }

        let workdir = tempfile::Builder::new().prefix("kurdocx-pages-").tempdir()?;
        let pages = rasterizer.rasterize(job.input, options.ocr.dpi, workdir.path())?;
        log::info!("Running OCR on {} pages with {}", pages.len(), engine.name());

        let recognizer = PageRecognizer::new(options, engine);
        let recognize = |(index, path): (usize, &PathBuf)| {
            recognizer.recognize(index as u32 + 1, path)
        };
        let per_page: Vec<Vec<Paragraph>> = if options.parallel {
            pages.par_iter().enumerate().map(recognize).collect::<Result<_>>()?
        } else {
            pages.iter().enumerate().map(recognize).collect::<Result<_>>()?
        };

        let mut document = Document::with_metadata(job.metadata(self.name()));
        for paragraphs in per_page {
            document.extend_page(paragraphs);
        }

        if document.is_empty() {
            return Err(Error::NoTextRecovered);
        }

        job.write_document(&document)?;
        Ok(Some(document))
    }
}

/// Per-page OCR state shared across worker threads.
struct PageRecognizer<'a> {
    options: &'a ConvertOptions,
    engine: Arc<dyn OcrEngine>,
    preprocessor: Option<Preprocessor>,
    normalizer: Option<TextNormalizer>,
    assembler: Assembler,
}

impl<'a> PageRecognizer<'a> {
    fn new(options: &'a ConvertOptions, engine: Arc<dyn OcrEngine>) -> Self {
        Self {
            options,
            engine,
            preprocessor: options.ocr.preprocess.clone().map(Preprocessor::new),
            normalizer: options
                .ocr
                .normalize
                .clone()
                .map(|n| TextNormalizer::new(n, &options.language)),
            assembler: Assembler::new(options.ocr.assembler.clone(), options.language.clone()),
        }
    }

    fn recognize(&self, page: u32, path: &Path) -> Result<Vec<Paragraph>> {
        let image = image::open(path)?;
        let gray = match &self.preprocessor {
            Some(preprocessor) => preprocessor.process(&image),
            None => image.to_luma8(),
        };

        let tsv = self.engine.recognize(&gray, &self.options.language)?;
        let tokens = parse_tsv(&tsv, self.options.ocr.min_confidence, self.normalizer.as_ref())?;
        Ok(self.assembler.assemble_page(tokens, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_default_backends() {
        let strategy = FallbackOcrStrategy::new();
        let scanned = Inspection::scanned("1.7", 1);
        let options = ConvertOptions::default();

        let only_tesseract = Capabilities::none().with_tool(Tool::Tesseract, "5.3.0");
        assert!(matches!(
            strategy.check(&only_tesseract, &scanned, &options),
            Err(Error::ToolUnavailable(tool)) if tool == "pdftoppm"
        ));

        let both = only_tesseract.with_tool(Tool::Pdftoppm, "24.02.0");
        assert!(strategy.check(&both, &scanned, &options).is_ok());
    }
}
