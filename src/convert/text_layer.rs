//! Conversion from the PDF's embedded text layer.

use lopdf::Document as LopdfDocument;

use crate::detect::{page_texts, Inspection};
use crate::error::{Error, Result};
use crate::lang::LanguageSpec;
use crate::model::{Document, Line, Paragraph};
use crate::ocr::TextNormalizer;
use crate::tools::Capabilities;

use super::direct::require_text_layer;
use super::{ConversionJob, ConversionStrategy, ConvertOptions};

/// Writes the embedded text layer as DOCX. Needs no external tool.
#[derive(Debug, Clone, Default)]
pub struct TextLayerStrategy {
    _private: (),
}

impl TextLayerStrategy {
    /// Create the strategy.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl ConversionStrategy for TextLayerStrategy {
    fn name(&self) -> &str {
        "text-layer"
    }

    fn check(
        &self,
        _capabilities: &Capabilities,
        inspection: &Inspection,
        options: &ConvertOptions,
    ) -> Result<()> {
        require_text_layer(inspection, options)
    }

    fn attempt(&self, job: &ConversionJob<'_>) -> Result<Option<Document>> {
        let options = job.options;
        let pdf = LopdfDocument::load(job.input)?;
        let normalizer = options
            .ocr
            .normalize
            .clone()
            .map(|n| TextNormalizer::new(n, &options.language));

        let mut document = Document::with_metadata(job.metadata(self.name()));
        for (page, text) in page_texts(&pdf) {
            document.extend_page(paragraphs_from_text(
                &text,
                page,
                &options.language,
                normalizer.as_ref(),
            ));
        }

        if document.is_empty() {
            return Err(Error::conversion_failed(self.name(), "text layer is empty"));
        }

        job.write_document(&document)?;
        Ok(Some(document))
    }
}

/// Split page text into paragraphs at blank lines.
///
/// Lines keep their logical order. Each paragraph's direction comes from
/// `language` applied to the paragraph text.
pub fn paragraphs_from_text(
    text: &str,
    page: u32,
    language: &LanguageSpec,
    normalizer: Option<&TextNormalizer>,
) -> Vec<Paragraph> {
    let mut paragraphs = Vec::new();
    let mut block: Vec<String> = Vec::new();

    let mut flush = |block: &mut Vec<String>| {
        if block.is_empty() {
            return;
        }
        let direction = language.direction_for(&block.join(" "));
        let lines = block
            .drain(..)
            .enumerate()
            .map(|(i, line)| Line::from_text(&line, i, direction))
            .collect();
        paragraphs.push(Paragraph::new(lines, page).with_direction(direction));
    };

    for raw in text.lines() {
        let line = match normalizer {
            Some(n) => n.normalize(raw),
            None => raw.trim().to_string(),
        };
        if line.trim().is_empty() {
            flush(&mut block);
        } else {
            block.push(line);
        }
    }
    flush(&mut block);

    paragraphs
}
