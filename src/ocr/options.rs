//! OCR and assembly options.

use super::normalize::NormalizeOptions;
use super::preprocess::PreprocessOptions;

/// A distance threshold, absolute or relative to the page's text height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tolerance {
    /// Fixed number of pixels
    Pixels(f32),
    /// Multiple of the median token height of the page
    HeightRatio(f32),
}

impl Tolerance {
    /// Resolve to pixels given the page's median token height.
    pub fn resolve(self, median_height: f32) -> f32 {
        match self {
            Tolerance::Pixels(px) => px.max(0.0),
            Tolerance::HeightRatio(ratio) => (ratio * median_height).max(0.0),
        }
    }
}

/// Options for turning tokens into lines and paragraphs.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblerOptions {
    /// Maximum distance between vertical centers of tokens on one line
    pub line_tolerance: Tolerance,

    /// Vertical whitespace between lines at which a new paragraph starts
    pub paragraph_gap: Tolerance,
}

impl AssemblerOptions {
    /// Create assembler options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the line tolerance.
    pub fn with_line_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.line_tolerance = tolerance;
        self
    }

    /// Set the paragraph gap threshold.
    pub fn with_paragraph_gap(mut self, gap: Tolerance) -> Self {
        self.paragraph_gap = gap;
        self
    }
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            line_tolerance: Tolerance::HeightRatio(0.5),
            paragraph_gap: Tolerance::HeightRatio(1.0),
        }
    }
}

/// Options for the fallback OCR tier.
#[derive(Debug, Clone)]
pub struct OcrOptions {
    /// Rasterization resolution
    pub dpi: u32,

    /// Tesseract page segmentation mode
    pub psm: u8,

    /// Tokens below this confidence are dropped
    pub min_confidence: f32,

    /// Page image preprocessing (None = feed raw pages to the engine)
    pub preprocess: Option<PreprocessOptions>,

    /// Token text normalization (None = keep engine output verbatim)
    pub normalize: Option<NormalizeOptions>,

    /// Line and paragraph reconstruction
    pub assembler: AssemblerOptions,
}

impl OcrOptions {
    /// Create OCR options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rasterization DPI.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi.clamp(72, 1200);
        self
    }

    /// Set the page segmentation mode.
    pub fn with_psm(mut self, psm: u8) -> Self {
        self.psm = psm.min(13);
        self
    }

    /// Set the minimum token confidence.
    pub fn with_min_confidence(mut self, confidence: f32) -> Self {
        self.min_confidence = confidence.clamp(0.0, 100.0);
        self
    }

    /// Set or disable preprocessing.
    pub fn with_preprocess(mut self, preprocess: Option<PreprocessOptions>) -> Self {
        self.preprocess = preprocess;
        self
    }

    /// Set or disable text normalization.
    pub fn with_normalize(mut self, normalize: Option<NormalizeOptions>) -> Self {
        self.normalize = normalize;
        self
    }

    /// Set assembler options.
    pub fn with_assembler(mut self, assembler: AssemblerOptions) -> Self {
        self.assembler = assembler;
        self
    }
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            dpi: 300,
            psm: 6,
            min_confidence: 30.0,
            preprocess: Some(PreprocessOptions::default()),
            normalize: Some(NormalizeOptions::default()),
            assembler: AssemblerOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tolerance_resolve() {
        assert_eq!(Tolerance::Pixels(12.0).resolve(40.0), 12.0);
        assert_eq!(Tolerance::HeightRatio(0.5).resolve(40.0), 20.0);
        assert_eq!(Tolerance::Pixels(-3.0).resolve(40.0), 0.0);
    }

    #[test]
    fn test_ocr_options_builder() {
        let options = OcrOptions::new()
            .with_dpi(10_000)
            .with_psm(4)
            .with_min_confidence(150.0)
            .with_preprocess(None);

        assert_eq!(options.dpi, 1200);
        assert_eq!(options.psm, 4);
        assert_eq!(options.min_confidence, 100.0);
        assert!(options.preprocess.is_none());
        assert!(options.normalize.is_some());
    }

    #[test]
    fn test_assembler_defaults() {
        let options = AssemblerOptions::default();
        assert_eq!(options.line_tolerance, Tolerance::HeightRatio(0.5));
        assert_eq!(options.paragraph_gap, Tolerance::HeightRatio(1.0));
    }
}
