//! OCR engine abstraction and the Tesseract backend.

use std::ffi::OsString;

use image::GrayImage;

use crate::error::{Error, Result};
use crate::lang::LanguageSpec;
use crate::tools::run_tool;

/// Turns a page image into Tesseract-style TSV.
pub trait OcrEngine: Send + Sync {
    /// Engine name used in logs and errors.
    fn name(&self) -> &str;

    /// Recognize one page and return TSV rows (header included).
    fn recognize(&self, image: &GrayImage, language: &LanguageSpec) -> Result<String>;
}

/// Tesseract command-line engine.
///
/// Runs `tesseract IMG stdout -l LANGS --psm N tsv` per page.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    program: OsString,
    psm: u8,
}

impl TesseractEngine {
    /// Create an engine running `program` with the given segmentation mode.
    pub fn new(program: impl Into<OsString>, psm: u8) -> Self {
        Self {
            program: program.into(),
            psm,
        }
    }

    /// Page segmentation mode passed to tesseract.
    pub fn psm(&self) -> u8 {
        self.psm
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new("tesseract", 6)
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, image: &GrayImage, language: &LanguageSpec) -> Result<String> {
        let file = tempfile::Builder::new()
            .prefix("kurdocx-page-")
            .suffix(".png")
            .tempfile()?;
        image.save_with_format(file.path(), image::ImageFormat::Png)?;

        let psm = self.psm.to_string();
        let lang = language.tesseract_arg();
        let args = [
            file.path().as_os_str(),
            "stdout".as_ref(),
            "-l".as_ref(),
            lang.as_ref(),
            "--psm".as_ref(),
            psm.as_ref(),
            "tsv".as_ref(),
        ];
        let output = run_tool(self.name(), &self.program, args)?;

        String::from_utf8(output.stdout)
            .map_err(|e| Error::conversion_failed(self.name(), format!("non UTF-8 output: {}", e)))
    }
}
