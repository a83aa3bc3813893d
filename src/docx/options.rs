//! DOCX output options.

/// Options controlling how paragraphs are written to Word.
#[derive(Debug, Clone, PartialEq)]
pub struct DocxOptions {
    /// Font for Latin text
    pub font: String,

    /// Font for complex scripts (Arabic-script Kurdish); defaults to `font`
    pub complex_script_font: Option<String>,

    /// Font size in points
    pub font_size: f32,

    /// Keep OCR line breaks inside a paragraph; otherwise lines are joined
    pub keep_line_breaks: bool,

    /// Insert a page break where the source page changes
    pub page_breaks: bool,
}

impl DocxOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font family.
    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = font.into();
        self
    }

    /// Set a separate complex-script font.
    pub fn with_complex_script_font(mut self, font: impl Into<String>) -> Self {
        self.complex_script_font = Some(font.into());
        self
    }

    /// Set the font size in points.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size.clamp(4.0, 96.0);
        self
    }

    /// Keep or join line breaks.
    pub fn with_line_breaks(mut self, keep: bool) -> Self {
        self.keep_line_breaks = keep;
        self
    }

    /// Enable or disable page breaks between source pages.
    pub fn with_page_breaks(mut self, enabled: bool) -> Self {
        self.page_breaks = enabled;
        self
    }

    /// Font used for complex scripts.
    pub fn cs_font(&self) -> &str {
        self.complex_script_font.as_deref().unwrap_or(&self.font)
    }

    /// Font size in half-points, as WordprocessingML stores it.
    pub fn half_points(&self) -> u32 {
        (self.font_size * 2.0).round() as u32
    }
}

impl Default for DocxOptions {
    fn default() -> Self {
        Self {
            font: "Arial".to_string(),
            complex_script_font: None,
            font_size: 12.0,
            keep_line_breaks: true,
            page_breaks: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = DocxOptions::default();
        assert_eq!(options.cs_font(), "Arial");
        assert_eq!(options.half_points(), 24);
        assert!(options.keep_line_breaks);
        assert!(!options.page_breaks);
    }

    #[test]
    fn test_builder() {
        let options = DocxOptions::new()
            .with_font("Calibri")
            .with_complex_script_font("Noto Naskh Arabic")
            .with_font_size(10.5)
            .with_line_breaks(false);
        assert_eq!(options.font, "Calibri");
        assert_eq!(options.cs_font(), "Noto Naskh Arabic");
        assert_eq!(options.half_points(), 21);
        assert!(!options.keep_line_breaks);
    }
}
