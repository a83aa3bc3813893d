//! OCR token type.

use serde::{Deserialize, Serialize};

/// A recognized word with its bounding box on the page image.
///
/// Coordinates are in pixels of the rasterized page, origin at the
/// top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Recognized text
    pub text: String,
    /// Left edge
    pub left: f32,
    /// Top edge
    pub top: f32,
    /// Box width
    pub width: f32,
    /// Box height
    pub height: f32,
    /// Engine confidence (0-100)
    pub confidence: f32,
}

impl Token {
    /// Create a token with full confidence.
    pub fn new(text: impl Into<String>, left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            text: text.into(),
            left,
            top,
            width,
            height,
            confidence: 100.0,
        }
    }

    /// Set the confidence.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Vertical center, used for line banding.
    pub fn center_y(&self) -> f32 {
        self.top + self.height / 2.0
    }

    /// Check if the token has no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_geometry() {
        let token = Token::new("word", 10.0, 20.0, 30.0, 8.0);
        assert_eq!(token.right(), 40.0);
        assert_eq!(token.bottom(), 28.0);
        assert_eq!(token.center_y(), 24.0);
        assert!(!token.is_blank());
    }

    #[test]
    fn test_token_confidence() {
        let token = Token::new(" ", 0.0, 0.0, 1.0, 1.0).with_confidence(42.5);
        assert_eq!(token.confidence, 42.5);
        assert!(token.is_blank());
    }
}
