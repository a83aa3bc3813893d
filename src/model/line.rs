//! Line type: tokens sharing a vertical band.

use serde::{Deserialize, Serialize};

use super::Token;
use crate::lang::Direction;

/// A line of tokens in reading order.
///
/// Token order is fixed when the line is built; there is no way to
/// re-sort a line afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    tokens: Vec<Token>,
    top: f32,
    bottom: f32,
    direction: Direction,
}

impl Line {
    /// Build a line from tokens in arbitrary order.
    ///
    /// Tokens are ordered by their left edge, and the order is reversed
    /// for right-to-left lines so it matches reading order.
    pub fn from_tokens(mut tokens: Vec<Token>, direction: Direction) -> Self {
        tokens.sort_by(|a, b| a.left.total_cmp(&b.left));
        if direction.is_rtl() {
            tokens.reverse();
        }

        let top = tokens.iter().map(|t| t.top).fold(f32::INFINITY, f32::min);
        let bottom = tokens
            .iter()
            .map(|t| t.bottom())
            .fold(f32::NEG_INFINITY, f32::max);

        Self {
            tokens,
            top: if top.is_finite() { top } else { 0.0 },
            bottom: if bottom.is_finite() { bottom } else { 0.0 },
            direction,
        }
    }

    /// Build a line from already-logical text (e.g. an embedded text layer).
    ///
    /// Words keep their order; `index` is used as a synthetic vertical
    /// position so lines stay ordered.
    pub fn from_text(text: &str, index: usize, direction: Direction) -> Self {
        let top = index as f32;
        let tokens = text
            .split_whitespace()
            .map(|word| Token::new(word, 0.0, top, 0.0, 1.0))
            .collect();

        Self {
            tokens,
            top,
            bottom: top + 1.0,
            direction,
        }
    }

    /// Tokens in reading order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Top edge of the line (minimum token top).
    pub fn top(&self) -> f32 {
        self.top
    }

    /// Bottom edge of the line (maximum token bottom).
    pub fn bottom(&self) -> f32 {
        self.bottom
    }

    /// Line height.
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Direction the tokens were ordered for.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Text of the line, words joined by single spaces.
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if the line has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> Vec<Token> {
        vec![
            Token::new("c", 90.0, 2.0, 20.0, 10.0),
            Token::new("a", 10.0, 0.0, 20.0, 10.0),
            Token::new("b", 50.0, 1.0, 20.0, 12.0),
        ]
    }

    #[test]
    fn test_ltr_order() {
        let line = Line::from_tokens(tokens(), Direction::Ltr);
        assert_eq!(line.text(), "a b c");
        assert_eq!(line.top(), 0.0);
        assert_eq!(line.bottom(), 13.0);
    }

    #[test]
    fn test_rtl_order() {
        let line = Line::from_tokens(tokens(), Direction::Rtl);
        let lefts: Vec<f32> = line.tokens().iter().map(|t| t.left).collect();
        assert_eq!(lefts, vec![90.0, 50.0, 10.0]);
        assert_eq!(line.direction(), Direction::Rtl);
    }

    #[test]
    fn test_from_text() {
        let line = Line::from_text("  سڵاو   جیهان ", 3, Direction::Rtl);
        assert_eq!(line.text(), "سڵاو جیهان");
        assert_eq!(line.top(), 3.0);
        assert_eq!(line.len(), 2);
    }

    #[test]
    fn test_empty_line() {
        let line = Line::from_tokens(vec![], Direction::Ltr);
        assert!(line.is_empty());
        assert_eq!(line.height(), 0.0);
    }
}
