//! Paragraph type.

use serde::{Deserialize, Serialize};

use super::Line;
use crate::lang::Direction;

/// A paragraph of consecutive lines with a single text direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Lines in top-to-bottom order
    pub lines: Vec<Line>,

    /// Source page number (1-indexed)
    pub page: u32,

    direction: Direction,
}

impl Paragraph {
    /// Create a left-to-right paragraph.
    pub fn new(lines: Vec<Line>, page: u32) -> Self {
        Self {
            lines,
            page,
            direction: Direction::Ltr,
        }
    }

    /// Return the paragraph with its direction set.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Return the paragraph tagged with a page number.
    pub fn on_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Paragraph direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Check if the paragraph is right-to-left.
    pub fn is_rtl(&self) -> bool {
        self.direction.is_rtl()
    }

    /// Top edge of the first line.
    pub fn top(&self) -> f32 {
        self.lines.first().map(Line::top).unwrap_or(0.0)
    }

    /// Bottom edge of the last line.
    pub fn bottom(&self) -> f32 {
        self.lines
            .iter()
            .map(Line::bottom)
            .fold(self.top(), f32::max)
    }

    /// Text of each line.
    pub fn line_texts(&self) -> Vec<String> {
        self.lines.iter().map(Line::text).collect()
    }

    /// Plain text, lines separated by newlines.
    pub fn plain_text(&self) -> String {
        self.line_texts().join("\n")
    }

    /// Check if the paragraph carries no text.
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(Line::is_empty)
    }
}
