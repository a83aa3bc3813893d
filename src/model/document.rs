//! Document-level types.

use super::Paragraph;
use crate::lang::LanguageSpec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An assembled document ready for writing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata
    pub metadata: Metadata,

    /// Paragraphs in page and vertical order
    pub paragraphs: Vec<Paragraph>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document with metadata.
    pub fn with_metadata(metadata: Metadata) -> Self {
        Self {
            metadata,
            paragraphs: Vec::new(),
        }
    }

    /// Append a paragraph.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.paragraphs.push(paragraph);
    }

    /// Append the paragraphs of one page.
    pub fn extend_page(&mut self, paragraphs: impl IntoIterator<Item = Paragraph>) {
        self.paragraphs.extend(paragraphs);
    }

    /// Number of paragraphs.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    /// Check if the document has no paragraphs.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Number of right-to-left paragraphs.
    pub fn rtl_paragraph_count(&self) -> usize {
        self.paragraphs.iter().filter(|p| p.is_rtl()).count()
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.plain_text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title (written to docProps/core.xml)
    pub title: Option<String>,

    /// OCR language spec used for the conversion
    pub language: LanguageSpec,

    /// Source file name
    pub source: Option<String>,

    /// Name of the strategy that produced the document
    pub strategy: Option<String>,

    /// Number of source pages
    pub page_count: u32,

    /// Creation date
    pub created: Option<DateTime<Utc>>,
}

impl Metadata {
    /// Create metadata for a language spec, stamped with the current time.
    pub fn for_language(language: LanguageSpec) -> Self {
        Self {
            language,
            created: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the source file name.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}
