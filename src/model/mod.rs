//! Document model types for assembled OCR content.
//!
//! This module defines the intermediate representation that bridges the
//! OCR engine output and the document writer. Tokens are grouped into
//! lines, lines into paragraphs, paragraphs into a document.

mod document;
mod line;
mod paragraph;
mod token;

pub use document::{Document, Metadata};
pub use line::Line;
pub use paragraph::Paragraph;
pub use token::Token;
