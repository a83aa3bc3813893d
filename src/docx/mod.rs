//! Word (DOCX) output for assembled documents.

mod options;
mod writer;

pub use options::DocxOptions;
pub use writer::DocxWriter;
