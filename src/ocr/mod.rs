//! Fallback OCR: rasterize, preprocess, recognize, assemble.
//!
//! The pieces are independent so each can be driven on its own:
//!
//! - [`PageRasterizer`] renders PDF pages to images (`pdftoppm`)
//! - [`Preprocessor`] cleans page images before recognition
//! - [`OcrEngine`] produces TSV for a page (`tesseract`)
//! - [`parse_tsv`] turns TSV into [`Token`](crate::model::Token)s
//! - [`Assembler`] rebuilds lines and paragraphs and assigns direction

pub mod assembler;
mod engine;
pub mod normalize;
mod options;
pub mod preprocess;
mod raster;
pub mod tsv;

pub use assembler::{
    assign_direction, group_lines_into_paragraphs, group_tokens_into_lines, Assembler,
};
pub use engine::{OcrEngine, TesseractEngine};
pub use normalize::{NormalizeOptions, TextNormalizer};
pub use options::{AssemblerOptions, OcrOptions, Tolerance};
pub use preprocess::{PreprocessOptions, Preprocessor};
pub use raster::{PageRasterizer, PdftoppmRasterizer};
pub use tsv::parse_tsv;
