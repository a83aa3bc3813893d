//! Tesseract TSV output parsing.
//!
//! Tesseract's `tsv` config emits one row per layout element:
//!
//! ```text
//! level page_num block_num par_num line_num word_num left top width height conf text
//! ```
//!
//! Only level-5 rows are words; the others describe pages, blocks,
//! paragraphs and lines and carry a confidence of `-1`.

use crate::error::{Error, Result};
use crate::model::Token;

use super::normalize::TextNormalizer;

/// Number of columns in a TSV row.
const TSV_COLUMNS: usize = 12;

/// Layout level of word rows.
const WORD_LEVEL: u32 = 5;

/// Parse Tesseract TSV output into word tokens.
///
/// Rows below `min_confidence`, rows with blank text and non-word rows are
/// skipped. Token text is passed through `normalizer` when one is given;
/// tokens whose text normalizes to nothing are dropped.
pub fn parse_tsv(
    tsv: &str,
    min_confidence: f32,
    normalizer: Option<&TextNormalizer>,
) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();

    for (index, raw) in tsv.lines().enumerate() {
        let line_no = index + 1;
        let row = raw.trim_end_matches('\r');

        if row.trim().is_empty() || row.starts_with("level") {
            continue;
        }

        let fields: Vec<&str> = row.splitn(TSV_COLUMNS, '\t').collect();
        if fields.len() < TSV_COLUMNS - 1 {
            return Err(Error::TsvParse {
                line: line_no,
                reason: format!("expected {} columns, found {}", TSV_COLUMNS, fields.len()),
            });
        }

        let level: u32 = parse_field(fields[0], "level", line_no)?;
        if level != WORD_LEVEL {
            continue;
        }

        let confidence: f32 = parse_field(fields[10], "conf", line_no)?;
        if confidence < 0.0 || confidence < min_confidence {
            continue;
        }

        let raw_text = fields.get(11).copied().unwrap_or("");
        let text = match normalizer {
            Some(n) => n.normalize(raw_text),
            None => raw_text.trim().to_string(),
        };
        if text.trim().is_empty() {
            continue;
        }

        let left: f32 = parse_field(fields[6], "left", line_no)?;
        let top: f32 = parse_field(fields[7], "top", line_no)?;
        let width: f32 = parse_field(fields[8], "width", line_no)?;
        let height: f32 = parse_field(fields[9], "height", line_no)?;

        tokens.push(Token::new(text, left, top, width, height).with_confidence(confidence));
    }

    log::trace!("Parsed {} word tokens from TSV", tokens.len());
    Ok(tokens)
}

fn parse_field<T: std::str::FromStr>(value: &str, name: &str, line: usize) -> Result<T> {
    value.trim().parse().map_err(|_| Error::TsvParse {
        line,
        reason: format!("invalid {} value {:?}", name, value),
    })
}
