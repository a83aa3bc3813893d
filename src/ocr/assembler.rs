//! Line and paragraph reconstruction from OCR tokens.
//!
//! Tokens arrive in arbitrary order with pixel bounding boxes. They are
//! banded into lines by vertical center, lines are grouped into paragraphs
//! by the whitespace between them, and each paragraph gets a direction.

use crate::lang::LanguageSpec;
use crate::model::{Line, Paragraph, Token};

use super::options::AssemblerOptions;

/// Group tokens into lines.
///
/// Tokens are sorted by vertical center, then by left edge. A token joins
/// the current line when its center lies within `tolerance` pixels of the
/// center of the token that opened the line. Each line's direction comes
/// from `language`; right-to-left lines hold their tokens right to left.
///
/// Every input token ends up in exactly one line. No tokens, no lines.
pub fn group_tokens_into_lines(
    tokens: Vec<Token>,
    language: &LanguageSpec,
    tolerance: f32,
) -> Vec<Line> {
    band_tokens(tokens, tolerance)
        .into_iter()
        .map(|band| {
            let direction = language.direction_for(&band_text(&band));
            Line::from_tokens(band.tokens, direction)
        })
        .collect()
}

/// Tokens sharing a vertical band, not yet ordered for reading.
struct Band {
    tokens: Vec<Token>,
    top: f32,
    bottom: f32,
}

impl Band {
    fn new(tokens: Vec<Token>) -> Self {
        let top = tokens.iter().map(|t| t.top).fold(f32::INFINITY, f32::min);
        let bottom = tokens
            .iter()
            .map(|t| t.bottom())
            .fold(f32::NEG_INFINITY, f32::max);
        Self { tokens, top, bottom }
    }
}

fn band_tokens(mut tokens: Vec<Token>, tolerance: f32) -> Vec<Band> {
    tokens.sort_by(|a, b| {
        a.center_y()
            .total_cmp(&b.center_y())
            .then_with(|| a.left.total_cmp(&b.left))
    });

    let mut bands: Vec<Band> = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    let mut anchor: Option<f32> = None;

    for token in tokens {
        let center = token.center_y();
        match anchor {
            Some(y) if (center - y).abs() <= tolerance => current.push(token),
            _ => {
                if !current.is_empty() {
                    bands.push(Band::new(std::mem::take(&mut current)));
                }
                anchor = Some(center);
                current.push(token);
            }
        }
    }

    if !current.is_empty() {
        bands.push(Band::new(current));
    }

    bands
}

fn band_text(band: &Band) -> String {
    band.tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split items sorted top to bottom wherever the whitespace above an item,
/// measured from the lowest bottom of the current group, reaches `gap`.
fn split_at_gaps<T>(
    mut items: Vec<T>,
    gap: f32,
    top: impl Fn(&T) -> f32,
    bottom: impl Fn(&T) -> f32,
) -> Vec<Vec<T>> {
    items.sort_by(|a, b| top(a).total_cmp(&top(b)));

    let mut groups: Vec<Vec<T>> = Vec::new();
    let mut current: Vec<T> = Vec::new();
    let mut lowest = f32::NEG_INFINITY;

    for item in items {
        if !current.is_empty() && top(&item) - lowest >= gap {
            groups.push(std::mem::take(&mut current));
            lowest = f32::NEG_INFINITY;
        }
        lowest = lowest.max(bottom(&item));
        current.push(item);
    }

    if !current.is_empty() {
        groups.push(current);
    }

    groups
}

/// Group lines into paragraphs.
///
/// Lines are taken top to bottom. The gap is the whitespace between a
/// line's top and the lowest bottom seen so far in the current paragraph;
/// a gap at or above `gap_threshold` starts a new paragraph. Applying this
/// again to paragraphs merged into single lines keeps the same boundaries.
///
/// Paragraphs come back left-to-right on page 0; use [`assign_direction`]
/// and [`Paragraph::on_page`] to finish them.
pub fn group_lines_into_paragraphs(lines: Vec<Line>, gap_threshold: f32) -> Vec<Paragraph> {
    split_at_gaps(lines, gap_threshold, Line::top, Line::bottom)
        .into_iter()
        .map(|lines| Paragraph::new(lines, 0))
        .collect()
}

/// Set a paragraph's direction from its language and text.
///
/// Sorani is always right-to-left; other languages are left-to-right
/// unless the paragraph text is predominantly right-to-left script.
pub fn assign_direction(paragraph: Paragraph, language: &LanguageSpec) -> Paragraph {
    let direction = language.direction_for(&paragraph.plain_text());
    paragraph.with_direction(direction)
}

/// Median token height, the reference for relative tolerances.
pub fn median_height(tokens: &[Token]) -> f32 {
    if tokens.is_empty() {
        return 0.0;
    }
    let mut heights: Vec<f32> = tokens.iter().map(|t| t.height).collect();
    heights.sort_by(f32::total_cmp);
    heights[heights.len() / 2]
}

/// Page assembler combining the three grouping steps.
#[derive(Debug, Clone)]
pub struct Assembler {
    options: AssemblerOptions,
    language: LanguageSpec,
}

impl Assembler {
    /// Create an assembler for a language spec.
    pub fn new(options: AssemblerOptions, language: LanguageSpec) -> Self {
        Self { options, language }
    }

    /// Language spec used for direction decisions.
    pub fn language(&self) -> &LanguageSpec {
        &self.language
    }

    /// Turn one page of tokens into paragraphs.
    ///
    /// Tokens are banded and grouped by geometry first. Each paragraph's
    /// direction is decided once from its whole text, and every line in it
    /// is ordered with that direction.
    ///
    /// An empty token set yields no paragraphs; that is not an error here.
    pub fn assemble_page(&self, tokens: Vec<Token>, page: u32) -> Vec<Paragraph> {
        if tokens.is_empty() {
            log::debug!("Page {}: no tokens", page);
            return vec![];
        }

        let reference = median_height(&tokens);
        let tolerance = self.options.line_tolerance.resolve(reference);
        let gap = self.options.paragraph_gap.resolve(reference);
        let token_count = tokens.len();

        let bands = band_tokens(tokens, tolerance);
        let line_count = bands.len();
        let paragraphs: Vec<Paragraph> =
            split_at_gaps(bands, gap, |b: &Band| b.top, |b: &Band| b.bottom)
                .into_iter()
                .map(|bands| self.build_paragraph(bands, page))
                .collect();

        log::debug!(
            "Page {}: {} tokens -> {} lines -> {} paragraphs (tolerance {:.1}px, gap {:.1}px)",
            page,
            token_count,
            line_count,
            paragraphs.len(),
            tolerance,
            gap
        );

        paragraphs
    }

    fn build_paragraph(&self, bands: Vec<Band>, page: u32) -> Paragraph {
        let text = bands.iter().map(band_text).collect::<Vec<_>>().join("\n");
        let direction = self.language.direction_for(&text);
        let lines = bands
            .into_iter()
            .map(|band| Line::from_tokens(band.tokens, direction))
            .collect();
        Paragraph::new(lines, page).with_direction(direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::Direction;
    use crate::ocr::options::Tolerance;

    fn lang(code: &str) -> LanguageSpec {
        LanguageSpec::parse(code).unwrap()
    }

    fn tok(text: &str, left: f32, top: f32) -> Token {
        Token::new(text, left, top, 30.0, 10.0)
    }

    #[test]
    fn test_no_tokens_no_lines() {
        assert!(group_tokens_into_lines(vec![], &lang("ckb"), 5.0).is_empty());
    }

    #[test]
    fn test_unordered_tokens_banded() {
        let tokens = vec![
            tok("d", 50.0, 21.0),
            tok("b", 50.0, 1.0),
            tok("c", 10.0, 20.0),
            tok("a", 10.0, 0.0),
        ];
        let lines = group_tokens_into_lines(tokens, &lang("eng"), 5.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "a b");
        assert_eq!(lines[1].text(), "c d");
    }

    #[test]
    fn test_rtl_reverses_order() {
        let tokens = vec![tok("x", 10.0, 0.0), tok("y", 90.0, 0.0), tok("z", 50.0, 0.0)];
        let lines = group_tokens_into_lines(tokens, &lang("ckb"), 5.0);
        let lefts: Vec<f32> = lines[0].tokens().iter().map(|t| t.left).collect();
        assert_eq!(lefts, vec![90.0, 50.0, 10.0]);
        assert_eq!(lines[0].direction(), Direction::Rtl);
    }

    #[test]
    fn test_arabic_script_lines_are_rtl_for_ara() {
        let tokens = vec![tok("مرحبا", 10.0, 0.0), tok("بكم", 90.0, 0.0)];
        let lines = group_tokens_into_lines(tokens, &lang("ara"), 5.0);
        assert_eq!(lines[0].direction(), Direction::Rtl);
        assert_eq!(lines[0].text(), "بكم مرحبا");
    }

    #[test]
    fn test_single_line_single_paragraph() {
        let lines = group_tokens_into_lines(vec![tok("only", 0.0, 0.0)], &lang("eng"), 5.0);
        let paragraphs = group_lines_into_paragraphs(lines, 10.0);
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].lines.len(), 1);
    }

    #[test]
    fn test_gap_at_threshold_breaks() {
        // bottoms at 10, next top at 20: gap exactly 10
        let tokens = vec![tok("a", 0.0, 0.0), tok("b", 0.0, 20.0)];
        let lines = group_tokens_into_lines(tokens.clone(), &lang("eng"), 2.0);
        assert_eq!(group_lines_into_paragraphs(lines, 10.0).len(), 2);

        let lines = group_tokens_into_lines(tokens, &lang("eng"), 2.0);
        assert_eq!(group_lines_into_paragraphs(lines, 10.5).len(), 1);
    }

    #[test]
    fn test_assign_direction() {
        let p = Paragraph::new(vec![Line::from_text("hello", 0, Direction::Ltr)], 1);
        assert_eq!(assign_direction(p.clone(), &lang("ckb")).direction(), Direction::Rtl);
        assert_eq!(assign_direction(p.clone(), &lang("kmr")).direction(), Direction::Ltr);
        assert_eq!(assign_direction(p, &lang("eng")).direction(), Direction::Ltr);
    }

    #[test]
    fn test_median_height() {
        let tokens = vec![
            Token::new("a", 0.0, 0.0, 1.0, 10.0),
            Token::new("b", 0.0, 0.0, 1.0, 40.0),
            Token::new("c", 0.0, 0.0, 1.0, 12.0),
        ];
        assert_eq!(median_height(&tokens), 12.0);
        assert_eq!(median_height(&[]), 0.0);
    }

    #[test]
    fn test_assembler_relative_thresholds() {
        let assembler = Assembler::new(AssemblerOptions::default(), lang("eng"));
        let tokens = vec![
            tok("one", 0.0, 0.0),
            tok("two", 40.0, 2.0),
            tok("three", 0.0, 14.0),
            tok("four", 0.0, 60.0),
        ];
        let paragraphs = assembler.assemble_page(tokens, 3);
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].plain_text(), "one two\nthree");
        assert_eq!(paragraphs[1].plain_text(), "four");
        assert!(paragraphs.iter().all(|p| p.page == 3));
    }

    #[test]
    fn test_assembler_empty_page() {
        let assembler = Assembler::new(
            AssemblerOptions::default().with_line_tolerance(Tolerance::Pixels(4.0)),
            lang("ckb"),
        );
        assert!(assembler.assemble_page(vec![], 1).is_empty());
    }

    #[test]
    fn test_paragraph_lines_share_direction() {
        let options = AssemblerOptions::new()
            .with_line_tolerance(Tolerance::Pixels(3.0))
            .with_paragraph_gap(Tolerance::Pixels(10.0));
        let assembler = Assembler::new(options, lang("ara"));
        let tokens = vec![
            tok("مرحبا", 10.0, 0.0),
            tok("بكم", 50.0, 0.0),
            tok("hi", 10.0, 12.0),
        ];

        let paragraphs = assembler.assemble_page(tokens, 1);
        assert_eq!(paragraphs.len(), 1);
        let direction = paragraphs[0].direction();
        assert_eq!(direction, Direction::Rtl);
        assert!(paragraphs[0].lines.iter().all(|l| l.direction() == direction));
    }
}
