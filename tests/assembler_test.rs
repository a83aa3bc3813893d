//! Integration tests for line and paragraph reconstruction.

use kurdocx::lang::{Direction, Language, LanguageSpec};
use kurdocx::model::{Line, Paragraph, Token};
use kurdocx::ocr::{
    assign_direction, group_lines_into_paragraphs, group_tokens_into_lines, Assembler,
    AssemblerOptions, Tolerance,
};

fn lang(code: &str) -> LanguageSpec {
    LanguageSpec::parse(code).unwrap()
}

fn token(text: &str, left: f32, top: f32) -> Token {
    Token::new(text, left, top, 30.0, 10.0)
}

fn lefts(line: &Line) -> Vec<f32> {
    line.tokens().iter().map(|t| t.left).collect()
}

/// Collapse each paragraph into a single line spanning all its tokens.
fn merge(paragraph: &Paragraph) -> Line {
    let tokens = paragraph
        .lines
        .iter()
        .flat_map(|line| line.tokens().iter().cloned())
        .collect();
    Line::from_tokens(tokens, paragraph.direction())
}

// ==================== Line Grouping ====================

#[test]
fn test_no_tokens_no_lines() {
    assert!(group_tokens_into_lines(vec![], &lang("ckb"), 5.0).is_empty());
}

#[test]
fn test_every_token_in_exactly_one_line() {
    let tokens = vec![
        token("a", 10.0, 0.0),
        token("b", 50.0, 2.0),
        token("c", 90.0, 40.0),
        token("d", 15.0, 41.0),
        token("e", 20.0, 100.0),
        token("f", 70.0, 1.0),
    ];
    let lines = group_tokens_into_lines(tokens.clone(), &lang("eng"), 5.0);

    assert_eq!(lines.len(), 3);
    let total: usize = lines.iter().map(Line::len).sum();
    assert_eq!(total, tokens.len());

    let mut seen: Vec<String> = lines
        .iter()
        .flat_map(|l| l.tokens().iter().map(|t| t.text.clone()))
        .collect();
    seen.sort();
    assert_eq!(seen, vec!["a", "b", "c", "d", "e", "f"]);
}

#[test]
fn test_sorani_line_is_reversed() {
    let tokens = vec![
        token("یەک", 50.0, 0.0),
        token("دوو", 10.0, 0.0),
        token("سێ", 90.0, 0.0),
    ];
    let lines = group_tokens_into_lines(tokens, &lang("ckb"), 5.0);

    assert_eq!(lines.len(), 1);
    assert_eq!(lefts(&lines[0]), vec![90.0, 50.0, 10.0]);
    assert_eq!(lines[0].direction(), Direction::Rtl);
}

#[test]
fn test_english_line_keeps_order() {
    let tokens = vec![
        token("two", 50.0, 0.0),
        token("one", 10.0, 0.0),
        token("three", 90.0, 0.0),
    ];
    let lines = group_tokens_into_lines(tokens, &lang("eng"), 5.0);

    assert_eq!(lines.len(), 1);
    assert_eq!(lefts(&lines[0]), vec![10.0, 50.0, 90.0]);
    assert_eq!(lines[0].text(), "one two three");
}

#[test]
fn test_arabic_script_under_latin_language_is_rtl() {
    let tokens = vec![token("مرحبا", 10.0, 0.0), token("بكم", 50.0, 0.0)];
    let lines = group_tokens_into_lines(tokens, &lang("eng+ara"), 5.0);
    assert_eq!(lines[0].direction(), Direction::Rtl);
    assert_eq!(lefts(&lines[0]), vec![50.0, 10.0]);
}

// ==================== Paragraph Grouping ====================

#[test]
fn test_single_line_single_paragraph() {
    let lines = group_tokens_into_lines(vec![token("solo", 0.0, 0.0)], &lang("eng"), 5.0);
    let paragraphs = group_lines_into_paragraphs(lines, 15.0);
    assert_eq!(paragraphs.len(), 1);
    assert_eq!(paragraphs[0].lines.len(), 1);
}

#[test]
fn test_gap_at_threshold_splits() {
    // Line bottoms at 10; next tops at 25 (gap 15) and 60 (gap 25).
    let tokens = vec![
        token("a", 0.0, 0.0),
        token("b", 0.0, 25.0),
        token("c", 0.0, 60.0),
    ];
    let lines = group_tokens_into_lines(tokens, &lang("eng"), 3.0);
    let paragraphs = group_lines_into_paragraphs(lines, 15.0);

    let texts: Vec<String> = paragraphs.iter().map(Paragraph::plain_text).collect();
    assert_eq!(texts, vec!["a", "b", "c"]);

    let tokens = vec![token("a", 0.0, 0.0), token("b", 0.0, 24.0)];
    let lines = group_tokens_into_lines(tokens, &lang("eng"), 3.0);
    assert_eq!(group_lines_into_paragraphs(lines, 15.0).len(), 1);
}

#[test]
fn test_paragraph_grouping_is_idempotent() {
    let tokens: Vec<Token> = [0.0, 14.0, 28.0, 70.0, 84.0, 150.0, 300.0, 312.0]
        .iter()
        .enumerate()
        .map(|(i, &top)| token(&format!("w{}", i), 10.0, top))
        .collect();

    for threshold in [5.0, 12.0, 30.0, 100.0] {
        let lines = group_tokens_into_lines(tokens.clone(), &lang("eng"), 3.0);
        let first = group_lines_into_paragraphs(lines, threshold);

        let merged: Vec<Line> = first.iter().map(merge).collect();
        let second = group_lines_into_paragraphs(merged, threshold);

        assert_eq!(first.len(), second.len(), "threshold {}", threshold);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.top(), b.top());
            assert_eq!(a.bottom(), b.bottom());
        }
    }
}

// ==================== Direction ====================

#[test]
fn test_assign_direction_is_deterministic() {
    let cases = [
        ("ckb", "hello", Direction::Rtl),
        ("kmr", "Rojbaş", Direction::Ltr),
        ("ara", "السلام عليكم", Direction::Rtl),
        ("eng", "", Direction::Ltr),
    ];

    for (code, text, expected) in cases {
        let line = Line::from_text(text, 0, Direction::Ltr);
        let paragraph = Paragraph::new(vec![line], 1);
        let spec = lang(code);

        let first = assign_direction(paragraph.clone(), &spec).direction();
        let second = assign_direction(paragraph, &spec).direction();
        assert_eq!(first, expected, "{} {:?}", code, text);
        assert_eq!(first, second);
    }
}

#[test]
fn test_sorani_is_configured_rtl() {
    assert!(Language::Sorani.is_configured_rtl());
    assert!(!Language::Kurmanji.is_configured_rtl());
    assert!(!Language::Arabic.is_configured_rtl());
}

// ==================== Page Assembly ====================

#[test]
fn test_sorani_page_two_lines_one_paragraph() {
    let tokens = vec![
        token("a1", 10.0, 0.0),
        token("a2", 50.0, 0.0),
        token("a3", 90.0, 0.0),
        token("b1", 15.0, 20.0),
        token("b2", 55.0, 20.0),
        token("b3", 95.0, 20.0),
    ];
    let options = AssemblerOptions::new()
        .with_line_tolerance(Tolerance::Pixels(5.0))
        .with_paragraph_gap(Tolerance::Pixels(25.0));
    let assembler = Assembler::new(options, lang("ckb"));

    let paragraphs = assembler.assemble_page(tokens, 1);

    assert_eq!(paragraphs.len(), 1);
    let paragraph = &paragraphs[0];
    assert_eq!(paragraph.page, 1);
    assert!(paragraph.is_rtl());
    assert_eq!(paragraph.lines.len(), 2);
    assert_eq!(lefts(&paragraph.lines[0]), vec![90.0, 50.0, 10.0]);
    assert_eq!(lefts(&paragraph.lines[1]), vec![95.0, 55.0, 15.0]);
    assert!(paragraph.lines.iter().all(|l| l.direction() == Direction::Rtl));
}

#[test]
fn test_default_options_use_text_height() {
    // Height 10: line tolerance 5px, paragraph gap 10px.
    let tokens = vec![
        token("one", 10.0, 0.0),
        token("two", 50.0, 3.0),
        token("three", 10.0, 14.0),
        token("four", 10.0, 40.0),
    ];
    let assembler = Assembler::new(AssemblerOptions::default(), lang("eng"));
    let paragraphs = assembler.assemble_page(tokens, 2);

    let texts: Vec<Vec<String>> = paragraphs.iter().map(Paragraph::line_texts).collect();
    assert_eq!(
        texts,
        vec![vec!["one two".to_string(), "three".to_string()], vec!["four".to_string()]]
    );
}

#[test]
fn test_empty_page_no_paragraphs() {
    let assembler = Assembler::new(AssemblerOptions::default(), lang("ckb"));
    assert!(assembler.assemble_page(vec![], 1).is_empty());
}

#[test]
fn test_arabic_paragraph_with_latin_line_has_one_direction() {
    let tokens = vec![
        token("مرحبا", 10.0, 0.0),
        token("بكم", 50.0, 0.0),
        token("hello", 10.0, 12.0),
        token("wonderful", 50.0, 12.0),
        token("world", 90.0, 12.0),
    ];
    let options = AssemblerOptions::new()
        .with_line_tolerance(Tolerance::Pixels(3.0))
        .with_paragraph_gap(Tolerance::Pixels(10.0));
    let assembler = Assembler::new(options, lang("ara"));

    let paragraphs = assembler.assemble_page(tokens, 1);

    assert_eq!(paragraphs.len(), 1);
    let paragraph = &paragraphs[0];
    assert_eq!(paragraph.lines.len(), 2);
    assert!(paragraph
        .lines
        .iter()
        .all(|l| l.direction() == paragraph.direction()));

    let expected = if paragraph.is_rtl() {
        vec![vec![50.0, 10.0], vec![90.0, 50.0, 10.0]]
    } else {
        vec![vec![10.0, 50.0], vec![10.0, 50.0, 90.0]]
    };
    let actual: Vec<Vec<f32>> = paragraph.lines.iter().map(lefts).collect();
    assert_eq!(actual, expected);
}
