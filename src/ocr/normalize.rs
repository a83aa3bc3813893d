//! Text normalization for OCR output.
//!
//! Tesseract and PDF text layers frequently emit Arabic letter forms in
//! Sorani text (Arabic Yeh and Kaf instead of Farsi Yeh and Keheh), kashida
//! stretching, and stray control characters. This module folds them to the
//! forms used in Central Kurdish orthography.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::lang::{Language, LanguageSpec};

/// Options for text normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Normalize Unicode to NFC form
    pub normalize_unicode: bool,

    /// Fold Arabic letter variants to Kurdish ones (Sorani only)
    pub kurdish_letters: bool,

    /// Remove tatweel (U+0640) used for justification
    pub remove_tatweel: bool,

    /// Remove Private Use Area characters
    pub remove_pua: bool,

    /// Remove Unicode replacement character (U+FFFD)
    pub remove_replacement_char: bool,

    /// Remove control characters other than tab and newlines
    pub remove_control: bool,

    /// Collapse whitespace runs into single spaces
    pub collapse_whitespace: bool,
}

impl NormalizeOptions {
    /// Only Unicode NFC normalization.
    pub fn minimal() -> Self {
        Self {
            normalize_unicode: true,
            kurdish_letters: false,
            remove_tatweel: false,
            remove_pua: false,
            remove_replacement_char: false,
            remove_control: false,
            collapse_whitespace: false,
        }
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            kurdish_letters: true,
            remove_tatweel: true,
            remove_pua: true,
            remove_replacement_char: true,
            remove_control: true,
            collapse_whitespace: true,
        }
    }
}

/// Arabic letter forms and their Central Kurdish replacements.
const SORANI_LETTER_MAP: &[(char, char)] = &[
    ('\u{064A}', '\u{06CC}'), // ي ARABIC YEH -> ی FARSI YEH
    ('\u{0649}', '\u{06CC}'), // ى ALEF MAKSURA -> ی FARSI YEH
    ('\u{0643}', '\u{06A9}'), // ك ARABIC KAF -> ک KEHEH
];

/// Text normalizer.
pub struct TextNormalizer {
    options: NormalizeOptions,
    kurdish: bool,
    whitespace_regex: Regex,
}

impl TextNormalizer {
    /// Create a normalizer for a language spec.
    ///
    /// Kurdish letter folding is only enabled when the languages include Sorani.
    pub fn new(options: NormalizeOptions, language: &LanguageSpec) -> Self {
        let kurdish = options.kurdish_letters && language.contains(&Language::Sorani);
        Self {
            options,
            kurdish,
            whitespace_regex: Regex::new(r"\s+").expect("static whitespace pattern"),
        }
    }

    /// Normalize a piece of text.
    pub fn normalize(&self, text: &str) -> String {
        let mut result: String = if self.options.normalize_unicode {
            text.nfc().collect()
        } else {
            text.to_string()
        };

        if self.kurdish {
            result = result
                .chars()
                .map(|c| {
                    SORANI_LETTER_MAP
                        .iter()
                        .find(|(from, _)| *from == c)
                        .map(|(_, to)| *to)
                        .unwrap_or(c)
                })
                .collect();
        }

        result.retain(|c| {
            let code = c as u32;
            !(self.options.remove_tatweel && c == '\u{0640}')
                && !(self.options.remove_replacement_char && c == '\u{FFFD}')
                && !(self.options.remove_control
                    && c.is_control()
                    && !matches!(c, '\t' | '\n' | '\r'))
                && !(self.options.remove_pua
                    && ((0xE000..=0xF8FF).contains(&code)
                        || (0xF0000..=0xFFFFD).contains(&code)
                        || (0x100000..=0x10FFFD).contains(&code)))
        });

        if self.options.collapse_whitespace {
            result = self
                .whitespace_regex
                .replace_all(result.trim(), " ")
                .to_string();
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorani() -> LanguageSpec {
        LanguageSpec::parse("ckb+eng").unwrap()
    }

    #[test]
    fn test_sorani_letter_folding() {
        let normalizer = TextNormalizer::new(NormalizeOptions::default(), &sorani());
        assert_eq!(normalizer.normalize("كوردي"), "کوردی");
    }

    #[test]
    fn test_arabic_letters_untouched_without_sorani() {
        let spec = LanguageSpec::parse("ara").unwrap();
        let normalizer = TextNormalizer::new(NormalizeOptions::default(), &spec);
        assert_eq!(normalizer.normalize("كتابي"), "كتابي");
    }

    #[test]
    fn test_tatweel_and_whitespace() {
        let normalizer = TextNormalizer::new(NormalizeOptions::default(), &sorani());
        assert_eq!(normalizer.normalize("  سـلاو \t  جیهان\n"), "سلاو جیهان");
    }

    #[test]
    fn test_replacement_and_pua_removed() {
        let normalizer = TextNormalizer::new(NormalizeOptions::default(), &sorani());
        assert_eq!(normalizer.normalize("a\u{FFFD}b\u{E000}c"), "abc");
    }

    #[test]
    fn test_control_characters_removed() {
        let normalizer = TextNormalizer::new(NormalizeOptions::default(), &sorani());
        assert_eq!(normalizer.normalize("abc\u{2}def\u{7F} ghi"), "abcdef ghi");

        let minimal = TextNormalizer::new(NormalizeOptions::minimal(), &sorani());
        assert_eq!(minimal.normalize("a\u{2}b"), "a\u{2}b");
    }

    #[test]
    fn test_nfc() {
        let normalizer = TextNormalizer::new(NormalizeOptions::minimal(), &sorani());
        // e + combining acute -> é
        assert_eq!(normalizer.normalize("e\u{0301}"), "\u{00E9}");
        // minimal keeps Arabic letter forms
        assert_eq!(normalizer.normalize("ك"), "ك");
    }
}
