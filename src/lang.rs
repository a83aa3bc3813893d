//! Language codes, language specs and text direction.
//!
//! Language codes follow Tesseract's traineddata names. A [`LanguageSpec`]
//! combines several codes with `+` (`ckb+ara+eng`); the first one is the
//! primary language and drives direction decisions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unicode_bidi::{bidi_class, BidiClass};

use crate::error::{Error, Result};

/// Paragraph or line text direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Left-to-right (Latin script)
    #[default]
    Ltr,
    /// Right-to-left (Arabic script)
    Rtl,
}

impl Direction {
    /// Check if this is right-to-left.
    pub fn is_rtl(self) -> bool {
        self == Direction::Rtl
    }
}

/// A single OCR language.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Language {
    /// Central Kurdish, Arabic script (`ckb`)
    Sorani,
    /// Northern Kurdish, Latin script (`kmr`)
    Kurmanji,
    /// Arabic (`ara`)
    Arabic,
    /// English (`eng`)
    English,
    /// Any other Tesseract language code
    Other(String),
}

impl Language {
    /// Tesseract language code.
    pub fn code(&self) -> &str {
        match self {
            Language::Sorani => "ckb",
            Language::Kurmanji => "kmr",
            Language::Arabic => "ara",
            Language::English => "eng",
            Language::Other(code) => code,
        }
    }

    /// Whether lines in this language are always laid out right-to-left,
    /// regardless of what script detection finds.
    pub fn is_configured_rtl(&self) -> bool {
        matches!(self, Language::Sorani)
    }

    /// Resolve the direction of a piece of text in this language.
    ///
    /// Sorani is always right-to-left. Every other language is
    /// left-to-right unless the text is predominantly right-to-left script.
    pub fn direction_for(&self, text: &str) -> Direction {
        if self.is_configured_rtl() {
            return Direction::Rtl;
        }
        detect_script_direction(text).unwrap_or(Direction::Ltr)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim().to_ascii_lowercase();
        match code.as_str() {
            "ckb" => Ok(Language::Sorani),
            "kmr" => Ok(Language::Kurmanji),
            "ara" => Ok(Language::Arabic),
            "eng" => Ok(Language::English),
            _ if is_valid_code(&code) => Ok(Language::Other(code)),
            _ => Err(Error::InvalidLanguage(s.to_string())),
        }
    }
}

impl From<Language> for String {
    fn from(lang: Language) -> Self {
        lang.code().to_string()
    }
}

impl TryFrom<String> for Language {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Tesseract codes are lowercase ASCII with optional `_` suffixes
/// (`chi_sim`, `script/Arabic` is not accepted here).
fn is_valid_code(code: &str) -> bool {
    code.len() >= 3
        && code
            .chars()
            .all(|c| c.is_ascii_lowercase() || c == '_')
        && !code.starts_with('_')
}

/// An ordered, non-empty list of OCR languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct LanguageSpec {
    languages: Vec<Language>,
}

impl LanguageSpec {
    /// Create a spec from a single language.
    pub fn single(language: Language) -> Self {
        Self {
            languages: vec![language],
        }
    }

    /// Parse a spec such as `ckb+ara+eng`.
    pub fn parse(spec: &str) -> Result<Self> {
        let mut languages: Vec<Language> = Vec::new();
        for part in spec.split('+') {
            if part.trim().is_empty() {
                continue;
            }
            let lang: Language = part.parse()?;
            if !languages.contains(&lang) {
                languages.push(lang);
            }
        }

        if languages.is_empty() {
            return Err(Error::InvalidLanguage(spec.to_string()));
        }

        Ok(Self { languages })
    }

    /// The first language in the list.
    pub fn primary(&self) -> &Language {
        &self.languages[0]
    }

    /// All languages in order.
    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    /// Check whether a language is in the list.
    pub fn contains(&self, language: &Language) -> bool {
        self.languages.contains(language)
    }

    /// Codes joined with `+`, as expected by tesseract and ocrmypdf.
    pub fn tesseract_arg(&self) -> String {
        self.languages
            .iter()
            .map(Language::code)
            .collect::<Vec<_>>()
            .join("+")
    }

    /// Direction for a piece of text, decided by the primary language.
    pub fn direction_for(&self, text: &str) -> Direction {
        self.primary().direction_for(text)
    }
}

impl Default for LanguageSpec {
    fn default() -> Self {
        Self::single(Language::Sorani)
    }
}

impl fmt::Display for LanguageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tesseract_arg())
    }
}

impl FromStr for LanguageSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<LanguageSpec> for String {
    fn from(spec: LanguageSpec) -> Self {
        spec.tesseract_arg()
    }
}

impl TryFrom<String> for LanguageSpec {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

/// Detect the dominant direction of a text from its strong characters.
///
/// Returns `None` when the text has no strongly-directional characters
/// (digits, punctuation, whitespace only).
pub fn detect_script_direction(text: &str) -> Option<Direction> {
    let mut rtl = 0usize;
    let mut ltr = 0usize;

    for c in text.chars() {
        match bidi_class(c) {
            BidiClass::R | BidiClass::AL => rtl += 1,
            BidiClass::L => ltr += 1,
            _ => {}
        }
    }

    if rtl == 0 && ltr == 0 {
        None
    } else if rtl > ltr {
        Some(Direction::Rtl)
    } else {
        Some(Direction::Ltr)
    }
}
