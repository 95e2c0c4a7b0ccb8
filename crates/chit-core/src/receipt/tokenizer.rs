//! Line normalization and typed tokenization of receipt text.

use std::collections::HashSet;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::models::item::RawLine;

use super::patterns::{
    CURRENCY_MARKER, GLUED_MAGNITUDE, GLUED_QUANTITY, LEADING_NOISE, TRAILING_NOISE, WHITESPACE,
};

/// Separator glyphs recognized between tokens. The multiplication variants
/// ("x", "X", "×") all normalize to `Times`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sep {
    Times,
    Dash,
    Equals,
    At,
}

/// One typed token derived from a receipt line.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Word(String),
    Number {
        /// Parsed decimal value.
        value: Decimal,
        /// Original text span, kept for diagnostics.
        span: String,
    },
    Unit(String),
    Separator(Sep),
}

/// Ordered tokens for one line. Owned by that line's parse and discarded
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct TokenSet {
    pub tokens: Vec<Token>,
}

impl TokenSet {
    /// Whether the line carries any numeric token at all. Lines without
    /// numbers skip the deterministic engine entirely.
    pub fn has_numbers(&self) -> bool {
        self.tokens
            .iter()
            .any(|t| matches!(t, Token::Number { .. }))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// A normalized receipt: its surviving lines plus the currency hint.
#[derive(Debug, Clone, Default)]
pub struct NormalizedReceipt {
    /// Non-empty lines, indexed by position.
    pub lines: Vec<RawLine>,

    /// First currency marker seen, if any.
    pub currency: Option<String>,
}

/// Immutable lookup table of known unit abbreviations, constructed at
/// startup and injected into the tokenizer so tests can substitute
/// alternate vocabularies.
#[derive(Debug, Clone)]
pub struct UnitLexicon {
    units: HashSet<String>,
}

/// Standard unit abbreviations seen on supplier receipts.
const STANDARD_UNITS: &[&str] = &[
    "kg", "g", "l", "ml", "pcs", "pc", "dozen", "doz", "packet", "box", "bowl", "carton",
];

impl Default for UnitLexicon {
    fn default() -> Self {
        Self::new(STANDARD_UNITS.iter().copied())
    }
}

impl UnitLexicon {
    /// Build a lexicon from unit abbreviations (matched case-insensitively).
    pub fn new<I, S>(units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            units: units.into_iter().map(|u| u.into().to_lowercase()).collect(),
        }
    }

    /// Whether the token is a known unit abbreviation.
    pub fn contains(&self, token: &str) -> bool {
        self.units.contains(&token.to_lowercase())
    }

    /// Whether a unit label is known, either directly ("kg") or as a
    /// derived magnitude label whose suffix is known ("500ml").
    pub fn is_known_label(&self, label: &str) -> bool {
        if self.contains(label) {
            return true;
        }
        let suffix: String = label
            .chars()
            .skip_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
            .collect();
        !suffix.is_empty() && suffix.len() < label.len() && self.contains(&suffix)
    }
}

/// Splits raw receipt text into logical lines and lines into typed tokens.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    lexicon: UnitLexicon,
}

impl Tokenizer {
    pub fn new(lexicon: UnitLexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &UnitLexicon {
        &self.lexicon
    }

    /// Split raw text into normalized lines: drop blanks, trim edge noise,
    /// strip currency markers (recording the first as the receipt hint),
    /// and collapse whitespace. Pure function of its input.
    pub fn normalize(&self, raw_text: &str) -> NormalizedReceipt {
        let mut receipt = NormalizedReceipt::default();

        for raw in raw_text.lines() {
            if let Some(m) = CURRENCY_MARKER.find(raw) {
                if receipt.currency.is_none() {
                    receipt.currency = Some(m.as_str().trim_end_matches('.').to_string());
                }
            }

            let mut line = CURRENCY_MARKER.replace_all(raw, " ").into_owned();
            loop {
                let trimmed = LEADING_NOISE.replace(&line, "").into_owned();
                let trimmed = TRAILING_NOISE.replace(&trimmed, "").into_owned();
                if trimmed == line {
                    break;
                }
                line = trimmed;
            }
            let text = WHITESPACE.replace_all(&line, " ").trim().to_string();

            if text.is_empty() {
                continue;
            }
            receipt.lines.push(RawLine {
                index: receipt.lines.len(),
                text,
            });
        }

        receipt
    }

    /// Split one line into typed tokens, keeping separators as their own
    /// tokens. Classification order: Number, Unit, Separator, Word.
    pub fn tokenize(&self, line: &RawLine) -> TokenSet {
        let mut tokens = Vec::new();

        for chunk in line.text.split_whitespace() {
            for piece in self.split_chunk(chunk) {
                tokens.push(self.classify(&piece));
            }
        }

        TokenSet { tokens }
    }

    fn classify(&self, piece: &str) -> Token {
        if let Some(value) = parse_number(piece) {
            return Token::Number {
                value,
                span: piece.to_string(),
            };
        }
        if self.lexicon.contains(piece) {
            return Token::Unit(piece.to_lowercase());
        }
        if let Some(sep) = separator_glyph(piece) {
            return Token::Separator(sep);
        }
        Token::Word(piece.to_string())
    }

    /// Break a whitespace-delimited chunk at glued notation: "5x6" becomes
    /// number/separator/number, "500ml" becomes number/unit when the suffix
    /// is known, and embedded "×"/"="/"@" glyphs split unconditionally.
    fn split_chunk(&self, chunk: &str) -> Vec<String> {
        let mut pieces = Vec::new();

        for part in split_glyphs(chunk) {
            if let Some(caps) = GLUED_QUANTITY.captures(&part) {
                pieces.push(caps[1].to_string());
                pieces.push("x".to_string());
                pieces.push(caps[2].to_string());
                continue;
            }
            if let Some(caps) = GLUED_MAGNITUDE.captures(&part) {
                if self.lexicon.contains(&caps[2]) {
                    pieces.push(caps[1].to_string());
                    pieces.push(caps[2].to_string());
                    continue;
                }
            }
            pieces.push(part);
        }

        pieces
    }
}

fn separator_glyph(piece: &str) -> Option<Sep> {
    match piece {
        "x" | "X" | "×" => Some(Sep::Times),
        "-" => Some(Sep::Dash),
        "=" => Some(Sep::Equals),
        "@" => Some(Sep::At),
        _ => None,
    }
}

fn split_glyphs(chunk: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for c in chunk.chars() {
        if matches!(c, '×' | '=' | '@') {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            pieces.push(c.to_string());
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}

/// Parse a decimal accepting both "." and "," markers. A comma followed by
/// exactly 1-2 digits at string end is a decimal marker; any other comma is
/// a thousands separator and stripped.
pub fn parse_number(s: &str) -> Option<Decimal> {
    if s.is_empty()
        || !s.chars().any(|c| c.is_ascii_digit())
        || !s.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
    {
        return None;
    }

    let normalized = match s.rfind(',') {
        Some(pos) => {
            let tail = &s[pos + 1..];
            if (1..=2).contains(&tail.len()) && tail.chars().all(|c| c.is_ascii_digit()) {
                // Decimal comma; any earlier commas or dots are grouping.
                let head: String = s[..pos].chars().filter(|c| c.is_ascii_digit()).collect();
                format!("{}.{}", head, tail)
            } else {
                s.replace(',', "")
            }
        }
        None => s.to_string(),
    };

    Decimal::from_str(&normalized).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_normalize_drops_blank_lines_and_noise() {
        let tokenizer = Tokenizer::default();
        let receipt = tokenizer.normalize("| Fresh Tomatoes 2 x 150 |\n\n   \n- Sugar 2 50 100,\n");

        assert_eq!(receipt.lines.len(), 2);
        assert_eq!(receipt.lines[0].text, "Fresh Tomatoes 2 x 150");
        assert_eq!(receipt.lines[0].index, 0);
        assert_eq!(receipt.lines[1].text, "Sugar 2 50 100");
        assert_eq!(receipt.lines[1].index, 1);
    }

    #[test]
    fn test_normalize_records_currency_hint() {
        let tokenizer = Tokenizer::default();
        let receipt = tokenizer.normalize("Milk 2 l Rs.96\nBread ₹40");

        assert_eq!(receipt.currency.as_deref(), Some("Rs"));
        assert_eq!(receipt.lines[0].text, "Milk 2 l 96");
        assert_eq!(receipt.lines[1].text, "Bread 40");
    }

    #[test]
    fn test_normalize_keeps_interior_dashes() {
        let tokenizer = Tokenizer::default();
        let receipt = tokenizer.normalize("5x6 - Parel Sheet - 180");

        assert_eq!(receipt.lines[0].text, "5x6 - Parel Sheet - 180");
    }

    #[test]
    fn test_tokenize_basic_line() {
        let tokenizer = Tokenizer::default();
        let line = RawLine {
            index: 0,
            text: "Fresh Tomatoes 2 x 150 = 300".to_string(),
        };

        let tokens = tokenizer.tokenize(&line);
        assert_eq!(
            tokens.tokens,
            vec![
                Token::Word("Fresh".to_string()),
                Token::Word("Tomatoes".to_string()),
                Token::Number {
                    value: dec("2"),
                    span: "2".to_string()
                },
                Token::Separator(Sep::Times),
                Token::Number {
                    value: dec("150"),
                    span: "150".to_string()
                },
                Token::Separator(Sep::Equals),
                Token::Number {
                    value: dec("300"),
                    span: "300".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_tokenize_glued_pack_notation() {
        let tokenizer = Tokenizer::default();
        let line = RawLine {
            index: 0,
            text: "5x6 - Parel Sheet - 180".to_string(),
        };

        let tokens = tokenizer.tokenize(&line);
        assert_eq!(tokens.tokens[0], Token::Number {
            value: dec("5"),
            span: "5".to_string()
        });
        assert_eq!(tokens.tokens[1], Token::Separator(Sep::Times));
        assert_eq!(tokens.tokens[2], Token::Number {
            value: dec("6"),
            span: "6".to_string()
        });
        assert_eq!(tokens.tokens[3], Token::Separator(Sep::Dash));
    }

    #[test]
    fn test_tokenize_glued_magnitude_unit() {
        let tokenizer = Tokenizer::default();
        let line = RawLine {
            index: 0,
            text: "Olive Oil 500ml 825".to_string(),
        };

        let tokens = tokenizer.tokenize(&line);
        assert_eq!(tokens.tokens[2], Token::Number {
            value: dec("500"),
            span: "500".to_string()
        });
        assert_eq!(tokens.tokens[3], Token::Unit("ml".to_string()));
    }

    #[test]
    fn test_unit_classification_is_case_insensitive() {
        let tokenizer = Tokenizer::default();
        let line = RawLine {
            index: 0,
            text: "Chicken 1.2 KG 1860".to_string(),
        };

        let tokens = tokenizer.tokenize(&line);
        assert_eq!(tokens.tokens[2], Token::Unit("kg".to_string()));
    }

    #[test]
    fn test_has_numbers() {
        let tokenizer = Tokenizer::default();
        let with = RawLine {
            index: 0,
            text: "Eggs 12".to_string(),
        };
        let without = RawLine {
            index: 1,
            text: "thank you come again".to_string(),
        };

        assert!(tokenizer.tokenize(&with).has_numbers());
        assert!(!tokenizer.tokenize(&without).has_numbers());
    }

    #[test]
    fn test_parse_number_comma_rules() {
        // Comma followed by 1-2 digits at end is a decimal marker.
        assert_eq!(parse_number("12,5"), Some(dec("12.5")));
        assert_eq!(parse_number("12,50"), Some(dec("12.50")));
        // Otherwise it is a thousands separator.
        assert_eq!(parse_number("1,860"), Some(dec("1860")));
        assert_eq!(parse_number("12,345,678"), Some(dec("12345678")));
        // Dot decimals pass through.
        assert_eq!(parse_number("1.2"), Some(dec("1.2")));
        assert_eq!(parse_number("1860"), Some(dec("1860")));
    }

    #[test]
    fn test_parse_number_rejects_non_numeric() {
        assert_eq!(parse_number("2a"), None);
        assert_eq!(parse_number("x"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number(","), None);
    }

    #[test]
    fn test_lexicon_substitution() {
        let lexicon = UnitLexicon::new(["sack"]);
        assert!(lexicon.contains("Sack"));
        assert!(!lexicon.contains("kg"));

        let tokenizer = Tokenizer::new(lexicon);
        let line = RawLine {
            index: 0,
            text: "Rice 2 sack 900".to_string(),
        };
        let tokens = tokenizer.tokenize(&line);
        assert_eq!(tokens.tokens[2], Token::Unit("sack".to_string()));
    }

    #[test]
    fn test_known_label_with_magnitude() {
        let lexicon = UnitLexicon::default();
        assert!(lexicon.is_known_label("kg"));
        assert!(lexicon.is_known_label("500ml"));
        assert!(!lexicon.is_known_label("500"));
        assert!(!lexicon.is_known_label("bundle"));
    }
}
