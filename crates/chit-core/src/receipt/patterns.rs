//! Common regex patterns for receipt normalization and tokenization.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Currency markers stripped during normalization; the first one seen
    // becomes the receipt-level currency hint.
    pub static ref CURRENCY_MARKER: Regex = Regex::new(
        r"(?i)[₹$€£]|\bINR\b|\bRs\b\.?"
    ).unwrap();

    // OCR noise at line edges: bullets, stray pipes from table borders,
    // and a leading dash used as a bullet (dash followed by whitespace).
    pub static ref LEADING_NOISE: Regex = Regex::new(
        r"^(?:[\s|•*·:>]+|-\s+)"
    ).unwrap();

    pub static ref TRAILING_NOISE: Regex = Regex::new(
        r"[\s|•*·:;,.]+$"
    ).unwrap();

    pub static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    // Glued pack notation ("5x6", "2×150") splits into number/separator/number.
    pub static ref GLUED_QUANTITY: Regex = Regex::new(
        r"^(\d+(?:[.,]\d+)?)[x×X](\d+(?:[.,]\d+)?)$"
    ).unwrap();

    // Glued magnitude+unit ("500ml") splits into number/unit when the
    // suffix is a known unit abbreviation.
    pub static ref GLUED_MAGNITUDE: Regex = Regex::new(
        r"^(\d+(?:[.,]\d+)?)([A-Za-z]+)$"
    ).unwrap();
}
