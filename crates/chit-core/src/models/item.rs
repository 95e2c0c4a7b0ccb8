//! Line-item data models produced by the extraction pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One receipt line with its 0-based position. Immutable once produced
/// by normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// Position in the receipt after dropping empty lines.
    pub index: usize,

    /// Normalized line text.
    pub text: String,
}

/// Which stage of the pipeline produced an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStage {
    /// The rule/pattern-based parser that runs first.
    Deterministic,
    /// The external parsing collaborator.
    Fallback,
}

/// One resolved purchase line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedItem {
    /// Item name.
    pub name: String,

    /// Purchased quantity. Always positive.
    pub quantity: Decimal,

    /// Unit of measure, when one was recognized on the line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Price per unit, when the line carried or implied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,

    /// Line total. Never negative.
    pub total: Decimal,

    /// Stage that produced this item.
    pub source_stage: SourceStage,

    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,

    /// 0-based position of the source line in the receipt.
    pub line_index: usize,
}

impl ParsedItem {
    /// Check the item invariants, returning a list of violations.
    ///
    /// Arithmetic consistency between quantity, unit price, and total is a
    /// scorer target, not an invariant, so it is not checked here.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.name.trim().is_empty() {
            issues.push("item name is empty".to_string());
        }
        if self.quantity <= Decimal::ZERO {
            issues.push(format!("quantity {} is not positive", self.quantity));
        }
        if self.total < Decimal::ZERO {
            issues.push(format!("total {} is negative", self.total));
        }
        if let Some(price) = self.unit_price {
            if price < Decimal::ZERO {
                issues.push(format!("unit price {} is negative", price));
            }
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            issues.push(format!("confidence {} is out of range", self.confidence));
        }

        issues
    }
}

/// Why a line ended up unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// The line carried no numeric tokens at all.
    NoNumbers,
    /// No grammar rule matched, or disambiguation rejected every assignment.
    NoRuleMatch,
    /// A rule matched but the scored confidence fell below the threshold.
    LowConfidence,
    /// The fallback collaborator errored or timed out for this batch.
    FallbackUnavailable,
    /// The fallback collaborator declined to parse this line.
    FallbackDeclined,
    /// The fallback collaborator returned an item failing the invariants.
    MalformedFallbackItem,
}

/// A line no stage could confidently parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedLine {
    /// 0-based position in the receipt.
    pub index: usize,

    /// Why the line was left unresolved.
    pub reason: UnresolvedReason,
}

/// Per-stage counts for one parsed receipt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseSummary {
    /// Lines in the normalized receipt.
    pub total_lines: usize,

    /// Items resolved by the deterministic stage.
    pub deterministic: usize,

    /// Items resolved by the fallback stage.
    pub fallback: usize,

    /// Lines left unresolved.
    pub unresolved: usize,
}

/// The full output for one receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
    /// Resolved items, ordered by line index.
    pub items: Vec<ParsedItem>,

    /// Lines no stage could resolve, with their reasons.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<UnresolvedLine>,

    /// Per-stage counts.
    pub summary: ParseSummary,

    /// Diagnostics collected during parsing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ParseResult {
    /// The result for a blank receipt: success with nothing in it.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            unresolved: Vec::new(),
            summary: ParseSummary::default(),
            warnings: Vec::new(),
            processing_time_ms: 0,
        }
    }
}
