//! Confidence scoring for parsed line items.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::rules::LineDraft;
use super::tokenizer::UnitLexicon;

/// Floor for the consistency denominator so zero totals do not divide out.
const EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01

/// Arithmetic consistency of quantity, unit price, and total:
/// `1 - |q*p - t| / max(t, epsilon)`, clamped to [0, 1].
pub fn arithmetic_score(quantity: Decimal, unit_price: Decimal, total: Decimal) -> f32 {
    let denominator = total.max(EPSILON);
    let ratio = ((quantity * unit_price - total).abs() / denominator)
        .to_f64()
        .unwrap_or(1.0);
    (1.0 - ratio as f32).clamp(0.0, 1.0)
}

/// Score a deterministic draft before it is accepted.
pub fn score_draft(draft: &LineDraft, lexicon: &UnitLexicon) -> f32 {
    score_fields(
        &draft.name,
        draft.unit.as_deref(),
        draft.quantity,
        draft.unit_price,
        draft.total,
        lexicon,
    )
}

/// Unweighted mean of the terms that apply:
/// - arithmetic consistency, skipped entirely when no unit price is present
/// - unit recognition: 1.0 for a known (or absent) unit, 0.5 for an
///   unrecognized string that survived tokenization
/// - name plausibility: at least one alphabetic word and two characters
pub fn score_fields(
    name: &str,
    unit: Option<&str>,
    quantity: Decimal,
    unit_price: Option<Decimal>,
    total: Decimal,
    lexicon: &UnitLexicon,
) -> f32 {
    let mut terms = Vec::with_capacity(3);

    if let Some(price) = unit_price {
        terms.push(arithmetic_score(quantity, price, total));
    }

    terms.push(match unit {
        None => 1.0,
        Some(u) if lexicon.is_known_label(u) => 1.0,
        Some(_) => 0.5,
    });

    terms.push(if name_plausible(name) { 1.0 } else { 0.0 });

    terms.iter().sum::<f32>() / terms.len() as f32
}

fn name_plausible(name: &str) -> bool {
    name.trim().len() >= 2
        && name
            .split_whitespace()
            .any(|word| word.chars().any(char::is_alphabetic))
}
