//! Numeric disambiguation for bare-number lines.
//!
//! A line like "Sugar 2 50 100" matches structurally but admits several
//! assignments of its numbers to quantity, unit price, and total. This
//! module enumerates the admissible assignments and picks the one with the
//! best arithmetic consistency, or refuses when none is convincing.

use rust_decimal::Decimal;

use super::score::arithmetic_score;

/// A resolved assignment of three numbers to the semantic fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total: Decimal,
}

/// Index permutations as (quantity, unit_price, total). The in-order
/// reading comes first and only a strictly better score replaces the
/// current best, so exact ties resolve to the left-to-right interpretation.
const PERMUTATIONS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

/// Enumerate assignments where quantity and unit price are each at most the
/// total (totals are typically the largest number on a supplier line),
/// score each by arithmetic consistency, and pick the best. Every score
/// below `floor` means the line reverts to the no-match path instead of
/// accepting a poor guess.
pub fn disambiguate(numbers: &[Decimal; 3], floor: f32) -> Option<Assignment> {
    let mut best: Option<(f32, Assignment)> = None;

    for [qi, pi, ti] in PERMUTATIONS {
        let (quantity, unit_price, total) = (numbers[qi], numbers[pi], numbers[ti]);
        if quantity <= Decimal::ZERO || quantity > total || unit_price > total {
            continue;
        }

        let score = arithmetic_score(quantity, unit_price, total);
        if best.as_ref().is_none_or(|(s, _)| score > *s) {
            best = Some((
                score,
                Assignment {
                    quantity,
                    unit_price,
                    total,
                },
            ));
        }
    }

    best.filter(|(score, _)| *score >= floor)
        .map(|(_, assignment)| assignment)
}
