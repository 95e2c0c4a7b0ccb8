//! Built-in grammar rules for supplier receipt lines.
//!
//! Declared most specific first; `pack-of-packs` carries three
//! distinguishing separators and is declared ahead of the separator-free
//! `bare-triple`, which resolves the precedence between them.

use rust_decimal::Decimal;

use crate::receipt::tokenizer::Sep;

use super::{GrammarRule, LineDraft, MatchedParts, TokenPat};

const TIMES_OR_AT: &[Sep] = &[Sep::Times, Sep::At];
const TIMES: &[Sep] = &[Sep::Times];
const DASH: &[Sep] = &[Sep::Dash];

/// Small metric units where a large integer before them reads as a package
/// size ("500 ml") rather than a purchase quantity. Bulk purchases of kg or
/// litres are routine, so those never trigger the magnitude reading.
const SMALL_METRIC_UNITS: &[&str] = &["g", "ml"];

const MAGNITUDE_THRESHOLD: Decimal = Decimal::ONE_HUNDRED;

/// The "2 x 150 = 300" shape, with "@" accepted for "2 @ 150 = 300".
const QTY_PRICE_TOTAL: &[TokenPat] = &[
    TokenPat::Words,
    TokenPat::Number,
    TokenPat::Sep(TIMES_OR_AT),
    TokenPat::Number,
    TokenPat::OptSep(Sep::Equals),
    TokenPat::Number,
];

/// The "2 x 150" shape without an explicit total.
const QTY_PRICE: &[TokenPat] = &[
    TokenPat::Words,
    TokenPat::Number,
    TokenPat::Sep(TIMES_OR_AT),
    TokenPat::Number,
];

/// The "5x6 - Parel Sheet - 180" pack-of-packs shape.
const PACK_OF_PACKS: &[TokenPat] = &[
    TokenPat::Number,
    TokenPat::Sep(TIMES),
    TokenPat::Number,
    TokenPat::Sep(DASH),
    TokenPat::Words,
    TokenPat::Sep(DASH),
    TokenPat::Number,
];

/// The fully columnar "Basmati Rice 5 kg 120 600" shape.
const QTY_UNIT_PRICE_TOTAL: &[TokenPat] = &[
    TokenPat::Words,
    TokenPat::Number,
    TokenPat::Unit,
    TokenPat::Number,
    TokenPat::Number,
];

/// The "1.2 kg 1860" shape, shared with the "500 ml 825" magnitude reading.
const QTY_UNIT_TOTAL: &[TokenPat] = &[
    TokenPat::Words,
    TokenPat::Number,
    TokenPat::Unit,
    TokenPat::Number,
];

/// The separator-free numeric triple; assignment is decided later.
const BARE_TRIPLE: &[TokenPat] = &[
    TokenPat::Words,
    TokenPat::Number,
    TokenPat::Number,
    TokenPat::Number,
];

pub fn builtin_rules() -> Vec<GrammarRule> {
    vec![
        GrammarRule::new("qty-price-total", QTY_PRICE_TOTAL, map_qty_price_total),
        GrammarRule::new("qty-price", QTY_PRICE, map_qty_price),
        GrammarRule::new("pack-of-packs", PACK_OF_PACKS, map_pack_of_packs),
        GrammarRule::new(
            "qty-unit-price-total",
            QTY_UNIT_PRICE_TOTAL,
            map_qty_unit_price_total,
        ),
        GrammarRule::new("qty-unit-total", QTY_UNIT_TOTAL, map_qty_unit_total),
        GrammarRule::new("bare-triple", BARE_TRIPLE, map_bare_triple),
    ]
}

fn map_qty_price_total(parts: &MatchedParts) -> Option<LineDraft> {
    let quantity = parts.numbers[0];
    if quantity <= Decimal::ZERO {
        return None;
    }
    Some(LineDraft {
        name: parts.name.clone(),
        quantity,
        unit: None,
        unit_price: Some(parts.numbers[1]),
        total: parts.numbers[2],
        provisional: None,
    })
}

fn map_qty_price(parts: &MatchedParts) -> Option<LineDraft> {
    let quantity = parts.numbers[0];
    if quantity <= Decimal::ZERO {
        return None;
    }
    let unit_price = parts.numbers[1];
    Some(LineDraft {
        name: parts.name.clone(),
        quantity,
        unit: None,
        unit_price: Some(unit_price),
        total: quantity * unit_price,
        provisional: None,
    })
}

fn map_pack_of_packs(parts: &MatchedParts) -> Option<LineDraft> {
    // Composite pack count: packs times units per pack.
    let quantity = parts.numbers[0] * parts.numbers[1];
    if quantity <= Decimal::ZERO {
        return None;
    }
    Some(LineDraft {
        name: parts.name.clone(),
        quantity,
        unit: None,
        unit_price: None,
        total: parts.numbers[2],
        provisional: None,
    })
}

fn map_qty_unit_price_total(parts: &MatchedParts) -> Option<LineDraft> {
    let quantity = parts.numbers[0];
    if quantity <= Decimal::ZERO {
        return None;
    }
    Some(LineDraft {
        name: parts.name.clone(),
        quantity,
        unit: parts.unit.clone(),
        unit_price: Some(parts.numbers[1]),
        total: parts.numbers[2],
        provisional: None,
    })
}

fn map_qty_unit_total(parts: &MatchedParts) -> Option<LineDraft> {
    let first = parts.numbers[0];
    if first <= Decimal::ZERO {
        return None;
    }
    let unit = parts.unit.as_deref().unwrap_or_default();

    if is_package_magnitude(first, unit) {
        // "Olive Oil 500 ml 825": one package whose size labels the unit.
        return Some(LineDraft {
            name: parts.name.clone(),
            quantity: Decimal::ONE,
            unit: Some(format!("{}{}", first.normalize(), unit)),
            unit_price: None,
            total: parts.numbers[1],
            provisional: None,
        });
    }

    // "Chicken Breast 1.2 kg 1860": a plain quantity with no unit price.
    Some(LineDraft {
        name: parts.name.clone(),
        quantity: first,
        unit: parts.unit.clone(),
        unit_price: None,
        total: parts.numbers[1],
        provisional: None,
    })
}

fn map_bare_triple(parts: &MatchedParts) -> Option<LineDraft> {
    Some(LineDraft {
        name: parts.name.clone(),
        quantity: Decimal::ONE,
        unit: None,
        unit_price: None,
        total: Decimal::ZERO,
        provisional: Some([parts.numbers[0], parts.numbers[1], parts.numbers[2]]),
    })
}

fn is_package_magnitude(value: Decimal, unit: &str) -> bool {
    value.fract().is_zero()
        && value >= MAGNITUDE_THRESHOLD
        && SMALL_METRIC_UNITS.contains(&unit)
}
