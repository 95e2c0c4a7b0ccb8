//! Final assembly of the per-receipt parse result.

use std::collections::{BTreeMap, HashMap};

use crate::models::item::{
    ParseResult, ParseSummary, ParsedItem, SourceStage, UnresolvedLine, UnresolvedReason,
};

/// Merge both stages by line index, preserving receipt order. The fallback
/// stage only fills gaps, but if both stages somehow produced an item for
/// the same index the deterministic one wins. The unresolved list covers
/// every line index no item claimed, with its recorded reason.
pub fn assemble(
    deterministic: Vec<ParsedItem>,
    fallback: Vec<ParsedItem>,
    reasons: &HashMap<usize, UnresolvedReason>,
    total_lines: usize,
    warnings: Vec<String>,
    processing_time_ms: u64,
) -> ParseResult {
    let mut merged: BTreeMap<usize, ParsedItem> = BTreeMap::new();
    for item in fallback {
        merged.insert(item.line_index, item);
    }
    // Deterministic results are inserted last so they win collisions.
    for item in deterministic {
        merged.insert(item.line_index, item);
    }

    let unresolved: Vec<UnresolvedLine> = (0..total_lines)
        .filter(|index| !merged.contains_key(index))
        .map(|index| UnresolvedLine {
            index,
            reason: reasons
                .get(&index)
                .copied()
                .unwrap_or(UnresolvedReason::NoRuleMatch),
        })
        .collect();

    let items: Vec<ParsedItem> = merged.into_values().collect();
    let summary = ParseSummary {
        total_lines,
        deterministic: items
            .iter()
            .filter(|i| i.source_stage == SourceStage::Deterministic)
            .count(),
        fallback: items
            .iter()
            .filter(|i| i.source_stage == SourceStage::Fallback)
            .count(),
        unresolved: unresolved.len(),
    };

    ParseResult {
        items,
        unresolved,
        summary,
        warnings,
        processing_time_ms,
    }
}
