//! The end-to-end receipt parsing pipeline.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, info, warn};

use chit_fallback::{FallbackBackend, NullBackend};

use crate::error::Result;
use crate::models::config::ChitConfig;
use crate::models::item::{ParseResult, ParsedItem, RawLine, SourceStage, UnresolvedReason};

use super::assemble::assemble;
use super::disambiguate::disambiguate;
use super::fallback::{FallbackOrchestrator, FallbackOutcome};
use super::rules::RuleSet;
use super::score::score_draft;
use super::tokenizer::{Tokenizer, UnitLexicon};

/// Deterministic pattern parser plus optional fallback orchestration.
///
/// Parsing one receipt is purely computational except for the single
/// batched fallback call, which is the only suspension point. A pipeline
/// without a fallback orchestrator never suspends.
pub struct ReceiptPipeline<B: FallbackBackend = NullBackend> {
    tokenizer: Tokenizer,
    rules: RuleSet,
    min_confidence: f32,
    disambiguation_floor: f32,
    fallback: Option<FallbackOrchestrator<B>>,
}

impl ReceiptPipeline<NullBackend> {
    /// Create a deterministic-only pipeline with the built-in rules and
    /// default thresholds.
    pub fn new() -> Self {
        Self {
            tokenizer: Tokenizer::default(),
            rules: RuleSet::builtin(),
            min_confidence: 0.5,
            disambiguation_floor: 0.85,
            fallback: None,
        }
    }

    /// Build a pipeline from configuration, validating thresholds.
    pub fn from_config(config: &ChitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new()
            .with_min_confidence(config.engine.min_confidence)
            .with_disambiguation_floor(config.engine.disambiguation_floor))
    }
}

impl Default for ReceiptPipeline<NullBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: FallbackBackend> ReceiptPipeline<B> {
    /// Set the confidence below which deterministic matches are demoted.
    pub fn with_min_confidence(mut self, confidence: f32) -> Self {
        self.min_confidence = confidence;
        self
    }

    /// Set the acceptance floor of the numeric disambiguator.
    pub fn with_disambiguation_floor(mut self, floor: f32) -> Self {
        self.disambiguation_floor = floor;
        self
    }

    /// Substitute the unit vocabulary.
    pub fn with_units(mut self, lexicon: UnitLexicon) -> Self {
        self.tokenizer = Tokenizer::new(lexicon);
        self
    }

    /// Substitute the grammar rules.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Attach a fallback orchestrator for lines the deterministic stage
    /// rejects.
    pub fn with_fallback<B2: FallbackBackend>(
        self,
        orchestrator: FallbackOrchestrator<B2>,
    ) -> ReceiptPipeline<B2> {
        ReceiptPipeline {
            tokenizer: self.tokenizer,
            rules: self.rules,
            min_confidence: self.min_confidence,
            disambiguation_floor: self.disambiguation_floor,
            fallback: Some(orchestrator),
        }
    }

    /// Parse one receipt's OCR text into ordered line items.
    ///
    /// Data-quality problems never fail the parse: unresolvable lines are
    /// recorded in the unresolved list and the result is returned either
    /// way. Blank input yields an empty result immediately.
    pub async fn parse(&self, text: &str) -> ParseResult {
        let start = Instant::now();

        if text.trim().is_empty() {
            debug!("blank receipt text");
            return ParseResult::empty();
        }

        let receipt = self.tokenizer.normalize(text);
        let total_lines = receipt.lines.len();
        info!("parsing receipt with {} lines", total_lines);

        let mut warnings = Vec::new();
        let mut deterministic = Vec::new();
        let mut reasons: HashMap<usize, UnresolvedReason> = HashMap::new();
        let mut batch: Vec<RawLine> = Vec::new();

        for line in &receipt.lines {
            match self.parse_line(line) {
                Ok(item) => deterministic.push(item),
                Err(reason) => {
                    reasons.insert(line.index, reason);
                    batch.push(line.clone());
                }
            }
        }

        let mut fallback_items = Vec::new();
        if !batch.is_empty() {
            if let Some(orchestrator) = &self.fallback {
                match orchestrator
                    .resolve(&batch, receipt.currency.as_deref(), self.tokenizer.lexicon())
                    .await
                {
                    Ok(outcomes) => {
                        for (line, outcome) in batch.iter().zip(outcomes) {
                            match outcome {
                                FallbackOutcome::Resolved(item) => fallback_items.push(item),
                                FallbackOutcome::Declined => {
                                    reasons.insert(line.index, UnresolvedReason::FallbackDeclined);
                                }
                                FallbackOutcome::Rejected(reason) => {
                                    warnings.push(format!("line {}: {}", line.index, reason));
                                    reasons.insert(
                                        line.index,
                                        UnresolvedReason::MalformedFallbackItem,
                                    );
                                }
                            }
                        }
                    }
                    Err(e) => {
                        warn!("fallback unavailable: {}", e);
                        warnings.push(format!("fallback unavailable: {}", e));
                        for line in &batch {
                            reasons.insert(line.index, UnresolvedReason::FallbackUnavailable);
                        }
                    }
                }
            }
        }

        let result = assemble(
            deterministic,
            fallback_items,
            &reasons,
            total_lines,
            warnings,
            start.elapsed().as_millis() as u64,
        );

        debug!(
            "parsed {} items ({} deterministic, {} fallback), {} unresolved",
            result.items.len(),
            result.summary.deterministic,
            result.summary.fallback,
            result.summary.unresolved
        );

        result
    }

    /// One line through the deterministic stage. `Err` carries the reason
    /// the line is being routed to fallback.
    fn parse_line(&self, line: &RawLine) -> std::result::Result<ParsedItem, UnresolvedReason> {
        let tokens = self.tokenizer.tokenize(line);

        // Lines without numbers skip the engine and go straight to fallback.
        if !tokens.has_numbers() {
            return Err(UnresolvedReason::NoNumbers);
        }

        let matched = self
            .rules
            .match_line(&tokens)
            .ok_or(UnresolvedReason::NoRuleMatch)?;
        let mut draft = matched.draft;

        if let Some(numbers) = draft.provisional.take() {
            let assignment = disambiguate(&numbers, self.disambiguation_floor)
                .ok_or(UnresolvedReason::NoRuleMatch)?;
            draft.quantity = assignment.quantity;
            draft.unit_price = Some(assignment.unit_price);
            draft.total = assignment.total;
        }

        let confidence = score_draft(&draft, self.tokenizer.lexicon());
        if confidence < self.min_confidence {
            debug!(
                "line {} ({}) demoted with confidence {:.2}",
                line.index, matched.rule, confidence
            );
            return Err(UnresolvedReason::LowConfidence);
        }

        Ok(ParsedItem {
            name: draft.name,
            quantity: draft.quantity,
            unit: draft.unit,
            unit_price: draft.unit_price,
            total: draft.total,
            source_stage: SourceStage::Deterministic,
            confidence,
            line_index: line.index,
        })
    }
}
