//! Fallback orchestration for lines the deterministic engine rejects.
//!
//! All rejected lines of one receipt are batched into a single request to
//! the external parsing collaborator, bounding round-trips to one per
//! receipt. The wait is bounded and never retried; every returned item is
//! validated before admission. Dropping the in-flight future abandons the
//! request with no compensating action.

use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use chit_fallback::{FallbackBackend, FallbackError, FallbackItem, FallbackRequest};

use crate::error::Result;
use crate::models::item::{ParsedItem, RawLine, SourceStage};

use super::score::score_fields;
use super::tokenizer::UnitLexicon;

/// Default bounded wait for the batched call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Per-line outcome of one fallback batch.
#[derive(Debug, Clone)]
pub enum FallbackOutcome {
    /// The collaborator parsed the line and the item passed validation.
    Resolved(ParsedItem),
    /// The collaborator declined the line (a `null` response entry).
    Declined,
    /// The returned item failed the invariants and was dropped.
    Rejected(String),
}

/// Submits unresolved lines to a fallback backend and validates the result.
pub struct FallbackOrchestrator<B: FallbackBackend> {
    backend: B,
    timeout: Duration,
}

impl<B: FallbackBackend> FallbackOrchestrator<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the bounded wait for the batched call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Submit one batch of rejected lines, in original order. A timeout or
    /// transport failure returns `Err` and the caller marks the whole batch
    /// unavailable; the parse as a whole still succeeds.
    pub async fn resolve(
        &self,
        batch: &[RawLine],
        currency: Option<&str>,
        lexicon: &UnitLexicon,
    ) -> Result<Vec<FallbackOutcome>> {
        let request = FallbackRequest {
            lines: batch.iter().map(|line| line.text.clone()).collect(),
            currency: currency.map(str::to_string),
        };

        debug!("submitting {} unresolved lines to fallback", batch.len());

        let response = timeout(self.timeout, self.backend.resolve(&request))
            .await
            .map_err(|_| FallbackError::Timeout(self.timeout.as_millis() as u64))??;

        if response.items.len() != batch.len() {
            return Err(FallbackError::Malformed(format!(
                "expected {} items, got {}",
                batch.len(),
                response.items.len()
            ))
            .into());
        }

        let outcomes = batch
            .iter()
            .zip(response.items)
            .map(|(line, item)| match item {
                Some(item) => admit(line, item, lexicon),
                None => FallbackOutcome::Declined,
            })
            .collect();

        Ok(outcomes)
    }
}

/// Validate one returned item against the ParsedItem invariants. The
/// collaborator reports unit prices; the line total is computed from them.
fn admit(line: &RawLine, item: FallbackItem, lexicon: &UnitLexicon) -> FallbackOutcome {
    let name = item.item_name.trim().to_string();
    let unit = match item.unit.trim() {
        "" => None,
        u => Some(u.to_string()),
    };
    let total = item.quantity * item.unit_price;

    let candidate = ParsedItem {
        confidence: score_fields(
            &name,
            unit.as_deref(),
            item.quantity,
            Some(item.unit_price),
            total,
            lexicon,
        ),
        name,
        quantity: item.quantity,
        unit,
        unit_price: Some(item.unit_price),
        total,
        source_stage: SourceStage::Fallback,
        line_index: line.index,
    };

    let issues = candidate.validate();
    if issues.is_empty() {
        FallbackOutcome::Resolved(candidate)
    } else {
        let reason = issues.join("; ");
        warn!("dropping fallback item for line {}: {}", line.index, reason);
        FallbackOutcome::Rejected(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chit_fallback::{FallbackResponse, NullBackend};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(index: usize, text: &str) -> RawLine {
        RawLine {
            index,
            text: text.to_string(),
        }
    }

    /// Backend answering from a canned response.
    struct FixtureBackend {
        response: FallbackResponse,
    }

    impl FallbackBackend for FixtureBackend {
        async fn resolve(
            &self,
            _request: &FallbackRequest,
        ) -> chit_fallback::Result<FallbackResponse> {
            Ok(self.response.clone())
        }
    }

    /// Backend that never answers, for timeout tests.
    struct StalledBackend;

    impl FallbackBackend for StalledBackend {
        async fn resolve(
            &self,
            _request: &FallbackRequest,
        ) -> chit_fallback::Result<FallbackResponse> {
            std::future::pending().await
        }
    }

    fn fixture_item(name: &str, quantity: &str, unit: &str, price: &str) -> FallbackItem {
        FallbackItem {
            item_name: name.to_string(),
            quantity: dec(quantity),
            unit: unit.to_string(),
            unit_price: dec(price),
        }
    }

    #[tokio::test]
    async fn test_valid_items_are_admitted_in_order() {
        let orchestrator = FallbackOrchestrator::new(FixtureBackend {
            response: FallbackResponse {
                items: vec![
                    Some(fixture_item("Basmati Rice", "5", "kg", "120")),
                    None,
                ],
            },
        });
        let batch = [line(3, "Basmati Rce 5 kg ???"), line(7, "smudged")];
        let lexicon = UnitLexicon::default();

        let outcomes = orchestrator.resolve(&batch, Some("Rs"), &lexicon).await.unwrap();
        assert_eq!(outcomes.len(), 2);

        let FallbackOutcome::Resolved(item) = &outcomes[0] else {
            panic!("expected resolved item");
        };
        assert_eq!(item.name, "Basmati Rice");
        assert_eq!(item.total, dec("600"));
        assert_eq!(item.source_stage, SourceStage::Fallback);
        assert_eq!(item.line_index, 3);

        assert!(matches!(outcomes[1], FallbackOutcome::Declined));
    }

    #[tokio::test]
    async fn test_malformed_item_is_rejected() {
        let orchestrator = FallbackOrchestrator::new(FixtureBackend {
            response: FallbackResponse {
                items: vec![Some(fixture_item("", "0", "", "-5"))],
            },
        });
        let batch = [line(0, "???")];

        let outcomes = orchestrator
            .resolve(&batch, None, &UnitLexicon::default())
            .await
            .unwrap();
        assert!(matches!(outcomes[0], FallbackOutcome::Rejected(_)));
    }

    #[tokio::test]
    async fn test_length_mismatch_is_an_error() {
        let orchestrator = FallbackOrchestrator::new(FixtureBackend {
            response: FallbackResponse { items: vec![] },
        });
        let batch = [line(0, "???")];

        let result = orchestrator
            .resolve(&batch, None, &UnitLexicon::default())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_timeout_is_an_error() {
        let orchestrator =
            FallbackOrchestrator::new(StalledBackend).with_timeout(Duration::from_millis(10));
        let batch = [line(0, "???")];

        let result = orchestrator
            .resolve(&batch, None, &UnitLexicon::default())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_null_backend_declines_everything() {
        let orchestrator = FallbackOrchestrator::new(NullBackend);
        let batch = [line(0, "a"), line(1, "b")];

        let outcomes = orchestrator
            .resolve(&batch, None, &UnitLexicon::default())
            .await
            .unwrap();
        assert!(outcomes
            .iter()
            .all(|o| matches!(o, FallbackOutcome::Declined)));
    }
}
