//! Backend that declines every line.
//!
//! Used when fallback is disabled and as a fixture in tests: every entry in
//! the response is `null`, so the pipeline records the lines as declined.

use super::FallbackBackend;
use crate::{FallbackRequest, FallbackResponse, Result};

/// A backend that never resolves anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

impl FallbackBackend for NullBackend {
    async fn resolve(&self, request: &FallbackRequest) -> Result<FallbackResponse> {
        Ok(FallbackResponse {
            items: vec![None; request.lines.len()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_declines_every_line() {
        let request = FallbackRequest {
            lines: vec!["??? 3".to_string(), "smudged".to_string()],
            currency: None,
        };

        let response = NullBackend.resolve(&request).await.unwrap();
        assert_eq!(response.items.len(), 2);
        assert!(response.items.iter().all(Option::is_none));
    }
}
