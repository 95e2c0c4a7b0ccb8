//! Fallback backend implementations.

pub mod http;
pub mod null;

use std::future::Future;

use crate::{FallbackRequest, FallbackResponse, Result};

/// Trait for fallback parsing backends.
///
/// This trait abstracts over the request/response boundary to the external
/// parsing service, allowing the pipeline to run against a real HTTP
/// endpoint or a local stub. Implementations must be bounded and fallible;
/// the caller applies its own timeout on top and never retries.
pub trait FallbackBackend: Send + Sync {
    /// Submit one batch of unresolved lines and await the parsed items,
    /// positionally keyed to the request order.
    fn resolve(
        &self,
        request: &FallbackRequest,
    ) -> impl Future<Output = Result<FallbackResponse>> + Send;
}
