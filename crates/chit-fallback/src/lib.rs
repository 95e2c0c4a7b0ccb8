//! External line-item parsing collaborator boundary for chit.
//!
//! This crate provides a unified interface to the secondary, more tolerant
//! parsing service that resolves receipt lines the deterministic engine
//! rejects:
//! - `HttpBackend` posting JSON batches to a configured endpoint
//! - `NullBackend` declining every line, for disabled fallback and fixtures
//!
//! The collaborator is untrusted; callers validate every returned field
//! before admitting it into a parsed result.

mod backend;
mod error;
mod protocol;

pub use backend::FallbackBackend;
pub use backend::http::HttpBackend;
pub use backend::null::NullBackend;
pub use error::FallbackError;
pub use protocol::{FallbackItem, FallbackRequest, FallbackResponse};

/// Result type for fallback operations.
pub type Result<T> = std::result::Result<T, FallbackError>;
