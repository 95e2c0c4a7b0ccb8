//! Error types for the chit-core library.
//!
//! Data-quality problems (unparseable or ambiguous lines) are never errors;
//! they are recorded as unresolved outcomes in the parse result. Only
//! programming-contract violations and collaborator transport failures
//! surface as `Err`.

use thiserror::Error;

/// Main error type for the chit library.
#[derive(Error, Debug)]
pub enum ChitError {
    /// Invalid construction (empty rule set, threshold out of range).
    #[error("configuration error: {0}")]
    Config(String),

    /// Fallback collaborator error from the boundary layer.
    #[error("fallback error: {0}")]
    Fallback(#[from] chit_fallback::FallbackError),
}

/// Result type for the chit library.
pub type Result<T> = std::result::Result<T, ChitError>;
