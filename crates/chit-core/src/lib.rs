//! Core library for supplier-receipt line-item extraction.
//!
//! This crate provides:
//! - receipt text normalization and typed tokenization
//! - a prioritized pattern-grammar engine over token shapes
//! - numeric disambiguation for ambiguous bare-number lines
//! - confidence scoring and demotion of weak matches
//! - fallback orchestration against an external parsing collaborator
//! - result assembly with per-line provenance and parse statistics

pub mod error;
pub mod models;
pub mod receipt;

pub use error::{ChitError, Result};
pub use models::config::ChitConfig;
pub use models::item::{
    ParseResult, ParseSummary, ParsedItem, RawLine, SourceStage, UnresolvedLine, UnresolvedReason,
};
pub use receipt::{
    FallbackOrchestrator, FallbackOutcome, ReceiptPipeline, RuleSet, Tokenizer, UnitLexicon,
};

/// Re-export fallback collaborator types.
pub use chit_fallback::{
    FallbackBackend, FallbackError, FallbackItem, FallbackRequest, FallbackResponse, HttpBackend,
    NullBackend,
};
