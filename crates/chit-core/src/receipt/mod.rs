//! Receipt line-item extraction pipeline.

pub mod assemble;
pub mod disambiguate;
pub mod fallback;
pub mod patterns;
pub mod pipeline;
pub mod rules;
pub mod score;
pub mod tokenizer;

pub use assemble::assemble;
pub use disambiguate::{Assignment, disambiguate};
pub use fallback::{FallbackOrchestrator, FallbackOutcome};
pub use pipeline::ReceiptPipeline;
pub use rules::{GrammarRule, LineDraft, RuleMatch, RuleSet, TokenPat};
pub use score::{score_draft, score_fields};
pub use tokenizer::{NormalizedReceipt, Sep, Token, TokenSet, Tokenizer, UnitLexicon};
