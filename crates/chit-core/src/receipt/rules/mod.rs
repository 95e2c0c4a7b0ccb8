//! Prioritized pattern-grammar engine over token shapes.
//!
//! Each rule describes an expected token shape and how matched positions
//! map onto the five semantic fields. Rules are tried most specific first;
//! the first structurally-matching rule wins, independent of numeric
//! values, with ties broken by declaration order.

pub mod builtin;

use rust_decimal::Decimal;

use crate::error::{ChitError, Result};

use super::tokenizer::{Sep, Token, TokenSet};

/// One element of a rule's expected token shape.
#[derive(Debug, Clone, Copy)]
pub enum TokenPat {
    /// One or more consecutive Word tokens (greedy).
    Words,
    /// A single Number token.
    Number,
    /// A single Unit token.
    Unit,
    /// A separator drawn from the listed alternatives.
    Sep(&'static [Sep]),
    /// An optional separator.
    OptSep(Sep),
}

/// Token values captured while matching a shape, in order of appearance.
#[derive(Debug, Clone, Default)]
pub struct MatchedParts {
    /// Words joined with single spaces.
    pub name: String,
    /// Number values in line order.
    pub numbers: Vec<Decimal>,
    /// Unit token, when the shape captured one.
    pub unit: Option<String>,
}

/// A rule's pre-scoring output. `provisional` carries the raw numeric
/// triple for lines whose assignment the disambiguator must decide.
#[derive(Debug, Clone)]
pub struct LineDraft {
    pub name: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub unit_price: Option<Decimal>,
    pub total: Decimal,
    pub provisional: Option<[Decimal; 3]>,
}

/// A named, ordered pattern plus its field mapping. Immutable, defined at
/// process start.
pub struct GrammarRule {
    /// Rule name, part of diagnostics.
    pub name: &'static str,
    shape: &'static [TokenPat],
    map: fn(&MatchedParts) -> Option<LineDraft>,
}

impl GrammarRule {
    pub const fn new(
        name: &'static str,
        shape: &'static [TokenPat],
        map: fn(&MatchedParts) -> Option<LineDraft>,
    ) -> Self {
        Self { name, shape, map }
    }
}

/// A successful match: the winning rule's name and its draft.
#[derive(Debug, Clone)]
pub struct RuleMatch {
    pub rule: &'static str,
    pub draft: LineDraft,
}

/// The prioritized rule list.
pub struct RuleSet {
    rules: Vec<GrammarRule>,
}

impl RuleSet {
    /// Build a rule set. An empty list is a construction error.
    pub fn new(rules: Vec<GrammarRule>) -> Result<Self> {
        if rules.is_empty() {
            return Err(ChitError::Config("grammar rule list is empty".to_string()));
        }
        Ok(Self { rules })
    }

    /// The built-in rules of the extraction engine, most specific first.
    pub fn builtin() -> Self {
        Self {
            rules: builtin::builtin_rules(),
        }
    }

    /// Try rules in priority order. The first rule whose shape aligns with
    /// the token tag sequence wins; if its mapping then declines (e.g. a
    /// non-positive quantity), the line routes to fallback rather than
    /// falling through to less specific rules.
    pub fn match_line(&self, tokens: &TokenSet) -> Option<RuleMatch> {
        for rule in &self.rules {
            if let Some(parts) = match_shape(rule.shape, &tokens.tokens) {
                return (rule.map)(&parts).map(|draft| RuleMatch {
                    rule: rule.name,
                    draft,
                });
            }
        }
        None
    }
}

fn match_shape(shape: &[TokenPat], tokens: &[Token]) -> Option<MatchedParts> {
    let mut parts = MatchedParts::default();
    if match_at(shape, tokens, &mut parts) {
        Some(parts)
    } else {
        None
    }
}

/// Backtracking matcher over the pattern and token slices. Shapes are a
/// handful of elements long, so the recursion depth is trivially bounded.
fn match_at(shape: &[TokenPat], tokens: &[Token], parts: &mut MatchedParts) -> bool {
    let Some(pat) = shape.first() else {
        return tokens.is_empty();
    };

    match pat {
        TokenPat::Words => {
            let run = tokens
                .iter()
                .take_while(|t| matches!(t, Token::Word(_)))
                .count();
            // Greedy: try the longest word run first.
            for take in (1..=run).rev() {
                let words: Vec<&str> = tokens[..take]
                    .iter()
                    .map(|t| match t {
                        Token::Word(w) => w.as_str(),
                        _ => unreachable!("run contains only words"),
                    })
                    .collect();
                parts.name = words.join(" ");
                if match_at(&shape[1..], &tokens[take..], parts) {
                    return true;
                }
            }
            parts.name.clear();
            false
        }
        TokenPat::Number => match tokens.first() {
            Some(Token::Number { value, .. }) => {
                parts.numbers.push(*value);
                if match_at(&shape[1..], &tokens[1..], parts) {
                    true
                } else {
                    parts.numbers.pop();
                    false
                }
            }
            _ => false,
        },
        TokenPat::Unit => match tokens.first() {
            Some(Token::Unit(unit)) => {
                parts.unit = Some(unit.clone());
                if match_at(&shape[1..], &tokens[1..], parts) {
                    true
                } else {
                    parts.unit = None;
                    false
                }
            }
            _ => false,
        },
        TokenPat::Sep(alternatives) => match tokens.first() {
            Some(Token::Separator(sep)) if alternatives.contains(sep) => {
                match_at(&shape[1..], &tokens[1..], parts)
            }
            _ => false,
        },
        TokenPat::OptSep(expected) => {
            if let Some(Token::Separator(sep)) = tokens.first() {
                if sep == expected && match_at(&shape[1..], &tokens[1..], parts) {
                    return true;
                }
            }
            match_at(&shape[1..], tokens, parts)
        }
    }
}
