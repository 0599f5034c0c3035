//! Card search.
//!
//! Translates a free-text query plus structured filters into an ordered
//! list of card identifiers. Candidate retrieval is strategy-based and
//! selected once at startup; the post-filter runs in-process on top of
//! whichever strategy produced the candidates.

mod filter;
mod strategy;
mod text;

pub use filter::matches_filters;
pub use strategy::{strategy_for, CandidateStrategy, FullTextStrategy, TokenIndexStrategy};
pub use text::{tokenize, SearchText};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{Color, Rarity};

/// Queries shorter than this return an empty result immediately.
pub const MIN_QUERY_LEN: usize = 2;

/// Candidate retrieval backend, selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchBackend {
    /// FTS5 full-text match with exact/prefix ranking tiers.
    #[default]
    FullText,
    /// Precomputed inverted-index lookup, no ranking tiers.
    TokenIndex,
}

/// Structured card filters, applied in-process after candidate retrieval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardFilters {
    /// Required colors; AND semantics, `C` matches an empty identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<Color>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<Rarity>,
    /// Case-insensitive type line substring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_contains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<bool>,
}

impl CardFilters {
    pub fn is_empty(&self) -> bool {
        self == &CardFilters::default()
    }
}

/// A card search request.
#[derive(Debug, Clone, Default)]
pub struct CardSearchQuery {
    pub query: String,
    /// Maximum results; capped by the store's configured limit.
    pub limit: Option<u32>,
    pub filters: CardFilters,
}

impl CardSearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

/// Errors for search operations.
///
/// "No matches" and "query too short" are empty results, never errors.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Database error: {0}")]
    Database(String),
}
