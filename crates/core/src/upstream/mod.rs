//! Upstream card catalog abstraction.
//!
//! This module provides a `CardSource` trait for fetching set and card
//! records from an external catalog API (Scryfall), with request pacing,
//! bounded retries and page-by-page traversal of search results.

mod retry;
mod scryfall;
mod types;

pub use retry::{RetryConfig, RetryPolicy};
pub use scryfall::{ScryfallClient, ScryfallConfig};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the upstream catalog API.
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    #[error("Upstream rate limit exceeded after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },

    #[error("Upstream unavailable after {attempts} attempts: {message}")]
    Unavailable { attempts: u32, message: String },

    #[error("Upstream API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode upstream response: {0}")]
    Decode(String),
}

/// A source of set and card records.
///
/// Implemented by `ScryfallClient` for production and by
/// `testing::MockCardSource` for tests.
#[async_trait]
pub trait CardSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &str;

    /// Fetch the complete flat list of sets.
    async fn fetch_sets(&self) -> Result<Vec<ScryfallSet>, UpstreamError>;

    /// Fetch one page of card search results.
    ///
    /// `page_url` is the opaque continuation returned in the previous
    /// page's `next_page`; `None` starts the traversal. The traversal is
    /// forward-only and not restartable mid-sequence: a failure aborts
    /// the whole fetch and callers retry from the first page.
    async fn fetch_cards_page(
        &self,
        query: &CardSearch,
        page_url: Option<&str>,
    ) -> Result<CardPage, UpstreamError>;
}
