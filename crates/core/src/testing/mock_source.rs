//! Mock upstream card source for testing.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::upstream::{CardPage, CardSearch, CardSource, ScryfallCard, ScryfallSet, UpstreamError};

/// Mock implementation of the `CardSource` trait.
///
/// Provides controllable behavior for testing:
/// - Seed sets and per-query card lists
/// - Paged traversal with a configurable page size
/// - Simulated failures and delays
/// - Records fetched queries for assertions
pub struct MockCardSource {
    sets: Mutex<Vec<ScryfallSet>>,
    /// Card lists keyed by the rendered query string (e.g. "set:dom").
    cards: Mutex<HashMap<String, Vec<ScryfallCard>>>,
    page_size: Mutex<usize>,
    next_error: Mutex<Option<UpstreamError>>,
    delay: Mutex<Option<Duration>>,
    recorded_queries: Mutex<Vec<String>>,
}

impl Default for MockCardSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCardSource {
    pub fn new() -> Self {
        Self {
            sets: Mutex::new(Vec::new()),
            cards: Mutex::new(HashMap::new()),
            page_size: Mutex::new(100),
            next_error: Mutex::new(None),
            delay: Mutex::new(None),
            recorded_queries: Mutex::new(Vec::new()),
        }
    }

    pub fn set_sets(&self, sets: Vec<ScryfallSet>) {
        *self.sets.lock().unwrap() = sets;
    }

    /// Seed the card list returned for a query string.
    pub fn set_cards(&self, query: &str, cards: Vec<ScryfallCard>) {
        self.cards.lock().unwrap().insert(query.to_string(), cards);
    }

    /// Split card responses into pages of this size.
    pub fn set_page_size(&self, page_size: usize) {
        *self.page_size.lock().unwrap() = page_size.max(1);
    }

    /// Fail the next fetch with this error.
    pub fn fail_next(&self, error: UpstreamError) {
        *self.next_error.lock().unwrap() = Some(error);
    }

    /// Sleep this long at the start of every fetch.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Queries fetched so far (one entry per page request).
    pub fn recorded_queries(&self) -> Vec<String> {
        self.recorded_queries.lock().unwrap().clone()
    }

    async fn simulate_latency(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            sleep(delay).await;
        }
    }

    fn take_error(&self) -> Option<UpstreamError> {
        self.next_error.lock().unwrap().take()
    }
}

fn page_token(query: &str, page_index: usize) -> String {
    format!("mock://{}#page={}", query, page_index)
}

fn parse_page_token(url: &str) -> usize {
    url.rsplit("#page=")
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

#[async_trait]
impl CardSource for MockCardSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_sets(&self) -> Result<Vec<ScryfallSet>, UpstreamError> {
        self.simulate_latency().await;

        if let Some(error) = self.take_error() {
            return Err(error);
        }

        self.recorded_queries
            .lock()
            .unwrap()
            .push("sets".to_string());
        Ok(self.sets.lock().unwrap().clone())
    }

    async fn fetch_cards_page(
        &self,
        query: &CardSearch,
        page_url: Option<&str>,
    ) -> Result<CardPage, UpstreamError> {
        self.simulate_latency().await;

        if let Some(error) = self.take_error() {
            return Err(error);
        }

        let rendered = query.to_query();
        self.recorded_queries.lock().unwrap().push(rendered.clone());

        let all = self
            .cards
            .lock()
            .unwrap()
            .get(&rendered)
            .cloned()
            .unwrap_or_default();

        let page_size = *self.page_size.lock().unwrap();
        let page_index = page_url.map(parse_page_token).unwrap_or(0);
        let start = page_index * page_size;
        let end = (start + page_size).min(all.len());

        let cards = if start < all.len() {
            all[start..end].to_vec()
        } else {
            Vec::new()
        };

        let next_page = if end < all.len() {
            Some(page_token(&rendered, page_index + 1))
        } else {
            None
        };

        Ok(CardPage {
            cards,
            next_page,
            total_cards: Some(all.len() as u64),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_paged_traversal() {
        let source = MockCardSource::new();
        source.set_page_size(2);
        source.set_cards(
            "set:dom",
            vec![
                fixtures::card("c1", "One", "dom", "s1"),
                fixtures::card("c2", "Two", "dom", "s1"),
                fixtures::card("c3", "Three", "dom", "s1"),
            ],
        );

        let query = CardSearch::for_set("dom");

        let first = source.fetch_cards_page(&query, None).await.unwrap();
        assert_eq!(first.cards.len(), 2);
        assert!(first.next_page.is_some());

        let second = source
            .fetch_cards_page(&query, first.next_page.as_deref())
            .await
            .unwrap();
        assert_eq!(second.cards.len(), 1);
        assert!(second.next_page.is_none());
    }

    #[tokio::test]
    async fn test_unknown_query_is_empty() {
        let source = MockCardSource::new();
        let page = source
            .fetch_cards_page(&CardSearch::for_set("nope"), None)
            .await
            .unwrap();
        assert!(page.cards.is_empty());
        assert!(page.next_page.is_none());
    }

    #[tokio::test]
    async fn test_fail_next() {
        let source = MockCardSource::new();
        source.set_sets(vec![fixtures::set("s1", "dom", "Dominaria")]);
        source.fail_next(UpstreamError::RateLimitExceeded { attempts: 5 });

        assert!(source.fetch_sets().await.is_err());
        // The error is consumed; the next call succeeds.
        assert_eq!(source.fetch_sets().await.unwrap().len(), 1);
    }
}
