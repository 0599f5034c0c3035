//! Scryfall API client.
//!
//! Scryfall asks clients to:
//! - send an identifying User-Agent header
//! - keep 50-100ms between requests
//!
//! On top of that the client retries 429/5xx responses with bounded
//! exponential backoff, honoring a Retry-After hint when present.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use super::retry::{RetryConfig, RetryPolicy};
use super::types::{CardPage, CardSearch, ScryfallCard, ScryfallSet};
use super::{CardSource, UpstreamError};

/// Scryfall API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScryfallConfig {
    /// Base URL (default: https://api.scryfall.com).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// User-Agent string (Scryfall requires an identifying one).
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Minimum delay between requests in milliseconds (default: 100).
    #[serde(default = "default_min_interval")]
    pub min_request_interval_ms: u64,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Retry behavior for 429/5xx responses.
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_base_url() -> String {
    "https://api.scryfall.com".to_string()
}

fn default_user_agent() -> String {
    format!("Binder/{}", env!("CARGO_PKG_VERSION"))
}

fn default_min_interval() -> u64 {
    100
}

fn default_timeout() -> u32 {
    30
}

impl Default for ScryfallConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            min_request_interval_ms: default_min_interval(),
            timeout_secs: default_timeout(),
            retry: RetryConfig::default(),
        }
    }
}

/// Scryfall API client.
pub struct ScryfallClient {
    client: Client,
    base_url: String,
    last_request: Arc<Mutex<Option<Instant>>>,
    min_interval: Duration,
    retry: RetryPolicy,
}

impl ScryfallClient {
    /// Create a new Scryfall client.
    pub fn new(config: ScryfallConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| UpstreamError::Unavailable {
                attempts: 0,
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            last_request: Arc::new(Mutex::new(None)),
            min_interval: Duration::from_millis(config.min_request_interval_ms),
            retry: RetryPolicy::new(&config.retry),
        })
    }

    /// Enforce the minimum inter-request delay.
    async fn pace(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                debug!("Scryfall pacing: waiting {:?}", wait_time);
                sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }

    /// Build the first-page URL for a card search.
    fn search_url(&self, query: &CardSearch) -> String {
        format!(
            "{}/cards/search?q={}&unique=prints&include_extras=true&include_variations=true&order=set",
            self.base_url,
            urlencoding::encode(&query.to_query())
        )
    }

    /// Issue one GET with pacing and bounded retry.
    ///
    /// Returns `Ok(None)` on 404 (an empty search result, not an error).
    /// The retry loop carries explicit `(attempt, delay)` state; 429 honors
    /// a Retry-After hint when present, otherwise backs off like 5xx.
    async fn fetch(&self, url: &str) -> Result<Option<Response>, UpstreamError> {
        let mut attempt: u32 = 0;

        loop {
            self.pace().await;

            let result = self.client.get(url).send().await;

            let response = match result {
                Ok(response) => response,
                Err(e) => {
                    attempt += 1;
                    if !self.retry.should_retry(attempt) {
                        crate::metrics::UPSTREAM_REQUESTS
                            .with_label_values(&["unavailable"])
                            .inc();
                        return Err(UpstreamError::Unavailable {
                            attempts: attempt,
                            message: e.to_string(),
                        });
                    }
                    let delay = self.retry.delay(attempt);
                    warn!("Scryfall request failed ({}), retrying in {:?}", e, delay);
                    sleep(delay).await;
                    continue;
                }
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                attempt += 1;
                if !self.retry.should_retry(attempt) {
                    crate::metrics::UPSTREAM_REQUESTS
                        .with_label_values(&["rate_limited"])
                        .inc();
                    return Err(UpstreamError::RateLimitExceeded { attempts: attempt });
                }
                let delay = retry_after(&response).unwrap_or_else(|| self.retry.delay(attempt));
                warn!("Scryfall rate limited, retrying in {:?}", delay);
                sleep(delay).await;
                continue;
            }

            if status.is_server_error() {
                attempt += 1;
                if !self.retry.should_retry(attempt) {
                    crate::metrics::UPSTREAM_REQUESTS
                        .with_label_values(&["unavailable"])
                        .inc();
                    return Err(UpstreamError::Unavailable {
                        attempts: attempt,
                        message: format!("HTTP {}", status),
                    });
                }
                let delay = self.retry.delay(attempt);
                warn!("Scryfall returned {}, retrying in {:?}", status, delay);
                sleep(delay).await;
                continue;
            }

            if status == StatusCode::NOT_FOUND {
                crate::metrics::UPSTREAM_REQUESTS
                    .with_label_values(&["not_found"])
                    .inc();
                return Ok(None);
            }

            if !status.is_success() {
                crate::metrics::UPSTREAM_REQUESTS
                    .with_label_values(&["error"])
                    .inc();
                let body = response.text().await.unwrap_or_default();
                return Err(UpstreamError::Api {
                    status: status.as_u16(),
                    body: body.chars().take(500).collect(),
                });
            }

            crate::metrics::UPSTREAM_REQUESTS
                .with_label_values(&["success"])
                .inc();
            return Ok(Some(response));
        }
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<Option<T>, UpstreamError> {
        match self.fetch(url).await? {
            Some(response) => {
                let parsed = response
                    .json()
                    .await
                    .map_err(|e| UpstreamError::Decode(e.to_string()))?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }
}

/// Read a Retry-After hint (seconds) from a 429 response.
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[async_trait]
impl CardSource for ScryfallClient {
    fn name(&self) -> &str {
        "scryfall"
    }

    async fn fetch_sets(&self) -> Result<Vec<ScryfallSet>, UpstreamError> {
        let url = format!("{}/sets", self.base_url);
        debug!("Scryfall fetch sets");

        let envelope: Option<SetsEnvelope> = self.fetch_json(&url).await?;
        Ok(envelope.map(|e| e.data).unwrap_or_default())
    }

    async fn fetch_cards_page(
        &self,
        query: &CardSearch,
        page_url: Option<&str>,
    ) -> Result<CardPage, UpstreamError> {
        let url = match page_url {
            Some(next) => next.to_string(),
            None => self.search_url(query),
        };

        debug!(query = %query.to_query(), "Scryfall fetch cards page");

        let envelope: Option<CardsEnvelope> = self.fetch_json(&url).await?;

        Ok(match envelope {
            Some(envelope) => CardPage {
                cards: envelope.data,
                next_page: if envelope.has_more {
                    envelope.next_page
                } else {
                    None
                },
                total_cards: envelope.total_cards,
            },
            // 404 from the search endpoint means zero matches.
            None => CardPage::default(),
        })
    }
}

// ============================================================================
// Scryfall API envelope types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct SetsEnvelope {
    #[serde(default)]
    data: Vec<ScryfallSet>,
}

#[derive(Debug, Deserialize)]
struct CardsEnvelope {
    #[serde(default)]
    data: Vec<ScryfallCard>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_page: Option<String>,
    #[serde(default)]
    total_cards: Option<u64>,
}
