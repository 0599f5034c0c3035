//! Sync runner configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the sync runner and batch writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// A RUNNING ledger row older than this is considered abandoned and
    /// swept to FAILED before a new run starts (default: 30).
    #[serde(default = "default_staleness_timeout")]
    pub staleness_timeout_mins: u64,
    /// Set records written per chunk (default: 50).
    #[serde(default = "default_set_batch_size")]
    pub set_batch_size: usize,
    /// Card records written per chunk (default: 100).
    #[serde(default = "default_card_batch_size")]
    pub card_batch_size: usize,
    /// Pause between chunks in milliseconds (default: 50).
    #[serde(default = "default_batch_pause")]
    pub batch_pause_ms: u64,
}

fn default_staleness_timeout() -> u64 {
    30
}

fn default_set_batch_size() -> usize {
    50
}

fn default_card_batch_size() -> usize {
    100
}

fn default_batch_pause() -> u64 {
    50
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            staleness_timeout_mins: default_staleness_timeout(),
            set_batch_size: default_set_batch_size(),
            card_batch_size: default_card_batch_size(),
            batch_pause_ms: default_batch_pause(),
        }
    }
}
