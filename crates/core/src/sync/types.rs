//! Types for sync runs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::{LedgerError, SyncStatus, SyncType};
use crate::store::{StoreError, UpsertOutcome};
use crate::upstream::UpstreamError;

/// What a sync trigger asks for. `Full` expands to sets then cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTrigger {
    Full,
    Sets,
    Cards,
    Translations,
}

/// A sync request as accepted from the HTTP layer.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncRequest {
    #[serde(rename = "type")]
    pub trigger: SyncTrigger,
    /// Rewrite records that already exist locally.
    #[serde(default)]
    pub force: bool,
    /// Restrict a cards or translations run to one set.
    #[serde(default)]
    pub set_code: Option<String>,
    /// Language filter; required for translations runs.
    #[serde(default)]
    pub language: Option<String>,
}

impl SyncRequest {
    pub fn new(trigger: SyncTrigger) -> Self {
        Self {
            trigger,
            force: false,
            set_code: None,
            language: None,
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_set_code(mut self, set_code: impl Into<String>) -> Self {
        self.set_code = Some(set_code.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Per-record outcome counters for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub created: u32,
    pub updated: u32,
    pub skipped: u32,
    pub errors: u32,
}

impl SyncReport {
    pub fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Created => self.created += 1,
            UpsertOutcome::Updated => self.updated += 1,
            UpsertOutcome::Skipped => self.skipped += 1,
        }
    }

    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    pub fn merge(&mut self, other: SyncReport) {
        self.created += other.created;
        self.updated += other.updated;
        self.skipped += other.skipped;
        self.errors += other.errors;
    }

    /// Total records seen by the run.
    pub fn processed(&self) -> u32 {
        self.created + self.updated + self.skipped + self.errors
    }

    pub fn summary(&self) -> String {
        format!(
            "created {}, updated {}, skipped {}, errors {}",
            self.created, self.updated, self.skipped, self.errors
        )
    }
}

/// Result of one completed sync run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub run_id: String,
    pub sync_type: SyncType,
    pub status: SyncStatus,
    pub report: SyncReport,
    pub duration_ms: u64,
}

/// Errors for sync runs.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("A {0:?} sync is already in progress")]
    AlreadyRunning(SyncType),

    #[error("Translations sync requires a language")]
    MissingLanguage,

    #[error("Unknown set: {0}")]
    UnknownSet(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
