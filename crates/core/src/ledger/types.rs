//! Types for the sync-run ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a sync run synchronizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncType {
    Sets,
    Cards,
    Translations,
}

impl SyncType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncType::Sets => "sets",
            SyncType::Cards => "cards",
            SyncType::Translations => "translations",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sets" => Some(SyncType::Sets),
            "cards" => Some(SyncType::Cards),
            "translations" => Some(SyncType::Translations),
            _ => None,
        }
    }
}

/// Lifecycle status of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Running,
    Success,
    Failed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Running => "running",
            SyncStatus::Success => "success",
            SyncStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "running" => Some(SyncStatus::Running),
            "success" => Some(SyncStatus::Success),
            "failed" => Some(SyncStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SyncStatus::Running)
    }
}

/// One sync attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRun {
    pub id: String,
    pub sync_type: SyncType,
    pub status: SyncStatus,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub records_processed: u32,
}

/// Filter for querying sync runs.
#[derive(Debug, Clone)]
pub struct SyncRunFilter {
    pub sync_type: Option<SyncType>,
    pub status: Option<SyncStatus>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for SyncRunFilter {
    fn default() -> Self {
        Self {
            sync_type: None,
            status: None,
            limit: 100,
            offset: 0,
        }
    }
}

impl SyncRunFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, sync_type: SyncType) -> Self {
        self.sync_type = Some(sync_type);
        self
    }

    pub fn with_status(mut self, status: SyncStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// Errors for ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_type_round_trip() {
        for sync_type in [SyncType::Sets, SyncType::Cards, SyncType::Translations] {
            assert_eq!(SyncType::parse(sync_type.as_str()), Some(sync_type));
        }
        assert_eq!(SyncType::parse("decks"), None);
    }

    #[test]
    fn test_status_terminal() {
        assert!(!SyncStatus::Running.is_terminal());
        assert!(SyncStatus::Success.is_terminal());
        assert!(SyncStatus::Failed.is_terminal());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&SyncType::Sets).unwrap(), "\"sets\"");
        assert_eq!(
            serde_json::to_string(&SyncStatus::Running).unwrap(),
            "\"running\""
        );
    }
}
