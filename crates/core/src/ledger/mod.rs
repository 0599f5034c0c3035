//! Sync-run ledger.
//!
//! One row per synchronization attempt. The ledger is the authoritative
//! record of whether a sync is in progress; the in-process flag held by
//! the runner is only a fast-path optimization on top of it.

mod sqlite;
mod types;

pub use sqlite::SqliteSyncRunStore;
pub use types::*;

use chrono::Duration;

/// Trait for sync-run ledger storage.
pub trait SyncRunStore: Send + Sync {
    /// Insert a RUNNING row for a new run and return it.
    fn create(&self, sync_type: SyncType) -> Result<SyncRun, LedgerError>;

    /// Transition a run to SUCCESS, stamping finish time, processed count
    /// and a summary message.
    fn mark_success(
        &self,
        id: &str,
        records_processed: u32,
        message: &str,
    ) -> Result<(), LedgerError>;

    /// Transition a run to FAILED with the error message.
    fn mark_failed(&self, id: &str, message: &str) -> Result<(), LedgerError>;

    /// The RUNNING row of the given type, if any.
    fn active_run(&self, sync_type: SyncType) -> Result<Option<SyncRun>, LedgerError>;

    /// Force RUNNING rows of the given type older than `older_than` to
    /// FAILED with a timeout message. Returns how many were swept.
    fn sweep_stale(&self, sync_type: SyncType, older_than: Duration) -> Result<u32, LedgerError>;

    /// The most recent run of the given type.
    fn latest(&self, sync_type: SyncType) -> Result<Option<SyncRun>, LedgerError>;

    /// Query runs with optional filters, newest first.
    fn query(&self, filter: &SyncRunFilter) -> Result<Vec<SyncRun>, LedgerError>;

    /// Count matching runs.
    fn count(&self, filter: &SyncRunFilter) -> Result<i64, LedgerError>;

    /// Delete terminal rows older than the given number of days.
    /// RUNNING rows are never pruned. Returns how many were deleted.
    fn prune(&self, older_than_days: u32) -> Result<u32, LedgerError>;
}
