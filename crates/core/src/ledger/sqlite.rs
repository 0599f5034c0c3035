//! SQLite-backed sync-run ledger.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{LedgerError, SyncRun, SyncRunFilter, SyncRunStore, SyncStatus, SyncType};

/// SQLite-backed sync-run store.
pub struct SqliteSyncRunStore {
    conn: Mutex<Connection>,
}

impl SqliteSyncRunStore {
    /// Create a new SQLite ledger, creating the database file and tables
    /// if needed.
    pub fn new(path: &Path) -> Result<Self, LedgerError> {
        let conn = Connection::open(path).map_err(|e| LedgerError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite ledger (useful for testing).
    pub fn in_memory() -> Result<Self, LedgerError> {
        let conn =
            Connection::open_in_memory().map_err(|e| LedgerError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), LedgerError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sync_runs (
                id TEXT PRIMARY KEY,
                sync_type TEXT NOT NULL,
                status TEXT NOT NULL,
                started_at TEXT NOT NULL,
                finished_at TEXT,
                message TEXT,
                records_processed INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_sync_runs_type ON sync_runs(sync_type);
            CREATE INDEX IF NOT EXISTS idx_sync_runs_status ON sync_runs(status);
            CREATE INDEX IF NOT EXISTS idx_sync_runs_started ON sync_runs(started_at);
            "#,
        )
        .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(())
    }

    fn build_where_clause(filter: &SyncRunFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(sync_type) = filter.sync_type {
            conditions.push("sync_type = ?");
            params.push(Box::new(sync_type.as_str().to_string()));
        }

        if let Some(status) = filter.status {
            conditions.push("status = ?");
            params.push(Box::new(status.as_str().to_string()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    fn row_to_run(row: &rusqlite::Row) -> rusqlite::Result<SyncRun> {
        let sync_type: String = row.get(1)?;
        let status: String = row.get(2)?;
        let started_at: String = row.get(3)?;
        let finished_at: Option<String> = row.get(4)?;

        Ok(SyncRun {
            id: row.get(0)?,
            sync_type: SyncType::parse(&sync_type).unwrap_or(SyncType::Sets),
            status: SyncStatus::parse(&status).unwrap_or(SyncStatus::Failed),
            started_at: parse_timestamp(&started_at),
            finished_at: finished_at.as_deref().map(parse_timestamp),
            message: row.get(5)?,
            records_processed: row.get(6)?,
        })
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl SyncRunStore for SqliteSyncRunStore {
    fn create(&self, sync_type: SyncType) -> Result<SyncRun, LedgerError> {
        let conn = self.conn.lock().unwrap();

        let run = SyncRun {
            id: Uuid::new_v4().to_string(),
            sync_type,
            status: SyncStatus::Running,
            started_at: Utc::now(),
            finished_at: None,
            message: None,
            records_processed: 0,
        };

        conn.execute(
            "INSERT INTO sync_runs (id, sync_type, status, started_at, finished_at, message, records_processed)
             VALUES (?, ?, ?, ?, NULL, NULL, 0)",
            params![
                &run.id,
                run.sync_type.as_str(),
                run.status.as_str(),
                run.started_at.to_rfc3339(),
            ],
        )
        .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(run)
    }

    fn mark_success(
        &self,
        id: &str,
        records_processed: u32,
        message: &str,
    ) -> Result<(), LedgerError> {
        let conn = self.conn.lock().unwrap();

        let affected = conn
            .execute(
                "UPDATE sync_runs SET status = 'success', finished_at = ?, message = ?, records_processed = ?
                 WHERE id = ?",
                params![Utc::now().to_rfc3339(), message, records_processed, id],
            )
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        if affected == 0 {
            return Err(LedgerError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn mark_failed(&self, id: &str, message: &str) -> Result<(), LedgerError> {
        let conn = self.conn.lock().unwrap();

        let affected = conn
            .execute(
                "UPDATE sync_runs SET status = 'failed', finished_at = ?, message = ? WHERE id = ?",
                params![Utc::now().to_rfc3339(), message, id],
            )
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        if affected == 0 {
            return Err(LedgerError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn active_run(&self, sync_type: SyncType) -> Result<Option<SyncRun>, LedgerError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            "SELECT id, sync_type, status, started_at, finished_at, message, records_processed
             FROM sync_runs WHERE sync_type = ? AND status = 'running'
             ORDER BY started_at DESC LIMIT 1",
            params![sync_type.as_str()],
            Self::row_to_run,
        );

        match result {
            Ok(run) => Ok(Some(run)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(LedgerError::Database(e.to_string())),
        }
    }

    fn sweep_stale(&self, sync_type: SyncType, older_than: Duration) -> Result<u32, LedgerError> {
        let conn = self.conn.lock().unwrap();
        let cutoff = Utc::now() - older_than;

        let affected = conn
            .execute(
                "UPDATE sync_runs SET status = 'failed', finished_at = ?, message = 'Timed out: stale running record swept'
                 WHERE sync_type = ? AND status = 'running' AND started_at <= ?",
                params![
                    Utc::now().to_rfc3339(),
                    sync_type.as_str(),
                    cutoff.to_rfc3339(),
                ],
            )
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(affected as u32)
    }

    fn latest(&self, sync_type: SyncType) -> Result<Option<SyncRun>, LedgerError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            "SELECT id, sync_type, status, started_at, finished_at, message, records_processed
             FROM sync_runs WHERE sync_type = ?
             ORDER BY started_at DESC LIMIT 1",
            params![sync_type.as_str()],
            Self::row_to_run,
        );

        match result {
            Ok(run) => Ok(Some(run)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(LedgerError::Database(e.to_string())),
        }
    }

    fn query(&self, filter: &SyncRunFilter) -> Result<Vec<SyncRun>, LedgerError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(filter);

        let sql = format!(
            "SELECT id, sync_type, status, started_at, finished_at, message, records_processed
             FROM sync_runs {} ORDER BY started_at DESC LIMIT ? OFFSET ?",
            where_clause
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        let mut all_params: Vec<Box<dyn rusqlite::ToSql>> = params;
        all_params.push(Box::new(filter.limit));
        all_params.push(Box::new(filter.offset));

        let param_refs: Vec<&dyn rusqlite::ToSql> = all_params.iter().map(|p| p.as_ref()).collect();

        let rows = stmt
            .query_map(param_refs.as_slice(), Self::row_to_run)
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        let mut runs = Vec::new();
        for row in rows {
            runs.push(row.map_err(|e| LedgerError::Database(e.to_string()))?);
        }
        Ok(runs)
    }

    fn count(&self, filter: &SyncRunFilter) -> Result<i64, LedgerError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM sync_runs {}", where_clause);

        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        conn.query_row(&sql, param_refs.as_slice(), |row| row.get(0))
            .map_err(|e| LedgerError::Database(e.to_string()))
    }

    fn prune(&self, older_than_days: u32) -> Result<u32, LedgerError> {
        let conn = self.conn.lock().unwrap();
        let cutoff = Utc::now() - Duration::days(older_than_days as i64);

        let affected = conn
            .execute(
                "DELETE FROM sync_runs WHERE status != 'running' AND started_at <= ?",
                params![cutoff.to_rfc3339()],
            )
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(affected as u32)
    }
}
