//! Sync runner.
//!
//! Drives sync runs through IDLE -> RUNNING -> {SUCCESS, FAILED}. A run
//! may start only when no younger-than-stale RUNNING ledger row of the
//! same type exists and the in-process flag for the type is free. The
//! flag is a fast path; the ledger row is the authoritative state and
//! survives process crashes, which is what the staleness sweep corrects.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Duration as ChronoDuration;
use tokio::time::Instant;
use tracing::{info, warn};

use super::config::SyncConfig;
use super::types::{SyncError, SyncOutcome, SyncReport, SyncRequest, SyncTrigger};
use super::writer::BatchWriter;
use crate::ledger::{SyncRunStore, SyncStatus, SyncType};
use crate::store::{Card, CardSet, CardStore, CardTranslation, StoreError};
use crate::upstream::{CardSearch, CardSource};

/// Per-type in-process run flags.
#[derive(Default)]
struct RunFlags {
    sets: AtomicBool,
    cards: AtomicBool,
    translations: AtomicBool,
}

impl RunFlags {
    fn flag(&self, sync_type: SyncType) -> &AtomicBool {
        match sync_type {
            SyncType::Sets => &self.sets,
            SyncType::Cards => &self.cards,
            SyncType::Translations => &self.translations,
        }
    }

    /// Claim the flag; false when another run of this type holds it.
    fn claim(&self, sync_type: SyncType) -> bool {
        !self.flag(sync_type).swap(true, Ordering::SeqCst)
    }

    fn release(&self, sync_type: SyncType) {
        self.flag(sync_type).store(false, Ordering::SeqCst);
    }
}

/// Releases the in-process flag on every exit path, including panics.
struct FlagGuard {
    flags: Arc<RunFlags>,
    sync_type: SyncType,
}

impl Drop for FlagGuard {
    fn drop(&mut self) {
        self.flags.release(self.sync_type);
    }
}

/// The sync runner.
pub struct SyncRunner {
    config: SyncConfig,
    source: Arc<dyn CardSource>,
    store: Arc<dyn CardStore>,
    ledger: Arc<dyn SyncRunStore>,
    flags: Arc<RunFlags>,
}

impl SyncRunner {
    pub fn new(
        config: SyncConfig,
        source: Arc<dyn CardSource>,
        store: Arc<dyn CardStore>,
        ledger: Arc<dyn SyncRunStore>,
    ) -> Self {
        Self {
            config,
            source,
            store,
            ledger,
            flags: Arc::new(RunFlags::default()),
        }
    }

    /// Execute a sync request to completion.
    ///
    /// `Full` expands to a sets run followed by a cards run; a failed
    /// sets run aborts before cards are attempted. Each phase gets its
    /// own ledger row. Fails fast with `SyncError::AlreadyRunning` when a
    /// run of the same type is active.
    pub async fn run(&self, request: &SyncRequest) -> Result<Vec<SyncOutcome>, SyncError> {
        let phases: &[SyncType] = match request.trigger {
            SyncTrigger::Full => &[SyncType::Sets, SyncType::Cards],
            SyncTrigger::Sets => &[SyncType::Sets],
            SyncTrigger::Cards => &[SyncType::Cards],
            SyncTrigger::Translations => &[SyncType::Translations],
        };

        let mut outcomes = Vec::with_capacity(phases.len());
        for &sync_type in phases {
            outcomes.push(self.run_one(sync_type, request).await?);
        }
        Ok(outcomes)
    }

    /// Latest ledger state per type, for the status endpoint.
    pub fn status(&self) -> Result<Vec<crate::ledger::SyncRun>, SyncError> {
        let mut runs = Vec::new();
        for sync_type in [SyncType::Sets, SyncType::Cards, SyncType::Translations] {
            if let Some(run) = self.ledger.latest(sync_type)? {
                runs.push(run);
            }
        }
        Ok(runs)
    }

    /// Claim the type: sweep stale rows, check the ledger, take the flag,
    /// create the RUNNING row.
    fn begin(&self, sync_type: SyncType) -> Result<(crate::ledger::SyncRun, FlagGuard), SyncError> {
        let staleness = ChronoDuration::minutes(self.config.staleness_timeout_mins as i64);
        let swept = self.ledger.sweep_stale(sync_type, staleness)?;
        if swept > 0 {
            warn!(
                "Swept {} stale running {} sync record(s)",
                swept,
                sync_type.as_str()
            );
        }

        if self.ledger.active_run(sync_type)?.is_some() {
            return Err(SyncError::AlreadyRunning(sync_type));
        }

        if !self.flags.claim(sync_type) {
            return Err(SyncError::AlreadyRunning(sync_type));
        }

        let guard = FlagGuard {
            flags: Arc::clone(&self.flags),
            sync_type,
        };

        let run = match self.ledger.create(sync_type) {
            Ok(run) => run,
            Err(e) => return Err(e.into()), // guard releases the flag
        };

        Ok((run, guard))
    }

    async fn run_one(
        &self,
        sync_type: SyncType,
        request: &SyncRequest,
    ) -> Result<SyncOutcome, SyncError> {
        let (run, _guard) = self.begin(sync_type)?;
        let started = Instant::now();

        info!(
            sync_type = sync_type.as_str(),
            run_id = %run.id,
            force = request.force,
            "Sync run started"
        );

        let result = match sync_type {
            SyncType::Sets => self.sync_sets(request).await,
            SyncType::Cards => self.sync_cards(request).await,
            SyncType::Translations => self.sync_translations(request).await,
        };

        let duration_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(report) => {
                let message = format!("{} in {}ms", report.summary(), duration_ms);
                self.ledger
                    .mark_success(&run.id, report.processed(), &message)?;
                self.observe(sync_type, "success", &report, duration_ms);

                info!(
                    sync_type = sync_type.as_str(),
                    run_id = %run.id,
                    "Sync run finished: {}",
                    message
                );

                Ok(SyncOutcome {
                    run_id: run.id,
                    sync_type,
                    status: SyncStatus::Success,
                    report,
                    duration_ms,
                })
            }
            Err(e) => {
                // Best effort: the run must surface its own error even if
                // stamping the ledger fails too.
                if let Err(ledger_err) = self.ledger.mark_failed(&run.id, &e.to_string()) {
                    warn!("Failed to record sync failure: {}", ledger_err);
                }
                self.observe(sync_type, "failed", &SyncReport::default(), duration_ms);

                warn!(
                    sync_type = sync_type.as_str(),
                    run_id = %run.id,
                    "Sync run failed: {}",
                    e
                );

                Err(e)
            }
        }
    }

    fn observe(&self, sync_type: SyncType, result: &str, report: &SyncReport, duration_ms: u64) {
        crate::metrics::SYNC_RUNS
            .with_label_values(&[sync_type.as_str(), result])
            .inc();
        crate::metrics::SYNC_DURATION
            .with_label_values(&[sync_type.as_str()])
            .observe(duration_ms as f64 / 1000.0);

        for (outcome, count) in [
            ("created", report.created),
            ("updated", report.updated),
            ("skipped", report.skipped),
            ("error", report.errors),
        ] {
            if count > 0 {
                crate::metrics::SYNC_RECORDS
                    .with_label_values(&[sync_type.as_str(), outcome])
                    .inc_by(count as u64);
            }
        }
    }

    async fn sync_sets(&self, request: &SyncRequest) -> Result<SyncReport, SyncError> {
        let raw_sets = self.source.fetch_sets().await?;

        // Digital-only sets never hold physical cards; leave them out.
        let sets: Vec<CardSet> = raw_sets
            .into_iter()
            .filter(|s| !s.digital)
            .map(CardSet::from)
            .collect();

        let writer = BatchWriter::new(self.store.as_ref(), &self.config);
        Ok(writer.write_sets(&sets, request.force).await)
    }

    /// Set codes a cards or translations run should cover.
    fn target_set_codes(&self, request: &SyncRequest) -> Result<Vec<String>, SyncError> {
        match &request.set_code {
            Some(code) => {
                let set = self.store.get_set(code).map_err(|e| match e {
                    StoreError::NotFound(_) => SyncError::UnknownSet(code.clone()),
                    other => SyncError::Store(other),
                })?;
                Ok(vec![set.code])
            }
            None => Ok(self
                .store
                .list_sets()?
                .into_iter()
                .filter(|s| !s.digital)
                .map(|s| s.code)
                .collect()),
        }
    }

    async fn sync_cards(&self, request: &SyncRequest) -> Result<SyncReport, SyncError> {
        let set_codes = self.target_set_codes(request)?;
        let known_sets = self.store.set_ids()?;
        let writer = BatchWriter::new(self.store.as_ref(), &self.config);

        let mut report = SyncReport::default();

        for code in set_codes {
            let mut search = CardSearch::for_set(code.to_lowercase());
            if let Some(lang) = &request.language {
                search = search.with_language(lang.clone());
            }

            // Forward-only pagination: a failure aborts the whole run and
            // the next run starts over from the first page.
            let mut next_page: Option<String> = None;
            loop {
                let page = self
                    .source
                    .fetch_cards_page(&search, next_page.as_deref())
                    .await?;

                let cards: Vec<Card> = page.cards.into_iter().map(Card::from).collect();
                report.merge(writer.write_cards(&cards, &known_sets, request.force).await);

                match page.next_page {
                    Some(url) => next_page = Some(url),
                    None => break,
                }
            }
        }

        Ok(report)
    }

    async fn sync_translations(&self, request: &SyncRequest) -> Result<SyncReport, SyncError> {
        let language = request.language.clone().ok_or(SyncError::MissingLanguage)?;

        let set_codes = self.target_set_codes(request)?;
        let writer = BatchWriter::new(self.store.as_ref(), &self.config);

        let mut report = SyncReport::default();

        for code in set_codes {
            let search = CardSearch::for_set(code.to_lowercase()).with_language(language.clone());

            let mut next_page: Option<String> = None;
            loop {
                let page = self
                    .source
                    .fetch_cards_page(&search, next_page.as_deref())
                    .await?;

                let translations: Vec<CardTranslation> =
                    page.cards.iter().map(CardTranslation::from).collect();
                report.merge(
                    writer
                        .write_translations(&translations, request.force)
                        .await,
                );

                match page.next_page {
                    Some(url) => next_page = Some(url),
                    None => break,
                }
            }
        }

        Ok(report)
    }
}
