//! Chunked, fault-tolerant catalog writes.
//!
//! Records are written in chunks with a short pause in between. The
//! embedded store serializes writers anyway, so the chunk size bounds
//! memory and paces the writer; it only affects throughput, never
//! correctness, because every write is independently idempotent. A
//! failing record is logged and counted, it never aborts the batch.

use std::collections::HashSet;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::config::SyncConfig;
use super::types::SyncReport;
use crate::store::{Card, CardSet, CardStore, CardTranslation, StoreError, TranslationOutcome};

/// Writes normalized records into the card store in chunks.
pub struct BatchWriter<'a> {
    store: &'a dyn CardStore,
    config: &'a SyncConfig,
}

impl<'a> BatchWriter<'a> {
    pub fn new(store: &'a dyn CardStore, config: &'a SyncConfig) -> Self {
        Self { store, config }
    }

    async fn pause(&self) {
        if self.config.batch_pause_ms > 0 {
            sleep(Duration::from_millis(self.config.batch_pause_ms)).await;
        }
    }

    /// Write a batch of sets.
    pub async fn write_sets(&self, sets: &[CardSet], force: bool) -> SyncReport {
        let mut report = SyncReport::default();

        for chunk in sets.chunks(self.config.set_batch_size.max(1)) {
            let results =
                join_all(chunk.iter().map(|set| async { self.store.upsert_set(set, force) }))
                    .await;

            for (set, result) in chunk.iter().zip(results) {
                match result {
                    Ok(outcome) => report.record(outcome),
                    Err(e) => {
                        warn!("Failed to upsert set {}: {}", set.code, e);
                        report.record_error();
                    }
                }
            }

            self.pause().await;
        }

        report
    }

    /// Write a batch of cards.
    ///
    /// `known_sets` holds the stable identifiers of locally present sets;
    /// a card referencing anything else is skipped and logged, the run
    /// continues.
    pub async fn write_cards(
        &self,
        cards: &[Card],
        known_sets: &HashSet<String>,
        force: bool,
    ) -> SyncReport {
        let mut report = SyncReport::default();

        for chunk in cards.chunks(self.config.card_batch_size.max(1)) {
            let results = join_all(chunk.iter().map(|card| async {
                if !known_sets.contains(&card.set_id) {
                    return Err(StoreError::MissingSetReference(card.set_code.clone()));
                }
                self.store.upsert_card(card, force)
            }))
            .await;

            for (card, result) in chunk.iter().zip(results) {
                match result {
                    Ok(outcome) => report.record(outcome),
                    Err(StoreError::MissingSetReference(code)) => {
                        warn!(
                            "Skipping card {} ({}): set {} not present locally",
                            card.name, card.scryfall_id, code
                        );
                        report.skipped += 1;
                    }
                    Err(e) => {
                        warn!("Failed to upsert card {}: {}", card.scryfall_id, e);
                        report.record_error();
                    }
                }
            }

            self.pause().await;
        }

        report
    }

    /// Merge a batch of localized printings into existing cards.
    pub async fn write_translations(
        &self,
        translations: &[CardTranslation],
        force: bool,
    ) -> SyncReport {
        let mut report = SyncReport::default();

        for chunk in translations.chunks(self.config.card_batch_size.max(1)) {
            for translation in chunk {
                match self.store.merge_translation(translation, force) {
                    Ok(TranslationOutcome::Updated) => report.updated += 1,
                    Ok(TranslationOutcome::Skipped) => report.skipped += 1,
                    Ok(TranslationOutcome::NotFound) => {
                        debug!(
                            "No local card for translation {}/{}",
                            translation.set_code, translation.collector_number
                        );
                        report.skipped += 1;
                    }
                    Err(e) => {
                        warn!(
                            "Failed to merge translation {}/{}: {}",
                            translation.set_code, translation.collector_number, e
                        );
                        report.record_error();
                    }
                }
            }

            self.pause().await;
        }

        report
    }
}
