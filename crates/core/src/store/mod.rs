//! Local card catalog storage.
//!
//! The catalog holds sets and cards pulled from the upstream API. Writes
//! come exclusively from the sync engine; reads serve the search and
//! browsing surfaces.

mod sqlite;
mod types;

pub use sqlite::SqliteCardStore;
pub use types::*;

use std::collections::HashSet;

use crate::search::{CardSearchQuery, SearchError};

/// Trait for card catalog storage.
pub trait CardStore: Send + Sync {
    /// Idempotent keyed write of one set.
    ///
    /// Keys on the stable upstream identifier, never on the mutable
    /// `code`. An existing record is skipped unless `force` is set.
    fn upsert_set(&self, set: &CardSet, force: bool) -> Result<UpsertOutcome, StoreError>;

    /// Idempotent keyed write of one card.
    ///
    /// Requires the owning set to exist locally
    /// (`StoreError::MissingSetReference` otherwise). Recomputes
    /// `is_extra` from the provenance flags on every write, regardless of
    /// `force` and of whatever the caller put in the field.
    fn upsert_card(&self, card: &Card, force: bool) -> Result<UpsertOutcome, StoreError>;

    /// Merge localized fields into an existing card, matched by set code
    /// and collector number. Skips cards that already carry a localized
    /// name unless `force` is set.
    fn merge_translation(
        &self,
        translation: &CardTranslation,
        force: bool,
    ) -> Result<TranslationOutcome, StoreError>;

    /// Get a set by its upper-cased code.
    fn get_set(&self, code: &str) -> Result<CardSet, StoreError>;

    /// List all sets, newest release first.
    fn list_sets(&self) -> Result<Vec<CardSet>, StoreError>;

    /// Stable identifiers of all locally known sets.
    fn set_ids(&self) -> Result<HashSet<String>, StoreError>;

    /// Get a card by its stable identifier.
    fn get_card(&self, scryfall_id: &str) -> Result<Card, StoreError>;

    /// Batch get preserving the order of `ids`; unknown ids are dropped.
    fn cards_by_ids(&self, ids: &[String]) -> Result<Vec<Card>, StoreError>;

    /// Execute a card search: candidate retrieval through the configured
    /// strategy, then the in-process post-filter, preserving strategy
    /// order. Queries shorter than two characters return an empty list.
    fn search_card_ids(&self, query: &CardSearchQuery) -> Result<Vec<String>, SearchError>;

    /// Catalog statistics.
    fn stats(&self) -> Result<CatalogStats, StoreError>;

    /// Destructive reset: delete every set and card.
    fn clear(&self) -> Result<(), StoreError>;
}
