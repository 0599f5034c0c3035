pub mod classifier;
pub mod config;
pub mod ledger;
pub mod metrics;
pub mod search;
pub mod store;
pub mod sync;
pub mod testing;
pub mod upstream;

pub use classifier::{compute_is_extra, is_extra_flags, EXTRA_FRAME_EFFECTS};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    SanitizedConfig, SearchConfig, ServerConfig,
};
pub use ledger::{
    LedgerError, SqliteSyncRunStore, SyncRun, SyncRunFilter, SyncRunStore, SyncStatus, SyncType,
};
pub use search::{CardFilters, CardSearchQuery, SearchBackend, SearchError};
pub use store::{
    Card, CardSet, CardStore, CatalogStats, Color, Rarity, SqliteCardStore, StoreError,
    UpsertOutcome,
};
pub use sync::{SyncConfig, SyncError, SyncOutcome, SyncReport, SyncRequest, SyncRunner, SyncTrigger};
pub use upstream::{CardSource, ScryfallClient, ScryfallConfig, UpstreamError};
