use std::sync::Arc;

use binder_core::{CardStore, Config, SanitizedConfig, SyncRunStore, SyncRunner};
use prometheus::Registry;

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<dyn CardStore>,
    ledger: Arc<dyn SyncRunStore>,
    runner: Arc<SyncRunner>,
    registry: Registry,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn CardStore>,
        ledger: Arc<dyn SyncRunStore>,
        runner: Arc<SyncRunner>,
        registry: Registry,
    ) -> Self {
        Self {
            config,
            store,
            ledger,
            runner,
            registry,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn store(&self) -> &dyn CardStore {
        self.store.as_ref()
    }

    pub fn ledger(&self) -> &dyn SyncRunStore {
        self.ledger.as_ref()
    }

    pub fn runner(&self) -> &SyncRunner {
        &self.runner
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
