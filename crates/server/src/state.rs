//! Application state shared across handlers.

use crate::negotiate::SlotNegotiator;
use crate::slots::SlotTable;
use dropslot_core::AppConfig;
use dropslot_storage::Repository;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Object repository.
    pub repository: Arc<dyn Repository>,
    /// Pending slots.
    pub slots: Arc<SlotTable>,
    /// Slot negotiator.
    pub negotiator: Arc<SlotNegotiator>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid.
    pub fn new(config: AppConfig, repository: Arc<dyn Repository>) -> Self {
        if let Err(error) = config.validate() {
            panic!("invalid configuration: {error}");
        }

        let slots = Arc::new(SlotTable::new());
        let negotiator = Arc::new(SlotNegotiator::new(
            slots.clone(),
            config.announce.clone(),
            &config.slots,
        ));

        Self {
            config: Arc::new(config),
            repository,
            slots,
            negotiator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dropslot_storage::FileRepository;

    #[test]
    #[should_panic(expected = "invalid configuration")]
    fn test_invalid_config_panics() {
        let mut config = AppConfig::for_testing();
        config.purge.interval_secs = 0;
        let repository: Arc<dyn Repository> = Arc::new(FileRepository::in_temp_dir().unwrap());
        let _ = AppState::new(config, repository);
    }

    #[test]
    fn test_negotiator_shares_table() {
        let repository: Arc<dyn Repository> = Arc::new(FileRepository::in_temp_dir().unwrap());
        let state = AppState::new(AppConfig::for_testing(), repository);

        let grant = state
            .negotiator
            .request_slot("alice", "file.bin", 1)
            .unwrap();
        assert!(state.slots.consume(&grant.slot.id).is_some());
    }
}
