use std::sync::Arc;

use itemflow_core::{
    Config, ItemProcessor, ItemService, ItemStore, SanitizedConfig,
};

/// Shared application state
pub struct AppState {
    config: Config,
    service: ItemService,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn ItemStore>, processor: Arc<ItemProcessor>) -> Self {
        Self {
            config,
            service: ItemService::new(store, processor),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn service(&self) -> &ItemService {
        &self.service
    }

    pub fn processor(&self) -> &ItemProcessor {
        self.service.processor()
    }
}
