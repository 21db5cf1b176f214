pub mod config;
pub mod item;
pub mod metrics;
pub mod processor;
pub mod service;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    SanitizedConfig, ServerConfig,
};
pub use item::{
    is_valid_email, Item, ItemStore, SqliteItemStore, StoreError, DEFAULT_STATUS,
    PROCESSED_STATUS,
};
pub use processor::{
    ItemProcessor, PoolStatus, ProcessError, ProcessOutcome, ProcessorConfig, UnitOutcome,
};
pub use service::{ItemService, ServiceError};
