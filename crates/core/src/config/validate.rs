use super::{types::Config, ConfigError};
use crate::processor::MAX_POOL_SIZE;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Processor pool has at least one worker and fits the pool semaphore
/// - Processor run timeout is at least one second
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.processor.pool_size == 0 {
        return Err(ConfigError::ValidationError(
            "processor.pool_size must be at least 1".to_string(),
        ));
    }

    if config.processor.pool_size > MAX_POOL_SIZE {
        return Err(ConfigError::ValidationError(format!(
            "processor.pool_size must be at most {}",
            MAX_POOL_SIZE
        )));
    }

    if config.processor.run_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "processor.run_timeout_secs must be at least 1".to_string(),
        ));
    }

    Ok(())
}
