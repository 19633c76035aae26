use std::collections::HashSet;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Catalog section exists (enforced by serde)
/// - Queue base URL is set
/// - Polling ceiling is non-zero
/// - No two subjects render into the same output directory
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.queue.base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "queue.base_url cannot be empty".to_string(),
        ));
    }

    if config.batch.max_poll_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "batch.max_poll_attempts cannot be 0".to_string(),
        ));
    }

    // Distinct output directories keep work items from clobbering each other
    let mut seen_dirs = HashSet::new();
    for (id, subject) in &config.catalog.subjects {
        if subject.dir.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "subject {} has an empty output directory",
                id
            )));
        }
        if !seen_dirs.insert(subject.dir.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "output directory {} is shared by more than one subject",
                subject.dir
            )));
        }
    }

    Ok(())
}
