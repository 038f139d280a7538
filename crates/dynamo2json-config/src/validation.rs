// Configuration validation
//
// Required fields must be non-empty; the numeric knobs get sanity warnings
// rather than hard failures so an intentionally tiny or huge export still
// runs.

use crate::{ConfigError, ExportConfig};
use tracing::warn;

pub fn validate_config(config: &ExportConfig) -> Result<(), ConfigError> {
    if config.table_name.trim().is_empty() {
        return Err(ConfigError::Invalid("table_name must not be empty".into()));
    }

    if config.bucket.trim().is_empty() {
        return Err(ConfigError::Invalid("bucket must not be empty".into()));
    }

    if config.key_prefix.is_empty() {
        warn!("key_prefix is empty; export objects will sit at the bucket root with a leading '/'");
    }

    if config.max_items == 0 {
        warn!("max_items is 0; every export will be an empty no-op");
    }

    if config.max_items > 10_000 {
        warn!(
            max_items = config.max_items,
            "max_items is very large; the whole batch is held in memory"
        );
    }

    Ok(())
}
