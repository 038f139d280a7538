// Configuration source loading
//
// Priority order:
// 1. Environment variables
// 2. Config file path from DYNAMO2JSON_CONFIG
// 3. Default config files (./dynamo2json.toml, ./.dynamo2json.toml)

use crate::{ConfigError, ExportConfigOverlay};
use std::env;
use std::path::Path;

pub const TABLE_NAME_VAR: &str = "TABLE_NAME";
pub const BUCKET_VAR: &str = "S3_BUCKET";
pub const KEY_PREFIX_VAR: &str = "S3_PREFIX";
pub const MAX_ITEMS_VAR: &str = "MAX_ITEMS";
pub const MAX_SCAN_PAGES_VAR: &str = "MAX_SCAN_PAGES";
pub const REGION_VAR: &str = "AWS_REGION";
pub const ENDPOINT_VAR: &str = "AWS_ENDPOINT_URL";

const CONFIG_PATH_VAR: &str = "DYNAMO2JSON_CONFIG";
const DEFAULT_CONFIG_FILES: &[&str] = &["./dynamo2json.toml", "./.dynamo2json.toml"];

/// Read access to the environment, abstracted so loading is testable
/// without mutating process state.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

/// Collect the overlay contributed by environment variables.
pub fn overlay_from_env(env: &dyn EnvSource) -> Result<ExportConfigOverlay, ConfigError> {
    Ok(ExportConfigOverlay {
        table_name: env.get(TABLE_NAME_VAR),
        bucket: env.get(BUCKET_VAR),
        key_prefix: env.get(KEY_PREFIX_VAR),
        max_items: parse_count(env, MAX_ITEMS_VAR)?,
        max_scan_pages: parse_count(env, MAX_SCAN_PAGES_VAR)?,
        region: env.get(REGION_VAR),
        endpoint: env.get(ENDPOINT_VAR),
    })
}

fn parse_count(env: &dyn EnvSource, var: &'static str) -> Result<Option<usize>, ConfigError> {
    match env.get(var) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { env_var: var, value }),
    }
}

/// Overlay from DYNAMO2JSON_CONFIG or the default file locations, `None`
/// when no config file is present.
pub fn load_from_default_files(
    env: &dyn EnvSource,
) -> Result<Option<ExportConfigOverlay>, ConfigError> {
    if let Some(path) = env.get(CONFIG_PATH_VAR) {
        return overlay_from_file(Path::new(&path)).map(Some);
    }

    for path in DEFAULT_CONFIG_FILES {
        if Path::new(path).exists() {
            return overlay_from_file(Path::new(path)).map(Some);
        }
    }

    Ok(None)
}

pub fn overlay_from_file(path: &Path) -> Result<ExportConfigOverlay, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::ParseFile {
        path: path.display().to_string(),
        source,
    })
}
