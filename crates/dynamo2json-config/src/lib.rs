// dynamo2json-config - export job configuration
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority)
// 2. Config file path from DYNAMO2JSON_CONFIG env var
// 3. Default config file locations (./dynamo2json.toml, ./.dynamo2json.toml)
//
// The Lambda entrypoint uses from_env() only, matching how the function is
// configured in its hosting environment. The CLI stages overlays from file,
// environment, and flags before resolving.

use serde::{Deserialize, Serialize};
use std::path::Path;

mod sources;
mod validation;

pub use sources::{EnvSource, StdEnvSource};

/// Resolved export job configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Table to scan.
    pub table_name: String,

    /// Destination bucket for export objects.
    pub bucket: String,

    /// Key prefix under which export objects are written.
    pub key_prefix: String,

    /// Maximum number of records per export object.
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    /// Maximum number of continuation pages followed per scan. The first
    /// scan request is always issued, so a fetch makes at most
    /// `max_scan_pages + 1` requests.
    #[serde(default = "default_max_scan_pages")]
    pub max_scan_pages: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Custom endpoint for S3-compatible stores and local stacks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

fn default_max_items() -> usize {
    50
}

fn default_max_scan_pages() -> usize {
    10
}

/// Partial configuration collected from one source. Sources are merged in
/// priority order before resolving into an [`ExportConfig`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportConfigOverlay {
    pub table_name: Option<String>,
    pub bucket: Option<String>,
    pub key_prefix: Option<String>,
    pub max_items: Option<usize>,
    pub max_scan_pages: Option<usize>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
}

impl ExportConfigOverlay {
    /// Overlay contributed by environment variables.
    pub fn from_env(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        sources::overlay_from_env(env)
    }

    /// Overlay parsed from a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        sources::overlay_from_file(path.as_ref())
    }

    /// Overlay from the default config file locations, or an empty overlay
    /// when no config file is present.
    pub fn from_default_files(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        Ok(sources::load_from_default_files(env)?.unwrap_or_default())
    }

    /// Overlay `higher` on top of `self`; set fields in `higher` win.
    pub fn merge(&mut self, higher: ExportConfigOverlay) {
        macro_rules! take {
            ($field:ident) => {
                if higher.$field.is_some() {
                    self.$field = higher.$field;
                }
            };
        }
        take!(table_name);
        take!(bucket);
        take!(key_prefix);
        take!(max_items);
        take!(max_scan_pages);
        take!(region);
        take!(endpoint);
    }

    /// Turn the merged overlay into a full config, applying defaults for
    /// the optional knobs and failing on missing required fields.
    pub fn resolve(self) -> Result<ExportConfig, ConfigError> {
        let require = |field: Option<String>, name: &'static str, env_var: &'static str| {
            field.ok_or(ConfigError::MissingField { field: name, env_var })
        };

        Ok(ExportConfig {
            table_name: require(self.table_name, "table_name", sources::TABLE_NAME_VAR)?,
            bucket: require(self.bucket, "bucket", sources::BUCKET_VAR)?,
            key_prefix: require(self.key_prefix, "key_prefix", sources::KEY_PREFIX_VAR)?,
            max_items: self.max_items.unwrap_or_else(default_max_items),
            max_scan_pages: self.max_scan_pages.unwrap_or_else(default_max_scan_pages),
            region: self.region,
            endpoint: self.endpoint,
        })
    }
}

impl ExportConfig {
    /// Environment-only configuration, read once at process start.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_source(&StdEnvSource)
    }

    /// Environment-only configuration from an explicit source (testable).
    pub fn from_env_source(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let config = sources::overlay_from_env(env)?.resolve()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate_config(self)
    }
}

/// Configuration loading and validation failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required configuration: {field} (set {env_var} or add it to the config file)")]
    MissingField {
        field: &'static str,
        env_var: &'static str,
    },

    #[error("invalid value {value:?} for {env_var}: expected a non-negative integer")]
    InvalidNumber {
        env_var: &'static str,
        value: String,
    },

    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
