//! Engine configuration.
//!
//! One `EngineConfig` is handed to every execution context. It carries the
//! cache budgets used by the sorter and the join, the B+-tree order and the
//! location of persisted data.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_BTREE_ORDER, DEFAULT_DATA_DIR, DEFAULT_JOIN_BLOCK_BYTES, DEFAULT_SORT_CACHE_BYTES,
    DEFAULT_VECTOR_CAPACITY, MIN_BTREE_ORDER,
};
use crate::error::{StrataError, StrataResult};

/// Engine configuration.
///
/// # Example
///
/// ```rust
/// use strata_common::config::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.btree_order, 16);
/// assert_eq!(config.sort_cache_bytes, 32_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory holding the catalog and column files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// B+-tree order. Nodes hold at most `2 * btree_order` keys.
    #[serde(default = "default_btree_order")]
    pub btree_order: usize,

    /// Bytes of cache one sort run may occupy.
    #[serde(default = "default_sort_cache_bytes")]
    pub sort_cache_bytes: usize,

    /// Bytes of one join block.
    #[serde(default = "default_join_block_bytes")]
    pub join_block_bytes: usize,

    /// Initial capacity of newly created column vectors.
    #[serde(default = "default_vector_initial_capacity")]
    pub vector_initial_capacity: usize,

    /// Call `fsync` on every persisted file before renaming it into place.
    #[serde(default = "default_sync_writes")]
    pub sync_writes: bool,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_btree_order() -> usize {
    DEFAULT_BTREE_ORDER
}

fn default_sort_cache_bytes() -> usize {
    DEFAULT_SORT_CACHE_BYTES
}

fn default_join_block_bytes() -> usize {
    DEFAULT_JOIN_BLOCK_BYTES
}

fn default_vector_initial_capacity() -> usize {
    DEFAULT_VECTOR_CAPACITY
}

fn default_sync_writes() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            btree_order: default_btree_order(),
            sort_cache_bytes: default_sort_cache_bytes(),
            join_block_bytes: default_join_block_bytes(),
            vector_initial_capacity: default_vector_initial_capacity(),
            sync_writes: default_sync_writes(),
        }
    }
}

impl EngineConfig {
    /// Creates a new configuration with the specified data directory.
    #[must_use]
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Creates a small configuration for testing.
    ///
    /// A low tree order and a tiny sort run force splits and merge passes
    /// on small inputs.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            data_dir: std::env::temp_dir().join("stratadb_test"),
            btree_order: 2,
            sort_cache_bytes: 64,
            join_block_bytes: 64,
            vector_initial_capacity: 2,
            sync_writes: false,
        }
    }

    /// Creates a builder for configuration.
    #[must_use]
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }

    /// Number of `(value, index)` pairs in one sort run. Never zero.
    #[must_use]
    pub fn sort_run_len(&self) -> usize {
        (self.sort_cache_bytes / (2 * std::mem::size_of::<i32>())).max(1)
    }

    /// Number of values in one join block. Never zero.
    #[must_use]
    pub fn join_block_len(&self) -> usize {
        (self.join_block_bytes / std::mem::size_of::<i32>()).max(1)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> StrataResult<()> {
        if self.btree_order < MIN_BTREE_ORDER {
            return Err(config_error(format!(
                "btree_order must be at least {MIN_BTREE_ORDER}"
            )));
        }
        if self.sort_cache_bytes == 0 {
            return Err(config_error("sort_cache_bytes must be non-zero"));
        }
        if self.join_block_bytes == 0 {
            return Err(config_error("join_block_bytes must be non-zero"));
        }
        if self.vector_initial_capacity == 0 {
            return Err(config_error("vector_initial_capacity must be non-zero"));
        }
        Ok(())
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> StrataResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| config_error(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to a file.
    pub fn save(&self, path: &Path) -> StrataResult<()> {
        let content = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Serializes the configuration to TOML.
    pub fn to_toml(&self) -> StrataResult<String> {
        toml::to_string_pretty(self).map_err(|e| config_error(e.to_string()))
    }
}

fn config_error(message: impl Into<String>) -> StrataError {
    StrataError::Config {
        message: message.into(),
    }
}

/// Builder for engine configuration.
#[derive(Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the data directory.
    #[must_use]
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = dir.into();
        self
    }

    /// Sets the B+-tree order.
    #[must_use]
    pub fn btree_order(mut self, order: usize) -> Self {
        self.config.btree_order = order;
        self
    }

    /// Sets the sort run budget in bytes.
    #[must_use]
    pub fn sort_cache_bytes(mut self, bytes: usize) -> Self {
        self.config.sort_cache_bytes = bytes;
        self
    }

    /// Sets the join block budget in bytes.
    #[must_use]
    pub fn join_block_bytes(mut self, bytes: usize) -> Self {
        self.config.join_block_bytes = bytes;
        self
    }

    /// Sets the initial vector capacity.
    #[must_use]
    pub fn vector_initial_capacity(mut self, capacity: usize) -> Self {
        self.config.vector_initial_capacity = capacity;
        self
    }

    /// Enables or disables fsync on persisted files.
    #[must_use]
    pub fn sync_writes(mut self, enabled: bool) -> Self {
        self.config.sync_writes = enabled;
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> StrataResult<EngineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
