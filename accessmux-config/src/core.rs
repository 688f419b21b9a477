//! Configuration file loading.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Error;
use crate::sharding::{ShardDescriptor, ShardSet};

/// Root of the accessmux TOML configuration.
///
/// ```toml
/// [[shards]]
/// element = "user"
/// role = "query"
/// hash_range_start = 0
/// description = "UserQuery0"
///
/// [shards.client]
/// base_url = "http://shard-0.access.local:5000/"
/// retry_count = 5
/// retry_interval = 1
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub shards: Vec<ShardDescriptor>,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let config: Config = toml::from_str(&std::fs::read_to_string(path)?)?;
        let shards = config.shard_set()?;

        info!(
            "loaded {} shard descriptor(s) from \"{}\"",
            shards.len(),
            path.display()
        );

        Ok(config)
    }

    /// Validated shard configuration set.
    pub fn shard_set(&self) -> Result<ShardSet, Error> {
        ShardSet::new(self.shards.clone())
    }
}
