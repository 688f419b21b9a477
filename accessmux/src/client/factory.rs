//! Builds shard clients from client configuration.

use std::sync::Arc;

use tracing::debug;

use accessmux_config::ClientConfig;

use super::api::ShardClient;
use super::error::Error;
use super::http::HttpShardClient;

/// Builds a client for one shard descriptor during a configuration refresh.
///
/// The shard manager calls this for every descriptor it has no live client
/// for. Tests substitute a factory producing stub clients.
pub trait ClientFactory: Send + Sync {
    fn build(&self, config: &ClientConfig) -> Result<Arc<dyn ShardClient>, Error>;
}

/// The production factory: [`HttpShardClient`]s with the fixed-interval
/// retry strategy described by each descriptor's [`ClientConfig`].
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpClientFactory;

impl ClientFactory for HttpClientFactory {
    fn build(&self, config: &ClientConfig) -> Result<Arc<dyn ShardClient>, Error> {
        debug!(base_url = %config.base_url, "building shard client");
        Ok(Arc::new(HttpShardClient::new(config)?))
    }
}
