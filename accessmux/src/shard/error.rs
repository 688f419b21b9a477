use thiserror::Error;

use accessmux_config::{DataElement, Role};

#[derive(Debug, Error)]
pub enum Error {
    #[error("no shards are configured for {element} {role} operations")]
    NoRoute { element: DataElement, role: Role },

    #[error("{0}")]
    Client(#[from] crate::client::Error),

    #[error("{0}")]
    Config(#[from] accessmux_config::Error),
}

/// A configuration refresh failed; the previous configuration remains in
/// effect.
#[derive(Debug, Error)]
#[error("shard configuration refresh failed: {source}")]
pub struct RefreshError {
    #[from]
    source: Error,
}
