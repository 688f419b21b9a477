use thiserror::Error;

use crate::sharding::{DataElement, Role};
use crate::{MAX_RETRY_COUNT, MAX_RETRY_INTERVAL};

#[derive(Debug, Error)]
pub enum Error {
    #[error("retry_count {0} is out of range (0..={MAX_RETRY_COUNT})")]
    RetryCount(u32),

    #[error("retry_interval {0}s is out of range (0..={MAX_RETRY_INTERVAL}s)")]
    RetryInterval(u64),

    #[error("no shards configured for {element} {role} operations")]
    NoShards { element: DataElement, role: Role },

    #[error("hash ranges for {element} {role} shards don't cover the full range: no shard starts at 0")]
    MissingZeroStart { element: DataElement, role: Role },

    #[error("duplicate hash range start {start} for {element} {role} shards")]
    DuplicateStart {
        element: DataElement,
        role: Role,
        start: u32,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Toml(#[from] toml::de::Error),
}
