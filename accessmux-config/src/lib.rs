//! Configuration for accessmux.
//!
//! A shard configuration set describes every backend node of the sharded
//! access manager: which data element it partitions, whether it serves
//! queries or events, where its hash range starts, and how to reach it.

pub mod client;
pub mod core;
pub mod error;
pub mod sharding;

pub use client::ClientConfig;
pub use core::Config;
pub use error::Error;
pub use sharding::{DataElement, Role, ShardDescriptor, ShardSet};

/// Largest accepted retry count for a shard client.
pub const MAX_RETRY_COUNT: u32 = 59;

/// Largest accepted retry interval for a shard client, in seconds.
pub const MAX_RETRY_INTERVAL: u64 = 120;
