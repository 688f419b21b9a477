//! Shows how identifiers route through a shard configuration, without
//! touching the network: two shards per `(element, role)` pair, split at
//! the top of the hash range.
//!
//! Run with `cargo run --example routing`.

use std::sync::Arc;

use accessmux::config::{ClientConfig, DataElement, Role, ShardDescriptor, ShardSet};
use accessmux::stats::LogEmitter;
use accessmux::{Coordinator, HttpClientFactory, ShardManager};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let mut shards = Vec::new();
    for element in DataElement::ALL {
        for role in Role::ALL {
            for (index, start) in [0u32, 0x8000_0000].into_iter().enumerate() {
                let host = format!("{:?}-{:?}-{}", element, role, index).to_lowercase();
                shards.push(ShardDescriptor {
                    element,
                    role,
                    hash_range_start: start,
                    client: ClientConfig::new(
                        format!("http://{}.access.local:5000/", host).parse()?,
                    ),
                    description: format!("{:?}{:?}{}", element, role, index),
                });
            }
        }
    }

    let manager = Arc::new(ShardManager::new(
        ShardSet::new(shards)?,
        Arc::new(HttpClientFactory),
    )?);
    let _coordinator = Coordinator::new(manager.clone(), Arc::new(LogEmitter::new()))?;

    for user in ["alice", "bob", "carol", "dave"] {
        let handle = manager.client(DataElement::User, Role::Query, user)?;
        println!("user '{}' is served by {}", user, handle.description());
    }
    for group in ["engineering", "sales", "support"] {
        let handle = manager.client(DataElement::GroupToGroupMapping, Role::Event, group)?;
        println!(
            "group graph edges from '{}' are stored on {}",
            group,
            handle.description()
        );
    }

    Ok(())
}
