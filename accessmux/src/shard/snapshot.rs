//! One immutable view of the shard configuration plus its client pool.

use std::collections::HashMap;
use std::sync::Arc;

use accessmux_config::{DataElement, Role, ShardDescriptor, ShardSet};

use crate::client::{ClientFactory, ShardClient};
use crate::partition;

use super::error::Error;
use super::handle::ShardHandle;

/// Sorted hash range starts and their shard handles for one
/// `(element, role)` pair.
pub(crate) struct RangeTable {
    starts: Vec<u32>,
    handles: Vec<ShardHandle>,
}

impl RangeTable {
    /// The shard owning `hash`. The table is never empty and always starts
    /// at 0, guaranteed by `ShardSet` validation.
    pub(crate) fn select(&self, hash: u32) -> &ShardHandle {
        &self.handles[partition::select(&self.starts, hash)]
    }

    pub(crate) fn select_index(&self, hash: u32) -> usize {
        partition::select(&self.starts, hash)
    }

    pub(crate) fn handles(&self) -> &[ShardHandle] {
        &self.handles
    }
}

/// The configuration, routing tables, and clients live at one instant.
///
/// Snapshots are immutable: a refresh builds a whole new snapshot and swaps
/// it in, so readers never observe a torn mixture of old and new shards.
pub(crate) struct Snapshot {
    set: ShardSet,
    tables: HashMap<(DataElement, Role), RangeTable>,
    clients: HashMap<ShardDescriptor, Arc<dyn ShardClient>>,
}

impl Snapshot {
    /// Build a snapshot for `set`, reusing clients from `reuse` for
    /// descriptors that already have one and constructing the rest through
    /// the factory. Any construction failure aborts the whole build;
    /// partially constructed clients are dropped on return.
    pub(crate) fn build(
        set: ShardSet,
        factory: &dyn ClientFactory,
        reuse: &HashMap<ShardDescriptor, Arc<dyn ShardClient>>,
    ) -> Result<Self, Error> {
        let mut clients: HashMap<ShardDescriptor, Arc<dyn ShardClient>> = HashMap::new();
        for descriptor in set.descriptors() {
            if clients.contains_key(descriptor) {
                continue;
            }
            let client = match reuse.get(descriptor) {
                Some(existing) => existing.clone(),
                None => factory.build(&descriptor.client)?,
            };
            clients.insert(descriptor.clone(), client);
        }

        let mut groups: HashMap<(DataElement, Role), Vec<&ShardDescriptor>> = HashMap::new();
        for descriptor in set.descriptors() {
            groups
                .entry((descriptor.element, descriptor.role))
                .or_default()
                .push(descriptor);
        }

        let mut tables = HashMap::new();
        for ((element, role), mut descriptors) in groups {
            descriptors.sort_by_key(|descriptor| descriptor.hash_range_start);
            let starts = descriptors
                .iter()
                .map(|descriptor| descriptor.hash_range_start)
                .collect();
            let handles = descriptors
                .iter()
                .map(|descriptor| {
                    ShardHandle::new(clients[*descriptor].clone(), &descriptor.description)
                })
                .collect();
            tables.insert((element, role), RangeTable { starts, handles });
        }

        Ok(Self {
            set,
            tables,
            clients,
        })
    }

    pub(crate) fn table(&self, element: DataElement, role: Role) -> Result<&RangeTable, Error> {
        self.tables
            .get(&(element, role))
            .ok_or(Error::NoRoute { element, role })
    }

    pub(crate) fn set(&self) -> &ShardSet {
        &self.set
    }

    pub(crate) fn clients(&self) -> &HashMap<ShardDescriptor, Arc<dyn ShardClient>> {
        &self.clients
    }
}
