//! Owner of all live shard clients.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::info;

use accessmux_config::{DataElement, Role, ShardSet};

use crate::client::ClientFactory;
use crate::partition;

use super::error::{Error, RefreshError};
use super::handle::ShardHandle;
use super::snapshot::Snapshot;

/// Routes identifiers to shard clients and owns every live client.
///
/// Reads go through an [`ArcSwap`] snapshot: a concurrent refresh never
/// produces a torn view, and an operation that grabbed its handles before
/// the refresh keeps its pre-refresh clients alive until it completes.
/// Refreshes serialize behind a mutex and swap only a fully built
/// snapshot; on any construction failure the previous configuration stays
/// in effect.
pub struct ShardManager {
    snapshot: ArcSwap<Snapshot>,
    factory: Arc<dyn ClientFactory>,
    refresh_lock: Mutex<()>,
}

impl ShardManager {
    /// Install the initial configuration, building a client per shard.
    pub fn new(set: ShardSet, factory: Arc<dyn ClientFactory>) -> Result<Self, RefreshError> {
        let snapshot = Snapshot::build(set, factory.as_ref(), &Default::default())
            .map_err(RefreshError::from)?;
        Ok(Self {
            snapshot: ArcSwap::from_pointee(snapshot),
            factory,
            refresh_lock: Mutex::new(()),
        })
    }

    /// The shard owning `identifier` for the given element and role.
    pub fn client(
        &self,
        element: DataElement,
        role: Role,
        identifier: &str,
    ) -> Result<ShardHandle, Error> {
        let snapshot = self.snapshot.load();
        let table = snapshot.table(element, role)?;
        Ok(table.select(partition::hash(identifier)).clone())
    }

    /// Group `identifiers` by owning shard. Each shard appears once,
    /// paired with the identifiers routed to it.
    pub fn clients_for<T: AsRef<str>>(
        &self,
        element: DataElement,
        role: Role,
        identifiers: impl IntoIterator<Item = T>,
    ) -> Result<Vec<(ShardHandle, Vec<T>)>, Error> {
        let snapshot = self.snapshot.load();
        let table = snapshot.table(element, role)?;

        let mut grouped: Vec<Option<(ShardHandle, Vec<T>)>> = Vec::new();
        grouped.resize_with(table.handles().len(), || None);

        for identifier in identifiers {
            let index = table.select_index(partition::hash(identifier.as_ref()));
            grouped[index]
                .get_or_insert_with(|| (table.handles()[index].clone(), Vec::new()))
                .1
                .push(identifier);
        }

        Ok(grouped.into_iter().flatten().collect())
    }

    /// Every shard serving the given element and role.
    pub fn all_clients(&self, element: DataElement, role: Role) -> Result<Vec<ShardHandle>, Error> {
        let snapshot = self.snapshot.load();
        Ok(snapshot.table(element, role)?.handles().to_vec())
    }

    /// The currently installed shard configuration set.
    pub fn current_set(&self) -> ShardSet {
        self.snapshot.load().set().clone()
    }

    /// Atomically replace the active configuration.
    ///
    /// Clients whose descriptors appear unchanged in `set` are reused;
    /// new descriptors get clients from the factory. If any construction
    /// fails nothing is swapped. Clients retired by the swap are released
    /// once the last in-flight operation drops its handle.
    pub fn refresh(&self, set: ShardSet) -> Result<(), RefreshError> {
        let _guard = self.refresh_lock.lock();

        let current = self.snapshot.load_full();
        let next = Snapshot::build(set, self.factory.as_ref(), current.clients())
            .map_err(RefreshError::from)?;

        let reused = next
            .clients()
            .keys()
            .filter(|descriptor| current.clients().contains_key(*descriptor))
            .count();
        info!(
            shards = next.clients().len(),
            reused, "shard configuration refreshed"
        );

        self.snapshot.store(Arc::new(next));
        Ok(())
    }
}
