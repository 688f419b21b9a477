//! The operation coordinator: the public face of the sharded access
//! manager.
//!
//! Callers written against a single access-manager node can target the
//! coordinator unchanged. Each operation routes to the owning shard(s),
//! fans out in parallel where it spans shards, merges results with set
//! semantics, and brackets itself with metric events.
//!
//! Dropping an operation's future cancels it, along with any in-flight
//! shard calls it fanned out.

mod access;
mod components;
mod entities;
pub mod error;
mod groups;
mod users;

#[cfg(test)]
mod test;

use std::collections::HashSet;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use futures::future::join_all;
use futures::stream::{FuturesUnordered, StreamExt};

use accessmux_config::{DataElement, Role};
use accessmux_stats::{CountMetric, Emitter, IntervalMetric};

use crate::shard::{ShardHandle, ShardManager};

pub use error::OperationError;

/// Fronts the whole sharded access manager.
pub struct Coordinator {
    shards: Arc<ShardManager>,
    metrics: Arc<dyn Emitter>,
}

impl Coordinator {
    /// Coordinator over a full deployment: every `(element, role)` pair
    /// must have at least one shard.
    pub fn new(
        shards: Arc<ShardManager>,
        metrics: Arc<dyn Emitter>,
    ) -> Result<Self, accessmux_config::Error> {
        shards.current_set().check_full()?;
        Ok(Self::partial(shards, metrics))
    }

    /// Coordinator over a partial deployment. Operations touching a role
    /// with no shards fail at call time instead of construction time.
    pub fn partial(shards: Arc<ShardManager>, metrics: Arc<dyn Emitter>) -> Self {
        Self { shards, metrics }
    }

    /// Bracket one operation with metric events: begin/end/increment on
    /// success, begin/cancel on failure.
    async fn timed<T, F>(
        &self,
        interval: IntervalMetric,
        count: CountMetric,
        operation: F,
    ) -> Result<T, OperationError>
    where
        F: Future<Output = Result<T, OperationError>>,
    {
        let token = self.metrics.begin(interval);
        match operation.await {
            Ok(value) => {
                self.metrics.end(token, interval);
                self.metrics.increment(count);
                Ok(value)
            }
            Err(error) => {
                self.metrics.cancel(token, interval);
                Err(error)
            }
        }
    }

    fn route(
        &self,
        element: DataElement,
        role: Role,
        identifier: &str,
    ) -> Result<ShardHandle, OperationError> {
        self.shards
            .client(element, role, identifier)
            .map_err(OperationError::routing)
    }

    /// Every shard for each of the listed roles, concatenated.
    fn route_all(
        &self,
        pairs: &[(DataElement, Role)],
    ) -> Result<Vec<ShardHandle>, OperationError> {
        let mut handles = Vec::new();
        for (element, role) in pairs {
            handles.extend(
                self.shards
                    .all_clients(*element, *role)
                    .map_err(OperationError::routing)?,
            );
        }
        Ok(handles)
    }

    fn group_by_shard<T: AsRef<str>>(
        &self,
        element: DataElement,
        role: Role,
        identifiers: impl IntoIterator<Item = T>,
    ) -> Result<Vec<(ShardHandle, Vec<T>)>, OperationError> {
        self.shards
            .clients_for(element, role, identifiers)
            .map_err(OperationError::routing)
    }

    /// Run `operation` against every target in parallel. All calls run to
    /// completion; the first failure in target order is surfaced. Nothing
    /// is rolled back: backends apply these events idempotently, so a
    /// partial fan-out reconciles on retry.
    async fn for_each_shard<I, F, Fut>(
        &self,
        targets: Vec<I>,
        operation: F,
    ) -> Result<(), OperationError>
    where
        F: Fn(I) -> Fut,
        Fut: Future<Output = Result<(), OperationError>>,
    {
        join_all(targets.into_iter().map(operation))
            .await
            .into_iter()
            .collect()
    }

    /// Parallel fan-out query, deduplicated union of the results.
    async fn union_from_shards<I, T, F, Fut>(
        &self,
        targets: Vec<I>,
        operation: F,
    ) -> Result<HashSet<T>, OperationError>
    where
        T: Eq + Hash,
        F: Fn(I) -> Fut,
        Fut: Future<Output = Result<Vec<T>, OperationError>>,
    {
        let results = join_all(targets.into_iter().map(operation)).await;
        let mut union = HashSet::new();
        for result in results {
            union.extend(result?);
        }
        Ok(union)
    }

    /// Parallel fan-out query, logical OR. Returns as soon as any shard
    /// answers `true`, dropping in-flight peers; a cancelled peer can
    /// never mask the positive result.
    async fn any_shard<I, F, Fut>(&self, targets: Vec<I>, operation: F) -> Result<bool, OperationError>
    where
        F: Fn(I) -> Fut,
        Fut: Future<Output = Result<bool, OperationError>>,
    {
        let mut pending: FuturesUnordered<_> = targets.into_iter().map(operation).collect();
        while let Some(result) = pending.next().await {
            if result? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
