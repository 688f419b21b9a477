//! Group operations and group-to-group mappings.
//!
//! Groups surface on three kinds of shards: user shards (user-to-group
//! mappings), group shards (the groups themselves and their access
//! mappings), and group-to-group mapping shards (the group graph). Group
//! queries that enumerate or probe existence consult all three.

use std::collections::HashSet;

use accessmux_config::{DataElement, Role};
use accessmux_stats::{CountMetric, IntervalMetric};

use crate::model::Group;

use super::{Coordinator, OperationError};

impl Coordinator {
    /// Add a group: to the group-event shard owning it, and to every
    /// group-to-group mapping event shard, since the group may take part
    /// in the group graph anywhere.
    pub async fn add_group(&self, group: &Group) -> Result<(), OperationError> {
        self.timed(
            IntervalMetric::GroupAddTime,
            CountMetric::GroupAdded,
            async {
                let mut shards = vec![self.route(DataElement::Group, Role::Event, group.as_str())?];
                shards.extend(
                    self.route_all(&[(DataElement::GroupToGroupMapping, Role::Event)])?,
                );
                self.for_each_shard(shards, |shard| {
                    let group = group.clone();
                    async move {
                        shard.client().add_group(&group).await.map_err(|error| {
                            OperationError::shard(
                                format!("add group '{}' to", group),
                                shard.description(),
                                error,
                            )
                        })
                    }
                })
                .await
            },
        )
        .await
    }

    /// Remove a group from every shard that could hold a mapping
    /// involving it: all user-event, group-event, and group-to-group
    /// mapping event shards.
    pub async fn remove_group(&self, group: &Group) -> Result<(), OperationError> {
        self.timed(
            IntervalMetric::GroupRemoveTime,
            CountMetric::GroupRemoved,
            async {
                let shards = self.route_all(&[
                    (DataElement::User, Role::Event),
                    (DataElement::Group, Role::Event),
                    (DataElement::GroupToGroupMapping, Role::Event),
                ])?;
                self.for_each_shard(shards, |shard| {
                    let group = group.clone();
                    async move {
                        shard.client().remove_group(&group).await.map_err(|error| {
                            OperationError::shard(
                                format!("remove group '{}' from", group),
                                shard.description(),
                                error,
                            )
                        })
                    }
                })
                .await
            },
        )
        .await
    }

    pub async fn contains_group(&self, group: &Group) -> Result<bool, OperationError> {
        self.timed(
            IntervalMetric::ContainsGroupQueryTime,
            CountMetric::ContainsGroupQuery,
            async {
                let shards = self.route_all(&[
                    (DataElement::User, Role::Query),
                    (DataElement::Group, Role::Query),
                    (DataElement::GroupToGroupMapping, Role::Query),
                ])?;
                self.any_shard(shards, |shard| {
                    let group = group.clone();
                    async move {
                        shard.client().contains_group(&group).await.map_err(|error| {
                            OperationError::shard(
                                format!("check for group '{}' in", group),
                                shard.description(),
                                error,
                            )
                        })
                    }
                })
                .await
            },
        )
        .await
    }

    /// All groups, unioned across user, group, and group-to-group mapping
    /// query shards.
    pub async fn groups(&self) -> Result<HashSet<Group>, OperationError> {
        self.timed(
            IntervalMetric::GroupsPropertyQueryTime,
            CountMetric::GroupsPropertyQuery,
            async {
                let shards = self.route_all(&[
                    (DataElement::User, Role::Query),
                    (DataElement::Group, Role::Query),
                    (DataElement::GroupToGroupMapping, Role::Query),
                ])?;
                self.union_from_shards(shards, |shard| async move {
                    shard.client().groups().await.map_err(|error| {
                        OperationError::shard(
                            "retrieve groups from".into(),
                            shard.description(),
                            error,
                        )
                    })
                })
                .await
            },
        )
        .await
    }

    /// Map `from` onto `to`. Routed by the "from" side, which partitions
    /// the group graph.
    pub async fn add_group_to_group_mapping(
        &self,
        from: &Group,
        to: &Group,
    ) -> Result<(), OperationError> {
        self.timed(
            IntervalMetric::GroupToGroupMappingAddTime,
            CountMetric::GroupToGroupMappingAdded,
            async {
                let shard =
                    self.route(DataElement::GroupToGroupMapping, Role::Event, from.as_str())?;
                shard
                    .client()
                    .add_group_to_group_mapping(from, to)
                    .await
                    .map_err(|error| {
                        OperationError::shard(
                            format!(
                                "add mapping between group '{}' and group '{}' to",
                                from, to
                            ),
                            shard.description(),
                            error,
                        )
                    })
            },
        )
        .await
    }

    pub async fn remove_group_to_group_mapping(
        &self,
        from: &Group,
        to: &Group,
    ) -> Result<(), OperationError> {
        self.timed(
            IntervalMetric::GroupToGroupMappingRemoveTime,
            CountMetric::GroupToGroupMappingRemoved,
            async {
                let shard =
                    self.route(DataElement::GroupToGroupMapping, Role::Event, from.as_str())?;
                shard
                    .client()
                    .remove_group_to_group_mapping(from, to)
                    .await
                    .map_err(|error| {
                        OperationError::shard(
                            format!(
                                "remove mapping between group '{}' and group '{}' from",
                                from, to
                            ),
                            shard.description(),
                            error,
                        )
                    })
            },
        )
        .await
    }

    /// Groups reachable from `group` through the group-to-group graph.
    pub async fn group_to_group_mappings(
        &self,
        group: &Group,
    ) -> Result<HashSet<Group>, OperationError> {
        self.timed(
            IntervalMetric::GetGroupToGroupMappingsQueryTime,
            CountMetric::GetGroupToGroupMappingsQuery,
            async {
                let mut reachable = self.expand_groups(HashSet::from([group.clone()])).await?;
                reachable.remove(group);
                Ok(reachable)
            },
        )
        .await
    }

    /// Groups from which `group` is reachable.
    pub async fn group_to_group_reverse_mappings(
        &self,
        group: &Group,
    ) -> Result<HashSet<Group>, OperationError> {
        self.timed(
            IntervalMetric::GetGroupToGroupReverseMappingsQueryTime,
            CountMetric::GetGroupToGroupReverseMappingsQuery,
            async {
                let mut sources = self
                    .reverse_expand_groups(HashSet::from([group.clone()]))
                    .await?;
                sources.remove(group);
                Ok(sources)
            },
        )
        .await
    }
}
