//! Transitive-closure authorization queries.
//!
//! Access can be granted to a user directly, or through any group the
//! user reaches via a user-to-group edge followed by group-to-group
//! edges. The group graph is distributed across group-to-group mapping
//! shards, each of which materializes the closure within its own
//! partition, so expansion is a breadth-first fixed point: one bulk call
//! per owning shard per round, repeated until the reachable set stops
//! growing. When a connected component is co-located on one shard the
//! second round discovers nothing and the loop ends.

use std::collections::HashSet;

use accessmux_config::{DataElement, Role};
use accessmux_stats::{AmountMetric, CountMetric, IntervalMetric};

use crate::model::{
    AccessLevel, ApplicationComponent, ComponentAccess, Entity, EntityType, Group, TypedEntity,
    User,
};
use crate::shard::ShardHandle;

use super::{Coordinator, OperationError};

impl Coordinator {
    /// All groups reachable from `seed` through the group-to-group graph,
    /// including the seed groups themselves.
    pub(super) async fn expand_groups(
        &self,
        seed: HashSet<Group>,
    ) -> Result<HashSet<Group>, OperationError> {
        let mut known = seed;
        let mut frontier: Vec<Group> = known.iter().cloned().collect();

        while !frontier.is_empty() {
            let grouped =
                self.group_by_shard(DataElement::GroupToGroupMapping, Role::Query, frontier)?;
            let reachable = self
                .union_from_shards(grouped, |(shard, subset)| async move {
                    shard
                        .client()
                        .group_to_group_mappings(&subset)
                        .await
                        .map_err(|error| {
                            OperationError::shard(
                                "retrieve group to group mappings for multiple groups from"
                                    .into(),
                                shard.description(),
                                error,
                            )
                        })
                })
                .await?;

            let mut fresh = Vec::new();
            for group in reachable {
                if known.insert(group.clone()) {
                    fresh.push(group);
                }
            }
            frontier = fresh;
        }

        Ok(known)
    }

    /// All groups that can reach some group in `seed`, including the seed
    /// groups themselves. Reverse edges can live on any shard, so every
    /// round consults all group-to-group mapping query shards.
    pub(super) async fn reverse_expand_groups(
        &self,
        seed: HashSet<Group>,
    ) -> Result<HashSet<Group>, OperationError> {
        let mut known = seed;
        let mut frontier: Vec<Group> = known.iter().cloned().collect();

        while !frontier.is_empty() {
            let shards = self.route_all(&[(DataElement::GroupToGroupMapping, Role::Query)])?;
            let sources = self
                .union_from_shards(shards, |shard| {
                    let frontier = frontier.clone();
                    async move {
                        shard
                            .client()
                            .group_to_group_reverse_mappings(&frontier)
                            .await
                            .map_err(|error| {
                                OperationError::shard(
                                    "retrieve group to group reverse mappings for multiple groups from"
                                        .into(),
                                    shard.description(),
                                    error,
                                )
                            })
                    }
                })
                .await?;

            let mut fresh = Vec::new();
            for group in sources {
                if known.insert(group.clone()) {
                    fresh.push(group);
                }
            }
            frontier = fresh;
        }

        Ok(known)
    }

    async fn directly_mapped_groups(
        &self,
        shard: &ShardHandle,
        user: &User,
    ) -> Result<HashSet<Group>, OperationError> {
        let direct = shard
            .client()
            .user_to_group_mappings(user, false)
            .await
            .map_err(|error| {
                OperationError::shard(
                    format!("retrieve user to group mappings for user '{}' from", user),
                    shard.description(),
                    error,
                )
            })?;
        Ok(direct.into_iter().collect())
    }

    /// Whether a user can access an application component at a level,
    /// directly or through any reachable group.
    pub async fn has_access_to_application_component(
        &self,
        user: &User,
        component: &ApplicationComponent,
        access: &AccessLevel,
    ) -> Result<bool, OperationError> {
        self.timed(
            IntervalMetric::HasAccessToApplicationComponentForUserQueryTime,
            CountMetric::HasAccessToApplicationComponentForUserQuery,
            async {
                let user_shard = self.route(DataElement::User, Role::Query, user.as_str())?;
                let direct = user_shard
                    .client()
                    .has_access_to_application_component(user, component, access)
                    .await
                    .map_err(|error| {
                        OperationError::shard(
                            format!(
                                "check access to application component '{}' at level '{}' for user '{}' in",
                                component, access, user
                            ),
                            user_shard.description(),
                            error,
                        )
                    })?;
                if direct {
                    return Ok(true);
                }

                let seed = self.directly_mapped_groups(&user_shard, user).await?;
                let groups = self.expand_groups(seed).await?;
                self.metrics.add(
                    AmountMetric::HasAccessToApplicationComponentGroupsMappedToUser,
                    groups.len() as u64,
                );

                let grouped = self.group_by_shard(
                    DataElement::Group,
                    Role::Query,
                    groups.into_iter().collect::<Vec<_>>(),
                )?;
                self.metrics.add(
                    AmountMetric::HasAccessToApplicationComponentGroupShardsQueried,
                    grouped.len() as u64,
                );

                self.any_shard(grouped, |(shard, subset)| async move {
                    shard
                        .client()
                        .has_access_to_application_component_for_groups(&subset, component, access)
                        .await
                        .map_err(|error| {
                            OperationError::shard(
                                format!(
                                    "check access to application component '{}' at level '{}' for multiple groups in",
                                    component, access
                                ),
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

    /// Whether a user can access an entity, directly or through any
    /// reachable group.
    pub async fn has_access_to_entity(
        &self,
        user: &User,
        entity_type: &EntityType,
        entity: &Entity,
    ) -> Result<bool, OperationError> {
        self.timed(
            IntervalMetric::HasAccessToEntityForUserQueryTime,
            CountMetric::HasAccessToEntityForUserQuery,
            async {
                let user_shard = self.route(DataElement::User, Role::Query, user.as_str())?;
                let direct = user_shard
                    .client()
                    .has_access_to_entity(user, entity_type, entity)
                    .await
                    .map_err(|error| {
                        OperationError::shard(
                            format!(
                                "check access to entity '{}' of type '{}' for user '{}' in",
                                entity, entity_type, user
                            ),
                            user_shard.description(),
                            error,
                        )
                    })?;
                if direct {
                    return Ok(true);
                }

                let seed = self.directly_mapped_groups(&user_shard, user).await?;
                let groups = self.expand_groups(seed).await?;
                self.metrics.add(
                    AmountMetric::HasAccessToEntityGroupsMappedToUser,
                    groups.len() as u64,
                );

                let grouped = self.group_by_shard(
                    DataElement::Group,
                    Role::Query,
                    groups.into_iter().collect::<Vec<_>>(),
                )?;
                self.metrics.add(
                    AmountMetric::HasAccessToEntityGroupShardsQueried,
                    grouped.len() as u64,
                );

                self.any_shard(grouped, |(shard, subset)| async move {
                    shard
                        .client()
                        .has_access_to_entity_for_groups(&subset, entity_type, entity)
                        .await
                        .map_err(|error| {
                            OperationError::shard(
                                format!(
                                    "check access to entity '{}' of type '{}' for multiple groups in",
                                    entity, entity_type
                                ),
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

    /// Every application component and access level pair a user can
    /// reach, directly or through groups.
    pub async fn application_components_accessible_by_user(
        &self,
        user: &User,
    ) -> Result<HashSet<ComponentAccess>, OperationError> {
        self.timed(
            IntervalMetric::GetApplicationComponentsAccessibleByUserQueryTime,
            CountMetric::GetApplicationComponentsAccessibleByUserQuery,
            async {
                let user_shard = self.route(DataElement::User, Role::Query, user.as_str())?;
                let mut accessible: HashSet<ComponentAccess> = user_shard
                    .client()
                    .application_components_accessible_by_user(user)
                    .await
                    .map_err(|error| {
                        OperationError::shard(
                            format!(
                                "retrieve application components accessible by user '{}' from",
                                user
                            ),
                            user_shard.description(),
                            error,
                        )
                    })?
                    .into_iter()
                    .collect();

                let seed = self.directly_mapped_groups(&user_shard, user).await?;
                let groups = self.expand_groups(seed).await?;
                self.metrics.add(
                    AmountMetric::GetApplicationComponentsAccessibleByUserGroupsMappedToUser,
                    groups.len() as u64,
                );

                let grouped = self.group_by_shard(
                    DataElement::Group,
                    Role::Query,
                    groups.into_iter().collect::<Vec<_>>(),
                )?;
                self.metrics.add(
                    AmountMetric::GetApplicationComponentsAccessibleByUserGroupShardsQueried,
                    grouped.len() as u64,
                );

                let from_groups = self
                    .union_from_shards(grouped, |(shard, subset)| async move {
                        shard
                            .client()
                            .application_components_accessible_by_groups(&subset)
                            .await
                            .map_err(|error| {
                                OperationError::shard(
                                    "retrieve application components accessible by multiple groups from"
                                        .into(),
                                    shard.description(),
                                    error,
                                )
                            })
                    })
                    .await?;

                accessible.extend(from_groups);
                Ok(accessible)
            },
        )
        .await
    }

    /// Every application component and access level pair reachable from a
    /// group. Same expansion as the user query, minus the user steps.
    pub async fn application_components_accessible_by_group(
        &self,
        group: &Group,
    ) -> Result<HashSet<ComponentAccess>, OperationError> {
        self.timed(
            IntervalMetric::GetApplicationComponentsAccessibleByGroupQueryTime,
            CountMetric::GetApplicationComponentsAccessibleByGroupQuery,
            async {
                let groups = self.expand_groups(HashSet::from([group.clone()])).await?;
                self.metrics.add(
                    AmountMetric::GetApplicationComponentsAccessibleByGroupGroupsMappedToGroup,
                    groups.len() as u64,
                );

                let grouped = self.group_by_shard(
                    DataElement::Group,
                    Role::Query,
                    groups.into_iter().collect::<Vec<_>>(),
                )?;
                self.metrics.add(
                    AmountMetric::GetApplicationComponentsAccessibleByGroupGroupShardsQueried,
                    grouped.len() as u64,
                );

                self.union_from_shards(grouped, |(shard, subset)| async move {
                    shard
                        .client()
                        .application_components_accessible_by_groups(&subset)
                        .await
                        .map_err(|error| {
                            OperationError::shard(
                                "retrieve application components accessible by multiple groups from"
                                    .into(),
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

    /// Every entity a user can reach, directly or through groups.
    pub async fn entities_accessible_by_user(
        &self,
        user: &User,
    ) -> Result<HashSet<TypedEntity>, OperationError> {
        self.timed(
            IntervalMetric::GetEntitiesAccessibleByUserQueryTime,
            CountMetric::GetEntitiesAccessibleByUserQuery,
            async {
                let user_shard = self.route(DataElement::User, Role::Query, user.as_str())?;
                let mut accessible: HashSet<TypedEntity> = user_shard
                    .client()
                    .entities_accessible_by_user(user)
                    .await
                    .map_err(|error| {
                        OperationError::shard(
                            format!("retrieve entities accessible by user '{}' from", user),
                            user_shard.description(),
                            error,
                        )
                    })?
                    .into_iter()
                    .collect();

                let seed = self.directly_mapped_groups(&user_shard, user).await?;
                let groups = self.expand_groups(seed).await?;
                self.metrics.add(
                    AmountMetric::GetEntitiesAccessibleByUserGroupsMappedToUser,
                    groups.len() as u64,
                );

                let grouped = self.group_by_shard(
                    DataElement::Group,
                    Role::Query,
                    groups.into_iter().collect::<Vec<_>>(),
                )?;
                self.metrics.add(
                    AmountMetric::GetEntitiesAccessibleByUserGroupShardsQueried,
                    grouped.len() as u64,
                );

                let from_groups = self
                    .union_from_shards(grouped, |(shard, subset)| async move {
                        shard
                            .client()
                            .entities_accessible_by_groups(&subset)
                            .await
                            .map_err(|error| {
                                OperationError::shard(
                                    "retrieve entities accessible by multiple groups from".into(),
                                    shard.description(),
                                    error,
                                )
                            })
                    })
                    .await?;

                accessible.extend(from_groups);
                Ok(accessible)
            },
        )
        .await
    }

    /// Entities of one type a user can reach, directly or through groups.
    pub async fn entities_of_type_accessible_by_user(
        &self,
        user: &User,
        entity_type: &EntityType,
    ) -> Result<HashSet<Entity>, OperationError> {
        self.timed(
            IntervalMetric::GetEntitiesOfTypeAccessibleByUserQueryTime,
            CountMetric::GetEntitiesOfTypeAccessibleByUserQuery,
            async {
                let user_shard = self.route(DataElement::User, Role::Query, user.as_str())?;
                let mut accessible: HashSet<Entity> = user_shard
                    .client()
                    .entities_of_type_accessible_by_user(user, entity_type)
                    .await
                    .map_err(|error| {
                        OperationError::shard(
                            format!(
                                "retrieve entities of type '{}' accessible by user '{}' from",
                                entity_type, user
                            ),
                            user_shard.description(),
                            error,
                        )
                    })?
                    .into_iter()
                    .collect();

                let seed = self.directly_mapped_groups(&user_shard, user).await?;
                let groups = self.expand_groups(seed).await?;
                self.metrics.add(
                    AmountMetric::GetEntitiesOfTypeAccessibleByUserGroupsMappedToUser,
                    groups.len() as u64,
                );

                let grouped = self.group_by_shard(
                    DataElement::Group,
                    Role::Query,
                    groups.into_iter().collect::<Vec<_>>(),
                )?;
                self.metrics.add(
                    AmountMetric::GetEntitiesOfTypeAccessibleByUserGroupShardsQueried,
                    grouped.len() as u64,
                );

                let from_groups = self
                    .union_from_shards(grouped, |(shard, subset)| async move {
                        shard
                            .client()
                            .entities_of_type_accessible_by_groups(&subset, entity_type)
                            .await
                            .map_err(|error| {
                                OperationError::shard(
                                    format!(
                                        "retrieve entities of type '{}' accessible by multiple groups from",
                                        entity_type
                                    ),
                                    shard.description(),
                                    error,
                                )
                            })
                    })
                    .await?;

                accessible.extend(from_groups);
                Ok(accessible)
            },
        )
        .await
    }

    /// Every entity reachable from a group.
    pub async fn entities_accessible_by_group(
        &self,
        group: &Group,
    ) -> Result<HashSet<TypedEntity>, OperationError> {
        self.timed(
            IntervalMetric::GetEntitiesAccessibleByGroupQueryTime,
            CountMetric::GetEntitiesAccessibleByGroupQuery,
            async {
                let groups = self.expand_groups(HashSet::from([group.clone()])).await?;
                self.metrics.add(
                    AmountMetric::GetEntitiesAccessibleByGroupGroupsMappedToGroup,
                    groups.len() as u64,
                );

                let grouped = self.group_by_shard(
                    DataElement::Group,
                    Role::Query,
                    groups.into_iter().collect::<Vec<_>>(),
                )?;
                self.metrics.add(
                    AmountMetric::GetEntitiesAccessibleByGroupGroupShardsQueried,
                    grouped.len() as u64,
                );

                self.union_from_shards(grouped, |(shard, subset)| async move {
                    shard
                        .client()
                        .entities_accessible_by_groups(&subset)
                        .await
                        .map_err(|error| {
                            OperationError::shard(
                                "retrieve entities accessible by multiple groups from".into(),
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

    /// Entities of one type reachable from a group.
    pub async fn entities_of_type_accessible_by_group(
        &self,
        group: &Group,
        entity_type: &EntityType,
    ) -> Result<HashSet<Entity>, OperationError> {
        self.timed(
            IntervalMetric::GetEntitiesOfTypeAccessibleByGroupQueryTime,
            CountMetric::GetEntitiesOfTypeAccessibleByGroupQuery,
            async {
                let groups = self.expand_groups(HashSet::from([group.clone()])).await?;
                self.metrics.add(
                    AmountMetric::GetEntitiesOfTypeAccessibleByGroupGroupsMappedToGroup,
                    groups.len() as u64,
                );

                let grouped = self.group_by_shard(
                    DataElement::Group,
                    Role::Query,
                    groups.into_iter().collect::<Vec<_>>(),
                )?;
                self.metrics.add(
                    AmountMetric::GetEntitiesOfTypeAccessibleByGroupGroupShardsQueried,
                    grouped.len() as u64,
                );

                self.union_from_shards(grouped, |(shard, subset)| async move {
                    shard
                        .client()
                        .entities_of_type_accessible_by_groups(&subset, entity_type)
                        .await
                        .map_err(|error| {
                            OperationError::shard(
                                format!(
                                    "retrieve entities of type '{}' accessible by multiple groups from",
                                    entity_type
                                ),
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
}
