//! User operations and user-to-group mappings.

use std::collections::HashSet;

use accessmux_config::{DataElement, Role};
use accessmux_stats::{CountMetric, IntervalMetric};

use crate::model::{Group, User};

use super::{Coordinator, OperationError};

impl Coordinator {
    /// Add a user. Routed to the single user-event shard owning it.
    pub async fn add_user(&self, user: &User) -> Result<(), OperationError> {
        self.timed(IntervalMetric::UserAddTime, CountMetric::UserAdded, async {
            let shard = self.route(DataElement::User, Role::Event, user.as_str())?;
            shard.client().add_user(user).await.map_err(|error| {
                OperationError::shard(format!("add user '{}' to", user), shard.description(), error)
            })
        })
        .await
    }

    /// Remove a user from every user-event shard, cascading away any
    /// mapping that references it.
    pub async fn remove_user(&self, user: &User) -> Result<(), OperationError> {
        self.timed(
            IntervalMetric::UserRemoveTime,
            CountMetric::UserRemoved,
            async {
                let shards = self.route_all(&[(DataElement::User, Role::Event)])?;
                self.for_each_shard(shards, |shard| {
                    let user = user.clone();
                    async move {
                        shard.client().remove_user(&user).await.map_err(|error| {
                            OperationError::shard(
                                format!("remove user '{}' from", user),
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

    pub async fn contains_user(&self, user: &User) -> Result<bool, OperationError> {
        self.timed(
            IntervalMetric::ContainsUserQueryTime,
            CountMetric::ContainsUserQuery,
            async {
                let shards = self.route_all(&[(DataElement::User, Role::Query)])?;
                self.any_shard(shards, |shard| {
                    let user = user.clone();
                    async move {
                        shard.client().contains_user(&user).await.map_err(|error| {
                            OperationError::shard(
                                format!("check for user '{}' in", user),
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

    /// All users, unioned across every user-query shard.
    pub async fn users(&self) -> Result<HashSet<User>, OperationError> {
        self.timed(
            IntervalMetric::UsersPropertyQueryTime,
            CountMetric::UsersPropertyQuery,
            async {
                let shards = self.route_all(&[(DataElement::User, Role::Query)])?;
                self.union_from_shards(shards, |shard| async move {
                    shard.client().users().await.map_err(|error| {
                        OperationError::shard(
                            "retrieve users from".into(),
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

    pub async fn add_user_to_group_mapping(
        &self,
        user: &User,
        group: &Group,
    ) -> Result<(), OperationError> {
        self.timed(
            IntervalMetric::UserToGroupMappingAddTime,
            CountMetric::UserToGroupMappingAdded,
            async {
                let shard = self.route(DataElement::User, Role::Event, user.as_str())?;
                shard
                    .client()
                    .add_user_to_group_mapping(user, group)
                    .await
                    .map_err(|error| {
                        OperationError::shard(
                            format!("add mapping between user '{}' and group '{}' to", user, group),
                            shard.description(),
                            error,
                        )
                    })
            },
        )
        .await
    }

    pub async fn remove_user_to_group_mapping(
        &self,
        user: &User,
        group: &Group,
    ) -> Result<(), OperationError> {
        self.timed(
            IntervalMetric::UserToGroupMappingRemoveTime,
            CountMetric::UserToGroupMappingRemoved,
            async {
                let shard = self.route(DataElement::User, Role::Event, user.as_str())?;
                shard
                    .client()
                    .remove_user_to_group_mapping(user, group)
                    .await
                    .map_err(|error| {
                        OperationError::shard(
                            format!(
                                "remove mapping between user '{}' and group '{}' from",
                                user, group
                            ),
                            shard.description(),
                            error,
                        )
                    })
            },
        )
        .await
    }

    /// Groups mapped to a user. With `include_indirect`, the result also
    /// contains every group reachable through the group-to-group graph.
    pub async fn user_to_group_mappings(
        &self,
        user: &User,
        include_indirect: bool,
    ) -> Result<HashSet<Group>, OperationError> {
        let (interval, count) = if include_indirect {
            (
                IntervalMetric::GetUserToGroupMappingsWithIndirectMappingsQueryTime,
                CountMetric::GetUserToGroupMappingsWithIndirectMappingsQuery,
            )
        } else {
            (
                IntervalMetric::GetUserToGroupMappingsQueryTime,
                CountMetric::GetUserToGroupMappingsQuery,
            )
        };
        self.timed(interval, count, async {
            let shard = self.route(DataElement::User, Role::Query, user.as_str())?;
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

            if include_indirect {
                self.expand_groups(direct.into_iter().collect()).await
            } else {
                Ok(direct.into_iter().collect())
            }
        })
        .await
    }

    /// Users mapped to a group. With `include_indirect`, users mapped to
    /// any group that can reach `group` through the group-to-group graph
    /// count as well.
    pub async fn group_to_user_mappings(
        &self,
        group: &Group,
        include_indirect: bool,
    ) -> Result<HashSet<User>, OperationError> {
        let (interval, count) = if include_indirect {
            (
                IntervalMetric::GetGroupToUserMappingsWithIndirectMappingsQueryTime,
                CountMetric::GetGroupToUserMappingsWithIndirectMappingsQuery,
            )
        } else {
            (
                IntervalMetric::GetGroupToUserMappingsQueryTime,
                CountMetric::GetGroupToUserMappingsQuery,
            )
        };
        self.timed(interval, count, async {
            let groups: Vec<Group> = if include_indirect {
                self.reverse_expand_groups(HashSet::from([group.clone()]))
                    .await?
                    .into_iter()
                    .collect()
            } else {
                vec![group.clone()]
            };

            let shards = self.route_all(&[(DataElement::User, Role::Query)])?;
            self.union_from_shards(shards, |shard| {
                let groups = groups.clone();
                let group = group.clone();
                async move {
                    shard
                        .client()
                        .group_to_user_mappings(&groups)
                        .await
                        .map_err(|error| {
                            OperationError::shard(
                                format!("retrieve group to user mappings for group '{}' from", group),
                                shard.description(),
                                error,
                            )
                        })
                }
            })
            .await
        })
        .await
    }
}
