//! Application component and access level mappings.

use std::collections::HashSet;

use accessmux_config::{DataElement, Role};
use accessmux_stats::{CountMetric, IntervalMetric};

use crate::model::{AccessLevel, ApplicationComponent, ComponentAccess, Group, User};

use super::{Coordinator, OperationError};

impl Coordinator {
    pub async fn add_user_to_application_component_mapping(
        &self,
        user: &User,
        component: &ApplicationComponent,
        access: &AccessLevel,
    ) -> Result<(), OperationError> {
        self.timed(
            IntervalMetric::UserToApplicationComponentAndAccessLevelMappingAddTime,
            CountMetric::UserToApplicationComponentAndAccessLevelMappingAdded,
            async {
                let shard = self.route(DataElement::User, Role::Event, user.as_str())?;
                shard
                    .client()
                    .add_user_to_application_component_mapping(user, component, access)
                    .await
                    .map_err(|error| {
                        OperationError::shard(
                            format!(
                                "add mapping between user '{}' and application component '{}' to",
                                user, component
                            ),
                            shard.description(),
                            error,
                        )
                    })
            },
        )
        .await
    }

    pub async fn remove_user_to_application_component_mapping(
        &self,
        user: &User,
        component: &ApplicationComponent,
        access: &AccessLevel,
    ) -> Result<(), OperationError> {
        self.timed(
            IntervalMetric::UserToApplicationComponentAndAccessLevelMappingRemoveTime,
            CountMetric::UserToApplicationComponentAndAccessLevelMappingRemoved,
            async {
                let shard = self.route(DataElement::User, Role::Event, user.as_str())?;
                shard
                    .client()
                    .remove_user_to_application_component_mapping(user, component, access)
                    .await
                    .map_err(|error| {
                        OperationError::shard(
                            format!(
                                "remove mapping between user '{}' and application component '{}' from",
                                user, component
                            ),
                            shard.description(),
                            error,
                        )
                    })
            },
        )
        .await
    }

    /// Component and access level pairs directly mapped to a user.
    pub async fn user_to_application_component_mappings(
        &self,
        user: &User,
    ) -> Result<HashSet<ComponentAccess>, OperationError> {
        self.timed(
            IntervalMetric::GetUserToApplicationComponentAndAccessLevelMappingsQueryTime,
            CountMetric::GetUserToApplicationComponentAndAccessLevelMappingsQuery,
            async {
                let shard = self.route(DataElement::User, Role::Query, user.as_str())?;
                let mappings = shard
                    .client()
                    .user_to_application_component_mappings(user)
                    .await
                    .map_err(|error| {
                        OperationError::shard(
                            format!(
                                "retrieve user to application component and access level mappings for user '{}' from",
                                user
                            ),
                            shard.description(),
                            error,
                        )
                    })?;
                Ok(mappings.into_iter().collect())
            },
        )
        .await
    }

    pub async fn add_group_to_application_component_mapping(
        &self,
        group: &Group,
        component: &ApplicationComponent,
        access: &AccessLevel,
    ) -> Result<(), OperationError> {
        self.timed(
            IntervalMetric::GroupToApplicationComponentAndAccessLevelMappingAddTime,
            CountMetric::GroupToApplicationComponentAndAccessLevelMappingAdded,
            async {
                let shard = self.route(DataElement::Group, Role::Event, group.as_str())?;
                shard
                    .client()
                    .add_group_to_application_component_mapping(group, component, access)
                    .await
                    .map_err(|error| {
                        OperationError::shard(
                            format!(
                                "add mapping between group '{}' and application component '{}' to",
                                group, component
                            ),
                            shard.description(),
                            error,
                        )
                    })
            },
        )
        .await
    }

    pub async fn remove_group_to_application_component_mapping(
        &self,
        group: &Group,
        component: &ApplicationComponent,
        access: &AccessLevel,
    ) -> Result<(), OperationError> {
        self.timed(
            IntervalMetric::GroupToApplicationComponentAndAccessLevelMappingRemoveTime,
            CountMetric::GroupToApplicationComponentAndAccessLevelMappingRemoved,
            async {
                let shard = self.route(DataElement::Group, Role::Event, group.as_str())?;
                shard
                    .client()
                    .remove_group_to_application_component_mapping(group, component, access)
                    .await
                    .map_err(|error| {
                        OperationError::shard(
                            format!(
                                "remove mapping between group '{}' and application component '{}' from",
                                group, component
                            ),
                            shard.description(),
                            error,
                        )
                    })
            },
        )
        .await
    }

    /// Component and access level pairs directly mapped to a group.
    pub async fn group_to_application_component_mappings(
        &self,
        group: &Group,
    ) -> Result<HashSet<ComponentAccess>, OperationError> {
        self.timed(
            IntervalMetric::GetGroupToApplicationComponentAndAccessLevelMappingsQueryTime,
            CountMetric::GetGroupToApplicationComponentAndAccessLevelMappingsQuery,
            async {
                let shard = self.route(DataElement::Group, Role::Query, group.as_str())?;
                let mappings = shard
                    .client()
                    .group_to_application_component_mappings(group)
                    .await
                    .map_err(|error| {
                        OperationError::shard(
                            format!(
                                "retrieve group to application component and access level mappings for group '{}' from",
                                group
                            ),
                            shard.description(),
                            error,
                        )
                    })?;
                Ok(mappings.into_iter().collect())
            },
        )
        .await
    }
}
