//! Entity types, entities, and entity mappings.
//!
//! Entity and entity-type data are not separately partitioned: they live
//! on every user shard and every group shard, so their events fan out to
//! both and their queries union across both.

use std::collections::HashSet;

use accessmux_config::{DataElement, Role};
use accessmux_stats::{CountMetric, IntervalMetric};

use crate::model::{Entity, EntityType, Group, TypedEntity, User};

use super::{Coordinator, OperationError};

impl Coordinator {
    fn entity_event_shards(&self) -> Result<Vec<crate::shard::ShardHandle>, OperationError> {
        self.route_all(&[
            (DataElement::User, Role::Event),
            (DataElement::Group, Role::Event),
        ])
    }

    fn entity_query_shards(&self) -> Result<Vec<crate::shard::ShardHandle>, OperationError> {
        self.route_all(&[
            (DataElement::User, Role::Query),
            (DataElement::Group, Role::Query),
        ])
    }

    pub async fn add_entity_type(&self, entity_type: &EntityType) -> Result<(), OperationError> {
        self.timed(
            IntervalMetric::EntityTypeAddTime,
            CountMetric::EntityTypeAdded,
            async {
                let shards = self.entity_event_shards()?;
                self.for_each_shard(shards, |shard| {
                    let entity_type = entity_type.clone();
                    async move {
                        shard
                            .client()
                            .add_entity_type(&entity_type)
                            .await
                            .map_err(|error| {
                                OperationError::shard(
                                    format!("add entity type '{}' to", entity_type),
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

    pub async fn remove_entity_type(&self, entity_type: &EntityType) -> Result<(), OperationError> {
        self.timed(
            IntervalMetric::EntityTypeRemoveTime,
            CountMetric::EntityTypeRemoved,
            async {
                let shards = self.entity_event_shards()?;
                self.for_each_shard(shards, |shard| {
                    let entity_type = entity_type.clone();
                    async move {
                        shard
                            .client()
                            .remove_entity_type(&entity_type)
                            .await
                            .map_err(|error| {
                                OperationError::shard(
                                    format!("remove entity type '{}' from", entity_type),
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

    pub async fn contains_entity_type(
        &self,
        entity_type: &EntityType,
    ) -> Result<bool, OperationError> {
        self.timed(
            IntervalMetric::ContainsEntityTypeQueryTime,
            CountMetric::ContainsEntityTypeQuery,
            async {
                let shards = self.entity_query_shards()?;
                self.any_shard(shards, |shard| {
                    let entity_type = entity_type.clone();
                    async move {
                        shard
                            .client()
                            .contains_entity_type(&entity_type)
                            .await
                            .map_err(|error| {
                                OperationError::shard(
                                    format!("check for entity type '{}' in", entity_type),
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

    pub async fn entity_types(&self) -> Result<HashSet<EntityType>, OperationError> {
        self.timed(
            IntervalMetric::EntityTypesPropertyQueryTime,
            CountMetric::EntityTypesPropertyQuery,
            async {
                let shards = self.entity_query_shards()?;
                self.union_from_shards(shards, |shard| async move {
                    shard.client().entity_types().await.map_err(|error| {
                        OperationError::shard(
                            "retrieve entity types from".into(),
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

    pub async fn add_entity(
        &self,
        entity_type: &EntityType,
        entity: &Entity,
    ) -> Result<(), OperationError> {
        self.timed(
            IntervalMetric::EntityAddTime,
            CountMetric::EntityAdded,
            async {
                let shards = self.entity_event_shards()?;
                self.for_each_shard(shards, |shard| {
                    let entity_type = entity_type.clone();
                    let entity = entity.clone();
                    async move {
                        shard
                            .client()
                            .add_entity(&entity_type, &entity)
                            .await
                            .map_err(|error| {
                                OperationError::shard(
                                    format!(
                                        "add entity '{}' of type '{}' to",
                                        entity, entity_type
                                    ),
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

    pub async fn remove_entity(
        &self,
        entity_type: &EntityType,
        entity: &Entity,
    ) -> Result<(), OperationError> {
        self.timed(
            IntervalMetric::EntityRemoveTime,
            CountMetric::EntityRemoved,
            async {
                let shards = self.entity_event_shards()?;
                self.for_each_shard(shards, |shard| {
                    let entity_type = entity_type.clone();
                    let entity = entity.clone();
                    async move {
                        shard
                            .client()
                            .remove_entity(&entity_type, &entity)
                            .await
                            .map_err(|error| {
                                OperationError::shard(
                                    format!(
                                        "remove entity '{}' of type '{}' from",
                                        entity, entity_type
                                    ),
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

    pub async fn contains_entity(
        &self,
        entity_type: &EntityType,
        entity: &Entity,
    ) -> Result<bool, OperationError> {
        self.timed(
            IntervalMetric::ContainsEntityQueryTime,
            CountMetric::ContainsEntityQuery,
            async {
                let shards = self.entity_query_shards()?;
                self.any_shard(shards, |shard| {
                    let entity_type = entity_type.clone();
                    let entity = entity.clone();
                    async move {
                        shard
                            .client()
                            .contains_entity(&entity_type, &entity)
                            .await
                            .map_err(|error| {
                                OperationError::shard(
                                    format!(
                                        "check for entity '{}' of type '{}' in",
                                        entity, entity_type
                                    ),
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

    pub async fn entities(
        &self,
        entity_type: &EntityType,
    ) -> Result<HashSet<Entity>, OperationError> {
        self.timed(
            IntervalMetric::GetEntitiesQueryTime,
            CountMetric::GetEntitiesQuery,
            async {
                let shards = self.entity_query_shards()?;
                self.union_from_shards(shards, |shard| {
                    let entity_type = entity_type.clone();
                    async move {
                        shard.client().entities(&entity_type).await.map_err(|error| {
                            OperationError::shard(
                                format!("retrieve entities of type '{}' from", entity_type),
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

    pub async fn add_user_to_entity_mapping(
        &self,
        user: &User,
        entity_type: &EntityType,
        entity: &Entity,
    ) -> Result<(), OperationError> {
        self.timed(
            IntervalMetric::UserToEntityMappingAddTime,
            CountMetric::UserToEntityMappingAdded,
            async {
                let shard = self.route(DataElement::User, Role::Event, user.as_str())?;
                shard
                    .client()
                    .add_user_to_entity_mapping(user, entity_type, entity)
                    .await
                    .map_err(|error| {
                        OperationError::shard(
                            format!(
                                "add mapping between user '{}' and entity '{}' of type '{}' to",
                                user, entity, entity_type
                            ),
                            shard.description(),
                            error,
                        )
                    })
            },
        )
        .await
    }

    pub async fn remove_user_to_entity_mapping(
        &self,
        user: &User,
        entity_type: &EntityType,
        entity: &Entity,
    ) -> Result<(), OperationError> {
        self.timed(
            IntervalMetric::UserToEntityMappingRemoveTime,
            CountMetric::UserToEntityMappingRemoved,
            async {
                let shard = self.route(DataElement::User, Role::Event, user.as_str())?;
                shard
                    .client()
                    .remove_user_to_entity_mapping(user, entity_type, entity)
                    .await
                    .map_err(|error| {
                        OperationError::shard(
                            format!(
                                "remove mapping between user '{}' and entity '{}' of type '{}' from",
                                user, entity, entity_type
                            ),
                            shard.description(),
                            error,
                        )
                    })
            },
        )
        .await
    }

    pub async fn user_to_entity_mappings(
        &self,
        user: &User,
    ) -> Result<HashSet<TypedEntity>, OperationError> {
        self.timed(
            IntervalMetric::GetUserToEntityMappingsQueryTime,
            CountMetric::GetUserToEntityMappingsQuery,
            async {
                let shard = self.route(DataElement::User, Role::Query, user.as_str())?;
                let mappings = shard
                    .client()
                    .user_to_entity_mappings(user)
                    .await
                    .map_err(|error| {
                        OperationError::shard(
                            format!("retrieve user to entity mappings for user '{}' from", user),
                            shard.description(),
                            error,
                        )
                    })?;
                Ok(mappings.into_iter().collect())
            },
        )
        .await
    }

    pub async fn user_to_entity_mappings_of_type(
        &self,
        user: &User,
        entity_type: &EntityType,
    ) -> Result<HashSet<Entity>, OperationError> {
        self.timed(
            IntervalMetric::GetUserToEntityMappingsForTypeQueryTime,
            CountMetric::GetUserToEntityMappingsForTypeQuery,
            async {
                let shard = self.route(DataElement::User, Role::Query, user.as_str())?;
                let mappings = shard
                    .client()
                    .user_to_entity_mappings_of_type(user, entity_type)
                    .await
                    .map_err(|error| {
                        OperationError::shard(
                            format!(
                                "retrieve user to entity mappings of type '{}' for user '{}' from",
                                entity_type, user
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

    pub async fn add_group_to_entity_mapping(
        &self,
        group: &Group,
        entity_type: &EntityType,
        entity: &Entity,
    ) -> Result<(), OperationError> {
        self.timed(
            IntervalMetric::GroupToEntityMappingAddTime,
            CountMetric::GroupToEntityMappingAdded,
            async {
                let shard = self.route(DataElement::Group, Role::Event, group.as_str())?;
                shard
                    .client()
                    .add_group_to_entity_mapping(group, entity_type, entity)
                    .await
                    .map_err(|error| {
                        OperationError::shard(
                            format!(
                                "add mapping between group '{}' and entity '{}' of type '{}' to",
                                group, entity, entity_type
                            ),
                            shard.description(),
                            error,
                        )
                    })
            },
        )
        .await
    }

    pub async fn remove_group_to_entity_mapping(
        &self,
        group: &Group,
        entity_type: &EntityType,
        entity: &Entity,
    ) -> Result<(), OperationError> {
        self.timed(
            IntervalMetric::GroupToEntityMappingRemoveTime,
            CountMetric::GroupToEntityMappingRemoved,
            async {
                let shard = self.route(DataElement::Group, Role::Event, group.as_str())?;
                shard
                    .client()
                    .remove_group_to_entity_mapping(group, entity_type, entity)
                    .await
                    .map_err(|error| {
                        OperationError::shard(
                            format!(
                                "remove mapping between group '{}' and entity '{}' of type '{}' from",
                                group, entity, entity_type
                            ),
                            shard.description(),
                            error,
                        )
                    })
            },
        )
        .await
    }

    pub async fn group_to_entity_mappings(
        &self,
        group: &Group,
    ) -> Result<HashSet<TypedEntity>, OperationError> {
        self.timed(
            IntervalMetric::GetGroupToEntityMappingsQueryTime,
            CountMetric::GetGroupToEntityMappingsQuery,
            async {
                let shard = self.route(DataElement::Group, Role::Query, group.as_str())?;
                let mappings = shard
                    .client()
                    .group_to_entity_mappings(group)
                    .await
                    .map_err(|error| {
                        OperationError::shard(
                            format!("retrieve group to entity mappings for group '{}' from", group),
                            shard.description(),
                            error,
                        )
                    })?;
                Ok(mappings.into_iter().collect())
            },
        )
        .await
    }

    pub async fn group_to_entity_mappings_of_type(
        &self,
        group: &Group,
        entity_type: &EntityType,
    ) -> Result<HashSet<Entity>, OperationError> {
        self.timed(
            IntervalMetric::GetGroupToEntityMappingsForTypeQueryTime,
            CountMetric::GetGroupToEntityMappingsForTypeQuery,
            async {
                let shard = self.route(DataElement::Group, Role::Query, group.as_str())?;
                let mappings = shard
                    .client()
                    .group_to_entity_mappings_of_type(group, entity_type)
                    .await
                    .map_err(|error| {
                        OperationError::shard(
                            format!(
                                "retrieve group to entity mappings of type '{}' for group '{}' from",
                                entity_type, group
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
