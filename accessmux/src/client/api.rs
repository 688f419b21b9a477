//! The access-manager surface of one backend shard node.

use async_trait::async_trait;

use crate::model::{
    AccessLevel, ApplicationComponent, ComponentAccess, Entity, EntityType, Group, TypedEntity,
    User,
};

use super::error::Error;

/// Async proxy to one shard.
///
/// Every shard node exposes the complete access-manager surface; which
/// subset of it holds real data for a given identifier is the coordinator's
/// concern. Methods taking a `groups` slice are the bulk forms backing the
/// transitive-closure queries; on the wire they ship the group list as a
/// JSON body because group sets routinely outgrow query-string limits.
#[async_trait]
pub trait ShardClient: Send + Sync {
    // Users.
    async fn add_user(&self, user: &User) -> Result<(), Error>;
    async fn remove_user(&self, user: &User) -> Result<(), Error>;
    async fn contains_user(&self, user: &User) -> Result<bool, Error>;
    async fn users(&self) -> Result<Vec<User>, Error>;

    // Groups.
    async fn add_group(&self, group: &Group) -> Result<(), Error>;
    async fn remove_group(&self, group: &Group) -> Result<(), Error>;
    async fn contains_group(&self, group: &Group) -> Result<bool, Error>;
    async fn groups(&self) -> Result<Vec<Group>, Error>;

    // User to group mappings.
    async fn add_user_to_group_mapping(&self, user: &User, group: &Group) -> Result<(), Error>;
    async fn remove_user_to_group_mapping(&self, user: &User, group: &Group) -> Result<(), Error>;
    async fn user_to_group_mappings(
        &self,
        user: &User,
        include_indirect: bool,
    ) -> Result<Vec<Group>, Error>;
    /// Users directly mapped to any of `groups`.
    async fn group_to_user_mappings(&self, groups: &[Group]) -> Result<Vec<User>, Error>;

    // Group to group mappings.
    async fn add_group_to_group_mapping(&self, from: &Group, to: &Group) -> Result<(), Error>;
    async fn remove_group_to_group_mapping(&self, from: &Group, to: &Group) -> Result<(), Error>;
    /// All groups reachable from `groups` through the group-to-group
    /// relation stored on this shard, including the inputs it owns.
    async fn group_to_group_mappings(&self, groups: &[Group]) -> Result<Vec<Group>, Error>;
    /// All groups from which some group in `groups` is reachable on this
    /// shard.
    async fn group_to_group_reverse_mappings(&self, groups: &[Group]) -> Result<Vec<Group>, Error>;

    // Application component and access level mappings.
    async fn add_user_to_application_component_mapping(
        &self,
        user: &User,
        component: &ApplicationComponent,
        access: &AccessLevel,
    ) -> Result<(), Error>;
    async fn remove_user_to_application_component_mapping(
        &self,
        user: &User,
        component: &ApplicationComponent,
        access: &AccessLevel,
    ) -> Result<(), Error>;
    async fn user_to_application_component_mappings(
        &self,
        user: &User,
    ) -> Result<Vec<ComponentAccess>, Error>;
    async fn add_group_to_application_component_mapping(
        &self,
        group: &Group,
        component: &ApplicationComponent,
        access: &AccessLevel,
    ) -> Result<(), Error>;
    async fn remove_group_to_application_component_mapping(
        &self,
        group: &Group,
        component: &ApplicationComponent,
        access: &AccessLevel,
    ) -> Result<(), Error>;
    async fn group_to_application_component_mappings(
        &self,
        group: &Group,
    ) -> Result<Vec<ComponentAccess>, Error>;

    // Entity types.
    async fn add_entity_type(&self, entity_type: &EntityType) -> Result<(), Error>;
    async fn remove_entity_type(&self, entity_type: &EntityType) -> Result<(), Error>;
    async fn contains_entity_type(&self, entity_type: &EntityType) -> Result<bool, Error>;
    async fn entity_types(&self) -> Result<Vec<EntityType>, Error>;

    // Entities.
    async fn add_entity(&self, entity_type: &EntityType, entity: &Entity) -> Result<(), Error>;
    async fn remove_entity(&self, entity_type: &EntityType, entity: &Entity) -> Result<(), Error>;
    async fn contains_entity(
        &self,
        entity_type: &EntityType,
        entity: &Entity,
    ) -> Result<bool, Error>;
    async fn entities(&self, entity_type: &EntityType) -> Result<Vec<Entity>, Error>;

    // Entity mappings.
    async fn add_user_to_entity_mapping(
        &self,
        user: &User,
        entity_type: &EntityType,
        entity: &Entity,
    ) -> Result<(), Error>;
    async fn remove_user_to_entity_mapping(
        &self,
        user: &User,
        entity_type: &EntityType,
        entity: &Entity,
    ) -> Result<(), Error>;
    async fn user_to_entity_mappings(&self, user: &User) -> Result<Vec<TypedEntity>, Error>;
    async fn user_to_entity_mappings_of_type(
        &self,
        user: &User,
        entity_type: &EntityType,
    ) -> Result<Vec<Entity>, Error>;
    async fn add_group_to_entity_mapping(
        &self,
        group: &Group,
        entity_type: &EntityType,
        entity: &Entity,
    ) -> Result<(), Error>;
    async fn remove_group_to_entity_mapping(
        &self,
        group: &Group,
        entity_type: &EntityType,
        entity: &Entity,
    ) -> Result<(), Error>;
    async fn group_to_entity_mappings(&self, group: &Group) -> Result<Vec<TypedEntity>, Error>;
    async fn group_to_entity_mappings_of_type(
        &self,
        group: &Group,
        entity_type: &EntityType,
    ) -> Result<Vec<Entity>, Error>;

    // Authorization queries.
    async fn has_access_to_application_component(
        &self,
        user: &User,
        component: &ApplicationComponent,
        access: &AccessLevel,
    ) -> Result<bool, Error>;
    async fn has_access_to_application_component_for_groups(
        &self,
        groups: &[Group],
        component: &ApplicationComponent,
        access: &AccessLevel,
    ) -> Result<bool, Error>;
    async fn has_access_to_entity(
        &self,
        user: &User,
        entity_type: &EntityType,
        entity: &Entity,
    ) -> Result<bool, Error>;
    async fn has_access_to_entity_for_groups(
        &self,
        groups: &[Group],
        entity_type: &EntityType,
        entity: &Entity,
    ) -> Result<bool, Error>;
    async fn application_components_accessible_by_user(
        &self,
        user: &User,
    ) -> Result<Vec<ComponentAccess>, Error>;
    async fn application_components_accessible_by_groups(
        &self,
        groups: &[Group],
    ) -> Result<Vec<ComponentAccess>, Error>;
    async fn entities_accessible_by_user(&self, user: &User) -> Result<Vec<TypedEntity>, Error>;
    async fn entities_of_type_accessible_by_user(
        &self,
        user: &User,
        entity_type: &EntityType,
    ) -> Result<Vec<Entity>, Error>;
    async fn entities_accessible_by_groups(
        &self,
        groups: &[Group],
    ) -> Result<Vec<TypedEntity>, Error>;
    async fn entities_of_type_accessible_by_groups(
        &self,
        groups: &[Group],
        entity_type: &EntityType,
    ) -> Result<Vec<Entity>, Error>;
}
