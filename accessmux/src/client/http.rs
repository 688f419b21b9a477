//! HTTP/JSON shard client.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use url::Url;

use accessmux_config::ClientConfig;

use crate::model::{
    AccessLevel, ApplicationComponent, ComponentAccess, Entity, EntityType, Group, TypedEntity,
    User,
};

use super::api::ShardClient;
use super::error::Error;
use super::retry::{FixedInterval, RetryStrategy};

/// One backend shard node, spoken to over HTTP/JSON.
///
/// Queries use GET, additions POST, removals DELETE. Identifiers are
/// percent-encoded into the URL path. Bulk group queries carry the group
/// list as a JSON body on the GET request; group sets produced by the
/// transitive-closure queries routinely exceed query-string limits, so the
/// deviation from REST convention is deliberate.
///
/// The client owns its connection pool; dropping the last handle releases
/// it.
pub struct HttpShardClient {
    http: reqwest::Client,
    base_url: Url,
    retry: Arc<dyn RetryStrategy>,
}

impl HttpShardClient {
    /// Build a client with the default fixed-interval retry strategy.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        config.validate()?;
        Self::with_strategy(
            config.base_url.clone(),
            Arc::new(FixedInterval::from(config)),
        )
    }

    /// Build a client with a custom retry strategy, replacing both the
    /// error classification and the pacing of the default.
    pub fn with_strategy(base_url: Url, retry: Arc<dyn RetryStrategy>) -> Result<Self, Error> {
        if base_url.cannot_be_a_base() {
            return Err(Error::UrlNotABase);
        }
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url,
            retry,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::UrlNotABase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request, retrying per the client's strategy. The builder
    /// closure is re-invoked for every attempt.
    async fn execute<F>(&self, build: F) -> Result<reqwest::Response, Error>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let error = match build().send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        return Ok(response);
                    }
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    Error::Http { status, body }
                }
                Err(cause) => Error::Transport(cause),
            };
            match self.retry.next_delay(attempt, &error) {
                Some(delay) => {
                    if !delay.is_zero() {
                        sleep(delay).await;
                    }
                }
                None => return Err(error),
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        let response = self.execute(|| self.http.get(url.clone())).await?;
        Ok(response.json().await?)
    }

    async fn get_with_groups<T: DeserializeOwned>(
        &self,
        url: Url,
        groups: &[Group],
    ) -> Result<T, Error> {
        let body: Vec<&str> = groups.iter().map(Group::as_str).collect();
        let response = self
            .execute(|| self.http.get(url.clone()).json(&body))
            .await?;
        Ok(response.json().await?)
    }

    async fn post(&self, url: Url) -> Result<(), Error> {
        self.execute(|| self.http.post(url.clone())).await?;
        Ok(())
    }

    async fn delete(&self, url: Url) -> Result<(), Error> {
        self.execute(|| self.http.delete(url.clone())).await?;
        Ok(())
    }
}

#[async_trait]
impl ShardClient for HttpShardClient {
    async fn add_user(&self, user: &User) -> Result<(), Error> {
        self.post(self.url(&["users", user.as_str()])?).await
    }

    async fn remove_user(&self, user: &User) -> Result<(), Error> {
        self.delete(self.url(&["users", user.as_str()])?).await
    }

    async fn contains_user(&self, user: &User) -> Result<bool, Error> {
        self.get(self.url(&["users", user.as_str()])?).await
    }

    async fn users(&self) -> Result<Vec<User>, Error> {
        self.get(self.url(&["users"])?).await
    }

    async fn add_group(&self, group: &Group) -> Result<(), Error> {
        self.post(self.url(&["groups", group.as_str()])?).await
    }

    async fn remove_group(&self, group: &Group) -> Result<(), Error> {
        self.delete(self.url(&["groups", group.as_str()])?).await
    }

    async fn contains_group(&self, group: &Group) -> Result<bool, Error> {
        self.get(self.url(&["groups", group.as_str()])?).await
    }

    async fn groups(&self) -> Result<Vec<Group>, Error> {
        self.get(self.url(&["groups"])?).await
    }

    async fn add_user_to_group_mapping(&self, user: &User, group: &Group) -> Result<(), Error> {
        self.post(self.url(&[
            "userToGroupMappings",
            "user",
            user.as_str(),
            "group",
            group.as_str(),
        ])?)
        .await
    }

    async fn remove_user_to_group_mapping(&self, user: &User, group: &Group) -> Result<(), Error> {
        self.delete(self.url(&[
            "userToGroupMappings",
            "user",
            user.as_str(),
            "group",
            group.as_str(),
        ])?)
        .await
    }

    async fn user_to_group_mappings(
        &self,
        user: &User,
        include_indirect: bool,
    ) -> Result<Vec<Group>, Error> {
        let mut url = self.url(&["userToGroupMappings", "user", user.as_str()])?;
        url.query_pairs_mut().append_pair(
            "includeIndirectMappings",
            if include_indirect { "true" } else { "false" },
        );
        self.get(url).await
    }

    async fn group_to_user_mappings(&self, groups: &[Group]) -> Result<Vec<User>, Error> {
        self.get_with_groups(self.url(&["groupToUserMappings"])?, groups)
            .await
    }

    async fn add_group_to_group_mapping(&self, from: &Group, to: &Group) -> Result<(), Error> {
        self.post(self.url(&[
            "groupToGroupMappings",
            "fromGroup",
            from.as_str(),
            "toGroup",
            to.as_str(),
        ])?)
        .await
    }

    async fn remove_group_to_group_mapping(&self, from: &Group, to: &Group) -> Result<(), Error> {
        self.delete(self.url(&[
            "groupToGroupMappings",
            "fromGroup",
            from.as_str(),
            "toGroup",
            to.as_str(),
        ])?)
        .await
    }

    async fn group_to_group_mappings(&self, groups: &[Group]) -> Result<Vec<Group>, Error> {
        self.get_with_groups(self.url(&["groupToGroupMappings"])?, groups)
            .await
    }

    async fn group_to_group_reverse_mappings(&self, groups: &[Group]) -> Result<Vec<Group>, Error> {
        self.get_with_groups(self.url(&["groupToGroupReverseMappings"])?, groups)
            .await
    }

    async fn add_user_to_application_component_mapping(
        &self,
        user: &User,
        component: &ApplicationComponent,
        access: &AccessLevel,
    ) -> Result<(), Error> {
        self.post(self.url(&[
            "userToApplicationComponentAndAccessLevelMappings",
            "user",
            user.as_str(),
            "applicationComponent",
            component.as_str(),
            "accessLevel",
            access.as_str(),
        ])?)
        .await
    }

    async fn remove_user_to_application_component_mapping(
        &self,
        user: &User,
        component: &ApplicationComponent,
        access: &AccessLevel,
    ) -> Result<(), Error> {
        self.delete(self.url(&[
            "userToApplicationComponentAndAccessLevelMappings",
            "user",
            user.as_str(),
            "applicationComponent",
            component.as_str(),
            "accessLevel",
            access.as_str(),
        ])?)
        .await
    }

    async fn user_to_application_component_mappings(
        &self,
        user: &User,
    ) -> Result<Vec<ComponentAccess>, Error> {
        self.get(self.url(&[
            "userToApplicationComponentAndAccessLevelMappings",
            "user",
            user.as_str(),
        ])?)
        .await
    }

    async fn add_group_to_application_component_mapping(
        &self,
        group: &Group,
        component: &ApplicationComponent,
        access: &AccessLevel,
    ) -> Result<(), Error> {
        self.post(self.url(&[
            "groupToApplicationComponentAndAccessLevelMappings",
            "group",
            group.as_str(),
            "applicationComponent",
            component.as_str(),
            "accessLevel",
            access.as_str(),
        ])?)
        .await
    }

    async fn remove_group_to_application_component_mapping(
        &self,
        group: &Group,
        component: &ApplicationComponent,
        access: &AccessLevel,
    ) -> Result<(), Error> {
        self.delete(self.url(&[
            "groupToApplicationComponentAndAccessLevelMappings",
            "group",
            group.as_str(),
            "applicationComponent",
            component.as_str(),
            "accessLevel",
            access.as_str(),
        ])?)
        .await
    }

    async fn group_to_application_component_mappings(
        &self,
        group: &Group,
    ) -> Result<Vec<ComponentAccess>, Error> {
        self.get(self.url(&[
            "groupToApplicationComponentAndAccessLevelMappings",
            "group",
            group.as_str(),
        ])?)
        .await
    }

    async fn add_entity_type(&self, entity_type: &EntityType) -> Result<(), Error> {
        self.post(self.url(&["entityTypes", entity_type.as_str()])?)
            .await
    }

    async fn remove_entity_type(&self, entity_type: &EntityType) -> Result<(), Error> {
        self.delete(self.url(&["entityTypes", entity_type.as_str()])?)
            .await
    }

    async fn contains_entity_type(&self, entity_type: &EntityType) -> Result<bool, Error> {
        self.get(self.url(&["entityTypes", entity_type.as_str()])?)
            .await
    }

    async fn entity_types(&self) -> Result<Vec<EntityType>, Error> {
        self.get(self.url(&["entityTypes"])?).await
    }

    async fn add_entity(&self, entity_type: &EntityType, entity: &Entity) -> Result<(), Error> {
        self.post(self.url(&["entityTypes", entity_type.as_str(), "entities", entity.as_str()])?)
            .await
    }

    async fn remove_entity(&self, entity_type: &EntityType, entity: &Entity) -> Result<(), Error> {
        self.delete(self.url(&[
            "entityTypes",
            entity_type.as_str(),
            "entities",
            entity.as_str(),
        ])?)
        .await
    }

    async fn contains_entity(
        &self,
        entity_type: &EntityType,
        entity: &Entity,
    ) -> Result<bool, Error> {
        self.get(self.url(&[
            "entityTypes",
            entity_type.as_str(),
            "entities",
            entity.as_str(),
        ])?)
        .await
    }

    async fn entities(&self, entity_type: &EntityType) -> Result<Vec<Entity>, Error> {
        self.get(self.url(&["entityTypes", entity_type.as_str(), "entities"])?)
            .await
    }

    async fn add_user_to_entity_mapping(
        &self,
        user: &User,
        entity_type: &EntityType,
        entity: &Entity,
    ) -> Result<(), Error> {
        self.post(self.url(&[
            "userToEntityMappings",
            "user",
            user.as_str(),
            "entityType",
            entity_type.as_str(),
            "entity",
            entity.as_str(),
        ])?)
        .await
    }

    async fn remove_user_to_entity_mapping(
        &self,
        user: &User,
        entity_type: &EntityType,
        entity: &Entity,
    ) -> Result<(), Error> {
        self.delete(self.url(&[
            "userToEntityMappings",
            "user",
            user.as_str(),
            "entityType",
            entity_type.as_str(),
            "entity",
            entity.as_str(),
        ])?)
        .await
    }

    async fn user_to_entity_mappings(&self, user: &User) -> Result<Vec<TypedEntity>, Error> {
        self.get(self.url(&["userToEntityMappings", "user", user.as_str()])?)
            .await
    }

    async fn user_to_entity_mappings_of_type(
        &self,
        user: &User,
        entity_type: &EntityType,
    ) -> Result<Vec<Entity>, Error> {
        self.get(self.url(&[
            "userToEntityMappings",
            "user",
            user.as_str(),
            "entityType",
            entity_type.as_str(),
        ])?)
        .await
    }

    async fn add_group_to_entity_mapping(
        &self,
        group: &Group,
        entity_type: &EntityType,
        entity: &Entity,
    ) -> Result<(), Error> {
        self.post(self.url(&[
            "groupToEntityMappings",
            "group",
            group.as_str(),
            "entityType",
            entity_type.as_str(),
            "entity",
            entity.as_str(),
        ])?)
        .await
    }

    async fn remove_group_to_entity_mapping(
        &self,
        group: &Group,
        entity_type: &EntityType,
        entity: &Entity,
    ) -> Result<(), Error> {
        self.delete(self.url(&[
            "groupToEntityMappings",
            "group",
            group.as_str(),
            "entityType",
            entity_type.as_str(),
            "entity",
            entity.as_str(),
        ])?)
        .await
    }

    async fn group_to_entity_mappings(&self, group: &Group) -> Result<Vec<TypedEntity>, Error> {
        self.get(self.url(&["groupToEntityMappings", "group", group.as_str()])?)
            .await
    }

    async fn group_to_entity_mappings_of_type(
        &self,
        group: &Group,
        entity_type: &EntityType,
    ) -> Result<Vec<Entity>, Error> {
        self.get(self.url(&[
            "groupToEntityMappings",
            "group",
            group.as_str(),
            "entityType",
            entity_type.as_str(),
        ])?)
        .await
    }

    async fn has_access_to_application_component(
        &self,
        user: &User,
        component: &ApplicationComponent,
        access: &AccessLevel,
    ) -> Result<bool, Error> {
        self.get(self.url(&[
            "hasAccessToApplicationComponent",
            "user",
            user.as_str(),
            "applicationComponent",
            component.as_str(),
            "accessLevel",
            access.as_str(),
        ])?)
        .await
    }

    async fn has_access_to_application_component_for_groups(
        &self,
        groups: &[Group],
        component: &ApplicationComponent,
        access: &AccessLevel,
    ) -> Result<bool, Error> {
        self.get_with_groups(
            self.url(&[
                "hasAccessToApplicationComponent",
                "groups",
                "applicationComponent",
                component.as_str(),
                "accessLevel",
                access.as_str(),
            ])?,
            groups,
        )
        .await
    }

    async fn has_access_to_entity(
        &self,
        user: &User,
        entity_type: &EntityType,
        entity: &Entity,
    ) -> Result<bool, Error> {
        self.get(self.url(&[
            "hasAccessToEntity",
            "user",
            user.as_str(),
            "entityType",
            entity_type.as_str(),
            "entity",
            entity.as_str(),
        ])?)
        .await
    }

    async fn has_access_to_entity_for_groups(
        &self,
        groups: &[Group],
        entity_type: &EntityType,
        entity: &Entity,
    ) -> Result<bool, Error> {
        self.get_with_groups(
            self.url(&[
                "hasAccessToEntity",
                "groups",
                "entityType",
                entity_type.as_str(),
                "entity",
                entity.as_str(),
            ])?,
            groups,
        )
        .await
    }

    async fn application_components_accessible_by_user(
        &self,
        user: &User,
    ) -> Result<Vec<ComponentAccess>, Error> {
        self.get(self.url(&["applicationComponentsAccessibleByUser", user.as_str()])?)
            .await
    }

    async fn application_components_accessible_by_groups(
        &self,
        groups: &[Group],
    ) -> Result<Vec<ComponentAccess>, Error> {
        self.get_with_groups(self.url(&["applicationComponentsAccessibleByGroups"])?, groups)
            .await
    }

    async fn entities_accessible_by_user(&self, user: &User) -> Result<Vec<TypedEntity>, Error> {
        self.get(self.url(&["entitiesAccessibleByUser", user.as_str()])?)
            .await
    }

    async fn entities_of_type_accessible_by_user(
        &self,
        user: &User,
        entity_type: &EntityType,
    ) -> Result<Vec<Entity>, Error> {
        self.get(self.url(&[
            "entitiesAccessibleByUser",
            user.as_str(),
            "entityType",
            entity_type.as_str(),
        ])?)
        .await
    }

    async fn entities_accessible_by_groups(
        &self,
        groups: &[Group],
    ) -> Result<Vec<TypedEntity>, Error> {
        self.get_with_groups(self.url(&["entitiesAccessibleByGroups"])?, groups)
            .await
    }

    async fn entities_of_type_accessible_by_groups(
        &self,
        groups: &[Group],
        entity_type: &EntityType,
    ) -> Result<Vec<Entity>, Error> {
        self.get_with_groups(
            self.url(&[
                "entitiesAccessibleByGroups",
                "entityType",
                entity_type.as_str(),
            ])?,
            groups,
        )
        .await
    }
}
