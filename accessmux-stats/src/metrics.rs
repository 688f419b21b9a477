//! Metric identities, one per public coordinator operation.

use std::fmt::{self, Display};

use serde::Serialize;

/// Elapsed-time metric around one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IntervalMetric {
    // Users.
    UserAddTime,
    UserRemoveTime,
    ContainsUserQueryTime,
    UsersPropertyQueryTime,

    // Groups.
    GroupAddTime,
    GroupRemoveTime,
    ContainsGroupQueryTime,
    GroupsPropertyQueryTime,

    // User to group mappings.
    UserToGroupMappingAddTime,
    UserToGroupMappingRemoveTime,
    GetUserToGroupMappingsQueryTime,
    GetUserToGroupMappingsWithIndirectMappingsQueryTime,
    GetGroupToUserMappingsQueryTime,
    GetGroupToUserMappingsWithIndirectMappingsQueryTime,

    // Group to group mappings.
    GroupToGroupMappingAddTime,
    GroupToGroupMappingRemoveTime,
    GetGroupToGroupMappingsQueryTime,
    GetGroupToGroupReverseMappingsQueryTime,

    // Application component and access level mappings.
    UserToApplicationComponentAndAccessLevelMappingAddTime,
    UserToApplicationComponentAndAccessLevelMappingRemoveTime,
    GetUserToApplicationComponentAndAccessLevelMappingsQueryTime,
    GroupToApplicationComponentAndAccessLevelMappingAddTime,
    GroupToApplicationComponentAndAccessLevelMappingRemoveTime,
    GetGroupToApplicationComponentAndAccessLevelMappingsQueryTime,

    // Entity types and entities.
    EntityTypeAddTime,
    EntityTypeRemoveTime,
    ContainsEntityTypeQueryTime,
    EntityTypesPropertyQueryTime,
    EntityAddTime,
    EntityRemoveTime,
    ContainsEntityQueryTime,
    GetEntitiesQueryTime,

    // Entity mappings.
    UserToEntityMappingAddTime,
    UserToEntityMappingRemoveTime,
    GetUserToEntityMappingsQueryTime,
    GetUserToEntityMappingsForTypeQueryTime,
    GroupToEntityMappingAddTime,
    GroupToEntityMappingRemoveTime,
    GetGroupToEntityMappingsQueryTime,
    GetGroupToEntityMappingsForTypeQueryTime,

    // Authorization queries.
    HasAccessToApplicationComponentForUserQueryTime,
    HasAccessToEntityForUserQueryTime,
    GetApplicationComponentsAccessibleByUserQueryTime,
    GetApplicationComponentsAccessibleByGroupQueryTime,
    GetEntitiesAccessibleByUserQueryTime,
    GetEntitiesOfTypeAccessibleByUserQueryTime,
    GetEntitiesAccessibleByGroupQueryTime,
    GetEntitiesOfTypeAccessibleByGroupQueryTime,
}

/// Occurrence count, incremented once per completed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CountMetric {
    UserAdded,
    UserRemoved,
    ContainsUserQuery,
    UsersPropertyQuery,

    GroupAdded,
    GroupRemoved,
    ContainsGroupQuery,
    GroupsPropertyQuery,

    UserToGroupMappingAdded,
    UserToGroupMappingRemoved,
    GetUserToGroupMappingsQuery,
    GetUserToGroupMappingsWithIndirectMappingsQuery,
    GetGroupToUserMappingsQuery,
    GetGroupToUserMappingsWithIndirectMappingsQuery,

    GroupToGroupMappingAdded,
    GroupToGroupMappingRemoved,
    GetGroupToGroupMappingsQuery,
    GetGroupToGroupReverseMappingsQuery,

    UserToApplicationComponentAndAccessLevelMappingAdded,
    UserToApplicationComponentAndAccessLevelMappingRemoved,
    GetUserToApplicationComponentAndAccessLevelMappingsQuery,
    GroupToApplicationComponentAndAccessLevelMappingAdded,
    GroupToApplicationComponentAndAccessLevelMappingRemoved,
    GetGroupToApplicationComponentAndAccessLevelMappingsQuery,

    EntityTypeAdded,
    EntityTypeRemoved,
    ContainsEntityTypeQuery,
    EntityTypesPropertyQuery,
    EntityAdded,
    EntityRemoved,
    ContainsEntityQuery,
    GetEntitiesQuery,

    UserToEntityMappingAdded,
    UserToEntityMappingRemoved,
    GetUserToEntityMappingsQuery,
    GetUserToEntityMappingsForTypeQuery,
    GroupToEntityMappingAdded,
    GroupToEntityMappingRemoved,
    GetGroupToEntityMappingsQuery,
    GetGroupToEntityMappingsForTypeQuery,

    HasAccessToApplicationComponentForUserQuery,
    HasAccessToEntityForUserQuery,
    GetApplicationComponentsAccessibleByUserQuery,
    GetApplicationComponentsAccessibleByGroupQuery,
    GetEntitiesAccessibleByUserQuery,
    GetEntitiesOfTypeAccessibleByUserQuery,
    GetEntitiesAccessibleByGroupQuery,
    GetEntitiesOfTypeAccessibleByGroupQuery,
}

/// Quantity reported by transitive-closure queries: the size of the expanded
/// group set and the number of group shards consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AmountMetric {
    HasAccessToApplicationComponentGroupsMappedToUser,
    HasAccessToApplicationComponentGroupShardsQueried,
    HasAccessToEntityGroupsMappedToUser,
    HasAccessToEntityGroupShardsQueried,
    GetApplicationComponentsAccessibleByUserGroupsMappedToUser,
    GetApplicationComponentsAccessibleByUserGroupShardsQueried,
    GetApplicationComponentsAccessibleByGroupGroupsMappedToGroup,
    GetApplicationComponentsAccessibleByGroupGroupShardsQueried,
    GetEntitiesAccessibleByUserGroupsMappedToUser,
    GetEntitiesAccessibleByUserGroupShardsQueried,
    GetEntitiesOfTypeAccessibleByUserGroupsMappedToUser,
    GetEntitiesOfTypeAccessibleByUserGroupShardsQueried,
    GetEntitiesAccessibleByGroupGroupsMappedToGroup,
    GetEntitiesAccessibleByGroupGroupShardsQueried,
    GetEntitiesOfTypeAccessibleByGroupGroupsMappedToGroup,
    GetEntitiesOfTypeAccessibleByGroupGroupShardsQueried,
}

impl Display for IntervalMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Display for CountMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Display for AmountMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
