//! Identifiers managed by the access manager.
//!
//! All identifiers are opaque strings: the coordinator only ever hashes,
//! compares, and forwards them.

use derive_more::Display;
use serde::{Deserialize, Serialize};

macro_rules! identifier {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.into())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

identifier! {
    /// A user of the application.
    User
}

identifier! {
    /// A group users can be mapped to. Groups can also be mapped to other
    /// groups, forming a graph the authorization queries traverse.
    Group
}

identifier! {
    /// A component of the guarded application, e.g. a screen or an endpoint.
    ApplicationComponent
}

identifier! {
    /// A level of access to an application component, e.g. view or modify.
    AccessLevel
}

identifier! {
    /// A class of entities, e.g. "clients" or "product lines".
    EntityType
}

identifier! {
    /// A named entity within an entity type.
    Entity
}

/// An application component paired with a level of access to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ComponentAccess {
    pub application_component: ApplicationComponent,
    pub access_level: AccessLevel,
}

impl ComponentAccess {
    pub fn new(
        application_component: impl Into<ApplicationComponent>,
        access_level: impl Into<AccessLevel>,
    ) -> Self {
        Self {
            application_component: application_component.into(),
            access_level: access_level.into(),
        }
    }
}

/// An entity qualified by its entity type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TypedEntity {
    pub entity_type: EntityType,
    pub entity: Entity,
}

impl TypedEntity {
    pub fn new(entity_type: impl Into<EntityType>, entity: impl Into<Entity>) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity: entity.into(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let pair = ComponentAccess::new("Order", "Create");
        let json = serde_json::to_string(&pair).unwrap();
        assert_eq!(
            json,
            r#"{"applicationComponent":"Order","accessLevel":"Create"}"#
        );

        let entity = TypedEntity::new("ClientAccount", "CompanyA");
        let json = serde_json::to_string(&entity).unwrap();
        assert_eq!(json, r#"{"entityType":"ClientAccount","entity":"CompanyA"}"#);
    }

    #[test]
    fn test_identifier_round_trip() {
        let user = User::from("user@example.com");
        assert_eq!(user.to_string(), "user@example.com");
        assert_eq!(serde_json::to_string(&user).unwrap(), r#""user@example.com""#);
        let back: User = serde_json::from_str(r#""user@example.com""#).unwrap();
        assert_eq!(back, user);
    }
}
