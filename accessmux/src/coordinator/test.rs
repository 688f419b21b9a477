//! End-to-end coordinator scenarios against stub shards.

use std::collections::HashSet;
use std::error::Error as _;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::yield_now;

use accessmux_config::{DataElement, Role, ShardDescriptor, ShardSet};
use accessmux_stats::{
    AmountMetric, CountMetric, IntervalMetric, MemoryEmitter, MetricEvent,
};

use crate::model::{AccessLevel, ApplicationComponent, Entity, EntityType, Group, User};
use crate::shard::ShardManager;
use crate::test::{descriptor, StubFactory, StubShard};

use super::Coordinator;

fn coordinator(
    factory: Arc<StubFactory>,
    descriptors: Vec<ShardDescriptor>,
) -> (Arc<Coordinator>, Arc<MemoryEmitter>, Arc<ShardManager>) {
    let manager = Arc::new(
        ShardManager::new(ShardSet::new(descriptors).unwrap(), factory).unwrap(),
    );
    let metrics = Arc::new(MemoryEmitter::new());
    let coordinator = Arc::new(Coordinator::partial(manager.clone(), metrics.clone()));
    (coordinator, metrics, manager)
}

fn groups(names: &[&str]) -> Vec<Group> {
    names.iter().map(|name| Group::from(*name)).collect()
}

#[tokio::test]
async fn test_user_add_then_contains() {
    let factory = Arc::new(StubFactory::default());
    let event = factory.register("http://userevent0:5000/", StubShard::default());
    let query = factory.register(
        "http://userquery0:5000/",
        StubShard {
            contains_user: true,
            ..Default::default()
        },
    );
    let (coordinator, metrics, _) = coordinator(
        factory,
        vec![
            descriptor(DataElement::User, Role::Event, 0, "UserEvent0"),
            descriptor(DataElement::User, Role::Query, 0, "UserQuery0"),
        ],
    );

    let user = User::from("user1");
    coordinator.add_user(&user).await.unwrap();
    assert!(coordinator.contains_user(&user).await.unwrap());

    assert_eq!(event.calls(), vec!["add_user(user1)"]);
    assert_eq!(query.calls(), vec!["contains_user(user1)"]);
    assert_eq!(
        metrics.events(),
        vec![
            MetricEvent::Begin(IntervalMetric::UserAddTime),
            MetricEvent::End(IntervalMetric::UserAddTime),
            MetricEvent::Increment(CountMetric::UserAdded),
            MetricEvent::Begin(IntervalMetric::ContainsUserQueryTime),
            MetricEvent::End(IntervalMetric::ContainsUserQueryTime),
            MetricEvent::Increment(CountMetric::ContainsUserQuery),
        ]
    );
}

fn three_user_query_shards() -> Vec<ShardDescriptor> {
    vec![
        descriptor(DataElement::User, Role::Query, 0, "ShardDescription1"),
        descriptor(DataElement::User, Role::Query, 0x5555_5555, "ShardDescription2"),
        descriptor(DataElement::User, Role::Query, 0xaaaa_aaaa, "ShardDescription3"),
    ]
}

#[tokio::test]
async fn test_users_unions_across_shards() {
    let factory = Arc::new(StubFactory::default());
    let shard1 = factory.register(
        "http://sharddescription1:5000/",
        StubShard {
            users: vec!["user1".into(), "user2".into(), "user3".into()],
            ..Default::default()
        },
    );
    let shard2 = factory.register("http://sharddescription2:5000/", StubShard::default());
    let shard3 = factory.register(
        "http://sharddescription3:5000/",
        StubShard {
            users: vec!["user4".into(), "user5".into(), "user6".into()],
            ..Default::default()
        },
    );
    let (coordinator, metrics, _) = coordinator(factory, three_user_query_shards());

    let users = coordinator.users().await.unwrap();
    let expected: HashSet<User> = (1..=6).map(|i| User::from(format!("user{}", i))).collect();
    assert_eq!(users, expected);

    assert_eq!(shard1.call_count(), 1);
    assert_eq!(shard2.call_count(), 1);
    assert_eq!(shard3.call_count(), 1);
    assert_eq!(
        metrics.events(),
        vec![
            MetricEvent::Begin(IntervalMetric::UsersPropertyQueryTime),
            MetricEvent::End(IntervalMetric::UsersPropertyQueryTime),
            MetricEvent::Increment(CountMetric::UsersPropertyQuery),
        ]
    );
}

#[tokio::test]
async fn test_users_surfaces_failing_shard() {
    let factory = Arc::new(StubFactory::default());
    factory.register("http://sharddescription1:5000/", StubShard::default());
    factory.register(
        "http://sharddescription2:5000/",
        StubShard {
            fail_method: Some("users"),
            ..Default::default()
        },
    );
    factory.register("http://sharddescription3:5000/", StubShard::default());
    let (coordinator, metrics, _) = coordinator(factory, three_user_query_shards());

    let error = coordinator.users().await.unwrap_err();
    assert_eq!(
        error.message(),
        "Failed to retrieve users from shard with configuration 'ShardDescription2'."
    );
    assert!(error.source().is_some());

    assert_eq!(
        metrics.events(),
        vec![
            MetricEvent::Begin(IntervalMetric::UsersPropertyQueryTime),
            MetricEvent::Cancel(IntervalMetric::UsersPropertyQueryTime),
        ]
    );
}

/// The cross-shard authorization walk: user shard has no direct grant,
/// direct groups expand through the group graph shard, and one of two
/// group shards grants access.
///
/// CRC-32C splits group1/group2/group4 below 0x8000_0000 and
/// group3/group5/group6 above it.
#[tokio::test]
async fn test_has_access_walks_group_graph() {
    let factory = Arc::new(StubFactory::default());
    let user_shard = factory.register(
        "http://userquery0:5000/",
        StubShard {
            direct_groups: groups(&["group1", "group2", "group3"]),
            ..Default::default()
        },
    );
    let graph_shard = factory.register(
        "http://groupgraph0:5000/",
        StubShard {
            expansion: groups(&[
                "group1", "group2", "group3", "group4", "group5", "group6",
            ]),
            ..Default::default()
        },
    );
    let group_low = factory.register("http://grouplow:5000/", StubShard::default());
    let group_high = factory.register(
        "http://grouphigh:5000/",
        StubShard {
            has_access_groups: true,
            ..Default::default()
        },
    );
    let (coordinator, metrics, _) = coordinator(
        factory,
        vec![
            descriptor(DataElement::User, Role::Query, 0, "UserQuery0"),
            descriptor(DataElement::GroupToGroupMapping, Role::Query, 0, "GroupGraph0"),
            descriptor(DataElement::Group, Role::Query, 0, "GroupLow"),
            descriptor(DataElement::Group, Role::Query, 0x8000_0000, "GroupHigh"),
        ],
    );

    let granted = coordinator
        .has_access_to_application_component(
            &User::from("user1"),
            &ApplicationComponent::from("Order"),
            &AccessLevel::from("Create"),
        )
        .await
        .unwrap();
    assert!(granted);

    assert_eq!(
        user_shard.calls(),
        vec![
            "has_access_to_application_component(user1,Order,Create)",
            "user_to_group_mappings(user1,false)",
        ]
    );
    // Expansion runs to a fixed point: the second round re-queries the
    // newly discovered groups and finds nothing new.
    assert_eq!(
        graph_shard.calls(),
        vec![
            "group_to_group_mappings(group1+group2+group3)",
            "group_to_group_mappings(group4+group5+group6)",
        ]
    );
    // The granting shard is always consulted; its sibling may be skipped
    // by the positive short-circuit.
    assert_eq!(
        group_high.calls(),
        vec!["has_access_to_application_component_for_groups(group3+group5+group6,Order,Create)"]
    );
    let low_calls = group_low.calls();
    assert!(
        low_calls.is_empty()
            || low_calls
                == vec![
                    "has_access_to_application_component_for_groups(group1+group2+group4,Order,Create)"
                        .to_string()
                ]
    );

    assert_eq!(
        metrics.total_of(AmountMetric::HasAccessToApplicationComponentGroupsMappedToUser),
        6
    );
    assert_eq!(
        metrics.total_of(AmountMetric::HasAccessToApplicationComponentGroupShardsQueried),
        2
    );
    assert_eq!(
        metrics.count_of(CountMetric::HasAccessToApplicationComponentForUserQuery),
        1
    );
}

#[tokio::test]
async fn test_has_access_short_circuits_on_direct_grant() {
    let factory = Arc::new(StubFactory::default());
    let user_shard = factory.register(
        "http://userquery0:5000/",
        StubShard {
            has_access_user: true,
            ..Default::default()
        },
    );
    let (coordinator, _, _) = coordinator(
        factory,
        vec![descriptor(DataElement::User, Role::Query, 0, "UserQuery0")],
    );

    let granted = coordinator
        .has_access_to_application_component(
            &User::from("user1"),
            &ApplicationComponent::from("Order"),
            &AccessLevel::from("Create"),
        )
        .await
        .unwrap();
    assert!(granted);

    // No group expansion after a direct grant.
    assert_eq!(
        user_shard.calls(),
        vec!["has_access_to_application_component(user1,Order,Create)"]
    );
}

#[tokio::test]
async fn test_remove_group_cascades_to_every_event_shard() {
    let factory = Arc::new(StubFactory::default());
    let user1 = factory.register("http://sharddescription1:5000/", StubShard::default());
    let user2 = factory.register("http://sharddescription2:5000/", StubShard::default());
    let group1 = factory.register("http://sharddescription3:5000/", StubShard::default());
    let graph1 = factory.register(
        "http://sharddescription4:5000/",
        StubShard {
            fail_method: Some("remove_group"),
            ..Default::default()
        },
    );
    let graph2 = factory.register("http://sharddescription5:5000/", StubShard::default());
    let (coordinator, _, _) = coordinator(
        factory,
        vec![
            descriptor(DataElement::User, Role::Event, 0, "ShardDescription1"),
            descriptor(DataElement::User, Role::Event, 0x8000_0000, "ShardDescription2"),
            descriptor(DataElement::Group, Role::Event, 0, "ShardDescription3"),
            descriptor(
                DataElement::GroupToGroupMapping,
                Role::Event,
                0,
                "ShardDescription4",
            ),
            descriptor(
                DataElement::GroupToGroupMapping,
                Role::Event,
                0x8000_0000,
                "ShardDescription5",
            ),
        ],
    );

    let error = coordinator
        .remove_group(&Group::from("group1"))
        .await
        .unwrap_err();
    assert_eq!(
        error.message(),
        "Failed to remove group 'group1' from shard with configuration 'ShardDescription4'."
    );

    // The failing shard didn't stop the siblings.
    for shard in [&user1, &user2, &group1, &graph1, &graph2] {
        assert_eq!(shard.calls(), vec!["remove_group(group1)"]);
    }
}

#[tokio::test]
async fn test_refresh_during_in_flight_query() {
    let gate = Arc::new(Semaphore::new(0));
    let factory = Arc::new(StubFactory::default());
    let shard1 = factory.register(
        "http://userquery0:5000/",
        StubShard {
            users: vec!["user1".into()],
            ..Default::default()
        },
    );
    factory.register(
        "http://userquery1:5000/",
        StubShard {
            users: vec!["user2".into()],
            gate: Some(gate.clone()),
            ..Default::default()
        },
    );
    factory.register(
        "http://userquery2:5000/",
        StubShard {
            users: vec!["user3".into()],
            ..Default::default()
        },
    );
    factory.register(
        "http://userquery1new:5000/",
        StubShard {
            users: vec!["replacement".into()],
            ..Default::default()
        },
    );

    let original = vec![
        descriptor(DataElement::User, Role::Query, 0, "UserQuery0"),
        descriptor(DataElement::User, Role::Query, 0x5555_5555, "UserQuery1"),
        descriptor(DataElement::User, Role::Query, 0xaaaa_aaaa, "UserQuery2"),
    ];
    let (coordinator, _, manager) = coordinator(factory, original.clone());

    let in_flight = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.users().await })
    };
    // Let the query route against the current snapshot and block on the
    // gated shard.
    while shard1.call_count() == 0 {
        yield_now().await;
    }

    let mut replaced = original;
    replaced[1] = descriptor(DataElement::User, Role::Query, 0x5555_5555, "UserQuery1New");
    manager.refresh(ShardSet::new(replaced).unwrap()).unwrap();

    gate.add_permits(10);

    // The in-flight query completed against the pre-refresh shard set.
    let stale = in_flight.await.unwrap().unwrap();
    let expected: HashSet<User> = ["user1", "user2", "user3"]
        .into_iter()
        .map(User::from)
        .collect();
    assert_eq!(stale, expected);

    // The next query observes the new configuration.
    let fresh = coordinator.users().await.unwrap();
    let expected: HashSet<User> = ["user1", "replacement", "user3"]
        .into_iter()
        .map(User::from)
        .collect();
    assert_eq!(fresh, expected);
}

#[tokio::test]
async fn test_add_group_reaches_group_and_graph_shards() {
    let factory = Arc::new(StubFactory::default());
    let group_shard = factory.register("http://groupevent0:5000/", StubShard::default());
    let graph1 = factory.register("http://graphevent0:5000/", StubShard::default());
    let graph2 = factory.register("http://graphevent1:5000/", StubShard::default());
    let (coordinator, _, _) = coordinator(
        factory,
        vec![
            descriptor(DataElement::Group, Role::Event, 0, "GroupEvent0"),
            descriptor(DataElement::GroupToGroupMapping, Role::Event, 0, "GraphEvent0"),
            descriptor(
                DataElement::GroupToGroupMapping,
                Role::Event,
                0x8000_0000,
                "GraphEvent1",
            ),
        ],
    );

    coordinator.add_group(&Group::from("group1")).await.unwrap();

    for shard in [&group_shard, &graph1, &graph2] {
        assert_eq!(shard.calls(), vec!["add_group(group1)"]);
    }
}

#[tokio::test]
async fn test_entity_events_fan_out_to_user_and_group_shards() {
    let factory = Arc::new(StubFactory::default());
    let user_shard = factory.register("http://userevent0:5000/", StubShard::default());
    let group_shard = factory.register("http://groupevent0:5000/", StubShard::default());
    let (coordinator, _, _) = coordinator(
        factory,
        vec![
            descriptor(DataElement::User, Role::Event, 0, "UserEvent0"),
            descriptor(DataElement::Group, Role::Event, 0, "GroupEvent0"),
        ],
    );

    coordinator
        .add_entity_type(&EntityType::from("ClientAccount"))
        .await
        .unwrap();
    coordinator
        .add_entity(&EntityType::from("ClientAccount"), &Entity::from("CompanyA"))
        .await
        .unwrap();
    coordinator
        .remove_entity(&EntityType::from("ClientAccount"), &Entity::from("CompanyA"))
        .await
        .unwrap();

    let expected = vec![
        "add_entity_type(ClientAccount)".to_string(),
        "add_entity(ClientAccount,CompanyA)".to_string(),
        "remove_entity(ClientAccount,CompanyA)".to_string(),
    ];
    assert_eq!(user_shard.calls(), expected);
    assert_eq!(group_shard.calls(), expected);
}

#[tokio::test]
async fn test_indirect_user_to_group_mappings() {
    let factory = Arc::new(StubFactory::default());
    factory.register(
        "http://userquery0:5000/",
        StubShard {
            direct_groups: groups(&["group1"]),
            ..Default::default()
        },
    );
    factory.register(
        "http://groupgraph0:5000/",
        StubShard {
            expansion: groups(&["group1", "group2", "group3"]),
            ..Default::default()
        },
    );
    let (coordinator, _, _) = coordinator(
        factory,
        vec![
            descriptor(DataElement::User, Role::Query, 0, "UserQuery0"),
            descriptor(DataElement::GroupToGroupMapping, Role::Query, 0, "GroupGraph0"),
        ],
    );

    let direct = coordinator
        .user_to_group_mappings(&User::from("user1"), false)
        .await
        .unwrap();
    assert_eq!(direct, groups(&["group1"]).into_iter().collect());

    let indirect = coordinator
        .user_to_group_mappings(&User::from("user1"), true)
        .await
        .unwrap();
    assert_eq!(
        indirect,
        groups(&["group1", "group2", "group3"]).into_iter().collect()
    );
}

#[tokio::test]
async fn test_indirect_group_to_user_mappings() {
    let factory = Arc::new(StubFactory::default());
    let user_shard = factory.register(
        "http://userquery0:5000/",
        StubShard {
            mapped_users: vec!["user1".into(), "user2".into()],
            ..Default::default()
        },
    );
    factory.register(
        "http://groupgraph0:5000/",
        StubShard {
            reverse_expansion: groups(&["group1", "group0"]),
            ..Default::default()
        },
    );
    let (coordinator, _, _) = coordinator(
        factory,
        vec![
            descriptor(DataElement::User, Role::Query, 0, "UserQuery0"),
            descriptor(DataElement::GroupToGroupMapping, Role::Query, 0, "GroupGraph0"),
        ],
    );

    let users = coordinator
        .group_to_user_mappings(&Group::from("group1"), true)
        .await
        .unwrap();
    let expected: HashSet<User> = ["user1", "user2"].into_iter().map(User::from).collect();
    assert_eq!(users, expected);

    // The user shard was asked about the reverse-expanded group set.
    assert_eq!(
        user_shard.calls(),
        vec!["group_to_user_mappings(group0+group1)"]
    );
}

#[tokio::test]
async fn test_contains_group_consults_all_three_roles() {
    let factory = Arc::new(StubFactory::default());
    factory.register("http://userquery0:5000/", StubShard::default());
    factory.register("http://groupquery0:5000/", StubShard::default());
    let graph = factory.register(
        "http://groupgraph0:5000/",
        StubShard {
            contains_group: true,
            ..Default::default()
        },
    );
    let (coordinator, _, _) = coordinator(
        factory,
        vec![
            descriptor(DataElement::User, Role::Query, 0, "UserQuery0"),
            descriptor(DataElement::Group, Role::Query, 0, "GroupQuery0"),
            descriptor(DataElement::GroupToGroupMapping, Role::Query, 0, "GroupGraph0"),
        ],
    );

    assert!(coordinator
        .contains_group(&Group::from("group1"))
        .await
        .unwrap());
    assert_eq!(graph.calls(), vec!["contains_group(group1)"]);
}

#[tokio::test]
async fn test_components_accessible_by_user_unions_direct_and_group_grants() {
    let factory = Arc::new(StubFactory::default());
    factory.register(
        "http://userquery0:5000/",
        StubShard {
            component_mappings: vec![crate::model::ComponentAccess::new("Order", "View")],
            direct_groups: groups(&["group1"]),
            ..Default::default()
        },
    );
    factory.register(
        "http://groupgraph0:5000/",
        StubShard {
            expansion: groups(&["group1"]),
            ..Default::default()
        },
    );
    factory.register(
        "http://groupquery0:5000/",
        StubShard {
            component_mappings: vec![crate::model::ComponentAccess::new("Order", "Create")],
            ..Default::default()
        },
    );
    let (coordinator, metrics, _) = coordinator(
        factory,
        vec![
            descriptor(DataElement::User, Role::Query, 0, "UserQuery0"),
            descriptor(DataElement::GroupToGroupMapping, Role::Query, 0, "GroupGraph0"),
            descriptor(DataElement::Group, Role::Query, 0, "GroupQuery0"),
        ],
    );

    let accessible = coordinator
        .application_components_accessible_by_user(&User::from("user1"))
        .await
        .unwrap();
    let expected: HashSet<_> = [
        crate::model::ComponentAccess::new("Order", "View"),
        crate::model::ComponentAccess::new("Order", "Create"),
    ]
    .into_iter()
    .collect();
    assert_eq!(accessible, expected);

    assert_eq!(
        metrics.total_of(AmountMetric::GetApplicationComponentsAccessibleByUserGroupsMappedToUser),
        1
    );
    assert_eq!(
        metrics
            .total_of(AmountMetric::GetApplicationComponentsAccessibleByUserGroupShardsQueried),
        1
    );
}

#[tokio::test]
async fn test_entities_accessible_by_group_skips_user_steps() {
    let factory = Arc::new(StubFactory::default());
    factory.register(
        "http://groupgraph0:5000/",
        StubShard {
            expansion: groups(&["group1", "group2"]),
            ..Default::default()
        },
    );
    let group_shard = factory.register(
        "http://groupquery0:5000/",
        StubShard {
            typed_entities: vec!["CompanyA".into(), "CompanyB".into()],
            ..Default::default()
        },
    );
    let (coordinator, _, _) = coordinator(
        factory,
        vec![
            descriptor(DataElement::GroupToGroupMapping, Role::Query, 0, "GroupGraph0"),
            descriptor(DataElement::Group, Role::Query, 0, "GroupQuery0"),
        ],
    );

    let entities = coordinator
        .entities_of_type_accessible_by_group(
            &Group::from("group1"),
            &EntityType::from("ClientAccount"),
        )
        .await
        .unwrap();
    let expected: HashSet<Entity> = ["CompanyA", "CompanyB"]
        .into_iter()
        .map(Entity::from)
        .collect();
    assert_eq!(entities, expected);

    assert_eq!(
        group_shard.calls(),
        vec!["entities_of_type_accessible_by_groups(group1+group2,ClientAccount)"]
    );
}

#[tokio::test]
async fn test_missing_role_fails_at_call_time() {
    let factory = Arc::new(StubFactory::default());
    factory.register("http://userevent0:5000/", StubShard::default());
    let (coordinator, metrics, _) = coordinator(
        factory,
        vec![descriptor(DataElement::User, Role::Event, 0, "UserEvent0")],
    );

    let error = coordinator
        .contains_user(&User::from("user1"))
        .await
        .unwrap_err();
    assert_eq!(
        error.message(),
        "no shards are configured for user query operations"
    );
    assert_eq!(
        metrics.events(),
        vec![
            MetricEvent::Begin(IntervalMetric::ContainsUserQueryTime),
            MetricEvent::Cancel(IntervalMetric::ContainsUserQueryTime),
        ]
    );
}
