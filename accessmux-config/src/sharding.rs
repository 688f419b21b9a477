//! Shard descriptors and shard configuration sets.

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::client::ClientConfig;
use crate::error::Error;

/// Which partitioning scheme a shard participates in.
///
/// User and group data are partitioned by their own identifiers; the
/// group-to-group relation is partitioned by the "from" group.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DataElement {
    User,
    Group,
    GroupToGroupMapping,
}

impl DataElement {
    pub const ALL: [DataElement; 3] = [
        DataElement::User,
        DataElement::Group,
        DataElement::GroupToGroupMapping,
    ];
}

impl Display for DataElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataElement::User => write!(f, "user"),
            DataElement::Group => write!(f, "group"),
            DataElement::GroupToGroupMapping => write!(f, "group to group mapping"),
        }
    }
}

/// Which operations a shard serves: reads or mutations.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Query,
    Event,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Query, Role::Event];
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Query => write!(f, "query"),
            Role::Event => write!(f, "event"),
        }
    }
}

/// One backend shard node.
///
/// The shard owns identifiers whose 32-bit hash falls into
/// `[hash_range_start, next shard's start)` for its `(element, role)` pair.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct ShardDescriptor {
    pub element: DataElement,
    pub role: Role,

    /// First hash value this shard owns.
    pub hash_range_start: u32,

    /// How to reach the node.
    pub client: ClientConfig,

    /// Human-readable shard label, carried into error messages.
    pub description: String,
}

/// An immutable set of shard descriptors, validated to partition the whole
/// 32-bit hash range for every `(element, role)` pair it mentions.
///
/// Two sets are equal if they contain the same descriptors, regardless of
/// order.
#[derive(Debug, Clone)]
pub struct ShardSet {
    descriptors: Vec<ShardDescriptor>,
}

impl ShardSet {
    /// Validate and build a shard set.
    ///
    /// For every `(element, role)` pair present, the hash range starts must
    /// be unique and include 0. Unique starts with a zero start partition
    /// `[0, 2^32)` contiguously once sorted, so this is the whole
    /// partitioning invariant.
    pub fn new(descriptors: Vec<ShardDescriptor>) -> Result<Self, Error> {
        let mut starts: HashMap<(DataElement, Role), HashSet<u32>> = HashMap::new();

        for descriptor in &descriptors {
            descriptor.client.validate()?;

            let seen = starts
                .entry((descriptor.element, descriptor.role))
                .or_default();
            if !seen.insert(descriptor.hash_range_start) {
                return Err(Error::DuplicateStart {
                    element: descriptor.element,
                    role: descriptor.role,
                    start: descriptor.hash_range_start,
                });
            }
        }

        for ((element, role), seen) in &starts {
            if !seen.contains(&0) {
                return Err(Error::MissingZeroStart {
                    element: *element,
                    role: *role,
                });
            }
        }

        Ok(Self { descriptors })
    }

    /// Require every `(element, role)` pair of a full deployment.
    pub fn check_full(&self) -> Result<(), Error> {
        for element in DataElement::ALL {
            for role in Role::ALL {
                if !self
                    .descriptors
                    .iter()
                    .any(|d| d.element == element && d.role == role)
                {
                    return Err(Error::NoShards { element, role });
                }
            }
        }
        Ok(())
    }

    pub fn descriptors(&self) -> &[ShardDescriptor] {
        &self.descriptors
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }
}

impl PartialEq for ShardSet {
    fn eq(&self, other: &Self) -> bool {
        if self.descriptors.len() != other.descriptors.len() {
            return false;
        }
        let mut counts: HashMap<&ShardDescriptor, i64> = HashMap::new();
        for descriptor in &self.descriptors {
            *counts.entry(descriptor).or_default() += 1;
        }
        for descriptor in &other.descriptors {
            *counts.entry(descriptor).or_default() -= 1;
        }
        counts.values().all(|count| *count == 0)
    }
}

impl Eq for ShardSet {}

#[cfg(test)]
mod test {
    use super::*;

    pub(crate) fn descriptor(
        element: DataElement,
        role: Role,
        start: u32,
        description: &str,
    ) -> ShardDescriptor {
        ShardDescriptor {
            element,
            role,
            hash_range_start: start,
            client: ClientConfig::new(
                format!("http://{}:5000/", description.to_lowercase())
                    .parse()
                    .unwrap(),
            ),
            description: description.into(),
        }
    }

    #[test]
    fn test_partitioning_invariant() {
        let ok = ShardSet::new(vec![
            descriptor(DataElement::User, Role::Query, 0, "UserQuery0"),
            descriptor(DataElement::User, Role::Query, 0x8000_0000, "UserQuery1"),
            descriptor(DataElement::User, Role::Event, 0, "UserEvent0"),
        ]);
        assert!(ok.is_ok());

        let gap = ShardSet::new(vec![descriptor(
            DataElement::User,
            Role::Query,
            0x8000_0000,
            "UserQuery1",
        )]);
        assert!(matches!(gap, Err(Error::MissingZeroStart { .. })));

        let dup = ShardSet::new(vec![
            descriptor(DataElement::User, Role::Query, 0, "UserQuery0"),
            descriptor(DataElement::User, Role::Query, 0, "UserQuery1"),
        ]);
        assert!(matches!(
            dup,
            Err(Error::DuplicateStart { start: 0, .. })
        ));
    }

    #[test]
    fn test_client_bounds_checked() {
        let mut bad = descriptor(DataElement::User, Role::Query, 0, "UserQuery0");
        bad.client.retry_count = 100;
        assert!(matches!(
            ShardSet::new(vec![bad]),
            Err(Error::RetryCount(100))
        ));
    }

    #[test]
    fn test_check_full() {
        let mut descriptors = vec![];
        for element in DataElement::ALL {
            for role in Role::ALL {
                descriptors.push(descriptor(
                    element,
                    role,
                    0,
                    &format!("{:?}{:?}", element, role),
                ));
            }
        }
        let full = ShardSet::new(descriptors.clone()).unwrap();
        assert!(full.check_full().is_ok());

        descriptors.pop();
        let partial = ShardSet::new(descriptors).unwrap();
        assert!(matches!(partial.check_full(), Err(Error::NoShards { .. })));
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = descriptor(DataElement::User, Role::Query, 0, "A");
        let b = descriptor(DataElement::Group, Role::Event, 0, "B");

        let left = ShardSet::new(vec![a.clone(), b.clone()]).unwrap();
        let right = ShardSet::new(vec![b, a.clone()]).unwrap();
        assert_eq!(left, right);

        let shorter = ShardSet::new(vec![a]).unwrap();
        assert_ne!(left, shorter);
    }
}
