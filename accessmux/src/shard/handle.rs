use std::fmt;
use std::sync::Arc;

use crate::client::ShardClient;

/// A routed shard: the client plus the shard's human-readable description.
///
/// The description travels with the client so a failure can be attributed
/// to its shard long after the routing decision was made. Handles are
/// cheap to clone; the last clone dropped releases the client and its
/// connection pool.
#[derive(Clone)]
pub struct ShardHandle {
    client: Arc<dyn ShardClient>,
    description: Arc<str>,
}

impl ShardHandle {
    pub fn new(client: Arc<dyn ShardClient>, description: &str) -> Self {
        Self {
            client,
            description: description.into(),
        }
    }

    pub fn client(&self) -> &dyn ShardClient {
        self.client.as_ref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether two handles share the same underlying client instance.
    pub fn same_client(&self, other: &ShardHandle) -> bool {
        Arc::ptr_eq(&self.client, &other.client)
    }
}

impl fmt::Debug for ShardHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardHandle")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
