use thiserror::Error;

use crate::client;
use crate::shard;

/// Failure of one coordinator operation, attributed to a shard.
///
/// The message names the operation, its arguments, and the failing shard's
/// configured description; the original client error is the source. The
/// message is meant for operators: it leaks shard descriptions, so don't
/// surface it to end users verbatim.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct OperationError {
    message: String,
    #[source]
    source: Option<client::Error>,
}

impl OperationError {
    /// Wrap a per-shard failure. `action` is the verb phrase up to the
    /// word "shard", trailing preposition included, e.g.
    /// `add user 'user1' to`.
    pub(crate) fn shard(action: String, description: &str, source: client::Error) -> Self {
        Self {
            message: format!(
                "Failed to {} shard with configuration '{}'.",
                action, description
            ),
            source: Some(source),
        }
    }

    pub(crate) fn routing(error: shard::Error) -> Self {
        let message = error.to_string();
        Self {
            message,
            source: match error {
                shard::Error::Client(cause) => Some(cause),
                _ => None,
            },
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
