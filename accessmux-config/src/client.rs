//! Connection settings for one shard client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;
use crate::{MAX_RETRY_COUNT, MAX_RETRY_INTERVAL};

/// How to reach one backend shard node and how hard to try.
///
/// Transport-level failures are retried `retry_count` times with a fixed
/// `retry_interval` pause between attempts. HTTP error responses are never
/// retried.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the shard node, e.g. `http://shard-0.access.local:5000/`.
    pub base_url: Url,

    /// Retries after a transport failure. 0 disables retrying.
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Seconds to wait between retries.
    #[serde(default = "default_retry_interval")]
    pub retry_interval: u64,
}

fn default_retry_count() -> u32 {
    5
}

fn default_retry_interval() -> u64 {
    1
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            retry_count: default_retry_count(),
            retry_interval: default_retry_interval(),
        }
    }

    /// Reject out-of-range retry settings.
    pub fn validate(&self) -> Result<(), Error> {
        if self.retry_count > MAX_RETRY_COUNT {
            return Err(Error::RetryCount(self.retry_count));
        }
        if self.retry_interval > MAX_RETRY_INTERVAL {
            return Err(Error::RetryInterval(self.retry_interval));
        }
        Ok(())
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig::new("http://localhost:5000/".parse().unwrap())
    }

    #[test]
    fn test_bounds() {
        let mut c = config();
        assert!(c.validate().is_ok());

        c.retry_count = 59;
        c.retry_interval = 120;
        assert!(c.validate().is_ok());

        c.retry_count = 60;
        assert!(matches!(c.validate(), Err(Error::RetryCount(60))));

        c.retry_count = 0;
        c.retry_interval = 121;
        assert!(matches!(c.validate(), Err(Error::RetryInterval(121))));
    }

    #[test]
    fn test_toml_defaults() {
        let c: ClientConfig = toml::from_str(r#"base_url = "http://shard-0:5000/""#).unwrap();
        assert_eq!(c.retry_count, 5);
        assert_eq!(c.retry_interval(), Duration::from_secs(1));
    }
}
