use std::time::Duration;

use url::Url;

/// Retry policy for tool invocations.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// A timeout on attempt `n` waits `backoff_unit * n`; any other transport
    /// fault waits `backoff_unit * (n + 1)`.
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn timeout_backoff(&self, attempt: u32) -> Duration {
        self.backoff_unit * attempt
    }

    pub fn transport_backoff(&self, attempt: u32) -> Duration {
        self.backoff_unit * (attempt + 1)
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: Url,
    pub client_name: String,
    pub client_version: String,
    pub user_agent: String,
    pub handshake_timeout: Duration,
    pub call_timeout: Duration,
    pub retry: RetryPolicy,
}

impl ClientConfig {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            client_name: "salesdesk".to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
            user_agent: format!("salesdesk/{}", env!("CARGO_PKG_VERSION")),
            handshake_timeout: Duration::from_secs(30),
            call_timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
        }
    }
}
