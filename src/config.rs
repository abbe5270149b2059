use std::time::Duration;

/// Where the API lives unless told otherwise.
pub const DEFAULT_HOST: &str = "https://api.admitad.com";

/// Requests may take a long time on the provider's side; we wait generously.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// How many items a paginator asks for per page.
pub const DEFAULT_PAGE_LIMIT: usize = 200;

/// Settings for building an [`ApiClient`](crate::ApiClient) over the default transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme and authority of the API, e.g. `https://api.admitad.com`.
    pub host: String,
    pub timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.host, "https://api.admitad.com");
        assert_eq!(config.timeout, Duration::from_secs(300));
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::default()
            .with_host("http://127.0.0.1:8080")
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("admitad-api-tests");
        assert_eq!(config.host, "http://127.0.0.1:8080");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent.as_deref(), Some("admitad-api-tests"));
    }
}
