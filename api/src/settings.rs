use std::env;
use std::time::Duration;

/// Where and how the client reaches the proxy admin server.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ClientSettings {
    /// Base URL the `/configurations` paths are appended to.
    pub base_url: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl ClientSettings {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:1234";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates settings from environment variables, falling back to the
    /// in-code defaults for anything unset or unparseable.
    ///
    /// # Environment Variables
    /// - `PROXY_ADMIN_URL`: base URL of the admin server.
    /// - `PROXY_ADMIN_TIMEOUT_SECS`: request timeout in whole seconds.
    pub fn from_env() -> Self {
        Self::from_vars(
            env::var("PROXY_ADMIN_URL").ok(),
            env::var("PROXY_ADMIN_TIMEOUT_SECS").ok(),
        )
    }

    fn from_vars(base_url: Option<String>, timeout_secs: Option<String>) -> Self {
        let base_url = base_url
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string());

        let timeout = timeout_secs
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(Self::DEFAULT_TIMEOUT);

        Self { base_url, timeout }
    }

    /// Replaces the base URL, keeping the rest.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self::from_env()
    }
}
