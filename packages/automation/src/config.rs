use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

fn default_timeout_secs() -> u64 {
    30
}

/// Connection settings for [`HttpAutomationClient`](crate::HttpAutomationClient).
///
/// Deserializable so it can live inside a larger application config; the
/// builder methods cover programmatic construction.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Root URL of the repository server, e.g. `http://localhost:8080/nuxeo`.
    pub base_url: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Headers sent with every request.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            username: None,
            password: None,
            timeout_secs: default_timeout_secs(),
            headers: HashMap::new(),
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let config: ClientConfig =
            serde_json::from_value(serde_json::json!({"base_url": "http://localhost:8080/nuxeo"}))
                .unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert!(config.username.is_none());
        assert!(config.headers.is_empty());
    }

    #[test]
    fn builder_sets_fields() {
        let config = ClientConfig::new("http://repo")
            .with_credentials("Administrator", "secret")
            .with_timeout(Duration::from_secs(5))
            .with_header("X-Repository", "default");

        assert_eq!(config.username.as_deref(), Some("Administrator"));
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(
            config.headers.get("X-Repository"),
            Some(&"default".to_string())
        );
    }
}
