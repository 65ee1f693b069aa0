use serde::Deserialize;

/// Settings of a [`RepositoryAdapter`](crate::RepositoryAdapter).
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Repository folder every adapter path is rooted under, e.g.
    /// `/default-domain/workspaces`. Empty means the repository root.
    #[serde(default)]
    pub root_prefix: String,
}

impl AdapterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_prefix(mut self, root_prefix: impl Into<String>) -> Self {
        self.root_prefix = root_prefix.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_prefix_defaults_to_empty() {
        let config: AdapterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AdapterConfig::new());
        assert_eq!(config.root_prefix, "");
    }

    #[test]
    fn builder_sets_prefix() {
        let config = AdapterConfig::new().with_root_prefix("/default-domain/workspaces");
        let parsed: AdapterConfig =
            serde_json::from_str(r#"{"root_prefix": "/default-domain/workspaces"}"#).unwrap();
        assert_eq!(config, parsed);
    }
}
