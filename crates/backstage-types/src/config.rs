//! Client configuration types.
//!
//! `BackstageConfig` represents the `config.toml` in the data directory that
//! tells the client which server and team to talk to.

use serde::{Deserialize, Serialize};

/// Top-level client configuration.
///
/// Loaded from `~/.backstage/config.toml`. All fields have defaults so an
/// empty file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackstageConfig {
    /// Base URL of the server, without the `/api/v4` suffix.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// URL name of the team whose backstage is managed.
    #[serde(default)]
    pub team: Option<String>,

    /// Largest accepted bot icon upload, in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Per-request timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Page size for paginated listings.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_server_url() -> String {
    "http://localhost:8065".to_string()
}

fn default_max_file_size() -> u64 {
    50 * 1024 * 1024
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_per_page() -> u32 {
    200
}

impl Default for BackstageConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            team: None,
            max_file_size: default_max_file_size(),
            request_timeout_secs: default_request_timeout_secs(),
            per_page: default_per_page(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = BackstageConfig::default();
        assert_eq!(config.server_url, "http://localhost:8065");
        assert_eq!(config.max_file_size, 52_428_800);
        assert_eq!(config.per_page, 200);
        assert!(config.team.is_none());
    }

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: BackstageConfig = toml::from_str("").unwrap();
        assert_eq!(config, BackstageConfig::default());
    }

    #[test]
    fn test_deserialize_with_values() {
        let config: BackstageConfig = toml::from_str(
            r#"
server_url = "https://chat.example.com"
team = "eng"
max_file_size = 1048576
"#,
        )
        .unwrap();
        assert_eq!(config.server_url, "https://chat.example.com");
        assert_eq!(config.team.as_deref(), Some("eng"));
        assert_eq!(config.max_file_size, 1_048_576);
        assert_eq!(config.request_timeout_secs, 30);
    }
}
