//! Client configuration loader.
//!
//! Reads `config.toml` from the data directory (`~/.backstage/` in production)
//! and deserializes it into [`BackstageConfig`]. Falls back to defaults when
//! the file is missing or malformed.

use std::path::{Path, PathBuf};

use backstage_types::config::BackstageConfig;

const CONFIG_FILE: &str = "config.toml";

/// Resolve the data directory.
///
/// Priority:
/// 1. `BACKSTAGE_DATA_DIR` environment variable
/// 2. `~/.backstage`
/// 3. `./.backstage` when no home directory is known
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("BACKSTAGE_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".backstage");
    }

    PathBuf::from(".backstage")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`BackstageConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
pub async fn load_config(data_dir: &Path) -> BackstageConfig {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return BackstageConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return BackstageConfig::default();
        }
    };

    match toml::from_str::<BackstageConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            BackstageConfig::default()
        }
    }
}

/// Write configuration to `{data_dir}/config.toml`, creating the directory.
pub async fn save_config(data_dir: &Path, config: &BackstageConfig) -> std::io::Result<()> {
    tokio::fs::create_dir_all(data_dir).await?;
    let content = toml::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    tokio::fs::write(data_dir.join(CONFIG_FILE), content).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).await;
        assert_eq!(config, BackstageConfig::default());
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
server_url = "https://chat.example.com"
team = "ops"
per_page = 50
"#,
        )
        .await
        .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.server_url, "https://chat.example.com");
        assert_eq!(config.team.as_deref(), Some("ops"));
        assert_eq!(config.per_page, 50);
    }

    #[tokio::test]
    async fn load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config, BackstageConfig::default());
    }

    #[tokio::test]
    async fn save_then_load() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested");
        let config = BackstageConfig {
            team: Some("eng".to_string()),
            ..Default::default()
        };
        save_config(&dir, &config).await.unwrap();
        assert_eq!(load_config(&dir).await, config);
    }

    #[test]
    fn test_resolve_data_dir_from_env() {
        // SAFETY: This test is single-threaded and restores the env var immediately.
        unsafe {
            std::env::set_var("BACKSTAGE_DATA_DIR", "/tmp/test-backstage");
        }
        let dir = resolve_data_dir();
        assert_eq!(dir, PathBuf::from("/tmp/test-backstage"));
        unsafe {
            std::env::remove_var("BACKSTAGE_DATA_DIR");
        }
    }
}
