//! Client configuration loader.
//!
//! Reads `config.toml` from the data directory (`~/.fooorum/` by default)
//! and deserializes it into [`ClientConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::Path;

use fooorum_types::config::ClientConfig;

/// Name of the config file inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Load client configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`ClientConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - Otherwise returns the parsed config; omitted keys take their defaults.
pub async fn load_client_config(data_dir: &Path) -> ClientConfig {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ClientConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ClientConfig::default();
        }
    };

    match toml::from_str::<ClientConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ClientConfig::default()
        }
    }
}

/// Apply command-line / environment overrides on top of the file config.
pub fn apply_overrides(
    mut config: ClientConfig,
    auth_url: Option<String>,
    forum_url: Option<String>,
) -> ClientConfig {
    if let Some(url) = auth_url {
        config.auth_url = url;
    }
    if let Some(url) = forum_url {
        config.forum_url = url;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_client_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_client_config(tmp.path()).await;
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.reconnect_delay_secs, 5);
    }

    #[tokio::test]
    async fn load_client_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
auth_url = "https://auth.example.com"
forum_url = "https://forum.example.com"
retention_minutes = 10
"#,
        )
        .await
        .unwrap();

        let config = load_client_config(tmp.path()).await;
        assert_eq!(config.auth_url, "https://auth.example.com");
        assert_eq!(config.forum_url, "https://forum.example.com");
        assert_eq!(config.retention_minutes, 10);
        assert_eq!(config.prune_interval_secs, 60);
    }

    #[tokio::test]
    async fn load_client_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join(CONFIG_FILE), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_client_config(tmp.path()).await;
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn apply_overrides_replaces_only_given_urls() {
        let config = apply_overrides(
            ClientConfig::default(),
            None,
            Some("http://forum.test:9000".to_string()),
        );
        assert_eq!(config.auth_url, ClientConfig::default().auth_url);
        assert_eq!(config.forum_url, "http://forum.test:9000");
    }
}
