//! Application state wiring the session manager and chat adapters together.
//!
//! The core types are generic over their ports; AppState pins them to the
//! concrete infra implementations.

use std::path::PathBuf;

use anyhow::Context;

use fooorum_core::chat::{ChatTransport, TransportSettings};
use fooorum_core::session::SessionManager;
use fooorum_infra::config::{apply_overrides, load_client_config};
use fooorum_infra::filesystem::{FileTokenStore, resolve_data_dir};
use fooorum_infra::http::{HttpAuthClient, HttpHistoryClient};
use fooorum_infra::ws::WsConnector;
use fooorum_types::config::ClientConfig;

/// Session manager pinned to the HTTP auth client and the file token store.
pub type ConcreteSessionManager = SessionManager<HttpAuthClient, FileTokenStore>;

/// Shared state for all CLI commands.
pub struct AppState {
    pub config: ClientConfig,
    pub data_dir: PathBuf,
    pub token_store: FileTokenStore,
    pub session: ConcreteSessionManager,
}

impl AppState {
    /// Load config, build the session manager and restore any stored session.
    pub async fn init(auth_url: Option<String>, forum_url: Option<String>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let config = apply_overrides(load_client_config(&data_dir).await, auth_url, forum_url);
        let auth = HttpAuthClient::new(&config.auth_url, config.request_timeout())
            .context("failed to set up the auth service client")?;
        let token_store = FileTokenStore::in_data_dir(&data_dir);
        let session = SessionManager::new(auth, token_store.clone());

        if let Some(identity) = session.restore_session().await {
            tracing::debug!(user = %identity.username, "restored session");
        }

        Ok(Self {
            config,
            data_dir,
            token_store,
            session,
        })
    }

    /// Mount a chat transport against the configured forum service.
    pub fn mount_chat(&self) -> anyhow::Result<ChatTransport> {
        let connector = WsConnector::new(&self.config.forum_url)
            .context("failed to set up the chat socket client")?;
        let history = HttpHistoryClient::new(&self.config.forum_url)
            .context("failed to set up the chat history client")?;
        Ok(ChatTransport::mount(
            connector,
            history,
            self.session.context(),
            TransportSettings::from(&self.config),
        ))
    }
}
