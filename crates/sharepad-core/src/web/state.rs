//! Application state shared by all HTTP handlers.

use std::sync::Arc;

use crate::store::SharedStore;

use super::WebServerConfig;

/// Shared application state for all HTTP handlers.
pub struct AppState {
    /// The one shared payload
    pub store: SharedStore,

    /// Server configuration
    pub config: WebServerConfig,

    /// Device name for this instance
    pub device_name: String,
}

impl AppState {
    /// Create application state with an empty store.
    #[must_use]
    pub fn new(config: WebServerConfig) -> Self {
        Self::with_store(config, SharedStore::new())
    }

    /// Create application state around an existing store.
    #[must_use]
    pub fn with_store(config: WebServerConfig, store: SharedStore) -> Self {
        let device_name = hostname::get().map_or_else(
            |_| "Sharepad".to_string(),
            |h| h.to_string_lossy().into_owned(),
        );

        Self {
            store,
            config,
            device_name,
        }
    }

    /// URL other devices should open.
    #[must_use]
    pub fn public_url(&self) -> String {
        super::server_urls(&self.config)
            .pop()
            .unwrap_or_else(|| format!("http://localhost:{}", self.config.port))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("device_name", &self.device_name)
            .finish_non_exhaustive()
    }
}

/// Type alias for shared state across handlers.
pub type SharedState = Arc<AppState>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PayloadPatch;

    #[test]
    fn test_app_state_creation() {
        let state = AppState::new(WebServerConfig::default());
        assert!(!state.device_name.is_empty());
    }

    #[test]
    fn test_public_url_localhost_only() {
        let config = WebServerConfig {
            port: 9123,
            localhost_only: true,
            ..Default::default()
        };
        let state = AppState::new(config);
        assert_eq!(state.public_url(), "http://localhost:9123");
    }

    #[tokio::test]
    async fn test_state_owns_store() {
        let state = Arc::new(AppState::new(WebServerConfig::default()));
        state.store.write(&PayloadPatch::text("x")).await;
        assert_eq!(state.store.read().await.text, "x");
    }
}
