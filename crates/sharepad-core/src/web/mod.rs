//! Embedded sync server for Sharepad.
//!
//! The server holds the single shared payload in memory and serves a small
//! web page that polls it. Any browser on the same network can open the page.
//!
//! ## Starting the server
//!
//! ```bash
//! sharepad serve                     # Default port 8080
//! sharepad serve --port 9000         # Custom port
//! sharepad serve --localhost-only    # Restrict to localhost
//! ```
//!
//! ## API Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | /api/text, /sync | Fetch the shared payload |
//! | POST | /api/text, /sync | Merge a partial payload, return the result |
//! | GET | /api/health | Liveness check |
//! | GET | /api/network | Device name and reachable addresses |
//! | GET | /api/qr | QR code (SVG) of the server URL |
//! | GET | / | Web UI |

pub mod assets;
pub mod error;
pub mod handlers;
pub mod state;

use std::future::Future;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::error::Result;
use crate::store::SharedStore;

pub use state::{AppState, SharedState};

/// Configuration for the web server.
#[derive(Debug, Clone)]
pub struct WebServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Bind to localhost only
    pub localhost_only: bool,
    /// Transport-level request body limit in bytes
    pub max_body_bytes: usize,
    /// Reject oversized or malformed images on the server
    pub enforce_image_limit: bool,
    /// Image size limit used when `enforce_image_limit` is set
    pub max_image_bytes: u64,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for WebServerConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            port: config.port,
            localhost_only: config.localhost_only,
            max_body_bytes: config.max_body_bytes,
            enforce_image_limit: config.enforce_image_limit,
            max_image_bytes: config.max_image_bytes,
        }
    }
}

impl WebServerConfig {
    /// Get the bind address for the server.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        if self.localhost_only {
            SocketAddr::from(([127, 0, 0, 1], self.port))
        } else {
            SocketAddr::from(([0, 0, 0, 0], self.port))
        }
    }
}

/// The web server instance.
#[derive(Debug)]
pub struct WebServer {
    state: SharedState,
}

impl WebServer {
    /// Create a new web server with an empty payload.
    #[must_use]
    pub fn new(config: WebServerConfig) -> Self {
        Self::with_store(config, SharedStore::new())
    }

    /// Create a web server around an existing store.
    #[must_use]
    pub fn with_store(config: WebServerConfig, store: SharedStore) -> Self {
        Self {
            state: Arc::new(AppState::with_store(config, store)),
        }
    }

    /// Get the server configuration.
    #[must_use]
    pub fn config(&self) -> &WebServerConfig {
        &self.state.config
    }

    /// Get the shared handler state.
    #[must_use]
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Build the router with all routes and layers.
    #[must_use]
    pub fn router(&self) -> Router {
        router(Arc::clone(&self.state))
    }

    /// Bind the configured address and serve until Ctrl+C.
    pub async fn start(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config().bind_addr()).await?;
        self.serve(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            }
        })
        .await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener.local_addr()?;
        tracing::info!("Starting web server on {}", local_addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Stopping web server");
        Ok(())
    }

    /// Get all network addresses the server is accessible from.
    #[must_use]
    pub fn addresses(&self) -> Vec<String> {
        server_urls(self.config())
    }
}

/// Build the application router for the given state.
pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let max_body = state.config.max_body_bytes;

    Router::new()
        .route(
            crate::SYNC_PATH,
            get(handlers::get_payload).post(handlers::update_payload),
        )
        .route(
            crate::SYNC_ALIAS_PATH,
            get(handlers::get_payload).post(handlers::update_payload),
        )
        .route("/api/health", get(handlers::health))
        .route("/api/network", get(handlers::get_network))
        .route("/api/qr", get(handlers::get_qr))
        .fallback(assets::serve_static_fallback)
        // base64 inflates images by a third, so axum's 2 MB default is too small
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// URLs the server can be reached at, localhost first.
pub(crate) fn server_urls(config: &WebServerConfig) -> Vec<String> {
    let mut urls = vec![format!("http://localhost:{}", config.port)];

    if !config.localhost_only {
        urls.extend(
            local_addresses()
                .into_iter()
                .filter(|ip| ip != "127.0.0.1")
                .map(|ip| format!("http://{ip}:{}", config.port)),
        );
    }

    urls
}

/// Get local network addresses.
pub(crate) fn local_addresses() -> Vec<String> {
    let mut addrs = vec!["127.0.0.1".to_string()];

    // Connecting a UDP socket sends nothing; it only picks the outbound interface
    if let Ok(socket) = UdpSocket::bind("0.0.0.0:0") {
        if socket.connect("8.8.8.8:80").is_ok() {
            if let Ok(local_addr) = socket.local_addr() {
                let ip = local_addr.ip().to_string();
                if !addrs.contains(&ip) {
                    addrs.push(ip);
                }
            }
        }
    }

    addrs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_addr() {
        let mut config = WebServerConfig::default();
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:8080");

        config.localhost_only = true;
        config.port = 9000;
        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:9000");
    }

    #[test]
    fn test_config_from_server_config() {
        let server = ServerConfig {
            port: 1234,
            enforce_image_limit: true,
            ..Default::default()
        };
        let config = WebServerConfig::from(&server);
        assert_eq!(config.port, 1234);
        assert!(config.enforce_image_limit);
        assert_eq!(config.max_body_bytes, crate::DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn test_local_addresses() {
        let addrs = local_addresses();
        assert!(addrs.contains(&"127.0.0.1".to_string()));
    }

    #[test]
    fn test_server_urls_localhost_only() {
        let config = WebServerConfig {
            localhost_only: true,
            ..Default::default()
        };
        assert_eq!(server_urls(&config), vec!["http://localhost:8080"]);
    }

    #[test]
    fn test_addresses_start_with_localhost() {
        let server = WebServer::new(WebServerConfig::default());
        assert_eq!(server.addresses()[0], "http://localhost:8080");
    }
}
