//! HTTP client for a Sharepad server.
//!
//! [`SyncClient`] speaks the two-verb sync API: fetch the whole payload, or
//! post a partial one. [`view::SyncView`] builds the polling client on top.

pub mod view;

pub use view::{DisplayState, Notice, SyncView, ViewConfig, ViewEvent};

use std::time::Duration;

use reqwest::{Client, Response};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::store::{PayloadPatch, SharedPayload};

/// Error body returned by the server for rejected requests.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for the sync endpoint of one server.
#[derive(Debug, Clone)]
pub struct SyncClient {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl SyncClient {
    /// Create a client for the server at `base_url`.
    ///
    /// `localhost:8080` and `http://localhost:8080/` both work.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;

        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(format!("sharepad/{}", crate::VERSION))
            .build()
            .map_err(|e| Error::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            request_timeout,
        })
    }

    /// Base URL of the server, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, crate::SYNC_PATH)
    }

    /// Fetch the current shared payload.
    pub async fn fetch(&self) -> Result<SharedPayload> {
        let response = self
            .client
            .get(self.endpoint())
            .send()
            .await
            .map_err(|e| self.request_error(&e))?;

        self.read_payload(response).await
    }

    /// Send a partial payload and return the merged result.
    pub async fn update(&self, patch: &PayloadPatch) -> Result<SharedPayload> {
        let response = self
            .client
            .post(self.endpoint())
            .json(patch)
            .send()
            .await
            .map_err(|e| self.request_error(&e))?;

        self.read_payload(response).await
    }

    async fn read_payload(&self, response: Response) -> Result<SharedPayload> {
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.request_error(&e))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body).map_or_else(
                |_| {
                    status
                        .canonical_reason()
                        .unwrap_or("unexpected status")
                        .to_string()
                },
                |b| b.message,
            );
            return Err(Error::ServerStatus {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }

    fn request_error(&self, err: &reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout(self.request_timeout.as_secs())
        } else {
            Error::Request(err.to_string())
        }
    }
}

/// Add a scheme if missing and strip trailing slashes.
fn normalize_base_url(url: &str) -> Result<String> {
    let url = url.trim().trim_end_matches('/');
    if url.is_empty() {
        return Err(Error::InvalidConfig {
            key: "client.server_url".into(),
            reason: "server URL is empty".into(),
        });
    }

    if url.contains("://") {
        Ok(url.to_string())
    } else {
        Ok(format!("http://{url}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("localhost:8080").unwrap(),
            "http://localhost:8080"
        );
        assert_eq!(
            normalize_base_url("http://192.168.1.5:8080/").unwrap(),
            "http://192.168.1.5:8080"
        );
        assert_eq!(
            normalize_base_url(" https://pad.lan ").unwrap(),
            "https://pad.lan"
        );
        assert!(normalize_base_url("  ").is_err());
    }

    #[test]
    fn test_client_endpoint() {
        let client = SyncClient::new("localhost:9000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9000");
        assert_eq!(client.endpoint(), "http://localhost:9000/api/text");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_request_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = SyncClient::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
        let err = client.fetch().await.unwrap_err();
        assert!(matches!(err, Error::Request(_) | Error::Timeout(_)));
        assert!(err.is_recoverable());
    }
}
