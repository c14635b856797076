//! HTTP endpoint handlers for the Sharepad sync API.

#![allow(clippy::missing_errors_doc)]

use axum::{
    body::Bytes,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::datauri::{check_image_size, DataUri};
use crate::error::Result;
use crate::store::{PayloadPatch, SharedPayload};

use super::error::{ApiError, ApiResult};
use super::state::SharedState;
use super::WebServerConfig;

// ============================================================================
// Response types
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" while the server is up
    status: &'static str,
    /// Server version
    version: &'static str,
}

/// Network information response.
#[derive(Debug, Serialize)]
pub struct NetworkResponse {
    /// Device name
    device_name: String,
    /// URLs other devices can open
    addresses: Vec<String>,
    /// Listening port
    port: u16,
}

// ============================================================================
// Sync handlers
// ============================================================================

/// GET /api/text - Return the current shared payload.
pub async fn get_payload(State(state): State<SharedState>) -> Json<SharedPayload> {
    Json(state.store.read().await)
}

/// POST /api/text - Merge a partial payload and return the merged result.
///
/// The body is parsed as JSON whatever the `Content-Type` says.
pub async fn update_payload(
    State(state): State<SharedState>,
    body: Bytes,
) -> ApiResult<Json<SharedPayload>> {
    let patch = PayloadPatch::from_json(&body).map_err(|e| {
        tracing::debug!("Rejected update: {}", e);
        ApiError::bad_request("Request body must be a JSON object").with_details(e.to_string())
    })?;

    validate_image(&patch, &state.config).map_err(|e| {
        tracing::warn!("Rejected image: {}", e);
        ApiError::from(e)
    })?;

    let payload = state.store.write(&patch).await;
    tracing::debug!(fields = ?patch.fields(), bytes = body.len(), "Payload updated");

    Ok(Json(payload))
}

/// Check the image in a patch when the server enforces image limits.
fn validate_image(patch: &PayloadPatch, config: &WebServerConfig) -> Result<()> {
    if !config.enforce_image_limit {
        return Ok(());
    }

    if let Some(uri) = patch.image_uri() {
        let uri = DataUri::parse(uri)?;
        if !uri.is_image() {
            return Err(crate::error::Error::InvalidDataUri(format!(
                "'{}' is not an image type",
                uri.mime()
            )));
        }
        check_image_size(uri.decoded_len(), config.max_image_bytes)?;
    }

    Ok(())
}

// ============================================================================
// Info handlers
// ============================================================================

/// GET /api/health - Liveness check.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::VERSION,
    })
}

/// GET /api/network - Get network information.
pub async fn get_network(State(state): State<SharedState>) -> Json<NetworkResponse> {
    Json(NetworkResponse {
        device_name: state.device_name.clone(),
        addresses: super::server_urls(&state.config),
        port: state.config.port,
    })
}

/// GET /api/qr - QR code SVG of the server URL.
pub async fn get_qr(State(state): State<SharedState>) -> ApiResult<Response> {
    let svg = crate::qr::generate_svg(&state.public_url())
        .map_err(|e| {
            ApiError::internal("Failed to generate QR code").with_details(e.to_string())
        })?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        svg,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datauri::encode_data_uri;
    use crate::error::Error;

    fn enforcing(limit: u64) -> WebServerConfig {
        WebServerConfig {
            enforce_image_limit: true,
            max_image_bytes: limit,
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_image_disabled_by_default() {
        let patch = PayloadPatch::image("not a data uri");
        assert!(validate_image(&patch, &WebServerConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_image_size() {
        let config = enforcing(4);
        let ok = PayloadPatch::image(encode_data_uri(b"abcd", "image/png"));
        assert!(validate_image(&ok, &config).is_ok());

        let big = PayloadPatch::image(encode_data_uri(b"abcde", "image/png"));
        assert!(matches!(
            validate_image(&big, &config),
            Err(Error::ImageTooLarge { size: 5, limit: 4 })
        ));
    }

    #[test]
    fn test_validate_image_type() {
        let config = enforcing(1024);
        let text = PayloadPatch::image("data:text/plain,hello");
        assert!(matches!(
            validate_image(&text, &config),
            Err(Error::InvalidDataUri(_))
        ));

        let garbage = PayloadPatch::image("hello");
        assert!(matches!(
            validate_image(&garbage, &config),
            Err(Error::InvalidDataUri(_))
        ));
    }

    #[test]
    fn test_validate_ignores_text_and_clears() {
        let config = enforcing(1);
        assert!(validate_image(&PayloadPatch::text("long text"), &config).is_ok());
        assert!(validate_image(&PayloadPatch::clear_image(), &config).is_ok());
    }
}
