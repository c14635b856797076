//! Error types for Sharepad.
//!
//! This module provides a unified error type for all Sharepad operations,
//! with specific error variants for different failure modes.

use std::io;

use thiserror::Error;

/// A specialized `Result` type for Sharepad operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Sharepad.
#[derive(Error, Debug)]
pub enum Error {
    /// Request body is not a valid payload (E001)
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Image exceeds the configured size limit (E002)
    #[error("image is too large: {size} bytes exceeds the {limit} byte limit")]
    ImageTooLarge {
        /// Size of the rejected image in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },

    /// Malformed data URI (E003)
    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),

    /// Content is not an image or cannot be decoded (E004)
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Could not reach the sync server (E005)
    #[error("request to sync server failed: {0}")]
    Request(String),

    /// Sync server answered with an error status (E006)
    #[error("sync server returned {status}: {message}")]
    ServerStatus {
        /// HTTP status code
        status: u16,
        /// Message from the server's error body
        message: String,
    },

    /// Operation timeout
    #[error("operation timed out after {0} seconds")]
    Timeout(u64),

    /// Clipboard access failed
    #[error("clipboard error: {0}")]
    ClipboardError(String),

    /// Clipboard is empty
    #[error("clipboard is empty")]
    ClipboardEmpty,

    /// Configuration file error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Invalid configuration value
    #[error("invalid configuration value for '{key}': {reason}")]
    InvalidConfig {
        /// Configuration key
        key: String,
        /// Reason for invalidity
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the error code associated with this error, if any.
    ///
    /// Error codes follow the pattern EXXX where XXX is a 3-digit number.
    #[must_use]
    pub const fn code(&self) -> Option<&'static str> {
        match self {
            Self::InvalidPayload(_) => Some("E001"),
            Self::ImageTooLarge { .. } => Some("E002"),
            Self::InvalidDataUri(_) => Some("E003"),
            Self::InvalidImage(_) => Some("E004"),
            Self::Request(_) => Some("E005"),
            Self::ServerStatus { .. } => Some("E006"),
            _ => None,
        }
    }

    /// Returns whether this error is recoverable (can be retried).
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Request(_) | Self::Timeout(_) => true,
            Self::ServerStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns a helpful suggestion for resolving the error, if applicable.
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Request(_) | Self::Timeout(_) => Some(
                "Check that `sharepad serve` is running and reachable.\n\
                 Point the client at it with --server http://<host>:<port>\n\
                 or set SHAREPAD_SERVER.",
            ),
            Self::ImageTooLarge { .. } => Some(
                "Pick a smaller image, or raise client.max_image_bytes:\n\
                   sharepad config set client.max_image_bytes <bytes>",
            ),
            Self::ClipboardError(_) => Some(
                "On Linux make sure DISPLAY or WAYLAND_DISPLAY is set\n\
                 and a clipboard manager is running.",
            ),
            Self::ClipboardEmpty => Some("Copy some text or an image first."),
            Self::ConfigError(_) => Some(
                "Inspect the file shown by `sharepad config path`,\n\
                 or restore defaults with `sharepad config reset`.",
            ),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
