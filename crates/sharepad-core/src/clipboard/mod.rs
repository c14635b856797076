//! System clipboard access for terminal clients.
//!
//! The browser page pastes and copies through the browser's clipboard API.
//! The CLI does the same through this module: `sharepad paste` reads the
//! local clipboard into the shared payload, `sharepad copy` writes the shared
//! payload back to the local clipboard.

pub mod access;

pub use access::{create_clipboard, ClipboardAccess, NativeClipboard};

use xxhash_rust::xxh3::xxh3_64;

use crate::datauri::{encode_data_uri, DataUri};
use crate::error::{Error, Result};
use crate::store::{PayloadPatch, SharedPayload};

/// Clipboard content that can be shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardContent {
    /// Plain text content
    Text(String),
    /// Encoded image data
    Image {
        /// Encoded image bytes (PNG when read from the clipboard)
        data: Vec<u8>,
        /// Media type of `data`
        mime: String,
        /// Image width in pixels
        width: u32,
        /// Image height in pixels
        height: u32,
    },
}

impl ClipboardContent {
    /// Compute xxh3 hash of content.
    #[must_use]
    pub fn hash(&self) -> u64 {
        match self {
            Self::Text(text) => xxh3_64(text.as_bytes()),
            Self::Image { data, .. } => xxh3_64(data),
        }
    }

    /// Get size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        match self {
            Self::Text(text) => text.len() as u64,
            Self::Image { data, .. } => data.len() as u64,
        }
    }

    /// Generate preview string (truncated text or image dimensions).
    #[must_use]
    pub fn preview(&self, max_len: usize) -> String {
        match self {
            Self::Text(text) => preview_text(text, max_len),
            Self::Image { width, height, .. } => format!("Image ({width}x{height})"),
        }
    }

    /// Build the patch that shares this content.
    #[must_use]
    pub fn to_patch(&self) -> PayloadPatch {
        match self {
            Self::Text(text) => PayloadPatch::text(text.clone()),
            Self::Image { data, mime, .. } => PayloadPatch::image(encode_data_uri(data, mime)),
        }
    }

    /// Pick the clipboard content out of a shared payload.
    ///
    /// With `prefer_image` the image is used when present; otherwise the
    /// text is used when non-empty. Returns `None` when the chosen field is
    /// empty.
    pub fn from_payload(payload: &SharedPayload, prefer_image: bool) -> Result<Option<Self>> {
        if prefer_image {
            return payload.image.as_deref().map(Self::from_data_uri).transpose();
        }

        if payload.text.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::Text(payload.text.clone())))
    }

    /// Decode an image data URI into clipboard content.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let parsed = DataUri::parse(uri)?;
        if !parsed.is_image() {
            return Err(Error::InvalidImage(format!(
                "'{}' is not an image type",
                parsed.mime()
            )));
        }

        let data = parsed.decode()?;
        let decoded = image::load_from_memory(&data)
            .map_err(|e| Error::InvalidImage(format!("failed to decode image: {e}")))?;

        Ok(Self::Image {
            width: decoded.width(),
            height: decoded.height(),
            mime: parsed.mime().to_string(),
            data,
        })
    }
}

/// Shorten text for single-line display.
#[must_use]
pub fn preview_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        format!("\"{}\"", text.replace('\n', "\\n"))
    } else {
        format!(
            "\"{}...\"",
            text.chars()
                .take(max_len)
                .collect::<String>()
                .replace('\n', "\\n")
        )
    }
}
