//! The shared payload and the in-memory store that holds it.
//!
//! A Sharepad server owns exactly one [`SharedStore`]. Every request reads or
//! merges into the same [`SharedPayload`]; there is no per-client state.
//!
//! ## Merge writes
//!
//! An update carries a [`PayloadPatch`]. Fields present in the patch replace
//! the stored field, fields absent from the patch are left alone:
//!
//! ```
//! use sharepad_core::store::{PayloadPatch, SharedPayload};
//!
//! let mut payload = SharedPayload::default();
//! payload.merge(&PayloadPatch::text("hello"));
//! payload.merge(&PayloadPatch::image("data:image/png;base64,AAA"));
//!
//! assert_eq!(payload.text, "hello");
//! assert_eq!(payload.image.as_deref(), Some("data:image/png;base64,AAA"));
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::RwLock;

use crate::error::{Error, Result};

/// The shared text and image, as stored and as exchanged over HTTP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedPayload {
    /// Last written plain text
    #[serde(default)]
    pub text: String,
    /// Last written image as a data URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl SharedPayload {
    /// Apply a patch field by field.
    ///
    /// `text: null` clears the text to an empty string, `image: null`
    /// removes the image.
    pub fn merge(&mut self, patch: &PayloadPatch) {
        if let Some(text) = &patch.text {
            self.text = text.clone().unwrap_or_default();
        }
        if let Some(image) = &patch.image {
            self.image.clone_from(image);
        }
    }

    /// Consume the payload and return it with the patch applied.
    #[must_use]
    pub fn merged(mut self, patch: &PayloadPatch) -> Self {
        self.merge(patch);
        self
    }

    /// Whether neither text nor image is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.image.is_none()
    }
}

/// A partial payload sent with an update.
///
/// The outer `Option` tells whether the field was present in the request;
/// the inner one distinguishes a value from an explicit JSON `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadPatch {
    /// New text, if present
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub text: Option<Option<String>>,
    /// New image data URI, if present
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<Option<String>>,
}

/// Marks a field as present even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl PayloadPatch {
    /// A patch that sets the text.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(Some(text.into())),
            image: None,
        }
    }

    /// A patch that sets the image.
    #[must_use]
    pub fn image(data_uri: impl Into<String>) -> Self {
        Self {
            text: None,
            image: Some(Some(data_uri.into())),
        }
    }

    /// A patch that clears the text.
    #[must_use]
    pub fn clear_text() -> Self {
        Self {
            text: Some(None),
            image: None,
        }
    }

    /// A patch that removes the image.
    #[must_use]
    pub fn clear_image() -> Self {
        Self {
            text: None,
            image: Some(None),
        }
    }

    /// Parse a request body.
    ///
    /// The body must be a JSON object; `text` and `image` must be strings or
    /// `null` when present. Other fields are ignored.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| Error::InvalidPayload(format!("body is not valid JSON: {e}")))?;

        if !value.is_object() {
            return Err(Error::InvalidPayload("expected a JSON object".into()));
        }

        serde_json::from_value(value).map_err(|e| Error::InvalidPayload(e.to_string()))
    }

    /// Whether the patch carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.image.is_none()
    }

    /// Names of the fields carried by the patch.
    #[must_use]
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::with_capacity(2);
        if self.text.is_some() {
            fields.push("text");
        }
        if self.image.is_some() {
            fields.push("image");
        }
        fields
    }

    /// The new image data URI, if the patch sets one.
    #[must_use]
    pub fn image_uri(&self) -> Option<&str> {
        self.image.as_ref().and_then(Option::as_deref)
    }
}

/// Process-wide holder of the single shared payload.
///
/// The merge runs under the write lock, so concurrent updates never
/// interleave within a field.
#[derive(Debug, Default)]
pub struct SharedStore {
    payload: RwLock<SharedPayload>,
}

impl SharedStore {
    /// Create a store holding the default payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with a payload.
    #[must_use]
    pub fn with_payload(payload: SharedPayload) -> Self {
        Self {
            payload: RwLock::new(payload),
        }
    }

    /// Return a copy of the current payload.
    pub async fn read(&self) -> SharedPayload {
        self.payload.read().await.clone()
    }

    /// Merge a patch into the stored payload and return the result.
    pub async fn write(&self, partial: &PayloadPatch) -> SharedPayload {
        let mut payload = self.payload.write().await;
        payload.merge(partial);

        tracing::debug!(
            fields = ?partial.fields(),
            text_len = payload.text.len(),
            image_len = payload.image.as_ref().map_or(0, String::len),
            "Shared payload updated"
        );

        payload.clone()
    }
}
