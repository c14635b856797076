//! Data URIs for the shared image.
//!
//! Images travel inside the payload as `data:<mime>;base64,<bytes>` strings,
//! exactly what a browser's `FileReader.readAsDataURL` produces. This module
//! parses, builds and size-checks them.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{Error, Result};

/// Default client-side limit for an uploaded image (5 MB).
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Media type assumed when a data URI omits one.
const DEFAULT_MIME: &str = "text/plain";

/// A parsed data URI borrowing from the original string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUri<'a> {
    mime: &'a str,
    base64: bool,
    data: &'a str,
}

impl<'a> DataUri<'a> {
    /// Parse a `data:` URI.
    pub fn parse(uri: &'a str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| Error::InvalidDataUri("missing 'data:' scheme".into()))?;

        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| Error::InvalidDataUri("missing ',' before payload".into()))?;

        let mut params = header.split(';');
        let mime = params.next().unwrap_or_default().trim();
        let base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

        let mime = if mime.is_empty() { DEFAULT_MIME } else { mime };
        if !mime.contains('/') {
            return Err(Error::InvalidDataUri(format!("bad media type '{mime}'")));
        }

        Ok(Self { mime, base64, data })
    }

    /// Media type, e.g. `image/png`.
    #[must_use]
    pub fn mime(&self) -> &'a str {
        self.mime
    }

    /// Whether the payload is base64-encoded.
    #[must_use]
    pub fn is_base64(&self) -> bool {
        self.base64
    }

    /// Whether the media type is an image type.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.mime
            .get(..6)
            .is_some_and(|p| p.eq_ignore_ascii_case("image/"))
    }

    /// Size of the decoded payload, computed without decoding.
    #[must_use]
    pub fn decoded_len(&self) -> u64 {
        if self.base64 {
            let trimmed = self.data.trim_end();
            let padding = trimmed.bytes().rev().take_while(|&b| b == b'=').count();
            let len = trimmed.len() as u64;
            (len * 3 / 4).saturating_sub(padding as u64)
        } else {
            // Malformed escapes are kept literally, so only count valid ones.
            let escapes = self
                .data
                .as_bytes()
                .windows(3)
                .filter(|w| w[0] == b'%' && w[1].is_ascii_hexdigit() && w[2].is_ascii_hexdigit())
                .count() as u64;
            (self.data.len() as u64).saturating_sub(escapes * 2)
        }
    }

    /// Decode the payload into raw bytes.
    ///
    /// Percent-encoded payloads keep malformed escapes as literal text, the
    /// way browsers read them.
    pub fn decode(&self) -> Result<Vec<u8>> {
        if self.base64 {
            STANDARD
                .decode(self.data.trim())
                .map_err(|e| Error::InvalidDataUri(format!("bad base64 payload: {e}")))
        } else {
            Ok(urlencoding::decode_binary(self.data.as_bytes()).into_owned())
        }
    }
}

/// Build a base64 data URI from raw bytes.
#[must_use]
pub fn encode_data_uri(bytes: &[u8], mime: &str) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Guess the media type of a file from its extension.
#[must_use]
pub fn mime_for_path(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Reject images larger than `limit` bytes.
pub fn check_image_size(len: u64, limit: u64) -> Result<()> {
    if len > limit {
        return Err(Error::ImageTooLarge { size: len, limit });
    }
    Ok(())
}

/// File extension to use when saving an image of the given type.
#[must_use]
pub fn file_extension_for_mime(mime: &str) -> &'static str {
    match mime.to_ascii_lowercase().as_str() {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/bmp" => "bmp",
        _ => "bin",
    }
}
