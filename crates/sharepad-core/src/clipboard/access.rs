//! The local system clipboard, through `arboard`.
//!
//! arboard deals in text and raw RGBA pixels while the shared payload carries
//! encoded images. Images are therefore encoded as PNG when read and decoded
//! back to pixels when written.

use std::borrow::Cow;

use arboard::{Clipboard, ImageData};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};

use crate::error::{Error, Result};

use super::ClipboardContent;

/// Media type of images taken from the clipboard.
pub const CLIPBOARD_IMAGE_MIME: &str = "image/png";

/// Reads and replaces clipboard content.
pub trait ClipboardAccess: Send {
    /// Current content, or `None` when there is neither text nor an image.
    ///
    /// Non-empty text is preferred over an image.
    fn read(&mut self) -> Result<Option<ClipboardContent>>;

    /// Replace the clipboard content.
    fn write(&mut self, content: &ClipboardContent) -> Result<()>;
}

/// The operating system clipboard.
pub struct NativeClipboard(Clipboard);

impl NativeClipboard {
    /// Open the system clipboard.
    pub fn new() -> Result<Self> {
        Clipboard::new()
            .map(Self)
            .map_err(|e| Error::ClipboardError(format!("cannot open clipboard: {e}")))
    }

    fn text(&mut self) -> Option<String> {
        match self.0.get_text() {
            Ok(text) if !text.is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("No clipboard text: {}", e);
                None
            }
        }
    }

    fn image(&mut self) -> Result<Option<ClipboardContent>> {
        let pixels = match self.0.get_image() {
            Ok(pixels) => pixels,
            Err(e) => {
                tracing::debug!("No clipboard image: {}", e);
                return Ok(None);
            }
        };

        let too_large = |_| Error::ClipboardError("clipboard image is too large".into());
        let width = u32::try_from(pixels.width).map_err(too_large)?;
        let height = u32::try_from(pixels.height).map_err(too_large)?;

        Ok(Some(ClipboardContent::Image {
            data: encode_png(&pixels.bytes, width, height)?,
            mime: CLIPBOARD_IMAGE_MIME.to_string(),
            width,
            height,
        }))
    }
}

impl std::fmt::Debug for NativeClipboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NativeClipboard")
    }
}

impl ClipboardAccess for NativeClipboard {
    fn read(&mut self) -> Result<Option<ClipboardContent>> {
        if let Some(text) = self.text() {
            tracing::trace!(bytes = text.len(), "Read text from clipboard");
            return Ok(Some(ClipboardContent::Text(text)));
        }

        let image = self.image()?;
        if let Some(content) = &image {
            tracing::trace!("Read {} from clipboard", content.preview(0));
        }
        Ok(image)
    }

    fn write(&mut self, content: &ClipboardContent) -> Result<()> {
        let result = match content {
            ClipboardContent::Text(text) => self.0.set_text(text.as_str()),
            ClipboardContent::Image { data, mime, .. } => {
                self.0.set_image(decode_to_pixels(data, mime)?)
            }
        };
        result.map_err(|e| Error::ClipboardError(format!("cannot write clipboard: {e}")))
    }
}

/// Open the system clipboard behind the access trait.
pub fn create_clipboard() -> Result<Box<dyn ClipboardAccess>> {
    Ok(Box::new(NativeClipboard::new()?))
}

/// Encode tightly packed RGBA pixels as PNG.
fn encode_png(rgba: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let expected = u64::from(width) * u64::from(height) * 4;
    if rgba.len() as u64 != expected {
        return Err(Error::ClipboardError(format!(
            "clipboard image has {} bytes, expected {expected} for {width}x{height}",
            rgba.len()
        )));
    }

    let mut png = Vec::new();
    PngEncoder::new_with_quality(&mut png, CompressionType::Fast, FilterType::Adaptive)
        .write_image(rgba, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| Error::ClipboardError(format!("cannot encode PNG: {e}")))?;
    Ok(png)
}

/// Decode an encoded image into pixels arboard can hold.
fn decode_to_pixels(data: &[u8], mime: &str) -> Result<ImageData<'static>> {
    let rgba = image::load_from_memory(data)
        .map_err(|e| Error::InvalidImage(format!("cannot decode {mime}: {e}")))?
        .into_rgba8();

    Ok(ImageData {
        width: rgba.width() as usize,
        height: rgba.height() as usize,
        bytes: Cow::Owned(rgba.into_raw()),
    })
}
