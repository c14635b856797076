//! QR codes pointing at the Sharepad server.
//!
//! Phones on the same network scan the code printed by `sharepad serve`
//! (or shown by the web page) instead of typing an IP address.
//!
//! ## Example
//!
//! ```
//! use sharepad_core::qr;
//!
//! let ascii = qr::generate_ascii("http://192.168.1.20:8080").unwrap();
//! assert!(ascii.lines().count() > 5);
//! ```

use qrcode::render::{svg, unicode};
use qrcode::{EcLevel, QrCode};

use crate::error::{Error, Result};

fn encode(url: &str) -> Result<QrCode> {
    QrCode::with_error_correction_level(url, EcLevel::M)
        .map_err(|e| Error::Internal(format!("Failed to generate QR code: {e}")))
}

/// Render a QR code with Unicode half blocks for terminal display.
pub fn generate_ascii(url: &str) -> Result<String> {
    let rendered = encode(url)?
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build();

    Ok(rendered)
}

/// Render a QR code as an SVG document for the web page.
pub fn generate_svg(url: &str) -> Result<String> {
    let svg_string = encode(url)?
        .render::<svg::Color>()
        .min_dimensions(200, 200)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();

    Ok(svg_string)
}
