//! UI utilities for the Sharepad CLI.

use sharepad_core::datauri::DataUri;

const BOX_WIDTH: usize = 41;

/// A formatted box listing the URLs the server is reachable at.
pub struct UrlBox<'a> {
    urls: &'a [String],
}

impl<'a> UrlBox<'a> {
    /// Create a new URL box.
    #[must_use]
    pub const fn new(urls: &'a [String]) -> Self {
        Self { urls }
    }

    /// Display the box to stdout.
    pub fn display(&self) {
        println!("  ┌{}┐", "─".repeat(BOX_WIDTH));
        println!("  │{}│", " ".repeat(BOX_WIDTH));
        for url in self.urls {
            println!("  │{}│", center_in_box(url, BOX_WIDTH));
        }
        println!("  │{}│", " ".repeat(BOX_WIDTH));
        println!("  └{}┘", "─".repeat(BOX_WIDTH));
    }
}

fn center_in_box(content: &str, width: usize) -> String {
    let content_len = content.chars().count();
    let padding = width.saturating_sub(content_len);
    let left = padding / 2;
    let right = padding - left;
    format!("{}{}{}", " ".repeat(left), content, " ".repeat(right))
}

/// Print a QR code indented to line up with the URL box.
pub fn print_qr(url: &str) {
    match sharepad_core::qr::generate_ascii(url) {
        Ok(qr) => {
            for line in qr.lines() {
                println!("  {}", line);
            }
        }
        Err(e) => tracing::debug!("Skipping QR code: {}", e),
    }
}

/// One-line description of a shared image.
pub fn describe_image(uri: &str) -> String {
    match DataUri::parse(uri) {
        Ok(parsed) => format!(
            "{} image, {}",
            parsed.mime(),
            sharepad_core::format_size(parsed.decoded_len())
        ),
        Err(_) => format!("unrecognized image ({} chars)", uri.len()),
    }
}
