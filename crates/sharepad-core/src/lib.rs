//! # Sharepad Core Library
//!
//! `sharepad-core` provides the core functionality for Sharepad, a single
//! shared text/image pad that every device on the local network can read and
//! write through a small HTTP API.
//!
//! ## Features
//!
//! - **One shared payload**: text plus an optional data-URI image, held in memory
//! - **Merge writes**: an update only overwrites the fields it carries
//! - **Polling clients**: browsers and terminals re-fetch on a fixed interval
//! - **Zero setup**: the server embeds its own web page
//!
//! ## Modules
//!
//! - [`store`] - Shared payload model and the locked in-memory store
//! - [`web`] - HTTP sync endpoint and embedded web page
//! - [`client`] - HTTP client and the polling view
//! - [`datauri`] - Data-URI encoding and image size checks
//! - [`clipboard`] - System clipboard access
//! - [`config`] - Configuration management
//! - [`qr`] - QR codes for the server URL
//!
//! ## Example
//!
//! ```rust,ignore
//! use sharepad_core::client::{SyncClient, SyncView, ViewConfig};
//!
//! let client = SyncClient::new("http://192.168.1.20:8080", Duration::from_secs(10))?;
//! let (view, mut events) = SyncView::mount(client, ViewConfig::default()).await;
//! view.set_text("hello from the laptop").await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::unused_async)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

pub mod clipboard;
pub mod config;
pub mod datauri;
pub mod error;
pub mod qr;
pub mod store;

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "web")]
pub mod web;

pub use error::{Error, Result};
pub use store::{PayloadPatch, SharedPayload, SharedStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default HTTP port for the sync server
pub const DEFAULT_PORT: u16 = 8080;

/// Default interval between client polls (milliseconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;

/// Default timeout for a single client request (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default transport-level body limit for the sync endpoint (16 MB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Path of the sync endpoint used by the web page and the CLI client
pub const SYNC_PATH: &str = "/api/text";

/// Alternate path of the sync endpoint
pub const SYNC_ALIAS_PATH: &str = "/sync";

/// Format a byte count for display.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
