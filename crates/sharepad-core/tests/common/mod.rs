//! Common test utilities for Sharepad integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;

use image::ImageEncoder;
use sharepad_core::clipboard::{ClipboardAccess, ClipboardContent};
use sharepad_core::web::{WebServer, WebServerConfig};
use sharepad_core::Result;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A server running on an ephemeral localhost port.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server with the given configuration.
    pub async fn start(config: WebServerConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");

        let (tx, rx) = oneshot::channel();
        let server = WebServer::new(config);
        let handle = tokio::spawn(async move {
            server
                .serve(listener, async move {
                    let _ = rx.await;
                })
                .await
                .expect("Server failed");
        });

        Self {
            addr,
            shutdown: Some(tx),
            handle,
        }
    }

    /// Start a server with the default configuration.
    pub async fn start_default() -> Self {
        Self::start(WebServerConfig::default()).await
    }

    /// Base URL of the server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Shut the server down and wait for it to exit.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.handle).await;
    }
}

/// Encode a solid-color RGBA image as PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let pixels = [0u8, 128, 255, 255].repeat((width * height) as usize);
    let mut png = Vec::new();
    image::codecs::png::PngEncoder::new(&mut png)
        .write_image(&pixels, width, height, image::ExtendedColorType::Rgba8)
        .expect("Failed to encode PNG");
    png
}

/// Write a file into a directory.
pub fn create_test_file(dir: &std::path::Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// In-memory clipboard.
#[derive(Debug, Default)]
pub struct MockClipboard {
    pub content: Option<ClipboardContent>,
}

impl MockClipboard {
    pub fn with(content: ClipboardContent) -> Self {
        Self {
            content: Some(content),
        }
    }
}

impl ClipboardAccess for MockClipboard {
    fn read(&mut self) -> Result<Option<ClipboardContent>> {
        Ok(self.content.clone())
    }

    fn write(&mut self, content: &ClipboardContent) -> Result<()> {
        self.content = Some(content.clone());
        Ok(())
    }
}
