//! Polling client view.
//!
//! A [`SyncView`] is what the web page does, as a Rust value: fetch once on
//! mount, re-fetch on a fixed interval, overwrite the local display with
//! whatever the server returns, and push local edits as partial updates.
//!
//! Local edits are optimistic. They show up in [`SyncView::display`] right
//! away and are never rolled back; a failed save only produces a
//! [`Notice::Failed`] event. The next poll shows the server's state.
//!
//! ```rust,ignore
//! let client = SyncClient::new("http://192.168.1.20:8080", Duration::from_secs(10))?;
//! let (view, mut events) = SyncView::mount(client, ViewConfig::default()).await;
//!
//! view.set_text("hello").await?;
//! while let Some(event) = events.recv().await {
//!     if let ViewEvent::Refreshed(state) = event {
//!         println!("{}", state.text);
//!     }
//! }
//! ```

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::clipboard::{ClipboardAccess, ClipboardContent};
use crate::config::Config;
pub use crate::config::DisplayMode;
use crate::datauri::{check_image_size, encode_data_uri, mime_for_path, DEFAULT_MAX_IMAGE_BYTES};
use crate::error::{Error, Result};
use crate::store::{PayloadPatch, SharedPayload};

use super::SyncClient;

/// What a view currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayState {
    /// Local display mode
    pub mode: DisplayMode,
    /// Shared text as last seen or edited
    pub text: String,
    /// Shared image as last seen or edited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl DisplayState {
    fn apply(&mut self, payload: SharedPayload) {
        self.text = payload.text;
        self.image = payload.image;
    }
}

/// Settings for a [`SyncView`].
#[derive(Debug, Clone)]
pub struct ViewConfig {
    /// Time between polls
    pub poll_interval: Duration,
    /// Largest image accepted for upload
    pub max_image_bytes: u64,
    /// Mode shown after mount
    pub initial_mode: DisplayMode,
    /// Capacity of the event channel
    pub event_capacity: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(crate::DEFAULT_POLL_INTERVAL_MS),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            initial_mode: DisplayMode::default(),
            event_capacity: 32,
        }
    }
}

impl From<&Config> for ViewConfig {
    fn from(config: &Config) -> Self {
        Self {
            poll_interval: config.client.poll_interval,
            max_image_bytes: config.client.max_image_bytes,
            initial_mode: config.ui.default_mode,
            ..Self::default()
        }
    }
}

/// Transient message about a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The update was accepted
    Saved,
    /// The update or its local validation failed
    Failed(String),
}

/// Events emitted by a mounted view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// A fetch was applied to the display
    Refreshed(DisplayState),
    /// A fetch failed; the display was left as it was
    FetchFailed(String),
    /// Result of a local edit
    Notice(Notice),
}

/// Counts one in-flight update until dropped.
struct SavingGuard<'a>(&'a AtomicUsize);

impl<'a> SavingGuard<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

struct ViewInner {
    client: SyncClient,
    config: ViewConfig,
    display: RwLock<DisplayState>,
    saving: AtomicUsize,
    events: mpsc::Sender<ViewEvent>,
    cancel_token: CancellationToken,
}

impl ViewInner {
    fn emit(&self, event: ViewEvent) {
        if let Err(e) = self.events.try_send(event) {
            tracing::trace!("Dropping view event: {}", e);
        }
    }

    async fn refresh(&self) {
        let result = self.client.fetch().await;

        if self.cancel_token.is_cancelled() {
            tracing::debug!("Dropping fetch response after teardown");
            return;
        }

        match result {
            Ok(payload) => {
                let snapshot = {
                    let mut display = self.display.write().await;
                    display.apply(payload);
                    display.clone()
                };
                self.emit(ViewEvent::Refreshed(snapshot));
            }
            Err(e) => {
                tracing::warn!("Fetch failed: {}", e);
                self.emit(ViewEvent::FetchFailed(e.to_string()));
            }
        }
    }

    async fn poll(self: Arc<Self>) {
        let period = self.config.poll_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => break,
                _ = ticker.tick() => {}
            }
            self.refresh().await;
        }

        tracing::debug!("Poller stopped");
    }

    async fn save(&self, patch: &PayloadPatch) -> Result<()> {
        let result = {
            let _saving = SavingGuard::start(&self.saving);
            self.client.update(patch).await
        };

        if self.cancel_token.is_cancelled() {
            tracing::debug!("Dropping update response after teardown");
            return result.map(|_| ());
        }

        match result {
            Ok(_) => {
                tracing::debug!(fields = ?patch.fields(), "Update saved");
                self.emit(ViewEvent::Notice(Notice::Saved));
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to save: {}", e);
                self.fail(e)
            }
        }
    }

    fn fail(&self, err: Error) -> Result<()> {
        self.emit(ViewEvent::Notice(Notice::Failed(err.to_string())));
        Err(err)
    }

    fn ensure_mounted(&self) -> Result<()> {
        if self.cancel_token.is_cancelled() {
            return Err(Error::Internal("view has been torn down".into()));
        }
        Ok(())
    }
}

/// A mounted, polling view of the shared payload.
///
/// Dropping the view tears it down.
pub struct SyncView {
    inner: Arc<ViewInner>,
    poll_task: JoinHandle<()>,
}

impl SyncView {
    /// Fetch once, then start polling in the background.
    ///
    /// Must be called inside a Tokio runtime. A failed first fetch leaves the
    /// display empty and is reported like any other failed fetch. A zero poll
    /// interval falls back to the default.
    pub async fn mount(
        client: SyncClient,
        mut config: ViewConfig,
    ) -> (Self, mpsc::Receiver<ViewEvent>) {
        if config.poll_interval.is_zero() {
            tracing::warn!("Poll interval must be greater than zero, using the default");
            config.poll_interval = ViewConfig::default().poll_interval;
        }
        let (events, rx) = mpsc::channel(config.event_capacity.max(1));

        let inner = Arc::new(ViewInner {
            client,
            display: RwLock::new(DisplayState {
                mode: config.initial_mode,
                ..DisplayState::default()
            }),
            config,
            saving: AtomicUsize::new(0),
            events,
            cancel_token: CancellationToken::new(),
        });

        tracing::debug!(
            server = inner.client.base_url(),
            interval = ?inner.config.poll_interval,
            "Mounting view"
        );

        inner.refresh().await;
        let poll_task = tokio::spawn(Arc::clone(&inner).poll());

        (Self { inner, poll_task }, rx)
    }

    /// Stop polling. Responses still in flight are discarded on arrival.
    pub fn teardown(&self) {
        self.inner.cancel_token.cancel();
    }

    /// Whether the view has been torn down.
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.inner.cancel_token.is_cancelled()
    }

    /// Whether the poll loop has exited.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.poll_task.is_finished()
    }

    /// Snapshot of the current display.
    pub async fn display(&self) -> DisplayState {
        self.inner.display.read().await.clone()
    }

    /// Whether an update is in flight.
    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.inner.saving.load(Ordering::SeqCst) > 0
    }

    /// Replace the text and send it.
    pub async fn set_text(&self, text: impl Into<String>) -> Result<()> {
        self.inner.ensure_mounted()?;
        let text = text.into();

        self.inner.display.write().await.text.clone_from(&text);
        self.inner.save(&PayloadPatch::text(text)).await
    }

    /// Share whatever the local clipboard holds.
    pub async fn paste_from_clipboard(&self, clipboard: &mut dyn ClipboardAccess) -> Result<()> {
        self.inner.ensure_mounted()?;

        let content = match clipboard.read() {
            Ok(Some(content)) => content,
            Ok(None) => return self.inner.fail(Error::ClipboardEmpty),
            Err(e) => return self.inner.fail(e),
        };

        match content {
            ClipboardContent::Text(text) => self.set_text(text).await,
            ClipboardContent::Image { data, mime, .. } => {
                self.upload_image_bytes(&data, &mime).await
            }
        }
    }

    /// Read an image file and share it.
    ///
    /// The size is checked before the file is read.
    pub async fn upload_image(&self, path: &Path) -> Result<()> {
        self.inner.ensure_mounted()?;

        let size = match tokio::fs::metadata(path).await {
            Ok(meta) => meta.len(),
            Err(e) => return self.inner.fail(e.into()),
        };
        if let Err(e) = check_image_size(size, self.inner.config.max_image_bytes) {
            return self.inner.fail(e);
        }

        let data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(e) => return self.inner.fail(e.into()),
        };

        self.upload_image_bytes(&data, &mime_for_path(path)).await
    }

    /// Share encoded image bytes of the given media type.
    pub async fn upload_image_bytes(&self, data: &[u8], mime: &str) -> Result<()> {
        self.inner.ensure_mounted()?;

        if !mime.to_ascii_lowercase().starts_with("image/") {
            return self
                .inner
                .fail(Error::InvalidImage(format!("'{mime}' is not an image type")));
        }
        if let Err(e) = check_image_size(data.len() as u64, self.inner.config.max_image_bytes) {
            return self.inner.fail(e);
        }

        let uri = encode_data_uri(data, mime);
        self.inner.display.write().await.image = Some(uri.clone());
        self.inner.save(&PayloadPatch::image(uri)).await
    }

    /// Remove the shared image.
    pub async fn clear_image(&self) -> Result<()> {
        self.inner.ensure_mounted()?;

        self.inner.display.write().await.image = None;
        self.inner.save(&PayloadPatch::clear_image()).await
    }

    /// Switch between text and image mode. Local only.
    pub async fn toggle_mode(&self) -> DisplayMode {
        let mut display = self.inner.display.write().await;
        display.mode = display.mode.toggled();
        display.mode
    }

    /// Set the display mode. Local only.
    pub async fn set_mode(&self, mode: DisplayMode) {
        self.inner.display.write().await.mode = mode;
    }
}

impl Drop for SyncView {
    fn drop(&mut self) {
        self.inner.cancel_token.cancel();
    }
}

impl std::fmt::Debug for SyncView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncView")
            .field("server", &self.inner.client.base_url())
            .field("config", &self.inner.config)
            .field("torn_down", &self.is_torn_down())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_client() -> SyncClient {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        SyncClient::new(&format!("http://{addr}"), Duration::from_millis(500)).unwrap()
    }

    fn quiet_config() -> ViewConfig {
        ViewConfig {
            poll_interval: Duration::from_secs(3600),
            max_image_bytes: 8,
            ..ViewConfig::default()
        }
    }

    #[test]
    fn test_view_config_defaults() {
        let config = ViewConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(5000));
        assert_eq!(config.max_image_bytes, 5 * 1024 * 1024);
        assert_eq!(config.initial_mode, DisplayMode::Text);
    }

    #[test]
    fn test_view_config_from_config() {
        let mut config = Config::default();
        config.client.poll_interval = Duration::from_secs(1);
        config.ui.default_mode = DisplayMode::Image;

        let view_config = ViewConfig::from(&config);
        assert_eq!(view_config.poll_interval, Duration::from_secs(1));
        assert_eq!(view_config.initial_mode, DisplayMode::Image);
    }

    #[test]
    fn test_display_state_serializes_mode() {
        let state = DisplayState {
            mode: DisplayMode::Image,
            text: "t".into(),
            image: None,
        };
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"mode":"image","text":"t"}"#);
    }

    #[tokio::test]
    async fn test_failed_mount_fetch_keeps_empty_display() {
        let (view, mut events) = SyncView::mount(unreachable_client(), quiet_config()).await;

        assert!(matches!(events.recv().await, Some(ViewEvent::FetchFailed(_))));
        assert_eq!(view.display().await, DisplayState::default());
    }

    #[tokio::test]
    async fn test_oversized_image_rejected_before_network() {
        let (view, mut events) = SyncView::mount(unreachable_client(), quiet_config()).await;
        let _ = events.recv().await;

        let err = view
            .upload_image_bytes(&[0u8; 9], "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ImageTooLarge { size: 9, limit: 8 }));
        assert!(view.display().await.image.is_none());
        assert!(matches!(
            events.recv().await,
            Some(ViewEvent::Notice(Notice::Failed(_)))
        ));
    }

    #[tokio::test]
    async fn test_non_image_rejected() {
        let (view, _events) = SyncView::mount(unreachable_client(), quiet_config()).await;
        let err = view
            .upload_image_bytes(b"%PDF", "application/pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_optimistic_text() {
        let (view, _events) = SyncView::mount(unreachable_client(), quiet_config()).await;

        assert!(view.set_text("local").await.is_err());
        assert_eq!(view.display().await.text, "local");
        assert!(!view.is_saving());
    }

    #[tokio::test]
    async fn test_zero_interval_falls_back_to_default() {
        let config = ViewConfig {
            poll_interval: Duration::ZERO,
            ..quiet_config()
        };
        let (view, _events) = SyncView::mount(unreachable_client(), config).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!view.is_stopped());
        assert_eq!(
            view.inner.config.poll_interval,
            Duration::from_millis(crate::DEFAULT_POLL_INTERVAL_MS)
        );
        view.teardown();
    }

    #[tokio::test]
    async fn test_abandoned_save_clears_saving() {
        // Accepts connections into the backlog but never answers.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let client = SyncClient::new(&url, Duration::from_millis(300)).unwrap();

        let (view, _events) = SyncView::mount(client, quiet_config()).await;
        assert!(!view.is_saving());

        let abandoned =
            tokio::time::timeout(Duration::from_millis(100), view.set_text("stuck")).await;
        assert!(abandoned.is_err());
        assert!(!view.is_saving());
        assert_eq!(view.display().await.text, "stuck");

        view.teardown();
        drop(listener);
    }

    #[tokio::test]
    async fn test_toggle_mode_is_local() {
        let (view, _events) = SyncView::mount(unreachable_client(), quiet_config()).await;

        assert_eq!(view.toggle_mode().await, DisplayMode::Image);
        assert_eq!(view.toggle_mode().await, DisplayMode::Text);
        view.set_mode(DisplayMode::Image).await;
        assert_eq!(view.display().await.mode, DisplayMode::Image);
    }

    #[tokio::test]
    async fn test_teardown_stops_poller_and_actions() {
        let (view, _events) = SyncView::mount(unreachable_client(), quiet_config()).await;

        view.teardown();
        assert!(view.is_torn_down());
        tokio::time::timeout(Duration::from_secs(1), async {
            while !view.is_stopped() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        assert!(view.set_text("late").await.is_err());
        assert_eq!(view.display().await.text, "");
    }
}
