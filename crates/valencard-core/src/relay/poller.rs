//! Periodic merge of relay uploads into the editor.
//!
//! The poller owns no timer. The host calls [`UploadPoller::maybe_poll`]
//! from its event loop; the poller decides whether the interval elapsed.

use super::{FeedResult, UploadFeed};
use crate::editor::Editor;
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Default poll interval in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

/// Polls one upload session while running.
pub struct UploadPoller<F: UploadFeed> {
    feed: Arc<F>,
    session: String,
    interval: Duration,
    last_poll: Option<Instant>,
    running: bool,
}

impl<F: UploadFeed> UploadPoller<F> {
    /// Create a stopped poller for `session`.
    pub fn new(feed: Arc<F>, session: impl Into<String>) -> Self {
        Self {
            feed,
            session: session.into(),
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            last_poll: None,
            running: false,
        }
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    /// Start polling; the first poll is due immediately.
    pub fn start(&mut self) {
        self.running = true;
        self.last_poll = None;
        log::debug!("Upload poller started for session {}", self.session);
    }

    /// Stop polling. Call on session teardown.
    pub fn stop(&mut self) {
        if self.running {
            log::debug!("Upload poller stopped for session {}", self.session);
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Check if a poll is due.
    pub fn should_poll(&self) -> bool {
        if !self.running {
            return false;
        }
        match self.last_poll {
            Some(last) => last.elapsed() >= self.interval,
            None => true,
        }
    }

    /// Poll if due. Returns how many images were added.
    pub async fn maybe_poll(&mut self, editor: &mut Editor) -> usize {
        if !self.should_poll() {
            return 0;
        }
        self.poll_once(editor).await
    }

    /// Fetch the session and merge new URLs.
    ///
    /// Feed errors are logged and count as "nothing new".
    pub async fn poll_once(&mut self, editor: &mut Editor) -> usize {
        self.last_poll = Some(Instant::now());
        match self.feed.fetch(&self.session).await {
            Ok(urls) => editor.merge_remote_uploads(&urls),
            Err(e) => {
                log::warn!("Upload poll for session {} failed: {}", self.session, e);
                0
            }
        }
    }

    /// Forward upload deletions from the editor to the relay.
    ///
    /// Returns how many were acknowledged. Failed deletes stay queued in the
    /// editor, so the next flush retries them.
    pub async fn flush_deletes(&self, editor: &mut Editor) -> usize {
        let mut flushed = 0;
        let mut failed = Vec::new();
        for url in editor.take_pending_upload_deletes() {
            let result: FeedResult<()> = self.feed.mark_deleted(&self.session, &url).await;
            match result {
                Ok(()) => flushed += 1,
                Err(e) => {
                    log::warn!("Failed to delete upload {}: {}", url, e);
                    failed.push(url);
                }
            }
        }
        editor.requeue_upload_deletes(failed);
        flushed
    }
}
