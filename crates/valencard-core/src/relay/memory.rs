//! In-memory upload feed.

use super::{BoxFuture, FeedError, FeedResult, UploadFeed};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

/// In-memory feed for tests and offline sessions.
#[derive(Default)]
pub struct MemoryFeed {
    uploads: RwLock<HashMap<String, Vec<String>>>,
    deleted: RwLock<HashMap<String, HashSet<String>>>,
    fail: RwLock<bool>,
}

impl MemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an upload, as the phone would.
    pub fn push(&self, session: &str, url: &str) {
        if let Ok(mut uploads) = self.uploads.write() {
            uploads.entry(session.to_string()).or_default().push(url.to_string());
        }
    }

    /// Make every following call fail with a transport error.
    pub fn set_failing(&self, failing: bool) {
        if let Ok(mut fail) = self.fail.write() {
            *fail = failing;
        }
    }

    fn check_available(&self) -> FeedResult<()> {
        let failing = self
            .fail
            .read()
            .map_err(|e| FeedError::Other(format!("Lock error: {}", e)))?;
        if *failing {
            return Err(FeedError::Transport("relay unavailable".to_string()));
        }
        Ok(())
    }
}

impl UploadFeed for MemoryFeed {
    fn fetch(&self, session: &str) -> BoxFuture<'_, FeedResult<Vec<String>>> {
        let session = session.to_string();
        Box::pin(async move {
            self.check_available()?;
            let uploads = self
                .uploads
                .read()
                .map_err(|e| FeedError::Other(format!("Lock error: {}", e)))?;
            let deleted = self
                .deleted
                .read()
                .map_err(|e| FeedError::Other(format!("Lock error: {}", e)))?;
            let gone = deleted.get(&session);
            Ok(uploads
                .get(&session)
                .map(|urls| {
                    urls.iter()
                        .filter(|u| !gone.is_some_and(|g| g.contains(*u)))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default())
        })
    }

    fn mark_deleted(&self, session: &str, url: &str) -> BoxFuture<'_, FeedResult<()>> {
        let session = session.to_string();
        let url = url.to_string();
        Box::pin(async move {
            self.check_available()?;
            let mut deleted = self
                .deleted
                .write()
                .map_err(|e| FeedError::Other(format!("Lock error: {}", e)))?;
            deleted.entry(session).or_default().insert(url);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::block_on;

    #[test]
    fn test_fetch_unknown_session_is_empty() {
        let feed = MemoryFeed::new();
        assert!(block_on(feed.fetch("nope")).unwrap().is_empty());
    }

    #[test]
    fn test_deleted_urls_are_hidden() {
        let feed = MemoryFeed::new();
        feed.push("s", "/uploads/s/1-a.png");
        feed.push("s", "/uploads/s/2-b.png");
        block_on(feed.mark_deleted("s", "/uploads/s/1-a.png")).unwrap();
        assert_eq!(block_on(feed.fetch("s")).unwrap(), vec!["/uploads/s/2-b.png".to_string()]);
    }

    #[test]
    fn test_failing_feed() {
        let feed = MemoryFeed::new();
        feed.set_failing(true);
        assert!(matches!(block_on(feed.fetch("s")), Err(FeedError::Transport(_))));
    }
}
