//! Per-process upload bookkeeping.

use dashmap::DashMap;
use std::collections::HashSet;

/// In-memory upload lists and soft deletions, keyed by session.
///
/// Lives as long as the server process and is never persisted. The
/// filesystem and Cloudinary stay the source of truth for stored files;
/// this only remembers uploads that exist nowhere else (data-URL fallbacks,
/// remote URLs) and which URLs the editor has thrown away.
#[derive(Debug, Default)]
pub struct RelayStore {
    uploads: DashMap<String, Vec<String>>,
    deleted: DashMap<String, HashSet<String>>,
}

impl RelayStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember an upload for a session.
    pub fn add_upload(&self, session: &str, url: impl Into<String>) {
        self.uploads.entry(session.to_string()).or_default().push(url.into());
    }

    /// Uploads remembered for a session, oldest first.
    pub fn uploads(&self, session: &str) -> Vec<String> {
        self.uploads
            .get(session)
            .map(|list| list.value().clone())
            .unwrap_or_default()
    }

    /// Soft-delete a URL. Returns false if it was already deleted.
    pub fn mark_deleted(&self, session: &str, url: impl Into<String>) -> bool {
        self.deleted.entry(session.to_string()).or_default().insert(url.into())
    }

    pub fn is_deleted(&self, session: &str, url: &str) -> bool {
        self.deleted
            .get(session)
            .is_some_and(|set| set.contains(url))
    }

    /// Merge URL sources in order, dropping duplicates and deleted URLs.
    pub fn visible<I>(&self, session: &str, sources: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        let deleted = self.deleted.get(session);
        let mut seen = HashSet::new();
        sources
            .into_iter()
            .filter(|url| !deleted.as_ref().is_some_and(|set| set.contains(url)))
            .filter(|url| seen.insert(url.clone()))
            .collect()
    }
}
