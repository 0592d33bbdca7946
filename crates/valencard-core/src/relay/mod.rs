//! Phone-to-desktop upload relay, editor side.
//!
//! A second device uploads pictures into a session; the editor polls the
//! session's file list and merges new URLs into the card. The feed itself is
//! a trait so the transport (HTTP, in-memory) stays outside the core.

mod memory;
mod poller;

pub use memory::MemoryFeed;
pub use poller::{DEFAULT_POLL_INTERVAL_SECS, UploadPoller};

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use uuid::Uuid;

/// Errors while talking to the relay.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Relay request failed: {0}")]
    Transport(String),
    #[error("Invalid relay response: {0}")]
    Decode(String),
    #[error("Relay error: {0}")]
    Other(String),
}

/// Result type for relay operations.
pub type FeedResult<T> = Result<T, FeedError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Source of uploaded image URLs for a session.
#[cfg(not(target_arch = "wasm32"))]
pub trait UploadFeed: Send + Sync {
    /// All live image URLs of a session.
    fn fetch(&self, session: &str) -> BoxFuture<'_, FeedResult<Vec<String>>>;

    /// Soft-delete a URL so later fetches no longer report it.
    fn mark_deleted(&self, session: &str, url: &str) -> BoxFuture<'_, FeedResult<()>>;
}

/// Source of uploaded image URLs for a session (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait UploadFeed {
    fn fetch(&self, session: &str) -> BoxFuture<'_, FeedResult<Vec<String>>>;

    fn mark_deleted(&self, session: &str, url: &str) -> BoxFuture<'_, FeedResult<()>>;
}

/// Generate an opaque session id.
pub fn create_upload_session() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Page the phone opens to upload into `session`.
pub fn upload_page_url(origin: &str, session: &str) -> String {
    format!("{}/upload/{}", origin.trim_end_matches('/'), session)
}

#[cfg(test)]
pub(crate) fn block_on<F: std::future::Future>(f: F) -> F::Output {
    // Simple blocking executor for tests
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_are_unique() {
        let a = create_upload_session();
        assert_eq!(a.len(), 32);
        assert_ne!(a, create_upload_session());
    }

    #[test]
    fn test_upload_page_url() {
        assert_eq!(
            upload_page_url("https://cards.example/", "abc"),
            "https://cards.example/upload/abc"
        );
    }
}
