//! HTTP client side of the upload relay.

use serde::{Deserialize, Serialize};
use serde_json::json;
use valencard_core::relay::{BoxFuture, FeedError, FeedResult, UploadFeed};

/// Body of `GET /api/uploads/{session}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilesResponse {
    #[serde(default)]
    pub files: Vec<String>,
}

/// [`UploadFeed`] backed by a running relay server.
#[derive(Debug, Clone)]
pub struct HttpUploadFeed {
    http: reqwest::Client,
    origin: String,
}

impl HttpUploadFeed {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            origin: origin.into().trim_end_matches('/').to_string(),
        }
    }

    fn session_url(&self, session: &str) -> String {
        format!("{}/api/uploads/{}", self.origin, session)
    }
}

fn transport(e: reqwest::Error) -> FeedError {
    FeedError::Transport(e.to_string())
}

fn status_error(status: reqwest::StatusCode) -> FeedError {
    FeedError::Transport(format!("HTTP {}", status.as_u16()))
}

impl UploadFeed for HttpUploadFeed {
    fn fetch(&self, session: &str) -> BoxFuture<'_, FeedResult<Vec<String>>> {
        let url = self.session_url(session);
        Box::pin(async move {
            let response = self.http.get(url).send().await.map_err(transport)?;
            if !response.status().is_success() {
                return Err(status_error(response.status()));
            }
            let body: FilesResponse = response
                .json()
                .await
                .map_err(|e| FeedError::Decode(e.to_string()))?;
            Ok(body.files)
        })
    }

    fn mark_deleted(&self, session: &str, url: &str) -> BoxFuture<'_, FeedResult<()>> {
        let endpoint = self.session_url(session);
        let body = json!({ "url": url });
        Box::pin(async move {
            let response = self
                .http
                .delete(endpoint)
                .json(&body)
                .send()
                .await
                .map_err(transport)?;
            if !response.status().is_success() {
                return Err(status_error(response.status()));
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AppState, ServerConfig, build_router};
    use std::sync::Arc;
    use valencard_core::{Editor, ElementKind, UploadPoller};

    async fn spawn_server(public_dir: &std::path::Path) -> (String, Arc<AppState>) {
        let config = ServerConfig {
            public_dir: public_dir.to_path_buf(),
            ..ServerConfig::default()
        };
        let state = Arc::new(AppState::from_config(config));
        let app = build_router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), state)
    }

    #[tokio::test]
    async fn test_fetch_and_delete_through_server() {
        let dir = tempfile::tempdir().unwrap();
        let (origin, state) = spawn_server(dir.path()).await;
        state.store.add_upload("s1", "https://cdn.example/a.png");
        state.store.add_upload("s1", "https://cdn.example/b.png");

        let feed = HttpUploadFeed::new(format!("{}/", origin));
        let files = feed.fetch("s1").await.unwrap();
        assert_eq!(files, vec!["https://cdn.example/a.png", "https://cdn.example/b.png"]);

        feed.mark_deleted("s1", "https://cdn.example/a.png").await.unwrap();
        assert!(state.store.is_deleted("s1", "https://cdn.example/a.png"));
        assert_eq!(feed.fetch("s1").await.unwrap(), vec!["https://cdn.example/b.png"]);
    }

    #[tokio::test]
    async fn test_poller_merges_relay_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let (origin, state) = spawn_server(dir.path()).await;
        state.store.add_upload("s2", "https://cdn.example/photo.png");

        let feed = Arc::new(HttpUploadFeed::new(origin));
        let mut poller = UploadPoller::new(feed, "s2");
        let mut editor = Editor::default();
        poller.start();
        assert_eq!(poller.poll_once(&mut editor).await, 1);
        assert_eq!(poller.poll_once(&mut editor).await, 0);

        let id = editor.scene().user_images[0].id().clone();
        editor.delete_element(ElementKind::Image, &id);
        assert_eq!(poller.flush_deletes(&mut editor).await, 1);
        assert!(state.store.is_deleted("s2", "https://cdn.example/photo.png"));
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_a_transport_error() {
        let feed = HttpUploadFeed::new("http://127.0.0.1:1");
        assert!(matches!(feed.fetch("s1").await, Err(FeedError::Transport(_))));
    }
}
