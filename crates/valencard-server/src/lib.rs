//! Valencard upload relay and delivery server.
//!
//! A phone opens `/upload/<session>` and posts pictures; the desktop editor
//! polls `/api/uploads/<session>` and merges them into the card. Finished
//! cards are mailed through `/api/send-email`.
//!
//! ## Endpoints
//!
//! ```text
//! POST   /api/upload               multipart { file, session } -> { ok, url } | { ok, dataUrl }
//! GET    /api/uploads/{session}    -> { files: [..] }
//! DELETE /api/uploads/{session}    { url } -> { ok }
//! GET    /api/env                  -> { fromName, fromEmail }
//! POST   /api/send-email           { to, subject, body, dataUrl } -> { ok }
//! ```

pub mod cloudinary;
pub mod config;
pub mod error;
pub mod feed;
pub mod mail;
pub mod routes;
pub mod store;
pub mod uploads;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use feed::HttpUploadFeed;
pub use routes::build_router;
pub use store::RelayStore;

use cloudinary::CloudinaryClient;
use mail::{Mailer, SmtpMailer};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: ServerConfig,
    /// In-memory uploads and soft deletions.
    pub store: RelayStore,
    /// Present when Cloudinary credentials are configured.
    pub cloudinary: Option<CloudinaryClient>,
    /// Present when SMTP is configured.
    pub mailer: Option<Arc<dyn Mailer>>,
}

impl AppState {
    pub fn from_config(config: ServerConfig) -> Self {
        let mailer = config.smtp().and_then(|smtp| match SmtpMailer::new(&smtp) {
            Ok(mailer) => Some(Arc::new(mailer) as Arc<dyn Mailer>),
            Err(e) => {
                tracing::warn!("SMTP disabled: {}", e);
                None
            }
        });
        let cloudinary = config.cloudinary().map(CloudinaryClient::new);
        Self {
            config,
            store: RelayStore::new(),
            cloudinary,
            mailer,
        }
    }

    /// Replace the mail transport.
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }
}
