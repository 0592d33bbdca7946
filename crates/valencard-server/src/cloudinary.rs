//! Optional Cloudinary storage for uploads.

use crate::config::CloudinarySettings;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";

/// Cloudinary errors.
#[derive(Debug, Error)]
pub enum CloudinaryError {
    #[error("Cloudinary request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Cloudinary returned {status}: {body}")]
    Api { status: u16, body: String },
}

/// Result type for Cloudinary operations.
pub type CloudinaryResult<T> = Result<T, CloudinaryError>;

/// Signature of an upload into `folder`.
///
/// Cloudinary signs the sorted parameters followed by the API secret.
pub fn sign(folder: &str, timestamp: u64, secret: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("folder={}&timestamp={}{}", folder, timestamp, secret));
    hex::encode(hasher.finalize())
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Deserialize)]
struct Resource {
    secure_url: String,
}

#[derive(Deserialize)]
struct ResourceList {
    #[serde(default)]
    resources: Vec<Resource>,
}

/// Client for one Cloudinary account. Sessions map to folders.
#[derive(Debug, Clone)]
pub struct CloudinaryClient {
    settings: CloudinarySettings,
    http: reqwest::Client,
    api_base: String,
}

impl CloudinaryClient {
    pub fn new(settings: CloudinarySettings) -> Self {
        Self::with_api_base(settings, DEFAULT_API_BASE)
    }

    pub fn with_api_base(settings: CloudinarySettings, api_base: impl Into<String>) -> Self {
        Self {
            settings,
            http: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Signed upload into the session's folder. Returns the secure URL.
    pub async fn upload(
        &self,
        session: &str,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> CloudinaryResult<String> {
        let timestamp = crate::uploads::now_millis() as u64 / 1000;
        let signature = sign(session, timestamp, &self.settings.api_secret);
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("api_key", self.settings.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("folder", session.to_string())
            .text("signature", signature);
        let url = format!("{}/v1_1/{}/image/upload", self.api_base, self.settings.cloud_name);
        let response = self.http.post(url).multipart(form).send().await?;
        let response = check(response).await?;
        Ok(response.json::<UploadResponse>().await?.secure_url)
    }

    /// Secure URLs of every image in the session's folder.
    pub async fn list(&self, session: &str) -> CloudinaryResult<Vec<String>> {
        let url = format!(
            "{}/v1_1/{}/resources/image/upload",
            self.api_base, self.settings.cloud_name
        );
        let response = self
            .http
            .get(url)
            .query(&[("prefix", format!("{}/", session))])
            .basic_auth(&self.settings.api_key, Some(&self.settings.api_secret))
            .send()
            .await?;
        let response = check(response).await?;
        let list = response.json::<ResourceList>().await?;
        Ok(list.resources.into_iter().map(|r| r.secure_url).collect())
    }
}

async fn check(response: reqwest::Response) -> CloudinaryResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(CloudinaryError::Api {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign() {
        assert_eq!(
            sign("abc", 1_700_000_000, "secret"),
            "5335622d658a4315105d420a78bdce6d552a0d5f"
        );
        assert_ne!(sign("a", 1, "s"), sign("b", 1, "s"));
    }

    #[test]
    fn test_list_response_shape() {
        let parsed: ResourceList = serde_json::from_str(
            r#"{"resources":[{"secure_url":"https://res.cloudinary.com/demo/image/upload/v1/s1/a.png","public_id":"s1/a"}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.resources.len(), 1);
        let empty: ResourceList = serde_json::from_str("{}").unwrap();
        assert!(empty.resources.is_empty());
    }
}
