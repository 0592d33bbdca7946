//! HTTP routes.

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::feed::FilesResponse;
use crate::mail::{ATTACHMENT_NAME, OutgoingMail};
use crate::uploads::{self, sanitize_session};
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use valencard_core::DataUrl;

/// Mime type of an upload part that declares none.
const DEFAULT_MIME: &str = "application/octet-stream";

/// Exported cards arrive as base64 data URLs, well above axum's 2 MB default.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Build the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let uploads = ServeDir::new(state.config.uploads_dir());
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/upload/{session}", get(upload_page))
        .route("/api/upload", post(upload))
        .route("/api/uploads/{session}", get(list_uploads).delete(delete_upload))
        .route("/api/env", get(env))
        .route("/api/send-email", post(send_email))
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index() -> &'static str {
    "Valencard relay server"
}

async fn health() -> &'static str {
    "ok"
}

/// Page the phone opens from the QR code.
async fn upload_page(Path(session): Path<String>) -> ApiResult<Html<String>> {
    let session = sanitize_session(&session)
        .ok_or_else(|| ApiError::BadRequest("Invalid session".to_string()))?;
    Ok(Html(format!(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1"><title>Send photos</title></head>
<body>
<h1>Send photos to your card</h1>
<form id="form">
<input type="file" name="file" accept="image/*" multiple>
<button type="submit">Upload</button>
</form>
<p id="status"></p>
<script>
document.getElementById("form").addEventListener("submit", async (e) => {{
  e.preventDefault();
  const status = document.getElementById("status");
  const files = e.target.file.files;
  for (const file of files) {{
    const body = new FormData();
    body.append("file", file);
    body.append("session", "{session}");
    const res = await fetch("/api/upload", {{ method: "POST", body }});
    status.textContent = res.ok ? "Sent " + file.name : "Failed to send " + file.name;
  }}
}});
</script>
</body>
</html>
"#
    )))
}

#[derive(Debug, Default, Serialize)]
struct UploadResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(rename = "dataUrl", skip_serializing_if = "Option::is_none")]
    data_url: Option<String>,
}

struct UploadedFile {
    name: String,
    mime: String,
    bytes: Bytes,
}

fn bad_request(e: impl std::fmt::Display) -> ApiError {
    ApiError::BadRequest(e.to_string())
}

async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let mut multipart = multipart?;
    let mut file = None;
    let mut session = None;
    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let mime = field.content_type().unwrap_or(DEFAULT_MIME).to_string();
                let bytes = field.bytes().await.map_err(bad_request)?;
                file = Some(UploadedFile { name, mime, bytes });
            }
            Some("session") => session = Some(field.text().await.map_err(bad_request)?),
            _ => {}
        }
    }
    let (Some(file), Some(session)) = (file, session.as_deref().and_then(sanitize_session)) else {
        return Err(ApiError::BadRequest("missing file or session".to_string()));
    };

    if let Some(cloudinary) = &state.cloudinary {
        match cloudinary
            .upload(&session, &file.name, &file.mime, file.bytes.to_vec())
            .await
        {
            Ok(url) => {
                info!("Uploaded {} to Cloudinary for session {}", file.name, session);
                state.store.add_upload(&session, url.clone());
                return Ok(Json(UploadResponse {
                    ok: true,
                    url: Some(url),
                    ..Default::default()
                }));
            }
            Err(e) => warn!("Cloudinary upload failed, storing locally: {}", e),
        }
    }

    match uploads::save(&state.config.uploads_dir(), &session, &file.name, &file.bytes).await {
        Ok(url) => {
            info!("Stored upload {} for session {}", url, session);
            Ok(Json(UploadResponse {
                ok: true,
                url: Some(url),
                ..Default::default()
            }))
        }
        Err(e) => {
            warn!("Filesystem write failed, returning data URL: {}", e);
            let data_url = DataUrl::new(file.mime, file.bytes.to_vec()).encode();
            state.store.add_upload(&session, data_url.clone());
            Ok(Json(UploadResponse {
                ok: true,
                data_url: Some(data_url),
                ..Default::default()
            }))
        }
    }
}

async fn list_uploads(
    State(state): State<Arc<AppState>>,
    Path(session): Path<String>,
) -> Json<FilesResponse> {
    let Some(session) = sanitize_session(&session) else {
        return Json(FilesResponse::default());
    };
    let mut sources = match uploads::list(&state.config.uploads_dir(), &session).await {
        Ok(files) => files,
        Err(e) => {
            warn!("Failed to list uploads for session {}: {}", session, e);
            Vec::new()
        }
    };
    sources.extend(state.store.uploads(&session));
    if let Some(cloudinary) = &state.cloudinary {
        match cloudinary.list(&session).await {
            Ok(urls) => sources.extend(urls),
            Err(e) => warn!("Cloudinary listing failed for session {}: {}", session, e),
        }
    }
    Json(FilesResponse {
        files: state.store.visible(&session, sources),
    })
}

#[derive(Debug, Default, Deserialize)]
struct DeleteRequest {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Serialize)]
struct OkResponse {
    ok: bool,
}

async fn delete_upload(
    State(state): State<Arc<AppState>>,
    Path(session): Path<String>,
    request: Result<Json<DeleteRequest>, JsonRejection>,
) -> ApiResult<Json<OkResponse>> {
    let Json(request) = request?;
    let url = request
        .url
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing url".to_string()))?;
    let session = sanitize_session(&session)
        .ok_or_else(|| ApiError::BadRequest("Invalid session".to_string()))?;
    if state.store.mark_deleted(&session, url.clone()) {
        info!("Session {} deleted {}", session, url);
    }
    Ok(Json(OkResponse { ok: true }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvResponse {
    from_name: Option<String>,
    from_email: Option<String>,
}

async fn env(State(state): State<Arc<AppState>>) -> Json<EnvResponse> {
    Json(EnvResponse {
        from_name: state.config.from_name(),
        from_email: state.config.from_email(),
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailRequest {
    to: Option<String>,
    subject: Option<String>,
    #[serde(default)]
    body: Option<String>,
    data_url: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn send_email(
    State(state): State<Arc<AppState>>,
    request: Result<Json<SendEmailRequest>, JsonRejection>,
) -> ApiResult<Json<OkResponse>> {
    let Json(request) = request?;
    let (Some(to), Some(subject), Some(data_url)) = (
        present(request.to),
        present(request.subject),
        present(request.data_url),
    ) else {
        return Err(ApiError::BadRequest("Missing fields".to_string()));
    };
    let Some(mailer) = state.mailer.clone() else {
        return Err(ApiError::Config("SMTP not configured on server".to_string()));
    };
    let image = DataUrl::parse(&data_url)
        .map_err(|_| ApiError::BadRequest("Invalid image data".to_string()))?;

    let smtp_user = state.config.smtp().map(|s| s.user).unwrap_or_default();
    let mail = OutgoingMail {
        from: state.config.from_header(&smtp_user),
        to: to.clone(),
        subject,
        body: request.body.unwrap_or_default(),
        attachment_mime: image.mime,
        attachment: image.data,
    };
    mailer
        .send(mail)
        .await
        .map_err(|e| ApiError::Delivery(format!("Failed to send {}: {}", ATTACHMENT_NAME, e)))?;
    info!("Card sent to {}", to);
    Ok(Json(OkResponse { ok: true }))
}
