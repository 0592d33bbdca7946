//! Filesystem side of the upload relay.
//!
//! Files live in `<uploads_dir>/<session>/<millis>-<name>` and are served
//! back as `/uploads/<session>/<file>`.

use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;

/// Replace every byte outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Sanitized session id, or `None` when nothing usable is left.
pub fn sanitize_session(raw: &str) -> Option<String> {
    let session = sanitize(raw.trim());
    if session.is_empty() || session.chars().all(|c| c == '.') {
        return None;
    }
    Some(session)
}

/// Name a file is stored under.
pub fn stored_name(millis: u128, original: &str) -> String {
    let safe = sanitize(original);
    let safe = if safe.is_empty() { "upload".to_string() } else { safe };
    format!("{}-{}", millis, safe)
}

pub fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Public URL of a stored file.
pub fn public_url(session: &str, file_name: &str) -> String {
    format!("/uploads/{}/{}", session, file_name)
}

/// Write an upload to disk and return its public URL.
pub async fn save(
    uploads_dir: &Path,
    session: &str,
    original_name: &str,
    bytes: &[u8],
) -> io::Result<String> {
    let dir = uploads_dir.join(session);
    fs::create_dir_all(&dir).await?;
    let name = stored_name(now_millis(), original_name);
    fs::write(dir.join(&name), bytes).await?;
    Ok(public_url(session, &name))
}

/// Public URLs of every file stored for a session, sorted by name.
///
/// A session without a directory simply has no files.
pub async fn list(uploads_dir: &Path, session: &str) -> io::Result<Vec<String>> {
    let dir = uploads_dir.join(session);
    let mut entries = match fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names.iter().map(|name| public_url(session, name)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("my photo (1).JPG"), "my_photo__1_.JPG");
        assert_eq!(sanitize("ünï.png"), "_n_.png");
        assert_eq!(stored_name(1700000000000, "a b.png"), "1700000000000-a_b.png");
        assert_eq!(stored_name(1, ""), "1-upload");
    }

    #[test]
    fn test_sanitize_session() {
        assert_eq!(sanitize_session("abc123"), Some("abc123".to_string()));
        assert_eq!(sanitize_session("a/b"), Some("a_b".to_string()));
        assert_eq!(sanitize_session(".."), None);
        assert_eq!(sanitize_session("  "), None);
    }

    #[tokio::test]
    async fn test_save_and_list() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list(dir.path(), "s1").await.unwrap().is_empty());

        let url = save(dir.path(), "s1", "card one.png", b"abc").await.unwrap();
        assert!(url.starts_with("/uploads/s1/"));
        assert!(url.ends_with("-card_one.png"));

        let files = list(dir.path(), "s1").await.unwrap();
        assert_eq!(files, vec![url]);
    }
}
