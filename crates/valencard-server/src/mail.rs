//! Card delivery by email.
//!
//! Two transports: SMTP from the server (lettre), and the Gmail REST API
//! with a user's OAuth token, which sends a pre-built MIME message.

use crate::config::{SmtpSettings, format_from};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// File name of the attached card.
pub const ATTACHMENT_NAME: &str = "card.png";

pub const GMAIL_SEND_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages/send";

/// Mail errors.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid address: {0}")]
    Address(String),
    #[error("Line break in {0} header")]
    HeaderInjection(&'static str),
    #[error("Failed to build message: {0}")]
    Build(String),
    #[error("SMTP error: {0}")]
    Smtp(String),
    #[error("Gmail request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Gmail API error: {status} {body}")]
    Gmail { status: u16, body: String },
}

/// Result type for mail operations.
pub type MailResult<T> = Result<T, MailError>;

/// Boxed future for async mail operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A message with the card attached.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment_mime: String,
    pub attachment: Vec<u8>,
}

/// Anything that can deliver an [`OutgoingMail`].
pub trait Mailer: Send + Sync {
    fn send(&self, mail: OutgoingMail) -> BoxFuture<'_, MailResult<()>>;
}

/// SMTP delivery through lettre.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Port 465 uses implicit TLS; every other port uses STARTTLS.
    pub fn new(settings: &SmtpSettings) -> MailResult<Self> {
        let builder = if settings.implicit_tls() {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        }
        .map_err(|e| MailError::Smtp(e.to_string()))?;
        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(settings.user.clone(), settings.pass.clone()))
            .build();
        Ok(Self { transport })
    }
}

fn parse_mailbox(raw: &str) -> MailResult<Mailbox> {
    raw.parse()
        .map_err(|e: lettre::address::AddressError| MailError::Address(format!("{}: {}", raw, e)))
}

/// Build the lettre message for a mail.
pub fn build_message(mail: &OutgoingMail) -> MailResult<Message> {
    let from = parse_mailbox(&mail.from)?;
    let to = parse_mailbox(&mail.to)?;
    let content_type =
        ContentType::parse(&mail.attachment_mime).map_err(|e| MailError::Build(e.to_string()))?;
    let attachment =
        Attachment::new(ATTACHMENT_NAME.to_string()).body(mail.attachment.clone(), content_type);
    Message::builder()
        .from(from)
        .to(to)
        .subject(mail.subject.clone())
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(mail.body.clone()))
                .singlepart(attachment),
        )
        .map_err(|e| MailError::Build(e.to_string()))
}

impl Mailer for SmtpMailer {
    fn send(&self, mail: OutgoingMail) -> BoxFuture<'_, MailResult<()>> {
        Box::pin(async move {
            let message = build_message(&mail)?;
            self.transport
                .send(message)
                .await
                .map_err(|e| MailError::Smtp(e.to_string()))?;
            tracing::info!("Sent card to {}", mail.to);
            Ok(())
        })
    }
}

/// Header value with no line breaks.
fn header_value<'a>(name: &'static str, value: &'a str) -> MailResult<&'a str> {
    if value.contains(['\r', '\n']) {
        return Err(MailError::HeaderInjection(name));
    }
    Ok(value)
}

/// RFC 2047 encoded-word for non-ASCII header text.
pub fn encode_header_text(text: &str) -> String {
    if text.is_ascii() {
        text.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(text.as_bytes()))
    }
}

/// Raw multipart/mixed message for the Gmail API.
///
/// The From header is `Name <email>`, `email`, or `me` when neither is known.
/// Line breaks in any header field are rejected.
pub fn build_gmail_raw(
    from_name: Option<&str>,
    from_email: Option<&str>,
    to: &str,
    subject: &str,
    body: &str,
    png: &[u8],
    boundary: &str,
) -> MailResult<String> {
    let from = format_from(from_name, from_email, "me");
    let from = header_value("From", &from)?;
    let to = header_value("To", to)?;
    let subject = encode_header_text(header_value("Subject", subject)?);
    let mut raw = String::new();
    raw.push_str(&format!("From: {}\r\n", from));
    raw.push_str(&format!("To: {}\r\n", to));
    raw.push_str(&format!("Subject: {}\r\n", subject));
    raw.push_str("MIME-Version: 1.0\r\n");
    raw.push_str(&format!("Content-Type: multipart/mixed; boundary=\"{}\"\r\n\r\n", boundary));
    raw.push_str(&format!("--{}\r\n", boundary));
    raw.push_str("Content-Type: text/plain; charset=\"UTF-8\"\r\n\r\n");
    raw.push_str(&format!("{}\r\n\r\n", body));
    raw.push_str(&format!("--{}\r\n", boundary));
    raw.push_str(&format!("Content-Type: image/png; name=\"{}\"\r\n", ATTACHMENT_NAME));
    raw.push_str("Content-Transfer-Encoding: base64\r\n");
    raw.push_str(&format!(
        "Content-Disposition: attachment; filename=\"{}\"\r\n\r\n",
        ATTACHMENT_NAME
    ));
    raw.push_str(&format!("{}\r\n\r\n", STANDARD.encode(png)));
    raw.push_str(&format!("--{}--", boundary));
    Ok(raw)
}

/// Base64url without padding, as the Gmail API expects in `raw`.
pub fn encode_gmail_raw(raw: &str) -> String {
    URL_SAFE_NO_PAD.encode(raw.as_bytes())
}

/// Boundary string for a Gmail message.
pub fn gmail_boundary(millis: u128) -> String {
    format!("----=_Valencard_{}", millis)
}

/// Gmail REST transport using a caller-provided OAuth token.
#[derive(Debug, Clone)]
pub struct GmailTransport {
    http: reqwest::Client,
    endpoint: String,
}

impl Default for GmailTransport {
    fn default() -> Self {
        Self::new(GMAIL_SEND_URL)
    }
}

impl GmailTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Send a raw MIME message. Non-2xx answers carry status and body.
    pub async fn send(&self, access_token: &str, raw: &str) -> MailResult<()> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(access_token)
            .json(&json!({ "raw": encode_gmail_raw(raw) }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Gmail {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail() -> OutgoingMail {
        OutgoingMail {
            from: "Val <val@example.com>".to_string(),
            to: "friend@example.com".to_string(),
            subject: "For you".to_string(),
            body: "Happy Valentine's".to_string(),
            attachment_mime: "image/png".to_string(),
            attachment: vec![137, 80, 78, 71],
        }
    }

    #[test]
    fn test_build_message_with_attachment() {
        let message = build_message(&mail()).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("Subject: For you"));
        assert!(formatted.contains("filename=\"card.png\""));
        assert!(formatted.contains("multipart/mixed"));
    }

    #[test]
    fn test_build_message_rejects_bad_address() {
        let mut bad = mail();
        bad.to = "not an address".to_string();
        assert!(matches!(build_message(&bad), Err(MailError::Address(_))));
    }

    #[test]
    fn test_gmail_raw_layout() {
        let raw = build_gmail_raw(
            None,
            Some("val@example.com"),
            "f@example.com",
            "Hi",
            "Body",
            b"png",
            "B",
        )
        .unwrap();
        assert!(raw.starts_with("From: val@example.com\r\nTo: f@example.com\r\nSubject: Hi\r\n"));
        assert!(raw.contains("Content-Type: multipart/mixed; boundary=\"B\"\r\n\r\n--B\r\n"));
        let disposition = "Content-Disposition: attachment; filename=\"card.png\"\r\n\r\ncG5n\r\n";
        assert!(raw.contains(disposition));
        assert!(raw.ends_with("--B--"));

        let raw = build_gmail_raw(None, None, "f@example.com", "Hi", "Body", b"", "B").unwrap();
        assert!(raw.starts_with("From: me\r\n"));
    }

    #[test]
    fn test_gmail_raw_rejects_header_line_breaks() {
        let injected = "f@example.com\r\nBcc: all@example.com";
        assert!(matches!(
            build_gmail_raw(None, None, injected, "Hi", "Body", b"", "B"),
            Err(MailError::HeaderInjection("To"))
        ));
        assert!(matches!(
            build_gmail_raw(None, None, "f@example.com", "Hi\nX-Spam: 1", "Body", b"", "B"),
            Err(MailError::HeaderInjection("Subject"))
        ));
    }

    #[test]
    fn test_non_ascii_subject_is_encoded() {
        assert_eq!(encode_header_text("Hi"), "Hi");
        assert_eq!(encode_header_text("Für dich"), "=?UTF-8?B?RsO8ciBkaWNo?=");
        let raw = build_gmail_raw(None, None, "f@example.com", "Für dich", "", b"", "B").unwrap();
        assert!(raw.contains("Subject: =?UTF-8?B?RsO8ciBkaWNo?=\r\n"));
    }

    #[test]
    fn test_encode_gmail_raw_is_url_safe() {
        // U+FFFD encodes to "77+9" in standard base64.
        let raw = String::from_utf8_lossy(&[0xfb, 0xff]).into_owned();
        let encoded = encode_gmail_raw(&raw);
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert!(!encoded.ends_with('='));
        assert_eq!(encode_gmail_raw("hi?"), "aGk_");
    }

    #[test]
    fn test_boundary() {
        assert_eq!(gmail_boundary(42), "----=_Valencard_42");
    }
}
