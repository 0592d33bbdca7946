//! Server configuration from flags and environment.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Valencard upload relay and delivery server.
#[derive(Parser, Debug, Clone)]
#[command(name = "valencard-server", about = "Upload relay and card delivery server for Valencard")]
pub struct ServerConfig {
    /// Address to listen on.
    #[arg(long, env = "VALENCARD_BIND", default_value = "0.0.0.0:3030")]
    pub bind: SocketAddr,

    /// Directory served as the public root; uploads land in `<dir>/uploads`.
    #[arg(long, env = "VALENCARD_PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,

    #[arg(long, env = "SMTP_HOST")]
    pub smtp_host: Option<String>,

    #[arg(long, env = "SMTP_PORT", default_value_t = 587)]
    pub smtp_port: u16,

    #[arg(long, env = "SMTP_USER")]
    pub smtp_user: Option<String>,

    #[arg(long, env = "SMTP_PASS", hide_env_values = true)]
    pub smtp_pass: Option<String>,

    /// Display name used in the From header.
    #[arg(long, env = "FROM_NAME")]
    pub from_name: Option<String>,

    /// Address used in the From header.
    #[arg(long, env = "FROM_EMAIL")]
    pub from_email: Option<String>,

    #[arg(long, env = "CLOUDINARY_CLOUD_NAME")]
    pub cloudinary_cloud_name: Option<String>,

    #[arg(long, env = "CLOUDINARY_API_KEY")]
    pub cloudinary_api_key: Option<String>,

    #[arg(long, env = "CLOUDINARY_API_SECRET", hide_env_values = true)]
    pub cloudinary_api_secret: Option<String>,
}

/// SMTP credentials, present only when fully configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
}

impl SmtpSettings {
    /// Port 465 speaks TLS from the first byte; anything else upgrades.
    pub fn implicit_tls(&self) -> bool {
        self.port == 465
    }
}

/// Cloudinary account, present only when fully configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudinarySettings {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3030)),
            public_dir: PathBuf::from("public"),
            smtp_host: None,
            smtp_port: 587,
            smtp_user: None,
            smtp_pass: None,
            from_name: None,
            from_email: None,
            cloudinary_cloud_name: None,
            cloudinary_api_key: None,
            cloudinary_api_secret: None,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

impl ServerConfig {
    pub fn smtp(&self) -> Option<SmtpSettings> {
        Some(SmtpSettings {
            host: non_empty(&self.smtp_host)?,
            port: self.smtp_port,
            user: non_empty(&self.smtp_user)?,
            pass: non_empty(&self.smtp_pass)?,
        })
    }

    pub fn cloudinary(&self) -> Option<CloudinarySettings> {
        Some(CloudinarySettings {
            cloud_name: non_empty(&self.cloudinary_cloud_name)?,
            api_key: non_empty(&self.cloudinary_api_key)?,
            api_secret: non_empty(&self.cloudinary_api_secret)?,
        })
    }

    pub fn from_name(&self) -> Option<String> {
        non_empty(&self.from_name)
    }

    pub fn from_email(&self) -> Option<String> {
        non_empty(&self.from_email)
    }

    /// From header for server-sent mail: `Name <email>`, `email`, or the SMTP user.
    pub fn from_header(&self, smtp_user: &str) -> String {
        format_from(self.from_name().as_deref(), self.from_email().as_deref(), smtp_user)
    }

    /// Directory holding uploaded files.
    pub fn uploads_dir(&self) -> PathBuf {
        self.public_dir.join("uploads")
    }
}

/// `Name <email>` when both are known, `email` alone, or `fallback`.
pub fn format_from(name: Option<&str>, email: Option<&str>, fallback: &str) -> String {
    match (name, email) {
        (Some(name), Some(email)) => format!("{} <{}>", name, email),
        (None, Some(email)) => email.to_string(),
        _ => fallback.to_string(),
    }
}
