//! Element source references.
//!
//! Sources arrive as plain strings (palette entries, upload URLs, file reads)
//! and are classified once, by prefix, into tagged variants. The string form
//! is kept round-trippable so serialized scenes look like the strings the
//! editor was given.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors from data URL parsing.
#[derive(Debug, Error)]
pub enum DataUrlError {
    #[error("not a data URL")]
    NotDataUrl,
    #[error("data URL is not base64 encoded")]
    NotBase64,
    #[error("invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// Result type for data URL operations.
pub type DataUrlResult<T> = Result<T, DataUrlError>;

/// A decoded `data:<mime>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub data: Vec<u8>,
}

impl DataUrl {
    pub fn new(mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            data,
        }
    }

    /// Parse a base64 data URL.
    ///
    /// The mime type is everything between `data:` and the last `;base64,`.
    pub fn parse(raw: &str) -> DataUrlResult<Self> {
        let rest = raw.strip_prefix("data:").ok_or(DataUrlError::NotDataUrl)?;
        let split = rest.rfind(";base64,").ok_or(DataUrlError::NotBase64)?;
        let mime = &rest[..split];
        if mime.is_empty() {
            return Err(DataUrlError::NotDataUrl);
        }
        let payload = &rest[split + ";base64,".len()..];
        let data = STANDARD.decode(payload.trim())?;
        Ok(Self::new(mime, data))
    }

    /// Encode back into a data URL string.
    pub fn encode(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.data))
    }
}

/// Where a sticker's artwork comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StickerSource {
    /// Image file served by the app, e.g. `/stickers/8.png`.
    Path(String),
    /// Vector icon from the icon catalog, `icon:<name>[:<color>]`.
    Icon { name: String, color: Option<String> },
    /// Literal text, typically an emoji.
    Emoji(String),
}

impl StickerSource {
    /// Classify a raw sticker string.
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with('/') {
            StickerSource::Path(raw.to_string())
        } else if let Some(rest) = raw.strip_prefix("icon:") {
            let mut parts = rest.splitn(2, ':');
            let name = parts.next().unwrap_or_default().to_string();
            let color = parts.next().filter(|c| !c.is_empty()).map(str::to_string);
            StickerSource::Icon { name, color }
        } else {
            StickerSource::Emoji(raw.to_string())
        }
    }

    /// Catalog entry for an icon sticker, if the name is known.
    pub fn icon(&self) -> Option<&'static IconSticker> {
        match self {
            StickerSource::Icon { name, .. } => icon_by_name(name),
            _ => None,
        }
    }
}

impl fmt::Display for StickerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StickerSource::Path(path) => f.write_str(path),
            StickerSource::Icon { name, color: Some(color) } => write!(f, "icon:{name}:{color}"),
            StickerSource::Icon { name, color: None } => write!(f, "icon:{name}"),
            StickerSource::Emoji(text) => f.write_str(text),
        }
    }
}

impl From<String> for StickerSource {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<StickerSource> for String {
    fn from(source: StickerSource) -> Self {
        source.to_string()
    }
}

/// Where a user image's pixels come from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImageSource {
    /// Inline `data:` URL.
    Data(String),
    /// Path served by the relay, e.g. `/uploads/<session>/<file>`.
    Local(String),
    /// Any other URL.
    Remote(String),
}

impl ImageSource {
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("data:") {
            ImageSource::Data(raw.to_string())
        } else if raw.starts_with('/') {
            ImageSource::Local(raw.to_string())
        } else {
            ImageSource::Remote(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ImageSource::Data(s) | ImageSource::Local(s) | ImageSource::Remote(s) => s,
        }
    }

    /// Whether this image was delivered through the upload relay.
    ///
    /// Deleting such an image must also soft-delete it on the relay.
    pub fn looks_like_upload(&self) -> bool {
        let raw = self.as_str();
        raw.starts_with("/uploads/") || raw.contains("cloudinary") || raw.starts_with("http")
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ImageSource {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<ImageSource> for String {
    fn from(source: ImageSource) -> Self {
        match source {
            ImageSource::Data(s) | ImageSource::Local(s) | ImageSource::Remote(s) => s,
        }
    }
}

/// One entry of the icon sticker catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconSticker {
    pub name: &'static str,
    pub color: &'static str,
}

impl IconSticker {
    pub fn source(&self) -> StickerSource {
        StickerSource::Icon {
            name: self.name.to_string(),
            color: Some(self.color.to_string()),
        }
    }
}

/// Icons offered by the sticker palette, in palette order.
pub const ICON_STICKERS: &[IconSticker] = &[
    IconSticker { name: "Heart", color: "#ec4899" },
    IconSticker { name: "Star", color: "#fbbf24" },
    IconSticker { name: "Sparkles", color: "#a78bfa" },
    IconSticker { name: "Music", color: "#60a5fa" },
    IconSticker { name: "Coffee", color: "#92400e" },
    IconSticker { name: "Gift", color: "#f59e0b" },
    IconSticker { name: "Crown", color: "#fbbf24" },
    IconSticker { name: "Cake", color: "#f472b6" },
    IconSticker { name: "Flower", color: "#fb7185" },
    IconSticker { name: "Sun", color: "#fbbf24" },
    IconSticker { name: "Moon", color: "#818cf8" },
    IconSticker { name: "Cloud", color: "#93c5fd" },
];

/// Exact-name catalog lookup.
pub fn icon_by_name(name: &str) -> Option<&'static IconSticker> {
    ICON_STICKERS.iter().find(|icon| icon.name == name)
}

/// Turn a raw palette value into a sticker source.
///
/// Purely numeric values index the icon catalog. With `as_icon`, bare names
/// are matched case-insensitively against the catalog and anything unknown
/// becomes `icon:<name>`.
pub fn normalize_sticker_source(raw: &str, as_icon: bool) -> StickerSource {
    let indexed = raw
        .parse::<usize>()
        .ok()
        .filter(|_| raw.chars().all(|c| c.is_ascii_digit()))
        .and_then(|idx| ICON_STICKERS.get(idx));
    if let Some(icon) = indexed {
        return icon.source();
    }

    if as_icon && !raw.starts_with("icon:") {
        return match ICON_STICKERS.iter().find(|i| i.name.eq_ignore_ascii_case(raw)) {
            Some(icon) => icon.source(),
            None => StickerSource::Icon {
                name: raw.to_string(),
                color: None,
            },
        };
    }

    StickerSource::parse(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sticker_source_prefixes() {
        assert_eq!(
            StickerSource::parse("/stickers/8.png"),
            StickerSource::Path("/stickers/8.png".into())
        );
        assert_eq!(
            StickerSource::parse("icon:Heart:#ec4899"),
            StickerSource::Icon {
                name: "Heart".into(),
                color: Some("#ec4899".into())
            }
        );
        assert_eq!(StickerSource::parse("🌹"), StickerSource::Emoji("🌹".into()));
    }

    #[test]
    fn test_sticker_source_display_round_trips() {
        for raw in ["/stickers/ALPHA ICONS.png", "icon:Moon:#818cf8", "icon:Rocket", "💌"] {
            assert_eq!(StickerSource::parse(raw).to_string(), raw);
        }
    }

    #[test]
    fn test_numeric_source_indexes_catalog() {
        assert_eq!(
            normalize_sticker_source("2", false).to_string(),
            "icon:Sparkles:#a78bfa"
        );
        // Out of range index stays a literal.
        assert_eq!(normalize_sticker_source("99", false), StickerSource::Emoji("99".into()));
    }

    #[test]
    fn test_icon_name_normalization() {
        assert_eq!(normalize_sticker_source("coffee", true).to_string(), "icon:Coffee:#92400e");
        assert_eq!(normalize_sticker_source("Rocket", true).to_string(), "icon:Rocket");
        assert_eq!(
            normalize_sticker_source("icon:Sun:#fbbf24", true).to_string(),
            "icon:Sun:#fbbf24"
        );
    }

    #[test]
    fn test_image_source_upload_detection() {
        assert!(ImageSource::parse("/uploads/abc/1-x.png").looks_like_upload());
        assert!(ImageSource::parse("https://res.cloudinary.com/x.png").looks_like_upload());
        assert!(!ImageSource::parse("data:image/png;base64,AAAA").looks_like_upload());
        assert!(!ImageSource::parse("/stickers/8.png").looks_like_upload());
    }

    #[test]
    fn test_data_url_parse() {
        let url = DataUrl::parse("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(url.mime, "image/png");
        assert_eq!(url.data, b"hello");
        assert_eq!(url.encode(), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn test_data_url_rejects_malformed() {
        assert!(matches!(DataUrl::parse("image/png;base64,aa"), Err(DataUrlError::NotDataUrl)));
        assert!(matches!(
            DataUrl::parse("data:image/svg+xml,<svg/>"),
            Err(DataUrlError::NotBase64)
        ));
        assert!(matches!(DataUrl::parse("data:;base64,aa"), Err(DataUrlError::NotDataUrl)));
        assert!(matches!(
            DataUrl::parse("data:image/png;base64,@@@"),
            Err(DataUrlError::Decode(_))
        ));
    }

    #[test]
    fn test_serde_uses_raw_strings() {
        let json = serde_json::to_string(&StickerSource::parse("icon:Star:#fbbf24")).unwrap();
        assert_eq!(json, "\"icon:Star:#fbbf24\"");
        let back: ImageSource = serde_json::from_str("\"/uploads/s/a.png\"").unwrap();
        assert_eq!(back, ImageSource::Local("/uploads/s/a.png".into()));
    }
}
