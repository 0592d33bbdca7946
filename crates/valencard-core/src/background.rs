//! Card background descriptor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Background of the card.
///
/// Each variant keeps the exact string the editor was given, so `Display`
/// returns it unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Background {
    /// `#rrggbb`, `rgb(..)`, `rgba(..)` or any other plain CSS color.
    Color(String),
    /// A CSS gradient (linear, radial, repeating).
    Gradient(String),
    /// A CSS `url(..)` pattern that is not an external https image.
    Pattern(String),
    /// An inline `data:image/svg+xml` document.
    SvgData(String),
    /// An external picture: `url(https://..)`, `http(s)://..` or a local path.
    Url(String),
}

impl Default for Background {
    fn default() -> Self {
        Background::Color(Self::DEFAULT_COLOR.to_string())
    }
}

impl Background {
    pub const DEFAULT_COLOR: &'static str = "#ffffff";

    /// Classify a background string by its prefix.
    pub fn sniff(raw: &str) -> Self {
        let value = raw.to_string();
        let trimmed = raw.trim();
        if trimmed.starts_with("data:image/svg") {
            Background::SvgData(value)
        } else if trimmed.starts_with("url(https") || trimmed.starts_with("url(http") {
            Background::Url(value)
        } else if trimmed.contains("gradient(") {
            Background::Gradient(value)
        } else if trimmed.starts_with("url(") {
            Background::Pattern(value)
        } else if trimmed.starts_with("http://")
            || trimmed.starts_with("https://")
            || trimmed.starts_with('/')
        {
            Background::Url(value)
        } else {
            Background::Color(value)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Background::Color(s)
            | Background::Gradient(s)
            | Background::Pattern(s)
            | Background::SvgData(s)
            | Background::Url(s) => s,
        }
    }

    /// The color passed through to the exporter, only for flat colors.
    pub fn flat_color(&self) -> Option<&str> {
        match self {
            Background::Color(color) => Some(color.as_str()),
            _ => None,
        }
    }

    /// URL of the picture to paint, stripping a `url(..)` wrapper.
    pub fn image_href(&self) -> Option<&str> {
        match self {
            Background::SvgData(s) => Some(s.as_str()),
            Background::Url(s) | Background::Pattern(s) => Some(strip_css_url(s)),
            Background::Color(_) | Background::Gradient(_) => None,
        }
    }
}

fn strip_css_url(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("url(")
        .and_then(|rest| rest.strip_suffix(')'))
        .map(|inner| inner.trim_matches(|c| c == '"' || c == '\''))
        .unwrap_or(trimmed)
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Background {
    fn from(raw: String) -> Self {
        Self::sniff(&raw)
    }
}

impl From<&str> for Background {
    fn from(raw: &str) -> Self {
        Self::sniff(raw)
    }
}

impl From<Background> for String {
    fn from(background: Background) -> Self {
        match background {
            Background::Color(s)
            | Background::Gradient(s)
            | Background::Pattern(s)
            | Background::SvgData(s)
            | Background::Url(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_colors() {
        assert!(matches!(Background::sniff("#ffffff"), Background::Color(_)));
        assert!(matches!(Background::sniff("rgb(1, 2, 3)"), Background::Color(_)));
        assert!(matches!(Background::sniff("rgba(1, 2, 3, 0.5)"), Background::Color(_)));
        assert!(matches!(Background::sniff("pink"), Background::Color(_)));
    }

    #[test]
    fn test_sniff_gradients_and_patterns() {
        assert!(matches!(
            Background::sniff("linear-gradient(135deg, #fce7f3 0%, #fbcfe8 100%)"),
            Background::Gradient(_)
        ));
        assert!(matches!(
            Background::sniff("repeating-radial-gradient(circle, #fff, #fce7f3 10px)"),
            Background::Gradient(_)
        ));
        assert!(matches!(Background::sniff("url(/patterns/dots.svg)"), Background::Pattern(_)));
    }

    #[test]
    fn test_sniff_images() {
        assert!(matches!(
            Background::sniff("data:image/svg+xml;base64,PHN2Zz4="),
            Background::SvgData(_)
        ));
        assert!(matches!(
            Background::sniff("url(https://images.example/bg.jpg)"),
            Background::Url(_)
        ));
        assert!(matches!(Background::sniff("/templates/rose.png"), Background::Url(_)));
    }

    #[test]
    fn test_flat_color_only_for_colors() {
        assert_eq!(Background::default().flat_color(), Some("#ffffff"));
        assert_eq!(Background::sniff("linear-gradient(#fff, #000)").flat_color(), None);
    }

    #[test]
    fn test_image_href_strips_css_wrapper() {
        let bg = Background::sniff("url(\"https://images.example/bg.jpg\")");
        assert_eq!(bg.image_href(), Some("https://images.example/bg.jpg"));
        assert_eq!(bg.to_string(), "url(\"https://images.example/bg.jpg\")");
    }
}
