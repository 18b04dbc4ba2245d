//! Shared enums used across the crate: `AspectRatio` and `MimeType`.
//! Both double as CLI value enums and as serde types in batch configs.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default, Serialize, Deserialize,
)]
pub enum AspectRatio {
    #[default]
    #[value(name = "16:9")]
    #[serde(rename = "16:9")]
    Landscape,
    #[value(name = "9:16")]
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
pub enum MimeType {
    #[value(name = "image/png")]
    #[serde(rename = "image/png")]
    Png,
    #[value(name = "image/jpeg")]
    #[serde(rename = "image/jpeg")]
    Jpeg,
}

impl MimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MimeType::Png => "image/png",
            MimeType::Jpeg => "image/jpeg",
        }
    }
}

impl std::fmt::Display for MimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_uses_wire_names() {
        assert_eq!(
            serde_json::to_string(&AspectRatio::Portrait).unwrap(),
            "\"9:16\""
        );
        let mime: MimeType = serde_json::from_str("\"image/jpeg\"").unwrap();
        assert_eq!(mime, MimeType::Jpeg);
        assert!(serde_json::from_str::<AspectRatio>("\"4:3\"").is_err());
    }

    #[test]
    fn aspect_ratio_defaults_to_landscape() {
        assert_eq!(AspectRatio::default().to_string(), "16:9");
    }
}
