//! File type categories derived from file extensions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of a vault file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    #[default]
    Unknown,
    Markdown,
    Canvas,
    Image,
    Audio,
    Video,
    Document,
    Graphic,
    Database,
}

/// Every category that has at least one supported extension
pub const SUPPORTED_FILE_TYPES: [FileType; 8] = [
    FileType::Markdown,
    FileType::Canvas,
    FileType::Image,
    FileType::Audio,
    FileType::Video,
    FileType::Document,
    FileType::Graphic,
    FileType::Database,
];

impl FileType {
    /// Extensions belonging to this category
    #[must_use]
    pub const fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Markdown => &["md"],
            Self::Canvas => &["canvas"],
            Self::Image => &["avif", "bmp", "gif", "jpeg", "jpg", "png", "svg", "webp"],
            Self::Audio => &["flac", "mp3", "m4a", "ogg", "3gp", "wav"],
            Self::Video => &["mkv", "mov", "mp4", "ogv", "webm"],
            Self::Document => &["pdf"],
            Self::Graphic => &["drawing", "excalidraw", "tldr"],
            Self::Database => &["loom"],
            Self::Unknown => &[],
        }
    }

    /// Look up the category of an extension (case-insensitive)
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_lowercase();
        SUPPORTED_FILE_TYPES
            .into_iter()
            .find(|ty| ty.extensions().contains(&ext.as_str()))
            .unwrap_or_default()
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Markdown => "markdown",
            Self::Canvas => "canvas",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Document => "document",
            Self::Graphic => "graphic",
            Self::Database => "database",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SUPPORTED_FILE_TYPES
            .into_iter()
            .chain(std::iter::once(Self::Unknown))
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| format!("unknown file type: {s}"))
    }
}

/// All supported extensions, in table order
#[must_use]
pub fn supported_extensions() -> Vec<&'static str> {
    SUPPORTED_FILE_TYPES
        .iter()
        .flat_map(|ty| ty.extensions().iter().copied())
        .collect()
}

/// Whether the extension appears in the lookup table
#[must_use]
pub fn is_supported_extension(ext: &str) -> bool {
    FileType::from_extension(ext) != FileType::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(FileType::from_extension("MD"), FileType::Markdown);
        assert_eq!(FileType::from_extension("Png"), FileType::Image);
        assert_eq!(FileType::from_extension("xyz"), FileType::Unknown);
    }

    #[test]
    fn test_every_extension_maps_back_to_its_type() {
        for ty in SUPPORTED_FILE_TYPES {
            for ext in ty.extensions() {
                assert_eq!(FileType::from_extension(ext), ty);
            }
        }
    }

    #[test]
    fn test_parse_roundtrip_names() {
        assert_eq!("canvas".parse::<FileType>(), Ok(FileType::Canvas));
        assert!("folder".parse::<FileType>().is_err());
    }

    #[test]
    fn test_supported_extensions() {
        let exts = supported_extensions();
        assert!(exts.contains(&"md"));
        assert!(exts.contains(&"excalidraw"));
        assert!(is_supported_extension("loom"));
        assert!(!is_supported_extension("exe"));
    }
}
