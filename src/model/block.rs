//! Positioned blocks produced by layout extraction.

use super::BoundingBox;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Font information for a text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontInfo {
    /// Font name (e.g., "Helvetica-Bold")
    pub name: String,
    /// Font size in points
    pub size: f32,
    /// Whether the font is bold
    pub bold: bool,
    /// Whether the font is italic
    pub italic: bool,
}

impl FontInfo {
    /// Create font info, inferring bold and italic from the font name.
    pub fn new(name: impl Into<String>, size: f32) -> Self {
        let name = name.into();
        let lower = name.to_lowercase();
        let bold = lower.contains("bold") || lower.contains("black") || lower.contains("heavy");
        let italic = lower.contains("italic") || lower.contains("oblique");

        Self {
            name,
            size,
            bold,
            italic,
        }
    }

    /// Create font info, preferring explicit flags over name inference.
    pub fn with_flags(
        name: impl Into<String>,
        size: f32,
        bold: Option<bool>,
        italic: Option<bool>,
    ) -> Self {
        let mut font = Self::new(name, size);
        if let Some(bold) = bold {
            font.bold = bold;
        }
        if let Some(italic) = italic {
            font.italic = italic;
        }
        font
    }

    /// Check if two fonts match by name, size, and weight.
    pub fn matches(&self, other: &FontInfo) -> bool {
        self.name == other.name
            && (self.size - other.size).abs() < 0.05
            && self.bold == other.bold
            && self.italic == other.italic
    }
}

/// A reference to an extracted image file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageReference {
    /// Alternative text
    pub alt: String,
    /// Optional title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Relative path of the image file
    pub path: String,
}

impl ImageReference {
    /// Create an image reference. A missing or blank alt defaults to the
    /// file stem of `path`.
    pub fn new(path: impl Into<String>, alt: Option<String>, title: Option<String>) -> Self {
        let path = path.into();
        let alt = match alt {
            Some(alt) if !alt.trim().is_empty() => alt,
            _ => Path::new(&path)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        let title = title.filter(|t| !t.trim().is_empty());

        Self { alt, title, path }
    }

    /// Check that the path is a usable relative reference.
    pub fn validate(&self) -> Result<(), String> {
        let path = self.path.as_str();
        if path.trim().is_empty() {
            return Err("image path is empty".to_string());
        }
        if path.starts_with('/') || path.starts_with('\\') || has_drive_prefix(path) {
            return Err(format!("image path '{}' is absolute", path));
        }
        if has_scheme(path) {
            return Err(format!("image path '{}' is not a relative reference", path));
        }
        if path.chars().any(|c| c.is_control() || c == '<' || c == '>') {
            return Err(format!("image path '{}' contains invalid characters", path));
        }
        Ok(())
    }
}

/// `C:\...` or `C:/...`
fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/')
}

/// `scheme:` prefix per RFC 3986 (letter followed by letters, digits, `+-.`).
fn has_scheme(path: &str) -> bool {
    match path.find(':') {
        Some(pos) if pos > 0 => {
            let scheme = &path[..pos];
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Content of a positioned block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    /// Merged text on one line
    TextRun {
        /// Normalized text
        text: String,
        /// Font shared by the merged runs
        font: FontInfo,
    },
    /// An image placement
    Image(ImageReference),
}

/// A unit of page content in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedBlock {
    /// Page number (1-indexed)
    pub page: u32,
    /// Position in the page's reading order
    pub index: usize,
    /// Line band the block sits on
    pub line: usize,
    /// Bounding box in page space
    pub bbox: BoundingBox,
    /// Block content
    pub kind: BlockKind,
    /// Link target covering the block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl PositionedBlock {
    /// Text of the block, if it is a text run.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            BlockKind::TextRun { text, .. } => Some(text),
            BlockKind::Image(_) => None,
        }
    }

    /// Font of the block, if it is a text run.
    pub fn font(&self) -> Option<&FontInfo> {
        match &self.kind {
            BlockKind::TextRun { font, .. } => Some(font),
            BlockKind::Image(_) => None,
        }
    }

    /// Image reference, if the block is an image.
    pub fn image(&self) -> Option<&ImageReference> {
        match &self.kind {
            BlockKind::Image(image) => Some(image),
            BlockKind::TextRun { .. } => None,
        }
    }

    /// Check if the block is an image.
    pub fn is_image(&self) -> bool {
        matches!(self.kind, BlockKind::Image(_))
    }

    /// Font size of a text block, 0 for images.
    pub fn font_size(&self) -> f32 {
        self.font().map(|f| f.size).unwrap_or(0.0)
    }

    /// Number of characters in the block's text.
    pub fn char_count(&self) -> usize {
        self.text().map(|t| t.chars().count()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_inference() {
        let font = FontInfo::new("Helvetica-Bold", 12.0);
        assert!(font.bold);
        assert!(!font.italic);

        let font = FontInfo::new("Times-Italic", 10.0);
        assert!(!font.bold);
        assert!(font.italic);

        let font = FontInfo::with_flags("ABCDEF+Custom", 12.0, Some(true), None);
        assert!(font.bold);
        assert!(!font.italic);

        let font = FontInfo::with_flags("Arial-Black", 12.0, Some(false), None);
        assert!(!font.bold);
    }

    #[test]
    fn test_image_alt_defaults_to_stem() {
        let image = ImageReference::new("test/data/picture.png", None, None);
        assert_eq!(image.alt, "picture");

        let image = ImageReference::new("a.png", Some("  ".to_string()), Some("".to_string()));
        assert_eq!(image.alt, "a");
        assert!(image.title.is_none());

        let image = ImageReference::new(
            "a.png",
            Some("Diagram".to_string()),
            Some("Figure 1".to_string()),
        );
        assert_eq!(image.alt, "Diagram");
        assert_eq!(image.title.as_deref(), Some("Figure 1"));
    }

    #[test]
    fn test_image_path_validation() {
        let valid = ["test/data/picture.png", "images/my figure (1).png", "../x.jpg"];
        for path in valid {
            assert!(ImageReference::new(path, None, None).validate().is_ok(), "{path}");
        }

        let invalid = [
            "",
            "/abs/x.png",
            "C:\\x.png",
            "https://example.com/x.png",
            "data:image/png;base64,AAAA",
            "a<b>.png",
            "a\nb.png",
        ];
        for path in invalid {
            assert!(ImageReference::new(path, None, None).validate().is_err(), "{path:?}");
        }
    }
}
