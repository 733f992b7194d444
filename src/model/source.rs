//! Decoded page input.
//!
//! These types are the boundary with the PDF decoding collaborator: every page
//! arrives as a flat list of positioned objects (text runs, image placements,
//! link areas) in page space.

use super::{BoundingBox, Metadata};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// A decoded document: metadata plus its pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Document metadata
    #[serde(default)]
    pub metadata: Metadata,

    /// Pages in document order
    pub pages: Vec<SourcePage>,
}

impl SourceDocument {
    /// Create a document from pages.
    pub fn new(pages: Vec<SourcePage>) -> Self {
        Self {
            metadata: Metadata::default(),
            pages,
        }
    }

    /// Set the document metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Parse a document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a document from any reader producing JSON.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, number: u32) -> Option<&SourcePage> {
        self.pages.iter().find(|p| p.number == number)
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// One decoded page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcePage {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in points
    #[serde(default)]
    pub width: f32,

    /// Page height in points
    #[serde(default)]
    pub height: f32,

    /// Positioned objects in content-stream order
    #[serde(default)]
    pub objects: Vec<RawObject>,
}

impl SourcePage {
    /// Create an empty page.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            objects: Vec::new(),
        }
    }

    /// Add an object to the page.
    pub fn with_object(mut self, object: impl Into<RawObject>) -> Self {
        self.objects.push(object.into());
        self
    }

    /// Add an object to the page.
    pub fn push(&mut self, object: impl Into<RawObject>) {
        self.objects.push(object.into());
    }

    /// Count text runs on the page.
    pub fn text_run_count(&self) -> usize {
        self.objects
            .iter()
            .filter(|o| matches!(o, RawObject::Text(_)))
            .count()
    }

    /// Count image placements on the page.
    pub fn image_count(&self) -> usize {
        self.objects
            .iter()
            .filter(|o| matches!(o, RawObject::Image(_)))
            .count()
    }
}

/// A positioned object on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RawObject {
    /// A run of text in a single font
    Text(RawTextRun),
    /// An image placement
    Image(RawImage),
    /// A link annotation area
    Link(RawLink),
}

impl RawObject {
    /// Bounding box of the object.
    pub fn bbox(&self) -> &BoundingBox {
        match self {
            RawObject::Text(t) => &t.bbox,
            RawObject::Image(i) => &i.bbox,
            RawObject::Link(l) => &l.bbox,
        }
    }
}

impl From<RawTextRun> for RawObject {
    fn from(run: RawTextRun) -> Self {
        RawObject::Text(run)
    }
}

impl From<RawImage> for RawObject {
    fn from(image: RawImage) -> Self {
        RawObject::Image(image)
    }
}

impl From<RawLink> for RawObject {
    fn from(link: RawLink) -> Self {
        RawObject::Link(link)
    }
}

/// A run of text drawn with one font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTextRun {
    /// Decoded text
    pub text: String,

    /// Bounding box; the bottom edge is the baseline
    pub bbox: BoundingBox,

    /// Font size in points
    pub font_size: f32,

    /// Font name (e.g., "Helvetica-Bold")
    #[serde(default)]
    pub font_name: String,

    /// Explicit bold flag, when the decoder knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,

    /// Explicit italic flag, when the decoder knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
}

impl RawTextRun {
    /// Create a text run.
    pub fn new(
        text: impl Into<String>,
        bbox: BoundingBox,
        font_size: f32,
        font_name: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            bbox,
            font_size,
            font_name: font_name.into(),
            bold: None,
            italic: None,
        }
    }

    /// Set an explicit bold flag.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    /// Set an explicit italic flag.
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }
}

/// An image placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawImage {
    /// Placement area
    pub bbox: BoundingBox,

    /// Relative path of the extracted image file
    pub path: String,

    /// Alternative text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,

    /// Image title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl RawImage {
    /// Create an image placement.
    pub fn new(bbox: BoundingBox, path: impl Into<String>) -> Self {
        Self {
            bbox,
            path: path.into(),
            alt: None,
            title: None,
        }
    }

    /// Set the alternative text.
    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// A link annotation area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLink {
    /// Clickable area
    pub bbox: BoundingBox,

    /// Target URL
    pub url: String,
}

impl RawLink {
    /// Create a link area.
    pub fn new(bbox: BoundingBox, url: impl Into<String>) -> Self {
        Self {
            bbox,
            url: url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tagged_objects() {
        let json = r#"{
            "metadata": {"title": "Sample"},
            "pages": [{
                "number": 1, "width": 612, "height": 792,
                "objects": [
                    {"type": "text", "text": "Hello", "bbox": {"x": 72, "y": 60, "width": 30, "height": 12},
                     "font_size": 12, "font_name": "Helvetica"},
                    {"type": "image", "bbox": {"x": 72, "y": 100, "width": 200, "height": 100},
                     "path": "img/a.png", "title": "A"},
                    {"type": "link", "bbox": {"x": 72, "y": 60, "width": 30, "height": 12},
                     "url": "https://example.com"}
                ]
            }]
        }"#;

        let doc = SourceDocument::from_json(json).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.metadata.title.as_deref(), Some("Sample"));

        let page = doc.get_page(1).unwrap();
        assert_eq!(page.objects.len(), 3);
        assert_eq!(page.text_run_count(), 1);
        assert_eq!(page.image_count(), 1);
        assert!(matches!(&page.objects[0], RawObject::Text(t) if t.bold.is_none()));
        assert!(matches!(&page.objects[1], RawObject::Image(i) if i.alt.is_none()));
    }

    #[test]
    fn test_builder() {
        let page = SourcePage::new(2, 612.0, 792.0)
            .with_object(RawTextRun::new(
                "Title",
                BoundingBox::new(72.0, 50.0, 60.0, 24.0),
                24.0,
                "Helvetica",
            ))
            .with_object(RawImage::new(BoundingBox::new(0.0, 0.0, 10.0, 10.0), "x.png"));

        assert_eq!(page.number, 2);
        assert_eq!(page.objects.len(), 2);
        assert_eq!(page.objects[0].bbox().height, 24.0);
    }

    #[test]
    fn test_missing_pages_is_error() {
        assert!(SourceDocument::from_json(r#"{"metadata": {}}"#).is_err());
    }
}
