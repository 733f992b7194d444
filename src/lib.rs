//! # pagemark
//!
//! Structure-preserving conversion of decoded PDF pages to Markdown.
//!
//! Pages arrive as positioned objects (text runs, image placements, link
//! areas) decoded by an upstream PDF reader. Three stages turn them into
//! Markdown:
//!
//! 1. **Layout extraction** orders the objects into reading order and merges
//!    fragments of one line into positioned blocks.
//! 2. **Structure classification** assigns each block a role (heading,
//!    paragraph, list item, table cell, image) from font statistics and
//!    geometry.
//! 3. **Markdown emission** writes the classified blocks with the matching
//!    Markdown syntax.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pagemark::convert_file;
//!
//! fn main() -> pagemark::Result<()> {
//!     let result = convert_file("document.json")?;
//!     println!("{}", result.content);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Headings** from font size statistics and short bold lines
//! - **Lists** with nesting and ordered numbering continuity
//! - **Tables** from aligned blocks, written as pipe tables
//! - **Images and links** carried through to Markdown syntax
//! - **CJK support**: no spaces inserted between spaceless-script fragments
//! - **Parallel processing**: pages are handled with Rayon
//! - **Round-trip checks**: emitted Markdown re-classifies to the same blocks

pub mod classify;
pub mod convert;
pub mod detect;
pub mod error;
pub mod layout;
pub mod model;
pub mod render;
pub mod roundtrip;

// Re-export commonly used types
pub use classify::{ClassifyOptions, FontStatistics, StructureClassifier};
pub use convert::{ClassifiedDocument, ConversionReport, ConvertOptions, ConvertResult, Converter};
pub use detect::{detect_format, load_document, load_file, InputFormat};
pub use error::{Error, Result};
pub use layout::{ExtractOptions, LayoutExtractor};
pub use model::{
    BoundingBox, ClassifiedBlock, ImageReference, ListKind, Metadata, PageClassification,
    PositionedBlock, RawImage, RawLink, RawObject, RawTextRun, Role, SourceDocument, SourcePage,
    TableGrid,
};
pub use render::{
    JsonFormat, MarkdownEmitter, PageSelection, PageSeparator, RenderOptions, TableHeader,
};
pub use roundtrip::{RoundTripReport, RoundTripVerifier};

use std::path::Path;

/// Convert a decoded document to Markdown with default options.
///
/// # Example
///
/// ```no_run
/// use pagemark::{load_file, to_markdown};
///
/// let document = load_file("document.json").unwrap();
/// let markdown = to_markdown(&document).unwrap();
/// std::fs::write("output.md", markdown).unwrap();
/// ```
pub fn to_markdown(document: &SourceDocument) -> Result<String> {
    Ok(Converter::default().convert(document)?.content)
}

/// Convert a decoded document to Markdown with custom options.
pub fn to_markdown_with_options(
    document: &SourceDocument,
    options: ConvertOptions,
) -> Result<String> {
    Ok(Converter::new(options).convert(document)?.content)
}

/// Read a page stream file and convert it to Markdown.
///
/// # Arguments
///
/// * `path` - Path to a JSON document, page array or JSON Lines file
pub fn convert_file<P: AsRef<Path>>(path: P) -> Result<ConvertResult> {
    let document = load_file(path)?;
    Converter::default().convert(&document)
}

/// Classify a decoded document and serialize the result as JSON.
///
/// # Example
///
/// ```no_run
/// use pagemark::{load_file, to_json, JsonFormat};
///
/// let document = load_file("document.json").unwrap();
/// let json = to_json(&document, JsonFormat::Pretty).unwrap();
/// println!("{}", json);
/// ```
pub fn to_json(document: &SourceDocument, format: JsonFormat) -> Result<String> {
    let classified = Converter::default().classify(document)?;
    render::to_json(&classified, format)
}

/// Builder for converting decoded documents.
///
/// # Example
///
/// ```no_run
/// use pagemark::{PageSeparator, Pagemark};
///
/// let markdown = Pagemark::new()
///     .with_frontmatter()
///     .with_image_prefix("assets/")
///     .with_page_separator(PageSeparator::Rule)
///     .convert_file("document.json")?
///     .content;
/// # Ok::<(), pagemark::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pagemark {
    options: ConvertOptions,
}

impl Pagemark {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set layout extraction options.
    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.options = self.options.with_extract_options(options);
        self
    }

    /// Set classification options.
    pub fn with_classify_options(mut self, options: ClassifyOptions) -> Self {
        self.options = self.options.with_classify_options(options);
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.options = self.options.with_render_options(options);
        self
    }

    /// Enable YAML frontmatter in output.
    pub fn with_frontmatter(mut self) -> Self {
        self.options.render = self.options.render.with_frontmatter(true);
        self
    }

    /// Prefix image paths in output.
    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.render = self.options.render.with_image_prefix(prefix);
        self
    }

    /// Set how pages are separated.
    pub fn with_page_separator(mut self, separator: PageSeparator) -> Self {
        self.options.render = self.options.render.with_page_separator(separator);
        self
    }

    /// Set how table header rows are written.
    pub fn with_table_header(mut self, header: TableHeader) -> Self {
        self.options.render = self.options.render.with_table_header(header);
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.options = self.options.with_pages(pages);
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Get the accumulated options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Build the converter.
    pub fn build(self) -> Converter {
        Converter::new(self.options)
    }

    /// Convert a decoded document.
    pub fn convert(self, document: &SourceDocument) -> Result<ConvertResult> {
        self.build().convert(document)
    }

    /// Parse and convert a page stream string.
    pub fn convert_str(self, text: &str) -> Result<ConvertResult> {
        let document = load_document(text)?;
        self.convert(&document)
    }

    /// Read and convert a page stream file.
    pub fn convert_file<P: AsRef<Path>>(self, path: P) -> Result<ConvertResult> {
        let document = load_file(path)?;
        self.convert(&document)
    }
}
