//! Rendering options and configuration.

use std::ops::RangeInclusive;

use crate::error::{Error, Result};

/// Options for rendering classified pages.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Prefix for image paths in output (e.g., "./images/")
    pub image_path_prefix: String,

    /// Include YAML frontmatter with metadata
    pub include_frontmatter: bool,

    /// Which table row becomes the Markdown header row
    pub table_header: TableHeader,

    /// Pad table cells so columns line up in the source text
    pub pad_tables: bool,

    /// What goes between pages
    pub page_separator: PageSeparator,

    /// Character to use for unordered list markers
    pub list_marker: char,

    /// Escape special Markdown characters
    pub escape_special_chars: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options whose output re-parses to the same structure: no path
    /// prefix, no frontmatter, escaping on.
    pub fn roundtrip() -> Self {
        Self::default()
    }

    /// Set the image path prefix.
    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.image_path_prefix = prefix.into();
        self
    }

    /// Enable or disable frontmatter.
    pub fn with_frontmatter(mut self, include: bool) -> Self {
        self.include_frontmatter = include;
        self
    }

    /// Set the table header mode.
    pub fn with_table_header(mut self, header: TableHeader) -> Self {
        self.table_header = header;
        self
    }

    /// Enable or disable table column padding.
    pub fn with_padded_tables(mut self, pad: bool) -> Self {
        self.pad_tables = pad;
        self
    }

    /// Set the page separator.
    pub fn with_page_separator(mut self, separator: PageSeparator) -> Self {
        self.page_separator = separator;
        self
    }

    /// Set the unordered list marker (`-`, `*` or `+`).
    pub fn with_list_marker(mut self, marker: char) -> Self {
        if matches!(marker, '-' | '*' | '+') {
            self.list_marker = marker;
        }
        self
    }

    /// Enable or disable escaping.
    pub fn with_escaping(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            image_path_prefix: String::new(),
            include_frontmatter: false,
            table_header: TableHeader::FirstRow,
            pad_tables: false,
            page_separator: PageSeparator::Blank,
            list_marker: '-',
            escape_special_chars: true,
        }
    }
}

/// Which row of a detected table is the Markdown header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableHeader {
    /// The first grid row is the header
    #[default]
    FirstRow,
    /// An empty header row is emitted and every grid row is data
    Synthesized,
}

/// Separator emitted between pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSeparator {
    /// A blank line
    #[default]
    Blank,
    /// A thematic break (`---`)
    Rule,
    /// An HTML comment naming the next page (`<!-- page 2 -->`)
    Comment,
}

/// Page selection for conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// All pages
    #[default]
    All,
    /// A range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        // Simple range (e.g., "1-10")
        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let (start, end) = parse_range(s, start, end)?;
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let (start, end) = parse_range(s, start, end)?;
                pages.extend(start..=end);
            } else {
                pages.push(parse_page(s, part)?);
            }
        }

        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }
}

fn parse_page(input: &str, part: &str) -> Result<u32> {
    match part.trim().parse::<u32>() {
        Ok(page) if page > 0 => Ok(page),
        _ => Err(Error::InvalidPageRange(format!(
            "'{}' in '{}' is not a page number",
            part.trim(),
            input
        ))),
    }
}

fn parse_range(input: &str, start: &str, end: &str) -> Result<(u32, u32)> {
    let start = parse_page(input, start)?;
    let end = parse_page(input, end)?;
    if start > end {
        return Err(Error::InvalidPageRange(format!(
            "range {}-{} in '{}' is reversed",
            start, end, input
        )));
    }
    Ok((start, end))
}
