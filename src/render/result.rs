//! Rendering result with metadata and statistics.

use crate::model::Metadata;
use serde::{Deserialize, Serialize};

/// Result of rendering a document, including content and statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    /// The rendered Markdown
    pub content: String,

    /// Document metadata (copied from source document)
    pub metadata: Metadata,

    /// Emission statistics
    pub stats: EmissionStats,
}

impl RenderResult {
    /// Create a new render result.
    pub fn new(content: String, metadata: Metadata, stats: EmissionStats) -> Self {
        Self {
            content,
            metadata,
            stats,
        }
    }

    /// Get the content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Markdown of a single page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageMarkdown {
    /// Page number (1-indexed)
    pub page: u32,
    /// Markdown text, each block ending in a newline
    pub markdown: String,
    /// Counts for this page
    pub stats: EmissionStats,
}

/// Statistics collected during emission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionStats {
    /// Number of pages emitted
    pub page_count: u32,

    /// Number of pages skipped because extraction failed
    pub skipped_pages: u32,

    /// Number of headings
    pub heading_count: u32,

    /// Number of paragraphs
    pub paragraph_count: u32,

    /// Number of list items
    pub list_item_count: u32,

    /// Number of tables
    pub table_count: u32,

    /// Number of images
    pub image_count: u32,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: u32,

    /// Character count (excluding whitespace)
    pub char_count: u32,
}

impl EmissionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment page count.
    pub fn add_page(&mut self) {
        self.page_count += 1;
    }

    /// Increment skipped page count.
    pub fn add_skipped_page(&mut self) {
        self.skipped_pages += 1;
    }

    /// Increment heading count.
    pub fn add_heading(&mut self) {
        self.heading_count += 1;
    }

    /// Increment paragraph count.
    pub fn add_paragraph(&mut self) {
        self.paragraph_count += 1;
    }

    /// Increment list item count.
    pub fn add_list_item(&mut self) {
        self.list_item_count += 1;
    }

    /// Increment table count.
    pub fn add_table(&mut self) {
        self.table_count += 1;
    }

    /// Increment image count.
    pub fn add_image(&mut self) {
        self.image_count += 1;
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count() as u32;
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &EmissionStats) {
        self.page_count += other.page_count;
        self.skipped_pages += other.skipped_pages;
        self.heading_count += other.heading_count;
        self.paragraph_count += other.paragraph_count;
        self.list_item_count += other.list_item_count;
        self.table_count += other.table_count;
        self.image_count += other.image_count;
        self.word_count += other.word_count;
        self.char_count += other.char_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emission_stats_count_text() {
        let mut stats = EmissionStats::new();
        stats.count_text("Hello, world! This is a test.");

        assert_eq!(stats.word_count, 6);
        assert_eq!(stats.char_count, 24);
    }

    #[test]
    fn test_emission_stats_merge() {
        let mut stats1 = EmissionStats::new();
        stats1.paragraph_count = 5;
        stats1.table_count = 2;

        let stats2 = EmissionStats {
            paragraph_count: 3,
            table_count: 1,
            image_count: 4,
            skipped_pages: 1,
            ..Default::default()
        };

        stats1.merge(&stats2);

        assert_eq!(stats1.paragraph_count, 8);
        assert_eq!(stats1.table_count, 3);
        assert_eq!(stats1.image_count, 4);
        assert_eq!(stats1.skipped_pages, 1);
    }
}
