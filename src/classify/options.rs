//! Classification options.

use super::TableDetectorConfig;

/// Options for structure classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifyOptions {
    /// Minimum size above body text for a heading (points)
    pub heading_min_delta: f32,

    /// Deepest heading level to emit; deeper levels are clamped
    pub max_heading_level: u8,

    /// Heading-sized lines longer than this are not headings
    pub max_heading_chars: usize,

    /// Treat short bold lines at body size as headings
    pub bold_headings: bool,

    /// Longest bold line treated as a heading
    pub bold_heading_max_chars: usize,

    /// Indentation difference (points) that still counts as the same list level
    pub list_indent_tolerance: f32,

    /// Merge continuation lines of paragraphs, headings and list items
    pub merge_lines: bool,

    /// Largest vertical gap (x font size) between continuation lines
    pub line_gap_ratio: f32,

    /// Largest left-edge shift (points) between continuation lines
    pub continuation_indent: f32,

    /// Detect tables
    pub detect_tables: bool,

    /// Table detector configuration
    pub table: TableDetectorConfig,
}

impl ClassifyOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the heading threshold.
    pub fn with_heading_min_delta(mut self, delta: f32) -> Self {
        self.heading_min_delta = delta;
        self
    }

    /// Set the deepest heading level.
    pub fn with_max_heading_level(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 6);
        self
    }

    /// Enable or disable bold heading inference.
    pub fn with_bold_headings(mut self, enabled: bool) -> Self {
        self.bold_headings = enabled;
        self
    }

    /// Enable or disable continuation line merging.
    pub fn with_merge_lines(mut self, enabled: bool) -> Self {
        self.merge_lines = enabled;
        self
    }

    /// Enable or disable table detection.
    pub fn with_tables(mut self, enabled: bool) -> Self {
        self.detect_tables = enabled;
        self
    }

    /// Set the table detector configuration.
    pub fn with_table_config(mut self, config: TableDetectorConfig) -> Self {
        self.table = config;
        self
    }
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            heading_min_delta: 1.5,
            max_heading_level: 6,
            max_heading_chars: 200,
            bold_headings: true,
            bold_heading_max_chars: 80,
            list_indent_tolerance: 6.0,
            merge_lines: true,
            line_gap_ratio: 0.5,
            continuation_indent: 20.0,
            detect_tables: true,
            table: TableDetectorConfig::default(),
        }
    }
}
