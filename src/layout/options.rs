//! Layout extraction options.

/// Options controlling how raw objects become positioned blocks.
///
/// Ratios are multiplied by the font size of the run being considered.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// Baseline distance (x font size) within which objects share a line band
    pub band_tolerance_ratio: f32,

    /// Maximum horizontal gap (x font size) for merging same-font runs
    pub merge_gap_ratio: f32,

    /// Gap (x average character width) above which a space is inserted
    pub word_space_ratio: f32,

    /// Maximum gap (x font size) between a bare list marker and its text
    pub marker_gap_ratio: f32,

    /// Slack in points when testing whether a link area covers a block
    pub link_tolerance: f32,

    /// Font size assumed for images when grouping bands
    pub default_font_size: f32,
}

impl ExtractOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the band tolerance ratio.
    pub fn with_band_tolerance(mut self, ratio: f32) -> Self {
        self.band_tolerance_ratio = ratio;
        self
    }

    /// Set the merge gap ratio.
    pub fn with_merge_gap(mut self, ratio: f32) -> Self {
        self.merge_gap_ratio = ratio;
        self
    }

    /// Set the marker gap ratio.
    pub fn with_marker_gap(mut self, ratio: f32) -> Self {
        self.marker_gap_ratio = ratio;
        self
    }

    /// Set the word space ratio.
    pub fn with_word_space(mut self, ratio: f32) -> Self {
        self.word_space_ratio = ratio;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            band_tolerance_ratio: 0.3,
            merge_gap_ratio: 1.0,
            word_space_ratio: 0.2,
            marker_gap_ratio: 2.5,
            link_tolerance: 1.0,
            default_font_size: 12.0,
        }
    }
}
