//! Document-wide font size statistics for heading detection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::PositionedBlock;

/// Body font size of the canonical typesetting profile.
pub const CANONICAL_BODY_SIZE: f32 = 12.0;

/// Font size the canonical profile uses for a heading level (level 1 = 24pt,
/// level 6 = 14pt).
pub fn canonical_heading_size(level: u8) -> f32 {
    let level = level.clamp(1, 6);
    CANONICAL_BODY_SIZE + 2.0 * (7 - level) as f32
}

/// Font statistics for heading detection.
///
/// Gathered once per document before classification and shared read-only
/// across pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontStatistics {
    /// Body text font size (most common, weighted by characters)
    pub body_size: f32,
    /// Font sizes large enough to be headings, largest first
    pub heading_sizes: Vec<f32>,
    /// Minimum distance above the body size for a heading
    pub heading_min_delta: f32,
    /// Character counts per size, keyed by tenths of a point
    size_histogram: BTreeMap<i32, usize>,
}

impl FontStatistics {
    /// Create empty statistics with the given heading threshold.
    pub fn new(heading_min_delta: f32) -> Self {
        Self {
            body_size: CANONICAL_BODY_SIZE,
            heading_sizes: Vec::new(),
            heading_min_delta,
            size_histogram: BTreeMap::new(),
        }
    }

    /// Statistics of the canonical typesetting profile: 12pt body and one
    /// size per heading level.
    pub fn canonical() -> Self {
        let mut stats = Self::new(1.5);
        stats.add_size(CANONICAL_BODY_SIZE, 1000);
        for level in 1..=6 {
            stats.add_size(canonical_heading_size(level), 1);
        }
        stats.analyze();
        stats
    }

    /// Gather statistics from blocks and analyze them.
    pub fn from_blocks<'a>(
        blocks: impl IntoIterator<Item = &'a PositionedBlock>,
        heading_min_delta: f32,
    ) -> Self {
        let mut stats = Self::new(heading_min_delta);
        for block in blocks {
            stats.add_block(block);
        }
        stats.analyze();
        stats
    }

    /// Add a font size observation weighted by character count.
    pub fn add_size(&mut self, size: f32, chars: usize) {
        if !size.is_finite() || size <= 0.0 || chars == 0 {
            return;
        }
        let key = (size * 10.0).round() as i32;
        *self.size_histogram.entry(key).or_insert(0) += chars;
    }

    /// Add a text block's size. Images are ignored.
    pub fn add_block(&mut self, block: &PositionedBlock) {
        if let Some(font) = block.font() {
            self.add_size(font.size, block.char_count());
        }
    }

    /// Merge another histogram into this one. Call `analyze` afterwards.
    pub fn merge(&mut self, other: &FontStatistics) {
        for (key, count) in &other.size_histogram {
            *self.size_histogram.entry(*key).or_insert(0) += count;
        }
    }

    /// Check if any size was observed.
    pub fn is_empty(&self) -> bool {
        self.size_histogram.is_empty()
    }

    /// Calculate body size and heading sizes.
    pub fn analyze(&mut self) {
        let Some((&body_key, _)) = self
            .size_histogram
            .iter()
            // most characters; smaller size on ties
            .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then(kb.cmp(ka)))
        else {
            self.body_size = CANONICAL_BODY_SIZE;
            self.heading_sizes.clear();
            return;
        };
        self.body_size = body_key as f32 / 10.0;

        let threshold = self.body_size + self.heading_min_delta;
        self.heading_sizes = self
            .size_histogram
            .keys()
            .rev()
            .map(|k| *k as f32 / 10.0)
            .filter(|size| *size >= threshold - 0.01)
            .collect();

        log::debug!(
            "FontStatistics: body={:.1}pt, heading sizes={:?}",
            self.body_size,
            self.heading_sizes
        );
    }

    /// Check if a size is large enough to be a heading.
    pub fn is_heading_size(&self, font_size: f32) -> bool {
        font_size >= self.body_size + self.heading_min_delta - 0.01
    }

    /// Heading level for a font size (1 = largest), or `None` for body text.
    pub fn heading_level(&self, font_size: f32) -> Option<u8> {
        if !self.is_heading_size(font_size) {
            return None;
        }

        // Sizes are ranked largest first
        for (i, &heading_size) in self.heading_sizes.iter().enumerate() {
            if font_size >= heading_size - 0.5 {
                return Some((i + 1).min(u8::MAX as usize) as u8);
            }
        }

        // Larger than body but below every known heading size
        Some(self.heading_sizes.len().clamp(1, u8::MAX as usize) as u8)
    }

    /// Level one below the smallest size-based heading level, for headings
    /// recognized by weight at body size.
    pub fn emphasis_heading_level(&self) -> u8 {
        (self.heading_sizes.len() + 1).min(6) as u8
    }
}

impl Default for FontStatistics {
    fn default() -> Self {
        Self::new(1.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_statistics() {
        let mut stats = FontStatistics::default();
        stats.add_size(12.0, 5000);
        stats.add_size(18.0, 40);
        stats.add_size(24.0, 20);
        stats.add_size(12.5, 30);
        stats.analyze();

        assert_eq!(stats.body_size, 12.0);
        assert_eq!(stats.heading_sizes, vec![24.0, 18.0]);
        assert_eq!(stats.heading_level(24.0), Some(1));
        assert_eq!(stats.heading_level(18.0), Some(2));
        assert_eq!(stats.heading_level(12.5), None);
        assert_eq!(stats.heading_level(12.0), None);
        assert_eq!(stats.emphasis_heading_level(), 3);
    }

    #[test]
    fn test_body_size_weighted_by_characters() {
        let mut stats = FontStatistics::default();
        // Many short headings, one long paragraph
        for _ in 0..10 {
            stats.add_size(16.0, 10);
        }
        stats.add_size(10.0, 2000);
        stats.analyze();

        assert_eq!(stats.body_size, 10.0);
        assert_eq!(stats.heading_level(16.0), Some(1));
    }

    #[test]
    fn test_empty_statistics() {
        let mut stats = FontStatistics::default();
        stats.analyze();
        assert_eq!(stats.body_size, CANONICAL_BODY_SIZE);
        assert!(stats.heading_sizes.is_empty());
        assert_eq!(stats.emphasis_heading_level(), 1);
    }

    #[test]
    fn test_canonical_profile() {
        let stats = FontStatistics::canonical();
        assert_eq!(stats.body_size, 12.0);
        assert_eq!(stats.heading_sizes.len(), 6);
        for level in 1..=6u8 {
            assert_eq!(stats.heading_level(canonical_heading_size(level)), Some(level));
        }
        assert_eq!(stats.heading_level(12.0), None);
    }

    #[test]
    fn test_merge() {
        let mut a = FontStatistics::default();
        a.add_size(11.0, 100);
        let mut b = FontStatistics::default();
        b.add_size(11.0, 100);
        b.add_size(9.0, 150);

        a.merge(&b);
        a.analyze();
        assert_eq!(a.body_size, 11.0);
    }
}
