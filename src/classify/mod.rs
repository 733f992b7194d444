//! Structure classification.
//!
//! Assigns each positioned block a role (heading, paragraph, list item,
//! table cell, image) from font statistics, list markers and alignment.

mod classifier;
mod font_stats;
pub(crate) mod markers;
mod options;
mod table_detector;

pub use classifier::StructureClassifier;
pub use font_stats::{canonical_heading_size, FontStatistics, CANONICAL_BODY_SIZE};
pub use markers::{parse_marker, ListMarker, MarkerKind, BULLET_GLYPHS};
pub use options::ClassifyOptions;
pub use table_detector::{DetectedTable, TableDetector, TableDetectorConfig};
