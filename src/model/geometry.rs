//! Page-space geometry.
//!
//! Coordinates use a top-left origin with `y` growing downward, in points.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width in points
    pub width: f32,
    /// Height in points
    pub height: f32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge (the baseline for text runs).
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Check that every coordinate is finite and the extent is not negative.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width >= 0.0
            && self.height >= 0.0
    }

    /// Horizontal distance between the right edge of `self` and the left
    /// edge of `other`. Negative when they overlap.
    pub fn hgap(&self, other: &BoundingBox) -> f32 {
        other.x - self.right()
    }

    /// Vertical distance between the bottom of `self` and the top of `other`.
    pub fn vgap(&self, other: &BoundingBox) -> f32 {
        other.y - self.bottom()
    }

    /// Length of the horizontal overlap with `other` (0 when disjoint).
    pub fn hoverlap(&self, other: &BoundingBox) -> f32 {
        (self.right().min(other.right()) - self.x.max(other.x)).max(0.0)
    }

    /// Check if the horizontal extents overlap.
    pub fn is_hoverlap(&self, other: &BoundingBox) -> bool {
        self.x <= other.right() && other.x <= self.right()
    }

    /// Check if the vertical extents overlap.
    pub fn is_voverlap(&self, other: &BoundingBox) -> bool {
        self.y <= other.bottom() && other.y <= self.bottom()
    }

    /// Check if `self` fully covers `other` within `tolerance` points.
    pub fn covers(&self, other: &BoundingBox, tolerance: f32) -> bool {
        self.x - tolerance <= other.x
            && self.y - tolerance <= other.y
            && self.right() + tolerance >= other.right()
            && self.bottom() + tolerance >= other.bottom()
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BoundingBox::new(x, y, right - x, bottom - y)
    }
}
