//! Axis-aligned bounding boxes.
//!
//! These are the canonical geometry values produced by the simulation core
//! and consumed by rendering and collision.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in cell-local coordinates.
///
/// The unit cell spans `[0, 1]` on every axis.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: [f32; 3],
    /// Maximum corner.
    pub max: [f32; 3],
}

impl BoundingBox {
    /// Creates a new bounding box.
    #[inline]
    #[must_use]
    pub const fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    /// Creates a box from a center point and half-extents.
    #[must_use]
    pub fn from_center(center: [f32; 3], half: [f32; 3]) -> Self {
        Self {
            min: [center[0] - half[0], center[1] - half[1], center[2] - half[2]],
            max: [center[0] + half[0], center[1] + half[1], center[2] + half[2]],
        }
    }

    /// Returns the center of the box.
    #[must_use]
    pub fn center(&self) -> [f32; 3] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[2] + self.max[2]) * 0.5,
        ]
    }

    /// Returns the extent of the box along each axis.
    #[must_use]
    pub fn size(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    /// Translates the box by the given vector.
    #[must_use]
    pub fn translate(&self, by: [f32; 3]) -> Self {
        Self {
            min: [self.min[0] + by[0], self.min[1] + by[1], self.min[2] + by[2]],
            max: [self.max[0] + by[0], self.max[1] + by[1], self.max[2] + by[2]],
        }
    }

    /// Returns the smallest box enclosing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: [
                self.min[0].min(other.min[0]),
                self.min[1].min(other.min[1]),
                self.min[2].min(other.min[2]),
            ],
            max: [
                self.max[0].max(other.max[0]),
                self.max[1].max(other.max[1]),
                self.max[2].max(other.max[2]),
            ],
        }
    }

    /// Returns true if the interiors of the two boxes overlap.
    ///
    /// Boxes that merely touch on a face do not intersect.
    #[inline]
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min[0] < other.max[0]
            && other.min[0] < self.max[0]
            && self.min[1] < other.max[1]
            && other.min[1] < self.max[1]
            && self.min[2] < other.max[2]
            && other.min[2] < self.max[2]
    }

    /// Scales the box about its center.
    #[must_use]
    pub fn scale(&self, sx: f32, sy: f32, sz: f32) -> Self {
        let center = self.center();
        let size = self.size();
        let half = [size[0] * 0.5 * sx, size[1] * 0.5 * sy, size[2] * 0.5 * sz];
        Self::from_center(center, half)
    }

    /// Surface area of the box.
    #[must_use]
    pub fn area(&self) -> f32 {
        let [w, h, d] = self.size();
        2.0 * (w * h + h * d + w * d)
    }
}
