//! Positional offsets for channels sharing a crowded direction.
//!
//! When two or more channels connect on the same direction, each is
//! displaced to its own fixed slot perpendicular to the connection axis so
//! their geometry does not stack in the cell center. The slot assignment is
//! a constant table per (kind, axis): the same channel set always lands in
//! the same arrangement, regardless of insertion order.

use crate::channel::ChannelKind;
use omnibus_shared::{constants::OFFSET_SCALE, Axis};

/// A positional offset, in slot units.
///
/// Multiply by [`OFFSET_SCALE`] to get cell-local coordinates; see
/// [`Offset::as_vec`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Offset {
    /// Slot steps along X.
    pub x: i8,
    /// Slot steps along Y.
    pub y: i8,
    /// Slot steps along Z.
    pub z: i8,
}

impl Offset {
    /// No displacement.
    pub const NONE: Self = Self::new(0, 0, 0);

    /// Creates an offset from slot steps.
    #[inline]
    #[must_use]
    pub const fn new(x: i8, y: i8, z: i8) -> Self {
        Self { x, y, z }
    }

    /// The offset as a cell-local translation vector.
    #[must_use]
    pub fn as_vec(self) -> [f32; 3] {
        [
            f32::from(self.x) * OFFSET_SCALE,
            f32::from(self.y) * OFFSET_SCALE,
            f32::from(self.z) * OFFSET_SCALE,
        ]
    }
}

/// The fixed slot for a channel kind on connections along the given axis.
///
/// `axis` is the connection axis; the returned offset is perpendicular to
/// it. `None` is the undirected slot used for a channel's free-standing
/// core in a crowded bundle.
#[must_use]
pub const fn offset_for(kind: ChannelKind, axis: Option<Axis>) -> Offset {
    match axis {
        Some(Axis::X) => match kind {
            ChannelKind::Power => Offset::new(0, 1, 0),
            ChannelKind::Fluid => Offset::new(0, -1, 0),
            ChannelKind::Item => Offset::new(0, 0, 1),
            ChannelKind::Signal => Offset::new(0, 0, -1),
        },
        Some(Axis::Y) => match kind {
            ChannelKind::Power => Offset::new(1, 0, 0),
            ChannelKind::Fluid => Offset::new(-1, 0, 0),
            ChannelKind::Item => Offset::new(0, 0, 1),
            ChannelKind::Signal => Offset::new(0, 0, -1),
        },
        Some(Axis::Z) | None => match kind {
            ChannelKind::Power => Offset::new(1, 0, 0),
            ChannelKind::Fluid => Offset::new(-1, 0, 0),
            ChannelKind::Item => Offset::new(0, 1, 0),
            ChannelKind::Signal => Offset::new(0, -1, 0),
        },
    }
}
