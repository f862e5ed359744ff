//! Grid events emitted by the simulation core.
//!
//! Bundles do not talk to the world directly; they push events into a
//! channel the hosting driver drains once per tick. The driver decides what
//! a block update or a light recalculation actually means for its world.

use crate::grid::GridPos;
use serde::{Deserialize, Serialize};

/// An event raised by a bundle for the hosting world to service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridEvent {
    /// The cell's replicated/rendered state changed; rebroadcast it.
    BlockUpdate {
        /// Cell that changed.
        position: GridPos,
    },

    /// The cell's light transmission changed; recompute lighting around it.
    LightRecalc {
        /// Cell that changed.
        position: GridPos,
    },
}

impl GridEvent {
    /// Returns the position this event occurred at.
    #[must_use]
    pub const fn position(&self) -> GridPos {
        match self {
            Self::BlockUpdate { position } | Self::LightRecalc { position } => *position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_position() {
        let event = GridEvent::LightRecalc {
            position: GridPos::new(4, 5, 6),
        };
        assert_eq!(event.position(), GridPos::new(4, 5, 6));
    }
}
