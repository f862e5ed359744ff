//! Collidable component values.

use crate::channel::{ChannelKind, SignalColor};
use omnibus_shared::{BoundingBox, Direction};

/// What role a collidable component plays in the bundle's geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectorKind {
    /// A channel's own core geometry.
    Core,
    /// A synthesized junction box joining channel cores inside the cell.
    Internal,
    /// A synthesized port box on a face with an external connection.
    External,
}

/// Opaque payload a channel may attach to one of its components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentMarker {
    /// Marks a signal channel's addressing overlay for one color group.
    ///
    /// Overlay parts are decoration on top of the structural geometry; the
    /// collision test in connector synthesis ignores them.
    ColorGroup(SignalColor),
}

/// One immutable piece of a bundle's collision/render geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollidableComponent {
    /// The box itself, in cell-local coordinates.
    pub bounds: BoundingBox,
    /// Facing direction, if the component has one.
    pub direction: Option<Direction>,
    /// Role of this component.
    pub connector: ConnectorKind,
    /// Owning channel kind; synthesized junctions and ports have none.
    pub kind: Option<ChannelKind>,
    /// Optional channel-attached payload.
    pub marker: Option<ComponentMarker>,
}

impl CollidableComponent {
    /// Creates a component without a marker.
    #[must_use]
    pub const fn new(
        bounds: BoundingBox,
        direction: Option<Direction>,
        connector: ConnectorKind,
        kind: Option<ChannelKind>,
    ) -> Self {
        Self {
            bounds,
            direction,
            connector,
            kind,
            marker: None,
        }
    }

    /// Attaches a marker to the component.
    #[must_use]
    pub const fn with_marker(mut self, marker: ComponentMarker) -> Self {
        self.marker = Some(marker);
        self
    }
}
