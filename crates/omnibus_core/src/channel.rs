//! The channel trait and its small state enums.
//!
//! A channel is one capability-typed routing element living inside a bundle.
//! The bundle never looks inside a channel's transfer logic; it only drives
//! the lifecycle callbacks defined here and aggregates the geometry and
//! connection state each channel reports.

use crate::capability::{EnergyTransfer, FluidTransfer, ItemTransfer};
use crate::geom::CollidableComponent;
use omnibus_shared::{Direction, DirectionSet, GridPos};
use serde::{Deserialize, Serialize};

/// The concrete capability kinds a channel can implement.
///
/// A bundle holds at most one channel per kind.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelKind {
    /// Energy routing.
    Power = 0,
    /// Fluid routing.
    Fluid = 1,
    /// Item routing.
    Item = 2,
    /// Signal routing.
    Signal = 3,
}

impl ChannelKind {
    /// All kinds in canonical order.
    ///
    /// Geometry synthesis iterates kinds in this order so its output never
    /// depends on channel insertion order.
    pub const ALL: [Self; 4] = [Self::Power, Self::Fluid, Self::Item, Self::Signal];

    /// Stable index in `[0, 4)`.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stable name used as the persisted record discriminator.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Fluid => "fluid",
            Self::Item => "item",
            Self::Signal => "signal",
        }
    }

    /// Resolves a persisted discriminator back to a kind.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

/// Per-direction behavior of a channel connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionMode {
    /// Bidirectional transfer.
    #[default]
    Normal,
    /// Only accepts into the channel.
    Input,
    /// Only pushes out of the channel.
    Output,
    /// Connection exists but is switched off.
    Disabled,
}

/// Addressing group for signal channels, dye-style, `0..16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalColor(pub u8);

/// One capability-typed routing element inside a bundle.
///
/// Implementations are free to carry whatever transfer state they like; the
/// bundle only ever drives this surface. All geometry-side methods take
/// `&self` because the render/collision read path may call them concurrently
/// with simulation ticks.
pub trait Channel: Send + Sync {
    /// The capability kind this channel implements.
    fn kind(&self) -> ChannelKind;

    /// The kind used to group this channel's geometry.
    ///
    /// Channels that share a physical footprint with another kind may report
    /// that kind here; everything else keeps the default.
    fn collidable_kind(&self) -> ChannelKind {
        self.kind()
    }

    /// Called after the channel is appended to a bundle.
    ///
    /// `bundle` is the hosting cell's position, the channel's non-owning
    /// back-reference until [`Channel::on_detached`] clears it.
    fn on_attached(&mut self, bundle: GridPos);

    /// Called before the channel is removed from its bundle.
    fn on_detached(&mut self);

    /// Advances the channel by one simulation tick.
    ///
    /// Must not block; the driver runs every channel of every bundle
    /// sequentially inside one tick.
    fn on_world_tick(&mut self, tick: u64);

    /// Called when the hosting cell is unloaded without being removed.
    fn on_unload(&mut self) {}

    /// Called when a neighboring cell changed to the given block type.
    ///
    /// Returns true if the change requires a geometry refresh.
    fn on_neighbor_changed(&mut self, block: u16) -> bool {
        let _ = block;
        false
    }

    /// True if the channel's footprint changed since this was last called.
    ///
    /// This is a self-resetting signal: reading it clears it. Implementations
    /// raise it themselves whenever their connection state or declared
    /// geometry changes, and typically back it with an `AtomicBool` since the
    /// query path holds only `&self`.
    fn footprint_changed_since_last_query(&self) -> bool;

    /// The collidable components this channel declares for itself.
    fn collidable_components(&self) -> Vec<CollidableComponent>;

    /// Directions on which this channel connects to a channel in a
    /// neighboring bundle.
    fn connection_directions(&self) -> DirectionSet;

    /// Directions on which this channel connects to a non-bundle neighbor.
    fn external_connections(&self) -> DirectionSet;

    /// The connection mode for the given direction.
    fn connection_mode(&self, dir: Direction) -> ConnectionMode;

    /// Returns true if the channel has any connection at all.
    fn has_connections(&self) -> bool {
        !self.connection_directions().is_empty() || !self.external_connections().is_empty()
    }

    /// Energy capability seam; channels that route power override this.
    fn as_energy(&self) -> Option<&dyn EnergyTransfer> {
        None
    }

    /// Mutable energy capability seam.
    fn as_energy_mut(&mut self) -> Option<&mut dyn EnergyTransfer> {
        None
    }

    /// Fluid capability seam; channels that route fluids override this.
    fn as_fluid(&self) -> Option<&dyn FluidTransfer> {
        None
    }

    /// Mutable fluid capability seam.
    fn as_fluid_mut(&mut self) -> Option<&mut dyn FluidTransfer> {
        None
    }

    /// Item capability seam; channels that route items override this.
    fn as_item(&self) -> Option<&dyn ItemTransfer> {
        None
    }

    /// Mutable item capability seam.
    fn as_item_mut(&mut self) -> Option<&mut dyn ItemTransfer> {
        None
    }
}
