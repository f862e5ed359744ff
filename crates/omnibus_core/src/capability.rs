//! Capability protocols a bundle exposes to its neighbors.
//!
//! Neighbors talk to a bundle exactly as they would to any other node: they
//! see these traits, never the channels behind them. The bundle forwards
//! each call to its matching channel, or answers with the protocol's no-op
//! result when no such channel is present (a bundle without a fluid channel
//! is indistinguishable from a plain node without one).

use omnibus_shared::Direction;
use serde::{Deserialize, Serialize};

/// Identifier for a fluid type.
pub type FluidId = u32;

/// Identifier for an item type.
pub type ItemId = u32;

/// A quantity of one fluid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FluidStack {
    /// The fluid type.
    pub fluid: FluidId,
    /// Amount in millibuckets.
    pub amount: u32,
}

impl FluidStack {
    /// Creates a new fluid stack.
    #[inline]
    #[must_use]
    pub const fn new(fluid: FluidId, amount: u32) -> Self {
        Self { fluid, amount }
    }
}

/// A quantity of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// The item type.
    pub item: ItemId,
    /// Stack size.
    pub quantity: u32,
}

impl ItemStack {
    /// Creates a new item stack.
    #[inline]
    #[must_use]
    pub const fn new(item: ItemId, quantity: u32) -> Self {
        Self { item, quantity }
    }
}

/// Contents and capacity of one internal tank, as seen from a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TankInfo {
    /// Current contents, if any.
    pub contents: Option<FluidStack>,
    /// Total capacity in millibuckets.
    pub capacity: u32,
}

/// Energy transfer protocol.
pub trait EnergyTransfer {
    /// Offers up to `max_amount` energy from `from`; returns the amount
    /// accepted. With `simulate` set, state must not change.
    fn receive(&mut self, from: Direction, max_amount: u32, simulate: bool) -> u32;

    /// Requests up to `max_amount` energy toward `from`; returns the amount
    /// provided. With `simulate` set, state must not change.
    fn extract(&mut self, from: Direction, max_amount: u32, simulate: bool) -> u32;

    /// Energy currently stored, as visible from `from`.
    fn stored(&self, from: Direction) -> u32;

    /// Maximum energy storable, as visible from `from`.
    fn capacity(&self, from: Direction) -> u32;

    /// True if energy can flow across the `from` face at all.
    fn can_interface(&self, from: Direction) -> bool;
}

/// Fluid transfer protocol.
pub trait FluidTransfer {
    /// Offers `resource` from `from`; returns the amount accepted.
    /// With `do_fill` unset, state must not change.
    fn fill(&mut self, from: Direction, resource: FluidStack, do_fill: bool) -> u32;

    /// Drains up to `resource.amount` of exactly `resource.fluid` toward
    /// `from`; returns what was drained, if anything.
    fn drain_resource(
        &mut self,
        from: Direction,
        resource: FluidStack,
        do_drain: bool,
    ) -> Option<FluidStack>;

    /// Drains up to `max_amount` of whatever is available toward `from`.
    fn drain_amount(&mut self, from: Direction, max_amount: u32, do_drain: bool)
        -> Option<FluidStack>;

    /// True if `fluid` can be inserted across the `from` face.
    fn can_fill(&self, from: Direction, fluid: FluidId) -> bool;

    /// True if `fluid` can be extracted across the `from` face.
    fn can_drain(&self, from: Direction, fluid: FluidId) -> bool;

    /// Describes the tanks visible from `from`.
    fn tank_info(&self, from: Direction) -> Vec<TankInfo>;
}

/// Item transfer protocol.
pub trait ItemTransfer {
    /// Offers `stack` from `from`; returns the part that was not accepted.
    /// With `simulate` set, state must not change.
    fn insert(&mut self, from: Direction, stack: ItemStack, simulate: bool) -> ItemStack;

    /// Routes `stack` into the network, preferring `preferred` when given;
    /// returns the part that could not be routed.
    fn send(&mut self, stack: ItemStack, preferred: Option<Direction>) -> ItemStack;
}
