//! # The Bundle Container
//!
//! A bundle is one grid cell hosting up to one channel per capability kind.
//! It owns channel lifecycle, aggregates their dirty signals into layered
//! caches, synthesizes connector geometry on demand, and forwards capability
//! protocol calls to whichever contained channel implements them.
//!
//! ## Replication model
//!
//! The SERVER side is authoritative: only it may mutate the channel set.
//! A CLIENT bundle is a passive replica; structural calls on it are silent
//! no-ops so that replication races resolve harmlessly.
//!
//! ## Cache discipline
//!
//! Geometry caches are snapshots (`Arc<[CollidableComponent]>`) swapped
//! wholesale under a lock scoped strictly to the swap. A concurrent reader
//! on the render/collision path always observes either the previous
//! complete snapshot or the next one, never a cleared-but-unbuilt state.

use crate::channel::{Channel, ChannelKind};
use crate::capability::{
    EnergyTransfer, FluidId, FluidStack, FluidTransfer, ItemStack, ItemTransfer, TankInfo,
};
use crate::config::SimConfig;
use crate::geom::offset::Offset;
use crate::geom::synthesis;
use crate::geom::{CollidableComponent, GeometryCache};
use crossbeam_channel::Sender;
use omnibus_shared::{Direction, DirectionSet, GridEvent, GridPos, Side};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Fully opaque light opacity.
pub const LIGHT_OPAQUE: u8 = 255;

/// Fully transparent light opacity.
pub const LIGHT_TRANSPARENT: u8 = 0;

/// An optional substitute visual block overriding the bundle's rendering
/// and light behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Facade {
    /// Block type the bundle masquerades as.
    pub block: u16,
    /// Variant index within the block type.
    pub variant: u16,
}

impl Facade {
    /// Creates a facade.
    #[inline]
    #[must_use]
    pub const fn new(block: u16, variant: u16) -> Self {
        Self { block, variant }
    }
}

/// How the viewer currently sees a bundle's facade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FacadeRenderState {
    /// Facade not drawn.
    #[default]
    None,
    /// Facade drawn translucent/partial.
    Partial,
    /// Facade drawn as a full block.
    Full,
}

/// Which channels the viewer's held tool reveals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayMode {
    /// Every channel shown.
    #[default]
    All,
    /// No channels shown.
    None,
    /// Only one kind shown.
    Kind(ChannelKind),
}

/// Client-side view inputs for one tick.
///
/// The decision logic behind these values (viewer position, held tool) is
/// external; the bundle only reacts to the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerState {
    /// The render state the facade should currently have.
    pub facade_render: FacadeRenderState,
    /// The viewer's current display mode.
    pub display_mode: DisplayMode,
}

/// Per-tick environment handed to [`Bundle::update`].
pub struct TickContext<'a> {
    /// Current simulation tick.
    pub tick: u64,
    /// Sink for events the hosting driver services after the tick.
    pub events: &'a Sender<GridEvent>,
    /// Simulation configuration.
    pub config: &'a SimConfig,
    /// Client-side view inputs; `None` on the server.
    pub viewer: Option<ViewerState>,
}

/// One grid cell hosting multiple capability-typed routing channels.
pub struct Bundle {
    position: GridPos,
    side: Side,
    geometry: Arc<GeometryCache>,

    channels: Vec<Box<dyn Channel>>,
    /// Capability kind -> index into `channels`; at most one per kind.
    kind_index: [Option<usize>; ChannelKind::ALL.len()],

    facade: Option<Facade>,
    facade_render: FacadeRenderState,
    facade_changed: bool,
    /// Client-only opacity override for partial facade visibility.
    light_override: Option<u8>,

    cached_collidables: RwLock<Arc<[CollidableComponent]>>,
    cached_connectors: RwLock<Arc<[CollidableComponent]>>,
    channels_dirty: AtomicBool,
    collidables_dirty: AtomicBool,
    connectors_dirty: AtomicBool,

    /// Replica just decoded a record and owes one broadcast.
    replica_decoded: bool,
    last_display_mode: DisplayMode,
}

impl Bundle {
    /// Creates an empty bundle at `position` on `side`, sharing `geometry`
    /// with every other bundle in the world.
    #[must_use]
    pub fn new(position: GridPos, side: Side, geometry: Arc<GeometryCache>) -> Self {
        Self {
            position,
            side,
            geometry,
            channels: Vec::new(),
            kind_index: [None; ChannelKind::ALL.len()],
            facade: None,
            facade_render: FacadeRenderState::None,
            facade_changed: false,
            light_override: None,
            cached_collidables: RwLock::new(Arc::from([])),
            cached_connectors: RwLock::new(Arc::from([])),
            channels_dirty: AtomicBool::new(true),
            collidables_dirty: AtomicBool::new(true),
            connectors_dirty: AtomicBool::new(true),
            replica_decoded: false,
            last_display_mode: DisplayMode::All,
        }
    }

    /// The cell this bundle occupies.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> GridPos {
        self.position
    }

    /// Which replica this bundle lives on.
    #[inline]
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    // =========================================================================
    // Channel lifecycle
    // =========================================================================

    /// Marks the channel set and collidable cache stale.
    ///
    /// The connector cache follows at the next geometry query: junction and
    /// port geometry derives from core geometry.
    pub fn mark_dirty(&self) {
        self.channels_dirty.store(true, Ordering::Release);
        self.collidables_dirty.store(true, Ordering::Release);
    }

    /// Appends a channel and attaches it to this bundle.
    ///
    /// Silently ignored on a replica (structural mutation races with
    /// replication there and must not error). A channel whose kind is
    /// already present is refused; the bundle holds at most one channel per
    /// kind.
    pub fn add_channel(&mut self, channel: Box<dyn Channel>) {
        if !self.side.is_authoritative() {
            return;
        }
        let kind = channel.kind();
        if self.kind_index[kind.index()].is_some() {
            warn!(kind = kind.name(), "refusing duplicate channel kind");
            return;
        }
        let index = self.channels.len();
        self.channels.push(channel);
        self.kind_index[kind.index()] = Some(index);
        self.channels[index].on_attached(self.position);
        self.mark_dirty();
    }

    /// Detaches and returns the channel of the given kind.
    ///
    /// Silently ignored on a replica. With `notify` unset no dirty mark is
    /// made; bulk teardown uses that to avoid one recompute per channel.
    pub fn remove_channel(&mut self, kind: ChannelKind, notify: bool) -> Option<Box<dyn Channel>> {
        if !self.side.is_authoritative() {
            return None;
        }
        let index = self.kind_index[kind.index()]?;
        let mut channel = self.channels.remove(index);
        channel.on_detached();
        self.rebuild_kind_index();
        if notify {
            self.mark_dirty();
        }
        Some(channel)
    }

    /// Tears the bundle down: detaches every channel with one bulk dirty
    /// mark instead of per-channel invalidation.
    pub fn on_removed(&mut self) {
        if !self.side.is_authoritative() {
            return;
        }
        for mut channel in self.channels.drain(..) {
            channel.on_detached();
        }
        self.kind_index = [None; ChannelKind::ALL.len()];
        self.mark_dirty();
    }

    fn rebuild_kind_index(&mut self) {
        self.kind_index = [None; ChannelKind::ALL.len()];
        for (index, channel) in self.channels.iter().enumerate() {
            self.kind_index[channel.kind().index()] = Some(index);
        }
    }

    /// The channel implementing `kind`, if present.
    #[must_use]
    pub fn channel(&self, kind: ChannelKind) -> Option<&dyn Channel> {
        let index = self.kind_index[kind.index()]?;
        Some(self.channels[index].as_ref())
    }

    /// Mutable access to the channel implementing `kind`.
    pub fn channel_mut(&mut self, kind: ChannelKind) -> Option<&mut dyn Channel> {
        let index = self.kind_index[kind.index()]?;
        Some(self.channels[index].as_mut())
    }

    /// True if a channel of the given kind is present.
    #[must_use]
    pub fn has_kind(&self, kind: ChannelKind) -> bool {
        self.kind_index[kind.index()].is_some()
    }

    /// The contained channels in insertion order.
    #[must_use]
    pub fn channels(&self) -> &[Box<dyn Channel>] {
        &self.channels
    }

    // =========================================================================
    // Connection queries
    // =========================================================================

    /// Union of every channel's channel-to-channel connection directions.
    #[must_use]
    pub fn connection_directions(&self) -> DirectionSet {
        self.channels
            .iter()
            .fold(DirectionSet::EMPTY, |acc, c| acc.union(c.connection_directions()))
    }

    /// True if any channel connects to a neighboring bundle on `dir`.
    #[must_use]
    pub fn contains_connection(&self, dir: Direction) -> bool {
        self.channels.iter().any(|c| c.connection_directions().contains(dir))
    }

    /// The channel-to-channel connections of one kind, if present.
    #[must_use]
    pub fn kind_connections(&self, kind: ChannelKind) -> Option<DirectionSet> {
        self.channel(kind).map(|c| c.connection_directions())
    }

    /// True if the channel of `kind` connects to a neighboring bundle on
    /// `dir`.
    #[must_use]
    pub fn kind_contains_connection(&self, kind: ChannelKind, dir: Direction) -> bool {
        self.channel(kind)
            .is_some_and(|c| c.connection_directions().contains(dir))
    }

    /// Number of channels connecting on `dir`; `None` counts every channel.
    #[must_use]
    pub fn connection_count(&self, dir: Option<Direction>) -> usize {
        synthesis::connection_count(&self.channels, dir)
    }

    /// The positional offset the given kind receives on `dir`.
    ///
    /// A direction with fewer than two connecting channels never receives
    /// an offset.
    #[must_use]
    pub fn offset(&self, kind: ChannelKind, dir: Option<Direction>) -> Offset {
        synthesis::channel_offset(&self.channels, kind, dir)
    }

    // =========================================================================
    // World callbacks
    // =========================================================================

    /// Forwards a neighbor block change to every channel; marks the bundle
    /// dirty if any channel wants a geometry refresh.
    pub fn on_neighbor_changed(&mut self, block: u16) {
        let mut needs_update = false;
        for channel in &mut self.channels {
            needs_update |= channel.on_neighbor_changed(block);
        }
        if needs_update {
            self.mark_dirty();
        }
    }

    /// Forwards cell unload to every channel.
    pub fn on_unload(&mut self) {
        for channel in &mut self.channels {
            channel.on_unload();
        }
    }

    /// Advances the bundle by one tick.
    ///
    /// Runs every channel's tick, then services the pending flags: a dirty
    /// channel set broadcasts a block update (authoritative side only), a
    /// facade change triggers light recalculation, and the client branch
    /// syncs render state against the viewer.
    pub fn update(&mut self, ctx: &TickContext<'_>) {
        for channel in &mut self.channels {
            channel.on_world_tick(ctx.tick);
        }

        if self.channels_dirty.load(Ordering::Acquire) {
            if self.side.is_authoritative() {
                let _ = ctx.events.send(GridEvent::BlockUpdate {
                    position: self.position,
                });
            }
            self.channels_dirty.store(false, Ordering::Release);
        }

        if self.facade_changed {
            // A facade changes whether light passes the cell, on both sides.
            let _ = ctx.events.send(GridEvent::LightRecalc {
                position: self.position,
            });
            let _ = ctx.events.send(GridEvent::BlockUpdate {
                position: self.position,
            });
            self.facade_changed = false;
        }

        if self.side == Side::Client {
            self.update_client_view(ctx);
        }
    }

    /// Client-only: check for changes in how the bundle should render.
    fn update_client_view(&mut self, ctx: &TickContext<'_>) {
        let mut mark_for_update = false;

        if self.replica_decoded {
            // A freshly decoded replica can be out of sync with what the
            // renderer last saw; broadcast once unconditionally.
            mark_for_update = true;
            self.replica_decoded = false;
        }

        if let Some(viewer) = ctx.viewer {
            if ctx.config.update_lighting_when_hiding_facades {
                let current = self.light_opacity();
                let should_be = if viewer.facade_render == FacadeRenderState::Full {
                    LIGHT_OPAQUE
                } else {
                    LIGHT_TRANSPARENT
                };
                if current != should_be {
                    self.light_override = Some(should_be);
                    let _ = ctx.events.send(GridEvent::LightRecalc {
                        position: self.position,
                    });
                }
            }

            if self.facade_render != viewer.facade_render {
                self.facade_render = viewer.facade_render;
                mark_for_update = true;
            } else if viewer.display_mode != self.last_display_mode {
                // Only needs checking when the render state is stable; a
                // state change already forces the update.
                mark_for_update = true;
                self.last_display_mode = viewer.display_mode;
            }
        }

        if mark_for_update {
            let _ = ctx.events.send(GridEvent::BlockUpdate {
                position: self.position,
            });
        }
    }

    // =========================================================================
    // Facade & lighting
    // =========================================================================

    /// The current facade, if any.
    #[inline]
    #[must_use]
    pub const fn facade(&self) -> Option<Facade> {
        self.facade
    }

    /// True if a facade is present.
    #[inline]
    #[must_use]
    pub const fn has_facade(&self) -> bool {
        self.facade.is_some()
    }

    /// Sets or clears the facade.
    ///
    /// With `trigger_update` set, the next tick emits a lighting
    /// recalculation and a block-update broadcast.
    pub fn set_facade(&mut self, facade: Option<Facade>, trigger_update: bool) {
        self.facade = facade;
        if trigger_update {
            self.facade_changed = true;
        }
    }

    /// How the facade is currently rendered (client concept).
    #[inline]
    #[must_use]
    pub const fn facade_render_state(&self) -> FacadeRenderState {
        self.facade_render
    }

    /// Overrides the rendered facade state.
    pub fn set_facade_render_state(&mut self, state: FacadeRenderState) {
        self.facade_render = state;
    }

    /// Light opacity of the cell.
    ///
    /// The authoritative side, and any side without a client override, is
    /// fully opaque exactly when a facade is present. The client override
    /// exists only for partial-visibility rendering and never feeds
    /// authoritative light propagation.
    #[must_use]
    pub fn light_opacity(&self) -> u8 {
        if self.side.is_authoritative() || self.light_override.is_none() {
            return if self.has_facade() {
                LIGHT_OPAQUE
            } else {
                LIGHT_TRANSPARENT
            };
        }
        self.light_override.unwrap_or(LIGHT_TRANSPARENT)
    }

    /// Sets or clears the client-only opacity override.
    pub fn set_light_override(&mut self, opacity: Option<u8>) {
        self.light_override = opacity;
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// The full collidable set: every channel's declared components plus
    /// the synthesized connectors.
    ///
    /// Cached; when no channel reports a footprint change and no structural
    /// mutation happened since the last query, the previous snapshot is
    /// returned unchanged.
    #[must_use]
    pub fn collidable_components(&self) -> Arc<[CollidableComponent]> {
        let mut changed = self.collidables_dirty.load(Ordering::Acquire);
        for channel in &self.channels {
            changed |= channel.footprint_changed_since_last_query();
        }
        if changed {
            self.collidables_dirty.store(true, Ordering::Release);
            // Junction/port geometry derives from core geometry.
            self.connectors_dirty.store(true, Ordering::Release);
        }

        let snapshot = Arc::clone(&self.cached_collidables.read());
        if !changed && !snapshot.is_empty() {
            return snapshot;
        }

        debug!(position = ?self.position, "rebuilding collidable cache");
        let mut rebuilt: Vec<CollidableComponent> = Vec::new();
        for channel in &self.channels {
            rebuilt.extend(channel.collidable_components());
        }
        rebuilt.extend(self.build_connectors());

        let rebuilt: Arc<[CollidableComponent]> = rebuilt.into();
        *self.cached_collidables.write() = Arc::clone(&rebuilt);
        self.collidables_dirty.store(false, Ordering::Release);
        rebuilt
    }

    /// The synthesized connectors alone (cores, junctions, ports).
    #[must_use]
    pub fn connectors(&self) -> Vec<CollidableComponent> {
        self.build_connectors()
    }

    /// Returns the connector set, rebuilding the connector cache if any
    /// channel footprint changed since it was last built.
    fn build_connectors(&self) -> Vec<CollidableComponent> {
        if self.channels.is_empty() {
            return Vec::new();
        }

        let mut changed = false;
        for channel in &self.channels {
            changed |= channel.footprint_changed_since_last_query();
        }
        if changed {
            self.collidables_dirty.store(true, Ordering::Release);
            self.connectors_dirty.store(true, Ordering::Release);
        }

        let snapshot = Arc::clone(&self.cached_connectors.read());
        if !self.connectors_dirty.load(Ordering::Acquire) && !snapshot.is_empty() {
            return snapshot.to_vec();
        }

        let rebuilt = synthesis::synthesize(&self.channels, &self.geometry);
        *self.cached_connectors.write() = rebuilt.as_slice().into();
        self.connectors_dirty.store(false, Ordering::Release);
        rebuilt
    }

    // =========================================================================
    // Persistence hooks
    // =========================================================================

    /// Replaces the channel set and facade from a decoded record.
    ///
    /// Used by the codec on both sides (a replica must accept replicated
    /// state even though it refuses local structural mutation). A client
    /// bundle owes the renderer one broadcast afterwards.
    pub(crate) fn apply_decoded(
        &mut self,
        channels: Vec<Box<dyn Channel>>,
        facade: Option<Facade>,
    ) {
        self.channels = channels;
        self.rebuild_kind_index();
        for index in 0..self.channels.len() {
            self.channels[index].on_attached(self.position);
        }
        self.facade = facade;
        if self.side == Side::Client {
            self.replica_decoded = true;
        }
        self.mark_dirty();
    }

    fn energy_mut(&mut self) -> Option<&mut dyn EnergyTransfer> {
        self.channel_mut(ChannelKind::Power)?.as_energy_mut()
    }

    fn energy(&self) -> Option<&dyn EnergyTransfer> {
        self.channel(ChannelKind::Power)?.as_energy()
    }

    fn fluid_mut(&mut self) -> Option<&mut dyn FluidTransfer> {
        self.channel_mut(ChannelKind::Fluid)?.as_fluid_mut()
    }

    fn fluid(&self) -> Option<&dyn FluidTransfer> {
        self.channel(ChannelKind::Fluid)?.as_fluid()
    }

    fn item_mut(&mut self) -> Option<&mut dyn ItemTransfer> {
        self.channel_mut(ChannelKind::Item)?.as_item_mut()
    }
}

// =============================================================================
// Capability dispatch
// =============================================================================
// A neighbor must observe a bundle without a given channel exactly as it
// would observe a plain node without that capability: zero energy moves,
// nothing drains, items come back unchanged, boolean queries answer false.

impl EnergyTransfer for Bundle {
    fn receive(&mut self, from: Direction, max_amount: u32, simulate: bool) -> u32 {
        self.energy_mut()
            .map_or(0, |e| e.receive(from, max_amount, simulate))
    }

    fn extract(&mut self, from: Direction, max_amount: u32, simulate: bool) -> u32 {
        self.energy_mut()
            .map_or(0, |e| e.extract(from, max_amount, simulate))
    }

    fn stored(&self, from: Direction) -> u32 {
        self.energy().map_or(0, |e| e.stored(from))
    }

    fn capacity(&self, from: Direction) -> u32 {
        self.energy().map_or(0, |e| e.capacity(from))
    }

    fn can_interface(&self, from: Direction) -> bool {
        self.energy().is_some_and(|e| e.can_interface(from))
    }
}

impl FluidTransfer for Bundle {
    fn fill(&mut self, from: Direction, resource: FluidStack, do_fill: bool) -> u32 {
        self.fluid_mut()
            .map_or(0, |f| f.fill(from, resource, do_fill))
    }

    fn drain_resource(
        &mut self,
        from: Direction,
        resource: FluidStack,
        do_drain: bool,
    ) -> Option<FluidStack> {
        self.fluid_mut()?.drain_resource(from, resource, do_drain)
    }

    fn drain_amount(
        &mut self,
        from: Direction,
        max_amount: u32,
        do_drain: bool,
    ) -> Option<FluidStack> {
        self.fluid_mut()?.drain_amount(from, max_amount, do_drain)
    }

    fn can_fill(&self, from: Direction, fluid: FluidId) -> bool {
        self.fluid().is_some_and(|f| f.can_fill(from, fluid))
    }

    fn can_drain(&self, from: Direction, fluid: FluidId) -> bool {
        self.fluid().is_some_and(|f| f.can_drain(from, fluid))
    }

    fn tank_info(&self, from: Direction) -> Vec<TankInfo> {
        self.fluid().map_or_else(Vec::new, |f| f.tank_info(from))
    }
}

impl ItemTransfer for Bundle {
    fn insert(&mut self, from: Direction, stack: ItemStack, simulate: bool) -> ItemStack {
        match self.item_mut() {
            Some(i) => i.insert(from, stack, simulate),
            None => stack,
        }
    }

    fn send(&mut self, stack: ItemStack, preferred: Option<Direction>) -> ItemStack {
        match self.item_mut() {
            Some(i) => i.send(stack, preferred),
            None => stack,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ConnectionMode;
    use crossbeam_channel::unbounded;

    /// Minimal channel stub: fixed kind, no connections, no geometry.
    struct StubChannel {
        kind: ChannelKind,
        footprint_changed: AtomicBool,
    }

    impl StubChannel {
        fn new(kind: ChannelKind) -> Box<Self> {
            Box::new(Self {
                kind,
                footprint_changed: AtomicBool::new(false),
            })
        }
    }

    impl Channel for StubChannel {
        fn kind(&self) -> ChannelKind {
            self.kind
        }

        fn on_attached(&mut self, _bundle: GridPos) {}

        fn on_detached(&mut self) {}

        fn on_world_tick(&mut self, _tick: u64) {}

        fn footprint_changed_since_last_query(&self) -> bool {
            self.footprint_changed.swap(false, Ordering::AcqRel)
        }

        fn collidable_components(&self) -> Vec<CollidableComponent> {
            Vec::new()
        }

        fn connection_directions(&self) -> DirectionSet {
            DirectionSet::EMPTY
        }

        fn external_connections(&self) -> DirectionSet {
            DirectionSet::EMPTY
        }

        fn connection_mode(&self, _dir: Direction) -> ConnectionMode {
            ConnectionMode::Normal
        }
    }

    fn server_bundle() -> Bundle {
        Bundle::new(
            GridPos::new(0, 0, 0),
            Side::Server,
            Arc::new(GeometryCache::new()),
        )
    }

    #[test]
    fn test_add_and_lookup_channel() {
        let mut bundle = server_bundle();
        bundle.add_channel(StubChannel::new(ChannelKind::Power));
        bundle.add_channel(StubChannel::new(ChannelKind::Item));

        assert!(bundle.has_kind(ChannelKind::Power));
        assert!(bundle.has_kind(ChannelKind::Item));
        assert!(!bundle.has_kind(ChannelKind::Fluid));
        assert_eq!(
            bundle.channel(ChannelKind::Item).map(|c| c.kind()),
            Some(ChannelKind::Item)
        );
    }

    #[test]
    fn test_duplicate_kind_refused() {
        let mut bundle = server_bundle();
        bundle.add_channel(StubChannel::new(ChannelKind::Power));
        bundle.add_channel(StubChannel::new(ChannelKind::Power));
        assert_eq!(bundle.channels().len(), 1);
    }

    #[test]
    fn test_replica_ignores_structural_mutation() {
        let mut bundle = Bundle::new(
            GridPos::new(0, 0, 0),
            Side::Client,
            Arc::new(GeometryCache::new()),
        );
        bundle.add_channel(StubChannel::new(ChannelKind::Power));
        assert!(bundle.channels().is_empty());
        assert!(bundle.remove_channel(ChannelKind::Power, true).is_none());
    }

    #[test]
    fn test_remove_rebuilds_index() {
        let mut bundle = server_bundle();
        bundle.add_channel(StubChannel::new(ChannelKind::Power));
        bundle.add_channel(StubChannel::new(ChannelKind::Fluid));
        bundle.add_channel(StubChannel::new(ChannelKind::Item));

        let removed = bundle.remove_channel(ChannelKind::Power, true);
        assert!(removed.is_some());
        assert!(!bundle.has_kind(ChannelKind::Power));
        // The shifted survivors still resolve.
        assert!(bundle.channel(ChannelKind::Fluid).is_some());
        assert!(bundle.channel(ChannelKind::Item).is_some());
    }

    #[test]
    fn test_light_opacity_follows_facade_on_server() {
        let mut bundle = server_bundle();
        assert_eq!(bundle.light_opacity(), LIGHT_TRANSPARENT);

        bundle.set_facade(Some(Facade::new(7, 0)), false);
        assert_eq!(bundle.light_opacity(), LIGHT_OPAQUE);

        // A client-only override never leaks into the authoritative answer.
        bundle.set_light_override(Some(12));
        assert_eq!(bundle.light_opacity(), LIGHT_OPAQUE);
    }

    #[test]
    fn test_client_override_applies_off_authority() {
        let mut bundle = Bundle::new(
            GridPos::new(0, 0, 0),
            Side::Client,
            Arc::new(GeometryCache::new()),
        );
        bundle.set_facade(Some(Facade::new(7, 0)), false);
        assert_eq!(bundle.light_opacity(), LIGHT_OPAQUE);

        bundle.set_light_override(Some(LIGHT_TRANSPARENT));
        assert_eq!(bundle.light_opacity(), LIGHT_TRANSPARENT);
    }

    #[test]
    fn test_structural_broadcast_on_next_tick() {
        let mut bundle = server_bundle();
        let (tx, rx) = unbounded();
        let config = SimConfig::default();

        bundle.add_channel(StubChannel::new(ChannelKind::Power));
        bundle.update(&TickContext {
            tick: 1,
            events: &tx,
            config: &config,
            viewer: None,
        });
        assert_eq!(
            rx.try_recv(),
            Ok(GridEvent::BlockUpdate {
                position: bundle.position()
            })
        );

        // Nothing pending on the following tick.
        bundle.update(&TickContext {
            tick: 2,
            events: &tx,
            config: &config,
            viewer: None,
        });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_client_view_syncs_lighting_and_render_state() {
        let mut bundle = Bundle::new(
            GridPos::new(0, 0, 0),
            Side::Client,
            Arc::new(GeometryCache::new()),
        );
        bundle.set_facade(Some(Facade::new(7, 0)), false);
        let (tx, rx) = unbounded();
        let config = SimConfig {
            update_lighting_when_hiding_facades: true,
            ..SimConfig::default()
        };

        // Facade hidden by the viewer: the override tracks the render state.
        bundle.update(&TickContext {
            tick: 1,
            events: &tx,
            config: &config,
            viewer: Some(ViewerState {
                facade_render: FacadeRenderState::None,
                display_mode: DisplayMode::All,
            }),
        });
        assert_eq!(bundle.light_opacity(), LIGHT_TRANSPARENT);
        let events: Vec<GridEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![GridEvent::LightRecalc {
                position: bundle.position()
            }]
        );

        // Facade shown again: render state change forces a broadcast.
        bundle.update(&TickContext {
            tick: 2,
            events: &tx,
            config: &config,
            viewer: Some(ViewerState {
                facade_render: FacadeRenderState::Full,
                display_mode: DisplayMode::All,
            }),
        });
        assert_eq!(bundle.facade_render_state(), FacadeRenderState::Full);
        assert_eq!(bundle.light_opacity(), LIGHT_OPAQUE);
        let events: Vec<GridEvent> = rx.try_iter().collect();
        assert!(events.contains(&GridEvent::BlockUpdate {
            position: bundle.position()
        }));
    }

    #[test]
    fn test_display_mode_change_broadcasts_once() {
        let mut bundle = Bundle::new(
            GridPos::new(0, 0, 0),
            Side::Client,
            Arc::new(GeometryCache::new()),
        );
        let (tx, rx) = unbounded();
        let config = SimConfig::default();
        let viewer = |mode| {
            Some(ViewerState {
                facade_render: FacadeRenderState::None,
                display_mode: mode,
            })
        };

        bundle.update(&TickContext {
            tick: 1,
            events: &tx,
            config: &config,
            viewer: viewer(DisplayMode::Kind(ChannelKind::Power)),
        });
        assert_eq!(
            rx.try_recv(),
            Ok(GridEvent::BlockUpdate {
                position: bundle.position()
            })
        );

        // Unchanged mode stays quiet.
        bundle.update(&TickContext {
            tick: 2,
            events: &tx,
            config: &config,
            viewer: viewer(DisplayMode::Kind(ChannelKind::Power)),
        });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_facade_change_triggers_light_recalc() {
        let mut bundle = server_bundle();
        let (tx, rx) = unbounded();
        let config = SimConfig::default();

        // Drain the initial structural broadcast.
        bundle.update(&TickContext {
            tick: 1,
            events: &tx,
            config: &config,
            viewer: None,
        });
        while rx.try_recv().is_ok() {}

        bundle.set_facade(Some(Facade::new(3, 1)), true);
        bundle.update(&TickContext {
            tick: 2,
            events: &tx,
            config: &config,
            viewer: None,
        });

        let events: Vec<GridEvent> = rx.try_iter().collect();
        assert!(events.contains(&GridEvent::LightRecalc {
            position: bundle.position()
        }));
        assert!(events.contains(&GridEvent::BlockUpdate {
            position: bundle.position()
        }));
    }
}
