//! # OMNIBUS Core
//!
//! The bundle container: one grid cell hosting multiple capability-typed
//! routing channels (power, fluid, item, signal) behind unified capability
//! protocols.
//!
//! ## Architecture Rules
//!
//! 1. **No recompute on clean queries** - geometry queries return cached
//!    snapshots unless a channel reported a footprint change
//! 2. **Deterministic geometry** - connector synthesis output never depends
//!    on channel insertion order
//! 3. **Replica safety** - structural mutation off the authoritative side
//!    is a silent no-op, never an error
//!
//! ## Example
//!
//! ```rust,ignore
//! use omnibus_core::{Bundle, GeometryCache};
//! use omnibus_shared::{GridPos, Side};
//!
//! let geometry = std::sync::Arc::new(GeometryCache::new());
//! let mut bundle = Bundle::new(GridPos::new(0, 64, 0), Side::Server, geometry);
//! bundle.add_channel(my_power_channel);
//! let collidables = bundle.collidable_components();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod bundle;
pub mod capability;
pub mod channel;
pub mod codec;
pub mod config;
pub mod error;
pub mod geom;

pub use bundle::{
    Bundle, DisplayMode, Facade, FacadeRenderState, TickContext, ViewerState, LIGHT_OPAQUE,
    LIGHT_TRANSPARENT,
};
pub use capability::{
    EnergyTransfer, FluidId, FluidStack, FluidTransfer, ItemId, ItemStack, ItemTransfer, TankInfo,
};
pub use channel::{Channel, ChannelKind, ConnectionMode, SignalColor};
pub use codec::{
    decode_bundle, encode_bundle, BundleRecord, ChannelCodec, ChannelRecord, CodecRegistry,
    FacadeRecord,
};
pub use config::SimConfig;
pub use error::{CodecError, CodecResult, ConfigError};
pub use geom::{
    core_box, port_box, synthesize, CollidableComponent, ComponentMarker, ConnectorKind,
    GeometryCache, GeometryKey, Offset,
};
