//! # OMNIBUS Shared
//!
//! Common types used by both the simulation core and its consumers.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on:
//! - `omnibus_core`
//! - Any renderer, window, or IO crate
//!
//! If you need container or channel types, put them in `omnibus_core`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod bounds;
pub mod constants;
pub mod events;
pub mod grid;

pub use bounds::BoundingBox;
pub use constants::{
    CORE_HALF_WIDTH, JUNCTION_SCALE, OFFSET_SCALE, PORT_DEPTH, PORT_HALF_WIDTH, RECORD_VERSION,
    SPREAD_AREA_RATIO, TICK_RATE,
};
pub use events::GridEvent;
pub use grid::{Axis, Direction, DirectionSet, GridPos, Side};
