//! Tuning constants shared between the simulation core and its consumers.

/// Simulation ticks per second.
pub const TICK_RATE: u32 = 20;

/// Version stamped into every persisted bundle record.
pub const RECORD_VERSION: u16 = 1;

/// Half-width of a channel core box, in cell-local units.
///
/// The undirected core of a channel is a cube of side `2 * CORE_HALF_WIDTH`
/// centered in the cell.
pub const CORE_HALF_WIDTH: f32 = 0.1;

/// Magnitude of one positional offset step, in cell-local units.
///
/// Channels sharing a crowded direction are displaced by one slot of this
/// size perpendicular to the connection axis.
pub const OFFSET_SCALE: f32 = 0.25;

/// Scale factor applied to synthesized junction boxes on each axis.
pub const JUNCTION_SCALE: f32 = 1.05;

/// A channel whose united core area exceeds this multiple of its first core's
/// area receives a spread junction box.
pub const SPREAD_AREA_RATIO: f32 = 1.5;

/// Half-width of the canonical external port box face.
pub const PORT_HALF_WIDTH: f32 = 0.15;

/// Depth of the canonical external port box, measured inward from the face.
pub const PORT_DEPTH: f32 = 0.15;
