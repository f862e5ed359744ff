//! Connector synthesis.
//!
//! Derives the junction and port geometry a bundle needs beyond what its
//! channels declare for themselves. The algorithm is pure: given a fixed
//! channel/connection set it always produces the same boxes, in the same
//! order. Kinds iterate in [`ChannelKind::ALL`] order and directions in
//! [`Direction::ALL`] order, so output never depends on channel insertion
//! order.
//!
//! Two junction heuristics run independently and may both fire for the same
//! channel set, emitting overlapping internal boxes. That double emission is
//! load-bearing for downstream consumers and must not be deduplicated.

use crate::channel::{Channel, ChannelKind, ConnectionMode};
use crate::geom::cache::{GeometryCache, GeometryKey};
use crate::geom::component::{CollidableComponent, ConnectorKind};
use crate::geom::offset::{offset_for, Offset};
use omnibus_shared::constants::{
    CORE_HALF_WIDTH, JUNCTION_SCALE, PORT_DEPTH, PORT_HALF_WIDTH, SPREAD_AREA_RATIO,
};
use omnibus_shared::{BoundingBox, Direction, DirectionSet};

/// The canonical core box for the given offset and connecting direction.
///
/// With no direction this is the channel core: a cube of half-width
/// [`CORE_HALF_WIDTH`] centered in the cell, translated by the offset. With
/// a direction it is the arm stub running from the core's face to the cell
/// face, with the core's cross-section.
#[must_use]
pub fn core_box(offset: Offset, direction: Option<Direction>) -> BoundingBox {
    let center = {
        let off = offset.as_vec();
        [0.5 + off[0], 0.5 + off[1], 0.5 + off[2]]
    };
    let core = BoundingBox::from_center(center, [CORE_HALF_WIDTH; 3]);

    let Some(dir) = direction else {
        return core;
    };

    let mut min = core.min;
    let mut max = core.max;
    let unit = dir.unit();
    for axis in 0..3 {
        if unit[axis] > 0 {
            min[axis] = core.max[axis];
            max[axis] = 1.0;
        } else if unit[axis] < 0 {
            min[axis] = 0.0;
            max[axis] = core.min[axis];
        }
    }
    BoundingBox::new(min, max)
}

/// The canonical external port box for a direction.
///
/// A slab of depth [`PORT_DEPTH`] centered on the face, identical for every
/// channel kind.
#[must_use]
pub fn port_box(direction: Direction) -> BoundingBox {
    let mut min = [0.5 - PORT_HALF_WIDTH; 3];
    let mut max = [0.5 + PORT_HALF_WIDTH; 3];
    let unit = direction.unit();
    for axis in 0..3 {
        if unit[axis] > 0 {
            min[axis] = 1.0 - PORT_DEPTH;
            max[axis] = 1.0;
        } else if unit[axis] < 0 {
            min[axis] = 0.0;
            max[axis] = PORT_DEPTH;
        }
    }
    BoundingBox::new(min, max)
}

/// Number of channels connecting on `dir`, or the channel count for `None`.
pub(crate) fn connection_count(channels: &[Box<dyn Channel>], dir: Option<Direction>) -> usize {
    let Some(dir) = dir else {
        return channels.len();
    };
    channels
        .iter()
        .filter(|c| c.connection_directions().contains(dir) || c.external_connections().contains(dir))
        .count()
}

/// The positional offset a channel kind receives on `dir`.
///
/// A direction with fewer than two connecting channels never receives an
/// offset; the undirected slot counts every channel in the bundle.
pub(crate) fn channel_offset(
    channels: &[Box<dyn Channel>],
    kind: ChannelKind,
    dir: Option<Direction>,
) -> Offset {
    if connection_count(channels, dir) < 2 {
        return Offset::NONE;
    }
    offset_for(kind, dir.map(Direction::axis))
}

/// Gathers one channel's core components through the interning cache.
///
/// A connected channel gets one arm-stub core per connecting direction (in
/// canonical order, externals and channel connections merged); an
/// unconnected channel gets a single undirected core.
fn channel_cores(
    channels: &[Box<dyn Channel>],
    channel: &dyn Channel,
    cache: &GeometryCache,
) -> Vec<CollidableComponent> {
    let kind = channel.collidable_kind();
    let mut cores = Vec::new();

    let dirs = channel
        .connection_directions()
        .union(channel.external_connections());
    if dirs.is_empty() {
        let key = GeometryKey::new(kind, channel_offset(channels, kind, None), None, false);
        cores.extend_from_slice(&cache.collidables(key, || build_core(key)));
        return cores;
    }

    for dir in dirs.iter() {
        let key = GeometryKey::new(
            kind,
            channel_offset(channels, kind, Some(dir)),
            Some(dir),
            false,
        );
        cores.extend_from_slice(&cache.collidables(key, || build_core(key)));
    }
    cores
}

fn build_core(key: GeometryKey) -> Vec<CollidableComponent> {
    vec![CollidableComponent::new(
        core_box(key.offset, key.direction),
        key.direction,
        ConnectorKind::Core,
        Some(key.kind),
    )]
}

/// Synthesizes the full connector set for a channel list.
///
/// Output, in order: every channel's cores, the collision junction (if any),
/// spread junctions (if any), external ports. An empty channel list yields
/// an empty result.
#[must_use]
pub fn synthesize(
    channels: &[Box<dyn Channel>],
    cache: &GeometryCache,
) -> Vec<CollidableComponent> {
    if channels.is_empty() {
        return Vec::new();
    }

    let mut result = Vec::new();

    // Core gathering, one entry per channel in insertion order.
    let cores_per_channel: Vec<Vec<CollidableComponent>> = channels
        .iter()
        .map(|c| channel_cores(channels, c.as_ref(), cache))
        .collect();
    for cores in &cores_per_channel {
        result.extend_from_slice(cores);
    }

    // Pairwise collision test over the full collidable set: every channel's
    // own components plus its cores. Addressing overlays are decoration,
    // not structural geometry, and are excluded from the test.
    let mut all = Vec::new();
    for (channel, cores) in channels.iter().zip(&cores_per_channel) {
        all.extend(channel.collidable_components());
        all.extend_from_slice(cores);
    }

    let mut colliding = [false; ChannelKind::ALL.len()];
    for (i, outer) in all.iter().enumerate() {
        if outer.marker.is_some() {
            continue;
        }
        for (j, inner) in all.iter().enumerate() {
            if i == j || inner.marker.is_some() {
                continue;
            }
            if outer.bounds.intersects(&inner.bounds) {
                if let Some(kind) = outer.kind {
                    colliding[kind.index()] = true;
                }
            }
        }
    }

    // Collision junction: one box enclosing every colliding kind's cores.
    let mut junction: Option<BoundingBox> = None;
    for kind in ChannelKind::ALL {
        if !colliding[kind.index()] {
            continue;
        }
        if let Some(channel) = channels.iter().find(|c| c.collidable_kind() == kind) {
            for core in channel_cores(channels, channel.as_ref(), cache) {
                junction = Some(match junction {
                    None => core.bounds,
                    Some(bb) => bb.union(&core.bounds),
                });
            }
        }
    }
    if let Some(bb) = junction {
        result.push(CollidableComponent::new(
            bb.scale(JUNCTION_SCALE, JUNCTION_SCALE, JUNCTION_SCALE),
            None,
            ConnectorKind::Internal,
            None,
        ));
    }

    // Spread junction: a connected channel whose cores have drifted apart
    // gets a second enclosing box. Runs independently of the collision
    // junction; both may cover the same channel set.
    for (channel, cores) in channels.iter().zip(&cores_per_channel) {
        if !channel.has_connections() || cores.len() < 2 {
            continue;
        }
        let mut bb = cores[0].bounds;
        let baseline = bb.area();
        for core in cores {
            bb = bb.union(&core.bounds);
        }
        if bb.area() > baseline * SPREAD_AREA_RATIO {
            result.push(CollidableComponent::new(
                bb.scale(JUNCTION_SCALE, JUNCTION_SCALE, JUNCTION_SCALE),
                None,
                ConnectorKind::Internal,
                None,
            ));
        }
    }

    // External ports: one canonical box per direction with at least one
    // live external connection. Only the connection mode gates emission.
    let mut port_dirs = DirectionSet::EMPTY;
    for channel in channels {
        for dir in channel.external_connections().iter() {
            if channel.connection_mode(dir) != ConnectionMode::Disabled {
                port_dirs.insert(dir);
            }
        }
    }
    for dir in port_dirs.iter() {
        result.push(CollidableComponent::new(
            port_box(dir),
            Some(dir),
            ConnectorKind::External,
            None,
        ));
    }

    result
}
