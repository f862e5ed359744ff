//! # Connector Synthesis Benchmark
//!
//! Measures the two halves of the geometry contract:
//! 1. Full synthesis on a crowded bundle (worst case, every heuristic fires)
//! 2. The cached query fast path (must be allocation-free and flat)

#![allow(dead_code)]
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use omnibus_core::channel::{Channel, ChannelKind, ConnectionMode};
use omnibus_core::geom::{core_box, CollidableComponent, ConnectorKind, GeometryCache, Offset};
use omnibus_core::Bundle;
use omnibus_shared::{Direction, DirectionSet, GridPos, Side};
use std::sync::Arc;

/// Fixed-state channel for benchmarking.
struct BenchChannel {
    kind: ChannelKind,
    connections: DirectionSet,
    externals: DirectionSet,
    own: Vec<CollidableComponent>,
}

impl BenchChannel {
    fn boxed(kind: ChannelKind, connections: &[Direction], externals: &[Direction]) -> Box<Self> {
        Box::new(Self {
            kind,
            connections: DirectionSet::from_dirs(connections),
            externals: DirectionSet::from_dirs(externals),
            own: vec![CollidableComponent::new(
                core_box(Offset::NONE, None),
                None,
                ConnectorKind::Core,
                Some(kind),
            )],
        })
    }
}

impl Channel for BenchChannel {
    fn kind(&self) -> ChannelKind {
        self.kind
    }

    fn on_attached(&mut self, _bundle: GridPos) {}

    fn on_detached(&mut self) {}

    fn on_world_tick(&mut self, _tick: u64) {}

    fn footprint_changed_since_last_query(&self) -> bool {
        false
    }

    fn collidable_components(&self) -> Vec<CollidableComponent> {
        self.own.clone()
    }

    fn connection_directions(&self) -> DirectionSet {
        self.connections
    }

    fn external_connections(&self) -> DirectionSet {
        self.externals
    }

    fn connection_mode(&self, _dir: Direction) -> ConnectionMode {
        ConnectionMode::Normal
    }
}

/// A crowded bundle: all four kinds share north, every junction heuristic
/// and an external port fire.
fn crowded_bundle(geometry: Arc<GeometryCache>) -> Bundle {
    let mut bundle = Bundle::new(GridPos::new(0, 64, 0), Side::Server, geometry);
    bundle.add_channel(BenchChannel::boxed(
        ChannelKind::Power,
        &[Direction::North, Direction::East],
        &[],
    ));
    bundle.add_channel(BenchChannel::boxed(
        ChannelKind::Fluid,
        &[Direction::North, Direction::Up],
        &[],
    ));
    bundle.add_channel(BenchChannel::boxed(
        ChannelKind::Item,
        &[Direction::North],
        &[Direction::South],
    ));
    bundle.add_channel(BenchChannel::boxed(
        ChannelKind::Signal,
        &[Direction::North],
        &[],
    ));
    bundle
}

fn bench_full_synthesis(c: &mut Criterion) {
    let mut group = c.benchmark_group("connector_synthesis");

    for channel_count in [1usize, 2, 4] {
        let geometry = Arc::new(GeometryCache::new());
        let bundle = {
            let mut b = Bundle::new(GridPos::new(0, 64, 0), Side::Server, Arc::clone(&geometry));
            let kinds = [
                ChannelKind::Power,
                ChannelKind::Fluid,
                ChannelKind::Item,
                ChannelKind::Signal,
            ];
            for kind in kinds.iter().take(channel_count) {
                b.add_channel(BenchChannel::boxed(*kind, &[Direction::North], &[]));
            }
            b
        };

        group.bench_with_input(
            BenchmarkId::new("rebuild", channel_count),
            &channel_count,
            |bencher, _| {
                bencher.iter(|| {
                    bundle.mark_dirty();
                    black_box(bundle.collidable_components())
                });
            },
        );
    }

    group.finish();
}

fn bench_cached_query(c: &mut Criterion) {
    let geometry = Arc::new(GeometryCache::new());
    let bundle = crowded_bundle(geometry);

    // Prime the caches once; every iteration after this is the fast path.
    let _ = bundle.collidable_components();

    c.bench_function("cached_query_fast_path", |bencher| {
        bencher.iter(|| black_box(bundle.collidable_components()));
    });
}

criterion_group!(benches, bench_full_synthesis, bench_cached_query);
criterion_main!(benches);
