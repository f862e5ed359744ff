//! Shared geometry interning cache.
//!
//! Bounding-box geometry is a pure function of a small composite key, and
//! the same configurations recur across many bundles. This cache interns
//! the computed component slices so every bundle with an identical
//! configuration shares one immutable allocation.
//!
//! Entries are inserted whole and never mutated in place, so the render and
//! collision read paths can hit the cache concurrently with simulation
//! ticks.

use crate::channel::ChannelKind;
use crate::geom::component::CollidableComponent;
use crate::geom::offset::Offset;
use omnibus_shared::Direction;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Composite key identifying one interned geometry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryKey {
    /// Channel kind the geometry belongs to.
    pub kind: ChannelKind,
    /// Positional offset the geometry is translated by.
    pub offset: Offset,
    /// Connecting direction, or `None` for an undirected core.
    pub direction: Option<Direction>,
    /// Distinguishes channel-owned stub geometry from synthesized cores
    /// interned under the same kind/offset/direction.
    pub stub: bool,
}

impl GeometryKey {
    /// Creates a key.
    #[must_use]
    pub const fn new(
        kind: ChannelKind,
        offset: Offset,
        direction: Option<Direction>,
        stub: bool,
    ) -> Self {
        Self {
            kind,
            offset,
            direction,
            stub,
        }
    }
}

/// Value-keyed interning table for collidable component slices.
pub struct GeometryCache {
    entries: RwLock<HashMap<GeometryKey, Arc<[CollidableComponent]>>>,
}

impl GeometryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Creates an empty cache with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity(capacity)),
        }
    }

    /// Returns the interned components for `key`, building them on a miss.
    ///
    /// `build` runs at most once per key for the lifetime of the cache (or
    /// until [`GeometryCache::clear`]); its result must be a pure function
    /// of the key.
    pub fn collidables(
        &self,
        key: GeometryKey,
        build: impl FnOnce() -> Vec<CollidableComponent>,
    ) -> Arc<[CollidableComponent]> {
        if let Some(hit) = self.entries.read().get(&key) {
            return Arc::clone(hit);
        }

        let mut entries = self.entries.write();
        // Double-checked: another thread may have filled the slot while we
        // waited for the write lock.
        if let Some(hit) = entries.get(&key) {
            return Arc::clone(hit);
        }
        let built: Arc<[CollidableComponent]> = build().into();
        entries.insert(key, Arc::clone(&built));
        built
    }

    /// Number of interned entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drops every interned entry.
    ///
    /// Outstanding `Arc` handles stay valid; only future lookups rebuild.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl Default for GeometryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::component::ConnectorKind;
    use omnibus_shared::BoundingBox;

    fn test_component() -> CollidableComponent {
        CollidableComponent::new(
            BoundingBox::new([0.4; 3], [0.6; 3]),
            None,
            ConnectorKind::Core,
            Some(ChannelKind::Power),
        )
    }

    #[test]
    fn test_build_runs_once_per_key() {
        let cache = GeometryCache::new();
        let key = GeometryKey::new(ChannelKind::Power, Offset::NONE, None, false);

        let first = cache.collidables(key, || vec![test_component()]);
        let second = cache.collidables(key, || panic!("must not rebuild"));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_keys_distinct_entries() {
        let cache = GeometryCache::new();
        let a = GeometryKey::new(ChannelKind::Power, Offset::NONE, None, false);
        let b = GeometryKey::new(ChannelKind::Fluid, Offset::NONE, None, false);

        let _ = cache.collidables(a, || vec![test_component()]);
        let _ = cache.collidables(b, || vec![test_component()]);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_clear_keeps_outstanding_handles() {
        let cache = GeometryCache::new();
        let key = GeometryKey::new(ChannelKind::Item, Offset::NONE, None, true);
        let handle = cache.collidables(key, || vec![test_component()]);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(handle.len(), 1);
    }
}
