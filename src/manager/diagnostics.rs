//! Snapshot of the manager's cache state for debugging.

use crate::manager::cache::ViewCache;
use crate::view::{SurfaceHandle, ViewKind};
use serde::Serialize;
use std::fmt;

/// Running totals kept by the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheCounters {
    /// Requests served from the cache.
    pub hits: u64,
    /// Requests that built a new primary view.
    pub misses: u64,
    /// Neighbour views built speculatively.
    pub prefetches: u64,
    /// Views admitted into the cache after loading.
    pub promotions: u64,
    /// Loaded views refused because their item was already cached.
    pub duplicates_suppressed: u64,
    /// Views evicted by the proximity window.
    pub evictions: u64,
}

/// One cached view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CachedViewSummary {
    /// View variant.
    pub kind: ViewKind,
    /// Spine items the view currently holds.
    pub spine_indices: Vec<usize>,
}

/// One row of the surface table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurfaceEntry {
    /// Spine index the surface was recorded for.
    pub spine_index: usize,
    /// Surface last reported loaded for that index.
    pub surface: SurfaceHandle,
    /// No cached view holds this spine index any more.
    pub stale: bool,
}

/// Cached views in insertion order, the surface table sorted by spine index,
/// and counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheDiagnostics {
    /// Configured proximity window.
    pub eviction_window: usize,
    /// Cached views.
    pub views: Vec<CachedViewSummary>,
    /// Surface table.
    pub surfaces: Vec<SurfaceEntry>,
    /// Counters since the manager was created.
    pub counters: CacheCounters,
}

impl CacheDiagnostics {
    pub(crate) fn capture(cache: &ViewCache, eviction_window: usize) -> Self {
        let views: Vec<CachedViewSummary> = cache
            .views()
            .iter()
            .map(|view| CachedViewSummary {
                kind: view.kind(),
                spine_indices: view
                    .loaded_spine_items()
                    .iter()
                    .map(|item| item.index)
                    .collect(),
            })
            .collect();

        let mut surfaces: Vec<SurfaceEntry> = cache
            .surfaces()
            .iter()
            .map(|(&spine_index, &surface)| SurfaceEntry {
                spine_index,
                surface,
                stale: !views
                    .iter()
                    .any(|view| view.spine_indices.contains(&spine_index)),
            })
            .collect();
        surfaces.sort_by_key(|entry| entry.spine_index);

        Self {
            eviction_window,
            views,
            surfaces,
            counters: cache.counters,
        }
    }

    /// Every spine index held by a cached view, sorted.
    pub fn cached_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .views
            .iter()
            .flat_map(|view| view.spine_indices.iter().copied())
            .collect();
        indices.sort_unstable();
        indices
    }

    /// Surface entries no cached view holds.
    pub fn stale_surfaces(&self) -> usize {
        self.surfaces.iter().filter(|entry| entry.stale).count()
    }
}

impl fmt::Display for CacheDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "cached views: {} (window {})",
            self.views.len(),
            self.eviction_window
        )?;
        for view in &self.views {
            writeln!(f, "  {} {:?}", view.kind, view.spine_indices)?;
        }

        writeln!(
            f,
            "surfaces: {} ({} stale)",
            self.surfaces.len(),
            self.stale_surfaces()
        )?;
        for entry in &self.surfaces {
            let marker = if entry.stale { " stale" } else { "" };
            writeln!(f, "  {} -> {}{}", entry.spine_index, entry.surface, marker)?;
        }

        let c = &self.counters;
        write!(
            f,
            "hits={} misses={} prefetches={} promotions={} duplicates={} evictions={}",
            c.hits, c.misses, c.prefetches, c.promotions, c.duplicates_suppressed, c.evictions
        )
    }
}
