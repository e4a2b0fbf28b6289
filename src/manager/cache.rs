//! The cache entry set and the surface table.
//!
//! Views enter the cache only once they report loaded. Lookup, admission and
//! expiry are plain synchronous operations; the manager sequences them.

use crate::manager::diagnostics::CacheCounters;
use crate::view::{ContentLoaded, SurfaceHandle, View};
use std::collections::HashMap;
use std::rc::Rc;

/// Result of offering a loaded view to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Appended to the cache.
    Admitted,
    /// Another cached view already holds one of the view's spine items.
    Duplicate,
}

/// Insertion-ordered set of loaded views plus the surfaces they were drawn into.
#[derive(Default)]
pub struct ViewCache {
    views: Vec<Rc<dyn View>>,
    surfaces: HashMap<usize, SurfaceHandle>,
    pub(crate) counters: CacheCounters,
}

impl ViewCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// First cached view, in insertion order, holding spine index `index`.
    pub fn find(&self, index: usize) -> Option<Rc<dyn View>> {
        self.views
            .iter()
            .find(|view| {
                view.loaded_spine_items()
                    .iter()
                    .any(|item| item.index == index)
            })
            .cloned()
    }

    /// Admit a view whose content just loaded.
    ///
    /// The view is refused if any spine item it holds is already cached; a view
    /// reporting no items is keyed by the event's spine item. On admission the
    /// event's surface is recorded under the event's spine index.
    pub fn admit(&mut self, view: Rc<dyn View>, event: &ContentLoaded) -> Admission {
        let mut held: Vec<usize> = view
            .loaded_spine_items()
            .iter()
            .map(|item| item.index)
            .collect();
        if held.is_empty() {
            held.push(event.spine_item.index);
        }

        if held.iter().any(|&index| self.find(index).is_some()) {
            self.counters.duplicates_suppressed += 1;
            return Admission::Duplicate;
        }

        self.views.push(view);
        if let Some(surface) = event.surface {
            self.surfaces.insert(event.spine_item.index, surface);
        }
        self.counters.promotions += 1;
        Admission::Admitted
    }

    /// Drop every view whose first held spine index is more than `window` away
    /// from `current`, returning them so the caller can detach them.
    ///
    /// A view holding nothing is treated as stale.
    pub fn expire(&mut self, current: usize, window: usize) -> Vec<Rc<dyn View>> {
        let (stale, keep): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.views)
                .into_iter()
                .partition(|view| match view.loaded_spine_items().first() {
                    Some(item) => item.index.abs_diff(current) > window,
                    None => true,
                });

        self.views = keep;
        self.counters.evictions += stale.len() as u64;
        stale
    }

    /// Surface recorded for a spine index. Entries outlive evicted views.
    pub fn surface(&self, index: usize) -> Option<SurfaceHandle> {
        self.surfaces.get(&index).copied()
    }

    /// Cached views in insertion order.
    pub fn views(&self) -> &[Rc<dyn View>] {
        &self.views
    }

    /// Surface table keyed by spine index.
    pub fn surfaces(&self) -> &HashMap<usize, SurfaceHandle> {
        &self.surfaces
    }

    /// Number of cached views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Whether no view is cached.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}
