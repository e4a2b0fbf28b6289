//! The view manager: reuse, prefetch and evict rendered spine views.
//!
//! The manager keeps a small lookahead cache of views that have finished
//! loading. Every request reuses a cached view when one holds the requested
//! item, prefetches the neighbours of the requested item, and evicts cached
//! views that drifted outside the proximity window.
//!
//! Everything runs on one thread. Promotion listeners are spawned with
//! [`tokio::task::spawn_local`], so requests must be issued from inside a
//! [`tokio::task::LocalSet`].

pub mod cache;
pub mod deduce;
pub mod diagnostics;
pub mod request;

pub use cache::{Admission, ViewCache};
pub use deduce::{deduce_view_type, overflow_for};
pub use diagnostics::{CacheCounters, CacheDiagnostics, CachedViewSummary, SurfaceEntry};
pub use request::{PendingView, ViewOutcome, ViewRequest};

use crate::config::ViewCacheConfig;
use crate::model::{Spine, SpineItem, ViewManagerError, ViewerSettings};
use crate::view::{
    ContentLoaded, Direction, PageOpenRequest, PagePosition, View, ViewCreationParams,
    ViewFactory, ViewKind, ViewType,
};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, error, info, trace, warn};

struct Shared {
    spine: Rc<Spine>,
    factory: Rc<dyn ViewFactory>,
    config: ViewCacheConfig,
    viewer_settings: RefCell<ViewerSettings>,
    cache: RefCell<ViewCache>,
}

impl Shared {
    fn promote(&self, view: Rc<dyn View>, event: &ContentLoaded) {
        let index = event.spine_item.index;
        let mut cache = self.cache.borrow_mut();
        match cache.admit(view, event) {
            Admission::Admitted => {
                debug!(index, cached = cache.len(), "View loaded in the background")
            }
            Admission::Duplicate => debug!(index, "Loaded view already cached, not admitted"),
        }
    }
}

/// Pool of rendered views for one spine.
///
/// Cloning yields another handle to the same pool.
#[derive(Clone)]
pub struct ViewManager {
    shared: Rc<Shared>,
}

/// Non-owning back-reference from a view to its manager.
#[derive(Clone)]
pub struct ManagerHandle {
    shared: Weak<Shared>,
}

impl ManagerHandle {
    /// The manager, if it is still alive.
    pub fn upgrade(&self) -> Option<ViewManager> {
        self.shared.upgrade().map(|shared| ViewManager { shared })
    }

    /// Whether the manager has not been dropped yet.
    pub fn is_alive(&self) -> bool {
        self.shared.strong_count() > 0
    }
}

impl fmt::Debug for ManagerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl ViewManager {
    /// Empty pool for `spine`, building views with `factory`.
    pub fn new(spine: Rc<Spine>, factory: Rc<dyn ViewFactory>, config: ViewCacheConfig) -> Self {
        Self {
            shared: Rc::new(Shared {
                spine,
                factory,
                config,
                viewer_settings: RefCell::new(ViewerSettings::default()),
                cache: RefCell::new(ViewCache::new()),
            }),
        }
    }

    /// The spine this manager serves.
    pub fn spine(&self) -> &Spine {
        &self.shared.spine
    }

    /// Eviction window, settle delay and load timeout.
    pub fn config(&self) -> ViewCacheConfig {
        self.shared.config
    }

    /// Settings of the most recent request; defaults before the first one.
    pub fn viewer_settings(&self) -> ViewerSettings {
        self.shared.viewer_settings.borrow().clone()
    }

    /// Weak back-reference handed to every view the manager creates.
    pub fn handle(&self) -> ManagerHandle {
        ManagerHandle {
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Return a view displaying `spine_item`, reusing a cached one if possible.
    ///
    /// `current_view`, if given, is hidden, flagged cached and detached from all
    /// its listeners, even when it is the view about to be reused. Neighbour
    /// prefetch and eviction run on every call, hit or miss.
    ///
    /// A cache hit is returned as [`ViewRequest::Ready`] after the view has been
    /// shown, given `viewer_settings` and sent a synthetic content-loaded
    /// notification. A miss returns [`ViewRequest::Pending`], resolving once
    /// the new view loads plus the settle delay.
    ///
    /// # Errors
    ///
    /// [`ViewManagerError::NotInSpine`] before any side effect if `spine_item`
    /// does not belong to this spine; [`ViewManagerError::Construction`] if the
    /// factory cannot build the primary view.
    ///
    /// # Panics
    ///
    /// Panics if called outside a [`tokio::task::LocalSet`].
    pub fn get_view_for_spine_item(
        &self,
        spine_item: &SpineItem,
        current_view: Option<&Rc<dyn View>>,
        viewer_settings: &ViewerSettings,
        params: &ViewCreationParams,
    ) -> Result<ViewRequest, ViewManagerError> {
        if !self.shared.spine.contains(spine_item) {
            return Err(ViewManagerError::NotInSpine {
                index: spine_item.index,
                len: self.shared.spine.len(),
            });
        }

        *self.shared.viewer_settings.borrow_mut() = viewer_settings.clone();

        if let Some(current) = current_view {
            current.hide();
            current.set_cached(true);
            current.off();
        }

        let cached = self.cached_view_for_spine_item(spine_item);
        self.cache_neighbours_for_spine_item(spine_item, current_view, params);
        self.expire_cached_items(spine_item);

        if let Some(view) = cached {
            self.shared.cache.borrow_mut().counters.hits += 1;
            debug!(index = spine_item.index, "Reusing cached view");

            view.set_cached(false);
            view.show();
            if let Some(view_type) = view.kind().view_type() {
                params.viewport.set_overflow(overflow_for(view_type));
            }
            view.set_view_settings(viewer_settings);

            let surface = self.shared.cache.borrow().surface(spine_item.index);
            view.trigger_content_loaded(ContentLoaded {
                surface,
                spine_item: spine_item.clone(),
            });

            return Ok(ViewRequest::Ready(ViewOutcome {
                is_new: false,
                view,
            }));
        }

        self.shared.cache.borrow_mut().counters.misses += 1;
        debug!(index = spine_item.index, "No cached view, creating one");

        let view = self.create_view_for_item(spine_item, params.clone())?;
        self.save_view_once_loaded(Rc::clone(&view));
        let loaded = view.once_content_loaded();
        view.render();
        view.open_page(PageOpenRequest::first_page(spine_item.clone()), Direction::None);

        Ok(ViewRequest::Pending(PendingView::spawn(
            view,
            spine_item.index,
            loaded,
            self.shared.config.settle_delay,
            self.shared.config.load_timeout,
        )))
    }

    /// First cached view, in insertion order, holding `spine_item`.
    pub fn cached_view_for_spine_item(&self, spine_item: &SpineItem) -> Option<Rc<dyn View>> {
        self.shared.cache.borrow().find(spine_item.index)
    }

    /// Prefetch the neighbours of `spine_item`, assumed to be on screen.
    ///
    /// The step to each neighbour is the number of items `current_view` holds:
    /// 1 for single pages, 2 for spreads, 1 when there is no current view. The
    /// right neighbour opens at its first page, the left one at its last page.
    pub fn cache_neighbours_for_spine_item(
        &self,
        spine_item: &SpineItem,
        current_view: Option<&Rc<dyn View>>,
        params: &ViewCreationParams,
    ) {
        let distance = current_view
            .map(|view| view.loaded_spine_items().len())
            .filter(|&held| held > 0)
            .unwrap_or(1);

        let mut prefetch_params = params.clone();
        prefetch_params.cached_view = true;

        let spine = &self.shared.spine;
        let right = spine_item
            .index
            .checked_add(distance)
            .and_then(|index| spine.get(index));
        let left = spine_item
            .index
            .checked_sub(distance)
            .and_then(|index| spine.get(index));

        for (neighbour, position) in [(right, PagePosition::First), (left, PagePosition::Last)] {
            let Some(neighbour) = neighbour else {
                continue;
            };
            if self.cached_view_for_spine_item(neighbour).is_some() {
                continue;
            }

            match self.create_prefetched_view_for_spine_item(neighbour, position, &prefetch_params)
            {
                Ok(view) => self.save_view_once_loaded(view),
                Err(err) => warn!(index = neighbour.index, error = %err, "Prefetch failed"),
            }
        }
    }

    /// Evict cached views whose first item is outside the window around
    /// `current_spine_item`.
    pub fn expire_cached_items(&self, current_spine_item: &SpineItem) {
        let window = self.shared.config.eviction_window;
        let (stale, remaining) = {
            let mut cache = self.shared.cache.borrow_mut();
            let stale = cache.expire(current_spine_item.index, window);
            (stale, cache.len())
        };

        if stale.is_empty() {
            trace!(remaining, "Pruning cached views, nothing to remove");
            return;
        }

        info!(removed = stale.len(), remaining, "Pruning cached views");
        for view in stale {
            view.remove();
        }
    }

    /// Logical type of `view`.
    ///
    /// Host-specific kinds are logged as an error and yield `None`.
    pub fn view_type_for_view(&self, view: Option<&Rc<dyn View>>) -> Option<ViewType> {
        let kind = view?.kind();
        let view_type = kind.view_type();
        if view_type.is_none() {
            error!(kind = %kind, "Unrecognized view type");
        }
        view_type
    }

    /// Snapshot of the cache for debugging.
    pub fn diagnostics(&self) -> CacheDiagnostics {
        CacheDiagnostics::capture(
            &self.shared.cache.borrow(),
            self.shared.config.eviction_window,
        )
    }

    /// Admit `view` into the cache once it reports loaded.
    ///
    /// Views that never load are never admitted and are not tracked.
    fn save_view_once_loaded(&self, view: Rc<dyn View>) {
        let listener = view.once_content_loaded();
        let shared = Rc::downgrade(&self.shared);

        tokio::task::spawn_local(async move {
            let Some(event) = listener.wait().await else {
                trace!("View detached before loading, not caching it");
                return;
            };
            if let Some(shared) = shared.upgrade() {
                shared.promote(view, &event);
            }
        });
    }

    fn create_prefetched_view_for_spine_item(
        &self,
        spine_item: &SpineItem,
        position: PagePosition,
        params: &ViewCreationParams,
    ) -> Result<Rc<dyn View>, ViewManagerError> {
        if let Some(cached) = self.cached_view_for_spine_item(spine_item) {
            return Ok(cached);
        }

        let view = self.create_view_for_item(spine_item, params.clone())?;
        self.shared.cache.borrow_mut().counters.prefetches += 1;
        debug!(index = spine_item.index, ?position, "Prefetching neighbour");

        view.render();
        view.open_page(
            PageOpenRequest::at(spine_item.clone(), position),
            position.direction(),
        );
        view.set_cached(true);
        Ok(view)
    }

    fn create_view_for_item(
        &self,
        spine_item: &SpineItem,
        mut params: ViewCreationParams,
    ) -> Result<Rc<dyn View>, ViewManagerError> {
        let settings = self.viewer_settings();
        let view_type = deduce_view_type(spine_item, &settings);
        let kind = ViewKind::for_type(view_type);

        // Prefetched views are off-screen; only the primary view owns the viewport style.
        if !params.cached_view {
            params.viewport.set_overflow(overflow_for(view_type));
        }
        params.view_settings = Some(settings);

        let view = self
            .shared
            .factory
            .create_view(kind.clone(), spine_item, &params, self.handle())
            .map_err(|source| ViewManagerError::Construction {
                index: spine_item.index,
                kind: kind.clone(),
                source,
            })?;

        trace!(index = spine_item.index, %kind, cached_view = params.cached_view, "Created view");
        Ok(view)
    }
}

impl fmt::Debug for ViewManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewManager")
            .field("spine_len", &self.shared.spine.len())
            .field("config", &self.shared.config)
            .field("cached_views", &self.shared.cache.borrow().len())
            .finish()
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
