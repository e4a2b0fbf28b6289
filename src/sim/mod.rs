//! In-memory host: views, factory and viewport that render nothing.
//!
//! Used by the simulation binary and by tests. A [`SimView`] records every call
//! made on it and reports loaded either when told to ([`SimView::finish_loading`])
//! or after a fixed latency once rendered.

pub mod session;

pub use session::{run_navigation, SessionError, SessionReport, StepReport};

use crate::manager::ManagerHandle;
use crate::model::{SpineItem, ViewError, ViewerSettings};
use crate::view::{
    ContentLoaded, Direction, LoadedEvents, Overflow, PageOpenRequest, PagePosition, SurfaceHandle,
    View, ViewCreationParams, ViewFactory, ViewKind, Viewport,
};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;
use tracing::trace;

/// A call made on a [`SimView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimCall {
    /// [`View::render`]
    Render,
    /// [`View::show`]
    Show,
    /// [`View::hide`]
    Hide,
    /// [`View::set_cached`] with the flag passed.
    SetCached(bool),
    /// [`View::open_page`]
    OpenPage {
        /// Spine index of the page request.
        index: usize,
        /// Requested page.
        position: PagePosition,
        /// Direction of travel.
        direction: Direction,
    },
    /// [`View::set_view_settings`]
    SetViewSettings,
    /// [`View::remove`]
    Remove,
    /// [`View::off`]
    Off,
}

#[derive(Debug, Default)]
struct SimViewState {
    events: LoadedEvents,
    loaded: RefCell<Vec<SpineItem>>,
    calls: RefCell<Vec<SimCall>>,
    visible: Cell<bool>,
    cached: Cell<bool>,
    removed: Cell<bool>,
    finished: Cell<bool>,
    settings: RefCell<Option<ViewerSettings>>,
}

impl SimViewState {
    fn finish(&self, surface: SurfaceHandle) -> usize {
        self.finished.set(true);
        let Some(spine_item) = self.loaded.borrow().first().cloned() else {
            return 0;
        };
        self.events.trigger(&ContentLoaded {
            surface: Some(surface),
            spine_item,
        })
    }
}

/// A view that records its calls instead of rendering.
#[derive(Debug)]
pub struct SimView {
    id: u64,
    kind: ViewKind,
    created_for: Option<usize>,
    prefetched: bool,
    latency: Option<Duration>,
    manager: Option<ManagerHandle>,
    state: Rc<SimViewState>,
}

impl SimView {
    fn new(id: u64, kind: ViewKind) -> Self {
        Self {
            id,
            kind,
            created_for: None,
            prefetched: false,
            latency: None,
            manager: None,
            state: Rc::new(SimViewState::default()),
        }
    }

    /// A free-standing view already holding `items`, e.g. a two-page spread.
    pub fn with_loaded(kind: ViewKind, items: Vec<SpineItem>) -> Self {
        let view = Self::new(0, kind);
        *view.state.loaded.borrow_mut() = items;
        view.state.visible.set(true);
        view
    }

    /// Factory-assigned id, 0 for views built by hand.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Spine index the factory built this view for.
    pub fn created_for(&self) -> Option<usize> {
        self.created_for
    }

    /// Whether the view was built as a prefetched neighbour.
    pub fn is_prefetched(&self) -> bool {
        self.prefetched
    }

    /// Back-reference passed at construction.
    pub fn manager(&self) -> Option<&ManagerHandle> {
        self.manager.as_ref()
    }

    /// Report the content as loaded, returning how many listeners heard it.
    ///
    /// Views that hold no spine item yet report nothing.
    pub fn finish_loading(&self) -> usize {
        self.state.finish(SurfaceHandle::new(self.id))
    }

    /// Whether [`SimView::finish_loading`] has delivered an event.
    pub fn has_finished_loading(&self) -> bool {
        self.state.finished.get()
    }

    /// Every call made on the view, in order.
    pub fn calls(&self) -> Vec<SimCall> {
        self.state.calls.borrow().clone()
    }

    /// Page-open calls, in order.
    pub fn opened_pages(&self) -> Vec<(usize, PagePosition, Direction)> {
        self.state
            .calls
            .borrow()
            .iter()
            .filter_map(|call| match *call {
                SimCall::OpenPage {
                    index,
                    position,
                    direction,
                } => Some((index, position, direction)),
                _ => None,
            })
            .collect()
    }

    /// Shown and not hidden since.
    pub fn is_visible(&self) -> bool {
        self.state.visible.get()
    }

    /// Last value passed to `set_cached`.
    pub fn is_cached(&self) -> bool {
        self.state.cached.get()
    }

    /// Torn down by eviction.
    pub fn is_removed(&self) -> bool {
        self.state.removed.get()
    }

    /// Settings last applied, from construction or `set_view_settings`.
    pub fn settings(&self) -> Option<ViewerSettings> {
        self.state.settings.borrow().clone()
    }

    /// Content-loaded listeners still waiting.
    pub fn pending_listeners(&self) -> usize {
        self.state.events.pending()
    }

    fn record(&self, call: SimCall) {
        self.state.calls.borrow_mut().push(call);
    }
}

impl View for SimView {
    fn kind(&self) -> ViewKind {
        self.kind.clone()
    }

    fn render(&self) {
        self.record(SimCall::Render);

        if let Some(latency) = self.latency {
            let state = Rc::clone(&self.state);
            let surface = SurfaceHandle::new(self.id);
            tokio::task::spawn_local(async move {
                tokio::time::sleep(latency).await;
                let heard = state.finish(surface);
                trace!(%surface, heard, "Simulated load finished");
            });
        }
    }

    fn show(&self) {
        self.record(SimCall::Show);
        self.state.visible.set(true);
    }

    fn hide(&self) {
        self.record(SimCall::Hide);
        self.state.visible.set(false);
    }

    fn set_cached(&self, cached: bool) {
        self.record(SimCall::SetCached(cached));
        self.state.cached.set(cached);
    }

    fn open_page(&self, request: PageOpenRequest, direction: Direction) {
        self.record(SimCall::OpenPage {
            index: request.spine_item.index,
            position: request.position,
            direction,
        });
        *self.state.loaded.borrow_mut() = vec![request.spine_item];
    }

    fn loaded_spine_items(&self) -> Vec<SpineItem> {
        self.state.loaded.borrow().clone()
    }

    fn set_view_settings(&self, settings: &ViewerSettings) {
        self.record(SimCall::SetViewSettings);
        *self.state.settings.borrow_mut() = Some(settings.clone());
    }

    fn remove(&self) {
        self.record(SimCall::Remove);
        self.state.removed.set(true);
        self.state.visible.set(false);
    }

    fn events(&self) -> &LoadedEvents {
        &self.state.events
    }

    fn off(&self) {
        self.record(SimCall::Off);
        self.state.events.off();
    }
}

/// Factory of [`SimView`]s that remembers everything it built.
#[derive(Debug, Default)]
pub struct SimFactory {
    latency: Option<Duration>,
    fallback_scrolled: bool,
    next_id: Cell<u64>,
    created: RefCell<Vec<Rc<SimView>>>,
    failing: RefCell<HashSet<usize>>,
}

impl SimFactory {
    /// Views load only when [`SimView::finish_loading`] is called.
    pub fn manual() -> Self {
        Self::default()
    }

    /// Views load `latency` after they are rendered.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Build fallback scrolled views where a reflowable one is asked for.
    pub fn fallback_scrolled(mut self) -> Self {
        self.fallback_scrolled = true;
        self
    }

    /// Make construction fail for the spine item at `index`.
    pub fn fail_for(&self, index: usize) {
        self.failing.borrow_mut().insert(index);
    }

    /// Every view built so far, oldest first.
    pub fn created(&self) -> Vec<Rc<SimView>> {
        self.created.borrow().clone()
    }

    /// Views built for spine index `index`, oldest first.
    pub fn views_for(&self, index: usize) -> Vec<Rc<SimView>> {
        self.created
            .borrow()
            .iter()
            .filter(|view| view.created_for == Some(index))
            .cloned()
            .collect()
    }

    /// Finish loading every view that has not loaded yet. Returns how many
    /// views were finished.
    pub fn finish_all(&self) -> usize {
        let pending: Vec<Rc<SimView>> = self
            .created
            .borrow()
            .iter()
            .filter(|view| !view.has_finished_loading())
            .cloned()
            .collect();
        for view in &pending {
            view.finish_loading();
        }
        pending.len()
    }
}

impl ViewFactory for SimFactory {
    fn create_view(
        &self,
        kind: ViewKind,
        spine_item: &SpineItem,
        params: &ViewCreationParams,
        manager: ManagerHandle,
    ) -> Result<Rc<dyn View>, ViewError> {
        if self.failing.borrow().contains(&spine_item.index) {
            return Err(ViewError::Host(format!(
                "no surface for {}",
                spine_item.idref
            )));
        }

        let kind = match kind {
            ViewKind::Reflowable if self.fallback_scrolled => ViewKind::FallbackScrolled,
            other => other,
        };

        let id = self.next_id.get() + 1;
        self.next_id.set(id);

        let mut view = SimView::new(id, kind);
        view.created_for = Some(spine_item.index);
        view.prefetched = params.cached_view;
        view.latency = self.latency;
        view.manager = Some(manager);
        *view.state.settings.borrow_mut() = params.view_settings.clone();

        let view = Rc::new(view);
        self.created.borrow_mut().push(Rc::clone(&view));
        Ok(view)
    }
}

/// Viewport that remembers the overflow values applied to it.
#[derive(Debug, Default)]
pub struct SimViewport {
    history: RefCell<Vec<Overflow>>,
}

impl SimViewport {
    /// Viewport with no overflow applied yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overflow currently applied.
    pub fn overflow(&self) -> Option<Overflow> {
        self.history.borrow().last().copied()
    }

    /// Every overflow applied, oldest first.
    pub fn history(&self) -> Vec<Overflow> {
        self.history.borrow().clone()
    }
}

impl Viewport for SimViewport {
    fn set_overflow(&self, overflow: Overflow) {
        self.history.borrow_mut().push(overflow);
    }
}
