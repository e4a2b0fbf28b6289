//! Completion of a view request.
//!
//! A request for a cached item is ready immediately. A request that built a new
//! view resolves once the view reports loaded, after yielding to the task queue
//! and waiting the settle delay.

use crate::model::ViewLoadError;
use crate::view::{LoadedListener, View};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

/// The view to display and whether it was newly created.
#[derive(Clone)]
pub struct ViewOutcome {
    /// `false` for a cache hit.
    pub is_new: bool,
    /// View holding the requested item.
    pub view: Rc<dyn View>,
}

impl fmt::Debug for ViewOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewOutcome")
            .field("is_new", &self.is_new)
            .field("kind", &self.view.kind())
            .finish()
    }
}

/// Result of [`ViewManager::get_view_for_spine_item`](crate::manager::ViewManager::get_view_for_spine_item).
pub enum ViewRequest {
    /// Cache hit, already reactivated.
    Ready(ViewOutcome),
    /// New view, still loading.
    Pending(PendingView),
}

impl ViewRequest {
    /// The view this request concerns, whether or not it is ready.
    pub fn view(&self) -> &Rc<dyn View> {
        match self {
            ViewRequest::Ready(outcome) => &outcome.view,
            ViewRequest::Pending(pending) => pending.view(),
        }
    }

    /// Whether this was a cache hit.
    pub fn is_ready(&self) -> bool {
        matches!(self, ViewRequest::Ready(_))
    }

    /// Wait for the request to complete.
    pub async fn resolve(self) -> Result<ViewOutcome, ViewLoadError> {
        match self {
            ViewRequest::Ready(outcome) => Ok(outcome),
            ViewRequest::Pending(pending) => pending.wait().await,
        }
    }
}

impl fmt::Debug for ViewRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewRequest::Ready(outcome) => f.debug_tuple("Ready").field(outcome).finish(),
            ViewRequest::Pending(pending) => f.debug_tuple("Pending").field(pending).finish(),
        }
    }
}

/// A newly created view waiting for its content to load.
///
/// Completion is driven by a local task started with the request, so the settle
/// delay runs from the load event whether or not anyone is awaiting yet.
pub struct PendingView {
    view: Rc<dyn View>,
    index: usize,
    done: oneshot::Receiver<Result<ViewOutcome, ViewLoadError>>,
    settle_delay: Duration,
    load_timeout: Option<Duration>,
}

impl PendingView {
    /// Start waiting on `loaded` in the background.
    ///
    /// Must be called inside a [`tokio::task::LocalSet`].
    pub(crate) fn spawn(
        view: Rc<dyn View>,
        index: usize,
        loaded: LoadedListener,
        settle_delay: Duration,
        load_timeout: Option<Duration>,
    ) -> Self {
        let (tx, done) = oneshot::channel();
        let completed = Rc::clone(&view);
        tokio::task::spawn_local(async move {
            let result = complete(completed, index, loaded, settle_delay, load_timeout).await;
            // Nobody is listening if the request was dropped.
            let _ = tx.send(result);
        });

        Self {
            view,
            index,
            done,
            settle_delay,
            load_timeout,
        }
    }

    /// The view being loaded.
    pub fn view(&self) -> &Rc<dyn View> {
        &self.view
    }

    /// Spine index the view was opened at.
    pub fn spine_index(&self) -> usize {
        self.index
    }

    /// Wait for the view to load, then for the settle delay.
    ///
    /// Both are measured from when the request was made, not from this call.
    ///
    /// # Errors
    ///
    /// [`ViewLoadError::Abandoned`] if the view's listeners were detached first,
    /// [`ViewLoadError::TimedOut`] if a load timeout is configured and expires.
    pub async fn wait(self) -> Result<ViewOutcome, ViewLoadError> {
        let index = self.index;
        self.done
            .await
            .unwrap_or(Err(ViewLoadError::Abandoned { index }))
    }
}

async fn complete(
    view: Rc<dyn View>,
    index: usize,
    loaded: LoadedListener,
    settle_delay: Duration,
    load_timeout: Option<Duration>,
) -> Result<ViewOutcome, ViewLoadError> {
    let loaded = match load_timeout {
        Some(timeout) => tokio::time::timeout(timeout, loaded.wait())
            .await
            .map_err(|_| ViewLoadError::TimedOut { index, timeout })?,
        None => loaded.wait().await,
    };

    if loaded.is_none() {
        return Err(ViewLoadError::Abandoned { index });
    }

    // Let the rest of the current turn run, then give layout time to settle.
    tokio::task::yield_now().await;
    tokio::time::sleep(settle_delay).await;

    debug!(index, "New view ready");
    Ok(ViewOutcome {
        is_new: true,
        view,
    })
}

impl fmt::Debug for PendingView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingView")
            .field("index", &self.index)
            .field("kind", &self.view.kind())
            .field("settle_delay", &self.settle_delay)
            .field("load_timeout", &self.load_timeout)
            .finish()
    }
}
