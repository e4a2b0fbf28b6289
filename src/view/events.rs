//! One-shot "content document loaded" signalling between views and the manager.
//!
//! Every subscription gets its own oneshot channel. Triggering consumes all
//! current subscriptions; detaching drops the senders, which resolves the
//! matching listeners with `None`.

use crate::model::SpineItem;
use crate::view::SurfaceHandle;
use std::cell::RefCell;
use tokio::sync::oneshot;

/// Payload of a content-loaded notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLoaded {
    /// Rendering surface holding the loaded document, if known.
    ///
    /// `None` on a synthesized notification for a cached view whose surface was
    /// never recorded.
    pub surface: Option<SurfaceHandle>,
    /// Spine item whose document finished loading.
    pub spine_item: SpineItem,
}

/// Registry of pending one-shot content-loaded listeners.
///
/// Views embed one of these and expose it through
/// [`View::events`](crate::view::View::events).
#[derive(Debug, Default)]
pub struct LoadedEvents {
    listeners: RefCell<Vec<oneshot::Sender<ContentLoaded>>>,
}

impl LoadedEvents {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to the next content-loaded notification.
    pub fn once(&self) -> LoadedListener {
        let (tx, rx) = oneshot::channel();
        self.listeners.borrow_mut().push(tx);
        LoadedListener { rx }
    }

    /// Detach every pending listener.
    pub fn off(&self) {
        self.listeners.borrow_mut().clear();
    }

    /// Deliver `event` to every pending listener and forget them.
    ///
    /// Returns how many listeners were still waiting.
    pub fn trigger(&self, event: &ContentLoaded) -> usize {
        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        listeners
            .into_iter()
            .filter_map(|tx| tx.send(event.clone()).ok())
            .count()
    }

    /// Listeners still waiting for a notification.
    pub fn pending(&self) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|tx| !tx.is_closed())
            .count()
    }
}

/// Receiving half of a one-shot content-loaded subscription.
#[derive(Debug)]
pub struct LoadedListener {
    rx: oneshot::Receiver<ContentLoaded>,
}

impl LoadedListener {
    /// Wait for the notification.
    ///
    /// Resolves to `None` if the listener was detached before the view loaded.
    pub async fn wait(self) -> Option<ContentLoaded> {
        self.rx.await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(index: usize) -> ContentLoaded {
        ContentLoaded {
            surface: Some(SurfaceHandle::new(index as u64)),
            spine_item: SpineItem::new(index, format!("item-{index}")),
        }
    }

    #[tokio::test]
    async fn trigger_reaches_every_listener_once() {
        let events = LoadedEvents::new();
        let first = events.once();
        let second = events.once();

        assert_eq!(events.trigger(&loaded(3)), 2);
        assert_eq!(first.wait().await, Some(loaded(3)));
        assert_eq!(second.wait().await, Some(loaded(3)));

        // Listeners are one-shot.
        assert_eq!(events.trigger(&loaded(4)), 0);
    }

    #[tokio::test]
    async fn off_resolves_listeners_with_none() {
        let events = LoadedEvents::new();
        let listener = events.once();

        events.off();

        assert_eq!(listener.wait().await, None);
        assert_eq!(events.pending(), 0);
    }

    #[test]
    fn dropped_listener_is_not_pending() {
        let events = LoadedEvents::new();
        let kept = events.once();
        drop(events.once());

        assert_eq!(events.pending(), 1);
        assert_eq!(events.trigger(&loaded(0)), 1);
        drop(kept);
    }
}
