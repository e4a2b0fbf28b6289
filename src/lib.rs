//! spineview: rendered-view cache for e-book readers.
//!
//! A reader displays one spine item (content document) at a time. Building a
//! view for an item is slow, so the [`ViewManager`](manager::ViewManager) keeps
//! views that finished loading, prefetches the items on either side of the one
//! being read, and evicts views that drift out of reach.
//!
//! The manager is single-threaded and drives its background work with
//! [`tokio::task::spawn_local`]. Hosts supply views through the
//! [`ViewFactory`](view::ViewFactory) trait; [`sim`] provides an in-memory host.

pub mod config;
pub mod logging;
pub mod manager;
pub mod model;
pub mod sim;
pub mod view;

pub use manager::{ManagerHandle, ViewManager, ViewOutcome, ViewRequest};
pub use model::{Spine, SpineItem, ViewerSettings};
pub use view::{View, ViewCreationParams, ViewFactory, ViewKind, ViewType};
