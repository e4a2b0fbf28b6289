//! The view contract.
//!
//! A view renders one or more spine items onto a host surface. The manager only
//! ever talks to views through [`View`]; layout, pagination and drawing stay on
//! the host side.

pub mod events;
pub mod params;

pub use events::{ContentLoaded, LoadedEvents, LoadedListener};
pub use params::{Overflow, ViewCreationParams, ViewFactory, Viewport};

use crate::model::{SpineItem, ViewerSettings};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to the rendering surface (frame) a view drew into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceHandle(u64);

impl SurfaceHandle {
    /// Wrap a host surface id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Host surface id.
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Logical view type as seen by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewType {
    /// Paginated columns.
    Columnized,
    /// Fixed layout pages.
    Fixed,
    /// One document at a time, scrolled.
    ScrolledDoc,
    /// All documents in one continuous scroll.
    ScrolledContinuous,
}

impl ViewType {
    /// Kebab-case name, as used in settings and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewType::Columnized => "columnized",
            ViewType::Fixed => "fixed",
            ViewType::ScrolledDoc => "scrolled-doc",
            ViewType::ScrolledContinuous => "scrolled-continuous",
        }
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete view variant, fixed when the view is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    /// Pre-paginated view.
    Fixed,
    /// Columnized reflowable view.
    Reflowable,
    /// Scrolled view.
    Scrolled {
        /// Scrolls across items rather than one document at a time.
        continuous: bool,
    },
    /// Scrolled stand-in used when the host cannot columnize.
    FallbackScrolled,
    /// Host-specific variant the manager does not know how to classify.
    Other(String),
}

impl ViewKind {
    /// Variant the manager constructs for a deduced view type.
    pub fn for_type(view_type: ViewType) -> Self {
        match view_type {
            ViewType::Fixed => ViewKind::Fixed,
            ViewType::ScrolledDoc => ViewKind::Scrolled { continuous: false },
            ViewType::ScrolledContinuous => ViewKind::Scrolled { continuous: true },
            ViewType::Columnized => ViewKind::Reflowable,
        }
    }

    /// Logical type of this variant; `None` for [`ViewKind::Other`].
    ///
    /// A fallback scrolled view reports as columnized since it stands in for one.
    pub fn view_type(&self) -> Option<ViewType> {
        match self {
            ViewKind::Reflowable | ViewKind::FallbackScrolled => Some(ViewType::Columnized),
            ViewKind::Fixed => Some(ViewType::Fixed),
            ViewKind::Scrolled { continuous: true } => Some(ViewType::ScrolledContinuous),
            ViewKind::Scrolled { continuous: false } => Some(ViewType::ScrolledDoc),
            ViewKind::Other(_) => None,
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewKind::Fixed => f.write_str("fixed"),
            ViewKind::Reflowable => f.write_str("reflowable"),
            ViewKind::Scrolled { continuous: true } => f.write_str("scrolled-continuous"),
            ViewKind::Scrolled { continuous: false } => f.write_str("scrolled-doc"),
            ViewKind::FallbackScrolled => f.write_str("fallback-scrolled"),
            ViewKind::Other(name) => f.write_str(name),
        }
    }
}

/// Which end of a spine item a view should open at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PagePosition {
    /// First page of the item.
    First,
    /// Last page of the item.
    Last,
}

/// Direction of travel that led to a page being opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Direct jump, no animation.
    None,
    /// Arrived from the following item (opened at its last page).
    Backward,
    /// Arrived from the preceding item (opened at its first page).
    Forward,
}

impl PagePosition {
    /// Direction of travel that opens an item at this end.
    pub fn direction(&self) -> Direction {
        match self {
            PagePosition::First => Direction::Forward,
            PagePosition::Last => Direction::Backward,
        }
    }
}

/// Request to open a view at one end of a spine item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOpenRequest {
    /// Item to open.
    pub spine_item: SpineItem,
    /// End to open it at.
    pub position: PagePosition,
}

impl PageOpenRequest {
    /// Open `spine_item` at its first page.
    pub fn first_page(spine_item: SpineItem) -> Self {
        Self {
            spine_item,
            position: PagePosition::First,
        }
    }

    /// Open `spine_item` at its last page.
    pub fn last_page(spine_item: SpineItem) -> Self {
        Self {
            spine_item,
            position: PagePosition::Last,
        }
    }

    /// Open `spine_item` at `position`.
    pub fn at(spine_item: SpineItem, position: PagePosition) -> Self {
        Self {
            spine_item,
            position,
        }
    }
}

/// A rendering unit for one or more spine items.
///
/// All methods take `&self`; implementations use interior mutability, matching
/// the single-threaded model the manager runs in.
///
/// `kind` and `loaded_spine_items` are called while the manager's cache is
/// borrowed and must not call back into the manager.
pub trait View {
    /// Variant tag, set at construction.
    fn kind(&self) -> ViewKind;

    /// Start rendering into the host surface.
    fn render(&self);

    /// Make the view visible.
    fn show(&self);

    /// Hide the view without tearing it down.
    fn hide(&self);

    /// Flag the view as held off-screen by the cache.
    fn set_cached(&self, cached: bool);

    /// Navigate to one end of a spine item.
    fn open_page(&self, request: PageOpenRequest, direction: Direction);

    /// Spine items currently held, in spine order. Spreads hold two.
    fn loaded_spine_items(&self) -> Vec<SpineItem>;

    /// Apply viewer settings.
    fn set_view_settings(&self, settings: &ViewerSettings);

    /// Detach from the host surface. The view is not reused afterwards.
    fn remove(&self);

    /// Content-loaded listener registry backing the provided methods below.
    fn events(&self) -> &LoadedEvents;

    /// Subscribe to the next content-loaded notification.
    fn once_content_loaded(&self) -> LoadedListener {
        self.events().once()
    }

    /// Detach every content-loaded listener.
    fn off(&self) {
        self.events().off()
    }

    /// Notify listeners that the view's content is loaded.
    fn trigger_content_loaded(&self, event: ContentLoaded) -> usize {
        self.events().trigger(&event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_view_type() {
        for view_type in [
            ViewType::Columnized,
            ViewType::Fixed,
            ViewType::ScrolledDoc,
            ViewType::ScrolledContinuous,
        ] {
            assert_eq!(ViewKind::for_type(view_type).view_type(), Some(view_type));
        }
    }

    #[test]
    fn fallback_scrolled_reports_columnized() {
        assert_eq!(
            ViewKind::FallbackScrolled.view_type(),
            Some(ViewType::Columnized)
        );
    }

    #[test]
    fn other_kind_has_no_view_type() {
        assert_eq!(ViewKind::Other("webgl".to_string()).view_type(), None);
        assert_eq!(ViewKind::Other("webgl".to_string()).to_string(), "webgl");
    }

    #[test]
    fn page_position_maps_to_direction() {
        assert_eq!(PagePosition::First.direction(), Direction::Forward);
        assert_eq!(PagePosition::Last.direction(), Direction::Backward);
    }

    #[test]
    fn surface_handle_displays_id() {
        assert_eq!(SurfaceHandle::new(7).to_string(), "surface#7");
        assert_eq!(SurfaceHandle::new(7).id(), 7);
    }
}
