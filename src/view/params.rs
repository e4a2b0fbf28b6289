//! View construction: creation parameters, the host viewport and the factory seam.

use crate::manager::ManagerHandle;
use crate::model::{SpineItem, ViewError, ViewerSettings};
use crate::view::{View, ViewKind};
use std::fmt;
use std::rc::Rc;

/// Overflow behaviour of the viewport hosting the views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Overflow {
    /// Content is clipped to the viewport.
    Hidden,
    /// Content may be panned (fixed-layout zoom).
    Auto,
}

/// Styling context of the element that hosts rendered views.
pub trait Viewport {
    /// Apply an overflow style.
    fn set_overflow(&self, overflow: Overflow);
}

/// Parameters handed to the [`ViewFactory`] for every view.
///
/// Cloning is shallow: the viewport is shared.
#[derive(Clone)]
pub struct ViewCreationParams {
    /// Host viewport.
    pub viewport: Rc<dyn Viewport>,
    /// Set on prefetched neighbour views so consumers can tell them from the
    /// primary view.
    pub cached_view: bool,
    /// Viewer settings in effect when the view was created. Filled in by the
    /// manager.
    pub view_settings: Option<ViewerSettings>,
}

impl ViewCreationParams {
    /// Params for a primary view in `viewport`.
    pub fn new(viewport: Rc<dyn Viewport>) -> Self {
        Self {
            viewport,
            cached_view: false,
            view_settings: None,
        }
    }
}

impl fmt::Debug for ViewCreationParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewCreationParams")
            .field("cached_view", &self.cached_view)
            .field("view_settings", &self.view_settings)
            .finish_non_exhaustive()
    }
}

/// Host-provided constructor for concrete views.
///
/// The manager decides which [`ViewKind`] to build; the factory instantiates it.
/// `manager` is a non-owning back-reference the view may keep.
pub trait ViewFactory {
    /// Build a view of `kind` for `spine_item`.
    ///
    /// # Errors
    ///
    /// [`ViewError`] if the host cannot construct the variant.
    fn create_view(
        &self,
        kind: ViewKind,
        spine_item: &SpineItem,
        params: &ViewCreationParams,
        manager: ManagerHandle,
    ) -> Result<Rc<dyn View>, ViewError>;
}
