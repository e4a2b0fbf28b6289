//! View type deduction.
//!
//! Priority: the reader's scroll mode, then fixed layout, then the item's own
//! flow, then columnized.

use crate::model::{ScrollMode, SpineItem, ViewerSettings};
use crate::view::{Overflow, ViewType};

/// View type to construct for `spine_item` under `settings`.
pub fn deduce_view_type(spine_item: &SpineItem, settings: &ViewerSettings) -> ViewType {
    match settings.scroll {
        ScrollMode::ScrollDoc => return ViewType::ScrolledDoc,
        ScrollMode::ScrollContinuous => return ViewType::ScrolledContinuous,
        ScrollMode::Auto => {}
    }

    // Fixed layout ignores flow.
    if spine_item.is_fixed_layout() {
        return ViewType::Fixed;
    }

    if spine_item.is_flow_scrolled_doc() {
        return ViewType::ScrolledDoc;
    }

    if spine_item.is_flow_scrolled_continuous() {
        return ViewType::ScrolledContinuous;
    }

    ViewType::Columnized
}

/// Viewport overflow for a view type. Fixed views pan when zoomed.
pub fn overflow_for(view_type: ViewType) -> Overflow {
    match view_type {
        ViewType::Fixed => Overflow::Auto,
        _ => Overflow::Hidden,
    }
}
