//! Error types for spineview.
//!
//! Errors are split by where they surface:
//!
//! - [`ViewManagerError`] - returned synchronously from a view request, before any
//!   view has been handed back to the caller
//! - [`ViewLoadError`] - resolution of a pending request whose view never finished
//!   loading
//! - [`ViewError`] - reported by a host [`ViewFactory`](crate::view::ViewFactory)
//!   when it cannot build a view
//! - [`ManifestError`] - spine manifest parsing
//!
//! # Recovery Strategy
//!
//! Prefetch failures are **non-fatal**: a neighbour that cannot be built is logged
//! and skipped, and the primary request carries on. Failures on the primary view
//! propagate to the caller.

use crate::view::ViewKind;
use std::time::Duration;
use thiserror::Error;

/// Errors returned synchronously by
/// [`ViewManager::get_view_for_spine_item`](crate::manager::ViewManager::get_view_for_spine_item).
#[derive(Debug, Error)]
pub enum ViewManagerError {
    /// The host factory failed to construct the primary view.
    ///
    /// **Recovery**: show an error page for the spine item. The cache is left as it
    /// was after prefetch and eviction ran.
    #[error("Failed to create {kind} view for spine item {index}: {source}")]
    Construction {
        /// Index of the requested spine item.
        index: usize,
        /// View variant the manager asked for.
        kind: ViewKind,
        /// Factory error.
        #[source]
        source: ViewError,
    },

    /// The requested spine item is not a member of the manager's spine.
    ///
    /// Checked before any side effect, so the current view is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use spineview::model::error::ViewManagerError;
    ///
    /// let err = ViewManagerError::NotInSpine { index: 12, len: 10 };
    /// assert!(err.to_string().contains("12"));
    /// ```
    #[error("Spine item {index} is not part of the spine (length {len})")]
    NotInSpine {
        /// Index carried by the rejected item.
        index: usize,
        /// Length of the spine.
        len: usize,
    },
}

/// Errors resolving a pending view request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ViewLoadError {
    /// The view dropped its content-loaded listeners before loading finished.
    ///
    /// This happens when the view is detached with `off()`, typically because the
    /// reader moved on and passed it as the current view of a newer request.
    #[error("View for spine item {index} was abandoned before it finished loading")]
    Abandoned {
        /// Index of the requested spine item.
        index: usize,
    },

    /// The view did not report loaded within the configured load timeout.
    ///
    /// Only produced when `load_timeout_ms` is configured. The view stays eligible
    /// for caching if it loads later.
    #[error("View for spine item {index} did not load within {timeout:?}")]
    TimedOut {
        /// Index of the requested spine item.
        index: usize,
        /// Configured timeout.
        timeout: Duration,
    },
}

/// Errors a host factory reports when it cannot construct a view.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// The host has no implementation for this view variant.
    #[error("Unsupported view kind: {0}")]
    Unsupported(ViewKind),

    /// The host failed for its own reasons (missing resources, surface creation).
    #[error("{0}")]
    Host(String),
}

/// Errors loading a spine manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Failed to read the manifest file.
    #[error("Failed to read spine manifest: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest is not valid JSON or has unexpected fields.
    #[error("Invalid spine manifest: {0}")]
    Json(#[from] serde_json::Error),

    /// Manifest lists no spine items.
    #[error("Spine manifest contains no items")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_error_names_kind_and_index() {
        let err = ViewManagerError::Construction {
            index: 4,
            kind: ViewKind::Fixed,
            source: ViewError::Host("surface pool exhausted".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("fixed"), "got: {msg}");
        assert!(msg.contains("spine item 4"), "got: {msg}");
        assert!(msg.contains("surface pool exhausted"), "got: {msg}");
    }

    #[test]
    fn construction_error_exposes_source() {
        use std::error::Error as _;

        let err = ViewManagerError::Construction {
            index: 0,
            kind: ViewKind::Reflowable,
            source: ViewError::Unsupported(ViewKind::Reflowable),
        };
        assert!(err.source().is_some());
    }

    #[test]
    fn timed_out_reports_duration() {
        let err = ViewLoadError::TimedOut {
            index: 2,
            timeout: Duration::from_millis(500),
        };
        assert!(err.to_string().contains("500ms"));
    }
}
