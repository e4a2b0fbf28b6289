//! Domain model types (pure).
//!
//! Spine, spine items, viewer settings and the crate's error taxonomy.

pub mod error;
pub mod settings;
pub mod spine;

// Re-export for convenience
pub use error::{ManifestError, ViewError, ViewLoadError, ViewManagerError};
pub use settings::{ScrollMode, SyntheticSpread, ViewerSettings};
pub use spine::{Flow, Layout, Spine, SpineItem};
