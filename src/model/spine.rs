//! Spine items and the ordered spine.
//!
//! A spine item's `index` is always its position in the owning [`Spine`];
//! [`Spine::new`] renumbers items so callers cannot build a spine whose
//! indices disagree with their positions.

use crate::model::error::ManifestError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rendition layout declared by the package for a spine item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// Content reflows into the viewport (default).
    #[default]
    Reflowable,
    /// Fixed layout: every page has its own intrinsic size.
    PrePaginated,
}

/// Rendition flow declared by the package for a spine item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Flow {
    /// No preference; the reader decides.
    #[default]
    Auto,
    /// Paginated columns.
    Paginated,
    /// One continuous scroll across documents.
    ScrolledContinuous,
    /// Each document scrolls on its own.
    ScrolledDoc,
}

/// One addressable unit of the spine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpineItem {
    /// Position within the spine.
    pub index: usize,
    /// Manifest id this item refers to.
    pub idref: String,
    /// Declared layout.
    #[serde(default)]
    pub layout: Layout,
    /// Declared flow.
    #[serde(default)]
    pub flow: Flow,
}

impl SpineItem {
    /// Create a reflowable, auto-flow spine item.
    pub fn new(index: usize, idref: impl Into<String>) -> Self {
        Self {
            index,
            idref: idref.into(),
            layout: Layout::default(),
            flow: Flow::default(),
        }
    }

    /// Builder: set the layout.
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Builder: set the flow.
    pub fn with_flow(mut self, flow: Flow) -> Self {
        self.flow = flow;
        self
    }

    /// Pre-paginated item.
    pub fn is_fixed_layout(&self) -> bool {
        self.layout == Layout::PrePaginated
    }

    /// Item asks to be scrolled as one document.
    pub fn is_flow_scrolled_doc(&self) -> bool {
        self.flow == Flow::ScrolledDoc
    }

    /// Item asks to be scrolled continuously with its neighbours.
    pub fn is_flow_scrolled_continuous(&self) -> bool {
        self.flow == Flow::ScrolledContinuous
    }
}

/// Entry of a spine manifest file. Indices come from position.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestEntry {
    idref: String,
    #[serde(default)]
    layout: Layout,
    #[serde(default)]
    flow: Flow,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpineManifest {
    items: Vec<ManifestEntry>,
}

/// Ordered sequence of spine items. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Spine {
    items: Vec<SpineItem>,
}

impl Spine {
    /// Build a spine, renumbering every item to its position.
    pub fn new(items: impl IntoIterator<Item = SpineItem>) -> Self {
        let items = items
            .into_iter()
            .enumerate()
            .map(|(index, mut item)| {
                item.index = index;
                item
            })
            .collect();
        Self { items }
    }

    /// Reflowable spine with idrefs `item-0`, `item-1`, ...
    pub fn reflowable(len: usize) -> Self {
        Self::new((0..len).map(|i| SpineItem::new(i, format!("item-{i}"))))
    }

    /// Parse a JSON manifest of the form `{"items": [{"idref": "..."}, ...]}`.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Json`] for malformed JSON and
    /// [`ManifestError::Empty`] when the manifest lists no items.
    pub fn from_manifest_json(json: &str) -> Result<Self, ManifestError> {
        let manifest: SpineManifest = serde_json::from_str(json)?;
        if manifest.items.is_empty() {
            return Err(ManifestError::Empty);
        }

        Ok(Self::new(manifest.items.into_iter().map(|entry| SpineItem {
            index: 0,
            idref: entry.idref,
            layout: entry.layout,
            flow: entry.flow,
        })))
    }

    /// Read and parse a JSON manifest file.
    ///
    /// # Errors
    ///
    /// [`ManifestError::Io`] if the file cannot be read, otherwise as
    /// [`Spine::from_manifest_json`].
    pub fn load_manifest(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_manifest_json(&contents)
    }

    /// Item at `index`.
    pub fn get(&self, index: usize) -> Option<&SpineItem> {
        self.items.get(index)
    }

    /// Items in reading order.
    pub fn items(&self) -> &[SpineItem] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the spine has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether `item` is the member of this spine at its own index.
    pub fn contains(&self, item: &SpineItem) -> bool {
        self.get(item.index).is_some_and(|own| own == item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_renumbers_items_by_position() {
        let spine = Spine::new(vec![SpineItem::new(7, "a"), SpineItem::new(7, "b")]);

        assert_eq!(spine.get(0).map(|i| i.index), Some(0));
        assert_eq!(spine.get(1).map(|i| i.index), Some(1));
        assert_eq!(spine.get(1).map(|i| i.idref.as_str()), Some("b"));
    }

    #[test]
    fn get_out_of_range_is_none() {
        let spine = Spine::reflowable(3);
        assert!(spine.get(3).is_none());
        assert_eq!(spine.len(), 3);
        assert!(!spine.is_empty());
    }

    #[test]
    fn contains_rejects_foreign_items() {
        let spine = Spine::reflowable(3);
        assert!(spine.contains(&SpineItem::new(1, "item-1")));
        assert!(!spine.contains(&SpineItem::new(1, "other")));
        assert!(!spine.contains(&SpineItem::new(5, "item-5")));
    }

    #[test]
    fn layout_flags_follow_declared_properties() {
        let fixed = SpineItem::new(0, "cover").with_layout(Layout::PrePaginated);
        let doc = SpineItem::new(1, "ch1").with_flow(Flow::ScrolledDoc);
        let cont = SpineItem::new(2, "ch2").with_flow(Flow::ScrolledContinuous);

        assert!(fixed.is_fixed_layout());
        assert!(!fixed.is_flow_scrolled_doc());
        assert!(doc.is_flow_scrolled_doc());
        assert!(cont.is_flow_scrolled_continuous());
        assert!(!cont.is_fixed_layout());
    }

    #[test]
    fn manifest_json_parses_items_with_defaults() {
        let json = r#"{
            "items": [
                {"idref": "cover", "layout": "pre-paginated"},
                {"idref": "ch1"},
                {"idref": "ch2", "flow": "scrolled-doc"}
            ]
        }"#;

        let spine = Spine::from_manifest_json(json).expect("valid manifest");

        assert_eq!(spine.len(), 3);
        assert!(spine.get(0).unwrap().is_fixed_layout());
        assert_eq!(spine.get(1).unwrap().layout, Layout::Reflowable);
        assert_eq!(spine.get(1).unwrap().flow, Flow::Auto);
        assert!(spine.get(2).unwrap().is_flow_scrolled_doc());
        assert_eq!(spine.get(2).unwrap().index, 2);
    }

    #[test]
    fn manifest_json_rejects_empty_spine() {
        let result = Spine::from_manifest_json(r#"{"items": []}"#);
        assert!(matches!(result, Err(ManifestError::Empty)));
    }

    #[test]
    fn load_manifest_reports_missing_file() {
        let result = Spine::load_manifest("/nonexistent/spineview/manifest.json");
        assert!(matches!(result, Err(ManifestError::Io(_))));
    }

    #[test]
    fn manifest_json_rejects_unknown_fields() {
        let result = Spine::from_manifest_json(r#"{"items": [{"idref": "a", "linear": true}]}"#);
        assert!(matches!(result, Err(ManifestError::Json(_))));
    }
}
