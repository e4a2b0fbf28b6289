//! Reader-wide viewer settings.

use serde::{Deserialize, Serialize};

/// Scroll mode requested by the reader, overriding per-item flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScrollMode {
    /// Use the spine item's declared flow.
    #[default]
    Auto,
    /// Every document scrolls on its own.
    ScrollDoc,
    /// All documents form one continuous scroll.
    ScrollContinuous,
}

impl ScrollMode {
    /// Parse the kebab-case names used in config files and on the command line.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "auto" => Some(Self::Auto),
            "scroll-doc" => Some(Self::ScrollDoc),
            "scroll-continuous" => Some(Self::ScrollContinuous),
            _ => None,
        }
    }
}

/// Two-page spread preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyntheticSpread {
    /// Let the host decide from the viewport width.
    #[default]
    Auto,
    /// Always one page.
    Single,
    /// Always two pages side by side.
    Double,
}

/// Settings applied to every view the manager creates or reactivates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerSettings {
    /// Scroll mode chosen by the reader.
    pub scroll: ScrollMode,
    /// Spread preference.
    pub synthetic_spread: SyntheticSpread,
    /// Font size as a percentage of the publisher default.
    pub font_size: u16,
    /// Gap between columns, in pixels.
    pub column_gap: u16,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            scroll: ScrollMode::Auto,
            synthetic_spread: SyntheticSpread::Auto,
            font_size: 100,
            column_gap: 20,
        }
    }
}

impl ViewerSettings {
    /// Builder: set the scroll mode.
    pub fn with_scroll(mut self, scroll: ScrollMode) -> Self {
        self.scroll = scroll;
        self
    }
}
