// Shared state structs to avoid circular dependencies.
// These are used by the modules and can be tested independently.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Vertical pixel offset of a scrollable surface. May be negative (overscroll).
pub type ScrollOffset = f64;

/// Serializable snapshot of one tab's transient UI state.
///
/// Every field is optional. A bundle with no fields set is never written to storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabStateBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_offset: Option<ScrollOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_data: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_state: Option<Map<String, Value>>,
}

impl TabStateBundle {
    pub fn is_empty(&self) -> bool {
        self.scroll_offset.is_none()
            && self.filters.is_none()
            && self.form_data.is_none()
            && self.selected_index.is_none()
            && self.custom_state.is_none()
    }

    /// Shallow merge: every field set on `partial` replaces ours.
    pub fn merge(&mut self, partial: TabStateBundle) {
        if partial.scroll_offset.is_some() {
            self.scroll_offset = partial.scroll_offset;
        }
        if partial.filters.is_some() {
            self.filters = partial.filters;
        }
        if partial.form_data.is_some() {
            self.form_data = partial.form_data;
        }
        if partial.selected_index.is_some() {
            self.selected_index = partial.selected_index;
        }
        if partial.custom_state.is_some() {
            self.custom_state = partial.custom_state;
        }
    }

    pub fn with_scroll_offset(offset: ScrollOffset) -> Self {
        Self {
            scroll_offset: Some(offset),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TabEventKind {
    TabPress,
    TabDoublePress,
    TabReselect,
    TabDoublePulse,
}

/// An event travelling through the navigation event source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabEvent {
    #[serde(rename = "type")]
    pub kind: TabEventKind,
    pub target: String,
}

impl TabEvent {
    pub fn new(kind: TabEventKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentOffset {
    pub x: f64,
    pub y: f64,
}

/// Scroll callback payload as delivered by a list surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollEvent {
    pub content_offset: ContentOffset,
}

impl ScrollEvent {
    pub fn at(y: f64) -> Self {
        Self {
            content_offset: ContentOffset { x: 0.0, y },
        }
    }
}
