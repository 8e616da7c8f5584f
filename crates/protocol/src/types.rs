use serde::{Deserialize, Serialize};

use crate::section_id::SectionId;

/// Vertical extent of an element relative to the viewport top, in pixels.
///
/// Negative `top` means the element starts above the visible area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub top: f64,
    pub bottom: f64,
}

impl Bounds {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    /// Whether a horizontal line `line` pixels below the viewport top
    /// crosses this element (edges inclusive).
    pub fn contains_line(&self, line: f64) -> bool {
        self.top <= line && self.bottom >= line
    }
}

/// A named, anchorable region of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationSection {
    pub id: SectionId,
    pub label: String,
    /// Subtracted from the section's document position when navigating, so
    /// the fixed header does not cover the section heading.
    #[serde(default)]
    pub vertical_offset: i32,
}

impl NavigationSection {
    pub fn new(id: impl Into<SectionId>, label: impl Into<String>, vertical_offset: i32) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            vertical_offset,
        }
    }
}

/// Geometry of one section as measured by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionGeometry {
    pub id: SectionId,
    /// Viewport-relative top edge.
    pub top: f64,
    /// Viewport-relative bottom edge.
    pub bottom: f64,
    /// Distance from the document top (the DOM `offsetTop`).
    pub document_top: f64,
}

/// A snapshot of the page as measured by a host on a scroll or resize event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub scroll_offset: f64,
    pub viewport_height: f64,
    pub sections: Vec<SectionGeometry>,
}

impl PageGeometry {
    pub fn section(&self, id: &str) -> Option<&SectionGeometry> {
        self.sections.iter().find(|s| s.id == id)
    }
}

/// Result of warming one asset. Both outcomes settle the asset the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetOutcome {
    Loaded,
    Failed,
}
