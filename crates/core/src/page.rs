//! A simulated page: sections stacked top to bottom in a scrollable
//! document, with the browser's smooth scrolling approximated by an
//! ease-in-out animation. Used by the terminal host and by tests that need
//! a page to scroll.

use folio_protocol::{Bounds, Easing, PageGeometry, SectionGeometry, SectionId};

use crate::scroll_spy::PageHost;

pub const DEFAULT_SMOOTH_SCROLL_MS: u64 = 600;

#[derive(Debug, Clone)]
struct PageSection {
    id: SectionId,
    document_top: f64,
    height: f64,
}

#[derive(Debug, Clone, Copy)]
struct ScrollAnimation {
    from: f64,
    to: f64,
    started_ms: u64,
}

#[derive(Debug, Clone)]
pub struct VirtualPage {
    viewport_height: f64,
    sections: Vec<PageSection>,
    scroll: f64,
    animation: Option<ScrollAnimation>,
    smooth_scroll_ms: u64,
}

impl VirtualPage {
    pub fn new(viewport_height: f64) -> Self {
        Self {
            viewport_height: viewport_height.max(0.0),
            sections: Vec::new(),
            scroll: 0.0,
            animation: None,
            smooth_scroll_ms: DEFAULT_SMOOTH_SCROLL_MS,
        }
    }

    /// Build a page from `(id, height)` pairs laid out without gaps.
    pub fn stacked<I, S>(viewport_height: f64, sections: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<SectionId>,
    {
        let mut page = Self::new(viewport_height);
        for (id, height) in sections {
            page.push_section(id, height);
        }
        page
    }

    pub fn with_smooth_scroll_ms(mut self, ms: u64) -> Self {
        self.smooth_scroll_ms = ms;
        self
    }

    /// Append a section below the last one.
    pub fn push_section(&mut self, id: impl Into<SectionId>, height: f64) {
        let document_top = self.document_height();
        self.sections.push(PageSection {
            id: id.into(),
            document_top,
            height: height.max(0.0),
        });
    }

    pub fn document_height(&self) -> f64 {
        self.sections.last().map_or(0.0, |s| s.document_top + s.height)
    }

    pub fn max_scroll(&self) -> f64 {
        (self.document_height() - self.viewport_height).max(0.0)
    }

    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = height.max(0.0);
        self.scroll = self.clamp(self.scroll);
    }

    /// Jump to `top`. Cancels any running smooth scroll, the way a user
    /// scroll interrupts one in a browser.
    pub fn scroll_to(&mut self, top: f64) {
        self.animation = None;
        self.scroll = self.clamp(top);
    }

    pub fn scroll_by(&mut self, delta: f64) {
        self.scroll_to(self.scroll + delta);
    }

    pub fn smooth_scroll_to(&mut self, top: f64, now_ms: u64) {
        let to = self.clamp(top);
        if self.smooth_scroll_ms == 0 {
            self.scroll_to(to);
            return;
        }
        self.animation = Some(ScrollAnimation {
            from: self.scroll,
            to,
            started_ms: now_ms,
        });
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Advance a running smooth scroll to `now_ms`. Returns whether the
    /// scroll position changed.
    pub fn step(&mut self, now_ms: u64) -> bool {
        let Some(anim) = self.animation else {
            return false;
        };
        let elapsed = now_ms.saturating_sub(anim.started_ms);
        let before = self.scroll;
        if elapsed >= self.smooth_scroll_ms {
            self.scroll = anim.to;
            self.animation = None;
        } else {
            let t = elapsed as f64 / self.smooth_scroll_ms as f64;
            self.scroll = anim.from + (anim.to - anim.from) * Easing::EaseInOut.apply(t);
        }
        self.scroll != before
    }

    /// Snapshot in the shape browser hosts send over the bridge.
    pub fn geometry(&self) -> PageGeometry {
        PageGeometry {
            scroll_offset: self.scroll,
            viewport_height: self.viewport_height,
            sections: self
                .sections
                .iter()
                .map(|s| SectionGeometry {
                    id: s.id.clone(),
                    top: s.document_top - self.scroll,
                    bottom: s.document_top + s.height - self.scroll,
                    document_top: s.document_top,
                })
                .collect(),
        }
    }

    fn clamp(&self, top: f64) -> f64 {
        top.clamp(0.0, self.max_scroll())
    }

    fn find(&self, id: &str) -> Option<&PageSection> {
        self.sections.iter().find(|s| s.id == id)
    }
}

impl PageHost for VirtualPage {
    fn scroll_offset(&self) -> f64 {
        self.scroll
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn section_bounds(&self, id: &SectionId) -> Option<Bounds> {
        self.find(id).map(|s| {
            let top = s.document_top - self.scroll;
            Bounds::new(top, top + s.height)
        })
    }

    fn section_document_top(&self, id: &SectionId) -> Option<f64> {
        self.find(id).map(|s| s.document_top)
    }
}
