//! Scroll-spy navigator: highlights the section under the probe line and
//! turns navigation clicks into smooth-scroll requests.
//!
//! The navigator only reads page geometry. The one write to the scroll
//! position it ever causes is the target returned from
//! [`Navigator::navigate_to`], which the host animates. The active section
//! then follows from the scroll events that animation produces.

use std::collections::HashSet;
use std::sync::Arc;

use log::debug;

use folio_protocol::{Bounds, NavigationSection, PageGeometry, SectionId};

use crate::config::NavigatorConfig;
use crate::error::ConfigError;
use crate::scheduler::{Scheduler, TimerId};

/// Geometry a host exposes to the orchestration layer.
pub trait PageHost {
    /// Current document scroll offset, in pixels.
    fn scroll_offset(&self) -> f64;

    fn viewport_height(&self) -> f64;

    /// Viewport-relative bounds of a section, if it is on the page.
    fn section_bounds(&self, id: &SectionId) -> Option<Bounds>;

    /// Distance of a section from the document top, if it is on the page.
    fn section_document_top(&self, id: &SectionId) -> Option<f64>;
}

impl PageHost for PageGeometry {
    fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn section_bounds(&self, id: &SectionId) -> Option<Bounds> {
        self.section(id).map(|s| Bounds::new(s.top, s.bottom))
    }

    fn section_document_top(&self, id: &SectionId) -> Option<f64> {
        self.section(id).map(|s| s.document_top)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavTask {
    Frame,
}

/// Read-only view of the registered section order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionsHandle {
    ids: Arc<[SectionId]>,
}

impl SectionsHandle {
    pub fn ids(&self) -> &[SectionId] {
        &self.ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrollSpyState {
    pub scroll_offset_px: f64,
    pub is_past_threshold: bool,
    pub active_section_id: SectionId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavEvent {
    ActiveChanged(SectionId),
    ChromeScrolled(bool),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigateOutcome {
    /// Absolute scroll target, or `None` for an unregistered or unmeasured id.
    pub scroll_to: Option<f64>,
    /// Whether the mobile menu was open and got closed.
    pub closed_menu: bool,
}

pub struct Navigator {
    config: NavigatorConfig,
    sections: Vec<NavigationSection>,
    handle: Option<SectionsHandle>,
    active: Option<SectionId>,
    scroll_offset: f64,
    past_threshold: bool,
    menu_open: bool,
    frame_timer: Option<TimerId>,
}

impl Navigator {
    pub fn new(config: NavigatorConfig) -> Self {
        Self {
            config,
            sections: Vec::new(),
            handle: None,
            active: None,
            scroll_offset: 0.0,
            past_threshold: false,
            menu_open: false,
            frame_timer: None,
        }
    }

    /// Register the page sections in display order. Allowed once; the
    /// first section is active until a scroll says otherwise.
    pub fn register_sections(&mut self, sections: Vec<NavigationSection>) -> Result<SectionsHandle, ConfigError> {
        if self.handle.is_some() {
            return Err(ConfigError::SectionsAlreadyRegistered);
        }
        if sections.is_empty() {
            return Err(ConfigError::NoSections);
        }
        let mut seen = HashSet::new();
        for section in &sections {
            if !seen.insert(section.id.clone()) {
                return Err(ConfigError::DuplicateSection(section.id.to_string()));
            }
        }

        let handle = SectionsHandle {
            ids: sections.iter().map(|s| s.id.clone()).collect(),
        };
        self.active = Some(sections[0].id.clone());
        self.sections = sections;
        self.handle = Some(handle.clone());
        debug!("navigator: registered {} sections", handle.len());
        Ok(handle)
    }

    pub fn sections(&self) -> &[NavigationSection] {
        &self.sections
    }

    /// `None` only before registration.
    pub fn current_active_section(&self) -> Option<&SectionId> {
        self.active.as_ref()
    }

    pub fn is_past_threshold(&self) -> bool {
        self.past_threshold
    }

    pub fn state(&self) -> Option<ScrollSpyState> {
        Some(ScrollSpyState {
            scroll_offset_px: self.scroll_offset,
            is_past_threshold: self.past_threshold,
            active_section_id: self.active.clone()?,
        })
    }

    /// A scroll or resize event arrived. Coalesces into one frame task.
    pub fn on_scroll<T>(&mut self, frame_ms: u64, sched: &mut Scheduler<T>)
    where
        T: From<NavTask> + Clone,
    {
        if self.frame_timer.is_none() {
            self.frame_timer = Some(sched.set_timeout(frame_ms, NavTask::Frame.into()));
        }
    }

    pub fn frame_pending(&self) -> bool {
        self.frame_timer.is_some()
    }

    /// The coalesced frame task fired.
    pub fn handle_frame(&mut self, host: &impl PageHost) -> Vec<NavEvent> {
        self.frame_timer = None;
        self.refresh(host)
    }

    /// Recompute chrome and active section from the host's geometry now.
    pub fn refresh(&mut self, host: &impl PageHost) -> Vec<NavEvent> {
        let mut events = Vec::new();

        self.scroll_offset = host.scroll_offset().max(0.0);
        let past = self.scroll_offset > self.config.scrolled_threshold_px;
        if past != self.past_threshold {
            self.past_threshold = past;
            events.push(NavEvent::ChromeScrolled(past));
        }

        // No match keeps the previous section (sticky fallback).
        if let Some(found) = self.detect(host) {
            if self.active.as_ref() != Some(&found) {
                debug!("navigator: active section -> {found}");
                self.active = Some(found.clone());
                events.push(NavEvent::ActiveChanged(found));
            }
        }
        events
    }

    /// First section in display order whose bounds cross the probe line.
    pub fn detect(&self, host: &impl PageHost) -> Option<SectionId> {
        let line = self.config.probe_line_px;
        self.sections
            .iter()
            .find(|s| host.section_bounds(&s.id).is_some_and(|b| b.contains_line(line)))
            .map(|s| s.id.clone())
    }

    /// Scroll target for a navigation request. Always closes the mobile
    /// menu; unknown ids produce no target.
    pub fn navigate_to(&mut self, id: &str, host: &impl PageHost) -> NavigateOutcome {
        let closed_menu = self.close_menu();
        let scroll_to = self
            .sections
            .iter()
            .find(|s| s.id == id)
            .and_then(|s| {
                let top = host.section_document_top(&s.id)?;
                Some((top - f64::from(s.vertical_offset)).max(0.0))
            });
        match scroll_to {
            Some(top) => debug!("navigator: navigate to {id} at {top:.0}px"),
            None => debug!("navigator: ignoring navigation to unknown section {id}"),
        }
        NavigateOutcome { scroll_to, closed_menu }
    }

    /// Flip the mobile menu. Returns the new state.
    pub fn toggle_menu(&mut self) -> bool {
        self.menu_open = !self.menu_open;
        self.menu_open
    }

    /// Returns whether the menu was open.
    pub fn close_menu(&mut self) -> bool {
        std::mem::replace(&mut self.menu_open, false)
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    /// Body scrolling is locked while the mobile menu covers the page.
    pub fn scroll_locked(&self) -> bool {
        self.menu_open
    }

    pub fn stop<T: Clone>(&mut self, sched: &mut Scheduler<T>) {
        sched.cancel_slot(&mut self.frame_timer);
    }
}

#[cfg(test)]
mod tests {
    use folio_protocol::SectionGeometry;

    use super::*;

    /// Lay sections out back to back (with optional gaps) and measure them
    /// at `scroll`.
    fn page(scroll: f64, layout: &[(&str, f64, f64)]) -> PageGeometry {
        PageGeometry {
            scroll_offset: scroll,
            viewport_height: 800.0,
            sections: layout
                .iter()
                .map(|&(id, doc_top, height)| SectionGeometry {
                    id: id.into(),
                    top: doc_top - scroll,
                    bottom: doc_top + height - scroll,
                    document_top: doc_top,
                })
                .collect(),
        }
    }

    const LAYOUT: [(&str, f64, f64); 4] = [
        ("home", 0.0, 900.0),
        ("about", 900.0, 700.0),
        // 200px gap between about and projects.
        ("projects", 1_800.0, 1_000.0),
        ("contact", 2_800.0, 600.0),
    ];

    fn navigator() -> Navigator {
        let mut nav = Navigator::new(NavigatorConfig::default());
        let sections = LAYOUT
            .iter()
            .map(|&(id, _, _)| NavigationSection::new(id, id, 80))
            .collect();
        nav.register_sections(sections).unwrap_or_else(|e| unreachable!("{e}"));
        nav
    }

    #[test]
    fn first_section_is_active_before_any_scroll() {
        let nav = navigator();
        assert_eq!(nav.current_active_section(), Some(&SectionId::from("home")));
    }

    #[test]
    fn probe_line_inside_section_selects_it() {
        let mut nav = Navigator::new(NavigatorConfig::default());
        nav.register_sections(vec![
            NavigationSection::new("home", "Home", 0),
            NavigationSection::new("about", "About", 0),
        ])
        .unwrap_or_else(|e| unreachable!("{e}"));
        let host = PageGeometry {
            scroll_offset: 650.0,
            viewport_height: 800.0,
            sections: vec![
                SectionGeometry {
                    id: "home".into(),
                    top: -650.0,
                    bottom: -50.0,
                    document_top: 0.0,
                },
                SectionGeometry {
                    id: "about".into(),
                    top: -50.0,
                    bottom: 400.0,
                    document_top: 600.0,
                },
            ],
        };
        let events = nav.refresh(&host);
        assert_eq!(nav.current_active_section(), Some(&SectionId::from("about")));
        assert!(events.contains(&NavEvent::ActiveChanged("about".into())));
    }

    #[test]
    fn earlier_section_wins_when_both_touch_the_probe() {
        let mut nav = navigator();
        // home bottom and about top both sit exactly on the probe line.
        nav.refresh(&page(800.0, &LAYOUT));
        assert_eq!(nav.current_active_section(), Some(&SectionId::from("home")));
    }

    #[test]
    fn gap_keeps_previous_section() {
        let mut nav = navigator();
        nav.refresh(&page(1_300.0, &LAYOUT));
        assert_eq!(nav.current_active_section(), Some(&SectionId::from("about")));
        // Probe at 1_750 lands in the gap.
        let events = nav.refresh(&page(1_650.0, &LAYOUT));
        assert_eq!(nav.current_active_section(), Some(&SectionId::from("about")));
        assert!(!events.iter().any(|e| matches!(e, NavEvent::ActiveChanged(_))));
    }

    #[test]
    fn active_is_always_registered() {
        let mut nav = navigator();
        let handle = nav.handle.clone().unwrap_or_else(|| unreachable!());
        let mut scroll = -300.0;
        while scroll < 4_000.0 {
            nav.refresh(&page(scroll, &LAYOUT));
            let active = nav.current_active_section().unwrap_or_else(|| unreachable!());
            assert!(handle.contains(active));
            scroll += 37.0;
        }
    }

    #[test]
    fn threshold_is_strictly_greater_than_fifty() {
        let mut nav = navigator();
        assert!(nav.refresh(&page(50.0, &LAYOUT)).is_empty());
        assert!(!nav.is_past_threshold());
        let events = nav.refresh(&page(51.0, &LAYOUT));
        assert_eq!(events, vec![NavEvent::ChromeScrolled(true)]);
        let events = nav.refresh(&page(0.0, &LAYOUT));
        assert_eq!(events, vec![NavEvent::ChromeScrolled(false)]);
    }

    #[test]
    fn scroll_events_coalesce_into_one_frame() {
        let mut sched: Scheduler<NavTask> = Scheduler::new();
        let mut nav = navigator();
        for _ in 0..10 {
            nav.on_scroll(16, &mut sched);
        }
        assert_eq!(sched.pending(), 1);
        let host = page(1_000.0, &LAYOUT);
        let mut frames = 0;
        sched.run_until(100, |_, _| {
            frames += 1;
            nav.handle_frame(&host);
        });
        assert_eq!(frames, 1);
        assert!(!nav.frame_pending());
        assert_eq!(nav.current_active_section(), Some(&SectionId::from("about")));
    }

    #[test]
    fn navigate_subtracts_offset_and_leaves_active_alone() {
        let mut nav = navigator();
        let outcome = nav.navigate_to("projects", &page(0.0, &LAYOUT));
        assert_eq!(outcome.scroll_to, Some(1_720.0));
        assert_eq!(nav.current_active_section(), Some(&SectionId::from("home")));

        // The top section never produces a negative target.
        assert_eq!(nav.navigate_to("home", &page(0.0, &LAYOUT)).scroll_to, Some(0.0));
    }

    #[test]
    fn unknown_target_is_a_silent_no_op() {
        let mut nav = navigator();
        let outcome = nav.navigate_to("blog", &page(0.0, &LAYOUT));
        assert_eq!(outcome.scroll_to, None);
        assert_eq!(nav.current_active_section(), Some(&SectionId::from("home")));
    }

    #[test]
    fn navigation_closes_the_menu() {
        let mut nav = navigator();
        assert!(nav.toggle_menu());
        assert!(nav.scroll_locked());
        let outcome = nav.navigate_to("blog", &page(0.0, &LAYOUT));
        assert!(outcome.closed_menu);
        assert!(!nav.is_menu_open());
        assert!(!nav.navigate_to("about", &page(0.0, &LAYOUT)).closed_menu);
    }

    #[test]
    fn registration_is_validated() {
        let mut nav = Navigator::new(NavigatorConfig::default());
        assert!(matches!(nav.register_sections(Vec::new()), Err(ConfigError::NoSections)));
        assert!(matches!(
            nav.register_sections(vec![
                NavigationSection::new("home", "Home", 0),
                NavigationSection::new("home", "Again", 0),
            ]),
            Err(ConfigError::DuplicateSection(id)) if id == "home"
        ));
        assert!(nav.register_sections(vec![NavigationSection::new("home", "Home", 0)]).is_ok());
        assert!(matches!(
            nav.register_sections(vec![NavigationSection::new("about", "About", 0)]),
            Err(ConfigError::SectionsAlreadyRegistered)
        ));
    }

    #[test]
    fn stop_cancels_pending_frame() {
        let mut sched: Scheduler<NavTask> = Scheduler::new();
        let mut nav = navigator();
        nav.on_scroll(16, &mut sched);
        nav.stop(&mut sched);
        nav.stop(&mut sched);
        assert_eq!(sched.pending(), 0);
    }
}
