//! The composed page: loading screen first, then the navigator, the hero
//! caption and the stat tweens, all sharing one virtual-time scheduler.

use log::{debug, info};

use folio_protocol::{
    AssetOutcome, CaptionId, NavigationSection, PortfolioContent, SectionId, TweenId, ViewUpdate,
};

use crate::config::OrchestrationConfig;
use crate::content::{tween_plan, validate_content};
use crate::error::ConfigError;
use crate::loading::{LoadingEvent, LoadingSequencer, LoadingState, LoadingTask, RandomSteps, StepSource};
use crate::scheduler::Scheduler;
use crate::scroll_spy::{NavEvent, NavTask, Navigator, PageHost, ScrollSpyState, SectionsHandle};
use crate::tween::{Tween, TweenTask, in_view};
use crate::typewriter::{Caret, Typewriter, TypewriterState, TypewriterTask};

/// The hero caption's id; the page has exactly one typewriter.
pub const HERO_CAPTION: CaptionId = CaptionId(0);

/// Every timer on the page, tagged with the component that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppTask {
    Loading(LoadingTask),
    Nav(NavTask),
    Typewriter(TypewriterTask),
    Tween(TweenTask),
}

impl From<LoadingTask> for AppTask {
    fn from(task: LoadingTask) -> Self {
        AppTask::Loading(task)
    }
}

impl From<NavTask> for AppTask {
    fn from(task: NavTask) -> Self {
        AppTask::Nav(task)
    }
}

impl From<TypewriterTask> for AppTask {
    fn from(task: TypewriterTask) -> Self {
        AppTask::Typewriter(task)
    }
}

impl From<TweenTask> for AppTask {
    fn from(task: TweenTask) -> Self {
        AppTask::Tween(task)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Constructed, loading not started.
    Idle,
    /// Loading screen up.
    Loading,
    /// Loading finished; the page is live.
    Mounted,
    /// Every timer released. Terminal.
    TornDown,
}

/// One portfolio page for one host.
///
/// Hosts push clock, scroll, visibility and asset signals in and pull
/// [`ViewUpdate`]s out with [`Portfolio::drain_updates`]. Nothing here
/// touches a real clock or a real document.
pub struct Portfolio<S = RandomSteps> {
    content: PortfolioContent,
    config: OrchestrationConfig,
    sched: Scheduler<AppTask>,
    loading: LoadingSequencer<S>,
    navigator: Navigator,
    sections: SectionsHandle,
    typewriter: Typewriter,
    caret: Caret,
    tweens: Vec<Tween>,
    stage: Stage,
    updates: Vec<ViewUpdate>,
}

impl Portfolio<RandomSteps> {
    /// A portfolio whose loading increments come from a seeded RNG.
    pub fn seeded(content: PortfolioContent, config: OrchestrationConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::new(content, config, RandomSteps::seeded(seed))
    }
}

impl<S: StepSource> Portfolio<S> {
    /// Validate `content` and `config` and build every component. Sections
    /// are registered here so a bad section list is reported up front.
    pub fn new(content: PortfolioContent, config: OrchestrationConfig, steps: S) -> Result<Self, ConfigError> {
        config.validate()?;
        validate_content(&content)?;

        let loading = LoadingSequencer::new(
            config.loading.clone(),
            content.loading_messages.clone(),
            content.assets.clone(),
            steps,
        )?;
        let mut navigator = Navigator::new(config.navigator.clone());
        let sections = navigator.register_sections(content.sections.clone())?;
        let typewriter = Typewriter::new(
            HERO_CAPTION,
            config.typewriter.clone(),
            &content.base_text,
            &content.keywords,
        )?;
        let tweens = tween_plan(&content)
            .into_iter()
            .enumerate()
            .map(|(i, tween)| Tween::new(TweenId(i as u32), tween))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            caret: Caret::new(config.typewriter.caret_period_ms),
            content,
            config,
            sched: Scheduler::new(),
            loading,
            navigator,
            sections,
            typewriter,
            tweens,
            stage: Stage::Idle,
            updates: Vec::new(),
        })
    }

    /// Put the loading screen up. Emits one `PreloadAsset` per asset and the
    /// initial progress. Only the first call does anything.
    pub fn start(&mut self) {
        if self.stage != Stage::Idle {
            return;
        }
        self.stage = Stage::Loading;
        let assets = self.loading.start(&mut self.sched);
        self.updates
            .extend(assets.into_iter().map(|url| ViewUpdate::PreloadAsset { url }));
        self.updates.push(ViewUpdate::LoadingProgress {
            percent: self.loading.progress(),
            message: self.loading.phase_message().to_string(),
        });
    }

    /// Run every timer due at or before `now_ms`, in due order.
    pub fn advance_to(&mut self, now_ms: u64, host: &impl PageHost) {
        while let Some(fired) = self.sched.pop_due(now_ms) {
            self.dispatch(fired.task, host);
        }
        self.sched.advance_clock(now_ms);
    }

    /// The host finished warming `url`, successfully or not.
    pub fn asset_settled(&mut self, url: &str, outcome: AssetOutcome) -> bool {
        self.loading.asset_settled(url, outcome)
    }

    /// A scroll or resize happened. Ignored until the page is mounted.
    pub fn on_scroll(&mut self) {
        if self.stage == Stage::Mounted {
            self.navigator
                .on_scroll(self.config.frame_interval_ms, &mut self.sched);
        }
    }

    /// Host-side intersection signal for one tween. Returns whether it
    /// started the tween.
    pub fn on_visibility(&mut self, id: TweenId, visible: bool) -> bool {
        if self.stage != Stage::Mounted {
            return false;
        }
        let frame_ms = self.config.frame_interval_ms;
        match self.tweens.get_mut(id.0 as usize) {
            Some(tween) => tween.on_visibility(visible, frame_ms, &mut self.sched),
            None => false,
        }
    }

    /// Scroll to a section. Returns the requested scroll target. Closes the
    /// mobile menu even when the id is unknown.
    pub fn navigate_to(&mut self, id: &str, host: &impl PageHost) -> Option<f64> {
        if self.stage != Stage::Mounted {
            debug!("portfolio: navigation to {id} before mount ignored");
            return None;
        }
        let outcome = self.navigator.navigate_to(id, host);
        if outcome.closed_menu {
            self.updates.push(ViewUpdate::MenuToggled { open: false });
        }
        if let Some(top) = outcome.scroll_to {
            self.updates.push(ViewUpdate::ScrollTo { top, smooth: true });
        }
        outcome.scroll_to
    }

    /// Returns whether the menu is now open.
    pub fn toggle_menu(&mut self) -> bool {
        let open = self.navigator.toggle_menu();
        self.updates.push(ViewUpdate::MenuToggled { open });
        open
    }

    pub fn close_menu(&mut self) {
        if self.navigator.close_menu() {
            self.updates.push(ViewUpdate::MenuToggled { open: false });
        }
    }

    /// Everything that changed since the last drain, in order.
    pub fn drain_updates(&mut self) -> Vec<ViewUpdate> {
        std::mem::take(&mut self.updates)
    }

    /// Release every timer. Safe to call repeatedly and mid-sequence.
    pub fn teardown(&mut self) {
        if self.stage == Stage::TornDown {
            return;
        }
        self.loading.stop(&mut self.sched);
        self.navigator.stop(&mut self.sched);
        self.typewriter.stop(&mut self.sched);
        for tween in &mut self.tweens {
            tween.stop(&mut self.sched);
        }
        self.sched.clear();
        self.stage = Stage::TornDown;
        info!("portfolio: torn down");
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn content(&self) -> &PortfolioContent {
        &self.content
    }

    pub fn config(&self) -> &OrchestrationConfig {
        &self.config
    }

    pub fn now_ms(&self) -> u64 {
        self.sched.now_ms()
    }

    /// When the next timer is due, for hosts that sleep between frames.
    pub fn next_due(&self) -> Option<u64> {
        self.sched.next_due()
    }

    pub fn sections(&self) -> &[NavigationSection] {
        self.navigator.sections()
    }

    pub fn active_section(&self) -> Option<&SectionId> {
        self.navigator.current_active_section()
    }

    pub fn is_scrolled(&self) -> bool {
        self.navigator.is_past_threshold()
    }

    /// Last observed scroll offset and highlight.
    pub fn scroll_spy_state(&self) -> Option<ScrollSpyState> {
        self.navigator.state()
    }

    pub fn is_menu_open(&self) -> bool {
        self.navigator.is_menu_open()
    }

    pub fn is_loading_complete(&self) -> bool {
        self.loading.is_complete()
    }

    pub fn loading_state(&self) -> LoadingState {
        self.loading.state()
    }

    pub fn caption(&self) -> &str {
        self.typewriter.text()
    }

    pub fn caption_state(&self) -> TypewriterState {
        self.typewriter.state()
    }

    pub fn caret_visible(&self) -> bool {
        self.caret.visible_at(self.sched.now_ms())
    }

    pub fn tweens(&self) -> &[Tween] {
        &self.tweens
    }

    pub fn tween_display(&self, id: TweenId) -> Option<String> {
        self.tweens.get(id.0 as usize).map(Tween::display)
    }

    fn dispatch(&mut self, task: AppTask, host: &impl PageHost) {
        match task {
            AppTask::Loading(task) => {
                for event in self.loading.handle(task, &mut self.sched) {
                    match event {
                        LoadingEvent::Progress { percent, message } => {
                            self.updates.push(ViewUpdate::LoadingProgress { percent, message });
                        }
                        LoadingEvent::Gated => {}
                        LoadingEvent::Complete => {
                            self.updates.push(ViewUpdate::LoadingComplete);
                            self.mount(host);
                        }
                    }
                }
            }
            AppTask::Nav(NavTask::Frame) => {
                let events = self.navigator.handle_frame(host);
                self.push_nav_events(events);
                self.check_visibility(host);
            }
            AppTask::Typewriter(TypewriterTask::Step(id)) => {
                if let Some(text) = self.typewriter.handle(&mut self.sched) {
                    self.updates.push(ViewUpdate::Caption { id, text });
                }
            }
            AppTask::Tween(TweenTask::Frame(id)) => {
                let Some(tween) = self.tweens.get_mut(id.0 as usize) else {
                    return;
                };
                if let Some((value, display)) = tween.handle(&mut self.sched) {
                    self.updates.push(ViewUpdate::TweenValue { id, value, display });
                }
            }
        }
    }

    fn mount(&mut self, host: &impl PageHost) {
        if self.stage != Stage::Loading {
            return;
        }
        self.stage = Stage::Mounted;
        info!(
            "portfolio: mounted {} sections, {} tweens",
            self.sections.len(),
            self.tweens.len()
        );

        self.updates.push(ViewUpdate::Caption {
            id: HERO_CAPTION,
            text: self.typewriter.text().to_string(),
        });
        self.typewriter.start(&mut self.sched);

        let events = self.navigator.refresh(host);
        let announced = events.iter().any(|e| matches!(e, NavEvent::ActiveChanged(_)));
        self.push_nav_events(events);
        if !announced {
            if let Some(id) = self.navigator.current_active_section() {
                self.updates.push(ViewUpdate::ActiveSection { id: id.clone() });
            }
        }

        for tween in &mut self.tweens {
            tween.arm();
        }
        self.check_visibility(host);
    }

    fn push_nav_events(&mut self, events: Vec<NavEvent>) {
        self.updates.extend(events.into_iter().map(|event| match event {
            NavEvent::ActiveChanged(id) => ViewUpdate::ActiveSection { id },
            NavEvent::ChromeScrolled(scrolled) => ViewUpdate::ChromeScrolled { scrolled },
        }));
    }

    /// Start every armed tween whose watched section is in view.
    fn check_visibility(&mut self, host: &impl PageHost) {
        let margin = self.config.navigator.in_view_margin_px;
        let frame_ms = self.config.frame_interval_ms;
        let viewport = host.viewport_height();
        for tween in &mut self.tweens {
            if tween.has_fired() {
                continue;
            }
            let visible = host
                .section_bounds(&tween.config().watch)
                .is_some_and(|bounds| in_view(bounds, viewport, margin));
            tween.on_visibility(visible, frame_ms, &mut self.sched);
        }
    }
}
