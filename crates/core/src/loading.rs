//! Loading sequencer: holds the portfolio behind a simulated progress bar
//! until progress reaches 100 % and the minimum display time has passed.

use log::{debug, info};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use folio_protocol::AssetOutcome;

use crate::config::LoadingConfig;
use crate::error::ConfigError;
use crate::scheduler::{Scheduler, TimerId};

/// Source of per-tick progress increments.
pub trait StepSource {
    /// Next increment, nominally in `[0, max)`. The sequencer clamps
    /// whatever comes back into `[0, max]`.
    fn next_step(&mut self, max: f64) -> f64;
}

/// Uniform random increments from a seedable small RNG.
pub struct RandomSteps(SmallRng);

impl RandomSteps {
    pub fn seeded(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }
}

impl StepSource for RandomSteps {
    fn next_step(&mut self, max: f64) -> f64 {
        if max > 0.0 { self.0.random_range(0.0..max) } else { 0.0 }
    }
}

/// Replays a fixed list of increments, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct FixedSteps {
    steps: Vec<f64>,
    next: usize,
}

impl FixedSteps {
    pub fn new(steps: impl Into<Vec<f64>>) -> Self {
        Self {
            steps: steps.into(),
            next: 0,
        }
    }
}

impl StepSource for FixedSteps {
    fn next_step(&mut self, _max: f64) -> f64 {
        if self.steps.is_empty() {
            return 0.0;
        }
        let step = self.steps[self.next % self.steps.len()];
        self.next = self.next.wrapping_add(1);
        step
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadingTask {
    Tick,
    Floor,
    Settle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadingEvent {
    Progress { percent: f64, message: String },
    /// Progress is at 100 % and the floor elapsed; the settle delay started.
    Gated,
    /// Fires once per sequencer lifetime.
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingPhase {
    Idle,
    Running,
    Settling,
    Complete,
    Stopped,
}

/// Snapshot of the loading view.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadingState {
    pub progress_percent: f64,
    pub phase_message: String,
    pub is_complete: bool,
}

pub struct LoadingSequencer<S> {
    config: LoadingConfig,
    messages: Vec<String>,
    steps: S,
    progress: f64,
    message_index: usize,
    phase: LoadingPhase,
    floor_elapsed: bool,
    assets: Vec<String>,
    unsettled: Vec<String>,
    tick_timer: Option<TimerId>,
    floor_timer: Option<TimerId>,
    settle_timer: Option<TimerId>,
}

impl<S: StepSource> LoadingSequencer<S> {
    pub fn new(
        config: LoadingConfig,
        messages: Vec<String>,
        assets: Vec<String>,
        steps: S,
    ) -> Result<Self, ConfigError> {
        if messages.is_empty() {
            return Err(ConfigError::NoLoadingMessages);
        }
        config.validate()?;
        Ok(Self {
            config,
            messages,
            steps,
            progress: 0.0,
            message_index: 0,
            phase: LoadingPhase::Idle,
            floor_elapsed: false,
            assets,
            unsettled: Vec::new(),
            tick_timer: None,
            floor_timer: None,
            settle_timer: None,
        })
    }

    /// Arm the progress interval and the minimum-duration floor. Returns
    /// the assets the host should start warming. Calling it again is a
    /// no-op that returns nothing.
    pub fn start<T>(&mut self, sched: &mut Scheduler<T>) -> Vec<String>
    where
        T: From<LoadingTask> + Clone,
    {
        if self.phase != LoadingPhase::Idle {
            return Vec::new();
        }
        self.phase = LoadingPhase::Running;
        self.tick_timer = Some(sched.set_interval(self.config.tick_interval_ms, LoadingTask::Tick.into()));
        self.floor_timer = Some(sched.set_timeout(self.config.min_duration_ms, LoadingTask::Floor.into()));
        self.unsettled = self.assets.clone();
        info!(
            "loading: started ({} assets, floor {} ms)",
            self.assets.len(),
            self.config.min_duration_ms
        );
        self.assets.clone()
    }

    pub fn handle<T>(&mut self, task: LoadingTask, sched: &mut Scheduler<T>) -> Vec<LoadingEvent>
    where
        T: From<LoadingTask> + Clone,
    {
        let mut events = Vec::new();
        match task {
            LoadingTask::Tick => {
                if self.phase != LoadingPhase::Running || self.progress >= 100.0 {
                    // A tick queued before the interval was cleared.
                    sched.cancel_slot(&mut self.tick_timer);
                    return events;
                }
                let max = self.config.max_increment;
                let raw = self.steps.next_step(max);
                let step = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, max) };
                self.progress = (self.progress + step).min(100.0);
                self.message_index = self.message_index.max(self.index_for(self.progress));
                if self.progress >= 100.0 {
                    self.progress = 100.0;
                    sched.cancel_slot(&mut self.tick_timer);
                }
                debug!(
                    "loading: {:.1}% \"{}\"",
                    self.progress, self.messages[self.message_index]
                );
                events.push(LoadingEvent::Progress {
                    percent: self.progress,
                    message: self.messages[self.message_index].clone(),
                });
            }
            LoadingTask::Floor => {
                self.floor_timer = None;
                if self.phase != LoadingPhase::Running {
                    return events;
                }
                self.floor_elapsed = true;
                if !self.unsettled.is_empty() {
                    debug!(
                        "loading: floor elapsed, no longer waiting on {} assets",
                        self.unsettled.len()
                    );
                }
            }
            LoadingTask::Settle => {
                self.settle_timer = None;
                if self.phase == LoadingPhase::Settling {
                    self.phase = LoadingPhase::Complete;
                    info!("loading: complete");
                    events.push(LoadingEvent::Complete);
                }
                return events;
            }
        }
        if self.try_gate(sched) {
            events.push(LoadingEvent::Gated);
        }
        events
    }

    /// Record the outcome of warming `url`. Success and failure count the
    /// same. Returns false for assets that were not outstanding.
    pub fn asset_settled(&mut self, url: &str, outcome: AssetOutcome) -> bool {
        let Some(pos) = self.unsettled.iter().position(|u| u == url) else {
            return false;
        };
        self.unsettled.swap_remove(pos);
        debug!("loading: asset {url} settled ({outcome:?})");
        if self.unsettled.is_empty() {
            debug!("loading: all assets settled");
        }
        true
    }

    /// Release every timer. Safe to call at any time, any number of times.
    pub fn stop<T: Clone>(&mut self, sched: &mut Scheduler<T>) {
        sched.cancel_slot(&mut self.tick_timer);
        sched.cancel_slot(&mut self.floor_timer);
        sched.cancel_slot(&mut self.settle_timer);
        if matches!(self.phase, LoadingPhase::Running | LoadingPhase::Settling) {
            info!("loading: stopped at {:.1}%", self.progress);
            self.phase = LoadingPhase::Stopped;
        }
    }

    pub fn phase(&self) -> LoadingPhase {
        self.phase
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn phase_message(&self) -> &str {
        &self.messages[self.message_index]
    }

    pub fn is_complete(&self) -> bool {
        self.phase == LoadingPhase::Complete
    }

    pub fn assets_settled(&self) -> bool {
        self.unsettled.is_empty()
    }

    pub fn state(&self) -> LoadingState {
        LoadingState {
            progress_percent: self.progress,
            phase_message: self.phase_message().to_string(),
            is_complete: self.is_complete(),
        }
    }

    fn index_for(&self, progress: f64) -> usize {
        let n = self.messages.len();
        let raw = (progress / 100.0 * n as f64).floor();
        (raw.max(0.0) as usize).min(n - 1)
    }

    fn try_gate<T>(&mut self, sched: &mut Scheduler<T>) -> bool
    where
        T: From<LoadingTask> + Clone,
    {
        if self.phase != LoadingPhase::Running || self.progress < 100.0 || !self.floor_elapsed {
            return false;
        }
        self.phase = LoadingPhase::Settling;
        self.settle_timer = Some(sched.set_timeout(self.config.settle_ms, LoadingTask::Settle.into()));
        info!("loading: gated, settling for {} ms", self.config.settle_ms);
        true
    }
}
