//! Count-up numbers and growing bars that animate once, the first time
//! their section scrolls into view.

use log::debug;

use folio_protocol::{Bounds, TweenConfig, TweenFormat, TweenId};

use crate::error::ConfigError;
use crate::scheduler::{Scheduler, TimerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TweenTask {
    Frame(TweenId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TweenState {
    pub start_value: f64,
    pub end_value: f64,
    pub elapsed_ms: u64,
    pub duration_ms: u64,
    pub has_fired: bool,
}

/// Whether `bounds` overlaps a viewport of `viewport_height` shrunk by
/// `margin` on both edges.
pub fn in_view(bounds: Bounds, viewport_height: f64, margin: f64) -> bool {
    bounds.bottom > margin && bounds.top < viewport_height - margin
}

/// Round to an integer and group thousands with commas: `12345.6` → `"12,346"`.
pub fn format_count(value: f64, suffix: &str) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + suffix.len() + 1);
    if rounded < 0.0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped.push_str(suffix);
    grouped
}

pub struct Tween {
    id: TweenId,
    config: TweenConfig,
    armed: bool,
    has_fired: bool,
    fired_at_ms: u64,
    elapsed_ms: u64,
    value: f64,
    timer: Option<TimerId>,
}

impl Tween {
    pub fn new(id: TweenId, config: TweenConfig) -> Result<Self, ConfigError> {
        if !config.start.is_finite() || !config.end.is_finite() {
            return Err(ConfigError::InvalidTween {
                index: id.0 as usize,
                reason: "start and end must be finite",
            });
        }
        Ok(Self {
            id,
            value: config.start,
            config,
            armed: false,
            has_fired: false,
            fired_at_ms: 0,
            elapsed_ms: 0,
            timer: None,
        })
    }

    pub fn id(&self) -> TweenId {
        self.id
    }

    pub fn config(&self) -> &TweenConfig {
        &self.config
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn has_fired(&self) -> bool {
        self.has_fired
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn state(&self) -> TweenState {
        TweenState {
            start_value: self.config.start,
            end_value: self.config.end,
            elapsed_ms: self.elapsed_ms,
            duration_ms: self.config.duration_ms,
            has_fired: self.has_fired,
        }
    }

    /// Start watching for visibility. Until armed, visibility is ignored.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    /// Feed a visibility change. The first `true` after arming starts the
    /// animation; everything after that is ignored. Returns whether this
    /// call started it.
    pub fn on_visibility<T>(&mut self, visible: bool, frame_ms: u64, sched: &mut Scheduler<T>) -> bool
    where
        T: From<TweenTask> + Clone,
    {
        if !visible || !self.armed || self.has_fired {
            return false;
        }
        self.has_fired = true;
        self.fired_at_ms = sched.now_ms();
        self.timer = Some(sched.set_interval(frame_ms, TweenTask::Frame(self.id).into()));
        debug!("tween {:?}: fired at {} ms", self.id, self.fired_at_ms);
        true
    }

    /// Sample the curve `elapsed_ms` after the trigger.
    pub fn value_at(&self, elapsed_ms: u64) -> f64 {
        let TweenConfig {
            start,
            end,
            duration_ms,
            delay_ms,
            easing,
            ..
        } = self.config;
        if elapsed_ms <= delay_ms && duration_ms > 0 {
            return start;
        }
        let running = elapsed_ms.saturating_sub(delay_ms);
        if duration_ms == 0 || running >= duration_ms {
            return end;
        }
        let t = running as f64 / duration_ms as f64;
        start + (end - start) * easing.apply(t)
    }

    /// Advance one animation frame. Returns the new value and its display
    /// string, or `None` when the tween is not running.
    pub fn handle<T: Clone>(&mut self, sched: &mut Scheduler<T>) -> Option<(f64, String)> {
        self.timer?;
        self.elapsed_ms = sched.now_ms().saturating_sub(self.fired_at_ms);
        self.value = self.value_at(self.elapsed_ms);
        if self.elapsed_ms >= self.config.delay_ms + self.config.duration_ms {
            self.value = self.config.end;
            sched.cancel_slot(&mut self.timer);
            debug!("tween {:?}: settled at {}", self.id, self.value);
        }
        Some((self.value, self.display()))
    }

    pub fn display(&self) -> String {
        match &self.config.format {
            TweenFormat::Counter { suffix } => format_count(self.value, suffix),
            TweenFormat::Bar => format!("{:.0}%", self.value),
        }
    }

    pub fn stop<T: Clone>(&mut self, sched: &mut Scheduler<T>) {
        sched.cancel_slot(&mut self.timer);
    }
}
