//! Typewriter caption: types a keyword after a fixed prefix, holds it,
//! deletes it, and moves on to the next keyword, forever.

use log::trace;

use folio_protocol::CaptionId;

use crate::config::TypewriterConfig;
use crate::error::ConfigError;
use crate::scheduler::{Scheduler, TimerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypewriterTask {
    Step(CaptionId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypewriterMode {
    Typing,
    Holding,
    Deleting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypewriterState {
    pub current_word_index: usize,
    pub displayed_text: String,
    pub mode: TypewriterMode,
}

pub struct Typewriter {
    id: CaptionId,
    config: TypewriterConfig,
    words: Vec<Vec<char>>,
    base_len: usize,
    word_index: usize,
    /// Characters of the current word on screen.
    typed: usize,
    /// Time spent in the current hold.
    held_ms: u64,
    displayed: String,
    mode: TypewriterMode,
    timer: Option<TimerId>,
}

impl Typewriter {
    pub fn new(
        id: CaptionId,
        config: TypewriterConfig,
        base_text: &str,
        words: &[String],
    ) -> Result<Self, ConfigError> {
        if words.is_empty() {
            return Err(ConfigError::NoKeywords);
        }
        if let Some(index) = words.iter().position(String::is_empty) {
            return Err(ConfigError::EmptyKeyword(index));
        }
        if config.type_ms == 0 {
            return Err(ConfigError::ZeroInterval("typewriter.type_ms"));
        }
        if config.delete_ms == 0 {
            return Err(ConfigError::ZeroInterval("typewriter.delete_ms"));
        }
        Ok(Self {
            id,
            config,
            words: words.iter().map(|w| w.chars().collect()).collect(),
            base_len: base_text.len(),
            word_index: 0,
            typed: 0,
            held_ms: 0,
            displayed: base_text.to_string(),
            mode: TypewriterMode::Typing,
            timer: None,
        })
    }

    pub fn id(&self) -> CaptionId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.displayed
    }

    pub fn mode(&self) -> TypewriterMode {
        self.mode
    }

    pub fn word_index(&self) -> usize {
        self.word_index
    }

    pub fn state(&self) -> TypewriterState {
        TypewriterState {
            current_word_index: self.word_index,
            displayed_text: self.displayed.clone(),
            mode: self.mode,
        }
    }

    /// Delay before the next `tick` in the current mode.
    pub fn next_delay_ms(&self) -> u64 {
        match self.mode {
            TypewriterMode::Typing => self.config.type_ms,
            TypewriterMode::Holding => self.config.hold_ms,
            TypewriterMode::Deleting => self.config.delete_ms,
        }
    }

    /// Time to type, hold and delete a word of `chars` characters.
    pub fn cycle_duration_ms(&self, chars: usize) -> u64 {
        let chars = chars as u64;
        chars * self.config.type_ms + self.config.hold_ms + chars * self.config.delete_ms
    }

    /// Advance one scheduled step, assuming [`next_delay_ms`] has passed
    /// since the previous one. Returns whether the displayed text changed.
    ///
    /// [`next_delay_ms`]: Typewriter::next_delay_ms
    pub fn tick(&mut self) -> bool {
        self.advance(self.next_delay_ms())
    }

    /// Advance after `elapsed_ms` since the previous step. Typing and
    /// deleting move one character per call; holding lasts until the
    /// accumulated time reaches `hold_ms`, however often it is called.
    pub fn advance(&mut self, elapsed_ms: u64) -> bool {
        let word_len = self.words[self.word_index].len();
        match self.mode {
            TypewriterMode::Typing => {
                let ch = self.words[self.word_index][self.typed];
                self.displayed.push(ch);
                self.typed += 1;
                if self.typed == word_len {
                    self.mode = TypewriterMode::Holding;
                }
                true
            }
            TypewriterMode::Holding => {
                self.held_ms = self.held_ms.saturating_add(elapsed_ms);
                if self.held_ms >= self.config.hold_ms {
                    self.held_ms = 0;
                    self.mode = TypewriterMode::Deleting;
                }
                false
            }
            TypewriterMode::Deleting => {
                self.displayed.pop();
                self.typed -= 1;
                if self.typed == 0 {
                    debug_assert_eq!(self.displayed.len(), self.base_len);
                    self.word_index = (self.word_index + 1) % self.words.len();
                    self.mode = TypewriterMode::Typing;
                }
                true
            }
        }
    }

    /// Schedule the first step.
    pub fn start<T>(&mut self, sched: &mut Scheduler<T>)
    where
        T: From<TypewriterTask> + Clone,
    {
        if self.timer.is_none() {
            self.schedule(sched);
        }
    }

    /// Run one scheduled step and arm the next. Returns the new text when
    /// it changed.
    pub fn handle<T>(&mut self, sched: &mut Scheduler<T>) -> Option<String>
    where
        T: From<TypewriterTask> + Clone,
    {
        // Stopped captions ignore steps that were already in flight.
        self.timer.take()?;
        let changed = self.tick();
        trace!("typewriter {:?}: {:?} \"{}\"", self.id, self.mode, self.displayed);
        self.schedule(sched);
        changed.then(|| self.displayed.clone())
    }

    pub fn stop<T: Clone>(&mut self, sched: &mut Scheduler<T>) {
        sched.cancel_slot(&mut self.timer);
    }

    fn schedule<T>(&mut self, sched: &mut Scheduler<T>)
    where
        T: From<TypewriterTask> + Clone,
    {
        let delay = self.next_delay_ms();
        self.timer = Some(sched.set_timeout(delay, TypewriterTask::Step(self.id).into()));
    }
}

/// Blinking caret next to a caption: opacity runs 1 → 0 → 1 once per
/// period, straight from the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caret {
    period_ms: u64,
}

impl Caret {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms: period_ms.max(1),
        }
    }

    pub fn opacity_at(&self, now_ms: u64) -> f64 {
        let t = (now_ms % self.period_ms) as f64 / self.period_ms as f64;
        (1.0 - 2.0 * t).abs()
    }

    pub fn visible_at(&self, now_ms: u64) -> bool {
        self.opacity_at(now_ms) >= 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "Building with ";

    fn typewriter(words: &[&str]) -> Typewriter {
        let words: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        Typewriter::new(CaptionId(0), TypewriterConfig::default(), BASE, &words)
            .unwrap_or_else(|e| unreachable!("valid keywords: {e}"))
    }

    #[test]
    fn types_holds_deletes_then_moves_to_next_word() {
        let mut tw = typewriter(&["React", "AI"]);
        assert_eq!(tw.text(), BASE);

        for _ in 0..5 {
            assert!(tw.tick());
        }
        assert_eq!(tw.text(), "Building with React");
        assert_eq!(tw.mode(), TypewriterMode::Holding);

        assert!(!tw.tick());
        assert_eq!(tw.mode(), TypewriterMode::Deleting);
        assert_eq!(tw.text(), "Building with React");

        for _ in 0..5 {
            assert!(tw.tick());
        }
        assert_eq!(tw.text(), BASE);
        assert_eq!(tw.word_index(), 1);
        assert_eq!(tw.mode(), TypewriterMode::Typing);
    }

    #[test]
    fn fixed_cadence_still_holds_for_the_full_pause() {
        let mut tw = typewriter(&["AI"]);
        assert!(tw.advance(150));
        assert!(tw.advance(150));
        assert_eq!(tw.mode(), TypewriterMode::Holding);

        // 13 × 150 = 1950 ms, short of the 2000 ms hold.
        for _ in 0..13 {
            assert!(!tw.advance(150));
            assert_eq!(tw.mode(), TypewriterMode::Holding);
        }
        assert!(!tw.advance(150));
        assert_eq!(tw.mode(), TypewriterMode::Deleting);
        assert_eq!(tw.text(), "Building with AI");

        assert!(tw.advance(150));
        assert_eq!(tw.text(), "Building with A");
    }

    #[test]
    fn wraps_back_to_the_first_word() {
        let mut tw = typewriter(&["React", "AI"]);
        // React: 5 + 1 + 5 ticks, AI: 2 + 1 + 2 ticks.
        for _ in 0..16 {
            tw.tick();
        }
        assert_eq!(tw.word_index(), 0);
        assert_eq!(tw.mode(), TypewriterMode::Typing);
        assert_eq!(tw.text(), BASE);
    }

    #[test]
    fn length_moves_by_one_and_text_stays_a_prefix() {
        let words = ["AI/ML", "Cloud", "Café", "RAG"];
        let mut tw = typewriter(&words);
        for _ in 0..500 {
            let before_mode = tw.mode();
            let before = tw.text().chars().count() as i64;
            let target = format!("{BASE}{}", words[tw.word_index()]);
            tw.tick();
            let after = tw.text().chars().count() as i64;
            match before_mode {
                TypewriterMode::Typing => assert_eq!(after - before, 1),
                TypewriterMode::Deleting => assert_eq!(after - before, -1),
                TypewriterMode::Holding => assert_eq!(after, before),
            }
            assert!(target.starts_with(tw.text()) || tw.text() == BASE);
            assert!(tw.text().starts_with(BASE));
            assert!(tw.text().len() <= target.len());
        }
    }

    #[test]
    fn scheduled_cycle_has_a_deterministic_length() {
        let mut sched: Scheduler<TypewriterTask> = Scheduler::new();
        let mut tw = typewriter(&["React", "AI"]);
        tw.start(&mut sched);
        let cycle = tw.cycle_duration_ms(5);
        assert_eq!(cycle, 5 * 150 + 2_000 + 5 * 100);

        sched.run_until(cycle - 1, |s, _| {
            tw.handle(s);
        });
        assert_eq!(tw.word_index(), 0);
        sched.run_until(cycle, |s, _| {
            tw.handle(s);
        });
        assert_eq!(tw.word_index(), 1);
        assert_eq!(tw.mode(), TypewriterMode::Typing);
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn stop_releases_the_timer_and_ignores_stale_steps() {
        let mut sched: Scheduler<TypewriterTask> = Scheduler::new();
        let mut tw = typewriter(&["React"]);
        tw.start(&mut sched);
        tw.stop(&mut sched);
        tw.stop(&mut sched);
        assert_eq!(sched.pending(), 0);
        assert_eq!(tw.handle(&mut sched), None);
        assert_eq!(tw.text(), BASE);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn keywords_are_validated() {
        let cfg = TypewriterConfig::default();
        assert!(matches!(
            Typewriter::new(CaptionId(0), cfg.clone(), BASE, &[]),
            Err(ConfigError::NoKeywords)
        ));
        assert!(matches!(
            Typewriter::new(CaptionId(0), cfg, BASE, &["React".into(), String::new()]),
            Err(ConfigError::EmptyKeyword(1))
        ));
    }

    #[test]
    fn caret_blinks_on_its_own_period() {
        let caret = Caret::new(800);
        assert_eq!(caret.opacity_at(0), 1.0);
        assert_eq!(caret.opacity_at(400), 0.0);
        assert!(caret.visible_at(800));
        assert!(!caret.visible_at(400));
    }
}
