//! View orchestration for a single-page portfolio: a gated loading screen,
//! a scroll-spy navigator, a typewriter caption and count-up tweens, all
//! driven by one virtual-time scheduler.

pub mod config;
pub mod content;
pub mod error;
pub mod loading;
pub mod page;
pub mod portfolio;
pub mod scheduler;
pub mod scroll_spy;
pub mod tween;
pub mod typewriter;

pub use config::{LoadingConfig, NavigatorConfig, OrchestrationConfig, TypewriterConfig};
pub use content::{content_from_json, default_content};
pub use error::ConfigError;
pub use loading::{FixedSteps, LoadingState, RandomSteps, StepSource};
pub use page::VirtualPage;
pub use portfolio::{AppTask, HERO_CAPTION, Portfolio, Stage};
pub use scheduler::{Scheduler, TimerId};
pub use scroll_spy::{Navigator, PageHost, ScrollSpyState, SectionsHandle};
