pub mod animation;
pub mod commands;
pub mod content;
pub mod section_id;
pub mod types;

pub use animation::{CaptionId, Easing, TweenConfig, TweenFormat, TweenId};
pub use commands::ViewUpdate;
pub use content::{CategorySkill, PortfolioContent, SkillCategory, SkillLevel, Stat};
pub use section_id::SectionId;
pub use types::{AssetOutcome, Bounds, NavigationSection, PageGeometry, SectionGeometry};
