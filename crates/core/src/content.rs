//! Portfolio content: the embedded default record and the tween plan
//! derived from its statistics, skill levels and skill categories.

use folio_protocol::{Easing, PortfolioContent, SectionId, TweenConfig, TweenFormat};

use crate::error::ConfigError;

const DEFAULT_CONTENT: &str = include_str!("../assets/portfolio.json");

/// Section whose visibility starts the stat counters and skill bars.
pub const STATS_SECTION: &str = "about";
/// Section whose visibility starts the per-category skill bars.
pub const SKILLS_SECTION: &str = "skills";

const COUNTER_BASE_MS: u64 = 2_000;
const COUNTER_STAGGER_MS: u64 = 200;
const BAR_DURATION_MS: u64 = 1_500;
const BAR_DELAY_MS: u64 = 1_500;
const BAR_STAGGER_MS: u64 = 100;
const CATEGORY_BAR_DELAY_MS: u64 = 500;

pub fn default_content() -> Result<PortfolioContent, ConfigError> {
    content_from_json(DEFAULT_CONTENT)
}

pub fn content_from_json(data: &str) -> Result<PortfolioContent, ConfigError> {
    let content: PortfolioContent = serde_json::from_str(data)?;
    validate_content(&content)?;
    Ok(content)
}

/// Structural checks that don't need a live component. Section ids and
/// keywords are checked again by the components that own them.
pub fn validate_content(content: &PortfolioContent) -> Result<(), ConfigError> {
    if content.sections.is_empty() {
        return Err(ConfigError::NoSections);
    }
    if content.keywords.is_empty() {
        return Err(ConfigError::NoKeywords);
    }
    if content.loading_messages.is_empty() {
        return Err(ConfigError::NoLoadingMessages);
    }
    Ok(())
}

/// One linear counter per stat with a numeric value, each running a
/// little longer than the one before it.
pub fn stat_counters(content: &PortfolioContent) -> Vec<TweenConfig> {
    content
        .stats
        .iter()
        .filter_map(|stat| stat.target().map(|t| (t, stat.suffix.clone())))
        .enumerate()
        .map(|(i, (target, suffix))| TweenConfig {
            start: 0.0,
            end: target as f64,
            duration_ms: COUNTER_BASE_MS + COUNTER_STAGGER_MS * i as u64,
            delay_ms: 0,
            easing: Easing::Linear,
            format: TweenFormat::Counter { suffix },
            watch: SectionId::from(STATS_SECTION),
        })
        .collect()
}

/// One ease-out bar per skill, started in sequence.
pub fn skill_bars(content: &PortfolioContent) -> Vec<TweenConfig> {
    content
        .skills
        .iter()
        .enumerate()
        .map(|(i, skill)| TweenConfig {
            start: 0.0,
            end: f64::from(skill.level.min(100)),
            duration_ms: BAR_DURATION_MS,
            delay_ms: BAR_DELAY_MS + BAR_STAGGER_MS * i as u64,
            easing: Easing::EaseOut,
            format: TweenFormat::Bar,
            watch: SectionId::from(STATS_SECTION),
        })
        .collect()
}

/// Bars for every skill of every category, category by category. The
/// stagger restarts with each category.
pub fn category_bars(content: &PortfolioContent) -> Vec<TweenConfig> {
    content
        .skill_categories
        .iter()
        .flat_map(|category| category.skills.iter().enumerate())
        .map(|(i, skill)| TweenConfig {
            start: 0.0,
            end: f64::from(skill.level.min(100)),
            duration_ms: BAR_DURATION_MS,
            delay_ms: CATEGORY_BAR_DELAY_MS + BAR_STAGGER_MS * i as u64,
            easing: Easing::EaseOut,
            format: TweenFormat::Bar,
            watch: SectionId::from(SKILLS_SECTION),
        })
        .collect()
}

/// Counters, then about bars, then category bars; tween ids are
/// positions in this list.
pub fn tween_plan(content: &PortfolioContent) -> Vec<TweenConfig> {
    let mut plan = stat_counters(content);
    plan.extend(skill_bars(content));
    plan.extend(category_bars(content));
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> PortfolioContent {
        default_content().unwrap_or_else(|e| unreachable!("embedded content: {e}"))
    }

    #[test]
    fn embedded_content_parses() {
        let content = content();
        assert_eq!(content.sections.len(), 8);
        assert_eq!(content.sections[0].id, "home");
        assert!(content.sections.iter().all(|s| s.vertical_offset == 80));
        assert_eq!(content.keywords.len(), 5);
        assert_eq!(content.assets.len(), 4);
        assert_eq!(content.loading_messages.len(), 5);
    }

    #[test]
    fn counters_stagger_their_duration() {
        let counters = stat_counters(&content());
        let durations: Vec<u64> = counters.iter().map(|c| c.duration_ms).collect();
        assert_eq!(durations, vec![2_000, 2_200, 2_400, 2_600]);
        assert_eq!(counters[1].end, 100.0);
        assert_eq!(
            counters[1].format,
            TweenFormat::Counter {
                suffix: "+".into()
            }
        );
    }

    #[test]
    fn bars_stagger_their_start() {
        let bars = skill_bars(&content());
        let delays: Vec<u64> = bars.iter().map(|b| b.delay_ms).collect();
        assert_eq!(delays, vec![1_500, 1_600, 1_700, 1_800]);
        assert!(bars.iter().all(|b| b.easing == Easing::EaseOut && b.duration_ms == 1_500));
        assert_eq!(bars[0].end, 95.0);
    }

    #[test]
    fn non_numeric_stats_get_no_counter() {
        let mut content = content();
        content.stats[0].value = "many".into();
        assert_eq!(stat_counters(&content).len(), 3);
        assert_eq!(tween_plan(&content).len(), 3 + 4 + 32);
    }

    #[test]
    fn category_bars_restart_their_stagger_per_category() {
        let content = content();
        assert_eq!(content.skill_categories.len(), 4);
        let bars = category_bars(&content);
        assert_eq!(bars.len(), 32);
        assert!(bars.iter().all(|b| b.watch == SKILLS_SECTION));
        assert!(bars.iter().all(|b| b.easing == Easing::EaseOut && b.duration_ms == 1_500));

        let delays: Vec<u64> = bars[..9].iter().map(|b| b.delay_ms).collect();
        assert_eq!(delays, vec![500, 600, 700, 800, 900, 1_000, 1_100, 1_200, 500]);
        // "JavaScript" in "Programming & Tools".
        assert_eq!(bars[26].end, 75.0);
        assert_eq!(bars[26].delay_ms, 700);
    }

    #[test]
    fn content_without_categories_still_parses() {
        let mut json: serde_json::Value =
            serde_json::from_str(DEFAULT_CONTENT).unwrap_or_else(|e| unreachable!("{e}"));
        if let Some(map) = json.as_object_mut() {
            map.remove("skill_categories");
        }
        let content = content_from_json(&json.to_string())
            .unwrap_or_else(|e| unreachable!("categories are optional: {e}"));
        assert!(category_bars(&content).is_empty());
        assert_eq!(tween_plan(&content).len(), 8);
    }

    #[test]
    fn content_without_sections_is_rejected() {
        let mut content = content();
        content.sections.clear();
        assert!(matches!(validate_content(&content), Err(ConfigError::NoSections)));
        assert!(matches!(content_from_json("{"), Err(ConfigError::Json(_))));
    }
}
