use serde::{Deserialize, Serialize};

use crate::types::NavigationSection;

/// A headline statistic such as "Projects Completed: 100+".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub label: String,
    /// Free-form display value; the leading integer is the counter target.
    pub value: String,
    #[serde(default)]
    pub suffix: String,
}

impl Stat {
    /// Leading integer of `value` (`"5+"` → 5, `"1,000"` → 1000).
    pub fn target(&self) -> Option<u64> {
        let digits: String = self
            .value
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == ',')
            .filter(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillLevel {
    pub name: String,
    /// Proficiency in percent.
    pub level: u8,
}

/// A skill inside a [`SkillCategory`], tagged with its kind ("Framework", "Platform").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySkill {
    pub name: String,
    pub level: u8,
    #[serde(default)]
    pub category: String,
}

/// A named group of skills shown in the skills section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub name: String,
    pub skills: Vec<CategorySkill>,
}

/// Everything the orchestration layer consumes from the content collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioContent {
    pub name: String,
    pub title: String,
    /// Fixed caption prefix typed in front of the rotating keywords.
    pub base_text: String,
    pub keywords: Vec<String>,
    pub sections: Vec<NavigationSection>,
    /// Images warmed while the loading screen is up.
    pub assets: Vec<String>,
    pub loading_messages: Vec<String>,
    #[serde(default)]
    pub stats: Vec<Stat>,
    #[serde(default)]
    pub skills: Vec<SkillLevel>,
    #[serde(default)]
    pub skill_categories: Vec<SkillCategory>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(value: &str) -> Stat {
        Stat {
            label: "x".into(),
            value: value.into(),
            suffix: String::new(),
        }
    }

    #[test]
    fn stat_target_takes_leading_integer() {
        assert_eq!(stat("5+").target(), Some(5));
        assert_eq!(stat("100").target(), Some(100));
        assert_eq!(stat(" 1,000+ ").target(), Some(1000));
        assert_eq!(stat("n/a").target(), None);
    }
}
