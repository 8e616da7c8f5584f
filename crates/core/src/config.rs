//! Timing configuration. Every value defaults to the reference cadence of
//! the live site, and partial JSON documents override only what they name.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    pub tick_interval_ms: u64,
    /// Upper bound of the random progress increment per tick.
    pub max_increment: f64,
    /// The loading view stays up at least this long.
    pub min_duration_ms: u64,
    /// Pause between gating and completion.
    pub settle_ms: u64,
}

impl LoadingConfig {
    /// Zero cadences and non-positive increments would leave the loading
    /// screen up forever.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("loading.tick_interval_ms"));
        }
        if !(self.max_increment.is_finite() && self.max_increment > 0.0) {
            return Err(ConfigError::ZeroInterval("loading.max_increment"));
        }
        Ok(())
    }
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 200,
            max_increment: 15.0,
            min_duration_ms: 3_000,
            settle_ms: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Distance of the active-section probe line below the viewport top.
    pub probe_line_px: f64,
    /// Scroll offset past which the header chrome looks "scrolled".
    pub scrolled_threshold_px: f64,
    /// Shrinks the viewport on both edges for in-view checks.
    pub in_view_margin_px: f64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            probe_line_px: 100.0,
            scrolled_threshold_px: 50.0,
            in_view_margin_px: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypewriterConfig {
    pub type_ms: u64,
    pub delete_ms: u64,
    pub hold_ms: u64,
    pub caret_period_ms: u64,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            type_ms: 150,
            delete_ms: 100,
            hold_ms: 2_000,
            caret_period_ms: 800,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestrationConfig {
    pub loading: LoadingConfig,
    pub navigator: NavigatorConfig,
    pub typewriter: TypewriterConfig,
    /// Length of one animation frame; scroll handling and tweens run at
    /// most once per frame.
    pub frame_interval_ms: u64,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            loading: LoadingConfig::default(),
            navigator: NavigatorConfig::default(),
            typewriter: TypewriterConfig::default(),
            frame_interval_ms: 16,
        }
    }
}

impl OrchestrationConfig {
    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.loading.validate()?;
        let intervals = [
            ("typewriter.type_ms", self.typewriter.type_ms),
            ("typewriter.delete_ms", self.typewriter.delete_ms),
            ("typewriter.caret_period_ms", self.typewriter.caret_period_ms),
            ("frame_interval_ms", self.frame_interval_ms),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(ConfigError::ZeroInterval(name));
            }
        }
        Ok(())
    }
}
