//! Health Score Thresholds
//!
//! Boundaries between the display bands of the audit health score
//! (percentage of passing checks).

use serde::{Deserialize, Serialize};

/// Thresholds for the audit health score, in whole percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthScoreThresholds;

impl HealthScoreThresholds {
    /// At or above this the project is healthy
    pub const HEALTHY_PERCENT: u8 = 80;
    /// At or above this (and below healthy) the project is degraded
    pub const DEGRADED_PERCENT: u8 = 50;

    /// Classify a percentage score
    pub const fn band(percent: u8) -> HealthBand {
        if percent >= Self::HEALTHY_PERCENT {
            HealthBand::Healthy
        } else if percent >= Self::DEGRADED_PERCENT {
            HealthBand::Degraded
        } else {
            HealthBand::Critical
        }
    }
}

/// Display band of a health score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthBand {
    Healthy,
    Degraded,
    Critical,
}

impl HealthBand {
    /// Human-readable label with emoji, as shown next to the score
    pub const fn label(self) -> &'static str {
        match self {
            Self::Healthy => "Healthy ✅",
            Self::Degraded => "Needs Attention ⚠️",
            Self::Critical => "Critical Issues ❌",
        }
    }

    /// Color used when rendering the score
    pub const fn color(self) -> &'static str {
        match self {
            Self::Healthy => "green",
            Self::Degraded => "yellow",
            Self::Critical => "red",
        }
    }
}
