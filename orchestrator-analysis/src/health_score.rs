//! Health Score Calculation
//!
//! Share of passing checks, rounded to a whole percent and classified into
//! the display bands from `HealthScoreThresholds`.

use orchestrator_core::{HealthBand, HealthScoreThresholds, TestResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthScore {
    pub passed: usize,
    pub total: usize,
    /// Rounded percentage, 0 when there are no results
    pub percent: u8,
    pub band: HealthBand,
}

impl HealthScore {
    pub fn from_results(results: &[TestResult]) -> Self {
        let passed = results.iter().filter(|r| r.success).count();
        Self::from_counts(passed, results.len())
    }

    pub fn from_counts(passed: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0
        } else {
            // passed <= total, so the rounded value fits in 0..=100
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let rounded = ((passed.min(total) as f64 / total as f64) * 100.0).round() as u8;
            rounded
        };

        Self {
            passed,
            total,
            percent,
            band: HealthScoreThresholds::band(percent),
        }
    }
}

impl std::fmt::Display for HealthScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}% ({}/{} passed) {}",
            self.percent,
            self.passed,
            self.total,
            self.band.label()
        )
    }
}
