//! Tunable thresholds for tracking, ETA cadence, announcements and selection

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Configuration shared by the tracker, estimator, announcement policy and catalog
///
/// The defaults are the production thresholds; callers normally keep them and
/// only override them in experiments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavConfig {
    /// Distance from the nearest route vertex above which the agent is off-route.
    /// A distance exactly equal to the threshold is still on-route.
    pub off_route_threshold_meters: f64,
    /// Remaining distance below which the estimator switches to the frequent cadence
    pub frequent_mode_threshold_meters: f64,
    /// Minimum interval between snapshots in normal mode
    pub normal_cadence_ms: i64,
    /// Minimum interval between snapshots in frequent mode
    pub frequent_cadence_ms: i64,
    /// Hard floor between two spoken announcements
    pub announcement_floor_ms: i64,
    /// Change in remaining time (or traffic delay) that warrants a new announcement
    pub significant_change_seconds: f64,
    /// Traffic delay above which a delay clause is appended to texts
    pub delay_clause_threshold_seconds: f64,
    /// Window after a successful route switch during which selections are ignored
    pub selection_debounce_ms: i64,
    /// Local hours of the day considered rush hour
    pub rush_hours: Vec<u32>,
    /// Fraction of the remaining distance that turns into delay during rush hour
    pub traffic_factor: f64,
    /// Divisor applied after the traffic factor
    pub traffic_divisor: f64,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            off_route_threshold_meters: 100.0,
            frequent_mode_threshold_meters: 5000.0,
            normal_cadence_ms: 30_000,
            frequent_cadence_ms: 10_000,
            announcement_floor_ms: 60_000,
            significant_change_seconds: 300.0,
            delay_clause_threshold_seconds: 300.0,
            selection_debounce_ms: 500,
            rush_hours: vec![7, 8, 9, 16, 17, 18],
            traffic_factor: 0.2,
            traffic_divisor: 50.0,
        }
    }
}

impl NavConfig {
    #[inline]
    pub fn announcement_floor(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.announcement_floor_ms)
    }

    #[inline]
    pub fn selection_debounce(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.selection_debounce_ms)
    }

    /// Whether the given local hour falls into the rush-hour set
    #[inline]
    pub fn is_rush_hour(&self, hour: u32) -> bool {
        self.rush_hours.contains(&hour)
    }
}
