//! ETA estimation with cadence gating and a time-of-day traffic heuristic

use crate::{Coordinate, NavConfig, Route, RouteTracker};
use chrono::{DateTime, FixedOffset, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

/// Wall-clock instant carrying the local offset, so the hour of day is known
pub type Timestamp = DateTime<FixedOffset>;

/// Meters per second to miles per hour
const MPS_TO_MPH: f64 = 2.237;

/// How often snapshots may be recomputed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UpdateFrequencyMode {
    /// 30 second cadence
    #[default]
    Normal,
    /// 10 second cadence, entered close to the destination and kept until the trip ends
    Frequent,
}

/// One immutable estimate of the arrival time plus supporting metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtaSnapshot {
    /// Estimated arrival instant
    pub timestamp: Timestamp,
    /// When this snapshot was computed
    pub computed_at: Timestamp,
    pub display_text: String,
    pub remaining_seconds: f64,
    pub remaining_distance_meters: f64,
    /// Present only when the traffic heuristic added a delay
    pub traffic_delay_seconds: Option<f64>,
    pub is_off_route: bool,
    pub distance_to_route_meters: f64,
    pub last_announcement: Option<Timestamp>,
}

impl EtaSnapshot {
    /// Copy of this snapshot recording an announcement made at `at`
    pub fn announced_at(&self, at: Timestamp) -> Self {
        Self {
            last_announcement: Some(at),
            ..self.clone()
        }
    }
}

/// Produces [`EtaSnapshot`]s at most once per cadence period
#[derive(Debug, Clone)]
pub struct EtaEstimator {
    config: NavConfig,
    tracker: RouteTracker,
    last_update: Option<Timestamp>,
    mode: UpdateFrequencyMode,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl EtaEstimator {
    pub fn new(config: &NavConfig) -> Self {
        Self {
            config: config.clone(),
            tracker: RouteTracker::new(config),
            last_update: None,
            mode: UpdateFrequencyMode::Normal,
        }
    }

    #[inline]
    pub fn mode(&self) -> UpdateFrequencyMode {
        self.mode
    }

    #[inline]
    pub fn last_update(&self) -> Option<Timestamp> {
        self.last_update
    }

    /// Minimum interval between two snapshots in the given mode
    pub fn cadence_for(&self, mode: UpdateFrequencyMode) -> TimeDelta {
        match mode {
            UpdateFrequencyMode::Normal => TimeDelta::milliseconds(self.config.normal_cadence_ms),
            UpdateFrequencyMode::Frequent => {
                TimeDelta::milliseconds(self.config.frequent_cadence_ms)
            }
        }
    }

    /// Forget the cadence gate so the next update runs immediately.
    ///
    /// The frequency mode is kept; it only tightens for the lifetime of the estimator.
    pub fn reset_cadence(&mut self) {
        self.last_update = None;
    }

    /// Try to produce a new snapshot.
    ///
    /// Returns `None` when the cadence has not elapsed, the route path has fewer
    /// than two points, or the speed is unknown or not positive. The previous
    /// snapshot only contributes its announcement bookkeeping.
    pub fn update(
        &mut self,
        route: &Route,
        current: &Coordinate,
        speed_mps: Option<f64>,
        now: Timestamp,
        previous: Option<&EtaSnapshot>,
    ) -> Option<EtaSnapshot> {
        if let Some(last) = self.last_update {
            if now - last < self.cadence_for(self.mode) {
                tracing::trace!("ETA cadence not elapsed ({:?} mode)", self.mode);
                return None;
            }
        }

        let status = self.tracker.status(current, &route.coordinates)?;

        if status.remaining_distance < self.config.frequent_mode_threshold_meters
            && self.mode == UpdateFrequencyMode::Normal
        {
            tracing::debug!(
                "Remaining distance {:.0} m, switching to frequent ETA updates",
                status.remaining_distance
            );
            self.mode = UpdateFrequencyMode::Frequent;
        }

        let speed_mps = match speed_mps {
            Some(speed) if speed > 0.0 && speed.is_finite() => speed,
            _ => {
                tracing::debug!("Skipping ETA cycle, speed unknown or not positive: {:?}", speed_mps);
                return None;
            }
        };

        let speed_mph = speed_mps * MPS_TO_MPH;
        let base_seconds = status.remaining_distance / speed_mph * 3600.0;
        let traffic_delay_seconds = self.traffic_delay(status.remaining_distance, now.hour());
        let total_seconds = base_seconds + traffic_delay_seconds;

        let total_ms = (total_seconds * 1000.0).round();
        let arrival = TimeDelta::try_milliseconds(total_ms as i64)
            .and_then(|delta| now.checked_add_signed(delta));
        let Some(timestamp) = arrival.filter(|_| total_ms.is_finite()) else {
            tracing::warn!("ETA of {total_seconds} s is out of range, skipping cycle");
            return None;
        };

        self.last_update = Some(now);

        let snapshot = EtaSnapshot {
            timestamp,
            computed_at: now,
            display_text: self.display_text(timestamp - now, traffic_delay_seconds),
            remaining_seconds: total_seconds,
            remaining_distance_meters: status.remaining_distance,
            traffic_delay_seconds: (traffic_delay_seconds > 0.0).then_some(traffic_delay_seconds),
            is_off_route: status.is_off_route,
            distance_to_route_meters: status.distance_to_route,
            last_announcement: previous.and_then(|p| p.last_announcement),
        };
        tracing::debug!(
            "ETA updated: {} ({:.0} m left, off_route={})",
            snapshot.display_text,
            snapshot.remaining_distance_meters,
            snapshot.is_off_route
        );
        Some(snapshot)
    }

    /// Placeholder traffic model: a fixed share of the distance during rush hour
    pub fn traffic_delay(&self, remaining_distance: f64, local_hour: u32) -> f64 {
        if self.config.is_rush_hour(local_hour) {
            remaining_distance * self.config.traffic_factor / self.config.traffic_divisor
        } else {
            0.0
        }
    }

    fn display_text(&self, until_arrival: TimeDelta, traffic_delay_seconds: f64) -> String {
        let minutes = (until_arrival.num_milliseconds() as f64 / 60_000.0).round() as i64;
        let mut text = if minutes < 1 {
            "Arriving now".to_string()
        } else if minutes < 60 {
            format!("Arriving in {minutes} min")
        } else {
            format!("Arriving in {}h {}m", minutes / 60, minutes % 60)
        };
        if traffic_delay_seconds > self.config.delay_clause_threshold_seconds {
            let delay_minutes = (traffic_delay_seconds / 60.0).round() as i64;
            text.push_str(&format!(" (+{delay_minutes} min traffic)"));
        }
        text
    }
}
