//! Spoken update policy
//!
//! Pure decisions only: speaking and recording the announcement time are left to
//! the caller, which does both only when voice guidance is enabled.

use crate::{EtaSnapshot, NavConfig};

pub const OFF_ROUTE_TEXT: &str = "You are off route. Please request a new route.";
pub const ARRIVED_TEXT: &str = "You have arrived at your destination.";

#[derive(Debug, Clone)]
pub struct AnnouncementPolicy {
    config: NavConfig,
}

impl Default for AnnouncementPolicy {
    fn default() -> Self {
        Self::new(&NavConfig::default())
    }
}

impl AnnouncementPolicy {
    pub fn new(config: &NavConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Decide whether `next` deserves a spoken update.
    ///
    /// The first snapshot is always announced. After that nothing is announced
    /// within the floor interval of the last announcement; past it, a large
    /// change in remaining time, leaving the route, or a large change in traffic
    /// delay triggers an announcement. `next.computed_at` is the current time.
    pub fn should_announce(&self, previous: Option<&EtaSnapshot>, next: &EtaSnapshot) -> bool {
        let Some(previous) = previous else {
            return true;
        };

        if let Some(last) = previous.last_announcement {
            if next.computed_at - last < self.config.announcement_floor() {
                return false;
            }
        }

        let threshold = self.config.significant_change_seconds;
        let time_changed = (previous.remaining_seconds - next.remaining_seconds).abs() > threshold;
        let left_route = !previous.is_off_route && next.is_off_route;
        let delay_changed = match (previous.traffic_delay_seconds, next.traffic_delay_seconds) {
            (Some(before), Some(after)) => (before - after).abs() > threshold,
            _ => false,
        };

        time_changed || left_route || delay_changed
    }

    /// Sentence to hand to the speech collaborator for `next`
    pub fn announcement_text(&self, next: &EtaSnapshot) -> String {
        if next.is_off_route {
            return OFF_ROUTE_TEXT.to_string();
        }

        let minutes =
            ((next.timestamp - next.computed_at).num_milliseconds() as f64 / 60_000.0).round() as i64;
        let mut text = if minutes < 1 {
            ARRIVED_TEXT.to_string()
        } else if minutes < 60 {
            format!("You will arrive in {}.", plural(minutes, "minute"))
        } else {
            let (hours, minutes) = (minutes / 60, minutes % 60);
            if minutes == 0 {
                format!("You will arrive in {}.", plural(hours, "hour"))
            } else {
                format!(
                    "You will arrive in {} and {}.",
                    plural(hours, "hour"),
                    plural(minutes, "minute")
                )
            }
        };

        if let Some(delay) = next.traffic_delay_seconds {
            if delay > self.config.delay_clause_threshold_seconds {
                let delay_minutes = (delay / 60.0).round() as i64;
                text.push_str(&format!(
                    " Traffic is adding about {}.",
                    plural(delay_minutes, "minute")
                ));
            }
        }
        text
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("{n} {unit}")
    } else {
        format!("{n} {unit}s")
    }
}
