//! Route storage module
//!
//! A [`Route`] is produced once by the directions collaborator (or built from a
//! recorded GPX track) and is read-only afterwards.

use crate::{Coordinate, NavError, Result, geomath};
use serde::{Deserialize, Serialize};

/// One manoeuvre of a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    /// Plain-text instruction, e.g. "Turn left onto Main St"
    pub instruction: String,
    pub distance_meters: f64,
    pub duration_seconds: f64,
    /// Geometry of this step, when the provider returns one
    #[serde(default)]
    pub coordinates: Vec<Coordinate>,
}

/// A complete candidate route with geometry, steps and display metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    /// Human-readable distance, e.g. "12.3 km"
    pub distance_text: Option<String>,
    /// Human-readable duration, e.g. "18 mins"
    pub duration_text: Option<String>,
    /// Overview path in travel order
    pub coordinates: Vec<Coordinate>,
    pub steps: Vec<RouteStep>,
    /// Per-leg paths when the route passes intermediate stops
    pub legs: Option<Vec<Vec<Coordinate>>>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Route {
    /// Whether the route carries the geometry and steps needed to navigate it
    #[inline]
    pub fn is_navigable(&self) -> bool {
        !self.coordinates.is_empty() && !self.steps.is_empty()
    }

    /// Whether both display texts are present and non-blank
    #[inline]
    pub fn has_display_text(&self) -> bool {
        let present = |text: &Option<String>| text.as_deref().is_some_and(|t| !t.trim().is_empty());
        present(&self.distance_text) && present(&self.duration_text)
    }

    /// Piecewise-linear length of the overview path in meters
    pub fn path_length(&self) -> f64 {
        geomath::path_length(&self.coordinates)
    }

    /// Build a route from the first track of a GPX document
    ///
    /// Each track segment becomes one leg and one "Follow track" step. GPX carries
    /// no timing model, so the duration is derived from `cruise_speed_mps`.
    pub fn from_gpx(gpx_data: &gpx::Gpx, cruise_speed_mps: f64) -> Result<Self> {
        #[cfg(feature = "profiling")]
        profiling::scope!("route::from_gpx");

        if cruise_speed_mps <= 0.0 || !cruise_speed_mps.is_finite() {
            return Err(NavError::InvalidRoute(format!(
                "cruise speed must be positive, got {cruise_speed_mps}"
            )));
        }

        let track = gpx_data
            .tracks
            .first()
            .ok_or_else(|| NavError::InvalidRoute("GPX file has no tracks".to_string()))?;

        let mut legs = Vec::with_capacity(track.segments.len());
        let mut steps = Vec::with_capacity(track.segments.len());

        for (segment_index, segment) in track.segments.iter().enumerate() {
            let mut leg = Vec::with_capacity(segment.points.len());
            for waypoint in &segment.points {
                let point = waypoint.point();
                if Coordinate::in_range(point.y(), point.x()) {
                    leg.push(Coordinate::from(point));
                } else {
                    tracing::warn!(
                        "Skipping GPX point outside valid range: ({}, {})",
                        point.y(),
                        point.x()
                    );
                }
            }
            if leg.len() < 2 {
                continue;
            }

            let distance_meters = geomath::path_length(&leg);
            steps.push(RouteStep {
                instruction: match &track.name {
                    Some(name) => format!("Follow {name} (part {})", segment_index + 1),
                    None => format!("Follow track (part {})", segment_index + 1),
                },
                distance_meters,
                duration_seconds: distance_meters / cruise_speed_mps,
                coordinates: leg.clone(),
            });
            legs.push(leg);
        }

        if legs.is_empty() {
            return Err(NavError::InvalidRoute(
                "GPX track has no segment with two valid points".to_string(),
            ));
        }

        let coordinates: Vec<Coordinate> = legs.iter().flatten().copied().collect();
        let distance_meters: f64 = steps.iter().map(|s| s.distance_meters).sum();
        let duration_seconds = distance_meters / cruise_speed_mps;

        Ok(Route {
            distance_meters,
            duration_seconds,
            distance_text: Some(format_distance(distance_meters)),
            duration_text: Some(format_duration(duration_seconds)),
            coordinates,
            steps,
            legs: Some(legs),
        })
    }
}

/// Format a distance the way directions providers do ("850 m", "12.3 km")
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{} m", meters.round() as i64)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

/// Format a duration the way directions providers do ("18 mins", "1 hour 5 mins")
pub fn format_duration(seconds: f64) -> String {
    let minutes = (seconds / 60.0).round().max(1.0) as i64;
    let (hours, minutes) = (minutes / 60, minutes % 60);
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("{n} {unit}")
        } else {
            format!("{n} {unit}s")
        }
    };
    match (hours, minutes) {
        (0, m) => plural(m, "min"),
        (h, 0) => plural(h, "hour"),
        (h, m) => format!("{} {}", plural(h, "hour"), plural(m, "min")),
    }
}
