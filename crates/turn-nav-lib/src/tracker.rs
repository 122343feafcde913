//! Position tracking against the active route path
//!
//! The nearest point is found by a linear scan over the path vertices rather
//! than a true point-to-segment projection. Provider paths are dense enough for
//! the vertex approximation to stay well inside the off-route threshold.

use crate::{Coordinate, NavConfig, geomath};
use serde::{Deserialize, Serialize};

/// Where the agent stands relative to the route
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackingStatus {
    /// Path length from the closest vertex to the end of the route in meters
    pub remaining_distance: f64,
    pub is_off_route: bool,
    /// Distance to the closest vertex in meters
    pub distance_to_route: f64,
    /// Index of the closest vertex (first one wins on ties)
    pub closest_index: usize,
}

/// Stateless tracker parameterised by the off-route threshold
#[derive(Debug, Clone, Copy)]
pub struct RouteTracker {
    off_route_threshold_meters: f64,
}

impl Default for RouteTracker {
    fn default() -> Self {
        Self::new(&NavConfig::default())
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl RouteTracker {
    pub fn new(config: &NavConfig) -> Self {
        Self {
            off_route_threshold_meters: config.off_route_threshold_meters,
        }
    }

    /// Compute the tracking status of `current` against `path`.
    ///
    /// Returns `None` when the path has fewer than two vertices.
    pub fn status(&self, current: &Coordinate, path: &[Coordinate]) -> Option<TrackingStatus> {
        if path.len() < 2 {
            return None;
        }

        let mut closest_index = 0;
        let mut distance_to_route = f64::INFINITY;
        for (index, vertex) in path.iter().enumerate() {
            let d = geomath::distance(current, vertex);
            // Strict comparison keeps the earliest vertex on ties
            if d < distance_to_route {
                distance_to_route = d;
                closest_index = index;
            }
        }

        let remaining_distance = geomath::path_length(&path[closest_index..]);

        Some(TrackingStatus {
            remaining_distance,
            is_off_route: distance_to_route > self.off_route_threshold_meters,
            distance_to_route,
            closest_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate {
            latitude,
            longitude,
        }
    }

    /// Straight eastbound path along the equator, roughly 111 m per vertex
    fn equator_path(vertices: usize) -> Vec<Coordinate> {
        (0..vertices).map(|i| c(0.0, i as f64 * 0.001)).collect()
    }

    #[test]
    fn test_short_path_has_no_status() {
        let tracker = RouteTracker::default();
        assert!(tracker.status(&c(0.0, 0.0), &[]).is_none());
        assert!(tracker.status(&c(0.0, 0.0), &[c(0.0, 0.0)]).is_none());
    }

    #[test]
    fn test_on_route_at_start() {
        let tracker = RouteTracker::default();
        let path = equator_path(5);
        let status = tracker.status(&path[0], &path).unwrap();

        assert_eq!(status.closest_index, 0);
        assert_eq!(status.distance_to_route, 0.0);
        assert!(!status.is_off_route);
        assert!((status.remaining_distance - geomath::path_length(&path)).abs() < 1e-9);
    }

    #[test]
    fn test_remaining_distance_follows_path() {
        let tracker = RouteTracker::default();
        // An L-shaped path: remaining distance is the walked length, not the chord
        let path = vec![c(0.0, 0.0), c(0.0, 0.01), c(0.01, 0.01)];
        let status = tracker.status(&path[1], &path).unwrap();

        assert_eq!(status.closest_index, 1);
        let leg = geomath::distance(&path[1], &path[2]);
        assert!((status.remaining_distance - leg).abs() < 1e-9);

        let at_end = tracker.status(&path[2], &path).unwrap();
        assert_eq!(at_end.remaining_distance, 0.0);
    }

    #[test]
    fn test_off_route_detection() {
        let tracker = RouteTracker::default();
        let path = equator_path(5);

        // ~55 m north of the path
        let near = tracker.status(&c(0.0005, 0.002), &path).unwrap();
        assert!(!near.is_off_route);

        // ~222 m north of the path
        let far = tracker.status(&c(0.002, 0.002), &path).unwrap();
        assert!(far.is_off_route);
        assert_eq!(far.closest_index, 2);
    }

    #[test]
    fn test_threshold_boundary_is_not_off_route() {
        let path = equator_path(3);
        let current = c(0.0009, 0.0);
        let exact = geomath::distance(&current, &path[0]);

        let at_boundary = RouteTracker {
            off_route_threshold_meters: exact,
        };
        let status = at_boundary.status(&current, &path).unwrap();
        assert_eq!(status.distance_to_route, exact);
        assert!(!status.is_off_route);

        let just_below = RouteTracker {
            off_route_threshold_meters: exact - 1e-6,
        };
        assert!(just_below.status(&current, &path).unwrap().is_off_route);
    }

    #[test]
    fn test_ties_resolve_to_earliest_vertex() {
        let tracker = RouteTracker::default();
        // A path that doubles back: vertices 1 and 3 are the same point
        let path = vec![c(0.0, 0.0), c(0.0, 0.001), c(0.0, 0.002), c(0.0, 0.001)];
        let status = tracker.status(&c(0.0, 0.001), &path).unwrap();
        assert_eq!(status.closest_index, 1);
        assert!(status.remaining_distance > 0.0);
    }
}
