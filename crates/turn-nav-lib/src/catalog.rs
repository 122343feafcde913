//! Primary route, alternates and the validated selection between them

use crate::eta::Timestamp;
use crate::{NavConfig, NavError, Result, Route};
use std::sync::Arc;

/// Why a selection attempt was refused; the catalog is left untouched
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionRejected {
    #[error("Route index {0} is negative")]
    NegativeIndex(i64),

    #[error("Route index {index} is out of range ({count} routes)")]
    OutOfRange { index: i64, count: usize },

    #[error("Route {0} has no geometry")]
    MissingGeometry(usize),

    #[error("Route {0} has no steps")]
    MissingSteps(usize),

    #[error("Route {0} has no distance/duration display text")]
    MissingDisplayText(usize),
}

/// Result of a selection attempt that was not rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The selection now points at this index
    Switched(usize),
    /// A previous switch is still settling; the call was dropped
    Ignored,
}

/// The routes offered for a trip, primary first, and which one is active
#[derive(Debug, Clone)]
pub struct RouteCatalog {
    /// Index 0 is the primary route, the rest are alternates in provider order
    routes: Vec<Arc<Route>>,
    selected_index: usize,
    last_switch: Option<Timestamp>,
    debounce_ms: i64,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl RouteCatalog {
    /// Build a catalog from provider routes, first one primary and selected
    ///
    /// The primary must pass the same checks as any selection target.
    pub fn new(routes: Vec<Route>, config: &NavConfig) -> Result<Self> {
        if routes.is_empty() {
            return Err(NavError::EmptyCatalog);
        }

        let catalog = Self {
            routes: routes.into_iter().map(Arc::new).collect(),
            selected_index: 0,
            last_switch: None,
            debounce_ms: config.selection_debounce_ms,
        };
        catalog
            .validate(0)
            .map_err(|reason| NavError::InvalidRoute(format!("primary unusable: {reason}")))?;
        Ok(catalog)
    }

    /// Replace every route after a re-fetch; selection returns to the new primary
    pub fn replace(&mut self, routes: Vec<Route>) -> Result<()> {
        let config = NavConfig {
            selection_debounce_ms: self.debounce_ms,
            ..NavConfig::default()
        };
        *self = Self::new(routes, &config)?;
        tracing::info!("Route catalog replaced with {} routes", self.routes.len());
        Ok(())
    }

    #[inline]
    pub fn primary(&self) -> &Route {
        &self.routes[0]
    }

    #[inline]
    pub fn alternates(&self) -> &[Arc<Route>] {
        &self.routes[1..]
    }

    #[inline]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    #[inline]
    pub fn route(&self, index: usize) -> Option<&Arc<Route>> {
        self.routes.get(index)
    }

    #[inline]
    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    #[inline]
    pub fn selected_route(&self) -> &Arc<Route> {
        &self.routes[self.selected_index]
    }

    #[inline]
    pub fn last_switch(&self) -> Option<Timestamp> {
        self.last_switch
    }

    /// Whether a switch made at `last_switch` is still settling at `now`
    pub fn is_switching(&self, now: Timestamp) -> bool {
        self.last_switch
            .is_some_and(|last| (now - last).num_milliseconds() < self.debounce_ms)
    }

    /// Make the route at `index` the active one.
    ///
    /// Calls made while a previous switch is settling are ignored. Otherwise the
    /// index and the target route are validated and any failure leaves the
    /// catalog exactly as it was.
    pub fn select(
        &mut self,
        index: i64,
        now: Timestamp,
    ) -> std::result::Result<SelectOutcome, SelectionRejected> {
        if self.is_switching(now) {
            tracing::debug!("Ignoring selection of route {index}, a switch is in flight");
            return Ok(SelectOutcome::Ignored);
        }

        let target = self.validate(index).inspect_err(|reason| {
            tracing::warn!("Route selection rejected: {reason}");
        })?;

        self.selected_index = target;
        self.last_switch = Some(now);
        tracing::info!("Selected route {target} of {}", self.routes.len());
        Ok(SelectOutcome::Switched(target))
    }

    fn validate(&self, index: i64) -> std::result::Result<usize, SelectionRejected> {
        let target = usize::try_from(index).map_err(|_| SelectionRejected::NegativeIndex(index))?;
        let route = self.routes.get(target).ok_or(SelectionRejected::OutOfRange {
            index,
            count: self.routes.len(),
        })?;
        if route.coordinates.is_empty() {
            return Err(SelectionRejected::MissingGeometry(target));
        }
        if route.steps.is_empty() {
            return Err(SelectionRejected::MissingSteps(target));
        }
        if !route.has_display_text() {
            return Err(SelectionRejected::MissingDisplayText(target));
        }
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Coordinate, RouteStep};
    use chrono::{FixedOffset, TimeDelta, TimeZone};

    fn at_ms(ms: i64) -> Timestamp {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 4, 12, 0, 0)
            .unwrap()
            + TimeDelta::milliseconds(ms)
    }

    fn route(name: &str) -> Route {
        Route {
            distance_meters: 1000.0,
            duration_seconds: 120.0,
            distance_text: Some("1.0 km".into()),
            duration_text: Some("2 mins".into()),
            coordinates: vec![
                Coordinate {
                    latitude: 0.0,
                    longitude: 0.0,
                },
                Coordinate {
                    latitude: 0.0,
                    longitude: 0.009,
                },
            ],
            steps: vec![RouteStep {
                instruction: name.into(),
                distance_meters: 1000.0,
                duration_seconds: 120.0,
                coordinates: Vec::new(),
            }],
            legs: None,
        }
    }

    fn catalog() -> RouteCatalog {
        let mut no_geometry = route("no geometry");
        no_geometry.coordinates.clear();
        let mut no_steps = route("no steps");
        no_steps.steps.clear();
        let mut no_text = route("no text");
        no_text.duration_text = None;

        RouteCatalog::new(
            vec![route("primary"), route("alternate"), no_geometry, no_steps, no_text],
            &NavConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_catalog_selects_primary() {
        let catalog = catalog();
        assert_eq!(catalog.selected_index(), 0);
        assert_eq!(catalog.route_count(), 5);
        assert_eq!(catalog.alternates().len(), 4);
        assert_eq!(catalog.primary().steps[0].instruction, "primary");
        assert!(catalog.last_switch().is_none());
    }

    #[test]
    fn test_empty_or_incomplete_primary_fails() {
        assert!(matches!(
            RouteCatalog::new(Vec::new(), &NavConfig::default()),
            Err(NavError::EmptyCatalog)
        ));
        let mut broken = route("broken");
        broken.steps.clear();
        assert!(RouteCatalog::new(vec![broken], &NavConfig::default()).is_err());
    }

    #[test]
    fn test_primary_without_display_text_fails() {
        let mut untitled = route("untitled");
        untitled.distance_text = Some("  ".into());
        let result = RouteCatalog::new(vec![untitled, route("alternate")], &NavConfig::default());
        let Err(NavError::InvalidRoute(reason)) = result else {
            panic!("expected InvalidRoute, got {result:?}");
        };
        assert!(reason.contains("display text"));
    }

    #[test]
    fn test_select_alternate() {
        let mut catalog = catalog();
        assert_eq!(catalog.select(1, at_ms(0)), Ok(SelectOutcome::Switched(1)));
        assert_eq!(catalog.selected_index(), 1);
        assert_eq!(catalog.last_switch(), Some(at_ms(0)));
        assert_eq!(catalog.selected_route().steps[0].instruction, "alternate");
    }

    #[test]
    fn test_rejections_leave_state_unchanged() {
        let mut catalog = catalog();
        let cases = [
            (-1, SelectionRejected::NegativeIndex(-1)),
            (5, SelectionRejected::OutOfRange { index: 5, count: 5 }),
            (2, SelectionRejected::MissingGeometry(2)),
            (3, SelectionRejected::MissingSteps(3)),
            (4, SelectionRejected::MissingDisplayText(4)),
        ];
        for (index, expected) in cases {
            assert_eq!(catalog.select(index, at_ms(0)), Err(expected));
            assert_eq!(catalog.selected_index(), 0);
            assert!(catalog.last_switch().is_none());
        }
    }

    #[test]
    fn test_rejection_after_switch_keeps_previous_switch() {
        let mut catalog = catalog();
        assert_eq!(catalog.select(1, at_ms(0)), Ok(SelectOutcome::Switched(1)));

        let cases = [
            (5, SelectionRejected::OutOfRange { index: 5, count: 5 }),
            (2, SelectionRejected::MissingGeometry(2)),
            (-3, SelectionRejected::NegativeIndex(-3)),
        ];
        for (index, expected) in cases {
            assert_eq!(catalog.select(index, at_ms(1000)), Err(expected));
            assert_eq!(catalog.selected_index(), 1);
            assert_eq!(catalog.last_switch(), Some(at_ms(0)));
        }
        assert_eq!(catalog.selected_route().steps[0].instruction, "alternate");
    }

    #[test]
    fn test_rapid_selection_is_ignored() {
        let mut catalog = catalog();
        assert_eq!(catalog.select(1, at_ms(0)), Ok(SelectOutcome::Switched(1)));
        assert_eq!(catalog.select(0, at_ms(499)), Ok(SelectOutcome::Ignored));
        assert_eq!(catalog.selected_index(), 1);
        // Ignored calls do not extend the window
        assert_eq!(catalog.select(0, at_ms(500)), Ok(SelectOutcome::Switched(0)));
        assert_eq!(catalog.last_switch(), Some(at_ms(500)));
    }

    #[test]
    fn test_replace_resets_selection() {
        let mut catalog = catalog();
        catalog.select(1, at_ms(0)).unwrap();
        catalog.replace(vec![route("new primary")]).unwrap();
        assert_eq!(catalog.selected_index(), 0);
        assert_eq!(catalog.route_count(), 1);
        assert!(catalog.last_switch().is_none());

        // A failed replacement keeps the previous routes
        assert!(catalog.replace(Vec::new()).is_err());
        assert_eq!(catalog.primary().steps[0].instruction, "new primary");
    }
}
