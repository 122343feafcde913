//! Navigation state as an immutable value with pure transitions
//!
//! Every stimulus (a location fix, a cadence tick, a user command) is a
//! [`NavEvent`]. Applying it to a [`NavState`] yields a brand new state plus the
//! [`Effect`]s the caller has to carry out. The previous state is never touched,
//! so readers always observe a complete snapshot.

use crate::eta::Timestamp;
use crate::{
    AnnouncementPolicy, EtaEstimator, EtaSnapshot, LocationFix, NavConfig, Route, RouteCatalog,
    SelectOutcome, SelectionRejected,
};

/// Stimuli that drive the navigation core
#[derive(Debug, Clone)]
pub enum NavEvent {
    /// Fresh candidate routes; starts navigating the primary
    RoutesLoaded(Vec<Route>),
    /// Re-fetched routes replacing the current ones mid-trip
    RoutesReplaced(Vec<Route>),
    /// User picked a route by index
    SelectRoute(i64),
    Fix(LocationFix),
    Tick,
    SetVoice(bool),
    EndNavigation,
}

/// Work the caller performs after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SnapshotUpdated(EtaSnapshot),
    /// Text for the speech collaborator; only emitted with voice enabled
    Speak(String),
    SelectionChanged(usize),
    SelectionRejected(SelectionRejected),
    /// Routes could not be turned into a catalog
    RoutesUnavailable(String),
    /// Navigation stopped; cadence and location subscriptions must be cancelled
    NavigationEnded,
}

/// Outcome of applying one event
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: NavState,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone)]
pub struct NavState {
    config: NavConfig,
    catalog: Option<RouteCatalog>,
    estimator: EtaEstimator,
    policy: AnnouncementPolicy,
    snapshot: Option<EtaSnapshot>,
    last_fix: Option<LocationFix>,
    voice_enabled: bool,
}

impl Default for NavState {
    fn default() -> Self {
        Self::new(NavConfig::default())
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl NavState {
    pub fn new(config: NavConfig) -> Self {
        Self {
            estimator: EtaEstimator::new(&config),
            policy: AnnouncementPolicy::new(&config),
            config,
            catalog: None,
            snapshot: None,
            last_fix: None,
            voice_enabled: true,
        }
    }

    #[inline]
    pub fn catalog(&self) -> Option<&RouteCatalog> {
        self.catalog.as_ref()
    }

    #[inline]
    pub fn snapshot(&self) -> Option<&EtaSnapshot> {
        self.snapshot.as_ref()
    }

    #[inline]
    pub fn last_fix(&self) -> Option<&LocationFix> {
        self.last_fix.as_ref()
    }

    #[inline]
    pub fn voice_enabled(&self) -> bool {
        self.voice_enabled
    }

    #[inline]
    pub fn estimator(&self) -> &EtaEstimator {
        &self.estimator
    }

    /// Whether a route is active
    #[inline]
    pub fn is_navigating(&self) -> bool {
        self.catalog.is_some()
    }

    /// Apply `event` observed at wall-clock time `now`
    pub fn apply(&self, event: NavEvent, now: Timestamp) -> Transition {
        let mut next = self.clone();
        let mut effects = Vec::new();

        match event {
            NavEvent::RoutesLoaded(routes) => match RouteCatalog::new(routes, &self.config) {
                Ok(catalog) => {
                    next.catalog = Some(catalog);
                    next.snapshot = None;
                    next.estimator.reset_cadence();
                    effects.push(Effect::SelectionChanged(0));
                    next.refresh(now, &mut effects);
                }
                Err(e) => effects.push(Effect::RoutesUnavailable(e.to_string())),
            },
            NavEvent::RoutesReplaced(routes) => {
                let replaced = match next.catalog.as_mut() {
                    Some(catalog) => catalog.replace(routes),
                    None => RouteCatalog::new(routes, &self.config).map(|c| {
                        next.catalog = Some(c);
                    }),
                };
                match replaced {
                    Ok(()) => {
                        next.estimator.reset_cadence();
                        effects.push(Effect::SelectionChanged(0));
                        next.refresh(now, &mut effects);
                    }
                    Err(e) => effects.push(Effect::RoutesUnavailable(e.to_string())),
                }
            }
            NavEvent::SelectRoute(index) => {
                let outcome = match next.catalog.as_mut() {
                    Some(catalog) => catalog.select(index, now),
                    None => Err(SelectionRejected::OutOfRange { index, count: 0 }),
                };
                match outcome {
                    Ok(SelectOutcome::Switched(selected)) => {
                        next.estimator.reset_cadence();
                        effects.push(Effect::SelectionChanged(selected));
                        next.refresh(now, &mut effects);
                    }
                    Ok(SelectOutcome::Ignored) => {}
                    Err(reason) => effects.push(Effect::SelectionRejected(reason)),
                }
            }
            NavEvent::Fix(fix) => {
                next.last_fix = Some(fix);
                next.refresh(now, &mut effects);
            }
            NavEvent::Tick => next.refresh(now, &mut effects),
            NavEvent::SetVoice(enabled) => next.voice_enabled = enabled,
            NavEvent::EndNavigation => {
                if next.catalog.take().is_some() {
                    next.snapshot = None;
                    next.last_fix = None;
                    next.estimator = EtaEstimator::new(&next.config);
                    effects.push(Effect::NavigationEnded);
                }
            }
        }

        Transition {
            state: next,
            effects,
        }
    }

    /// Recompute the snapshot if the estimator's cadence allows it
    fn refresh(&mut self, now: Timestamp, effects: &mut Vec<Effect>) {
        let (Some(catalog), Some(fix)) = (self.catalog.as_ref(), self.last_fix.as_ref()) else {
            return;
        };
        let Some(current) = fix.coordinate() else {
            tracing::warn!(
                "Ignoring fix outside valid range: ({}, {})",
                fix.latitude,
                fix.longitude
            );
            return;
        };

        let route = catalog.selected_route().clone();
        let previous = self.snapshot.as_ref();
        let Some(mut snapshot) =
            self.estimator
                .update(&route, &current, fix.speed_mps, now, previous)
        else {
            return;
        };

        let mut spoken = None;
        if self.voice_enabled && self.policy.should_announce(previous, &snapshot) {
            spoken = Some(self.policy.announcement_text(&snapshot));
            snapshot = snapshot.announced_at(now);
        }

        self.snapshot = Some(snapshot.clone());
        effects.push(Effect::SnapshotUpdated(snapshot));
        if let Some(text) = spoken {
            effects.push(Effect::Speak(text));
        }
    }
}
