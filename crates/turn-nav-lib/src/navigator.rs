//! Drives a [`NavState`] from location fixes, cadence ticks and user commands

use crate::eta::Timestamp;
use crate::ports::SpeechSink;
use crate::{
    CadenceHandle, CadenceTimer, Effect, LocationFeed, NavConfig, NavEvent, NavState, Subscription,
};
use std::time::Duration;
use tokio::sync::mpsc;

/// Owns the current navigation state and carries out the effects of each transition
pub struct Navigator<S: SpeechSink> {
    state: NavState,
    speech: S,
    cadence: Option<CadenceHandle>,
    subscription: Option<Subscription>,
}

impl<S: SpeechSink> Navigator<S> {
    pub fn new(config: NavConfig, speech: S) -> Self {
        Self {
            state: NavState::new(config),
            speech,
            cadence: None,
            subscription: None,
        }
    }

    /// Current state; always a complete, consistent snapshot
    #[inline]
    pub fn state(&self) -> &NavState {
        &self.state
    }

    #[inline]
    pub fn speech(&self) -> &S {
        &self.speech
    }

    /// Apply one event, perform its effects and return them
    pub fn dispatch(&mut self, event: NavEvent, now: Timestamp) -> Vec<Effect> {
        #[cfg(feature = "profiling")]
        profiling::scope!("Navigator::dispatch");

        let transition = self.state.apply(event, now);
        self.state = transition.state;

        for effect in &transition.effects {
            match effect {
                Effect::SnapshotUpdated(snapshot) => {
                    tracing::info!("{}", snapshot.display_text);
                }
                Effect::Speak(text) => {
                    tracing::info!("Announcing: {text}");
                    self.speech.speak(text);
                }
                Effect::SelectionChanged(index) => {
                    tracing::info!("Navigating route {index}");
                }
                Effect::SelectionRejected(reason) => {
                    tracing::debug!("Selection left unchanged: {reason}");
                }
                Effect::RoutesUnavailable(reason) => {
                    tracing::error!("Routes unavailable: {reason}");
                }
                Effect::NavigationEnded => self.cancel_subscriptions(),
            }
        }
        transition.effects
    }

    /// Navigate until the feed ends, the command channel sends
    /// [`NavEvent::EndNavigation`], or every route is dropped.
    ///
    /// Fixes and commands are applied as they arrive; the cadence timer fires a
    /// [`NavEvent::Tick`] every `cadence` so the ETA keeps refreshing while the
    /// agent stands still. `clock` supplies the wall-clock time of each event.
    pub async fn run<C>(
        &mut self,
        mut feed: LocationFeed,
        mut commands: mpsc::Receiver<NavEvent>,
        cadence: Duration,
        clock: C,
    ) where
        C: Fn() -> Timestamp,
    {
        let (mut timer, handle) = CadenceTimer::start(cadence);
        self.cadence = Some(handle);
        self.subscription = Some(feed.subscription());
        tracing::info!("Navigation loop started, cadence {:?}", cadence);

        loop {
            let event = tokio::select! {
                fix = feed.next() => match fix {
                    Some(fix) => NavEvent::Fix(fix),
                    None => {
                        tracing::info!("Location feed closed");
                        break;
                    }
                },
                Some(command) = commands.recv() => command,
                ticked = timer.tick() => {
                    if !ticked {
                        break;
                    }
                    NavEvent::Tick
                }
            };

            let ending = matches!(event, NavEvent::EndNavigation);
            self.dispatch(event, clock());
            if ending || !self.state.is_navigating() {
                break;
            }
        }

        if self.state.is_navigating() {
            self.dispatch(NavEvent::EndNavigation, clock());
        }
        self.cancel_subscriptions();
        tracing::info!("Navigation loop stopped");
    }

    fn cancel_subscriptions(&mut self) {
        if let Some(handle) = self.cadence.take() {
            handle.cancel();
        }
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
    }
}
