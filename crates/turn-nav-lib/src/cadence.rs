//! Periodic ETA cadence ticks with cancellation
//!
//! The timer only paces *attempts*; whether an attempt produces a snapshot is
//! still decided by the estimator's own cadence gate.

use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Cancels a running [`CadenceTimer`]
#[derive(Debug, Clone)]
pub struct CadenceHandle {
    token: CancellationToken,
}

impl CadenceHandle {
    /// Stop the cadence; no tick is delivered afterwards
    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            tracing::debug!("ETA cadence cancelled");
        }
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Source of periodic ticks
#[derive(Debug)]
pub struct CadenceTimer {
    interval: Interval,
    token: CancellationToken,
}

impl CadenceTimer {
    /// Start ticking every `period`; the first tick fires one period from now
    pub fn start(period: Duration) -> (CadenceTimer, CadenceHandle) {
        let period = period.max(Duration::from_millis(1));
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        // A stalled consumer gets one catch-up tick, not a burst
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let token = CancellationToken::new();
        (
            CadenceTimer {
                interval,
                token: token.clone(),
            },
            CadenceHandle { token },
        )
    }

    /// Wait for the next tick; `false` once the cadence has been cancelled
    pub async fn tick(&mut self) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        tokio::select! {
            biased;

            _ = self.token.cancelled() => false,
            _ = self.interval.tick() => !self.token.is_cancelled(),
        }
    }
}
