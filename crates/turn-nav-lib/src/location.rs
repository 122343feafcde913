//! Location fixes and the push-based feed that delivers them
//!
//! The location collaborator publishes fixes whenever it detects a meaningful
//! change. The consumer reads them from a [`LocationFeed`] and can stop the
//! subscription at any time through a [`Subscription`] handle; once cancelled,
//! the feed never yields another fix.

use crate::Coordinate;
use crate::eta::Timestamp;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// One position report from the location collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub accuracy_meters: Option<f64>,
    /// Ground speed, `None` when the receiver does not know it
    #[serde(default)]
    pub speed_mps: Option<f64>,
    #[serde(default)]
    pub heading_degrees: Option<f64>,
    pub timestamp: Timestamp,
}

impl LocationFix {
    /// Position of the fix, `None` if it is outside the valid range
    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::new(self.latitude, self.longitude).ok()
    }
}

/// Cancellation handle for a [`LocationFeed`]
#[derive(Debug, Clone)]
pub struct Subscription {
    token: CancellationToken,
}

impl Subscription {
    /// Stop delivering fixes; idempotent
    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            tracing::debug!("Location subscription cancelled");
        }
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Producer half, owned by the location collaborator
#[derive(Debug, Clone)]
pub struct LocationPublisher {
    tx: mpsc::Sender<LocationFix>,
    token: CancellationToken,
}

impl LocationPublisher {
    /// Push a fix; returns `false` once the subscription is cancelled or the feed dropped
    pub async fn publish(&self, fix: LocationFix) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        self.tx.send(fix).await.is_ok()
    }
}

/// Consumer half, read by the navigator
#[derive(Debug)]
pub struct LocationFeed {
    rx: mpsc::Receiver<LocationFix>,
    token: CancellationToken,
}

impl LocationFeed {
    /// Create a connected publisher/feed pair buffering up to `capacity` fixes
    pub fn channel(capacity: usize) -> (LocationPublisher, LocationFeed) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let token = CancellationToken::new();
        (
            LocationPublisher {
                tx,
                token: token.clone(),
            },
            LocationFeed { rx, token },
        )
    }

    /// Handle that cancels this feed
    pub fn subscription(&self) -> Subscription {
        Subscription {
            token: self.token.clone(),
        }
    }

    /// Wait for the next fix; `None` after cancellation or when every publisher is gone
    pub async fn next(&mut self) -> Option<LocationFix> {
        if self.token.is_cancelled() {
            return None;
        }
        let fix = tokio::select! {
            biased;

            _ = self.token.cancelled() => None,
            fix = self.rx.recv() => fix,
        };
        if self.token.is_cancelled() {
            self.rx.close();
            return None;
        }
        fix
    }
}
