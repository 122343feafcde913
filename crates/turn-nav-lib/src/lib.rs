//! Turn Navigation Library - Route Geometry and ETA Tracking Core
//!
//! This library holds the hard parts of a turn-by-turn navigation client: decoding
//! compact encoded curves into coordinates, tracking a moving agent against the
//! active route, estimating time of arrival under a simple traffic model, deciding
//! when a spoken update is due, and switching safely between a primary route and
//! its alternates.
//!
//! # Architecture
//!
//! - **[`polyline`]**: Encoded-curve wire format codec
//! - **[`geomath`]**: Great-circle distance and bearing
//! - **[`RouteTracker`]**: Nearest-vertex tracking, off-route flag, remaining distance
//! - **[`EtaEstimator`]**: Cadence-gated ETA snapshots with a time-of-day traffic heuristic
//! - **[`AnnouncementPolicy`]**: Pure decision on whether and what to announce
//! - **[`RouteCatalog`]**: Primary route plus alternates with validated selection
//! - **[`NavState`]**: Immutable navigation state with pure event transitions
//! - **[`Navigator`]**: Drives a [`NavState`] and routes its effects to the ports
//!
//! Map rendering, route planning and live traffic data are left to collaborators.

mod announce;
mod cadence;
mod catalog;
mod config;
mod coordinate;
pub mod directions;
mod eta;
pub mod geomath;
mod location;
mod navigator;
pub mod polyline;
pub mod ports;
mod route;
mod session;
mod tracker;

// Public API exports
pub use announce::AnnouncementPolicy;
pub use cadence::{CadenceHandle, CadenceTimer};
pub use catalog::{RouteCatalog, SelectOutcome, SelectionRejected};
pub use config::NavConfig;
pub use coordinate::Coordinate;
pub use eta::{EtaEstimator, EtaSnapshot, UpdateFrequencyMode};
pub use location::{LocationFeed, LocationFix, LocationPublisher, Subscription};
pub use navigator::Navigator;
pub use route::{Route, RouteStep};
pub use session::{Effect, NavEvent, NavState, Transition};
pub use tracker::{RouteTracker, TrackingStatus};

/// Error types for the navigation core
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("GPX parsing error: {0}")]
    GpxParse(#[from] gpx::errors::GpxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid coordinate: ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    #[error("Route catalog needs at least one route")]
    EmptyCatalog,

    #[error("Storage error: {0}")]
    Storage(#[from] ports::StorageError),
}

pub type Result<T> = std::result::Result<T, NavError>;
