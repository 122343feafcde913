//! Directions collaborator boundary
//!
//! Routes arrive pre-computed from a directions provider. This module holds the
//! provider's response shape, the conversion into [`Route`] values (decoding the
//! encoded curves on the way in) and the [`DirectionsProvider`] seam.
//!
//! The first route of a response is the primary, the rest are alternates.

use crate::route::{format_distance, format_duration};
use crate::{Coordinate, NavError, Result, Route, RouteStep, polyline};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What the client asks the provider for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionsRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    /// Intermediate stops in the order the user entered them
    #[serde(default)]
    pub waypoints: Vec<Coordinate>,
    /// Forwarded as-is. Whether the provider reorders `waypoints` when this is
    /// set is up to its contract; the client never reorders stops itself.
    #[serde(default)]
    pub optimize_waypoints: bool,
    #[serde(default = "default_alternatives")]
    pub alternatives: bool,
}

fn default_alternatives() -> bool {
    true
}

/// Source of candidate routes
pub trait DirectionsProvider {
    /// Fetch candidate routes, primary first
    fn routes(&self, request: &DirectionsRequest) -> Result<Vec<Route>>;
}

// --- Data Structures for parsing directions responses ---

#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub routes: Vec<ResponseRoute>,
}

fn default_status() -> String {
    "OK".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ResponseRoute {
    #[serde(default)]
    pub summary: Option<String>,
    pub overview_polyline: EncodedPolyline,
    #[serde(default)]
    pub legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
pub struct EncodedPolyline {
    pub points: String,
}

#[derive(Debug, Deserialize)]
pub struct TextValue {
    pub value: f64,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Leg {
    pub distance: TextValue,
    pub duration: TextValue,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub html_instructions: String,
    pub distance: TextValue,
    pub duration: TextValue,
    #[serde(default)]
    pub polyline: Option<EncodedPolyline>,
}

impl DirectionsResponse {
    /// Parse a JSON response body
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Convert every returned route, primary first
    pub fn into_routes(self) -> Result<Vec<Route>> {
        if self.status != "OK" {
            return Err(NavError::InvalidRoute(format!(
                "directions provider returned status {}",
                self.status
            )));
        }
        Ok(self.routes.iter().map(Route::from_directions).collect())
    }
}

impl Route {
    /// Build a route from one entry of a directions response
    pub fn from_directions(response: &ResponseRoute) -> Route {
        let coordinates = polyline::decode(&response.overview_polyline.points);

        let distance_meters: f64 = response.legs.iter().map(|l| l.distance.value).sum();
        let duration_seconds: f64 = response.legs.iter().map(|l| l.duration.value).sum();

        // A single leg already carries provider-formatted texts
        let (distance_text, duration_text) = match response.legs.as_slice() {
            [] => (None, None),
            [leg] => (leg.distance.text.clone(), leg.duration.text.clone()),
            _ => (
                Some(format_distance(distance_meters)),
                Some(format_duration(duration_seconds)),
            ),
        };

        let mut steps = Vec::new();
        let mut legs = Vec::with_capacity(response.legs.len());
        for leg in &response.legs {
            let mut leg_path: Vec<Coordinate> = Vec::new();
            for step in &leg.steps {
                let step_path = polyline::decode_opt(step.polyline.as_ref().map(|p| p.points.as_str()));
                leg_path.extend(&step_path);
                steps.push(RouteStep {
                    instruction: strip_html(&step.html_instructions),
                    distance_meters: step.distance.value,
                    duration_seconds: step.duration.value,
                    coordinates: step_path,
                });
            }
            legs.push(leg_path);
        }

        tracing::debug!(
            "Converted directions route {:?}: {} points, {} steps, {} legs",
            response.summary,
            coordinates.len(),
            steps.len(),
            legs.len()
        );

        Route {
            distance_meters,
            duration_seconds,
            distance_text,
            duration_text,
            coordinates,
            steps,
            legs: (legs.len() > 1).then_some(legs),
        }
    }
}

/// Drop markup from provider instructions ("Turn <b>left</b>" -> "Turn left")
fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                // Block tags separate sentences
                if !out.ends_with(' ') && !out.is_empty() {
                    out.push(' ');
                }
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Provider that answers every request with a saved response file
pub struct FileDirectionsProvider {
    path: PathBuf,
}

impl FileDirectionsProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl DirectionsProvider for FileDirectionsProvider {
    fn routes(&self, request: &DirectionsRequest) -> Result<Vec<Route>> {
        tracing::debug!(
            "[PROVIDER] Reading directions from {} for {:?} -> {:?} ({} stops, optimize={})",
            self.path.display(),
            request.origin,
            request.destination,
            request.waypoints.len(),
            request.optimize_waypoints
        );
        let text = std::fs::read_to_string(&self.path)?;
        DirectionsResponse::from_json(&text)?.into_routes()
    }
}
