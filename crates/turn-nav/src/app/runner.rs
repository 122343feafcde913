//! Command implementations

use super::settings::{Command, RunArgs, Settings};
use super::speech::ConsoleSpeech;
use super::storage::FileStorage;
use super::AppError;
use chrono::Local;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use turn_nav_lib::directions::{DirectionsProvider, DirectionsRequest, FileDirectionsProvider};
use turn_nav_lib::ports::{KeyValueStore, load_json, save_json};
use turn_nav_lib::{
    Effect, LocationFeed, LocationFix, NavConfig, NavError, NavEvent, Navigator, Route, polyline,
};

const VOICE_KEY: &str = "voice_enabled";
const SELECTED_ROUTE_KEY: &str = "selected_route";
const LAST_ROUTES_KEY: &str = "last_routes";

/// Run the command chosen on the command line
pub async fn run(settings: Settings) -> Result<(), AppError> {
    match &settings.command {
        Command::Decode { curve } => decode(curve),
        Command::Replay(args) => replay(&settings, args),
        Command::Drive(args) => drive(&settings, args).await,
    }
}

fn decode(curve: &str) -> Result<(), AppError> {
    let path = polyline::decode(curve);
    println!("{}", serde_json::to_string_pretty(&path)?);
    Ok(())
}

/// Everything a navigation run needs, loaded and reconciled with the cache
struct Trip {
    store: FileStorage,
    routes: Vec<Route>,
    fixes: Vec<LocationFix>,
    voice: bool,
    select: Option<i64>,
}

impl Trip {
    fn load(settings: &Settings, args: &RunArgs) -> Result<Self, AppError> {
        let store = FileStorage::new_with_path(settings.cache_file.clone())?;
        tracing::debug!("Using cache {}", store.path().display());

        let fixes = load_fixes(&args.fixes)?;
        let (routes, from_cache) = load_routes(args, &fixes, &store)?;

        let voice = match args.voice_override() {
            Some(voice) => voice,
            None => load_json(&store, VOICE_KEY)?.unwrap_or(true),
        };
        save_json(&store, VOICE_KEY, &voice)?;

        // A cached selection only makes sense for the cached routes
        let select = match args.select {
            Some(index) => Some(index),
            None if from_cache => load_json::<i64>(&store, SELECTED_ROUTE_KEY)?,
            None => None,
        };

        Ok(Self {
            store,
            routes,
            fixes,
            voice,
            select,
        })
    }

    /// Load the routes and apply voice and selection at the first fix
    ///
    /// Routes are cached only once the navigator has accepted them.
    fn start(&mut self, navigator: &mut Navigator<ConsoleSpeech>) -> Result<(), AppError> {
        let start = self.fixes[0].timestamp;
        navigator.dispatch(NavEvent::SetVoice(self.voice), start);

        let effects = navigator.dispatch(NavEvent::RoutesLoaded(self.routes.clone()), start);
        if let Some(reason) = effects.into_iter().find_map(|effect| match effect {
            Effect::RoutesUnavailable(reason) => Some(reason),
            _ => None,
        }) {
            return Err(AppError::RoutesUnavailable(reason));
        }
        save_json(&self.store, LAST_ROUTES_KEY, &self.routes)?;

        if let Some(index) = self.select {
            navigator.dispatch(NavEvent::SelectRoute(index), start);
        }
        if let Some(catalog) = navigator.state().catalog() {
            save_json(&self.store, SELECTED_ROUTE_KEY, &catalog.selected_index())?;
        }
        Ok(())
    }
}

fn load_fixes(path: &Path) -> Result<Vec<LocationFix>, AppError> {
    let reader = BufReader::new(File::open(path)?);
    let fixes: Vec<LocationFix> = serde_json::from_reader(reader)?;
    if fixes.is_empty() {
        return Err(AppError::NoFixes(path.display().to_string()));
    }
    tracing::info!("Loaded {} fixes from {}", fixes.len(), path.display());
    Ok(fixes)
}

/// Routes from the directions file, the GPX track, or the cache, in that order
fn load_routes(
    args: &RunArgs,
    fixes: &[LocationFix],
    store: &dyn KeyValueStore,
) -> Result<(Vec<Route>, bool), AppError> {
    if let Some(path) = &args.routes {
        let origin = fixes
            .first()
            .and_then(LocationFix::coordinate)
            .ok_or_else(|| AppError::InvalidArgument("first fix is not a valid position".into()))?;
        let destination = fixes
            .last()
            .and_then(LocationFix::coordinate)
            .unwrap_or(origin);
        let request = DirectionsRequest {
            origin,
            destination,
            waypoints: Vec::new(),
            optimize_waypoints: false,
            alternatives: true,
        };
        let routes = FileDirectionsProvider::new(path).routes(&request)?;
        tracing::info!("Loaded {} routes from {}", routes.len(), path.display());
        return Ok((routes, false));
    }

    if let Some(path) = &args.gpx {
        let reader = BufReader::new(File::open(path)?);
        let gpx = gpx::read(reader).map_err(NavError::from)?;
        let route = Route::from_gpx(&gpx, args.cruise_speed)?;
        tracing::info!(
            "Loaded GPX route from {} ({} points)",
            path.display(),
            route.coordinates.len()
        );
        return Ok((vec![route], false));
    }

    let routes: Vec<Route> = load_json(store, LAST_ROUTES_KEY)?.ok_or(AppError::NoRoutes)?;
    tracing::info!("Reusing {} cached routes", routes.len());
    Ok((routes, true))
}

/// Feed every fix at its own timestamp and print each new snapshot as a JSON line
fn replay(settings: &Settings, args: &RunArgs) -> Result<(), AppError> {
    let mut trip = Trip::load(settings, args)?;
    let mut navigator = Navigator::new(NavConfig::default(), ConsoleSpeech);
    trip.start(&mut navigator)?;

    let fixes = std::mem::take(&mut trip.fixes);
    let mut last = None;
    for fix in fixes {
        let now = fix.timestamp;
        last = Some(now);
        for effect in navigator.dispatch(NavEvent::Fix(fix), now) {
            if let Effect::SnapshotUpdated(snapshot) = effect {
                println!("{}", serde_json::to_string(&snapshot)?);
            }
        }
    }

    if let Some(now) = last {
        navigator.dispatch(NavEvent::EndNavigation, now);
    }
    Ok(())
}

/// Publish fixes on the wall clock while the cadence ticker keeps the ETA fresh
async fn drive(settings: &Settings, args: &RunArgs) -> Result<(), AppError> {
    if !(args.speedup > 0.0 && args.speedup.is_finite()) {
        return Err(AppError::InvalidArgument(format!(
            "speedup must be positive, got {}",
            args.speedup
        )));
    }

    let mut trip = Trip::load(settings, args)?;
    let delays = playback_delays(&trip.fixes, args.speedup)?;
    let mut navigator = Navigator::new(NavConfig::default(), ConsoleSpeech);
    trip.start(&mut navigator)?;

    let (publisher, feed) = LocationFeed::channel(16);
    let (_commands_tx, commands) = mpsc::channel(4);
    let fixes = std::mem::take(&mut trip.fixes);

    let producer = tokio::spawn(async move {
        for (fix, delay) in fixes.into_iter().zip(delays) {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if !publisher.publish(fix).await {
                tracing::debug!("Feed cancelled, stopping fix playback");
                break;
            }
        }
    });

    navigator
        .run(
            feed,
            commands,
            Duration::from_millis(args.tick_ms),
            || Local::now().fixed_offset(),
        )
        .await;
    producer.await?;
    Ok(())
}

/// Wall-clock wait before each fix, the gap to the previous fix scaled down by `speedup`
fn playback_delays(fixes: &[LocationFix], speedup: f64) -> Result<Vec<Duration>, AppError> {
    let mut delays = Vec::with_capacity(fixes.len());
    let mut previous: Option<chrono::DateTime<chrono::FixedOffset>> = None;
    for fix in fixes {
        let gap = match previous {
            Some(previous) => (fix.timestamp - previous).to_std().unwrap_or_default(),
            None => Duration::ZERO,
        };
        let delay = Duration::try_from_secs_f64(gap.as_secs_f64() / speedup).map_err(|e| {
            AppError::InvalidArgument(format!("speedup {speedup} gives an unusable delay: {e}"))
        })?;
        delays.push(delay);
        previous = Some(fix.timestamp);
    }
    Ok(delays)
}
