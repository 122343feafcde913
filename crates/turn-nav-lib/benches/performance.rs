//! Performance benchmarks for turn-nav-lib
//!
//! Run with: cargo bench --package turn-nav-lib

use chrono::{FixedOffset, TimeDelta, TimeZone};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use turn_nav_lib::{
    Coordinate, EtaEstimator, NavConfig, Route, RouteStep, RouteTracker, geomath, polyline,
};

/// Generate a realistic wiggly path with the specified number of points.
fn generate_path(num_points: usize, base_lat: f64, base_lon: f64) -> Vec<Coordinate> {
    (0..num_points)
        .map(|i| {
            let t = i as f64 / num_points as f64;
            Coordinate {
                latitude: base_lat + t * 0.1 + (t * 50.0).sin() * 0.001,
                longitude: base_lon + t * 0.1 + (t * 30.0).cos() * 0.001,
            }
        })
        .collect()
}

fn route_from(path: Vec<Coordinate>) -> Route {
    let distance_meters = geomath::path_length(&path);
    Route {
        distance_meters,
        duration_seconds: distance_meters / 13.0,
        distance_text: Some("bench".into()),
        duration_text: Some("bench".into()),
        coordinates: path,
        steps: vec![RouteStep {
            instruction: "Follow the road".into(),
            distance_meters,
            duration_seconds: distance_meters / 13.0,
            coordinates: Vec::new(),
        }],
        legs: None,
    }
}

// ============================================================================
// Core Benchmarks - Key performance indicators
// ============================================================================

fn bench_polyline(c: &mut Criterion) {
    let mut group = c.benchmark_group("polyline");

    for size in [1_000usize, 10_000, 50_000] {
        let encoded = polyline::encode(&generate_path(size, 51.5, -0.1));
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("decode", size), &encoded, |b, encoded| {
            b.iter(|| polyline::decode(encoded));
        });
    }

    group.finish();
}

fn bench_tracking(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracking");

    // Single route with 50k points - a long motorway trip
    let path = generate_path(50_000, 51.5, -0.1);
    let tracker = RouteTracker::new(&NavConfig::default());
    let midway = path[path.len() / 2];

    group.throughput(Throughput::Elements(path.len() as u64));
    group.bench_function("status_50k", |b| {
        b.iter(|| tracker.status(&midway, &path));
    });

    group.finish();
}

fn bench_eta_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("eta");
    group.sample_size(20);

    let route = route_from(generate_path(10_000, 51.5, -0.1));
    let current = route.coordinates[100];
    let config = NavConfig::default();
    let start = FixedOffset::east_opt(0)
        .and_then(|offset| offset.with_ymd_and_hms(2025, 3, 4, 8, 0, 0).single())
        .expect("valid bench timestamp");

    group.bench_function("update_10k", |b| {
        let mut estimator = EtaEstimator::new(&config);
        let mut tick = 0;
        b.iter(|| {
            // Step past the cadence gate every iteration
            tick += 60;
            estimator.update(
                &route,
                &current,
                Some(20.0),
                start + TimeDelta::seconds(tick),
                None,
            )
        });
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(benches, bench_polyline, bench_tracking, bench_eta_update);

criterion_main!(benches);
