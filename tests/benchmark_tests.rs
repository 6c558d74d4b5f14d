//! Performance benchmarks for per-frame and per-tick hot paths

use assert_approx_eq::assert_approx_eq;
use client::actors::MateMouse;
use client::entity_map::EntityMap;
use client::steering::LinearSteerer;
use shared::{MiceRecord, PlayfieldMap, RunningDirection, Vector2};
use std::collections::HashSet;
use std::time::Instant;

fn snapshot(count: u32, offset: f32) -> Vec<MiceRecord> {
    (0..count)
        .map(|id| MiceRecord {
            id,
            x: id as f32 + offset,
            y: 100.0,
            running_direction: Some(RunningDirection::Right),
            tunnel: None,
            alive: true,
        })
        .collect()
}

/// Benchmarks reconciliation of a large, slowly changing snapshot
#[test]
fn benchmark_entity_reconciliation() {
    let mut mates = EntityMap::new(MateMouse::new);
    let ignore: HashSet<u32> = [0].into_iter().collect();
    let snapshots: Vec<Vec<MiceRecord>> = (0..10).map(|i| snapshot(200, i as f32)).collect();

    let iterations = 1_000;
    let start = Instant::now();

    for i in 0..iterations {
        let items = &snapshots[i % snapshots.len()];
        mates.reconcile(
            items,
            |record, mate| {
                if let Some(mate) = mate {
                    mate.apply(record);
                }
            },
            &ignore,
        );
    }

    let duration = start.elapsed();
    println!(
        "Reconciliation: {} snapshots in {:?} ({:.2} µs/snapshot)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert_eq!(mates.len(), 199);
    // Generous bound so unoptimized builds pass
    assert!(duration.as_millis() < 2_000);
}

/// Benchmarks nearest point queries against the map's longest tunnel
#[test]
fn benchmark_tunnel_projection() {
    let map = PlayfieldMap::default();
    let tunnel = map.tunnel("blue").unwrap();
    let path = tunnel.path();

    let iterations = 100_000;
    let start = Instant::now();

    let mut total = 0.0;
    for i in 0..iterations {
        let point = Vector2::new((i % 300) as f32, (i % 200) as f32);
        if let Some(projection) = path.closest_point(point) {
            total += projection.distance_squared;
        }
    }

    let duration = start.elapsed();
    println!(
        "Tunnel projection: {} queries in {:?} ({:.2} ns/query)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert!(total > 0.0);
    assert!(duration.as_millis() < 1_000);
}

/// Benchmarks steering of many mirrors for one render frame
#[test]
fn benchmark_steering_frame() {
    let mut mirrors: Vec<(Vector2, LinearSteerer)> = (0..1_000)
        .map(|i| {
            let position = Vector2::new(i as f32, 0.0);
            let mut steerer = LinearSteerer::new(0.05);
            steerer.set_target(&position, i as f32 + 5.0, 5.0);
            (position, steerer)
        })
        .collect();

    let frames = 100;
    let start = Instant::now();

    for _ in 0..frames {
        for (position, steerer) in mirrors.iter_mut() {
            steerer.advance(position, 16.0);
        }
    }

    let duration = start.elapsed();
    println!("Steering: {} frames of 1000 mirrors in {:?}", frames, duration);

    assert!(mirrors.iter().all(|(_, steerer)| !steerer.has_target()));
    for (i, (position, _)) in mirrors.iter().enumerate() {
        assert_approx_eq!(position.x, i as f32 + 5.0);
        assert_approx_eq!(position.y, 5.0);
    }
    assert!(duration.as_millis() < 1_000);
}
