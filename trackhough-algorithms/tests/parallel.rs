#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
use approx::assert_relative_eq;
use std::f64::consts::TAU;
use trackhough_algorithms::{extract_peaks, partitioned_vote, vote, RadiusSweep};
use trackhough_core::{AccumulatorConfig, AccumulatorGrid, EdgePolicy, Error, Point, PolarPoint};

fn lcg_points(count: usize, seed: u64) -> Vec<PolarPoint> {
    let mut rng_seed = seed;
    let mut next = move || {
        rng_seed = (rng_seed.wrapping_mul(1_103_515_245).wrapping_add(12345)) & 0x7fff_ffff;
        (rng_seed % 10_000) as f64 / 10_000.0
    };
    (0..count)
        .map(|i| PolarPoint::new(next() * 0.6, next() * 6.0 - 3.0, (i % 8) as u8))
        .collect()
}

#[test]
fn test_partitioned_vote_equals_serial_vote() {
    let points = lcg_points(200, 7);
    for config in [
        AccumulatorConfig::new(-0.28, 0.28, 37, -3.6, 3.6, 120),
        AccumulatorConfig::new(-0.28, 0.28, 37, -3.6, 3.6, 120)
            .with_edge_policy(EdgePolicy::Strict),
        AccumulatorConfig::new(-0.28, 0.28, 37, -3.6, 3.6, 120).with_layers(8),
    ] {
        let mut grid = AccumulatorGrid::new(config).unwrap();
        vote(&mut grid, &points);
        let serial = extract_peaks(&grid, 3);
        assert!(!serial.is_empty());
        for workers in [1, 2, 3, 5, 8, 64] {
            let parallel = partitioned_vote(&config, &points, 3, workers).unwrap();
            assert_eq!(parallel, serial, "workers = {workers}");
        }
    }
}

#[test]
fn test_partitioned_vote_rejects_invalid_config() {
    let config = AccumulatorConfig::new(1.0, -1.0, 5, -1.0, 1.0, 5);
    assert!(matches!(
        partitioned_vote(&config, &[], 0, 2),
        Err(Error::InvalidConfig(_))
    ));
}

fn ring(center_x: f64, center_y: f64, radius: f64, count: usize) -> Vec<Point> {
    (0..count)
        .map(|k| {
            let angle = TAU * k as f64 / count as f64;
            Point::new(
                center_x + radius * angle.cos(),
                center_y + radius * angle.sin(),
                0.0,
            )
        })
        .collect()
}

#[test]
fn test_radius_sweep_recovers_circle_center() {
    let points = ring(150.0, -50.0, 100.0, 40);
    let sweep = RadiusSweep::new(300.0).with_workers(3);
    let results = sweep.run(&points, &[120.0, 80.0, 100.0]).unwrap();

    let radii: Vec<f64> = results.iter().map(|r| r.radius).collect();
    assert_eq!(radii, vec![80.0, 100.0, 120.0]);

    let best = results[1].outcome.clone().unwrap();
    assert_eq!(best.votes, 40);
    assert_relative_eq!(best.center_x, 150.0, epsilon = 1e-9);
    assert_relative_eq!(best.center_y, -50.0, epsilon = 1e-9);
    for other in [&results[0], &results[2]] {
        assert!(other.outcome.clone().unwrap().votes < best.votes);
    }
}

#[test]
fn test_radius_sweep_reports_invalid_hypotheses_individually() {
    let points = ring(0.0, 0.0, 20.0, 12);
    let results = RadiusSweep::new(100.0)
        .with_workers(2)
        .run(&points, &[f64::NAN, 20.0, -5.0])
        .unwrap();
    assert_eq!(results.len(), 3);
    assert!(matches!(results[0].outcome, Err(Error::InvalidHypothesis(_))));
    assert_eq!(results[1].outcome.clone().unwrap().votes, 12);
    assert!(matches!(results[2].outcome, Err(Error::InvalidHypothesis(_))));
}

#[test]
fn test_radius_sweep_is_seed_independent() {
    let points = ring(-30.0, 40.0, 60.0, 24);
    let radii = [40.0, 50.0, 60.0, 70.0];
    let a = RadiusSweep::new(200.0)
        .with_seed(1)
        .with_workers(2)
        .run(&points, &radii)
        .unwrap();
    let b = RadiusSweep::new(200.0)
        .with_seed(99)
        .with_workers(4)
        .run(&points, &radii)
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_radius_sweep_rejects_oversized_center_grid() {
    let points = ring(0.0, 0.0, 10.0, 8);
    let results = RadiusSweep::new(100.0)
        .with_workers(2)
        .run(&points, &[1.0e12, 10.0])
        .unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].outcome.clone().unwrap().votes, 8);
    assert!(matches!(results[1].outcome, Err(Error::InvalidHypothesis(_))));
}
