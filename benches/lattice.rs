//! Benchmarks for CPU-side scene generation.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use terra::viz::{PointCloud, ReferenceFrame, MAX_REFERENCE_SPEED};
use terra::{Fluid, ModelScale, ParticleRecord, Resolution, ResultSnapshot};

fn cube(size: f64) -> ModelScale {
    ModelScale {
        length: size,
        width: size,
        height: size,
    }
}

fn spacing(d: f64) -> Resolution {
    Resolution { dx: d, dy: d, dz: d }
}

fn bench_lattice(c: &mut Criterion) {
    let mut group = c.benchmark_group("preview_lattice");

    // Points per axis: 10, 20, 40, 80
    for n in [10u32, 20, 40, 80] {
        let scale = cube(1.0);
        let resolution = spacing(1.0 / n as f64);
        group.bench_with_input(BenchmarkId::from_parameter(n * n * n), &n, |b, _| {
            b.iter(|| black_box(PointCloud::lattice(&scale, &resolution)))
        });
    }

    group.finish();
}

fn bench_snapshot_cloud(c: &mut Criterion) {
    let mut group = c.benchmark_group("result_cloud");

    for count in [1_000usize, 10_000, 60_000] {
        let snapshot = ResultSnapshot {
            particles: (0..count)
                .map(|i| {
                    let t = i as f64 / count as f64;
                    ParticleRecord {
                        position: [t, (t * 7.0).fract(), (t * 13.0).fract()],
                        velocity: [t * 5.0, 0.0, 0.0],
                        stress: [[0.0; 3]; 3],
                        density: 1000.0,
                        energy: 0.0,
                        temperature: 293.15,
                        fluid: Fluid::Water,
                    }
                })
                .collect(),
            step: 0,
            time: 0.0,
        };
        let resolution = spacing(0.027);
        group.bench_with_input(BenchmarkId::from_parameter(count), &snapshot, |b, s| {
            b.iter(|| black_box(PointCloud::from_snapshot(s, &resolution, MAX_REFERENCE_SPEED)))
        });
    }

    group.finish();
}

fn bench_reference_frame(c: &mut Criterion) {
    c.bench_function("reference_frame", |b| {
        let scale = cube(0.5);
        let resolution = spacing(0.027);
        b.iter(|| black_box(ReferenceFrame::new(&scale, &resolution)))
    });
}

criterion_group!(benches, bench_lattice, bench_snapshot_cloud, bench_reference_frame);
criterion_main!(benches);
