//! Integration tests for the visualization engine.

use std::sync::Arc;

use terra::viz::{
    hsl_to_rgb, speed_hue, PointCloud, ReferenceFrame, SceneBackend, SceneInputs, Surface,
    SurfaceSize, VisualizationEngine, PREVIEW_COLOR,
};
use terra::{Fluid, ModelScale, ParticleRecord, RenderMode, Resolution, ResultSnapshot, SimConfig};

// ============================================================================
// Recording backend
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Call {
    InstallPoints(usize),
    ReleasePoints,
    InstallFrame(usize),
    ReleaseFrame,
    Viewport(SurfaceSize),
}

#[derive(Default)]
struct Recorder {
    calls: Vec<Call>,
    last_cloud: Option<PointCloud>,
}

impl Recorder {
    fn live_points(&self) -> i64 {
        self.calls.iter().fold(0, |n, c| match c {
            Call::InstallPoints(_) => n + 1,
            Call::ReleasePoints => n - 1,
            _ => n,
        })
    }

    fn frame_installs(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::InstallFrame(_)))
            .count()
    }
}

impl SceneBackend for Recorder {
    fn install_points(&mut self, cloud: &PointCloud) {
        self.calls.push(Call::InstallPoints(cloud.len()));
        self.last_cloud = Some(cloud.clone());
    }
    fn release_points(&mut self) {
        self.calls.push(Call::ReleasePoints);
    }
    fn install_frame(&mut self, frame: &ReferenceFrame) {
        self.calls.push(Call::InstallFrame(frame.line_count()));
    }
    fn release_frame(&mut self) {
        self.calls.push(Call::ReleaseFrame);
    }
    fn set_viewport(&mut self, size: SurfaceSize) {
        self.calls.push(Call::Viewport(size));
    }
}

fn unit_box(spacing: f64) -> SimConfig {
    SimConfig {
        model_scale: ModelScale {
            length: 1.0,
            width: 1.0,
            height: 1.0,
        },
        dx: Resolution {
            dx: spacing,
            dy: spacing,
            dz: spacing,
        },
        ..SimConfig::default()
    }
}

fn snapshot(speeds: &[f64]) -> Arc<ResultSnapshot> {
    let particles = speeds
        .iter()
        .enumerate()
        .map(|(i, &speed)| ParticleRecord {
            position: [i as f64 * 0.1, 0.2, 0.0],
            velocity: [0.0, speed, 0.0],
            stress: [[0.0; 3]; 3],
            density: 1.2,
            energy: 0.0,
            temperature: 300.0,
            fluid: Fluid::Air,
        })
        .collect();
    Arc::new(ResultSnapshot {
        particles,
        step: 500,
        time: 0.5,
    })
}

fn mounted(config: &SimConfig) -> (VisualizationEngine, Recorder, Surface) {
    let mut backend = Recorder::default();
    let surface = Surface::new(SurfaceSize::new(800, 600));
    let mut engine = VisualizationEngine::new();
    engine.mount(&mut backend, &surface);
    engine.sync(
        &mut backend,
        SceneInputs {
            config,
            snapshot: None,
            is_running: false,
        },
    );
    (engine, backend, surface)
}

// ============================================================================
// Preview lattice
// ============================================================================

#[test]
fn test_unit_box_at_half_spacing_has_eight_points() {
    let config = unit_box(0.5);
    let (engine, backend, _surface) = mounted(&config);

    assert_eq!(engine.point_count(), 8);
    assert_eq!(engine.mode(), Some(RenderMode::Preview));
    let cloud = backend.last_cloud.unwrap();
    assert!(cloud.points.iter().all(|p| p.color == PREVIEW_COLOR));
    assert!(cloud
        .points
        .iter()
        .all(|p| p.position.iter().all(|c| c.abs() == 0.5)));
}

#[test]
fn test_rebuild_releases_before_installing() {
    let config = unit_box(0.5);
    let (mut engine, mut backend, _surface) = mounted(&config);
    backend.calls.clear();

    let finer = unit_box(0.25);
    assert!(engine.sync(
        &mut backend,
        SceneInputs {
            config: &finer,
            snapshot: None,
            is_running: false,
        },
    ));

    let release = backend.calls.iter().position(|c| *c == Call::ReleasePoints);
    let install = backend
        .calls
        .iter()
        .position(|c| matches!(c, Call::InstallPoints(_)));
    assert!(release.unwrap() < install.unwrap());
    assert_eq!(backend.calls[install.unwrap()], Call::InstallPoints(64));
    assert_eq!(engine.point_count(), 64);
}

// ============================================================================
// Result mode
// ============================================================================

#[test]
fn test_snapshot_switches_to_result_mode() {
    let config = unit_box(0.5);
    let (mut engine, mut backend, _surface) = mounted(&config);
    let result = snapshot(&[0.0, 2.5, 5.0]);

    assert!(engine.sync(
        &mut backend,
        SceneInputs {
            config: &config,
            snapshot: Some(&result),
            is_running: false,
        },
    ));
    assert_eq!(engine.mode(), Some(RenderMode::Result));
    assert_eq!(engine.point_count(), 3);
    assert_eq!(backend.live_points(), 1);

    let cloud = backend.last_cloud.unwrap();
    assert_eq!(cloud.points[0].color, hsl_to_rgb(0.7, 1.0, 0.5));
    assert_eq!(cloud.points[2].color, hsl_to_rgb(0.0, 1.0, 0.5));
}

#[test]
fn test_speed_hue_endpoints() {
    assert_eq!(speed_hue(0.0, 5.0), 0.7);
    assert_eq!(speed_hue(5.0, 5.0), 0.0);
    assert_eq!(speed_hue(50.0, 5.0), 0.0);
}

#[test]
fn test_config_change_returns_to_preview() {
    let config = unit_box(0.5);
    let (mut engine, mut backend, _surface) = mounted(&config);
    let result = snapshot(&[1.0]);
    engine.sync(
        &mut backend,
        SceneInputs {
            config: &config,
            snapshot: Some(&result),
            is_running: false,
        },
    );

    let finer = unit_box(0.25);
    engine.sync(
        &mut backend,
        SceneInputs {
            config: &finer,
            snapshot: Some(&result),
            is_running: false,
        },
    );
    assert_eq!(engine.mode(), Some(RenderMode::Preview));

    // A newer snapshot is shown again
    let newer = snapshot(&[1.0, 2.0]);
    engine.sync(
        &mut backend,
        SceneInputs {
            config: &finer,
            snapshot: Some(&newer),
            is_running: false,
        },
    );
    assert_eq!(engine.mode(), Some(RenderMode::Result));
    assert_eq!(engine.point_count(), 2);
}

// ============================================================================
// Surface and lifecycle
// ============================================================================

#[test]
fn test_resize_regenerates_reference_frame() {
    let config = unit_box(0.5);
    let (mut engine, mut backend, surface) = mounted(&config);
    assert_eq!(backend.frame_installs(), 1);

    surface.measure(1024, 512);
    assert!(!engine.sync(
        &mut backend,
        SceneInputs {
            config: &config,
            snapshot: None,
            is_running: false,
        },
    ));

    assert_eq!(backend.frame_installs(), 2);
    assert!(backend
        .calls
        .contains(&Call::Viewport(SurfaceSize::new(1024, 512))));
    assert_eq!(engine.camera().unwrap().aspect, 2.0);
}

#[test]
fn test_unmount_releases_everything() {
    let config = unit_box(0.5);
    let (mut engine, mut backend, surface) = mounted(&config);
    engine.unmount(&mut backend);

    assert_eq!(backend.live_points(), 0);
    assert!(backend.calls.ends_with(&[Call::ReleasePoints, Call::ReleaseFrame]));
    assert_eq!(surface.observer_count(), 0);
    assert!(!engine.is_mounted());
    assert!(engine.advance(0.1).is_none());
}

#[test]
fn test_remount_does_not_leak() {
    let config = unit_box(0.5);
    let (mut engine, mut backend, surface) = mounted(&config);
    engine.mount(&mut backend, &surface);
    engine.sync(
        &mut backend,
        SceneInputs {
            config: &config,
            snapshot: None,
            is_running: false,
        },
    );
    assert_eq!(backend.live_points(), 1);
    assert_eq!(surface.observer_count(), 1);
}
