//! Scene derivation for the 3D viewport.
//!
//! [`VisualizationEngine`] decides *what* is drawn: a preview lattice derived
//! from the box and resolution, or one point per particle once a result
//! snapshot is present. It owns no GPU objects itself. Every buffer goes
//! through a [`SceneBackend`], and the engine guarantees a release before
//! each install, so a rebuild never leaks the previous geometry.
//!
//! # Rebuild triggers
//!
//! | Change                        | Points | Reference frame | Camera  |
//! |-------------------------------|--------|-----------------|---------|
//! | box size or resolution        | yes    | yes             | reframe |
//! | snapshot arrives or clears    | yes    | no              | retarget|
//! | surface resize                | no     | yes             | aspect  |
//!
//! Changing the box or resolution while a snapshot is shown returns to the
//! preview lattice; the next snapshot switches back to result mode.

mod camera;
mod color;
mod grid;
mod lattice;
mod surface;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use std::sync::Arc;

use crate::config::{ModelScale, Resolution, SimConfig};
use crate::snapshot::ResultSnapshot;

pub use camera::{OrbitCamera, FAR, FOV_Y_DEGREES, NEAR};
pub use color::{hsl_to_rgb, speed_hue, MAX_REFERENCE_SPEED, PREVIEW_COLOR, SLOW_HUE};
pub use grid::{ReferenceFrame, MAX_GRID_DIVISIONS};
pub use lattice::{lattice_dims, LatticeDims, PointCloud, PointInstance, MAX_PREVIEW_POINTS};
pub use surface::{ResizeObserver, Surface, SurfaceSize};

/// Idle spin of the preview lattice [rad/s].
pub const IDLE_ROTATION_SPEED: f32 = 0.06;

/// Receives the engine's resource decisions.
pub trait SceneBackend {
    fn install_points(&mut self, cloud: &PointCloud);
    fn release_points(&mut self);
    fn install_frame(&mut self, frame: &ReferenceFrame);
    fn release_frame(&mut self);
    fn set_viewport(&mut self, size: SurfaceSize);
}

/// Everything the scene is derived from.
#[derive(Clone, Copy, Debug)]
pub struct SceneInputs<'a> {
    pub config: &'a SimConfig,
    pub snapshot: Option<&'a Arc<ResultSnapshot>>,
    pub is_running: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    Preview,
    Result,
}

/// Per-frame shader constants.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    /// Applied to points only; the reference frame stays still.
    pub model: [[f32; 4]; 4],
    pub camera_right: [f32; 3],
    pub point_size: f32,
    pub camera_up: [f32; 3],
    pub _pad: f32,
}

struct Mounted {
    observer: ResizeObserver,
    size: SurfaceSize,
    camera: OrbitCamera,
    /// Box and resolution the installed geometry was built from.
    built_from: Option<(ModelScale, Resolution)>,
    /// Snapshot currently drawn, if in result mode.
    shown: Option<Arc<ResultSnapshot>>,
    /// Snapshot superseded by a configuration rebuild.
    dismissed: Option<Arc<ResultSnapshot>>,
    points_installed: bool,
    frame_installed: bool,
    point_count: usize,
    point_size: f32,
    mode: RenderMode,
    is_running: bool,
    rotation: f32,
}

/// Owns the scene lifecycle between mount and unmount.
#[derive(Default)]
pub struct VisualizationEngine {
    mounted: Option<Mounted>,
}

fn same_snapshot(a: Option<&Arc<ResultSnapshot>>, b: Option<&Arc<ResultSnapshot>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

impl VisualizationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to `surface`. Mounting again first releases the previous scene.
    pub fn mount(&mut self, backend: &mut dyn SceneBackend, surface: &Surface) {
        if self.is_mounted() {
            self.unmount(backend);
        }
        let size = surface.size();
        backend.set_viewport(size);
        log::debug!("Viewport mounted at {}x{}", size.width, size.height);

        self.mounted = Some(Mounted {
            observer: surface.observe(),
            size,
            camera: OrbitCamera::framing(&SimConfig::default().model_scale, size.aspect()),
            built_from: None,
            shown: None,
            dismissed: None,
            points_installed: false,
            frame_installed: false,
            point_count: 0,
            point_size: 0.0,
            mode: RenderMode::Preview,
            is_running: false,
            rotation: 0.0,
        });
    }

    /// Release every installed resource and stop observing the surface.
    pub fn unmount(&mut self, backend: &mut dyn SceneBackend) {
        let Some(mut mounted) = self.mounted.take() else {
            return;
        };
        if mounted.points_installed {
            backend.release_points();
        }
        if mounted.frame_installed {
            backend.release_frame();
        }
        mounted.observer.disconnect();
        log::debug!("Viewport unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn mode(&self) -> Option<RenderMode> {
        self.mounted.as_ref().map(|m| m.mode)
    }

    pub fn point_count(&self) -> usize {
        self.mounted.as_ref().map_or(0, |m| m.point_count)
    }

    pub fn camera(&self) -> Option<&OrbitCamera> {
        self.mounted.as_ref().map(|m| &m.camera)
    }

    /// Bring the scene in line with `inputs`. Returns `true` if the point
    /// geometry was rebuilt.
    pub fn sync(&mut self, backend: &mut dyn SceneBackend, inputs: SceneInputs<'_>) -> bool {
        let Some(m) = self.mounted.as_mut() else {
            return false;
        };
        m.is_running = inputs.is_running;

        let scale = inputs.config.model_scale;
        let resolution = inputs.config.dx;
        let config_changed = m.built_from != Some((scale, resolution));

        if let Some(size) = m.observer.poll() {
            apply_resize(m, backend, size, !config_changed);
        }

        match inputs.snapshot {
            None => m.dismissed = None,
            Some(snapshot) if config_changed && m.built_from.is_some() => {
                m.dismissed = Some(Arc::clone(snapshot));
            }
            Some(_) => {}
        }
        let wanted = inputs
            .snapshot
            .filter(|s| !same_snapshot(Some(*s), m.dismissed.as_ref()));
        let snapshot_changed = !same_snapshot(wanted, m.shown.as_ref());

        if !config_changed && !snapshot_changed {
            return false;
        }

        let cloud = match wanted {
            Some(snapshot) => PointCloud::from_snapshot(snapshot, &resolution, MAX_REFERENCE_SPEED),
            None => PointCloud::lattice(&scale, &resolution),
        };
        if m.points_installed {
            backend.release_points();
        }
        backend.install_points(&cloud);
        m.points_installed = true;
        m.point_count = cloud.len();
        m.point_size = cloud.point_size;
        m.shown = wanted.cloned();
        m.mode = if wanted.is_some() {
            RenderMode::Result
        } else {
            RenderMode::Preview
        };

        if config_changed {
            let aspect = m.camera.aspect;
            m.camera = OrbitCamera::framing(&scale, aspect);
            install_frame(m, backend, &ReferenceFrame::new(&scale, &resolution));
            m.built_from = Some((scale, resolution));
        }
        m.camera.target = match m.mode {
            RenderMode::Result => Vec3::from(cloud.center()),
            RenderMode::Preview => Vec3::ZERO,
        };
        if m.mode == RenderMode::Result {
            m.rotation = 0.0;
        }

        log::debug!("Rebuilt {:?} geometry with {} points", m.mode, m.point_count);
        true
    }

    /// Apply a new surface size directly, bypassing the observer.
    pub fn resize(&mut self, backend: &mut dyn SceneBackend, size: SurfaceSize) {
        if let Some(m) = self.mounted.as_mut() {
            apply_resize(m, backend, size, true);
        }
    }

    /// Step the idle animation and produce this frame's uniforms.
    pub fn advance(&mut self, dt: f32) -> Option<FrameUniforms> {
        let m = self.mounted.as_mut()?;
        if m.mode == RenderMode::Preview && !m.is_running {
            m.rotation = (m.rotation + IDLE_ROTATION_SPEED * dt) % std::f32::consts::TAU;
        }

        let view = m.camera.view_matrix();
        // Rows of the view rotation are the camera axes in world space.
        let right = Vec3::new(view.x_axis.x, view.y_axis.x, view.z_axis.x);
        let up = Vec3::new(view.x_axis.y, view.y_axis.y, view.z_axis.y);

        Some(FrameUniforms {
            view_proj: m.camera.view_proj().to_cols_array_2d(),
            model: Mat4::from_rotation_y(m.rotation).to_cols_array_2d(),
            camera_right: right.to_array(),
            point_size: m.point_size,
            camera_up: up.to_array(),
            _pad: 0.0,
        })
    }

    /// Current idle rotation angle of the points [rad].
    pub fn rotation(&self) -> f32 {
        self.mounted.as_ref().map_or(0.0, |m| m.rotation)
    }

    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        if let Some(m) = self.mounted.as_mut() {
            m.camera.orbit(delta_yaw, delta_pitch);
        }
    }

    pub fn zoom(&mut self, factor: f32) {
        if let Some(m) = self.mounted.as_mut() {
            m.camera.zoom(factor);
        }
    }
}

fn install_frame(m: &mut Mounted, backend: &mut dyn SceneBackend, frame: &ReferenceFrame) {
    if m.frame_installed {
        backend.release_frame();
    }
    backend.install_frame(frame);
    m.frame_installed = true;
}

fn apply_resize(m: &mut Mounted, backend: &mut dyn SceneBackend, size: SurfaceSize, regenerate: bool) {
    m.size = size;
    m.camera.set_aspect(size.aspect());
    backend.set_viewport(size);
    if regenerate {
        if let Some((scale, resolution)) = m.built_from {
            install_frame(m, backend, &ReferenceFrame::new(&scale, &resolution));
        }
    }
    log::debug!("Viewport resized to {}x{}", size.width, size.height);
}
