//! Embedded 3D viewport for the Terra editor.
//!
//! The viewport follows egui_wgpu's callback pattern:
//! - `ViewportResources` holds the engine and its GPU state (stored in
//!   `CallbackResources`, so it outlives individual frames)
//! - `ViewportCallback` carries this frame's scene inputs
//! - `prepare()` syncs the engine and uploads uniforms
//! - `paint()` issues draw commands

mod widget;

pub use widget::EmbeddedViewport;

use std::sync::Arc;
use terra::gpu::{GpuBackend, SceneResources};
use terra::viz::{SceneInputs, Surface, VisualizationEngine};
use terra::{ResultSnapshot, SimConfig};

/// Persistent viewport state living in egui's callback resources.
pub struct ViewportResources {
    pub engine: VisualizationEngine,
    pub scene: SceneResources,
    surface: Surface,
}

impl ViewportResources {
    pub fn new(device: &wgpu::Device, target_format: wgpu::TextureFormat, surface: Surface) -> Self {
        Self {
            engine: VisualizationEngine::new(),
            scene: SceneResources::new(device, target_format),
            surface,
        }
    }

    /// Mount on first use, bring the scene up to date and upload uniforms.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        inputs: SceneInputs<'_>,
        delta_time: f32,
    ) {
        let mut backend = GpuBackend::new(device, &mut self.scene);
        if !self.engine.is_mounted() {
            self.engine.mount(&mut backend, &self.surface);
        }
        self.engine.sync(&mut backend, inputs);

        if let Some(uniforms) = self.engine.advance(delta_time) {
            self.scene.write_uniforms(queue, &uniforms);
        }
    }

    /// Release every buffer the engine installed.
    pub fn unmount(&mut self, device: &wgpu::Device) {
        let mut backend = GpuBackend::new(device, &mut self.scene);
        self.engine.unmount(&mut backend);
        self.scene.release_all();
    }
}

/// Per-frame paint callback.
pub struct ViewportCallback {
    pub config: SimConfig,
    pub snapshot: Option<Arc<ResultSnapshot>>,
    pub is_running: bool,
    pub delta_time: f32,
}

impl egui_wgpu::CallbackTrait for ViewportCallback {
    fn prepare(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        _screen_descriptor: &egui_wgpu::ScreenDescriptor,
        _egui_encoder: &mut wgpu::CommandEncoder,
        resources: &mut egui_wgpu::CallbackResources,
    ) -> Vec<wgpu::CommandBuffer> {
        if let Some(viewport) = resources.get_mut::<ViewportResources>() {
            let inputs = SceneInputs {
                config: &self.config,
                snapshot: self.snapshot.as_ref(),
                is_running: self.is_running,
            };
            viewport.prepare(device, queue, inputs, self.delta_time);
        }
        Vec::new()
    }

    fn paint(
        &self,
        _info: egui::PaintCallbackInfo,
        render_pass: &mut wgpu::RenderPass<'static>,
        resources: &egui_wgpu::CallbackResources,
    ) {
        if let Some(viewport) = resources.get::<ViewportResources>() {
            viewport.scene.paint(render_pass);
        }
    }
}
