//! Viewport widget for the Terra editor.
//!
//! # Usage
//!
//! ```ignore
//! let mut viewport = EmbeddedViewport::new();
//!
//! // Initialize once when wgpu is available
//! if let Some(wgpu_state) = frame.wgpu_render_state() {
//!     viewport.initialize(wgpu_state);
//! }
//!
//! // Show in your UI
//! viewport.show(ui, store.config(), store.runtime().snapshot.as_ref(), running);
//! ```

use std::sync::Arc;
use std::time::Instant;

use terra::viz::{Surface, SurfaceSize};
use terra::{ResultSnapshot, SimConfig};

use super::{ViewportCallback, ViewportResources};

/// Drag sensitivity [rad/pixel].
const ORBIT_SPEED: f32 = 0.01;
/// Zoom factor per scrolled pixel.
const ZOOM_SPEED: f32 = 0.001;

/// Viewport handle owned by the app.
///
/// The GPU side lives in egui's callback resources. Dropping the handle
/// releases it, so the scene never outlives the window.
pub struct EmbeddedViewport {
    render_state: Option<egui_wgpu::RenderState>,
    surface: Surface,
    last_frame: Instant,
}

impl Default for EmbeddedViewport {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddedViewport {
    pub fn new() -> Self {
        Self {
            render_state: None,
            surface: Surface::new(SurfaceSize::new(0, 0)),
            last_frame: Instant::now(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.render_state.is_some()
    }

    /// Create the GPU resources. Call once when the wgpu render state is available.
    pub fn initialize(&mut self, wgpu_render_state: &egui_wgpu::RenderState) {
        if self.is_initialized() {
            return;
        }
        let resources = ViewportResources::new(
            &wgpu_render_state.device,
            wgpu_render_state.target_format,
            self.surface.clone(),
        );
        wgpu_render_state
            .renderer
            .write()
            .callback_resources
            .insert(resources);
        self.render_state = Some(wgpu_render_state.clone());
        log::debug!("Viewport resources created");
    }

    /// Draw the viewport into all remaining space of `ui`.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        config: &SimConfig,
        snapshot: Option<&Arc<ResultSnapshot>>,
        is_running: bool,
    ) {
        let now = Instant::now();
        let delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let rect = ui.available_rect_before_wrap();
        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());

        let pixels_per_point = ui.ctx().pixels_per_point();
        self.surface.measure(
            (rect.width() * pixels_per_point).round() as u32,
            (rect.height() * pixels_per_point).round() as u32,
        );

        let drag = if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Secondary)
        {
            response.drag_delta()
        } else {
            egui::Vec2::ZERO
        };
        let scroll = if response.hovered() {
            ui.input(|i| i.raw_scroll_delta.y)
        } else {
            0.0
        };
        if drag != egui::Vec2::ZERO || scroll != 0.0 {
            self.with_resources(|viewport| {
                viewport
                    .engine
                    .orbit(-drag.x * ORBIT_SPEED, drag.y * ORBIT_SPEED);
                if scroll != 0.0 {
                    viewport.engine.zoom(1.0 - scroll * ZOOM_SPEED);
                }
            });
        }

        if self.is_initialized() {
            let callback = ViewportCallback {
                config: config.clone(),
                snapshot: snapshot.cloned(),
                is_running,
                delta_time,
            };
            ui.painter()
                .add(egui_wgpu::Callback::new_paint_callback(rect, callback));
        } else {
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "3D viewport requires the wgpu renderer",
                egui::FontId::proportional(14.0),
                ui.visuals().weak_text_color(),
            );
        }

        // Idle rotation needs continuous frames
        ui.ctx().request_repaint();
    }

    /// Release the scene and remove it from the callback resources.
    pub fn unmount(&mut self) {
        let Some(state) = self.render_state.take() else {
            return;
        };
        let mut renderer = state.renderer.write();
        if let Some(mut viewport) = renderer.callback_resources.remove::<ViewportResources>() {
            viewport.unmount(&state.device);
        }
        log::debug!("Viewport resources released");
    }

    fn with_resources(&self, f: impl FnOnce(&mut ViewportResources)) {
        if let Some(state) = &self.render_state {
            if let Some(viewport) = state
                .renderer
                .write()
                .callback_resources
                .get_mut::<ViewportResources>()
            {
                f(viewport);
            }
        }
    }
}

impl Drop for EmbeddedViewport {
    fn drop(&mut self) {
        self.unmount();
    }
}
