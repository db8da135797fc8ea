//! wgpu rendering of the scene.
//!
//! [`SceneResources`] holds the pipelines and the buffers currently installed
//! by the [`VisualizationEngine`](crate::viz::VisualizationEngine).
//! [`GpuBackend`] borrows them together with the device for the duration of
//! one `sync`, so the engine can swap buffers.
//!
//! Drawing happens inside an existing render pass (the host UI owns the pass
//! and the viewport rectangle); `paint` only records draw calls.

mod shaders;

pub use shaders::{LINE_SHADER, POINT_SHADER};

use wgpu::util::DeviceExt;

use crate::viz::{FrameUniforms, PointCloud, PointInstance, ReferenceFrame, SceneBackend, SurfaceSize};

const FRAME_UNIFORMS_SIZE: u64 = std::mem::size_of::<FrameUniforms>() as u64;

/// Line color of the reference frame (RGBA).
const LINE_COLOR: [f32; 4] = [0.4, 0.6, 0.8, 0.35];

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct LineParams {
    color: [f32; 4],
    half_width: f32,
    _pad: [f32; 3],
}

struct InstalledPoints {
    buffer: wgpu::Buffer,
    count: u32,
}

struct InstalledFrame {
    line_buffer: wgpu::Buffer,
    params_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    line_count: u32,
}

/// Persistent GPU state for the viewport.
pub struct SceneResources {
    uniform_buffer: wgpu::Buffer,
    point_pipeline: wgpu::RenderPipeline,
    point_bind_group: wgpu::BindGroup,
    line_pipeline: wgpu::RenderPipeline,
    line_bind_group_layout: wgpu::BindGroupLayout,
    points: Option<InstalledPoints>,
    frame: Option<InstalledFrame>,
    viewport: SurfaceSize,
}

impl SceneResources {
    pub fn new(device: &wgpu::Device, target_format: wgpu::TextureFormat) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniform Buffer"),
            size: FRAME_UNIFORMS_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let (point_pipeline, point_bind_group) =
            create_point_pipeline(device, &uniform_buffer, target_format);
        let (line_pipeline, line_bind_group_layout) = create_line_pipeline(device, target_format);

        Self {
            uniform_buffer,
            point_pipeline,
            point_bind_group,
            line_pipeline,
            line_bind_group_layout,
            points: None,
            frame: None,
            viewport: SurfaceSize::new(0, 0),
        }
    }

    pub fn write_uniforms(&self, queue: &wgpu::Queue, uniforms: &FrameUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    pub fn viewport(&self) -> SurfaceSize {
        self.viewport
    }

    pub fn point_count(&self) -> u32 {
        self.points.as_ref().map_or(0, |p| p.count)
    }

    pub fn has_frame(&self) -> bool {
        self.frame.is_some()
    }

    /// Issue draw commands.
    pub fn paint(&self, render_pass: &mut wgpu::RenderPass<'static>) {
        if self.viewport.is_empty() {
            return;
        }

        // Reference frame first so particles draw over it
        if let Some(frame) = &self.frame {
            render_pass.set_pipeline(&self.line_pipeline);
            render_pass.set_bind_group(0, &frame.bind_group, &[]);
            render_pass.draw(0..6, 0..frame.line_count);
        }

        if let Some(points) = &self.points {
            render_pass.set_pipeline(&self.point_pipeline);
            render_pass.set_bind_group(0, &self.point_bind_group, &[]);
            render_pass.set_vertex_buffer(0, points.buffer.slice(..));
            // Draw 4 vertices (quad) per point instance
            render_pass.draw(0..4, 0..points.count);
        }
    }

    /// Free every installed buffer.
    pub fn release_all(&mut self) {
        if let Some(points) = self.points.take() {
            points.buffer.destroy();
        }
        if let Some(frame) = self.frame.take() {
            frame.line_buffer.destroy();
            frame.params_buffer.destroy();
        }
    }
}

/// The engine's view of the GPU during one sync.
pub struct GpuBackend<'a> {
    pub device: &'a wgpu::Device,
    pub resources: &'a mut SceneResources,
}

impl<'a> GpuBackend<'a> {
    pub fn new(device: &'a wgpu::Device, resources: &'a mut SceneResources) -> Self {
        Self { device, resources }
    }
}

impl SceneBackend for GpuBackend<'_> {
    fn install_points(&mut self, cloud: &PointCloud) {
        // Zero-sized vertex buffers are not allowed; an empty cloud draws nothing.
        if cloud.is_empty() {
            return;
        }
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Point Instance Buffer"),
                contents: bytemuck::cast_slice(&cloud.points),
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.resources.points = Some(InstalledPoints {
            buffer,
            count: u32::try_from(cloud.len()).unwrap_or(u32::MAX),
        });
    }

    fn release_points(&mut self) {
        if let Some(points) = self.resources.points.take() {
            points.buffer.destroy();
        }
    }

    fn install_frame(&mut self, frame: &ReferenceFrame) {
        if frame.lines.is_empty() {
            return;
        }
        let device = self.device;
        let line_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Reference Line Buffer"),
            contents: bytemuck::cast_slice(&frame.lines),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let params = LineParams {
            color: LINE_COLOR,
            half_width: line_half_width(frame),
            _pad: [0.0; 3],
        };
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Reference Line Params"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Reference Line Bind Group"),
            layout: &self.resources.line_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.resources.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: line_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        });

        self.resources.frame = Some(InstalledFrame {
            line_buffer,
            params_buffer,
            bind_group,
            line_count: frame.line_count() as u32,
        });
    }

    fn release_frame(&mut self) {
        if let Some(frame) = self.resources.frame.take() {
            frame.line_buffer.destroy();
            frame.params_buffer.destroy();
        }
    }

    fn set_viewport(&mut self, size: SurfaceSize) {
        self.resources.viewport = size;
    }
}

/// Lines stay thin relative to the box they outline.
fn line_half_width(frame: &ReferenceFrame) -> f32 {
    let extent = frame
        .lines
        .iter()
        .flat_map(|p| p[..3].iter())
        .fold(0.0_f32, |acc, v| acc.max(v.abs()));
    (extent * 0.002).max(1e-5)
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn color_target(format: wgpu::TextureFormat) -> [Option<wgpu::ColorTargetState>; 1] {
    [Some(wgpu::ColorTargetState {
        format,
        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
        write_mask: wgpu::ColorWrites::ALL,
    })]
}

fn create_point_pipeline(
    device: &wgpu::Device,
    uniform_buffer: &wgpu::Buffer,
    target_format: wgpu::TextureFormat,
) -> (wgpu::RenderPipeline, wgpu::BindGroup) {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Point Shader"),
        source: wgpu::ShaderSource::Wgsl(POINT_SHADER.into()),
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Point Bind Group Layout"),
        entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Point Bind Group"),
        layout: &bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Point Pipeline Layout"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Point Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<PointInstance>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[
                    // Position
                    wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                    // Color
                    wgpu::VertexAttribute {
                        offset: 12,
                        shader_location: 1,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                ],
            }],
            compilation_options: Default::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &color_target(target_format),
            compilation_options: Default::default(),
        }),
        multiview: None,
        cache: None,
    });

    (pipeline, bind_group)
}

fn create_line_pipeline(
    device: &wgpu::Device,
    target_format: wgpu::TextureFormat,
) -> (wgpu::RenderPipeline, wgpu::BindGroupLayout) {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Reference Line Shader"),
        source: wgpu::ShaderSource::Wgsl(LINE_SHADER.into()),
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Reference Line Bind Group Layout"),
        entries: &[
            uniform_entry(0, wgpu::ShaderStages::VERTEX),
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            uniform_entry(2, wgpu::ShaderStages::VERTEX_FRAGMENT),
        ],
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Reference Line Pipeline Layout"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Reference Line Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &color_target(target_format),
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    (pipeline, bind_group_layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModelScale, Resolution};

    #[test]
    fn test_line_params_layout() {
        // vec4 color + f32, rounded up to the 16-byte uniform alignment
        assert_eq!(std::mem::size_of::<LineParams>(), 32);
    }

    #[test]
    fn test_line_width_scales_with_box() {
        let res = Resolution {
            dx: 0.1,
            dy: 0.1,
            dz: 0.1,
        };
        let small = ReferenceFrame::new(
            &ModelScale {
                length: 1.0,
                width: 1.0,
                height: 1.0,
            },
            &res,
        );
        let large = ReferenceFrame::new(
            &ModelScale {
                length: 10.0,
                width: 10.0,
                height: 10.0,
            },
            &res,
        );
        assert!(line_half_width(&large) > line_half_width(&small));
    }
}
