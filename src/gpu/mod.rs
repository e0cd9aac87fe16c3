//! Render adapter: pushes computed group buffers into wgpu.
//!
//! All domain logic lives in the groups; this module owns only boundary
//! work. At construction it sizes one GPU buffer per group and builds the
//! pipelines; every frame it re-uploads each group's CPU-computed vertex or
//! instance buffer (the "mark dirty" contract) and draws. It never touches
//! dataset generation.

mod camera;
mod mesh;
mod shaders;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;
use winit::window::Window;

pub use camera::Camera;
pub use mesh::{MeshData, MeshVertex};

use crate::error::RenderError;
use crate::group::{InstanceData, PointVertex};
use crate::scene::Scene;
use crate::visuals::BlendMode;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Highest device pixel ratio the adapter will honor. Bounds point-size
/// blow-up on high-density displays.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    resolution: [f32; 2],
    time: f32,
    pixel_ratio: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct PointStyleRaw {
    color_bottom: [f32; 4],
    color_top: [f32; 4],
    color_glow: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct MeshStyleRaw {
    color: [f32; 4],
    shell: [f32; 4],
}

struct PointBatch {
    vertex_buffer: wgpu::Buffer,
    style_bind_group: wgpu::BindGroup,
    count: u32,
    blend: BlendMode,
}

struct MeshBatch {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instance_buffer: wgpu::Buffer,
    lit_bind_group: wgpu::BindGroup,
    halo_bind_group: Option<wgpu::BindGroup>,
    count: u32,
}

/// GPU state and per-group buffers for one window.
pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    /// Surface configuration; public so the host can read the current size.
    pub config: wgpu::SurfaceConfiguration,
    point_pipeline_alpha: wgpu::RenderPipeline,
    point_pipeline_additive: wgpu::RenderPipeline,
    mesh_pipeline: wgpu::RenderPipeline,
    halo_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    point_batches: Vec<PointBatch>,
    mesh_batches: Vec<MeshBatch>,
    depth_texture: wgpu::TextureView,
    /// Orbit camera; public so the window loop can drive it.
    pub camera: Camera,
    pixel_ratio: f32,
}

impl GpuState {
    /// Initialize the adapter for a window and size buffers for every group
    /// in the scene.
    ///
    /// Group sizes are validated against the device's addressable buffer
    /// limit up front; an oversized group is a configuration error, not a
    /// runtime panic.
    pub async fn new(window: Arc<Window>, scene: &Scene) -> Result<Self, RenderError> {
        let size = window.inner_size();
        let pixel_ratio = (window.scale_factor() as f32).min(MAX_PIXEL_RATIO);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        check_group_limits(&device, scene)?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = create_depth_texture(&device, &config);

        // Shared frame uniforms.
        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[uniform_layout_entry(wgpu::ShaderStages::VERTEX_FRAGMENT)],
            });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::bytes_of(&Uniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        // Per-group style uniforms share one layout.
        let style_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Style Bind Group Layout"),
                entries: &[uniform_layout_entry(wgpu::ShaderStages::VERTEX_FRAGMENT)],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout, &style_bind_group_layout],
            push_constant_ranges: &[],
        });

        let point_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Point Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::POINT_SHADER.into()),
        });
        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MESH_SHADER.into()),
        });

        let point_pipeline_alpha = create_point_pipeline(
            &device,
            &pipeline_layout,
            &point_shader,
            config.format,
            wgpu::BlendState::ALPHA_BLENDING,
        );
        let point_pipeline_additive = create_point_pipeline(
            &device,
            &pipeline_layout,
            &point_shader,
            config.format,
            additive_blend(),
        );
        let mesh_pipeline = create_mesh_pipeline(
            &device,
            &pipeline_layout,
            &mesh_shader,
            config.format,
            wgpu::BlendState::ALPHA_BLENDING,
            true,
        );
        let halo_pipeline = create_mesh_pipeline(
            &device,
            &pipeline_layout,
            &mesh_shader,
            config.format,
            additive_blend(),
            false,
        );

        // One vertex buffer per point group, sized once for its lifetime.
        let mut point_batches = Vec::new();
        for group in scene.point_groups() {
            if group.is_empty() {
                continue;
            }
            let visuals = group.visuals();
            let style = PointStyleRaw {
                color_bottom: visuals.color_bottom.extend(1.0).to_array(),
                color_top: visuals.color_top.extend(1.0).to_array(),
                color_glow: visuals.color_glow.extend(1.0).to_array(),
            };
            point_batches.push(PointBatch {
                vertex_buffer: device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("Point Group Buffer"),
                    size: (group.len() * std::mem::size_of::<PointVertex>()) as u64,
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                }),
                style_bind_group: create_style_bind_group(
                    &device,
                    &style_bind_group_layout,
                    bytemuck::bytes_of(&style),
                ),
                count: group.len() as u32,
                blend: visuals.blend,
            });
        }

        // Mesh groups get a mesh plus an instance buffer each.
        let mut mesh_batches = Vec::new();
        for group in scene.mesh_groups() {
            if group.is_empty() {
                continue;
            }
            let visuals = group.visuals();
            let mesh = MeshData::for_kind(visuals.mesh);

            let lit_style = MeshStyleRaw {
                color: visuals.color.extend(visuals.emissive).to_array(),
                shell: [1.0, 1.0, 0.0, 0.0],
            };
            let halo_style = MeshStyleRaw {
                color: visuals.color.extend(0.0).to_array(),
                shell: [visuals.halo_scale, visuals.halo_opacity, 1.0, 0.0],
            };
            let has_halo = visuals.halo_scale > 1.0 && visuals.halo_opacity > 0.0;

            mesh_batches.push(MeshBatch {
                vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Mesh Vertex Buffer"),
                    contents: bytemuck::cast_slice(&mesh.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
                index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Mesh Index Buffer"),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
                index_count: mesh.indices.len() as u32,
                instance_buffer: device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("Instance Buffer"),
                    size: (group.len() * std::mem::size_of::<InstanceData>()) as u64,
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                }),
                lit_bind_group: create_style_bind_group(
                    &device,
                    &style_bind_group_layout,
                    bytemuck::bytes_of(&lit_style),
                ),
                halo_bind_group: has_halo.then(|| {
                    create_style_bind_group(
                        &device,
                        &style_bind_group_layout,
                        bytemuck::bytes_of(&halo_style),
                    )
                }),
                count: group.len() as u32,
            });
        }

        Ok(Self {
            surface,
            device,
            queue,
            config,
            point_pipeline_alpha,
            point_pipeline_additive,
            mesh_pipeline,
            halo_pipeline,
            uniform_buffer,
            uniform_bind_group,
            point_batches,
            mesh_batches,
            depth_texture,
            camera: Camera::new(),
            pixel_ratio,
        })
    }

    /// Reconfigure for a new window size.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = create_depth_texture(&self.device, &self.config);
        }
    }

    /// Track a device pixel ratio change, clamped to [`MAX_PIXEL_RATIO`].
    pub fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio.min(MAX_PIXEL_RATIO);
    }

    fn update_uniforms(&mut self, time: f32) {
        let aspect = self.config.width as f32 / self.config.height as f32;
        let view = self.camera.view_matrix();
        let proj = Mat4::perspective_rh(45.0_f32.to_radians(), aspect, 0.1, 200.0);

        let uniforms = Uniforms {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            resolution: [self.config.width as f32, self.config.height as f32],
            time,
            pixel_ratio: self.pixel_ratio,
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Upload every group's freshly-computed buffer and draw one frame.
    ///
    /// The scene must have been updated for this frame already; the adapter
    /// only copies and draws.
    pub fn render(&mut self, scene: &Scene, time: f32) -> Result<(), wgpu::SurfaceError> {
        self.update_uniforms(time);

        // Re-upload per-frame buffers (positions and transforms change every
        // frame, so the whole buffer is dirty).
        let mut point_iter = self.point_batches.iter();
        for group in scene.point_groups().iter().filter(|g| !g.is_empty()) {
            if let Some(batch) = point_iter.next() {
                self.queue.write_buffer(
                    &batch.vertex_buffer,
                    0,
                    bytemuck::cast_slice(group.vertices()),
                );
            }
        }
        let mut mesh_iter = self.mesh_batches.iter();
        for group in scene.mesh_groups().iter().filter(|g| !g.is_empty()) {
            if let Some(batch) = mesh_iter.next() {
                self.queue.write_buffer(
                    &batch.instance_buffer,
                    0,
                    bytemuck::cast_slice(group.instances()),
                );
            }
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.004,
                            g: 0.022,
                            b: 0.012,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            // Opaque instanced meshes first so translucent points depth-test
            // against them.
            render_pass.set_pipeline(&self.mesh_pipeline);
            for batch in &self.mesh_batches {
                render_pass.set_bind_group(1, &batch.lit_bind_group, &[]);
                render_pass.set_vertex_buffer(0, batch.vertex_buffer.slice(..));
                render_pass.set_vertex_buffer(1, batch.instance_buffer.slice(..));
                render_pass
                    .set_index_buffer(batch.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..batch.index_count, 0, 0..batch.count);
            }

            // Halo shells, additive.
            render_pass.set_pipeline(&self.halo_pipeline);
            for batch in &self.mesh_batches {
                if let Some(halo) = &batch.halo_bind_group {
                    render_pass.set_bind_group(1, halo, &[]);
                    render_pass.set_vertex_buffer(0, batch.vertex_buffer.slice(..));
                    render_pass.set_vertex_buffer(1, batch.instance_buffer.slice(..));
                    render_pass
                        .set_index_buffer(batch.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..batch.index_count, 0, 0..batch.count);
                }
            }

            // Point billboards last.
            for batch in &self.point_batches {
                let pipeline = match batch.blend {
                    BlendMode::Alpha => &self.point_pipeline_alpha,
                    BlendMode::Additive => &self.point_pipeline_additive,
                };
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(1, &batch.style_bind_group, &[]);
                render_pass.set_vertex_buffer(0, batch.vertex_buffer.slice(..));
                render_pass.draw(0..6, 0..batch.count);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

/// Validate every group against the device's addressable buffer size.
fn check_group_limits(device: &wgpu::Device, scene: &Scene) -> Result<(), RenderError> {
    let max_bytes = device.limits().max_buffer_size as usize;

    let point_stride = std::mem::size_of::<PointVertex>();
    for group in scene.point_groups() {
        if group.len() * point_stride > max_bytes {
            return Err(RenderError::GroupTooLarge {
                count: group.len(),
                max: max_bytes / point_stride,
            });
        }
    }

    let instance_stride = std::mem::size_of::<InstanceData>();
    for group in scene.mesh_groups() {
        if group.len() * instance_stride > max_bytes {
            return Err(RenderError::GroupTooLarge {
                count: group.len(),
                max: max_bytes / instance_stride,
            });
        }
    }
    Ok(())
}

fn uniform_layout_entry(visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_style_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    contents: &[u8],
) -> wgpu::BindGroup {
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Style Buffer"),
        contents,
        usage: wgpu::BufferUsages::UNIFORM,
    });
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Style Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

fn additive_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

fn create_point_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    blend: wgpu::BlendState,
) -> wgpu::RenderPipeline {
    let attributes = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32,   // size
        2 => Float32,   // glow
        3 => Float32,   // alpha
        4 => Float32,   // height_t
    ];

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Point Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<PointVertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &attributes,
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_mesh_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    blend: wgpu::BlendState,
    depth_write: bool,
) -> wgpu::RenderPipeline {
    let vertex_attributes = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
    ];
    let instance_attributes = wgpu::vertex_attr_array![
        2 => Float32x4, // model matrix columns
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
    ];

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Mesh Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &vertex_attributes,
                },
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<InstanceData>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &instance_attributes,
                },
            ],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
