//! GPU renderer.
//!
//! [`GpuState`] owns the wgpu device, the surface and every buffer and
//! pipeline of the scene. Each frame it uploads the body and pointer
//! transforms, draws the scene into the offscreen HDR target and hands that
//! to the bloom chain, which composites onto the surface.

pub mod camera;
#[cfg(feature = "egui")]
mod egui_integration;
mod post_process;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;
use winit::window::Window;

pub use camera::{Camera, OrbitControls};
#[cfg(feature = "egui")]
pub use egui_integration::Hud;
pub use post_process::{mip_weights, BloomState, HDR_FORMAT};

use crate::body::MeshInstance;
use crate::config::SwarmConfig;
use crate::error::GpuError;
use crate::geometry::Icosphere;
use crate::scene::Scene;
use crate::starfield::Star;
use crate::time::Time;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const BODY_DETAIL: u32 = 1;
const POINTER_DETAIL: u32 = 4;

const SKY_COLOR: u32 = 0x00bbff;
const GROUND_COLOR: u32 = 0xaa00ff;
const HEMISPHERE_INTENSITY: f32 = 0.2;
const LIGHT_COLOR: u32 = 0xf2d02f;
const LIGHT_INTENSITY: f32 = 0.5;
const WIRE_COLOR: u32 = 0xf2d02f;

const POINTER_SHADER: &str = include_str!("../shaders/pointer.wgsl");
const WIREFRAME_SHADER: &str = include_str!("../shaders/wireframe.wgsl");
const STARS_SHADER: &str = include_str!("../shaders/stars.wgsl");

/// Largest device pixel ratio the scene is rendered at.
const MAX_PIXEL_RATIO: f64 = 2.0;

/// Convert a `0xRRGGBB` sRGB color to linear RGB.
pub fn srgb_hex_to_linear(hex: u32) -> Vec3 {
    fn channel(byte: u32) -> f32 {
        let c = (byte & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }
    Vec3::new(channel(hex >> 16), channel(hex >> 8), channel(hex))
}

/// Size of the offscreen scene for a window of `width` x `height` physical
/// pixels. The pixel ratio is capped at 2, larger ratios render at a
/// proportionally smaller size and get upscaled by the composite.
pub fn render_extent(width: u32, height: u32, scale_factor: f64) -> (u32, u32) {
    let width = width.max(1);
    let height = height.max(1);
    if scale_factor <= MAX_PIXEL_RATIO {
        return (width, height);
    }
    let factor = MAX_PIXEL_RATIO / scale_factor;
    (
        ((width as f64 * factor).round() as u32).max(1),
        ((height as f64 * factor).round() as u32).max(1),
    )
}

/// Per-frame uniforms shared by every scene shader.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct Uniforms {
    view_proj: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    star_model: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    sky_color: [f32; 4],
    ground_color: [f32; 4],
    light_pos: [f32; 4],
    light_color: [f32; 4],
    wire_color: [f32; 4],
}

impl Uniforms {
    pub(crate) fn new(scene: &Scene, camera: &Camera, aspect: f32, time: f32) -> Self {
        let view = camera.view_matrix();
        let proj = camera.projection_matrix(aspect);
        let light = scene.pointer().position();

        Self {
            view_proj: (proj * view).to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            star_model: scene.starfield().model_matrix().to_cols_array_2d(),
            camera_pos: camera.position().extend(time).to_array(),
            sky_color: srgb_hex_to_linear(SKY_COLOR).extend(HEMISPHERE_INTENSITY).to_array(),
            ground_color: srgb_hex_to_linear(GROUND_COLOR).extend(1.0).to_array(),
            light_pos: light.extend(LIGHT_INTENSITY).to_array(),
            light_color: srgb_hex_to_linear(LIGHT_COLOR).extend(1.0).to_array(),
            wire_color: srgb_hex_to_linear(WIRE_COLOR).extend(1.0).to_array(),
        }
    }
}

/// Vertex, triangle index and optional edge index buffers of one mesh.
struct MeshBuffers {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
    lines: Option<(wgpu::Buffer, u32)>,
}

impl MeshBuffers {
    fn new(device: &wgpu::Device, label: &str, mesh: &Icosphere, with_lines: bool) -> Self {
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&mesh.vertex_data()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let lines = with_lines.then(|| {
            let line_indices = mesh.line_indices();
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&line_indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            (buffer, line_indices.len() as u32)
        });

        Self {
            vertices,
            indices,
            index_count: mesh.indices.len() as u32,
            lines,
        }
    }
}

pub struct GpuState {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,

    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,

    body_pipeline: wgpu::RenderPipeline,
    wireframe_pipeline: wgpu::RenderPipeline,
    pointer_pipeline: wgpu::RenderPipeline,
    star_pipeline: wgpu::RenderPipeline,

    body_mesh: MeshBuffers,
    pointer_mesh: MeshBuffers,
    body_instances: wgpu::Buffer,
    body_count: u32,
    pointer_instance: wgpu::Buffer,
    star_buffer: wgpu::Buffer,
    star_count: u32,

    bloom: BloomState,

    #[cfg(feature = "egui")]
    hud: Hud,
}

impl GpuState {
    pub async fn new(
        window: Arc<Window>,
        scene: &Scene,
        swarm: &SwarmConfig,
    ) -> Result<Self, GpuError> {
        let size = window.inner_size();
        let scale_factor = window.scale_factor();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;
        log::info!("using adapter {:?}", adapter.get_info().name);

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

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoSurfaceFormat)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        log::debug!("surface format {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let aspect = config.width as f32 / config.height as f32;
        let uniforms = Uniforms::new(scene, &Camera::new(&swarm.camera), aspect, 0.0);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let body_vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Body Vertex Shader"),
            source: wgpu::ShaderSource::Wgsl(swarm.shaders.vertex.clone()),
        });
        let body_fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Body Fragment Shader"),
            source: wgpu::ShaderSource::Wgsl(swarm.shaders.fragment.clone()),
        });
        let wireframe_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Wireframe Shader"),
            source: wgpu::ShaderSource::Wgsl(WIREFRAME_SHADER.into()),
        });
        let pointer_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Pointer Shader"),
            source: wgpu::ShaderSource::Wgsl(POINTER_SHADER.into()),
        });
        let star_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Star Shader"),
            source: wgpu::ShaderSource::Wgsl(STARS_SHADER.into()),
        });

        let mesh_layouts = [mesh_vertex_layout(), instance_layout()];

        let body_pipeline = create_scene_pipeline(
            &device,
            &pipeline_layout,
            ScenePipeline {
                label: "Body Pipeline",
                vertex: &body_vertex_module,
                fragment: &body_fragment_module,
                buffers: &mesh_layouts,
                topology: wgpu::PrimitiveTopology::TriangleList,
                depth_write: true,
                depth_compare: wgpu::CompareFunction::Less,
                blend: None,
            },
        );
        let wireframe_pipeline = create_scene_pipeline(
            &device,
            &pipeline_layout,
            ScenePipeline {
                label: "Wireframe Pipeline",
                vertex: &wireframe_module,
                fragment: &wireframe_module,
                buffers: &mesh_layouts,
                topology: wgpu::PrimitiveTopology::LineList,
                depth_write: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                blend: None,
            },
        );
        let pointer_pipeline = create_scene_pipeline(
            &device,
            &pipeline_layout,
            ScenePipeline {
                label: "Pointer Pipeline",
                vertex: &pointer_module,
                fragment: &pointer_module,
                buffers: &mesh_layouts,
                topology: wgpu::PrimitiveTopology::TriangleList,
                depth_write: true,
                depth_compare: wgpu::CompareFunction::Less,
                blend: None,
            },
        );
        let star_pipeline = create_scene_pipeline(
            &device,
            &pipeline_layout,
            ScenePipeline {
                label: "Star Pipeline",
                vertex: &star_module,
                fragment: &star_module,
                buffers: &[star_layout()],
                topology: wgpu::PrimitiveTopology::TriangleList,
                depth_write: false,
                depth_compare: wgpu::CompareFunction::Less,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            },
        );

        let body_mesh = MeshBuffers::new(&device, "Body Mesh", &Icosphere::new(BODY_DETAIL), true);
        let pointer_mesh = MeshBuffers::new(
            &device,
            "Pointer Mesh",
            &Icosphere::new(POINTER_DETAIL),
            false,
        );

        // At least one slot, so the buffer is never zero-sized
        let body_count = scene.bodies().len() as u32;
        let body_instances = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Body Instance Buffer"),
            size: (body_count.max(1) as usize * std::mem::size_of::<MeshInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let pointer_instance = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Pointer Instance Buffer"),
            contents: bytemuck::bytes_of(scene.pointer().mesh()),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let stars = scene.starfield().stars();
        let star_count = stars.len() as u32;
        let star_buffer = if stars.is_empty() {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Star Buffer"),
                contents: bytemuck::bytes_of(&Star::zeroed()),
                usage: wgpu::BufferUsages::VERTEX,
            })
        } else {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Star Buffer"),
                contents: bytemuck::cast_slice(stars),
                usage: wgpu::BufferUsages::VERTEX,
            })
        };

        let (render_w, render_h) = render_extent(config.width, config.height, scale_factor);
        let bloom = BloomState::new(&device, &swarm.bloom, render_w, render_h, surface_format);
        log::info!(
            "renderer ready: {}x{} surface, {}x{} scene target",
            config.width,
            config.height,
            render_w,
            render_h
        );

        #[cfg(feature = "egui")]
        let hud = Hud::new(&device, surface_format, &window);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            uniform_buffer,
            uniform_bind_group,
            body_pipeline,
            wireframe_pipeline,
            pointer_pipeline,
            star_pipeline,
            body_mesh,
            pointer_mesh,
            body_instances,
            body_count,
            pointer_instance,
            star_buffer,
            star_count,
            bloom,
            #[cfg(feature = "egui")]
            hud,
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Reconfigure the surface and the offscreen targets. Zero sizes are
    /// ignored.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>, scale_factor: f64) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);

            let (w, h) = render_extent(new_size.width, new_size.height, scale_factor);
            self.bloom.resize(&self.device, w, h);
            log::debug!(
                "resized to {}x{}, scene target {}x{}",
                new_size.width,
                new_size.height,
                w,
                h
            );
        }
    }

    /// Reapply the current surface configuration, after the surface was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Forward a window event to the HUD. Returns true if the HUD consumed it.
    #[cfg(feature = "egui")]
    pub fn hud_event(&mut self, event: &winit::event::WindowEvent) -> bool {
        self.hud.on_window_event(&self.window, event)
    }

    pub fn render(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        time: &Time,
    ) -> Result<(), wgpu::SurfaceError> {
        let aspect = self.config.width as f32 / self.config.height as f32;
        let uniforms = Uniforms::new(scene, camera, aspect, time.elapsed());
        self.queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let instances = scene.body_instances();
        let body_count = (instances.len() as u32).min(self.body_count);
        if body_count > 0 {
            self.queue.write_buffer(
                &self.body_instances,
                0,
                bytemuck::cast_slice(&instances[..body_count as usize]),
            );
        }
        self.queue
            .write_buffer(&self.pointer_instance, 0, bytemuck::bytes_of(scene.pointer().mesh()));

        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.bloom.scene_view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.bloom.depth_view(),
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

            if self.star_count > 0 {
                render_pass.set_pipeline(&self.star_pipeline);
                render_pass.set_vertex_buffer(0, self.star_buffer.slice(..));
                render_pass.draw(0..6, 0..self.star_count);
            }

            if body_count > 0 {
                render_pass.set_vertex_buffer(0, self.body_mesh.vertices.slice(..));
                render_pass.set_vertex_buffer(1, self.body_instances.slice(..));

                render_pass.set_pipeline(&self.body_pipeline);
                render_pass
                    .set_index_buffer(self.body_mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..self.body_mesh.index_count, 0, 0..body_count);

                if let Some((lines, line_count)) = &self.body_mesh.lines {
                    render_pass.set_pipeline(&self.wireframe_pipeline);
                    render_pass.set_index_buffer(lines.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..*line_count, 0, 0..body_count);
                }
            }

            render_pass.set_pipeline(&self.pointer_pipeline);
            render_pass.set_vertex_buffer(0, self.pointer_mesh.vertices.slice(..));
            render_pass.set_vertex_buffer(1, self.pointer_instance.slice(..));
            render_pass
                .set_index_buffer(self.pointer_mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.pointer_mesh.index_count, 0, 0..1);
        }

        self.bloom.execute(&mut encoder, &view);

        #[cfg(feature = "egui")]
        let hud_commands = {
            let screen = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [self.config.width, self.config.height],
                pixels_per_point: self.window.scale_factor() as f32,
            };
            let frame = self.hud.draw(&self.window, scene, time);
            self.hud.paint(&self.device, &self.queue, &mut encoder, &view, &frame, &screen)
        };
        #[cfg(not(feature = "egui"))]
        let hud_commands: Vec<wgpu::CommandBuffer> = Vec::new();

        self.queue
            .submit(hud_commands.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();

        Ok(())
    }
}

/// Unit sphere vertex: position at location 0.
fn mesh_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}

/// [`MeshInstance`]: center at location 1, radius at location 2.
fn instance_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![1 => Float32x3, 2 => Float32];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshInstance>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &ATTRIBUTES,
    }
}

/// [`Star`]: position at location 0, color at location 1.
fn star_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Star>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &ATTRIBUTES,
    }
}

struct ScenePipeline<'a> {
    label: &'a str,
    vertex: &'a wgpu::ShaderModule,
    fragment: &'a wgpu::ShaderModule,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    topology: wgpu::PrimitiveTopology,
    depth_write: bool,
    depth_compare: wgpu::CompareFunction,
    blend: Option<wgpu::BlendState>,
}

/// Pipeline drawing into the offscreen HDR target with depth.
fn create_scene_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    desc: ScenePipeline<'_>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: desc.vertex,
            entry_point: Some("vs_main"),
            buffers: desc.buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: desc.fragment,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: HDR_FORMAT,
                blend: desc.blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: desc.topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: desc.depth_write,
            depth_compare: desc.depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::{BODY_FRAGMENT_SHADER, BODY_VERTEX_SHADER};
    use glam::Vec2;

    use crate::pointer::PointerState;

    /// Validates WGSL code using naga.
    pub(crate) fn validate_wgsl(code: &str) -> Result<(), String> {
        let module = naga::front::wgsl::parse_str(code)
            .map_err(|e| format!("WGSL parse error: {:?}", e))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| format!("WGSL validation error: {:?}", e))?;

        Ok(())
    }

    #[test]
    fn test_scene_shaders_validate() {
        validate_wgsl(BODY_VERTEX_SHADER).expect("body vertex shader should be valid");
        validate_wgsl(BODY_FRAGMENT_SHADER).expect("body fragment shader should be valid");
        validate_wgsl(WIREFRAME_SHADER).expect("wireframe shader should be valid");
        validate_wgsl(POINTER_SHADER).expect("pointer shader should be valid");
        validate_wgsl(STARS_SHADER).expect("star shader should be valid");
    }

    #[test]
    fn test_uniform_layout_matches_wgsl() {
        // 4 mat4x4 + 6 vec4
        assert_eq!(std::mem::size_of::<Uniforms>(), 352);
    }

    #[test]
    fn test_srgb_hex_to_linear() {
        assert_eq!(srgb_hex_to_linear(0x000000), Vec3::ZERO);
        assert_eq!(srgb_hex_to_linear(0xffffff), Vec3::ONE);

        let c = srgb_hex_to_linear(0x0da2ff);
        assert!((c.x - 0.004025).abs() < 1e-4);
        assert!((c.y - 0.361307).abs() < 1e-4);
        assert!((c.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_render_extent_caps_pixel_ratio() {
        assert_eq!(render_extent(1920, 1080, 1.0), (1920, 1080));
        assert_eq!(render_extent(1920, 1080, 2.0), (1920, 1080));
        assert_eq!(render_extent(3000, 1500, 3.0), (2000, 1000));
        assert_eq!(render_extent(0, 0, 4.0), (1, 1));
    }

    #[test]
    fn test_uniforms_follow_pointer_and_time() {
        let config = SwarmConfig::default().with_body_count(2).with_star_count(4).with_seed(1);
        let mut scene = Scene::new(config.clone());
        scene.advance(&PointerState::new(Vec2::new(0.4, -0.2)));

        let camera = Camera::new(&config.camera);
        let uniforms = Uniforms::new(&scene, &camera, 16.0 / 9.0, 2.5);

        assert_eq!(uniforms.camera_pos[3], 2.5);
        assert!((uniforms.light_pos[0] - 2.0).abs() < 1e-5);
        assert!((uniforms.light_pos[1] + 1.0).abs() < 1e-5);
        assert_eq!(uniforms.light_pos[3], LIGHT_INTENSITY);
        assert_eq!(uniforms.sky_color[3], HEMISPHERE_INTENSITY);
    }
}
