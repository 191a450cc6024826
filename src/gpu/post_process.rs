//! Bloom post-processing.
//!
//! The scene is rendered to an offscreen HDR target. From there:
//!
//! 1. a luminosity high-pass keeps pixels above the threshold (half size)
//! 2. five mip levels, each half the size of the previous, blur that image
//!    with a separable Gaussian (horizontal then vertical pass)
//! 3. a composite pass adds the weighted mips back onto the scene and writes
//!    the result to the surface
//!
//! Level `i` is weighted by `strength * mix(f, 1.2 - f, radius)` with
//! `f = BLOOM_FACTORS[i]`, so a larger radius shifts weight to the wider
//! levels.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::DEPTH_FORMAT;
use crate::config::BloomSettings;

/// Format of every intermediate target.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

pub const MIP_COUNT: usize = 5;
const KERNEL_RADII: [u32; MIP_COUNT] = [3, 5, 7, 9, 11];
const BLOOM_FACTORS: [f32; MIP_COUNT] = [1.0, 0.8, 0.6, 0.4, 0.2];
const SMOOTH_WIDTH: f32 = 0.01;

/// Weight of each blurred level in the composite.
pub fn mip_weights(settings: &BloomSettings) -> [f32; MIP_COUNT] {
    BLOOM_FACTORS.map(|factor| {
        let mirrored = 1.2 - factor;
        settings.strength * (factor + (mirrored - factor) * settings.radius)
    })
}

/// Size of blur level `level` for a render target of `width` x `height`.
pub fn mip_size(width: u32, height: u32, level: usize) -> (u32, u32) {
    let half_w = (width / 2).max(1);
    let half_h = (height / 2).max(1);
    ((half_w >> level).max(1), (half_h >> level).max(1))
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct BrightParams {
    threshold: f32,
    smooth_width: f32,
    _pad: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct BlurParams {
    direction: [f32; 2],
    texel_size: [f32; 2],
    kernel_radius: u32,
    sigma: f32,
    _pad: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct CompositeParams {
    weights_a: [f32; 4],
    weights_b: [f32; 4],
}

impl CompositeParams {
    fn new(settings: &BloomSettings) -> Self {
        let w = mip_weights(settings);
        Self {
            weights_a: [w[0], w[1], w[2], w[3]],
            weights_b: [w[4], 0.0, 0.0, 0.0],
        }
    }
}

struct Target {
    view: wgpu::TextureView,
}

impl Target {
    fn new(device: &wgpu::Device, label: &str, size: (u32, u32)) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: HDR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        Self {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
        }
    }
}

/// Blur level: horizontal output feeds the vertical pass, vertical output
/// feeds the next level and the composite.
struct MipLevel {
    horizontal: Target,
    vertical: Target,
    horizontal_bind_group: wgpu::BindGroup,
    vertical_bind_group: wgpu::BindGroup,
}

/// GPU resources for the bloom chain.
pub struct BloomState {
    scene: Target,
    scene_depth: wgpu::TextureView,
    bright: Target,
    mips: Vec<MipLevel>,

    sampler: wgpu::Sampler,
    source_layout: wgpu::BindGroupLayout,
    composite_layout: wgpu::BindGroupLayout,

    bright_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,

    bright_params: wgpu::Buffer,
    composite_params: wgpu::Buffer,
    bright_bind_group: wgpu::BindGroup,
    composite_bind_group: wgpu::BindGroup,
}

impl BloomState {
    /// Create the bloom chain for a `width` x `height` render target.
    pub fn new(
        device: &wgpu::Device,
        settings: &BloomSettings,
        width: u32,
        height: u32,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Bloom Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let source_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Source Bind Group Layout"),
            entries: &[texture_entry(0), sampler_entry(1), uniform_entry(2)],
        });

        let mut composite_entries: Vec<wgpu::BindGroupLayoutEntry> =
            (0..=MIP_COUNT as u32).map(texture_entry).collect();
        composite_entries.push(sampler_entry(MIP_COUNT as u32 + 1));
        composite_entries.push(uniform_entry(MIP_COUNT as u32 + 2));
        let composite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Composite Bind Group Layout"),
            entries: &composite_entries,
        });

        let bright_pipeline = create_pass_pipeline(
            device,
            "Bloom Bright Pipeline",
            &bright_shader(),
            &source_layout,
            HDR_FORMAT,
        );
        let blur_pipeline = create_pass_pipeline(
            device,
            "Bloom Blur Pipeline",
            &blur_shader(),
            &source_layout,
            HDR_FORMAT,
        );
        let composite_pipeline = create_pass_pipeline(
            device,
            "Bloom Composite Pipeline",
            &composite_shader(),
            &composite_layout,
            surface_format,
        );

        let bright_params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Bloom Bright Params"),
            contents: bytemuck::bytes_of(&BrightParams {
                threshold: settings.threshold,
                smooth_width: SMOOTH_WIDTH,
                _pad: [0.0; 2],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let composite_params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Bloom Composite Params"),
            contents: bytemuck::bytes_of(&CompositeParams::new(settings)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let targets =
            SizedTargets::new(device, &source_layout, &sampler, &bright_params, width, height);
        let composite_bind_group = create_composite_bind_group(
            device,
            &composite_layout,
            &sampler,
            &composite_params,
            &targets.scene,
            &targets.mips,
        );

        Self {
            scene: targets.scene,
            scene_depth: targets.scene_depth,
            bright: targets.bright,
            mips: targets.mips,
            sampler,
            source_layout,
            composite_layout,
            bright_pipeline,
            blur_pipeline,
            composite_pipeline,
            bright_params,
            composite_params,
            bright_bind_group: targets.bright_bind_group,
            composite_bind_group,
        }
    }

    /// Recreate every size-dependent target after a resize.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let targets = SizedTargets::new(
            device,
            &self.source_layout,
            &self.sampler,
            &self.bright_params,
            width,
            height,
        );
        self.composite_bind_group = create_composite_bind_group(
            device,
            &self.composite_layout,
            &self.sampler,
            &self.composite_params,
            &targets.scene,
            &targets.mips,
        );
        self.scene = targets.scene;
        self.scene_depth = targets.scene_depth;
        self.bright = targets.bright;
        self.mips = targets.mips;
        self.bright_bind_group = targets.bright_bind_group;
    }

    /// Offscreen color target the scene pass renders into.
    pub fn scene_view(&self) -> &wgpu::TextureView {
        &self.scene.view
    }

    /// Depth buffer matching [`scene_view`](Self::scene_view).
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.scene_depth
    }

    /// Run the bloom chain and composite onto `output`.
    pub fn execute(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        fullscreen_pass(
            encoder,
            "Bloom Bright Pass",
            &self.bright.view,
            &self.bright_pipeline,
            &self.bright_bind_group,
        );

        for mip in &self.mips {
            fullscreen_pass(
                encoder,
                "Bloom Blur Horizontal",
                &mip.horizontal.view,
                &self.blur_pipeline,
                &mip.horizontal_bind_group,
            );
            fullscreen_pass(
                encoder,
                "Bloom Blur Vertical",
                &mip.vertical.view,
                &self.blur_pipeline,
                &mip.vertical_bind_group,
            );
        }

        fullscreen_pass(
            encoder,
            "Bloom Composite Pass",
            output,
            &self.composite_pipeline,
            &self.composite_bind_group,
        );
    }
}

/// Everything that is rebuilt when the render size changes.
struct SizedTargets {
    scene: Target,
    scene_depth: wgpu::TextureView,
    bright: Target,
    mips: Vec<MipLevel>,
    bright_bind_group: wgpu::BindGroup,
}

impl SizedTargets {
    fn new(
        device: &wgpu::Device,
        source_layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        bright_params: &wgpu::Buffer,
        width: u32,
        height: u32,
    ) -> Self {
        let scene = Target::new(device, "Bloom Scene Texture", (width, height));
        let scene_depth = create_depth_view(device, width, height);
        let bright = Target::new(device, "Bloom Bright Texture", mip_size(width, height, 0));
        let bright_bind_group =
            create_source_bind_group(device, source_layout, sampler, &scene.view, bright_params);

        let mut mips: Vec<MipLevel> = Vec::with_capacity(MIP_COUNT);
        for level in 0..MIP_COUNT {
            let size = mip_size(width, height, level);
            let horizontal = Target::new(device, "Bloom Blur Horizontal", size);
            let vertical = Target::new(device, "Bloom Blur Vertical", size);
            let texel = [1.0 / size.0 as f32, 1.0 / size.1 as f32];
            let radius = KERNEL_RADII[level];

            let horizontal_params = create_blur_params(device, [1.0, 0.0], texel, radius);
            let vertical_params = create_blur_params(device, [0.0, 1.0], texel, radius);

            let input = match mips.last() {
                Some(previous) => &previous.vertical.view,
                None => &bright.view,
            };
            let horizontal_bind_group =
                create_source_bind_group(device, source_layout, sampler, input, &horizontal_params);
            let vertical_bind_group = create_source_bind_group(
                device,
                source_layout,
                sampler,
                &horizontal.view,
                &vertical_params,
            );

            mips.push(MipLevel {
                horizontal,
                vertical,
                horizontal_bind_group,
                vertical_bind_group,
            });
        }

        Self {
            scene,
            scene_depth,
            bright,
            mips,
            bright_bind_group,
        }
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_blur_params(
    device: &wgpu::Device,
    direction: [f32; 2],
    texel_size: [f32; 2],
    kernel_radius: u32,
) -> wgpu::Buffer {
    let params = BlurParams {
        direction,
        texel_size,
        kernel_radius,
        sigma: kernel_radius as f32,
        _pad: [0.0; 2],
    };
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Bloom Blur Params"),
        contents: bytemuck::bytes_of(&params),
        usage: wgpu::BufferUsages::UNIFORM,
    })
}

fn create_source_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    source: &wgpu::TextureView,
    params: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Bloom Source Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(source),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: params.as_entire_binding(),
            },
        ],
    })
}

fn create_composite_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    params: &wgpu::Buffer,
    scene: &Target,
    mips: &[MipLevel],
) -> wgpu::BindGroup {
    let mut entries = vec![wgpu::BindGroupEntry {
        binding: 0,
        resource: wgpu::BindingResource::TextureView(&scene.view),
    }];
    for (i, mip) in mips.iter().enumerate() {
        entries.push(wgpu::BindGroupEntry {
            binding: i as u32 + 1,
            resource: wgpu::BindingResource::TextureView(&mip.vertical.view),
        });
    }
    entries.push(wgpu::BindGroupEntry {
        binding: MIP_COUNT as u32 + 1,
        resource: wgpu::BindingResource::Sampler(sampler),
    });
    entries.push(wgpu::BindGroupEntry {
        binding: MIP_COUNT as u32 + 2,
        resource: params.as_entire_binding(),
    });

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Bloom Composite Bind Group"),
        layout,
        entries: &entries,
    })
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Offscreen Depth Texture"),
        size: wgpu::Extent3d {
            width,
            height,
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

fn create_pass_pipeline(
    device: &wgpu::Device,
    label: &str,
    source: &str,
    layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
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
    })
}

fn fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}

/// Fullscreen triangle shared by every bloom pass.
const FULLSCREEN_VERTEX: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    var uvs = array<vec2<f32>, 3>(
        vec2<f32>(0.0, 1.0),
        vec2<f32>(2.0, 1.0),
        vec2<f32>(0.0, -1.0),
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(positions[vertex_index], 0.0, 1.0);
    out.uv = uvs[vertex_index];
    return out;
}
"#;

pub(crate) fn bright_shader() -> String {
    format!(
        r#"{FULLSCREEN_VERTEX}
struct BrightParams {{
    threshold: f32,
    smooth_width: f32,
    _pad: vec2<f32>,
}};

@group(0) @binding(0) var source: texture_2d<f32>;
@group(0) @binding(1) var source_sampler: sampler;
@group(0) @binding(2) var<uniform> params: BrightParams;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let texel = textureSample(source, source_sampler, in.uv);
    let luma = dot(texel.rgb, vec3<f32>(0.299, 0.587, 0.114));
    let alpha = smoothstep(params.threshold, params.threshold + params.smooth_width, luma);
    return mix(vec4<f32>(0.0), texel, alpha);
}}
"#
    )
}

pub(crate) fn blur_shader() -> String {
    format!(
        r#"{FULLSCREEN_VERTEX}
struct BlurParams {{
    direction: vec2<f32>,
    texel_size: vec2<f32>,
    kernel_radius: u32,
    sigma: f32,
    _pad: vec2<f32>,
}};

@group(0) @binding(0) var source: texture_2d<f32>;
@group(0) @binding(1) var source_sampler: sampler;
@group(0) @binding(2) var<uniform> params: BlurParams;

fn gaussian(x: f32, sigma: f32) -> f32 {{
    return 0.39894 * exp(-0.5 * x * x / (sigma * sigma)) / sigma;
}}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    var weight_sum = gaussian(0.0, params.sigma);
    var sum = textureSample(source, source_sampler, in.uv).rgb * weight_sum;
    for (var i = 1u; i < params.kernel_radius; i++) {{
        let x = f32(i);
        let w = gaussian(x, params.sigma);
        let offset = params.direction * params.texel_size * x;
        sum += textureSample(source, source_sampler, in.uv + offset).rgb * w;
        sum += textureSample(source, source_sampler, in.uv - offset).rgb * w;
        weight_sum += 2.0 * w;
    }}
    return vec4<f32>(sum / weight_sum, 1.0);
}}
"#
    )
}

pub(crate) fn composite_shader() -> String {
    format!(
        r#"{FULLSCREEN_VERTEX}
struct CompositeParams {{
    weights_a: vec4<f32>,
    weights_b: vec4<f32>,
}};

@group(0) @binding(0) var scene: texture_2d<f32>;
@group(0) @binding(1) var mip0: texture_2d<f32>;
@group(0) @binding(2) var mip1: texture_2d<f32>;
@group(0) @binding(3) var mip2: texture_2d<f32>;
@group(0) @binding(4) var mip3: texture_2d<f32>;
@group(0) @binding(5) var mip4: texture_2d<f32>;
@group(0) @binding(6) var linear_sampler: sampler;
@group(0) @binding(7) var<uniform> params: CompositeParams;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let base = textureSample(scene, linear_sampler, in.uv).rgb;
    let bloom = textureSample(mip0, linear_sampler, in.uv).rgb * params.weights_a.x
        + textureSample(mip1, linear_sampler, in.uv).rgb * params.weights_a.y
        + textureSample(mip2, linear_sampler, in.uv).rgb * params.weights_a.z
        + textureSample(mip3, linear_sampler, in.uv).rgb * params.weights_a.w
        + textureSample(mip4, linear_sampler, in.uv).rgb * params.weights_b.x;
    return vec4<f32>(base + bloom, 1.0);
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::tests::validate_wgsl;

    #[test]
    fn test_bloom_shaders_validate() {
        validate_wgsl(&bright_shader()).unwrap();
        validate_wgsl(&blur_shader()).unwrap();
        validate_wgsl(&composite_shader()).unwrap();
    }

    #[test]
    fn test_zero_radius_uses_raw_factors() {
        let settings = BloomSettings {
            strength: 1.0,
            radius: 0.0,
            threshold: 0.0,
        };
        assert_eq!(mip_weights(&settings), BLOOM_FACTORS);
    }

    #[test]
    fn test_radius_mirrors_factors() {
        let settings = BloomSettings {
            strength: 2.0,
            radius: 1.0,
            threshold: 0.0,
        };
        let w = mip_weights(&settings);
        for (weight, factor) in w.iter().zip(BLOOM_FACTORS) {
            assert!((weight - 2.0 * (1.2 - factor)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_mip_sizes_halve_and_never_vanish() {
        assert_eq!(mip_size(1920, 1080, 0), (960, 540));
        assert_eq!(mip_size(1920, 1080, 1), (480, 270));
        assert_eq!(mip_size(1920, 1080, 4), (60, 33));
        assert_eq!(mip_size(1, 1, 4), (1, 1));
    }
}
