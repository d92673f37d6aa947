use bytemuck::{Pod, Zeroable};
use glowgrid_render::BloomSettings;

use crate::shaders;

/// Format of the scene and bloom intermediate targets.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct BloomParams {
    threshold: f32,
    strength: f32,
    radius: f32,
    _pad: f32,
    texel: [f32; 2],
    direction: [f32; 2],
}

impl BloomParams {
    pub(crate) fn new(settings: &BloomSettings, width: u32, height: u32, direction: [f32; 2]) -> Self {
        Self {
            threshold: settings.threshold,
            strength: settings.effective_strength(),
            radius: settings.radius,
            _pad: 0.0,
            texel: [1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32],
            direction,
        }
    }
}

/// Blur runs at half resolution.
pub(crate) fn blur_size(width: u32, height: u32) -> (u32, u32) {
    ((width / 2).max(1), (height / 2).max(1))
}

/// Bright-pass, ping-pong Gaussian blur, and additive composite.
///
/// Reads the HDR scene target and writes the final image to the surface.
pub struct BloomPass {
    settings: BloomSettings,
    sampler: wgpu::Sampler,
    source_layout: wgpu::BindGroupLayout,
    composite_layout: wgpu::BindGroupLayout,
    bright_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    params_h: wgpu::Buffer,
    params_v: wgpu::Buffer,
    targets: Option<BloomTargets>,
    blur_size: (u32, u32),
    dirty: bool,
}

/// Size-dependent textures and the bind groups that reference them.
struct BloomTargets {
    ping: wgpu::TextureView,
    pong: wgpu::TextureView,
    bright_group: wgpu::BindGroup,
    blur_h_group: wgpu::BindGroup,
    blur_v_group: wgpu::BindGroup,
    composite_group: wgpu::BindGroup,
}

impl BloomPass {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        settings: BloomSettings,
    ) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("bloom_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let sampler_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };
        let uniform_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let source_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bloom_source_layout"),
            entries: &[texture_entry(0), sampler_entry(1), uniform_entry(2)],
        });
        let composite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bloom_composite_layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                sampler_entry(2),
                uniform_entry(3),
            ],
        });

        let bloom_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("bloom_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::post_shader(shaders::BLOOM_FRAGMENTS).into()),
        });
        let composite_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("composite_shader"),
            source: wgpu::ShaderSource::Wgsl(
                shaders::post_shader(shaders::COMPOSITE_FRAGMENT).into(),
            ),
        });

        let source_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("bloom_pipeline_layout"),
            bind_group_layouts: &[&source_layout],
            push_constant_ranges: &[],
        });
        let composite_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("composite_pipeline_layout"),
                bind_group_layouts: &[&composite_layout],
                push_constant_ranges: &[],
            });

        let bright_pipeline = fullscreen_pipeline(
            device,
            "bloom_bright_pipeline",
            &source_pipeline_layout,
            &bloom_shader,
            "fs_bright",
            HDR_FORMAT,
        );
        let blur_pipeline = fullscreen_pipeline(
            device,
            "bloom_blur_pipeline",
            &source_pipeline_layout,
            &bloom_shader,
            "fs_blur",
            HDR_FORMAT,
        );
        let composite_pipeline = fullscreen_pipeline(
            device,
            "bloom_composite_pipeline",
            &composite_pipeline_layout,
            &composite_shader,
            "fs_composite",
            surface_format,
        );

        let params_buffer = |label: &str| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: std::mem::size_of::<BloomParams>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let params_h = params_buffer("bloom_params_h");
        let params_v = params_buffer("bloom_params_v");

        Self {
            settings: settings.sanitized(),
            sampler,
            source_layout,
            composite_layout,
            bright_pipeline,
            blur_pipeline,
            composite_pipeline,
            params_h,
            params_v,
            targets: None,
            blur_size: (1, 1),
            dirty: true,
        }
    }

    pub fn set_settings(&mut self, settings: BloomSettings) {
        let settings = settings.sanitized();
        if settings != self.settings {
            tracing::debug!(?settings, "bloom settings changed");
            self.settings = settings;
            self.dirty = true;
        }
    }

    /// Recreate the blur targets for a new scene target.
    pub fn resize(&mut self, device: &wgpu::Device, scene: &wgpu::TextureView, width: u32, height: u32) {
        let (bw, bh) = blur_size(width, height);
        let ping = hdr_target(device, "bloom_ping", bw, bh);
        let pong = hdr_target(device, "bloom_pong", bw, bh);

        let source_group = |label: &str, view: &wgpu::TextureView, params: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &self.source_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: params.as_entire_binding(),
                    },
                ],
            })
        };
        let bright_group = source_group("bloom_bright_group", scene, &self.params_h);
        let blur_h_group = source_group("bloom_blur_h_group", &ping, &self.params_h);
        let blur_v_group = source_group("bloom_blur_v_group", &pong, &self.params_v);

        let composite_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bloom_composite_group"),
            layout: &self.composite_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(scene),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&ping),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: self.params_h.as_entire_binding(),
                },
            ],
        });

        self.targets = Some(BloomTargets {
            ping,
            pong,
            bright_group,
            blur_h_group,
            blur_v_group,
            composite_group,
        });
        self.blur_size = (bw, bh);
        self.dirty = true;
    }

    /// Upload parameters if settings or size changed since the last frame.
    pub fn prepare(&mut self, queue: &wgpu::Queue) {
        if !self.dirty {
            return;
        }
        let (w, h) = self.blur_size;
        let horizontal = BloomParams::new(&self.settings, w, h, [1.0, 0.0]);
        let vertical = BloomParams::new(&self.settings, w, h, [0.0, 1.0]);
        queue.write_buffer(&self.params_h, 0, bytemuck::bytes_of(&horizontal));
        queue.write_buffer(&self.params_v, 0, bytemuck::bytes_of(&vertical));
        self.dirty = false;
    }

    /// Encode bright-pass, blur and composite. The composite writes `output`.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        let Some(targets) = &self.targets else {
            tracing::warn!("bloom pass has no targets; skipping frame");
            return;
        };

        if self.settings.enabled {
            fullscreen_pass(
                encoder,
                "bloom_bright_pass",
                &self.bright_pipeline,
                &targets.bright_group,
                &targets.ping,
            );
            for _ in 0..self.settings.passes {
                fullscreen_pass(
                    encoder,
                    "bloom_blur_h_pass",
                    &self.blur_pipeline,
                    &targets.blur_h_group,
                    &targets.pong,
                );
                fullscreen_pass(
                    encoder,
                    "bloom_blur_v_pass",
                    &self.blur_pipeline,
                    &targets.blur_v_group,
                    &targets.ping,
                );
            }
        }

        fullscreen_pass(
            encoder,
            "bloom_composite_pass",
            &self.composite_pipeline,
            &targets.composite_group,
            output,
        );
    }
}

/// Color target usable both as a render attachment and a sampled texture.
pub(crate) fn hdr_target(
    device: &wgpu::Device,
    label: &str,
    width: u32,
    height: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: HDR_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

fn fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    fragment_entry: &str,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_fullscreen"),
            compilation_options: Default::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some(fragment_entry),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

fn fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
    target: &wgpu::TextureView,
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
        ..Default::default()
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_layout_matches_wgsl() {
        assert_eq!(std::mem::size_of::<BloomParams>(), 32);
    }

    #[test]
    fn params_carry_texel_and_direction() {
        let p = BloomParams::new(&BloomSettings::default(), 400, 200, [0.0, 1.0]);
        assert_eq!(p.texel, [1.0 / 400.0, 1.0 / 200.0]);
        assert_eq!(p.direction, [0.0, 1.0]);
        assert_eq!(p.strength, 1.5);
    }

    #[test]
    fn disabled_bloom_composites_without_glow() {
        let settings = BloomSettings {
            enabled: false,
            ..BloomSettings::default()
        };
        let p = BloomParams::new(&settings, 1, 1, [1.0, 0.0]);
        assert_eq!(p.strength, 0.0);
    }

    #[test]
    fn blur_is_half_resolution_and_never_empty() {
        assert_eq!(blur_size(1280, 720), (640, 360));
        assert_eq!(blur_size(1, 1), (1, 1));
    }
}
