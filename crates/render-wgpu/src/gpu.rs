use crate::bloom::{self, BloomPass};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Mat4};
use glowgrid_common::{CubeMaterial, CubeTransform, MeshHandle};
use glowgrid_kernel::{GraphicsResources, MAX_CUBES, ResourceError};
use glowgrid_render::{BloomSettings, RenderBackend, RenderView};
use std::collections::BTreeMap;
use wgpu::util::DeviceExt;

/// Ambient light intensity fed to the cube shader.
const AMBIENT_LIGHT: f32 = 1.0;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    light: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
    emissive: [f32; 4],
}

impl InstanceData {
    fn new(material: &CubeMaterial, transform: &CubeTransform) -> Self {
        let cols = instance_model(transform).to_cols_array_2d();
        let [r, g, b] = material.color.to_linear();
        let [er, eg, eb] = material.emissive.to_linear();
        let k = material.emissive_intensity;
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color: [r, g, b, 1.0],
            emissive: [er * k, eg * k, eb * k, 0.0],
        }
    }
}

/// Model matrix for a cube: rotate about X then Y, then translate.
pub(crate) fn instance_model(transform: &CubeTransform) -> Mat4 {
    Mat4::from_translation(transform.position)
        * Mat4::from_euler(
            EulerRot::XYZ,
            transform.rotation.x,
            transform.rotation.y,
            0.0,
        )
}

/// Generate unit cube vertices and indices.
fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let p = 0.5_f32;
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([0.0, 0.0, 1.0], [[-p, -p, p], [p, -p, p], [p, p, p], [-p, p, p]]),
        ([0.0, 0.0, -1.0], [[p, -p, -p], [-p, -p, -p], [-p, p, -p], [p, p, -p]]),
        ([1.0, 0.0, 0.0], [[p, -p, p], [p, -p, -p], [p, p, -p], [p, p, p]]),
        ([-1.0, 0.0, 0.0], [[-p, -p, -p], [-p, -p, p], [-p, p, p], [-p, p, -p]]),
        ([0.0, 1.0, 0.0], [[-p, p, p], [p, p, p], [p, p, -p], [-p, p, -p]]),
        ([0.0, -1.0, 0.0], [[-p, -p, -p], [p, -p, -p], [p, -p, p], [-p, -p, p]]),
    ];
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        let base = vertices.len() as u16;
        vertices.extend(corners.iter().map(|&position| Vertex { position, normal }));
        indices.extend([0, 1, 2, 2, 3, 0].map(|i| base + i));
    }
    (vertices, indices)
}

/// A live cube owned by the renderer.
#[derive(Debug, Clone, Copy)]
struct Slot {
    material: CubeMaterial,
    transform: CubeTransform,
}

/// wgpu renderer for the glowing cube grid.
///
/// Owns the per-cube materials and transforms. Each frame draws every live
/// cube into an HDR target, then runs the bloom pass onto the surface.
pub struct WgpuRenderer {
    cube_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    cube_vertex_buffer: wgpu::Buffer,
    cube_index_buffer: wgpu::Buffer,
    cube_index_count: u32,
    instance_buffer: wgpu::Buffer,
    max_instances: usize,
    scene_texture: wgpu::TextureView,
    depth_texture: wgpu::TextureView,
    bloom: BloomPass,
    slots: BTreeMap<MeshHandle, Slot>,
    next_handle: u64,
    size: (u32, u32),
    pending_size: Option<(u32, u32)>,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        bloom_settings: BloomSettings,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                light: [AMBIENT_LIGHT, 0.0, 0.0, 0.0],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
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
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("cube_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let cube_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cube_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::CUBE_SHADER.into()),
        });

        let cube_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cube_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &cube_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                            7 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &cube_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: bloom::HDR_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let (cube_verts, cube_indices) = cube_mesh();
        let cube_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_vertex_buffer"),
            contents: bytemuck::cast_slice(&cube_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let cube_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_index_buffer"),
            contents: bytemuck::cast_slice(&cube_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let cube_index_count = cube_indices.len() as u32;

        // Pre-allocated for the largest grid the kernel will build.
        let max_instances = MAX_CUBES;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene_texture = bloom::hdr_target(device, "scene_texture", width, height);
        let depth_texture = Self::create_depth_texture(device, width, height);
        let mut bloom = BloomPass::new(device, surface_format, bloom_settings);
        bloom.resize(device, &scene_texture, width, height);

        tracing::info!(width, height, ?surface_format, "wgpu renderer ready");

        Self {
            cube_pipeline,
            uniform_buffer,
            uniform_bind_group,
            cube_vertex_buffer,
            cube_index_buffer,
            cube_index_count,
            instance_buffer,
            max_instances,
            scene_texture,
            depth_texture,
            bloom,
            slots: BTreeMap::new(),
            next_handle: 0,
            size: (width, height),
            pending_size: None,
        }
    }

    pub fn set_bloom(&mut self, settings: BloomSettings) {
        self.bloom.set_settings(settings);
    }

    /// Render one frame: cubes into the HDR target, then bloom onto `target`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        view: &RenderView,
    ) {
        if let Some((width, height)) = self.pending_size.take() {
            self.recreate_targets(device, width, height);
        }

        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: view.view_projection().to_cols_array_2d(),
                light: [AMBIENT_LIGHT, 0.0, 0.0, 0.0],
            }),
        );

        let instances: Vec<InstanceData> = self
            .slots
            .values()
            .take(self.max_instances)
            .map(|slot| InstanceData::new(&slot.material, &slot.transform))
            .collect();

        if !instances.is_empty() {
            queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&instances),
            );
        }
        self.bloom.prepare(queue);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.scene_texture,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
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
                ..Default::default()
            });

            if !instances.is_empty() {
                pass.set_pipeline(&self.cube_pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.cube_vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                pass.set_index_buffer(
                    self.cube_index_buffer.slice(..),
                    wgpu::IndexFormat::Uint16,
                );
                pass.draw_indexed(0..self.cube_index_count, 0, 0..instances.len() as u32);
            }
        }

        self.bloom.encode(&mut encoder, target);
        queue.submit(std::iter::once(encoder.finish()));
    }

    fn recreate_targets(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        tracing::debug!(width, height, "recreating render targets");
        self.scene_texture = bloom::hdr_target(device, "scene_texture", width, height);
        self.depth_texture = Self::create_depth_texture(device, width, height);
        self.bloom.resize(device, &self.scene_texture, width, height);
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

impl GraphicsResources for WgpuRenderer {
    fn acquire_cube(&mut self, material: CubeMaterial) -> Result<MeshHandle, ResourceError> {
        if self.slots.len() >= self.max_instances {
            return Err(ResourceError::CapacityExhausted {
                capacity: self.max_instances,
            });
        }
        let handle = MeshHandle(self.next_handle);
        self.next_handle += 1;
        self.slots.insert(
            handle,
            Slot {
                material,
                transform: CubeTransform::default(),
            },
        );
        Ok(handle)
    }

    fn release_cube(&mut self, handle: MeshHandle) {
        if self.slots.remove(&handle).is_none() {
            tracing::warn!(?handle, "release of unknown cube handle");
        }
    }

    fn set_material(&mut self, handle: MeshHandle, material: CubeMaterial) {
        if let Some(slot) = self.slots.get_mut(&handle) {
            slot.material = material;
        }
    }

    fn live_cubes(&self) -> usize {
        self.slots.len()
    }
}

impl RenderBackend for WgpuRenderer {
    fn set_transform(&mut self, handle: MeshHandle, transform: &CubeTransform) {
        if let Some(slot) = self.slots.get_mut(&handle) {
            slot.transform = *transform;
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == self.size {
            return;
        }
        self.size = (width, height);
        self.pending_size = Some((width, height));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};
    use glowgrid_common::{PALETTE, Rgb};

    #[test]
    fn cube_mesh_has_six_faces() {
        let (verts, indices) = cube_mesh();
        assert_eq!(verts.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < verts.len()));
    }

    #[test]
    fn instance_layout_matches_shader() {
        // Six vec4 attributes at locations 2..=7.
        assert_eq!(std::mem::size_of::<InstanceData>(), 6 * 16);
        assert_eq!(std::mem::size_of::<Uniforms>(), 80);
    }

    #[test]
    fn model_places_cube_at_position() {
        let t = CubeTransform::at(Vec2::new(3.0, -3.0), -10.0);
        let m = instance_model(&t);
        assert_eq!(m.transform_point3(Vec3::ZERO), Vec3::new(3.0, -3.0, -10.0));
    }

    #[test]
    fn model_rotation_keeps_center() {
        let t = CubeTransform {
            position: Vec3::new(1.0, 2.0, -10.0),
            rotation: Vec2::new(0.7, 1.3),
        };
        let m = instance_model(&t);
        assert!(m.transform_point3(Vec3::ZERO).abs_diff_eq(t.position, 1e-5));
        let corner = m.transform_point3(Vec3::splat(0.5)) - t.position;
        assert!((corner.length() - Vec3::splat(0.5).length()).abs() < 1e-5);
    }

    #[test]
    fn emissive_is_scaled_by_intensity() {
        let material = CubeMaterial::glowing(PALETTE[0]);
        let data = InstanceData::new(&material, &CubeTransform::default());
        assert_eq!(data.color, [1.0, 0.0, 0.0, 1.0]);
        assert!((data.emissive[0] - material.emissive_intensity).abs() < 1e-6);
        assert_eq!(data.emissive[1], 0.0);
    }

    #[test]
    fn black_material_does_not_glow() {
        let material = CubeMaterial::glowing(Rgb::from_hex(0x000000));
        let data = InstanceData::new(&material, &CubeTransform::default());
        assert_eq!(&data.emissive[..3], &[0.0, 0.0, 0.0]);
    }
}
