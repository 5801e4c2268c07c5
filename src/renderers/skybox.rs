use std::collections::{HashMap, HashSet};
use bevy_ecs::entity::Entity;
use log::{debug, error};
use wgpu::util::DeviceExt;
use crate::{
    components::{Camera, Transform},
    device::Device,
    geometry::BoxGeometry,
    loader::{CubeTextureHandle, CubeTextureLoader},
    material::{ShaderMaterial, Side},
    math::Mat4f,
    mesh::Mesh,
    renderers::shader_utils,
    texture::Texture,
};


#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniform {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    // x: tFlip, y: opacity
    params: [f32; 4],
}

impl Uniform {
    fn new(view_proj: Mat4f, model: Mat4f, material: &ShaderMaterial) -> Self {
        Self {
            view_proj: view_proj.into(),
            model: model.into(),
            params: [
                material.float("tFlip").unwrap_or(-1.0),
                material.float("opacity").unwrap_or(1.0),
                0.0,
                0.0,
            ],
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct PipelineKey {
    shader: &'static str,
    side: Side,
    depth_write: bool,
}

impl PipelineKey {
    fn of(material: &ShaderMaterial) -> Self {
        Self {
            shader: material.shader_path,
            side: material.side,
            depth_write: material.depth_write,
        }
    }
}

/// One skybox mesh to draw this frame.
pub struct SkyboxInstance<'a> {
    pub entity: Entity,
    pub mesh: &'a Mesh,
    pub model: Mat4f,
}

// GPU side of one entity's skybox mesh
struct GpuSkybox {
    texture: CubeTextureHandle,
    geometry: BoxGeometry,
    pipeline: PipelineKey,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
}

pub struct SkyboxPass {
    uniform_bind_group_layout: wgpu::BindGroupLayout,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    failed_pipelines: HashSet<PipelineKey>,
    skyboxes: HashMap<Entity, GpuSkybox>,
}

impl SkyboxPass {
    pub fn new(
        device: &Device,
        color_format: wgpu::TextureFormat,
    ) -> Self {
        let uniform_bind_group_layout = new_uniform_bind_group_layout(device);
        let texture_bind_group_layout =
            new_texture_bind_group_layout(device, wgpu::TextureViewDimension::Cube);

        let pipeline_layout = device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("[Skybox] Pipeline layout"),
                bind_group_layouts: &[&uniform_bind_group_layout, &texture_bind_group_layout],
                push_constant_ranges: &[]
            });

        Self {
            uniform_bind_group_layout,
            texture_bind_group_layout,
            pipeline_layout,
            color_format,
            pipelines: HashMap::new(),
            failed_pipelines: HashSet::new(),
            skyboxes: HashMap::new(),
        }
    }

    fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }

    // Build the pipeline for this material on first use
    fn ensure_pipeline(&mut self, device: &Device, material: &ShaderMaterial) -> Option<PipelineKey> {
        let key = PipelineKey::of(material);
        if self.pipelines.contains_key(&key) {
            return Some(key);
        }
        if self.failed_pipelines.contains(&key) {
            return None;
        }

        let mut shader_composer = shader_utils::init_composer();
        let module = match shader_utils::make_module(
            &mut shader_composer,
            material.shader_path,
            &material.shader_source,
            None,
        ) {
            Ok(module) => module,
            Err(e) => {
                error!("skybox: {e:#}");
                self.failed_pipelines.insert(key);
                return None;
            }
        };

        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Skybox Shader"),
            source: wgpu::ShaderSource::Naga(std::borrow::Cow::Owned(module)),
        });

        let primitive = wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: material.side.cull_mode(),
            ..Default::default()
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("[Skybox] Pipeline"),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: "vs_main",
                buffers: &[Self::vertex_layout()],
            },
            primitive,
            depth_stencil: Some(wgpu::DepthStencilState {
                format: Texture::DEPTH_FORMAT,
                depth_write_enabled: material.depth_write,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.color_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
        });

        debug!("skybox: built pipeline {key:?}");
        self.pipelines.insert(key, pipeline);
        Some(key)
    }

    /// Sync GPU state with this frame's skyboxes and upload their uniforms.
    ///
    /// Skyboxes whose cube texture is still loading are left out.
    pub fn prepare(
        &mut self,
        device: &Device,
        loader: &CubeTextureLoader,
        instances: &[SkyboxInstance],
        view_proj: Mat4f,
    ) {
        // Entities that lost their skybox since the last frame
        self.skyboxes
            .retain(|entity, _| instances.iter().any(|i| i.entity == *entity));

        for instance in instances {
            let material = &instance.mesh.material;
            let texture = instance.mesh.cube_texture()
                .and_then(|handle| loader.texture(handle).map(|texture| (handle, texture)));
            let Some((handle, texture)) = texture else {
                self.skyboxes.remove(&instance.entity);
                continue;
            };
            let Some(pipeline) = self.ensure_pipeline(device, material) else {
                continue;
            };

            let stale = match self.skyboxes.get(&instance.entity) {
                Some(gpu) => gpu.texture != handle
                    || gpu.geometry != instance.mesh.geometry
                    || gpu.pipeline != pipeline,
                None => true,
            };
            if stale {
                let gpu = self.new_gpu_skybox(device, instance.mesh, handle, texture, pipeline);
                self.skyboxes.insert(instance.entity, gpu);
            }

            if let Some(gpu) = self.skyboxes.get(&instance.entity) {
                let uniform = Uniform::new(view_proj, instance.model, material);
                device.queue().write_buffer(
                    &gpu.uniform_buffer,
                    0,
                    bytemuck::cast_slice(&[uniform]),
                );
            }
        }
    }

    fn new_gpu_skybox(
        &self,
        device: &Device,
        mesh: &Mesh,
        handle: CubeTextureHandle,
        texture: &Texture,
        pipeline: PipelineKey,
    ) -> GpuSkybox {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("[Skybox] Vertex buffer"),
            contents: bytemuck::cast_slice(mesh.geometry.positions()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("[Skybox] Index buffer"),
            contents: bytemuck::cast_slice(mesh.geometry.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        let uniform = Uniform::new(Mat4f::identity(), Mat4f::identity(), &mesh.material);
        let (uniform_bind_group, uniform_buffer) = new_uniform_bind_group(
            device,
            &self.uniform_bind_group_layout,
            bytemuck::cast_slice(&[uniform]),
        );
        let texture_bind_group =
            new_texture_bind_group(device, &self.texture_bind_group_layout, texture);

        GpuSkybox {
            texture: handle,
            geometry: mesh.geometry.clone(),
            pipeline,
            vertex_buffer,
            index_buffer,
            index_count: mesh.geometry.indices().len() as u32,
            uniform_buffer,
            uniform_bind_group,
            texture_bind_group,
        }
    }

    pub fn draw(
        &mut self,
        color_view: &wgpu::TextureView,
        device: &Device,
        loader: &CubeTextureLoader,
        camera: (&Camera, &Transform),
        instances: &[SkyboxInstance],
    ) -> wgpu::CommandBuffer {

        let view_proj = camera.0.view_proj(camera.1);
        self.prepare(device, loader, instances, view_proj);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Skybox Encoder"),
        });

        {
            let mut render_pass: wgpu::RenderPass<'_> = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Skybox Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: true,
                    }
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &device.depth_tex().view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: true,
                    }),
                    stencil_ops: None,
                }),
            });

            for instance in instances {
                let Some(gpu) = self.skyboxes.get(&instance.entity) else {
                    continue;
                };
                let Some(pipeline) = self.pipelines.get(&gpu.pipeline) else {
                    continue;
                };
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, &gpu.uniform_bind_group, &[]);
                render_pass.set_bind_group(1, &gpu.texture_bind_group, &[]);
                render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                render_pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..gpu.index_count, 0, 0..1);
            }
        }
        encoder.finish()
    }

    pub fn cached_skyboxes(&self) -> usize {
        self.skyboxes.len()
    }
}

pub fn new_texture_bind_group_layout(
    device: &Device,
    view_dimension: wgpu::TextureViewDimension,
) -> wgpu::BindGroupLayout {
    device
        .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("[Skybox] Texture layout"),
        })
}

pub fn new_texture_bind_group(
    device: &Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(texture.view()),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(texture.sampler()),
            },
        ],
        label: None,
    })
}

pub fn new_uniform_bind_group_layout(device: &Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("[Skybox] Uniform layout"),
    })
}

pub fn new_uniform_bind_group(
    device: &Device,
    layout: &wgpu::BindGroupLayout,
    data: &[u8],
) -> (wgpu::BindGroup, wgpu::Buffer) {
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: None,
        contents: data,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: None,
    });

    (group, buffer)
}
