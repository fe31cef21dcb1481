//! Forward pass drawing every viewport into its own rectangle of the
//! surface: a scissored background fill followed by the model's meshes.

use std::borrow::Cow;
use std::sync::{Arc, Weak};

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4};
use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;

use crate::assets::ModelAsset;
use crate::controller::ModelInstance;
use crate::renderer::context::WgpuContext;
use crate::scene::{AmbientLight, Camera, Color, Environment, PointLight};
use crate::viewer::Rect;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    camera_position: [f32; 4],
    background: [f32; 4],
    ambient: [f32; 4],
    sky: [f32; 4],
    ground: [f32; 4],
    point_position: [f32; 4],
    point_radiance: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct DrawUniforms {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    base_color: [f32; 4],
}

/// Everything needed to draw one viewport this frame.
pub struct ViewportFrame<'a> {
    /// Target rectangle in physical pixels.
    pub rect: Rect,
    pub camera: &'a Camera,
    pub background: Color,
    pub environment: &'a Environment,
    pub ambient: &'a AmbientLight,
    pub point_light: &'a PointLight,
    pub model: Option<&'a ModelInstance>,
}

struct GpuPrimitive {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    base_color: [f32; 4],
}

struct GpuModel {
    asset: Weak<ModelAsset>,
    meshes: Vec<Vec<GpuPrimitive>>,
}

struct DrawCommand {
    model_key: usize,
    mesh: usize,
    primitive: usize,
    draw_offset: u32,
}

struct ViewportCommand {
    scissor: (u32, u32, u32, u32),
    frame_offset: u32,
    draws: Vec<DrawCommand>,
}

pub struct MeshPass {
    background_pipeline: wgpu::RenderPipeline,
    mesh_pipeline: wgpu::RenderPipeline,

    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_stride: u32,
    uniform_capacity: u32,
    bind_group: wgpu::BindGroup,

    models: FxHashMap<usize, GpuModel>,
    staging: Vec<u8>,
}

fn align_to(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}

fn model_key(asset: &Arc<ModelAsset>) -> usize {
    Arc::as_ptr(asset) as usize
}

impl MeshPass {
    #[must_use]
    pub fn new(ctx: &WgpuContext) -> Self {
        let device = &ctx.device;

        let min_alignment = device.limits().min_uniform_buffer_offset_alignment.max(1);
        let largest = std::mem::size_of::<FrameUniforms>().max(std::mem::size_of::<DrawUniforms>()) as u32;
        let uniform_stride = align_to(largest, min_alignment);

        let uniform_entry = |binding: u32, size: usize| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: wgpu::BufferSize::new(size as u64),
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Viewer BindGroup Layout"),
            entries: &[
                uniform_entry(0, std::mem::size_of::<FrameUniforms>()),
                uniform_entry(1, std::mem::size_of::<DrawUniforms>()),
            ],
        });

        let uniform_capacity = 16;
        let uniform_buffer = Self::create_uniform_buffer(device, uniform_stride, uniform_capacity);
        let bind_group = Self::create_bind_group(device, &bind_group_layout, &uniform_buffer);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Viewer Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shader.wgsl"))),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Viewer Pipeline Layout"),
            bind_group_layouts: &[Some(&bind_group_layout)],
            immediate_size: 0,
        });

        let color_target = [Some(wgpu::ColorTargetState {
            format: ctx.color_format(),
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let background_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Background Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_background"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_background"),
                targets: &color_target,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: ctx.depth_format,
                depth_write_enabled: Some(false),
                depth_compare: Some(wgpu::CompareFunction::Always),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let mesh_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_mesh"),
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_mesh"),
                targets: &color_target,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: ctx.depth_format,
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::Less),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Self {
            background_pipeline,
            mesh_pipeline,
            bind_group_layout,
            uniform_buffer,
            uniform_stride,
            uniform_capacity,
            bind_group,
            models: FxHashMap::default(),
            staging: Vec::new(),
        }
    }

    fn create_uniform_buffer(device: &wgpu::Device, stride: u32, capacity: u32) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Viewer Uniform Buffer"),
            size: u64::from(stride) * u64::from(capacity),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        let binding = |binding: u32, size: usize| wgpu::BindGroupEntry {
            binding,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer,
                offset: 0,
                size: wgpu::BufferSize::new(size as u64),
            }),
        };
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Viewer BindGroup"),
            layout,
            entries: &[
                binding(0, std::mem::size_of::<FrameUniforms>()),
                binding(1, std::mem::size_of::<DrawUniforms>()),
            ],
        })
    }

    fn ensure_uniform_capacity(&mut self, device: &wgpu::Device, required: u32) {
        if required <= self.uniform_capacity {
            return;
        }
        let mut capacity = self.uniform_capacity.max(1);
        while capacity < required {
            capacity = capacity.saturating_mul(2);
        }
        self.uniform_buffer = Self::create_uniform_buffer(device, self.uniform_stride, capacity);
        self.bind_group = Self::create_bind_group(device, &self.bind_group_layout, &self.uniform_buffer);
        self.uniform_capacity = capacity;
    }

    /// Uploads vertex and index buffers the first time an asset is seen.
    fn ensure_model(&mut self, device: &wgpu::Device, asset: &Arc<ModelAsset>) -> usize {
        let key = model_key(asset);
        if self.models.contains_key(&key) {
            return key;
        }

        let meshes = asset
            .meshes
            .iter()
            .map(|mesh| {
                mesh.primitives
                    .iter()
                    .map(|p| {
                        let vertices: Vec<Vertex> = p
                            .positions
                            .iter()
                            .zip(&p.normals)
                            .map(|(&position, &normal)| Vertex { position, normal })
                            .collect();
                        GpuPrimitive {
                            vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                                label: Some(&format!("{} Vertices", mesh.name)),
                                contents: bytemuck::cast_slice(&vertices),
                                usage: wgpu::BufferUsages::VERTEX,
                            }),
                            index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                                label: Some(&format!("{} Indices", mesh.name)),
                                contents: bytemuck::cast_slice(&p.indices),
                                usage: wgpu::BufferUsages::INDEX,
                            }),
                            index_count: p.indices.len() as u32,
                            base_color: p.base_color,
                        }
                    })
                    .collect()
            })
            .collect();

        log::debug!("Uploaded GPU buffers for '{}'", asset.source);
        self.models.insert(
            key,
            GpuModel {
                asset: Arc::downgrade(asset),
                meshes,
            },
        );
        key
    }

    fn push_uniform<T: Pod>(&mut self, value: &T) -> u32 {
        let offset = self.staging.len() as u32;
        self.staging.extend_from_slice(bytemuck::bytes_of(value));
        self.staging.resize((offset + self.uniform_stride) as usize, 0);
        offset
    }

    fn frame_uniforms(view: &ViewportFrame) -> FrameUniforms {
        let pad = |v: glam::Vec3, w: f32| [v.x, v.y, v.z, w];
        let env = view.environment;
        FrameUniforms {
            view_proj: view.camera.view_projection_matrix().to_cols_array_2d(),
            camera_position: pad(view.camera.transform.position, 1.0),
            background: pad(view.background.to_linear(), 1.0),
            ambient: pad(view.ambient.radiance(), 0.0),
            sky: pad(env.sky.to_linear() * env.intensity, 0.0),
            ground: pad(env.ground.to_linear() * env.intensity, 0.0),
            point_position: pad(glam::Vec3::from_array(view.point_light.position), view.point_light.range),
            point_radiance: pad(view.point_light.radiance(), 0.0),
        }
    }

    fn prepare(&mut self, ctx: &WgpuContext, viewports: &[ViewportFrame]) -> Vec<ViewportCommand> {
        self.staging.clear();
        self.models.retain(|_, m| m.asset.strong_count() > 0);

        let mut commands = Vec::with_capacity(viewports.len());
        for view in viewports {
            if view.rect.is_empty() {
                continue;
            }
            let frame_offset = self.push_uniform(&Self::frame_uniforms(view));
            let mut draws = Vec::new();

            if let Some(instance) = view.model {
                let asset = instance.asset();
                let key = self.ensure_model(&ctx.device, asset);
                let pose = instance.pose();

                for (node, mesh) in asset.mesh_nodes() {
                    let (Some(world), Some(primitives)) = (pose.world(node), asset.meshes.get(mesh)) else {
                        continue;
                    };
                    let model = Mat4::from(*world);
                    let linear = Mat3::from(world.matrix3);
                    let normal = if linear.determinant().abs() > f32::EPSILON {
                        linear.inverse().transpose()
                    } else {
                        linear
                    };

                    for (index, primitive) in primitives.primitives.iter().enumerate() {
                        let draw_offset = self.push_uniform(&DrawUniforms {
                            model: model.to_cols_array_2d(),
                            normal_matrix: Mat4::from_mat3(normal).to_cols_array_2d(),
                            base_color: primitive.base_color,
                        });
                        draws.push(DrawCommand {
                            model_key: key,
                            mesh,
                            primitive: index,
                            draw_offset,
                        });
                    }
                }
            }

            commands.push(ViewportCommand {
                scissor: view.rect.to_scissor(ctx.size()),
                frame_offset,
                draws,
            });
        }

        let required = (self.staging.len() as u32).div_ceil(self.uniform_stride).max(1);
        self.ensure_uniform_capacity(&ctx.device, required);
        if !self.staging.is_empty() {
            ctx.queue.write_buffer(&self.uniform_buffer, 0, &self.staging);
        }

        commands
    }

    /// Clears `target` to `clear_color` and draws every viewport into it.
    pub fn render(
        &mut self,
        ctx: &WgpuContext,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        clear_color: wgpu::Color,
        viewports: &[ViewportFrame],
    ) {
        let commands = self.prepare(ctx, viewports);

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Viewer Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: ctx.depth_view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        for command in &commands {
            let (x, y, width, height) = command.scissor;
            if width == 0 || height == 0 {
                continue;
            }
            pass.set_viewport(x as f32, y as f32, width as f32, height as f32, 0.0, 1.0);
            pass.set_scissor_rect(x, y, width, height);

            pass.set_pipeline(&self.background_pipeline);
            pass.set_bind_group(0, &self.bind_group, &[command.frame_offset, command.frame_offset]);
            pass.draw(0..3, 0..1);

            pass.set_pipeline(&self.mesh_pipeline);
            for draw in &command.draws {
                let Some(primitive) = self
                    .models
                    .get(&draw.model_key)
                    .and_then(|m| m.meshes.get(draw.mesh))
                    .and_then(|m| m.get(draw.primitive))
                else {
                    continue;
                };
                pass.set_bind_group(0, &self.bind_group, &[command.frame_offset, draw.draw_offset]);
                pass.set_vertex_buffer(0, primitive.vertex_buffer.slice(..));
                pass.set_index_buffer(primitive.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..primitive.index_count, 0, 0..1);
            }
        }
    }
}
