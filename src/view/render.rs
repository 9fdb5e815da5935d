use std::ops::Range;

use bytemuck::{Pod, Zeroable};

use super::gpu_init::GpuContext;
use crate::controller::{DrawItem, DrawList, SceneAssets};
use crate::model::light::MAX_POINT_LIGHTS;
use crate::model::{Camera, SceneLighting};
use crate::utils::{MeshBuffer, MeshId, Vertex};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const MIN_INSTANCE_CAPACITY: usize = 256;
const FLAG_LIT: u32 = 1;
const FLAG_TEXTURED: u32 = 2;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view_pos: [f32; 4],
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            view_pos: camera.eye.extend(1.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PointLightUniform {
    pub position: [f32; 4],
    pub color: [f32; 4],
    /// constant, linear, quadratic
    pub attenuation: [f32; 4],
}

/// std140-compatible mirror of [`SceneLighting`]. Every field is 16 bytes wide;
/// `w` components carry enable flags, shininess and spot cut-offs.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightingUniform {
    /// rgb ambient, w shininess
    pub ambient: [f32; 4],
    /// xyz direction, w enabled
    pub dir_direction: [f32; 4],
    pub dir_ambient: [f32; 4],
    pub dir_diffuse: [f32; 4],
    pub dir_specular: [f32; 4],
    /// xyz position, w enabled
    pub spot_position: [f32; 4],
    /// xyz direction, w inner cut-off cosine
    pub spot_direction: [f32; 4],
    /// rgb colour, w outer cut-off cosine
    pub spot_color: [f32; 4],
    pub spot_attenuation: [f32; 4],
    pub points: [PointLightUniform; MAX_POINT_LIGHTS],
    pub point_count: [u32; 4],
}

impl LightingUniform {
    pub fn from_scene(scene: &SceneLighting) -> Self {
        let mut uniform = Self::zeroed();
        uniform.ambient = scene.ambient.extend(scene.shininess).to_array();

        if let Some(dir) = &scene.directional {
            uniform.dir_direction = dir.direction.extend(1.0).to_array();
            uniform.dir_ambient = dir.ambient.extend(0.0).to_array();
            uniform.dir_diffuse = dir.diffuse.extend(0.0).to_array();
            uniform.dir_specular = dir.specular.extend(0.0).to_array();
        }

        if let Some(spot) = &scene.spot {
            let att = spot.attenuation;
            uniform.spot_position = spot.position.extend(1.0).to_array();
            uniform.spot_direction = spot.direction.extend(spot.inner_cos).to_array();
            uniform.spot_color = spot.color.extend(spot.outer_cos).to_array();
            uniform.spot_attenuation = [att.constant, att.linear, att.quadratic, 0.0];
        }

        let count = scene.points.len().min(MAX_POINT_LIGHTS);
        for (slot, light) in uniform.points.iter_mut().zip(&scene.points) {
            let att = light.attenuation;
            *slot = PointLightUniform {
                position: light.position.extend(1.0).to_array(),
                color: light.color.extend(1.0).to_array(),
                attenuation: [att.constant, att.linear, att.quadratic, 0.0],
            };
        }
        uniform.point_count = [count as u32, 0, 0, 0];
        uniform
    }
}

/// Per-instance vertex data: model matrix columns and colour with flags in `w`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl InstanceRaw {
    pub fn from_item(item: &DrawItem) -> Self {
        let mut flags = 0;
        if item.lit {
            flags |= FLAG_LIT;
        }
        if item.textured {
            flags |= FLAG_TEXTURED;
        }
        Self {
            model: item.model.to_cols_array_2d(),
            color: item.color.extend(flags as f32).to_array(),
        }
    }

    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
        wgpu::VertexAttribute { offset: 0, shader_location: 0, format: wgpu::VertexFormat::Float32x3 },
        wgpu::VertexAttribute { offset: 12, shader_location: 1, format: wgpu::VertexFormat::Float32x3 },
        wgpu::VertexAttribute { offset: 24, shader_location: 2, format: wgpu::VertexFormat::Float32x2 },
    ];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}

/// A run of consecutive instances sharing one mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub mesh: MeshId,
    pub instances: Range<u32>,
}

/// Groups draw items by mesh (stable within a mesh) and packs them for upload.
pub fn pack_instances(items: &[DrawItem]) -> (Vec<InstanceRaw>, Vec<Batch>) {
    let mut sorted: Vec<&DrawItem> = items.iter().collect();
    sorted.sort_by_key(|item| item.mesh.0);

    let raw = sorted.iter().map(|item| InstanceRaw::from_item(item)).collect();
    let mut batches: Vec<Batch> = Vec::new();
    for (i, item) in sorted.iter().enumerate() {
        let i = i as u32;
        match batches.last_mut() {
            Some(batch) if batch.mesh == item.mesh => batch.instances.end = i + 1,
            _ => batches.push(Batch {
                mesh: item.mesh,
                instances: i..i + 1,
            }),
        }
    }
    (raw, batches)
}

pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

/// Uploads an RGBA8 image; `None` gives a 1x1 white texel so untextured scenes share the pipeline.
fn create_diffuse_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    image: Option<&image::RgbaImage>,
) -> wgpu::TextureView {
    let white = [255u8; 4];
    let (data, width, height): (&[u8], u32, u32) = match image {
        Some(img) if img.width() > 0 && img.height() > 0 => (img.as_raw(), img.width(), img.height()),
        _ => (&white, 1, 1),
    };
    let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("diffuse_texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// egui output for one frame, tessellated and ready to paint.
pub struct UiFrame {
    pub primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub screen: egui_wgpu::ScreenDescriptor,
}

/// Instanced mesh renderer with an egui overlay pass.
pub struct Renderer {
    pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    lighting_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    meshes: Vec<Option<MeshBuffer>>,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    clear_color: wgpu::Color,
    egui_renderer: egui_wgpu::Renderer,
}

impl Renderer {
    pub fn new(gpu: &GpuContext, assets: &SceneAssets, clear_color: [f64; 3]) -> Self {
        let device = gpu.device.as_ref();

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("camera_buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let lighting_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lighting_buffer"),
            size: std::mem::size_of::<LightingUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &globals_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: camera_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: lighting_buffer.as_entire_binding() },
            ],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
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
        });
        let texture_view = create_diffuse_texture(device, &gpu.queue, assets.texture.as_ref());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("diffuse_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("texture_bind_group"),
            layout: &texture_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&texture_view) },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(&sampler) },
            ],
        });

        let pipeline = create_mesh_pipeline(device, gpu.format, &[&globals_layout, &texture_layout]);

        let meshes = assets
            .meshes
            .iter()
            .enumerate()
            .map(|(i, mesh)| {
                if mesh.indices.is_empty() {
                    tracing::warn!(mesh = i, "skipping empty mesh");
                    None
                } else {
                    Some(mesh.upload(device))
                }
            })
            .collect();

        let instance_capacity = MIN_INSTANCE_CAPACITY;
        let instance_buffer = create_instance_buffer(device, instance_capacity);
        let (depth_texture, depth_view) = create_depth_texture(device, gpu.config.width, gpu.config.height);
        let egui_renderer = egui_wgpu::Renderer::new(device, gpu.format, egui_wgpu::RendererOptions::default());

        tracing::info!(meshes = assets.meshes.len(), textured = assets.texture.is_some(), "renderer ready");

        Self {
            pipeline,
            camera_buffer,
            lighting_buffer,
            globals_bind_group,
            texture_bind_group,
            instance_buffer,
            instance_capacity,
            meshes,
            depth_texture,
            depth_view,
            clear_color: wgpu::Color {
                r: clear_color[0],
                g: clear_color[1],
                b: clear_color[2],
                a: 1.0,
            },
            egui_renderer,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let (depth_texture, depth_view) = create_depth_texture(device, width, height);
        self.depth_texture = depth_texture;
        self.depth_view = depth_view;
    }

    pub fn depth_size(&self) -> (u32, u32) {
        (self.depth_texture.width(), self.depth_texture.height())
    }

    /// Draws one frame. Surface errors are returned to the caller, which owns reconfiguration.
    pub fn render(
        &mut self,
        gpu: &GpuContext,
        camera: &Camera,
        lighting: &SceneLighting,
        list: &DrawList,
        ui: UiFrame,
    ) -> Result<(), wgpu::SurfaceError> {
        let device = gpu.device.as_ref();
        let queue = gpu.queue.as_ref();

        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&CameraUniform::from_camera(camera)));
        queue.write_buffer(&self.lighting_buffer, 0, bytemuck::bytes_of(&LightingUniform::from_scene(lighting)));

        let (instances, batches) = pack_instances(&list.items);
        if instances.len() > self.instance_capacity {
            self.instance_capacity = instances.len().next_power_of_two();
            self.instance_buffer = create_instance_buffer(device, self.instance_capacity);
            tracing::debug!(capacity = self.instance_capacity, "grew instance buffer");
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        // egui sends each texture delta once, so it must land even when this frame is lost
        apply_ui_textures(&mut self.egui_renderer, device, queue, &ui.textures_delta);
        let frame = match gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(e) => {
                release_ui_textures(&mut self.egui_renderer, &ui.textures_delta);
                return Err(e);
            }
        };
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        self.egui_renderer
            .update_buffers(device, queue, &mut encoder, &ui.primitives, &ui.screen);

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
            render_pass.set_bind_group(1, &self.texture_bind_group, &[]);
            render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));

            for batch in &batches {
                let Some(Some(mesh)) = self.meshes.get(batch.mesh.0) else {
                    continue;
                };
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.index_count, 0, batch.instances.clone());
            }
        }

        {
            let egui_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.egui_renderer
                .render(&mut egui_pass.forget_lifetime(), &ui.primitives, &ui.screen);
        }

        release_ui_textures(&mut self.egui_renderer, &ui.textures_delta);

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn apply_ui_textures(
    egui_renderer: &mut egui_wgpu::Renderer,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    delta: &egui::TexturesDelta,
) {
    for (id, image_delta) in &delta.set {
        egui_renderer.update_texture(device, queue, *id, image_delta);
    }
}

fn release_ui_textures(egui_renderer: &mut egui_wgpu::Renderer, delta: &egui::TexturesDelta) {
    for id in &delta.free {
        egui_renderer.free_texture(id);
    }
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("instance_buffer"),
        size: (std::mem::size_of::<InstanceRaw>() * capacity) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_mesh_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("mesh_shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("mesh_pipeline_layout"),
        bind_group_layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("mesh_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[vertex_layout(), InstanceRaw::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // imported models are not guaranteed to be closed or consistently wound
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}
