use glam::Vec3;
use wgpu::*;

use super::target::ViewTarget;
use crate::model::{Camera, MeshBuffer, Scene, Vertex};

/// Uniform stride per object; padded to the conservative dynamic-offset
/// alignment.
pub const OBJECT_UNIFORM_STRIDE: u64 = 256;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub sky_color: [f32; 3],
    pub hemisphere_intensity: f32,
    pub ground_color: [f32; 3],
    pub sun_intensity: f32,
    pub sun_direction: [f32; 3],
    pub _pad0: f32,
    pub sun_color: [f32; 3],
    pub _pad1: f32,
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// x > 0.5 selects the shaded path in the fragment shader.
    pub params: [f32; 4],
}

/// Host-owned light settings, edited live from the UI panel and packed
/// into `LightingUniform` once per frame.
pub struct LightRig {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub sky_color: [f32; 3],
    pub ground_color: [f32; 3],
    pub hemisphere_intensity: f32,
    pub sun_color: [f32; 3],
    pub sun_intensity: f32,
    pub sun_position: Vec3,
    pub sun_target: Vec3,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 1.0,
            sky_color: [0.694, 0.882, 1.0],
            ground_color: [0.725, 0.478, 0.125],
            hemisphere_intensity: 2.0,
            sun_color: [1.0, 1.0, 1.0],
            sun_intensity: 2.5,
            sun_position: Vec3::new(0.0, 10.0, 0.0),
            sun_target: Vec3::new(-5.0, 0.0, 0.0),
        }
    }
}

impl LightRig {
    pub fn to_uniform(&self) -> LightingUniform {
        // direction from any surface toward the (infinitely far) light
        let dir = (self.sun_position - self.sun_target)
            .try_normalize()
            .unwrap_or(Vec3::Y);
        LightingUniform {
            ambient_color: self.ambient_color,
            ambient_intensity: self.ambient_intensity,
            sky_color: self.sky_color,
            hemisphere_intensity: self.hemisphere_intensity,
            ground_color: self.ground_color,
            sun_intensity: self.sun_intensity,
            sun_direction: dir.to_array(),
            _pad0: 0.0,
            sun_color: self.sun_color,
            _pad1: 0.0,
        }
    }
}

pub struct CameraResources {
    pub camera_buffer: wgpu::Buffer,
    pub lighting_buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub camera_bind_group: wgpu::BindGroup,
}

pub fn create_camera_resources(device: &wgpu::Device) -> CameraResources {
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

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("camera_bind_group_layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
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

    let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("camera_bind_group"),
        layout: &bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: lighting_buffer.as_entire_binding(),
            },
        ],
    });

    CameraResources {
        camera_buffer,
        lighting_buffer,
        bind_group_layout,
        camera_bind_group,
    }
}

/// Per-object uniform storage, sized for the node count and indexed with
/// dynamic offsets. Grows when the scene gains nodes (model attach).
pub struct ObjectResources {
    pub buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
    capacity: usize,
}

impl ObjectResources {
    pub fn new(device: &wgpu::Device, capacity: usize) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let (buffer, bind_group) = Self::create_storage(device, &bind_group_layout, capacity);
        Self {
            buffer,
            bind_group_layout,
            bind_group,
            capacity,
        }
    }

    fn create_storage(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("object_buffer"),
            size: OBJECT_UNIFORM_STRIDE * capacity.max(1) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("object_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniform>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    pub fn ensure_capacity(&mut self, device: &wgpu::Device, count: usize) {
        if count <= self.capacity {
            return;
        }
        let capacity = count.next_power_of_two();
        let (buffer, bind_group) = Self::create_storage(device, &self.bind_group_layout, capacity);
        self.buffer = buffer;
        self.bind_group = bind_group;
        self.capacity = capacity;
    }
}

pub fn create_scene_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    camera_layout: &wgpu::BindGroupLayout,
    object_layout: &wgpu::BindGroupLayout,
    depth_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader_src = include_str!("../shaders/scene.wgsl");
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("scene_shader"),
        source: wgpu::ShaderSource::Wgsl(shader_src.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("pipeline_layout"),
        bind_group_layouts: &[camera_layout, object_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("scene_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[
                    wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                    wgpu::VertexAttribute {
                        offset: 12,
                        shader_location: 1,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                    wgpu::VertexAttribute {
                        offset: 24,
                        shader_location: 2,
                        format: wgpu::VertexFormat::Float32x4,
                    },
                    wgpu::VertexAttribute {
                        offset: 40,
                        shader_location: 3,
                        format: wgpu::VertexFormat::Float32x2,
                    },
                ],
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // the ground plane is double-sided
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: depth_format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}

/// Consolidated render state: pipeline, uploaded meshes, and the egui
/// overlay plumbing.
pub struct RenderState {
    pub pipeline: RenderPipeline,
    pub meshes: Vec<MeshBuffer>,

    pub egui_renderer: egui_wgpu::Renderer,
    pub egui_primitives: Option<Vec<egui::ClippedPrimitive>>,
    pub egui_textures_delta: Option<egui::TexturesDelta>,
    pub egui_dpr: f32,
}

impl RenderState {
    /// Register an uploaded mesh and return its handle for scene nodes.
    pub fn add_mesh(&mut self, mesh: MeshBuffer) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    pub fn draw_frame(
        &mut self,
        target: &ViewTarget,
        scene: &Scene,
        camera: &Camera,
        rig: &LightRig,
        camera_res: &CameraResources,
        objects: &mut ObjectResources,
    ) -> Result<(), SurfaceError> {
        let device = target.device.as_ref();
        let queue = target.queue.as_ref();

        // camera + lighting uniforms
        let cam_uniform = CameraUniform {
            view_proj: camera.view_proj().to_cols_array_2d(),
        };
        queue.write_buffer(&camera_res.camera_buffer, 0, bytemuck::bytes_of(&cam_uniform));
        queue.write_buffer(
            &camera_res.lighting_buffer,
            0,
            bytemuck::bytes_of(&rig.to_uniform()),
        );

        // per-object uniforms, one stride-aligned slot per node
        objects.ensure_capacity(device, scene.nodes.len());
        if !scene.nodes.is_empty() {
            let mut staging = vec![0u8; scene.nodes.len() * OBJECT_UNIFORM_STRIDE as usize];
            for (i, node) in scene.nodes.iter().enumerate() {
                let uniform = ObjectUniform {
                    model: node.transform.matrix().to_cols_array_2d(),
                    color: node.material.color,
                    params: [if node.material.shaded { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
                };
                let offset = i * OBJECT_UNIFORM_STRIDE as usize;
                let bytes = bytemuck::bytes_of(&uniform);
                staging[offset..offset + bytes.len()].copy_from_slice(bytes);
            }
            queue.write_buffer(&objects.buffer, 0, &staging);
        }

        let frame = target.surface.get_current_texture()?;
        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("encoder"),
        });

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color {
                            r: 0.5,
                            g: 0.8,
                            b: 1.0,
                            a: 1.0,
                        }),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &target.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, &camera_res.camera_bind_group, &[]);

            for (i, node) in scene.nodes.iter().enumerate() {
                let Some(mesh) = self.meshes.get(node.mesh) else {
                    continue;
                };
                if mesh.index_count == 0 {
                    continue;
                }
                let offset = (i as u64 * OBJECT_UNIFORM_STRIDE) as u32;
                rp.set_bind_group(1, &objects.bind_group, &[offset]);
                rp.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                rp.set_index_buffer(mesh.index_buffer.slice(..), IndexFormat::Uint32);
                rp.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        // egui overlay
        if let (Some(primitives), Some(textures_delta)) =
            (self.egui_primitives.take(), self.egui_textures_delta.take())
        {
            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [target.config.width, target.config.height],
                pixels_per_point: self.egui_dpr,
            };

            for (id, image_delta) in &textures_delta.set {
                self.egui_renderer
                    .update_texture(device, queue, *id, image_delta);
            }
            self.egui_renderer.update_buffers(
                device,
                queue,
                &mut encoder,
                &primitives,
                &screen_descriptor,
            );

            {
                let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                    label: Some("egui_render_pass"),
                    color_attachments: &[Some(RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: Operations {
                            load: LoadOp::Load,
                            store: StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });

                self.egui_renderer.render(
                    &mut egui_pass.forget_lifetime(),
                    &primitives,
                    &screen_descriptor,
                );
            }

            for id in &textures_delta.free {
                self.egui_renderer.free_texture(id);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_rig_direction_is_normalized() {
        let rig = LightRig::default();
        let uniform = rig.to_uniform();
        let d = uniform.sun_direction;
        let len = (d[0].powi(2) + d[1].powi(2) + d[2].powi(2)).sqrt();
        assert!((len - 1.0).abs() < 1e-5);
        assert!(d[1] > 0.0, "default sun shines from above");
    }

    #[test]
    fn test_light_rig_coincident_target_defaults_up() {
        let rig = LightRig {
            sun_target: LightRig::default().sun_position,
            sun_position: LightRig::default().sun_position,
            ..LightRig::default()
        };
        assert_eq!(rig.to_uniform().sun_direction, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_object_uniform_fits_stride() {
        assert!(std::mem::size_of::<ObjectUniform>() as u64 <= OBJECT_UNIFORM_STRIDE);
    }
}
