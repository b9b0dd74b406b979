use std::mem;
use std::sync::Arc;

use glam::{EulerRot, Mat4};
use log::{debug, info, warn};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::error::{DrawError, MountError, SetupError};
use crate::factory::GeometryKind;
use crate::math::hsl_to_rgb;
use crate::mesh::{Mesh, Vertex};
use crate::scene::SceneGraph;
use crate::surface::{DrawTarget, SurfaceBinder};
use crate::viewport::Viewport;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Saturation/lightness band shared by every generated material.
const MATERIAL_SATURATION: f32 = 0.7;
const MATERIAL_LIGHTNESS: f32 = 0.6;

/// Scene-wide uniform data for one frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct SceneUniform {
    view_proj: [[f32; 4]; 4],
    /// rgb + intensity in w.
    ambient: [f32; 4],
    /// Direction from surfaces toward the light, w unused.
    light_dir: [f32; 4],
    /// rgb + intensity in w.
    light_color: [f32; 4],
}

impl SceneUniform {
    fn from_scene(scene: &SceneGraph) -> Self {
        let light_dir = scene.directional.position.normalize_or_zero();
        Self {
            view_proj: scene.camera.view_projection().to_cols_array_2d(),
            ambient: [
                scene.ambient.color[0],
                scene.ambient.color[1],
                scene.ambient.color[2],
                scene.ambient.intensity,
            ],
            light_dir: [light_dir.x, light_dir.y, light_dir.z, 0.0],
            light_color: [
                scene.directional.color[0],
                scene.directional.color[1],
                scene.directional.color[2],
                scene.directional.intensity,
            ],
        }
    }
}

/// Per-object instance data: model matrix plus material color.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct InstanceRaw {
    model: [[f32; 4]; 4],
    color: [f32; 4],
}

impl InstanceRaw {
    const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

/// Index/vertex ranges of one catalog mesh inside the shared buffers.
#[derive(Debug, Clone, Copy)]
struct MeshRange {
    start_index: u32,
    index_count: u32,
    base_vertex: i32,
}

struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    instance_buffer: Option<wgpu::Buffer>,
    instance_capacity: usize,
    ranges: [MeshRange; 4],
}

/// wgpu-backed drawing surface bound to a window mount point.
///
/// Releasing drops every GPU resource; the struct stays behind as an inert
/// handle so a second release (or a release racing window teardown) is a
/// no-op.
pub struct WindowSurface {
    gpu: Option<GpuState>,
}

/// Binds a [`WindowSurface`] into a winit window.
///
/// The window is the mount point: `bind` fails with [`MountError::Missing`]
/// until the host has created one.
#[derive(Default)]
pub struct WindowBinder {
    window: Option<Arc<Window>>,
}

impl WindowBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the mount point once the host window exists.
    pub fn set_window(&mut self, window: Arc<Window>) {
        self.window = Some(window);
    }

    /// Drop the mount point, e.g. when the host window is destroyed.
    pub fn clear_window(&mut self) {
        self.window = None;
    }
}

impl SurfaceBinder for WindowBinder {
    fn bind(&mut self, viewport: Viewport) -> Result<Box<dyn DrawTarget>, SetupError> {
        let window = self
            .window
            .as_ref()
            .ok_or(MountError::Missing)?
            .clone();

        let gpu = pollster::block_on(GpuState::new(window, viewport))?;
        Ok(Box::new(WindowSurface { gpu: Some(gpu) }))
    }
}

impl GpuState {
    async fn new(window: Arc<Window>, viewport: Viewport) -> Result<Self, SetupError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| SetupError::SurfaceCreation(format!("create_surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| SetupError::SurfaceCreation(format!("no adapter: {e:?}")))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("backdrop device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| SetupError::SurfaceCreation(format!("no device: {e}")))?;

        let config = Self::surface_config(&surface, &adapter, viewport);
        surface.configure(&device, &config);

        let depth_view = Self::create_depth_view(&device, config.width, config.height);

        let (vertex_buffer, index_buffer, ranges) = Self::upload_catalog(&device);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene uniform"),
            size: mem::size_of::<SceneUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let (pipeline, bind_group) =
            Self::create_pipeline(&device, &uniform_buffer, config.format);

        info!(
            "surface bound: {}x{}, format {:?}, alpha {:?}",
            config.width, config.height, config.format, config.alpha_mode
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            pipeline,
            bind_group,
            uniform_buffer,
            vertex_buffer,
            index_buffer,
            instance_buffer: None,
            instance_capacity: 0,
            ranges,
        })
    }

    fn surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        viewport: Viewport,
    ) -> wgpu::SurfaceConfiguration {
        let caps = surface.get_capabilities(adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(caps.formats[0]);

        // The backdrop composites under the page content, so prefer an
        // alpha mode that keeps transparency; opaque surfaces still render,
        // just without the see-through effect.
        let alpha_mode = [
            wgpu::CompositeAlphaMode::PreMultiplied,
            wgpu::CompositeAlphaMode::PostMultiplied,
        ]
        .into_iter()
        .find(|mode| caps.alpha_modes.contains(mode))
        .unwrap_or_else(|| {
            warn!("surface has no transparent alpha mode, falling back to {:?}", caps.alpha_modes[0]);
            caps.alpha_modes[0]
        });

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: viewport.width,
            height: viewport.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("backdrop depth"),
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

    /// Upload the four catalog meshes into one shared vertex/index buffer
    /// pair, remembering the range of each kind.
    fn upload_catalog(device: &wgpu::Device) -> (wgpu::Buffer, wgpu::Buffer, [MeshRange; 4]) {
        let mut vertices: Vec<Vertex> = Vec::new();
        let mut indices: Vec<u16> = Vec::new();
        let mut ranges = [MeshRange {
            start_index: 0,
            index_count: 0,
            base_vertex: 0,
        }; 4];

        for (slot, kind) in GeometryKind::ALL.into_iter().enumerate() {
            let mesh = Mesh::for_kind(kind);
            ranges[slot] = MeshRange {
                start_index: indices.len() as u32,
                index_count: mesh.indices.len() as u32,
                base_vertex: vertices.len() as i32,
            };
            vertices.extend_from_slice(&mesh.vertices);
            indices.extend_from_slice(&mesh.indices);
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("catalog vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("catalog indices"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        (vertex_buffer, index_buffer, ranges)
    }

    fn create_pipeline(
        device: &wgpu::Device,
        uniform_buffer: &wgpu::Buffer,
        surface_format: wgpu::TextureFormat,
    ) -> (wgpu::RenderPipeline, wgpu::BindGroup) {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("backdrop shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("backdrop.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene bind group layout"),
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
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("backdrop pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("backdrop pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout(), InstanceRaw::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        (pipeline, bind_group)
    }

    /// Instance data grouped by kind, plus per-kind start offsets.
    fn build_instances(scene: &SceneGraph) -> (Vec<InstanceRaw>, [u32; 4]) {
        let mut instances = Vec::with_capacity(scene.len());
        let mut starts = [0u32; 4];

        for (slot, kind) in GeometryKind::ALL.into_iter().enumerate() {
            starts[slot] = instances.len() as u32;
            for object in scene.objects().iter().filter(|o| o.kind == kind) {
                let model = Mat4::from_translation(object.position)
                    * Mat4::from_euler(
                        EulerRot::XYZ,
                        object.rotation.x,
                        object.rotation.y,
                        object.rotation.z,
                    );
                let [r, g, b] =
                    hsl_to_rgb(object.hue, MATERIAL_SATURATION, MATERIAL_LIGHTNESS);
                instances.push(InstanceRaw {
                    model: model.to_cols_array_2d(),
                    color: [r, g, b, object.opacity],
                });
            }
        }

        (instances, starts)
    }

    fn draw(&mut self, scene: &SceneGraph) -> Result<(), DrawError> {
        self.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[SceneUniform::from_scene(scene)]),
        );

        let (instances, starts) = Self::build_instances(scene);
        if !instances.is_empty() {
            if self.instance_capacity < instances.len() {
                self.instance_buffer = Some(self.device.create_buffer_init(
                    &wgpu::util::BufferInitDescriptor {
                        label: Some("object instances"),
                        contents: bytemuck::cast_slice(&instances),
                        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    },
                ));
                self.instance_capacity = instances.len();
            } else if let Some(buffer) = &self.instance_buffer {
                self.queue
                    .write_buffer(buffer, 0, bytemuck::cast_slice(&instances));
            }
        }

        let frame = self.surface.get_current_texture().map_err(|e| match e {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => DrawError::SurfaceLost,
            wgpu::SurfaceError::OutOfMemory => DrawError::OutOfMemory,
            other => DrawError::Other(other.to_string()),
        })?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("backdrop encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("backdrop pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        // Transparent clear: the page shows through between
                        // the floating objects.
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
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

            if let Some(instance_buffer) = &self.instance_buffer {
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &self.bind_group, &[]);
                pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, instance_buffer.slice(..));
                pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);

                for (slot, range) in self.ranges.iter().enumerate() {
                    let end = if slot + 1 < starts.len() {
                        starts[slot + 1]
                    } else {
                        instances.len() as u32
                    };
                    if end > starts[slot] {
                        pass.draw_indexed(
                            range.start_index..range.start_index + range.index_count,
                            range.base_vertex,
                            starts[slot]..end,
                        );
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) {
        if viewport.is_zero() {
            return;
        }
        self.config.width = viewport.width;
        self.config.height = viewport.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = Self::create_depth_view(&self.device, viewport.width, viewport.height);
    }
}

impl DrawTarget for WindowSurface {
    fn draw(&mut self, scene: &SceneGraph) -> Result<(), DrawError> {
        match self.gpu.as_mut() {
            Some(gpu) => gpu.draw(scene),
            None => Err(DrawError::Other("surface already released".into())),
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize(viewport);
        }
    }

    fn release(&mut self) {
        if self.gpu.take().is_some() {
            debug!("surface released");
        }
    }

    fn dimensions(&self) -> (u32, u32) {
        self.gpu
            .as_ref()
            .map_or((0, 0), |gpu| (gpu.config.width, gpu.config.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Creating a real surface needs a window and a GPU; integration with
    // the lifecycle is covered by the mock target in tests/. These checks
    // pin the GPU-facing byte layouts.

    #[test]
    fn instance_layout_matches_struct_size() {
        assert_eq!(mem::size_of::<InstanceRaw>(), 80);
        let attrs_end = InstanceRaw::ATTRS.last().unwrap();
        assert!(attrs_end.offset + 16 <= mem::size_of::<InstanceRaw>() as u64);
    }

    #[test]
    fn scene_uniform_is_pod_sized() {
        assert_eq!(mem::size_of::<SceneUniform>(), 64 + 3 * 16);
    }

    #[test]
    fn binder_without_window_reports_missing_mount_point() {
        let mut binder = WindowBinder::new();
        let err = match binder.bind(Viewport::new(640, 480)) {
            Ok(_) => panic!("expected bind to fail without a mount point"),
            Err(err) => err,
        };
        assert!(matches!(err, SetupError::Mount(MountError::Missing)));
    }

    #[test]
    fn build_instances_groups_by_kind() {
        use crate::camera::Camera;
        use crate::factory;
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut scene = SceneGraph::new(Camera::new(1.0));
        let mut rng = StdRng::seed_from_u64(9);
        for object in factory::generate_with(&mut rng, 32) {
            scene.add(object);
        }

        let (instances, starts) = GpuState::build_instances(&scene);
        assert_eq!(instances.len(), 32);
        // Offsets are monotonically non-decreasing and partition the set.
        assert_eq!(starts[0], 0);
        for window in starts.windows(2) {
            assert!(window[0] <= window[1]);
        }

        for instance in &instances {
            assert_eq!(instance.color[3], crate::factory::OBJECT_OPACITY);
        }
    }
}
