use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use glam::Vec3;
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::PhysicalKey,
    window::Window,
};

// Import from the library crate
use meadow::{
    assets::{LoadEvent, ModelLoader},
    controller::{frame_to_fit, input::key_name, CancelToken, FrameLoop, InputState},
    logging,
    model::{geometry, Camera, Material, Mesh, Node, Scene, Transform},
    ui,
    view::{render, CameraResources, GpuContext, LightRig, ObjectResources, RenderState, ViewTarget},
};

const PLANE_SIZE: f32 = 100.0;
const PRIMITIVE_COUNT: usize = 20;
const DEFAULT_MODEL_PATH: &str = "assets/model.glb";

const GROUND_COLOR: [f32; 4] = [0.35, 0.55, 0.25, 1.0];
const CUBE_COLOR: [f32; 4] = [0.65, 0.45, 0.35, 1.0];

/// Where the loaded model sits, lifted so its feet clear the ground plane.
const MODEL_OFFSET: Vec3 = Vec3::new(0.0, 0.25, 0.0);

struct App {
    view_target: ViewTarget,
    render_state: RenderState,
    camera_resources: CameraResources,
    object_resources: ObjectResources,

    scene: Scene,
    camera: Camera,
    light_rig: LightRig,

    input_state: InputState,
    frame_loop: FrameLoop,
    cancel: CancelToken,

    loader: Option<ModelLoader>,
    model_status: String,

    egui_ctx: egui::Context,
    egui_state: egui_winit::State,

    started_at: Instant,
}

impl App {
    async fn new(window: Arc<Window>, model_path: PathBuf) -> Self {
        let size = window.inner_size();
        let gpu = GpuContext::new(window.clone(), size.width.max(1), size.height.max(1)).await;

        let camera_resources = render::create_camera_resources(&gpu.device);
        let object_resources = ObjectResources::new(&gpu.device, 32);
        let pipeline = render::create_scene_pipeline(
            &gpu.device,
            gpu.format,
            &camera_resources.bind_group_layout,
            &object_resources.bind_group_layout,
            wgpu::TextureFormat::Depth32Float,
        );

        // Initialize egui
        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.format,
            egui_wgpu::RendererOptions::default(),
        );

        let mut render_state = RenderState {
            pipeline,
            meshes: Vec::new(),
            egui_renderer,
            egui_primitives: None,
            egui_textures_delta: None,
            egui_dpr: 1.0,
        };

        let view_target = ViewTarget::new(window, gpu);
        let scene = build_scene(&mut render_state, &view_target.device);
        let camera = Camera::new(size.width, size.height);

        let cancel = CancelToken::new();
        let frame_loop = FrameLoop::new(cancel.clone());

        tracing::info!(path = %model_path.display(), "loading model");
        let loader = Some(ModelLoader::spawn(model_path));

        Self {
            view_target,
            render_state,
            camera_resources,
            object_resources,
            scene,
            camera,
            light_rig: LightRig::default(),
            input_state: InputState::new(),
            frame_loop,
            cancel,
            loader,
            model_status: "loading".to_string(),
            egui_ctx,
            egui_state,
            started_at: Instant::now(),
        }
    }

    /// Feed window events to egui first, then to the input state.
    fn input(&mut self, event: &WindowEvent) -> bool {
        let consumed = self
            .egui_state
            .on_window_event(&self.view_target.window, event)
            .consumed;
        if consumed {
            return true;
        }

        match event {
            WindowEvent::KeyboardInput {
                event: KeyEvent { state, physical_key, .. },
                ..
            } => {
                if let PhysicalKey::Code(code) = physical_key {
                    self.input_state
                        .set_key(&key_name(*code), *state == ElementState::Pressed);
                }
                true
            }
            WindowEvent::Focused(false) => {
                self.input_state.clear();
                true
            }
            _ => false,
        }
    }

    /// Drain loader events; on success the model joins the scene as
    /// ordinary nodes, on failure the scene simply goes on without it.
    fn poll_loader(&mut self) {
        let Some(loader) = &self.loader else {
            return;
        };
        let mut finished = false;
        for event in loader.poll() {
            match event {
                LoadEvent::Progress(ratio) => {
                    tracing::debug!("model load {:.0}%", ratio * 100.0);
                }
                LoadEvent::Loaded(meshes) => {
                    let device = self.view_target.device.clone();
                    let count = meshes.len();
                    for mesh in &meshes {
                        let id = self.render_state.add_mesh(mesh.upload(&device));
                        self.scene.add_node(Node {
                            mesh: id,
                            transform: Transform::from_translation(MODEL_OFFSET),
                            material: Material::shaded([1.0; 4]),
                        });
                    }
                    // pull the camera back so the whole model is in view
                    if let Some((min, max)) = mesh_bounds(&meshes) {
                        let size = (max - min).length();
                        let center = (min + max) * 0.5 + MODEL_OFFSET;
                        frame_to_fit(&mut self.camera, size * 0.5, size, center);
                    }
                    tracing::info!("model attached ({count} meshes)");
                    self.model_status = "attached".to_string();
                    finished = true;
                }
                LoadEvent::Failed(reason) => {
                    tracing::error!("model load failed: {reason}");
                    self.model_status = "failed".to_string();
                    finished = true;
                }
            }
        }
        if finished {
            self.loader = None;
        }
    }

    fn redraw(&mut self) -> Result<(), wgpu::SurfaceError> {
        let timestamp_ms = self.started_at.elapsed().as_secs_f64() * 1000.0;
        self.poll_loader();

        // Build the UI before the frame so its primitives ride along
        let raw_input = self.egui_state.take_egui_input(&self.view_target.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            ui::draw_light_window(ctx, &mut self.light_rig);
            ui::draw_debug_window(ctx, &self.camera, &self.model_status);
        });
        self.egui_state
            .handle_platform_output(&self.view_target.window, full_output.platform_output);
        let dpr = self.view_target.window.scale_factor() as f32;
        let primitives = self.egui_ctx.tessellate(full_output.shapes, dpr);
        self.render_state.egui_primitives = Some(primitives);
        self.render_state.egui_textures_delta = Some(full_output.textures_delta);
        self.render_state.egui_dpr = dpr;

        let App {
            frame_loop,
            view_target,
            camera,
            scene,
            input_state,
            render_state,
            camera_resources,
            object_resources,
            light_rig,
            ..
        } = self;

        let mut result = Ok(());
        frame_loop.tick(
            timestamp_ms,
            view_target,
            camera,
            scene,
            input_state,
            |target, scene, camera| {
                result = render_state.draw_frame(
                    target,
                    scene,
                    camera,
                    light_rig,
                    camera_resources,
                    object_resources,
                );
            },
        );
        result
    }
}

/// Combined axis-aligned bounds over a mesh set, None without vertices.
fn mesh_bounds(meshes: &[Mesh]) -> Option<(Vec3, Vec3)> {
    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    let mut any = false;
    for mesh in meshes {
        for vertex in &mesh.vertices {
            let p = Vec3::from_array(vertex.pos);
            min = min.min(p);
            max = max.max(p);
            any = true;
        }
    }
    any.then_some((min, max))
}

/// Fixed scene content: the ground plane plus twenty scattered spinning
/// primitives, cycling cube / sphere / cylinder.
fn build_scene(render_state: &mut RenderState, device: &wgpu::Device) -> Scene {
    let mut scene = Scene::new();

    let plane = render_state.add_mesh(geometry::plane(PLANE_SIZE, GROUND_COLOR).upload(device));
    scene.add_node(Node {
        mesh: plane,
        transform: Transform::from_translation(Vec3::ZERO),
        material: Material::shaded([1.0; 4]),
    });

    let cube = render_state.add_mesh(geometry::cuboid(0.5, [1.0; 4]).upload(device));
    let sphere = render_state.add_mesh(geometry::uv_sphere(0.5, 16, 24, [1.0; 4]).upload(device));
    let cylinder = render_state.add_mesh(geometry::cylinder(0.5, 1.0, 16, [1.0; 4]).upload(device));

    for i in 0..PRIMITIVE_COUNT {
        let (mesh, material) = match i % 3 {
            0 => (cube, Material::unlit(CUBE_COLOR)),
            1 => (sphere, Material::unlit([1.0; 4])),
            _ => (cylinder, Material::shaded([1.0; 4])),
        };
        let (x, z) = geometry::scatter_offset(i);
        scene.add_spinner(Node {
            mesh,
            transform: Transform::from_translation(Vec3::new(x, 0.25, z)),
            material,
        });
    }

    scene
}

fn main() {
    logging::init();

    let model_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));

    let event_loop = EventLoop::new().unwrap();
    let window_attributes = Window::default_attributes()
        .with_title("meadow")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    let window = event_loop.create_window(window_attributes).unwrap();
    let window = Arc::new(window);

    let mut app = pollster::block_on(App::new(window, model_path));
    app.frame_loop.start();
    let cancel = app.cancel.clone();

    event_loop
        .run(move |event, elwt| {
            match event {
                Event::WindowEvent {
                    ref event,
                    window_id,
                } if window_id == app.view_target.window.id() => {
                    if !app.input(event) {
                        match event {
                            WindowEvent::CloseRequested => {
                                cancel.cancel();
                                elwt.exit();
                            }
                            WindowEvent::RedrawRequested => match app.redraw() {
                                Ok(()) => {}
                                Err(wgpu::SurfaceError::Lost) => app.view_target.reconfigure(),
                                Err(wgpu::SurfaceError::OutOfMemory) => {
                                    cancel.cancel();
                                    elwt.exit();
                                }
                                Err(e) => tracing::warn!("surface error: {e:?}"),
                            },
                            _ => {}
                        }
                    }
                }
                Event::AboutToWait => {
                    // reschedule only while the loop wants to keep going
                    if app.frame_loop.should_continue() {
                        app.view_target.window.request_redraw();
                    }
                }
                _ => {}
            }
        })
        .unwrap();
}
