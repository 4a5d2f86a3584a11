// Atrium demo shell: the gallery rendered as INSTANCED lit boxes
// One draw call for the whole layout, egui overlay on top

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use bevy_ecs::world::World;
use glam::{Vec2, Vec3};
use wgpu::util::DeviceExt;
use winit::{
    event::{ElementState, Event as WinitEvent, KeyEvent, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use atrium::engine::collision::CollidableRegistry;
use atrium::engine::debug_overlay::{DebugOverlay, DebugStats, InfoPanel};
use atrium::engine::picking::{self, ClickTracker, HoverChange, HoverTracker};
use atrium::engine::platform::{self, PlatformInput};
use atrium::engine::systems::{self, DrawBox};
use atrium::engine::{AtriumConfig, ExhibitId, ExhibitKind, Exhibition, InputEvent};
use atrium::scene;

// ============================================================================
// VERTEX DEFINITION
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

impl Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

// ============================================================================
// INSTANCE DATA (per-box)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct InstanceData {
    model: [[f32; 4]; 4],
    color: [f32; 4],
}

impl From<&DrawBox> for InstanceData {
    fn from(draw: &DrawBox) -> Self {
        Self {
            model: draw.model.to_cols_array_2d(),
            color: draw.color,
        }
    }
}

impl InstanceData {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
    ];

    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance, // One per instance, not per vertex
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Unit cube centred on the origin, four vertices per face so normals stay flat.
fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    // (normal, u, v) with u x v = normal, so corners below wind CCW seen from outside.
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        let base = vertices.len() as u16;
        for (su, sv) in [(-1.0_f32, -1.0_f32), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = (normal + u * su + v * sv) * 0.5;
            vertices.push(Vertex { position: p.to_array(), normal: normal.to_array() });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    (vertices, indices)
}

// ============================================================================
// UNIFORM DATA
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    light_dir: [f32; 4],
}

const LIGHT_DIR: [f32; 4] = [-0.3, -1.0, -0.5, 0.0];
const MAX_INSTANCES: usize = 1024;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

fn create_depth_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
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

// ============================================================================
// APPLICATION STATE
// ============================================================================

struct State {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    render_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    num_indices: u32,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    depth_view: wgpu::TextureView,
    overlay: DebugOverlay,

    // Scene and core
    world: World,
    exhibition: Exhibition,
    pick_targets: CollidableRegistry,

    // Pointer plumbing
    platform: PlatformInput,
    hover: HoverTracker,
    clicks: ClickTracker,

    started: Instant,
    last_update: Instant,
    frame_time_ms: f32,
    fps: u32,
    box_count: usize,
}

impl State {
    async fn new(window: Arc<Window>, atrium_config: AtriumConfig) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible GPU adapter")?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .context("failed to create device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Box Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader_boxes.wgsl").into()),
        });

        let uniforms = Uniforms {
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
            light_dir: LIGHT_DIR,
        };

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
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
                label: Some("uniform_bind_group_layout"),
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("uniform_bind_group"),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc(), InstanceData::desc()], // Vertex + Instance buffers
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
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
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let (cube_vertices, cube_indices) = cube_mesh();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&cube_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(&cube_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Buffer"),
            size: (MAX_INSTANCES * std::mem::size_of::<InstanceData>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_view = create_depth_view(&device, &config);
        let overlay = DebugOverlay::new(&window, &device, surface_format);

        // Scene: spawn entities, register exhibits, publish the collidable snapshot
        let clicks = ClickTracker::new(atrium_config.exhibits.double_click_window());
        let mut world = World::new();
        let mut exhibition = Exhibition::new(atrium_config);
        let mut pick_targets = CollidableRegistry::default();
        scene::load_gallery(&mut world, &mut exhibition);
        systems::sync_layout(&mut world, &mut exhibition, &mut pick_targets);

        let now = Instant::now();
        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            render_pipeline,
            vertex_buffer,
            index_buffer,
            instance_buffer,
            num_indices: cube_indices.len() as u32,
            uniform_buffer,
            uniform_bind_group,
            depth_view,
            overlay,
            world,
            exhibition,
            pick_targets,
            platform: PlatformInput::default(),
            hover: HoverTracker::default(),
            clicks,
            started: now,
            last_update: now,
            frame_time_ms: 0.0,
            fps: 0,
            box_count: 0,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, &self.config);
        }
    }

    fn viewport(&self) -> Vec2 {
        Vec2::new(self.size.width as f32, self.size.height as f32)
    }

    // ------------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------------

    fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::Focused(false) => self.exhibition.detach(),
            WindowEvent::Focused(true) => self.exhibition.attach(),
            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(id) = self.exhibition.exhibits().zoomed() {
                    self.exhibition.on_wheel(id, platform::wheel_delta_y(delta));
                }
            }
            _ => {}
        }

        let Some(input) = self.platform.translate(event) else {
            return;
        };
        if let InputEvent::PointerDown { .. } = input {
            self.on_click();
        }
        self.exhibition.handle_input(&input);
    }

    fn on_click(&mut self) {
        let target = self.exhibition.exhibits().zoomed().or(self.hover.current());
        let Some(id) = target else {
            return;
        };
        let Some(kind) = self.exhibition.exhibit(id).map(|e| e.kind) else {
            return;
        };
        let now = self.started.elapsed();
        match kind {
            ExhibitKind::Screen => {
                if let Some(playing) = self.exhibition.on_screen_click(id) {
                    log::info!("screen {} playback", if playing { "started" } else { "paused" });
                }
            }
            _ if kind.zoomable() => {
                if self.clicks.click(id, now) {
                    self.exhibition.on_toggle_zoom(id);
                }
            }
            _ => {}
        }
    }

    fn hovered_exhibit(&self) -> Option<ExhibitId> {
        let cursor = self.platform.cursor()?;
        let ray = picking::screen_ray(self.exhibition.viewpoint(), self.viewport(), cursor)?;
        picking::pick_exhibit(&self.pick_targets, &ray, self.exhibition.exhibits())
    }

    fn refresh_hover(&mut self) {
        let hovered = self.hovered_exhibit();
        for change in self.hover.update(hovered) {
            match change {
                HoverChange::Enter(id) => self.exhibition.on_pointer_enter(id),
                HoverChange::Leave(id) => self.exhibition.on_pointer_leave(id),
            }
        }
    }

    // ------------------------------------------------------------------------
    // Frame
    // ------------------------------------------------------------------------

    fn update(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_update).as_secs_f32();
        self.last_update = now;
        self.frame_time_ms = dt * 1000.0;

        systems::sync_layout(&mut self.world, &mut self.exhibition, &mut self.pick_targets);
        self.exhibition.update(dt);
        self.refresh_hover();
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Collect instance data from ECS BEFORE creating render pass
        let instance_data: Vec<InstanceData> =
            systems::collect_draw_boxes(&mut self.world, &self.exhibition)
                .iter()
                .map(InstanceData::from)
                .collect();
        let instance_count = instance_data.len().min(MAX_INSTANCES);
        self.box_count = instance_data.len();

        if !instance_data.is_empty() {
            self.queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&instance_data[..instance_count]),
            );
        }

        let aspect = self.size.width as f32 / self.size.height.max(1) as f32;
        let uniforms = Uniforms {
            view_proj: self.exhibition.viewpoint().view_projection(aspect).to_cols_array_2d(),
            light_dir: LIGHT_DIR,
        };
        self.queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.05,
                            g: 0.05,
                            b: 0.1,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..)); // Instance data
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);

            // ONE DRAW CALL for the whole gallery
            render_pass.draw_indexed(0..self.num_indices, 0, 0..instance_count as u32);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: self.window.scale_factor() as f32,
        };
        let stats = self.overlay.visible.then(|| self.debug_stats());
        let panels = self.info_panels();
        let pad_events = self.overlay.render(
            &self.device,
            &self.queue,
            &mut encoder,
            &self.window,
            &view,
            &screen_descriptor,
            stats.as_ref(),
            &panels,
        );
        for press in pad_events {
            self.exhibition.virtual_keys().send(press);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn debug_stats(&self) -> DebugStats {
        let viewpoint = self.exhibition.viewpoint();
        let zoomed = self
            .exhibition
            .exhibits()
            .zoomed()
            .and_then(|id| self.exhibition.exhibit(id))
            .map(|e| (e.title.clone(), e.magnification));
        DebugStats {
            fps: self.fps,
            frame_time_avg_ms: self.frame_time_ms,
            box_count: self.box_count,
            draw_calls: 1,
            resolution: (self.size.width, self.size.height),
            position: viewpoint.position.into(),
            yaw_deg: viewpoint.orientation.yaw.to_degrees(),
            pitch_deg: viewpoint.orientation.pitch.to_degrees(),
            zoomed,
        }
    }

    fn info_panels(&self) -> Vec<InfoPanel> {
        self.exhibition
            .exhibits()
            .iter()
            .filter(|e| e.panel_visible)
            .map(|e| InfoPanel {
                title: e.title.clone(),
                description: e.description.clone(),
            })
            .collect()
    }
}

// ============================================================================
// MAIN
// ============================================================================

fn load_config() -> AtriumConfig {
    let Some(path) = std::env::var_os("ATRIUM_CONFIG") else {
        return AtriumConfig::default();
    };
    match AtriumConfig::load(&path) {
        Ok(config) => {
            log::info!("loaded config from {}", path.to_string_lossy());
            config
        }
        Err(err) => {
            log::warn!("{err}; using defaults");
            AtriumConfig::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let atrium_config = load_config();
    let event_loop = EventLoop::new().context("failed to create event loop")?;

    let window_attributes = Window::default_attributes()
        .with_title("Atrium - Virtual Exhibition")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

    #[allow(deprecated)]
    let window = Arc::new(
        event_loop
            .create_window(window_attributes)
            .context("failed to create window")?,
    );

    let mut state = pollster::block_on(State::new(window.clone(), atrium_config))?;
    let mut frame_count = 0;
    let mut last_fps_update = Instant::now();

    #[allow(deprecated)]
    event_loop.run(move |event, control_flow| {
        match event {
            WinitEvent::WindowEvent {
                ref event,
                window_id,
            } if window_id == window.id() => {
                let egui_response = state.overlay.handle_window_event(&window, event);

                match event {
                    WindowEvent::CloseRequested
                    | WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                state: ElementState::Pressed,
                                physical_key: PhysicalKey::Code(KeyCode::Escape),
                                ..
                            },
                        ..
                    } => control_flow.exit(),
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                state: ElementState::Pressed,
                                physical_key: PhysicalKey::Code(KeyCode::F3),
                                repeat: false,
                                ..
                            },
                        ..
                    } => state.overlay.toggle(),
                    WindowEvent::Resized(physical_size) => {
                        state.resize(*physical_size);
                    }
                    WindowEvent::RedrawRequested => {
                        state.update();
                        match state.render() {
                            Ok(_) => {}
                            Err(wgpu::SurfaceError::Lost) => state.resize(state.size),
                            Err(wgpu::SurfaceError::OutOfMemory) => control_flow.exit(),
                            Err(e) => log::warn!("{e:?}"),
                        }

                        frame_count += 1;
                        let now = Instant::now();
                        if now - last_fps_update >= Duration::from_secs(1) {
                            state.fps = frame_count;
                            log::info!(
                                "FPS: {} | Boxes: {} | Draw calls: 1",
                                frame_count, state.box_count
                            );
                            frame_count = 0;
                            last_fps_update = now;
                        }
                    }
                    _ if !egui_response.consumed => state.handle_window_event(event),
                    _ => {}
                }
            }
            WinitEvent::AboutToWait => {
                window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}
