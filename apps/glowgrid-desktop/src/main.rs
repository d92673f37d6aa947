mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glowgrid_input::{Command, ControlForm, EventTarget, HostEvent, InputTracker, ReconfigureRequest};
use glowgrid_kernel::Controller;
use glowgrid_render::{BloomSettings, RenderBackend, RenderView, submit_frame};
use glowgrid_render_wgpu::WgpuRenderer;
use glowgrid_tools::SceneInspector;
use settings::Settings;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, Touch, TouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "glowgrid-desktop", about = "Interactive glowing cube grid")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON settings file (scene and bloom)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Number of cubes, overrides the settings file
    #[arg(long)]
    count: Option<i64>,

    /// Grid spacing, overrides the settings file
    #[arg(long)]
    spacing: Option<f32>,
}

/// Application state.
struct AppState {
    controller: Controller,
    tracker: InputTracker,
    form: ControlForm,
    bloom: BloomSettings,
    view: RenderView,
    /// Commands produced by host events, applied at the start of the next redraw.
    pending: Vec<Command>,
    /// Last cursor position in physical pixels.
    cursor: (f64, f64),
    /// Area covered by the control panel, in egui points.
    panel_rect: Option<egui::Rect>,
    show_controls: bool,
}

impl AppState {
    fn new(settings: Settings) -> Self {
        let controller = Controller::new(settings.scene);
        let config = controller.config();
        let form = ControlForm::new(
            config.grid.count,
            config.motion.base_rotation,
            config.motion.expansion_factor,
        );
        Self {
            controller,
            tracker: InputTracker::new(1, 1),
            form,
            bloom: settings.bloom,
            view: RenderView::default(),
            pending: Vec::new(),
            cursor: (0.0, 0.0),
            panel_rect: None,
            show_controls: true,
        }
    }

    /// Feed a host event to the tracker and queue the resulting commands.
    /// Returns whether the host's default handling should be suppressed.
    fn handle_host(&mut self, event: HostEvent) -> bool {
        let outcome = self.tracker.handle(event);
        self.pending.extend(outcome.commands);
        outcome.suppress_default
    }

    /// Apply queued commands, then advance the animation one tick.
    fn update<B: RenderBackend>(&mut self, backend: &mut B) {
        let mut reconfigured = false;
        for command in self.pending.drain(..) {
            reconfigured |= matches!(command, Command::Reconfigure(_));
            self.controller.apply(command, backend);
        }
        if reconfigured {
            let config = self.controller.config();
            self.form = ControlForm::new(
                config.grid.count,
                config.motion.base_rotation,
                config.motion.expansion_factor,
            );
        }
        self.controller.tick();
        submit_frame(backend, self.controller.store());
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_controls {
            self.panel_rect = None;
            return;
        }

        let summary = SceneInspector::summary(&self.controller);

        let panel = egui::SidePanel::left("controls")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Glow Grid");
                ui.separator();
                ui.label(format!("Frame: {}", summary.frame));
                ui.label(format!(
                    "Cubes: {} (requested {})",
                    summary.cube_count, summary.requested_count
                ));
                ui.label(format!("Phase: {}  Speed: {:.3}", summary.phase, summary.rotation_speed));
                ui.label(format!("Color: {} (#{})", summary.color, summary.color_index));
                ui.label(format!(
                    "Pointer: ({:.2}, {:.2})",
                    summary.pointer.x, summary.pointer.y
                ));
                ui.separator();

                ui.heading("Grid");
                ui.horizontal(|ui| {
                    ui.label("Cube count");
                    ui.text_edit_singleline(&mut self.form.cube_count);
                });
                ui.horizontal(|ui| {
                    ui.label("Rotation speed");
                    ui.text_edit_singleline(&mut self.form.rotation_speed);
                });
                ui.horizontal(|ui| {
                    ui.label("Expansion factor");
                    ui.text_edit_singleline(&mut self.form.expansion_factor);
                });
                if ui.button("Apply").clicked() {
                    self.pending
                        .push(Command::Reconfigure(self.form.to_request()));
                }

                ui.separator();
                ui.heading("Bloom");
                ui.checkbox(&mut self.bloom.enabled, "Enabled");
                ui.add(egui::Slider::new(&mut self.bloom.threshold, 0.0..=1.0).text("Threshold"));
                ui.add(egui::Slider::new(&mut self.bloom.strength, 0.0..=3.0).text("Strength"));
                ui.add(egui::Slider::new(&mut self.bloom.radius, 0.0..=1.0).text("Radius"));
                ui.add(egui::Slider::new(&mut self.bloom.passes, 1..=5).text("Passes"));

                ui.separator();
                ui.small("F1: Toggle Controls | Click: Color | Hold: Expand");
            });
        self.panel_rect = Some(panel.response.rect);
    }

    /// Whether a physical-pixel position lands on the control panel.
    fn target_at(&self, x: f64, y: f64, pixels_per_point: f32) -> EventTarget {
        let point = egui::pos2(x as f32 / pixels_per_point, y as f32 / pixels_per_point);
        match self.panel_rect {
            Some(rect) if rect.contains(point) => EventTarget::Overlay,
            _ => EventTarget::Surface,
        }
    }
}

/// GPU objects that exist once the window is up.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(settings: Settings) -> Self {
        Self {
            state: AppState::new(settings),
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn init_gpu(&self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let attrs = Window::default_attributes()
            .with_title("Glow Grid")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("find adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("glowgrid_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(
            &device,
            surface_format,
            config.width,
            config.height,
            self.state.bloom,
        );

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Gpu {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    /// Translate a window event into a host event for the input tracker.
    fn host_event(&self, event: &WindowEvent) -> Option<HostEvent> {
        let ppp = self.egui_ctx.pixels_per_point();
        let (cx, cy) = self.state.cursor;
        match event {
            WindowEvent::CursorMoved { position, .. } => Some(HostEvent::PointerMoved {
                x: position.x,
                y: position.y,
            }),
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                let target = if self.egui_ctx.wants_pointer_input() {
                    EventTarget::Overlay
                } else {
                    self.state.target_at(cx, cy, ppp)
                };
                Some(match state {
                    ElementState::Pressed => HostEvent::PointerDown { target },
                    ElementState::Released => HostEvent::PointerUp { target },
                })
            }
            WindowEvent::Touch(Touch {
                phase, location, ..
            }) => Some(match phase {
                TouchPhase::Started => HostEvent::TouchStart {
                    x: location.x,
                    y: location.y,
                    target: self.state.target_at(location.x, location.y, ppp),
                },
                TouchPhase::Moved => HostEvent::TouchMoved {
                    x: location.x,
                    y: location.y,
                },
                TouchPhase::Ended | TouchPhase::Cancelled => HostEvent::TouchEnd,
            }),
            WindowEvent::Resized(size) => Some(HostEvent::Resized {
                width: size.width,
                height: size.height,
            }),
            _ => None,
        }
    }

    fn redraw(&mut self) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        self.state.update(&mut gpu.renderer);
        gpu.renderer.set_bloom(self.state.bloom);

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.renderer
            .render(&gpu.device, &gpu.queue, &view, &self.state.view);

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });

        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        let mut gpu = match self.init_gpu(event_loop) {
            Ok(gpu) => gpu,
            Err(e) => {
                tracing::error!("failed to initialize GPU: {e:#}");
                event_loop.exit();
                return;
            }
        };

        let (width, height) = (gpu.config.width, gpu.config.height);
        self.state.view.set_viewport(width, height);
        self.state.handle_host(HostEvent::Resized { width, height });
        let report = self.state.controller.rebuild(&mut gpu.renderer);
        tracing::info!(created = report.created, skipped = report.skipped, "grid built");

        self.gpu = Some(gpu);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::CursorMoved { position, .. } = &event {
            self.state.cursor = (position.x, position.y);
        }

        let suppress = match self.host_event(&event) {
            Some(host) => self.state.handle_host(host),
            None => false,
        };

        let mut consumed = false;
        if !suppress {
            if let Some(gpu) = &mut self.gpu {
                consumed = gpu.egui_winit.on_window_event(&gpu.window, &event).consumed;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                if let Some(gpu) = &mut self.gpu {
                    self.state.controller.shutdown(&mut gpu.renderer);
                }
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.config.width = new_size.width.max(1);
                    gpu.config.height = new_size.height.max(1);
                    gpu.surface.configure(&gpu.device, &gpu.config);
                    self.state
                        .view
                        .set_viewport(gpu.config.width, gpu.config.height);
                    gpu.renderer.resize(gpu.config.width, gpu.config.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::F1),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } if !consumed => {
                self.state.show_controls = !self.state.show_controls;
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("glowgrid-desktop starting");

    let settings = match &cli.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let settings = settings.with_overrides(&ReconfigureRequest {
        count: cli.count,
        spacing: cli.spacing,
        ..ReconfigureRequest::default()
    });

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(settings);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glowgrid_render::HeadlessBackend;

    fn state() -> (AppState, HeadlessBackend) {
        let mut state = AppState::new(Settings::default());
        let mut backend = HeadlessBackend::new();
        state.handle_host(HostEvent::Resized {
            width: 800,
            height: 600,
        });
        state.controller.rebuild(&mut backend);
        (state, backend)
    }

    #[test]
    fn queued_commands_apply_on_update() {
        let (mut state, mut backend) = state();
        state.handle_host(HostEvent::PointerDown {
            target: EventTarget::Surface,
        });
        assert_eq!(state.pending, vec![Command::Press]);
        state.update(&mut backend);
        assert!(state.pending.is_empty());
        assert!(state.controller.state().is_pressed());
        assert_eq!(state.controller.frame(), 1);
    }

    #[test]
    fn touch_on_surface_is_suppressed() {
        let (mut state, _backend) = state();
        assert!(state.handle_host(HostEvent::TouchStart {
            x: 400.0,
            y: 300.0,
            target: EventTarget::Surface,
        }));
    }

    #[test]
    fn reconfigure_refreshes_form() {
        let (mut state, mut backend) = state();
        state.form.cube_count = "99999".into();
        state
            .pending
            .push(Command::Reconfigure(state.form.to_request()));
        state.update(&mut backend);
        assert_eq!(state.controller.store().len(), 10_000);
        assert_eq!(state.form.cube_count, "10000");
    }

    #[test]
    fn panel_area_is_overlay() {
        let (mut state, _backend) = state();
        state.panel_rect = Some(egui::Rect::from_min_size(
            egui::pos2(0.0, 0.0),
            egui::vec2(100.0, 600.0),
        ));
        assert_eq!(state.target_at(50.0, 10.0, 1.0), EventTarget::Overlay);
        assert_eq!(state.target_at(150.0, 10.0, 1.0), EventTarget::Surface);
        assert_eq!(state.target_at(150.0, 10.0, 2.0), EventTarget::Overlay);
    }
}
