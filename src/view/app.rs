use std::sync::Arc;

use winit::{
    dpi::{LogicalSize, PhysicalSize},
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    window::{CursorGrabMode, Window},
};

use super::gpu_init::GpuContext;
use super::render::{Renderer, UiFrame};
use crate::config::AssetPaths;
use crate::controller::{Demo, DrawList, Flow, FrameClock, FrameInfo, InputEvent, InputProcessor, InputState};
use crate::error::DemoError;
use crate::ui;

/// Pixels of touchpad scroll that count as one wheel notch.
const PIXELS_PER_LINE: f32 = 40.0;

struct App<D: Demo> {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: Renderer,

    egui_ctx: egui::Context,
    egui_state: egui_winit::State,

    demo: D,
    input: InputState,
    processor: InputProcessor,
    clock: FrameClock,
    title: String,
    fatal: Option<DemoError>,
}

impl<D: Demo> App<D> {
    async fn new(window: Arc<Window>, mut demo: D) -> Result<Self, DemoError> {
        let gpu = GpuContext::new(window.clone()).await?;

        let assets = demo.load(&AssetPaths::from_env());
        let clear_color = demo.window().clear_color;
        let renderer = Renderer::new(&gpu, &assets, clear_color);
        let (width, height) = gpu.size();
        demo.resize(width, height);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        let title = demo.window().title.clone();
        Ok(Self {
            window,
            gpu,
            renderer,
            egui_ctx,
            egui_state,
            demo,
            input: InputState::new(),
            processor: InputProcessor::default(),
            clock: FrameClock::new(),
            title,
            fatal: None,
        })
    }

    fn handle_event(&mut self, event: Event<()>, elwt: &ActiveEventLoop) {
        match event {
            Event::WindowEvent { ref event, window_id } if window_id == self.window.id() => {
                self.window_event(event, elwt);
            }
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta },
                ..
            } => {
                self.input.process_event(&InputEvent::MouseMove {
                    dx: delta.0 as f32,
                    dy: delta.1 as f32,
                });
            }
            Event::AboutToWait => {
                self.window.request_redraw();
            }
            _ => {}
        }
    }

    fn window_event(&mut self, event: &WindowEvent, elwt: &ActiveEventLoop) {
        // egui gets first look at every event
        let egui_captured = self.egui_state.on_window_event(self.window.as_ref(), event).consumed;

        match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(size) => self.resize(*size),
            WindowEvent::RedrawRequested => self.frame(elwt),
            WindowEvent::Focused(false) => {
                self.input.process_event(&InputEvent::FocusLost);
                self.set_pointer_lock(false);
            }
            WindowEvent::KeyboardInput {
                event: KeyEvent { state, physical_key: PhysicalKey::Code(code), .. },
                ..
            } => {
                // releases always go through so keys cannot stick
                let event = match state {
                    ElementState::Pressed if egui_captured => return,
                    ElementState::Pressed => InputEvent::KeyDown(*code),
                    ElementState::Released => InputEvent::KeyUp(*code),
                };
                self.input.process_event(&event);
            }
            _ if egui_captured => {}
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                if !self.input.pointer_locked {
                    self.set_pointer_lock(true);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
                };
                self.input.process_event(&InputEvent::MouseWheel { delta_y });
            }
            _ => {}
        }
    }

    fn set_pointer_lock(&mut self, locked: bool) {
        if locked {
            let grabbed = self
                .window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                tracing::warn!(error = %e, "cursor grab unavailable");
                return;
            }
            self.window.set_cursor_visible(false);
        } else {
            let _ = self.window.set_cursor_grab(CursorGrabMode::None);
            self.window.set_cursor_visible(true);
        }
        self.input.process_event(&InputEvent::PointerLockChanged { locked });
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if !self.gpu.resize(size.width, size.height) {
            return;
        }
        self.renderer.resize(&self.gpu.device, size.width, size.height);
        self.demo.resize(size.width, size.height);
        tracing::debug!(depth = ?self.renderer.depth_size(), "surface resized");
    }

    fn frame(&mut self, elwt: &ActiveEventLoop) {
        let dt = self.clock.tick();
        let info = FrameInfo {
            dt,
            time: self.clock.elapsed(),
        };

        if self.processor.wants_quit(&self.input) || self.demo.update(info, &mut self.input) == Flow::Exit {
            tracing::info!("exit requested");
            elwt.exit();
            return;
        }

        if let Some(title) = self.demo.title() {
            if title != self.title {
                self.window.set_title(&title);
                self.title = title;
            }
        }

        let lighting = self.demo.lighting(info);
        let mut list = DrawList::default();
        self.demo.draw(info, &mut list);
        let ui_frame = self.run_ui();
        self.input.end_frame();

        match self
            .renderer
            .render(&self.gpu, self.demo.camera(), &lighting, &list, ui_frame)
        {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::warn!("surface lost, reconfiguring");
                self.gpu.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fatal = Some(DemoError::ContextInit("out of GPU memory".into()));
                elwt.exit();
            }
            Err(e) => tracing::warn!(error = %e, "frame dropped"),
        }
    }

    fn run_ui(&mut self) -> UiFrame {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let hud = self.demo.hud();
        let fps = self.clock.fps();
        let locked = self.input.pointer_locked;
        let output = self
            .egui_ctx
            .run(raw_input, |ctx| ui::build_hud(ctx, &hud, fps, locked));
        self.egui_state
            .handle_platform_output(&self.window, output.platform_output);

        let primitives = self.egui_ctx.tessellate(output.shapes, output.pixels_per_point);
        let (width, height) = self.gpu.size();
        UiFrame {
            primitives,
            textures_delta: output.textures_delta,
            screen: egui_wgpu::ScreenDescriptor {
                size_in_pixels: [width, height],
                pixels_per_point: output.pixels_per_point,
            },
        }
    }
}

/// Opens a window for `demo` and drives it until the window closes or Escape is pressed.
pub fn run<D: Demo>(demo: D) -> Result<(), DemoError> {
    let config = demo.window().clone();
    tracing::info!(title = %config.title, width = config.width, height = config.height, "starting");

    let event_loop = EventLoop::new().map_err(|e| DemoError::ContextInit(format!("event loop: {e}")))?;
    let window_attributes = Window::default_attributes()
        .with_title(config.title.as_str())
        .with_inner_size(LogicalSize::new(config.width, config.height));
    #[allow(deprecated)]
    let window = event_loop
        .create_window(window_attributes)
        .map_err(|e| DemoError::ContextInit(format!("window creation: {e}")))?;

    let mut app = pollster::block_on(App::new(Arc::new(window), demo))?;

    #[allow(deprecated)]
    let result = event_loop.run(|event, elwt| app.handle_event(event, elwt));
    result.map_err(|e| DemoError::ContextInit(format!("event loop: {e}")))?;

    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
