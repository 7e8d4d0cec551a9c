//! Viewer application and frame loop
//!
//! [`HeistApp`] owns the [`ViewerState`] for the whole run: it loads it before
//! the event loop starts, lends it to the input mapper, the frame snapshot and
//! the overlay every frame, and saves it once when the loop exits.

use std::{sync::Arc, time::Instant};

use log::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{CursorGrabMode, Window, WindowAttributes, WindowId},
};

use crate::{
    config::ViewerConfig,
    error::{Result, ViewerError},
    frame::FrameSnapshot,
    gfx::{rendering::RenderEngine, scene::Scene},
    input::{CursorMode, InputMapper, WinitInput},
    state::{persistence, LoadOutcome, ViewerState},
    ui::{viewer_panel, UiManager},
};

type UiCallback = fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView);

pub struct HeistApp {
    event_loop: EventLoop<()>,
    app_state: AppState,
}

struct AppState {
    config: ViewerConfig,
    state: ViewerState,
    input: WinitInput,
    mapper: InputMapper,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    scene: Option<Scene>,
    ui_manager: Option<UiManager>,
    focused: bool,
    started: Instant,
    last_frame: Instant,
    startup_error: Option<ViewerError>,
}

impl HeistApp {
    /// Creates a viewer with the default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ViewerConfig::default())
    }

    /// Creates a viewer and restores the state saved by a previous run
    pub fn with_config(config: ViewerConfig) -> Result<Self> {
        let event_loop = EventLoop::new()?;

        let mut state = ViewerState::new(&config);
        if let LoadOutcome::NotFound = persistence::load_into(&config.state_path, &mut state) {
            info!("Starting with default viewer state");
        }

        let now = Instant::now();
        Ok(Self {
            event_loop,
            app_state: AppState {
                config,
                state,
                input: WinitInput::new(),
                mapper: InputMapper::new(),
                window: None,
                render_engine: None,
                scene: None,
                ui_manager: None,
                focused: true,
                started: now,
                last_frame: now,
                startup_error: None,
            },
        })
    }

    /// Runs the frame loop until the window closes.
    ///
    /// # Errors
    /// Returns the error that prevented the window, GPU or scene from coming
    /// up. Nothing is saved in that case.
    pub fn run(self) -> Result<()> {
        let HeistApp {
            event_loop,
            mut app_state,
        } = self;

        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut app_state)?;

        match app_state.startup_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = WindowAttributes::default()
            .with_title(self.config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window_width,
                self.config.window_height,
            ));
        let window = Arc::new(event_loop.create_window(attributes)?);

        let (width, height) = window.inner_size().into();
        let renderer = pollster::block_on(RenderEngine::new(window.clone(), width, height))?;

        let scene = Scene::load(
            renderer.device(),
            renderer.queue(),
            &self.config,
            renderer.object_bindings(),
            renderer.material_bindings(),
        )?;

        let ui_manager = UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            &window,
        );

        apply_cursor_mode(&window, CursorMode::for_overlay(self.state.overlay_enabled));
        info!("Window created ({}x{})", width, height);

        self.window = Some(window);
        self.render_engine = Some(renderer);
        self.scene = Some(scene);
        self.ui_manager = Some(ui_manager);

        let now = Instant::now();
        self.started = now;
        self.last_frame = now;
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(render_engine), Some(scene)) = (
            self.window.as_ref(),
            self.render_engine.as_mut(),
            self.scene.as_ref(),
        ) else {
            return;
        };

        let now = Instant::now();
        let delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let requests = self
            .mapper
            .process_frame(&mut self.input, &mut self.state, delta_time);

        if let Some(mode) = requests.cursor_mode {
            debug!("Overlay {}", if self.state.overlay_enabled { "shown" } else { "hidden" });
            apply_cursor_mode(window, mode);
        }
        if requests.exit {
            event_loop.exit();
            return;
        }

        let elapsed = now.duration_since(self.started).as_secs_f32();
        let frame = FrameSnapshot::derive(
            &self.state,
            &self.config.light_orbit,
            elapsed,
            self.config.aspect_ratio(),
        );
        render_engine.update(&frame);

        match self.ui_manager.as_mut() {
            Some(ui_manager) if self.state.overlay_enabled => {
                let state = &mut self.state;
                render_engine.render_frame_with_ui(
                    scene,
                    |device, queue, encoder, color_attachment| {
                        ui_manager.draw(
                            device,
                            queue,
                            encoder,
                            window,
                            color_attachment,
                            |ui| viewer_panel(ui, state),
                        );
                    },
                );
            }
            _ => render_engine.render_frame(scene, None::<UiCallback>),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.initialize(event_loop) {
            error!("Failed to start viewer: {}", err);
            self.startup_error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        let ui_wants_input = match self.ui_manager.as_mut() {
            Some(ui_manager) => ui_manager.handle_input(&window, window_id, &event),
            None => false,
        };
        // Stale capture flags from a hidden overlay must not swallow input
        let overlay_has_pointer = self.state.overlay_enabled && ui_wants_input;

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            WindowEvent::Focused(focused) => {
                self.focused = focused;
                self.input.handle_window_event(&event);
            }
            WindowEvent::KeyboardInput { .. } => {
                self.input.handle_window_event(&event);
            }
            WindowEvent::MouseWheel { .. } if !overlay_has_pointer => {
                self.input.handle_window_event(&event);
            }
            _ => (),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if self.focused {
            self.input.handle_device_event(&event);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if self.startup_error.is_some() {
            return;
        }
        if let Err(err) = persistence::save(&self.config.state_path, &self.state) {
            error!(
                "Failed to save viewer state to {}: {}",
                self.config.state_path.display(),
                err
            );
        }
    }
}

fn apply_cursor_mode(window: &Window, mode: CursorMode) {
    match mode {
        CursorMode::Captured => {
            // Not every platform supports locking; confining is the fallback
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(err) = grabbed {
                warn!("Could not capture the cursor: {}", err);
            }
            window.set_cursor_visible(false);
        }
        CursorMode::Free => {
            if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
                warn!("Could not release the cursor: {}", err);
            }
            window.set_cursor_visible(true);
        }
    }
}
