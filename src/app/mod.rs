//! Application Module
//!
//! Opens the window, owns the GPU renderer, and drives the viewer once per
//! redraw:
//!
//! 1. Mount models whose background load finished
//! 2. Run the frame callbacks (one animation tick per mounted model)
//! 3. Build the egui overlay and dispatch the play-all control
//! 4. Apply pointer input to the orbit cameras
//! 5. Render both viewports and the overlay
//!
//! # Example
//!
//! ```rust,ignore
//! use molview::app::App;
//! use molview::viewer::ViewerConfig;
//!
//! App::new(ViewerConfig::default()).run()?;
//! ```

pub mod input;
pub mod ui;

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::assets::{self, AssetCache};
use crate::errors::Result;
use crate::frame::FrameLoop;
use crate::renderer::{Renderer, RendererSettings, UiPass, ViewportFrame};
use crate::utils::Timer;
use crate::viewer::{TOP_BAR_HEIGHT, ViewerConfig, ViewerLayout, ViewerShell};

use self::input::Input;

pub struct App {
    config: ViewerConfig,
    render_settings: RendererSettings,
    cache: Arc<AssetCache>,
}

impl App {
    /// An app reading models through the process-wide asset cache.
    #[must_use]
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            render_settings: RendererSettings::default(),
            cache: Arc::clone(assets::global()),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: RendererSettings) -> Self {
        self.render_settings = settings;
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Arc<AssetCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Starts loading both models, then runs the event loop until the window
    /// closes.
    pub fn run(self) -> Result<()> {
        for path in self.config.model_paths() {
            self.cache.preload(&path);
        }

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = AppRunner {
            config: self.config,
            render_settings: self.render_settings,
            cache: self.cache,
            window: None,
            state: None,
        };
        event_loop.run_app(&mut runner)?;
        Ok(())
    }
}

struct ViewerState {
    renderer: Renderer,
    ui: UiPass,
    shell: ViewerShell,
    frames: FrameLoop,
    input: Input,
    timer: Timer,
    /// Layout in physical pixels.
    layout: ViewerLayout,
}

impl ViewerState {
    fn relayout(&mut self, window: &Window) {
        let size = window.inner_size();
        let scale = window.scale_factor() as f32;
        self.layout = ViewerLayout::compute(size.width as f32, size.height as f32, TOP_BAR_HEIGHT * scale);
        for (viewport, rect) in self.shell.viewports_mut().iter_mut().zip(&self.layout.viewports) {
            viewport.set_aspect(rect.aspect());
        }
    }

    fn frame(&mut self, window: &Window) {
        let now = self.timer.tick();
        let dt = self.timer.dt_seconds();

        // 1. Suspension boundaries
        self.shell.poll_loads(&mut self.frames);

        // 2. Animation ticks
        self.frames.run_frame();

        // 3. Overlay and control
        let scale = window.scale_factor() as f32;
        let size = window.inner_size();
        let logical = ViewerLayout::compute(
            size.width as f32 / scale,
            size.height as f32 / scale,
            TOP_BAR_HEIGHT,
        );
        self.ui.begin_frame(window);
        let clicked = ui::draw(self.ui.context(), &self.shell, &logical, now);
        self.ui.end_frame(window);
        if clicked {
            self.shell.play_all(now);
        }

        // 4. Cameras
        for (index, viewport) in self.shell.viewports_mut().iter_mut().enumerate() {
            let orbit_input = self.input.orbit_input(index, &self.layout);
            viewport.update_camera(&orbit_input, dt);
        }
        self.input.end_frame();

        // 5. Draw
        let instances: Vec<_> = self
            .shell
            .viewports()
            .iter()
            .map(|v| v.controller().map(|c| c.instance()))
            .collect();
        let frames: Vec<ViewportFrame> = self
            .shell
            .viewports()
            .iter()
            .zip(&self.layout.viewports)
            .zip(&instances)
            .map(|((viewport, rect), instance)| {
                let config = viewport.config();
                ViewportFrame {
                    rect: *rect,
                    camera: &viewport.camera,
                    background: config.background,
                    environment: viewport.environment(),
                    ambient: &config.ambient_light,
                    point_light: &config.point_light,
                    model: instance.as_deref(),
                }
            })
            .collect();

        self.renderer.render(&frames, Some(&mut self.ui));
    }
}

struct AppRunner {
    config: ViewerConfig,
    render_settings: RendererSettings,
    cache: Arc<AssetCache>,

    window: Option<Arc<Window>>,
    state: Option<ViewerState>,
}

impl AppRunner {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let [width, height] = self.config.window_size;
        let window_attributes = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(f64::from(width), f64::from(height)));

        let window = Arc::new(event_loop.create_window(window_attributes)?);

        log::info!("Initializing Renderer Backend...");
        let renderer = Renderer::new(Arc::clone(&window), &self.render_settings)?;
        let ui = UiPass::new(&renderer.context, &window);

        let mut state = ViewerState {
            renderer,
            ui,
            shell: ViewerShell::new(self.config.clone(), &self.cache),
            frames: FrameLoop::new(),
            input: Input::new(),
            timer: Timer::new(),
            layout: ViewerLayout::compute(1.0, 1.0, 0.0),
        };
        state.relayout(&window);

        self.window = Some(window);
        self.state = Some(state);
        Ok(())
    }
}

impl ApplicationHandler for AppRunner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            log::error!("Fatal Renderer Error: {e}");
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let (Some(window), Some(state)) = (&self.window, &mut self.state) else {
            return;
        };

        let consumed = state.ui.handle_input(window, &event);
        if !consumed && !state.ui.wants_pointer_input() {
            state.input.process_window_event(&event, &state.layout);
        } else if let WindowEvent::MouseInput { .. } | WindowEvent::CursorMoved { .. } = event {
            // Keep button and cursor bookkeeping consistent even over the UI.
            state.input.process_window_event(&event, &state.layout);
        }

        match event {
            WindowEvent::CloseRequested => {
                state.shell.unmount_all(&mut state.frames);
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                state.renderer.resize(size.width, size.height);
                state.ui.resize(size.width, size.height, window.scale_factor() as f32);
                state.relayout(window);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let size = window.inner_size();
                state.ui.resize(size.width, size.height, scale_factor as f32);
                state.relayout(window);
            }
            WindowEvent::RedrawRequested => {
                state.frame(window);
                window.request_redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.state.is_some()
            && let Some(window) = &self.window
        {
            window.request_redraw();
        }
    }
}
