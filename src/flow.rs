//! Window, event loop and the per-frame driver.
//!
//! The user supplies a [`SceneFlow`] that builds the scene once and animates
//! it every frame. Each redraw runs, in order:
//!
//! 1. camera controller (keyboard movement, mouse look)
//! 2. [`SceneFlow::on_update`]
//! 3. scene update: node transforms, then the camera matrices
//! 4. renderer draws the scene
//!
//! Resizes rebuild the renderer's size-dependent state, update the camera
//! aspect ratio and rebind every resource before the next frame.

use std::sync::Arc;

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    config::Settings,
    context::Context,
    data_structures::{
        camera::{Camera, CameraController},
        scene_graph::Scene,
    },
    error::EngineError,
    input::InputState,
    render::Renderer,
    resources,
};

/// Game logic plugged into the run loop.
pub trait SceneFlow {
    /// Populate `scene`. Called once, after the GPU context exists and before
    /// the first frame.
    fn on_init(&mut self, scene: &mut Scene);

    /// Per-frame logic. `elapsed` is the time since the scene was initialised.
    fn on_update(&mut self, _scene: &mut Scene, _dt: Duration, _elapsed: Duration) {}
}

/// Everything that exists only while a window is open.
struct Running {
    window: Arc<Window>,
    renderer: Renderer,
    scene: Scene,
    started: Instant,
}

impl Running {
    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.renderer.resize(width, height);
        if let Some(camera) = self.scene.camera_mut() {
            camera.set_aspect(width as f32 / height as f32);
        }
        self.renderer.prepare_scene(&mut self.scene);
    }
}

pub struct App<F: SceneFlow> {
    async_runtime: tokio::runtime::Runtime,
    settings: Settings,
    flow: F,
    input: InputState,
    controller: CameraController,
    running: Option<Running>,
    last_time: Instant,
    error: Option<anyhow::Error>,
}

impl<F: SceneFlow> App<F> {
    pub fn new(settings: Settings, flow: F) -> anyhow::Result<Self> {
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            async_runtime,
            input: InputState::new(settings.input.clone()),
            controller: CameraController::new(settings.camera.speed),
            settings,
            flow,
            running: None,
            last_time: Instant::now(),
            error: None,
        })
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<Running> {
        let window_attributes = Window::default_attributes()
            .with_title(self.settings.title.clone())
            .with_inner_size(PhysicalSize::new(self.settings.width, self.settings.height));
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let vsync = self.settings.vsync;
        let shader_path = self.settings.shader.clone();
        let (ctx, shader) = self.async_runtime.block_on(async {
            let ctx = Context::new(window.clone(), vsync).await?;
            let shader = resources::load_string(&shader_path).await?;
            anyhow::Ok((ctx, shader))
        })?;
        let renderer = Renderer::new(ctx, &shader, self.settings.clear_colour);

        let size = window.inner_size();
        let aspect = size.width.max(1) as f32 / size.height.max(1) as f32;
        let mut scene = Scene::new(Camera::with_settings(&self.settings.camera, aspect));
        self.flow.on_init(&mut scene);
        scene.start();
        // Matrices must be valid before the first draw.
        scene.update(Duration::ZERO);
        renderer.prepare_scene(&mut scene);
        log::info!("Scene initialised with {} nodes", scene.nodes.len());

        self.last_time = Instant::now();
        Ok(Running {
            window,
            renderer,
            scene,
            started: Instant::now(),
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        let dt = self.last_time.elapsed();
        self.last_time = Instant::now();

        if let Some(camera) = running.scene.camera_mut() {
            self.controller.update_camera(camera, &mut self.input, dt);
        }
        self.flow.on_update(&mut running.scene, dt, running.started.elapsed());
        running.scene.update(dt);

        match running.renderer.render_scene(&running.scene) {
            Ok(_) => {}
            // Reconfigure the surface if it's lost or outdated
            Err(EngineError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                let size = running.window.inner_size();
                running.resize(size.width, size.height);
            }
            Err(e @ EngineError::DeviceLost(_)) => {
                self.fail(event_loop, e.into());
            }
            Err(e) => {
                log::error!("Unable to render {e}");
            }
        }
    }
}

impl<F: SceneFlow> ApplicationHandler for App<F> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(running) => {
                running.window.request_redraw();
                self.running = Some(running);
            }
            Err(e) => self.fail(event_loop, e.context("initialisation failed")),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        self.input.handle_device_event(&event);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        self.input.handle_window_event(&event);
        match event {
            WindowEvent::CloseRequested => {
                if let Some(running) = self.running.as_mut() {
                    running.scene.destroy();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(running) = self.running.as_mut() {
                    running.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = &self.running {
            running.window.request_redraw();
        }
    }
}

/// Opens a window and drives `flow` until the window closes.
pub fn run<F: SceneFlow>(settings: Settings, flow: F) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop = EventLoop::new()?;
    let mut app = App::new(settings, flow)?;
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
