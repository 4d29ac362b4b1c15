use std::sync::Arc;

use thiserror::Error;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    error::{EventLoopError, OsError},
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    assets::AssetLoader,
    builder::{resolve_model, Outcome},
    config::{ScreenshotConfig, WindowConfig},
    gfx::{
        rendering::{save_png, RenderEngine, RenderError},
        scene::Scene,
    },
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("event loop failed: {0}")]
    EventLoop(#[from] EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] OsError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Window, renderer and render loop for a built scene
pub struct PlanviewApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    window_config: WindowConfig,
    screenshot: ScreenshotConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    scene: Scene,
    loader: AssetLoader,
    fatal: Option<AppError>,
}

impl PlanviewApp {
    /// Wraps a scene whose model loads have already been requested on `loader`
    pub fn new(
        scene: Scene,
        loader: AssetLoader,
        window_config: WindowConfig,
        screenshot: ScreenshotConfig,
    ) -> Result<Self, AppError> {
        let event_loop = EventLoop::new()?;

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window_config,
                screenshot,
                window: None,
                render_engine: None,
                scene,
                loader,
                fatal: None,
            },
        })
    }

    /// Runs until the window closes or Escape is pressed
    pub fn run(mut self) -> Result<(), AppError> {
        let Some(event_loop) = self.event_loop.take() else {
            return Ok(());
        };
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self.app_state)?;

        match self.app_state.fatal.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        log::error!("{error}");
        self.fatal = Some(error);
        event_loop.exit();
    }

    /// Applies finished model loads
    fn apply_loaded_models(&mut self) {
        let events = self.loader.drain();
        if events.is_empty() {
            return;
        }

        for event in events {
            let url = event.request.url.clone();
            if let Outcome::Failed { reason } = resolve_model(&mut self.scene, event) {
                log::debug!("{url} stays a placeholder: {reason}");
            }
        }

        if self.loader.pending() == 0 {
            let stats = self.scene.get_statistics();
            log::info!(
                "All models settled: {} nodes, {} triangles, {} placeholders left",
                stats.object_count,
                stats.total_triangles,
                stats.placeholder_count
            );
        }
    }

    fn save_screenshot(&mut self) {
        let Some(render_engine) = self.render_engine.as_mut() else {
            return;
        };

        render_engine.prepare_scene(&mut self.scene);
        self.scene.update();
        render_engine.update(self.scene.camera_manager.camera.uniform, &self.scene.lights);

        let path = &self.screenshot.path;
        match render_engine.capture(&self.scene) {
            Ok(image) => match save_png(&image, path) {
                Ok(()) => log::info!("Image saved to {}", path.display()),
                Err(e) => log::error!("Could not write {}: {e}", path.display()),
            },
            Err(e) => log::error!("Screenshot failed: {e}"),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title(self.window_config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.window_config.width,
                self.window_config.height,
            ));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };
        self.window = Some(window.clone());

        let (width, height) = window.inner_size().into();
        let renderer = match pollster::block_on(RenderEngine::new(window, width, height)) {
            Ok(renderer) => renderer,
            Err(e) => return self.fail(event_loop, e.into()),
        };

        let (width, height) = renderer.get_surface_size();
        self.scene
            .camera_manager
            .camera
            .resize_projection(width, height);
        renderer.prepare_scene(&mut self.scene);
        self.render_engine = Some(renderer);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.render_engine.is_none() {
            return;
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Space),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.save_screenshot();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.scene
                    .camera_manager
                    .camera
                    .resize_projection(width, height);
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                self.apply_loaded_models();

                let Some(render_engine) = self.render_engine.as_mut() else {
                    return;
                };
                render_engine.prepare_scene(&mut self.scene);
                self.scene.update();
                render_engine.update(self.scene.camera_manager.camera.uniform, &self.scene.lights);

                match render_engine.render_frame(&self.scene) {
                    Ok(()) => {}
                    Err(e @ RenderError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                        self.fail(event_loop, e.into());
                    }
                    Err(e) => log::warn!("Dropped frame: {e}"),
                }
            }
            event => {
                self.scene.camera_manager.process_window_event(&event);
            }
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if self.window.is_none() {
            return;
        }

        self.scene.camera_manager.process_device_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
