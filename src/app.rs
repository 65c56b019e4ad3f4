//! Window, input bindings and the redraw loop

use crate::controller::{
    pointer_to_ndc, step_particle_count, step_particle_size, BackendFactory, Controller, RunStatus,
};
use particle_renderer::{RenderTarget, SurfaceHandle};
use particle_simulation::{Backend, BackendKind, CpuBackend, GpuBackend};
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

const WINDOW_TITLE: &str = "Particle Swarm";

/// Startup choices from the command line
#[derive(Clone, Copy, Debug)]
pub struct Settings {
    pub backend: BackendKind,
    pub particle_count: u32,
    pub particle_size: f32,
}

/// Builds backends that present to the application window
pub struct WindowBackendFactory {
    target: RenderTarget,
}

impl BackendFactory for WindowBackendFactory {
    fn create(&mut self, kind: BackendKind) -> Box<dyn Backend> {
        match kind {
            BackendKind::Gpu => Box::new(GpuBackend::new(self.target.clone())),
            BackendKind::Cpu => Box::new(CpuBackend::new(self.target.clone())),
        }
    }
}

pub struct App {
    settings: Settings,
    window: Option<Arc<Window>>,
    controller: Option<Controller<WindowBackendFactory>>,
    title: String,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            window: None,
            controller: None,
            title: String::new(),
        }
    }

    fn handle_key(&mut self, key: KeyCode, event_loop: &ActiveEventLoop) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };

        match key {
            KeyCode::Escape => {
                controller.shutdown();
                event_loop.exit();
            }
            KeyCode::Digit1 | KeyCode::Numpad1 => controller.switch_backend(BackendKind::Gpu),
            KeyCode::Digit2 | KeyCode::Numpad2 => controller.switch_backend(BackendKind::Cpu),
            KeyCode::KeyR => controller.reset(),
            KeyCode::ArrowUp | KeyCode::ArrowDown => {
                let count = step_particle_count(controller.particle_count(), key == KeyCode::ArrowUp);
                log::info!("Particle count: {}", count);
                controller.set_particle_count(count);
            }
            KeyCode::Equal | KeyCode::NumpadAdd | KeyCode::Minus | KeyCode::NumpadSubtract => {
                let up = matches!(key, KeyCode::Equal | KeyCode::NumpadAdd);
                let size = step_particle_size(controller.particle_size(), up);
                log::debug!("Particle size: {:.1}", size);
                controller.set_particle_size(size);
            }
            _ => {}
        }
    }

    fn update_title(&mut self) {
        let (Some(window), Some(controller)) = (&self.window, &self.controller) else {
            return;
        };

        let title = window_title(controller);
        if title != self.title {
            window.set_title(&title);
            self.title = title;
        }
    }
}

fn window_title<F: BackendFactory>(controller: &Controller<F>) -> String {
    match controller.status() {
        RunStatus::Running => {
            let stats = controller.stats();
            let fps = stats
                .current_fps()
                .map_or_else(|| "--".to_string(), |fps| format!("{fps:.0}"));
            let avg_fps = stats
                .average_fps()
                .map_or_else(|| "--".to_string(), |fps| format!("{fps:.0}"));
            let frame_time = stats
                .last_frame_time_ms()
                .map_or_else(|| "--".to_string(), |ms| format!("{ms:.2}ms"));

            format!(
                "{WINDOW_TITLE} - {} - {fps} FPS (avg {avg_fps}) - {frame_time} - {} particles - size {:.1}",
                controller.kind(),
                controller.particle_count(),
                controller.particle_size(),
            )
        }
        RunStatus::Halted(message) => {
            let hint = match controller.suggested_fallback() {
                Some(BackendKind::Gpu) => "press 1 for the GPU backend",
                Some(BackendKind::Cpu) => "press 2 for the CPU backend",
                None => "press 1/2 to switch or R to reset",
            };
            format!("{WINDOW_TITLE} - HALTED: {message} ({hint})")
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let handle: SurfaceHandle = window.clone();
        let factory = WindowBackendFactory {
            target: RenderTarget::new(handle, size.width, size.height),
        };

        let mut controller = Controller::new(
            factory,
            self.settings.backend,
            self.settings.particle_count,
            self.settings.particle_size,
            Instant::now(),
        );
        controller.resize_surface(size.width, size.height);
        controller.start();

        self.window = Some(window);
        self.controller = Some(controller);
        self.update_title();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(controller) = self.controller.as_mut() {
                    controller.shutdown();
                }
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(key, event_loop),

            WindowEvent::Resized(physical_size) => {
                if let Some(controller) = self.controller.as_mut() {
                    controller.resize_surface(physical_size.width, physical_size.height);
                }
            }

            WindowEvent::CursorEntered { .. } => {
                if let Some(controller) = self.controller.as_mut() {
                    controller.set_pointer_active(true);
                }
            }

            WindowEvent::CursorLeft { .. } => {
                if let Some(controller) = self.controller.as_mut() {
                    controller.set_pointer_active(false);
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                if let (Some(window), Some(controller)) = (&self.window, self.controller.as_mut()) {
                    let size = window.inner_size();
                    controller.set_pointer(pointer_to_ndc(
                        position.x,
                        position.y,
                        size.width,
                        size.height,
                    ));
                }
            }

            WindowEvent::Touch(Touch {
                phase, location, ..
            }) => {
                if let (Some(window), Some(controller)) = (&self.window, self.controller.as_mut()) {
                    let size = window.inner_size();
                    controller.set_pointer(pointer_to_ndc(
                        location.x,
                        location.y,
                        size.width,
                        size.height,
                    ));
                    match phase {
                        TouchPhase::Started => controller.set_pointer_active(true),
                        TouchPhase::Ended | TouchPhase::Cancelled => {
                            controller.set_pointer_active(false)
                        }
                        TouchPhase::Moved => {}
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if let Some(controller) = self.controller.as_mut() {
                    controller.frame(Instant::now());
                }
                self.update_title();
            }

            _ => {}
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
