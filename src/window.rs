//! Interactive windowed viewer.
//!
//! Owns the event loop and per-frame driving order: tick the clock, drift
//! the camera, update the scene, render. Space toggles the scene between
//! its scattered and shaped states; the mouse orbits and zooms.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::error::ViewerError;
use crate::gpu::GpuState;
use crate::scene::Scene;
use crate::time::FrameClock;

/// Windowed viewer for a [`Scene`].
///
/// ```no_run
/// use dmpe::prelude::*;
///
/// let scene = Scene::holiday(None);
/// Viewer::new(scene).run().unwrap();
/// ```
pub struct Viewer {
    scene: Scene,
    title: String,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    clock: FrameClock,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    setup_error: Option<ViewerError>,
}

impl Viewer {
    /// Create a viewer around a scene.
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            title: "DMPE - Dual Morph Particle Engine".to_string(),
            window: None,
            gpu_state: None,
            clock: FrameClock::new(),
            mouse_pressed: false,
            last_mouse_pos: None,
            setup_error: None,
        }
    }

    /// Set the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Run the event loop until the window closes.
    pub fn run(mut self) -> Result<(), ViewerError> {
        let event_loop = EventLoop::new()?;
        event_loop.run_app(&mut self)?;
        if let Some(err) = self.setup_error.take() {
            return Err(err);
        }
        Ok(())
    }

    fn setup(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        self.window = Some(window.clone());
        self.gpu_state = Some(pollster::block_on(GpuState::new(window, &self.scene))?);
        Ok(())
    }
}

impl ApplicationHandler for Viewer {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.setup(event_loop) {
                self.setup_error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.set_pixel_ratio(scale_factor as f32);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if logical_key == Key::Named(NamedKey::Space) {
                    self.scene.toggle();
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some((last_x, last_y)) = self.last_mouse_pos {
                        let dx = position.x - last_x;
                        let dy = position.y - last_y;

                        if let Some(gpu_state) = &mut self.gpu_state {
                            gpu_state.camera.yaw -= dx as f32 * 0.005;
                            gpu_state.camera.pitch += dy as f32 * 0.005;
                            gpu_state.camera.pitch = gpu_state.camera.pitch.clamp(-1.5, 1.5);
                        }
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.camera.distance -= scroll * 1.5;
                    gpu_state.camera.distance = gpu_state.camera.distance.clamp(10.0, 80.0);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    let (elapsed, delta) = self.clock.tick();
                    gpu_state.camera.drift(delta);
                    self.scene.update(elapsed);

                    match gpu_state.render(&self.scene, elapsed) {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => {
                            gpu_state.resize(winit::dpi::PhysicalSize {
                                width: gpu_state.config.width,
                                height: gpu_state.config.height,
                            })
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                        Err(e) => eprintln!("Render error: {:?}", e),
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
