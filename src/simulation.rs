//! Window and frame loop.
//!
//! [`Simulation`] owns the configuration until [`run`](Simulation::run) is
//! called, then hands everything to a winit application that ticks the
//! scene once per redraw.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::SwarmConfig;
use crate::error::SimulationError;
use crate::gpu::{Camera, GpuState, OrbitControls};
use crate::input::Input;
use crate::scene::Scene;
use crate::time::Time;

/// Cloneable handle that asks a running loop to stop.
///
/// The loop checks the flag once per tick, so a stop takes effect at the
/// next redraw.
#[derive(Debug, Clone, Default)]
pub struct LoopControl {
    stopped: Arc<AtomicBool>,
}

impl LoopControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the loop to exit.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

/// The interactive demo.
///
/// ```ignore
/// Simulation::new(SwarmConfig::default()).run()?;
/// ```
pub struct Simulation {
    config: SwarmConfig,
    control: LoopControl,
}

impl Simulation {
    pub fn new(config: SwarmConfig) -> Self {
        Self {
            config,
            control: LoopControl::new(),
        }
    }

    /// Handle for stopping the loop from elsewhere.
    pub fn control(&self) -> LoopControl {
        self.control.clone()
    }

    /// Open the window and run until it is closed. Startup failures are
    /// returned once the event loop has exited.
    pub fn run(self) -> Result<(), SimulationError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self.config, self.control);
        event_loop.run_app(&mut app)?;

        match app.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

struct App {
    config: SwarmConfig,
    control: LoopControl,
    gpu_state: Option<GpuState>,
    scene: Option<Scene>,
    camera: Camera,
    controls: OrbitControls,
    input: Input,
    time: Time,
    error: Option<SimulationError>,
}

impl App {
    fn new(config: SwarmConfig, control: LoopControl) -> Self {
        let camera = Camera::new(&config.camera);
        Self {
            config,
            control,
            gpu_state: None,
            scene: None,
            camera,
            controls: OrbitControls::default(),
            input: Input::new(),
            time: Time::new(),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SimulationError> {
        let window_attrs = Window::default_attributes()
            .with_title("orbswarm")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let size = window.inner_size();
        self.input.set_window_size(size.width, size.height);

        let scene = Scene::new(self.config.clone());
        let gpu_state = pollster::block_on(GpuState::new(window.clone(), &scene, &self.config))?;

        self.scene = Some(scene);
        self.gpu_state = Some(gpu_state);
        self.time = Time::new();
        window.request_redraw();
        Ok(())
    }

    /// One tick: controls, scene, render, reschedule.
    fn tick(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(gpu_state), Some(scene)) = (&mut self.gpu_state, &mut self.scene) else {
            return;
        };

        self.controls.update(
            &mut self.camera,
            self.input.drag_delta(),
            self.input.scroll_delta(),
        );
        scene.advance(&self.input.pointer());

        match gpu_state.render(scene, &self.camera, &self.time) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost) => gpu_state.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, exiting");
                event_loop.exit();
                return;
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }

        self.input.begin_frame();
        if self.time.update() {
            log::debug!("{:.1} fps, tick {}", self.time.fps(), scene.ticks());
        }

        gpu_state.window().request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu_state.is_none() {
            if let Err(e) = self.init(event_loop) {
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        #[cfg(feature = "egui")]
        if let Some(gpu_state) = &mut self.gpu_state {
            if gpu_state.hud_event(&event) {
                return;
            }
        }

        self.input.handle_event(&event);
        if self.input.exit_requested() {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    let scale_factor = gpu_state.window().scale_factor();
                    gpu_state.resize(physical_size, scale_factor);
                }
            }
            WindowEvent::RedrawRequested => {
                if self.control.is_stopped() {
                    log::info!("stop requested, exiting");
                    event_loop.exit();
                    return;
                }
                self.tick(event_loop);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_loop_control_starts_running() {
        assert!(!LoopControl::new().is_stopped());
    }

    #[test]
    fn test_stop_is_shared_between_clones() {
        let sim = Simulation::new(SwarmConfig::default());
        let control = sim.control();
        let other = control.clone();

        thread::spawn(move || other.stop()).join().unwrap();

        assert!(control.is_stopped());
        assert!(sim.control().is_stopped());
    }
}
