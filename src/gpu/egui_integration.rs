//! Egui HUD overlay.
//!
//! Only built with the `egui` feature. Shows frame rate, tick count, body
//! count and the invader position in a small corner window, painted over the
//! composited frame.

use std::sync::Arc;
use winit::window::Window;

use crate::scene::Scene;
use crate::time::Time;

/// Egui context, winit state and wgpu renderer for the HUD.
pub struct Hud {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

/// Tessellated HUD for one frame.
pub struct HudFrame {
    paint_jobs: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
}

impl Hud {
    pub fn new(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
        window: &Arc<Window>,
    ) -> Self {
        let ctx = egui::Context::default();

        let mut style = egui::Style::default();
        style.visuals = egui::Visuals::dark();
        style.visuals.window_shadow = egui::Shadow::NONE;
        ctx.set_style(style);

        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window.as_ref(),
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let renderer = egui_wgpu::Renderer::new(
            device,
            output_format,
            None,  // depth format
            1,     // msaa samples
            false, // dithering
        );

        Self { ctx, state, renderer }
    }

    /// Process a winit event.
    ///
    /// Returns true if egui consumed the event (don't pass to camera controls).
    pub fn on_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Lay out the HUD for this frame.
    pub fn draw(&mut self, window: &Window, scene: &Scene, time: &Time) -> HudFrame {
        let raw_input = self.state.take_egui_input(window);
        let pointer = scene.pointer().position();

        let full_output = self.ctx.run(raw_input, |ctx| {
            egui::Window::new("orbswarm")
                .anchor(egui::Align2::LEFT_TOP, [8.0, 8.0])
                .resizable(false)
                .collapsible(true)
                .show(ctx, |ui| {
                    ui.label(format!("FPS: {:.0}", time.fps()));
                    ui.label(format!("Tick: {}", scene.ticks()));
                    ui.label(format!("Bodies: {}", scene.bodies().len()));
                    ui.label(format!(
                        "Invader: ({:.2}, {:.2}, {:.2})",
                        pointer.x, pointer.y, pointer.z
                    ));
                });
        });

        self.state.handle_platform_output(window, full_output.platform_output);
        let paint_jobs = self.ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        HudFrame {
            paint_jobs,
            textures_delta: full_output.textures_delta,
        }
    }

    /// Upload and paint the HUD over `view`. Returns command buffers egui
    /// needs submitted before `encoder`.
    pub fn paint(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        frame: &HudFrame,
        screen: &egui_wgpu::ScreenDescriptor,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, image_delta) in &frame.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }
        let commands = self
            .renderer
            .update_buffers(device, queue, encoder, &frame.paint_jobs, screen);

        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("HUD Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();
            self.renderer.render(&mut pass, &frame.paint_jobs, screen);
        }

        for id in &frame.textures_delta.free {
            self.renderer.free_texture(id);
        }

        commands
    }
}
