use egui::epaint::Shadow;
use std::collections::HashSet;

use super::input::{NavKey, VirtualKeyPress};

pub struct DebugStats {
    pub fps: u32,
    pub frame_time_avg_ms: f32,
    pub box_count: usize,
    pub draw_calls: u32,
    pub resolution: (u32, u32),
    pub position: (f32, f32, f32),
    pub yaw_deg: f32,
    pub pitch_deg: f32,
    /// Title and magnification of the zoomed exhibit, if any.
    pub zoomed: Option<(String, f32)>,
}

/// Text of one visible info panel.
pub struct InfoPanel {
    pub title: String,
    pub description: String,
}

const PAD_LAYOUT: [(&str, NavKey); 5] = [
    ("W", NavKey::Forward),
    ("A", NavKey::StrafeLeft),
    ("S", NavKey::Back),
    ("D", NavKey::StrafeRight),
    ("Shift", NavKey::Sprint),
];

/// On-screen WASD/Shift pad. Turns per-frame button holds into press/release edges.
#[derive(Debug, Default)]
pub struct ControlPad {
    held: HashSet<NavKey>,
}

impl ControlPad {
    pub fn transitions(&mut self, now_held: &[NavKey]) -> Vec<VirtualKeyPress> {
        let mut events = Vec::new();
        for (_, key) in PAD_LAYOUT {
            let was = self.held.contains(&key);
            let is = now_held.contains(&key);
            if was != is {
                events.push(VirtualKeyPress { key, pressed: is });
            }
        }
        self.held = now_held.iter().copied().collect();
        events
    }
}

pub struct DebugOverlay {
    pub visible: bool,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    pad: ControlPad,
}

impl DebugOverlay {
    pub fn new(
        window: &winit::window::Window,
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let egui_ctx = egui::Context::default();

        // Style: dark, semi-transparent, small monospace white font
        let mut visuals = egui::Visuals::dark();
        visuals.window_fill = egui::Color32::from_rgba_premultiplied(0, 0, 0, 180);
        visuals.window_stroke = egui::Stroke::NONE;
        visuals.window_shadow = Shadow::NONE;
        visuals.override_text_color = Some(egui::Color32::WHITE);
        egui_ctx.set_visuals(visuals);

        let mut style = (*egui_ctx.style()).clone();
        style.override_font_id = Some(egui::FontId::monospace(13.0));
        egui_ctx.set_style(style);

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        // The overlay draws after the scene pass, without depth.
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            visible: false,
            egui_ctx,
            egui_state,
            egui_renderer,
            pad: ControlPad::default(),
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn handle_window_event(
        &mut self,
        window: &winit::window::Window,
        event: &winit::event::WindowEvent,
    ) -> egui_winit::EventResponse {
        self.egui_state.on_window_event(window, event)
    }

    /// Render one egui frame: F3 stats (`None` = hidden), info panels, control pad.
    /// Returns the virtual key edges produced by the pad this frame.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        window: &winit::window::Window,
        view: &wgpu::TextureView,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
        stats: Option<&DebugStats>,
        panels: &[InfoPanel],
    ) -> Vec<VirtualKeyPress> {
        let raw_input = self.egui_state.take_egui_input(window);
        let mut pad_held = Vec::new();

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            // ── F3: stats panel ──────────────────────────────────────────────
            if let Some(stats) = stats {
                egui::Area::new(egui::Id::new("debug_overlay"))
                    .fixed_pos(egui::pos2(10.0, 10.0))
                    .show(ctx, |ui| {
                        panel_frame().show(ui, |ui: &mut egui::Ui| {
                            ui.label(format!("FPS: {}", stats.fps));
                            ui.label(format!("Frame: {:.2} ms", stats.frame_time_avg_ms));
                            ui.label(format!(
                                "Boxes: {}  Draw calls: {}",
                                stats.box_count, stats.draw_calls
                            ));
                            ui.label(format!(
                                "Resolution: {} x {}",
                                stats.resolution.0, stats.resolution.1
                            ));
                            ui.label(format!(
                                "Eye: ({:.1}, {:.1}, {:.1})  yaw {:.0}°  pitch {:.0}°",
                                stats.position.0, stats.position.1, stats.position.2,
                                stats.yaw_deg, stats.pitch_deg
                            ));
                            if let Some((title, magnification)) = &stats.zoomed {
                                ui.label(format!("Zoomed: {title} x{magnification:.2}"));
                            }
                        });
                    });
            }

            // ── Info panels ──────────────────────────────────────────────────
            for (i, panel) in panels.iter().enumerate() {
                egui::Area::new(egui::Id::new(("info_panel", i)))
                    .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0 + i as f32 * 90.0))
                    .show(ctx, |ui| {
                        panel_frame().show(ui, |ui: &mut egui::Ui| {
                            ui.set_max_width(280.0);
                            ui.heading(&panel.title);
                            if !panel.description.is_empty() {
                                ui.label(&panel.description);
                            }
                        });
                    });
            }

            // ── Control pad ──────────────────────────────────────────────────
            egui::Area::new(egui::Id::new("control_pad"))
                .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(10.0, -10.0))
                .show(ctx, |ui| {
                    panel_frame().show(ui, |ui: &mut egui::Ui| {
                        let mut button = |ui: &mut egui::Ui, label: &str, key: NavKey| {
                            let response =
                                ui.add(egui::Button::new(label).min_size(egui::vec2(40.0, 40.0)));
                            if response.is_pointer_button_down_on() {
                                pad_held.push(key);
                            }
                        };
                        ui.horizontal(|ui| {
                            ui.add_space(48.0);
                            let (label, key) = PAD_LAYOUT[0];
                            button(ui, label, key);
                        });
                        ui.horizontal(|ui| {
                            for (label, key) in &PAD_LAYOUT[1..] {
                                button(ui, label, *key);
                            }
                        });
                    });
                });
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, &tris, screen_descriptor);

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.egui_renderer
                .render(&mut render_pass.forget_lifetime(), &tris, screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.pad.transitions(&pad_held)
    }
}

fn panel_frame() -> egui::Frame {
    egui::Frame::none()
        .fill(egui::Color32::from_rgba_premultiplied(0, 0, 0, 180))
        .inner_margin(egui::Margin::same(8.0))
        .rounding(4.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_emits_edges_only() {
        let mut pad = ControlPad::default();
        assert_eq!(
            pad.transitions(&[NavKey::Forward]),
            vec![VirtualKeyPress { key: NavKey::Forward, pressed: true }]
        );
        assert!(pad.transitions(&[NavKey::Forward]).is_empty());
        assert_eq!(
            pad.transitions(&[NavKey::Sprint]),
            vec![
                VirtualKeyPress { key: NavKey::Forward, pressed: false },
                VirtualKeyPress { key: NavKey::Sprint, pressed: true },
            ]
        );
        assert_eq!(
            pad.transitions(&[]),
            vec![VirtualKeyPress { key: NavKey::Sprint, pressed: false }]
        );
    }
}
