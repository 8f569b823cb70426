//! On-screen text: the current state label and the key help line.
//!
//! egui does the text layout and rasterization; the result is painted in a
//! second render pass over the sprite scene.

use winit::event::WindowEvent;
use winit::window::Window;

use crate::animation::AnimationState;
use crate::render::GpuState;

/// Top-left corner of the state label, in points.
const LABEL_POS: egui::Pos2 = egui::pos2(20.0, 20.0);
const LABEL_SIZE: f32 = 32.0;
const HELP_SIZE: f32 = 16.0;

/// Text of the always-visible label.
pub fn state_label(state: AnimationState) -> String {
    format!("Current State: {state}")
}

/// Bottom-left help line.
pub fn help_line(bindings_help: &str) -> String {
    format!("{bindings_help}  |  ESC: Quit")
}

/// Tessellated egui output for one frame, ready to upload and paint.
pub struct OverlayFrame {
    pub primitives: Vec<egui::epaint::ClippedPrimitive>,
    pub textures: egui::TexturesDelta,
    pub screen: egui_wgpu::ScreenDescriptor,
}

/// Text labels drawn with egui over the sprite scene.
pub struct TextOverlay {
    ctx: egui::Context,
    input: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    help: String,
}

impl TextOverlay {
    pub fn new(window: &Window, gpu: &GpuState, bindings_help: &str) -> Self {
        let ctx = egui::Context::default();
        let input = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(gpu.device.limits().max_texture_dimension_2d as usize),
        );
        let renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_config.format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: None,
                msaa_samples: 1,
                dithering: true,
                predictable_texture_filtering: false,
            },
        );

        Self {
            ctx,
            input,
            renderer,
            help: help_line(bindings_help),
        }
    }

    /// Keep egui's view of the window (size, scale factor) current.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) {
        let _ = self.input.on_window_event(window, event);
    }

    /// Lay out the labels for `state`.
    pub fn layout(
        &mut self,
        window: &Window,
        state: AnimationState,
        size_in_pixels: [u32; 2],
    ) -> OverlayFrame {
        let raw_input = self.input.take_egui_input(window);
        let label = state_label(state);
        let help = self.help.as_str();

        let output = self.ctx.run(raw_input, |ctx| draw_labels(ctx, &label, help));
        self.input
            .handle_platform_output(window, output.platform_output);

        let pixels_per_point = output.pixels_per_point;
        OverlayFrame {
            primitives: self.ctx.tessellate(output.shapes, pixels_per_point),
            textures: output.textures_delta,
            screen: egui_wgpu::ScreenDescriptor {
                size_in_pixels,
                pixels_per_point,
            },
        }
    }

    /// Upload glyph textures and vertex buffers. Returns extra command
    /// buffers to submit ahead of the frame encoder.
    pub fn upload(
        &mut self,
        gpu: &GpuState,
        encoder: &mut wgpu::CommandEncoder,
        frame: &OverlayFrame,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, delta) in &frame.textures.set {
            self.renderer
                .update_texture(&gpu.device, &gpu.queue, *id, delta);
        }
        self.renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            encoder,
            &frame.primitives,
            &frame.screen,
        )
    }

    pub fn paint(&self, pass: &mut wgpu::RenderPass<'static>, frame: &OverlayFrame) {
        self.renderer.render(pass, &frame.primitives, &frame.screen);
    }

    /// Release textures egui no longer needs. Call after present.
    pub fn release(&mut self, frame: &OverlayFrame) {
        for id in &frame.textures.free {
            self.renderer.free_texture(id);
        }
    }
}

fn draw_labels(ctx: &egui::Context, label: &str, help: &str) {
    egui::Area::new(egui::Id::new("state_label"))
        .fixed_pos(LABEL_POS)
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(label)
                    .size(LABEL_SIZE)
                    .color(egui::Color32::WHITE),
            );
        });

    egui::Area::new(egui::Id::new("key_help"))
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(20.0, -20.0))
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(help)
                    .size(HELP_SIZE)
                    .color(egui::Color32::from_gray(220)),
            );
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_names_the_state() {
        assert_eq!(state_label(AnimationState::Dancing), "Current State: Dancing");
        assert_eq!(state_label(AnimationState::Idle), "Current State: Idle");
    }

    #[test]
    fn help_line_appends_quit() {
        assert_eq!(help_line("I: Idle  D: Dancing"), "I: Idle  D: Dancing  |  ESC: Quit");
    }
}
