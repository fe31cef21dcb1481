//! egui overlay pass.
//!
//! Per frame: [`handle_input`](UiPass::handle_input) for every window event,
//! then [`begin_frame`](UiPass::begin_frame), build widgets through
//! [`context`](UiPass::context), [`end_frame`](UiPass::end_frame), and
//! finally [`render`](UiPass::render) on top of the viewports.

use winit::event::WindowEvent;
use winit::window::Window;

use crate::renderer::context::WgpuContext;

pub struct UiPass {
    egui_ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,

    clipped_primitives: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    screen_descriptor: egui_wgpu::ScreenDescriptor,
}

impl UiPass {
    #[must_use]
    pub fn new(ctx: &WgpuContext, window: &Window) -> Self {
        let size = window.inner_size();
        let egui_ctx = egui::Context::default();

        let id = egui_ctx.viewport_id();
        let state = egui_winit::State::new(egui_ctx.clone(), id, window, None, None, None);

        let renderer = egui_wgpu::Renderer::new(
            &ctx.device,
            ctx.color_format(),
            egui_wgpu::RendererOptions::default(),
        );

        Self {
            egui_ctx,
            state,
            renderer,
            clipped_primitives: Vec::new(),
            textures_delta: egui::TexturesDelta::default(),
            screen_descriptor: egui_wgpu::ScreenDescriptor {
                size_in_pixels: [size.width, size.height],
                pixels_per_point: window.scale_factor() as f32,
            },
        }
    }

    /// Forwards a window event to egui. Returns `true` if egui consumed it.
    ///
    /// Button releases are never reported as consumed so a drag that ends
    /// over the UI still ends for the orbit controls.
    pub fn handle_input(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.state.on_window_event(window, event);

        if let WindowEvent::MouseInput {
            state: winit::event::ElementState::Released,
            ..
        } = event
        {
            return false;
        }

        response.consumed
    }

    pub fn begin_frame(&mut self, window: &Window) {
        let raw_input = self.state.take_egui_input(window);
        self.egui_ctx.begin_pass(raw_input);
    }

    pub fn end_frame(&mut self, window: &Window) {
        let egui::FullOutput {
            shapes,
            textures_delta,
            platform_output,
            ..
        } = self.egui_ctx.end_pass();

        self.state.handle_platform_output(window, platform_output);
        self.textures_delta.append(textures_delta);
        self.clipped_primitives = self
            .egui_ctx
            .tessellate(shapes, self.egui_ctx.pixels_per_point());
    }

    #[must_use]
    pub fn context(&self) -> &egui::Context {
        &self.egui_ctx
    }

    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f32) {
        self.screen_descriptor.size_in_pixels = [width, height];
        self.screen_descriptor.pixels_per_point = scale_factor;
    }

    #[must_use]
    pub fn wants_pointer_input(&self) -> bool {
        self.egui_ctx.egui_wants_pointer_input()
    }

    /// Uploads textures and geometry, then draws the overlay onto `target`.
    ///
    /// Returns extra command buffers produced by egui callbacks; submit them
    /// before `encoder`'s buffer.
    pub fn render(
        &mut self,
        ctx: &WgpuContext,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, delta) in &self.textures_delta.set {
            self.renderer.update_texture(&ctx.device, &ctx.queue, *id, delta);
        }

        let user_cmd_bufs = self.renderer.update_buffers(
            &ctx.device,
            &ctx.queue,
            encoder,
            &self.clipped_primitives,
            &self.screen_descriptor,
        );

        {
            let mut rpass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: target,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                    multiview_mask: None,
                })
                .forget_lifetime();

            self.renderer
                .render(&mut rpass, &self.clipped_primitives, &self.screen_descriptor);
        }

        for id in &self.textures_delta.free {
            self.renderer.free_texture(id);
        }
        self.textures_delta.set.clear();
        self.textures_delta.free.clear();

        user_cmd_bufs
    }
}
