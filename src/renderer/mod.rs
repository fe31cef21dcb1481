//! GPU side of the viewer.
//!
//! - [`WgpuContext`]: device, queue, surface and depth buffer
//! - [`MeshPass`]: per-viewport background and lit meshes
//! - [`UiPass`]: the egui control bar on top

pub mod context;
pub mod mesh_pass;
pub mod settings;
pub mod ui_pass;

use std::sync::Arc;

use winit::window::Window;

pub use context::WgpuContext;
pub use mesh_pass::{MeshPass, ViewportFrame};
pub use settings::RendererSettings;
pub use ui_pass::UiPass;

use crate::errors::Result;

/// Color behind the control bar and any area no viewport covers.
const CHROME_COLOR: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.025,
    a: 1.0,
};

pub struct Renderer {
    pub context: WgpuContext,
    mesh_pass: MeshPass,
}

impl Renderer {
    pub fn new(window: Arc<Window>, settings: &RendererSettings) -> Result<Self> {
        let context = pollster::block_on(WgpuContext::new(window, settings))?;
        let mesh_pass = MeshPass::new(&context);
        Ok(Self { context, mesh_pass })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
    }

    /// Draws the viewports and the UI overlay and presents the frame.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn render(&mut self, viewports: &[ViewportFrame], ui: Option<&mut UiPass>) {
        let output = match self.context.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output)
            | wgpu::CurrentSurfaceTexture::Suboptimal(output) => output,
            wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated => {
                self.context.reconfigure();
                return;
            }
            e => {
                log::error!("Render error: {e:?}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Viewer Frame"),
            });

        self.mesh_pass
            .render(&self.context, &mut encoder, &view, CHROME_COLOR, viewports);

        let mut cmd_bufs = match ui {
            Some(ui) => ui.render(&self.context, &mut encoder, &view),
            None => Vec::new(),
        };
        cmd_bufs.push(encoder.finish());

        self.context.queue.submit(cmd_bufs);
        output.present();
    }
}
