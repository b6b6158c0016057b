use crate::{
    config::rendering::RenderConfig,
    render::{
        device::Device,
        mesh::{Mesh, MeshData},
        pipeline::{FrameRenderer, FrameState},
        shaders::ShaderProgram,
    },
    utils::error::Result,
};
use log::{info, warn};

/// Everything the render loop needs, built once and released at shutdown.
///
/// The context never owns the device: every phase borrows it, so tests can
/// drive the same code against a recording fake.
#[derive(Debug)]
pub struct RenderContext {
    program: ShaderProgram,
    triangle: Mesh,
    rectangle: Mesh,
    renderer: FrameRenderer,
}

impl RenderContext {
    pub fn init<D: Device>(device: &mut D, config: &RenderConfig) -> Result<Self> {
        let program = ShaderProgram::new(device, config.shader_failure)?;
        if !program.is_linked() {
            warn!(
                "Continuing with unlinked shader program {} ({} diagnostics); output is undefined",
                program.id(),
                program.diagnostics().len()
            );
        }

        let triangle = match Mesh::upload(device, &MeshData::triangle()) {
            Ok(mesh) => mesh,
            Err(e) => {
                program.destroy(device);
                return Err(e.into());
            }
        };

        let rectangle = match Mesh::upload(device, &MeshData::rectangle()) {
            Ok(mesh) => mesh,
            Err(e) => {
                triangle.destroy(device);
                program.destroy(device);
                return Err(e.into());
            }
        };

        info!("Render context ready");
        Ok(Self {
            program,
            triangle,
            rectangle,
            renderer: FrameRenderer::new(config.clear_color),
        })
    }

    /// Issues one frame. `false` means nothing was drawn and nothing should be presented.
    pub fn frame<D: Device>(&mut self, device: &mut D) -> bool {
        self.renderer
            .render(device, &self.program, &[&self.triangle, &self.rectangle])
    }

    pub fn request_close(&mut self) {
        self.renderer.request_close();
    }

    pub fn state(&self) -> FrameState {
        self.renderer.state()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.renderer.frames_rendered()
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    pub fn triangle(&self) -> &Mesh {
        &self.triangle
    }

    pub fn rectangle(&self) -> &Mesh {
        &self.rectangle
    }

    pub fn shutdown<D: Device>(mut self, device: &mut D) {
        self.renderer.request_close();
        self.rectangle.destroy(device);
        self.triangle.destroy(device);
        self.program.destroy(device);
        info!("Render context released");
    }
}
