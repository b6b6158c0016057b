use crate::render::device::Device;
use crate::render::mesh::Mesh;
use crate::render::shaders::ShaderProgram;
use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    Running,
    Closed,
}

/// Issues the per-frame command sequence. Presenting is left to the window.
#[derive(Debug)]
pub struct FrameRenderer {
    clear_color: [f32; 4],
    state: FrameState,
    frames: u64,
}

impl FrameRenderer {
    pub fn new(clear_color: [f32; 4]) -> Self {
        Self {
            clear_color,
            state: FrameState::Running,
            frames: 0,
        }
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == FrameState::Running
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    /// `Running -> Closed`. There is no way back.
    pub fn request_close(&mut self) {
        if self.state == FrameState::Running {
            info!("Close requested after {} frames", self.frames);
            self.state = FrameState::Closed;
        }
    }

    /// Records one frame. Returns `false` without touching the device once closed.
    pub fn render<D: Device>(&mut self, device: &mut D, program: &ShaderProgram, meshes: &[&Mesh]) -> bool {
        if !self.is_running() {
            return false;
        }

        device.clear(self.clear_color);
        for mesh in meshes {
            // Activated per mesh so each draw is self-contained.
            program.set_used(device);
            mesh.draw(device);
        }

        self.frames += 1;
        true
    }
}
