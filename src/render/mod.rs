pub mod device;
pub mod mesh;
pub mod pipeline;
pub mod shaders;

pub use device::{Device, GlDevice, ShaderStage};
pub use mesh::{DrawCommand, Mesh, MeshData, VertexLayout};
pub use pipeline::{FrameRenderer, FrameState};
pub use shaders::{ShaderError, ShaderFailurePolicy, ShaderProgram};
