pub mod config;
pub mod engine;
pub mod render;
pub mod utils;
pub mod window;

// Re-export commonly used types
pub use config::core::AppConfig;
pub use engine::RenderContext;
pub use render::device::{Device, GlDevice};
pub use render::mesh::{Mesh, MeshData};
pub use render::pipeline::{FrameRenderer, FrameState};
pub use render::shaders::{ShaderError, ShaderFailurePolicy, ShaderProgram};
pub use utils::error::EngineError;
pub use window::{GlWindow, InitError};
