use crate::render::mesh::GeometryError;
use crate::render::shaders::ShaderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error("Geometry upload failed: {0}")]
    Geometry(#[from] GeometryError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
