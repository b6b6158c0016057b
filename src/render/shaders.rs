// shaders.rs - Shader compilation and program linking

use crate::render::device::{Device, ShaderStage};
use gl::types::*;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::ffi::{CString, NulError};
use thiserror::Error;

/// Upper bound, in bytes, on any captured compile or link log.
pub const INFO_LOG_CAPACITY: usize = 512;

const EMPTY_LOG_PLACEHOLDER: &str = "(driver returned an empty info log)";

#[derive(Debug, Clone, Error)]
pub enum ShaderError {
    #[error("{stage} Compile Error: {log}")]
    Compilation { stage: ShaderStage, log: String },
    #[error("Shader Linking Error: {0}")]
    Linking(String),
    #[error("{stage} shader source contains a null byte")]
    Nul {
        stage: ShaderStage,
        #[source]
        source: NulError,
    },
}

impl ShaderError {
    /// Driver diagnostic text, if this error carries one.
    pub fn log(&self) -> Option<&str> {
        match self {
            Self::Compilation { log, .. } | Self::Linking(log) => Some(log),
            Self::Nul { .. } => None,
        }
    }
}

/// What the builder does once a stage fails to compile or the program fails to link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderFailurePolicy {
    /// Release everything built so far and return the error.
    #[default]
    Abort,
    /// Log the failure and hand back the (possibly unlinked) program anyway.
    Continue,
}

/// Built-in sources for the position-only pipeline
pub mod default_shaders {
    pub const VERTEX_SRC: &str = r#"#version 330 core
layout(location = 0) in vec3 aPos;

void main()
{
    gl_Position = vec4(aPos.x, aPos.y, aPos.z, 1.0);
}
"#;

    pub const FRAGMENT_SRC: &str = r#"#version 330 core
out vec4 FragColor;

void main()
{
    FragColor = vec4(1.0f, 0.5f, 0.2f, 1.0f);
}
"#;
}

/// A linked (or, under `ShaderFailurePolicy::Continue`, attempted) program.
#[derive(Debug)]
pub struct ShaderProgram {
    id: GLuint,
    linked: bool,
    diagnostics: Vec<ShaderError>,
}

impl ShaderProgram {
    pub fn new<D: Device>(device: &mut D, policy: ShaderFailurePolicy) -> Result<Self, ShaderError> {
        Self::build(
            device,
            default_shaders::VERTEX_SRC,
            default_shaders::FRAGMENT_SRC,
            policy,
        )
    }

    pub fn build<D: Device>(
        device: &mut D,
        vertex_src: &str,
        fragment_src: &str,
        policy: ShaderFailurePolicy,
    ) -> Result<Self, ShaderError> {
        let vertex_src = CString::new(vertex_src).map_err(|source| ShaderError::Nul {
            stage: ShaderStage::Vertex,
            source,
        })?;
        let fragment_src = CString::new(fragment_src).map_err(|source| ShaderError::Nul {
            stage: ShaderStage::Fragment,
            source,
        })?;

        let mut diagnostics = Vec::new();

        let (vertex_shader, failure) = Self::compile_shader(device, ShaderStage::Vertex, &vertex_src);
        if let Some(err) = failure {
            if policy == ShaderFailurePolicy::Abort {
                device.delete_shader(vertex_shader);
                return Err(err);
            }
            diagnostics.push(err);
        }

        let (fragment_shader, failure) =
            Self::compile_shader(device, ShaderStage::Fragment, &fragment_src);
        if let Some(err) = failure {
            if policy == ShaderFailurePolicy::Abort {
                device.delete_shader(vertex_shader);
                device.delete_shader(fragment_shader);
                return Err(err);
            }
            diagnostics.push(err);
        }

        let program = device.create_program();
        device.attach_shader(program, vertex_shader);
        device.attach_shader(program, fragment_shader);
        device.link_program(program);

        // The program keeps what it needs from the stages.
        device.delete_shader(vertex_shader);
        device.delete_shader(fragment_shader);

        let linked = device.link_status(program);
        if !linked {
            let err = ShaderError::Linking(bound_log(
                device.program_info_log(program, INFO_LOG_CAPACITY),
            ));
            error!("{}", err);
            if policy == ShaderFailurePolicy::Abort {
                device.delete_program(program);
                return Err(err);
            }
            diagnostics.push(err);
        } else {
            info!("Shader program {} linked", program);
        }

        Ok(ShaderProgram {
            id: program,
            linked,
            diagnostics,
        })
    }

    /// Returns the shader handle and, when compilation failed, the reported error.
    fn compile_shader<D: Device>(
        device: &mut D,
        stage: ShaderStage,
        source: &CString,
    ) -> (GLuint, Option<ShaderError>) {
        let shader = device.create_shader(stage);
        device.compile_shader(shader, source);

        if device.compile_status(shader) {
            debug!("{} shader {} compiled", stage, shader);
            return (shader, None);
        }

        let err = ShaderError::Compilation {
            stage,
            log: bound_log(device.shader_info_log(shader, INFO_LOG_CAPACITY)),
        };
        error!("{}", err);
        (shader, Some(err))
    }

    pub fn id(&self) -> GLuint {
        self.id
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Failures recorded under `ShaderFailurePolicy::Continue`, in the order they occurred.
    pub fn diagnostics(&self) -> &[ShaderError] {
        &self.diagnostics
    }

    pub fn set_used<D: Device>(&self, device: &mut D) {
        device.use_program(self.id);
    }

    pub fn destroy<D: Device>(self, device: &mut D) {
        device.delete_program(self.id);
    }
}

/// Clamps a driver log to `INFO_LOG_CAPACITY` bytes on a char boundary and
/// never returns an empty string.
pub fn bound_log(raw: String) -> String {
    let trimmed = raw.trim_end_matches(['\0', '\n', '\r', ' ']);
    if trimmed.is_empty() {
        return EMPTY_LOG_PLACEHOLDER.to_string();
    }

    let mut end = trimmed.len().min(INFO_LOG_CAPACITY);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}
