use crate::render::device::{BufferTarget, Device};
use gl::types::*;
use glam::Vec3;
use log::debug;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("Mesh has no vertices")]
    Empty,
    #[error("Non-indexed mesh needs a multiple of 3 vertices, got {0}")]
    VertexCount(usize),
    #[error("Index list length must be a multiple of 3, got {0}")]
    IndexCount(usize),
    #[error("Index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
    #[error("Mesh too large to draw in one call: {0} elements")]
    TooLarge(usize),
}

/// How raw vertex bytes map onto one shader input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout {
    pub index: GLuint,
    pub components: GLint,
    pub stride: GLsizei,
    pub offset: usize,
    pub normalized: bool,
}

impl VertexLayout {
    /// `layout(location = 0) in vec3 aPos`, tightly packed.
    pub const POSITION: Self = Self {
        index: 0,
        components: 3,
        stride: (3 * std::mem::size_of::<f32>()) as GLsizei,
        offset: 0,
        normalized: false,
    };
}

/// A single triangle-list draw, sized from the uploaded data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCommand {
    Arrays { first: GLint, count: GLsizei },
    Elements { count: GLsizei },
}

impl DrawCommand {
    pub fn count(&self) -> usize {
        match *self {
            Self::Arrays { count, .. } | Self::Elements { count } => count as usize,
        }
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self, Self::Elements { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vec3>,
    pub indices: Option<Vec<u32>>,
}

impl MeshData {
    pub fn new(vertices: Vec<Vec3>) -> Self {
        Self {
            vertices,
            indices: None,
        }
    }

    pub fn with_indices(vertices: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices: Some(indices),
        }
    }

    pub fn triangle() -> Self {
        Self::new(vec![
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.0, 0.5, 0.0),
            Vec3::new(0.5, -0.5, 0.0),
        ])
    }

    /// Unit-scaled square split along the top-right to bottom-left diagonal.
    pub fn rectangle() -> Self {
        Self::with_indices(
            vec![
                Vec3::new(-0.5, 0.5, 0.0),
                Vec3::new(0.5, 0.5, 0.0),
                Vec3::new(-0.5, -0.5, 0.0),
                Vec3::new(0.5, -0.5, 0.0),
            ],
            vec![0, 1, 2, 1, 2, 3],
        )
    }

    /// Checks the data and returns the draw that covers all of it.
    pub fn draw_command(&self) -> Result<DrawCommand, GeometryError> {
        if self.vertices.is_empty() {
            return Err(GeometryError::Empty);
        }

        match &self.indices {
            Some(indices) => {
                if indices.is_empty() || indices.len() % 3 != 0 {
                    return Err(GeometryError::IndexCount(indices.len()));
                }
                if let Some(&index) = indices
                    .iter()
                    .find(|&&index| index as usize >= self.vertices.len())
                {
                    return Err(GeometryError::IndexOutOfRange {
                        index,
                        vertex_count: self.vertices.len(),
                    });
                }
                let count = GLsizei::try_from(indices.len())
                    .map_err(|_| GeometryError::TooLarge(indices.len()))?;
                Ok(DrawCommand::Elements { count })
            }
            None => {
                if self.vertices.len() % 3 != 0 {
                    return Err(GeometryError::VertexCount(self.vertices.len()));
                }
                let count = GLsizei::try_from(self.vertices.len())
                    .map_err(|_| GeometryError::TooLarge(self.vertices.len()))?;
                Ok(DrawCommand::Arrays { first: 0, count })
            }
        }
    }

    /// Triangles in draw order, after index resolution.
    pub fn triangles(&self) -> Vec<[Vec3; 3]> {
        match &self.indices {
            Some(indices) => indices
                .chunks_exact(3)
                .map(|tri| {
                    [
                        self.vertices[tri[0] as usize],
                        self.vertices[tri[1] as usize],
                        self.vertices[tri[2] as usize],
                    ]
                })
                .collect(),
            None => self
                .vertices
                .chunks_exact(3)
                .map(|tri| [tri[0], tri[1], tri[2]])
                .collect(),
        }
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> Option<&[u8]> {
        self.indices
            .as_deref()
            .map(|indices| bytemuck::cast_slice(indices))
    }
}

/// GPU-resident geometry: vertex array, vertex buffer, optional index buffer.
#[derive(Debug)]
pub struct Mesh {
    vao: GLuint,
    vbo: GLuint,
    ebo: Option<GLuint>,
    layout: VertexLayout,
    draw: DrawCommand,
}

impl Mesh {
    pub fn upload<D: Device>(device: &mut D, data: &MeshData) -> Result<Self, GeometryError> {
        let draw = data.draw_command()?;
        let layout = VertexLayout::POSITION;

        let vao = device.create_vertex_array();
        device.bind_vertex_array(vao);

        let vbo = device.create_buffer();
        device.buffer_data(BufferTarget::Vertex, vbo, data.vertex_bytes());

        // The element binding is captured by the bound vertex array.
        let ebo = data.index_bytes().map(|bytes| {
            let ebo = device.create_buffer();
            device.buffer_data(BufferTarget::Index, ebo, bytes);
            ebo
        });

        device.vertex_attrib_pointer(&layout);
        device.bind_vertex_array(0);

        debug!(
            "Uploaded mesh vao={} ({} vertices, {:?})",
            vao,
            data.vertices.len(),
            draw
        );

        Ok(Self {
            vao,
            vbo,
            ebo,
            layout,
            draw,
        })
    }

    pub fn vao(&self) -> GLuint {
        self.vao
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    pub fn draw_command(&self) -> DrawCommand {
        self.draw
    }

    pub fn draw<D: Device>(&self, device: &mut D) {
        device.bind_vertex_array(self.vao);
        device.draw(self.draw);
    }

    pub fn destroy<D: Device>(self, device: &mut D) {
        device.delete_vertex_array(self.vao);
        device.delete_buffer(self.vbo);
        if let Some(ebo) = self.ebo {
            device.delete_buffer(ebo);
        }
    }
}
