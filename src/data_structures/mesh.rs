//! Immutable vertex data.

use crate::error::{EngineError, Result};

/// Trait for types that describe their own vertex buffer layout.
pub trait VertexLayout {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// One interleaved vertex: position, normal and texture coordinate.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    /// Floats per vertex in the flat payload format.
    pub const FLOATS: usize = 8;
    pub const STRIDE: wgpu::BufferAddress = std::mem::size_of::<Vertex>() as wgpu::BufferAddress;
}

impl VertexLayout for Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: Vertex::STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Geometry drawn as a non-indexed triangle list.
///
/// Meshes never change after construction and are shared between renderers
/// behind an `Arc`.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    vertex_count: u32,
}

/// Draw calls address vertices with a `u32`.
fn checked_vertex_count(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| EngineError::MalformedMesh(len.saturating_mul(Vertex::FLOATS)))
}

impl Mesh {
    /// Fails with `MalformedMesh` when there are more vertices than a `u32` can count.
    pub fn new(vertices: Vec<Vertex>) -> Result<Self> {
        let vertex_count = checked_vertex_count(vertices.len())?;
        Ok(Self {
            vertices,
            vertex_count,
        })
    }

    /// Builds a mesh from a flat `[px, py, pz, nx, ny, nz, u, v, ...]` payload.
    pub fn from_interleaved(data: &[f32]) -> Result<Self> {
        if data.len() % Vertex::FLOATS != 0 {
            return Err(EngineError::MalformedMesh(data.len()));
        }
        let vertices = data
            .chunks_exact(Vertex::FLOATS)
            .map(|v| Vertex {
                position: [v[0], v[1], v[2]],
                normal: [v[3], v[4], v[5]],
                uv: [v[6], v[7]],
            })
            .collect();
        Self::new(vertices)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Raw bytes as uploaded to the vertex buffer.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}
