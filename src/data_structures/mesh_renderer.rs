//! Draws a shared mesh with a per-object model matrix and colour.

use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::{
    context::Context,
    data_structures::{behavior::Behave, mesh::Mesh, scene_graph::NodeId},
    error::{EngineError, Result},
    math::{Mat4, mat4, to_cols},
    pipelines::{Binding, GpuResource, Pipeline, PipelineGeneration},
};

/// Group 1 uniform block.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl ObjectUniform {
    pub fn new(model: &Mat4, color: [f32; 4]) -> Self {
        Self {
            model: to_cols(model),
            color,
        }
    }
}

#[derive(Debug)]
struct MeshGpu {
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    binding: Binding,
}

#[derive(Debug)]
pub struct MeshRenderer {
    mesh: Arc<Mesh>,
    pub color: [f32; 4],
    gpu: Option<MeshGpu>,
    pub(crate) owner: Option<NodeId>,
}

impl MeshRenderer {
    /// Opaque white.
    pub fn new(mesh: Arc<Mesh>) -> Self {
        Self::with_color(mesh, [1.0, 1.0, 1.0, 1.0])
    }

    pub fn with_color(mesh: Arc<Mesh>, color: [f32; 4]) -> Self {
        Self {
            mesh,
            color,
            gpu: None,
            owner: None,
        }
    }

    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    /// Uploads the model matrix and colour for this frame.
    pub fn update_uniform_buffer(&self, ctx: &Context, model: &Mat4) -> Result<()> {
        let gpu = self.gpu.as_ref().ok_or(EngineError::ResourceMissing(Self::LABEL))?;
        let uniform = ObjectUniform::new(model, self.color);
        ctx.queue
            .write_buffer(&gpu.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
        Ok(())
    }

    pub fn vertex_buffer(&self) -> Option<&wgpu::Buffer> {
        self.gpu.as_ref().map(|gpu| &gpu.vertex_buffer)
    }

    /// Vertex buffer and bind group, if both are usable with `generation`.
    pub fn drawable(
        &self,
        generation: PipelineGeneration,
    ) -> Option<(&wgpu::Buffer, &wgpu::BindGroup)> {
        let gpu = self.gpu.as_ref()?;
        gpu.binding
            .state(generation)
            .is_drawable()
            .then_some((&gpu.vertex_buffer, &gpu.binding.bind_group))
    }

    fn create_bind_group(
        ctx: &Context,
        pipeline: &Pipeline,
        uniform_buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("object_bind_group"),
            layout: &pipeline.object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        })
    }
}

impl GpuResource for MeshRenderer {
    const LABEL: &'static str = "MeshRenderer";

    fn create_buffers(&mut self, ctx: &Context, pipeline: &Pipeline) {
        if self.gpu.is_some() {
            log::debug!("Mesh buffers already exist; not allocating another set");
            return;
        }
        // COPY_SRC lets the vertex data be read back to verify it survives resizes.
        let vertex_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: self.mesh.as_bytes(),
                usage: wgpu::BufferUsages::VERTEX
                    | wgpu::BufferUsages::COPY_DST
                    | wgpu::BufferUsages::COPY_SRC,
            });
        let uniform = ObjectUniform::new(&mat4::identity(), self.color);
        let uniform_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Object Uniform Buffer"),
                contents: bytemuck::cast_slice(&[uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let bind_group = Self::create_bind_group(ctx, pipeline, &uniform_buffer);
        self.gpu = Some(MeshGpu {
            vertex_buffer,
            uniform_buffer,
            binding: Binding::new(bind_group, pipeline.generation()),
        });
    }

    fn recreate_bind_group(&mut self, ctx: &Context, pipeline: &Pipeline) -> Result<()> {
        let gpu = self.gpu.as_mut().ok_or(EngineError::ResourceMissing(Self::LABEL))?;
        let bind_group = Self::create_bind_group(ctx, pipeline, &gpu.uniform_buffer);
        gpu.binding.rebind(bind_group, pipeline.generation());
        Ok(())
    }

    fn binding(&self) -> Option<&Binding> {
        self.gpu.as_ref().map(|gpu| &gpu.binding)
    }
}

impl Behave for MeshRenderer {
    fn destroy(&mut self) {
        if let Some(gpu) = self.gpu.take() {
            gpu.vertex_buffer.destroy();
            gpu.uniform_buffer.destroy();
        }
    }
}
