//! Render pipelines and the bookkeeping that ties bind groups to them.
//!
//! Every pipeline rebuild gets a fresh [`PipelineGeneration`]. Bind groups
//! remember the generation they were created against, so a resource can tell
//! whether it must be rebound before the next draw.

pub mod basic;

use crate::{context::Context, error::Result};

/// Monotonic counter identifying one build of the render pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PipelineGeneration(u64);

impl PipelineGeneration {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// The pipeline plus the per-build layouts resources bind against.
#[derive(Debug)]
pub struct Pipeline {
    pub render_pipeline: wgpu::RenderPipeline,
    /// Group 0: camera and light uniform.
    pub camera_layout: wgpu::BindGroupLayout,
    /// Group 1: model matrix and colour of one object.
    pub object_layout: wgpu::BindGroupLayout,
    generation: PipelineGeneration,
}

impl Pipeline {
    pub fn generation(&self) -> PipelineGeneration {
        self.generation
    }
}

/// Where a GPU resource stands relative to the current pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceState {
    /// No buffers yet.
    Uninitialized,
    /// Buffers and bind group created against this generation, never rebound.
    Created(PipelineGeneration),
    /// Bind group was built for an older pipeline.
    Stale(PipelineGeneration),
    /// Buffers kept from an earlier generation, bind group rebuilt for this one.
    Rebound(PipelineGeneration),
}

impl ResourceState {
    pub fn is_drawable(self) -> bool {
        matches!(self, ResourceState::Created(_) | ResourceState::Rebound(_))
    }
}

/// A bind group and the pipeline generations it has seen.
#[derive(Debug)]
pub struct Binding {
    pub bind_group: wgpu::BindGroup,
    created_at: PipelineGeneration,
    bound_at: PipelineGeneration,
}

impl Binding {
    pub fn new(bind_group: wgpu::BindGroup, generation: PipelineGeneration) -> Self {
        Self {
            bind_group,
            created_at: generation,
            bound_at: generation,
        }
    }

    pub fn rebind(&mut self, bind_group: wgpu::BindGroup, generation: PipelineGeneration) {
        self.bind_group = bind_group;
        self.bound_at = generation;
    }

    pub fn state(&self, current: PipelineGeneration) -> ResourceState {
        if self.bound_at != current {
            ResourceState::Stale(self.bound_at)
        } else if self.bound_at == self.created_at {
            ResourceState::Created(current)
        } else {
            ResourceState::Rebound(current)
        }
    }
}

/// A behavior that owns GPU buffers and a bind group.
///
/// Buffers are created exactly once; pipeline rebuilds only replace the
/// bind group.
pub trait GpuResource {
    const LABEL: &'static str;

    /// Allocates buffers and the first bind group.
    fn create_buffers(&mut self, ctx: &Context, pipeline: &Pipeline);

    /// Rebuilds the bind group against `pipeline`, keeping the existing buffers.
    fn recreate_bind_group(&mut self, ctx: &Context, pipeline: &Pipeline) -> Result<()>;

    fn binding(&self) -> Option<&Binding>;

    fn resource_state(&self, current: PipelineGeneration) -> ResourceState {
        self.binding()
            .map_or(ResourceState::Uninitialized, |b| b.state(current))
    }

    /// Brings the resource up to date with `pipeline`, creating or rebinding as needed.
    fn prepare(&mut self, ctx: &Context, pipeline: &Pipeline) -> Result<()> {
        match self.resource_state(pipeline.generation()) {
            ResourceState::Uninitialized => {
                self.create_buffers(ctx, pipeline);
                Ok(())
            }
            ResourceState::Stale(_) => self.recreate_bind_group(ctx, pipeline),
            ResourceState::Created(_) | ResourceState::Rebound(_) => Ok(()),
        }
    }
}
