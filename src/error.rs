//! Engine error taxonomy.
//!
//! Initialization errors (`DeviceUnavailable`, surface/device request errors)
//! are fatal and bubble up through `anyhow` in [`crate::flow::run`]. Per-frame
//! conditions such as `ResourceMissing` are logged and the affected draw is
//! skipped. `DeviceLost` is terminal and requires building a new context.

use crate::data_structures::behavior::BehaviorKind;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no compatible GPU adapter: {0}")]
    DeviceUnavailable(String),
    #[error("{0} was used before its GPU resources were created")]
    ResourceMissing(&'static str),
    #[error("node '{node}' already has a {kind} behavior")]
    DuplicateBehavior { node: String, kind: BehaviorKind },
    #[error("node '{0}' must keep its transform")]
    TransformRequired(String),
    #[error("the GPU device was lost: {0}")]
    DeviceLost(String),
    #[error("invalid mesh payload of {0} floats (whole 8-float vertices, at most u32::MAX)")]
    MalformedMesh(usize),
    #[error(transparent)]
    Surface(#[from] wgpu::SurfaceError),
    #[error(transparent)]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error(transparent)]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
