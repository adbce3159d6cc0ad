//! lumen-ngin
//!
//! A minimal real-time 3D engine on `wgpu`. Scenes are built from nodes that
//! carry typed behaviors (a transform, a camera, a mesh renderer); a single
//! lit pipeline draws them each frame from a first-person camera driven by
//! keyboard and mouse.
//!
//! High-level modules
//! - `math`: vector and matrix helpers on top of `cgmath`
//! - `data_structures`: scene nodes, behaviors, meshes and textures
//! - `context`: adapter, device, queue and output target
//! - `pipelines`: the render pipeline and bind-group generation tracking
//! - `render`: the renderer that owns the pipeline and encodes frames
//! - `input`: keyboard and mouse state for the camera controller
//! - `flow`: window creation and the per-frame run loop
//! - `config`, `error`, `resources`: settings, error types and asset loading
//!

pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod input;
pub mod math;
pub mod pipelines;
pub mod render;
pub mod resources;

pub use data_structures::{
    behavior::{Behave, Behavior, BehaviorKind},
    camera::{Camera, CameraController},
    mesh::{Mesh, Vertex},
    mesh_renderer::MeshRenderer,
    scene_graph::{NodeId, Scene, SceneNode},
    transform::Transform,
};
pub use error::EngineError;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use wgpu;
pub use winit::event::{DeviceEvent, WindowEvent};
pub use winit::keyboard::KeyCode;
