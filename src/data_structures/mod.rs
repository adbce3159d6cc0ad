//! Engine data structures: scene nodes, behaviors and the GPU-facing data they own.
//!
//! - `scene_graph` holds nodes and the scene container
//! - `behavior` is the closed set of attachable behaviors and their lifecycle hooks
//! - `transform`, `camera` and `mesh_renderer` are the behavior kinds
//! - `mesh` is shared, immutable vertex data
//! - `texture` wraps GPU textures (depth buffer, placeholder)

pub mod behavior;
pub mod camera;
pub mod mesh;
pub mod mesh_renderer;
pub mod scene_graph;
pub mod texture;
pub mod transform;
