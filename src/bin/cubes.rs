//! Three spinning cubes. WASD/QE to move, hold the left mouse button to look around.

use std::sync::Arc;

use instant::Duration;
use lumen_ngin::{
    MeshRenderer, Scene, SceneNode,
    config::Settings,
    data_structures::mesh::Mesh,
    flow::{self, SceneFlow},
    math::Vec3,
};

const HALF: f32 = 0.35;

/// Six faces, two triangles each, as interleaved position/normal/uv.
fn cube_vertices() -> Vec<f32> {
    // (normal, tangent u, tangent v) per face
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];
    let corners = [
        (-1.0, -1.0),
        (1.0, -1.0),
        (1.0, 1.0),
        (-1.0, -1.0),
        (1.0, 1.0),
        (-1.0, 1.0),
    ];

    let mut data = Vec::with_capacity(faces.len() * corners.len() * 8);
    for (n, u, v) in faces {
        for (su, sv) in corners {
            for axis in 0..3 {
                data.push((n[axis] + su * u[axis] + sv * v[axis]) * HALF);
            }
            data.extend_from_slice(&n);
            data.extend_from_slice(&[(su + 1.0) / 2.0, (1.0 - sv) / 2.0]);
        }
    }
    data
}

struct Cubes {
    mesh: Arc<Mesh>,
}

impl SceneFlow for Cubes {
    fn on_init(&mut self, scene: &mut Scene) {
        let cubes = [
            ("red", Vec3::new(-1.0, 0.0, 0.0), [1.0, 0.2, 0.2, 1.0]),
            ("green", Vec3::new(1.0, 0.0, 0.0), [0.2, 1.0, 0.2, 1.0]),
            ("blue", Vec3::new(0.0, 0.0, -1.0), [0.2, 0.4, 1.0, 1.0]),
        ];
        for (name, position, color) in cubes {
            scene.add(
                SceneNode::with_position(name, position)
                    .with_behavior(MeshRenderer::with_color(self.mesh.clone(), color)),
            );
        }
    }

    fn on_update(&mut self, scene: &mut Scene, _dt: Duration, elapsed: Duration) {
        let t = elapsed.as_secs_f32();
        let spins = [("red", 1.0, 0.0), ("green", 0.0, 0.7), ("blue", 0.5, 1.2)];
        for (name, yaw_rate, pitch_rate) in spins {
            if let Some(node) = scene.find_mut(name) {
                let rotation = &mut node.transform_mut().rotation;
                rotation.y = t * yaw_rate;
                rotation.x = t * pitch_rate;
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let mesh = Arc::new(Mesh::from_interleaved(&cube_vertices())?);
    let settings = Settings {
        title: "lumen-ngin cubes".into(),
        ..Default::default()
    };
    flow::run(settings, Cubes { mesh })
}
