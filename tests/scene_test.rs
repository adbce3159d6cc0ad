use std::{f32::consts::FRAC_PI_2, time::Duration};

use lumen_ngin::{
    BehaviorKind, Camera, CameraController, EngineError, KeyCode, MeshRenderer, SceneNode,
    Transform, input::InputState, math::Vec3,
};

mod common;
use common::test_utils::{triangle_mesh, triangle_scene};

#[test]
fn frame_update_moves_camera_then_recomputes_matrices() {
    let mut scene = triangle_scene(4.0 / 3.0);
    scene.start();

    let mut input = InputState::default();
    input.press(KeyCode::KeyW);
    let controller = CameraController::new(2.0);

    let camera = scene.camera_mut().unwrap();
    assert_eq!(camera.yaw, -FRAC_PI_2);
    controller.update_camera(camera, &mut input, Duration::from_secs(1));
    scene.update(Duration::from_secs(1));

    let camera = scene.camera().unwrap();
    assert!((camera.position.z - 1.0).abs() < 1e-5);
    // The view now maps the new eye position to the origin.
    let eye = camera.view() * camera.position.extend(1.0);
    assert!(eye.truncate().x.abs() < 1e-5 && eye.truncate().z.abs() < 1e-5);
}

#[test]
fn scene_update_recomputes_every_node_transform() {
    let mut scene = triangle_scene(1.0);
    let node = scene.find_mut("triangle").unwrap();
    node.transform_mut().position = Vec3::new(-1.0, 0.0, 0.0);
    node.transform_mut().rotation.y = 1.0;

    scene.update(Duration::from_millis(16));

    let matrix = *scene.find("triangle").unwrap().transform().matrix();
    assert_eq!(matrix.w.x, -1.0);
    assert!((matrix.x.x - 1.0f32.cos()).abs() < 1e-6);
}

#[test]
fn duplicate_behaviors_leave_the_original_attached() {
    let mut node = SceneNode::new("cube").with_behavior(MeshRenderer::with_color(
        triangle_mesh(),
        [0.0, 1.0, 0.0, 1.0],
    ));

    let err = node
        .add_behavior(MeshRenderer::with_color(triangle_mesh(), [0.0, 0.0, 1.0, 1.0]))
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::DuplicateBehavior {
            kind: BehaviorKind::MeshRenderer,
            ..
        }
    ));
    assert_eq!(node.get::<MeshRenderer>().unwrap().color, [0.0, 1.0, 0.0, 1.0]);

    assert!(node.add_behavior(Transform::new()).is_err());
    assert!(node.remove_behavior(BehaviorKind::Transform).is_err());
    assert!(node.get_behavior(BehaviorKind::Transform).is_some());
}

#[test]
fn looking_around_keeps_pitch_in_range() {
    let mut camera = Camera::new(1.0);
    let mut input = InputState::default();
    input.set_look_held(true);
    let controller = CameraController::default();

    for (dx, dy) in [(0.0, -5_000.0), (300.0, 20_000.0), (-10.0, -1.0)] {
        input.accumulate_motion(dx, dy);
        controller.update_camera(&mut camera, &mut input, Duration::from_millis(16));
        camera.update_view_proj();
        assert!(camera.pitch.abs() <= FRAC_PI_2 - 0.01 + f32::EPSILON);
        assert!(!camera.forward().x.is_nan());
    }
}

#[test]
fn scene_destroy_without_gpu_resources_is_harmless() {
    let mut scene = triangle_scene(1.0);
    scene.start();
    scene.destroy();
    let node = scene.find("triangle").unwrap();
    assert!(node.get::<MeshRenderer>().unwrap().vertex_buffer().is_none());
}
