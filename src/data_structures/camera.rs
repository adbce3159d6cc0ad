//! First-person camera, its GPU uniform and the keyboard/mouse controller.
//!
//! The camera keeps yaw and pitch as the source of truth and derives the
//! basis vectors and matrices from them in [`Camera::update_view_proj`]. The
//! scene update calls that through the `update` hook each frame, after the
//! controller has moved and turned the camera.

use std::{f32::consts::FRAC_PI_2, time::Duration};

use wgpu::util::DeviceExt;
use winit::keyboard::KeyCode;

use crate::{
    config::CameraSettings,
    context::Context,
    data_structures::{behavior::Behave, scene_graph::NodeId},
    error::{EngineError, Result},
    input::InputSource,
    math::{Mat4, Vec3, mat4, to_cols, vec3},
    pipelines::{Binding, GpuResource, Pipeline},
};

/// Pitch is kept just short of straight up/down so the view basis never degenerates.
pub const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// Point light and material parameters shared by every object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
    pub ambient: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec3::new(1.0, 1.0, 1.0),
            color: Vec3::new(1.0, 1.0, 1.0),
            ambient: Vec3::new(0.1, 0.1, 0.1),
            specular: Vec3::new(1.0, 1.0, 1.0),
            shininess: 32.0,
        }
    }
}

/// Group 0 uniform block. Every vec3 is padded out to 16 bytes.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 3],
    _padding0: f32,
    pub light_position: [f32; 3],
    _padding1: f32,
    pub light_color: [f32; 3],
    _padding2: f32,
    pub ambient_color: [f32; 3],
    _padding3: f32,
    pub specular_color: [f32; 3],
    _padding4: f32,
    pub shininess: f32,
    _padding5: [f32; 3],
}

#[derive(Debug)]
struct CameraGpu {
    buffer: wgpu::Buffer,
    binding: Binding,
}

#[derive(Debug)]
pub struct Camera {
    pub position: Vec3,
    /// Radians; -π/2 looks down -Z.
    pub yaw: f32,
    pub pitch: f32,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    aspect: f32,
    projection: Mat4,
    view: Mat4,
    view_proj: Mat4,
    pub light: Light,
    gpu: Option<CameraGpu>,
    pub(crate) owner: Option<NodeId>,
}

impl Camera {
    /// A camera at (0, 0, 3) looking down -Z.
    pub fn new(aspect: f32) -> Self {
        Self::with_settings(&CameraSettings::default(), aspect)
    }

    pub fn with_settings(settings: &CameraSettings, aspect: f32) -> Self {
        let mut camera = Self {
            position: settings.position,
            yaw: settings.yaw,
            pitch: settings.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            forward: Vec3::new(0.0, 0.0, -1.0),
            right: Vec3::new(1.0, 0.0, 0.0),
            up: vec3::WORLD_UP,
            fov_y: settings.fov_y,
            near: settings.near,
            far: settings.far,
            aspect: sanitize_aspect(aspect),
            projection: mat4::identity(),
            view: mat4::identity(),
            view_proj: mat4::identity(),
            light: Light::default(),
            gpu: None,
            owner: None,
        };
        camera.update_view_proj();
        camera
    }

    /// Turns the camera by a yaw/pitch delta in radians. Positive `dy` looks down.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx;
        self.pitch = (self.pitch - dy).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Rebuilds the projection, basis vectors, view and view-projection from the
    /// current state.
    pub fn update_view_proj(&mut self) {
        self.update_projection();

        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let direction = Vec3::new(cos_yaw * cos_pitch, sin_pitch, sin_yaw * cos_pitch);
        let target = self.position + direction;

        self.forward = vec3::normalize(target - self.position);
        // Derived from world up rather than the previous frame's up so roll cannot creep in.
        self.right = vec3::normalize(vec3::cross(self.forward, vec3::WORLD_UP));
        self.up = vec3::normalize(vec3::cross(self.right, self.forward));

        self.view = mat4::look_at(self.position, target, self.up);
        self.view_proj = mat4::multiply(&self.projection, &self.view);
    }

    /// Applies a new output aspect ratio. Non-finite or non-positive values are ignored.
    pub fn set_aspect(&mut self, aspect: f32) {
        if !(aspect.is_finite() && aspect > 0.0) {
            log::warn!("Ignoring invalid camera aspect ratio {aspect}");
            return;
        }
        self.aspect = aspect;
        self.update_view_proj();
    }

    fn update_projection(&mut self) {
        self.projection = mat4::perspective(self.fov_y, self.aspect, self.near, self.far);
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    pub fn view_proj(&self) -> &Mat4 {
        &self.view_proj
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: to_cols(&self.view_proj),
            position: self.position.into(),
            _padding0: 0.0,
            light_position: self.light.position.into(),
            _padding1: 0.0,
            light_color: self.light.color.into(),
            _padding2: 0.0,
            ambient_color: self.light.ambient.into(),
            _padding3: 0.0,
            specular_color: self.light.specular.into(),
            _padding4: 0.0,
            shininess: self.light.shininess,
            _padding5: [0.0; 3],
        }
    }

    /// Uploads the current uniform block.
    pub fn write_uniform(&self, ctx: &Context) -> Result<()> {
        let gpu = self.gpu.as_ref().ok_or(EngineError::ResourceMissing(Self::LABEL))?;
        ctx.queue
            .write_buffer(&gpu.buffer, 0, bytemuck::cast_slice(&[self.uniform()]));
        Ok(())
    }

    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu.as_ref().map(|gpu| &gpu.binding.bind_group)
    }

    fn create_bind_group(
        ctx: &Context,
        pipeline: &Pipeline,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &pipeline.camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        })
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 }
}

impl GpuResource for Camera {
    const LABEL: &'static str = "Camera";

    fn create_buffers(&mut self, ctx: &Context, pipeline: &Pipeline) {
        if self.gpu.is_some() {
            log::debug!("Camera buffer already exists; not allocating another");
            return;
        }
        let buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Buffer"),
                contents: bytemuck::cast_slice(&[self.uniform()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let bind_group = Self::create_bind_group(ctx, pipeline, &buffer);
        self.gpu = Some(CameraGpu {
            buffer,
            binding: Binding::new(bind_group, pipeline.generation()),
        });
    }

    fn recreate_bind_group(&mut self, ctx: &Context, pipeline: &Pipeline) -> Result<()> {
        let gpu = self.gpu.as_mut().ok_or(EngineError::ResourceMissing(Self::LABEL))?;
        let bind_group = Self::create_bind_group(ctx, pipeline, &gpu.buffer);
        gpu.binding.rebind(bind_group, pipeline.generation());
        Ok(())
    }

    fn binding(&self) -> Option<&Binding> {
        self.gpu.as_ref().map(|gpu| &gpu.binding)
    }
}

impl Behave for Camera {
    fn update(&mut self, _dt: Duration) {
        self.update_view_proj();
    }

    fn destroy(&mut self) {
        if let Some(gpu) = self.gpu.take() {
            gpu.buffer.destroy();
        }
    }
}

/// WASD + QE movement and mouse look.
#[derive(Clone, Copy, Debug)]
pub struct CameraController {
    /// World units per second.
    pub speed: f32,
}

impl CameraController {
    pub fn new(speed: f32) -> Self {
        Self { speed }
    }

    /// Moves along the camera's current basis and applies the polled mouse delta.
    ///
    /// Matrices are left for [`Camera::update_view_proj`] to rebuild.
    pub fn update_camera(&self, camera: &mut Camera, input: &mut impl InputSource, dt: Duration) {
        let step = self.speed * dt.as_secs_f32();
        let forward = camera.forward * step;
        let right = camera.right * step;
        let vertical = vec3::WORLD_UP * step;

        if input.is_key_down(KeyCode::KeyW) {
            camera.position += forward;
        }
        if input.is_key_down(KeyCode::KeyS) {
            camera.position -= forward;
        }
        if input.is_key_down(KeyCode::KeyD) {
            camera.position += right;
        }
        if input.is_key_down(KeyCode::KeyA) {
            camera.position -= right;
        }
        if input.is_key_down(KeyCode::KeyQ) {
            camera.position += vertical;
        }
        if input.is_key_down(KeyCode::KeyE) {
            camera.position -= vertical;
        }

        let (dx, dy) = input.poll_mouse_delta();
        if dx != 0.0 || dy != 0.0 {
            camera.rotate(dx, dy);
        }
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(CameraSettings::default().speed)
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Vector4};

    use super::*;
    use crate::input::InputState;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-5, "{a} != {b}");
    }

    fn assert_vec_close(a: Vec3, b: Vec3) {
        assert!((a - b).magnitude() < 1e-5, "{a:?} != {b:?}");
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        let camera = Camera::new(1.0);
        assert_vec_close(camera.forward(), Vec3::new(0.0, 0.0, -1.0));
        assert_vec_close(camera.right(), Vec3::new(1.0, 0.0, 0.0));
        assert_vec_close(camera.up(), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn holding_w_for_one_second_moves_two_units() {
        let mut camera = Camera::new(1.0);
        let mut input = InputState::default();
        input.press(KeyCode::KeyW);

        CameraController::new(2.0).update_camera(&mut camera, &mut input, Duration::from_secs(1));
        camera.update_view_proj();

        assert_close(camera.position.z, 1.0);
        assert_close(camera.position.x, 0.0);
    }

    #[test]
    fn strafe_and_vertical_keys() {
        let mut camera = Camera::new(1.0);
        let mut input = InputState::default();
        input.press(KeyCode::KeyD);
        input.press(KeyCode::KeyQ);

        CameraController::new(1.0).update_camera(
            &mut camera,
            &mut input,
            Duration::from_millis(500),
        );

        assert_vec_close(camera.position, Vec3::new(0.5, 0.5, 3.0));
    }

    #[test]
    fn pitch_stays_clamped() {
        let mut camera = Camera::new(1.0);
        for dy in [-10.0, 0.3, -0.2, -50.0] {
            camera.rotate(0.0, dy);
            assert!(camera.pitch.abs() <= PITCH_LIMIT);
        }
        assert_eq!(camera.pitch, PITCH_LIMIT);
        camera.rotate(0.0, 100.0);
        assert_eq!(camera.pitch, -PITCH_LIMIT);
        camera.update_view_proj();
        assert!(camera.forward().y < 0.0);
        assert!(!camera.view().x.x.is_nan());
    }

    #[test]
    fn up_stays_orthogonal_after_many_turns() {
        let mut camera = Camera::new(1.0);
        for _ in 0..1000 {
            camera.rotate(0.013, -0.007);
            camera.update_view_proj();
        }
        assert_close(camera.right().y, 0.0);
        assert_close(camera.up().dot(camera.forward()), 0.0);
        assert_close(camera.up().magnitude(), 1.0);
    }

    #[test]
    fn view_proj_puts_target_in_front() {
        let camera = Camera::new(16.0 / 9.0);
        let clip = camera.view_proj() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert_close(ndc.x, 0.0);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn projection_follows_changed_parameters() {
        let mut camera = Camera::new(1.0);
        camera.fov_y = FRAC_PI_2;
        camera.far = 10.0;
        camera.update(Duration::from_millis(16));

        let expected = mat4::perspective(FRAC_PI_2, 1.0, camera.near, 10.0);
        assert_eq!(*camera.projection(), expected);
        assert_close(camera.projection()[1][1], 1.0);
        let view_proj = mat4::multiply(&expected, camera.view());
        assert_eq!(*camera.view_proj(), view_proj);
    }

    #[test]
    fn settings_choose_the_start_pose() {
        let settings = CameraSettings {
            position: Vec3::new(1.0, 2.0, 5.0),
            yaw: 0.0,
            pitch: 10.0,
            ..Default::default()
        };
        let camera = Camera::with_settings(&settings, 1.0);
        assert_vec_close(camera.position, Vec3::new(1.0, 2.0, 5.0));
        assert_eq!(camera.pitch, PITCH_LIMIT);
        assert!(camera.forward().x > 0.0);
    }

    #[test]
    fn set_aspect_ignores_zero() {
        let mut camera = Camera::new(2.0);
        camera.set_aspect(0.0);
        assert_eq!(camera.aspect(), 2.0);
        camera.set_aspect(0.5);
        assert_eq!(camera.aspect(), 0.5);
    }

    #[test]
    fn uniform_block_is_160_bytes() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 160);
        let uniform = Camera::new(1.0).uniform();
        assert_eq!(uniform.position, [0.0, 0.0, 3.0]);
        assert_eq!(uniform.shininess, 32.0);
    }

    #[test]
    fn camera_without_gpu_is_uninitialized() {
        let camera = Camera::new(1.0);
        assert_eq!(
            camera.resource_state(Default::default()),
            crate::pipelines::ResourceState::Uninitialized
        );
        assert!(camera.bind_group().is_none());
    }
}
