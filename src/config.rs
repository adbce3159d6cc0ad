//! Runtime settings for the run loop.
//!
//! Everything here has a sensible default; callers override individual fields
//! with struct update syntax:
//!
//! ```
//! let settings = lumen_ngin::config::Settings {
//!     title: "demo".into(),
//!     ..Default::default()
//! };
//! assert_eq!(settings.width, 800);
//! ```

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use winit::event::MouseButton;

use crate::math::Vec3;

#[derive(Clone, Debug)]
pub struct Settings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub clear_colour: wgpu::Color,
    pub vsync: bool,
    /// Path of the WGSL source, relative to `./assets`.
    pub shader: String,
    pub camera: CameraSettings,
    pub input: InputSettings,
}

#[derive(Clone, Debug)]
pub struct CameraSettings {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Where the camera starts.
    pub position: Vec3,
    /// Starting yaw in radians; -π/2 looks down -Z.
    pub yaw: f32,
    /// Starting pitch in radians, clamped to the camera's pitch limit.
    pub pitch: f32,
    /// World units per second.
    pub speed: f32,
}

#[derive(Clone, Debug)]
pub struct InputSettings {
    /// Radians of yaw/pitch per pixel of mouse movement.
    pub mouse_sensitivity: f32,
    /// Mouse motion only turns the camera while this button is held.
    pub look_button: MouseButton,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: "lumen-ngin".to_string(),
            width: 800,
            height: 600,
            clear_colour: wgpu::Color {
                r: 0.1,
                g: 0.1,
                b: 0.1,
                a: 1.0,
            },
            vsync: true,
            shader: "shaders/basic.wgsl".to_string(),
            camera: CameraSettings::default(),
            input: InputSettings::default(),
        }
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_y: FRAC_PI_4,
            near: 0.1,
            far: 100.0,
            position: Vec3::new(0.0, 0.0, 3.0),
            yaw: -FRAC_PI_2,
            pitch: 0.0,
            speed: 2.0,
        }
    }
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 0.002,
            look_button: MouseButton::Left,
        }
    }
}
