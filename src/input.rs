//! Keyboard and mouse state for the first-person controls.
//!
//! [`InputState`] is fed raw `winit` events by the run loop and exposes the
//! narrow [`InputSource`] interface the camera controller polls each frame.

use std::collections::HashSet;

use winit::{
    event::{DeviceEvent, ElementState, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::config::InputSettings;

/// What the camera controller needs from an input device.
pub trait InputSource {
    fn is_key_down(&self, key: KeyCode) -> bool;

    /// Mouse movement (already scaled to radians) since the last poll.
    ///
    /// Reading resets the accumulated delta.
    fn poll_mouse_delta(&mut self) -> (f32, f32);
}

#[derive(Debug)]
pub struct InputState {
    keys: HashSet<KeyCode>,
    look_held: bool,
    mouse_delta: (f32, f32),
    settings: InputSettings,
}

impl InputState {
    pub fn new(settings: InputSettings) -> Self {
        Self {
            keys: HashSet::new(),
            look_held: false,
            mouse_delta: (0.0, 0.0),
            settings,
        }
    }

    pub fn press(&mut self, key: KeyCode) {
        self.keys.insert(key);
    }

    pub fn release(&mut self, key: KeyCode) {
        self.keys.remove(&key);
    }

    pub fn set_look_held(&mut self, held: bool) {
        self.look_held = held;
    }

    /// Adds raw pointer motion in pixels. Ignored unless the look button is held.
    pub fn accumulate_motion(&mut self, dx: f64, dy: f64) {
        if !self.look_held {
            return;
        }
        let s = self.settings.mouse_sensitivity;
        self.mouse_delta.0 += dx as f32 * s;
        self.mouse_delta.1 += dy as f32 * s;
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.press(code),
                        ElementState::Released => self.release(code),
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } if *button == self.look_button() => {
                self.set_look_held(state.is_pressed());
            }
            // Losing focus never delivers the matching key-up events.
            WindowEvent::Focused(false) => {
                self.keys.clear();
                self.look_held = false;
            }
            _ => (),
        }
    }

    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.accumulate_motion(*dx, *dy);
        }
    }

    fn look_button(&self) -> MouseButton {
        self.settings.look_button
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new(InputSettings::default())
    }
}

impl InputSource for InputState {
    fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    fn poll_mouse_delta(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.mouse_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_track_press_and_release() {
        let mut input = InputState::default();
        input.press(KeyCode::KeyW);
        assert!(input.is_key_down(KeyCode::KeyW));
        assert!(!input.is_key_down(KeyCode::KeyS));
        input.release(KeyCode::KeyW);
        assert!(!input.is_key_down(KeyCode::KeyW));
    }

    #[test]
    fn motion_only_accumulates_while_looking() {
        let mut input = InputState::default();
        input.accumulate_motion(100.0, 50.0);
        assert_eq!(input.poll_mouse_delta(), (0.0, 0.0));

        input.set_look_held(true);
        input.accumulate_motion(100.0, 50.0);
        input.accumulate_motion(100.0, 0.0);
        let (dx, dy) = input.poll_mouse_delta();
        assert!((dx - 0.4).abs() < 1e-6);
        assert!((dy - 0.1).abs() < 1e-6);
    }

    #[test]
    fn polling_resets_delta() {
        let mut input = InputState::default();
        input.set_look_held(true);
        input.accumulate_motion(10.0, 10.0);
        let _ = input.poll_mouse_delta();
        assert_eq!(input.poll_mouse_delta(), (0.0, 0.0));
    }
}
