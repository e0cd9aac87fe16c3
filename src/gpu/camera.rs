//! Orbit camera for viewing the scene.

use glam::{Mat4, Vec3};

/// Orbit camera with slow automatic rotation.
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Automatic yaw drift in radians per second (the scene's slow spin).
    pub auto_rotate: f32,
}

impl Camera {
    /// Camera framing the default tree.
    pub fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.1,
            distance: 30.0,
            target: Vec3::new(0.0, -1.0, 0.0),
            auto_rotate: 0.08,
        }
    }

    /// Apply auto-rotation for one frame.
    pub fn drift(&mut self, delta: f32) {
        self.yaw += self.auto_rotate * delta;
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
