//! Virtual camera and the matrices derived from it
//!
//! The camera looks down -Z in its own space. Rotation is three Euler angles
//! in radians; `view_matrix` undoes them in `Rz * Ry * Rx` order after
//! moving the world so the camera sits at the origin.

use core::fmt;

use crate::math::{deg_to_rad, rad_to_deg};
use crate::matrix::Matrix4;
use crate::vector::Vector3;

/// World-to-camera transform: `Rxyz(-rx, -ry, -rz) * T(-position)`
pub fn view_matrix(position: Vector3, rotation: (f32, f32, f32)) -> Matrix4 {
    let (rx, ry, rz) = rotation;
    let rot = Matrix4::from_rotation_xyz(-rx, -ry, -rz);
    let trans = Matrix4::from_translation(-position.x, -position.y, -position.z);
    rot.multiply(&trans)
}

/// Right-handed OpenGL-style perspective projection (`fov` in degrees).
///
/// Maps view-space depth `-near..-far` to NDC `-1..1`.
pub fn perspective_matrix(fov: f32, aspect: f32, near: f32, far: f32) -> Matrix4 {
    let tan_half_fov = libm::tanf(deg_to_rad(fov) / 2.0);
    let mut m = Matrix4::ZERO;
    m.m[0][0] = 1.0 / (aspect * tan_half_fov);
    m.m[1][1] = 1.0 / tan_half_fov;
    m.m[2][2] = -(far + near) / (far - near);
    m.m[2][3] = -(2.0 * far * near) / (far - near);
    m.m[3][2] = -1.0;
    m.m[3][3] = 0.0;
    m
}

/// Scene camera, owned by the session and mutated between frames
#[derive(Debug, Clone, PartialEq)]
pub struct Camera3D {
    pub position: Vector3,
    /// Euler angles `(rx, ry, rz)` in radians
    pub rotation: (f32, f32, f32),
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera3D {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 10.0),
            rotation: (0.0, 0.0, 0.0),
            fov: 60.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera3D {
    pub fn new(position: Vector3, rotation: (f32, f32, f32), fov: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            rotation,
            fov,
            near,
            far,
        }
    }

    pub fn set_position(&mut self, position: Vector3) {
        self.position = position;
    }

    pub fn set_rotation(&mut self, rx: f32, ry: f32, rz: f32) {
        self.rotation = (rx, ry, rz);
    }

    /// Move by a world-space delta (dolly)
    pub fn translate_by(&mut self, delta: Vector3) {
        self.position = self.position + delta;
    }

    /// Add delta angles to the current rotation
    pub fn rotate_by(&mut self, drx: f32, dry: f32, drz: f32) {
        let (rx, ry, rz) = self.rotation;
        self.rotation = (rx + drx, ry + dry, rz + drz);
    }

    /// Point the camera at `target`.
    ///
    /// Pitch is `asin(-dir.y)`, yaw is `atan2(dir.x, dir.z)`; roll is reset to 0.
    pub fn look_at(&mut self, target: Vector3) {
        let direction = (target - self.position).normalize();
        let pitch = libm::asinf(-direction.y);
        let yaw = libm::atan2f(direction.x, direction.z);
        self.rotation = (pitch, yaw, 0.0);
    }

    pub fn view_matrix(&self) -> Matrix4 {
        view_matrix(self.position, self.rotation)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Matrix4 {
        perspective_matrix(self.fov, aspect, self.near, self.far)
    }
}

impl fmt::Display for Camera3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rx, ry, rz) = self.rotation;
        write!(
            f,
            "Camera3D(pos=({:.2}, {:.2}, {:.2}), rot=({:.1}°, {:.1}°, {:.1}°), fov={:.0}°, clip={}..{})",
            self.position.x,
            self.position.y,
            self.position.z,
            rad_to_deg(rx),
            rad_to_deg(ry),
            rad_to_deg(rz),
            self.fov,
            self.near,
            self.far
        )
    }
}
