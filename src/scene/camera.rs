use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::scene::transform::Transform;

/// Perspective camera settings as authored in a viewport configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub zoom: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [100.0, 70.0, 0.0],
            target: [0.0, 0.0, 0.0],
            fov: 20.0,
            zoom: 1.2,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub transform: Transform,

    /// Vertical field of view in radians, before zoom.
    pub fov: f32,
    pub zoom: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    pub(crate) view_matrix: Mat4,
    pub(crate) projection_matrix: Mat4,
}

impl Camera {
    #[must_use]
    pub fn new_perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            transform: Transform::new(),
            fov: fov_degrees.to_radians(),
            zoom: 1.0,
            aspect,
            near,
            far,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
        };
        cam.update_projection_matrix();
        cam
    }

    #[must_use]
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut cam = Self::new_perspective(config.fov, aspect, config.near, config.far);
        cam.zoom = config.zoom;
        cam.transform.position = Vec3::from_array(config.position);
        cam.transform.look_at(Vec3::from_array(config.target), Vec3::Y);
        cam.update_projection_matrix();
        cam.update_view_matrix();
        cam
    }

    /// Field of view after applying zoom: zooming narrows the frustum.
    #[must_use]
    pub fn effective_fov(&self) -> f32 {
        let zoom = self.zoom.max(f32::EPSILON);
        2.0 * ((self.fov * 0.5).tan() / zoom).atan()
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 && (aspect - self.aspect).abs() > f32::EPSILON {
            self.aspect = aspect;
            self.update_projection_matrix();
        }
    }

    pub fn update_projection_matrix(&mut self) {
        // glam's perspective_rh targets the wgpu depth range (0 to 1).
        self.projection_matrix = Mat4::perspective_rh(self.effective_fov(), self.aspect, self.near, self.far);
    }

    /// View matrix = inverse of the camera's world transform.
    pub fn update_view_matrix(&mut self) {
        self.view_matrix = Mat4::from(self.transform.local_matrix()).inverse();
    }

    #[inline]
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    #[inline]
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    #[inline]
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }
}
