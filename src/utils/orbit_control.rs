use glam::{Vec2, Vec3};

use crate::scene::transform::Transform;

/// Pointer state routed to one viewport for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrbitInput {
    /// Cursor movement since the previous frame, in physical pixels.
    pub cursor_delta: Vec2,
    /// Wheel movement this frame; positive `y` zooms in.
    pub scroll_delta: Vec2,
    pub rotating: bool,
    pub panning: bool,
    /// Height of the viewport receiving the input, in physical pixels.
    pub viewport_height: f32,
}

pub struct OrbitControls {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping_factor: f32,
    pub enable_damping: bool,
    pub min_distance: f32,
    pub max_distance: f32,

    pub center: Vec3,
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,

    rotate_delta: Vec2,
}

impl OrbitControls {
    #[must_use]
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            rotate_speed: 1.0,
            zoom_speed: 0.05,
            pan_speed: 1.0,
            damping_factor: 0.05,
            enable_damping: true,
            min_distance: 1.0,
            max_distance: 1000.0,

            center,
            radius,
            theta: 0.0,
            phi: std::f32::consts::FRAC_PI_2,

            rotate_delta: Vec2::ZERO,
        }
    }

    /// Orbit around `center` starting from the spherical coordinates of
    /// `position`.
    #[must_use]
    pub fn from_position(center: Vec3, position: Vec3) -> Self {
        let offset = position - center;
        let radius = offset.length().max(f32::EPSILON);
        let mut controls = Self::new(center, radius);
        controls.theta = offset.x.atan2(offset.z);
        controls.phi = (offset.y / radius).clamp(-1.0, 1.0).acos();
        controls
    }

    /// Current camera position implied by the spherical coordinates.
    #[must_use]
    pub fn eye(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        self.center
            + Vec3::new(
                self.radius * sin_phi * sin_theta,
                self.radius * cos_phi,
                self.radius * sin_phi * cos_theta,
            )
    }

    pub fn update(&mut self, transform: &mut Transform, input: &OrbitInput, fov_degrees: f32, dt: f32) {
        let screen_height = input.viewport_height.max(1.0);

        if input.rotating {
            let rotate_per_pixel = 2.0 * std::f32::consts::PI / screen_height;
            self.rotate_delta -= input.cursor_delta * rotate_per_pixel * self.rotate_speed;
        }

        if self.enable_damping {
            let target_fps = 60.0;
            let retention = (1.0 - self.damping_factor).powf(dt * target_fps);
            let delta_apply = self.rotate_delta * (1.0 - retention);

            self.theta += delta_apply.x;
            self.phi += delta_apply.y;
            self.rotate_delta *= retention;
        } else {
            self.theta += self.rotate_delta.x;
            self.phi += self.rotate_delta.y;
            self.rotate_delta = Vec2::ZERO;
        }

        const EPS: f32 = 0.0001;
        self.phi = self.phi.clamp(EPS, std::f32::consts::PI - EPS);

        if input.scroll_delta.y != 0.0 {
            let scale = (1.0 - self.zoom_speed).powf(input.scroll_delta.y.abs());
            if input.scroll_delta.y > 0.0 {
                self.radius *= scale;
            } else {
                self.radius /= scale;
            }
            self.radius = self.radius.clamp(self.min_distance, self.max_distance);
        }

        if input.panning {
            let half_fov = fov_degrees.to_radians() / 2.0;
            let target_world_height = 2.0 * self.radius * half_fov.tan();
            let pixels_to_world_ratio = target_world_height / screen_height;

            let forward = (self.center - self.eye()).normalize_or_zero();
            let right = forward.cross(Vec3::Y).normalize_or_zero();
            let up = right.cross(forward).normalize_or_zero();

            self.center += (right * -input.cursor_delta.x + up * input.cursor_delta.y)
                * pixels_to_world_ratio
                * self.pan_speed;
        }

        transform.position = self.eye();
        transform.look_at(self.center, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_position_reproduces_eye() {
        let start = Vec3::new(100.0, 70.0, 0.0);
        let controls = OrbitControls::from_position(Vec3::ZERO, start);
        assert!((controls.eye() - start).length() < 1e-3);
    }

    #[test]
    fn idle_update_keeps_camera_still() {
        let start = Vec3::new(100.0, 70.0, 0.0);
        let mut controls = OrbitControls::from_position(Vec3::ZERO, start);
        let mut transform = Transform::from_translation(start);
        let input = OrbitInput {
            viewport_height: 600.0,
            ..Default::default()
        };
        controls.update(&mut transform, &input, 20.0, 1.0 / 60.0);
        assert!((transform.position - start).length() < 1e-3);
    }

    #[test]
    fn scrolling_up_moves_closer() {
        let mut controls = OrbitControls::new(Vec3::ZERO, 50.0);
        let mut transform = Transform::new();
        let input = OrbitInput {
            scroll_delta: Vec2::new(0.0, 2.0),
            viewport_height: 600.0,
            ..Default::default()
        };
        controls.update(&mut transform, &input, 20.0, 1.0 / 60.0);
        assert!(controls.radius < 50.0);
    }
}
