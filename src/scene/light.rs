use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Uniform light applied to every surface regardless of orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            intensity: 0.5,
        }
    }
}

/// Omnidirectional light at a world position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointLight {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
    /// Distance at which the light reaches zero; `0.0` means unbounded.
    pub range: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: [10.0, 10.0, 10.0],
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
            range: 0.0,
        }
    }
}

impl AmbientLight {
    /// Pre-multiplied radiance handed to the shader.
    #[must_use]
    pub fn radiance(&self) -> Vec3 {
        Vec3::from_array(self.color) * self.intensity
    }
}

impl PointLight {
    #[must_use]
    pub fn radiance(&self) -> Vec3 {
        Vec3::from_array(self.color) * self.intensity
    }
}
