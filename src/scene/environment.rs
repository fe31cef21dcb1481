//! Named lighting environments.
//!
//! Each preset stands for an HDR studio/outdoor capture. The viewer does not
//! ship the images; a preset resolves to a sky/ground hemisphere pair that
//! approximates the dominant tint of the capture.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::scene::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentPreset {
    Apartment,
    City,
    Dawn,
    Forest,
    Lobby,
    Night,
    Park,
    #[default]
    Studio,
    Sunset,
    Warehouse,
}

/// Hemisphere light derived from a preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Environment {
    pub sky: Color,
    pub ground: Color,
    pub intensity: f32,
}

impl EnvironmentPreset {
    pub const ALL: [Self; 10] = [
        Self::Apartment,
        Self::City,
        Self::Dawn,
        Self::Forest,
        Self::Lobby,
        Self::Night,
        Self::Park,
        Self::Studio,
        Self::Sunset,
        Self::Warehouse,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Apartment => "apartment",
            Self::City => "city",
            Self::Dawn => "dawn",
            Self::Forest => "forest",
            Self::Lobby => "lobby",
            Self::Night => "night",
            Self::Park => "park",
            Self::Studio => "studio",
            Self::Sunset => "sunset",
            Self::Warehouse => "warehouse",
        }
    }

    #[must_use]
    pub fn environment(self) -> Environment {
        let (sky, ground, intensity) = match self {
            Self::Apartment => ((0.98, 0.92, 0.84), (0.42, 0.33, 0.26), 0.9),
            Self::City => ((0.80, 0.85, 0.92), (0.35, 0.35, 0.38), 0.9),
            Self::Dawn => ((0.95, 0.78, 0.70), (0.30, 0.24, 0.28), 0.7),
            Self::Forest => ((0.74, 0.86, 0.72), (0.20, 0.26, 0.14), 0.7),
            Self::Lobby => ((0.96, 0.90, 0.80), (0.45, 0.38, 0.30), 1.0),
            Self::Night => ((0.30, 0.36, 0.55), (0.05, 0.05, 0.08), 0.4),
            Self::Park => ((0.82, 0.90, 1.00), (0.32, 0.38, 0.22), 1.0),
            Self::Studio => ((1.00, 1.00, 1.00), (0.45, 0.45, 0.45), 1.0),
            Self::Sunset => ((1.00, 0.72, 0.50), (0.28, 0.18, 0.16), 0.8),
            Self::Warehouse => ((0.88, 0.90, 0.94), (0.30, 0.28, 0.26), 0.9),
        };

        Environment {
            sky: Color::new(sky.0, sky.1, sky.2),
            ground: Color::new(ground.0, ground.1, ground.2),
            intensity,
        }
    }
}

impl Environment {
    /// Irradiance for a surface normal, blending ground to sky by its
    /// vertical component.
    #[must_use]
    pub fn irradiance(&self, normal: Vec3) -> Vec3 {
        let t = normal.normalize_or_zero().y * 0.5 + 0.5;
        self.ground.to_linear().lerp(self.sky.to_linear(), t) * self.intensity
    }
}

impl Default for Environment {
    fn default() -> Self {
        EnvironmentPreset::default().environment()
    }
}
