//! Viewer configuration.
//!
//! The defaults reproduce the two-molecule page: nitrogen on the left,
//! oxygen on the right. A JSON document with the same shape can override
//! any field; missing fields keep their defaults.

use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::errors::{MolviewError, Result};
use crate::scene::{AmbientLight, CameraConfig, Color, EnvironmentPreset, PointLight};

/// Asset path of the left model, relative to the asset root.
pub const NITROGEN_MODEL: &str = "Nitrogen.glb";
/// Asset path of the right model, relative to the asset root.
pub const OXYGEN_MODEL: &str = "Oksigen.glb";

pub const DEFAULT_ASSET_ROOT: &str = "assets";
pub const PLAY_ALL_LABEL: &str = "Play All Animations";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub label: String,
    /// Model path relative to [`ViewerConfig::asset_root`].
    pub model: String,
    /// Offset applied at the model's root.
    pub model_position: [f32; 3],
    pub camera: CameraConfig,
    pub background: Color,
    pub environment: EnvironmentPreset,
    pub ambient_light: AmbientLight,
    pub point_light: PointLight,
}

impl ViewportConfig {
    #[must_use]
    pub fn nitrogen() -> Self {
        Self {
            label: "Nitrogen".to_string(),
            model: NITROGEN_MODEL.to_string(),
            model_position: [0.0, 0.0, 13.0],
            camera: CameraConfig::default(),
            background: Color::from_rgb8(0xca, 0xda, 0xeb),
            environment: EnvironmentPreset::Warehouse,
            ambient_light: AmbientLight::default(),
            point_light: PointLight::default(),
        }
    }

    #[must_use]
    pub fn oxygen() -> Self {
        Self {
            label: "Oxygen".to_string(),
            model: OXYGEN_MODEL.to_string(),
            model_position: [0.0, 0.0, 5.0],
            background: Color::from_rgb8(0xeb, 0xde, 0xca),
            environment: EnvironmentPreset::Apartment,
            ..Self::nitrogen()
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_model_position(mut self, position: Vec3) -> Self {
        self.model_position = position.to_array();
        self
    }

    #[must_use]
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    #[must_use]
    pub fn with_environment(mut self, environment: EnvironmentPreset) -> Self {
        self.environment = environment;
        self
    }

    #[must_use]
    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    #[must_use]
    pub fn model_position(&self) -> Vec3 {
        Vec3::from_array(self.model_position)
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self::nitrogen()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub title: String,
    pub asset_root: String,
    pub viewports: [ViewportConfig; 2],
    /// Seconds the play-all control stays disabled after activation.
    pub cooldown_secs: f32,
    pub window_size: [u32; 2],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Molecule Viewer".to_string(),
            asset_root: DEFAULT_ASSET_ROOT.to_string(),
            viewports: [ViewportConfig::nitrogen(), ViewportConfig::oxygen()],
            cooldown_secs: 1.0,
            window_size: [1280, 720],
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if Duration::try_from_secs_f32(self.cooldown_secs).is_err() {
            return Err(MolviewError::InvalidConfig(format!(
                "cooldown_secs must be a non-negative number of seconds, got {}",
                self.cooldown_secs
            )));
        }
        for viewport in &self.viewports {
            if viewport.model.is_empty() {
                return Err(MolviewError::InvalidConfig(format!(
                    "viewport '{}' has no model path",
                    viewport.label
                )));
            }
            let camera = &viewport.camera;
            if camera.near <= 0.0 || camera.far <= camera.near {
                return Err(MolviewError::InvalidConfig(format!(
                    "viewport '{}' has invalid clip planes {}..{}",
                    viewport.label, camera.near, camera.far
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn with_asset_root(mut self, root: impl Into<String>) -> Self {
        self.asset_root = root.into();
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Cache key of a viewport's model: the asset root joined with its path.
    #[must_use]
    pub fn model_path(&self, viewport: &ViewportConfig) -> String {
        let root = self.asset_root.trim_end_matches('/');
        if root.is_empty() {
            viewport.model.clone()
        } else {
            format!("{root}/{}", viewport.model)
        }
    }

    /// Every model path the viewer will mount, for preloading.
    #[must_use]
    pub fn model_paths(&self) -> Vec<String> {
        self.viewports.iter().map(|v| self.model_path(v)).collect()
    }
}
