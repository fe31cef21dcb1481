#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Side-by-side animated glTF molecule viewer.
//!
//! The window-independent core (`assets`, `animation`, `controller`,
//! `viewer`) builds and tests without a GPU; the `winit` feature adds the
//! window, the wgpu renderer and the egui control bar.

pub mod animation;
pub mod assets;
pub mod controller;
pub mod errors;
pub mod frame;
pub mod scene;
pub mod utils;
pub mod viewer;

#[cfg(feature = "winit")]
pub mod app;
#[cfg(feature = "winit")]
pub mod renderer;

pub use animation::{AnimationAction, AnimationClip, AnimationMixer, Binder, LoopMode};
pub use assets::{AssetCache, ModelAsset, preload};
pub use controller::{FIXED_TICK_DELTA, ModelController, ModelHandle};
pub use errors::{MolviewError, Result};
pub use frame::{AnimationFrames, FrameLoop};
pub use scene::{Camera, Color, EnvironmentPreset};
pub use utils::orbit_control::OrbitControls;
pub use viewer::{PlayAllControl, ViewerConfig, ViewerShell};

#[cfg(feature = "winit")]
pub use app::App;
#[cfg(feature = "winit")]
pub use renderer::Renderer;
