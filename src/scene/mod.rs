//! Scene data for the viewer.
//!
//! - `SceneNode`: flat, index-linked node of a loaded model
//! - `Transform`: position/rotation/scale relative to the parent
//! - `Pose`: per-instance animated copy of a model's transforms
//! - `Camera`, lights and environment presets for each viewport

pub mod camera;
pub mod color;
pub mod environment;
pub mod light;
pub mod node;
pub mod pose;
pub mod transform;

pub use camera::{Camera, CameraConfig};
pub use color::Color;
pub use environment::{Environment, EnvironmentPreset};
pub use light::{AmbientLight, PointLight};
pub use node::SceneNode;
pub use pose::Pose;
pub use transform::Transform;
