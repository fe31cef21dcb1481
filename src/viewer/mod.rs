//! The two-viewport molecule viewer, independent of any window system.
//!
//! [`ViewerShell`] owns both [`Viewport`]s and the [`PlayAllControl`]. Each
//! viewport loads its model in the background and mounts a
//! [`ModelController`](crate::controller::ModelController) once the load
//! resolves; a failed load leaves that viewport empty without affecting the
//! other one.

pub mod config;
pub mod control;
pub mod layout;
pub mod shell;
pub mod viewport;

pub use config::{NITROGEN_MODEL, OXYGEN_MODEL, PLAY_ALL_LABEL, ViewerConfig, ViewportConfig};
pub use control::{ControlState, PLAY_ALL_COOLDOWN, PlayAllControl};
pub use layout::{Rect, SplitAxis, TOP_BAR_HEIGHT, ViewerLayout};
pub use shell::ViewerShell;
pub use viewport::{Viewport, ViewportSlot};
