//! Utility Module
//!
//! - [`OrbitControls`]: orbit camera controller for each viewport
//! - [`Timer`]: wall-clock frame timing

pub mod orbit_control;
pub mod time;

pub use orbit_control::{OrbitControls, OrbitInput};
pub use time::Timer;
