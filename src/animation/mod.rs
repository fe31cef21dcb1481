mod values;
pub mod action;
pub mod binding;
pub mod clip;
pub mod mixer;
pub mod tracks;

pub use action::{ActionEvent, AnimationAction, LoopMode};
pub use binding::{Binder, PropertyBinding, TargetPath};
pub use clip::{AnimationClip, Track, TrackData, TrackMeta};
pub use mixer::{ActionHandle, AnimationMixer};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::Interpolatable;
