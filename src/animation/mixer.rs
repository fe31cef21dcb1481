use std::sync::Arc;

use crate::animation::action::{ActionEvent, AnimationAction};
use crate::animation::binding::{Binder, TargetPath};
use crate::animation::clip::{AnimationClip, TrackData};
use crate::scene::{Pose, SceneNode};

/// Index of an action inside its [`AnimationMixer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionHandle(pub(crate) usize);

impl ActionHandle {
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Drives a set of actions against one pose.
#[derive(Debug)]
pub struct AnimationMixer {
    actions: Vec<AnimationAction>,
    time: f32,
    pub time_scale: f32,
}

impl Default for AnimationMixer {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationMixer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            time: 0.0,
            time_scale: 1.0,
        }
    }

    /// Returns the action for `clip`, creating and binding it against `nodes`
    /// the first time. Repeated calls with the same clip return the same
    /// handle.
    pub fn clip_action(&mut self, clip: &Arc<AnimationClip>, nodes: &[SceneNode]) -> ActionHandle {
        if let Some(index) = self.actions.iter().position(|a| Arc::ptr_eq(a.clip(), clip)) {
            return ActionHandle(index);
        }

        let mut action = AnimationAction::new(Arc::clone(clip));
        action.bindings = Binder::bind(nodes, clip);
        self.actions.push(action);
        ActionHandle(self.actions.len() - 1)
    }

    #[must_use]
    pub fn action(&self, handle: ActionHandle) -> Option<&AnimationAction> {
        self.actions.get(handle.0)
    }

    pub fn action_mut(&mut self, handle: ActionHandle) -> Option<&mut AnimationAction> {
        self.actions.get_mut(handle.0)
    }

    #[must_use]
    pub fn actions(&self) -> &[AnimationAction] {
        &self.actions
    }

    pub fn handles(&self) -> impl Iterator<Item = ActionHandle> + use<> {
        (0..self.actions.len()).map(ActionHandle)
    }

    /// Global mixer time in seconds, scaled by `time_scale`.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Advances every scheduled action by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        let dt = dt * self.time_scale;
        self.time += dt;

        for action in &mut self.actions {
            if let Some(ActionEvent::Finished) = action.update(dt) {
                log::debug!("Action '{}' finished", action.clip().name);
            }
        }
    }

    /// Unschedules and rewinds every action.
    pub fn stop_all_action(&mut self) {
        for action in &mut self.actions {
            action.stop();
        }
    }

    /// Writes the blended state of all contributing actions into `pose`.
    ///
    /// The pose starts from its bind transforms each call, so a stopped
    /// action leaves no trace.
    pub fn apply(&mut self, pose: &mut Pose) {
        pose.reset_to_bind();

        for action in &mut self.actions {
            let weight = action.effective_weight();
            if weight <= 0.0 {
                continue;
            }

            let time = action.sample_time();
            let clip = Arc::clone(action.clip());

            for binding in &action.bindings {
                let Some(track) = clip.tracks.get(binding.track_index) else {
                    continue;
                };
                let Some(cursor) = action.track_cursors.get_mut(binding.track_index) else {
                    continue;
                };

                match (&track.data, binding.target) {
                    (TrackData::Vector3(t), TargetPath::Translation) => {
                        if let Some(value) = t.sample_with_cursor(time, cursor) {
                            pose.blend_translation(binding.node_index, value, weight);
                        }
                    }
                    (TrackData::Vector3(t), TargetPath::Scale) => {
                        if let Some(value) = t.sample_with_cursor(time, cursor) {
                            pose.blend_scale(binding.node_index, value, weight);
                        }
                    }
                    (TrackData::Quaternion(t), TargetPath::Rotation) => {
                        if let Some(value) = t.sample_with_cursor(time, cursor) {
                            pose.blend_rotation(binding.node_index, value, weight);
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}
