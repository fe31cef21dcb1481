use std::sync::Arc;

use crate::animation::{
    binding::PropertyBinding,
    clip::AnimationClip,
    tracks::KeyframeCursor,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Play once, then finish.
    Once,
    /// Wrap back to the start indefinitely.
    Repeat,
    /// Alternate forward and backward indefinitely.
    PingPong,
}

/// Notable transitions produced while advancing an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionEvent {
    Looped,
    Finished,
}

/// Runtime playback state of one clip against one mixer.
///
/// A new action is stopped: it does not advance or contribute to the pose
/// until [`play`](Self::play) schedules it.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    pub time: f32,
    pub time_scale: f32,
    pub weight: f32,
    pub loop_mode: LoopMode,
    /// Hold the last frame when a `Once` action ends instead of dropping
    /// back to the bind pose.
    pub clamp_when_finished: bool,
    pub paused: bool,
    pub enabled: bool,

    scheduled: bool,
    loop_count: u32,

    pub bindings: Vec<PropertyBinding>,

    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::Repeat,
            clamp_when_finished: false,
            paused: false,
            enabled: true,
            scheduled: false,
            loop_count: 0,
            bindings: Vec::new(),
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    pub fn set_loop(&mut self, mode: LoopMode) -> &mut Self {
        self.loop_mode = mode;
        self
    }

    /// Schedules the action on its mixer.
    pub fn play(&mut self) -> &mut Self {
        self.scheduled = true;
        self
    }

    /// Unschedules the action and rewinds it.
    pub fn stop(&mut self) -> &mut Self {
        self.scheduled = false;
        self.reset()
    }

    /// Rewinds to time zero and clears the paused/disabled state left by a
    /// previous finish. Scheduling is untouched.
    pub fn reset(&mut self) -> &mut Self {
        self.paused = false;
        self.enabled = true;
        self.time = 0.0;
        self.loop_count = 0;
        for cursor in &mut self.track_cursors {
            *cursor = KeyframeCursor::default();
        }
        self
    }

    /// Scheduled on the mixer, regardless of whether time is moving.
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// Scheduled and actually advancing.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.scheduled && self.enabled && !self.paused && self.time_scale != 0.0
    }

    /// Weight this action contributes to the pose this tick.
    #[must_use]
    pub fn effective_weight(&self) -> f32 {
        if self.scheduled && self.enabled {
            self.weight.max(0.0)
        } else {
            0.0
        }
    }

    /// Core logic: advance time.
    pub fn update(&mut self, dt: f32) -> Option<ActionEvent> {
        if !self.scheduled || self.paused || !self.enabled {
            return None;
        }

        let duration = self.clip.duration;
        if duration <= 0.0 {
            return None;
        }

        let delta = dt * self.time_scale;
        if delta == 0.0 {
            return None;
        }
        self.time += delta;

        match self.loop_mode {
            LoopMode::Once => {
                if self.time >= duration || self.time < 0.0 {
                    self.time = self.time.clamp(0.0, duration);
                    self.finish();
                    return Some(ActionEvent::Finished);
                }
                None
            }
            LoopMode::Repeat | LoopMode::PingPong => {
                if self.time >= duration || self.time < 0.0 {
                    let wraps = (self.time / duration).floor();
                    self.time -= wraps * duration;
                    // Float error can leave the wrapped time exactly on `duration`.
                    if self.time >= duration {
                        self.time = 0.0;
                    }
                    self.loop_count = self.loop_count.wrapping_add(wraps.abs() as u32);
                    return Some(ActionEvent::Looped);
                }
                None
            }
        }
    }

    /// Clip-local time used for sampling. Ping-pong plays every odd pass
    /// backwards.
    #[must_use]
    pub fn sample_time(&self) -> f32 {
        if self.loop_mode == LoopMode::PingPong && self.loop_count % 2 == 1 {
            self.clip.duration - self.time
        } else {
            self.time
        }
    }

    /// Number of times playback wrapped since the last reset.
    #[must_use]
    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    fn finish(&mut self) {
        if self.clamp_when_finished {
            self.paused = true;
        } else {
            self.enabled = false;
        }
    }
}
