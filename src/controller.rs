//! Model controller.
//!
//! Owns one mounted model instance: its animation mixer, one action per
//! clip, and the per-instance pose. While mounted, a self-rescheduling frame
//! callback advances the mixer by [`FIXED_TICK_DELTA`] every frame.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};
use std::sync::Arc;

use glam::{Affine3A, Vec3};

use crate::animation::{ActionHandle, AnimationMixer, LoopMode};
use crate::assets::ModelAsset;
use crate::frame::{AnimationFrames, FrameRequestId};
use crate::scene::Pose;

/// Mixer advance per frame, independent of wall-clock time.
pub const FIXED_TICK_DELTA: f32 = 0.01;

/// Animated state of one mounted model.
pub struct ModelInstance {
    asset: Arc<ModelAsset>,
    mixer: AnimationMixer,
    actions: Vec<ActionHandle>,
    pose: Pose,
    offset: Vec3,
}

impl ModelInstance {
    fn new(asset: Arc<ModelAsset>, offset: Vec3) -> Self {
        let mut mixer = AnimationMixer::new();
        let actions = asset
            .clips
            .iter()
            .map(|clip| {
                let handle = mixer.clip_action(clip, &asset.nodes);
                if let Some(action) = mixer.action_mut(handle) {
                    action.set_loop(LoopMode::Repeat);
                    action.clamp_when_finished = true;
                }
                handle
            })
            .collect();

        let mut instance = Self {
            pose: Pose::from_nodes(&asset.nodes),
            asset,
            mixer,
            actions,
            offset,
        };
        instance.refresh_pose();
        instance
    }

    fn root_matrix(&self) -> Affine3A {
        Affine3A::from_translation(self.offset)
    }

    fn refresh_pose(&mut self) {
        self.mixer.apply(&mut self.pose);
        let root = self.root_matrix();
        self.pose
            .update_world_matrices(&self.asset.nodes, &self.asset.roots, root);
    }

    /// Advances playback by `dt` and re-evaluates the pose.
    pub fn advance(&mut self, dt: f32) {
        self.mixer.update(dt);
        self.refresh_pose();
    }

    fn replay_all(&mut self) {
        self.mixer.stop_all_action();
        for &handle in &self.actions {
            if let Some(action) = self.mixer.action_mut(handle) {
                action.reset().play();
            }
        }
        self.refresh_pose();
        log::debug!(
            "Replaying {} clip(s) of '{}'",
            self.actions.len(),
            self.asset.source
        );
    }

    fn stop_all(&mut self) {
        self.mixer.stop_all_action();
        self.refresh_pose();
    }

    fn playback(&self) -> Vec<ActionPlayback> {
        self.actions
            .iter()
            .filter_map(|&h| self.mixer.action(h))
            .map(|action| ActionPlayback {
                clip: action.clip().name.clone(),
                running: action.is_running(),
                paused: action.paused,
                time: action.time,
            })
            .collect()
    }

    #[must_use]
    pub fn asset(&self) -> &Arc<ModelAsset> {
        &self.asset
    }

    #[must_use]
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    #[must_use]
    pub fn mixer(&self) -> &AnimationMixer {
        &self.mixer
    }

    /// Direct access to the actions, e.g. to pause one or change its loop
    /// mode. The pose is re-evaluated on the next tick.
    pub fn mixer_mut(&mut self) -> &mut AnimationMixer {
        &mut self.mixer
    }

    #[must_use]
    pub fn offset(&self) -> Vec3 {
        self.offset
    }
}

/// Snapshot of one action's playback state.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionPlayback {
    pub clip: String,
    pub running: bool,
    pub paused: bool,
    pub time: f32,
}

#[derive(Default)]
struct TickState {
    cancelled: bool,
    pending: Option<FrameRequestId>,
}

fn schedule_tick(
    instance: Weak<RefCell<ModelInstance>>,
    tick: Rc<RefCell<TickState>>,
    frames: &mut dyn AnimationFrames,
) {
    let state = Rc::clone(&tick);
    let id = frames.request_animation_frame(Box::new(move |frames| {
        state.borrow_mut().pending = None;
        if state.borrow().cancelled {
            return;
        }
        let Some(strong) = instance.upgrade() else {
            return;
        };
        strong.borrow_mut().advance(FIXED_TICK_DELTA);
        schedule_tick(instance, state, frames);
    }));
    tick.borrow_mut().pending = Some(id);
}

/// A mounted model. Dropping it stops the tick chain; prefer
/// [`unmount`](Self::unmount), which also withdraws the pending callback.
pub struct ModelController {
    instance: Rc<RefCell<ModelInstance>>,
    tick: Rc<RefCell<TickState>>,
}

impl ModelController {
    /// Mounts `asset` at `position` and starts the tick chain on `frames`.
    ///
    /// Actions are created for every clip but not started; the model holds
    /// its bind pose until the first replay.
    pub fn mount(
        asset: Arc<ModelAsset>,
        position: Vec3,
        frames: &mut dyn AnimationFrames,
    ) -> (Self, ModelHandle) {
        log::debug!(
            "Mounting '{}' with {} clip(s)",
            asset.source,
            asset.clips.len()
        );

        let instance = Rc::new(RefCell::new(ModelInstance::new(asset, position)));
        let tick = Rc::new(RefCell::new(TickState::default()));
        schedule_tick(Rc::downgrade(&instance), Rc::clone(&tick), frames);

        let controller = Self { instance, tick };
        let handle = controller.handle();
        (controller, handle)
    }

    #[must_use]
    pub fn handle(&self) -> ModelHandle {
        ModelHandle {
            instance: Rc::downgrade(&self.instance),
        }
    }

    pub fn replay_all(&self) {
        self.instance.borrow_mut().replay_all();
    }

    /// Borrow of the animated instance, for rendering.
    #[must_use]
    pub fn instance(&self) -> Ref<'_, ModelInstance> {
        self.instance.borrow()
    }

    /// Mutable borrow of the instance. Must not be held across
    /// [`FrameLoop::run_frame`](crate::frame::FrameLoop::run_frame).
    #[must_use]
    pub fn instance_mut(&self) -> RefMut<'_, ModelInstance> {
        self.instance.borrow_mut()
    }

    /// Withdraws the pending tick and stops every action.
    pub fn unmount(self, frames: &mut dyn AnimationFrames) {
        let pending = {
            let mut tick = self.tick.borrow_mut();
            tick.cancelled = true;
            tick.pending.take()
        };
        if let Some(id) = pending {
            frames.cancel_animation_frame(id);
        }
        log::debug!("Unmounting '{}'", self.instance.borrow().asset.source);
        // Drop stops the actions.
    }
}

impl Drop for ModelController {
    fn drop(&mut self) {
        self.tick.borrow_mut().cancelled = true;
        if let Ok(mut instance) = self.instance.try_borrow_mut() {
            instance.stop_all();
        }
    }
}

/// Narrow capability handed to the shell: replay plus read-only
/// inspection. Every call is a no-op once the model is unmounted.
#[derive(Clone)]
pub struct ModelHandle {
    instance: Weak<RefCell<ModelInstance>>,
}

impl ModelHandle {
    pub fn replay_all(&self) {
        if let Some(instance) = self.instance.upgrade() {
            instance.borrow_mut().replay_all();
        }
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.instance.strong_count() > 0
    }

    /// Per-action playback state, in clip order. Empty when unmounted.
    #[must_use]
    pub fn playback(&self) -> Vec<ActionPlayback> {
        self.instance
            .upgrade()
            .map(|i| i.borrow().playback())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn mixer_time(&self) -> Option<f32> {
        self.instance.upgrade().map(|i| i.borrow().mixer.time())
    }

    #[must_use]
    pub fn source(&self) -> Option<String> {
        self.instance
            .upgrade()
            .map(|i| i.borrow().asset.source.clone())
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("mounted", &self.is_mounted())
            .finish()
    }
}
