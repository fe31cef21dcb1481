use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::assets::AssetCache;
use crate::controller::ModelHandle;
use crate::frame::AnimationFrames;
use crate::viewer::config::ViewerConfig;
use crate::viewer::control::{PLAY_ALL_COOLDOWN, PlayAllControl};
use crate::viewer::viewport::Viewport;

/// Two independent viewports plus the shared play-all control.
///
/// The shell never ticks the models itself; each mounted controller runs
/// its own frame callback chain. The shell only holds their handles.
pub struct ViewerShell {
    config: ViewerConfig,
    viewports: [Viewport; 2],
    handles: [Option<ModelHandle>; 2],
    control: PlayAllControl,
}

impl ViewerShell {
    /// Builds both viewports and starts their loads.
    #[must_use]
    pub fn new(config: ViewerConfig, cache: &Arc<AssetCache>) -> Self {
        let viewports = config.viewports.clone().map(|viewport| {
            let path = config.model_path(&viewport);
            Viewport::new(viewport, path, cache)
        });
        let cooldown = Duration::try_from_secs_f32(config.cooldown_secs).unwrap_or_else(|_| {
            log::warn!(
                "Ignoring cooldown_secs {}, using {:?}",
                config.cooldown_secs,
                PLAY_ALL_COOLDOWN
            );
            PLAY_ALL_COOLDOWN
        });
        let control = PlayAllControl::new(cooldown);

        Self {
            config,
            viewports,
            handles: [None, None],
            control,
        }
    }

    /// Mounts any model whose load finished since the last call. Never
    /// blocks. Returns `true` if something was mounted.
    pub fn poll_loads(&mut self, frames: &mut dyn AnimationFrames) -> bool {
        let mut mounted = false;
        for (viewport, handle) in self.viewports.iter_mut().zip(&mut self.handles) {
            if let Some(h) = viewport.poll(frames) {
                *handle = Some(h);
                mounted = true;
            }
        }
        mounted
    }

    /// Blocks until both loads resolve or `timeout` passes. Returns `true`
    /// when no viewport is still pending.
    pub fn wait_for_loads(&mut self, frames: &mut dyn AnimationFrames, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        for (viewport, handle) in self.viewports.iter_mut().zip(&mut self.handles) {
            let left = deadline.saturating_duration_since(Instant::now());
            if let Some(h) = viewport.poll_blocking(frames, left) {
                *handle = Some(h);
            }
        }
        !self.is_loading()
    }

    /// Handles a press of the play-all control at `now`.
    ///
    /// Replays every mounted model, in viewport order, unless the control is
    /// cooling down. Slots without a model are skipped.
    pub fn play_all(&mut self, now: Instant) -> bool {
        if !self.control.activate(now) {
            return false;
        }
        let mut replayed = 0;
        for handle in self.handles.iter().flatten() {
            handle.replay_all();
            replayed += 1;
        }
        log::debug!("Play all: replayed {replayed} model(s)");
        true
    }

    #[must_use]
    pub fn is_play_all_enabled(&self, now: Instant) -> bool {
        self.control.is_enabled(now)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.viewports.iter().any(Viewport::is_pending)
    }

    pub fn unmount_all(&mut self, frames: &mut dyn AnimationFrames) {
        for (viewport, handle) in self.viewports.iter_mut().zip(&mut self.handles) {
            viewport.unmount(frames);
            *handle = None;
        }
    }

    #[must_use]
    pub fn handles(&self) -> &[Option<ModelHandle>; 2] {
        &self.handles
    }

    #[must_use]
    pub fn viewports(&self) -> &[Viewport; 2] {
        &self.viewports
    }

    pub fn viewports_mut(&mut self) -> &mut [Viewport; 2] {
        &mut self.viewports
    }

    #[must_use]
    pub fn control(&self) -> &PlayAllControl {
        &self.control
    }

    #[must_use]
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }
}
