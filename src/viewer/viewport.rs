use std::sync::Arc;
use std::time::Duration;

use crate::assets::{AssetCache, LoadReceiver, ModelAsset};
use crate::controller::{ModelController, ModelHandle};
use crate::errors::{MolviewError, Result};
use crate::frame::AnimationFrames;
use crate::scene::{Camera, Environment};
use crate::utils::{OrbitControls, OrbitInput};
use crate::viewer::config::ViewportConfig;

/// What a viewport currently shows in place of its model.
pub enum ViewportSlot {
    /// Load in flight; the viewport draws background and lighting only.
    Pending(LoadReceiver),
    Ready(ModelController),
    /// Load failed. The error has been logged; the viewport stays empty.
    Failed(String),
    Unmounted,
}

/// One 3D scene: camera, lighting and at most one mounted model.
pub struct Viewport {
    config: ViewportConfig,
    path: String,
    slot: ViewportSlot,
    environment: Environment,
    pub camera: Camera,
    pub orbit: OrbitControls,
}

impl Viewport {
    /// Creates the viewport and starts loading its model through `cache`.
    #[must_use]
    pub fn new(config: ViewportConfig, path: String, cache: &Arc<AssetCache>) -> Self {
        let rx = cache.load_in_background(&path);

        let camera = Camera::from_config(&config.camera, 1.0);
        let orbit = OrbitControls::from_position(
            glam::Vec3::from_array(config.camera.target),
            camera.transform.position,
        );

        Self {
            environment: config.environment.environment(),
            config,
            path,
            slot: ViewportSlot::Pending(rx),
            camera,
            orbit,
        }
    }

    /// Checks the pending load without blocking. Returns the model handle on
    /// the call that mounts it.
    pub fn poll(&mut self, frames: &mut dyn AnimationFrames) -> Option<ModelHandle> {
        let ViewportSlot::Pending(rx) = &self.slot else {
            return None;
        };

        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(flume::TryRecvError::Empty) => return None,
            Err(flume::TryRecvError::Disconnected) => Err(MolviewError::LoadCancelled(self.path.clone())),
        };
        self.resolve(result, frames)
    }

    /// Waits up to `timeout` for the pending load, then behaves like
    /// [`poll`](Self::poll).
    pub fn poll_blocking(&mut self, frames: &mut dyn AnimationFrames, timeout: Duration) -> Option<ModelHandle> {
        let ViewportSlot::Pending(rx) = &self.slot else {
            return None;
        };

        let result = match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(flume::RecvTimeoutError::Timeout) => return None,
            Err(flume::RecvTimeoutError::Disconnected) => Err(MolviewError::LoadCancelled(self.path.clone())),
        };
        self.resolve(result, frames)
    }

    fn resolve(&mut self, result: Result<Arc<ModelAsset>>, frames: &mut dyn AnimationFrames) -> Option<ModelHandle> {
        match result {
            Ok(asset) => {
                let (controller, handle) =
                    ModelController::mount(asset, self.config.model_position(), frames);
                self.slot = ViewportSlot::Ready(controller);
                Some(handle)
            }
            Err(e) => {
                log::error!("Viewport '{}' failed to load '{}': {e}", self.config.label, self.path);
                self.slot = ViewportSlot::Failed(e.to_string());
                None
            }
        }
    }

    /// Unmounts the model, if any. The viewport stays empty afterwards.
    pub fn unmount(&mut self, frames: &mut dyn AnimationFrames) {
        if let ViewportSlot::Ready(controller) = std::mem::replace(&mut self.slot, ViewportSlot::Unmounted) {
            controller.unmount(frames);
        }
    }

    #[must_use]
    pub fn handle(&self) -> Option<ModelHandle> {
        self.controller().map(ModelController::handle)
    }

    #[must_use]
    pub fn controller(&self) -> Option<&ModelController> {
        match &self.slot {
            ViewportSlot::Ready(controller) => Some(controller),
            _ => None,
        }
    }

    #[must_use]
    pub fn slot(&self) -> &ViewportSlot {
        &self.slot
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.slot, ViewportSlot::Pending(_))
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.slot, ViewportSlot::Ready(_))
    }

    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        match &self.slot {
            ViewportSlot::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.camera.set_aspect(aspect);
    }

    /// Applies pointer input to the orbit camera.
    pub fn update_camera(&mut self, input: &OrbitInput, dt: f32) {
        let fov = self.camera.effective_fov().to_degrees();
        self.orbit.update(&mut self.camera.transform, input, fov, dt);
        self.camera.update_view_matrix();
    }
}
