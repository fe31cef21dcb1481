//! Memoised model cache.
//!
//! Every model is decoded at most once per path. Concurrent requests for the
//! same path queue on a per-path slot and all receive the same
//! `Arc<ModelAsset>`. Failed loads leave the slot empty, so the next request
//! for that path reads again.

use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::runtime::Runtime;

use crate::assets::io::{AssetReader, FileAssetReader};
use crate::assets::loaders::GltfLoader;
use crate::assets::model::ModelAsset;
use crate::errors::Result;

type Slot = Arc<Mutex<Option<Arc<ModelAsset>>>>;

/// Receiving end of a background load.
pub type LoadReceiver = flume::Receiver<Result<Arc<ModelAsset>>>;

fn asset_runtime() -> Option<&'static Runtime> {
    static RUNTIME: OnceLock<Option<Runtime>> = OnceLock::new();
    RUNTIME
        .get_or_init(|| {
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .thread_name("molview-assets")
                .build()
                .map_err(|e| log::error!("Failed to create asset loader runtime: {e}"))
                .ok()
        })
        .as_ref()
}

/// Process-wide cache reading from the working directory.
///
/// Keys are paths relative to the working directory, so the asset root is
/// part of every key.
pub fn global() -> &'static Arc<AssetCache> {
    static CACHE: OnceLock<Arc<AssetCache>> = OnceLock::new();
    CACHE.get_or_init(|| Arc::new(AssetCache::new(Arc::new(FileAssetReader::new(".")))))
}

/// Starts loading `path` into the global cache without waiting for it.
pub fn preload(path: &str) {
    global().preload(path);
}

pub struct AssetCache {
    reader: Arc<dyn AssetReader>,
    entries: Mutex<FxHashMap<String, Slot>>,
}

impl AssetCache {
    #[must_use]
    pub fn new(reader: Arc<dyn AssetReader>) -> Self {
        Self {
            reader,
            entries: Mutex::new(FxHashMap::default()),
        }
    }

    fn slot(&self, path: &str) -> Slot {
        let mut entries = self.entries.lock();
        Arc::clone(entries.entry(path.to_string()).or_default())
    }

    /// Returns the cached model for `path`, loading it on first use.
    ///
    /// Blocks while another thread is loading the same path, then returns
    /// that thread's result.
    pub fn get_or_load(&self, path: &str) -> Result<Arc<ModelAsset>> {
        let slot = self.slot(path);
        let mut loaded = slot.lock();

        if let Some(asset) = loaded.as_ref() {
            return Ok(Arc::clone(asset));
        }

        log::info!("Loading model '{path}'");
        let asset = Arc::new(GltfLoader::load(self.reader.as_ref(), path)?);
        *loaded = Some(Arc::clone(&asset));
        Ok(asset)
    }

    /// The cached model, if already loaded. Never blocks on an in-flight load.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<Arc<ModelAsset>> {
        let slot = self.entries.lock().get(path).cloned()?;
        let loaded = slot.try_lock()?;
        loaded.as_ref().map(Arc::clone)
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Number of successfully loaded models.
    #[must_use]
    pub fn len(&self) -> usize {
        let slots: Vec<Slot> = self.entries.lock().values().cloned().collect();
        slots
            .iter()
            .filter(|s| s.try_lock().is_some_and(|l| l.is_some()))
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Loads `path` off the calling thread.
    ///
    /// A cached model is delivered immediately without spawning work.
    pub fn load_in_background(self: &Arc<Self>, path: &str) -> LoadReceiver {
        let (tx, rx) = flume::bounded(1);

        if let Some(asset) = self.get(path) {
            let _ = tx.send(Ok(asset));
            return rx;
        }

        self.spawn_load(path, move |path, result| {
            if let Err(e) = &result {
                log::debug!("Background load of '{path}' failed: {e}");
            }
            // The receiver may already be gone (viewport dropped).
            let _ = tx.send(result);
        });
        rx
    }

    /// Warms the cache for `path`; the outcome is only logged.
    pub fn preload(self: &Arc<Self>, path: &str) {
        if self.contains(path) {
            return;
        }
        self.spawn_load(path, |path, result| match result {
            Ok(_) => log::debug!("Preloaded '{path}'"),
            Err(e) => log::warn!("Preload of '{path}' failed: {e}"),
        });
    }

    /// Runs `get_or_load` on a blocking worker and hands the result to
    /// `done` on that same worker.
    fn spawn_load<F>(self: &Arc<Self>, path: &str, done: F)
    where
        F: FnOnce(&str, Result<Arc<ModelAsset>>) + Send + 'static,
    {
        let cache = Arc::clone(self);
        let path = path.to_string();
        let job = move || {
            let result = cache.get_or_load(&path);
            done(&path, result);
        };

        match asset_runtime() {
            Some(runtime) => {
                runtime.spawn_blocking(job);
            }
            None => {
                if let Err(e) = std::thread::Builder::new()
                    .name("molview-load".to_string())
                    .spawn(job)
                {
                    log::error!("Failed to spawn asset loader thread: {e}");
                }
            }
        }
    }
}
