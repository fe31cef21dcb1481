use std::path::{Path, PathBuf};

use crate::errors::{MolviewError, Result};

/// Source of raw asset bytes.
///
/// Readers are shared between the cache and its background workers, so they
/// must be thread-safe.
pub trait AssetReader: Send + Sync {
    fn read_bytes(&self, uri: &str) -> Result<Vec<u8>>;
}

/// Reads assets relative to a root directory on disk.
#[derive(Debug, Clone)]
pub struct FileAssetReader {
    root_path: PathBuf,
}

impl FileAssetReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let root_path = if path.is_file() {
            path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            path.to_path_buf()
        };
        Self { root_path }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

impl AssetReader for FileAssetReader {
    fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let path = self.root_path.join(uri);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(MolviewError::AssetNotFound(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Directory part of an asset path, used to resolve relative buffer URIs.
#[must_use]
pub fn parent_dir(uri: &str) -> &str {
    match uri.rfind('/') {
        Some(pos) => &uri[..=pos],
        None => "",
    }
}
