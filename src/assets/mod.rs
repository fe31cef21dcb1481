pub mod cache;
pub mod io;
pub mod loaders;
pub mod model;

pub use cache::{AssetCache, LoadReceiver, global, preload};
pub use io::{AssetReader, FileAssetReader};
pub use loaders::GltfLoader;
pub use model::{BoundingBox, MeshData, ModelAsset, Primitive};
