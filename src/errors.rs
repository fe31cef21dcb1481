//! Error Types
//!
//! This module defines the error types used throughout the viewer.
//!
//! # Overview
//!
//! The main error type [`MolviewError`] covers all failure modes including:
//! - Asset reading and glTF decoding errors
//! - GPU initialization failures
//! - Windowing errors
//!
//! Asset load failures are the only errors the viewer logic itself produces.
//! They are never handled by a model controller: the viewport slot that
//! requested the load receives them and acts as the fallback boundary.
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, MolviewError>`.

use thiserror::Error;

/// The main error type for the viewer.
#[derive(Error, Debug)]
pub enum MolviewError {
    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// The requested asset was not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// The asset was readable but its content is unusable.
    #[error("Invalid asset '{path}': {reason}")]
    InvalidAsset {
        /// Source path of the asset
        path: String,
        /// What was wrong with it
        reason: String,
    },

    /// The background worker dropped the load before delivering a result.
    #[error("Asset load cancelled: {0}")]
    LoadCancelled(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // ========================================================================
    // Format & Parsing Errors
    // ========================================================================
    /// glTF parsing or loading error.
    #[error("glTF error: {0}")]
    GltfError(String),

    /// Data URI parsing error.
    #[error("Data URI error: {0}")]
    DataUriError(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Base64 decoding error.
    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    /// A color string that is not `#rrggbb` or `#rgb`.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Viewer configuration rejected after parsing.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // GPU & Window Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[cfg(feature = "winit")]
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Surface creation or configuration error.
    #[error("Surface error: {0}")]
    SurfaceError(String),

    /// Window creation error (winit).
    #[cfg(feature = "winit")]
    #[error("Window error: {0}")]
    WindowError(#[from] winit::error::OsError),

    /// Event loop error (winit).
    #[cfg(feature = "winit")]
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),
}

impl From<gltf::Error> for MolviewError {
    fn from(err: gltf::Error) -> Self {
        MolviewError::GltfError(err.to_string())
    }
}

/// Alias for `Result<T, MolviewError>`.
pub type Result<T> = std::result::Result<T, MolviewError>;
