//! Shared fixtures: an in-memory asset reader and a small animated
//! two-node glTF "molecule" in `.gltf` and `.glb` form.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use base64::Engine as _;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::json;

use molview::assets::AssetReader;
use molview::errors::{MolviewError, Result};

pub const EPSILON: f32 = 1e-4;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

// ============================================================================
// In-memory reader
// ============================================================================

/// Serves files from a map and counts every read.
#[derive(Default)]
pub struct MemoryReader {
    files: Mutex<FxHashMap<String, Vec<u8>>>,
    reads: AtomicUsize,
    delay: Duration,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every read sleeps for `delay` first, widening race windows.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn insert(&self, path: &str, bytes: Vec<u8>) {
        self.files.lock().insert(path.to_string(), bytes);
    }

    pub fn remove(&self, path: &str) {
        self.files.lock().remove(path);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl AssetReader for MemoryReader {
    fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.files
            .lock()
            .get(uri)
            .cloned()
            .ok_or_else(|| MolviewError::AssetNotFound(uri.to_string()))
    }
}

// ============================================================================
// Molecule fixture
// ============================================================================
//
// Node 0 "Atom" (mesh 0) with child node 1 "Bond" (mesh 0, at +X).
// Clip "Vibrate": Atom translation (0,0,0) -> (0,1,0) over 1s.
// Clip "Spin":    Bond rotation identity -> 90° about Y over 2s.

pub const VIBRATE_DURATION: f32 = 1.0;
pub const SPIN_DURATION: f32 = 2.0;

pub fn molecule_buffer() -> Vec<u8> {
    fn floats(buf: &mut Vec<u8>, values: &[f32]) {
        for v in values {
            buf.extend_from_slice(&v.to_le_bytes());
        }
    }

    let mut buf = Vec::new();

    // @0 positions
    floats(&mut buf, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    // @36 indices (u16) + 2 bytes padding
    for i in [0_u16, 1, 2] {
        buf.extend_from_slice(&i.to_le_bytes());
    }
    buf.extend_from_slice(&[0, 0]);
    // @44 vibrate times
    floats(&mut buf, &[0.0, VIBRATE_DURATION]);
    // @52 vibrate translations
    floats(&mut buf, &[0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    // @76 spin times
    floats(&mut buf, &[0.0, SPIN_DURATION]);
    // @84 spin rotations
    let half = std::f32::consts::FRAC_PI_4;
    floats(&mut buf, &[0.0, 0.0, 0.0, 1.0, 0.0, half.sin(), 0.0, half.cos()]);

    assert_eq!(buf.len(), 116);
    buf
}

pub fn molecule_json(buffer_uri: Option<&str>, byte_length: usize) -> serde_json::Value {
    let mut buffer = json!({ "byteLength": byte_length });
    if let Some(uri) = buffer_uri {
        buffer["uri"] = json!(uri);
    }

    json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [
            { "name": "Atom", "mesh": 0, "children": [1] },
            { "name": "Bond", "mesh": 0, "translation": [1.0, 0.0, 0.0] }
        ],
        "meshes": [{
            "name": "Sphere",
            "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }]
        }],
        "animations": [
            {
                "name": "Vibrate",
                "samplers": [{ "input": 2, "output": 3, "interpolation": "LINEAR" }],
                "channels": [{ "sampler": 0, "target": { "node": 0, "path": "translation" } }]
            },
            {
                "name": "Spin",
                "samplers": [{ "input": 4, "output": 5, "interpolation": "LINEAR" }],
                "channels": [{ "sampler": 0, "target": { "node": 1, "path": "rotation" } }]
            }
        ],
        "buffers": [buffer],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6 },
            { "buffer": 0, "byteOffset": 44, "byteLength": 8 },
            { "buffer": 0, "byteOffset": 52, "byteLength": 24 },
            { "buffer": 0, "byteOffset": 76, "byteLength": 8 },
            { "buffer": 0, "byteOffset": 84, "byteLength": 32 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" },
            { "bufferView": 2, "componentType": 5126, "count": 2, "type": "SCALAR",
              "min": [0.0], "max": [VIBRATE_DURATION] },
            { "bufferView": 3, "componentType": 5126, "count": 2, "type": "VEC3" },
            { "bufferView": 4, "componentType": 5126, "count": 2, "type": "SCALAR",
              "min": [0.0], "max": [SPIN_DURATION] },
            { "bufferView": 5, "componentType": 5126, "count": 2, "type": "VEC4" }
        ]
    })
}

/// `.gltf` text with the buffer embedded as a base64 data URI.
pub fn molecule_gltf() -> Vec<u8> {
    let buffer = molecule_buffer();
    let uri = format!(
        "data:application/octet-stream;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&buffer)
    );
    molecule_json(Some(&uri), buffer.len()).to_string().into_bytes()
}

/// `.gltf` text referencing an external buffer file.
pub fn molecule_gltf_external(bin_uri: &str) -> Vec<u8> {
    molecule_json(Some(bin_uri), molecule_buffer().len())
        .to_string()
        .into_bytes()
}

/// Binary `.glb` container with the buffer in the BIN chunk.
pub fn molecule_glb() -> Vec<u8> {
    let mut bin = molecule_buffer();
    let mut json = molecule_json(None, bin.len()).to_string().into_bytes();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2_u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());
    glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(&json);
    glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"BIN\0");
    glb.extend_from_slice(&bin);
    glb
}
