use std::sync::Arc;

use base64::Engine as _;
use glam::{Quat, Vec3};

use crate::animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData, TrackMeta,
};
use crate::assets::io::{AssetReader, parent_dir};
use crate::assets::model::{BoundingBox, MeshData, ModelAsset, Primitive};
use crate::errors::{MolviewError, Result};
use crate::scene::{SceneNode, Transform};

/// Decodes `.glb` and `.gltf` files into a [`ModelAsset`].
///
/// External buffers are resolved relative to the model's own path through
/// the same reader; `data:` URIs are decoded in place.
pub struct GltfLoader<'a> {
    reader: &'a dyn AssetReader,
    path: &'a str,
}

impl<'a> GltfLoader<'a> {
    pub fn load(reader: &'a dyn AssetReader, path: &'a str) -> Result<ModelAsset> {
        let bytes = reader.read_bytes(path)?;
        Self { reader, path }.load_from_bytes(&bytes)
    }

    /// Decodes an already-read model. Buffer URIs are still resolved through
    /// `reader` relative to `path`.
    pub fn load_slice(reader: &'a dyn AssetReader, path: &'a str, bytes: &[u8]) -> Result<ModelAsset> {
        Self { reader, path }.load_from_bytes(bytes)
    }

    fn load_from_bytes(&self, bytes: &[u8]) -> Result<ModelAsset> {
        let gltf = gltf::Gltf::from_slice(bytes)?;

        for ext in gltf.extensions_required() {
            log::warn!("'{}' requires unsupported extension {ext}", self.path);
        }

        let buffers = self.load_buffers(&gltf)?;

        // 1. Nodes
        let nodes: Vec<SceneNode> = gltf.nodes().map(|n| Self::load_node(&n)).collect();

        // 2. Roots of the default scene
        let roots = Self::find_roots(&gltf, &nodes);

        // 3. Meshes
        let meshes = gltf
            .meshes()
            .map(|mesh| self.load_mesh(&mesh, &buffers))
            .collect::<Result<Vec<_>>>()?;

        // 4. Animations
        let clips = self.load_animations(&gltf, &buffers);

        let mut asset = ModelAsset {
            source: self.path.to_string(),
            nodes,
            roots,
            meshes,
            clips,
            bounds: BoundingBox::EMPTY,
        };
        let pose = asset.bind_pose();
        asset.bounds = asset.posed_bounds(&pose);

        log::info!(
            "Loaded '{}': {} nodes, {} meshes, {} clips",
            self.path,
            asset.nodes.len(),
            asset.meshes.len(),
            asset.clips.len()
        );

        Ok(asset)
    }

    fn invalid(&self, reason: impl Into<String>) -> MolviewError {
        MolviewError::InvalidAsset {
            path: self.path.to_string(),
            reason: reason.into(),
        }
    }

    fn load_buffers(&self, gltf: &gltf::Gltf) -> Result<Vec<Vec<u8>>> {
        let mut buffer_data = Vec::new();
        for buffer in gltf.buffers() {
            let data = match buffer.source() {
                gltf::buffer::Source::Bin => gltf
                    .blob
                    .clone()
                    .ok_or_else(|| self.invalid("missing GLB binary chunk"))?,
                gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => decode_data_uri(uri)?,
                gltf::buffer::Source::Uri(uri) => {
                    let resolved = format!("{}{uri}", parent_dir(self.path));
                    self.reader.read_bytes(&resolved)?
                }
            };

            if data.len() < buffer.length() {
                return Err(self.invalid(format!(
                    "buffer {} holds {} bytes, {} declared",
                    buffer.index(),
                    data.len(),
                    buffer.length()
                )));
            }
            buffer_data.push(data);
        }
        Ok(buffer_data)
    }

    fn load_node(node: &gltf::Node) -> SceneNode {
        let (t, r, s) = node.transform().decomposed();
        let transform = Transform {
            position: Vec3::from_array(t),
            rotation: Quat::from_array(r).normalize(),
            scale: Vec3::from_array(s),
        };

        SceneNode {
            name: node_name(node),
            transform,
            children: node.children().map(|c| c.index()).collect(),
            mesh: node.mesh().map(|m| m.index()),
        }
    }

    fn find_roots(gltf: &gltf::Gltf, nodes: &[SceneNode]) -> Vec<usize> {
        if let Some(scene) = gltf.default_scene().or_else(|| gltf.scenes().next()) {
            return scene.nodes().map(|n| n.index()).collect();
        }

        // No scene: every node that is nobody's child is a root.
        let mut is_child = vec![false; nodes.len()];
        for child in nodes.iter().flat_map(|n| &n.children) {
            if let Some(flag) = is_child.get_mut(*child) {
                *flag = true;
            }
        }
        (0..nodes.len()).filter(|&i| !is_child[i]).collect()
    }

    fn load_mesh(&self, mesh: &gltf::Mesh, buffers: &[Vec<u8>]) -> Result<MeshData> {
        let mut primitives = Vec::new();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "'{}': mesh {} uses {:?} primitives, skipped",
                    self.path,
                    mesh.index(),
                    primitive.mode()
                );
                continue;
            }
            if let Some(p) = self.load_primitive(&primitive, buffers)? {
                primitives.push(p);
            }
        }

        Ok(MeshData {
            name: mesh.name().map_or_else(|| format!("Mesh_{}", mesh.index()), str::to_string),
            primitives,
        })
    }

    fn load_primitive(&self, primitive: &gltf::Primitive, buffers: &[Vec<u8>]) -> Result<Option<Primitive>> {
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

        let Some(positions) = reader.read_positions() else {
            log::warn!("'{}': primitive without POSITION, skipped", self.path);
            return Ok(None);
        };
        let positions: Vec<[f32; 3]> = positions.collect();
        let vertex_count = positions.len();
        if vertex_count == 0 {
            return Ok(None);
        }

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..vertex_count as u32).collect(),
        };
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(self.invalid(format!("index {bad} out of range for {vertex_count} vertices")));
        }
        if indices.len() < 3 {
            return Ok(None);
        }

        let normals = match reader.read_normals() {
            Some(normals) => normals.collect::<Vec<_>>(),
            None => compute_vertex_normals(&positions, &indices),
        };
        if normals.len() != vertex_count {
            return Err(self.invalid("NORMAL count does not match POSITION count"));
        }

        let base_color = primitive
            .material()
            .pbr_metallic_roughness()
            .base_color_factor();

        let bounds = BoundingBox::from_points(positions.iter().map(|p| Vec3::from_array(*p)));

        Ok(Some(Primitive {
            positions,
            normals,
            indices,
            base_color,
            bounds,
        }))
    }

    fn load_animations(&self, gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Vec<Arc<AnimationClip>> {
        let mut animations = Vec::new();

        for anim in gltf.animations() {
            let mut tracks = Vec::new();

            for channel in anim.channels() {
                let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
                let target = channel.target();
                let gltf_node = target.node();

                let Some(inputs) = reader.read_inputs() else {
                    log::warn!("'{}': channel without keyframe times, skipped", self.path);
                    continue;
                };
                let times: Vec<f32> = inputs.collect();

                let interpolation = match channel.sampler().interpolation() {
                    gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
                    gltf::animation::Interpolation::Step => InterpolationMode::Step,
                    gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
                };

                let (target_path, data) = match reader.read_outputs() {
                    Some(gltf::animation::util::ReadOutputs::Translations(iter)) => (
                        TargetPath::Translation,
                        TrackData::Vector3(KeyframeTrack::new(
                            times,
                            iter.map(Vec3::from_array).collect(),
                            interpolation,
                        )),
                    ),
                    Some(gltf::animation::util::ReadOutputs::Rotations(iter)) => (
                        TargetPath::Rotation,
                        TrackData::Quaternion(KeyframeTrack::new(
                            times,
                            iter.into_f32().map(Quat::from_array).collect(),
                            interpolation,
                        )),
                    ),
                    Some(gltf::animation::util::ReadOutputs::Scales(iter)) => (
                        TargetPath::Scale,
                        TrackData::Vector3(KeyframeTrack::new(
                            times,
                            iter.map(Vec3::from_array).collect(),
                            interpolation,
                        )),
                    ),
                    Some(gltf::animation::util::ReadOutputs::MorphTargetWeights(_)) => {
                        log::warn!(
                            "'{}': morph target animation on node {} is not supported, skipped",
                            self.path,
                            gltf_node.index()
                        );
                        continue;
                    }
                    None => {
                        log::warn!("'{}': channel without output values, skipped", self.path);
                        continue;
                    }
                };

                if !keys_consistent(&data) {
                    log::warn!(
                        "'{}': channel on node {} has mismatched key counts, skipped",
                        self.path,
                        gltf_node.index()
                    );
                    continue;
                }

                tracks.push(Track {
                    meta: TrackMeta {
                        node_name: node_name(&gltf_node),
                        node_index: Some(gltf_node.index()),
                        target: target_path,
                    },
                    data,
                });
            }

            let name = anim.name().map_or_else(|| format!("Animation_{}", anim.index()), str::to_string);
            animations.push(Arc::new(AnimationClip::new(name, tracks)));
        }

        animations
    }
}

fn node_name(node: &gltf::Node) -> String {
    node.name().map_or_else(|| format!("Node_{}", node.index()), str::to_string)
}

/// Times and values agree in count, accounting for cubic-spline tangents.
fn keys_consistent(data: &TrackData) -> bool {
    fn check<T: crate::animation::Interpolatable>(track: &KeyframeTrack<T>) -> bool {
        let per_key = if track.interpolation == InterpolationMode::CubicSpline { 3 } else { 1 };
        !track.times.is_empty() && track.values.len() == track.times.len() * per_key
    }
    match data {
        TrackData::Vector3(t) => check(t),
        TrackData::Quaternion(t) => check(t),
    }
}

/// Decodes a base64 `data:` URI into its payload.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| MolviewError::DataUriError("missing 'data:' prefix".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| MolviewError::DataUriError("missing ',' separator".to_string()))?;

    if !header.ends_with(";base64") {
        return Err(MolviewError::DataUriError(format!(
            "only base64 data URIs are supported, got '{header}'"
        )));
    }

    Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
}

/// Area-weighted smooth normals for meshes that ship without them.
fn compute_vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (pa, pb, pc) = (
            Vec3::from_array(positions[a]),
            Vec3::from_array(positions[b]),
            Vec3::from_array(positions[c]),
        );
        let face = (pb - pa).cross(pc - pa);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }

    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}
