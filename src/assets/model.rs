use std::sync::Arc;

use glam::{Affine3A, Vec3};

use crate::animation::AnimationClip;
use crate::scene::{Pose, SceneNode};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points.into_iter().fold(Self::EMPTY, |mut b, p| {
            b.expand_point(p);
            b
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    pub fn expand_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn union(&mut self, other: &Self) {
        if !other.is_empty() {
            self.expand_point(other.min);
            self.expand_point(other.max);
        }
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn radius(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            (self.max - self.min).length() * 0.5
        }
    }

    /// Bounds of this box after `transform`, re-fitted to the world axes.
    #[must_use]
    pub fn transformed(&self, transform: &Affine3A) -> Self {
        if self.is_empty() {
            return *self;
        }
        let corners = (0..8).map(|i| {
            Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            )
        });
        Self::from_points(corners.map(|c| transform.transform_point3(c)))
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// One drawable piece of a mesh: indexed triangles with a flat base color.
#[derive(Debug, Clone)]
pub struct Primitive {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    /// Linear RGBA base color factor of the primitive's material.
    pub base_color: [f32; 4],
    pub bounds: BoundingBox,
}

#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub name: String,
    pub primitives: Vec<Primitive>,
}

/// A decoded glTF model: immutable once loaded and shared by every viewport
/// that mounts it.
#[derive(Debug, Clone)]
pub struct ModelAsset {
    /// Path the asset was requested with.
    pub source: String,
    pub nodes: Vec<SceneNode>,
    /// Root nodes of the default scene.
    pub roots: Vec<usize>,
    pub meshes: Vec<MeshData>,
    pub clips: Vec<Arc<AnimationClip>>,
    /// Bounds of the bind pose in model space.
    pub bounds: BoundingBox,
}

impl ModelAsset {
    /// A fresh pose in the bind configuration with world matrices resolved.
    #[must_use]
    pub fn bind_pose(&self) -> Pose {
        let mut pose = Pose::from_nodes(&self.nodes);
        pose.update_world_matrices(&self.nodes, &self.roots, Affine3A::IDENTITY);
        pose
    }

    #[must_use]
    pub fn clip_by_name(&self, name: &str) -> Option<&Arc<AnimationClip>> {
        self.clips.iter().find(|c| c.name == name)
    }

    /// Node indices that carry a mesh, in array order.
    pub fn mesh_nodes(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.mesh.map(|m| (i, m)))
    }

    /// Bounds of `pose` in model space.
    #[must_use]
    pub fn posed_bounds(&self, pose: &Pose) -> BoundingBox {
        let mut bounds = BoundingBox::EMPTY;
        for (node, mesh) in self.mesh_nodes() {
            let (Some(world), Some(mesh)) = (pose.world(node), self.meshes.get(mesh)) else {
                continue;
            };
            for primitive in &mesh.primitives {
                bounds.union(&primitive.bounds.transformed(world));
            }
        }
        bounds
    }
}
