use glam::{Affine3A, Quat, Vec3};

use crate::scene::node::SceneNode;
use crate::scene::transform::Transform;

/// Per-instance mutable copy of a model's node transforms.
///
/// The asset's scene graph is shared and immutable; every mounted model owns
/// a `Pose` that the animation mixer writes into each tick.
#[derive(Debug, Clone)]
pub struct Pose {
    bind: Vec<Transform>,
    locals: Vec<Transform>,
    worlds: Vec<Affine3A>,
}

impl Pose {
    #[must_use]
    pub fn from_nodes(nodes: &[SceneNode]) -> Self {
        let bind: Vec<Transform> = nodes.iter().map(|n| n.transform).collect();
        Self {
            locals: bind.clone(),
            worlds: vec![Affine3A::IDENTITY; bind.len()],
            bind,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.locals.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locals.is_empty()
    }

    /// Restores every local transform to the bind pose.
    pub fn reset_to_bind(&mut self) {
        self.locals.copy_from_slice(&self.bind);
    }

    #[must_use]
    pub fn local(&self, node: usize) -> Option<&Transform> {
        self.locals.get(node)
    }

    pub fn local_mut(&mut self, node: usize) -> Option<&mut Transform> {
        self.locals.get_mut(node)
    }

    #[must_use]
    pub fn world(&self, node: usize) -> Option<&Affine3A> {
        self.worlds.get(node)
    }

    #[must_use]
    pub fn worlds(&self) -> &[Affine3A] {
        &self.worlds
    }

    pub fn blend_translation(&mut self, node: usize, value: Vec3, weight: f32) {
        if let Some(local) = self.locals.get_mut(node) {
            local.position = local.position.lerp(value, weight.min(1.0));
        }
    }

    pub fn blend_rotation(&mut self, node: usize, value: Quat, weight: f32) {
        if let Some(local) = self.locals.get_mut(node) {
            local.rotation = local.rotation.slerp(value, weight.min(1.0));
        }
    }

    pub fn blend_scale(&mut self, node: usize, value: Vec3, weight: f32) {
        if let Some(local) = self.locals.get_mut(node) {
            local.scale = local.scale.lerp(value, weight.min(1.0));
        }
    }

    /// Recomputes world matrices top-down from `roots`, with `root_matrix`
    /// as the parent of every root.
    ///
    /// Nodes unreachable from `roots` keep their previous matrix; a node
    /// reachable twice (malformed hierarchy) is only visited once.
    pub fn update_world_matrices(&mut self, nodes: &[SceneNode], roots: &[usize], root_matrix: Affine3A) {
        let mut visited = vec![false; self.locals.len()];
        let mut stack: Vec<(usize, Affine3A)> = roots.iter().rev().map(|&r| (r, root_matrix)).collect();

        while let Some((index, parent)) = stack.pop() {
            let Some(local) = self.locals.get(index) else {
                continue;
            };
            if std::mem::replace(&mut visited[index], true) {
                continue;
            }

            let world = parent * local.local_matrix();
            self.worlds[index] = world;

            if let Some(node) = nodes.get(index) {
                stack.extend(node.children.iter().rev().map(|&c| (c, world)));
            }
        }
    }
}
