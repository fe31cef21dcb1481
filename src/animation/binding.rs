use crate::animation::clip::AnimationClip;
use crate::scene::SceneNode;

/// Defines the target property for animation data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation, // Maps to transform.position
    Rotation,    // Maps to transform.rotation
    Scale,       // Maps to transform.scale
}

/// Binding relationship: maps track `track_index` of a clip to the target
/// property of node `node_index` in the animated pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyBinding {
    pub track_index: usize,
    pub node_index: usize,
    pub target: TargetPath,
}

pub struct Binder;

impl Binder {
    /// Resolves every track of `clip` to a node of `nodes`.
    ///
    /// The recorded node index wins when it names a node with the same name;
    /// otherwise the first node carrying the track's node name is used.
    /// Tracks that resolve to nothing are dropped.
    #[must_use]
    pub fn bind(nodes: &[SceneNode], clip: &AnimationClip) -> Vec<PropertyBinding> {
        let mut bindings = Vec::with_capacity(clip.tracks.len());

        for (track_index, track) in clip.tracks.iter().enumerate() {
            let meta = &track.meta;

            let by_index = meta
                .node_index
                .filter(|&i| nodes.get(i).is_some_and(|n| n.name == meta.node_name));
            let resolved =
                by_index.or_else(|| nodes.iter().position(|n| n.name == meta.node_name));

            if let Some(node_index) = resolved {
                bindings.push(PropertyBinding {
                    track_index,
                    node_index,
                    target: meta.target,
                });
            } else {
                log::warn!(
                    "Clip '{}': no node named '{}', track skipped",
                    clip.name,
                    meta.node_name
                );
            }
        }

        bindings
    }
}
