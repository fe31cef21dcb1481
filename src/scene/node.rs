use crate::scene::transform::Transform;

/// A node of a loaded model's scene graph.
///
/// Nodes live in a flat array owned by the model asset; hierarchy is
/// expressed through indices into that array.
#[derive(Debug, Clone, Default)]
pub struct SceneNode {
    pub name: String,
    /// Bind-pose local transform.
    pub transform: Transform,
    pub children: Vec<usize>,
    /// Index into the asset's mesh list.
    pub mesh: Option<usize>,
}

impl SceneNode {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn with_mesh(mut self, mesh: usize) -> Self {
        self.mesh = Some(mesh);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<usize>) -> Self {
        self.children = children;
        self
    }
}
