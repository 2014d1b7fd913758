use crate::SceneError;
use crate::geometry::MeshData;
use crate::light::Light;
use crate::material::Material;
use crate::store::{
    GeometryHandle, GeometryStore, MaterialHandle, MaterialStore, TextureHandle, TextureStore,
};
use glam::Mat4;
use scenelab_common::{Color, ObjectId, Transform};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An event record produced by structural mutations of the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    Added { id: ObjectId, name: String },
    Removed { id: ObjectId },
    /// The object's geometry was swapped; `old` has been disposed unless shared.
    GeometryReplaced {
        id: ObjectId,
        old: GeometryHandle,
        new: GeometryHandle,
    },
}

/// A geometry drawn with a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drawable {
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Group,
    Mesh(Drawable),
    Points(Drawable),
    Lines(Drawable),
    Light(Light),
    /// Wire gizmo visualizing another light node.
    LightHelper { light: ObjectId, size: f32 },
}

impl NodeKind {
    pub fn drawable(&self) -> Option<Drawable> {
        self.draw_kind().map(|(_, d)| d)
    }

    pub fn draw_kind(&self) -> Option<(DrawKind, Drawable)> {
        match self {
            Self::Mesh(d) => Some((DrawKind::Mesh, *d)),
            Self::Points(d) => Some((DrawKind::Points, *d)),
            Self::Lines(d) => Some((DrawKind::Lines, *d)),
            _ => None,
        }
    }

    fn drawable_mut(&mut self) -> Option<&mut Drawable> {
        match self {
            Self::Mesh(d) | Self::Points(d) | Self::Lines(d) => Some(d),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Mesh(_) => "mesh",
            Self::Points(_) => "points",
            Self::Lines(_) => "lines",
            Self::Light(_) => "light",
            Self::LightHelper { .. } => "light-helper",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub parent: Option<ObjectId>,
    pub visible: bool,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub kind: NodeKind,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            parent: None,
            visible: true,
            cast_shadow: false,
            receive_shadow: false,
            kind,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

impl Fog {
    /// Blend factor in `0..=1` at view distance `d`.
    pub fn factor(&self, d: f32) -> f32 {
        if self.far <= self.near {
            return 1.0;
        }
        ((d - self.near) / (self.far - self.near)).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Background {
    /// Renderer clear color.
    #[default]
    Default,
    Color(Color),
    /// Cube or equirectangular texture drawn behind everything.
    Texture(TextureHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawKind {
    Mesh,
    Points,
    Lines,
}

/// A visible drawable resolved to world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub id: ObjectId,
    pub kind: DrawKind,
    pub drawable: Drawable,
    pub world: Mat4,
}

/// Everything a demo draws.
///
/// Objects live in a BTreeMap so iteration order is stable for a given set of ids.
/// Resources are referenced by handle; the stores own the data.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: BTreeMap<ObjectId, SceneNode>,
    pub geometries: GeometryStore,
    pub textures: TextureStore,
    pub materials: MaterialStore,
    pub background: Background,
    pub fog: Option<Fog>,
    /// Image-based lighting source for lit materials.
    pub environment: Option<TextureHandle>,
    pub environment_intensity: f32,
    event_log: Vec<SceneEvent>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            geometries: GeometryStore::new(),
            textures: TextureStore::new(),
            materials: MaterialStore::new(),
            background: Background::Default,
            fog: None,
            environment: None,
            environment_intensity: 1.0,
            event_log: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &BTreeMap<ObjectId, SceneNode> {
        &self.nodes
    }

    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Add a root-level node. Returns its id.
    pub fn add(&mut self, node: SceneNode) -> ObjectId {
        let id = ObjectId::new();
        self.event_log.push(SceneEvent::Added {
            id,
            name: node.name.clone(),
        });
        self.nodes.insert(id, SceneNode { parent: None, ..node });
        id
    }

    /// Add a node under `parent`; its transform becomes relative to the parent.
    pub fn add_child(&mut self, parent: ObjectId, node: SceneNode) -> Result<ObjectId, SceneError> {
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::ObjectNotFound(parent));
        }
        let id = self.add(node);
        if let Some(n) = self.nodes.get_mut(&id) {
            n.parent = Some(parent);
        }
        Ok(id)
    }

    /// Convenience: store `mesh` and `material`, then add a mesh node.
    pub fn add_mesh(&mut self, name: &str, mesh: MeshData, material: Material) -> ObjectId {
        let drawable = self.store_drawable(mesh, material);
        self.add(SceneNode::new(name, NodeKind::Mesh(drawable)))
    }

    pub fn add_points(&mut self, name: &str, mesh: MeshData, material: Material) -> ObjectId {
        let drawable = self.store_drawable(mesh, material);
        self.add(SceneNode::new(name, NodeKind::Points(drawable)))
    }

    pub fn add_lines(&mut self, name: &str, mesh: MeshData, material: Material) -> ObjectId {
        let drawable = self.store_drawable(mesh, material);
        self.add(SceneNode::new(name, NodeKind::Lines(drawable)))
    }

    pub fn add_light(&mut self, name: &str, light: Light) -> ObjectId {
        self.add(SceneNode::new(name, NodeKind::Light(light)))
    }

    pub fn add_group(&mut self, name: &str) -> ObjectId {
        self.add(SceneNode::new(name, NodeKind::Group))
    }

    fn store_drawable(&mut self, mesh: MeshData, material: Material) -> Drawable {
        Drawable {
            geometry: self.geometries.insert(mesh),
            material: self.materials.insert(material),
        }
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    /// Shorthand for the mutable transform of a node.
    pub fn transform_mut(&mut self, id: ObjectId) -> Option<&mut Transform> {
        self.nodes.get_mut(&id).map(|n| &mut n.transform)
    }

    pub fn find_by_name(&self, name: &str) -> Option<ObjectId> {
        self.nodes
            .iter()
            .find(|(_, n)| n.name == name)
            .map(|(id, _)| *id)
    }

    /// Material of a drawable node.
    pub fn material_mut(&mut self, id: ObjectId) -> Option<&mut Material> {
        let drawable = self.nodes.get(&id)?.kind.drawable()?;
        self.materials.get_mut(drawable.material)
    }

    /// Light payload of a light node.
    pub fn light_mut(&mut self, id: ObjectId) -> Option<&mut Light> {
        match &mut self.nodes.get_mut(&id)?.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    /// Remove a node and all of its descendants.
    pub fn remove(&mut self, id: ObjectId) -> Result<SceneNode, SceneError> {
        let node = self
            .nodes
            .remove(&id)
            .ok_or(SceneError::ObjectNotFound(id))?;
        self.event_log.push(SceneEvent::Removed { id });
        let children: Vec<ObjectId> = self
            .nodes
            .iter()
            .filter(|(_, n)| n.parent == Some(id))
            .map(|(c, _)| *c)
            .collect();
        for child in children {
            self.remove(child)?;
        }
        Ok(node)
    }

    /// Local-to-world matrix composed through the parent chain.
    pub fn world_matrix(&self, id: ObjectId) -> Option<Mat4> {
        let mut node = self.nodes.get(&id)?;
        let mut m = node.transform.matrix();
        let mut depth = 0;
        while let Some(parent) = node.parent {
            depth += 1;
            if depth > self.nodes.len() {
                tracing::error!(id = %id.short(), "parent cycle in scene graph");
                return None;
            }
            node = self.nodes.get(&parent)?;
            m = node.transform.matrix() * m;
        }
        Some(m)
    }

    /// Visible if the node and every ancestor are visible.
    pub fn is_visible(&self, id: ObjectId) -> bool {
        let mut current = Some(id);
        let mut depth = 0;
        while let Some(c) = current {
            let Some(node) = self.nodes.get(&c) else {
                return false;
            };
            if !node.visible || depth > self.nodes.len() {
                return false;
            }
            current = node.parent;
            depth += 1;
        }
        true
    }

    /// Visible drawables in world space.
    pub fn draw_items(&self) -> Vec<DrawItem> {
        self.nodes
            .iter()
            .filter_map(|(id, node)| {
                let (kind, drawable) = node.kind.draw_kind()?;
                if !self.is_visible(*id) {
                    return None;
                }
                Some(DrawItem {
                    id: *id,
                    kind,
                    drawable,
                    world: self.world_matrix(*id)?,
                })
            })
            .collect()
    }

    /// Lights that contribute to shading (visible), with their world matrices.
    pub fn lights(&self) -> Vec<(ObjectId, Light, Mat4)> {
        self.nodes
            .iter()
            .filter_map(|(id, node)| match &node.kind {
                NodeKind::Light(light) if self.is_visible(*id) => {
                    Some((*id, *light, self.world_matrix(*id)?))
                }
                _ => None,
            })
            .collect()
    }

    /// Swap the geometry of a drawable node.
    ///
    /// The replacement is validated and stored before the swap, so the node never
    /// points at a partial geometry. The previous geometry is disposed unless
    /// another node still references it.
    pub fn replace_geometry(
        &mut self,
        id: ObjectId,
        mesh: MeshData,
    ) -> Result<GeometryHandle, SceneError> {
        let node = self.nodes.get(&id).ok_or(SceneError::ObjectNotFound(id))?;
        let old = node
            .kind
            .drawable()
            .ok_or(SceneError::NotDrawable(id))?
            .geometry;
        mesh.validate().map_err(SceneError::InvalidGeometry)?;

        let new = self.geometries.insert(mesh);
        if let Some(d) = self.nodes.get_mut(&id).and_then(|n| n.kind.drawable_mut()) {
            d.geometry = new;
        }

        let shared = self
            .nodes
            .values()
            .any(|n| n.kind.drawable().is_some_and(|d| d.geometry == old));
        if !shared {
            self.geometries.dispose(old)?;
        }
        tracing::debug!(id = %id.short(), old = old.0, new = new.0, shared, "geometry replaced");
        self.event_log
            .push(SceneEvent::GeometryReplaced { id, old, new });
        Ok(new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{box_geometry, sphere};
    use glam::Vec3;
    use scenelab_common::Euler;

    fn cube() -> MeshData {
        box_geometry(1.0, 1.0, 1.0, 1, 1, 1)
    }

    #[test]
    fn add_logs_event() {
        let mut scene = Scene::new();
        let id = scene.add_mesh("cube", cube(), Material::default());
        assert_eq!(scene.len(), 1);
        assert_eq!(
            scene.events(),
            &[SceneEvent::Added {
                id,
                name: "cube".into()
            }]
        );
        assert_eq!(scene.drain_events().len(), 1);
        assert!(scene.events().is_empty());
    }

    #[test]
    fn replace_geometry_disposes_old_and_points_to_new() {
        let mut scene = Scene::new();
        let id = scene.add_mesh("cube", cube(), Material::default());
        let old = scene.get(id).unwrap().kind.drawable().unwrap().geometry;

        let new = scene
            .replace_geometry(id, box_geometry(1.0, 1.0, 1.0, 4, 4, 4))
            .unwrap();

        assert_ne!(old, new);
        assert!(!scene.geometries.is_alive(old));
        assert_eq!(scene.get(id).unwrap().kind.drawable().unwrap().geometry, new);
        assert_eq!(scene.geometries.get(new).unwrap().vertex_count(), 6 * 25);
        assert!(matches!(
            scene.events().last(),
            Some(SceneEvent::GeometryReplaced { .. })
        ));
    }

    #[test]
    fn invalid_replacement_leaves_node_untouched() {
        let mut scene = Scene::new();
        let id = scene.add_mesh("cube", cube(), Material::default());
        let old = scene.get(id).unwrap().kind.drawable().unwrap().geometry;

        let mut broken = cube();
        broken.indices.push(10_000);
        broken.indices.push(0);
        broken.indices.push(1);
        assert!(matches!(
            scene.replace_geometry(id, broken),
            Err(SceneError::InvalidGeometry(_))
        ));
        assert!(scene.geometries.is_alive(old));
        assert_eq!(scene.get(id).unwrap().kind.drawable().unwrap().geometry, old);
        assert_eq!(scene.geometries.len(), 1);
    }

    #[test]
    fn shared_geometry_survives_replacement() {
        let mut scene = Scene::new();
        let a = scene.add_mesh("a", cube(), Material::default());
        let drawable = scene.get(a).unwrap().kind.drawable().unwrap();
        let b = scene.add(SceneNode::new("b", NodeKind::Mesh(drawable)));

        scene.replace_geometry(a, sphere(1.0, 8, 6)).unwrap();
        assert!(scene.geometries.is_alive(drawable.geometry));
        assert_eq!(
            scene.get(b).unwrap().kind.drawable().unwrap().geometry,
            drawable.geometry
        );
    }

    #[test]
    fn replace_on_group_is_rejected() {
        let mut scene = Scene::new();
        let g = scene.add_group("group");
        assert!(matches!(
            scene.replace_geometry(g, cube()),
            Err(SceneError::NotDrawable(_))
        ));
    }

    #[test]
    fn world_matrix_composes_parents() {
        let mut scene = Scene::new();
        let group = scene.add_group("group");
        scene.transform_mut(group).unwrap().position = Vec3::new(0.0, 2.0, 0.0);
        let child = scene
            .add_child(
                group,
                SceneNode::new("child", NodeKind::Group)
                    .with_transform(Transform::from_position(Vec3::new(1.0, 0.0, 0.0))),
            )
            .unwrap();
        let p = scene.world_matrix(child).unwrap().transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-6);

        scene.transform_mut(group).unwrap().rotation =
            Euler::new(0.0, std::f32::consts::FRAC_PI_2, 0.0);
        let p = scene.world_matrix(child).unwrap().transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(0.0, 2.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn hidden_parent_hides_children() {
        let mut scene = Scene::new();
        let group = scene.add_group("group");
        let mesh = scene.add_mesh("cube", cube(), Material::default());
        scene.get_mut(mesh).unwrap().parent = Some(group);
        assert_eq!(scene.draw_items().len(), 1);
        scene.get_mut(group).unwrap().visible = false;
        assert!(!scene.is_visible(mesh));
        assert!(scene.draw_items().is_empty());
    }

    #[test]
    fn remove_takes_descendants() {
        let mut scene = Scene::new();
        let group = scene.add_group("group");
        scene
            .add_child(group, SceneNode::new("child", NodeKind::Group))
            .unwrap();
        scene.remove(group).unwrap();
        assert!(scene.is_empty());
    }

    #[test]
    fn add_child_requires_parent() {
        let mut scene = Scene::new();
        assert!(matches!(
            scene.add_child(ObjectId::new(), SceneNode::new("x", NodeKind::Group)),
            Err(SceneError::ObjectNotFound(_))
        ));
    }

    #[test]
    fn fog_factor_ramps_linearly() {
        let fog = Fog {
            color: Color::BLACK,
            near: 1.0,
            far: 15.0,
        };
        assert_eq!(fog.factor(0.5), 0.0);
        assert!((fog.factor(8.0) - 0.5).abs() < 1e-6);
        assert_eq!(fog.factor(20.0), 1.0);
    }
}
