use glam::Vec3;
use rand::Rng;
use scenelab_common::{ObjectId, Transform};
use scenelab_input::OrbitControls;
use scenelab_render::CameraRig;
use scenelab_runtime::DemoContext;
use scenelab_scene::{
    Drawable, GeometryHandle, LightKind, MaterialHandle, MeshData, NodeKind, Scene, SceneError,
    SceneNode,
};
use scenelab_tools::PanelEvent;

/// Mesh node over stored geometry and material, so several nodes can share them.
pub(crate) fn shared_node(
    name: &str,
    geometry: GeometryHandle,
    material: MaterialHandle,
    transform: Transform,
) -> SceneNode {
    SceneNode::new(name, NodeKind::Mesh(Drawable { geometry, material })).with_transform(transform)
}

pub(crate) fn add_shared(
    scene: &mut Scene,
    name: &str,
    geometry: GeometryHandle,
    material: MaterialHandle,
    transform: Transform,
) -> ObjectId {
    scene.add(shared_node(name, geometry, material, transform))
}

/// Store `mesh` and `material` and attach the new mesh node under `parent`.
pub(crate) fn add_child_mesh(
    scene: &mut Scene,
    parent: ObjectId,
    name: &str,
    mesh: MeshData,
    material: MaterialHandle,
    transform: Transform,
) -> Result<ObjectId, SceneError> {
    let geometry = scene.geometries.insert(mesh);
    let node = SceneNode::new(name, NodeKind::Mesh(Drawable { geometry, material }))
        .with_transform(transform);
    scene.add_child(parent, node)
}

/// 75 degree perspective camera at `eye` with damped orbit controls around the origin.
pub(crate) fn orbit_camera(ctx: &mut DemoContext, eye: Vec3) {
    ctx.camera = CameraRig::perspective(75.0, ctx.viewport.aspect(), 0.1, 100.0).at(eye);
    ctx.controls = Some(OrbitControls::damped());
}

/// Uniform sample in the cube `[-extent/2, extent/2]^3`.
pub(crate) fn spread(rng: &mut impl Rng, extent: f32) -> Vec3 {
    Vec3::new(
        (rng.r#gen::<f32>() - 0.5) * extent,
        (rng.r#gen::<f32>() - 0.5) * extent,
        (rng.r#gen::<f32>() - 0.5) * extent,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    X,
    Y,
    Z,
}

/// Scene field a panel param writes to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Binding {
    LightIntensity(ObjectId),
    LightColor(ObjectId),
    /// Ground color of a hemisphere light.
    GroundColor(ObjectId),
    Position(ObjectId, Axis),
    Visible(ObjectId),
    MaterialColor(MaterialHandle),
    Wireframe(MaterialHandle),
    Roughness(MaterialHandle),
    Metalness(MaterialHandle),
}

/// Param key to scene field table. Values apply on every change, not only on commit.
#[derive(Debug, Clone, Default)]
pub(crate) struct Bindings {
    entries: Vec<(String, Binding)>,
}

impl Bindings {
    pub fn bind(&mut self, key: &str, binding: Binding) -> &mut Self {
        self.entries.push((key.to_string(), binding));
        self
    }

    /// Write the event's value into every field bound to its key.
    /// Returns false when nothing is bound to the key.
    pub fn apply(&self, scene: &mut Scene, event: &PanelEvent) -> bool {
        let value = event.value();
        let mut hit = false;
        for (_, binding) in self.entries.iter().filter(|(k, _)| k == event.key()) {
            hit = true;
            match *binding {
                Binding::LightIntensity(id) => {
                    if let (Some(light), Some(v)) = (scene.light_mut(id), value.as_f32()) {
                        light.intensity = v;
                    }
                }
                Binding::LightColor(id) => {
                    if let (Some(light), Some(c)) = (scene.light_mut(id), value.as_color()) {
                        light.color = c;
                    }
                }
                Binding::GroundColor(id) => {
                    if let (Some(light), Some(c)) = (scene.light_mut(id), value.as_color()) {
                        if let LightKind::Hemisphere { ground } = &mut light.kind {
                            *ground = c;
                        }
                    }
                }
                Binding::Position(id, axis) => {
                    if let (Some(t), Some(v)) = (scene.transform_mut(id), value.as_f32()) {
                        match axis {
                            Axis::X => t.position.x = v,
                            Axis::Y => t.position.y = v,
                            Axis::Z => t.position.z = v,
                        }
                    }
                }
                Binding::Visible(id) => {
                    if let (Some(node), Some(v)) = (scene.get_mut(id), value.as_bool()) {
                        node.visible = v;
                    }
                }
                Binding::MaterialColor(h) => {
                    if let (Some(m), Some(c)) = (scene.materials.get_mut(h), value.as_color()) {
                        m.color = c;
                    }
                }
                Binding::Wireframe(h) => {
                    if let (Some(m), Some(v)) = (scene.materials.get_mut(h), value.as_bool()) {
                        m.wireframe = v;
                    }
                }
                Binding::Roughness(h) => {
                    if let (Some(m), Some(v)) = (scene.materials.get_mut(h), value.as_f32()) {
                        m.roughness = v;
                    }
                }
                Binding::Metalness(h) => {
                    if let (Some(m), Some(v)) = (scene.materials.get_mut(h), value.as_f32()) {
                        m.metalness = v;
                    }
                }
            }
        }
        hit
    }
}

/// Handle of the material a drawable node uses.
pub(crate) fn material_of(scene: &Scene, id: ObjectId) -> Option<MaterialHandle> {
    scene.get(id)?.kind.drawable().map(|d| d.material)
}
