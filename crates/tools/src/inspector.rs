use scenelab_common::ObjectId;
use scenelab_scene::{NodeKind, Scene};

/// Read-only queries against a scene for the debug panel and the CLI.
pub struct SceneInspector;

impl SceneInspector {
    pub fn summary(scene: &Scene) -> SceneSummary {
        let mut summary = SceneSummary {
            objects: scene.len(),
            geometries: scene.geometries.len(),
            textures: scene.textures.len(),
            textures_loaded: scene.textures.iter().filter(|(_, t)| t.is_loaded()).count(),
            events: scene.events().len(),
            ..SceneSummary::default()
        };
        for node in scene.nodes().values() {
            match node.kind {
                NodeKind::Mesh(_) => summary.meshes += 1,
                NodeKind::Points(_) => summary.points += 1,
                NodeKind::Light(_) => summary.lights += 1,
                _ => {}
            }
        }
        summary
    }

    pub fn inspect(scene: &Scene, id: ObjectId) -> Option<ObjectInfo> {
        scene.get(id).map(|node| {
            let t = node.transform;
            ObjectInfo {
                id,
                name: node.name.clone(),
                kind: node.kind.label(),
                position: t.position.to_array(),
                rotation: [t.rotation.x, t.rotation.y, t.rotation.z],
                scale: t.scale.to_array(),
                visible: scene.is_visible(id),
            }
        })
    }

    pub fn list(scene: &Scene) -> Vec<(ObjectId, String)> {
        scene
            .nodes()
            .iter()
            .map(|(id, node)| (*id, node.name.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneSummary {
    pub objects: usize,
    pub meshes: usize,
    pub points: usize,
    pub lights: usize,
    pub geometries: usize,
    pub textures: usize,
    pub textures_loaded: usize,
    pub events: usize,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: objects={} meshes={} points={} lights={} geometries={} textures={}/{}",
            self.objects,
            self.meshes,
            self.points,
            self.lights,
            self.geometries,
            self.textures_loaded,
            self.textures
        )
    }
}

#[derive(Debug, Clone)]
pub struct ObjectInfo {
    pub id: ObjectId,
    pub name: String,
    pub kind: &'static str,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub visible: bool,
}

impl std::fmt::Display for ObjectInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {} pos=({:.2}, {:.2}, {:.2}) scale=({:.2}, {:.2}, {:.2})",
            self.name,
            self.id.short(),
            self.kind,
            self.position[0],
            self.position[1],
            self.position[2],
            self.scale[0],
            self.scale[1],
            self.scale[2],
        )?;
        if !self.visible {
            write!(f, " (hidden)")?;
        }
        Ok(())
    }
}
