use bytemuck::{Pod, Zeroable};
use scenelab_scene::{GeometryHandle, GeometryStore, MeshData};
use std::collections::HashMap;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 3],
}

impl Vertex {
    pub(crate) const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Float32x3,
    ];
}

/// Flatten attribute streams into interleaved vertices, filling missing streams.
pub(crate) fn interleave(mesh: &MeshData) -> Vec<Vertex> {
    mesh.positions
        .iter()
        .enumerate()
        .map(|(i, p)| Vertex {
            position: *p,
            normal: mesh.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            uv: mesh.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
            color: mesh
                .colors
                .as_ref()
                .and_then(|c| c.get(i).copied())
                .unwrap_or([1.0, 1.0, 1.0]),
        })
        .collect()
}

pub(crate) struct GpuMesh {
    version: u64,
    pub vertices: wgpu::Buffer,
    pub vertex_count: u32,
    pub indices: Option<(wgpu::Buffer, u32)>,
    pub wire: Option<(wgpu::Buffer, u32)>,
}

/// GPU copies of scene geometry, keyed by handle and re-uploaded on version change.
#[derive(Default)]
pub(crate) struct MeshCache {
    meshes: HashMap<GeometryHandle, GpuMesh>,
}

fn index_buffer(
    device: &wgpu::Device,
    label: &str,
    indices: &[u32],
) -> Option<(wgpu::Buffer, u32)> {
    if indices.is_empty() {
        return None;
    }
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    Some((buffer, indices.len() as u32))
}

impl MeshCache {
    /// Make sure `handle` is uploaded at its current version.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        store: &GeometryStore,
        handle: GeometryHandle,
        wireframe: bool,
    ) {
        let (Some(mesh), Some(version)) = (store.get(handle), store.version(handle)) else {
            return;
        };
        let stale = self
            .meshes
            .get(&handle)
            .is_none_or(|m| m.version != version);
        if stale {
            let vertices = interleave(mesh);
            if vertices.is_empty() {
                self.meshes.remove(&handle);
                return;
            }
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            tracing::trace!(handle = handle.0, version, vertices = vertices.len(), "mesh uploaded");
            self.meshes.insert(
                handle,
                GpuMesh {
                    version,
                    vertices: buffer,
                    vertex_count: vertices.len() as u32,
                    indices: index_buffer(device, "mesh_indices", &mesh.indices),
                    wire: None,
                },
            );
        }
        if wireframe {
            if let Some(gpu) = self.meshes.get_mut(&handle) {
                if gpu.wire.is_none() {
                    gpu.wire = index_buffer(device, "mesh_wire_indices", &mesh.wireframe_indices());
                }
            }
        }
    }

    pub fn get(&self, handle: GeometryHandle) -> Option<&GpuMesh> {
        self.meshes.get(&handle)
    }

    /// Drop buffers of geometries that were disposed.
    pub fn prune(&mut self, store: &GeometryStore) {
        let before = self.meshes.len();
        self.meshes.retain(|h, _| store.is_alive(*h));
        let dropped = before - self.meshes.len();
        if dropped > 0 {
            tracing::debug!(dropped, "released GPU meshes");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenelab_scene::geometry::{box_geometry, points};

    #[test]
    fn interleave_keeps_all_attributes() {
        let mesh = box_geometry(1.0, 1.0, 1.0, 1, 1, 1);
        let verts = interleave(&mesh);
        assert_eq!(verts.len(), mesh.vertex_count());
        assert_eq!(verts[0].normal, mesh.normals[0]);
        assert_eq!(verts[0].color, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn interleave_fills_missing_streams() {
        let mesh = points(vec![[1.0, 2.0, 3.0]], Some(vec![[0.5, 0.25, 1.0]]));
        let verts = interleave(&mesh);
        assert_eq!(verts[0].position, [1.0, 2.0, 3.0]);
        assert_eq!(verts[0].color, [0.5, 0.25, 1.0]);
        assert_eq!(verts[0].uv, [0.0, 0.0]);
    }

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 44);
    }
}
