//! CPU-side mesh data and the generators demos build scenes from.

mod extrude;
mod primitives;

pub use extrude::{extrude_outline, triangulate};
pub use primitives::{
    axes, box_geometry, cone, icosahedron, plane, points, sphere, torus, torus_knot,
};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How the index list is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    Triangles,
    Lines,
    Points,
}

/// Vertex attributes plus an index list.
///
/// `normals` and `uvs` are either empty or the same length as `positions`;
/// `colors` is optional per-vertex color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub colors: Option<Vec<[f32; 3]>>,
    pub indices: Vec<u32>,
    pub topology: Topology,
}

impl MeshData {
    pub fn new(topology: Topology) -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
            colors: None,
            indices: Vec::new(),
            topology,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Check that every attribute stream lines up and every index is in range.
    pub fn validate(&self) -> Result<(), String> {
        let n = self.positions.len();
        if !self.normals.is_empty() && self.normals.len() != n {
            return Err(format!("{} normals for {n} positions", self.normals.len()));
        }
        if !self.uvs.is_empty() && self.uvs.len() != n {
            return Err(format!("{} uvs for {n} positions", self.uvs.len()));
        }
        if let Some(colors) = &self.colors {
            if colors.len() != n {
                return Err(format!("{} colors for {n} positions", colors.len()));
            }
        }
        if let Some(bad) = self.indices.iter().find(|&&i| i as usize >= n) {
            return Err(format!("index {bad} out of range for {n} vertices"));
        }
        let stride = match self.topology {
            Topology::Triangles => 3,
            Topology::Lines => 2,
            Topology::Points => 1,
        };
        if self.indices.len() % stride != 0 {
            return Err(format!(
                "{} indices is not a multiple of {stride}",
                self.indices.len()
            ));
        }
        Ok(())
    }

    /// Axis-aligned bounds, or `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.positions.iter().map(|p| Vec3::from_array(*p));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }

    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            *p = (Vec3::from_array(*p) + offset).to_array();
        }
    }

    /// Move the mesh so its bounding-box center sits at the origin.
    pub fn center(&mut self) {
        if let Some((min, max)) = self.bounding_box() {
            self.translate(-(min + max) * 0.5);
        }
    }

    /// Unique edges of a triangle mesh as a line index list.
    pub fn wireframe_indices(&self) -> Vec<u32> {
        if self.topology != Topology::Triangles {
            return self.indices.clone();
        }
        let mut edges = BTreeSet::new();
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                edges.insert((a.min(b), a.max(b)));
            }
        }
        edges.into_iter().flat_map(|(a, b)| [a, b]).collect()
    }

    /// Append a vertex with normal and uv; returns its index.
    pub(crate) fn push_vertex(&mut self, p: [f32; 3], n: [f32; 3], uv: [f32; 2]) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(p);
        self.normals.push(n);
        self.uvs.push(uv);
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_moves_bounds_to_origin() {
        let mut mesh = box_geometry(2.0, 1.0, 1.0, 1, 1, 1);
        mesh.translate(Vec3::new(5.0, -3.0, 1.0));
        mesh.center();
        let (min, max) = mesh.bounding_box().unwrap();
        assert!(((min + max) * 0.5).length() < 1e-5);
        assert!((max.x - min.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn validate_catches_out_of_range_index() {
        let mut mesh = plane(1.0, 1.0, 1, 1);
        assert!(mesh.validate().is_ok());
        mesh.indices.push(999);
        mesh.indices.push(0);
        mesh.indices.push(1);
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn wireframe_dedups_shared_edges() {
        let mesh = plane(1.0, 1.0, 1, 1);
        // two triangles sharing a diagonal: 5 unique edges
        assert_eq!(mesh.wireframe_indices().len(), 10);
    }

    #[test]
    fn empty_mesh_has_no_bounds() {
        assert!(MeshData::new(Topology::Points).bounding_box().is_none());
    }
}
