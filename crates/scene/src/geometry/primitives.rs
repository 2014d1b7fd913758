use super::{MeshData, Topology};
use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// Axis-aligned box centered on the origin with per-axis segment counts.
pub fn box_geometry(
    width: f32,
    height: f32,
    depth: f32,
    width_segments: u32,
    height_segments: u32,
    depth_segments: u32,
) -> MeshData {
    let ws = width_segments.max(1);
    let hs = height_segments.max(1);
    let ds = depth_segments.max(1);
    let mut mesh = MeshData::new(Topology::Triangles);

    // (u axis, v axis, w axis, u dir, v dir, face width, face height, face depth, grid x, grid y)
    #[rustfmt::skip]
    let faces = [
        (2, 1, 0, -1.0, -1.0, depth, height,  width, ds, hs), // +X
        (2, 1, 0,  1.0, -1.0, depth, height, -width, ds, hs), // -X
        (0, 2, 1,  1.0,  1.0, width, depth,  height, ws, ds), // +Y
        (0, 2, 1,  1.0, -1.0, width, depth, -height, ws, ds), // -Y
        (0, 1, 2,  1.0, -1.0, width, height,  depth, ws, hs), // +Z
        (0, 1, 2, -1.0, -1.0, width, height, -depth, ws, hs), // -Z
    ];

    for (u, v, w, udir, vdir, fw, fh, fd, gx, gy) in faces {
        let base = mesh.positions.len() as u32;
        let seg_w = fw / gx as f32;
        let seg_h = fh / gy as f32;
        let normal_sign = if fd > 0.0 { 1.0 } else { -1.0 };

        for iy in 0..=gy {
            let y = iy as f32 * seg_h - fh * 0.5;
            for ix in 0..=gx {
                let x = ix as f32 * seg_w - fw * 0.5;
                let mut p = [0.0; 3];
                p[u] = x * udir;
                p[v] = y * vdir;
                p[w] = fd * 0.5;
                let mut n = [0.0; 3];
                n[w] = normal_sign;
                let uv = [ix as f32 / gx as f32, 1.0 - iy as f32 / gy as f32];
                mesh.push_vertex(p, n, uv);
            }
        }

        for iy in 0..gy {
            for ix in 0..gx {
                let a = base + ix + (gx + 1) * iy;
                let b = base + ix + (gx + 1) * (iy + 1);
                let c = base + (ix + 1) + (gx + 1) * (iy + 1);
                let d = base + (ix + 1) + (gx + 1) * iy;
                mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
    }
    mesh
}

/// UV sphere.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let ws = width_segments.max(3);
    let hs = height_segments.max(2);
    let mut mesh = MeshData::new(Topology::Triangles);
    let mut grid = Vec::with_capacity((hs + 1) as usize);

    for iy in 0..=hs {
        let v = iy as f32 / hs as f32;
        let mut row = Vec::with_capacity((ws + 1) as usize);
        for ix in 0..=ws {
            let u = ix as f32 / ws as f32;
            let p = Vec3::new(
                -radius * (u * TAU).cos() * (v * PI).sin(),
                radius * (v * PI).cos(),
                radius * (u * TAU).sin() * (v * PI).sin(),
            );
            let n = p.normalize_or_zero();
            row.push(mesh.push_vertex(p.to_array(), n.to_array(), [u, 1.0 - v]));
        }
        grid.push(row);
    }

    for iy in 0..hs as usize {
        for ix in 0..ws as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != hs as usize - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    mesh
}

/// Plane in the XY plane facing +Z.
pub fn plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let gx = width_segments.max(1);
    let gy = height_segments.max(1);
    let seg_w = width / gx as f32;
    let seg_h = height / gy as f32;
    let mut mesh = MeshData::new(Topology::Triangles);

    for iy in 0..=gy {
        let y = iy as f32 * seg_h - height * 0.5;
        for ix in 0..=gx {
            let x = ix as f32 * seg_w - width * 0.5;
            mesh.push_vertex(
                [x, -y, 0.0],
                [0.0, 0.0, 1.0],
                [ix as f32 / gx as f32, 1.0 - iy as f32 / gy as f32],
            );
        }
    }
    for iy in 0..gy {
        for ix in 0..gx {
            let a = ix + (gx + 1) * iy;
            let b = ix + (gx + 1) * (iy + 1);
            let c = (ix + 1) + (gx + 1) * (iy + 1);
            let d = (ix + 1) + (gx + 1) * iy;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    mesh
}

/// Torus around the Z axis.
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> MeshData {
    let radial = radial_segments.max(2);
    let tubular = tubular_segments.max(3);
    let mut mesh = MeshData::new(Topology::Triangles);

    for j in 0..=radial {
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * TAU;
            let v = j as f32 / radial as f32 * TAU;
            let p = Vec3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            let n = (p - center).normalize_or_zero();
            mesh.push_vertex(
                p.to_array(),
                n.to_array(),
                [i as f32 / tubular as f32, j as f32 / radial as f32],
            );
        }
    }
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = (tubular + 1) * j + i - 1;
            let b = (tubular + 1) * (j - 1) + i - 1;
            let c = (tubular + 1) * (j - 1) + i;
            let d = (tubular + 1) * j + i;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    mesh
}

/// Cone with its base on `-height/2` and apex on `+height/2`, capped at the base.
pub fn cone(radius: f32, height: f32, radial_segments: u32) -> MeshData {
    let radial = radial_segments.max(3);
    let half = height * 0.5;
    let slope = if height > 0.0 { radius / height } else { 0.0 };
    let mut mesh = MeshData::new(Topology::Triangles);
    let mut rows: Vec<Vec<u32>> = Vec::with_capacity(2);

    // Torso: row 0 is the apex ring (radius 0), row 1 the base ring.
    for y in 0..=1u32 {
        let v = y as f32;
        let r = v * radius;
        let mut row = Vec::with_capacity((radial + 1) as usize);
        for x in 0..=radial {
            let u = x as f32 / radial as f32;
            let theta = u * TAU;
            let (sin, cos) = theta.sin_cos();
            let n = Vec3::new(sin, slope, cos).normalize_or_zero();
            row.push(mesh.push_vertex(
                [r * sin, -v * height + half, r * cos],
                n.to_array(),
                [u, 1.0 - v],
            ));
        }
        rows.push(row);
    }
    // The apex ring has zero radius, so only the lower triangle of each quad has area.
    for x in 0..radial as usize {
        let b = rows[1][x];
        let c = rows[1][x + 1];
        let d = rows[0][x + 1];
        mesh.indices.extend_from_slice(&[b, c, d]);
    }

    // Base cap.
    let center_start = mesh.positions.len() as u32;
    for _ in 0..radial {
        mesh.push_vertex([0.0, -half, 0.0], [0.0, -1.0, 0.0], [0.5, 0.5]);
    }
    let ring_start = mesh.positions.len() as u32;
    for x in 0..=radial {
        let theta = x as f32 / radial as f32 * TAU;
        let (sin, cos) = theta.sin_cos();
        mesh.push_vertex(
            [radius * sin, -half, radius * cos],
            [0.0, -1.0, 0.0],
            [cos * 0.5 + 0.5, sin * 0.5 + 0.5],
        );
    }
    for x in 0..radial {
        let c = center_start + x;
        let i = ring_start + x;
        mesh.indices.extend_from_slice(&[i + 1, i, c]);
    }
    mesh
}

fn torus_knot_point(u: f32, p: f32, q: f32, radius: f32) -> Vec3 {
    let qu_over_p = q / p * u;
    let cs = qu_over_p.cos();
    Vec3::new(
        radius * (2.0 + cs) * 0.5 * u.cos(),
        radius * (2.0 + cs) * u.sin() * 0.5,
        radius * qu_over_p.sin() * 0.5,
    )
}

/// (p, q) torus knot swept with a circular tube.
pub fn torus_knot(
    radius: f32,
    tube: f32,
    tubular_segments: u32,
    radial_segments: u32,
    p: u32,
    q: u32,
) -> MeshData {
    let tubular = tubular_segments.max(3);
    let radial = radial_segments.max(3);
    let (pf, qf) = (p.max(1) as f32, q as f32);
    let mut mesh = MeshData::new(Topology::Triangles);

    for i in 0..=tubular {
        let u = i as f32 / tubular as f32 * pf * TAU;
        let p1 = torus_knot_point(u, pf, qf, radius);
        let p2 = torus_knot_point(u + 0.01, pf, qf, radius);
        let t = p2 - p1;
        let n0 = p2 + p1;
        let b = t.cross(n0).normalize_or_zero();
        let n = b.cross(t).normalize_or_zero();

        for j in 0..=radial {
            let v = j as f32 / radial as f32 * TAU;
            let cx = -tube * v.cos();
            let cy = tube * v.sin();
            let vertex = p1 + n * cx + b * cy;
            let normal = (vertex - p1).normalize_or_zero();
            mesh.push_vertex(
                vertex.to_array(),
                normal.to_array(),
                [i as f32 / tubular as f32, j as f32 / radial as f32],
            );
        }
    }
    for j in 1..=tubular {
        for i in 1..=radial {
            let a = (radial + 1) * (j - 1) + (i - 1);
            let b = (radial + 1) * j + (i - 1);
            let c = (radial + 1) * j + i;
            let d = (radial + 1) * (j - 1) + i;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    mesh
}

/// Flat-shaded icosahedron (20 faces, no subdivision).
pub fn icosahedron(radius: f32) -> MeshData {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    #[rustfmt::skip]
    let corners = [
        [-1.0,  t, 0.0], [ 1.0,  t, 0.0], [-1.0, -t, 0.0], [ 1.0, -t, 0.0],
        [ 0.0, -1.0,  t], [ 0.0,  1.0,  t], [ 0.0, -1.0, -t], [ 0.0,  1.0, -t],
        [  t, 0.0, -1.0], [  t, 0.0,  1.0], [ -t, 0.0, -1.0], [ -t, 0.0,  1.0],
    ];
    #[rustfmt::skip]
    let faces: [[usize; 3]; 20] = [
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
    ];
    let mut mesh = MeshData::new(Topology::Triangles);
    for face in faces {
        let [a, b, c] = face.map(|i| Vec3::from_array(corners[i]).normalize() * radius);
        let n = (b - a).cross(c - a).normalize_or_zero().to_array();
        for v in [a, b, c] {
            let dir = v.normalize_or_zero();
            let u = dir.z.atan2(-dir.x) / TAU + 0.5;
            let w = dir.y.clamp(-1.0, 1.0).asin() / PI + 0.5;
            let index = mesh.push_vertex(v.to_array(), n, [u, w]);
            mesh.indices.push(index);
        }
    }
    mesh
}

/// Point cloud from explicit positions and optional per-point colors.
pub fn points(positions: Vec<[f32; 3]>, colors: Option<Vec<[f32; 3]>>) -> MeshData {
    let indices = (0..positions.len() as u32).collect();
    MeshData {
        positions,
        normals: Vec::new(),
        uvs: Vec::new(),
        colors,
        indices,
        topology: Topology::Points,
    }
}

/// Three colored lines along +X (red), +Y (green) and +Z (blue).
pub fn axes(size: f32) -> MeshData {
    let positions = vec![
        [0.0, 0.0, 0.0],
        [size, 0.0, 0.0],
        [0.0, 0.0, 0.0],
        [0.0, size, 0.0],
        [0.0, 0.0, 0.0],
        [0.0, 0.0, size],
    ];
    let colors = vec![
        [1.0, 0.0, 0.0],
        [1.0, 0.6, 0.0],
        [0.0, 1.0, 0.0],
        [0.6, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.6, 1.0],
    ];
    MeshData {
        positions,
        normals: Vec::new(),
        uvs: Vec::new(),
        colors: Some(colors),
        indices: (0..6).collect(),
        topology: Topology::Lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_vertex_and_index_counts() {
        let mesh = box_geometry(1.0, 1.0, 1.0, 2, 2, 2);
        // 6 faces of 3x3 vertices, 2x2 quads each
        assert_eq!(mesh.vertex_count(), 6 * 9);
        assert_eq!(mesh.index_count(), 6 * 4 * 6);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn box_extents_match_dimensions() {
        let mesh = box_geometry(4.0, 2.5, 4.0, 1, 1, 1);
        let (min, max) = mesh.bounding_box().unwrap();
        assert!((max - min - Vec3::new(4.0, 2.5, 4.0)).length() < 1e-5);
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let mesh = sphere(0.5, 16, 16);
        assert!(mesh.validate().is_ok());
        for p in &mesh.positions {
            assert!((Vec3::from_array(*p).length() - 0.5).abs() < 1e-4);
        }
    }

    #[test]
    fn plane_faces_positive_z() {
        let mesh = plane(5.0, 5.0, 1, 1);
        assert_eq!(mesh.vertex_count(), 4);
        assert!(mesh.normals.iter().all(|n| *n == [0.0, 0.0, 1.0]));
    }

    #[test]
    fn torus_and_knot_are_valid() {
        assert!(torus(0.3, 0.2, 32, 64).validate().is_ok());
        assert!(torus_knot(0.8, 0.35, 100, 16, 2, 3).validate().is_ok());
    }

    #[test]
    fn cone_spans_height() {
        let mesh = cone(1.0, 2.0, 32);
        assert!(mesh.validate().is_ok());
        let (min, max) = mesh.bounding_box().unwrap();
        assert!((min.y + 1.0).abs() < 1e-5);
        assert!((max.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn icosahedron_has_twenty_faces() {
        let mesh = icosahedron(0.3);
        assert_eq!(mesh.index_count(), 60);
        for p in &mesh.positions {
            assert!((Vec3::from_array(*p).length() - 0.3).abs() < 1e-5);
        }
    }

    #[test]
    fn points_and_axes_topologies() {
        let cloud = points(vec![[0.0; 3]; 10], None);
        assert_eq!(cloud.topology, Topology::Points);
        assert!(cloud.validate().is_ok());
        let lines = axes(1.0);
        assert_eq!(lines.topology, Topology::Lines);
        assert!(lines.validate().is_ok());
    }
}
