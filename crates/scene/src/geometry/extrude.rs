use super::{MeshData, Topology};
use glam::{Vec2, Vec3};

fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum::<f32>()
        * 0.5
}

fn cross(o: Vec2, a: Vec2, b: Vec2) -> f32 {
    (a - o).perp_dot(b - o)
}

fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = cross(a, b, p);
    let d2 = cross(b, c, p);
    let d3 = cross(c, a, p);
    d1 >= 0.0 && d2 >= 0.0 && d3 >= 0.0
}

fn point_in_polygon(p: Vec2, polygon: &[Vec2]) -> bool {
    let mut inside = false;
    let n = polygon.len();
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Splice `hole` into `outer` through a bridge from the hole's rightmost vertex.
fn bridge_hole(outer: &[Vec2], hole: &[Vec2]) -> Vec<Vec2> {
    let (m_idx, m) = hole
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.x.total_cmp(&b.1.x))
        .unwrap_or((0, hole[0]));

    // Nearest edge hit by a ray cast along +x from m.
    let n = outer.len();
    let mut best: Option<(f32, usize)> = None;
    for i in 0..n {
        let a = outer[i];
        let b = outer[(i + 1) % n];
        if (a.y > m.y) == (b.y > m.y) {
            continue;
        }
        let x = a.x + (m.y - a.y) * (b.x - a.x) / (b.y - a.y);
        if x < m.x {
            continue;
        }
        if best.is_none_or(|(bx, _)| x < bx) {
            let vertex = if a.x > b.x { i } else { (i + 1) % n };
            best = Some((x, vertex));
        }
    }
    let p_idx = match best {
        Some((hit_x, candidate)) => {
            // A reflex vertex inside the (m, hit, candidate) triangle would block
            // the bridge; take the one closest in angle to the ray instead.
            let hit = Vec2::new(hit_x, m.y);
            let c = outer[candidate];
            let mut chosen = candidate;
            let mut best_angle = f32::MAX;
            for (i, &v) in outer.iter().enumerate() {
                if i == candidate || v.x < m.x {
                    continue;
                }
                let inside = point_in_triangle(v, m, hit, c) || point_in_triangle(v, m, c, hit);
                if inside {
                    let angle = ((v.y - m.y) / (v.x - m.x).max(f32::EPSILON)).abs();
                    if angle < best_angle {
                        best_angle = angle;
                        chosen = i;
                    }
                }
            }
            chosen
        }
        None => outer
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.distance_squared(m).total_cmp(&b.1.distance_squared(m)))
            .map(|(i, _)| i)
            .unwrap_or(0),
    };

    let mut merged = Vec::with_capacity(outer.len() + hole.len() + 2);
    merged.extend_from_slice(&outer[..=p_idx]);
    merged.extend(hole[m_idx..].iter().copied());
    merged.extend(hole[..=m_idx].iter().copied());
    merged.extend_from_slice(&outer[p_idx..]);
    merged
}

/// Ear-clip a simple polygon with holes into triangles (counter-clockwise).
pub fn triangulate(outer: &[Vec2], holes: &[Vec<Vec2>]) -> Vec<[Vec2; 3]> {
    if outer.len() < 3 {
        return Vec::new();
    }
    let mut polygon = outer.to_vec();
    if signed_area(&polygon) < 0.0 {
        polygon.reverse();
    }
    let mut sorted_holes: Vec<Vec<Vec2>> = holes
        .iter()
        .filter(|h| h.len() >= 3)
        .map(|h| {
            let mut h = h.clone();
            if signed_area(&h) > 0.0 {
                h.reverse();
            }
            h
        })
        .collect();
    sorted_holes.sort_by(|a, b| {
        let ax = a.iter().map(|p| p.x).fold(f32::MIN, f32::max);
        let bx = b.iter().map(|p| p.x).fold(f32::MIN, f32::max);
        bx.total_cmp(&ax)
    });
    for hole in &sorted_holes {
        polygon = bridge_hole(&polygon, hole);
    }

    let mut remaining: Vec<usize> = (0..polygon.len()).collect();
    let mut triangles = Vec::with_capacity(polygon.len().saturating_sub(2));
    let mut stalled = 0;
    let mut i = 0;
    while remaining.len() > 3 {
        let n = remaining.len();
        let (ia, ib, ic) = (remaining[(i + n - 1) % n], remaining[i % n], remaining[(i + 1) % n]);
        let (a, b, c) = (polygon[ia], polygon[ib], polygon[ic]);
        let convex = cross(a, b, c) > 0.0;
        let is_ear = convex
            && !remaining.iter().any(|&j| {
                let p = polygon[j];
                j != ia
                    && j != ib
                    && j != ic
                    && p != a
                    && p != b
                    && p != c
                    && point_in_triangle(p, a, b, c)
            });
        if is_ear || stalled > n {
            triangles.push([a, b, c]);
            remaining.remove(i % n);
            stalled = 0;
        } else {
            stalled += 1;
            i += 1;
        }
        if i >= remaining.len() {
            i = 0;
        }
    }
    if remaining.len() == 3 {
        triangles.push([
            polygon[remaining[0]],
            polygon[remaining[1]],
            polygon[remaining[2]],
        ]);
    }
    triangles
}

/// Extrude closed 2D outlines along +Z into a solid with front/back caps.
///
/// Contours whose winding matches the largest contour are solids; the others are
/// holes assigned to the solid that contains them.
pub fn extrude_outline(contours: &[Vec<Vec2>], depth: f32) -> MeshData {
    let mut mesh = MeshData::new(Topology::Triangles);
    let contours: Vec<&Vec<Vec2>> = contours.iter().filter(|c| c.len() >= 3).collect();
    let Some(reference) = contours
        .iter()
        .max_by(|a, b| signed_area(a).abs().total_cmp(&signed_area(b).abs()))
    else {
        return mesh;
    };
    let solid_sign = signed_area(reference).signum();

    let (solids, holes): (Vec<&Vec<Vec2>>, Vec<&Vec<Vec2>>) = contours
        .iter()
        .partition(|c| signed_area(c).signum() == solid_sign);

    for solid in &solids {
        let own_holes: Vec<Vec<Vec2>> = holes
            .iter()
            .filter(|h| point_in_polygon(h[0], solid))
            .map(|h| h.to_vec())
            .collect();
        for [a, b, c] in triangulate(solid, &own_holes) {
            // back cap faces -Z, front cap faces +Z
            for (z, normal, tri) in [
                (0.0, [0.0, 0.0, -1.0], [a, c, b]),
                (depth, [0.0, 0.0, 1.0], [a, b, c]),
            ] {
                for p in tri {
                    let index = mesh.push_vertex([p.x, p.y, z], normal, [p.x, p.y]);
                    mesh.indices.push(index);
                }
            }
        }
    }

    for contour in &contours {
        let n = contour.len();
        let outward_flip = if signed_area(contour) > 0.0 { 1.0 } else { -1.0 };
        for i in 0..n {
            let a = contour[i];
            let b = contour[(i + 1) % n];
            let edge = b - a;
            if edge.length_squared() <= f32::EPSILON {
                continue;
            }
            let normal = Vec3::new(edge.y, -edge.x, 0.0).normalize() * outward_flip;
            let n = normal.to_array();
            let base = mesh.push_vertex([a.x, a.y, 0.0], n, [0.0, 0.0]);
            mesh.push_vertex([b.x, b.y, 0.0], n, [1.0, 0.0]);
            mesh.push_vertex([b.x, b.y, depth], n, [1.0, 1.0]);
            mesh.push_vertex([a.x, a.y, depth], n, [0.0, 1.0]);
            if outward_flip > 0.0 {
                mesh.indices
                    .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
            } else {
                mesh.indices
                    .extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
            }
        }
    }
    mesh
}
