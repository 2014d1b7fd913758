use glam::{Mat4, Vec3};
use scenelab_common::Euler;

/// Perspective projection with a vertical field of view in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_degrees,
            aspect,
            near,
            far,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }
}

/// Orthographic frustum `[-aspect*h, aspect*h] x [-h, h]`.
///
/// Only the horizontal bounds follow the aspect ratio; the vertical extent is fixed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthographicCamera {
    pub half_height: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl OrthographicCamera {
    pub fn new(half_height: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            half_height,
            aspect,
            near,
            far,
        }
    }

    pub fn left(&self) -> f32 {
        -self.aspect * self.half_height
    }

    pub fn right(&self) -> f32 {
        self.aspect * self.half_height
    }

    pub fn top(&self) -> f32 {
        self.half_height
    }

    pub fn bottom(&self) -> f32 {
        -self.half_height
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::orthographic_rh(
            self.left(),
            self.right(),
            self.bottom(),
            self.top(),
            self.near,
            self.far,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective(PerspectiveCamera),
    Orthographic(OrthographicCamera),
}

impl Projection {
    pub fn aspect(&self) -> f32 {
        match self {
            Self::Perspective(p) => p.aspect,
            Self::Orthographic(o) => o.aspect,
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        match self {
            Self::Perspective(p) => p.aspect = aspect,
            Self::Orthographic(o) => o.aspect = aspect,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        match self {
            Self::Perspective(p) => p.matrix(),
            Self::Orthographic(o) => o.matrix(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Perspective(_) => "perspective",
            Self::Orthographic(_) => "orthographic",
        }
    }
}

/// A projection placed in the world.
///
/// The eye sits at `parent_offset + position`. With a `target` the camera looks at
/// that world-space point; without one it uses `rotation` and looks down -Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub projection: Projection,
    pub position: Vec3,
    pub target: Option<Vec3>,
    pub rotation: Euler,
    /// Translation of the group the camera is parented to.
    pub parent_offset: Vec3,
}

impl CameraRig {
    pub fn perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::new(Projection::Perspective(PerspectiveCamera::new(
            fov_degrees,
            aspect,
            near,
            far,
        )))
    }

    pub fn orthographic(half_height: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::new(Projection::Orthographic(OrthographicCamera::new(
            half_height,
            aspect,
            near,
            far,
        )))
    }

    pub fn new(projection: Projection) -> Self {
        Self {
            projection,
            position: Vec3::ZERO,
            target: None,
            rotation: Euler::ZERO,
            parent_offset: Vec3::ZERO,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn looking_at(mut self, target: Vec3) -> Self {
        self.target = Some(target);
        self
    }

    pub fn eye(&self) -> Vec3 {
        self.parent_offset + self.position
    }

    pub fn view_matrix(&self) -> Mat4 {
        let eye = self.eye();
        match self.target {
            Some(target) if target.distance_squared(eye) > f32::EPSILON => {
                Mat4::look_at_rh(eye, target, Vec3::Y)
            }
            _ => Mat4::from_rotation_translation(self.rotation.to_quat(), eye).inverse(),
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection.matrix() * self.view_matrix()
    }
}

/// Sub-camera with a viewport rectangle given as fractions of the output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubCamera {
    pub rig: CameraRig,
    /// `[x, y, width, height]` in `0..=1`, origin top-left.
    pub rect: [f32; 4],
}

impl SubCamera {
    /// Pixel rectangle inside a drawing buffer of `size`: floored origin, ceiled extent.
    pub fn pixel_rect(&self, size: (u32, u32)) -> [u32; 4] {
        let (w, h) = (size.0 as f32, size.1 as f32);
        let [x, y, rw, rh] = self.rect;
        let px = (x * w).floor() as u32;
        let py = (y * h).floor() as u32;
        let pw = ((rw * w).ceil() as u32).min(size.0.saturating_sub(px)).max(1);
        let ph = ((rh * h).ceil() as u32).min(size.1.saturating_sub(py)).max(1);
        [px, py, pw, ph]
    }
}

/// Several cameras rendering into a tiled grid of viewports.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrayCamera {
    pub cameras: Vec<SubCamera>,
}

impl ArrayCamera {
    /// `columns x rows` grid of identical perspective cameras placed by `place(col, row)`.
    pub fn grid(
        columns: u32,
        rows: u32,
        fov_degrees: f32,
        aspect: f32,
        mut place: impl FnMut(u32, u32) -> CameraRig,
    ) -> Self {
        let mut cameras = Vec::with_capacity((columns * rows) as usize);
        let (cw, ch) = (1.0 / columns.max(1) as f32, 1.0 / rows.max(1) as f32);
        for row in 0..rows {
            for col in 0..columns {
                let mut rig = place(col, row);
                if let Projection::Perspective(p) = &mut rig.projection {
                    p.fov_degrees = fov_degrees;
                    p.aspect = aspect;
                }
                cameras.push(SubCamera {
                    rig,
                    rect: [col as f32 * cw, row as f32 * ch, cw, ch],
                });
            }
        }
        Self { cameras }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        for c in &mut self.cameras {
            c.rig.projection.set_aspect(aspect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orthographic_bounds_follow_aspect() {
        let mut p =
            Projection::Orthographic(OrthographicCamera::new(1.0, 800.0 / 600.0, 0.1, 100.0));
        p.set_aspect(2.0);
        let Projection::Orthographic(o) = p else {
            panic!("expected orthographic");
        };
        assert_eq!(o.left(), -2.0);
        assert_eq!(o.right(), 2.0);
        assert_eq!(o.top(), 1.0);
        assert_eq!(o.bottom(), -1.0);
    }

    #[test]
    fn look_at_puts_target_in_front() {
        let rig = CameraRig::perspective(75.0, 1.0, 0.1, 100.0)
            .at(Vec3::new(0.0, 0.0, 3.0))
            .looking_at(Vec3::ZERO);
        let clip = rig.view_projection() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(clip.w > 0.0);
    }

    #[test]
    fn parent_offset_moves_eye() {
        let mut rig = CameraRig::perspective(35.0, 1.0, 0.1, 100.0).at(Vec3::new(0.0, -4.0, 6.0));
        rig.parent_offset = Vec3::new(0.25, 0.1, 0.0);
        assert!((rig.eye() - Vec3::new(0.25, -3.9, 6.0)).length() < 1e-6);
        let view_origin = rig.view_matrix().transform_point3(rig.eye());
        assert!(view_origin.length() < 1e-5);
    }

    #[test]
    fn grid_tiles_cover_the_output() {
        let array = ArrayCamera::grid(2, 2, 40.0, 4.0 / 3.0, |_, _| {
            CameraRig::perspective(75.0, 1.0, 0.1, 10.0)
        });
        assert_eq!(array.cameras.len(), 4);
        assert_eq!(array.cameras[3].pixel_rect((800, 600)), [400, 300, 400, 300]);
        let area: u32 = array
            .cameras
            .iter()
            .map(|c| {
                let r = c.pixel_rect((801, 601));
                r[2] * r[3]
            })
            .sum();
        assert!(area >= 801 * 601);
    }
}
