//! Handle-based storage for geometries, textures and materials.
//!
//! Every mutation through `get_mut` bumps the entry's version so GPU-side caches
//! know to re-upload ("needs update"). Geometry handles can be disposed; a
//! disposed handle is never reused.

use crate::SceneError;
use crate::geometry::MeshData;
use crate::material::Material;
use scenelab_common::Image;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Handle to a geometry in a [`GeometryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GeometryHandle(pub u64);

/// Handle to a texture in a [`TextureStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureHandle(pub u64);

/// Handle to a material in a [`MaterialStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialHandle(pub u64);

#[derive(Debug, Clone)]
struct Versioned<T> {
    value: T,
    version: u64,
}

/// Geometry storage with explicit release.
#[derive(Debug, Clone, Default)]
pub struct GeometryStore {
    slots: BTreeMap<GeometryHandle, Versioned<MeshData>>,
    next_id: u64,
}

impl GeometryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mesh: MeshData) -> GeometryHandle {
        let handle = GeometryHandle(self.next_id);
        self.next_id += 1;
        self.slots.insert(
            handle,
            Versioned {
                value: mesh,
                version: 0,
            },
        );
        handle
    }

    pub fn get(&self, handle: GeometryHandle) -> Option<&MeshData> {
        self.slots.get(&handle).map(|s| &s.value)
    }

    /// Mutable access; marks the geometry as needing re-upload.
    pub fn get_mut(&mut self, handle: GeometryHandle) -> Option<&mut MeshData> {
        self.slots.get_mut(&handle).map(|s| {
            s.version += 1;
            &mut s.value
        })
    }

    pub fn version(&self, handle: GeometryHandle) -> Option<u64> {
        self.slots.get(&handle).map(|s| s.version)
    }

    pub fn is_alive(&self, handle: GeometryHandle) -> bool {
        self.slots.contains_key(&handle)
    }

    /// Release a geometry. Returns its data; the handle is dead afterwards.
    pub fn dispose(&mut self, handle: GeometryHandle) -> Result<MeshData, SceneError> {
        let slot = self
            .slots
            .remove(&handle)
            .ok_or(SceneError::GeometryNotFound(handle))?;
        tracing::debug!(handle = handle.0, "geometry disposed");
        Ok(slot.value)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Wrapping mode for texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Wrap {
    #[default]
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

/// Texel filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Filter {
    Nearest,
    #[default]
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorSpace {
    #[default]
    Linear,
    Srgb,
}

/// How the image maps onto geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mapping {
    #[default]
    Uv,
    CubeReflection,
    EquirectangularReflection,
}

/// Sampling and placement parameters of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextureParams {
    pub repeat: [f32; 2],
    pub offset: [f32; 2],
    /// Rotation in radians around `center`.
    pub rotation: f32,
    pub center: [f32; 2],
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub generate_mipmaps: bool,
    pub color_space: ColorSpace,
    pub mapping: Mapping,
}

impl Default for TextureParams {
    fn default() -> Self {
        Self {
            repeat: [1.0, 1.0],
            offset: [0.0, 0.0],
            rotation: 0.0,
            center: [0.0, 0.0],
            wrap_s: Wrap::ClampToEdge,
            wrap_t: Wrap::ClampToEdge,
            min_filter: Filter::Linear,
            mag_filter: Filter::Linear,
            generate_mipmaps: true,
            color_space: ColorSpace::Linear,
            mapping: Mapping::Uv,
        }
    }
}

impl TextureParams {
    /// 3x3 uv transform (column-major) applying offset, repeat and rotation about center.
    pub fn uv_transform(&self) -> glam::Mat3 {
        let (s, c) = self.rotation.sin_cos();
        let [rx, ry] = self.repeat;
        let [ox, oy] = self.offset;
        let [cx, cy] = self.center;
        glam::Mat3::from_cols_array(&[
            rx * c,
            -ry * s,
            0.0,
            rx * s,
            ry * c,
            0.0,
            -rx * (c * cx + s * cy) + cx + ox,
            -ry * (-s * cx + c * cy) + cy + oy,
            1.0,
        ])
    }
}

/// Pixel source of a texture. `Blank` until an asynchronous load lands.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureSource {
    Blank,
    Image(Image),
    /// Faces in +X, -X, +Y, -Y, +Z, -Z order.
    Cube(Box<[Image; 6]>),
}

#[derive(Debug, Clone)]
pub struct Texture {
    pub label: String,
    pub params: TextureParams,
    pub source: TextureSource,
}

impl Texture {
    pub fn blank(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            params: TextureParams::default(),
            source: TextureSource::Blank,
        }
    }

    pub fn is_loaded(&self) -> bool {
        !matches!(self.source, TextureSource::Blank)
    }
}

/// Texture storage.
#[derive(Debug, Clone, Default)]
pub struct TextureStore {
    slots: BTreeMap<TextureHandle, Versioned<Texture>>,
    next_id: u64,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, texture: Texture) -> TextureHandle {
        let handle = TextureHandle(self.next_id);
        self.next_id += 1;
        self.slots.insert(
            handle,
            Versioned {
                value: texture,
                version: 0,
            },
        );
        handle
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&Texture> {
        self.slots.get(&handle).map(|s| &s.value)
    }

    pub fn get_mut(&mut self, handle: TextureHandle) -> Option<&mut Texture> {
        self.slots.get_mut(&handle).map(|s| {
            s.version += 1;
            &mut s.value
        })
    }

    pub fn version(&self, handle: TextureHandle) -> Option<u64> {
        self.slots.get(&handle).map(|s| s.version)
    }

    /// Attach decoded pixels to a texture and mark it updated.
    pub fn fulfill(
        &mut self,
        handle: TextureHandle,
        source: TextureSource,
    ) -> Result<(), SceneError> {
        let texture = self
            .get_mut(handle)
            .ok_or(SceneError::TextureNotFound(handle))?;
        texture.source = source;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (TextureHandle, &Texture)> {
        self.slots.iter().map(|(h, s)| (*h, &s.value))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Material storage.
#[derive(Debug, Clone, Default)]
pub struct MaterialStore {
    slots: BTreeMap<MaterialHandle, Versioned<Material>>,
    next_id: u64,
}

impl MaterialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, material: Material) -> MaterialHandle {
        let handle = MaterialHandle(self.next_id);
        self.next_id += 1;
        self.slots.insert(
            handle,
            Versioned {
                value: material,
                version: 0,
            },
        );
        handle
    }

    pub fn get(&self, handle: MaterialHandle) -> Option<&Material> {
        self.slots.get(&handle).map(|s| &s.value)
    }

    pub fn get_mut(&mut self, handle: MaterialHandle) -> Option<&mut Material> {
        self.slots.get_mut(&handle).map(|s| {
            s.version += 1;
            &mut s.value
        })
    }

    pub fn version(&self, handle: MaterialHandle) -> Option<u64> {
        self.slots.get(&handle).map(|s| s.version)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::box_geometry;

    #[test]
    fn geometry_insert_get_dispose() {
        let mut store = GeometryStore::new();
        let h = store.insert(box_geometry(1.0, 1.0, 1.0, 1, 1, 1));
        assert!(store.is_alive(h));
        assert_eq!(store.get(h).unwrap().vertex_count(), 24);

        store.dispose(h).unwrap();
        assert!(!store.is_alive(h));
        assert!(store.get(h).is_none());
    }

    #[test]
    fn replaced_handles_stay_dead_and_are_not_reused() {
        let mut store = GeometryStore::new();
        let mut dead = Vec::new();
        let mut live = store.insert(box_geometry(1.0, 1.0, 1.0, 1, 1, 1));
        for _ in 0..50 {
            let next = store.insert(box_geometry(1.0, 1.0, 1.0, 2, 2, 2));
            store.dispose(live).unwrap();
            dead.push(live);
            live = next;
        }
        assert_eq!(store.len(), 1);
        assert!(store.is_alive(live));
        assert!(dead.iter().all(|h| !store.is_alive(*h) && *h != live));
    }

    #[test]
    fn double_dispose_is_an_error() {
        let mut store = GeometryStore::new();
        let h = store.insert(box_geometry(1.0, 1.0, 1.0, 1, 1, 1));
        store.dispose(h).unwrap();
        assert!(matches!(
            store.dispose(h),
            Err(SceneError::GeometryNotFound(_))
        ));
    }

    #[test]
    fn handles_are_never_reused() {
        let mut store = GeometryStore::new();
        let a = store.insert(box_geometry(1.0, 1.0, 1.0, 1, 1, 1));
        store.dispose(a).unwrap();
        let b = store.insert(box_geometry(1.0, 1.0, 1.0, 1, 1, 1));
        assert_ne!(a, b);
    }

    #[test]
    fn get_mut_bumps_version() {
        let mut store = GeometryStore::new();
        let h = store.insert(box_geometry(1.0, 1.0, 1.0, 1, 1, 1));
        assert_eq!(store.version(h), Some(0));
        store.get_mut(h).unwrap().positions[0][1] = 5.0;
        assert_eq!(store.version(h), Some(1));
    }

    #[test]
    fn texture_fulfill_marks_updated() {
        let mut store = TextureStore::new();
        let h = store.insert(Texture::blank("door/color.jpg"));
        assert!(!store.get(h).unwrap().is_loaded());
        store
            .fulfill(h, TextureSource::Image(Image::white()))
            .unwrap();
        assert!(store.get(h).unwrap().is_loaded());
        assert_eq!(store.version(h), Some(1));
    }

    #[test]
    fn default_uv_transform_is_identity() {
        let m = TextureParams::default().uv_transform();
        assert!(m.abs_diff_eq(glam::Mat3::IDENTITY, 1e-6));
    }

    #[test]
    fn uv_transform_repeats_and_offsets() {
        let params = TextureParams {
            repeat: [2.0, 3.0],
            offset: [0.5, 0.5],
            ..TextureParams::default()
        };
        let uv = params.uv_transform() * glam::Vec3::new(1.0, 1.0, 1.0);
        assert!((uv.x - 2.5).abs() < 1e-6);
        assert!((uv.y - 3.5).abs() < 1e-6);
    }
}
