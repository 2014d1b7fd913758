use crate::store::TextureHandle;
use scenelab_common::Color;
use serde::{Deserialize, Serialize};

/// Shading model of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialKind {
    /// Unlit flat color.
    Basic,
    /// View-space normals as color.
    Normal,
    /// Lit by a matcap texture sampled with the view normal.
    Matcap,
    Lambert,
    Phong,
    /// Banded diffuse using a gradient texture.
    Toon,
    Standard,
    Physical,
    /// Point sprites.
    Points,
}

impl MaterialKind {
    pub fn is_lit(self) -> bool {
        matches!(
            self,
            Self::Lambert | Self::Phong | Self::Toon | Self::Standard | Self::Physical
        )
    }
}

/// Named texture bindings a material may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TextureSlot {
    Map,
    Alpha,
    AmbientOcclusion,
    Normal,
    Roughness,
    Metalness,
    Displacement,
    Matcap,
    Gradient,
    Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Blending {
    #[default]
    Normal,
    Additive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

/// Surface description. Fields that a shading model ignores are simply unused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub kind: MaterialKind,
    pub color: Color,
    pub wireframe: bool,
    pub opacity: f32,
    pub transparent: bool,
    pub side: Side,
    pub roughness: f32,
    pub metalness: f32,
    pub shininess: f32,
    pub specular: Color,
    pub clearcoat: f32,
    pub env_intensity: f32,
    pub blending: Blending,
    pub depth_write: bool,
    pub vertex_colors: bool,
    /// Point size in world units for [`MaterialKind::Points`].
    pub size: f32,
    pub size_attenuation: bool,
    pub textures: Vec<(TextureSlot, TextureHandle)>,
}

impl Material {
    pub fn new(kind: MaterialKind) -> Self {
        Self {
            kind,
            color: Color::WHITE,
            wireframe: false,
            opacity: 1.0,
            transparent: false,
            side: Side::Front,
            roughness: 1.0,
            metalness: 0.0,
            shininess: 30.0,
            specular: Color::from_hex(0x111111),
            clearcoat: 0.0,
            env_intensity: 1.0,
            blending: Blending::Normal,
            depth_write: true,
            vertex_colors: false,
            size: 1.0,
            size_attenuation: true,
            textures: Vec::new(),
        }
    }

    pub fn basic(color: Color) -> Self {
        Self::new(MaterialKind::Basic).with_color(color)
    }

    pub fn standard() -> Self {
        Self::new(MaterialKind::Standard)
    }

    pub fn points(size: f32) -> Self {
        Self {
            size,
            ..Self::new(MaterialKind::Points)
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn with_metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness;
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    /// Alpha-blended with the given opacity.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self.transparent = true;
        self
    }

    /// Additive, depth-write disabled, as used for glowing particles.
    pub fn additive(mut self) -> Self {
        self.blending = Blending::Additive;
        self.depth_write = false;
        self.transparent = true;
        self
    }

    pub fn with_vertex_colors(mut self) -> Self {
        self.vertex_colors = true;
        self
    }

    /// Bind a texture to a slot, replacing any existing binding.
    pub fn with_texture(mut self, slot: TextureSlot, texture: TextureHandle) -> Self {
        self.set_texture(slot, texture);
        self
    }

    pub fn set_texture(&mut self, slot: TextureSlot, texture: TextureHandle) {
        match self.textures.iter_mut().find(|(s, _)| *s == slot) {
            Some(entry) => entry.1 = texture,
            None => self.textures.push((slot, texture)),
        }
    }

    pub fn texture(&self, slot: TextureSlot) -> Option<TextureHandle> {
        self.textures
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, h)| *h)
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(MaterialKind::Basic)
    }
}
