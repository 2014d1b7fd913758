use scenelab_common::Color;
use serde::{Deserialize, Serialize};

/// Shadow casting configuration for lights that support it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowSettings {
    pub enabled: bool,
    pub map_size: u32,
    pub near: f32,
    pub far: f32,
    pub radius: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            map_size: 512,
            near: 0.5,
            far: 500.0,
            radius: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LightKind {
    Ambient,
    /// Parallel rays shining from the node position towards `target`.
    Directional { target: [f32; 3] },
    Hemisphere { ground: Color },
    Point { distance: f32, decay: f32 },
    Spot {
        distance: f32,
        /// Cone half-angle in radians.
        angle: f32,
        penumbra: f32,
        decay: f32,
        target: [f32; 3],
    },
    RectArea { width: f32, height: f32 },
}

impl LightKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ambient => "ambient",
            Self::Directional { .. } => "directional",
            Self::Hemisphere { .. } => "hemisphere",
            Self::Point { .. } => "point",
            Self::Spot { .. } => "spot",
            Self::RectArea { .. } => "rect-area",
        }
    }

    /// Whether a shadow map could be attached to this kind of light.
    pub fn supports_shadows(&self) -> bool {
        matches!(
            self,
            Self::Directional { .. } | Self::Point { .. } | Self::Spot { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub kind: LightKind,
    pub color: Color,
    pub intensity: f32,
    pub shadow: ShadowSettings,
}

impl Light {
    pub fn new(kind: LightKind, color: Color, intensity: f32) -> Self {
        Self {
            kind,
            color,
            intensity,
            shadow: ShadowSettings::default(),
        }
    }

    pub fn ambient(color: Color, intensity: f32) -> Self {
        Self::new(LightKind::Ambient, color, intensity)
    }

    pub fn directional(color: Color, intensity: f32) -> Self {
        Self::new(
            LightKind::Directional {
                target: [0.0, 0.0, 0.0],
            },
            color,
            intensity,
        )
    }

    pub fn point(color: Color, intensity: f32, distance: f32) -> Self {
        Self::new(
            LightKind::Point {
                distance,
                decay: 2.0,
            },
            color,
            intensity,
        )
    }

    /// Enable shadow casting with a square map of `map_size` and the given far plane.
    pub fn with_shadow(mut self, map_size: u32, far: f32) -> Self {
        if self.kind.supports_shadows() {
            self.shadow.enabled = true;
            self.shadow.map_size = map_size;
            self.shadow.far = far;
        } else {
            tracing::warn!(kind = self.kind.label(), "light kind cannot cast shadows");
        }
        self
    }
}
