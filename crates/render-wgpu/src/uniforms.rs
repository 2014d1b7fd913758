use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use scenelab_common::Color;
use scenelab_scene::{Fog, Light, LightKind, Material, MaterialKind};
use scenelab_render::CameraRig;

pub const MAX_LIGHTS: usize = 8;

const KIND_DIRECTIONAL: f32 = 0.0;
const KIND_POINT: f32 = 1.0;
const KIND_SPOT: f32 = 2.0;
const KIND_HEMISPHERE: f32 = 3.0;
const KIND_RECT_AREA: f32 = 4.0;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub(crate) struct GpuLight {
    pub position: [f32; 4],
    pub color: [f32; 4],
    pub spot: [f32; 4],
    pub extra: [f32; 4],
    pub ground: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub ambient: [f32; 4],
    pub fog_color: [f32; 4],
    pub fog_range: [f32; 4],
    pub viewport: [f32; 4],
    pub lights: [GpuLight; MAX_LIGHTS],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct DrawUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub params: [f32; 4],
    pub uv0: [f32; 4],
    pub uv1: [f32; 4],
    pub uv2: [f32; 4],
    pub flags: [f32; 4],
    pub env: [f32; 4],
}

/// Which texture occupies the auxiliary binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum AuxKind {
    None = 0,
    Matcap = 1,
    Gradient = 2,
    Alpha = 3,
}

pub(crate) fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

pub(crate) fn linear(color: Color) -> [f32; 3] {
    [
        srgb_to_linear(color.r),
        srgb_to_linear(color.g),
        srgb_to_linear(color.b),
    ]
}

fn shading_mode(kind: MaterialKind) -> f32 {
    match kind {
        MaterialKind::Basic | MaterialKind::Points => 0.0,
        MaterialKind::Normal => 1.0,
        MaterialKind::Matcap => 2.0,
        MaterialKind::Lambert => 3.0,
        MaterialKind::Phong => 4.0,
        MaterialKind::Toon => 5.0,
        MaterialKind::Standard | MaterialKind::Physical => 6.0,
    }
}

fn pack_light(light: &Light, world: Mat4) -> Option<GpuLight> {
    let position = world.transform_point3(Vec3::ZERO);
    let [r, g, b] = linear(light.color);
    let color = |range: f32| [r * light.intensity, g * light.intensity, b * light.intensity, range];
    let gpu = match light.kind {
        LightKind::Ambient => return None,
        LightKind::Directional { target } => {
            let dir = (position - Vec3::from_array(target)).normalize_or(Vec3::Y);
            GpuLight {
                position: dir.extend(0.0).to_array(),
                color: color(0.0),
                extra: [0.0, 0.0, KIND_DIRECTIONAL, 0.0],
                ..GpuLight::default()
            }
        }
        LightKind::Hemisphere { ground } => {
            let [gr, gg, gb] = linear(ground);
            GpuLight {
                position: [0.0, 1.0, 0.0, 0.0],
                color: color(0.0),
                extra: [0.0, 0.0, KIND_HEMISPHERE, 0.0],
                ground: [
                    gr * light.intensity,
                    gg * light.intensity,
                    gb * light.intensity,
                    0.0,
                ],
                ..GpuLight::default()
            }
        }
        LightKind::Point { distance, decay } => GpuLight {
            position: position.extend(1.0).to_array(),
            color: color(distance),
            extra: [0.0, decay, KIND_POINT, 0.0],
            ..GpuLight::default()
        },
        LightKind::Spot {
            distance,
            angle,
            penumbra,
            decay,
            target,
        } => {
            let dir = (Vec3::from_array(target) - position).normalize_or(Vec3::NEG_Y);
            GpuLight {
                position: position.extend(1.0).to_array(),
                color: color(distance),
                spot: dir.extend(angle.cos()).to_array(),
                extra: [(angle * (1.0 - penumbra)).cos(), decay, KIND_SPOT, 0.0],
                ..GpuLight::default()
            }
        }
        LightKind::RectArea { .. } => GpuLight {
            position: position.extend(1.0).to_array(),
            color: color(0.0),
            extra: [0.0, 0.0, KIND_RECT_AREA, 0.0],
            ..GpuLight::default()
        },
    };
    Some(gpu)
}

/// Per-view uniforms: camera matrices, ambient term, fog and up to [`MAX_LIGHTS`] lights.
pub(crate) fn pack_frame(
    rig: &CameraRig,
    lights: &[(Light, Mat4)],
    fog: Option<&Fog>,
    viewport_px: (u32, u32),
) -> FrameUniforms {
    let mut ambient = Vec3::ZERO;
    let mut packed = [GpuLight::default(); MAX_LIGHTS];
    let mut count = 0;
    for (light, world) in lights {
        if let LightKind::Ambient = light.kind {
            ambient += Vec3::from_array(linear(light.color)) * light.intensity;
            continue;
        }
        if count == MAX_LIGHTS {
            tracing::warn!(max = MAX_LIGHTS, "light limit reached, extra lights ignored");
            break;
        }
        if let Some(gpu) = pack_light(light, *world) {
            packed[count] = gpu;
            count += 1;
        }
    }
    let (fog_color, fog_range) = match fog {
        Some(f) => {
            let [r, g, b] = linear(f.color);
            ([r, g, b, 1.0], [f.near, f.far, 0.0, 0.0])
        }
        None => ([0.0; 4], [0.0; 4]),
    };
    let view = rig.view_matrix();
    let proj = rig.projection.matrix();
    FrameUniforms {
        view_proj: (proj * view).to_cols_array_2d(),
        view: view.to_cols_array_2d(),
        proj: proj.to_cols_array_2d(),
        camera_pos: rig.eye().extend(1.0).to_array(),
        ambient: ambient.extend(count as f32).to_array(),
        fog_color,
        fog_range,
        viewport: [viewport_px.0 as f32, viewport_px.1 as f32, 0.0, 0.0],
        lights: packed,
    }
}

/// Texture state a draw can rely on this frame.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DrawTextures {
    pub has_map: bool,
    pub aux: Option<AuxKind>,
    pub uv_transform: Option<glam::Mat3>,
    /// Average environment radiance already scaled by intensity.
    pub env: [f32; 3],
}

pub(crate) fn pack_draw(world: Mat4, material: &Material, textures: DrawTextures) -> DrawUniforms {
    let [r, g, b] = linear(material.color);
    let uv = textures.uv_transform.unwrap_or(glam::Mat3::IDENTITY);
    let fourth = match material.kind {
        MaterialKind::Points => material.size,
        _ => material.shininess,
    };
    DrawUniforms {
        model: world.to_cols_array_2d(),
        normal_matrix: world.inverse().transpose().to_cols_array_2d(),
        color: [r, g, b, material.opacity],
        params: [
            shading_mode(material.kind),
            material.roughness,
            material.metalness,
            fourth,
        ],
        uv0: uv.x_axis.extend(0.0).to_array(),
        uv1: uv.y_axis.extend(0.0).to_array(),
        uv2: uv.z_axis.extend(0.0).to_array(),
        flags: [
            if textures.has_map { 1.0 } else { 0.0 },
            textures.aux.map_or(0.0, |a| a as u8 as f32),
            if material.vertex_colors { 1.0 } else { 0.0 },
            if material.size_attenuation { 1.0 } else { 0.0 },
        ],
        env: [textures.env[0], textures.env[1], textures.env[2], 0.0],
    }
}
