/// Bindings shared by every pipeline: per-view frame uniforms (group 0), per-draw
/// uniforms (group 1, dynamic offset) and material textures (group 2).
const COMMON: &str = r#"
struct Light {
    // xyz position or direction, w: 0 directional, 1 positional
    position: vec4<f32>,
    // rgb color * intensity, w: distance (0 = infinite)
    color: vec4<f32>,
    // xyz spot direction, w: cos outer angle
    spot: vec4<f32>,
    // x: cos inner angle, y: decay, z: kind, w: unused
    extra: vec4<f32>,
    // rgb ground color for hemisphere lights
    ground: vec4<f32>,
};

struct Frame {
    view_proj: mat4x4<f32>,
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    // rgb ambient, w: light count
    ambient: vec4<f32>,
    // rgb fog color, w: 1 when fog is on
    fog_color: vec4<f32>,
    // x near, y far
    fog_range: vec4<f32>,
    // x width px, y height px
    viewport: vec4<f32>,
    lights: array<Light, 8>,
};

struct Draw {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    // rgb color, a opacity
    color: vec4<f32>,
    // x shading mode, y roughness, z metalness, w point size
    params: vec4<f32>,
    uv0: vec4<f32>,
    uv1: vec4<f32>,
    uv2: vec4<f32>,
    // x has map, y aux kind (0 none, 1 matcap, 2 gradient, 3 alpha), z vertex colors, w size attenuation
    flags: vec4<f32>,
    // rgb environment radiance
    env: vec4<f32>,
};

@group(0) @binding(0) var<uniform> frame: Frame;
@group(1) @binding(0) var<uniform> draw: Draw;
@group(2) @binding(0) var t_map: texture_2d<f32>;
@group(2) @binding(1) var s_map: sampler;
@group(2) @binding(2) var t_aux: texture_2d<f32>;
@group(2) @binding(3) var s_aux: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) color: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) color: vec3<f32>,
};

fn transform_uv(uv: vec2<f32>) -> vec2<f32> {
    let m = mat3x3<f32>(draw.uv0.xyz, draw.uv1.xyz, draw.uv2.xyz);
    return (m * vec3<f32>(uv, 1.0)).xy;
}

fn base_color(in: VertexOutput) -> vec4<f32> {
    var c = draw.color;
    if (draw.flags.z > 0.5) {
        c = vec4<f32>(c.rgb * in.color, c.a);
    }
    if (draw.flags.x > 0.5) {
        c = c * textureSample(t_map, s_map, in.uv);
    }
    if (draw.flags.y > 2.5) {
        c.a = c.a * textureSample(t_aux, s_aux, in.uv).g;
    }
    return c;
}

fn apply_fog(rgb: vec3<f32>, world_pos: vec3<f32>) -> vec3<f32> {
    if (frame.fog_color.w < 0.5) {
        return rgb;
    }
    let d = distance(world_pos, frame.camera_pos.xyz);
    let f = clamp((d - frame.fog_range.x) / max(frame.fog_range.y - frame.fog_range.x, 0.0001), 0.0, 1.0);
    return mix(rgb, frame.fog_color.rgb, f);
}
"#;

const MESH: &str = r#"
@vertex
fn vs_mesh(v: VertexInput) -> VertexOutput {
    let world = draw.model * vec4<f32>(v.position, 1.0);
    var out: VertexOutput;
    out.clip_position = frame.view_proj * world;
    out.world_pos = world.xyz;
    out.world_normal = normalize((draw.normal_matrix * vec4<f32>(v.normal, 0.0)).xyz);
    out.uv = transform_uv(v.uv);
    out.color = v.color;
    return out;
}

fn light_dir_and_color(l: Light, p: vec3<f32>) -> array<vec4<f32>, 2> {
    var dir = normalize(l.position.xyz);
    var atten = 1.0;
    if (l.position.w > 0.5) {
        let to_light = l.position.xyz - p;
        let d = length(to_light);
        dir = to_light / max(d, 0.0001);
        if (l.color.w > 0.0) {
            atten = pow(clamp(1.0 - d / l.color.w, 0.0, 1.0), l.extra.y);
        }
    }
    if (l.extra.z > 1.5 && l.extra.z < 2.5) {
        let cos_a = dot(-dir, normalize(l.spot.xyz));
        atten = atten * smoothstep(l.spot.w, l.extra.x, cos_a);
    }
    return array<vec4<f32>, 2>(vec4<f32>(dir, 0.0), vec4<f32>(l.color.rgb * atten, 0.0));
}

fn shade(in: VertexOutput, albedo: vec3<f32>, front: bool) -> vec3<f32> {
    var n = normalize(in.world_normal);
    if (!front) {
        n = -n;
    }
    let mode = draw.params.x;
    let view_dir = normalize(frame.camera_pos.xyz - in.world_pos);
    let roughness = clamp(draw.params.y, 0.04, 1.0);
    let metalness = clamp(draw.params.z, 0.0, 1.0);

    var diffuse = frame.ambient.rgb + draw.env.rgb;
    var specular = vec3<f32>(0.0);
    let count = u32(frame.ambient.w);
    for (var i = 0u; i < count; i = i + 1u) {
        let l = frame.lights[i];
        if (l.extra.z > 2.5 && l.extra.z < 3.5) {
            // hemisphere
            let k = n.y * 0.5 + 0.5;
            diffuse = diffuse + mix(l.ground.rgb, l.color.rgb, k);
            continue;
        }
        let dc = light_dir_and_color(l, in.world_pos);
        let dir = dc[0].xyz;
        let radiance = dc[1].rgb;
        var ndl = max(dot(n, dir), 0.0);
        if (mode > 4.5 && mode < 5.5) {
            if (draw.flags.y > 1.5 && draw.flags.y < 2.5) {
                ndl = textureSample(t_aux, s_aux, vec2<f32>(ndl, 0.5)).r;
            } else {
                ndl = select(0.3, 1.0, ndl > 0.5);
            }
        }
        diffuse = diffuse + radiance * ndl;
        if (mode > 3.5 && mode < 4.5) {
            let h = normalize(dir + view_dir);
            specular = specular + radiance * pow(max(dot(n, h), 0.0), draw.params.w);
        } else if (mode > 5.5) {
            let h = normalize(dir + view_dir);
            let shininess = 2.0 / (roughness * roughness * roughness * roughness) - 2.0;
            let f0 = mix(vec3<f32>(0.04), albedo, metalness);
            specular = specular + radiance * f0 * pow(max(dot(n, h), 0.0), max(shininess, 1.0)) * ndl;
        }
    }
    var kd = albedo;
    if (mode > 5.5) {
        kd = albedo * (1.0 - metalness);
    } else if (mode > 3.5 && mode < 4.5) {
        specular = specular * 0.07;
    }
    return kd * diffuse + specular;
}

@fragment
fn fs_mesh(in: VertexOutput, @builtin(front_facing) front: bool) -> @location(0) vec4<f32> {
    let base = base_color(in);
    let mode = draw.params.x;
    var rgb = base.rgb;
    if (mode > 0.5 && mode < 1.5) {
        let vn = normalize((frame.view * vec4<f32>(in.world_normal, 0.0)).xyz);
        rgb = vn * 0.5 + 0.5;
    } else if (mode > 1.5 && mode < 2.5) {
        let vn = normalize((frame.view * vec4<f32>(in.world_normal, 0.0)).xyz);
        let muv = vn.xy * 0.495 + vec2<f32>(0.5);
        var m = vec3<f32>(mix(0.2, 0.8, muv.y));
        if (draw.flags.y > 0.5 && draw.flags.y < 1.5) {
            m = textureSample(t_aux, s_aux, vec2<f32>(muv.x, 1.0 - muv.y)).rgb;
        }
        rgb = base.rgb * m;
    } else if (mode > 2.5) {
        rgb = shade(in, base.rgb, front);
    }
    return vec4<f32>(apply_fog(rgb, in.world_pos), base.a);
}

@fragment
fn fs_unlit(in: VertexOutput) -> @location(0) vec4<f32> {
    let base = base_color(in);
    return vec4<f32>(apply_fog(base.rgb, in.world_pos), base.a);
}
"#;

const POINTS: &str = r#"
@vertex
fn vs_points(v: VertexInput, @builtin(vertex_index) corner_index: u32) -> VertexOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0), vec2<f32>(1.0, -1.0), vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0), vec2<f32>(1.0, 1.0), vec2<f32>(-1.0, 1.0),
    );
    let corner = corners[corner_index];
    let world = draw.model * vec4<f32>(v.position, 1.0);
    let view_pos = frame.view * world;
    var clip: vec4<f32>;
    if (draw.flags.w > 0.5) {
        clip = frame.proj * (view_pos + vec4<f32>(corner * draw.params.w * 0.5, 0.0, 0.0));
    } else {
        clip = frame.proj * view_pos;
        let px = corner * draw.params.w / frame.viewport.xy;
        clip = clip + vec4<f32>(px * clip.w, 0.0, 0.0);
    }
    var out: VertexOutput;
    out.clip_position = clip;
    out.world_pos = world.xyz;
    out.world_normal = vec3<f32>(0.0, 0.0, 1.0);
    out.uv = corner * vec2<f32>(0.5, -0.5) + vec2<f32>(0.5);
    out.color = v.color;
    return out;
}
"#;

/// Full WGSL module: mesh, unlit line and point-sprite entry points.
pub fn scene_shader() -> String {
    format!("{COMMON}{MESH}{POINTS}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_has_every_entry_point() {
        let src = scene_shader();
        for entry in ["fn vs_mesh", "fn fs_mesh", "fn fs_unlit", "fn vs_points"] {
            assert!(src.contains(entry), "missing {entry}");
        }
    }
}
