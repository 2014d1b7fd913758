use crate::mesh::Vertex;
use scenelab_scene::{Blending, DrawKind, Material, Side};
use std::collections::HashMap;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Primitive {
    Triangles,
    Lines,
    /// Camera-facing quads expanded from one instance per point.
    PointSprites,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum BlendMode {
    Opaque,
    Alpha,
    Additive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Cull {
    Back,
    Front,
    None,
}

/// Fixed-function state a draw needs; one pipeline is built per distinct key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct PipelineKey {
    pub primitive: Primitive,
    pub blend: BlendMode,
    pub cull: Cull,
    pub depth_write: bool,
}

impl PipelineKey {
    pub fn for_draw(kind: DrawKind, material: &Material) -> Self {
        let primitive = match kind {
            DrawKind::Points => Primitive::PointSprites,
            DrawKind::Lines => Primitive::Lines,
            DrawKind::Mesh if material.wireframe => Primitive::Lines,
            DrawKind::Mesh => Primitive::Triangles,
        };
        let blend = match (material.blending, material.transparent) {
            (Blending::Additive, _) => BlendMode::Additive,
            (Blending::Normal, true) => BlendMode::Alpha,
            (Blending::Normal, false) => BlendMode::Opaque,
        };
        let cull = match (primitive, material.side) {
            (Primitive::Triangles, Side::Front) => Cull::Back,
            (Primitive::Triangles, Side::Back) => Cull::Front,
            _ => Cull::None,
        };
        Self {
            primitive,
            blend,
            cull,
            depth_write: material.depth_write,
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.blend != BlendMode::Opaque
    }
}

fn blend_state(mode: BlendMode) -> wgpu::BlendState {
    match mode {
        BlendMode::Opaque => wgpu::BlendState::REPLACE,
        BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
        BlendMode::Additive => wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        },
    }
}

/// Lazily built render pipelines sharing one shader and layout.
pub(crate) struct Pipelines {
    layout: wgpu::PipelineLayout,
    shader: wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    built: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        layout: wgpu::PipelineLayout,
        format: wgpu::TextureFormat,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::shaders::scene_shader().into()),
        });
        Self {
            layout,
            shader,
            format,
            built: HashMap::new(),
        }
    }

    pub fn ensure(&mut self, device: &wgpu::Device, key: PipelineKey) {
        if self.built.contains_key(&key) {
            return;
        }
        let (vs, fs, step_mode, topology) = match key.primitive {
            Primitive::Triangles => (
                "vs_mesh",
                "fs_mesh",
                wgpu::VertexStepMode::Vertex,
                wgpu::PrimitiveTopology::TriangleList,
            ),
            Primitive::Lines => (
                "vs_mesh",
                "fs_mesh",
                wgpu::VertexStepMode::Vertex,
                wgpu::PrimitiveTopology::LineList,
            ),
            Primitive::PointSprites => (
                "vs_points",
                "fs_unlit",
                wgpu::VertexStepMode::Instance,
                wgpu::PrimitiveTopology::TriangleList,
            ),
        };
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&self.layout),
            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: Some(vs),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode,
                    attributes: &Vertex::ATTRIBUTES,
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.shader,
                entry_point: Some(fs),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: Some(blend_state(key.blend)),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                cull_mode: match key.cull {
                    Cull::Back => Some(wgpu::Face::Back),
                    Cull::Front => Some(wgpu::Face::Front),
                    Cull::None => None,
                },
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: key.depth_write,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });
        tracing::debug!(?key, "pipeline built");
        self.built.insert(key, pipeline);
    }

    pub fn get(&self, key: &PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.built.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenelab_common::Color;

    #[test]
    fn additive_points_skip_depth_write() {
        let key = PipelineKey::for_draw(DrawKind::Points, &Material::points(0.1).additive());
        assert_eq!(key.primitive, Primitive::PointSprites);
        assert_eq!(key.blend, BlendMode::Additive);
        assert!(!key.depth_write);
        assert!(key.is_transparent());
    }

    #[test]
    fn wireframe_mesh_draws_lines_without_culling() {
        let m = Material::basic(Color::WHITE).with_wireframe(true);
        let key = PipelineKey::for_draw(DrawKind::Mesh, &m);
        assert_eq!(key.primitive, Primitive::Lines);
        assert_eq!(key.cull, Cull::None);
    }

    #[test]
    fn double_sided_disables_culling() {
        let m = Material::standard().with_side(Side::Double);
        assert_eq!(PipelineKey::for_draw(DrawKind::Mesh, &m).cull, Cull::None);
        let m = Material::standard();
        assert_eq!(PipelineKey::for_draw(DrawKind::Mesh, &m).cull, Cull::Back);
    }
}
