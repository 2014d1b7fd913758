use crate::mesh::MeshCache;
use crate::pipeline::{DEPTH_FORMAT, PipelineKey, Pipelines, Primitive};
use crate::texture::TextureCache;
use crate::uniforms::{
    AuxKind, DrawTextures, DrawUniforms, FrameUniforms, linear, pack_draw, pack_frame,
};
use glam::Vec3;
use scenelab_render::{CameraRig, OutputSink, RenderError, RenderView, Renderer};
use scenelab_scene::{
    Background, DrawKind, GeometryHandle, MaterialHandle, MaterialKind, Scene, TextureHandle,
    TextureSlot,
};
use std::collections::HashMap;

/// An acquired swapchain image with the scene already drawn into it.
///
/// The caller may draw overlays (the debug panel) into `view` before presenting.
pub struct SurfaceFrame {
    pub texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
}

impl SurfaceFrame {
    pub fn present(self) {
        self.texture.present();
    }
}

/// Texture versions a material bind group was built from.
type MaterialBindingKey = (Option<(TextureHandle, u64)>, Option<(TextureHandle, u64)>);

/// Uniform buffer split into fixed-stride slots addressed with dynamic offsets.
struct SlotBuffer {
    label: &'static str,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u64,
    size: u64,
    capacity: usize,
}

impl SlotBuffer {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &'static str,
        size: u64,
        capacity: usize,
    ) -> Self {
        let align = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = size.div_ceil(align) * align;
        let (buffer, bind_group) = Self::allocate(device, layout, label, stride, size, capacity);
        Self {
            label,
            buffer,
            bind_group,
            stride,
            size,
            capacity,
        }
    }

    fn allocate(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &'static str,
        stride: u64,
        size: u64,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(size),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn write<T: bytemuck::Pod>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        items: &[T],
    ) {
        if items.len() > self.capacity {
            self.capacity = items.len().next_power_of_two();
            let (buffer, bind_group) =
                Self::allocate(device, layout, self.label, self.stride, self.size, self.capacity);
            self.buffer = buffer;
            self.bind_group = bind_group;
        }
        let mut bytes = vec![0u8; self.stride as usize * items.len()];
        for (i, item) in items.iter().enumerate() {
            let start = i * self.stride as usize;
            let src = bytemuck::bytes_of(item);
            bytes[start..start + src.len()].copy_from_slice(src);
        }
        if !bytes.is_empty() {
            queue.write_buffer(&self.buffer, 0, &bytes);
        }
    }

    fn offset(&self, slot: usize) -> wgpu::DynamicOffset {
        (slot as u64 * self.stride) as wgpu::DynamicOffset
    }
}

struct PreparedDraw {
    key: PipelineKey,
    geometry: GeometryHandle,
    material: MaterialHandle,
    slot: usize,
    distance: f32,
}

/// wgpu renderer owning the surface, device and queue.
pub struct WgpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    logical_size: (u32, u32),
    pixel_ratio: f32,
    needs_configure: bool,
    depth_view: wgpu::TextureView,
    uniform_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    pipelines: Pipelines,
    frame_slots: SlotBuffer,
    draw_slots: SlotBuffer,
    meshes: MeshCache,
    textures: TextureCache,
    material_groups: HashMap<MaterialHandle, (MaterialBindingKey, wgpu::BindGroup)>,
}

fn uniform_layout_entry() -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: true,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entries() -> [wgpu::BindGroupLayoutEntry; 4] {
    let texture = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    };
    let sampler = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    };
    [texture(0), sampler(1), texture(2), sampler(3)]
}

fn aux_slot(kind: MaterialKind) -> (TextureSlot, AuxKind) {
    match kind {
        MaterialKind::Matcap => (TextureSlot::Matcap, AuxKind::Matcap),
        MaterialKind::Toon => (TextureSlot::Gradient, AuxKind::Gradient),
        _ => (TextureSlot::Alpha, AuxKind::Alpha),
    }
}

fn to_wgpu_color(rgb: [f32; 3]) -> wgpu::Color {
    wgpu::Color {
        r: rgb[0] as f64,
        g: rgb[1] as f64,
        b: rgb[2] as f64,
        a: 1.0,
    }
}

impl WgpuRenderer {
    /// Configure `surface` for `adapter` and build pipelines and caches.
    ///
    /// `width`/`height` are the initial surface size in device pixels.
    pub fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        device: wgpu::Device,
        queue: wgpu::Queue,
        width: u32,
        height: u32,
    ) -> Self {
        let caps = surface.get_capabilities(adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| caps.formats.first().copied())
            .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_layout"),
            entries: &[uniform_layout_entry()],
        });
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_layout"),
            entries: &texture_entries(),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &uniform_layout, &material_layout],
            push_constant_ranges: &[],
        });

        let pipelines = Pipelines::new(&device, pipeline_layout, format);
        let frame_slots = SlotBuffer::new(
            &device,
            &uniform_layout,
            "frame_uniforms",
            std::mem::size_of::<FrameUniforms>() as u64,
            4,
        );
        let draw_slots = SlotBuffer::new(
            &device,
            &uniform_layout,
            "draw_uniforms",
            std::mem::size_of::<DrawUniforms>() as u64,
            64,
        );
        let textures = TextureCache::new(&device, &queue);
        let depth_view = Self::create_depth_texture(&device, config.width, config.height);

        tracing::info!(
            ?format,
            width = config.width,
            height = config.height,
            "wgpu renderer ready"
        );

        Self {
            surface,
            device,
            queue,
            config,
            logical_size: (width.max(1), height.max(1)),
            pixel_ratio: 1.0,
            needs_configure: false,
            depth_view,
            uniform_layout,
            material_layout,
            pipelines,
            frame_slots,
            draw_slots,
            meshes: MeshCache::default(),
            textures,
            material_groups: HashMap::new(),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Current surface size in device pixels.
    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }

    fn configure(&mut self) {
        let (w, h) = self.drawing_buffer_size();
        self.config.width = w;
        self.config.height = h;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = Self::create_depth_texture(&self.device, w, h);
        self.needs_configure = false;
        tracing::debug!(width = w, height = h, "surface configured");
    }

    fn acquire(&mut self) -> Result<wgpu::SurfaceTexture, RenderError> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(frame),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.needs_configure = true;
                Err(RenderError::SurfaceLost)
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(RenderError::OutOfMemory),
            Err(wgpu::SurfaceError::Timeout) => Err(RenderError::Timeout),
            Err(e) => Err(RenderError::Backend(e.to_string())),
        }
    }

    /// Upload textures a material references and (re)build its bind group.
    fn prepare_material(&mut self, scene: &Scene, handle: MaterialHandle) -> DrawTextures {
        let Some(material) = scene.materials.get(handle) else {
            return DrawTextures::default();
        };
        let mut prepare = |slot: TextureSlot| {
            let tex = material.texture(slot)?;
            self.textures
                .prepare(&self.device, &self.queue, &scene.textures, tex)?;
            Some((tex, scene.textures.version(tex)?))
        };
        let map = prepare(TextureSlot::Map);
        let (aux_slot, aux_kind) = aux_slot(material.kind);
        let aux = prepare(aux_slot);
        let env_handle = material
            .texture(TextureSlot::Environment)
            .or(scene.environment);
        let env = env_handle
            .and_then(|h| {
                self.textures
                    .prepare(&self.device, &self.queue, &scene.textures, h)
                    .map(|t| t.average)
            })
            .filter(|_| material.kind.is_lit())
            .map(|avg| {
                let k = material.env_intensity * scene.environment_intensity;
                [avg[0] * k, avg[1] * k, avg[2] * k]
            })
            .unwrap_or([0.0; 3]);

        let key: MaterialBindingKey = (map, aux);
        let fresh = self
            .material_groups
            .get(&handle)
            .is_some_and(|(k, _)| *k == key);
        if !fresh {
            let pick = |entry: Option<(TextureHandle, u64)>| {
                entry
                    .and_then(|(h, _)| self.textures.get(h))
                    .map(|t| (&t.view, &t.sampler))
                    .unwrap_or((&self.textures.white_view, &self.textures.white_sampler))
            };
            let (map_view, map_sampler) = pick(map);
            let (aux_view, aux_sampler) = pick(aux);
            let group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("material_textures"),
                layout: &self.material_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(map_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(map_sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(aux_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::Sampler(aux_sampler),
                    },
                ],
            });
            self.material_groups.insert(handle, (key, group));
        }

        DrawTextures {
            has_map: map.is_some(),
            aux: aux.map(|_| aux_kind),
            uv_transform: map
                .and_then(|(h, _)| scene.textures.get(h))
                .map(|t| t.params.uv_transform()),
            env,
        }
    }

    fn clear_color(&mut self, scene: &Scene) -> wgpu::Color {
        match scene.background {
            Background::Default => wgpu::Color::BLACK,
            Background::Color(c) => to_wgpu_color(linear(c)),
            Background::Texture(h) => self
                .textures
                .prepare(&self.device, &self.queue, &scene.textures, h)
                .map(|t| to_wgpu_color(t.average))
                .unwrap_or(wgpu::Color::BLACK),
        }
    }
}

impl OutputSink for WgpuRenderer {
    fn set_size(&mut self, width: u32, height: u32) {
        if self.logical_size != (width, height) {
            self.logical_size = (width, height);
            self.needs_configure = true;
        }
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        if self.pixel_ratio != ratio {
            self.pixel_ratio = ratio;
            self.needs_configure = true;
        }
    }

    fn drawing_buffer_size(&self) -> (u32, u32) {
        let scale = |v: u32| ((v as f32 * self.pixel_ratio).round() as u32).max(1);
        (scale(self.logical_size.0), scale(self.logical_size.1))
    }
}

impl Renderer for WgpuRenderer {
    type Output = SurfaceFrame;

    fn render(&mut self, scene: &Scene, view: RenderView<'_>) -> Result<SurfaceFrame, RenderError> {
        let _span = tracing::trace_span!("wgpu_render").entered();
        if self.needs_configure {
            self.configure();
        }
        let texture = self.acquire()?;
        let target = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let size = (self.config.width, self.config.height);

        // Views: one full-size camera, or one rectangle per array sub-camera.
        let views: Vec<(CameraRig, Option<[u32; 4]>)> = match view {
            RenderView::Single(rig) => vec![(*rig, None)],
            RenderView::Array(array) => array
                .cameras
                .iter()
                .map(|c| (c.rig, Some(c.pixel_rect(size))))
                .collect(),
        };
        let eye = views.first().map(|(r, _)| r.eye()).unwrap_or(Vec3::ZERO);

        self.meshes.prune(&scene.geometries);
        self.material_groups
            .retain(|h, _| scene.materials.get(*h).is_some());

        let mut draws = Vec::new();
        let mut draw_uniforms = Vec::new();
        for item in scene.draw_items() {
            let Some(material) = scene.materials.get(item.drawable.material) else {
                continue;
            };
            let key = PipelineKey::for_draw(item.kind, material);
            let wire = item.kind == DrawKind::Mesh && material.wireframe;
            self.meshes
                .prepare(&self.device, &scene.geometries, item.drawable.geometry, wire);
            if self.meshes.get(item.drawable.geometry).is_none() {
                continue;
            }
            let textures = self.prepare_material(scene, item.drawable.material);
            self.pipelines.ensure(&self.device, key);
            let center = item.world.transform_point3(Vec3::ZERO);
            draws.push(PreparedDraw {
                key,
                geometry: item.drawable.geometry,
                material: item.drawable.material,
                slot: draw_uniforms.len(),
                distance: center.distance_squared(eye),
            });
            draw_uniforms.push(pack_draw(item.world, material, textures));
        }
        // Opaque first, then blended back to front.
        draws.sort_by(|a, b| {
            a.key
                .is_transparent()
                .cmp(&b.key.is_transparent())
                .then_with(|| {
                    if a.key.is_transparent() {
                        b.distance.total_cmp(&a.distance)
                    } else {
                        std::cmp::Ordering::Equal
                    }
                })
        });

        let lights: Vec<_> = scene
            .lights()
            .into_iter()
            .map(|(_, light, world)| (light, world))
            .collect();
        let frames: Vec<FrameUniforms> = views
            .iter()
            .map(|(rig, rect)| {
                let px = rect.map(|r| (r[2], r[3])).unwrap_or(size);
                pack_frame(rig, &lights, scene.fog.as_ref(), px)
            })
            .collect();

        self.frame_slots
            .write(&self.device, &self.queue, &self.uniform_layout, &frames);
        self.draw_slots
            .write(&self.device, &self.queue, &self.uniform_layout, &draw_uniforms);

        let clear = self.clear_color(scene);
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            for (view_index, (_, rect)) in views.iter().enumerate() {
                if let Some([x, y, w, h]) = rect {
                    pass.set_viewport(*x as f32, *y as f32, *w as f32, *h as f32, 0.0, 1.0);
                    pass.set_scissor_rect(*x, *y, *w, *h);
                }
                pass.set_bind_group(
                    0,
                    &self.frame_slots.bind_group,
                    &[self.frame_slots.offset(view_index)],
                );
                for draw in &draws {
                    let (Some(pipeline), Some(mesh), Some((_, material_group))) = (
                        self.pipelines.get(&draw.key),
                        self.meshes.get(draw.geometry),
                        self.material_groups.get(&draw.material),
                    ) else {
                        continue;
                    };
                    pass.set_pipeline(pipeline);
                    pass.set_bind_group(
                        1,
                        &self.draw_slots.bind_group,
                        &[self.draw_slots.offset(draw.slot)],
                    );
                    pass.set_bind_group(2, material_group, &[]);
                    pass.set_vertex_buffer(0, mesh.vertices.slice(..));
                    match draw.key.primitive {
                        Primitive::PointSprites => pass.draw(0..6, 0..mesh.vertex_count),
                        Primitive::Lines => {
                            let lines = mesh.wire.as_ref().or(mesh.indices.as_ref());
                            match lines {
                                Some((buffer, count)) => {
                                    pass.set_index_buffer(
                                        buffer.slice(..),
                                        wgpu::IndexFormat::Uint32,
                                    );
                                    pass.draw_indexed(0..*count, 0, 0..1);
                                }
                                None => pass.draw(0..mesh.vertex_count, 0..1),
                            }
                        }
                        Primitive::Triangles => match &mesh.indices {
                            Some((buffer, count)) => {
                                pass.set_index_buffer(buffer.slice(..), wgpu::IndexFormat::Uint32);
                                pass.draw_indexed(0..*count, 0, 0..1);
                            }
                            None => pass.draw(0..mesh.vertex_count, 0..1),
                        },
                    }
                }
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(SurfaceFrame {
            texture,
            view: target,
        })
    }
}

