use scenelab_common::Image;
use scenelab_scene::{
    ColorSpace, Filter, Texture, TextureHandle, TextureParams, TextureSource, TextureStore, Wrap,
};
use std::collections::HashMap;

pub(crate) struct GpuTexture {
    version: u64,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    /// Mean linear color, used for environment lighting and texture backgrounds.
    pub average: [f32; 3],
}

/// Box-filtered mip levels of an RGBA8 image, level 0 first.
pub(crate) fn mip_chain(width: u32, height: u32, rgba: &[u8]) -> Vec<(u32, u32, Vec<u8>)> {
    let mut levels = vec![(width, height, rgba.to_vec())];
    let (mut w, mut h) = (width, height);
    while w > 1 || h > 1 {
        let (nw, nh) = ((w / 2).max(1), (h / 2).max(1));
        let Some((_, _, prev)) = levels.last() else {
            break;
        };
        let mut next = vec![0u8; (nw * nh * 4) as usize];
        for y in 0..nh {
            for x in 0..nw {
                let mut acc = [0u32; 4];
                let mut n = 0;
                for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                    let sx = (x * 2 + dx).min(w - 1);
                    let sy = (y * 2 + dy).min(h - 1);
                    let i = ((sy * w + sx) * 4) as usize;
                    for c in 0..4 {
                        acc[c] += prev[i + c] as u32;
                    }
                    n += 1;
                }
                let o = ((y * nw + x) * 4) as usize;
                for c in 0..4 {
                    next[o + c] = (acc[c] / n) as u8;
                }
            }
        }
        levels.push((nw, nh, next));
        w = nw;
        h = nh;
    }
    levels
}

/// Mean color of an image in linear space.
pub(crate) fn average_color(image: &Image, srgb: bool) -> [f32; 3] {
    let rgba = image.to_rgba8();
    let pixels = (rgba.len() / 4).max(1) as f32;
    let mut sum = [0.0f32; 3];
    for px in rgba.chunks_exact(4) {
        for c in 0..3 {
            let v = px[c] as f32 / 255.0;
            sum[c] += if srgb {
                crate::uniforms::srgb_to_linear(v)
            } else {
                v
            };
        }
    }
    sum.map(|s| s / pixels)
}

fn address_mode(wrap: Wrap) -> wgpu::AddressMode {
    match wrap {
        Wrap::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        Wrap::Repeat => wgpu::AddressMode::Repeat,
        Wrap::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
    }
}

fn filter_mode(filter: Filter) -> wgpu::FilterMode {
    match filter {
        Filter::Nearest => wgpu::FilterMode::Nearest,
        Filter::Linear => wgpu::FilterMode::Linear,
    }
}

pub(crate) fn create_sampler(device: &wgpu::Device, params: &TextureParams) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("texture_sampler"),
        address_mode_u: address_mode(params.wrap_s),
        address_mode_v: address_mode(params.wrap_t),
        mag_filter: filter_mode(params.mag_filter),
        min_filter: filter_mode(params.min_filter),
        mipmap_filter: if params.generate_mipmaps {
            filter_mode(params.min_filter)
        } else {
            wgpu::FilterMode::Nearest
        },
        ..Default::default()
    })
}

#[allow(clippy::too_many_arguments)]
fn upload_rgba8(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    width: u32,
    height: u32,
    rgba: &[u8],
    srgb: bool,
    mipmaps: bool,
) -> wgpu::TextureView {
    let levels = if mipmaps {
        mip_chain(width, height, rgba)
    } else {
        vec![(width, height, rgba.to_vec())]
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: levels.len() as u32,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: if srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        },
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    for (level, (w, h, data)) in levels.iter().enumerate() {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: level as u32,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * w),
                rows_per_image: Some(*h),
            },
            wgpu::Extent3d {
                width: *w,
                height: *h,
                depth_or_array_layers: 1,
            },
        );
    }
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// GPU copies of loaded textures plus a 1x1 white fallback bound for empty slots.
pub(crate) struct TextureCache {
    textures: HashMap<TextureHandle, GpuTexture>,
    pub white_view: wgpu::TextureView,
    pub white_sampler: wgpu::Sampler,
}

impl TextureCache {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let white_view =
            upload_rgba8(device, queue, "white_texture", 1, 1, &[255; 4], false, false);
        let white_sampler = create_sampler(device, &TextureParams::default());
        Self {
            textures: HashMap::new(),
            white_view,
            white_sampler,
        }
    }

    /// Upload (or re-upload) a texture if its pixels are available. Blank textures
    /// stay unbound so materials render with their defaults.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        store: &TextureStore,
        handle: TextureHandle,
    ) -> Option<&GpuTexture> {
        let texture = store.get(handle)?;
        let version = store.version(handle)?;
        if !texture.is_loaded() {
            return None;
        }
        let stale = self
            .textures
            .get(&handle)
            .is_none_or(|t| t.version != version);
        if stale {
            let gpu = self.upload(device, queue, texture, version);
            self.textures.insert(handle, gpu);
        }
        self.textures.get(&handle)
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&GpuTexture> {
        self.textures.get(&handle)
    }

    fn upload(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &Texture,
        version: u64,
    ) -> GpuTexture {
        let srgb = texture.params.color_space == ColorSpace::Srgb;
        let sampler = create_sampler(device, &texture.params);
        let (view, average) = match &texture.source {
            TextureSource::Image(image) => {
                let average = average_color(image, srgb || image.is_hdr());
                let view = upload_rgba8(
                    device,
                    queue,
                    &texture.label,
                    image.width.max(1),
                    image.height.max(1),
                    &image.to_rgba8(),
                    srgb,
                    texture.params.generate_mipmaps,
                );
                (view, average)
            }
            TextureSource::Cube(faces) => {
                // Cube maps only feed environment lighting; keep a 1x1 of the mean.
                let mut average = [0.0f32; 3];
                for face in faces.iter() {
                    let a = average_color(face, true);
                    for c in 0..3 {
                        average[c] += a[c] / 6.0;
                    }
                }
                let px = average.map(|c| (c.clamp(0.0, 1.0) * 255.0) as u8);
                let view = upload_rgba8(
                    device,
                    queue,
                    &texture.label,
                    1,
                    1,
                    &[px[0], px[1], px[2], 255],
                    false,
                    false,
                );
                (view, average)
            }
            TextureSource::Blank => (
                upload_rgba8(device, queue, &texture.label, 1, 1, &[255; 4], false, false),
                [1.0; 3],
            ),
        };
        tracing::debug!(label = %texture.label, version, "texture uploaded");
        GpuTexture {
            version,
            view,
            sampler,
            average,
        }
    }
}
