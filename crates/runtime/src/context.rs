use crate::tween::Timeline;
use rand::SeedableRng;
use rand::rngs::StdRng;
use scenelab_assets::{AssetId, AssetLoader, Completion, LoadedAsset};
use scenelab_input::{Cursor, OrbitControls};
use scenelab_render::{ArrayCamera, CameraRig, Viewport};
use scenelab_scene::{Mapping, Scene, Texture, TextureHandle, TextureSource};
use std::collections::HashMap;
use std::path::PathBuf;

/// Everything a demo reads and mutates, owned by one [`crate::Driver`].
pub struct DemoContext {
    pub scene: Scene,
    pub camera: CameraRig,
    /// When set, frames render through these sub-cameras instead of `camera`.
    pub array_camera: Option<ArrayCamera>,
    pub viewport: Viewport,
    pub controls: Option<OrbitControls>,
    pub cursor: Cursor,
    /// Vertical scroll offset of the host page, in logical pixels.
    pub scroll_y: f32,
    pub panel: Option<scenelab_tools::DebugPanel>,
    pub assets: AssetLoader,
    pub timeline: Timeline,
    pub rng: StdRng,
    pending_textures: HashMap<AssetId, Vec<TextureHandle>>,
}

impl DemoContext {
    pub fn new(assets_root: impl Into<PathBuf>, seed: u64, viewport: Viewport) -> Self {
        Self {
            scene: Scene::new(),
            camera: CameraRig::perspective(75.0, viewport.aspect(), 0.1, 100.0),
            array_camera: None,
            viewport,
            controls: None,
            cursor: Cursor::default(),
            scroll_y: 0.0,
            panel: None,
            assets: AssetLoader::new(assets_root),
            timeline: Timeline::new(),
            rng: StdRng::seed_from_u64(seed),
            pending_textures: HashMap::new(),
        }
    }

    fn pending(&mut self, id: AssetId, texture: Texture) -> (TextureHandle, bool) {
        let handle = self.scene.textures.insert(texture);
        let waiting = self.pending_textures.entry(id).or_default();
        let first = waiting.is_empty();
        waiting.push(handle);
        (handle, first)
    }

    /// Blank texture filled in when the image arrives.
    pub fn load_texture(&mut self, path: &str) -> TextureHandle {
        let id = AssetId::from_path(path);
        let (handle, first) = self.pending(id, Texture::blank(path));
        if first {
            self.assets.load_texture(path);
        }
        handle
    }

    /// Cube texture from `{dir}/px.{extension}` and the other five faces.
    pub fn load_cube_texture(&mut self, dir: &str, extension: &str) -> TextureHandle {
        let id = AssetId::from_path(dir);
        let mut texture = Texture::blank(dir);
        texture.params.mapping = Mapping::CubeReflection;
        let (handle, first) = self.pending(id, texture);
        if first {
            self.assets.load_cube(dir, extension);
        }
        handle
    }

    /// Equirectangular HDR environment.
    pub fn load_hdr(&mut self, path: &str) -> TextureHandle {
        let id = AssetId::from_path(path);
        let mut texture = Texture::blank(path);
        texture.params.mapping = Mapping::EquirectangularReflection;
        let (handle, first) = self.pending(id, texture);
        if first {
            self.assets.load_hdr(path);
        }
        handle
    }

    pub fn pending_textures(&self) -> usize {
        self.pending_textures.values().map(Vec::len).sum()
    }

    /// Fill textures waiting on `completion`. Returns the completion when no texture
    /// claimed it so the demo can handle it.
    pub fn claim(&mut self, completion: Completion) -> Option<Completion> {
        let Some(handles) = self.pending_textures.remove(&completion.id) else {
            return Some(completion);
        };
        let source = match completion.result {
            Ok(LoadedAsset::Texture(image)) | Ok(LoadedAsset::Hdr(image)) => {
                TextureSource::Image(image)
            }
            Ok(LoadedAsset::Cube(faces)) => TextureSource::Cube(faces),
            Ok(LoadedAsset::Font(_)) => {
                tracing::warn!(path = %completion.path, "font completion for a texture request");
                return None;
            }
            // already logged by the loader; the texture stays blank
            Err(_) => return None,
        };
        for handle in handles {
            if let Err(e) = self.scene.textures.fulfill(handle, source.clone()) {
                tracing::error!(path = %completion.path, error = %e, "texture fulfil failed");
            }
        }
        tracing::debug!(path = %completion.path, "texture ready");
        None
    }
}
