use crate::decode::{CUBE_FACES, decode_hdr, decode_image};
use crate::{AssetError, AssetId, LoadingManager, Typeface};
use scenelab_common::Image;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::Duration;

/// What to load. Paths are relative to the loader root; a leading `/` is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetRequest {
    /// PNG or JPEG image.
    Texture(String),
    /// Six images `{dir}/{px,nx,py,ny,pz,nz}.{extension}`.
    CubeTexture { dir: String, extension: String },
    /// Equirectangular Radiance HDR image.
    Hdr(String),
    /// Typeface JSON font.
    Font(String),
}

impl AssetRequest {
    pub fn path(&self) -> &str {
        match self {
            AssetRequest::Texture(p) | AssetRequest::Hdr(p) | AssetRequest::Font(p) => p,
            AssetRequest::CubeTexture { dir, .. } => dir,
        }
    }

    pub fn id(&self) -> AssetId {
        AssetId::from_path(self.path())
    }
}

#[derive(Debug, Clone)]
pub enum LoadedAsset {
    Texture(Image),
    Cube(Box<[Image; 6]>),
    Hdr(Image),
    Font(Box<Typeface>),
}

/// Result of one request, delivered to the frame loop by [`AssetLoader::poll`].
#[derive(Debug)]
pub struct Completion {
    pub id: AssetId,
    pub path: String,
    pub result: Result<LoadedAsset, AssetError>,
}

fn load(root: &Path, request: &AssetRequest) -> Result<LoadedAsset, AssetError> {
    let resolve = |p: &str| root.join(p.trim_start_matches('/'));
    match request {
        AssetRequest::Texture(p) => decode_image(&resolve(p)).map(LoadedAsset::Texture),
        AssetRequest::Hdr(p) => decode_hdr(&resolve(p)).map(LoadedAsset::Hdr),
        AssetRequest::CubeTexture { dir, extension } => {
            let dir = resolve(dir);
            let faces = CUBE_FACES
                .iter()
                .map(|face| decode_image(&dir.join(format!("{face}.{extension}"))))
                .collect::<Result<Vec<_>, _>>()?;
            let faces: [Image; 6] = faces.try_into().map_err(|_| AssetError::Decode {
                path: dir.clone(),
                message: "cube texture needs six faces".into(),
            })?;
            Ok(LoadedAsset::Cube(Box::new(faces)))
        }
        AssetRequest::Font(p) => {
            let path = resolve(p);
            let json = std::fs::read_to_string(&path).map_err(|source| AssetError::Io {
                path: path.clone(),
                source,
            })?;
            Typeface::parse(&json).map(|f| LoadedAsset::Font(Box::new(f)))
        }
    }
}

/// Loads assets on worker threads and hands completions back to the frame loop.
pub struct AssetLoader {
    root: PathBuf,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    manager: LoadingManager,
}

impl AssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            root: root.into(),
            tx,
            rx,
            manager: LoadingManager::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manager(&self) -> &LoadingManager {
        &self.manager
    }

    /// Start loading `request` in the background.
    pub fn request(&mut self, request: AssetRequest) -> AssetId {
        let id = request.id();
        let path = request.path().to_string();
        self.manager.item_start(&path);

        let root = self.root.clone();
        let tx = self.tx.clone();
        let worker_path = path.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("asset-{id}"))
            .spawn(move || {
                let _span = tracing::debug_span!("asset_load", path = %worker_path).entered();
                let result = load(&root, &request);
                // The loader may have been dropped; nothing to report to then.
                let _ = tx.send(Completion {
                    id,
                    path: worker_path,
                    result,
                });
            });
        if let Err(e) = spawned {
            tracing::error!(%path, error = %e, "failed to spawn asset worker");
            let _ = self.tx.send(Completion {
                id,
                path: path.clone(),
                result: Err(AssetError::WorkerGone(path)),
            });
        }
        id
    }

    pub fn load_texture(&mut self, path: &str) -> AssetId {
        self.request(AssetRequest::Texture(path.into()))
    }

    pub fn load_cube(&mut self, dir: &str, extension: &str) -> AssetId {
        self.request(AssetRequest::CubeTexture {
            dir: dir.into(),
            extension: extension.into(),
        })
    }

    pub fn load_hdr(&mut self, path: &str) -> AssetId {
        self.request(AssetRequest::Hdr(path.into()))
    }

    pub fn load_font(&mut self, path: &str) -> AssetId {
        self.request(AssetRequest::Font(path.into()))
    }

    /// Drain finished loads without blocking.
    pub fn poll(&mut self) -> Vec<Completion> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(c) => out.push(c),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
        self.record(&out);
        out
    }

    /// Block up to `timeout` for the first completion, then drain the rest.
    pub fn wait(&mut self, timeout: Duration) -> Vec<Completion> {
        if self.manager.is_idle() {
            return Vec::new();
        }
        let mut out = Vec::new();
        if let Ok(first) = self.rx.recv_timeout(timeout) {
            out.push(first);
        }
        self.record(&out);
        out.extend(self.poll());
        out
    }

    fn record(&mut self, completions: &[Completion]) {
        for c in completions {
            match &c.result {
                Ok(_) => self.manager.item_end(&c.path),
                Err(e) => {
                    tracing::error!(path = %c.path, error = %e, "asset load failed");
                    self.manager.item_error(&c.path);
                }
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.manager.pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn drain_all(loader: &mut AssetLoader) -> Vec<Completion> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut out = Vec::new();
        while loader.pending() > 0 && Instant::now() < deadline {
            out.extend(loader.wait(Duration::from_millis(100)));
        }
        out
    }

    fn write_png(dir: &Path, name: &str, rgba: [u8; 4]) {
        image::RgbaImage::from_pixel(4, 4, image::Rgba(rgba))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn loads_texture_in_background() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("textures")).unwrap();
        write_png(&dir.path().join("textures"), "a.png", [255, 0, 0, 255]);

        let mut loader = AssetLoader::new(dir.path());
        let id = loader.load_texture("/textures/a.png");
        let done = drain_all(&mut loader);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, id);
        match &done[0].result {
            Ok(LoadedAsset::Texture(img)) => assert_eq!((img.width, img.height), (4, 4)),
            other => panic!("unexpected {other:?}"),
        }
        assert!(loader.manager().is_idle());
    }

    #[test]
    fn missing_file_completes_with_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = AssetLoader::new(dir.path());
        loader.load_texture("nope.jpg");
        let done = drain_all(&mut loader);
        assert_eq!(done.len(), 1);
        assert!(done[0].result.is_err());
        assert_eq!(loader.manager().failed(), 1);
        assert!(loader.poll().is_empty());
    }

    #[test]
    fn cube_texture_needs_all_faces() {
        let dir = tempfile::tempdir().unwrap();
        for face in CUBE_FACES {
            write_png(dir.path(), &format!("{face}.png"), [0, 0, 255, 255]);
        }
        let mut loader = AssetLoader::new(dir.path());
        loader.load_cube("", "png");
        let done = drain_all(&mut loader);
        assert!(matches!(done[0].result, Ok(LoadedAsset::Cube(_))));

        std::fs::remove_file(dir.path().join("nz.png")).unwrap();
        loader.load_cube("", "png");
        let done = drain_all(&mut loader);
        assert!(done[0].result.is_err());
    }

    #[test]
    fn loads_font_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("font.json"),
            r#"{"resolution":1000,"boundingBox":{"yMin":0,"yMax":1000},"glyphs":{}}"#,
        )
        .unwrap();
        let mut loader = AssetLoader::new(dir.path());
        loader.load_font("/font.json");
        let done = drain_all(&mut loader);
        assert!(matches!(done[0].result, Ok(LoadedAsset::Font(_))));
    }

    #[test]
    fn poll_never_blocks_while_loading() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = AssetLoader::new(dir.path());
        loader.load_texture("slow.png");
        let _ = loader.poll();
        drain_all(&mut loader);
        assert_eq!(loader.pending(), 0);
    }
}
