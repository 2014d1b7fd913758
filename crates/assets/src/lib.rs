//! Asynchronous asset loading for demos.
//!
//! Requests are decoded on worker threads; completions are delivered over a channel
//! and drained by the frame loop with [`AssetLoader::poll`], so a frame never waits
//! on disk or decoding.
//!
//! # Invariants
//! - A failed load is logged and returned as a completion; it never panics the loop.
//! - Loads are not retried or cancelled.

mod decode;
mod loader;
mod manager;
mod typeface;

pub use decode::{CUBE_FACES, decode_hdr, decode_image};
pub use loader::{AssetLoader, AssetRequest, Completion, LoadedAsset};
pub use manager::LoadingManager;
pub use typeface::{TextOptions, Typeface};

use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Stable identifier of a request, derived from its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u64);

impl AssetId {
    pub fn from_path(path: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(path.as_bytes());
        let result = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&result[..8]);
        AssetId(u64::from_le_bytes(bytes))
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("typeface parse error: {0}")]
    Typeface(#[from] serde_json::Error),
    #[error("loader worker exited before completing {0}")]
    WorkerGone(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_id_is_stable_per_path() {
        let a = AssetId::from_path("/textures/door/color.jpg");
        let b = AssetId::from_path("/textures/door/color.jpg");
        let c = AssetId::from_path("/textures/door/alpha.jpg");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string().len(), 16);
    }
}
