//! Background model loading with a completion signal.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::glb::GlbInfo;
use crate::core::{Error, Result};

/// Bytes read per step; progress is reported after each one.
const READ_CHUNK: usize = 64 * 1024;

/// A loaded moon model.
#[derive(Clone, Debug)]
pub struct MoonAsset {
    /// File the model came from.
    pub path: PathBuf,
    /// Size of the file in bytes.
    pub byte_len: usize,
    /// Parsed container summary.
    pub info: GlbInfo,
}

/// Where a load currently stands.
#[derive(Clone, Debug)]
pub enum LoadState {
    /// Still reading; progress in `[0, 1]`.
    Pending { progress: f32 },
    /// Finished and parsed.
    Ready(Arc<MoonAsset>),
    /// Gave up.
    Failed(String),
}

/// Handle to an in-flight or finished load.
pub struct AssetHandle {
    rx: watch::Receiver<LoadState>,
    _task: JoinHandle<()>,
}

impl AssetHandle {
    /// Snapshot of the current state.
    pub fn state(&self) -> LoadState {
        self.rx.borrow().clone()
    }

    /// The asset, if it is ready. Never blocks.
    pub fn try_ready(&self) -> Option<Arc<MoonAsset>> {
        match &*self.rx.borrow() {
            LoadState::Ready(asset) => Some(asset.clone()),
            _ => None,
        }
    }

    /// Wait for the load to finish.
    pub async fn wait(&mut self) -> Result<Arc<MoonAsset>> {
        loop {
            let state = self.rx.borrow_and_update().clone();
            match state {
                LoadState::Ready(asset) => return Ok(asset),
                LoadState::Failed(msg) => return Err(Error::Asset(msg)),
                LoadState::Pending { .. } => {
                    self.rx
                        .changed()
                        .await
                        .map_err(|_| Error::Asset("loader stopped before finishing".to_string()))?;
                }
            }
        }
    }
}

/// Spawns model loads on the current tokio runtime.
pub struct AssetLoader;

impl AssetLoader {
    /// Start loading `path` in the background.
    ///
    /// Panics if called outside a tokio runtime context.
    pub fn load(path: impl Into<PathBuf>) -> AssetHandle {
        let path = path.into();
        let (tx, rx) = watch::channel(LoadState::Pending { progress: 0.0 });

        let task = tokio::spawn(async move {
            let report = |progress| {
                let _ = tx.send(LoadState::Pending { progress });
            };
            let state = match read_model(&path, report).await {
                Ok(asset) => {
                    log::info!(
                        "Loaded {} ({} bytes, {} meshes, radius {:.1})",
                        asset.path.display(),
                        asset.byte_len,
                        asset.info.mesh_count,
                        asset.info.bounding_radius()
                    );
                    LoadState::Ready(Arc::new(asset))
                }
                Err(e) => {
                    log::error!("Failed to load {}: {}", path.display(), e);
                    LoadState::Failed(e.to_string())
                }
            };
            // Receivers may all be gone; nothing left to tell
            let _ = tx.send(state);
        });

        AssetHandle { rx, _task: task }
    }
}

/// Read and parse `path`, calling `on_progress` with the fraction read
/// after every chunk. The last call is always `1.0`.
async fn read_model(path: &Path, mut on_progress: impl FnMut(f32)) -> Result<MoonAsset> {
    let mut file = tokio::fs::File::open(path).await?;
    let total = file.metadata().await?.len() as usize;

    let mut bytes = Vec::with_capacity(total);
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        bytes.extend_from_slice(&buf[..n]);

        let progress = if total > 0 {
            (bytes.len() as f32 / total as f32).min(1.0)
        } else {
            1.0
        };
        log::info!("{}: {:.0}% loaded", path.display(), progress * 100.0);
        on_progress(progress);
    }
    if bytes.is_empty() {
        on_progress(1.0);
    }

    let info = GlbInfo::parse(&bytes)?;
    Ok(MoonAsset {
        path: path.to_path_buf(),
        byte_len: bytes.len(),
        info,
    })
}
