use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::foundation::error::{ShortsError, ShortsResult};

/// Scratch directory for one run's generated images, narration and mixed audio.
///
/// Removed on drop unless created with `keep`.
#[derive(Debug)]
pub struct TempWorkspace {
    dir: PathBuf,
    guard: Option<TempDir>,
}

impl TempWorkspace {
    /// Create a unique `run_*` directory under `root`.
    pub fn create(root: &Path, keep: bool) -> ShortsResult<Self> {
        let create_err = |e: std::io::Error| {
            ShortsError::validation(format!(
                "create temp directory under '{}': {e}",
                root.display()
            ))
        };
        std::fs::create_dir_all(root).map_err(create_err)?;
        let tmp = tempfile::Builder::new()
            .prefix("run_")
            .tempdir_in(root)
            .map_err(create_err)?;

        let ws = if keep {
            let dir = tmp.keep();
            tracing::info!(dir = %dir.display(), "temp files will be kept");
            Self { dir, guard: None }
        } else {
            Self {
                dir: tmp.path().to_path_buf(),
                guard: Some(tmp),
            }
        };
        tracing::debug!(dir = %ws.dir.display(), keep, "temp workspace created");
        Ok(ws)
    }

    /// Whether the directory outlives this value.
    pub fn is_kept(&self) -> bool {
        self.guard.is_none()
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn image_path(&self, page_number: u32) -> PathBuf {
        self.dir.join(format!("page_{page_number:02}.png"))
    }

    pub fn audio_path(&self, page_number: u32) -> PathBuf {
        self.dir.join(format!("page_{page_number:02}.wav"))
    }

    pub fn mix_path(&self) -> PathBuf {
        self.dir.join("mix.f32le")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/production/workspace.rs"]
mod tests;
