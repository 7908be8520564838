//! Artifact path routing.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};

/// Routes artifacts to per-scale subdirectories under one base
/// directory.
///
/// Construction creates `base/<scale>` for every requested scale up
/// front, so writers never create directories mid-batch. A disabled
/// output (no base configured) is modeled by not constructing a router
/// at all: no directories appear, no paths are produced.
#[derive(Debug)]
pub struct OutputRouter {
    base: PathBuf,
}

impl OutputRouter {
    /// Create `base` and one subdirectory per requested scale,
    /// idempotently. Runs before any image is processed, so a failure
    /// here is a fatal configuration error.
    pub fn create(base: &Path, scales: &[u32]) -> PipelineResult<Self> {
        fs::create_dir_all(base)
            .map_err(|e| PipelineError::Config(format!("cannot create {}: {e}", base.display())))?;
        for &scale in scales {
            let dir = base.join(scale.to_string());
            fs::create_dir_all(&dir).map_err(|e| {
                PipelineError::Config(format!("cannot create {}: {e}", dir.display()))
            })?;
        }
        Ok(Self {
            base: base.to_path_buf(),
        })
    }

    /// Path of one artifact: `base/<scale>/<prefix><stem>.<ext>`.
    pub fn artifact_path(&self, scale: u32, prefix: &str, stem: &str, ext: &str) -> PathBuf {
        self.base
            .join(scale.to_string())
            .join(format!("{prefix}{stem}.{ext}"))
    }

    /// Base directory this router was bound to.
    pub fn base(&self) -> &Path {
        &self.base
    }
}
