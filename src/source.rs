//! Image discovery for the batch loop.

use crate::error::{PipelineError, PipelineResult};
use std::fs;
use std::path::{Path, PathBuf};

/// File extensions recognized as images, compared case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "bmp", "ppm", "pgm", "tif", "tiff"];

/// One entry of the enumerated batch sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    /// Stable identifier: the full path string. Also the sort key.
    pub id: String,
    /// Filesystem path of the image.
    pub path: PathBuf,
}

/// Enumerate the images directly under `dir`, sorted ascending by full
/// path string.
///
/// Only regular files with a recognized extension are returned;
/// subdirectories are not descended into. An empty result is not an
/// error. A missing or non-directory input path is a fatal configuration
/// error: no partial batch runs against an invalid source.
pub fn list_images(dir: &Path) -> PipelineResult<Vec<ImageEntry>> {
    if !dir.is_dir() {
        return Err(PipelineError::Config(format!(
            "image directory not found: {}",
            dir.display()
        )));
    }

    let read = fs::read_dir(dir).map_err(|e| {
        PipelineError::Config(format!("cannot read {}: {e}", dir.display()))
    })?;

    let mut entries = Vec::new();
    for entry in read {
        let entry = entry.map_err(|e| {
            PipelineError::Config(format!("cannot read {}: {e}", dir.display()))
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
            continue;
        }
        entries.push(ImageEntry {
            id: path.to_string_lossy().into_owned(),
            path,
        });
    }

    entries.sort_by(|a, b| a.id.cmp(&b.id));
    tracing::debug!("found {} images under {}", entries.len(), dir.display());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "supix-source-{tag}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_directory_is_a_config_error() {
        let dir = std::env::temp_dir().join("supix-source-does-not-exist");
        let err = list_images(&dir).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn empty_directory_yields_empty_sequence() {
        let dir = scratch_dir("empty");
        let entries = list_images(&dir).unwrap();
        assert!(entries.is_empty());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn entries_are_filtered_and_sorted() {
        let dir = scratch_dir("sorted");
        fs::write(dir.join("b.png"), b"x").unwrap();
        fs::write(dir.join("a.JPG"), b"x").unwrap();
        fs::write(dir.join("notes.txt"), b"x").unwrap();
        fs::create_dir(dir.join("sub.png")).unwrap();

        let entries = list_images(&dir).unwrap();
        let names: Vec<_> = entries
            .iter()
            .map(|e| e.path.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png"]);
        assert!(entries.windows(2).all(|w| w[0].id < w[1].id));
        fs::remove_dir_all(&dir).unwrap();
    }
}
