use crate::config::Discovery;
use anyhow::{Context, Result};
use image::ImageReader;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredImage {
    /// Filename stem; becomes the entry id.
    pub id: String,
    pub path: PathBuf,
}

/// Lists the images under `root` in file-name order. `exclude` (the current
/// run directory) is never entered. Files whose content is not a recognized
/// image format are skipped.
pub fn discover_images(
    cfg: &Discovery,
    root: &Path,
    exclude: Option<&Path>,
) -> Result<Vec<DiscoveredImage>> {
    let mut walker = WalkDir::new(root).sort_by_file_name().follow_links(false);
    if !cfg.recursive {
        walker = walker.max_depth(1);
    }

    let mut images = Vec::new();
    let iter = walker.into_iter().filter_entry(|e| {
        if e.depth() == 0 {
            return true;
        }
        if exclude.is_some_and(|x| e.path() == x) {
            return false;
        }
        !(cfg.skip_hidden && e.file_name().to_string_lossy().starts_with('.'))
    });

    for entry in iter {
        let entry = match entry {
            Ok(e) => e,
            Err(err) if err.depth() == 0 => {
                return Err(err).with_context(|| format!("walking {}", root.display()));
            }
            Err(err) => {
                warn!("skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !is_image(path) {
            debug!("not an image: {}", path.display());
            continue;
        }
        let Some(id) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        images.push(DiscoveredImage {
            id,
            path: path.to_path_buf(),
        });
    }

    Ok(images)
}

/// Sniffs the leading bytes; the extension is not consulted.
pub fn is_image(path: &Path) -> bool {
    ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map(|r| r.format().is_some())
        .unwrap_or(false)
}
