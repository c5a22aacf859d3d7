use crate::engine::TtsEngine;
use anyhow::{Context, Result, bail};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where generated audio lands, and the single authority on whether an entry
/// already has its artifact.
pub trait ArtifactSink {
    fn write(&self, id: &str, text: &str) -> Result<()>;
    fn exists(&self, id: &str) -> bool;
    /// Ids with an artifact present. Must agree with [`ArtifactSink::exists`].
    fn list_ids(&self) -> Result<BTreeSet<String>>;
}

/// One `<id>.<extension>` file per entry inside a single directory.
///
/// Empty files do not count as artifacts.
pub struct AudioDir<T: TtsEngine> {
    dir: PathBuf,
    extension: String,
    tts: T,
}

impl<T: TtsEngine> AudioDir<T> {
    pub fn new(dir: impl Into<PathBuf>, extension: &str, tts: T) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.trim_start_matches('.').to_string(),
            tts,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn artifact_path(&self, id: &str) -> Result<PathBuf> {
        validate_id(id)?;
        Ok(self.dir.join(format!("{id}.{}", self.extension)))
    }
}

impl<T: TtsEngine> ArtifactSink for AudioDir<T> {
    fn write(&self, id: &str, text: &str) -> Result<()> {
        let path = self.artifact_path(id)?;
        let res = self
            .tts
            .synthesize(text, &path)
            .with_context(|| format!("generating audio for {}", path.display()));
        // A failed engine may have left a truncated clip behind; it must not
        // count as an artifact on the next scan.
        if res.is_err() && path.exists() {
            if let Err(err) = std::fs::remove_file(&path) {
                warn!("could not remove partial artifact {}: {err}", path.display());
            }
        }
        res
    }

    fn exists(&self, id: &str) -> bool {
        self.artifact_path(id)
            .ok()
            .and_then(|p| std::fs::metadata(p).ok())
            .is_some_and(|m| m.is_file() && m.len() > 0)
    }

    fn list_ids(&self) -> Result<BTreeSet<String>> {
        let mut ids = BTreeSet::new();
        let rd = std::fs::read_dir(&self.dir)
            .with_context(|| format!("read_dir {}", self.dir.display()))?;
        for entry in rd {
            let entry = entry.with_context(|| format!("read_dir {}", self.dir.display()))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(self.extension.as_str()) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if self.exists(stem) {
                ids.insert(stem.to_string());
            } else {
                debug!("ignoring empty artifact {}", path.display());
            }
        }
        Ok(ids)
    }
}

/// Ids come from filename stems but the operator may rewrite them in the
/// editor; anything that could leave the audio directory is rejected.
fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        bail!("empty artifact id");
    }
    if id == "." || id == ".." || id.contains(['/', '\\']) || id.contains('\0') {
        bail!("invalid artifact id: {id:?}");
    }
    Ok(())
}
