use crate::{config::Run, util::{ensure_dir, random_suffix}};
use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

/// Paths of one run's private output directory:
///
/// ```text
/// <folder>/output-<suffix>/
///     detected_texts.txt
///     report.json
///     audio/
///     logs/
/// ```
#[derive(Debug, Clone)]
pub struct RunLayout {
    pub root: PathBuf,
    pub document: PathBuf,
    pub report: PathBuf,
    pub audio: PathBuf,
    pub logs: PathBuf,
}

impl RunLayout {
    pub fn new(folder: &Path, cfg: &Run, suffix: &str) -> Self {
        let root = folder.join(format!("{}{}", cfg.output_prefix, suffix));
        Self {
            document: root.join(&cfg.document_filename),
            report: root.join(&cfg.report_filename),
            audio: root.join(&cfg.audio_dir),
            logs: root.join("logs"),
            root,
        }
    }

    /// Picks a fresh suffix and creates the directories. Any failure here is
    /// fatal for the run.
    pub fn create(folder: &Path, cfg: &Run) -> Result<Self> {
        for _ in 0..8 {
            let layout = Self::new(folder, cfg, &random_suffix(cfg.suffix_len));
            if layout.root.exists() {
                continue;
            }
            ensure_dir(&layout.root)?;
            ensure_dir(&layout.audio)?;
            ensure_dir(&layout.logs)?;
            return Ok(layout);
        }
        bail!("could not pick an unused output directory name in {}", folder.display())
    }
}
