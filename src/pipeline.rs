use crate::{
    batch::Batch,
    codec,
    config::Config,
    discovery::{DiscoveredImage, discover_images},
    edit_gate::EditGate,
    engine::OcrEngine,
    generate::{Outcome, generate, generate_one},
    layout::RunLayout,
    normalize::TextNormalizer,
    reconcile::reconcile_with_errors,
    report::{OcrFailure, RunReport},
    sink::ArtifactSink,
    util::now_rfc3339,
};
use anyhow::{Context, Result, anyhow};
use indexmap::IndexSet;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

pub struct Pipeline<'a> {
    cfg: Config,
    ocr: &'a dyn OcrEngine,
    sink: &'a dyn ArtifactSink,
    gate: EditGate<'a>,
    normalizer: TextNormalizer,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        cfg: &Config,
        ocr: &'a dyn OcrEngine,
        sink: &'a dyn ArtifactSink,
        gate: EditGate<'a>,
    ) -> Result<Self> {
        Ok(Self {
            cfg: cfg.clone(),
            ocr,
            sink,
            gate,
            normalizer: TextNormalizer::new(&cfg.normalize)?,
        })
    }

    /// OCR -> document -> human edit -> decode -> generate -> reconcile.
    ///
    /// Only filesystem failures on the run's own document abort; everything
    /// per-image or per-entry ends up in the report.
    pub fn run(&self, folder: &Path, layout: &RunLayout) -> Result<RunReport> {
        let started = now_rfc3339();

        let images = discover_images(&self.cfg.discovery, folder, Some(&layout.root))?;
        info!("total images found: {}", images.len());

        let (detected, ocr_failures) = self.detect(&images);

        std::fs::write(&layout.document, codec::encode(&detected))
            .with_context(|| format!("writing {}", layout.document.display()))?;
        info!(
            "detected texts for {} image(s) saved to {}",
            detected.len(),
            layout.document.display()
        );

        self.gate.await_edit(&layout.document)?;

        let raw = std::fs::read(&layout.document)
            .with_context(|| format!("reading {}", layout.document.display()))?;
        let raw = String::from_utf8(raw)
            .map_err(|e| anyhow!("{} is not valid UTF-8: {e}", layout.document.display()))?;
        let decoded = codec::decode(&raw);
        for w in &decoded.warnings {
            warn!("{w}");
        }
        let batch = decoded.batch;
        info!("{} corrected entr(ies) read back", batch.len());

        let generation = generate(&batch, self.sink);

        let expected: IndexSet<String> = batch.ids().map(str::to_string).collect();
        let first_pass_errors: BTreeMap<String, String> = generation
            .iter()
            .filter_map(|r| match &r.outcome {
                Outcome::Failure(msg) => Some((r.id.clone(), msg.clone())),
                Outcome::Success => None,
            })
            .collect();
        let reconciliation = reconcile_with_errors(
            &expected,
            self.sink,
            |id| generate_one(self.sink, id, batch.get(id).unwrap_or_default()),
            self.cfg.run.max_attempts,
            first_pass_errors,
        );

        Ok(RunReport {
            folder: folder.display().to_string(),
            run_dir: layout.root.display().to_string(),
            started,
            finished: now_rfc3339(),
            images_found: images.len(),
            ocr_failures,
            decode_warnings: decoded.warnings.iter().map(|w| w.to_string()).collect(),
            entries: batch.len(),
            generation,
            reconciliation,
        })
    }

    /// Images whose OCR fails or comes back empty contribute no entry.
    pub fn detect(&self, images: &[DiscoveredImage]) -> (Batch, Vec<OcrFailure>) {
        let mut batch = Batch::new();
        let mut failures = Vec::new();

        for (i, img) in images.iter().enumerate() {
            info!(
                "detecting text in image {}/{}: {}",
                i + 1,
                images.len(),
                img.path.display()
            );
            match self.detect_one(img) {
                Ok(text) => {
                    debug!("{} -> {:?}", img.id, text);
                    if batch.insert(img.id.clone(), text).is_some() {
                        warn!(
                            "duplicate image name {}; keeping text from {}",
                            img.id,
                            img.path.display()
                        );
                    }
                }
                Err(err) => {
                    warn!("error detecting text for {}: {err:#}", img.path.display());
                    failures.push(OcrFailure {
                        image: img.path.display().to_string(),
                        message: format!("{err:#}"),
                    });
                }
            }
        }

        (batch, failures)
    }

    fn detect_one(&self, img: &DiscoveredImage) -> Result<String> {
        let bytes = std::fs::read(&img.path)
            .with_context(|| format!("reading {}", img.path.display()))?;
        let raw = self.ocr.detect_text(&bytes)?;
        let text = self.normalizer.normalize(&raw);
        if text.is_empty() {
            return Err(anyhow!("no text detected"));
        }
        Ok(text)
    }
}
