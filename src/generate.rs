use crate::{batch::Batch, sink::ArtifactSink};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub id: String,
    pub outcome: Outcome,
}

impl GenerationResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success)
    }
}

/// Requests one artifact per entry, in batch order. A failing entry is
/// recorded and the batch moves on; retrying is left to reconciliation.
pub fn generate(batch: &Batch, sink: &dyn ArtifactSink) -> Vec<GenerationResult> {
    let total = batch.len();
    batch
        .iter()
        .enumerate()
        .map(|(i, (id, text))| {
            info!("audio {}/{}: {}", i + 1, total, id);
            let outcome = match generate_one(sink, id, text) {
                Ok(()) => Outcome::Success,
                Err(msg) => Outcome::Failure(msg),
            };
            GenerationResult {
                id: id.to_string(),
                outcome,
            }
        })
        .collect()
}

/// A single sink write with the error flattened to its message.
pub fn generate_one(sink: &dyn ArtifactSink, id: &str, text: &str) -> Result<(), String> {
    sink.write(id, text).map_err(|err| {
        let msg = format!("{err:#}");
        warn!("generation failed for {id}: {msg}");
        msg
    })
}
