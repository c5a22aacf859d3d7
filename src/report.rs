use crate::{generate::GenerationResult, reconcile::FinalReport};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub folder: String,
    pub run_dir: String,
    pub started: String,
    pub finished: String,
    pub images_found: usize,
    pub ocr_failures: Vec<OcrFailure>,
    pub decode_warnings: Vec<String>,
    pub entries: usize,
    pub generation: Vec<GenerationResult>,
    pub reconciliation: FinalReport,
}

impl RunReport {
    pub fn status(&self) -> RunStatus {
        if self.reconciliation.is_complete() {
            RunStatus::Ok
        } else {
            RunStatus::Degraded
        }
    }

    pub fn summary(&self) -> Summary {
        Summary {
            run_dir: self.run_dir.clone(),
            entries: self.entries,
            missing: self
                .reconciliation
                .missing
                .iter()
                .map(|m| m.id.clone())
                .collect(),
            status: self.status(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrFailure {
    pub image: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Ok,
    Degraded,
}

impl RunStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Ok => 0,
            RunStatus::Degraded => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub run_dir: String,
    pub entries: usize,
    pub missing: Vec<String>,
    pub status: RunStatus,
}
