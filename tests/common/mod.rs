#![allow(dead_code)]

use anyhow::{Result, bail};
use meme_narrator::{engine::OcrEngine, sink::ArtifactSink};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

/// In-memory sink that fails an id a scripted number of times before
/// succeeding.
#[derive(Default)]
pub struct FakeSink {
    present: RefCell<BTreeSet<String>>,
    failures_left: RefCell<HashMap<String, u32>>,
    attempts: RefCell<HashMap<String, u32>>,
    writes: RefCell<Vec<(String, String)>>,
}

impl FakeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_times(self, id: &str, times: u32) -> Self {
        self.failures_left.borrow_mut().insert(id.to_string(), times);
        self
    }

    pub fn always_fail(self, id: &str) -> Self {
        self.fail_times(id, u32::MAX)
    }

    pub fn with_present(self, id: &str) -> Self {
        self.present.borrow_mut().insert(id.to_string());
        self
    }

    pub fn attempts(&self, id: &str) -> u32 {
        self.attempts.borrow().get(id).copied().unwrap_or(0)
    }

    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.borrow().clone()
    }

    pub fn present(&self) -> BTreeSet<String> {
        self.present.borrow().clone()
    }
}

impl ArtifactSink for FakeSink {
    fn write(&self, id: &str, text: &str) -> Result<()> {
        self.writes
            .borrow_mut()
            .push((id.to_string(), text.to_string()));
        let attempt = {
            let mut attempts = self.attempts.borrow_mut();
            let n = attempts.entry(id.to_string()).or_insert(0);
            *n += 1;
            *n
        };
        let mut failures = self.failures_left.borrow_mut();
        if let Some(left) = failures.get_mut(id) {
            if *left > 0 {
                *left = left.saturating_sub(1);
                bail!("tts failed for {id} on attempt {attempt}");
            }
        }
        self.present.borrow_mut().insert(id.to_string());
        Ok(())
    }

    fn exists(&self, id: &str) -> bool {
        self.present.borrow().contains(id)
    }

    fn list_ids(&self) -> Result<BTreeSet<String>> {
        Ok(self.present.borrow().clone())
    }
}

/// Treats everything after the 8-byte PNG signature as the "recognized" text.
pub struct PayloadOcr;

pub const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

impl OcrEngine for PayloadOcr {
    fn detect_text(&self, image: &[u8]) -> Result<String> {
        let payload = image.get(PNG_SIGNATURE.len()..).unwrap_or_default();
        let text = String::from_utf8_lossy(payload).into_owned();
        if text.contains("OCR_ERROR") {
            bail!("vision service unavailable");
        }
        Ok(text)
    }
}

pub fn write_png(path: &std::path::Path, payload: &str) {
    let mut bytes = PNG_SIGNATURE.to_vec();
    bytes.extend_from_slice(payload.as_bytes());
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, bytes).unwrap();
}
