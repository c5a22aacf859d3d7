use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: Run,
    #[serde(default)]
    pub discovery: Discovery,
    #[serde(default)]
    pub ocr: Ocr,
    #[serde(default)]
    pub normalize: Normalize,
    #[serde(default)]
    pub tts: Tts,
    #[serde(default)]
    pub editor: Editor,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw)
            .with_context(|| format!("parsing TOML: {}", path.display()))?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Run {
    pub max_attempts: u32,
    pub output_prefix: String,
    pub suffix_len: usize,
    pub document_filename: String,
    pub audio_dir: String,
    pub print_summary: bool,
    pub write_report_json: bool,
    pub report_filename: String,
    pub dump_effective_config: bool,
}
impl Default for Run {
    fn default() -> Self {
        Self {
            max_attempts: crate::reconcile::DEFAULT_MAX_ATTEMPTS,
            output_prefix: "output-".into(),
            suffix_len: 8,
            document_filename: "detected_texts.txt".into(),
            audio_dir: "audio".into(),
            print_summary: true,
            write_report_json: true,
            report_filename: "report.json".into(),
            dump_effective_config: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Discovery {
    pub recursive: bool,
    pub skip_hidden: bool,
}
impl Default for Discovery {
    fn default() -> Self {
        Self {
            recursive: true,
            skip_hidden: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Ocr {
    pub command: String,
    pub args: Vec<String>,
    pub timeout_seconds: u64,
    pub env: BTreeMap<String, String>,
}
impl Default for Ocr {
    fn default() -> Self {
        Self {
            command: "tesseract".into(),
            args: vec!["stdin".into(), "stdout".into()],
            timeout_seconds: 60,
            env: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Normalize {
    pub normalize_unicode: bool,
    pub collapse_whitespace: bool,
    pub strip_patterns: Vec<String>,
}
impl Default for Normalize {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            collapse_whitespace: true,
            strip_patterns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TtsPreset {
    Auto,
    Say,
    Balcon,
    Espeak,
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tts {
    pub preset: TtsPreset,
    /// Program to run. Empty means the preset's default.
    pub command: String,
    /// Argument template; `{text}`, `{output}` and `{voice}` are substituted.
    /// Empty means the preset's default.
    pub args: Vec<String>,
    /// Empty means the preset's default voice.
    pub voice: String,
    pub extension: String,
    pub timeout_seconds: u64,
    pub env: BTreeMap<String, String>,
}
impl Default for Tts {
    fn default() -> Self {
        Self {
            preset: TtsPreset::Auto,
            command: "".into(),
            args: Vec::new(),
            voice: "".into(),
            extension: "wav".into(),
            timeout_seconds: 120,
            env: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Editor {
    /// Empty means `$VISUAL`, then `$EDITOR`, then the platform default.
    pub command: String,
    pub args: Vec<String>,
    /// Block on Enter after launching the editor. Turn off for editors that
    /// only return once the file is closed (`code --wait`, `vim`).
    pub wait_for_confirm: bool,
}
impl Default for Editor {
    fn default() -> Self {
        Self {
            command: "".into(),
            args: Vec::new(),
            wait_for_confirm: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: true,
            file_path: "".into(),
        }
    }
}
