use super::{
    TtsEngine,
    process::{self, ProcessSpec},
};
use crate::{
    config::{self, TtsPreset},
    util::expand_tilde,
};
use anyhow::{Result, anyhow, bail};
use std::path::{Path, PathBuf};
use tracing::debug;

const TEXT: &str = "{text}";
const OUTPUT: &str = "{output}";
const VOICE: &str = "{voice}";

/// TTS through an external program, one process per clip.
///
/// When no argument carries `{text}`, the text is piped to the program's stdin
/// instead. The `say` and `espeak` presets do this so a text starting with `-`
/// is never read as an option.
#[derive(Debug, Clone)]
pub struct CommandTts {
    program: PathBuf,
    args: Vec<String>,
    voice: String,
    cfg: config::Tts,
}

struct PresetDefaults {
    command: &'static str,
    args: &'static [&'static str],
    voice: &'static str,
}

fn preset_defaults(preset: TtsPreset) -> Option<PresetDefaults> {
    match preset {
        TtsPreset::Say => Some(PresetDefaults {
            command: "say",
            args: &[
                "-v",
                VOICE,
                "-o",
                OUTPUT,
                "--file-format=WAVE",
                "--data-format=LEI16",
            ],
            voice: "Alex",
        }),
        TtsPreset::Balcon => Some(PresetDefaults {
            command: r"C:\balcon\balcon.exe",
            args: &["-n", VOICE, "-t", TEXT, "-w", OUTPUT],
            voice: "ScanSoft Daniel_Full_22kHz",
        }),
        TtsPreset::Espeak => Some(PresetDefaults {
            command: "espeak-ng",
            args: &["-v", VOICE, "-w", OUTPUT, "--stdin"],
            voice: "en",
        }),
        TtsPreset::Custom => None,
        TtsPreset::Auto => preset_defaults(platform_preset()),
    }
}

pub fn platform_preset() -> TtsPreset {
    if cfg!(target_os = "macos") {
        TtsPreset::Say
    } else if cfg!(target_os = "windows") {
        TtsPreset::Balcon
    } else {
        TtsPreset::Espeak
    }
}

impl CommandTts {
    pub fn new(cfg: &config::Tts) -> Result<Self> {
        let defaults = preset_defaults(cfg.preset);

        let command = match (cfg.command.trim(), &defaults) {
            ("", Some(d)) => d.command.to_string(),
            ("", None) => bail!("tts.command is required when tts.preset = \"custom\""),
            (c, _) => c.to_string(),
        };
        let args = match (cfg.args.is_empty(), &defaults) {
            (true, Some(d)) => d.args.iter().map(|s| s.to_string()).collect(),
            (true, None) => bail!("tts.args is required when tts.preset = \"custom\""),
            (false, _) => cfg.args.clone(),
        };
        let voice = match (cfg.voice.trim(), &defaults) {
            ("", Some(d)) => d.voice.to_string(),
            (v, _) => v.to_string(),
        };

        if !args.iter().any(|a| a.contains(OUTPUT)) {
            return Err(anyhow!("tts.args must contain an {OUTPUT} placeholder"));
        }

        Ok(Self {
            program: expand_tilde(&command),
            args,
            voice,
            cfg: cfg.clone(),
        })
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    pub fn extension(&self) -> &str {
        &self.cfg.extension
    }

    fn reads_stdin(&self) -> bool {
        !self.args.iter().any(|a| a.contains(TEXT))
    }

    fn render_args(&self, text: &str, output: &Path) -> Vec<String> {
        let output = output.display().to_string();
        self.args
            .iter()
            .map(|a| {
                a.replace(VOICE, &self.voice)
                    .replace(OUTPUT, &output)
                    .replace(TEXT, text)
            })
            .collect()
    }
}

impl TtsEngine for CommandTts {
    fn synthesize(&self, text: &str, output: &Path) -> Result<()> {
        let stdin = self.reads_stdin().then(|| text.as_bytes().to_vec());
        let spec = ProcessSpec {
            program: self.program.clone(),
            args: self.render_args(text, output),
            env: self.cfg.env.clone(),
            stdin,
            timeout_seconds: self.cfg.timeout_seconds,
        };
        process::run(&spec)?;

        let written = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
        if written == 0 {
            bail!(
                "{} exited successfully but produced no audio at {}",
                self.program.display(),
                output.display()
            );
        }
        debug!("synthesized {} bytes -> {}", written, output.display());
        Ok(())
    }
}
