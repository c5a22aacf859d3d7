use super::{
    OcrEngine,
    process::{self, ProcessSpec},
};
use crate::{config, util::expand_tilde};
use anyhow::{Result, bail};

/// OCR through an external program that reads image bytes on stdin and
/// prints the recognized text on stdout (`tesseract stdin stdout` by default).
pub struct CommandOcr {
    spec: ProcessSpec,
}

impl CommandOcr {
    pub fn new(cfg: &config::Ocr) -> Result<Self> {
        let command = cfg.command.trim();
        if command.is_empty() {
            bail!("ocr.command is empty");
        }
        Ok(Self {
            spec: ProcessSpec {
                program: expand_tilde(command),
                args: cfg.args.clone(),
                env: cfg.env.clone(),
                stdin: None,
                timeout_seconds: cfg.timeout_seconds,
            },
        })
    }
}

impl OcrEngine for CommandOcr {
    fn detect_text(&self, image: &[u8]) -> Result<String> {
        let mut spec = self.spec.clone();
        spec.stdin = Some(image.to_vec());
        let output = process::run(&spec)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn stdout_of_the_command_is_the_text() {
        let cfg = config::Ocr {
            command: "cat".into(),
            args: Vec::new(),
            ..Default::default()
        };
        let ocr = CommandOcr::new(&cfg).unwrap();
        assert_eq!(ocr.detect_text(b"WHY NOT BOTH\n").unwrap(), "WHY NOT BOTH\n");
    }

    #[test]
    fn empty_command_is_rejected() {
        let cfg = config::Ocr {
            command: " ".into(),
            ..Default::default()
        };
        assert!(CommandOcr::new(&cfg).is_err());
    }
}
