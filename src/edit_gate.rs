//! The pause where a human corrects the OCR output.

use crate::config;
use anyhow::{Context, Result, anyhow};
use std::io::{BufRead, Write};
use std::path::Path;
use std::process::Command;
use tracing::{debug, info, warn};

/// Opens the document for the operator.
pub trait Editor {
    fn launch(&self, path: &Path) -> Result<()>;
}

/// Blocks until the operator says the document is ready.
pub trait Confirm {
    fn confirm(&self, path: &Path) -> Result<()>;
}

/// Runs the configured editor program and waits for it to exit.
#[derive(Debug, Clone)]
pub struct CommandEditor {
    program: String,
    args: Vec<String>,
}

impl CommandEditor {
    /// `editor.command`, else `$VISUAL`, else `$EDITOR`, else the platform's
    /// default text editor.
    pub fn from_config(cfg: &config::Editor) -> Self {
        let configured = Some(cfg.command.trim().to_string()).filter(|c| !c.is_empty());
        let from_env = || {
            ["VISUAL", "EDITOR"]
                .iter()
                .filter_map(|k| std::env::var(k).ok())
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty())
        };

        match configured.or_else(from_env) {
            Some(command) => {
                // `$EDITOR` commonly carries flags, e.g. "code --wait".
                let mut parts = command.split_whitespace().map(str::to_string);
                let program = parts.next().unwrap_or_default();
                let mut args: Vec<String> = parts.collect();
                args.extend(cfg.args.iter().cloned());
                Self { program, args }
            }
            None => {
                let (program, args) = platform_default();
                Self {
                    program: program.to_string(),
                    args: args.iter().map(|s| s.to_string()).collect(),
                }
            }
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

fn platform_default() -> (&'static str, &'static [&'static str]) {
    if cfg!(target_os = "windows") {
        ("notepad", &[])
    } else if cfg!(target_os = "macos") {
        ("open", &["-e"])
    } else {
        ("xdg-open", &[])
    }
}

impl Editor for CommandEditor {
    fn launch(&self, path: &Path) -> Result<()> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .status()
            .with_context(|| format!("could not launch editor {:?}", self.program))?;
        debug!("editor {} exited with {}", self.program, status);
        Ok(())
    }
}

/// For unattended runs.
pub struct NoEditor;

impl Editor for NoEditor {
    fn launch(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

/// Prompts on stdout and waits for a line on stdin. EOF counts as done.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, path: &Path) -> Result<()> {
        print!(
            "Press Enter after editing and saving {}... ",
            path.display()
        );
        std::io::stdout().flush().ok();
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| anyhow!("reading confirmation from stdin: {e}"))?;
        Ok(())
    }
}

/// Returns immediately.
pub struct NoConfirm;

impl Confirm for NoConfirm {
    fn confirm(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

pub struct EditGate<'a> {
    editor: &'a dyn Editor,
    confirm: &'a dyn Confirm,
}

impl<'a> EditGate<'a> {
    pub fn new(editor: &'a dyn Editor, confirm: &'a dyn Confirm) -> Self {
        Self { editor, confirm }
    }

    /// Hands `path` to the editor and blocks until confirmation. An editor
    /// that cannot be started is only a warning; the operator can edit the
    /// file by other means before confirming.
    pub fn await_edit(&self, path: &Path) -> Result<()> {
        info!("review and correct the detected texts in {}", path.display());
        info!("format: one block per image, `name:` then its text, blocks separated by a blank line");
        if let Err(err) = self.editor.launch(path) {
            warn!(
                "{err:#}; please open and edit the file manually: {}",
                path.display()
            );
        }
        self.confirm.confirm(path)
    }
}
