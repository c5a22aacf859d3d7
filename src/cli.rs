use crate::{
    config::Config,
    edit_gate::{CommandEditor, Confirm, EditGate, Editor, NoConfirm, NoEditor, StdinConfirm},
    engine::{CommandOcr, CommandTts},
    layout::RunLayout,
    pipeline::Pipeline,
    report::RunStatus,
    sink::AudioDir,
    util::ensure_dir,
};
use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG: &str = "meme-narrator.toml";

#[derive(Parser, Debug)]
#[command(name = "meme-narrator")]
#[command(about = "Read the text off a folder of memes, let you fix it, then speak it into one audio clip per image")]
pub struct Args {
    /// Folder of images. A fresh output-<suffix> directory is created inside it.
    pub folder: PathBuf,

    /// Path to config TOML. If omitted, uses ./meme-narrator.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Regeneration rounds for clips still missing after the first pass.
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// TTS voice name, passed to the engine as-is.
    #[arg(long)]
    pub voice: Option<String>,

    /// Skip the editor and the confirmation prompt.
    #[arg(long)]
    pub no_edit: bool,
}

pub fn dispatch(args: Args) -> Result<RunStatus> {
    let cfg_path = resolve_config_path(args.config.as_deref());
    let mut cfg = match cfg_path {
        Some(p) => Config::load(&p)?,
        None => Config::default(),
    };
    apply_overrides(&args, &mut cfg);

    validate_folder(&args.folder)?;
    run(&args, &cfg)
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from(DEFAULT_CONFIG);
    default.exists().then_some(default)
}

fn apply_overrides(args: &Args, cfg: &mut Config) {
    if let Some(n) = args.max_attempts {
        cfg.run.max_attempts = n;
    }
    if let Some(v) = &args.voice {
        cfg.tts.voice = v.clone();
    }
    if let Some(level) = &args.log_level {
        cfg.logging.level = level.clone();
    }
}

fn validate_folder(folder: &Path) -> Result<()> {
    if !folder.exists() {
        return Err(anyhow!("folder does not exist: {}", folder.display()));
    }
    if !folder.is_dir() {
        return Err(anyhow!("not a directory: {}", folder.display()));
    }
    Ok(())
}

fn init_logging(cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.logging.level.as_str()));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config, layout: &RunLayout) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(layout.logs.join("meme-narrator.log"))
}

fn run(args: &Args, cfg: &Config) -> Result<RunStatus> {
    let layout = RunLayout::create(&args.folder, &cfg.run)?;

    let log_path = resolve_log_path(cfg, &layout);
    let _guard = init_logging(cfg, log_path.as_deref())?;

    info!("run dir {}", layout.root.display());

    if cfg.run.dump_effective_config {
        write_effective_config(cfg, &layout.root.join("effective-config.toml"))?;
    }

    let ocr = CommandOcr::new(&cfg.ocr)?;
    let tts = CommandTts::new(&cfg.tts)?;
    info!("tts voice={:?} extension={}", tts.voice(), tts.extension());
    let sink = AudioDir::new(&layout.audio, &cfg.tts.extension, tts);

    let editor: Box<dyn Editor> = if args.no_edit {
        Box::new(NoEditor)
    } else {
        Box::new(CommandEditor::from_config(&cfg.editor))
    };
    let confirm: Box<dyn Confirm> = if wants_confirmation(args, cfg) {
        Box::new(StdinConfirm)
    } else {
        Box::new(NoConfirm)
    };
    let gate = EditGate::new(editor.as_ref(), confirm.as_ref());

    let pipeline = Pipeline::new(cfg, &ocr, &sink, gate)?;
    let report = pipeline.run(&args.folder, &layout)?;

    if cfg.run.write_report_json {
        std::fs::write(&layout.report, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("writing {}", layout.report.display()))?;
    }

    if cfg.run.print_summary {
        println!("{}", serde_json::to_string_pretty(&report.summary())?);
    }

    let status = report.status();
    match status {
        RunStatus::Ok => info!("done, outputs in {}", layout.root.display()),
        RunStatus::Degraded => info!(
            "finished with {} missing clip(s), outputs in {}",
            report.reconciliation.missing.len(),
            layout.root.display()
        ),
    }
    Ok(status)
}

fn write_effective_config(cfg: &Config, path: &Path) -> Result<()> {
    let raw = toml::to_string(cfg).context("serializing effective config")?;
    std::fs::write(path, raw).with_context(|| format!("writing {}", path.display()))
}

/// `--no-edit` skips the prompt outright; otherwise `[editor]` decides.
fn wants_confirmation(args: &Args, cfg: &Config) -> bool {
    !args.no_edit && cfg.editor.wait_for_confirm
}
