use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use shortsai::{
    Config, Script, ShortsPipeline,
    services::upload::YoutubeUploader,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "shortsai", version)]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Produce an MP4 from a script (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render one page of a script as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Script file; pages are separated by blank lines.
    script: PathBuf,

    /// Config JSON; defaults are used when the file does not exist.
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Output directory, overriding `output.directory`.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Upload the finished video to YouTube.
    #[arg(long)]
    upload: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Script file.
    #[arg(long)]
    script: PathBuf,

    /// Page number (1-based).
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Page-local time in seconds.
    #[arg(long, default_value_t = 0.0)]
    at: f64,

    /// Image to place on the page.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Config JSON; defaults are used when the file does not exist.
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &std::path::Path) -> anyhow::Result<Config> {
    if path.exists() {
        return Config::from_path(path).with_context(|| format!("load config '{}'", path.display()));
    }
    tracing::warn!(path = %path.display(), "config file not found, using defaults");
    let mut cfg = Config::default();
    cfg.apply_env_fallbacks();
    cfg.validate()?;
    Ok(cfg)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(&args.config)?;
    if let Some(dir) = args.output {
        cfg.output.directory = dir;
    }
    let script = Script::from_path(&args.script)?;
    tracing::info!(pages = script.pages.len(), script = %args.script.display(), "script loaded");

    let mut pipeline = ShortsPipeline::from_config(cfg)?;
    if args.upload {
        match YoutubeUploader::new(&pipeline.config().youtube) {
            Ok(uploader) => pipeline = pipeline.with_uploader(Box::new(uploader)),
            Err(e) => tracing::warn!("upload disabled: {e}"),
        }
    }

    let report = pipeline.run(&script)?;
    eprintln!(
        "wrote {} ({} of {} pages, {:.1}s, {} frames)",
        report.video_path.display(),
        report.pages_rendered,
        report.pages_in_script,
        report.total_secs,
        report.frames
    );
    if let Some(id) = report.video_id {
        eprintln!("uploaded {}", shortsai::services::upload::watch_url(&id));
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;
    let script = Script::from_path(&args.script)?;
    let text = args
        .page
        .checked_sub(1)
        .and_then(|i| script.pages.get(i as usize))
        .with_context(|| {
            format!(
                "page {} out of range (script has {} pages)",
                args.page,
                script.pages.len()
            )
        })?;

    let pipeline = ShortsPipeline::new(cfg)?;
    let frame = pipeline.preview_page(args.page, text, args.image.as_deref(), args.at)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
