//! helmet-watch - watch a camera for riders without helmets
//!
//! Captures frames, runs the configured detector, draws boxes on the display
//! surface and prints alerts to stdout as they are raised. Ctrl-C stops the
//! loop after the current frame.

use anyhow::{anyhow, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;

use helmet_watch::ui::Ui;
use helmet_watch::{App, BackendKind, LoopControl, Overrides, WatchConfig};

#[derive(Parser, Debug)]
#[command(
    name = "helmet-watch",
    about = "Detect riders without helmets on a live camera feed"
)]
struct Args {
    /// Path to a TOML config file
    #[arg(long, env = "HELMET_WATCH_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Camera device (/dev/videoN or stub://NAME)
    #[arg(long, value_name = "DEVICE")]
    camera: Option<String>,

    /// Detector backend (stub|tract)
    #[arg(long, value_name = "NAME")]
    backend: Option<String>,

    /// ONNX model for the tract backend
    #[arg(long, value_name = "PATH")]
    model: Option<PathBuf>,

    /// Class labels file, one name per line
    #[arg(long, value_name = "PATH")]
    labels: Option<PathBuf>,

    /// TTF font for box labels
    #[arg(long, value_name = "PATH")]
    font: Option<PathBuf>,

    /// Target frame rate (0 = as fast as possible)
    #[arg(long)]
    fps: Option<u32>,

    /// Stop after this many frames
    #[arg(long, value_name = "N")]
    max_frames: Option<u64>,

    /// UI mode for stderr progress (auto|plain|pretty)
    #[arg(long, default_value = "auto", value_name = "MODE")]
    ui: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let is_tty = std::io::stderr().is_terminal();
    let stdout_is_tty = std::io::stdout().is_terminal();
    let ui = Ui::from_args(Some(&args.ui), is_tty, !stdout_is_tty);

    let backend = args
        .backend
        .as_deref()
        .map(str::parse::<BackendKind>)
        .transpose()?;
    let config = {
        let _stage = ui.stage("Load configuration");
        WatchConfig::load_with(
            args.config.as_deref(),
            Overrides {
                camera: args.camera,
                fps: args.fps,
                backend,
                model_path: args.model,
                labels_path: args.labels,
                font_path: args.font,
                max_frames: args.max_frames,
            },
        )?
    };
    log::info!(
        "helmet-watch starting: camera={} backend={} fps={}",
        config.camera.device,
        config.detector.backend,
        config.camera.target_fps
    );

    let control = LoopControl::new();
    let handle = control.clone();
    ctrlc::set_handler(move || handle.stop())
        .map_err(|e| anyhow!("error setting Ctrl-C handler: {}", e))?;

    let mut app = App::new(config, std::io::stdout());
    let result = app.run(&control, &ui);

    let alerts = app.board().log().len();
    match result {
        Ok(frames) => {
            log::info!("helmet-watch finished: {} frames, {} alerts", frames, alerts);
            Ok(())
        }
        Err(err) => {
            log::error!("helmet-watch stopped: {:#}", err);
            Err(err)
        }
    }
}
