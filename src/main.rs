//! topk - live top-K heavy hitters dashboard
//!
//! Pipe labels (or JSON records with `--json`) into stdin; keys are read
//! from the controlling terminal.

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::tty::IsTty;
use std::fs::OpenOptions;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use topk_tui::app::App;
use topk_tui::config::{self, Config, Theme};
use topk_tui::scheduler::Scheduler;
use topk_tui::tui;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "topk")]
#[command(version, about = "Live top-K heavy hitters dashboard", long_about = None)]
struct Cli {
    /// Number of top items to track
    #[arg(short)]
    k: Option<usize>,

    /// Sketch width (buckets per row)
    #[arg(long)]
    width: Option<usize>,

    /// Sketch depth (hash rows)
    #[arg(long)]
    depth: Option<usize>,

    /// Sliding window size, e.g. 10s or 5m
    #[arg(long, value_parser = duration_arg)]
    window: Option<Duration>,

    /// Window tick size (time bucket precision)
    #[arg(long, value_parser = duration_arg)]
    tick: Option<Duration>,

    /// Count decay base for colliding items, in (0, 1]
    #[arg(long)]
    decay: Option<f64>,

    /// Entries in the decay lookup table
    #[arg(long)]
    decay_lut_size: Option<usize>,

    /// Plot refresh rate
    #[arg(long)]
    plot_fps: Option<u32>,

    /// Ranking refresh rate
    #[arg(long)]
    items_fps: Option<u32>,

    /// Count refresh rate
    #[arg(long)]
    item_counts_fps: Option<u32>,

    /// Read JSON records {"item", "count", "timestamp"} instead of text lines
    #[arg(long)]
    json: bool,

    /// Layout of string timestamps: "rfc3339" or a strftime pattern
    #[arg(long)]
    json_timestamp_layout: Option<String>,

    /// Keep the selected item selected when the ranking changes
    #[arg(long)]
    track_selected: bool,

    /// Start with the plot on a log scale
    #[arg(long)]
    log_scale: bool,

    /// Width of the list pane, in percent
    #[arg(long)]
    view_split: Option<u16>,

    /// Default colors for a dark or light terminal
    #[arg(long, value_enum)]
    theme: Option<Theme>,

    /// Color of the selected series (palette name)
    #[arg(long)]
    highlight_color: Option<String>,

    /// Color of the other series (palette name)
    #[arg(long)]
    dim_color: Option<String>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file path
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn duration_arg(s: &str) -> std::result::Result<Duration, String> {
    config::parse_duration(s).map_err(|e| e.to_string())
}

impl Cli {
    /// Flags override values from the config file
    fn apply(&self, config: &mut Config) {
        let sketch = &mut config.sketch;
        if let Some(k) = self.k {
            sketch.k = k;
        }
        if let Some(width) = self.width {
            sketch.width = width;
        }
        if let Some(depth) = self.depth {
            sketch.depth = depth;
        }
        if let Some(window) = self.window {
            sketch.window = window;
        }
        if let Some(tick) = self.tick {
            sketch.tick = tick;
        }
        if let Some(decay) = self.decay {
            sketch.decay = decay;
        }
        if let Some(size) = self.decay_lut_size {
            sketch.decay_lut_size = size;
        }

        let render = &mut config.render;
        if let Some(fps) = self.plot_fps {
            render.plot_fps = fps;
        }
        if let Some(fps) = self.items_fps {
            render.items_fps = fps;
        }
        if let Some(fps) = self.item_counts_fps {
            render.item_counts_fps = fps;
        }
        render.track_selected |= self.track_selected;
        render.log_scale |= self.log_scale;
        if let Some(split) = self.view_split {
            render.view_split = split;
        }
        if let Some(theme) = self.theme {
            render.theme = theme;
        }
        if let Some(color) = &self.highlight_color {
            render.highlight_color = Some(color.clone());
        }
        if let Some(color) = &self.dim_color {
            render.dim_color = Some(color.clone());
        }

        config.input.json |= self.json;
        if let Some(layout) = &self.json_timestamp_layout {
            config.input.timestamp_layout = layout.clone();
        }
        if let Some(path) = &self.log_file {
            config.log.file = path.clone();
        }
    }
}

/// Log to a file; the terminal belongs to the dashboard.
fn init_logging(config: &Config, verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { config.log.level.as_str() };
    let path = &config.log.file;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply(&mut config);
    config.validate().context("invalid configuration")?;

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    init_logging(&config, cli.verbose)?;
    info!("Starting topk v{}", env!("CARGO_PKG_VERSION"));

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    let result = rt.block_on(run(config));
    // ingestion may still be blocked reading stdin
    rt.shutdown_background();

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

async fn run(config: Config) -> Result<()> {
    let stdin = io::stdin();
    let input = if stdin.is_tty() {
        info!("stdin is a terminal, nothing to ingest");
        None
    } else {
        Some(BufReader::new(stdin))
    };

    let app = Arc::new(App::new(config)?);
    let mut scheduler = Scheduler::new(Arc::clone(&app));
    scheduler.start(input);

    let result = tui::run(&app).await;

    scheduler.shutdown();
    scheduler.join().await;
    info!("dashboard closed");
    result.context("terminal session failed")
}
