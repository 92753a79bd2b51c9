//! # tinywm - headless host
//!
//! Runs the compositor core without a display: events are read from a JSON
//! script and fed through the same dispatch path a real backend would use.
//! Whatever the core sends toward clients is logged, and optionally printed
//! as JSON lines on stdout.

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, info, warn};
use std::path::Path;
use std::time::Duration;
use tokio::signal;
use tokio::sync::mpsc;

use tinywm::{Compositor, CompositorConfig, Event, LoopAction, RecordingClient, SceneTree};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\nbuilt:  ",
    env!("BUILD_DATE"),
    "\ntarget: ",
    env!("TARGET_TRIPLE"),
);

#[derive(Parser, Debug)]
#[command(name = "tinywm")]
#[command(about = "Headless host for the tinywm window/input core")]
#[command(version, long_version = LONG_VERSION)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "~/.config/tinywm/tinywm.toml")]
    config: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// JSON file holding an array of events to replay
    #[arg(short, long)]
    script: Option<String>,

    /// Delay between scripted events (milliseconds)
    #[arg(long, default_value_t = 0)]
    pace_ms: u64,

    /// Print client notifications as JSON lines
    #[arg(long)]
    print_events: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration before logging so `general.debug` can raise the level
    let loaded = CompositorConfig::load(&cli.config);
    let debug = cli.debug || loaded.as_ref().map(|c| c.general.debug).unwrap_or(false);

    let filter = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    info!("🚀 Starting tinywm");
    info!("📄 Version: {}", env!("CARGO_PKG_VERSION"));
    if let Some(commit) = option_env!("GIT_COMMIT") {
        debug!("📄 Commit: {}", commit);
    }

    let config = match loaded {
        Ok(config) => {
            info!("✅ Configuration loaded from: {}", cli.config);
            config
        }
        Err(e) => {
            error!("❌ Failed to load configuration: {:#}", e);
            info!("📝 Using default configuration");
            CompositorConfig::default()
        }
    };

    let script = match &cli.script {
        Some(path) => load_script(Path::new(path))?,
        None => Vec::new(),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(run(config, script, cli.pace_ms, cli.print_events))
}

fn load_script(path: &Path) -> Result<Vec<Event>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;
    let events: Vec<Event> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse script: {}", path.display()))?;
    info!("📜 Loaded {} scripted events", events.len());
    Ok(events)
}

/// Host event loop. Returns once the script is exhausted, the terminate
/// binding fires, or a signal arrives.
async fn run(config: CompositorConfig, script: Vec<Event>, pace_ms: u64, print_events: bool) -> Result<()> {
    let mut compositor = Compositor::new(config, SceneTree::new(), RecordingClient::new())?;

    let (tx, mut rx) = mpsc::channel::<Event>(64);
    tokio::spawn(async move {
        for event in script {
            if pace_ms > 0 {
                tokio::time::sleep(Duration::from_millis(pace_ms)).await;
            }
            if tx.send(event).await.is_err() {
                break;
            }
        }
    });

    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
    let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())?;

    info!("🎬 Starting event loop");
    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("📨 Received SIGTERM, shutting down gracefully");
                break;
            }
            _ = sigint.recv() => {
                info!("📨 Received SIGINT (Ctrl+C), shutting down gracefully");
                break;
            }
            event = rx.recv() => {
                let Some(event) = event else {
                    debug!("Script finished");
                    break;
                };
                let action = compositor.dispatch(event);
                flush_client_events(&mut compositor, print_events);
                if action == LoopAction::Terminate {
                    break;
                }
            }
        }
    }

    info!(
        "👋 tinywm shutting down ({} windows, {} mapped)",
        compositor.windows().len(),
        compositor.windows().mapped_count()
    );
    Ok(())
}

fn flush_client_events(compositor: &mut Compositor<SceneTree, RecordingClient>, print: bool) {
    for event in compositor.client_mut().take() {
        if !print {
            continue;
        }
        match serde_json::to_string(&event) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!("⚠️ Could not serialize {:?}: {}", event, e),
        }
    }
}
