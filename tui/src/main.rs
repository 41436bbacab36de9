//! termreel Entry Point
//!
//! Plays a looping multi-pane terminal presentation.
//!
//! Usage:
//!   termreel [OPTIONS]
//!
//! Options:
//!   -c, --config <FILE>     Reel file (default: ~/.config/termreel/reel.toml)
//!   --seed <SEED>           Deterministic jitter
//!   --headless              Print the journal instead of drawing
//!   --run-for-ms <MS>       Virtual run length in headless mode
//!   --json                  JSON lines output in headless mode
//!   --time-scale <SCALE>    Playback speed multiplier
//!   --log-file <PATH>       Log destination in terminal mode

use std::fs::File;
use std::io::{self, IsTerminal};
use std::panic;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reel_tui::{run_headless, App, Args};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args)?;

    let config = args.load_config()?;

    if args.headless {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        run_headless(&config, args.run_for_ms, args.json, &mut out)?;
        return Ok(());
    }

    // Check if we have a TTY before attempting initialization
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: termreel requires a terminal (TTY)");
        eprintln!();
        eprintln!("For pipes, CI or recordings use headless mode:");
        eprintln!("  termreel --headless --run-for-ms 10000");
        std::process::exit(1);
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut app = App::new(&config).context("failed to build the reel")?;

    // Initialize terminal
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    terminal.hide_cursor()?;

    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Headless runs log to stderr; terminal runs log only to `--log-file`
fn init_logging(args: &Args) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if args.headless {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(io::stderr),
            )
            .init();
    } else if let Some(path) = &args.log_file {
        let file = open_log_file(path)?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    }
    // The alternate screen owns stdout and stderr, so no subscriber otherwise

    Ok(())
}

fn open_log_file(path: &Path) -> anyhow::Result<File> {
    File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}
