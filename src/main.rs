//! artfolio - terminal client for an artist's portfolio
//!
//! Browse categories and works, read the site's text sections, and (with an
//! admin session) manage content.
//!
//! # Usage
//!
//! ```bash
//! # Launch interactive TUI
//! artfolio
//!
//! # CLI mode (for automation)
//! artfolio categories --json
//! artfolio upload portraits ./works/*.jpg
//! ```

use std::io::{stdout, Stdout};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tokio::sync::mpsc;

use artfolio::api::BackendClient;
use artfolio::app::{App, AppEvent};
use artfolio::cli::{self, Cli, Command, ExitCode, Output};
use artfolio::commands::{self, CommandContext};
use artfolio::config::Config;
use artfolio::{tasks, ui};

/// Terminal type alias for convenience
type Tui = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Guard must live until exit or buffered lines are lost
    let log_guard = init_logging();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), tui = !cli.is_cli_mode(), "artfolio starting");

    if cli.is_cli_mode() {
        // CLI mode: execute command and exit
        let exit_code = run_cli(cli).await;
        drop(log_guard);
        std::process::exit(exit_code.into());
    }

    // TUI mode: launch interactive interface
    let config = load_config(cli.config.as_deref())?;
    let config = apply_locale(config, &cli);
    run_tui(config).await
}

// =============================================================================
// Logging
// =============================================================================

/// Daily log file under the local data dir; stdout belongs to the TUI/CLI
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let logs_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("artfolio")
        .join("logs");
    std::fs::create_dir_all(&logs_dir).ok()?;

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "artfolio.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,artfolio=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .try_init()
        .ok()?;

    Some(guard)
}

// =============================================================================
// Config
// =============================================================================

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Ok(Config::load()),
    }
}

fn apply_locale(mut config: Config, cli: &Cli) -> Config {
    if let Some(locale) = cli.locale {
        config.locale = locale;
    }
    config
}

// =============================================================================
// CLI Mode
// =============================================================================

/// Run CLI command and return exit code
async fn run_cli(cli: Cli) -> ExitCode {
    let output = Output::new(&cli);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => apply_locale(config, &cli),
        Err(e) => return output.error(format!("Invalid config: {}", e), ExitCode::InvalidArgs),
    };

    let Some(command) = cli.command else {
        // This shouldn't happen (handled by is_cli_mode check)
        return ExitCode::Success;
    };

    // Config management works without a backend
    if let Command::Config(cmd) = command {
        return commands::config_cmd(cmd, cli.config.as_deref(), &config, &output);
    }

    let ctx = match CommandContext::resolve(config).await {
        Ok(ctx) => ctx,
        Err(e) => return output.error(e.to_string(), ExitCode::InvalidArgs),
    };
    tracing::debug!(capability = %ctx.capability, "session resolved");

    commands::dispatch(command, &ctx, &output, |prompt| {
        cli::confirm(prompt).unwrap_or(false)
    })
    .await
}

// =============================================================================
// TUI Mode
// =============================================================================

/// Initialize the terminal for TUI mode
fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state
fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run interactive TUI
async fn run_tui(config: Config) -> Result<()> {
    let mut app = App::from_config(&config);

    // Without a backend the TUI still starts and explains what is missing
    let backend = match BackendClient::from_config(&config) {
        Ok(backend) => Some(backend),
        Err(e) => {
            tracing::warn!(error = %e, "backend not configured");
            app.set_error(e.to_string());
            None
        }
    };

    let mut terminal = init_terminal()?;
    let result = run_event_loop(&mut terminal, &mut app, backend, &config).await;

    // Always restore terminal, even on error
    restore_terminal(&mut terminal)?;

    result
}

/// Main event loop - handles input, runs queued actions, applies results, renders UI
async fn run_event_loop(
    terminal: &mut Tui,
    app: &mut App,
    backend: Option<BackendClient>,
    config: &Config,
) -> Result<()> {
    const TICK_RATE: Duration = Duration::from_millis(100);

    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();

    if let Some(ref backend) = backend {
        let backend = backend.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(tasks::resolve_capability(&backend).await);
        });
    }

    while app.running {
        // Start whatever the last input queued
        for action in app.take_actions() {
            match backend {
                Some(ref backend) => tasks::spawn(action, backend.clone(), config.player, tx.clone()),
                None => tracing::debug!(?action, "dropping action without backend"),
            }
        }

        // Apply finished background work
        while let Ok(app_event) = rx.try_recv() {
            app.apply(app_event);
        }

        let size = terminal.size()?;
        app.set_viewport(Rect::new(0, 0, size.width, size.height));
        terminal.draw(|frame| ui::render(frame, app))?;

        // Poll without blocking the runtime so spawned tasks keep running
        let ready = tokio::task::block_in_place(|| event::poll(TICK_RATE))?;
        if ready {
            match event::read()? {
                // Only handle key press events (ignore releases on Windows)
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key);
                }
                Event::Mouse(mouse) => {
                    app.handle_mouse(mouse);
                }
                _ => {}
            }
        }
    }

    Ok(())
}
