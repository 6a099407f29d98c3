//! userdir binary entry point.
//!
//! Parses the command line, sets up logging and the async runtime used for
//! fetches, initializes the terminal in raw mode, runs the TUI event loop,
//! and restores the terminal state on exit.
//!
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::info;

use userdir::Result;
use userdir::api::HttpUserSource;
use userdir::app::keymap::Keymap;
use userdir::app::{self, AppState, Theme};
use userdir::config::Cli;
use userdir::logging::setup_tracing;
use userdir::query::QueryClient;

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Program entry point: run the TUI; a failed session exits non-zero.
fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.log_file.as_deref())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("start async runtime")?;

    let source = HttpUserSource::new(&cli.base_url)?;
    info!(base_url = source.base_url(), "starting");
    let client = QueryClient::with_options(
        Arc::new(source),
        runtime.handle().clone(),
        cli.query_options(),
    );

    let theme = cli
        .theme_path()
        .map(|p| Theme::load_or_init(&p))
        .unwrap_or_else(Theme::mocha);
    let keymap = cli
        .keybinds_path()
        .map(|p| Keymap::load_or_init(&p))
        .unwrap_or_default();

    let mut terminal = init_terminal().context("init terminal")?;
    let mut app = AppState::new(client, theme, keymap, cli.start_screen());

    let res = app::run(&mut terminal, &mut app);

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();
    runtime.shutdown_background();

    res.context("application error")
}
