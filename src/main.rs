//! mflix - terminal client for the Mflix movie catalog
//!
//! # Usage
//!
//! ```bash
//! # Launch interactive TUI
//! mflix
//!
//! # CLI mode (for automation)
//! mflix login me@example.com secret
//! mflix list --sort year --desc --search batman
//! mflix show 573a1390f29313caabcd4135 --json
//! ```

use std::io::{stdout, Stdout};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::UnboundedReceiver;

use mflix::api::MflixClient;
use mflix::app::{App, Task};
use mflix::auth::Auth;
use mflix::catalog::{CatalogEvent, CatalogWorker};
use mflix::cli::{Cli, Command, ExitCode, Output};
use mflix::commands::{self, CmdContext};
use mflix::config::Config;
use mflix::session::SessionStore;
use mflix::{logging, ui};

/// Terminal type alias for convenience
type Tui = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.is_cli_mode() {
        // CLI mode: execute command and exit
        logging::init_stderr();
        let exit_code = run_cli(cli).await;
        std::process::exit(exit_code.into());
    } else {
        // TUI mode: launch interactive interface
        logging::init_file();
        let config = Config::resolve(cli.config.as_deref())?;
        run_tui(config).await
    }
}

/// Run CLI command and return exit code
async fn run_cli(cli: Cli) -> ExitCode {
    let output = Output::new(&cli);

    let config = match Config::resolve(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return output.error(format!("{:#}", e), ExitCode::InvalidArgs),
    };
    let ctx = match CmdContext::from_config(&config) {
        Ok(ctx) => ctx,
        Err(e) => return output.error(e.to_string(), ExitCode::Error),
    };
    tracing::debug!(base_url = ctx.client.base_url(), "cli context ready");

    match cli.command {
        Some(Command::Login(cmd)) => commands::login_cmd(cmd, &ctx, &output).await,
        Some(Command::Register(cmd)) => commands::register_cmd(cmd, &ctx, &output).await,
        Some(Command::Logout) => commands::logout_cmd(&ctx, &output),
        Some(Command::Whoami) => commands::whoami_cmd(&ctx, &output),
        Some(Command::List(cmd)) => commands::list_cmd(cmd, &ctx, &output).await,
        Some(Command::Show(cmd)) => commands::show_cmd(cmd, &ctx, &output).await,
        Some(Command::Comments(cmd)) => commands::comments_cmd(cmd, &ctx, &output).await,
        Some(Command::Edit(cmd)) => commands::edit_cmd(cmd, &ctx, &output).await,
        None => {
            // This shouldn't happen (handled by is_cli_mode check)
            ExitCode::Success
        }
    }
}

// =============================================================================
// TUI Mode
// =============================================================================

/// Initialize the terminal for TUI mode
fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state
fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run interactive TUI
async fn run_tui(config: Config) -> Result<()> {
    let client = MflixClient::with_timeout(config.api_base_url(), config.request_timeout());
    let store = SessionStore::open_default()?;
    let (mut worker, mut events) = CatalogWorker::new(client);

    let mut app = App::new(Auth::restore(store), config.default_sort());
    app.start();

    let mut terminal = init_terminal()?;

    let result = run_event_loop(&mut terminal, &mut app, &mut worker, &mut events).await;

    // Always restore terminal, even on error
    worker.cancel_all();
    restore_terminal(&mut terminal)?;

    result
}

/// Main event loop - handles input, dispatches work, folds in completions
async fn run_event_loop(
    terminal: &mut Tui,
    app: &mut App,
    worker: &mut CatalogWorker,
    events: &mut UnboundedReceiver<CatalogEvent>,
) -> Result<()> {
    const TICK_RATE: Duration = Duration::from_millis(100);

    while app.running {
        dispatch(worker, app.take_tasks());

        terminal.draw(|frame| ui::render(frame, app))?;

        // Poll for events with timeout so completions get drawn promptly
        if event::poll(TICK_RATE)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (ignore releases on Windows)
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        while let Ok(event) = events.try_recv() {
            app.apply_event(event);
        }

        // Yield so spawned requests make progress between frames
        tokio::task::yield_now().await;
    }

    dispatch(worker, app.take_tasks());
    Ok(())
}

/// Hand queued tasks to the worker
fn dispatch(worker: &mut CatalogWorker, tasks: Vec<Task>) {
    for task in tasks {
        task.run(worker);
    }
}
