//! outage-watch: a small vendor status dashboard.
//!
//! ## Architecture overview
//!
//! ```text
//!                ┌─────────────┐  fetch  ┌──────────┐  assess  ┌───────────┐
//!  registry ───► │   poll.rs   │ ──────► │ fetch.rs │ ───────► │  source/  │
//!  (static)      │ (pass/pool) │         │ (+cache) │          │ (parsers) │
//!                └─────────────┘         └──────────┘          └───────────┘
//!                   │       │
//!        per request│       │ PollMsg (channel)
//!                   ▼       ▼
//!              ┌────────┐ ┌────────┐  draw()  ┌──────────┐
//!              │  web/  │ │ app.rs │ ───────► │  ui.rs   │
//!              │ (HTML) │ │(state) │          │ (render) │
//!              └────────┘ └────────┘          └──────────┘
//!                            ▲ handle_key_event()
//!                         ┌──────────┐
//!                         │ input.rs │
//!                         └──────────┘
//! ```
//!
//! * **`registry`**: the static provider list.
//! * **`fetch`**: blocking HTTP client with a timeout, behind a TTL cache.
//! * **`source/`**: one parser per provider kind (statuspage, rss, slack).
//! * **`poll`**: runs a pass over every provider; one result each.
//! * **`web`**: the browser dashboard (`serve`, the default).
//! * **`app` / `ui` / `input`**: the terminal dashboard (`tui`).
//! * **`main`**: parse args, set up logging, pick a mode.

mod app;
mod config;
mod error;
mod fetch;
mod input;
mod poll;
mod registry;
mod source;
mod status;
mod ui;
mod web;

use std::fs::File;
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use app::App;
use config::{Cli, Mode};
use fetch::{CachedFetcher, HttpFetcher};
use poll::{PollMsg, Poller};
use registry::Registry;
use web::{AppState, PageSettings};

// ---------------------------------------------------------------------------
// RAII terminal guard
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Restore the terminal before printing a panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

/// The terminal dashboard owns stdout, so logs go to a file or nowhere.
fn init_file_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

fn build_poller(cli: &Cli) -> Result<Arc<Poller>> {
    let registry = Registry::builtin().context("invalid provider registry")?;
    let http = HttpFetcher::new(cli.timeout()).context("building HTTP client")?;
    let fetcher = Arc::new(CachedFetcher::new(http, cli.cache_ttl()));
    let poller = Poller::new(registry, fetcher, cli.workers).context("building worker pool")?;
    if poller.registry().is_empty() {
        warn!("no providers configured; the dashboard will be empty");
    }
    info!(
        providers = poller.registry().len(),
        workers = cli.workers,
        timeout_secs = cli.timeout_secs,
        cache_ttl_secs = cli.cache_ttl_secs,
        "poller ready"
    );
    Ok(Arc::new(poller))
}

fn run_server(cli: &Cli, addr: SocketAddr) -> Result<()> {
    init_stderr_logging();
    let poller = build_poller(cli)?;

    let state = AppState {
        poller: poller.clone(),
        page: PageSettings {
            refresh: cli.refresh(),
            cache_ttl: cli.cache_ttl(),
        },
    };

    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    runtime.block_on(web::serve(addr, state))?;
    drop(runtime);

    // The blocking HTTP client must be dropped outside the async runtime,
    // which is why `main` keeps its own handle until here.
    drop(poller);
    Ok(())
}

fn run_tui(cli: &Cli, log_file: Option<&Path>) -> Result<()> {
    init_file_logging(log_file)?;
    install_panic_hook();

    let poller = build_poller(cli)?;
    let handle = poll::spawn(poller, cli.refresh());

    // -- terminal setup (RAII: Drop restores on exit or panic) ---------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new();

    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Drain any messages from the poller.
    //   2. Render the UI.
    //   3. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        while let Ok(msg) = handle.rx.try_recv() {
            match msg {
                PollMsg::Started => app.status = "Checking providers…".into(),
                PollMsg::Pass(results) => app.set_results(results),
            }
        }

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.refresh_requested {
            app.refresh_requested = false;
            handle.refresh();
        }

        if app.quit {
            break;
        }
    }

    // `guard` is dropped here, restoring the terminal; dropping `handle`
    // stops the poller after its current pass.
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.mode() {
        Mode::Serve { bind, port } => run_server(&cli, SocketAddr::new(bind, port)),
        Mode::Tui { log_file } => run_tui(&cli, log_file.as_deref()),
    }
}
