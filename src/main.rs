//! post-slideshow: step through a WordPress site's latest posts in the
//! terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐ FetchMsg ┌──────────┐  poll()  ┌──────────┐  draw()  ┌──────────┐
//! │ fetch.rs │ ───────► │ store.rs │ ───────► │  app.rs  │ ───────► │  ui.rs   │
//! │ (tokio)  │(channel) │ (cache)  │          │ (state)  │          │ (render) │
//! └──────────┘          └──────────┘          └──────────┘          └──────────┘
//!                                                  ▲
//!                                                  │ key / mouse events
//!                                             ┌──────────┐
//!                                             │ input.rs │
//!                                             └──────────┘
//! ```
//!
//! * **`source/`**: the `DataSource` trait, the `Item` model and the
//!   WordPress REST implementation.
//! * **`cache`**: on-disk cache, one entry per source URL.
//! * **`fetch`**: runs fetches on a tokio blocking pool.
//! * **`store`**: cache-first loading and the stale-fetch guard.
//! * **`slideshow`**: circular cursor, swipe detection, auto-advance.
//! * **`app`**: owns configuration, store, slideshow and status flags.
//! * **`ui`**: pure rendering: reads `App` state and draws widgets.
//! * **`input`**: maps key and mouse events to `App` actions.
//! * **`main`**: wires everything together: parse args, set up logging and
//!   the terminal, and run the event loop.

mod app;
mod cache;
mod config;
mod error;
mod fetch;
mod input;
mod slideshow;
mod source;
mod store;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use app::App;
use cache::ItemCache;
use config::{Cli, Config};
use fetch::FetchWorker;
use source::RestSource;
use store::DataStore;

// ---------------------------------------------------------------------------
// RAII terminal guard: restores the terminal on drop, including on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen. When the
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

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Log to `--log-file` if one was given. The terminal belongs to the UI, so
/// without a file nothing is logged.
fn init_logging(cli: &Cli) -> Result<()> {
    let Some(path) = &cli.log_file else {
        return Ok(());
    };

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;

    env_logger::Builder::new()
        .filter_level(level)
        .filter_module("reqwest", log::LevelFilter::Info)
        .filter_module("hyper_util", log::LevelFilter::Info)
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();

    info!("logging to {} (level: {level:?})", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;
    install_panic_hook();

    let config = Config::from(&cli);
    info!("source {} (cache in {})", config.source_url, config.cache_dir.display());

    // -- data layer ----------------------------------------------------------
    let source = RestSource::new(config.timeout).context("failed to build HTTP client")?;
    let worker = FetchWorker::new(Arc::new(source)).context("failed to start fetch worker")?;
    let store = DataStore::new(ItemCache::open(&config.cache_dir), worker);

    let mut app = App::new(config, store, Instant::now());
    app.load(Instant::now());

    // -- terminal setup (Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let _capture = input::capture()?;

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick). Each iteration:
    //   1. Apply finished fetches and auto-advance.
    //   2. Render the UI.
    //   3. Poll for keyboard / mouse input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        app.tick(Instant::now());

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) => input::handle_key_event(&mut app, key, Instant::now()),
                Event::Mouse(mouse) => input::handle_mouse_event(&mut app, mouse, Instant::now()),
                _ => {}
            }
        }

        if app.quit {
            break;
        }
    }

    // `_capture` and `guard` are dropped here, restoring the terminal.
    Ok(())
}
