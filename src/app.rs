use std::time::Instant;

use log::{debug, info};
use ratatui::layout::{Position, Rect};

use crate::config::Config;
use crate::error::FetchError;
use crate::slideshow::{AutoAdvance, Command, InputEvent, NavButton, Slideshow};
use crate::source::Item;
use crate::store::{DataStore, Load};

/// What keystrokes currently mean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browse,
    /// Typing a new source URL; `buffer` holds the text so far.
    EditUrl { buffer: String },
}

/// Where the Prev/Next buttons were drawn last frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct ButtonAreas {
    pub prev: Rect,
    pub next: Rect,
}

impl ButtonAreas {
    pub fn hit(&self, column: u16, row: u16) -> Option<NavButton> {
        let pos = Position::new(column, row);
        if self.prev.contains(pos) {
            Some(NavButton::Prev)
        } else if self.next.contains(pos) {
            Some(NavButton::Next)
        } else {
            None
        }
    }
}

pub struct App {
    pub config: Config,
    store: DataStore,
    pub slideshow: Slideshow,
    auto: AutoAdvance,
    /// A fetch is in flight.
    pub loading: bool,
    /// Message of the last failed fetch, cleared by the next success.
    pub error: Option<String>,
    /// Last status message.
    pub status: String,
    pub mode: Mode,
    /// Whether the user has requested to quit.
    pub quit: bool,
    pub buttons: ButtonAreas,
}

impl App {
    pub fn new(config: Config, store: DataStore, now: Instant) -> Self {
        let auto = AutoAdvance::new(config.auto_scroll, config.scroll_interval, now);
        Self {
            slideshow: Slideshow::new(config.swipe_threshold),
            config,
            store,
            auto,
            loading: false,
            error: None,
            status: "Starting…".into(),
            mode: Mode::Browse,
            quit: false,
            buttons: ButtonAreas::default(),
        }
    }

    // -- loading -------------------------------------------------------------

    /// Show the posts for the current source, from the cache if possible.
    pub fn load(&mut self, now: Instant) {
        let load = self.store.load(&self.config);
        self.begin(load, now);
    }

    /// Fetch the current source again, bypassing the cache.
    pub fn refresh(&mut self, now: Instant) {
        let load = self.store.force_refresh(&self.config);
        self.begin(load, now);
    }

    fn begin(&mut self, load: Load, now: Instant) {
        match load {
            Load::Cached(items) => {
                self.loading = false;
                self.status = format!("Loaded {} posts from cache", items.len());
                self.show(items, now);
            }
            Load::Pending { generation } => {
                debug!("waiting for fetch #{generation}");
                self.loading = true;
                self.error = None;
                self.status = "Fetching…".into();
            }
        }
    }

    fn show(&mut self, items: Vec<Item>, now: Instant) {
        self.error = None;
        self.slideshow.load_succeeded(items);
        self.auto.restart(now);
    }

    /// Apply the result of the current fetch, if it has arrived.
    pub fn poll_fetch(&mut self, now: Instant) {
        if let Some(outcome) = self.store.poll() {
            self.finish(outcome, now);
        }
    }

    fn finish(&mut self, outcome: Result<Vec<Item>, FetchError>, now: Instant) {
        self.loading = false;
        match outcome {
            Ok(items) => {
                self.status = format!("Fetched {} posts", items.len());
                self.show(items, now);
            }
            Err(e) => {
                self.slideshow.load_failed();
                self.status = format!("Error: {e}");
                self.error = Some(e.to_string());
            }
        }
    }

    /// Drop the cached posts of the current source and empty the slideshow.
    pub fn clear_cache(&mut self) {
        self.store.invalidate(&self.config.source_url);
        self.store.cancel();
        self.slideshow.cleared();
        self.loading = false;
        self.error = None;
        self.status = "Cache cleared".into();
    }

    /// Point the slideshow at another endpoint and fetch it fresh.
    pub fn set_source_url(&mut self, url: String, now: Instant) {
        let url = url.trim().to_string();
        if url.is_empty() {
            self.status = "Source URL unchanged".into();
            return;
        }

        info!("source changed: {} -> {url}", self.config.source_url);
        self.store.invalidate(&self.config.source_url);
        self.config.source_url = url;
        self.refresh(now);
    }

    // -- navigation ----------------------------------------------------------

    /// Feed one input event to the slideshow.
    pub fn navigate(&mut self, event: InputEvent, now: Instant) -> Option<Command> {
        let command = self.slideshow.handle(event)?;
        self.auto.restart(now);
        Some(command)
    }

    /// Per-frame housekeeping: collect fetch results and auto-advance.
    pub fn tick(&mut self, now: Instant) {
        self.poll_fetch(now);
        self.auto.tick(&mut self.slideshow, now);
    }

    // -- settings ------------------------------------------------------------

    pub fn toggle_title(&mut self) {
        self.config.show_title = !self.config.show_title;
    }

    pub fn toggle_image(&mut self) {
        self.config.show_image = !self.config.show_image;
    }

    pub fn toggle_date(&mut self) {
        self.config.show_date = !self.config.show_date;
    }

    pub fn toggle_auto_scroll(&mut self, now: Instant) {
        self.config.auto_scroll = !self.config.auto_scroll;
        self.auto.set_enabled(self.config.auto_scroll, now);
    }

    pub fn auto_scroll_enabled(&self) -> bool {
        self.auto.is_enabled()
    }

    // -- URL editing ---------------------------------------------------------

    pub fn begin_url_edit(&mut self) {
        self.mode = Mode::EditUrl {
            buffer: self.config.source_url.clone(),
        };
    }

    pub fn edit_push(&mut self, c: char) {
        if let Mode::EditUrl { buffer } = &mut self.mode {
            buffer.push(c);
        }
    }

    pub fn edit_pop(&mut self) {
        if let Mode::EditUrl { buffer } = &mut self.mode {
            buffer.pop();
        }
    }

    pub fn cancel_url_edit(&mut self) {
        self.mode = Mode::Browse;
    }

    pub fn commit_url_edit(&mut self, now: Instant) {
        if let Mode::EditUrl { buffer } = std::mem::replace(&mut self.mode, Mode::Browse) {
            if buffer.trim() == self.config.source_url {
                return;
            }
            self.set_source_url(buffer, now);
        }
    }
}
