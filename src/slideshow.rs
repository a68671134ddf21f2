//! Slideshow navigation.
//!
//! [`Slideshow`] holds the loaded posts and a circular cursor over them. It
//! is either `Empty` (nothing to show, navigation does nothing) or `Ready`
//! (cursor valid). Every load puts it back into one of those two states with
//! the cursor at the first post.
//!
//! All input sources (arrow keys, swipe gestures, the on-screen Prev/Next
//! buttons) are reduced to a [`Command`] by [`Slideshow::handle`], so there is
//! exactly one cursor no matter where input comes from.

use std::time::{Duration, Instant};

use crate::source::Item;

/// Horizontal travel that turns a press/release into a swipe.
pub const DEFAULT_SWIPE_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Empty,
    Ready,
}

/// A navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Prev,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowKey {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavButton {
    Prev,
    Next,
}

/// Raw input, before it is mapped to a [`Command`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key(ArrowKey),
    TouchStart { x: f64 },
    TouchEnd { x: f64 },
    Button(NavButton),
}

// ---------------------------------------------------------------------------
// Swipe detection
// ---------------------------------------------------------------------------

/// Turns a touch-start / touch-end pair into a swipe.
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    threshold: f64,
    start_x: Option<f64>,
}

impl SwipeTracker {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.abs(),
            start_x: None,
        }
    }

    pub fn start(&mut self, x: f64) {
        self.start_x = Some(x);
    }

    /// Finish the gesture started by [`start`](Self::start).
    ///
    /// Dragging left past the threshold means "show the next post"; dragging
    /// right past it means "previous". Anything shorter is a tap.
    pub fn end(&mut self, x: f64) -> Option<Command> {
        let start = self.start_x.take()?;
        let delta = x - start;

        if delta < -self.threshold {
            Some(Command::Next)
        } else if delta > self.threshold {
            Some(Command::Prev)
        } else {
            None
        }
    }
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD)
    }
}

// ---------------------------------------------------------------------------
// Slideshow
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Slideshow {
    items: Vec<Item>,
    /// `Some` exactly when `items` is non-empty.
    cursor: Option<usize>,
    /// Index shown in the preview pane. Set on load, not moved by navigation.
    preview: Option<usize>,
    swipe: SwipeTracker,
}

impl Slideshow {
    pub fn new(swipe_threshold: f64) -> Self {
        Self {
            swipe: SwipeTracker::new(swipe_threshold),
            ..Self::default()
        }
    }

    pub fn state(&self) -> State {
        if self.cursor.is_some() {
            State::Ready
        } else {
            State::Empty
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // -- lifecycle -----------------------------------------------------------

    /// Replace the posts and start over from the first one.
    pub fn load_succeeded(&mut self, items: Vec<Item>) {
        let start = if items.is_empty() { None } else { Some(0) };
        self.items = items;
        self.cursor = start;
        self.preview = start;
    }

    pub fn load_failed(&mut self) {
        self.cleared();
    }

    pub fn cleared(&mut self) {
        self.items.clear();
        self.cursor = None;
        self.preview = None;
    }

    // -- navigation ----------------------------------------------------------

    pub fn next(&mut self) {
        if let Some(i) = self.cursor {
            self.cursor = Some((i + 1) % self.items.len());
        }
    }

    pub fn prev(&mut self) {
        if let Some(i) = self.cursor {
            let len = self.items.len();
            self.cursor = Some((i + len - 1) % len);
        }
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Next => self.next(),
            Command::Prev => self.prev(),
        }
    }

    /// Map one input event onto the cursor.
    ///
    /// Returns the command that was applied, if the event produced one.
    /// Touch-starts and short swipes (taps) produce none, and so does
    /// anything while the slideshow is empty.
    pub fn handle(&mut self, event: InputEvent) -> Option<Command> {
        let command = match event {
            InputEvent::Key(ArrowKey::Right) | InputEvent::Button(NavButton::Next) => {
                Some(Command::Next)
            }
            InputEvent::Key(ArrowKey::Left) | InputEvent::Button(NavButton::Prev) => {
                Some(Command::Prev)
            }
            InputEvent::TouchStart { x } => {
                self.swipe.start(x);
                None
            }
            InputEvent::TouchEnd { x } => self.swipe.end(x),
        }?;

        if self.is_empty() {
            return None;
        }
        self.apply(command);
        Some(command)
    }

    // -- projections ---------------------------------------------------------

    pub fn current_item(&self) -> Option<&Item> {
        self.cursor.and_then(|i| self.items.get(i))
    }

    pub fn preview_item(&self) -> Option<&Item> {
        self.preview.and_then(|i| self.items.get(i))
    }

    /// 1-based position and total, e.g. `(2, 5)` for the second of five.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.cursor.map(|i| (i + 1, self.items.len()))
    }
}

// ---------------------------------------------------------------------------
// Auto-advance timer
// ---------------------------------------------------------------------------

/// Decides when the slideshow should move on by itself.
///
/// The interval restarts whenever the slide changes for any reason, so a
/// manual step is never immediately followed by an automatic one.
#[derive(Debug, Clone)]
pub struct AutoAdvance {
    enabled: bool,
    interval: Duration,
    last_change: Instant,
}

impl AutoAdvance {
    pub fn new(enabled: bool, interval: Duration, now: Instant) -> Self {
        Self {
            enabled,
            interval,
            last_change: now,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool, now: Instant) {
        self.enabled = enabled;
        self.last_change = now;
    }

    /// Note that the slide changed at `now`.
    pub fn restart(&mut self, now: Instant) {
        self.last_change = now;
    }

    /// Advance `show` if the interval has elapsed. Returns whether it did.
    pub fn tick(&mut self, show: &mut Slideshow, now: Instant) -> bool {
        if !self.enabled || show.state() == State::Empty {
            return false;
        }
        if now.saturating_duration_since(self.last_change) < self.interval {
            return false;
        }
        show.next();
        self.last_change = now;
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
