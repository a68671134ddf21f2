//! Keyboard and mouse input handling.
//!
//! Maps terminal events to [`App`] actions. Arrow keys, mouse swipes and
//! clicks on the on-screen buttons all end up in [`App::navigate`], so they
//! share one cursor.
//!
//! Mouse reporting is only switched on while an [`InputCapture`] guard is
//! alive; dropping the guard switches it off again on every exit path.
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] for the action (if one doesn't exist).
//! 2. Add a `KeyCode` match arm in [`handle_key_event`] that calls it.
//! 3. Update the help text in `ui::draw_status_bar`.

use std::io;
use std::time::Instant;

use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;

use crate::app::{App, Mode};
use crate::slideshow::{ArrowKey, InputEvent};

/// Keeps mouse capture enabled for as long as it lives.
pub struct InputCapture {
    _private: (),
}

/// Start receiving mouse events. Capture ends when the guard is dropped.
pub fn capture() -> io::Result<InputCapture> {
    execute!(io::stdout(), EnableMouseCapture)?;
    Ok(InputCapture { _private: () })
}

impl Drop for InputCapture {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), DisableMouseCapture);
    }
}

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent, now: Instant) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if let Mode::EditUrl { .. } = app.mode {
        match key.code {
            KeyCode::Enter => app.commit_url_edit(now),
            KeyCode::Esc => app.cancel_url_edit(),
            KeyCode::Backspace => app.edit_pop(),
            KeyCode::Char(c) => app.edit_push(c),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Right | KeyCode::Char('l') => {
            app.navigate(InputEvent::Key(ArrowKey::Right), now);
        }
        KeyCode::Left | KeyCode::Char('h') => {
            app.navigate(InputEvent::Key(ArrowKey::Left), now);
        }
        KeyCode::Char('r') => app.refresh(now),
        KeyCode::Char('f') => app.load(now),
        KeyCode::Char('c') => app.clear_cache(),
        KeyCode::Char('e') => app.begin_url_edit(),
        KeyCode::Char('t') => app.toggle_title(),
        KeyCode::Char('i') => app.toggle_image(),
        KeyCode::Char('d') => app.toggle_date(),
        KeyCode::Char('a') => app.toggle_auto_scroll(now),
        _ => {}
    }
}

/// Process a single mouse event.
///
/// A left-button press starts a gesture and the release ends it. A release
/// far enough from the press is a swipe; otherwise it is a click, which
/// activates whichever button it landed on.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, now: Instant) {
    let x = f64::from(mouse.column);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            app.navigate(InputEvent::TouchStart { x }, now);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            if app.navigate(InputEvent::TouchEnd { x }, now).is_none() {
                if let Some(button) = app.buttons.hit(mouse.column, mouse.row) {
                    app.navigate(InputEvent::Button(button), now);
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEventState, KeyModifiers};
    use ratatui::layout::Rect;

    use super::*;
    use crate::app::tests::{app_with, settle};
    use crate::app::ButtonAreas;
    use crate::fetch::mock::MockSource;
    use crate::source::fixtures::make_item;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn loaded_app() -> App {
        let source = MockSource::new();
        source.respond(Ok(vec![make_item(1, "A"), make_item(2, "B"), make_item(3, "C")]));
        let mut app = app_with(&source);
        app.load(Instant::now());
        settle(&mut app);
        app
    }

    fn position(app: &App) -> Option<(usize, usize)> {
        app.slideshow.position()
    }

    #[test]
    fn arrows_navigate() {
        let mut app = loaded_app();
        handle_key_event(&mut app, press(KeyCode::Right), Instant::now());
        assert_eq!(position(&app), Some((2, 3)));
        handle_key_event(&mut app, press(KeyCode::Left), Instant::now());
        handle_key_event(&mut app, press(KeyCode::Left), Instant::now());
        assert_eq!(position(&app), Some((3, 3)));
    }

    #[test]
    fn key_release_is_ignored() {
        let mut app = loaded_app();
        let release = KeyEvent {
            code: KeyCode::Right,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        handle_key_event(&mut app, release, Instant::now());
        assert_eq!(position(&app), Some((1, 3)));
    }

    #[test]
    fn q_and_esc_quit() {
        let mut app = app_with(&MockSource::new());
        handle_key_event(&mut app, press(KeyCode::Char('q')), Instant::now());
        assert!(app.quit);

        let mut app = app_with(&MockSource::new());
        handle_key_event(&mut app, press(KeyCode::Esc), Instant::now());
        assert!(app.quit);
    }

    #[test]
    fn esc_while_editing_cancels_instead_of_quitting() {
        let mut app = app_with(&MockSource::new());
        handle_key_event(&mut app, press(KeyCode::Char('e')), Instant::now());
        assert!(matches!(app.mode, Mode::EditUrl { .. }));

        handle_key_event(&mut app, press(KeyCode::Char('q')), Instant::now());
        handle_key_event(&mut app, press(KeyCode::Esc), Instant::now());

        assert!(!app.quit);
        assert_eq!(app.mode, Mode::Browse);
    }

    #[test]
    fn typing_edits_the_url_buffer() {
        let mut app = app_with(&MockSource::new());
        handle_key_event(&mut app, press(KeyCode::Char('e')), Instant::now());
        handle_key_event(&mut app, press(KeyCode::Char('/')), Instant::now());
        handle_key_event(&mut app, press(KeyCode::Char('x')), Instant::now());
        handle_key_event(&mut app, press(KeyCode::Backspace), Instant::now());

        match &app.mode {
            Mode::EditUrl { buffer } => assert!(buffer.ends_with("posts/")),
            other => panic!("expected edit mode, got {other:?}"),
        }
    }

    #[test]
    fn toggle_keys() {
        let mut app = app_with(&MockSource::new());
        handle_key_event(&mut app, press(KeyCode::Char('t')), Instant::now());
        handle_key_event(&mut app, press(KeyCode::Char('a')), Instant::now());
        assert!(!app.config.show_title);
        assert!(!app.auto_scroll_enabled());
    }

    #[test]
    fn clear_key_empties_slideshow() {
        let mut app = loaded_app();
        handle_key_event(&mut app, press(KeyCode::Char('c')), Instant::now());
        assert!(app.slideshow.current_item().is_none());
    }

    #[test]
    fn left_drag_is_next_and_right_drag_is_prev() {
        let mut app = loaded_app();
        let now = Instant::now();

        handle_mouse_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 70, 5), now);
        handle_mouse_event(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 10, 5), now);
        assert_eq!(position(&app), Some((2, 3)));

        handle_mouse_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 5, 5), now);
        handle_mouse_event(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 60, 5), now);
        assert_eq!(position(&app), Some((1, 3)));
    }

    #[test]
    fn short_drag_outside_buttons_does_nothing() {
        let mut app = loaded_app();
        let now = Instant::now();

        handle_mouse_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 40, 5), now);
        handle_mouse_event(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 20, 5), now);
        assert_eq!(position(&app), Some((1, 3)));
    }

    #[test]
    fn click_on_buttons_navigates() {
        let mut app = loaded_app();
        app.buttons = ButtonAreas {
            prev: Rect::new(0, 20, 12, 3),
            next: Rect::new(68, 20, 12, 3),
        };
        let now = Instant::now();

        handle_mouse_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 70, 21), now);
        handle_mouse_event(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 70, 21), now);
        assert_eq!(position(&app), Some((2, 3)));

        handle_mouse_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 3, 21), now);
        handle_mouse_event(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 3, 21), now);
        assert_eq!(position(&app), Some((1, 3)));
    }

    #[test]
    fn other_mouse_events_are_ignored() {
        let mut app = loaded_app();
        handle_mouse_event(&mut app, mouse(MouseEventKind::ScrollDown, 0, 0), Instant::now());
        handle_mouse_event(&mut app, mouse(MouseEventKind::Moved, 0, 0), Instant::now());
        assert_eq!(position(&app), Some((1, 3)));
    }
}
