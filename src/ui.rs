//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## Layout
//!
//! ```text
//! ┌ settings bar ─────────────────────────────────────────┐
//! │ slide (70%)                     │ live preview (30%)   │
//! ├ [◀ Prev] ─────────────────────────────────── [Next ▶] ┤
//! └ status bar ───────────────────────────────────────────┘
//! ```
//!
//! The button rectangles are written back into [`App::buttons`] so that mouse
//! clicks can be matched against what is on screen.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, ButtonAreas, Mode};
use crate::config::Config;
use crate::source::Item;

const BUTTON_WIDTH: u16 = 12;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [settings_area, main_area, nav_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let [slide_area, preview_area] =
        Layout::horizontal([Constraint::Percentage(70), Constraint::Percentage(30)])
            .areas(main_area);

    draw_settings_bar(app, frame, settings_area);
    draw_slide(app, frame, slide_area);
    draw_preview(app, frame, preview_area);
    app.buttons = draw_nav_buttons(app, frame, nav_area);
    draw_status_bar(app, frame, status_area);
}

/// Lines describing one post, honouring the display toggles.
fn item_lines<'a>(item: &'a Item, config: &Config) -> Vec<Line<'a>> {
    let mut lines = Vec::new();

    if config.show_title {
        lines.push(Line::from(Span::styled(
            item.title.display.as_str(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )));
    }
    if config.show_date {
        lines.push(Line::from(Span::styled(
            item.published_at.format("%Y-%m-%d").to_string(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    if config.show_image {
        let image = item
            .featured_image
            .as_ref()
            .map(|img| format!("🖼  {img}"))
            .unwrap_or_else(|| "🖼  (no image)".into());
        lines.push(Line::from(Span::styled(image, Style::default().fg(Color::Magenta))));
    }

    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        item.link.as_str(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
    )));
    lines
}

/// Render the current slide.
fn draw_slide(app: &App, frame: &mut Frame, area: Rect) {
    let title = match app.slideshow.position() {
        Some((k, n)) => format!(" Post {k}/{n} "),
        None => " Slideshow ".to_string(),
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    let body = match app.slideshow.current_item() {
        Some(item) => item_lines(item, &app.config),
        None if app.loading => vec![Line::raw("Loading…")],
        None => vec![Line::from(Span::styled(
            "No posts loaded. Press r to fetch.",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    let slide = Paragraph::new(body).block(block).wrap(Wrap { trim: true });
    frame.render_widget(slide, area);
}

/// Render the live preview pane. Hidden while a fetch is running.
fn draw_preview(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default().title(" Live Preview ").borders(Borders::ALL);

    let body = match app.slideshow.preview_item() {
        Some(item) if !app.loading => item_lines(item, &app.config),
        _ => Vec::new(),
    };

    let preview = Paragraph::new(body).block(block).wrap(Wrap { trim: true });
    frame.render_widget(preview, area);
}

/// Render the Prev/Next buttons and report where they ended up.
fn draw_nav_buttons(app: &App, frame: &mut Frame, area: Rect) -> ButtonAreas {
    let [prev, _, next] = Layout::horizontal([
        Constraint::Length(BUTTON_WIDTH),
        Constraint::Min(0),
        Constraint::Length(BUTTON_WIDTH),
    ])
    .areas(area);

    let style = if app.slideshow.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };

    for (label, rect) in [("← Prev", prev), ("Next →", next)] {
        let button = Paragraph::new(label)
            .style(style)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(button, rect);
    }

    ButtonAreas { prev, next }
}

/// Render the top settings bar, or the URL editor while editing.
fn draw_settings_bar(app: &App, frame: &mut Frame, area: Rect) {
    let line = match &app.mode {
        Mode::EditUrl { buffer } => Line::from(vec![
            Span::styled(" URL: ", Style::default().fg(Color::Yellow)),
            Span::raw(buffer.as_str()),
            Span::styled("▏", Style::default().fg(Color::Yellow)),
            Span::styled("  Enter: apply  Esc: cancel", Style::default().fg(Color::DarkGray)),
        ]),
        Mode::Browse => {
            let flag = |on: bool, name: &'static str| {
                let style = if on {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                Span::styled(format!("[{}] {name}  ", if on { "x" } else { " " }), style)
            };
            Line::from(vec![
                Span::raw(" "),
                Span::styled(app.config.source_url.as_str(), Style::default().fg(Color::Cyan)),
                Span::raw(format!("  ({} posts)  ", app.config.desired_count)),
                flag(app.auto_scroll_enabled(), "auto"),
                flag(app.config.show_title, "title"),
                flag(app.config.show_image, "image"),
                flag(app.config.show_date, "date"),
            ])
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status_style = if app.error.is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Yellow)
    };

    let mut spans = vec![Span::raw(" ")];
    if app.loading {
        spans.push(Span::styled("⟳ ", Style::default().fg(Color::Yellow)));
    }
    spans.push(Span::styled(app.status.as_str(), status_style));
    spans.push(Span::raw(
        "  q: quit  ←/→: slide  r: refresh  c: clear cache  e: edit URL  a/t/i/d: toggles",
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
