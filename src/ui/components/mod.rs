pub mod date_input;
pub mod form;
pub mod list;
pub mod popup;

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// How long a screen waits for a key before redrawing.
const TICK: Duration = Duration::from_millis(250);

/// Next key press, or `None` when the tick elapsed without one.
pub fn read_key() -> Result<Option<KeyCode>> {
    if !event::poll(TICK)? {
        return Ok(None);
    }
    match event::read()? {
        Event::Key(key) if key.kind != KeyEventKind::Release => Ok(Some(key.code)),
        _ => Ok(None),
    }
}

/// Key hints along the bottom edge of a screen.
pub fn render_buttons<B: Backend>(frame: &mut Frame<B>, area: Rect, text: &str) {
    let buttons = Paragraph::new(text.to_string())
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, area);
}

pub fn hours(h: f64) -> String {
    format!("{h:.1}h")
}
