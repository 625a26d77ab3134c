use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Spans,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Yes/no dialog over the current screen.
pub fn render_confirmation<B: Backend>(frame: &mut Frame<B>, question: &str, detail: Option<&str>) {
    let area = centered_rect(50, 25, frame.size());
    let mut lines = vec![Spans::from(""), Spans::from(question.to_string()), Spans::from("")];
    if let Some(detail) = detail {
        lines.push(Spans::from(detail.to_string()));
        lines.push(Spans::from(""));
    }
    lines.push(Spans::from("<Y> Yes  <N> No"));

    let popup = Paragraph::new(lines)
        .block(Block::default().title("Confirm").borders(Borders::ALL))
        .style(Style::default().fg(Color::White).bg(Color::Black))
        .wrap(Wrap { trim: true });
    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

/// Single-line text prompt, e.g. a stage name or a file path.
pub fn render_prompt<B: Backend>(frame: &mut Frame<B>, title: &str, value: &str) {
    let area = centered_rect(60, 20, frame.size());
    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(format!("{value}|")),
        Spans::from(""),
        Spans::from("<Enter> Confirm  <Esc> Cancel"),
    ])
    .block(Block::default().title(title.to_string()).borders(Borders::ALL))
    .style(Style::default().fg(Color::White).bg(Color::Black));
    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

pub enum PromptAction {
    Cancel,
    Confirm(String),
}

/// A one-line text entry shown with [`render_prompt`].
pub struct PromptState {
    pub title: String,
    pub value: String,
}

impl PromptState {
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<PromptAction> {
        match key {
            KeyCode::Esc => return Some(PromptAction::Cancel),
            KeyCode::Enter => return Some(PromptAction::Confirm(self.value.trim().to_string())),
            KeyCode::Char(c) => self.value.push(c),
            KeyCode::Backspace => {
                self.value.pop();
            }
            _ => {}
        }
        None
    }
}
