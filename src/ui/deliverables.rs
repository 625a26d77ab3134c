use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};
use uuid::Uuid;

use super::components::{
    list::SelectList,
    popup::{render_confirmation, render_prompt, PromptAction, PromptState},
    render_buttons,
};
use crate::models::{Deliverable, DeliverableStatus};

pub enum DeliverableAction {
    Back,
    Upload,
    Edit(Deliverable),
    NewVersion { id: Uuid, path: String },
    Approve(Uuid),
    Reject(Uuid),
    Delete(Uuid),
}

pub struct DeliverablesState {
    project_id: Uuid,
    project_name: String,
    deliverables: SelectList<Deliverable>,
    version_prompt: Option<PromptState>,
    show_delete_confirmation: bool,
}

impl DeliverablesState {
    pub fn new(project_id: Uuid, project_name: impl Into<String>, deliverables: Vec<Deliverable>) -> Self {
        Self {
            project_id,
            project_name: project_name.into(),
            deliverables: SelectList::new(deliverables),
            version_prompt: None,
            show_delete_confirmation: false,
        }
    }

    pub fn project_id(&self) -> Uuid {
        self.project_id
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }
}

fn status_color(status: DeliverableStatus) -> Color {
    match status {
        DeliverableStatus::Draft => Color::Gray,
        DeliverableStatus::InReview => Color::Yellow,
        DeliverableStatus::Approved => Color::Green,
        DeliverableStatus::Rejected => Color::Red,
    }
}

fn size_label(bytes: Option<i64>) -> String {
    match bytes {
        Some(b) if b >= 1024 * 1024 => format!("{:.1} MB", b as f64 / (1024.0 * 1024.0)),
        Some(b) if b >= 1024 => format!("{:.1} KB", b as f64 / 1024.0),
        Some(b) => format!("{b} B"),
        None => "-".to_string(),
    }
}

pub fn render_deliverables<B: Backend>(frame: &mut Frame<B>, state: &mut DeliverablesState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)].as_ref())
        .split(frame.size());

    let items: Vec<ListItem> = state
        .deliverables
        .items()
        .iter()
        .map(|d| {
            ListItem::new(Spans::from(vec![
                Span::raw(format!("{:<32}", d.name)),
                Span::styled(format!("v{:<4}", d.version), Style::default().fg(Color::Cyan)),
                Span::styled(format!("{:<14}", d.kind.as_str()), Style::default().fg(Color::Gray)),
                Span::styled(format!("{:<11}", d.status.as_str()), Style::default().fg(status_color(d.status))),
                Span::raw(format!("{:>10}  ", size_label(d.file_size))),
                Span::styled(d.file_url.clone(), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let title = format!("Deliverables - {}", state.project_name);
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(list, chunks[0], &mut state.deliverables.state);

    render_buttons(
        frame,
        chunks[1],
        "<U> Upload | <E> Edit | <V> New version | <A> Approve | <R> Reject | <D> Delete | <Esc> Back",
    );

    if let Some(prompt) = &state.version_prompt {
        render_prompt(frame, &prompt.title, &prompt.value);
    }
    if state.show_delete_confirmation {
        render_confirmation(
            frame,
            "Are you sure you want to delete this deliverable?",
            Some("The stored file is removed as well."),
        );
    }
}

pub fn handle_input(state: &mut DeliverablesState, key: KeyCode) -> Option<DeliverableAction> {
    if let Some(prompt) = &mut state.version_prompt {
        let action = prompt.handle_key(key)?;
        state.version_prompt = None;
        return match action {
            PromptAction::Confirm(path) if !path.trim().is_empty() => state
                .deliverables
                .selected()
                .map(|d| DeliverableAction::NewVersion {
                    id: d.id,
                    path: path.trim().to_string(),
                }),
            _ => None,
        };
    }

    if state.show_delete_confirmation {
        match key {
            KeyCode::Char('y') => {
                state.show_delete_confirmation = false;
                return state.deliverables.selected().map(|d| DeliverableAction::Delete(d.id));
            }
            KeyCode::Char('n') | KeyCode::Esc => state.show_delete_confirmation = false,
            _ => {}
        }
        return None;
    }

    let selected = state.deliverables.selected().map(|d| d.id);
    match key {
        KeyCode::Char('q') | KeyCode::Esc => return Some(DeliverableAction::Back),
        KeyCode::Char('u') => return Some(DeliverableAction::Upload),
        KeyCode::Char('e') => return state.deliverables.selected().cloned().map(DeliverableAction::Edit),
        KeyCode::Char('v') if selected.is_some() => {
            state.version_prompt = Some(PromptState::new("Path of the new version", ""));
        }
        KeyCode::Char('a') => return selected.map(DeliverableAction::Approve),
        KeyCode::Char('r') => return selected.map(DeliverableAction::Reject),
        KeyCode::Char('d') if selected.is_some() => state.show_delete_confirmation = true,
        KeyCode::Down => state.deliverables.next(),
        KeyCode::Up => state.deliverables.previous(),
        _ => {}
    }
    None
}
