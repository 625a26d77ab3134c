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

use super::components::{list::SelectList, popup::render_confirmation, render_buttons};
use crate::models::Project;

pub struct ProjectsState {
    /// Set when the list was opened from a client.
    client_id: Option<Uuid>,
    title: String,
    projects: SelectList<Project>,
    show_delete_confirmation: bool,
}

pub enum ProjectAction {
    Back,
    NewProject(Option<Uuid>),
    EditProject(Project),
    DeleteProject(Uuid),
    OpenBoard(Uuid),
    OpenDeliverables(Uuid),
}

impl ProjectsState {
    pub fn new(client_id: Option<Uuid>, title: impl Into<String>, projects: Vec<Project>) -> Self {
        Self {
            client_id,
            title: title.into(),
            projects: SelectList::new(projects),
            show_delete_confirmation: false,
        }
    }

    pub fn client_id(&self) -> Option<Uuid> {
        self.client_id
    }
}

pub fn render_projects<B: Backend>(frame: &mut Frame<B>, state: &mut ProjectsState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)].as_ref())
        .split(frame.size());

    let items: Vec<ListItem> = state
        .projects
        .items()
        .iter()
        .map(|project| {
            let deadline = project
                .estimated_end_date
                .map(|d| d.format("%d/%m/%Y").to_string())
                .unwrap_or_else(|| "-".to_string());
            ListItem::new(Spans::from(vec![
                Span::raw(format!("{:<36}", project.name)),
                Span::styled(format!("{:<14}", project.status), Style::default().fg(Color::Cyan)),
                Span::styled(format!("due {deadline}"), Style::default().fg(Color::Gray)),
            ]))
        })
        .collect();

    let projects_list = List::new(items)
        .block(Block::default().title(state.title.as_str()).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(projects_list, chunks[0], &mut state.projects.state);

    let buttons_text = if state.projects.selected().is_some() {
        "<N> New | <E> Edit | <D> Delete | <Enter> Board | <F> Deliverables | <Esc> Back"
    } else {
        "<N> New Project | <Esc> Back"
    };
    render_buttons(frame, chunks[1], buttons_text);

    if state.show_delete_confirmation {
        render_confirmation(frame, "Are you sure you want to delete this project?", None);
    }
}

pub fn handle_input(state: &mut ProjectsState, key: KeyCode) -> Option<ProjectAction> {
    if state.show_delete_confirmation {
        match key {
            KeyCode::Char('y') => {
                state.show_delete_confirmation = false;
                return state.projects.selected().map(|p| ProjectAction::DeleteProject(p.id));
            }
            KeyCode::Char('n') | KeyCode::Esc => state.show_delete_confirmation = false,
            _ => {}
        }
        return None;
    }

    match key {
        KeyCode::Char('q') | KeyCode::Esc => return Some(ProjectAction::Back),
        KeyCode::Char('n') => return Some(ProjectAction::NewProject(state.client_id)),
        KeyCode::Char('e') => return state.projects.selected().cloned().map(ProjectAction::EditProject),
        KeyCode::Char('d') if state.projects.selected().is_some() => state.show_delete_confirmation = true,
        KeyCode::Char('f') => return state.projects.selected().map(|p| ProjectAction::OpenDeliverables(p.id)),
        KeyCode::Down => state.projects.next(),
        KeyCode::Up => state.projects.previous(),
        KeyCode::Enter => return state.projects.selected().map(|p| ProjectAction::OpenBoard(p.id)),
        _ => {}
    }
    None
}
