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
use crate::models::{Activity, ActivityStatus, Paginated};

pub enum ActivityAction {
    Back,
    NewActivity,
    EditActivity(Activity),
    DeleteActivity(Uuid),
    Load { page: u32 },
}

pub struct ActivitiesState {
    activities: SelectList<Activity>,
    page: u32,
    total_pages: u32,
    total: i64,
    show_delete_confirmation: bool,
}

impl ActivitiesState {
    pub fn new(result: Paginated<Activity>) -> Self {
        Self {
            page: result.page,
            total_pages: result.total_pages,
            total: result.total,
            activities: SelectList::new(result.data),
            show_delete_confirmation: false,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }
}

fn status_color(status: ActivityStatus) -> Color {
    match status {
        ActivityStatus::Scheduled => Color::Cyan,
        ActivityStatus::InProgress => Color::Yellow,
        ActivityStatus::Completed => Color::Green,
        ActivityStatus::Cancelled => Color::DarkGray,
    }
}

pub fn render_activities<B: Backend>(frame: &mut Frame<B>, state: &mut ActivitiesState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)].as_ref())
        .split(frame.size());

    let items: Vec<ListItem> = state
        .activities
        .items()
        .iter()
        .map(|activity| {
            let length = activity.duration.map(|m| format!("{m} min")).unwrap_or_default();
            ListItem::new(Spans::from(vec![
                Span::raw(format!("{}  ", activity.start_time.format("%d/%m/%Y %H:%M"))),
                Span::styled(format!("{:<12}", activity.kind.as_str()), Style::default().fg(Color::Gray)),
                Span::raw(format!("{:<36}", activity.title)),
                Span::styled(format!("{:<12}", activity.status.as_str()), Style::default().fg(status_color(activity.status))),
                Span::raw(length),
            ]))
        })
        .collect();

    let title = format!("Activities ({}) - page {}/{}", state.total, state.page, state.total_pages.max(1));
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(list, chunks[0], &mut state.activities.state);

    render_buttons(
        frame,
        chunks[1],
        "<N> New | <E> Edit | <D> Delete | <PgUp/PgDn> Page | <Esc> Back",
    );

    if state.show_delete_confirmation {
        render_confirmation(frame, "Are you sure you want to delete this activity?", None);
    }
}

pub fn handle_input(state: &mut ActivitiesState, key: KeyCode) -> Option<ActivityAction> {
    if state.show_delete_confirmation {
        match key {
            KeyCode::Char('y') => {
                state.show_delete_confirmation = false;
                return state.activities.selected().map(|a| ActivityAction::DeleteActivity(a.id));
            }
            KeyCode::Char('n') | KeyCode::Esc => state.show_delete_confirmation = false,
            _ => {}
        }
        return None;
    }

    match key {
        KeyCode::Char('q') | KeyCode::Esc => return Some(ActivityAction::Back),
        KeyCode::Char('n') => return Some(ActivityAction::NewActivity),
        KeyCode::Char('e') => return state.activities.selected().cloned().map(ActivityAction::EditActivity),
        KeyCode::Char('d') if state.activities.selected().is_some() => state.show_delete_confirmation = true,
        KeyCode::PageDown if state.page < state.total_pages => {
            return Some(ActivityAction::Load { page: state.page + 1 })
        }
        KeyCode::PageUp if state.page > 1 => return Some(ActivityAction::Load { page: state.page - 1 }),
        KeyCode::Down => state.activities.next(),
        KeyCode::Up => state.activities.previous(),
        _ => {}
    }
    None
}
