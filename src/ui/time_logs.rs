use std::collections::HashMap;

use chrono::Utc;
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use uuid::Uuid;

use super::components::{
    hours,
    list::SelectList,
    popup::{render_confirmation, render_prompt, PromptAction, PromptState},
    render_buttons,
};
use crate::models::{timer_duration_hours, Paginated, TimeLog, TimerStart};
use crate::reports::TimeLogMetrics;

pub enum TimeLogAction {
    Back,
    NewLog,
    EditLog(TimeLog),
    DeleteLog(Uuid),
    StartTimer(TimerStart),
    StopTimer(Uuid),
    Load { page: u32 },
}

pub struct TimeLogsState {
    logs: SelectList<TimeLog>,
    page: u32,
    total_pages: u32,
    metrics: TimeLogMetrics,
    running: Option<TimeLog>,
    project_names: HashMap<Uuid, String>,
    timer_prompt: Option<PromptState>,
    show_delete_confirmation: bool,
}

impl TimeLogsState {
    pub fn new(
        result: Paginated<TimeLog>,
        metrics: TimeLogMetrics,
        running: Option<TimeLog>,
        project_names: HashMap<Uuid, String>,
    ) -> Self {
        Self {
            page: result.page,
            total_pages: result.total_pages,
            logs: SelectList::new(result.data),
            metrics,
            running,
            project_names,
            timer_prompt: None,
            show_delete_confirmation: false,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    fn project_name(&self, id: Option<Uuid>) -> &str {
        id.and_then(|id| self.project_names.get(&id))
            .map_or("-", String::as_str)
    }
}

pub fn render_time_logs<B: Backend>(frame: &mut Frame<B>, state: &mut TimeLogsState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(1), Constraint::Length(3)].as_ref())
        .split(frame.size());

    let timer_line = match &state.running {
        Some(log) => {
            let elapsed = log
                .start_time
                .map(|start| timer_duration_hours(start, Utc::now()))
                .unwrap_or_default();
            Spans::from(Span::styled(
                format!(
                    "Timer running: {} on {} ({})",
                    log.description.as_deref().unwrap_or("untitled"),
                    state.project_name(log.project_id),
                    hours(elapsed)
                ),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ))
        }
        None => Spans::from(Span::styled("No timer running", Style::default().fg(Color::Gray))),
    };
    let header = Paragraph::new(vec![
        Spans::from(format!(
            "This month: {} total | {} billable | estimated {:.2}",
            hours(state.metrics.total_hours),
            hours(state.metrics.billable_hours),
            state.metrics.estimated_value
        )),
        timer_line,
    ])
    .block(Block::default().title("Time Tracking").borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let items: Vec<ListItem> = state
        .logs
        .items()
        .iter()
        .map(|log| {
            let billable = if log.billable { "$" } else { " " };
            ListItem::new(Spans::from(vec![
                Span::raw(format!("{}  ", log.date.format("%d/%m/%Y"))),
                Span::styled(format!("{:>6}  {billable}  ", hours(log.duration)), Style::default().fg(Color::Cyan)),
                Span::raw(format!("{:<14}", log.category.as_str())),
                Span::styled(format!("{:<28}", state.project_name(log.project_id)), Style::default().fg(Color::Gray)),
                Span::raw(log.description.clone().unwrap_or_default()),
            ]))
        })
        .collect();

    let title = format!("Entries - page {}/{}", state.page, state.total_pages.max(1));
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(list, chunks[1], &mut state.logs.state);

    let timer_hint = if state.running.is_some() { "<T> Stop timer" } else { "<T> Start timer" };
    render_buttons(
        frame,
        chunks[2],
        &format!("<N> New | <E> Edit | <D> Delete | {timer_hint} | <PgUp/PgDn> Page | <Esc> Back"),
    );

    if let Some(prompt) = &state.timer_prompt {
        render_prompt(frame, &prompt.title, &prompt.value);
    }
    if state.show_delete_confirmation {
        render_confirmation(frame, "Are you sure you want to delete this entry?", None);
    }
}

pub fn handle_input(state: &mut TimeLogsState, key: KeyCode) -> Option<TimeLogAction> {
    if let Some(prompt) = &mut state.timer_prompt {
        let action = prompt.handle_key(key)?;
        state.timer_prompt = None;
        return match action {
            PromptAction::Confirm(description) => {
                let description = description.trim().to_string();
                Some(TimeLogAction::StartTimer(TimerStart {
                    project_id: state.logs.selected().and_then(|l| l.project_id),
                    description: (!description.is_empty()).then_some(description),
                    billable: true,
                    ..TimerStart::default()
                }))
            }
            PromptAction::Cancel => None,
        };
    }

    if state.show_delete_confirmation {
        match key {
            KeyCode::Char('y') => {
                state.show_delete_confirmation = false;
                return state.logs.selected().map(|l| TimeLogAction::DeleteLog(l.id));
            }
            KeyCode::Char('n') | KeyCode::Esc => state.show_delete_confirmation = false,
            _ => {}
        }
        return None;
    }

    match key {
        KeyCode::Char('q') | KeyCode::Esc => return Some(TimeLogAction::Back),
        KeyCode::Char('n') => return Some(TimeLogAction::NewLog),
        KeyCode::Char('e') => return state.logs.selected().cloned().map(TimeLogAction::EditLog),
        KeyCode::Char('d') if state.logs.selected().is_some() => state.show_delete_confirmation = true,
        KeyCode::Char('t') => match &state.running {
            Some(log) => return Some(TimeLogAction::StopTimer(log.id)),
            None => state.timer_prompt = Some(PromptState::new("What are you working on?", "")),
        },
        KeyCode::PageDown if state.page < state.total_pages => {
            return Some(TimeLogAction::Load { page: state.page + 1 })
        }
        KeyCode::PageUp if state.page > 1 => return Some(TimeLogAction::Load { page: state.page - 1 }),
        KeyCode::Down => state.logs.next(),
        KeyCode::Up => state.logs.previous(),
        _ => {}
    }
    None
}
