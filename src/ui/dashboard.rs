use chrono::Local;
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::components::render_buttons;
use super::reports::render_day_chart;
use crate::reports::DashboardMetrics;

pub enum DashboardAction {
    Back,
    Refresh,
}

pub struct DashboardState {
    metrics: DashboardMetrics,
}

impl DashboardState {
    pub fn new(metrics: DashboardMetrics) -> Self {
        Self { metrics }
    }
}

pub fn render_dashboard<B: Backend>(frame: &mut Frame<B>, state: &mut DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Percentage(45),
                Constraint::Min(6),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(frame.size());
    let metrics = &state.metrics;

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let kpi = Paragraph::new(Spans::from(vec![
        Span::raw("Active projects "),
        Span::styled(metrics.kpi.active_projects.to_string(), bold),
        Span::raw("   Revenue this month "),
        Span::styled(format!("{:.2}", metrics.kpi.monthly_revenue), bold),
        Span::raw("   Active clients "),
        Span::styled(metrics.kpi.total_clients.to_string(), bold),
    ]))
    .block(Block::default().title("Dashboard").borders(Borders::ALL));
    frame.render_widget(kpi, chunks[0]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)].as_ref())
        .split(chunks[1]);
    render_day_chart(frame, middle[0], "Hours logged, last 7 days", &metrics.productivity);

    let agenda: Vec<ListItem> = metrics
        .todays_agenda
        .iter()
        .map(|item| {
            let names: Vec<&str> = item.participants.iter().map(|p| p.name.as_str()).collect();
            ListItem::new(vec![
                Spans::from(vec![
                    Span::styled(
                        item.time.with_timezone(&Local).format("%H:%M ").to_string(),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::raw(item.title.clone()),
                    Span::styled(format!("  {}", item.kind.as_str()), Style::default().fg(Color::Gray)),
                ]),
                Spans::from(Span::styled(format!("      {}", names.join(", ")), Style::default().fg(Color::Gray))),
            ])
        })
        .collect();
    frame.render_widget(
        List::new(agenda).block(Block::default().title("Today's agenda").borders(Borders::ALL)),
        middle[1],
    );

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)].as_ref())
        .split(chunks[2]);

    let urgent: Vec<ListItem> = metrics
        .urgent_projects
        .iter()
        .map(|p| {
            ListItem::new(Spans::from(vec![
                Span::styled(
                    p.estimated_end_date.format("%d/%m/%Y  ").to_string(),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(format!("{:<28}", p.name)),
                Span::styled(
                    p.client_name.clone().unwrap_or_default(),
                    Style::default().fg(Color::Gray),
                ),
            ]))
        })
        .collect();
    frame.render_widget(
        List::new(urgent).block(Block::default().title("Upcoming deadlines").borders(Borders::ALL)),
        bottom[0],
    );

    let total: i64 = metrics.project_distribution.iter().map(|s| s.count).sum();
    let distribution: Vec<ListItem> = metrics
        .project_distribution
        .iter()
        .map(|s| {
            let share = if total > 0 { s.count as f64 * 100.0 / total as f64 } else { 0.0 };
            ListItem::new(format!("{:<14} {:>4}  {:>5.1}%", s.status, s.count, share))
        })
        .collect();
    frame.render_widget(
        List::new(distribution).block(Block::default().title("Projects by status").borders(Borders::ALL)),
        bottom[1],
    );

    render_buttons(frame, chunks[3], "<R> Refresh | <Esc> Back");
}

pub fn handle_input(_state: &mut DashboardState, key: KeyCode) -> Option<DashboardAction> {
    match key {
        KeyCode::Char('q') | KeyCode::Esc => Some(DashboardAction::Back),
        KeyCode::Char('r') => Some(DashboardAction::Refresh),
        _ => None,
    }
}
