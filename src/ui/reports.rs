use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{BarChart, Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::components::{hours, render_buttons};
use crate::models::DayHours;
use crate::reports::{LabeledHours, ReportData, ReportKind, ReportPeriod, TimeLogMetrics};

const PERIODS: [ReportPeriod; 4] = [
    ReportPeriod::Today,
    ReportPeriod::Week,
    ReportPeriod::Month,
    ReportPeriod::Quarter,
];

/// Everything the reports screen shows for one period.
pub struct ReportsView {
    pub metrics: TimeLogMetrics,
    pub daily: Vec<DayHours>,
    pub categories: Vec<LabeledHours>,
    pub top_projects: Vec<LabeledHours>,
    pub clients: Vec<LabeledHours>,
    pub preview: ReportData,
}

pub enum ReportsAction {
    Back,
    Load { period: ReportPeriod, kind: ReportKind },
}

pub struct ReportsState {
    period: ReportPeriod,
    kind: ReportKind,
    view: ReportsView,
}

impl ReportsState {
    pub fn new(period: ReportPeriod, kind: ReportKind, view: ReportsView) -> Self {
        Self { period, kind, view }
    }

    fn cycle_period(&self) -> ReportPeriod {
        let index = PERIODS.iter().position(|p| *p == self.period).unwrap_or(0);
        PERIODS[(index + 1) % PERIODS.len()]
    }
}

/// Bar per day, labelled with the day of the month.
pub fn render_day_chart<B: Backend>(frame: &mut Frame<B>, area: Rect, title: &str, days: &[DayHours]) {
    let labels: Vec<String> = days.iter().map(|d| d.date.format("%d").to_string()).collect();
    let data: Vec<(&str, u64)> = labels
        .iter()
        .zip(days)
        .map(|(label, day)| (label.as_str(), day.hours.max(0.0).round() as u64))
        .collect();
    let bar_width = if days.len() > 10 { 4 } else { 6 };

    let chart = BarChart::default()
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .data(&data)
        .bar_width(bar_width)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    frame.render_widget(chart, area);
}

fn render_hours_list<B: Backend>(frame: &mut Frame<B>, area: Rect, title: &str, rows: &[LabeledHours]) {
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| ListItem::new(format!("{:<28} {:>8}", row.name, hours(row.hours))))
        .collect();
    frame.render_widget(
        List::new(items).block(Block::default().title(title.to_string()).borders(Borders::ALL)),
        area,
    );
}

fn preview_lines(kind: ReportKind, data: &ReportData) -> Vec<Spans<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![Spans::from(Span::styled(format!("Period {}", data.period), bold))];
    match kind {
        ReportKind::Business => {
            lines.push(Spans::from(format!("Revenue: {:.2}", data.business.total_revenue)));
            lines.push(Spans::from(format!("New clients: {}", data.business.new_clients)));
        }
        ReportKind::Productivity => {
            let p = &data.productivity;
            lines.push(Spans::from(format!(
                "Hours: {} total | {} billable | {} non-billable",
                hours(p.total_hours),
                hours(p.billable_hours),
                hours(p.non_billable_hours)
            )));
            lines.push(Spans::from(format!("Average utilization: {:.0}%", p.average_utilization)));
            for user in &p.user_ranking {
                lines.push(Spans::from(format!(
                    "  {:<24} {:>8} {:>5.0}%",
                    user.name,
                    hours(user.total_hours),
                    user.utilization
                )));
            }
        }
    }
    lines
}

pub fn render_reports<B: Backend>(frame: &mut Frame<B>, state: &mut ReportsState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Percentage(35),
                Constraint::Min(6),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(frame.size());

    let view = &state.view;
    let header = Paragraph::new(format!(
        "This month: {} logged | {} billable | estimated {:.2}",
        hours(view.metrics.total_hours),
        hours(view.metrics.billable_hours),
        view.metrics.estimated_value
    ))
    .block(Block::default().title(format!("Reports - {}", state.period)).borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(chunks[1]);
    render_day_chart(frame, top[0], "My hours, last 14 days", &view.daily);
    render_hours_list(frame, top[1], "By category", &view.categories);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(50),
            ]
            .as_ref(),
        )
        .split(chunks[2]);
    render_hours_list(frame, bottom[0], "Top projects", &view.top_projects);
    render_hours_list(frame, bottom[1], "By client", &view.clients);
    let kind_title = match state.kind {
        ReportKind::Business => "Business report",
        ReportKind::Productivity => "Productivity report",
    };
    frame.render_widget(
        Paragraph::new(preview_lines(state.kind, &view.preview))
            .block(Block::default().title(kind_title).borders(Borders::ALL)),
        bottom[2],
    );

    render_buttons(frame, chunks[3], "<P> Next period | <K> Switch report | <Esc> Back");
}

pub fn handle_input(state: &mut ReportsState, key: KeyCode) -> Option<ReportsAction> {
    match key {
        KeyCode::Char('q') | KeyCode::Esc => Some(ReportsAction::Back),
        KeyCode::Char('p') => Some(ReportsAction::Load {
            period: state.cycle_period(),
            kind: state.kind,
        }),
        KeyCode::Char('k') => Some(ReportsAction::Load {
            period: state.period,
            kind: match state.kind {
                ReportKind::Business => ReportKind::Productivity,
                ReportKind::Productivity => ReportKind::Business,
            },
        }),
        _ => None,
    }
}
