use std::collections::HashMap;

use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use uuid::Uuid;

use super::components::{
    popup::{centered_rect, render_confirmation, render_prompt, PromptAction, PromptState},
    render_buttons,
};
use crate::actions::board::{move_stage, move_task_to_stage, move_task_within, Board};
use crate::models::{Priority, Stage, StageOrder, Task, TaskPosition, UserSummary};

enum Mode {
    Normal,
    Details,
    NewStage(PromptState),
    RenameStage(Uuid, PromptState),
    ConfirmDelete,
}

pub enum BoardAction {
    Back,
    NewTask(Uuid),
    EditTask(Task),
    DeleteTask(Uuid),
    MoveTasks(Vec<TaskPosition>),
    MoveStages(Vec<StageOrder>),
    CreateStage(String),
    RenameStage(Uuid, String),
}

pub struct BoardState {
    board: Board,
    users: HashMap<Uuid, String>,
    column: usize,
    card: usize,
    mode: Mode,
}

impl BoardState {
    pub fn new(board: Board, users: Vec<UserSummary>) -> Self {
        Self {
            board,
            users: users.into_iter().map(|u| (u.id, u.full_name)).collect(),
            column: 0,
            card: 0,
            mode: Mode::Normal,
        }
    }

    pub fn project_id(&self) -> Uuid {
        self.board.project.id
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.board.columns.iter().map(|c| c.stage.clone()).collect()
    }

    /// Swaps in a freshly loaded board, keeping the cursor where it was.
    pub fn reload(&mut self, board: Board) {
        self.board = board;
        self.mode = Mode::Normal;
        self.clamp();
    }

    fn clamp(&mut self) {
        self.column = self.column.min(self.board.columns.len().saturating_sub(1));
        let cards = self.board.columns.get(self.column).map_or(0, |c| c.tasks.len());
        self.card = self.card.min(cards.saturating_sub(1));
    }

    fn selected_stage(&self) -> Option<&Stage> {
        self.board.columns.get(self.column).map(|c| &c.stage)
    }

    fn selected_task(&self) -> Option<&Task> {
        self.board.columns.get(self.column)?.tasks.get(self.card)
    }

    fn shift_card_column(&mut self, delta: isize) -> Option<BoardAction> {
        let task_id = self.selected_task()?.id;
        let target = self.column.checked_add_signed(delta)?;
        let stage_id = self.board.columns.get(target)?.stage.id;
        let updates = move_task_to_stage(&self.board, task_id, stage_id)?;
        self.card = self.board.columns[target].tasks.len();
        self.column = target;
        Some(BoardAction::MoveTasks(updates))
    }

    fn shift_card(&mut self, delta: isize) -> Option<BoardAction> {
        let column = self.board.columns.get(self.column)?;
        let updates = move_task_within(column, self.card, delta)?;
        self.card = self.card.checked_add_signed(delta)?;
        Some(BoardAction::MoveTasks(updates))
    }

    fn shift_column(&mut self, delta: isize) -> Option<BoardAction> {
        let updates = move_stage(&self.stages(), self.column, delta)?;
        self.column = self.column.checked_add_signed(delta)?;
        Some(BoardAction::MoveStages(updates))
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Low => Color::Gray,
        Priority::Medium => Color::White,
        Priority::High => Color::Yellow,
        Priority::Urgent => Color::Red,
    }
}

pub fn render_board<B: Backend>(frame: &mut Frame<B>, state: &mut BoardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)].as_ref())
        .split(frame.size());

    let count = state.board.columns.len().max(1) as u32;
    let constraints: Vec<Constraint> = (0..count).map(|_| Constraint::Ratio(1, count)).collect();
    let areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(chunks[0]);

    for (index, column) in state.board.columns.iter().enumerate() {
        let items: Vec<ListItem> = column
            .tasks
            .iter()
            .map(|task| {
                let mut lines = vec![Spans::from(Span::styled(
                    task.title.clone(),
                    Style::default().fg(priority_color(task.priority)),
                ))];
                if let Some(name) = task.assignee_id.and_then(|id| state.users.get(&id)) {
                    lines.push(Spans::from(Span::styled(format!("  @{name}"), Style::default().fg(Color::Gray))));
                }
                ListItem::new(lines)
            })
            .collect();

        let focused = index == state.column;
        let border = if focused { Style::default().fg(Color::Cyan) } else { Style::default() };
        let title = format!("{} ({})", column.stage.name, column.tasks.len());
        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL).border_style(border))
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            );

        let mut list_state = ListState::default();
        if focused && !column.tasks.is_empty() {
            list_state.select(Some(state.card));
        }
        frame.render_stateful_widget(list, areas[index], &mut list_state);
    }

    render_buttons(
        frame,
        chunks[1],
        "<Arrows> Select | <H/L> Move card | <J/K> Reorder card | <</>> Move column | <N> New | <E> Edit | <D> Delete | <C> Column | <R> Rename | <Enter> Details | <Esc> Back",
    );

    match &state.mode {
        Mode::Normal => {}
        Mode::Details => {
            if let Some(task) = state.selected_task() {
                render_details(frame, task, &state.users);
            }
        }
        Mode::NewStage(prompt) | Mode::RenameStage(_, prompt) => render_prompt(frame, &prompt.title, &prompt.value),
        Mode::ConfirmDelete => render_confirmation(frame, "Are you sure you want to delete this task?", None),
    }
}

fn render_details<B: Backend>(frame: &mut Frame<B>, task: &Task, users: &HashMap<Uuid, String>) {
    let area = centered_rect(70, 70, frame.size());
    let assignee = task
        .assignee_id
        .and_then(|id| users.get(&id))
        .map_or("Unassigned", String::as_str);
    let due = task
        .due_date
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut lines = vec![
        Spans::from(Span::styled(task.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
        Spans::from(task.description.clone().unwrap_or_default()),
        Spans::from(""),
        Spans::from(format!("Priority: {}   Assignee: {assignee}   Due: {due}", task.priority.as_str())),
        Spans::from(format!("Tags: {}", task.tags.join(", "))),
        Spans::from(""),
        Spans::from(Span::styled("History", Style::default().fg(Color::Cyan))),
    ];
    for entry in task.historico.0.entries().iter().rev() {
        lines.push(Spans::from(format!(
            "{}  {}  {}",
            entry.date.format("%d/%m/%Y %H:%M"),
            entry.user_name.as_deref().unwrap_or("-"),
            entry.details
        )));
    }

    let popup = Paragraph::new(lines)
        .block(Block::default().title("Task").borders(Borders::ALL))
        .style(Style::default().fg(Color::White).bg(Color::Black))
        .wrap(Wrap { trim: true });
    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

pub fn handle_input(state: &mut BoardState, key: KeyCode) -> Option<BoardAction> {
    match &mut state.mode {
        Mode::Normal => {}
        Mode::Details => {
            if matches!(key, KeyCode::Esc | KeyCode::Enter) {
                state.mode = Mode::Normal;
            }
            return None;
        }
        Mode::NewStage(prompt) => {
            let action = prompt.handle_key(key)?;
            state.mode = Mode::Normal;
            return match action {
                PromptAction::Confirm(name) => Some(BoardAction::CreateStage(name)),
                PromptAction::Cancel => None,
            };
        }
        Mode::RenameStage(stage_id, prompt) => {
            let stage_id = *stage_id;
            let action = prompt.handle_key(key)?;
            state.mode = Mode::Normal;
            return match action {
                PromptAction::Confirm(name) => Some(BoardAction::RenameStage(stage_id, name)),
                PromptAction::Cancel => None,
            };
        }
        Mode::ConfirmDelete => {
            match key {
                KeyCode::Char('y') => {
                    state.mode = Mode::Normal;
                    return state.selected_task().map(|t| BoardAction::DeleteTask(t.id));
                }
                KeyCode::Char('n') | KeyCode::Esc => state.mode = Mode::Normal,
                _ => {}
            }
            return None;
        }
    }

    match key {
        KeyCode::Char('q') | KeyCode::Esc => return Some(BoardAction::Back),
        KeyCode::Left => {
            state.column = state.column.saturating_sub(1);
            state.card = 0;
        }
        KeyCode::Right => {
            state.column += 1;
            state.card = 0;
            state.clamp();
        }
        KeyCode::Up => state.card = state.card.saturating_sub(1),
        KeyCode::Down => {
            state.card += 1;
            state.clamp();
        }
        KeyCode::Char('h') => return state.shift_card_column(-1),
        KeyCode::Char('l') => return state.shift_card_column(1),
        KeyCode::Char('k') => return state.shift_card(-1),
        KeyCode::Char('j') => return state.shift_card(1),
        KeyCode::Char('<') => return state.shift_column(-1),
        KeyCode::Char('>') => return state.shift_column(1),
        KeyCode::Char('n') => return state.selected_stage().map(|s| BoardAction::NewTask(s.id)),
        KeyCode::Char('e') => return state.selected_task().cloned().map(BoardAction::EditTask),
        KeyCode::Char('d') if state.selected_task().is_some() => state.mode = Mode::ConfirmDelete,
        KeyCode::Char('c') => state.mode = Mode::NewStage(PromptState::new("New column", "")),
        KeyCode::Char('r') => {
            if let Some(stage) = state.selected_stage() {
                let prompt = PromptState::new("Rename column", stage.name.clone());
                state.mode = Mode::RenameStage(stage.id, prompt);
            }
        }
        KeyCode::Enter if state.selected_task().is_some() => state.mode = Mode::Details,
        _ => {}
    }
    None
}
