use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::components::{list::SelectList, render_buttons};
use crate::auth::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Dashboard,
    Clients,
    Projects,
    TimeTracking,
    Activities,
    Reports,
}

impl MenuEntry {
    const ALL: [MenuEntry; 6] = [
        MenuEntry::Dashboard,
        MenuEntry::Clients,
        MenuEntry::Projects,
        MenuEntry::TimeTracking,
        MenuEntry::Activities,
        MenuEntry::Reports,
    ];

    fn label(self) -> &'static str {
        match self {
            MenuEntry::Dashboard => "Dashboard",
            MenuEntry::Clients => "Clients",
            MenuEntry::Projects => "Projects",
            MenuEntry::TimeTracking => "Time tracking",
            MenuEntry::Activities => "Activities",
            MenuEntry::Reports => "Reports",
        }
    }
}

pub enum HomeAction {
    Open(MenuEntry),
    Logout,
}

pub struct HomeState {
    greeting: String,
    menu: SelectList<MenuEntry>,
}

impl HomeState {
    pub fn new(session: &Session) -> Self {
        Self {
            greeting: format!("Signed in as {} ({})", session.user_name, session.role),
            menu: SelectList::new(MenuEntry::ALL.to_vec()),
        }
    }
}

pub fn render_home<B: Backend>(f: &mut Frame<B>, state: &mut HomeState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(2)].as_ref())
        .split(f.size());

    let header = Paragraph::new(state.greeting.as_str())
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().title("ArchFlow").borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let items: Vec<ListItem> = state.menu.items().iter().map(|e| ListItem::new(e.label())).collect();
    let menu = List::new(items)
        .block(Block::default().title("Menu").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    f.render_stateful_widget(menu, chunks[1], &mut state.menu.state);

    render_buttons(f, chunks[2], "<Enter> Open | <Esc> Sign out");
}

pub fn handle_input(state: &mut HomeState, key: KeyCode) -> Option<HomeAction> {
    match key {
        KeyCode::Esc | KeyCode::Char('q') => return Some(HomeAction::Logout),
        KeyCode::Down => state.menu.next(),
        KeyCode::Up => state.menu.previous(),
        KeyCode::Enter => return state.menu.selected().map(|e| HomeAction::Open(*e)),
        _ => {}
    }
    None
}
