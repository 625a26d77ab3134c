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

use super::components::{list::SelectList, popup::render_confirmation, render_buttons};
use crate::models::{Client, Paginated};

// Represents the state of the client list screen
pub struct ClientsState {
    clients: SelectList<Client>,
    page: u32,
    total_pages: u32,
    total: i64,
    query: String,
    searching: bool,
    show_delete_confirmation: bool,
}

pub enum ClientAction {
    Back,
    NewClient,
    EditClient(Client),
    DeleteClient(Uuid),
    ViewProjects(Uuid),
    /// Reload with the given search text and page.
    Load { query: String, page: u32 },
}

impl ClientsState {
    pub fn new(result: Paginated<Client>, query: String) -> Self {
        Self {
            page: result.page,
            total_pages: result.total_pages,
            total: result.total,
            clients: SelectList::new(result.data),
            query,
            searching: false,
            show_delete_confirmation: false,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    fn reload(&self, page: u32) -> ClientAction {
        ClientAction::Load {
            query: self.query.clone(),
            page,
        }
    }
}

pub fn render_clients<B: Backend>(frame: &mut Frame<B>, state: &mut ClientsState) {
    let size = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(3)].as_ref())
        .split(size);

    let search_style = if state.searching { Style::default().fg(Color::Yellow) } else { Style::default() };
    let cursor = if state.searching { "|" } else { "" };
    let search = Paragraph::new(format!("{}{cursor}", state.query))
        .style(search_style)
        .block(Block::default().title("Search name, email or document").borders(Borders::ALL));
    frame.render_widget(search, chunks[0]);

    let items: Vec<ListItem> = state
        .clients
        .items()
        .iter()
        .map(|client| {
            ListItem::new(Spans::from(vec![
                Span::raw(format!("{:<32}", client.name)),
                Span::styled(format!("{:<32}", client.email), Style::default().fg(Color::Gray)),
                Span::styled(client.status.as_str(), Style::default().fg(Color::Cyan)),
            ]))
        })
        .collect();

    let title = format!("Clients ({}) - page {}/{}", state.total, state.page, state.total_pages.max(1));
    let clients_list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(clients_list, chunks[1], &mut state.clients.state);

    let buttons_text = if state.searching {
        "<Enter> Search | <Esc> Stop searching"
    } else if state.clients.selected().is_some() {
        "<N> New | <E> Edit | <D> Delete | <Enter> Projects | </> Search | <PgUp/PgDn> Page | <Esc> Back"
    } else {
        "<N> New | </> Search | <Esc> Back"
    };
    render_buttons(frame, chunks[2], buttons_text);

    if state.show_delete_confirmation {
        render_confirmation(
            frame,
            "Are you sure you want to delete this client?",
            Some("The client is marked inactive and hidden from lists."),
        );
    }
}

pub fn handle_input(state: &mut ClientsState, key: KeyCode) -> Option<ClientAction> {
    if state.searching {
        match key {
            KeyCode::Esc => state.searching = false,
            KeyCode::Enter => {
                state.searching = false;
                return Some(state.reload(1));
            }
            KeyCode::Char(c) => state.query.push(c),
            KeyCode::Backspace => {
                state.query.pop();
            }
            _ => {}
        }
        return None;
    }

    if state.show_delete_confirmation {
        match key {
            KeyCode::Char('y') => {
                state.show_delete_confirmation = false;
                return state.clients.selected().map(|c| ClientAction::DeleteClient(c.id));
            }
            KeyCode::Char('n') | KeyCode::Esc => state.show_delete_confirmation = false,
            _ => {}
        }
        return None;
    }

    match key {
        KeyCode::Char('q') | KeyCode::Esc => return Some(ClientAction::Back),
        KeyCode::Char('n') => return Some(ClientAction::NewClient),
        KeyCode::Char('e') => return state.clients.selected().cloned().map(ClientAction::EditClient),
        KeyCode::Char('d') if state.clients.selected().is_some() => state.show_delete_confirmation = true,
        KeyCode::Char('/') => state.searching = true,
        KeyCode::PageDown if state.page < state.total_pages => return Some(state.reload(state.page + 1)),
        KeyCode::PageUp if state.page > 1 => return Some(state.reload(state.page - 1)),
        KeyCode::Down => state.clients.next(),
        KeyCode::Up => state.clients.previous(),
        KeyCode::Enter => return state.clients.selected().map(|c| ClientAction::ViewProjects(c.id)),
        _ => {}
    }
    None
}
